use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;

use crate::entity::Entity;
use crate::error::DbResult;
use crate::storage::{Collection, FindOptions};

/// A pending query. Nothing touches the store until [`Cursor::fetch`],
/// [`Cursor::first`] or [`Cursor::count`].
pub struct Cursor<T> {
    collection: Arc<dyn Collection>,
    filter: Option<Value>,
    options: FindOptions,
    _entity: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for Cursor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("collection", &self.collection.name())
            .field("filter", &self.filter)
            .field("options", &self.options)
            .finish()
    }
}

impl<T: Entity> Cursor<T> {
    pub fn new(collection: Arc<dyn Collection>, filter: Option<Value>) -> Self {
        Self {
            collection,
            filter,
            options: FindOptions::default(),
            _entity: PhantomData,
        }
    }

    /// Sort by a key list such as `byLastNameAnd-Age`.
    pub fn order_by(mut self, keys: &str) -> DbResult<Self> {
        self.options.sort = Some(filterql_core::order_document(keys)?);
        Ok(self)
    }

    pub fn skip(mut self, count: usize) -> Self {
        self.options.skip = count;
        self
    }

    pub fn limit(mut self, count: usize) -> Self {
        self.options.limit = Some(count);
        self
    }

    pub fn filter(&self) -> Option<&Value> {
        self.filter.as_ref()
    }

    pub fn fetch(&self) -> DbResult<Vec<T>> {
        self.fetch_documents()?
            .into_iter()
            .map(T::from_document)
            .collect()
    }

    pub fn fetch_documents(&self) -> DbResult<Vec<Value>> {
        self.collection.find(self.filter.as_ref(), &self.options)
    }

    pub fn first(&self) -> DbResult<Option<T>> {
        let options = FindOptions {
            limit: Some(1),
            ..self.options.clone()
        };
        self.collection
            .find(self.filter.as_ref(), &options)?
            .into_iter()
            .next()
            .map(T::from_document)
            .transpose()
    }

    /// Number of matching documents, regardless of skip and limit.
    pub fn count(&self) -> DbResult<u64> {
        self.collection.count(self.filter.as_ref())
    }
}
