//! Contract between the repository layer and a document store.
//!
//! Filters, sort specifications and index keys are plain filter/order
//! documents as produced by `filterql_core`. The store owns its connection;
//! callers only borrow collections from it.

pub mod memory;

pub use memory::{MemoryCollection, MemoryStore};

use std::sync::Arc;

use serde_json::Value;

use crate::error::DbResult;

/// Name of the index every collection has on `_id`.
pub const ID_INDEX: &str = "_id_";

/// Options for [`Collection::find`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// Order document, `field -> 1 | -1`
    pub sort: Option<Value>,
    pub skip: usize,
    pub limit: Option<usize>,
}

pub trait Collection: Send + Sync {
    fn name(&self) -> &str;

    /// Count documents matching `filter`, all of them when `None`.
    fn count(&self, filter: Option<&Value>) -> DbResult<u64>;

    fn find(&self, filter: Option<&Value>, options: &FindOptions) -> DbResult<Vec<Value>>;

    fn find_one(&self, filter: Option<&Value>) -> DbResult<Option<Value>> {
        let options = FindOptions {
            limit: Some(1),
            ..FindOptions::default()
        };
        Ok(self.find(filter, &options)?.into_iter().next())
    }

    /// Store a document and return its `_id`, assigned when missing.
    fn insert(&self, document: Value) -> DbResult<Value>;

    /// Replace the first document matching `filter`, keeping its `_id`.
    /// Returns the number of replaced documents.
    fn update(&self, filter: &Value, document: Value) -> DbResult<u64>;

    /// Remove every document matching `filter`.
    fn remove(&self, filter: &Value) -> DbResult<u64>;

    /// Remove the collection with its documents and indexes.
    fn drop_collection(&self) -> DbResult<()>;

    /// Create an index from an order document and return its name.
    fn create_index(&self, keys: &Value) -> DbResult<String>;

    fn drop_index(&self, keys: &Value) -> DbResult<()>;

    /// Drop every index except the one on `_id`.
    fn drop_indexes(&self) -> DbResult<()>;

    fn index_names(&self) -> DbResult<Vec<String>>;
}

/// Hands out collections by name. Implementations decide whether unknown
/// names are created on demand.
pub trait CollectionAccessor: Send + Sync {
    fn collection(&self, name: &str) -> DbResult<Arc<dyn Collection>>;

    fn collection_names(&self) -> DbResult<Vec<String>>;

    /// Drop every collection.
    fn drop_database(&self) -> DbResult<()> {
        for name in self.collection_names()? {
            self.collection(&name)?.drop_collection()?;
        }
        Ok(())
    }
}

/// Store-style index name for an order document: `lastName_1_age_-1`.
pub fn index_name(keys: &Value) -> String {
    match keys.as_object() {
        Some(fields) => fields
            .iter()
            .map(|(field, direction)| format!("{}_{}", field, direction))
            .collect::<Vec<_>>()
            .join("_"),
        None => keys.to_string(),
    }
}
