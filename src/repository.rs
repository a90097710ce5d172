//! Query-string driven access to the documents of one entity type.
//!
//! Every query goes through [`filterql_core::filter_document`], so both full
//! expressions (`age > ?1 and name like 'A%'`) and shorthand key lists
//! (`byNameAndAge`) are accepted wherever a query is.

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::connection::ConnectionHandle;
use crate::cursor::Cursor;
use crate::entity::Entity;
use crate::error::{DbError, DbResult};
use crate::storage::{Collection, CollectionAccessor};

pub struct Repository<T> {
    accessor: Arc<dyn CollectionAccessor>,
    collection_name: String,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Repository<T> {
    pub fn new(accessor: Arc<dyn CollectionAccessor>) -> Self {
        Self {
            accessor,
            collection_name: T::collection_name(),
            _entity: PhantomData,
        }
    }

    /// Repository over the handle's accessor, connecting if needed.
    pub fn from_handle(handle: &ConnectionHandle) -> DbResult<Self> {
        Ok(Self::new(handle.accessor()?))
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    fn collection(&self) -> DbResult<Arc<dyn Collection>> {
        self.accessor.collection(&self.collection_name)
    }

    pub fn count(&self) -> DbResult<u64> {
        self.collection()?.count(None)
    }

    pub fn count_matching(&self, query: &str, params: &[Value]) -> DbResult<u64> {
        let filter = filterql_core::filter_document(query, params)?;
        self.collection()?.count(Some(&filter))
    }

    pub fn find(&self, query: &str, params: &[Value]) -> DbResult<Cursor<T>> {
        let filter = filterql_core::filter_document(query, params)?;
        Ok(Cursor::new(self.collection()?, Some(filter)))
    }

    pub fn find_all(&self) -> DbResult<Cursor<T>> {
        Ok(Cursor::new(self.collection()?, None))
    }

    /// Query with a prebuilt filter document.
    pub fn find_by_filter(&self, filter: Value) -> DbResult<Cursor<T>> {
        Ok(Cursor::new(self.collection()?, Some(filter)))
    }

    pub fn find_by_id(&self, id: &str) -> DbResult<Option<T>> {
        self.collection()?
            .find_one(Some(&json!({ "_id": id })))?
            .map(T::from_document)
            .transpose()
    }

    /// Insert a new entity, writing the assigned id back, or replace the
    /// stored document of an entity that already has one.
    pub fn save(&self, entity: &mut T) -> DbResult<()> {
        let mut document = entity.to_document()?;
        if let Some(fields) = document.as_object_mut() {
            fields.remove("_id");
        }
        let collection = self.collection()?;

        match entity.id() {
            None => {
                let id = match collection.insert(document)? {
                    Value::String(id) => id,
                    other => {
                        return Err(DbError::InvalidDocument(format!(
                            "Expected a string _id, store assigned {}",
                            other
                        )))
                    }
                };
                tracing::debug!("Inserted {} '{}'", self.collection_name, id);
                entity.set_id(id);
            }
            Some(id) => {
                let replaced = collection.update(&json!({ "_id": id }), document)?;
                if replaced == 0 {
                    return Err(DbError::DocumentNotFound(id.to_string()));
                }
                tracing::debug!("Updated {} '{}'", self.collection_name, id);
            }
        }
        Ok(())
    }

    pub fn delete(&self, entity: &T) -> DbResult<()> {
        let Some(id) = entity.id() else {
            return Err(DbError::InvalidDocument(format!(
                "Cannot delete an unsaved {}",
                self.collection_name
            )));
        };
        self.collection()?.remove(&json!({ "_id": id }))?;
        Ok(())
    }

    /// Remove every matching document and return how many matched.
    pub fn delete_matching(&self, query: &str, params: &[Value]) -> DbResult<u64> {
        let filter = filterql_core::filter_document(query, params)?;
        let collection = self.collection()?;
        let matched = collection.count(Some(&filter))?;
        collection.remove(&filter)?;
        Ok(matched)
    }

    /// Drop the collection and return how many documents it held.
    pub fn delete_all(&self) -> DbResult<u64> {
        let collection = self.collection()?;
        let count = collection.count(None)?;
        collection.drop_collection()?;
        Ok(count)
    }

    /// Create an index from a key list such as `byLastNameAnd-Age`.
    pub fn create_index(&self, keys: &str) -> DbResult<String> {
        let keys = filterql_core::order_document(keys)?;
        self.collection()?.create_index(&keys)
    }

    pub fn drop_index(&self, keys: &str) -> DbResult<()> {
        let keys = filterql_core::order_document(keys)?;
        self.collection()?.drop_index(&keys)
    }

    pub fn drop_indexes(&self) -> DbResult<()> {
        self.collection()?.drop_indexes()
    }

    pub fn index_names(&self) -> DbResult<Vec<String>> {
        self.collection()?.index_names()
    }
}
