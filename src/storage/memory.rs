//! In-memory document store.
//!
//! Collections spring into existence on first write and disappear when
//! dropped, like in the real store. Documents keep insertion order, which is
//! the natural order of unsorted finds.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use filterql_core::{compare_values, get_field_value, matches};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{index_name, Collection, CollectionAccessor, FindOptions, ID_INDEX};
use crate::error::{DbError, DbResult};

#[derive(Debug, Default)]
struct CollectionData {
    documents: Vec<Value>,
    /// Secondary indexes as (name, key document), creation order
    indexes: Vec<(String, Value)>,
}

type Collections = Arc<RwLock<HashMap<String, CollectionData>>>;

/// Thread-safe in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Collections,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with `documents` already inserted into `collection`.
    pub fn with_documents(collection: &str, documents: Vec<Value>) -> DbResult<Self> {
        let store = Self::new();
        let handle = store.memory_collection(collection);
        for document in documents {
            handle.insert(document)?;
        }
        Ok(store)
    }

    pub fn memory_collection(&self, name: &str) -> MemoryCollection {
        MemoryCollection {
            name: name.to_string(),
            collections: self.collections.clone(),
        }
    }
}

impl CollectionAccessor for MemoryStore {
    fn collection(&self, name: &str) -> DbResult<Arc<dyn Collection>> {
        if name.is_empty() || name.contains('$') {
            return Err(DbError::InvalidDocument(format!(
                "Invalid collection name '{}'",
                name
            )));
        }
        Ok(Arc::new(self.memory_collection(name)))
    }

    fn collection_names(&self) -> DbResult<Vec<String>> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn drop_database(&self) -> DbResult<()> {
        self.collections.write().clear();
        tracing::debug!("Dropped all in-memory collections");
        Ok(())
    }
}

/// Handle on one collection of a [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryCollection {
    name: String,
    collections: Collections,
}

impl MemoryCollection {
    fn select(&self, filter: Option<&Value>) -> DbResult<Vec<Value>> {
        let collections = self.collections.read();
        let Some(data) = collections.get(&self.name) else {
            return Ok(Vec::new());
        };

        let mut selected = Vec::new();
        for document in &data.documents {
            if is_match(filter, document)? {
                selected.push(document.clone());
            }
        }
        Ok(selected)
    }
}

fn is_match(filter: Option<&Value>, document: &Value) -> DbResult<bool> {
    match filter {
        Some(filter) => Ok(matches(filter, document)?),
        None => Ok(true),
    }
}

impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn count(&self, filter: Option<&Value>) -> DbResult<u64> {
        Ok(self.select(filter)?.len() as u64)
    }

    fn find(&self, filter: Option<&Value>, options: &FindOptions) -> DbResult<Vec<Value>> {
        let mut documents = self.select(filter)?;

        if let Some(sort) = &options.sort {
            let order = sort_fields(sort)?;
            // stable, so ties keep insertion order
            documents.sort_by(|a, b| compare_documents(a, b, &order));
        }

        let documents = documents.into_iter().skip(options.skip);
        Ok(match options.limit {
            Some(limit) => documents.take(limit).collect(),
            None => documents.collect(),
        })
    }

    fn insert(&self, mut document: Value) -> DbResult<Value> {
        let Some(fields) = document.as_object_mut() else {
            return Err(DbError::InvalidDocument(
                "Document must be a JSON object".to_string(),
            ));
        };
        let id = match fields.get("_id") {
            Some(id) if !id.is_null() => id.clone(),
            _ => {
                let key = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext)).to_string();
                let id = Value::String(key);
                fields.insert("_id".to_string(), id.clone());
                id
            }
        };

        let mut collections = self.collections.write();
        let data = collections.entry(self.name.clone()).or_default();
        if data.documents.iter().any(|d| d.get("_id") == Some(&id)) {
            return Err(DbError::InvalidDocument(format!(
                "Duplicate _id {} in collection '{}'",
                id, self.name
            )));
        }
        data.documents.push(document);
        Ok(id)
    }

    fn update(&self, filter: &Value, mut document: Value) -> DbResult<u64> {
        let Some(fields) = document.as_object_mut() else {
            return Err(DbError::InvalidDocument(
                "Document must be a JSON object".to_string(),
            ));
        };

        let mut collections = self.collections.write();
        let Some(data) = collections.get_mut(&self.name) else {
            return Ok(0);
        };

        for existing in data.documents.iter_mut() {
            if matches(filter, existing)? {
                let id = existing.get("_id").cloned().unwrap_or(Value::Null);
                let mut replacement = Map::with_capacity(fields.len() + 1);
                replacement.insert("_id".to_string(), id);
                for (key, value) in std::mem::take(fields) {
                    if key != "_id" {
                        replacement.insert(key, value);
                    }
                }
                *existing = Value::Object(replacement);
                return Ok(1);
            }
        }
        Ok(0)
    }

    fn remove(&self, filter: &Value) -> DbResult<u64> {
        let mut collections = self.collections.write();
        let Some(data) = collections.get_mut(&self.name) else {
            return Ok(0);
        };

        // evaluate every document before touching the collection
        let selected = data
            .documents
            .iter()
            .map(|document| matches(filter, document))
            .collect::<Result<Vec<bool>, _>>()?;

        let mut selected = selected.into_iter();
        let before = data.documents.len();
        data.documents.retain(|_| !selected.next().unwrap_or(false));
        Ok((before - data.documents.len()) as u64)
    }

    fn drop_collection(&self) -> DbResult<()> {
        self.collections.write().remove(&self.name);
        tracing::debug!("Dropped collection '{}'", self.name);
        Ok(())
    }

    fn create_index(&self, keys: &Value) -> DbResult<String> {
        sort_fields(keys)?;
        let name = index_name(keys);

        let mut collections = self.collections.write();
        let data = collections.entry(self.name.clone()).or_default();
        if !data.indexes.iter().any(|(existing, _)| *existing == name) {
            data.indexes.push((name.clone(), keys.clone()));
        }
        Ok(name)
    }

    fn drop_index(&self, keys: &Value) -> DbResult<()> {
        let name = index_name(keys);
        let mut collections = self.collections.write();
        let position = collections
            .get(&self.name)
            .and_then(|data| data.indexes.iter().position(|(existing, _)| *existing == name));

        match (collections.get_mut(&self.name), position) {
            (Some(data), Some(position)) => {
                data.indexes.remove(position);
                Ok(())
            }
            _ => Err(DbError::IndexNotFound(name)),
        }
    }

    fn drop_indexes(&self) -> DbResult<()> {
        if let Some(data) = self.collections.write().get_mut(&self.name) {
            data.indexes.clear();
        }
        Ok(())
    }

    fn index_names(&self) -> DbResult<Vec<String>> {
        let collections = self.collections.read();
        let Some(data) = collections.get(&self.name) else {
            return Ok(Vec::new());
        };

        let mut names = vec![ID_INDEX.to_string()];
        names.extend(data.indexes.iter().map(|(name, _)| name.clone()));
        Ok(names)
    }
}

/// Validate an order document into (field, descending) pairs.
fn sort_fields(order: &Value) -> DbResult<Vec<(String, bool)>> {
    let Some(fields) = order.as_object().filter(|f| !f.is_empty()) else {
        return Err(DbError::InvalidDocument(format!(
            "Order document must be a non-empty object, got {}",
            order
        )));
    };

    fields
        .iter()
        .map(|(field, direction)| match direction.as_i64() {
            Some(1) => Ok((field.clone(), false)),
            Some(-1) => Ok((field.clone(), true)),
            _ => Err(DbError::InvalidDocument(format!(
                "Direction of '{}' must be 1 or -1, got {}",
                field, direction
            ))),
        })
        .collect()
}

fn compare_documents(a: &Value, b: &Value, order: &[(String, bool)]) -> Ordering {
    for (field, descending) in order {
        let ordering = compare_sort_values(get_field_value(a, field), get_field_value(b, field));
        let ordering = if *descending { ordering.reverse() } else { ordering };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Missing and null sort first, then numbers, strings, objects, arrays and
/// booleans.
fn compare_sort_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let (a, b) = (a.unwrap_or(&Value::Null), b.unwrap_or(&Value::Null));
    type_rank(a)
        .cmp(&type_rank(b))
        .then_with(|| compare_values(a, b).unwrap_or(Ordering::Equal))
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 5,
    }
}
