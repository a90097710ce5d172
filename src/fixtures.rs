//! Test data helpers: loading documents from JSON files and tearing
//! collections down between tests.
//!
//! Teardown never fails: a collection that cannot be dropped is logged and
//! skipped so the remaining ones are still cleaned up.

use std::path::Path;

use serde_json::Value;

use crate::entity::Entity;
use crate::error::{DbError, DbResult};
use crate::storage::CollectionAccessor;

/// Drop each named collection.
pub fn delete_collections(accessor: &dyn CollectionAccessor, names: &[&str]) {
    for name in names {
        let dropped = accessor
            .collection(name)
            .and_then(|collection| collection.drop_collection());
        if let Err(e) = dropped {
            tracing::error!("Unable to delete collection '{}': {}", name, e);
        }
    }
}

/// Drop the collection of `T`.
pub fn delete_entities<T: Entity>(accessor: &dyn CollectionAccessor) {
    delete_collections(accessor, &[T::collection_name().as_str()]);
}

/// Drop every collection in the store.
pub fn delete_database(accessor: &dyn CollectionAccessor) {
    if let Err(e) = accessor.drop_database() {
        tracing::error!("Unable to delete database: {}", e);
    }
}

/// Load a `{"collection": [documents...]}` file. Returns the number of
/// inserted documents.
pub fn load_json(accessor: &dyn CollectionAccessor, path: &Path) -> DbResult<usize> {
    let content = std::fs::read_to_string(path)?;
    let inserted = load_json_str(accessor, &content)?;
    tracing::info!("Loaded {} documents from {}", inserted, path.display());
    Ok(inserted)
}

pub fn load_json_str(accessor: &dyn CollectionAccessor, content: &str) -> DbResult<usize> {
    let fixtures: Value = serde_json::from_str(content)?;
    let Value::Object(collections) = fixtures else {
        return Err(DbError::InvalidDocument(
            "Fixture file must map collection names to document arrays".to_string(),
        ));
    };

    let mut inserted = 0;
    for (name, documents) in collections {
        let Value::Array(documents) = documents else {
            return Err(DbError::InvalidDocument(format!(
                "Fixtures for '{}' must be an array",
                name
            )));
        };
        let collection = accessor.collection(&name)?;
        for document in documents {
            collection.insert(document)?;
            inserted += 1;
        }
    }
    Ok(inserted)
}
