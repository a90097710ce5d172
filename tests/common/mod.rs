//! Common test utilities
//!
//! Provides shared helpers for:
//! - The entity type used across the integration tests
//! - A store seeded with the seven reference records
//! - Running queries and collecting a single field of the results

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use filterql::storage::CollectionAccessor;
use filterql::{Entity, MemoryStore, Repository};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestEntity {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub test_bool: Option<bool>,
    pub test_int: Option<i64>,
    pub test_str: Option<String>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub test_date: Option<DateTime<Utc>>,
}

impl Entity for TestEntity {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

impl TestEntity {
    pub fn new(
        test_bool: Option<bool>,
        test_int: Option<i64>,
        test_str: Option<&str>,
        test_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: None,
            test_bool,
            test_int,
            test_str: test_str.map(str::to_string),
            test_date,
        }
    }
}

/// Timestamp `ms` milliseconds after the epoch.
pub fn date(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).expect("timestamp in range")
}

/// A date as it appears in stored documents and query parameters.
pub fn date_param(ms: i64) -> Value {
    Value::from(date(ms).timestamp_millis())
}

pub fn create_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

pub fn repository(store: &Arc<MemoryStore>) -> Repository<TestEntity> {
    Repository::new(store.clone() as Arc<dyn CollectionAccessor>)
}

/// The seven reference records, saved in order through the repository.
pub fn create_seeded_store() -> (Arc<MemoryStore>, Repository<TestEntity>) {
    let store = create_store();
    let repo = repository(&store);
    repo.delete_all().expect("Failed to clear collection");

    let records = vec![
        TestEntity::new(Some(true), Some(1), Some("un"), None),
        TestEntity::new(Some(false), Some(2), Some("deux"), None),
        TestEntity::new(None, Some(3), Some("trois"), None),
        TestEntity::new(Some(true), None, Some("quatre"), None),
        TestEntity::new(Some(true), Some(5), None, None),
        TestEntity::new(Some(true), Some(6), Some("six"), Some(date(0))),
        TestEntity::new(Some(true), Some(7), Some("sept"), Some(date(1))),
    ];
    for mut record in records {
        repo.save(&mut record).expect("Failed to save record");
    }

    (store, repo)
}

pub fn find(repo: &Repository<TestEntity>, query: &str, params: &[Value]) -> Vec<TestEntity> {
    repo.find(query, params)
        .unwrap_or_else(|e| panic!("Failed to translate {}: {}", query, e))
        .fetch()
        .unwrap_or_else(|e| panic!("Failed to fetch {}: {}", query, e))
}

pub fn find_ids(repo: &Repository<TestEntity>, query: &str, params: &[Value]) -> Vec<String> {
    find(repo, query, params)
        .into_iter()
        .filter_map(|e| e.id)
        .collect()
}

pub fn all_ids(repo: &Repository<TestEntity>) -> Vec<String> {
    repo.find_all()
        .and_then(|cursor| cursor.fetch())
        .expect("Failed to fetch all")
        .into_iter()
        .filter_map(|e| e.id)
        .collect()
}
