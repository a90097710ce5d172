//! Repository and cursor tests
//!
//! Covers saving, lookup by id, deletion, index management and the cursor
//! modifiers (ordering, skip, limit, first, count).

mod common;

use common::{create_seeded_store, create_store, date, repository, TestEntity};
use filterql::storage::CollectionAccessor;
use filterql::{ConnectionHandle, DbError, MemoryStore, QueryErrorKind, Repository, StoreConfig};
use serde_json::json;
use std::sync::Arc;

// ============================================================================
// Save and lookup
// ============================================================================

#[test]
fn test_save_assigns_id() {
    let store = create_store();
    let repo = repository(&store);

    let mut entity = TestEntity::new(Some(true), Some(42), Some("answer"), Some(date(5)));
    assert!(entity.id.is_none());
    repo.save(&mut entity).unwrap();

    let id = entity.id.clone().expect("id assigned on insert");
    let found = repo.find_by_id(&id).unwrap().expect("saved entity found");
    assert_eq!(found, entity);
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn test_save_existing_replaces_document() {
    let store = create_store();
    let repo = repository(&store);

    let mut entity = TestEntity::new(Some(true), Some(1), Some("un"), None);
    repo.save(&mut entity).unwrap();
    let id = entity.id.clone().unwrap();

    entity.test_str = Some("one".to_string());
    entity.test_int = None;
    repo.save(&mut entity).unwrap();

    assert_eq!(repo.count().unwrap(), 1);
    assert_eq!(entity.id.as_deref(), Some(id.as_str()));
    let found = repo.find_by_id(&id).unwrap().unwrap();
    assert_eq!(found.test_str.as_deref(), Some("one"));
    assert_eq!(found.test_int, None);
}

#[test]
fn test_save_with_unknown_id_fails() {
    let store = create_store();
    let repo = repository(&store);

    let mut entity = TestEntity::new(Some(true), Some(1), Some("un"), None);
    entity.id = Some("never-stored".to_string());
    assert!(matches!(
        repo.save(&mut entity),
        Err(DbError::DocumentNotFound(_))
    ));
}

#[test]
fn test_find_by_id_missing() {
    let (_store, repo) = create_seeded_store();
    assert!(repo.find_by_id("no-such-id").unwrap().is_none());
}

#[test]
fn test_collection_name_from_type() {
    let store = create_store();
    let repo = repository(&store);
    assert_eq!(repo.collection_name(), "TestEntity");

    let mut entity = TestEntity::default();
    repo.save(&mut entity).unwrap();
    assert_eq!(store.collection_names().unwrap(), vec!["TestEntity"]);
}

// ============================================================================
// Deletion
// ============================================================================

#[test]
fn test_delete_entity() {
    let (_store, repo) = create_seeded_store();
    let first = repo
        .find("testStr = 'un'", &[])
        .unwrap()
        .first()
        .unwrap()
        .unwrap();

    repo.delete(&first).unwrap();
    assert_eq!(repo.count().unwrap(), 6);
    assert!(repo.find_by_id(first.id.as_deref().unwrap()).unwrap().is_none());
}

#[test]
fn test_delete_unsaved_entity_fails() {
    let (_store, repo) = create_seeded_store();
    assert!(matches!(
        repo.delete(&TestEntity::default()),
        Err(DbError::InvalidDocument(_))
    ));
}

#[test]
fn test_delete_matching() {
    let (_store, repo) = create_seeded_store();
    assert_eq!(repo.delete_matching("testInt >= 5", &[]).unwrap(), 3);
    assert_eq!(repo.count().unwrap(), 4);
    assert_eq!(repo.delete_matching("testInt >= 5", &[]).unwrap(), 0);
}

#[test]
fn test_delete_matching_rejects_bad_query_without_deleting() {
    let (_store, repo) = create_seeded_store();
    let err = repo.delete_matching("testInt >= 5 and", &[]).unwrap_err();
    match err {
        DbError::Query(e) => assert_eq!(e.kind(), QueryErrorKind::ExpectedCondition),
        other => panic!("Expected a query error, got {}", other),
    }
    assert_eq!(repo.count().unwrap(), 7);
}

#[test]
fn test_delete_all() {
    let (store, repo) = create_seeded_store();
    repo.create_index("byTestInt").unwrap();

    assert_eq!(repo.delete_all().unwrap(), 7);
    assert_eq!(repo.count().unwrap(), 0);
    assert!(store.collection_names().unwrap().is_empty());
    assert!(repo.index_names().unwrap().is_empty());
}

// ============================================================================
// Indexes
// ============================================================================

#[test]
fn test_index_management() {
    let (_store, repo) = create_seeded_store();
    assert_eq!(repo.index_names().unwrap(), vec!["_id_"]);

    assert_eq!(repo.create_index("byTestStrAnd-TestInt").unwrap(), "testStr_1_testInt_-1");
    assert_eq!(repo.create_index("byTestDate").unwrap(), "testDate_1");
    assert_eq!(
        repo.index_names().unwrap(),
        vec!["_id_", "testStr_1_testInt_-1", "testDate_1"]
    );

    repo.drop_index("byTestDate").unwrap();
    assert_eq!(repo.index_names().unwrap(), vec!["_id_", "testStr_1_testInt_-1"]);
    assert!(matches!(
        repo.drop_index("byTestDate"),
        Err(DbError::IndexNotFound(_))
    ));

    repo.drop_indexes().unwrap();
    assert_eq!(repo.index_names().unwrap(), vec!["_id_"]);
}

#[test]
fn test_index_keys_must_be_well_formed() {
    let (_store, repo) = create_seeded_store();
    match repo.create_index("b").unwrap_err() {
        DbError::Query(e) => assert_eq!(e.kind(), QueryErrorKind::MalformedKeyList),
        other => panic!("Expected a query error, got {}", other),
    }
}

// ============================================================================
// Cursor
// ============================================================================

#[test]
fn test_cursor_order_by() {
    let (_store, repo) = create_seeded_store();

    let found = repo
        .find("testInt is not null", &[])
        .unwrap()
        .order_by("by-TestInt")
        .unwrap()
        .fetch()
        .unwrap();
    let ints: Vec<i64> = found.iter().filter_map(|e| e.test_int).collect();
    assert_eq!(ints, vec![7, 6, 5, 3, 2, 1]);

    let found = repo
        .find_all()
        .unwrap()
        .order_by("byTestBoolAndTestStr")
        .unwrap()
        .fetch()
        .unwrap();
    let strs: Vec<Option<&str>> = found.iter().map(|e| e.test_str.as_deref()).collect();
    // null bool first, then false, then true sorted by string with null first
    assert_eq!(
        strs,
        vec![
            Some("trois"),
            Some("deux"),
            None,
            Some("quatre"),
            Some("sept"),
            Some("six"),
            Some("un"),
        ]
    );
}

#[test]
fn test_cursor_skip_limit_first_count() {
    let (_store, repo) = create_seeded_store();

    let cursor = repo
        .find("testBool = ?1", &[json!(true)])
        .unwrap()
        .order_by("byTestInt")
        .unwrap()
        .skip(1)
        .limit(2);
    let ints: Vec<Option<i64>> = cursor.fetch().unwrap().iter().map(|e| e.test_int).collect();
    assert_eq!(ints, vec![Some(1), Some(5)]);

    assert_eq!(cursor.count().unwrap(), 5);
    assert_eq!(cursor.first().unwrap().unwrap().test_int, Some(1));
    assert_eq!(cursor.filter(), Some(&json!({"testBool": true})));
}

#[test]
fn test_cursor_first_on_empty_result() {
    let (_store, repo) = create_seeded_store();
    let cursor = repo.find("testInt > 100", &[]).unwrap();
    assert!(cursor.first().unwrap().is_none());
    assert_eq!(cursor.count().unwrap(), 0);
}

#[test]
fn test_cursor_fetch_documents() {
    let (_store, repo) = create_seeded_store();
    let documents = repo
        .find("testStr = 'six'", &[])
        .unwrap()
        .fetch_documents()
        .unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["testDate"], json!(0));
    assert!(documents[0]["_id"].is_string());
}

#[test]
fn test_find_by_filter_document() {
    let (_store, repo) = create_seeded_store();
    let found = repo
        .find_by_filter(json!({"testInt": {"$in": [6, 7]}}))
        .unwrap()
        .fetch()
        .unwrap();
    assert_eq!(found.len(), 2);
}

// ============================================================================
// Connection handle
// ============================================================================

#[test]
fn test_repository_from_handle() {
    let store = Arc::new(MemoryStore::new());
    let shared = store.clone();
    let handle = ConnectionHandle::with_config(StoreConfig::default(), move |_| {
        Ok(shared.clone() as Arc<dyn CollectionAccessor>)
    });

    let repo: Repository<TestEntity> = Repository::from_handle(&handle).unwrap();
    let mut entity = TestEntity::new(None, Some(9), None, None);
    repo.save(&mut entity).unwrap();

    assert!(handle.is_connected());
    assert_eq!(store.collection("TestEntity").unwrap().count(None).unwrap(), 1);
}
