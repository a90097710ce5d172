pub mod config;
pub mod connection;
pub mod cursor;
pub mod entity;
pub mod error;
pub mod fixtures;
pub mod logging;
pub mod repository;
pub mod storage;

pub use config::StoreConfig;
pub use connection::ConnectionHandle;
pub use cursor::Cursor;
pub use entity::Entity;
pub use error::{DbError, DbResult};
pub use filterql_core::{filter_document, order_document, QueryError, QueryErrorKind};
pub use repository::Repository;
pub use storage::{Collection, CollectionAccessor, FindOptions, MemoryStore};
