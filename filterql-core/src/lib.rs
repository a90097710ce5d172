//! filterql core - Storage-independent translation of JPA-style queries into
//! document-store filter documents.
//!
//! This crate holds everything that does not need a store: the query parser,
//! the document renderer, the key-list syntax used for ordering and shorthand
//! lookups, and an evaluator for the produced filter documents.
//!
//! # Main Components
//!
//! - **Parser**: Parses query strings such as `name = ?1 and (age > 18 or admin = 'yes')`
//!   into an expression tree
//! - **Render**: Turns the tree into `{"$and": [...]}` style filter documents
//! - **Keys**: `byLastNameAnd-Age` key lists for order documents and shorthand queries
//! - **Matcher**: Evaluates filter documents against JSON documents
//!
//! # Example
//!
//! ```rust
//! use filterql_core::{filter_document, matches, order_document};
//! use serde_json::json;
//!
//! let filter = filter_document("name like 'Al%' and age >= ?1", &[json!(18)]).unwrap();
//! assert_eq!(
//!     filter,
//!     json!({"$and": [{"name": {"$regex": "^Al.*"}}, {"age": {"$gte": 18}}]})
//! );
//! assert!(matches(&filter, &json!({"name": "Alice", "age": 30})).unwrap());
//!
//! let order = order_document("byAgeAnd-Name").unwrap();
//! assert_eq!(order, json!({"age": 1, "name": -1}));
//! ```

pub mod ast;
pub mod error;
pub mod keys;
pub mod matcher;
pub mod operator;
pub mod parser;
pub mod pattern;
pub mod render;
pub mod scanner;
pub mod translate;
pub mod value;

// Re-export main types for convenience
pub use ast::{Condition, FilterExpr, Logic, Predicate};
pub use error::{Position, QueryError, QueryErrorKind, QueryResult};
pub use keys::{extract_keys, shorthand_document};
pub use matcher::{compare_values, get_field_value, matches, values_equal};
pub use parser::{Parser, MAX_DEPTH};
pub use pattern::like_to_regex;
pub use render::render;
pub use translate::{
    filter_document, is_shorthand, order_document, parse_filter, SHORTHAND_PREFIX,
};
