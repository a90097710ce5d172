//! Rendering of expression trees into filter documents.
//!
//! | predicate      | document                                   |
//! |----------------|--------------------------------------------|
//! | `Eq(v)`        | `{field: v}`                               |
//! | `Ne(v)`        | `{field: {"$ne": v}}`                      |
//! | `Gt(v)` ...    | `{field: {"$gt": v}}` ...                  |
//! | `Like(p)`      | `{field: {"$regex": re(p)}}`               |
//! | `NotLike(p)`   | `{field: {"$not": {"$regex": re(p)}}}`     |
//! | `In(l)`        | `{field: {"$in": l}}`                      |
//! | `NotIn(l)`     | `{field: {"$nin": l}}`                     |
//! | `IsNull`       | `{field: null}`                            |
//! | `IsNotNull`    | `{field: {"$ne": null}}`                   |
//!
//! Groups render as `{"$and": [...]}` / `{"$or": [...]}`.

use serde_json::{json, Map, Value};

use crate::ast::{Condition, FilterExpr, Logic, Predicate};
use crate::pattern::like_to_regex;

pub fn render(expr: &FilterExpr) -> Value {
    match expr {
        FilterExpr::Condition(condition) => render_condition(condition),
        FilterExpr::And(children) => render_group(Logic::And, children),
        FilterExpr::Or(children) => render_group(Logic::Or, children),
    }
}

fn render_group(logic: Logic, children: &[FilterExpr]) -> Value {
    let fragments: Vec<Value> = children.iter().map(render).collect();
    single_key(logic.tag(), Value::Array(fragments))
}

pub fn render_condition(condition: &Condition) -> Value {
    let clause = match &condition.predicate {
        Predicate::Eq(value) => equality_clause(value),
        Predicate::Ne(value) => json!({ "$ne": value }),
        Predicate::Gt(value) => json!({ "$gt": value }),
        Predicate::Gte(value) => json!({ "$gte": value }),
        Predicate::Lt(value) => json!({ "$lt": value }),
        Predicate::Lte(value) => json!({ "$lte": value }),
        Predicate::Like(pattern) => json!({ "$regex": like_to_regex(pattern) }),
        Predicate::NotLike(pattern) => json!({ "$not": { "$regex": like_to_regex(pattern) } }),
        Predicate::In(list) => json!({ "$in": list }),
        Predicate::NotIn(list) => json!({ "$nin": list }),
        Predicate::IsNull => Value::Null,
        Predicate::IsNotNull => json!({ "$ne": null }),
    };
    single_key(&condition.field, clause)
}

/// A bound object whose keys look like operators would be read by the store as
/// an operator document, so it is compared through `$eq` instead.
fn equality_clause(value: &Value) -> Value {
    match value {
        Value::Object(map) if map.keys().any(|k| k.starts_with('$')) => json!({ "$eq": value }),
        _ => value.clone(),
    }
}

fn single_key(key: &str, value: Value) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(key.to_string(), value);
    Value::Object(map)
}
