//! Key-list syntax shared by order strings and shorthand queries.
//!
//! A key list starts with a two-character marker (`by` by convention, not
//! checked) followed by field names joined with the case-sensitive connective
//! `And`: `byLastNameAnd-Age`. Each name gets its first letter lower-cased to
//! match the field casing of stored documents; a leading `-` marks descending
//! order and is kept in front of the name.

use serde_json::{Map, Value};

use crate::error::{QueryError, QueryResult};

/// Length of the marker preceding the first key.
pub const KEY_LIST_PREFIX_LEN: usize = 2;

const KEY_SEPARATOR: &str = "And";

/// Split a key list into field names, descending marks included.
pub fn extract_keys(input: &str) -> QueryResult<Vec<String>> {
    let Some(list) = input.get(KEY_LIST_PREFIX_LEN..) else {
        return Err(QueryError::MalformedKeyList {
            input: input.to_string(),
            reason: "shorter than the two-character prefix",
        });
    };

    let mut parts: Vec<&str> = list.split(KEY_SEPARATOR).collect();
    // a trailing connective adds nothing
    while parts.len() > 1 && parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }

    parts
        .into_iter()
        .map(|part| {
            let (descending, name) = match part.strip_prefix('-') {
                Some(name) => (true, name),
                None => (false, part),
            };
            let mut chars = name.chars();
            let Some(first) = chars.next() else {
                return Err(QueryError::MalformedKeyList {
                    input: input.to_string(),
                    reason: "empty key",
                });
            };

            let mut key = String::with_capacity(part.len());
            if descending {
                key.push('-');
            }
            key.extend(first.to_lowercase());
            key.push_str(chars.as_str());
            Ok(key)
        })
        .collect()
}

/// Build an order document (`field -> 1 | -1`) from a key list.
pub fn order_document(input: &str) -> QueryResult<Value> {
    let mut order = Map::new();
    for key in extract_keys(input)? {
        let (field, direction) = match key.strip_prefix('-') {
            Some(field) => (field.trim().to_string(), -1),
            None => (key.trim().to_string(), 1),
        };
        order.insert(field, Value::from(direction));
    }
    Ok(Value::Object(order))
}

/// Build an equality document pairing each key with the value at the same
/// position. Extra values are ignored.
pub fn shorthand_document(input: &str, values: &[Value]) -> QueryResult<Value> {
    let keys = extract_keys(input)?;
    if keys.len() > values.len() {
        return Err(QueryError::InsufficientValues {
            keys: keys.len(),
            values: values.len(),
        });
    }

    let filter = keys
        .into_iter()
        .zip(values)
        .map(|(key, value)| (key.trim().to_string(), value.clone()))
        .collect::<Map<String, Value>>();
    Ok(Value::Object(filter))
}
