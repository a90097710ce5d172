//! Evaluation of filter documents against JSON documents.
//!
//! Follows the store's query semantics for the operators the translator emits:
//! - `{f: null}` matches a missing or null field, `$ne` is its exact complement
//! - relational operators only compare numbers, strings or booleans with each other
//! - `$nin` and `$not` match documents missing the field
//! - a field holding an array matches equality and membership on any element

use std::cmp::Ordering;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{Position, QueryError, QueryResult};

/// Check whether `document` satisfies `filter`. Top-level keys are ANDed.
pub fn matches(filter: &Value, document: &Value) -> QueryResult<bool> {
    let Value::Object(clauses) = filter else {
        return Err(unsupported(filter, filter));
    };

    for (key, clause) in clauses {
        let satisfied = match key.as_str() {
            "$and" => all_of(filter, clause, document)?,
            "$or" => any_of(filter, clause, document)?,
            k if k.starts_with('$') => return Err(unsupported(&Value::from(k), filter)),
            field => match_clause(filter, get_field_value(document, field), clause)?,
        };
        if !satisfied {
            return Ok(false);
        }
    }
    Ok(true)
}

fn all_of(filter: &Value, clause: &Value, document: &Value) -> QueryResult<bool> {
    let Value::Array(subs) = clause else {
        return Err(unsupported(clause, filter));
    };
    for sub in subs {
        if !matches(sub, document)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn any_of(filter: &Value, clause: &Value, document: &Value) -> QueryResult<bool> {
    let Value::Array(subs) = clause else {
        return Err(unsupported(clause, filter));
    };
    for sub in subs {
        if matches(sub, document)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Navigate a dot-separated path. `None` when any segment is missing.
pub fn get_field_value<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = document;
    for part in path.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn is_operator_document(clause: &Value) -> Option<&Map<String, Value>> {
    match clause {
        Value::Object(map) if !map.is_empty() && map.keys().all(|k| k.starts_with('$')) => {
            Some(map)
        }
        _ => None,
    }
}

fn match_clause(filter: &Value, field: Option<&Value>, clause: &Value) -> QueryResult<bool> {
    match is_operator_document(clause) {
        Some(operators) => match_operators(filter, field, operators),
        None => Ok(field_equals(field, clause)),
    }
}

fn match_operators(
    filter: &Value,
    field: Option<&Value>,
    operators: &Map<String, Value>,
) -> QueryResult<bool> {
    for (op, arg) in operators {
        let satisfied = match op.as_str() {
            "$eq" => field_equals(field, arg),
            "$ne" => !field_equals(field, arg),
            "$gt" => compare(field, arg, |o| o == Ordering::Greater),
            "$gte" => compare(field, arg, |o| o != Ordering::Less),
            "$lt" => compare(field, arg, |o| o == Ordering::Less),
            "$lte" => compare(field, arg, |o| o != Ordering::Greater),
            "$in" => member_of(filter, field, arg)?,
            "$nin" => !member_of(filter, field, arg)?,
            "$regex" => regex_matches(filter, field, arg)?,
            "$not" => match arg {
                Value::String(_) => !regex_matches(filter, field, arg)?,
                _ => match is_operator_document(arg) {
                    Some(inner) => !match_operators(filter, field, inner)?,
                    None => return Err(unsupported(arg, filter)),
                },
            },
            other => return Err(unsupported(&Value::from(other), filter)),
        };
        if !satisfied {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Equality with null matching missing fields and array fields matching on
/// any element.
fn field_equals(field: Option<&Value>, expected: &Value) -> bool {
    match field {
        None | Some(Value::Null) => expected.is_null(),
        Some(Value::Array(items)) if !expected.is_array() => {
            items.iter().any(|item| values_equal(item, expected))
        }
        Some(actual) => values_equal(actual, expected),
    }
}

fn member_of(filter: &Value, field: Option<&Value>, list: &Value) -> QueryResult<bool> {
    let Value::Array(candidates) = list else {
        return Err(unsupported(list, filter));
    };
    Ok(candidates.iter().any(|candidate| field_equals(field, candidate)))
}

fn compare(field: Option<&Value>, bound: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    let check = |value: &Value| compare_values(value, bound).is_some_and(&accept);
    match field {
        Some(Value::Array(items)) => items.iter().any(check),
        Some(value) => check(value),
        None => false,
    }
}

fn regex_matches(filter: &Value, field: Option<&Value>, pattern: &Value) -> QueryResult<bool> {
    let Value::String(pattern) = pattern else {
        return Err(unsupported(pattern, filter));
    };
    let regex = safe_regex(pattern)?;
    Ok(match field {
        Some(Value::String(s)) => regex.is_match(s),
        Some(Value::Array(items)) => items
            .iter()
            .any(|item| item.as_str().is_some_and(|s| regex.is_match(s))),
        _ => false,
    })
}

/// Compile a pattern with a length cap against pathological expressions.
pub fn safe_regex(pattern: &str) -> QueryResult<Regex> {
    if pattern.len() > 1000 {
        return Err(QueryError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: "Pattern too long (max 1000 chars)".to_string(),
        });
    }
    Regex::new(pattern).map_err(|e| QueryError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Compare two JSON values for equality. Numbers compare by their f64 value.
#[inline]
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        _ => left == right,
    }
}

/// Order two values of the same kind. `None` for values that do not compare.
#[inline]
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn unsupported(offending: &Value, filter: &Value) -> QueryError {
    QueryError::UnsupportedOperator {
        at: Position::new(&offending.to_string(), &filter.to_string()),
    }
}
