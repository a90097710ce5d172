//! Value literal readers.
//!
//! - `?N`: 1-based positional parameter, terminated by a space or `)`
//! - `'...'`: single-quoted string, terminated by the first quote not preceded by `\`
//! - `(...)`: list of strings and numerals separated by commas and/or spaces
//! - anything else: a numeral read as `f64`

use serde_json::{Number, Value};

use crate::error::{QueryError, QueryResult};
use crate::scanner::Scanner;

/// Read the value operand of a condition.
pub fn read_value(scanner: &mut Scanner<'_>, params: &[Value]) -> QueryResult<Value> {
    match scanner.current() {
        Some(b'?') => read_parameter(scanner, params),
        Some(b'(') => read_list(scanner),
        Some(b'\'') => read_string(scanner).map(Value::String),
        _ => read_number(scanner, b" )"),
    }
}

/// Resolve a `?N` reference against the caller's parameters.
pub fn read_parameter(scanner: &mut Scanner<'_>, params: &[Value]) -> QueryResult<Value> {
    let at = scanner.position();
    scanner.advance(1);

    let digits = scanner.take_until(b" )");
    let index: usize = digits
        .parse()
        .map_err(|_| QueryError::MalformedParameter { at: at.clone() })?;

    if index == 0 || index > params.len() {
        return Err(QueryError::ParameterOutOfRange {
            index,
            available: params.len(),
            at,
        });
    }

    Ok(params[index - 1].clone())
}

/// Read a single-quoted string. A backslash keeps the following quote from
/// closing the literal and is itself kept in the value.
pub fn read_string(scanner: &mut Scanner<'_>) -> QueryResult<String> {
    let at = scanner.position();
    scanner.advance(1); // opening quote

    let rest = scanner.remainder();
    let mut value = String::new();
    let mut previous = None;

    for (offset, ch) in rest.char_indices() {
        if ch == '\'' && previous != Some('\\') {
            scanner.advance(offset + 1);
            return Ok(value);
        }
        value.push(ch);
        previous = Some(ch);
    }

    Err(QueryError::UnterminatedString { at })
}

/// Read a numeral up to the first terminator byte.
pub fn read_number(scanner: &mut Scanner<'_>, terminators: &[u8]) -> QueryResult<Value> {
    let at = scanner.position();
    let text = scanner.take_until(terminators);

    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or(QueryError::MalformedNumber { at })
}

/// Read a parenthesized list of string and numeric literals.
pub fn read_list(scanner: &mut Scanner<'_>) -> QueryResult<Value> {
    let at = scanner.position();
    scanner.advance(1); // (

    let mut items = Vec::new();
    loop {
        match scanner.current() {
            None => return Err(QueryError::UnbalancedParentheses { at }),
            Some(b')') => {
                scanner.advance(1);
                break;
            }
            Some(b',') | Some(b' ') => scanner.advance(1),
            Some(b'\'') => items.push(Value::String(read_string(scanner)?)),
            Some(_) => items.push(read_number(scanner, b" ,)")?),
        }
    }

    Ok(Value::Array(items))
}
