//! Comparison operator resolution.
//!
//! Handles operators:
//! - Equality: `=`, `==`, `!=`, `<>`
//! - Relational: `<`, `<=`, `>`, `>=`
//! - Membership: `IN`, `NOT IN`
//! - Pattern matching: `LIKE`, `NOT LIKE`
//! - Null checks: `IS NULL`, `IS NOT NULL`
//!
//! Keywords are case-insensitive, symbols are matched exactly.

use serde_json::Value;

use crate::ast::Predicate;
use crate::error::{Position, QueryError, QueryResult};
use crate::scanner::Scanner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl Operator {
    /// `IS NULL` and `IS NOT NULL` consume no value token.
    pub fn takes_value(self) -> bool {
        !matches!(self, Operator::IsNull | Operator::IsNotNull)
    }

    /// Attach the operand read after the operator. `at` points at the operand.
    pub fn bind(self, value: Value, at: Position) -> QueryResult<Predicate> {
        let predicate = match self {
            Operator::Eq => Predicate::Eq(value),
            Operator::Ne => Predicate::Ne(value),
            Operator::Gt => Predicate::Gt(value),
            Operator::Gte => Predicate::Gte(value),
            Operator::Lt => Predicate::Lt(value),
            Operator::Lte => Predicate::Lte(value),
            Operator::Like | Operator::NotLike => {
                let Value::String(pattern) = value else {
                    return Err(QueryError::UnsupportedOperator { at });
                };
                if self == Operator::Like {
                    Predicate::Like(pattern)
                } else {
                    Predicate::NotLike(pattern)
                }
            }
            Operator::In | Operator::NotIn => {
                let Value::Array(list) = value else {
                    return Err(QueryError::UnsupportedOperator { at });
                };
                if self == Operator::In {
                    Predicate::In(list)
                } else {
                    Predicate::NotIn(list)
                }
            }
            Operator::IsNull => Predicate::IsNull,
            Operator::IsNotNull => Predicate::IsNotNull,
        };
        Ok(predicate)
    }
}

/// Read the operator following a field name. The scanner must sit on the
/// operator token; the operator must be followed by a space.
pub fn read_operator(scanner: &mut Scanner<'_>) -> QueryResult<Operator> {
    let at = scanner.position();
    let Some(word) = scanner.word_before_space() else {
        return Err(QueryError::MissingSpace {
            after: "operator",
            at,
        });
    };

    let operator = match word {
        "=" | "==" => Operator::Eq,
        "!=" | "<>" => Operator::Ne,
        ">" => Operator::Gt,
        ">=" => Operator::Gte,
        "<" => Operator::Lt,
        "<=" => Operator::Lte,
        w if w.eq_ignore_ascii_case("LIKE") => Operator::Like,
        w if w.eq_ignore_ascii_case("IN") => Operator::In,
        w if w.eq_ignore_ascii_case("IS") => read_is_qualifier(scanner)?,
        w if w.eq_ignore_ascii_case("NOT") => read_not_qualifier(scanner)?,
        _ => return Err(QueryError::UnsupportedOperator { at }),
    };

    Ok(operator)
}

/// `IS NULL` / `IS NOT NULL`
fn read_is_qualifier(scanner: &mut Scanner<'_>) -> QueryResult<Operator> {
    scanner.skip_whitespace();
    if scanner.eat_keyword("NULL") {
        return Ok(Operator::IsNull);
    }
    if scanner.eat_keyword("NOT") {
        scanner.skip_whitespace();
        if scanner.eat_keyword("NULL") {
            return Ok(Operator::IsNotNull);
        }
        return Err(QueryError::UnsupportedQualifier {
            after: "IS NOT",
            at: scanner.position(),
        });
    }
    Err(QueryError::UnsupportedQualifier {
        after: "IS",
        at: scanner.position(),
    })
}

/// `NOT LIKE` / `NOT IN`
fn read_not_qualifier(scanner: &mut Scanner<'_>) -> QueryResult<Operator> {
    scanner.skip_whitespace();
    if scanner.eat_keyword("LIKE") {
        Ok(Operator::NotLike)
    } else if scanner.eat_keyword("IN") {
        Ok(Operator::NotIn)
    } else {
        Err(QueryError::UnsupportedQualifier {
            after: "NOT",
            at: scanner.position(),
        })
    }
}
