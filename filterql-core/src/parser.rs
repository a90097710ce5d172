//! Recursive-descent parser for filter expressions.
//!
//! ```text
//! expr      := term ( (AND | OR) term )*
//! term      := condition | '(' expr ')'
//! condition := field ' ' operator ' ' value
//! ```
//!
//! All connectives of one nesting level must agree: `a = 1 AND b = 2 OR c = 3`
//! is rejected, `a = 1 AND (b = 2 OR c = 3)` is accepted. A parenthesized group
//! holding a single term collapses into that term.

use serde_json::Value;

use crate::ast::{Condition, FilterExpr, Logic};
use crate::error::{QueryError, QueryResult};
use crate::operator::read_operator;
use crate::scanner::Scanner;
use crate::value::read_value;

/// Deepest bracket nesting accepted before parsing gives up.
pub const MAX_DEPTH: usize = 200;

pub struct Parser<'q, 'p> {
    scanner: Scanner<'q>,
    params: &'p [Value],
}

impl<'q, 'p> Parser<'q, 'p> {
    pub fn new(query: &'q str, params: &'p [Value]) -> Self {
        Self {
            scanner: Scanner::new(query),
            params,
        }
    }

    /// Parse the whole query into one expression.
    pub fn parse(mut self) -> QueryResult<FilterExpr> {
        self.parse_group(0)
    }

    /// Parse sibling terms until the end of input or, when nested, until the
    /// closing bracket (left for the caller to consume).
    fn parse_group(&mut self, depth: usize) -> QueryResult<FilterExpr> {
        let mut terms = vec![self.parse_term(depth)?];
        let mut logic: Option<Logic> = None;

        loop {
            self.scanner.skip_whitespace();
            match self.scanner.current() {
                None => break,
                Some(b')') if depth > 0 => break,
                Some(b')') => {
                    return Err(QueryError::UnbalancedParentheses {
                        at: self.scanner.position(),
                    })
                }
                _ => {}
            }

            let at = self.scanner.position();
            let next = if self.scanner.eat_keyword("AND") {
                Logic::And
            } else if self.scanner.eat_keyword("OR") {
                Logic::Or
            } else {
                return Err(QueryError::MissingLogic { at });
            };

            match logic {
                None => logic = Some(next),
                Some(current) if current != next => return Err(QueryError::MixedLogic { at }),
                Some(_) => {}
            }

            terms.push(self.parse_term(depth)?);
        }

        Ok(match logic {
            Some(logic) => FilterExpr::group(logic, terms),
            // without a connective the loop never pushes a second term
            None => terms.remove(0),
        })
    }

    fn parse_term(&mut self, depth: usize) -> QueryResult<FilterExpr> {
        self.scanner.skip_whitespace();

        if self.scanner.current() == Some(b'(') {
            let at = self.scanner.position();
            if depth >= MAX_DEPTH {
                return Err(QueryError::NestingTooDeep { limit: MAX_DEPTH, at });
            }
            self.scanner.advance(1);
            let inner = self.parse_group(depth + 1)?;
            self.scanner.skip_whitespace();
            if self.scanner.current() != Some(b')') {
                return Err(QueryError::UnbalancedParentheses { at });
            }
            self.scanner.advance(1);
            return Ok(inner);
        }

        if self.scanner.is_at_end()
            || self.scanner.current() == Some(b')')
            || self.scanner.at_keyword("AND")
            || self.scanner.at_keyword("OR")
        {
            return Err(QueryError::ExpectedCondition {
                at: self.scanner.position(),
            });
        }

        self.parse_condition().map(FilterExpr::from)
    }

    fn parse_condition(&mut self) -> QueryResult<Condition> {
        let at = self.scanner.position();
        let Some(field) = self.scanner.word_before_space() else {
            return Err(QueryError::MissingSpace { after: "key", at });
        };

        self.scanner.skip_whitespace();
        let operator = read_operator(&mut self.scanner)?;

        let predicate = if operator.takes_value() {
            self.scanner.skip_whitespace();
            let at = self.scanner.position();
            let value = read_value(&mut self.scanner, self.params)?;
            operator.bind(value, at)?
        } else {
            operator.bind(Value::Null, self.scanner.position())?
        };

        Ok(Condition::new(field, predicate))
    }
}
