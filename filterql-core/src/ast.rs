//! Expression tree produced by the parser.

use serde_json::Value;

/// Connective shared by the siblings of one nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    And,
    Or,
}

impl Logic {
    /// Logic keyword of the filter document
    pub fn tag(self) -> &'static str {
        match self {
            Logic::And => "$and",
            Logic::Or => "$or",
        }
    }
}

/// What a condition asserts about its field.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(Value),
    Ne(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    /// SQL-style wildcard pattern, `%` for any sequence and `?` for one character
    Like(String),
    NotLike(String),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    IsNull,
    IsNotNull,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub predicate: Predicate,
}

impl Condition {
    pub fn new(field: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            field: field.into(),
            predicate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    Condition(Condition),
    And(Vec<FilterExpr>),
    Or(Vec<FilterExpr>),
}

impl FilterExpr {
    pub fn group(logic: Logic, children: Vec<FilterExpr>) -> Self {
        match logic {
            Logic::And => FilterExpr::And(children),
            Logic::Or => FilterExpr::Or(children),
        }
    }

    /// Number of conditions in the tree.
    pub fn condition_count(&self) -> usize {
        match self {
            FilterExpr::Condition(_) => 1,
            FilterExpr::And(children) | FilterExpr::Or(children) => {
                children.iter().map(FilterExpr::condition_count).sum()
            }
        }
    }
}

impl From<Condition> for FilterExpr {
    fn from(condition: Condition) -> Self {
        FilterExpr::Condition(condition)
    }
}
