//! Entry points turning query strings into store documents.

use serde_json::Value;

use crate::ast::FilterExpr;
use crate::error::QueryResult;
use crate::keys;
use crate::parser::Parser;
use crate::render::render;

/// Queries starting with this marker bind values to keys by position.
pub const SHORTHAND_PREFIX: &str = "by";

/// Whether `query` is a `byNameAndAge` key list rather than a filter
/// expression. The marker must be followed by a capitalized key (or `-`),
/// and key lists never contain whitespace.
pub fn is_shorthand(query: &str) -> bool {
    let Some(rest) = query.strip_prefix(SHORTHAND_PREFIX) else {
        return false;
    };
    let starts_key = rest
        .bytes()
        .next()
        .is_some_and(|b| b.is_ascii_uppercase() || b == b'-');
    starts_key && !query.chars().any(char::is_whitespace)
}

/// Parse a filter expression without rendering it.
pub fn parse_filter(query: &str, params: &[Value]) -> QueryResult<FilterExpr> {
    Parser::new(query, params).parse()
}

/// Translate a query into a filter document.
///
/// `byNameAndAge` style queries produce a plain equality document from
/// `params`; anything else is parsed as a filter expression whose `?N`
/// references are resolved against `params`.
///
/// ```rust
/// use filterql_core::filter_document;
/// use serde_json::json;
///
/// let query = "testStr = 'un' and (testInt = 3 or testInt = ?1)";
/// let filter = filter_document(query, &[json!(1)]).unwrap();
/// assert_eq!(
///     filter,
///     json!({"$and": [{"testStr": "un"}, {"$or": [{"testInt": 3.0}, {"testInt": 1}]}]})
/// );
/// ```
pub fn filter_document(query: &str, params: &[Value]) -> QueryResult<Value> {
    let filter = if is_shorthand(query) {
        keys::shorthand_document(query, params)?
    } else {
        render(&parse_filter(query, params)?)
    };
    tracing::debug!(query, %filter, "translated filter");
    Ok(filter)
}

/// Translate a key list such as `byNameAnd-Age` into an order document.
pub fn order_document(keys: &str) -> QueryResult<Value> {
    let order = keys::order_document(keys)?;
    tracing::debug!(keys, %order, "translated order");
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryErrorKind;
    use serde_json::json;

    fn filter(query: &str) -> Value {
        filter_document(query, &[]).unwrap()
    }

    #[test]
    fn test_whitespace_between_tokens_is_irrelevant() {
        assert_eq!(filter("testInt   >   6"), filter("testInt > 6"));
        assert_eq!(filter("  testStr =  'un'  "), filter("testStr = 'un'"));
        assert_eq!(
            filter("testStr not   in   ('six',  'sept')"),
            filter("testStr not in ('six','sept')")
        );
        assert_eq!(filter("testDate is   not   null"), filter("testDate is not null"));
    }

    #[test]
    fn test_parenthesized_condition() {
        assert_eq!(filter("(testInt > 6)"), filter("testInt > 6"));
        assert_eq!(filter("( testInt > 6 )"), filter("testInt > 6"));
    }

    #[test]
    fn test_conjunction_spellings() {
        let expected = json!({"$and": [{"a": "x"}, {"b": "y"}]});
        assert_eq!(filter("a = 'x' AND b = 'y'"), expected);
        assert_eq!(filter("(a = 'x') AND (b = 'y')"), expected);
        assert_eq!(filter("(a = 'x' AND b = 'y')"), expected);
        assert_eq!(filter("(a = 'x') and b = 'y'"), expected);
    }

    #[test]
    fn test_operator_documents() {
        assert_eq!(filter("testInt > 6"), json!({"testInt": {"$gt": 6.0}}));
        assert_eq!(filter("testInt >= 5"), json!({"testInt": {"$gte": 5.0}}));
        assert_eq!(filter("testInt < 3"), json!({"testInt": {"$lt": 3.0}}));
        assert_eq!(filter("testInt != 1"), json!({"testInt": {"$ne": 1.0}}));
        assert_eq!(filter("testInt <> 1"), json!({"testInt": {"$ne": 1.0}}));
        assert_eq!(filter("testInt == 1"), json!({"testInt": 1.0}));
        assert_eq!(
            filter("testInt in (1, 2, 3)"),
            json!({"testInt": {"$in": [1.0, 2.0, 3.0]}})
        );
        assert_eq!(
            filter("testStr like '%u?t%'"),
            json!({"testStr": {"$regex": ".*u.t.*"}})
        );
        assert_eq!(
            filter("testStr NOT LIKE 'se%'"),
            json!({"testStr": {"$not": {"$regex": "^se.*"}}})
        );
        assert_eq!(filter("testInt IS null"), json!({"testInt": null}));
        assert_eq!(filter("testInt IS NOT null"), json!({"testInt": {"$ne": null}}));
    }

    #[test]
    fn test_and_or_documents() {
        assert_eq!(
            filter("testStr = 'un' or (testInt = 2 and testDate is null)"),
            json!({"$or": [
                {"testStr": "un"},
                {"$and": [{"testInt": 2.0}, {"testDate": null}]}
            ]})
        );
        assert_eq!(
            filter("testStr = 'un' or testInt = 2 or testBool is null"),
            json!({"$or": [{"testStr": "un"}, {"testInt": 2.0}, {"testBool": null}]})
        );
    }

    #[test]
    fn test_positional_parameter_matches_literal() {
        assert_eq!(
            filter_document("testBool = ?1", &[json!(true)]).unwrap(),
            json!({"testBool": true})
        );
        let err = filter_document("testBool = ?2", &[json!(true)]).unwrap_err();
        assert_eq!(err.kind(), QueryErrorKind::ParameterOutOfRange);
    }

    #[test]
    fn test_list_and_pattern_parameters() {
        assert_eq!(
            filter_document("testStr in ?1", &[json!(["six", "sept"])]).unwrap(),
            json!({"testStr": {"$in": ["six", "sept"]}})
        );
        assert_eq!(
            filter_document("testStr like ?1", &[json!("se%")]).unwrap(),
            json!({"testStr": {"$regex": "^se.*"}})
        );
        let err = filter_document("testStr like ?1", &[json!(3)]).unwrap_err();
        assert_eq!(err.kind(), QueryErrorKind::UnsupportedOperator);
    }

    #[test]
    fn test_shorthand_dispatch() {
        assert_eq!(
            filter_document("byTestStrAndTestInt", &[json!("un"), json!(1)]).unwrap(),
            json!({"testStr": "un", "testInt": 1})
        );
        let err = filter_document("byTestStrAndTestInt", &[json!("un")]).unwrap_err();
        assert_eq!(err.kind(), QueryErrorKind::InsufficientValues);
    }

    #[test]
    fn test_field_starting_with_marker_is_an_expression() {
        assert_eq!(
            filter_document("byteCount = ?1", &[json!(5)]).unwrap(),
            json!({"byteCount": 5})
        );
        assert_eq!(
            filter("bypass is null and byTestStr = 'x'"),
            json!({"$and": [{"bypass": null}, {"byTestStr": "x"}]})
        );
    }

    #[test]
    fn test_is_shorthand() {
        assert!(is_shorthand("byTestStrAndTestInt"));
        assert!(is_shorthand("by-TestInt"));
        assert!(!is_shorthand("byteCount = ?1"));
        assert!(!is_shorthand("byTestStr = 'x'"));
        assert!(!is_shorthand("by"));
        assert!(!is_shorthand("testStr = 'by'"));
    }

    #[test]
    fn test_error_message_names_remainder_and_query() {
        let err = filter_document("a = 1 and b = 2 or c = 3", &[]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'or c = 3'"));
        assert!(message.contains("'a = 1 and b = 2 or c = 3'"));
    }

    #[test]
    fn test_order_document() {
        assert_eq!(
            order_document("byTestIntAnd-TestStr").unwrap(),
            json!({"testInt": 1, "testStr": -1})
        );
    }
}
