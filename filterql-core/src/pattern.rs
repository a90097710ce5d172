//! LIKE pattern to regular expression conversion.

/// Convert a LIKE pattern into the regular expression sent to the store.
///
/// The expression is anchored at the start unless the pattern begins with `%`
/// and at the end unless it ends with `%`. Inside the pattern `%` matches any
/// sequence and `?` any single character; every other character is literal.
pub fn like_to_regex(pattern: &str) -> String {
    let (body, prefix) = match pattern.strip_prefix('%') {
        Some(rest) => (rest, ".*"),
        None => (pattern, "^"),
    };
    let (body, suffix) = match body.strip_suffix('%') {
        Some(rest) => (rest, ".*"),
        None => (body, "$"),
    };

    let mut regex = String::with_capacity(body.len() + 4);
    regex.push_str(prefix);
    for c in body.chars() {
        match c {
            '%' => regex.push_str(".*"),
            '?' => regex.push('.'),
            '^' | '$' | '.' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\' => {
                regex.push('\\');
                regex.push(c);
            }
            _ => regex.push(c),
        }
    }
    regex.push_str(suffix);
    regex
}
