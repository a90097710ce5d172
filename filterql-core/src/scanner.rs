//! Cursor over the query text.
//!
//! All syntax characters of the query language are ASCII, so the scanner walks
//! bytes and only ever stops on ASCII positions, which are always valid `str`
//! boundaries. Field names and string literals may still carry any UTF-8.

use crate::error::Position;

pub struct Scanner<'a> {
    query: &'a str,
    position: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(query: &'a str) -> Self {
        Self { query, position: 0 }
    }

    pub fn query(&self) -> &'a str {
        self.query
    }

    /// Unparsed input from the current position.
    pub fn remainder(&self) -> &'a str {
        &self.query[self.position..]
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.query.len()
    }

    pub fn current(&self) -> Option<u8> {
        self.query.as_bytes().get(self.position).copied()
    }

    pub fn advance(&mut self, len: usize) {
        self.position = (self.position + len).min(self.query.len());
    }

    pub fn skip_whitespace(&mut self) {
        while self.current() == Some(b' ') {
            self.position += 1;
        }
    }

    /// Snapshot of the current location, for error reporting.
    pub fn position(&self) -> Position {
        Position::new(self.remainder(), self.query)
    }

    /// Case-insensitive keyword test. The keyword must end at a token boundary:
    /// end of input, a space or a parenthesis.
    pub fn at_keyword(&self, keyword: &str) -> bool {
        let rest = self.remainder().as_bytes();
        if rest.len() < keyword.len()
            || !rest[..keyword.len()].eq_ignore_ascii_case(keyword.as_bytes())
        {
            return false;
        }
        matches!(rest.get(keyword.len()), None | Some(b' ') | Some(b'(') | Some(b')'))
    }

    /// Consume `keyword` if [`Scanner::at_keyword`] matches.
    pub fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.advance(keyword.len());
            true
        } else {
            false
        }
    }

    /// Read a non-empty word that must be followed by a space. The space itself
    /// is left in place. Returns `None` when no space follows or the word is empty.
    pub fn word_before_space(&mut self) -> Option<&'a str> {
        let rest = self.remainder();
        match rest.find(' ') {
            Some(end) if end > 0 => {
                self.advance(end);
                Some(&rest[..end])
            }
            _ => None,
        }
    }

    /// Read up to (not including) the first byte in `terminators`, or to the end.
    pub fn take_until(&mut self, terminators: &[u8]) -> &'a str {
        let rest = self.remainder();
        let end = rest
            .bytes()
            .position(|b| terminators.contains(&b))
            .unwrap_or(rest.len());
        self.advance(end);
        &rest[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_whitespace() {
        let mut scanner = Scanner::new("   a");
        scanner.skip_whitespace();
        assert_eq!(scanner.remainder(), "a");
    }

    #[test]
    fn test_keyword_boundaries() {
        assert!(Scanner::new("AND b = 1").at_keyword("and"));
        assert!(Scanner::new("or(b = 1)").at_keyword("OR"));
        assert!(Scanner::new("null").at_keyword("NULL"));
        assert!(!Scanner::new("ordinal = 1").at_keyword("OR"));
        assert!(!Scanner::new("android = 1").at_keyword("AND"));
    }

    #[test]
    fn test_word_before_space() {
        let mut scanner = Scanner::new("testInt > 6");
        assert_eq!(scanner.word_before_space(), Some("testInt"));
        assert_eq!(scanner.remainder(), " > 6");

        assert_eq!(Scanner::new("testInt").word_before_space(), None);
        assert_eq!(Scanner::new(" testInt").word_before_space(), None);
    }

    #[test]
    fn test_take_until() {
        let mut scanner = Scanner::new("42, 7)");
        assert_eq!(scanner.take_until(b" ,)"), "42");
        assert_eq!(scanner.remainder(), ", 7)");

        let mut scanner = Scanner::new("3.5");
        assert_eq!(scanner.take_until(b" )"), "3.5");
        assert!(scanner.is_at_end());
    }

    #[test]
    fn test_position_snapshot() {
        let mut scanner = Scanner::new("a = 1");
        scanner.advance(4);
        let at = scanner.position();
        assert_eq!(at.remainder, "1");
        assert_eq!(at.query, "a = 1");
    }
}
