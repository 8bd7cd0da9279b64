//! Source locations
//!
//! Every AST node and every sub-token (each character of a string literal, for
//! instance) carries its own [`Location`]. Locations are immutable values: the
//! `advance_*` helpers return a new location and leave the receiver untouched.

use std::fmt::{self, Display};
use std::sync::Arc;

/// A position inside a named source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// File path or symbolic name of the source.
    pub origin: Arc<str>,
    /// 0-based character offset from the start of the source.
    pub absolute_position: usize,
    /// 1-based line number.
    pub line: usize,
    /// 0-based column on `line`.
    pub column: usize,
}

impl Location {
    pub fn new(origin: impl Into<Arc<str>>, absolute_position: usize, line: usize, column: usize) -> Self {
        Self {
            origin: origin.into(),
            absolute_position,
            line,
            column,
        }
    }

    /// The first character of `origin`.
    pub fn start(origin: impl Into<Arc<str>>) -> Self {
        Self::new(origin, 0, 1, 0)
    }

    /// Move `n_chars` characters to the right on the same line.
    pub fn advance_by(&self, n_chars: usize) -> Self {
        Self {
            origin: Arc::clone(&self.origin),
            absolute_position: self.absolute_position + n_chars,
            line: self.line,
            column: self.column + n_chars,
        }
    }

    /// Step over a line break: the result is the first column of the next line.
    pub fn advance_line(&self) -> Self {
        Self {
            origin: Arc::clone(&self.origin),
            absolute_position: self.absolute_position + 1,
            line: self.line + 1,
            column: 0,
        }
    }

    /// Compact form used by debug traces.
    pub fn to_debug(&self) -> String {
        format!("{}:{}:{}", self.origin, self.line, self.column)
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.origin, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_by_keeps_original() {
        let start = Location::start("rspec");
        let moved = start.advance_by(4);

        assert_eq!(start.column, 0);
        assert_eq!(moved.column, 4);
        assert_eq!(moved.absolute_position, 4);
        assert_eq!(moved.line, 1);
    }

    #[test]
    fn test_advance_line_resets_column() {
        let location = Location::start("rspec").advance_by(12).advance_line();

        assert_eq!(location.absolute_position, 13);
        assert_eq!(location.line, 2);
        assert_eq!(location.column, 0);
    }

    #[test]
    fn test_debug_form() {
        let location = Location::start("main.rip").advance_by(3);
        assert_eq!(location.to_debug(), "main.rip:1:3");
    }
}
