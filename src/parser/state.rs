use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::location::Location;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub expected: Vec<String>,
    pub found: Option<String>,
    pub location: Option<Location>,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            expected: vec![],
            found: None,
            location: None,
        }
    }

    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected.push(expected.into());
        self
    }

    pub fn found(mut self, found: impl Into<String>) -> Self {
        self.found = Some(found.into());
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    fn position(&self) -> usize {
        self.location
            .as_ref()
            .map(|location| location.absolute_position)
            .unwrap_or(0)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error: {}", self.message)?;
        if let Some(location) = &self.location {
            write!(f, " at {location}")?;
        }
        if !self.expected.is_empty() {
            write!(f, ", expected {}", self.expected.join(" or "))?;
        }
        if let Some(found) = &self.found {
            write!(f, ", found {found}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

/// Cursor over the characters of one source text.
///
/// Besides the current position the state remembers the failure that got
/// furthest into the input; that is the error reported when the whole parse
/// fails, since a PEG backtracks out of every intermediate failure.
pub struct ParseState {
    origin: Arc<str>,
    chars: Vec<char>,
    /// (line, column) for every index, plus one entry for end of input
    positions: Vec<(usize, usize)>,
    index: usize,
    furthest_error: Option<ParseError>,
}

impl ParseState {
    pub fn new(origin: impl Into<Arc<str>>, source: &str) -> Self {
        let chars: Vec<char> = source.chars().collect();
        let mut positions = Vec::with_capacity(chars.len() + 1);
        let (mut line, mut column) = (1, 0);
        for c in &chars {
            positions.push((line, column));
            if *c == '\n' {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
        }
        positions.push((line, column));

        Self {
            origin: origin.into(),
            chars,
            positions,
            index: 0,
            furthest_error: None,
        }
    }

    pub fn advance(&mut self) -> Option<char> {
        let c = self.chars.get(self.index).copied()?;
        self.index += 1;
        Some(c)
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    pub fn has_next(&self) -> bool {
        self.index < self.chars.len()
    }

    pub fn position(&self) -> usize {
        self.index
    }

    pub fn restore(&mut self, position: usize) {
        self.index = position;
    }

    pub fn origin(&self) -> Arc<str> {
        Arc::clone(&self.origin)
    }

    /// Location of the character at `index`.
    pub fn location_of(&self, index: usize) -> Location {
        let clamped = index.min(self.chars.len());
        let (line, column) = self.positions[clamped];
        Location::new(Arc::clone(&self.origin), clamped, line, column)
    }

    pub fn location(&self) -> Location {
        self.location_of(self.index)
    }

    /// Source text between two positions.
    pub fn slice(&self, from: usize, to: usize) -> String {
        self.chars[from.min(self.chars.len())..to.min(self.chars.len())]
            .iter()
            .collect()
    }

    /// An error anchored at the current position, describing what is there.
    pub fn error_here(&self, message: impl Into<String>) -> ParseError {
        let err = ParseError::new(message).at(self.location());
        match self.peek() {
            Some(c) => err.found(format!("{c:?}")),
            None => err.found("end of input"),
        }
    }

    /// Remember `err` if it got at least as far as any failure seen so far.
    /// Failures at the same position merge their expected alternatives.
    pub fn record_error(&mut self, err: ParseError) {
        let Some(furthest) = &mut self.furthest_error else {
            self.furthest_error = Some(err);
            return;
        };

        if furthest.position() < err.position() {
            *furthest = err;
        } else if furthest.position() == err.position() {
            let mut expected: BTreeSet<String> = furthest.expected.drain(..).collect();
            expected.extend(err.expected);
            furthest.expected = expected.into_iter().collect();
        }
    }

    pub fn get_furthest_error(&self) -> Option<&ParseError> {
        self.furthest_error.as_ref()
    }

    pub fn take_furthest_error(&mut self) -> Option<ParseError> {
        self.furthest_error.take()
    }
}

pub trait Parser<T>: Sized {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T>;
}

impl<T, F: Fn(&mut ParseState) -> ParseResult<T>> Parser<T> for F {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T> {
        self(state)
    }
}
