use std::ops::{Add, BitOr, Mul, Shr, Sub};
use std::rc::Rc;

use crate::location::Location;

use super::state::{ParseError, ParseResult, ParseState, Parser};

type ParserFn<T> = Rc<dyn Fn(&mut ParseState) -> ParseResult<T>>;

/// A matched piece of source text together with the location of its first character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub location: Location,
}

// === Boxed Parser for type erasure ===

pub struct BoxedParser<T> {
    parser: ParserFn<T>,
}

impl<T> Clone for BoxedParser<T> {
    fn clone(&self) -> Self {
        BoxedParser {
            parser: Rc::clone(&self.parser),
        }
    }
}

impl<T: 'static> BoxedParser<T> {
    pub fn new<P: Parser<T> + 'static>(parser: P) -> Self {
        BoxedParser {
            parser: Rc::new(move |state: &mut ParseState| parser.parse(state)),
        }
    }
}

impl<T> Parser<T> for BoxedParser<T> {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T> {
        (self.parser)(state)
    }
}

// === Combinators as methods ===

impl<T: 'static> BoxedParser<T> {
    /// Sequence: parse self then other, return (T, U)
    pub fn seq<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<(T, U)> {
        BoxedParser::new(move |state: &mut ParseState| {
            let a = self.parse(state)?;
            let b = other.parse(state)?;
            Ok((a, b))
        })
    }

    /// Keep left: parse self then other, discard other's result
    pub fn skip<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            let a = self.parse(state)?;
            let _ = other.parse(state)?;
            Ok(a)
        })
    }

    /// Keep right: parse self then other, discard self's result
    pub fn skip_left<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<U> {
        BoxedParser::new(move |state: &mut ParseState| {
            let _ = self.parse(state)?;
            other.parse(state)
        })
    }

    /// Map: transform result
    pub fn map<U: 'static, F: Fn(T) -> U + 'static>(self, f: F) -> BoxedParser<U> {
        BoxedParser::new(move |state: &mut ParseState| {
            let a = self.parse(state)?;
            Ok(f(a))
        })
    }

    /// Ordered choice: try self, if it fails rewind and try other
    pub fn or(self, other: BoxedParser<T>) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            let pos = state.position();
            match self.parse(state) {
                Ok(a) => Ok(a),
                Err(_) => {
                    // the failure is already recorded in the state
                    state.restore(pos);
                    other.parse(state)
                }
            }
        })
    }

    /// Add a label to this parser for better error messages
    pub fn label(self, name: &'static str) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            let pos = state.position();
            match self.parse(state) {
                Ok(v) => Ok(v),
                Err(_) => {
                    let err = ParseError::new("unexpected input")
                        .expected(name)
                        .at(state.location_of(pos));
                    state.record_error(err.clone());
                    Err(err)
                }
            }
        })
    }
}

// === Operator Overloading ===

/// `+` for sequence: A + B -> (A, B)
impl<T: 'static, U: 'static> Add<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<(T, U)>;

    fn add(self, rhs: BoxedParser<U>) -> Self::Output {
        self.seq(rhs)
    }
}

/// `-` for keep left: A - B -> A (parse B, discard result)
impl<T: 'static, U: 'static> Sub<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<T>;

    fn sub(self, rhs: BoxedParser<U>) -> Self::Output {
        self.skip(rhs)
    }
}

/// `*` for keep right: A * B -> B (parse A, discard result)
impl<T: 'static, U: 'static> Mul<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    fn mul(self, rhs: BoxedParser<U>) -> Self::Output {
        self.skip_left(rhs)
    }
}

/// `|` for choice: A | B -> A or B
impl<T: 'static> BitOr<BoxedParser<T>> for BoxedParser<T> {
    type Output = BoxedParser<T>;

    fn bitor(self, rhs: BoxedParser<T>) -> Self::Output {
        self.or(rhs)
    }
}

/// `>>` for map: A >> fn -> B
impl<T: 'static, U: 'static, F: Fn(T) -> U + 'static> Shr<F> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    fn shr(self, f: F) -> Self::Output {
        self.map(f)
    }
}

// === Primitive Parsers ===

fn failure(state: &mut ParseState, expected: &str) -> ParseError {
    let message = if state.has_next() {
        "unexpected character"
    } else {
        "unexpected end of input"
    };
    let err = state.error_here(message).expected(expected);
    state.record_error(err.clone());
    err
}

/// Match the exact text `expected`.
pub fn literal(expected: &'static str) -> BoxedParser<Span> {
    BoxedParser::new(move |state: &mut ParseState| {
        let start = state.position();
        for c in expected.chars() {
            if state.peek() != Some(c) {
                state.restore(start);
                return Err(failure(state, &format!("{expected:?}")));
            }
            state.advance();
        }
        Ok(Span {
            text: expected.to_string(),
            location: state.location_of(start),
        })
    })
}

/// Match one character satisfying `predicate`.
pub fn char_where<F: Fn(char) -> bool + 'static>(
    predicate: F,
    expected: &'static str,
) -> BoxedParser<Span> {
    BoxedParser::new(move |state: &mut ParseState| match state.peek() {
        Some(c) if predicate(c) => {
            let location = state.location();
            state.advance();
            Ok(Span {
                text: c.to_string(),
                location,
            })
        }
        _ => Err(failure(state, expected)),
    })
}

/// Match any single character.
pub fn any_char() -> BoxedParser<Span> {
    char_where(|_| true, "any character")
}

/// Negative lookahead: succeed without consuming if `parser` fails here.
pub fn not<T: 'static>(parser: BoxedParser<T>, expected: &'static str) -> BoxedParser<()> {
    BoxedParser::new(move |state: &mut ParseState| {
        let pos = state.position();
        let matched = parser.parse(state).is_ok();
        state.restore(pos);
        if matched {
            let err = state.error_here("unexpected input").expected(expected);
            state.record_error(err.clone());
            Err(err)
        } else {
            Ok(())
        }
    })
}

pub fn end_of_input() -> BoxedParser<()> {
    BoxedParser::new(|state: &mut ParseState| {
        if state.has_next() {
            Err(failure(state, "end of input"))
        } else {
            Ok(())
        }
    })
}

/// Run `parser` and return the text it consumed as one span.
pub fn capture<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Span> {
    BoxedParser::new(move |state: &mut ParseState| {
        let start = state.position();
        parser.parse(state)?;
        Ok(Span {
            text: state.slice(start, state.position()),
            location: state.location_of(start),
        })
    })
}

/// Parse zero or more occurrences
pub fn many<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Vec<T>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let mut results = Vec::new();
        loop {
            let pos = state.position();
            match parser.parse(state) {
                // a parser that matched nothing would loop forever
                Ok(_) if state.position() == pos => break,
                Ok(item) => results.push(item),
                Err(_) => {
                    state.restore(pos);
                    break;
                }
            }
        }
        Ok(results)
    })
}

/// Parse one or more occurrences
pub fn many1<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Vec<T>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let first = parser.parse(state)?;
        let rest = many(parser.clone()).parse(state)?;
        let mut results = vec![first];
        results.extend(rest);
        Ok(results)
    })
}

/// Optional: parse zero or one
pub fn optional<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Option<T>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let pos = state.position();
        match parser.parse(state) {
            Ok(item) => Ok(Some(item)),
            Err(_) => {
                state.restore(pos);
                Ok(None)
            }
        }
    })
}

/// Zero or more `item`s separated by `separator`; a dangling separator is not consumed.
pub fn separated<T: 'static, S: 'static>(
    item: BoxedParser<T>,
    separator: BoxedParser<S>,
) -> BoxedParser<Vec<T>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let mut items = Vec::new();
        let pos = state.position();
        match item.parse(state) {
            Ok(first) => items.push(first),
            Err(_) => {
                state.restore(pos);
                return Ok(items);
            }
        }

        loop {
            let pos = state.position();
            let next = separator
                .parse(state)
                .and_then(|_| item.parse(state));
            match next {
                Ok(next) => items.push(next),
                Err(_) => {
                    state.restore(pos);
                    break;
                }
            }
        }

        Ok(items)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digit() -> BoxedParser<Span> {
        char_where(|c| c.is_ascii_digit(), "digit")
    }

    #[test]
    fn test_literal_rewinds_on_partial_match() {
        let mut state = ParseState::new("rspec", "lamb");
        assert!(literal("lambda").parse(&mut state).is_err());
        assert_eq!(state.position(), 0);
    }

    #[test]
    fn test_or_is_ordered() {
        let mut state = ParseState::new("rspec", "abc");
        let parser = literal("ab") | literal("abc");
        let span = parser.parse(&mut state).unwrap();

        assert_eq!(span.text, "ab");
        assert_eq!(state.position(), 2);
    }

    #[test]
    fn test_capture_returns_consumed_text() {
        let mut state = ParseState::new("rspec", "123x");
        let span = capture(many1(digit())).parse(&mut state).unwrap();

        assert_eq!(span.text, "123");
        assert_eq!(span.location.absolute_position, 0);
    }

    #[test]
    fn test_not_does_not_consume() {
        let mut state = ParseState::new("rspec", "x");
        assert!(not(digit(), "no digit").parse(&mut state).is_ok());
        assert_eq!(state.position(), 0);

        let mut state = ParseState::new("rspec", "1");
        assert!(not(digit(), "no digit").parse(&mut state).is_err());
    }

    #[test]
    fn test_separated_leaves_dangling_separator() {
        let mut state = ParseState::new("rspec", "1,2,");
        let items = separated(digit(), literal(",")).parse(&mut state).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(state.position(), 3);
    }
}
