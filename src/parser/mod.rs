//! Scannerless PEG parser producing the raw parse tree
//!
//! The parser works directly on characters: there is no separate lexing
//! stage. Rules are built from [`BoxedParser`] combinators and produce a
//! [`RawNode`] tree labeled with rule names.

mod combinators;
mod grammar;
mod raw;
mod state;

pub use combinators::{BoxedParser, Span};
pub use grammar::*;
pub use raw::RawNode;
pub use state::{ParseError, ParseResult, ParseState, Parser};

/// Parse `source` (named `origin` in locations) into its raw parse tree.
pub fn parse_source(origin: &str, source: &str) -> ParseResult<RawNode> {
    let mut state = ParseState::new(origin, source);
    let tree = parse(&mut state)?;
    tracing::trace!(origin, statements = tree.children.len(), "parsed module");
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reports_furthest_failure() {
        let err = parse_source("rspec", "x = [1, 2").unwrap_err();
        let location = err.location.unwrap();

        assert_eq!(location.column, 9);
        assert!(err.expected.iter().any(|expected| expected == "']'"));
    }

    #[test]
    fn test_empty_source_is_an_empty_module() {
        let tree = parse_source("rspec", "").unwrap();
        assert_eq!(tree.label, "module");
        assert!(tree.children.is_empty());
    }
}
