//! Literal parsers for the Rip language

use crate::parser::combinators::{
    BoxedParser, Span, any_char, capture, char_where, literal, many, many1, not, optional,
};
use crate::parser::raw::RawNode;
use crate::parser::state::{ParseResult, ParseState, Parser};

use super::{eol, lines};

/// simple := numeric | character | string | regular_expression
pub(crate) fn simple_object() -> BoxedParser<RawNode> {
    numeric() | character() | string() | regular_expression()
}

// === Numbers ===

fn digit() -> BoxedParser<Span> {
    char_where(|c| c.is_ascii_digit(), "digit")
}

/// digits := [0-9]+ ("_"? [0-9]+)*
fn digits() -> BoxedParser<()> {
    (many1(digit()) * many(optional(literal("_")) * many1(digit()))) >> |_| ()
}

fn sign() -> BoxedParser<Option<Span>> {
    optional(literal("+") | literal("-"))
}

/// numeric := decimal | integer
///
/// Decimal goes first: integer would stop in front of the `.` and leave it dangling.
pub fn numeric() -> BoxedParser<RawNode> {
    decimal() | integer()
}

/// decimal := sign? digits? "." digits
pub fn decimal() -> BoxedParser<RawNode> {
    let body = sign() * optional(digits()) * literal(".") * digits();
    capture(body) >> |span| RawNode::leaf("decimal", span)
}

/// integer := sign? digits
pub fn integer() -> BoxedParser<RawNode> {
    capture(sign() * digits()) >> |span| RawNode::leaf("integer", span)
}

/// character := "`" non-whitespace
pub fn character() -> BoxedParser<RawNode> {
    literal("`")
        * char_where(|c| !c.is_whitespace(), "character")
        >> |span| RawNode::leaf("character", span)
}

// === Strings ===

/// string := symbol | single_quoted | double_quoted | here_doc
pub fn string() -> BoxedParser<RawNode> {
    symbol_string() | single_quoted() | double_quoted() | here_doc()
}

/// Wrap the parts of a delimited text, located at its first content character.
fn text_node(label: &'static str, location_index: usize, state: &ParseState, parts: Vec<RawNode>) -> RawNode {
    RawNode::branch(label, state.location_of(location_index), parts)
}

fn raw_character() -> BoxedParser<RawNode> {
    any_char() >> |span| RawNode::leaf("character", span)
}

/// escape := "\" any
fn escape() -> BoxedParser<RawNode> {
    capture(literal("\\") * any_char()) >> |span| RawNode::leaf("escape", span)
}

/// symbol := ":" [a-zA-Z_]+
fn symbol_string() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        literal(":").parse(state)?;
        let start = state.position();
        let characters = many1(
            char_where(|c| c.is_ascii_alphabetic() || c == '_', "symbol character")
                >> |span| RawNode::leaf("character", span),
        )
        .parse(state)?;
        Ok(text_node("string", start, state, characters))
    })
}

/// single_quoted := "'" (!"'" any)* "'"
fn single_quoted() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        literal("'").parse(state)?;
        let start = state.position();
        let characters = many(not(literal("'"), "'") * raw_character()).parse(state)?;
        literal("'").label("closing '").parse(state)?;
        Ok(text_node("string", start, state, characters))
    })
}

/// double_quoted := '"' (interpolation | escape | !'"' any)* '"'
fn double_quoted() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        literal("\"").parse(state)?;
        let start = state.position();
        let part = interpolation() | escape() | (not(literal("\""), "\"") * raw_character());
        let parts = many(part).parse(state)?;
        literal("\"").label("closing \"").parse(state)?;
        Ok(text_node("string", start, state, parts))
    })
}

/// here_doc := "<<" LABEL eol (interpolation | !LABEL any)* LABEL
///
/// The content ends at the first occurrence of the opening label.
fn here_doc() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        literal("<<").parse(state)?;
        let label = capture(many1(char_where(
            |c| c.is_ascii_uppercase() || c == '_',
            "here-doc label",
        )))
        .parse(state)?;
        eol().parse(state)?;

        let terminator: Vec<char> = label.text.chars().collect();
        let start = state.position();
        let mut parts = vec![];
        loop {
            if at_text(state, &terminator) {
                break;
            }
            let pos = state.position();
            match interpolation().parse(state) {
                Ok(interpolation) => {
                    parts.push(interpolation);
                    continue;
                }
                Err(_) => state.restore(pos),
            }
            parts.push(raw_character().label("here-doc terminator").parse(state)?);
        }

        let node = text_node("string", start, state, parts);
        for _ in &terminator {
            state.advance();
        }
        Ok(node)
    })
}

fn at_text(state: &mut ParseState, text: &[char]) -> bool {
    let pos = state.position();
    let matched = text.iter().all(|c| state.advance() == Some(*c));
    state.restore(pos);
    matched
}

// === Regular expressions ===

/// regular_expression := "/" (interpolation | escape | !"/" any)* "/"
pub fn regular_expression() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        literal("/").parse(state)?;
        let start = state.position();
        let part = interpolation() | escape() | (not(literal("/"), "/") * raw_character());
        let parts = many(part).parse(state)?;
        literal("/").label("closing /").parse(state)?;
        Ok(text_node("regular_expression", start, state, parts))
    })
}

/// interpolation := "#{" lines "}"
pub fn interpolation() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| -> ParseResult<RawNode> {
        let open = literal("#{").parse(state)?;
        let mut children = lines().parse(state)?;
        let close = literal("}").label("'}'").parse(state)?;
        children.push(RawNode::leaf("interpolation_end", close));
        Ok(RawNode::branch("interpolation", open.location, children))
    })
}
