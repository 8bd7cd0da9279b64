//! Grammar for the Rip language
//!
//! This module contains all the parsing rules organized by category:
//! - `literal`: numbers, characters, strings, here-docs, regular expressions
//! - `object`: references, key-value pairs, ranges, maps, lists, classes, lambdas
//! - `construct`: conditionals, switch, try/catch/finally, throw, return, exit
//!
//! The grammar is scannerless: rules consume characters directly and tag what
//! they matched with a rule name, producing a [`RawNode`] tree. Alternatives are
//! ordered (PEG) and the order matters, see the notes on the individual rules.

mod construct;
mod literal;
mod object;

pub use literal::{character, decimal, integer, numeric, regular_expression, string};
pub use object::{key_value, list, map, range, reference, simple_reference};

use crate::parser::combinators::{
    BoxedParser, Span, char_where, end_of_input, literal, many, many1, not, separated,
};
use crate::parser::raw::RawNode;
use crate::parser::state::{ParseResult, ParseState, Parser};

use construct::construct;
use object::{led_by_reference, led_by_simple, structural_object};

// === Whitespace and keywords ===

/// spaces := [ \t]+
pub(crate) fn spaces() -> BoxedParser<()> {
    many1(char_where(|c| c == ' ' || c == '\t', "space")) >> |_| ()
}

/// ws := [ \t\r\n]*
pub(crate) fn ws() -> BoxedParser<()> {
    many(char_where(char::is_whitespace, "whitespace")) >> |_| ()
}

pub(crate) fn eol() -> BoxedParser<Span> {
    literal("\r\n") | literal("\n")
}

/// Characters allowed anywhere in a reference.
pub(crate) fn is_legal_reference_char(c: char) -> bool {
    !(c.is_whitespace() || ".,;#()[]{}".contains(c))
}

/// A reserved word: the literal text not followed by more reference characters.
pub(crate) fn keyword(word: &'static str) -> BoxedParser<Span> {
    literal(word) - not(char_where(is_legal_reference_char, "identifier"), "end of keyword")
}

/// list_of(item) := (item (ws "," ws item)*)?
pub(crate) fn list_of(item: BoxedParser<RawNode>) -> BoxedParser<Vec<RawNode>> {
    separated(item, ws() * literal(",") - ws())
}

// === Statements ===

/// block := "{" lines "}"
pub fn block() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        let open = literal("{").parse(state)?;
        let statements = lines().parse(state)?;
        literal("}").label("'}'").parse(state)?;
        Ok(RawNode::branch("block", open.location, statements))
    })
}

/// lines := separator* (statement separator*)*
pub fn lines() -> BoxedParser<Vec<RawNode>> {
    let separator = char_where(|c| c.is_whitespace() || c == ';', "separator");

    BoxedParser::new(move |state: &mut ParseState| {
        let mut statements = Vec::new();
        loop {
            many(separator.clone()).parse(state)?;
            let pos = state.position();
            match statement().parse(state) {
                Ok(statement) => statements.push(statement),
                Err(_) => {
                    state.restore(pos);
                    break;
                }
            }
        }
        Ok(statements)
    })
}

/// statement := comment | assignment | expression
pub fn statement() -> BoxedParser<RawNode> {
    comment() | assignment() | expression()
}

/// comment := "#" !"{" (!eol any)*
pub fn comment() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        literal("#").parse(state)?;
        not(literal("{"), "comment").parse(state)?;
        let start = state.position();
        many(not(eol(), "end of line") * char_where(|_| true, "comment text")).parse(state)?;
        let span = Span {
            text: state.slice(start, state.position()),
            location: state.location_of(start),
        };
        Ok(RawNode::leaf("comment", span))
    })
}

/// assignment := assignable spaces "=" spaces expression
pub fn assignment() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        let target = assignable().parse(state)?;
        spaces().parse(state)?;
        let equals = literal("=").parse(state)?;
        spaces().parse(state)?;
        let value = expression().parse(state)?;
        Ok(RawNode::branch(
            "assignment",
            equals.location,
            vec![target, value],
        ))
    })
}

/// assignable := reference postfix*
fn assignable() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        let target = reference().parse(state)?;
        postfixes(target, state)
    })
}

// === Expressions ===

/// expression := operand (spaces operator spaces operand)*
///
/// Operators get no precedence here: the chain is kept flat and the
/// normalizer folds it left to right.
pub fn expression() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        let first = operand().parse(state)?;
        let mut chain = vec![];

        loop {
            let pos = state.position();
            match operator_link(state) {
                Ok((operator, rhs)) => {
                    chain.push(operator);
                    chain.push(rhs);
                }
                Err(_) => {
                    state.restore(pos);
                    break;
                }
            }
        }

        if chain.is_empty() {
            return Ok(first);
        }

        let location = first.location.clone();
        let mut children = vec![first];
        children.extend(chain);
        Ok(RawNode::branch("binary", location, children))
    })
}

/// link := spaces operator spaces operand
fn operator_link(state: &mut ParseState) -> ParseResult<(RawNode, RawNode)> {
    spaces().parse(state)?;
    let operator = simple_reference().parse(state)?;
    spaces().parse(state)?;
    let rhs = operand().parse(state)?;
    Ok((RawNode::leaf("operator", operator), rhs))
}

/// operand := atom postfix*
pub fn operand() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        let atom = atom().parse(state)?;
        postfixes(atom, state)
    })
}

/// postfix := "." simple_reference | "(" arguments ")"
fn postfixes(mut node: RawNode, state: &mut ParseState) -> ParseResult<RawNode> {
    loop {
        let pos = state.position();

        if let Ok(name) = (literal(".") * simple_reference()).parse(state) {
            let location = name.location.clone();
            node = RawNode::branch(
                "property",
                location,
                vec![node, RawNode::leaf("name", name)],
            );
            continue;
        }
        state.restore(pos);

        if let Ok((open, arguments)) = invocation_arguments().parse(state) {
            node = RawNode::branch(
                "invocation",
                open.location.clone(),
                vec![node, RawNode::branch("arguments", open.location, arguments)],
            );
            continue;
        }
        state.restore(pos);

        return Ok(node);
    }
}

/// arguments := "(" ws list_of(expression) ws ")"
fn invocation_arguments() -> BoxedParser<(Span, Vec<RawNode>)> {
    BoxedParser::new(|state: &mut ParseState| {
        let open = literal("(").parse(state)?;
        ws().parse(state)?;
        let arguments = list_of(expression()).parse(state)?;
        ws().parse(state)?;
        literal(")").label("')'").parse(state)?;
        Ok((open, arguments))
    })
}

/// atom := construct | structural | map | list | led_by_simple | "(" expression ")" | led_by_reference
///
/// Key-value pairs and ranges are not alternatives of their own: they
/// continue from the simple object or reference they start with.
fn atom() -> BoxedParser<RawNode> {
    construct()
        | structural_object()
        | map()
        | list()
        | led_by_simple()
        | parenthesized()
        | led_by_reference()
}

fn parenthesized() -> BoxedParser<RawNode> {
    literal("(") * ws() * expression() - ws() - literal(")")
}

/// module := lines EOF
pub fn module() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        let location = state.location_of(0);
        let statements = lines().parse(state)?;
        end_of_input().parse(state)?;
        Ok(RawNode::branch("module", location, statements))
    })
}

/// Parse a whole source text into its raw parse tree.
///
/// On failure the error is the one that got furthest into the input, carrying
/// every alternative the grammar attempted there.
pub fn parse(state: &mut ParseState) -> ParseResult<RawNode> {
    match module().parse(state) {
        Ok(tree) => Ok(tree),
        Err(err) => Err(state.take_furthest_error().unwrap_or(err)),
    }
}

/// Run a single rule against `source`, requiring it to consume everything.
pub fn parse_rule<T: 'static>(
    rule: BoxedParser<T>,
    origin: &str,
    source: &str,
) -> ParseResult<T> {
    let mut state = ParseState::new(origin, source);
    let whole = rule - end_of_input();
    match whole.parse(&mut state) {
        Ok(value) => Ok(value),
        Err(err) => Err(state.take_furthest_error().unwrap_or(err)),
    }
}
