//! Object parsers for the Rip language: references, key-value pairs, ranges,
//! maps, lists, classes and lambdas

use crate::parser::combinators::{BoxedParser, Span, char_where, literal, many, optional};
use crate::parser::raw::RawNode;
use crate::parser::state::{ParseState, Parser};

use super::literal::{character, integer, numeric, simple_object, string};
use super::{block, is_legal_reference_char, keyword, list_of, operand, spaces, ws};

// === References ===

/// simple_reference := legal (legal | digit)*
///
/// `legal` is anything but whitespace, digits and `.,;#()[]{}`, so operator
/// names such as `==` or `+` are ordinary references.
pub fn simple_reference() -> BoxedParser<Span> {
    BoxedParser::new(|state: &mut ParseState| {
        let first = char_where(
            |c| is_legal_reference_char(c) && !c.is_ascii_digit(),
            "reference",
        )
        .parse(state)?;
        let rest = many(char_where(is_legal_reference_char, "reference")).parse(state)?;

        let mut text = first.text;
        text.extend(rest.into_iter().map(|span| span.text));
        Ok(Span {
            text,
            location: first.location,
        })
    })
}

/// reference := simple_reference
pub fn reference() -> BoxedParser<RawNode> {
    simple_reference() >> |span| RawNode::leaf("reference", span)
}

// === Recursive objects ===
//
// A key-value pair starts with a simple object and a range with an integer,
// a character or a reference. The leading object is parsed once and the
// pair or range continues from it, so a string full of interpolations is
// never matched twice.

/// led_by_simple := simple (key_value_rest | range_rest)?
pub(crate) fn led_by_simple() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        let first = simple_object().parse(state)?;
        if let Some(pair) = key_value_rest(&first, state) {
            return Ok(pair);
        }
        if matches!(first.label, "integer" | "character") {
            if let Some(range) = range_rest(&first, state) {
                return Ok(range);
            }
        }
        Ok(first)
    })
}

/// led_by_reference := reference range_rest?
pub(crate) fn led_by_reference() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        let first = reference().parse(state)?;
        Ok(range_rest(&first, state).unwrap_or(first))
    })
}

/// key_value := simple key_value_rest
pub fn key_value() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        let key = simple_object().parse(state)?;
        key_value_rest(&key, state).ok_or_else(|| {
            state
                .get_furthest_error()
                .cloned()
                .unwrap_or_else(|| state.error_here("expected key-value pair"))
        })
    })
}

/// key_value_rest := spaces? ":" spaces? operand
///
/// Leaves the state untouched when there is no pair to continue.
fn key_value_rest(key: &RawNode, state: &mut ParseState) -> Option<RawNode> {
    let pos = state.position();
    let rest = (optional(spaces()) * literal(":") * optional(spaces()) * operand()).parse(state);
    match rest {
        Ok(value) => Some(RawNode::branch(
            "key_value",
            key.location.clone(),
            vec![key.clone(), value],
        )),
        Err(_) => {
            state.restore(pos);
            None
        }
    }
}

fn rangeable() -> BoxedParser<RawNode> {
    integer() | character() | reference()
}

/// range := rangeable range_rest
pub fn range() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = rangeable().parse(state)?;
        range_rest(&start, state).ok_or_else(|| {
            state
                .get_furthest_error()
                .cloned()
                .unwrap_or_else(|| state.error_here("expected range"))
        })
    })
}

/// range_rest := ".." "."? rangeable
///
/// The third dot makes the range exclusive of its end. Leaves the state
/// untouched when there is no range to continue.
fn range_rest(start: &RawNode, state: &mut ParseState) -> Option<RawNode> {
    let pos = state.position();
    let rest = (literal("..") * optional(literal(".")) + rangeable()).parse(state);
    match rest {
        Ok((exclusive, end)) => {
            let label = if exclusive.is_some() { "exclusive_range" } else { "range" };
            Some(RawNode::branch(
                label,
                start.location.clone(),
                vec![start.clone(), end],
            ))
        }
        Err(_) => {
            state.restore(pos);
            None
        }
    }
}

/// map := "{" ws list_of(key_value) ws "}"
pub fn map() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        let open = literal("{").parse(state)?;
        ws().parse(state)?;
        let pairs = list_of(key_value()).parse(state)?;
        ws().parse(state)?;
        literal("}").parse(state)?;
        Ok(RawNode::branch("map", open.location, pairs))
    })
}

/// list := "[" ws list_of(expression) ws "]"
pub fn list() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        let open = literal("[").parse(state)?;
        ws().parse(state)?;
        let items = list_of(super::expression()).parse(state)?;
        ws().parse(state)?;
        literal("]").label("']'").parse(state)?;
        Ok(RawNode::branch("list", open.location, items))
    })
}

// === Structural objects ===

/// structural := class | lambda | overloads
pub(crate) fn structural_object() -> BoxedParser<RawNode> {
    class() | lambda() | overloads()
}

/// class := "class" ws ("(" ws list_of(class | reference) ws ")")? ws block
pub fn class() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = keyword("class").parse(state)?;
        ws().parse(state)?;

        let ancestors = optional(parenthesized(class() | reference())).parse(state)?;
        let ancestors = match ancestors {
            Some((open, ancestors)) => RawNode::branch("ancestors", open.location, ancestors),
            None => RawNode::branch("ancestors", start.location.clone(), vec![]),
        };

        ws().parse(state)?;
        let body = block().parse(state)?;
        Ok(RawNode::branch("class", start.location, vec![ancestors, body]))
    })
}

fn lambda_keyword() -> BoxedParser<Span> {
    keyword("->") | keyword("lambda") | keyword("λ")
}

/// lambda := ("->" | "lambda" | "λ") ws ("(" ws list_of(parameter) ws ")")? ws block
pub fn lambda() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = lambda_keyword().parse(state)?;
        ws().parse(state)?;

        let parameters = optional(parenthesized(parameter())).parse(state)?;
        let parameters = match parameters {
            Some((open, parameters)) => RawNode::branch("parameters", open.location, parameters),
            None => RawNode::branch("parameters", start.location.clone(), vec![]),
        };

        ws().parse(state)?;
        let body = block().parse(state)?;
        let location = start.location.clone();
        Ok(RawNode::branch(
            "lambda",
            location,
            vec![RawNode::leaf("keyword", start), parameters, body],
        ))
    })
}

/// parameter := numeric | character | string | reference
fn parameter() -> BoxedParser<RawNode> {
    numeric() | character() | string() | reference()
}

/// overloads := "=>" ws "{" ws (lambda ws)+ "}"
pub fn overloads() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = keyword("=>").parse(state)?;
        ws().parse(state)?;
        literal("{").parse(state)?;
        ws().parse(state)?;

        let mut lambdas = vec![lambda().label("lambda").parse(state)?];
        ws().parse(state)?;
        while let Some(overload) = optional(lambda()).parse(state)? {
            lambdas.push(overload);
            ws().parse(state)?;
        }

        literal("}").label("'}'").parse(state)?;
        Ok(RawNode::branch("overloads", start.location, lambdas))
    })
}

/// "(" ws list_of(item) ws ")", returning the opening parenthesis as well
fn parenthesized(item: BoxedParser<RawNode>) -> BoxedParser<(Span, Vec<RawNode>)> {
    BoxedParser::new(move |state: &mut ParseState| {
        let open = literal("(").parse(state)?;
        ws().parse(state)?;
        let items = list_of(item.clone()).parse(state)?;
        ws().parse(state)?;
        literal(")").label("')'").parse(state)?;
        Ok((open, items))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::grammar::parse_rule;

    #[test]
    fn test_operator_names_are_references() {
        for name in ["==", "save!", "valid?", "*/-+<>&$~%"] {
            let node = parse_rule(reference(), "rspec", name).unwrap();
            assert_eq!(node.text(), name);
        }
    }

    #[test]
    fn test_exclusive_range() {
        let node = parse_rule(range(), "rspec", "1...10").unwrap();
        assert_eq!(node.label, "exclusive_range");
        assert_eq!(node.children[1].text(), "10");
    }

    #[test]
    fn test_simple_object_continues_into_pair_or_range() {
        let pair = parse_rule(led_by_simple(), "rspec", "'a': 1").unwrap();
        assert_eq!(pair.label, "key_value");
        assert_eq!(pair.children[0].label, "string");

        let range = parse_rule(led_by_simple(), "rspec", "`a..`z").unwrap();
        assert_eq!(range.label, "range");

        let plain = parse_rule(led_by_simple(), "rspec", "'a'").unwrap();
        assert_eq!(plain.label, "string");
    }

    #[test]
    fn test_reference_continues_into_range() {
        let range = parse_rule(led_by_reference(), "rspec", "low..high").unwrap();
        assert_eq!(range.label, "range");
        assert_eq!(range.children[1].text(), "high");

        let mut state = ParseState::new("rspec", "list.at");
        let node = led_by_reference().parse(&mut state).unwrap();
        assert_eq!(node.label, "reference");
        assert_eq!(state.position(), 4);
    }

    #[test]
    fn test_lambda_without_parameters() {
        let node = parse_rule(lambda(), "rspec", "-> {}").unwrap();
        let parameters = node.child("parameters").unwrap();
        assert!(parameters.children.is_empty());
    }

    #[test]
    fn test_keyword_needs_boundary() {
        assert!(parse_rule(class(), "rspec", "classy {}").is_err());
    }
}
