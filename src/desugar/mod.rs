//! Normalization - Transform the raw parse tree into the typed AST
//!
//! This module handles the desugaring transformations:
//! - Flat operator chains → left-folded property invocations (`a + b` is `a.+(b)`)
//! - `unless` → `if` with its branches swapped
//! - Interpolated strings and regular expressions → `+` concatenations
//! - Literal text → one [`Character`] node per character, escapes resolved
//! - `else if` → an else block holding the nested conditional
//!
//! A raw node shape that no rule recognizes is a compiler error, never
//! silently dropped.

use crate::ast::*;
use crate::error::{RipError, RipResult};
use crate::location::Location;
use crate::parser::RawNode;

/// Normalize a whole raw module.
pub fn normalize_module(raw: &RawNode) -> RipResult<Module> {
    expect_label(raw, &["module"])?;
    Ok(Module {
        statements: normalize_all(&raw.children)?,
        location: raw.location.clone(),
    })
}

/// Normalize any raw node standing for an expression or statement.
pub fn normalize(raw: &RawNode) -> RipResult<Node> {
    let location = raw.location.clone();

    let node = match raw.label {
        "comment" => Node::Comment(Comment {
            text: raw.text().to_string(),
            location,
        }),
        "reference" => Node::Reference(reference(raw)?),
        "integer" => Node::Integer(Integer {
            data: raw.text().to_string(),
            location,
        }),
        "decimal" => Node::Decimal(Decimal {
            data: raw.text().to_string(),
            location,
        }),
        "character" => Node::Character(character(raw)?),
        "string" => text(raw, TextKind::String)?,
        "regular_expression" => text(raw, TextKind::RegularExpression)?,
        "interpolation" => Node::Interpolation(interpolation(raw)?),
        "key_value" => Node::KeyValue(key_value(raw)?),
        "range" | "exclusive_range" => Node::Range(Range {
            start: Box::new(normalize(nth(raw, 0)?)?),
            end: Box::new(normalize(nth(raw, 1)?)?),
            exclusive: raw.label == "exclusive_range",
            location,
        }),
        "list" => Node::List(List {
            items: normalize_all(&raw.children)?,
            location,
        }),
        "map" => Node::Map(Map {
            pairs: raw
                .children
                .iter()
                .map(key_value)
                .collect::<RipResult<_>>()?,
            location,
        }),
        "assignment" => Node::Assignment(assignment(raw)?),
        "property" => Node::Property(Property {
            object: Box::new(normalize(nth(raw, 0)?)?),
            name: nth(raw, 1)?.text().to_string(),
            location,
        }),
        "invocation" => Node::Invocation(Invocation {
            callable: Box::new(normalize(nth(raw, 0)?)?),
            arguments: normalize_all(&nth(raw, 1)?.children)?,
            location,
        }),
        "binary" => binary(raw)?,
        "lambda" => Node::Lambda(lambda(raw)?),
        "overloads" => Node::Overloads(Overloads {
            overloads: raw.children.iter().map(lambda).collect::<RipResult<_>>()?,
            location,
        }),
        "class" => Node::Class(Class {
            ancestors: normalize_all(&nth(raw, 0)?.children)?,
            body: block(nth(raw, 1)?)?,
            location,
        }),
        "block" => Node::BlockBody(block(raw)?),
        "if" | "unless" => Node::If(conditional(raw)?),
        "switch" => Node::Switch(switch(raw)?),
        "try" => Node::Try(try_block(raw)?),
        "throw" => Node::Throw(Throw {
            payload: Box::new(normalize(nth(raw, 0)?)?),
            location,
        }),
        "return" => Node::Return(Return {
            payload: optional_payload(raw)?,
            location,
        }),
        "exit" => Node::Exit(Exit {
            payload: optional_payload(raw)?,
            location,
        }),
        other => {
            return Err(RipError::compiler(format!("unrecognized syntax `{other}`")).at(&location));
        }
    };

    Ok(node)
}

fn normalize_all(raw: &[RawNode]) -> RipResult<Vec<Node>> {
    raw.iter().map(normalize).collect()
}

fn nth(raw: &RawNode, index: usize) -> RipResult<&RawNode> {
    raw.children.get(index).ok_or_else(|| malformed(raw))
}

fn malformed(raw: &RawNode) -> RipError {
    RipError::compiler(format!("malformed `{}` syntax", raw.label)).at(&raw.location)
}

fn expect_label(raw: &RawNode, labels: &[&str]) -> RipResult<()> {
    if labels.contains(&raw.label) {
        Ok(())
    } else {
        Err(RipError::compiler(format!(
            "expected {}, found `{}`",
            labels.join(" or "),
            raw.label
        ))
        .at(&raw.location))
    }
}

fn optional_payload(raw: &RawNode) -> RipResult<Option<Box<Node>>> {
    raw.children
        .first()
        .map(|payload| normalize(payload).map(Box::new))
        .transpose()
}

fn reference(raw: &RawNode) -> RipResult<Reference> {
    expect_label(raw, &["reference"])?;
    Ok(Reference {
        name: raw.text().to_string(),
        location: raw.location.clone(),
    })
}

fn character(raw: &RawNode) -> RipResult<Character> {
    let data = raw.text().chars().next().ok_or_else(|| malformed(raw))?;
    Ok(Character {
        data,
        location: raw.location.clone(),
    })
}

fn key_value(raw: &RawNode) -> RipResult<KeyValue> {
    expect_label(raw, &["key_value"])?;
    Ok(KeyValue {
        key: Box::new(normalize(nth(raw, 0)?)?),
        value: Box::new(normalize(nth(raw, 1)?)?),
        location: raw.location.clone(),
    })
}

fn assignment(raw: &RawNode) -> RipResult<Assignment> {
    let target = normalize(nth(raw, 0)?)?;
    if !matches!(target, Node::Reference(_) | Node::Property(_)) {
        return Err(RipError::compiler(format!(
            "cannot assign to {}",
            target.kind()
        ))
        .at(target.location()));
    }

    Ok(Assignment {
        target: Box::new(target),
        value: Box::new(normalize(nth(raw, 1)?)?),
        location: raw.location.clone(),
    })
}

/// `a op1 b op2 c` becomes `a.op1(b).op2(c)`, both the property and the
/// invocation located at their operator.
fn binary(raw: &RawNode) -> RipResult<Node> {
    let (first, chain) = raw.children.split_first().ok_or_else(|| malformed(raw))?;
    if chain.len() % 2 != 0 {
        return Err(malformed(raw));
    }

    let mut folded = normalize(first)?;
    for link in chain.chunks(2) {
        let (operator, operand) = (&link[0], &link[1]);
        folded = operator_call(folded, operator.text(), &operator.location, normalize(operand)?);
    }
    Ok(folded)
}

fn operator_call(receiver: Node, operator: &str, location: &Location, argument: Node) -> Node {
    Node::Invocation(Invocation {
        callable: Box::new(Node::Property(Property {
            object: Box::new(receiver),
            name: operator.to_string(),
            location: location.clone(),
        })),
        arguments: vec![argument],
        location: location.clone(),
    })
}

fn block(raw: &RawNode) -> RipResult<BlockBody> {
    expect_label(raw, &["block"])?;
    Ok(BlockBody {
        statements: normalize_all(&raw.children)?,
        location: raw.location.clone(),
    })
}

fn lambda(raw: &RawNode) -> RipResult<Lambda> {
    expect_label(raw, &["lambda"])?;

    let keyword = match nth(raw, 0)?.text() {
        "->" => LambdaKeyword::DashRocket,
        _ => LambdaKeyword::Lambda,
    };
    let parameters = normalize_all(&nth(raw, 1)?.children)?;

    Ok(Lambda {
        keyword,
        parameters,
        body: block(nth(raw, 2)?)?,
        location: raw.location.clone(),
    })
}

/// `if` keeps its branches, `unless` swaps them. A missing else becomes an
/// empty block located at the given block.
fn conditional(raw: &RawNode) -> RipResult<If> {
    let condition = normalize(nth(raw, 0)?)?;
    let given = block(nth(raw, 1)?)?;

    let otherwise = match raw.children.get(2) {
        Some(otherwise) => else_body(otherwise)?,
        None => BlockBody::empty(given.location.clone()),
    };

    let (true_body, false_body) = match raw.label {
        "unless" => (otherwise, given),
        _ => (given, otherwise),
    };

    Ok(If {
        condition: Box::new(condition),
        true_body,
        false_body,
        location: raw.location.clone(),
    })
}

/// The body of an `else`: a block, or a nested conditional wrapped in one.
fn else_body(raw: &RawNode) -> RipResult<BlockBody> {
    expect_label(raw, &["else"])?;
    let body = nth(raw, 0)?;

    match body.label {
        "block" => block(body),
        _ => Ok(BlockBody {
            location: body.location.clone(),
            statements: vec![normalize(body)?],
        }),
    }
}

fn switch(raw: &RawNode) -> RipResult<Switch> {
    let (subject, arms) = raw.children.split_first().ok_or_else(|| malformed(raw))?;

    let mut cases = vec![];
    let mut else_block = None;
    for arm in arms {
        match arm.label {
            "case" => cases.push(Case {
                matchers: normalize_all(&nth(arm, 0)?.children)?,
                body: block(nth(arm, 1)?)?,
                location: arm.location.clone(),
            }),
            "else" => {
                else_block = Some(Else {
                    body: block(nth(arm, 0)?)?,
                    location: arm.location.clone(),
                })
            }
            _ => return Err(malformed(arm)),
        }
    }

    Ok(Switch {
        subject: Box::new(normalize(subject)?),
        cases,
        else_block,
        location: raw.location.clone(),
    })
}

fn try_block(raw: &RawNode) -> RipResult<Try> {
    let (body, handlers) = raw.children.split_first().ok_or_else(|| malformed(raw))?;

    let mut catches = vec![];
    let mut finally = None;
    for handler in handlers {
        match handler.label {
            "catch" => catches.push(catch(handler)?),
            "finally" => {
                finally = Some(Finally {
                    body: block(nth(handler, 0)?)?,
                    location: handler.location.clone(),
                })
            }
            _ => return Err(malformed(handler)),
        }
    }

    Ok(Try {
        body: block(body)?,
        catches,
        finally,
        location: raw.location.clone(),
    })
}

/// `catch (e)` or `catch (Type e)`
fn catch(raw: &RawNode) -> RipResult<Catch> {
    let (matcher, binding, body) = match raw.children.as_slice() {
        [binding, body] => (None, reference(binding)?, body),
        [matcher, binding, body] => (Some(reference(matcher)?), reference(binding)?, body),
        _ => return Err(malformed(raw)),
    };

    Ok(Catch {
        matcher,
        binding,
        body: block(body)?,
        location: raw.location.clone(),
    })
}

fn interpolation(raw: &RawNode) -> RipResult<Interpolation> {
    let body = raw
        .children
        .iter()
        .filter(|child| child.label != "interpolation_end")
        .map(normalize)
        .collect::<RipResult<_>>()?;

    Ok(Interpolation {
        body,
        location: raw.location.clone(),
    })
}

// === Text ===

#[derive(Clone, Copy, PartialEq)]
enum TextKind {
    String,
    RegularExpression,
}

/// A run of literal characters, or one interpolation and its closing brace.
enum Fragment {
    Text(Vec<Character>),
    Interpolated(Interpolation, Location),
}

impl Fragment {
    fn location(&self) -> Option<&Location> {
        match self {
            Fragment::Text(characters) => characters.first().map(|c| &c.location),
            Fragment::Interpolated(interpolation, _) => Some(&interpolation.location),
        }
    }
}

/// Strings and regular expressions are sequences of characters; with
/// interpolations they turn into a chain of `+` calls.
fn text(raw: &RawNode, kind: TextKind) -> RipResult<Node> {
    let mut fragments: Vec<Fragment> = vec![];

    for part in &raw.children {
        match part.label {
            "character" => push_character(&mut fragments, character(part)?),
            "escape" => {
                for c in escape(part, kind)? {
                    push_character(&mut fragments, c);
                }
            }
            "interpolation" => {
                let end = part
                    .child("interpolation_end")
                    .map(|end| end.location.clone())
                    .ok_or_else(|| malformed(part))?;
                fragments.push(Fragment::Interpolated(interpolation(part)?, end));
            }
            _ => return Err(malformed(part)),
        }
    }

    let literal = |characters: Vec<Character>, location: Location| match kind {
        TextKind::String => Node::String(StringLiteral {
            characters,
            location,
        }),
        TextKind::RegularExpression => Node::RegularExpression(RegularExpression {
            pattern: characters,
            location,
        }),
    };

    // the first fragment decides the receiver type, so an interpolated
    // regular expression always starts from a (possibly empty) pattern
    if kind == TextKind::RegularExpression
        && matches!(fragments.first(), Some(Fragment::Interpolated(..)))
    {
        fragments.insert(0, Fragment::Text(vec![]));
    }

    let mut fragments = fragments.into_iter();
    let (mut folded, mut previous_end) = match fragments.next() {
        None => return Ok(literal(vec![], raw.location.clone())),
        Some(Fragment::Text(characters)) => {
            let location = characters
                .first()
                .map(|c| c.location.clone())
                .unwrap_or_else(|| raw.location.clone());
            (literal(characters, location), None)
        }
        Some(Fragment::Interpolated(interpolation, end)) => {
            (Node::Interpolation(interpolation), Some(end))
        }
    };

    for fragment in fragments {
        // `+` sits at the closing brace of an interpolation it follows,
        // otherwise at the start of what it appends
        let location = match previous_end.take() {
            Some(end) => end,
            None => fragment
                .location()
                .cloned()
                .unwrap_or_else(|| raw.location.clone()),
        };

        folded = match fragment {
            Fragment::Text(characters) => {
                let text_location = characters
                    .first()
                    .map(|c| c.location.clone())
                    .unwrap_or_else(|| location.clone());
                operator_call(folded, "+", &location, literal(characters, text_location))
            }
            Fragment::Interpolated(interpolation, end) => {
                previous_end = Some(end);
                operator_call(folded, "+", &location, Node::Interpolation(interpolation))
            }
        };
    }

    Ok(folded)
}

fn push_character(fragments: &mut Vec<Fragment>, character: Character) {
    match fragments.last_mut() {
        Some(Fragment::Text(characters)) => characters.push(character),
        _ => fragments.push(Fragment::Text(vec![character])),
    }
}

/// Resolve `\x`. Regular expressions keep the backslash, their escapes
/// belong to the pattern.
fn escape(raw: &RawNode, kind: TextKind) -> RipResult<Vec<Character>> {
    let mut chars = raw.text().chars().skip(1);
    let escaped = chars.next().ok_or_else(|| malformed(raw))?;
    let location = raw.location.clone();

    if kind == TextKind::RegularExpression {
        return Ok(vec![
            Character {
                data: '\\',
                location: location.clone(),
            },
            Character {
                data: escaped,
                location: location.advance_by(1),
            },
        ]);
    }

    let data = match escaped {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        other => other,
    };
    Ok(vec![Character { data, location }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    fn normalize_source(source: &str) -> Module {
        normalize_module(&parse_source("rspec", source).unwrap()).unwrap()
    }

    #[test]
    fn test_unknown_label_is_a_compiler_error() {
        let raw = RawNode::branch("mystery", Location::start("rspec"), vec![]);
        let err = normalize(&raw).unwrap_err();

        assert!(matches!(err, RipError::Compiler { .. }));
    }

    #[test]
    fn test_escapes_resolve_in_strings() {
        let module = normalize_source(r#""a\nb""#);
        let Node::String(string) = &module.statements[0] else {
            panic!("expected a string");
        };
        assert_eq!(string.text(), "a\nb");
    }

    #[test]
    fn test_escapes_stay_in_patterns() {
        let module = normalize_source(r"/a\.b/");
        let Node::RegularExpression(pattern) = &module.statements[0] else {
            panic!("expected a regular expression");
        };
        assert_eq!(pattern.text(), r"a\.b");
    }

    #[test]
    fn test_literal_assignment_target_is_rejected() {
        let location = Location::start("rspec");
        let one = RawNode::leaf(
            "integer",
            crate::parser::Span {
                text: "1".to_string(),
                location: location.clone(),
            },
        );
        let raw = RawNode::branch("assignment", location, vec![one.clone(), one]);

        assert!(matches!(
            normalize(&raw),
            Err(RipError::Compiler { .. })
        ));
    }
}
