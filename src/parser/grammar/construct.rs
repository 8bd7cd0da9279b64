//! Control-flow constructs for the Rip language

use crate::parser::combinators::{BoxedParser, Span, literal, optional};
use crate::parser::raw::RawNode;
use crate::parser::state::{ParseState, Parser};

use super::object::reference;
use super::{block, expression, keyword, list_of, spaces, ws};

/// construct := if | unless | switch | try | throw | return | exit
pub(crate) fn construct() -> BoxedParser<RawNode> {
    conditional("if")
        | conditional("unless")
        | switch()
        | try_block()
        | throw()
        | exiting("return")
        | exiting("exit")
}

/// "(" ws expression ws ")"
fn condition() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        literal("(").parse(state)?;
        ws().parse(state)?;
        let condition = expression().parse(state)?;
        ws().parse(state)?;
        literal(")").label("')'").parse(state)?;
        Ok(condition)
    })
}

/// if | unless := kw ws condition ws block (ws "else" ws (block | if | unless))?
fn conditional(word: &'static str) -> BoxedParser<RawNode> {
    BoxedParser::new(move |state: &mut ParseState| {
        let start = keyword(word).parse(state)?;
        ws().parse(state)?;
        let condition = condition().parse(state)?;
        ws().parse(state)?;
        let body = block().parse(state)?;

        let mut children = vec![condition, body];
        if let Some(otherwise) = optional(else_branch()).parse(state)? {
            children.push(otherwise);
        }
        Ok(RawNode::branch(word, start.location, children))
    })
}

fn else_branch() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        ws().parse(state)?;
        let start = keyword("else").parse(state)?;
        ws().parse(state)?;
        let body = (block() | conditional("if") | conditional("unless")).parse(state)?;
        Ok(RawNode::branch("else", start.location, vec![body]))
    })
}

/// switch := "switch" ws condition ws "{" ws (case ws)* (else ws)? "}"
fn switch() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = keyword("switch").parse(state)?;
        ws().parse(state)?;
        let subject = condition().parse(state)?;
        ws().parse(state)?;
        literal("{").parse(state)?;
        ws().parse(state)?;

        let mut children = vec![subject];
        while let Some(arm) = optional(case()).parse(state)? {
            children.push(arm);
            ws().parse(state)?;
        }
        if let Some(otherwise) = optional(plain_else()).parse(state)? {
            children.push(otherwise);
            ws().parse(state)?;
        }

        literal("}").label("'}'").parse(state)?;
        Ok(RawNode::branch("switch", start.location, children))
    })
}

/// case := "case" ws "(" ws list_of(expression) ws ")" ws block
fn case() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = keyword("case").parse(state)?;
        ws().parse(state)?;
        let open = literal("(").parse(state)?;
        ws().parse(state)?;
        let matchers = list_of(expression()).parse(state)?;
        ws().parse(state)?;
        literal(")").label("')'").parse(state)?;
        ws().parse(state)?;
        let body = block().parse(state)?;

        Ok(RawNode::branch(
            "case",
            start.location,
            vec![RawNode::branch("matchers", open.location, matchers), body],
        ))
    })
}

/// else := "else" ws block
fn plain_else() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = keyword("else").parse(state)?;
        ws().parse(state)?;
        let body = block().parse(state)?;
        Ok(RawNode::branch("else", start.location, vec![body]))
    })
}

/// try := "try" ws block (ws catch)* (ws finally)?
///
/// At least one catch or a finally is required.
fn try_block() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = keyword("try").parse(state)?;
        ws().parse(state)?;
        let body = block().parse(state)?;

        let mut children = vec![body];
        while let Some(handler) = optional(ws() * catch()).parse(state)? {
            children.push(handler);
        }
        if let Some(cleanup) = optional(ws() * finally()).parse(state)? {
            children.push(cleanup);
        }

        if children.len() == 1 {
            let err = state
                .error_here("try without catch or finally")
                .expected("catch")
                .expected("finally");
            state.record_error(err.clone());
            return Err(err);
        }
        Ok(RawNode::branch("try", start.location, children))
    })
}

/// catch := "catch" ws "(" ws reference (spaces reference)? ws ")" ws block
fn catch() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = keyword("catch").parse(state)?;
        ws().parse(state)?;
        literal("(").parse(state)?;
        ws().parse(state)?;

        let mut children = vec![reference().parse(state)?];
        if let Some(binding) = optional(spaces() * reference()).parse(state)? {
            children.push(binding);
        }

        ws().parse(state)?;
        literal(")").label("')'").parse(state)?;
        ws().parse(state)?;
        children.push(block().parse(state)?);
        Ok(RawNode::branch("catch", start.location, children))
    })
}

/// finally := "finally" ws block
fn finally() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = keyword("finally").parse(state)?;
        ws().parse(state)?;
        let body = block().parse(state)?;
        Ok(RawNode::branch("finally", start.location, vec![body]))
    })
}

/// throw := "throw" spaces expression
fn throw() -> BoxedParser<RawNode> {
    BoxedParser::new(|state: &mut ParseState| {
        let start = keyword("throw").parse(state)?;
        spaces().parse(state)?;
        let payload = expression().parse(state)?;
        Ok(RawNode::branch("throw", start.location, vec![payload]))
    })
}

/// return | exit := kw (spaces expression)?
fn exiting(word: &'static str) -> BoxedParser<RawNode> {
    BoxedParser::new(move |state: &mut ParseState| {
        let start: Span = keyword(word).parse(state)?;
        let payload = optional(spaces() * expression()).parse(state)?;
        Ok(RawNode::branch(word, start.location, payload.into_iter().collect()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::grammar::parse_rule;

    #[test]
    fn test_try_requires_handler() {
        assert!(parse_rule(construct(), "rspec", "try { 1 }").is_err());
        assert!(parse_rule(construct(), "rspec", "try { 1 } finally { 2 }").is_ok());
    }

    #[test]
    fn test_else_if_chain() {
        let node = parse_rule(construct(), "rspec", "if (a) { 1 } else if (b) { 2 }").unwrap();
        let otherwise = node.child("else").unwrap();
        assert_eq!(otherwise.children[0].label, "if");
    }

    #[test]
    fn test_bare_return() {
        let node = parse_rule(construct(), "rspec", "return").unwrap();
        assert_eq!(node.label, "return");
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_switch_cases_and_else() {
        let source = "switch (x) {\n  case (1, 2) { :low }\n  else { :high }\n}";
        let node = parse_rule(construct(), "rspec", source).unwrap();
        let labels: Vec<_> = node.children.iter().map(|child| child.label).collect();
        assert_eq!(labels, vec!["reference", "case", "else"]);
    }
}
