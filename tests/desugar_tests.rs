//! Tests for the raw tree → syntax tree normalization

use pretty_assertions::assert_eq;
use rip::ast::debug::render;
use rip::ast::*;
use rip::error::RipError;
use rip::syntax_tree;

fn normalize(source: &str) -> Module {
    syntax_tree("rspec", source).unwrap_or_else(|err| panic!("normalizing failed: {err}"))
}

fn first(source: &str) -> Node {
    normalize(source)
        .statements
        .into_iter()
        .next()
        .expect("no statements")
}

/// The debug trace without locations, for comparing shapes of trees built
/// from differently laid out sources.
fn shape(module: &Module) -> String {
    render(&module.debug_trace(0))
        .lines()
        .map(|line| match line.split_once('@') {
            Some((kind, rest)) => match rest.split_once(' ') {
                Some((_, payload)) => format!("{kind} {payload}"),
                None => kind.to_string(),
            },
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn operators_fold_left_into_invocations() {
    assert_eq!(shape(&normalize("1 + 2 * 3")), shape(&normalize("1.+(2).*(3)")));
}

#[test]
fn operator_call_sits_at_operator() {
    let Node::Invocation(invocation) = first("one + two") else {
        panic!("expected an invocation");
    };
    assert_eq!(invocation.location.column, 4);

    let Node::Property(property) = invocation.callable.as_ref() else {
        panic!("expected a property");
    };
    assert_eq!(property.name, "+");
    assert_eq!(property.location.column, 4);
    assert_eq!(property.object.location().column, 0);
}

#[test]
fn unless_swaps_branches() {
    let Node::If(conditional) = first("unless (false) { :x }") else {
        panic!("expected an if");
    };

    assert!(matches!(
        conditional.condition.as_ref(),
        Node::Reference(Reference { name, .. }) if name == "false"
    ));
    assert!(conditional.true_body.statements.is_empty());
    assert_eq!(conditional.false_body.statements.len(), 1);
    assert!(matches!(
        &conditional.false_body.statements[0],
        Node::String(string) if string.text() == "x"
    ));
}

#[test]
fn if_without_else_gets_empty_block() {
    let Node::If(conditional) = first("if (ok) { 1 }") else {
        panic!("expected an if");
    };
    assert!(conditional.false_body.statements.is_empty());
}

#[test]
fn else_if_nests_a_conditional() {
    let Node::If(conditional) = first("if (a) { 1 } else if (b) { 2 } else { 3 }") else {
        panic!("expected an if");
    };
    assert!(matches!(
        conditional.false_body.statements.as_slice(),
        [Node::If(_)]
    ));
}

#[test]
fn strings_are_located_characters() {
    let Node::String(string) = first("  'rip'") else {
        panic!("expected a string");
    };

    let columns: Vec<_> = string
        .characters
        .iter()
        .map(|c| (c.data, c.location.column))
        .collect();
    assert_eq!(columns, vec![('r', 3), ('i', 4), ('p', 5)]);
    assert_eq!(string.location.column, 3);
}

#[test]
fn interpolation_becomes_concatenation() {
    let Node::Invocation(outer) = first(r##""#{a}b""##) else {
        panic!("expected an invocation");
    };

    let Node::Property(plus) = outer.callable.as_ref() else {
        panic!("expected a property");
    };
    assert_eq!(plus.name, "+");
    assert!(matches!(plus.object.as_ref(), Node::Interpolation(_)));
    // the `+` sits at the closing brace of the interpolation
    assert_eq!(plus.location.column, 4);

    assert!(matches!(
        outer.arguments.as_slice(),
        [Node::String(rest)] if rest.text() == "b"
    ));
}

#[test]
fn interpolated_pattern_starts_from_empty_pattern() {
    let Node::Invocation(outer) = first("/#{a}b/") else {
        panic!("expected an invocation");
    };
    let Node::Property(plus) = outer.callable.as_ref() else {
        panic!("expected a property");
    };
    let Node::Invocation(inner) = plus.object.as_ref() else {
        panic!("expected a nested invocation");
    };
    let Node::Property(first_plus) = inner.callable.as_ref() else {
        panic!("expected a property");
    };

    assert!(matches!(
        first_plus.object.as_ref(),
        Node::RegularExpression(pattern) if pattern.pattern.is_empty()
    ));
}

#[test]
fn lambda_keyword_and_parameters() {
    let Node::Lambda(lambda) = first("λ (name, 0) { name }") else {
        panic!("expected a lambda");
    };

    assert_eq!(lambda.keyword, LambdaKeyword::Lambda);
    assert!(matches!(
        lambda.parameters.as_slice(),
        [Node::Reference(_), Node::Integer(_)]
    ));
}

#[test]
fn catch_with_and_without_matcher() {
    let Node::Try(try_block) = first("try { 1 } catch (Oops e) { 2 } catch (e) { 3 } finally { 4 }")
    else {
        panic!("expected a try");
    };

    assert_eq!(try_block.catches.len(), 2);
    assert_eq!(
        try_block.catches[0].matcher.as_ref().map(|m| m.name.as_str()),
        Some("Oops")
    );
    assert_eq!(try_block.catches[1].matcher, None);
    assert!(try_block.finally.is_some());
}

#[test]
fn comment_text_and_location() {
    let Node::Comment(comment) = first("#hello") else {
        panic!("expected a comment");
    };
    assert_eq!(comment.text, "hello");
    assert_eq!(comment.location.column, 1);
}

#[test]
fn reparsing_yields_equal_trees() {
    let source = "greet = -> (name) {\n  \"hi #{name}\"\n}\ngreet(:rip)";
    assert_eq!(normalize(source), normalize(source));
}

#[test]
fn debug_trace_indents_children() {
    let module = normalize("x = 1");
    let trace = module.debug_trace(0);

    let levels: Vec<_> = trace.iter().map(|(level, _)| *level).collect();
    assert_eq!(levels, vec![0, 1, 2, 2]);
    assert!(trace[1].1.starts_with("Assignment@rspec:1:2"));
}

#[test]
fn property_assignment_target() {
    let Node::Assignment(assignment) = first("x.y.z = 1") else {
        panic!("expected an assignment");
    };
    assert!(matches!(
        assignment.target.as_ref(),
        Node::Property(Property { name, .. }) if name == "z"
    ));
}

#[test]
fn parse_errors_surface_before_normalizing() {
    assert!(matches!(
        syntax_tree("rspec", "x = (1"),
        Err(RipError::Parse(_))
    ));
}
