//! Grammar tests: what each rule accepts, rejects and how it labels matches

use rip::parser::{
    ParseState, RawNode, decimal, integer, numeric, parse, parse_rule, reference, string,
};

fn parse_module(source: &str) -> RawNode {
    let mut state = ParseState::new("rspec", source);
    match parse(&mut state) {
        Ok(tree) => tree,
        Err(err) => panic!("parsing failed: {err}"),
    }
}

fn labels(node: &RawNode) -> Vec<&'static str> {
    node.children.iter().map(|child| child.label).collect()
}

#[test]
fn reference_accepts_operator_like_names() {
    for name in [
        "name",
        "Person",
        "==",
        "save!",
        "valid?",
        "long_ref-name",
        "*/-+<>&$~%",
        "one_9",
    ] {
        let node = parse_rule(reference(), "rspec", name)
            .unwrap_or_else(|err| panic!("`{name}` should be a reference: {err}"));
        assert_eq!(node.label, "reference");
        assert_eq!(node.text(), name);
    }
}

#[test]
fn reference_rejects_dots_digits_and_spaces() {
    for source in ["one.two", "6teen", "rip rocks"] {
        assert!(
            parse_rule(reference(), "rspec", source).is_err(),
            "`{source}` should not be a reference"
        );
    }
}

#[test]
fn decimal_is_tried_before_integer() {
    let node = parse_rule(numeric(), "rspec", "3.14").unwrap();
    assert_eq!(node.label, "decimal");
    assert_eq!(node.text(), "3.14");

    let node = parse_rule(numeric(), "rspec", "42").unwrap();
    assert_eq!(node.label, "integer");
}

#[test]
fn numbers_take_sign_and_grouping() {
    assert_eq!(parse_rule(integer(), "rspec", "-1_000").unwrap().text(), "-1_000");
    assert_eq!(parse_rule(decimal(), "rspec", "+.5").unwrap().text(), "+.5");
    assert!(parse_rule(integer(), "rspec", "1__0").is_err());
}

#[test]
fn string_forms_are_all_strings() {
    for source in [":rip", "'rip'", "\"rip\"", "<<RIP\nrip\nRIP"] {
        let node = parse_rule(string(), "rspec", source)
            .unwrap_or_else(|err| panic!("`{source}` should be a string: {err}"));
        assert_eq!(node.label, "string");
    }
}

#[test]
fn string_is_a_list_of_characters() {
    let node = parse_rule(string(), "rspec", "'ab'").unwrap();
    let characters: Vec<_> = node
        .children
        .iter()
        .map(|child| (child.label, child.text(), child.location.column))
        .collect();

    assert_eq!(characters, vec![("character", "a", 1), ("character", "b", 2)]);
}

#[test]
fn double_quoted_string_keeps_escapes_and_interpolations() {
    let node = parse_rule(string(), "rspec", r#""a\n#{b}""#).unwrap();
    assert_eq!(labels(&node), vec!["character", "escape", "interpolation"]);
}

#[test]
fn operators_form_one_flat_chain() {
    let module = parse_module("1 + 2 * 3");
    let binary = &module.children[0];

    assert_eq!(binary.label, "binary");
    assert_eq!(
        labels(binary),
        vec!["integer", "operator", "integer", "operator", "integer"]
    );
}

#[test]
fn signed_number_after_space_starts_a_new_statement() {
    let module = parse_module("1 -2");
    assert_eq!(labels(&module), vec!["integer", "integer"]);
    assert_eq!(module.children[1].text(), "-2");

    let module = parse_module("1 - 2");
    assert_eq!(labels(&module), vec!["binary"]);
    assert_eq!(
        labels(&module.children[0]),
        vec!["integer", "operator", "integer"]
    );
}

#[test]
fn statements_split_on_newlines_and_semicolons() {
    let module = parse_module("a = 1; b = 2\n\nc");
    assert_eq!(labels(&module), vec!["assignment", "assignment", "reference"]);
}

#[test]
fn comments_are_statements() {
    let module = parse_module("# says hi\nx = 1 # trailing");
    assert_eq!(labels(&module), vec!["comment", "assignment", "comment"]);
    assert_eq!(module.children[0].text(), " says hi");
    assert_eq!(module.children[0].location.column, 1);
}

#[test]
fn property_and_invocation_postfixes() {
    let module = parse_module("list.at(0)");
    let invocation = &module.children[0];

    assert_eq!(invocation.label, "invocation");
    assert_eq!(invocation.children[0].label, "property");
    assert_eq!(invocation.children[1].label, "arguments");
}

#[test]
fn recursive_objects() {
    let module = parse_module("[1, `a..`z, {:a: 1}, 1...3]");
    let list = &module.children[0];

    assert_eq!(list.label, "list");
    assert_eq!(
        labels(list),
        vec!["integer", "range", "map", "exclusive_range"]
    );
}

#[test]
fn lambda_keywords() {
    for source in ["-> (a) { a }", "lambda (a) { a }", "λ (a) { a }", "-> { 1 }"] {
        let module = parse_module(source);
        assert_eq!(module.children[0].label, "lambda", "{source}");
    }
}

#[test]
fn overloads_hold_lambdas() {
    let module = parse_module("=> {\n  -> (x) { x }\n  -> (0) { :zero }\n}");
    let overloads = &module.children[0];

    assert_eq!(overloads.label, "overloads");
    assert_eq!(labels(overloads), vec!["lambda", "lambda"]);
}

#[test]
fn class_with_ancestors() {
    let module = parse_module("class (Animal, Named) {\n  @.legs = 4\n}");
    let class = &module.children[0];

    assert_eq!(class.label, "class");
    assert_eq!(labels(&class.children[0]), vec!["reference", "reference"]);
}

#[test]
fn failure_reports_furthest_position() {
    let mut state = ParseState::new("rspec", "if (true) {\n  1\n");
    let err = parse(&mut state).unwrap_err();
    let location = err.location.expect("parse errors carry a location");

    assert_eq!(location.line, 3);
    assert!(err.expected.iter().any(|expected| expected == "'}'"));
}

/// `depth` string literals, each interpolating the next, around `1`.
fn nested_interpolations(depth: usize) -> String {
    let mut source = "1".to_string();
    for _ in 0..depth {
        source = format!("\"#{{{source}}}\"");
    }
    source
}

#[test]
fn nested_interpolations_parse_in_one_pass() {
    let source = nested_interpolations(32);
    let module = parse_module(&source);

    let mut node = &module.children[0];
    let mut depth = 0;
    while node.label == "string" {
        let interpolation = node.child("interpolation").expect("string interpolates");
        node = &interpolation.children[0];
        depth += 1;
    }

    assert_eq!(depth, 32);
    assert_eq!(node.label, "integer");
}
