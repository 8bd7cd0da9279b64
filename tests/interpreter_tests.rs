//! Evaluation of Rip programs: dispatch, control flow and kernel behavior

use rip::error::RipError;
use rip::interpreter::{Driver, DriverConfig};
use rip::syntax_tree;

/// Evaluate `source` and return the inspected result.
fn run(source: &str) -> String {
    try_run(source).unwrap_or_else(|err| panic!("evaluation failed: {err}"))
}

fn try_run(source: &str) -> Result<String, RipError> {
    let module = syntax_tree("rspec", source)?;
    let mut driver = Driver::with_config(DriverConfig::default())?;
    let value = driver.interpret(&module)?;
    driver.inspect(value)
}

// === Overloads ===

#[test]
fn literal_overload_beats_generic_one() {
    let source = r#"
describe = => {
    -> (x) { x + 1 }
    -> (0) { "zero" }
}
[describe(0), describe(4)]
"#;
    assert_eq!(run(source), r#"["zero", 5]"#);
}

#[test]
fn overload_selected_by_arity() {
    let source = r#"
size = => {
    -> () { :none }
    -> (a) { :one }
    -> (a, b) { :two }
}
[size(), size(1), size(1, 2)]
"#;
    assert_eq!(run(source), r#"["none", "one", "two"]"#);
}

#[test]
fn no_matching_overload_is_a_runtime_error() {
    let err = try_run("f = -> (a) { a }\nf(1, 2)").unwrap_err();
    assert!(matches!(err, RipError::Runtime { ref message, .. } if message.contains("no matching overload")));
}

#[test]
fn calling_a_non_lambda_fails() {
    assert!(matches!(try_run("x = 1\nx(2)"), Err(RipError::Runtime { .. })));
}

// === Closures ===

#[test]
fn lambdas_close_over_their_scope() {
    let source = r#"
make = -> (greeting) {
    -> (name) { greeting + ", " + name }
}
hello = make(:hello)
hello(:rip)
"#;
    assert_eq!(run(source), r#""hello, rip""#);
}

#[test]
fn recursion_gets_a_fresh_frame_per_call() {
    let source = r#"
count = => {
    -> (0) { 0 }
    -> (n) {
        rest = count(n - 1)
        rest + 1
    }
}
count(5)
"#;
    assert_eq!(run(source), "5");
}

// === Control flow ===

#[test]
fn if_picks_true_branch() {
    assert_eq!(run("if (true) { :hello } else { :goodbye }"), r#""hello""#);
    assert_eq!(run("if (false) { :hello } else { :goodbye }"), r#""goodbye""#);
}

#[test]
fn unless_inverts() {
    assert_eq!(run("unless (false) { :yes } else { :no }"), r#""yes""#);
    assert_eq!(run("unless (true) { :yes }"), "nil");
}

#[test]
fn conditions_go_through_to_boolean() {
    assert_eq!(run("if (nil) { :yes } else { :no }"), r#""no""#);
    assert_eq!(run("if (0) { :yes } else { :no }"), r#""yes""#);
}

#[test]
fn blocks_get_their_own_frame() {
    let source = r#"
x = 1
if (true) { x = 2 }
x
"#;
    assert_eq!(run(source), "1");
}

#[test]
fn switch_compares_by_value() {
    let source = r#"
classify = -> (n) {
    switch (n) {
        case (1) { :one }
        case (2, 3) { :few }
        else { :many }
    }
}
[classify(1), classify(3), classify(9)]
"#;
    assert_eq!(run(source), r#"["one", "few", "many"]"#);
}

#[test]
fn unmatched_switch_without_else_fails() {
    let err = try_run("switch (4) { case (1) { :one } }").unwrap_err();
    assert!(matches!(err, RipError::Runtime { .. }));
}

#[test]
fn return_leaves_the_lambda() {
    let source = r#"
check = -> (x) {
    if (x == 0) { return :zero }
    :other
}
[check(0), check(1)]
"#;
    assert_eq!(run(source), r#"["zero", "other"]"#);
}

#[test]
fn exit_ends_the_module() {
    let source = r#"
stop = -> { exit 3 }
stop()
4
"#;
    assert_eq!(run(source), "3");
}

// === Exceptions ===

#[test]
fn catch_receives_thrown_value() {
    let source = r#"
try {
    throw :oops
    :unreachable
} catch (e) {
    e
}
"#;
    assert_eq!(run(source), r#""oops""#);
}

#[test]
fn runtime_errors_become_exceptions() {
    let source = r#"
try {
    nothing.here
} catch (e) {
    e.message
}
"#;
    assert_eq!(run(source), r#""Unknown reference `nothing`""#);
}

#[test]
fn typed_catch_filters_by_class() {
    let source = r#"
Exception = System.Exception
try {
    try {
        throw :plain
    } catch (Exception e) {
        :wrong
    }
} catch (e) {
    e
}
"#;
    assert_eq!(run(source), r#""plain""#);
}

#[test]
fn finally_runs_and_keeps_prior_outcome() {
    let source = r#"
try { 1 } finally { 2 }
"#;
    assert_eq!(run(source), "1");
}

#[test]
fn abrupt_finally_overrides() {
    let source = r#"
f = -> {
    try { return 1 } finally { return 2 }
}
f()
"#;
    assert_eq!(run(source), "2");
}

#[test]
fn finally_runs_when_catch_throws() {
    let source = r#"
log = System.Object.new()
outcome = try {
    try { throw :a } catch (e) { throw :b } finally { log.cleaned = 1 }
} catch (e) {
    e
}
[outcome, log.cleaned]
"#;
    assert_eq!(run(source), r#"["b", 1]"#);
}

#[test]
fn finally_runs_when_no_catch_matches() {
    let source = r#"
Exception = System.Exception
log = System.Object.new()
outcome = try {
    try { throw :a } catch (Exception e) { :wrong } finally { log.cleaned = 2 }
} catch (e) {
    e
}
[outcome, log.cleaned]
"#;
    assert_eq!(run(source), r#"["a", 2]"#);
}

#[test]
fn uncaught_throw_is_a_runtime_error() {
    let err = try_run("throw :boom").unwrap_err();
    assert!(matches!(err, RipError::Runtime { ref message, .. } if message.contains("boom")));
    assert_eq!(err.location().map(|location| location.column), Some(0));
}

// === Classes ===

#[test]
fn class_methods_see_receiver() {
    let source = r#"
Person = class {
    @.greet = -> (name) { "hello " + name + ", I am " + @.name }
}
bob = Person.new()
bob.name = :bob
bob.greet(:alice)
"#;
    assert_eq!(run(source), r#""hello alice, I am bob""#);
}

#[test]
fn anonymous_class_is_named_by_assignment() {
    assert_eq!(run("Person = class {}\nPerson"), "Person");
}

#[test]
fn subclass_inherits_methods() {
    let source = r#"
Animal = class {
    @.sound = -> { :generic }
    @.speak = -> { "says " + @.sound() }
}
Dog = class (Animal) {
    @.sound = -> { :woof }
}
Dog.new().speak()
"#;
    assert_eq!(run(source), r#""says woof""#);
}

#[test]
fn inheriting_from_non_class_fails() {
    assert!(matches!(try_run("x = 1\nclass (x) {}"), Err(RipError::Runtime { .. })));
}

// === Kernel ===

#[test]
fn operators_fold_left_without_precedence() {
    assert_eq!(run("1 + 2 * 3"), "9");
    assert_eq!(run("1 + (2 * 3)"), "7");
}

#[test]
fn numbers_promote_to_decimal() {
    assert_eq!(run("1.5 + 1"), "2.5");
    assert_eq!(run("7 / 2"), "3");
    assert_eq!(run("1_000 - 1"), "999");
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    assert!(matches!(try_run("1 / 0"), Err(RipError::Runtime { .. })));
}

#[test]
fn strings_concatenate_and_interpolate() {
    let source = r#"
name = :rip
"hello #{name}!"
"#;
    assert_eq!(run(source), r#""hello rip!""#);
}

#[test]
fn string_properties() {
    assert_eq!(run("'rip'.length"), "3");
    assert_eq!(run("'rip'.uppercase()"), r#""RIP""#);
    assert_eq!(run("'ab'.characters"), "[`a, `b]");
}

#[test]
fn collections() {
    assert_eq!(run("[1, 2] + [3]"), "[1, 2, 3]");
    assert_eq!(run("[1, 2].at(5)"), "nil");
    assert_eq!(run("{:a: 1, :b: 2}.at(:b)"), "2");
    assert_eq!(run("(1..3).end"), "3");
    assert_eq!(run("1...3"), "1...3");
}

#[test]
fn system_exposes_kernel_classes() {
    assert_eq!(run("'rip'.class == System.String"), "true");
    assert_eq!(run("System.Integer.ancestors"), "[Integer, Object]");
}

#[test]
fn rebinding_is_a_compiler_error() {
    assert!(matches!(try_run("x = 1\nx = 2"), Err(RipError::Compiler { .. })));
}

#[test]
fn unknown_property_reports_location() {
    let err = try_run("x = 1\nx.nope").unwrap_err();
    let location = err.location().expect("runtime errors carry a location");

    assert!(matches!(err, RipError::Runtime { .. }));
    assert_eq!(location.line, 2);
}
