//! Lexical scope chain: shadowing, single binding per frame, origin markers

use std::collections::BTreeSet;

use rip::error::RipError;
use rip::interpreter::Scope;

#[test]
fn child_shadows_without_touching_parent() {
    let parent = Scope::new();
    parent.bind("foo", 111).unwrap();
    parent.bind("bar", 222).unwrap();

    let child = parent.child();
    child.bind("bar", 333).unwrap();

    assert_eq!(parent.lookup("bar"), Some(222));
    assert_eq!(child.lookup("foo"), Some(111));
    assert_eq!(child.lookup("bar"), Some(333));
}

#[test]
fn rebinding_in_same_frame_is_a_compiler_error() {
    let scope = Scope::new();
    scope.bind("foo", 111).unwrap();

    let err = scope.bind("foo", 444).unwrap_err();
    assert!(matches!(err, RipError::Compiler { .. }));
    assert_eq!(scope.lookup("foo"), Some(111));
}

#[test]
fn unbound_names_are_absent() {
    let scope: Scope<i32> = Scope::new().child();
    assert_eq!(scope.lookup("nothing"), None);
}

#[test]
fn identifiers_reach_every_frame() {
    let parent = Scope::new();
    parent.bind("foo", 1).unwrap();
    let child = parent.child();
    child.bind("bar", 2).unwrap();

    let expected: BTreeSet<String> = ["bar", "foo"].iter().map(|s| s.to_string()).collect();
    assert_eq!(child.identifiers(), expected);
    assert_eq!(parent.identifiers().len(), 1);
}

#[test]
fn scopes_compare_by_bindings_and_nesting() {
    let build = |value: i32| {
        let root = Scope::new();
        root.bind("foo", 1).unwrap();
        let child = root.child();
        child.bind("bar", value).unwrap();
        child
    };

    assert_eq!(build(2), build(2));
    assert_ne!(build(2), build(3));

    let flat = Scope::new();
    flat.bind("foo", 1).unwrap();
    flat.bind("bar", 2).unwrap();
    assert_ne!(build(2), flat);
}

#[test]
fn origin_marker_is_inherited() {
    let module: Scope<i32> = Scope::new().child_with_origin("lib/rip.rip");
    let nested = module.child().child();

    assert_eq!(nested.origin().as_deref(), Some("lib/rip.rip"));
    assert_eq!(Scope::<i32>::new().origin(), None);
}
