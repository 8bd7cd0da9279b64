//! Object model: property resolution order and property kinds

use std::cell::Cell;
use std::rc::Rc;

use rip::error::{RipError, RipResult};
use rip::interpreter::{Driver, DriverConfig, Flow, Payload, Property, Runtime, Scope, Value};
use rip::location::Location;
use rip::syntax_tree;

fn driver() -> Driver {
    Driver::with_config(DriverConfig::default()).expect("kernel bootstraps")
}

/// A fresh class deriving from Object, plus its prototype.
fn class_with_prototype(runtime: &mut Runtime, name: &str) -> (Value, Value) {
    let class = runtime.new_class(Some(name.to_string()), &[]).unwrap();
    let prototype = runtime.get(class, "@").unwrap();
    (class, prototype)
}

#[test]
fn own_property_shadows_ancestor() {
    let mut driver = driver();
    let runtime = driver.runtime_mut();
    let (class, prototype) = class_with_prototype(runtime, "Person");

    let inherited = runtime.string("inherited");
    runtime.set(prototype, "name", inherited).unwrap();

    let person = runtime.instance(class, Payload::Plain);
    assert_eq!(runtime.get(person, "name").unwrap(), inherited);

    let own = runtime.string("own");
    runtime.set(person, "name", own).unwrap();
    assert_eq!(runtime.get(person, "name").unwrap(), own);

    let other = runtime.instance(class, Payload::Plain);
    assert_eq!(runtime.get(other, "name").unwrap(), inherited);
}

#[test]
fn nearer_ancestor_wins() {
    let mut driver = driver();
    let runtime = driver.runtime_mut();
    let (animal, animal_prototype) = class_with_prototype(runtime, "Animal");
    let dog = runtime.new_class(Some("Dog".to_string()), &[animal]).unwrap();
    let dog_prototype = runtime.get(dog, "@").unwrap();

    let generic = runtime.string("...");
    let bark = runtime.string("woof");
    runtime.set(animal_prototype, "sound", generic).unwrap();
    runtime.set(dog_prototype, "sound", bark).unwrap();

    let rex = runtime.instance(dog, Payload::Plain);
    assert_eq!(runtime.get(rex, "sound").unwrap(), bark);

    let object = runtime.kernel().object;
    assert_eq!(runtime.ancestors(dog).unwrap(), vec![dog, animal, object]);
}

#[test]
fn unknown_property_is_a_runtime_error() {
    let mut driver = driver();
    let runtime = driver.runtime_mut();
    let object = runtime.kernel().object;
    let thing = runtime.instance(object, Payload::Plain);

    let err = runtime.get(thing, "missing").unwrap_err();
    assert!(matches!(err, RipError::Runtime { ref message, .. } if message.contains("missing")));
}

#[test]
fn dynamic_property_recomputes_on_every_read() {
    let mut driver = driver();
    let runtime = driver.runtime_mut();
    let object = runtime.kernel().object;
    let counter = runtime.instance(object, Payload::Plain);

    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    let resolve = move |runtime: &mut Runtime, _: &str, _: Value| -> RipResult<Value> {
        seen.set(seen.get() + 1);
        Ok(runtime.integer(seen.get()))
    };
    runtime
        .set_property(counter, "next", Property::Dynamic(Rc::new(resolve)))
        .unwrap();

    let first = runtime.get(counter, "next").unwrap();
    let second = runtime.get(counter, "next").unwrap();

    assert_eq!(runtime.integer_value(first).unwrap(), 1);
    assert_eq!(runtime.integer_value(second).unwrap(), 2);
    assert_eq!(calls.get(), 2);
}

#[test]
fn delayed_property_resolves_once() {
    let mut driver = driver();
    let runtime = driver.runtime_mut();
    let object = runtime.kernel().object;
    let lazy = runtime.instance(object, Payload::Plain);

    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    let resolve = move |runtime: &mut Runtime, key: &str, _: Value| -> RipResult<Value> {
        seen.set(seen.get() + 1);
        Ok(runtime.string(key))
    };
    runtime
        .set_property(lazy, "answer", Property::Delayed(Rc::new(resolve)))
        .unwrap();

    let first = runtime.get(lazy, "answer").unwrap();
    let second = runtime.get(lazy, "answer").unwrap();
    let third = runtime.get(lazy, "answer").unwrap();

    assert_eq!(calls.get(), 1);
    assert_eq!(first, second);
    assert_eq!(second, third);
    assert_eq!(runtime.string_value(first).unwrap(), "answer");
}

#[test]
fn delayed_lambda_is_bound_to_the_receiver() {
    let mut driver = driver();
    let module = syntax_tree("rspec", "-> { @ }").unwrap();
    let method = driver.interpret(&module).unwrap();

    let runtime = driver.runtime_mut();
    let object = runtime.kernel().object;
    let thing = runtime.instance(object, Payload::Plain);
    let resolve = move |_: &mut Runtime, _: &str, _: Value| -> RipResult<Value> { Ok(method) };
    runtime
        .set_property(thing, "me", Property::Delayed(Rc::new(resolve)))
        .unwrap();

    let location = Location::start("rspec");
    for _ in 0..2 {
        let bound = runtime.get(thing, "me").unwrap();
        let flow = runtime.call(bound, vec![], &Scope::new(), &location).unwrap();
        assert_eq!(flow, Flow::Value(thing));
    }
}

#[test]
fn lambdas_are_bound_to_the_receiver() {
    let mut driver = driver();
    let runtime = driver.runtime_mut();
    let text = runtime.string("rip");

    let method = runtime.get(text, "uppercase").unwrap();
    let Payload::Lambda(lambda) = runtime.payload(method).unwrap() else {
        panic!("expected a lambda");
    };
    assert_eq!(lambda.receiver, Some(text));
}

#[test]
fn class_objects_are_shared() {
    let mut driver = driver();
    let runtime = driver.runtime_mut();
    let one = runtime.integer(1);
    let two = runtime.integer(2);

    assert_eq!(runtime.class_of(one).unwrap(), runtime.class_of(two).unwrap());
    assert_eq!(runtime.class_of(one).unwrap(), Some(runtime.kernel().integer));
}

#[test]
fn kernel_classes_are_their_own_class() {
    let driver = driver();
    let runtime = driver.runtime();
    let class = runtime.kernel().class;

    assert_eq!(runtime.class_of(class).unwrap(), Some(class));
    assert_eq!(runtime.class_of(runtime.kernel().object).unwrap(), Some(class));
}

#[test]
fn value_equality_compares_payloads() {
    let mut driver = driver();
    let runtime = driver.runtime_mut();
    let a = runtime.string("rip");
    let b = runtime.string("rip");
    let c = runtime.integer(3);
    let d = runtime.decimal(3.0);

    assert_ne!(a, b);
    assert!(runtime.equal(a, b).unwrap());
    assert!(runtime.equal(c, d).unwrap());
    assert!(!runtime.equal(a, c).unwrap());
}
