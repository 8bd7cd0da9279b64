//! Runtime object model
//!
//! Every value is an [`Object`] living in the [`Heap`] arena and addressed by a
//! copyable [`Value`] handle. Objects are shared by handle: assignment and
//! argument passing never copy them. Handles stay valid for the lifetime of
//! the heap (nothing is ever freed), which also lets a class refer to itself.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::BlockBody;
use crate::error::{RipError, RipResult};
use crate::location::Location;

use super::Runtime;
use super::eval::Flow;
use super::scope::Scope;

/// Handle of an object in the [`Heap`]. Comparing handles is identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Value(usize);

impl Value {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Computes a property from `(key, receiver)`.
pub type Resolver = Rc<dyn Fn(&mut Runtime, &str, Value) -> RipResult<Value>>;

/// Body of a kernel-provided overload. Most natives only produce a value;
/// `System.require` may also hand back the abrupt outcome of a module.
pub type NativeFn = Rc<dyn Fn(&mut Runtime, NativeCall) -> RipResult<Flow>>;

/// How a stored property turns into a value when read.
#[derive(Clone)]
pub enum Property {
    /// Returned as is (lambdas get bound to the receiver first).
    Plain(Value),
    /// Recomputed on every read.
    Dynamic(Resolver),
    /// Computed on first read, then replaced by the result.
    Delayed(Resolver),
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Plain(value) => f.debug_tuple("Plain").field(value).finish(),
            Property::Dynamic(_) => f.write_str("Dynamic(..)"),
            Property::Delayed(_) => f.write_str("Delayed(..)"),
        }
    }
}

/// Everything a native overload gets to see about its call.
pub struct NativeCall {
    pub receiver: Option<Value>,
    pub arguments: Vec<Value>,
    /// Scope of the calling code
    pub scope: Scope<Value>,
    pub location: Location,
}

impl NativeCall {
    pub fn receiver(&self) -> RipResult<Value> {
        self.receiver
            .ok_or_else(|| RipError::internal("native method called without a receiver"))
    }

    pub fn argument(&self, index: usize) -> RipResult<Value> {
        self.arguments
            .get(index)
            .copied()
            .ok_or_else(|| RipError::internal(format!("missing argument {index}")))
    }
}

#[derive(Debug, Clone)]
pub enum Parameter {
    /// Binds the argument under this name.
    Binding(String),
    /// Accepts only arguments equal to this value.
    Matcher(Value),
}

#[derive(Clone)]
pub enum Body {
    Rip(BlockBody),
    Native(NativeFn),
}

#[derive(Clone)]
pub struct Overload {
    pub parameters: Vec<Parameter>,
    pub body: Body,
}

impl Overload {
    pub fn native(
        parameters: &[&str],
        body: impl Fn(&mut Runtime, NativeCall) -> RipResult<Value> + 'static,
    ) -> Self {
        Self::native_flow(parameters, move |runtime, call| body(runtime, call).map(Flow::Value))
    }

    pub fn native_flow(
        parameters: &[&str],
        body: impl Fn(&mut Runtime, NativeCall) -> RipResult<Flow> + 'static,
    ) -> Self {
        Self {
            parameters: parameters
                .iter()
                .map(|name| Parameter::Binding(name.to_string()))
                .collect(),
            body: Body::Native(Rc::new(body)),
        }
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

impl fmt::Debug for Overload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = match self.body {
            Body::Rip(_) => "rip",
            Body::Native(_) => "native",
        };
        f.debug_struct("Overload")
            .field("parameters", &self.parameters)
            .field("body", &body)
            .finish()
    }
}

/// A callable: its defining scope, its overloads and, once bound, the
/// receiver it was read from.
#[derive(Debug, Clone)]
pub struct Lambda {
    pub closure: Scope<Value>,
    pub overloads: Rc<Vec<Overload>>,
    pub receiver: Option<Value>,
}

/// Primitive data carried by an object next to its properties.
#[derive(Debug, Clone)]
pub enum Payload {
    Plain,
    Nil,
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    Character(char),
    String(Vec<char>),
    RegularExpression(String),
    List(Vec<Value>),
    /// Entries are KeyValue objects
    Map(Vec<Value>),
    KeyValue {
        key: Value,
        value: Value,
    },
    Range {
        start: Value,
        end: Value,
        exclusive: bool,
    },
    Lambda(Lambda),
    Class {
        name: Option<String>,
        /// Self first, then every parent's ancestors, `Object` last
        ancestors: Vec<Value>,
    },
}

#[derive(Debug, Clone)]
pub struct Object {
    pub properties: HashMap<String, Property>,
    pub payload: Payload,
}

impl Object {
    pub fn new(payload: Payload) -> Self {
        Self {
            properties: HashMap::new(),
            payload,
        }
    }

    /// The handle stored as a plain `class` property, if any.
    pub fn class(&self) -> Option<Value> {
        match self.properties.get("class") {
            Some(Property::Plain(class)) => Some(*class),
            _ => None,
        }
    }
}

/// Arena holding every object of one runtime.
#[derive(Debug, Default)]
pub struct Heap {
    objects: Vec<Object>,
}

impl Heap {
    pub fn alloc(&mut self, object: Object) -> Value {
        self.objects.push(object);
        Value(self.objects.len() - 1)
    }

    pub fn get(&self, value: Value) -> RipResult<&Object> {
        self.objects
            .get(value.0)
            .ok_or_else(|| RipError::internal(format!("dangling object handle {}", value.0)))
    }

    pub fn get_mut(&mut self, value: Value) -> RipResult<&mut Object> {
        self.objects
            .get_mut(value.0)
            .ok_or_else(|| RipError::internal(format!("dangling object handle {}", value.0)))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
