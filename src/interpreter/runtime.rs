//! Object-model operations
//!
//! [`Runtime`] owns the heap, the kernel classes and the global frame. All
//! property access goes through [`Runtime::get`]: own properties first, then
//! the prototypes (`@`) of the receiver's class ancestors in order. What is
//! found is finalized according to its [`Property`] kind.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{RipError, RipResult};
use crate::location::Location;

use super::eval::{Flow, run_statements};
use super::kernel::{self, Kernel};
use super::loader::ModuleLoader;
use super::object::{
    Body, Heap, Lambda, NativeCall, Object, Overload, Parameter, Payload, Property, Value,
};
use super::scope::Scope;

pub struct Runtime {
    heap: Heap,
    kernel: Kernel,
    /// Root frame holding the kernel bindings (`System`, `true`, `false`, `nil`)
    globals: Scope<Value>,
    loader: Box<dyn ModuleLoader>,
    search_paths: Vec<PathBuf>,
    /// Required modules by resolved path
    modules: HashMap<PathBuf, Value>,
    /// Paths of modules whose evaluation is still running
    loading: HashSet<PathBuf>,
}

impl Runtime {
    /// Build the kernel and the global frame.
    pub fn new(loader: Box<dyn ModuleLoader>, search_paths: Vec<PathBuf>) -> RipResult<Self> {
        let mut heap = Heap::default();
        let globals = Scope::new();
        let kernel = kernel::bootstrap(&mut heap, &globals)?;
        tracing::debug!(objects = heap.len(), "kernel bootstrapped");

        Ok(Self {
            heap,
            kernel,
            globals,
            loader,
            search_paths,
            modules: HashMap::new(),
            loading: HashSet::new(),
        })
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn globals(&self) -> &Scope<Value> {
        &self.globals
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    pub fn object(&self, value: Value) -> RipResult<&Object> {
        self.heap.get(value)
    }

    pub fn payload(&self, value: Value) -> RipResult<&Payload> {
        Ok(&self.heap.get(value)?.payload)
    }

    // === Construction ===

    /// Allocate an object whose class is `class`.
    pub fn instance(&mut self, class: Value, payload: Payload) -> Value {
        kernel::instance(&mut self.heap, class, payload)
    }

    pub fn nil(&self) -> Value {
        self.kernel.nil
    }

    pub fn boolean(&self, value: bool) -> Value {
        if value {
            self.kernel.true_value
        } else {
            self.kernel.false_value
        }
    }

    pub fn integer(&mut self, value: i64) -> Value {
        self.instance(self.kernel.integer, Payload::Integer(value))
    }

    pub fn decimal(&mut self, value: f64) -> Value {
        self.instance(self.kernel.decimal, Payload::Decimal(value))
    }

    pub fn character(&mut self, value: char) -> Value {
        self.instance(self.kernel.character, Payload::Character(value))
    }

    pub fn string(&mut self, value: &str) -> Value {
        self.string_from_chars(value.chars().collect())
    }

    pub fn string_from_chars(&mut self, characters: Vec<char>) -> Value {
        self.instance(self.kernel.string, Payload::String(characters))
    }

    pub fn regular_expression(&mut self, pattern: String) -> Value {
        self.instance(
            self.kernel.regular_expression,
            Payload::RegularExpression(pattern),
        )
    }

    pub fn list(&mut self, items: Vec<Value>) -> Value {
        self.instance(self.kernel.list, Payload::List(items))
    }

    /// `pairs` must be KeyValue objects.
    pub fn map(&mut self, pairs: Vec<Value>) -> Value {
        self.instance(self.kernel.map, Payload::Map(pairs))
    }

    pub fn key_value(&mut self, key: Value, value: Value) -> RipResult<Value> {
        let pair = self.instance(self.kernel.key_value, Payload::KeyValue { key, value });
        self.set(pair, "key", key)?;
        self.set(pair, "value", value)?;
        Ok(pair)
    }

    pub fn range(&mut self, start: Value, end: Value, exclusive: bool) -> RipResult<Value> {
        let range = self.instance(
            self.kernel.range,
            Payload::Range {
                start,
                end,
                exclusive,
            },
        );
        self.set(range, "start", start)?;
        self.set(range, "end", end)?;
        let exclusive = self.boolean(exclusive);
        self.set(range, "exclusive", exclusive)?;
        Ok(range)
    }

    pub fn lambda(&mut self, closure: Scope<Value>, overloads: Vec<Overload>) -> Value {
        self.instance(
            self.kernel.lambda,
            Payload::Lambda(Lambda {
                closure,
                overloads: Rc::new(overloads),
                receiver: None,
            }),
        )
    }

    /// An Exception instance carrying `message`.
    pub fn exception(&mut self, message: &str) -> RipResult<Value> {
        let exception = self.instance(self.kernel.exception, Payload::Plain);
        let message = self.string(message);
        self.set(exception, "message", message)?;
        Ok(exception)
    }

    /// A new class with its own empty prototype. Without parents the class
    /// derives from Object.
    pub fn new_class(&mut self, name: Option<String>, parents: &[Value]) -> RipResult<Value> {
        let parents = if parents.is_empty() {
            vec![self.kernel.object]
        } else {
            parents.to_vec()
        };
        kernel::build_class(&mut self.heap, name, &parents, Some(self.kernel.class))
    }

    /// Name an anonymous class after the reference it is first assigned to.
    pub fn name_class(&mut self, class: Value, name: &str) -> RipResult<()> {
        if let Payload::Class { name: slot, .. } = &mut self.heap.get_mut(class)?.payload {
            if slot.is_none() {
                *slot = Some(name.to_string());
            }
        }
        Ok(())
    }

    // === Property resolution ===

    /// Read `key` from `receiver`, finalizing what is found.
    pub fn get(&mut self, receiver: Value, key: &str) -> RipResult<Value> {
        let Some((owner, property)) = self.find_property(receiver, key)? else {
            return Err(RipError::runtime(format!("Unknown property `{key}`")));
        };
        self.finalize(receiver, owner, key, property)
    }

    /// Whether `key` resolves anywhere on `receiver`'s chain.
    pub fn responds_to(&self, receiver: Value, key: &str) -> RipResult<bool> {
        Ok(self.find_property(receiver, key)?.is_some())
    }

    /// Write `key` into `object`'s own properties, shadowing any inherited one.
    pub fn set(&mut self, object: Value, key: &str, value: Value) -> RipResult<()> {
        self.set_property(object, key, Property::Plain(value))
    }

    pub fn set_property(&mut self, object: Value, key: &str, property: Property) -> RipResult<()> {
        self.heap
            .get_mut(object)?
            .properties
            .insert(key.to_string(), property);
        Ok(())
    }

    /// The object holding `key` for `receiver` and the raw property there.
    fn find_property(&self, receiver: Value, key: &str) -> RipResult<Option<(Value, Property)>> {
        let object = self.heap.get(receiver)?;
        if let Some(property) = object.properties.get(key) {
            return Ok(Some((receiver, property.clone())));
        }

        let Some(class) = object.class() else {
            return Ok(None);
        };

        for ancestor in self.ancestors(class)? {
            let Some(Property::Plain(prototype)) = self.heap.get(ancestor)?.properties.get("@")
            else {
                continue;
            };
            if let Some(property) = self.heap.get(*prototype)?.properties.get(key) {
                return Ok(Some((*prototype, property.clone())));
            }
        }

        Ok(None)
    }

    fn finalize(
        &mut self,
        receiver: Value,
        owner: Value,
        key: &str,
        property: Property,
    ) -> RipResult<Value> {
        match property {
            Property::Plain(value) => self.bind(value, receiver),
            Property::Dynamic(resolve) => resolve(self, key, receiver),
            Property::Delayed(resolve) => {
                tracing::trace!(key, "resolving delayed property");
                let value = resolve(self, key, receiver)?;
                self.set(owner, key, value)?;
                self.bind(value, receiver)
            }
        }
    }

    /// A copy of `lambda` bound to `receiver`; anything else is returned unchanged.
    pub fn bind(&mut self, lambda: Value, receiver: Value) -> RipResult<Value> {
        let Payload::Lambda(unbound) = &self.heap.get(lambda)?.payload else {
            return Ok(lambda);
        };

        let bound = Lambda {
            closure: unbound.closure.clone(),
            overloads: Rc::clone(&unbound.overloads),
            receiver: Some(receiver),
        };
        Ok(self.instance(self.kernel.lambda, Payload::Lambda(bound)))
    }

    // === Classes ===

    pub fn class_of(&self, value: Value) -> RipResult<Option<Value>> {
        Ok(self.heap.get(value)?.class())
    }

    /// Ancestors of `class`, itself first. A plain object used as a class is
    /// its own only ancestor.
    pub fn ancestors(&self, class: Value) -> RipResult<Vec<Value>> {
        match &self.heap.get(class)?.payload {
            Payload::Class { ancestors, .. } => Ok(ancestors.clone()),
            _ => Ok(vec![class]),
        }
    }

    pub fn is_class(&self, value: Value) -> RipResult<bool> {
        Ok(matches!(self.payload(value)?, Payload::Class { .. }))
    }

    /// Whether `class` is among the ancestors of `value`'s class.
    pub fn is_a(&self, value: Value, class: Value) -> RipResult<bool> {
        match self.class_of(value)? {
            Some(own) => Ok(self.ancestors(own)?.contains(&class)),
            None => Ok(false),
        }
    }

    pub fn class_name(&self, class: Value) -> RipResult<Option<String>> {
        match &self.heap.get(class)?.payload {
            Payload::Class { name, .. } => Ok(name.clone()),
            _ => Ok(None),
        }
    }

    // === Invocation ===

    /// Call `callable` with `arguments`.
    ///
    /// The overload is chosen among those of matching arity whose literal
    /// matchers all equal their arguments; the one with the most matchers
    /// wins, declaration order breaking ties. A Rip body runs in a fresh
    /// child of the closure, so a lambda calling itself never shares a frame.
    #[tracing::instrument(level = "trace", skip(self, arguments, caller), fields(arity = arguments.len()))]
    pub fn call(
        &mut self,
        callable: Value,
        arguments: Vec<Value>,
        caller: &Scope<Value>,
        location: &Location,
    ) -> RipResult<Flow> {
        let Payload::Lambda(lambda) = self.payload(callable)? else {
            return Err(RipError::runtime(format!(
                "{} is not callable",
                self.inspect(callable)?
            )));
        };
        let lambda = lambda.clone();

        let Some(index) = self.select_overload(&lambda.overloads, &arguments)? else {
            return Err(RipError::runtime(format!(
                "no matching overload for {} argument(s)",
                arguments.len()
            )));
        };
        tracing::trace!(overload = index, "dispatching");

        let overload = &lambda.overloads[index];
        match &overload.body {
            Body::Native(native) => {
                let native = Rc::clone(native);
                native(
                    self,
                    NativeCall {
                        receiver: lambda.receiver,
                        arguments,
                        scope: caller.clone(),
                        location: location.clone(),
                    },
                )
            }
            Body::Rip(body) => {
                let frame = lambda.closure.child();
                if let Some(receiver) = lambda.receiver {
                    frame.bind("@", receiver)?;
                }
                for (parameter, argument) in overload.parameters.iter().zip(&arguments) {
                    if let Parameter::Binding(name) = parameter {
                        frame.bind(name.as_str(), *argument)?;
                    }
                }

                match run_statements(&body.statements, self, &frame)? {
                    Flow::Return(value) => Ok(Flow::Value(value)),
                    other => Ok(other),
                }
            }
        }
    }

    fn select_overload(
        &self,
        overloads: &[Overload],
        arguments: &[Value],
    ) -> RipResult<Option<usize>> {
        let mut best: Option<(usize, usize)> = None;

        'overloads: for (index, overload) in overloads.iter().enumerate() {
            if overload.arity() != arguments.len() {
                continue;
            }

            let mut matchers = 0;
            for (parameter, argument) in overload.parameters.iter().zip(arguments) {
                if let Parameter::Matcher(expected) = parameter {
                    if !self.equal(*expected, *argument)? {
                        continue 'overloads;
                    }
                    matchers += 1;
                }
            }

            if best.is_none_or(|(_, most)| matchers > most) {
                best = Some((index, matchers));
            }
        }

        Ok(best.map(|(index, _)| index))
    }

    /// Read `method` from `receiver` and call it.
    pub fn send(
        &mut self,
        receiver: Value,
        method: &str,
        arguments: Vec<Value>,
        caller: &Scope<Value>,
        location: &Location,
    ) -> RipResult<Flow> {
        let callable = self.get(receiver, method)?;
        self.call(callable, arguments, caller, location)
    }

    // === Equality ===

    /// Value equality: payloads for literals and collections, identity otherwise.
    pub fn equal(&self, left: Value, right: Value) -> RipResult<bool> {
        if left == right {
            return Ok(true);
        }

        let equal = match (self.payload(left)?, self.payload(right)?) {
            (Payload::Nil, Payload::Nil) => true,
            (Payload::Boolean(a), Payload::Boolean(b)) => a == b,
            (Payload::Integer(a), Payload::Integer(b)) => a == b,
            (Payload::Decimal(a), Payload::Decimal(b)) => a == b,
            (Payload::Integer(a), Payload::Decimal(b)) => (*a as f64) == *b,
            (Payload::Decimal(a), Payload::Integer(b)) => *a == (*b as f64),
            (Payload::Character(a), Payload::Character(b)) => a == b,
            (Payload::String(a), Payload::String(b)) => a == b,
            (Payload::RegularExpression(a), Payload::RegularExpression(b)) => a == b,
            (Payload::List(a), Payload::List(b)) | (Payload::Map(a), Payload::Map(b)) => {
                self.all_equal(a, b)?
            }
            (
                Payload::KeyValue { key, value },
                Payload::KeyValue {
                    key: other_key,
                    value: other_value,
                },
            ) => self.equal(*key, *other_key)? && self.equal(*value, *other_value)?,
            (
                Payload::Range {
                    start,
                    end,
                    exclusive,
                },
                Payload::Range {
                    start: other_start,
                    end: other_end,
                    exclusive: other_exclusive,
                },
            ) => {
                exclusive == other_exclusive
                    && self.equal(*start, *other_start)?
                    && self.equal(*end, *other_end)?
            }
            _ => false,
        };

        Ok(equal)
    }

    fn all_equal(&self, left: &[Value], right: &[Value]) -> RipResult<bool> {
        if left.len() != right.len() {
            return Ok(false);
        }
        for (a, b) in left.iter().zip(right) {
            if !self.equal(*a, *b)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn is_true(&self, value: Value) -> bool {
        value == self.kernel.true_value
    }

    // === Accessors ===

    pub fn string_value(&self, value: Value) -> RipResult<String> {
        match self.payload(value)? {
            Payload::String(characters) => Ok(characters.iter().collect()),
            _ => Err(self.type_error("String", value)?),
        }
    }

    pub fn integer_value(&self, value: Value) -> RipResult<i64> {
        match self.payload(value)? {
            Payload::Integer(integer) => Ok(*integer),
            _ => Err(self.type_error("Integer", value)?),
        }
    }

    pub fn type_error(&self, expected: &str, found: Value) -> RipResult<RipError> {
        Ok(RipError::runtime(format!(
            "expected {expected}, found {}",
            self.inspect(found)?
        )))
    }

    /// The `message` of an exception, if `value` carries one.
    pub fn message_of(&self, value: Value) -> RipResult<Option<String>> {
        match self.heap.get(value)?.properties.get("message") {
            Some(Property::Plain(message)) => match self.payload(*message)? {
                Payload::String(characters) => Ok(Some(characters.iter().collect())),
                _ => Ok(None),
            },
            _ => Ok(None),
        }
    }

    /// The error reported for a throw nothing caught.
    pub fn uncaught(&self, value: Value, location: Location) -> RipResult<RipError> {
        let description = match self.message_of(value)? {
            Some(message) => message,
            None => self.inspect(value)?,
        };
        Ok(RipError::Runtime {
            message: format!("uncaught {description}"),
            location: Some(location),
        })
    }

    // === Text ===

    /// Human-readable form: strings and characters as their bare text.
    pub fn display(&self, value: Value) -> RipResult<String> {
        match self.payload(value)? {
            Payload::String(characters) => Ok(characters.iter().collect()),
            Payload::Character(character) => Ok(character.to_string()),
            _ => self.inspect(value),
        }
    }

    /// Debug form, strings quoted.
    pub fn inspect(&self, value: Value) -> RipResult<String> {
        let text = match self.payload(value)? {
            Payload::Plain => match self.message_of(value)? {
                Some(message) => format!("#<Exception: {message}>"),
                None => {
                    let class = match self.class_of(value)? {
                        Some(class) => self.class_name(class)?,
                        None => None,
                    };
                    format!("#<{}>", class.unwrap_or_else(|| "Object".to_string()))
                }
            },
            Payload::Nil => "nil".to_string(),
            Payload::Boolean(boolean) => boolean.to_string(),
            Payload::Integer(integer) => integer.to_string(),
            Payload::Decimal(decimal) => format!("{decimal:?}"),
            Payload::Character(character) => format!("`{character}"),
            Payload::String(characters) => format!("{:?}", characters.iter().collect::<String>()),
            Payload::RegularExpression(pattern) => format!("/{pattern}/"),
            Payload::List(items) => format!("[{}]", self.inspect_all(items)?),
            Payload::Map(pairs) => format!("{{{}}}", self.inspect_all(pairs)?),
            Payload::KeyValue { key, value } => {
                format!("{}: {}", self.inspect(*key)?, self.inspect(*value)?)
            }
            Payload::Range {
                start,
                end,
                exclusive,
            } => {
                let dots = if *exclusive { "..." } else { ".." };
                format!("{}{dots}{}", self.inspect(*start)?, self.inspect(*end)?)
            }
            Payload::Lambda(_) => "#<Lambda>".to_string(),
            Payload::Class { name, .. } => name.clone().unwrap_or_else(|| "#<Class>".to_string()),
        };
        Ok(text)
    }

    fn inspect_all(&self, values: &[Value]) -> RipResult<String> {
        let parts = values
            .iter()
            .map(|value| self.inspect(*value))
            .collect::<RipResult<Vec<_>>>()?;
        Ok(parts.join(", "))
    }

    // === Modules ===

    /// Load `name` and evaluate it in a fresh child of the global frame whose
    /// origin is the loaded file. Modules are evaluated once per path; a module
    /// requiring itself, directly or through others, is a runtime error.
    ///
    /// A `throw` nothing in the module caught and an `exit` both leave the
    /// module and continue unwinding in the requiring code.
    pub fn require(&mut self, name: &str, scope: &Scope<Value>) -> RipResult<Flow> {
        let mut search_paths = vec![];
        if let Some(origin) = scope.origin() {
            if let Some(directory) = Path::new(&*origin).parent() {
                search_paths.push(if directory.as_os_str().is_empty() {
                    PathBuf::from(".")
                } else {
                    directory.to_path_buf()
                });
            }
        }
        search_paths.extend(self.search_paths.iter().cloned());

        let loaded = self.loader.load(name, &search_paths)?;
        if let Some(value) = self.modules.get(&loaded.path) {
            return Ok(Flow::Value(*value));
        }
        if !self.loading.insert(loaded.path.clone()) {
            return Err(RipError::runtime(format!(
                "circular require of `{}`",
                loaded.path.display()
            )));
        }
        tracing::debug!(module = name, path = %loaded.path.display(), "evaluating module");

        let context = self
            .globals
            .child_with_origin(&*loaded.path.to_string_lossy());
        let outcome = run_statements(&loaded.module.statements, self, &context);
        self.loading.remove(&loaded.path);

        match outcome? {
            Flow::Value(value) | Flow::Return(value) => {
                self.modules.insert(loaded.path, value);
                Ok(Flow::Value(value))
            }
            abrupt => Ok(abrupt),
        }
    }
}
