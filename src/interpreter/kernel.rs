//! Kernel classes
//!
//! Built once per [`Runtime`] in a fixed order: Object, Boolean (with the
//! `true` and `false` singletons), Class, Lambda, Nil (with `nil`), Integer,
//! Decimal, Character, String, RegularExpression, List, Map, KeyValue, Range,
//! Exception and System. Every class shell exists before any member is
//! installed, since members are lambdas and need the Lambda class. After
//! bootstrap nothing patches the kernel prototypes.

use std::rc::Rc;

use crate::error::{RipError, RipResult};

use super::Runtime;
use super::object::{
    Heap, Lambda, NativeCall, Object, Overload, Payload, Property, Resolver, Value,
};
use super::scope::Scope;

/// Handles of the kernel classes and singletons.
#[derive(Debug, Clone)]
pub struct Kernel {
    pub object: Value,
    pub boolean: Value,
    pub true_value: Value,
    pub false_value: Value,
    pub class: Value,
    pub lambda: Value,
    pub nil_class: Value,
    pub nil: Value,
    pub integer: Value,
    pub decimal: Value,
    pub character: Value,
    pub string: Value,
    pub regular_expression: Value,
    pub list: Value,
    pub map: Value,
    pub key_value: Value,
    pub range: Value,
    pub exception: Value,
    pub system: Value,
}

impl Kernel {
    /// The classes exposed as `System.<Name>`.
    fn classes(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("Object", self.object),
            ("Boolean", self.boolean),
            ("Class", self.class),
            ("Lambda", self.lambda),
            ("Nil", self.nil_class),
            ("Integer", self.integer),
            ("Decimal", self.decimal),
            ("Character", self.character),
            ("String", self.string),
            ("RegularExpression", self.regular_expression),
            ("List", self.list),
            ("Map", self.map),
            ("KeyValue", self.key_value),
            ("Range", self.range),
            ("Exception", self.exception),
        ]
    }
}

/// Allocate an object whose `class` property is `class`.
pub(crate) fn instance(heap: &mut Heap, class: Value, payload: Payload) -> Value {
    let mut object = Object::new(payload);
    object
        .properties
        .insert("class".to_string(), Property::Plain(class));
    heap.alloc(object)
}

/// Allocate a class with an empty prototype under `@`.
///
/// Ancestors are the class itself, then each parent's ancestors in order
/// without repeats, with the root class (Object) moved last.
pub(crate) fn build_class(
    heap: &mut Heap,
    name: Option<String>,
    parents: &[Value],
    class_class: Option<Value>,
) -> RipResult<Value> {
    let prototype = heap.alloc(Object::new(Payload::Plain));

    let mut object = Object::new(Payload::Class {
        name,
        ancestors: vec![],
    });
    object
        .properties
        .insert("@".to_string(), Property::Plain(prototype));
    if let Some(class_class) = class_class {
        object
            .properties
            .insert("class".to_string(), Property::Plain(class_class));
    }
    let class = heap.alloc(object);

    let mut ancestors = vec![class];
    let mut roots = vec![];
    for parent in parents {
        let Payload::Class {
            ancestors: inherited,
            ..
        } = &heap.get(*parent)?.payload
        else {
            return Err(RipError::runtime("only classes can be inherited from"));
        };
        for ancestor in inherited {
            let is_root = matches!(
                &heap.get(*ancestor)?.payload,
                Payload::Class { ancestors, .. } if ancestors.len() == 1
            );
            let seen = ancestors.contains(ancestor) || roots.contains(ancestor);
            match (seen, is_root) {
                (true, _) => {}
                (false, true) => roots.push(*ancestor),
                (false, false) => ancestors.push(*ancestor),
            }
        }
    }
    ancestors.extend(roots);

    if let Payload::Class { ancestors: slot, .. } = &mut heap.get_mut(class)?.payload {
        *slot = ancestors;
    }
    Ok(class)
}

fn prototype_of(heap: &Heap, class: Value) -> RipResult<Value> {
    match heap.get(class)?.properties.get("@") {
        Some(Property::Plain(prototype)) => Ok(*prototype),
        _ => Err(RipError::internal("kernel class without a prototype")),
    }
}

/// Create every kernel class and singleton, install their members and bind
/// `System`, `true`, `false` and `nil` in `globals`.
pub(crate) fn bootstrap(heap: &mut Heap, globals: &Scope<Value>) -> RipResult<Kernel> {
    let object = build_class(heap, Some("Object".to_string()), &[], None)?;
    let boolean = build_class(heap, Some("Boolean".to_string()), &[object], None)?;
    let true_value = instance(heap, boolean, Payload::Boolean(true));
    let false_value = instance(heap, boolean, Payload::Boolean(false));

    // Class is its own class; the two classes built before it get patched
    let class = build_class(heap, Some("Class".to_string()), &[object], None)?;
    for built in [object, boolean, class] {
        heap.get_mut(built)?
            .properties
            .insert("class".to_string(), Property::Plain(class));
    }

    let mut shell = |name: &str| build_class(heap, Some(name.to_string()), &[object], Some(class));
    let lambda = shell("Lambda")?;
    let nil_class = shell("Nil")?;
    let integer = shell("Integer")?;
    let decimal = shell("Decimal")?;
    let character = shell("Character")?;
    let string = shell("String")?;
    let regular_expression = shell("RegularExpression")?;
    let list = shell("List")?;
    let map = shell("Map")?;
    let key_value = shell("KeyValue")?;
    let range = shell("Range")?;
    let exception = shell("Exception")?;
    let system = shell("System")?;
    let nil = instance(heap, nil_class, Payload::Nil);

    let kernel = Kernel {
        object,
        boolean,
        true_value,
        false_value,
        class,
        lambda,
        nil_class,
        nil,
        integer,
        decimal,
        character,
        string,
        regular_expression,
        list,
        map,
        key_value,
        range,
        exception,
        system,
    };

    let mut builder = Builder {
        heap,
        lambda_class: lambda,
    };
    builder.object_members(&kernel)?;
    builder.boolean_members(&kernel)?;
    builder.class_members(&kernel)?;
    builder.nil_members(&kernel)?;
    builder.number_members(kernel.integer)?;
    builder.number_members(kernel.decimal)?;
    builder.character_members(&kernel)?;
    builder.string_members(&kernel)?;
    builder.regular_expression_members(&kernel)?;
    builder.list_members(&kernel)?;
    builder.map_members(&kernel)?;
    builder.exception_members(&kernel)?;
    builder.system_members(&kernel)?;

    globals.bind("System", system)?;
    globals.bind("true", true_value)?;
    globals.bind("false", false_value)?;
    globals.bind("nil", nil)?;

    Ok(kernel)
}

/// Installs native members on kernel objects.
struct Builder<'h> {
    heap: &'h mut Heap,
    lambda_class: Value,
}

impl Builder<'_> {
    /// Add a native method to the prototype of `class`.
    fn method(
        &mut self,
        class: Value,
        name: &str,
        parameters: &[&str],
        body: impl Fn(&mut Runtime, NativeCall) -> RipResult<Value> + 'static,
    ) -> RipResult<()> {
        let prototype = prototype_of(self.heap, class)?;
        self.own_method(prototype, name, parameters, body)
    }

    /// Add a native method directly to `target`.
    fn own_method(
        &mut self,
        target: Value,
        name: &str,
        parameters: &[&str],
        body: impl Fn(&mut Runtime, NativeCall) -> RipResult<Value> + 'static,
    ) -> RipResult<()> {
        self.install(target, name, Overload::native(parameters, body))
    }

    /// Store a one-overload lambda under `name` on `target`.
    fn install(&mut self, target: Value, name: &str, overload: Overload) -> RipResult<()> {
        let lambda = instance(
            self.heap,
            self.lambda_class,
            Payload::Lambda(Lambda {
                closure: Scope::new(),
                overloads: Rc::new(vec![overload]),
                receiver: None,
            }),
        );
        self.insert(target, name, Property::Plain(lambda))
    }

    /// Add a property recomputed on every read to the prototype of `class`.
    fn dynamic(
        &mut self,
        class: Value,
        name: &str,
        resolve: impl Fn(&mut Runtime, &str, Value) -> RipResult<Value> + 'static,
    ) -> RipResult<()> {
        let prototype = prototype_of(self.heap, class)?;
        let resolver: Resolver = Rc::new(resolve);
        self.insert(prototype, name, Property::Dynamic(resolver))
    }

    fn insert(&mut self, target: Value, name: &str, property: Property) -> RipResult<()> {
        self.heap
            .get_mut(target)?
            .properties
            .insert(name.to_string(), property);
        Ok(())
    }

    fn object_members(&mut self, kernel: &Kernel) -> RipResult<()> {
        let object = kernel.object;
        self.method(object, "to_boolean", &[], |runtime, _| Ok(runtime.boolean(true)))?;
        self.method(object, "==", &["other"], |runtime, call| {
            let equal = runtime.equal(call.receiver()?, call.argument(0)?)?;
            Ok(runtime.boolean(equal))
        })?;
        self.method(object, "!=", &["other"], |runtime, call| {
            let equal = runtime.equal(call.receiver()?, call.argument(0)?)?;
            Ok(runtime.boolean(!equal))
        })?;
        self.method(object, "to_string", &[], |runtime, call| {
            let text = runtime.display(call.receiver()?)?;
            Ok(runtime.string(&text))
        })
    }

    fn boolean_members(&mut self, kernel: &Kernel) -> RipResult<()> {
        let boolean = kernel.boolean;
        self.method(boolean, "to_boolean", &[], |_, call| call.receiver())?;
        self.method(boolean, "!", &[], |runtime, call| {
            let receiver = call.receiver()?;
            Ok(runtime.boolean(!runtime.is_true(receiver)))
        })
    }

    fn class_members(&mut self, kernel: &Kernel) -> RipResult<()> {
        self.method(kernel.class, "new", &[], |runtime, call| {
            let class = call.receiver()?;
            Ok(runtime.instance(class, Payload::Plain))
        })?;
        self.dynamic(kernel.class, "ancestors", |runtime, _, class| {
            let ancestors = runtime.ancestors(class)?;
            Ok(runtime.list(ancestors))
        })
    }

    fn nil_members(&mut self, kernel: &Kernel) -> RipResult<()> {
        self.method(kernel.nil_class, "to_boolean", &[], |runtime, _| {
            Ok(runtime.boolean(false))
        })
    }

    fn number_members(&mut self, class: Value) -> RipResult<()> {
        for operator in ["+", "-", "*", "/", "%"] {
            self.method(class, operator, &["other"], move |runtime, call| {
                let left = number(runtime, call.receiver()?)?;
                let right = number(runtime, call.argument(0)?)?;
                arithmetic(runtime, operator, left, right)
            })?;
        }
        for operator in ["<", ">", "<=", ">="] {
            self.method(class, operator, &["other"], move |runtime, call| {
                let left = number(runtime, call.receiver()?)?.as_decimal();
                let right = number(runtime, call.argument(0)?)?.as_decimal();
                let holds = match operator {
                    "<" => left < right,
                    ">" => left > right,
                    "<=" => left <= right,
                    _ => left >= right,
                };
                Ok(runtime.boolean(holds))
            })?;
        }
        Ok(())
    }

    fn character_members(&mut self, kernel: &Kernel) -> RipResult<()> {
        let character = kernel.character;
        self.method(character, "uppercase", &[], |runtime, call| {
            let c = character_value(runtime, call.receiver()?)?;
            Ok(runtime.character(c.to_uppercase().next().unwrap_or(c)))
        })?;
        self.method(character, "lowercase", &[], |runtime, call| {
            let c = character_value(runtime, call.receiver()?)?;
            Ok(runtime.character(c.to_lowercase().next().unwrap_or(c)))
        })
    }

    fn string_members(&mut self, kernel: &Kernel) -> RipResult<()> {
        let string = kernel.string;
        self.method(string, "+", &["other"], |runtime, call| {
            let mut text = runtime.string_value(call.receiver()?)?;
            text.push_str(&text_value(runtime, call.argument(0)?)?);
            Ok(runtime.string(&text))
        })?;
        self.method(string, "uppercase", &[], |runtime, call| {
            let text = runtime.string_value(call.receiver()?)?.to_uppercase();
            Ok(runtime.string(&text))
        })?;
        self.method(string, "lowercase", &[], |runtime, call| {
            let text = runtime.string_value(call.receiver()?)?.to_lowercase();
            Ok(runtime.string(&text))
        })?;
        self.method(string, "to_string", &[], |_, call| call.receiver())?;
        self.dynamic(string, "length", |runtime, _, receiver| {
            let length = runtime.string_value(receiver)?.chars().count();
            Ok(runtime.integer(length as i64))
        })?;
        self.dynamic(string, "characters", |runtime, _, receiver| {
            let characters = runtime
                .string_value(receiver)?
                .chars()
                .map(|c| runtime.character(c))
                .collect();
            Ok(runtime.list(characters))
        })
    }

    fn regular_expression_members(&mut self, kernel: &Kernel) -> RipResult<()> {
        let regular_expression = kernel.regular_expression;
        self.method(regular_expression, "+", &["other"], |runtime, call| {
            let mut pattern = pattern_value(runtime, call.receiver()?)?;
            let other = call.argument(0)?;
            match runtime.payload(other)? {
                Payload::RegularExpression(more) => pattern.push_str(more),
                _ => pattern.push_str(&text_value(runtime, other)?),
            }
            Ok(runtime.regular_expression(pattern))
        })?;
        self.method(regular_expression, "to_string", &[], |runtime, call| {
            let pattern = pattern_value(runtime, call.receiver()?)?;
            Ok(runtime.string(&pattern))
        })
    }

    fn list_members(&mut self, kernel: &Kernel) -> RipResult<()> {
        let list = kernel.list;
        self.dynamic(list, "length", |runtime, _, receiver| {
            let length = list_items(runtime, receiver)?.len();
            Ok(runtime.integer(length as i64))
        })?;
        self.method(list, "+", &["other"], |runtime, call| {
            let mut items = list_items(runtime, call.receiver()?)?;
            items.extend(list_items(runtime, call.argument(0)?)?);
            Ok(runtime.list(items))
        })?;
        self.method(list, "at", &["index"], |runtime, call| {
            let items = list_items(runtime, call.receiver()?)?;
            let index = runtime.integer_value(call.argument(0)?)?;
            let item = usize::try_from(index)
                .ok()
                .and_then(|index| items.get(index).copied());
            Ok(item.unwrap_or_else(|| runtime.nil()))
        })
    }

    fn map_members(&mut self, kernel: &Kernel) -> RipResult<()> {
        let map = kernel.map;
        self.dynamic(map, "length", |runtime, _, receiver| {
            let length = map_pairs(runtime, receiver)?.len();
            Ok(runtime.integer(length as i64))
        })?;
        self.method(map, "at", &["key"], |runtime, call| {
            let wanted = call.argument(0)?;
            for pair in map_pairs(runtime, call.receiver()?)? {
                if let Payload::KeyValue { key, value } = runtime.payload(pair)? {
                    let (key, value) = (*key, *value);
                    if runtime.equal(key, wanted)? {
                        return Ok(value);
                    }
                }
            }
            Ok(runtime.nil())
        })
    }

    fn exception_members(&mut self, kernel: &Kernel) -> RipResult<()> {
        self.method(kernel.exception, "to_string", &[], |runtime, call| {
            let receiver = call.receiver()?;
            let text = match runtime.message_of(receiver)? {
                Some(message) => message,
                None => runtime.inspect(receiver)?,
            };
            Ok(runtime.string(&text))
        })
    }

    /// `System.require(name)` plus one delayed accessor per kernel class.
    fn system_members(&mut self, kernel: &Kernel) -> RipResult<()> {
        let system = kernel.system;
        let require = Overload::native_flow(&["name"], |runtime, call| {
            let name = runtime.string_value(call.argument(0)?)?;
            runtime.require(&name, &call.scope)
        });
        self.install(system, "require", require)?;

        for (name, class) in kernel.classes() {
            let resolver: Resolver =
                Rc::new(move |_: &mut Runtime, _: &str, _: Value| -> RipResult<Value> { Ok(class) });
            self.insert(system, name, Property::Delayed(resolver))?;
        }
        Ok(())
    }
}

// === Native helpers ===

#[derive(Debug, Clone, Copy)]
enum Number {
    Integer(i64),
    Decimal(f64),
}

impl Number {
    fn as_decimal(self) -> f64 {
        match self {
            Number::Integer(integer) => integer as f64,
            Number::Decimal(decimal) => decimal,
        }
    }
}

fn number(runtime: &Runtime, value: Value) -> RipResult<Number> {
    match runtime.payload(value)? {
        Payload::Integer(integer) => Ok(Number::Integer(*integer)),
        Payload::Decimal(decimal) => Ok(Number::Decimal(*decimal)),
        _ => Err(runtime.type_error("Integer or Decimal", value)?),
    }
}

/// Integers stay integers (checked); anything involving a decimal is a decimal.
fn arithmetic(runtime: &mut Runtime, operator: &str, left: Number, right: Number) -> RipResult<Value> {
    if let (Number::Integer(a), Number::Integer(b)) = (left, right) {
        if matches!(operator, "/" | "%") && b == 0 {
            return Err(RipError::runtime("division by zero"));
        }
        let result = match operator {
            "+" => a.checked_add(b),
            "-" => a.checked_sub(b),
            "*" => a.checked_mul(b),
            "/" => a.checked_div(b),
            _ => a.checked_rem(b),
        };
        return match result {
            Some(result) => Ok(runtime.integer(result)),
            None => Err(RipError::runtime(format!("integer overflow in {a} {operator} {b}"))),
        };
    }

    let (a, b) = (left.as_decimal(), right.as_decimal());
    let result = match operator {
        "+" => a + b,
        "-" => a - b,
        "*" => a * b,
        "/" => a / b,
        _ => a % b,
    };
    Ok(runtime.decimal(result))
}

fn character_value(runtime: &Runtime, value: Value) -> RipResult<char> {
    match runtime.payload(value)? {
        Payload::Character(character) => Ok(*character),
        _ => Err(runtime.type_error("Character", value)?),
    }
}

/// Text of a String or Character argument.
fn text_value(runtime: &Runtime, value: Value) -> RipResult<String> {
    match runtime.payload(value)? {
        Payload::String(characters) => Ok(characters.iter().collect()),
        Payload::Character(character) => Ok(character.to_string()),
        _ => Err(runtime.type_error("String", value)?),
    }
}

fn pattern_value(runtime: &Runtime, value: Value) -> RipResult<String> {
    match runtime.payload(value)? {
        Payload::RegularExpression(pattern) => Ok(pattern.clone()),
        _ => Err(runtime.type_error("RegularExpression", value)?),
    }
}

fn list_items(runtime: &Runtime, value: Value) -> RipResult<Vec<Value>> {
    match runtime.payload(value)? {
        Payload::List(items) => Ok(items.clone()),
        _ => Err(runtime.type_error("List", value)?),
    }
}

fn map_pairs(runtime: &Runtime, value: Value) -> RipResult<Vec<Value>> {
    match runtime.payload(value)? {
        Payload::Map(pairs) => Ok(pairs.clone()),
        _ => Err(runtime.type_error("Map", value)?),
    }
}
