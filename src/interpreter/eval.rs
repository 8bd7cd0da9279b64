use crate::ast::*;
use crate::error::{RipError, RipResult};
use crate::location::Location;

use super::object::{Body, Overload, Parameter, Payload, Value};
use super::runtime::Runtime;
use super::scope::Scope;

/// Outcome of evaluating one node.
///
/// Anything but `Value` unwinds: `Return` up to the enclosing call, `Throw`
/// up to a catch that accepts it, `Exit` all the way out.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Value(Value),
    Return(Value),
    Throw { value: Value, location: Location },
    Exit(Value),
}

/// Unwrap a `Flow::Value`, handing every other outcome to the caller.
macro_rules! value_of {
    ($flow:expr) => {
        match $flow {
            Flow::Value(value) => value,
            abrupt => return Ok(abrupt),
        }
    };
}

/// Result of a helper that produces something other than a value but may
/// still be cut short by an abrupt flow.
enum Step<T> {
    Done(T),
    Abrupt(Flow),
}

/// Like `value_of!`, inside helpers returning a `Step`.
macro_rules! step_of {
    ($flow:expr) => {
        match $flow {
            Flow::Value(value) => value,
            abrupt => return Ok(Step::Abrupt(abrupt)),
        }
    };
}

/// Unwrap a `Step::Done`, handing an abrupt flow to the caller.
macro_rules! done_of {
    ($step:expr) => {
        match $step {
            Step::Done(done) => done,
            Step::Abrupt(abrupt) => return Ok(abrupt),
        }
    };
}

/// Evaluate statements in order in `scope`. The outcome is the last
/// non-comment value, or `nil` when there is none.
pub fn run_statements(
    statements: &[Node],
    runtime: &mut Runtime,
    scope: &Scope<Value>,
) -> RipResult<Flow> {
    let mut last = runtime.nil();
    for statement in statements {
        let value = value_of!(statement.evaluate(runtime, scope)?);
        if !statement.is_comment() {
            last = value;
        }
    }
    Ok(Flow::Value(last))
}

impl BlockBody {
    /// Run the block in a fresh child of `scope`.
    pub fn evaluate(&self, runtime: &mut Runtime, scope: &Scope<Value>) -> RipResult<Flow> {
        run_statements(&self.statements, runtime, &scope.child())
    }
}

impl Node {
    pub fn evaluate(&self, runtime: &mut Runtime, scope: &Scope<Value>) -> RipResult<Flow> {
        self.evaluate_node(runtime, scope)
            .map_err(|err| err.at(self.location()))
    }

    fn evaluate_node(&self, runtime: &mut Runtime, scope: &Scope<Value>) -> RipResult<Flow> {
        let value = match self {
            Node::Comment(_) => runtime.nil(),
            Node::Reference(Reference { name, .. }) => scope
                .lookup(name)
                .ok_or_else(|| RipError::runtime(format!("Unknown reference `{name}`")))?,
            Node::Integer(Integer { data, .. }) => {
                let integer = data.replace('_', "").parse::<i64>().map_err(|_| {
                    RipError::runtime(format!("integer literal `{data}` is out of range"))
                })?;
                runtime.integer(integer)
            }
            Node::Decimal(Decimal { data, .. }) => {
                let decimal = data
                    .replace('_', "")
                    .parse::<f64>()
                    .map_err(|_| RipError::runtime(format!("invalid decimal literal `{data}`")))?;
                runtime.decimal(decimal)
            }
            Node::Character(Character { data, .. }) => runtime.character(*data),
            Node::String(string) => runtime.string(&string.text()),
            Node::RegularExpression(pattern) => runtime.regular_expression(pattern.text()),
            Node::Interpolation(Interpolation { body, location }) => {
                let last = value_of!(run_statements(body, runtime, &scope.child())?);
                return runtime.send(last, "to_string", vec![], scope, location);
            }
            Node::KeyValue(pair) => value_of!(pair.evaluate(runtime, scope)?),
            Node::Range(Range {
                start,
                end,
                exclusive,
                ..
            }) => {
                let start = value_of!(start.evaluate(runtime, scope)?);
                let end = value_of!(end.evaluate(runtime, scope)?);
                runtime.range(start, end, *exclusive)?
            }
            Node::List(List { items, .. }) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(value_of!(item.evaluate(runtime, scope)?));
                }
                runtime.list(values)
            }
            Node::Map(Map { pairs, .. }) => {
                let mut values = Vec::with_capacity(pairs.len());
                for pair in pairs {
                    values.push(value_of!(pair.evaluate(runtime, scope)?));
                }
                runtime.map(values)
            }
            Node::Assignment(assignment) => value_of!(assignment.evaluate(runtime, scope)?),
            Node::Property(Property { object, name, .. }) => {
                let object = value_of!(object.evaluate(runtime, scope)?);
                runtime.get(object, name)?
            }
            Node::Invocation(Invocation {
                callable,
                arguments,
                location,
            }) => {
                let callable = value_of!(callable.evaluate(runtime, scope)?);
                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(value_of!(argument.evaluate(runtime, scope)?));
                }
                return runtime.call(callable, values, scope, location);
            }
            Node::Lambda(lambda) => {
                let overload = done_of!(lambda.overload(runtime, scope)?);
                runtime.lambda(scope.clone(), vec![overload])
            }
            Node::Overloads(Overloads { overloads, .. }) => {
                let mut compiled = Vec::with_capacity(overloads.len());
                for lambda in overloads {
                    compiled.push(done_of!(lambda.overload(runtime, scope)?));
                }
                runtime.lambda(scope.clone(), compiled)
            }
            Node::Class(class) => value_of!(class.evaluate(runtime, scope)?),
            Node::BlockBody(block) => return block.evaluate(runtime, scope),
            Node::If(conditional) => return conditional.evaluate(runtime, scope),
            Node::Switch(switch) => return switch.evaluate(runtime, scope),
            Node::Try(try_block) => return try_block.evaluate(runtime, scope),
            Node::Throw(Throw { payload, location }) => {
                let value = value_of!(payload.evaluate(runtime, scope)?);
                return Ok(Flow::Throw {
                    value,
                    location: location.clone(),
                });
            }
            Node::Return(Return { payload, .. }) => {
                let value = match payload {
                    Some(payload) => value_of!(payload.evaluate(runtime, scope)?),
                    None => runtime.nil(),
                };
                return Ok(Flow::Return(value));
            }
            Node::Exit(Exit { payload, .. }) => {
                let value = match payload {
                    Some(payload) => value_of!(payload.evaluate(runtime, scope)?),
                    None => runtime.nil(),
                };
                return Ok(Flow::Exit(value));
            }
        };

        Ok(Flow::Value(value))
    }
}

impl KeyValue {
    fn evaluate(&self, runtime: &mut Runtime, scope: &Scope<Value>) -> RipResult<Flow> {
        let key = value_of!(self.key.evaluate(runtime, scope)?);
        let value = value_of!(self.value.evaluate(runtime, scope)?);
        Ok(Flow::Value(runtime.key_value(key, value)?))
    }
}

impl Assignment {
    fn evaluate(&self, runtime: &mut Runtime, scope: &Scope<Value>) -> RipResult<Flow> {
        match self.target.as_ref() {
            Node::Reference(Reference { name, .. }) => {
                let value = value_of!(self.value.evaluate(runtime, scope)?);
                if runtime.is_class(value)? {
                    runtime.name_class(value, name)?;
                }
                scope.bind(name.as_str(), value)?;
                Ok(Flow::Value(value))
            }
            Node::Property(Property { object, name, .. }) => {
                let object = value_of!(object.evaluate(runtime, scope)?);
                let value = value_of!(self.value.evaluate(runtime, scope)?);
                runtime.set(object, name, value)?;
                Ok(Flow::Value(value))
            }
            other => Err(RipError::compiler(format!("cannot assign to {}", other.kind()))),
        }
    }
}

impl Lambda {
    /// The overload this literal stands for. Literal parameters become
    /// matchers, evaluated once when the lambda is created.
    fn overload(&self, runtime: &mut Runtime, scope: &Scope<Value>) -> RipResult<Step<Overload>> {
        let mut parameters = Vec::with_capacity(self.parameters.len());
        for parameter in &self.parameters {
            let parameter = match parameter {
                Node::Reference(Reference { name, .. }) => Parameter::Binding(name.clone()),
                literal => Parameter::Matcher(step_of!(literal.evaluate(runtime, scope)?)),
            };
            parameters.push(parameter);
        }

        Ok(Step::Done(Overload {
            parameters,
            body: Body::Rip(self.body.clone()),
        }))
    }
}

impl Class {
    /// Create the class, then run its body once with `self` bound to the
    /// class and `@` to its prototype.
    fn evaluate(&self, runtime: &mut Runtime, scope: &Scope<Value>) -> RipResult<Flow> {
        let mut parents = Vec::with_capacity(self.ancestors.len());
        for ancestor in &self.ancestors {
            let parent = value_of!(ancestor.evaluate(runtime, scope)?);
            if !runtime.is_class(parent)? {
                return Err(runtime.type_error("Class", parent)?.at(ancestor.location()));
            }
            parents.push(parent);
        }

        let class = runtime.new_class(None, &parents)?;
        let prototype = runtime.get(class, "@")?;

        let body_scope = scope.child();
        body_scope.bind("self", class)?;
        body_scope.bind("@", prototype)?;
        value_of!(run_statements(&self.body.statements, runtime, &body_scope)?);

        Ok(Flow::Value(class))
    }
}

/// Ask `value` for its boolean form; only the `true` singleton counts as true.
fn condition_holds(
    value: Value,
    runtime: &mut Runtime,
    scope: &Scope<Value>,
    location: &Location,
) -> RipResult<Step<bool>> {
    let boolean = step_of!(runtime.send(value, "to_boolean", vec![], scope, location)?);
    Ok(Step::Done(runtime.is_true(boolean)))
}

impl If {
    fn evaluate(&self, runtime: &mut Runtime, scope: &Scope<Value>) -> RipResult<Flow> {
        let condition = value_of!(self.condition.evaluate(runtime, scope)?);
        let holds = done_of!(condition_holds(condition, runtime, scope, &self.location)?);

        if holds {
            self.true_body.evaluate(runtime, scope)
        } else {
            self.false_body.evaluate(runtime, scope)
        }
    }
}

impl Switch {
    fn evaluate(&self, runtime: &mut Runtime, scope: &Scope<Value>) -> RipResult<Flow> {
        let subject = value_of!(self.subject.evaluate(runtime, scope)?);

        for case in &self.cases {
            for matcher in &case.matchers {
                let candidate = value_of!(matcher.evaluate(runtime, scope)?);
                if runtime.equal(subject, candidate)? {
                    return case.body.evaluate(runtime, scope);
                }
            }
        }

        match &self.else_block {
            Some(else_block) => else_block.body.evaluate(runtime, scope),
            None => Err(RipError::runtime(format!(
                "no case matches {}",
                runtime.inspect(subject)?
            ))),
        }
    }
}

impl Try {
    /// Runtime errors raised in the body are caught as Exception objects.
    /// `finally` always runs; if it ends abruptly, that outcome wins.
    fn evaluate(&self, runtime: &mut Runtime, scope: &Scope<Value>) -> RipResult<Flow> {
        let outcome = self.body.evaluate(runtime, scope);

        let caught = match &outcome {
            Ok(Flow::Throw { value, .. }) => Some(*value),
            Err(RipError::Runtime { message, .. }) => Some(runtime.exception(message)?),
            _ => None,
        };

        let outcome = match caught {
            Some(value) => match self.handler_for(value, runtime, scope)? {
                Some(catch) => {
                    let frame = scope.child();
                    frame.bind(catch.binding.name.as_str(), value)?;
                    catch.body.evaluate(runtime, &frame)
                }
                None => outcome,
            },
            None => outcome,
        };

        let Some(finally) = &self.finally else {
            return outcome;
        };
        match finally.body.evaluate(runtime, scope)? {
            Flow::Value(_) => outcome,
            abrupt => Ok(abrupt),
        }
    }

    /// The first catch accepting `value`: untyped catches take anything,
    /// typed ones compare class ancestry (or equality for non-class matchers).
    fn handler_for(
        &self,
        value: Value,
        runtime: &mut Runtime,
        scope: &Scope<Value>,
    ) -> RipResult<Option<&Catch>> {
        for catch in &self.catches {
            let Some(matcher) = &catch.matcher else {
                return Ok(Some(catch));
            };

            let expected = scope.lookup(&matcher.name).ok_or_else(|| {
                RipError::runtime(format!("Unknown reference `{}`", matcher.name))
                    .at(&matcher.location)
            })?;
            let accepts = match runtime.payload(expected)? {
                Payload::Class { .. } => runtime.is_a(value, expected)?,
                _ => runtime.equal(value, expected)?,
            };
            if accepts {
                return Ok(Some(catch));
            }
        }
        Ok(None)
    }
}
