use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;

use crate::error::{RipError, RipResult};

struct Frame<V> {
    bindings: RefCell<HashMap<String, V>>,
    outer: Option<Scope<V>>,
    /// Opaque marker (the path of the module being evaluated) inherited by child frames
    origin: Option<Rc<str>>,
}

/// Manages lexical scoping during interpretation
///
/// A scope is a handle to one frame of a chain; cloning the handle shares the
/// frame. Lambdas keep such a handle as their closure, and each invocation
/// works in a fresh child of it, so the closure frame itself is never written
/// by a call.
pub struct Scope<V> {
    frame: Rc<Frame<V>>,
}

impl<V> Clone for Scope<V> {
    fn clone(&self) -> Self {
        Self {
            frame: Rc::clone(&self.frame),
        }
    }
}

impl<V: Clone> Scope<V> {
    /// Create an empty root scope
    pub fn new() -> Self {
        Self::with_parts(None, None)
    }

    fn with_parts(outer: Option<Scope<V>>, origin: Option<Rc<str>>) -> Self {
        Self {
            frame: Rc::new(Frame {
                bindings: RefCell::new(HashMap::new()),
                outer,
                origin,
            }),
        }
    }

    /// Enter a new frame nested in this one, inheriting the origin marker
    pub fn child(&self) -> Self {
        Self::with_parts(Some(self.clone()), self.frame.origin.clone())
    }

    /// Enter a new frame nested in this one with its own origin marker
    pub fn child_with_origin(&self, origin: impl Into<Rc<str>>) -> Self {
        Self::with_parts(Some(self.clone()), Some(origin.into()))
    }

    pub fn origin(&self) -> Option<Rc<str>> {
        self.frame.origin.clone()
    }

    /// Resolve a name by searching from the innermost to the outermost frame
    pub fn lookup(&self, name: &str) -> Option<V> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(value) = current.frame.bindings.borrow().get(name) {
                return Some(value.clone());
            }
            scope = current.frame.outer.as_ref();
        }
        None
    }

    /// Add a binding to this frame. A name is bound at most once per frame;
    /// shadowing it in a child frame is fine.
    pub fn bind(&self, name: impl Into<String>, value: V) -> RipResult<()> {
        let name = name.into();
        let mut bindings = self.frame.bindings.borrow_mut();
        if bindings.contains_key(&name) {
            return Err(RipError::compiler(format!(
                "`{name}` has already been defined in this scope"
            )));
        }
        bindings.insert(name, value);
        Ok(())
    }

    /// Whether `name` is bound in this very frame.
    pub fn has_own(&self, name: &str) -> bool {
        self.frame.bindings.borrow().contains_key(name)
    }

    /// All names reachable from this frame
    pub fn identifiers(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = self.frame.bindings.borrow().keys().cloned().collect();
        if let Some(outer) = &self.frame.outer {
            names.extend(outer.identifiers());
        }
        names
    }
}

impl<V: Clone> Default for Scope<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Scopes are equal when their frame chains hold the same bindings in the
/// same nesting; origin markers are not compared.
impl<V: PartialEq> PartialEq for Scope<V> {
    fn eq(&self, other: &Self) -> bool {
        if Rc::ptr_eq(&self.frame, &other.frame) {
            return true;
        }
        *self.frame.bindings.borrow() == *other.frame.bindings.borrow()
            && self.frame.outer == other.frame.outer
    }
}

impl<V> fmt::Debug for Scope<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: BTreeSet<String> = self.frame.bindings.borrow().keys().cloned().collect();
        f.debug_struct("Scope")
            .field("bindings", &names)
            .field("origin", &self.frame.origin)
            .field("outer", &self.frame.outer)
            .finish()
    }
}
