//! Tree-walking evaluation of normalized modules
//!
//! A [`Driver`] owns one [`Runtime`] (heap, kernel classes, global frame and
//! module cache) and evaluates modules against it. Every module runs in a
//! fresh child of the global frame, so top-level bindings of one module never
//! clash with another's.

mod eval;
mod kernel;
mod loader;
mod object;
mod runtime;
mod scope;

pub use eval::Flow;
pub use kernel::Kernel;
pub use loader::{FileSystemLoader, LoadedModule, ModuleLoader};
pub use object::{Lambda, NativeCall, Object, Overload, Parameter, Payload, Property, Value};
pub use runtime::Runtime;
pub use scope::Scope;

use std::env;
use std::path::PathBuf;

use crate::ast::Module;
use crate::error::RipResult;

use eval::run_statements;

/// Where `System.require` looks for modules after the requiring module's
/// own directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverConfig {
    pub search_paths: Vec<PathBuf>,
}

impl DriverConfig {
    /// The current directory followed by every entry of `RIP_PATH`.
    pub fn from_env() -> Self {
        let mut search_paths = vec![];
        if let Ok(current) = env::current_dir() {
            search_paths.push(current);
        }
        if let Some(paths) = env::var_os("RIP_PATH") {
            search_paths.extend(env::split_paths(&paths).filter(|path| !path.as_os_str().is_empty()));
        }
        Self { search_paths }
    }
}

pub struct Driver {
    runtime: Runtime,
}

impl Driver {
    /// A driver configured from the environment, loading modules from disk.
    pub fn new() -> RipResult<Self> {
        Self::with_config(DriverConfig::from_env())
    }

    pub fn with_config(config: DriverConfig) -> RipResult<Self> {
        Self::with_loader(Box::new(FileSystemLoader), config)
    }

    pub fn with_loader(loader: Box<dyn ModuleLoader>, config: DriverConfig) -> RipResult<Self> {
        tracing::debug!(search_paths = ?config.search_paths, "starting driver");
        Ok(Self {
            runtime: Runtime::new(loader, config.search_paths)?,
        })
    }

    /// A fresh frame nested in the globals, ready for one module.
    pub fn global_context(&self) -> Scope<Value> {
        self.runtime.globals().child()
    }

    /// Evaluate `module` in a fresh global context.
    #[tracing::instrument(skip_all, fields(origin = %module.location.origin))]
    pub fn interpret(&mut self, module: &Module) -> RipResult<Value> {
        let context = self
            .runtime
            .globals()
            .child_with_origin(&*module.location.origin);
        self.interpret_in(module, &context)
    }

    /// Evaluate `module` in `scope`. The result is the value of the last
    /// statement; `return` and `exit` at the top level end the module with
    /// their payload, an uncaught `throw` is a runtime error.
    pub fn interpret_in(&mut self, module: &Module, scope: &Scope<Value>) -> RipResult<Value> {
        match run_statements(&module.statements, &mut self.runtime, scope)? {
            Flow::Value(value) | Flow::Return(value) | Flow::Exit(value) => Ok(value),
            Flow::Throw { value, location } => Err(self.runtime.uncaught(value, location)?),
        }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut Runtime {
        &mut self.runtime
    }

    /// Bare text of a value (strings unquoted).
    pub fn display(&self, value: Value) -> RipResult<String> {
        self.runtime.display(value)
    }

    pub fn inspect(&self, value: Value) -> RipResult<String> {
        self.runtime.inspect(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax_tree;

    fn driver() -> Driver {
        Driver::with_config(DriverConfig::default()).unwrap()
    }

    #[test]
    fn test_global_context_sees_kernel_bindings() {
        let driver = driver();
        let context = driver.global_context();

        assert_eq!(context.lookup("nil"), Some(driver.runtime().nil()));
        assert!(context.lookup("System").is_some());
        assert!(context.lookup("true").is_some());
    }

    #[test]
    fn test_global_contexts_are_independent() {
        let driver = driver();
        let first = driver.global_context();
        first.bind("answer", driver.runtime().nil()).unwrap();

        assert_eq!(driver.global_context().lookup("answer"), None);
    }

    #[test]
    fn test_empty_module_is_nil() {
        let mut driver = driver();
        let module = syntax_tree("rspec", "").unwrap();
        let value = driver.interpret(&module).unwrap();

        assert_eq!(value, driver.runtime().nil());
    }

    #[test]
    fn test_top_level_exit_ends_module() {
        let mut driver = driver();
        let module = syntax_tree("rspec", "exit 7\n8").unwrap();
        let value = driver.interpret(&module).unwrap();

        assert_eq!(driver.inspect(value).unwrap(), "7");
    }
}
