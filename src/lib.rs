//! # Rip - A Dynamic, Object-Based Language
//!
//! Rip is a small dynamic language implemented in Rust. Everything is an
//! object: numbers, strings, lambdas and classes all carry properties that
//! are looked up on the object itself first and then on the prototypes of its
//! class ancestors.
//!
//! ## Architecture Overview
//!
//! The pipeline consists of the following stages:
//!
//! 1. **Parser** (`parser`) - Matches the source directly, without a separate
//!    lexing stage, using a PEG grammar built from parser combinators. The
//!    result is a raw parse tree of nodes labeled with rule names.
//! 2. **Normalizer** (`desugar`) - Turns the raw tree into the typed syntax
//!    tree (`ast`) and removes surface sugar along the way.
//! 3. **Interpreter** (`interpreter`) - Walks the syntax tree against a
//!    runtime holding the heap, the kernel classes and the global frame.
//!
//! ## Pipeline Flow
//!
//! ```text
//! Source Code (String)
//!     ↓
//! [Parser] → Raw Parse Tree (parser::RawNode)
//!     ↓
//! [Normalizer] → Syntax Tree (ast::Module)
//!     ↓
//! [Interpreter] → Runtime Value (interpreter::Value)
//! ```
//!
//! ## Key Design Decisions
//!
//! ### Operators are Method Calls
//! `a + b` normalizes to `a.+(b)`. Operator chains are flat and fold left,
//! so `1 + 2 * 3` is `(1 + 2) * 3`. There is no precedence table.
//!
//! ### Literal Overloads
//! A lambda may carry several overloads. A call picks the overload with the
//! right arity whose literal parameters all equal their arguments, preferring
//! the one with the most literal parameters:
//!
//! ```rip
//! describe = => {
//!     -> (x) { "some number" }
//!     -> (0) { "zero" }
//! }
//! describe(0)
//! ```
//!
//! ### Explicit Control Flow
//! Evaluation returns a tagged outcome (value, `return`, `throw` or `exit`)
//! instead of unwinding the Rust stack. Runtime errors raised inside a `try`
//! block become Exception objects a `catch` can intercept.
//!
//! ## Module Structure
//!
//! - [`location`] - Source positions carried by every node
//! - [`error`] - The [`error::RipError`] taxonomy
//! - [`parser`] - PEG combinators and the Rip grammar
//! - [`ast`] - Typed syntax tree and its debug trace
//! - [`desugar`] - Raw parse tree → syntax tree
//! - [`interpreter`] - Object model, kernel classes and evaluation
//! - [`about`] - Version information
//!
//! ## Getting Started
//!
//! 1. Parse and normalize source with [`syntax_tree()`]
//! 2. Create an [`interpreter::Driver`]
//! 3. Run the module with [`interpreter::Driver::interpret()`]

pub mod about;
pub mod ast;
pub mod desugar;
pub mod error;
pub mod interpreter;
pub mod location;
pub mod parser;

use error::RipResult;

/// The raw parse tree of `source`, named `origin` in locations.
pub fn raw_parse_tree(origin: &str, source: &str) -> RipResult<parser::RawNode> {
    Ok(parser::parse_source(origin, source)?)
}

/// The normalized syntax tree of `source`, named `origin` in locations.
pub fn syntax_tree(origin: &str, source: &str) -> RipResult<ast::Module> {
    let raw = raw_parse_tree(origin, source)?;
    desugar::normalize_module(&raw)
}
