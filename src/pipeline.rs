//! Pipeline for processing Rip source from the command line.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::Context;

use rip::ast::debug::render;
use rip::interpreter::Driver;
use rip::{raw_parse_tree, syntax_tree};

use crate::cli::Tree;

/// Origin of source read from standard in
const STDIN: &str = "-";

/// Read `file`, or standard in when absent, returning `(origin, source)`.
fn load_source(file: Option<&Path>) -> anyhow::Result<(String, String)> {
    match file {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read `{}`", path.display()))?;
            Ok((path.display().to_string(), source))
        }
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("failed to read standard in")?;
            Ok((STDIN.to_string(), source))
        }
    }
}

/// Interpret a module and print its final value.
pub fn execute(file: Option<&Path>) -> anyhow::Result<()> {
    let (origin, source) = load_source(file)?;
    let module = syntax_tree(&origin, &source)?;

    let mut driver = Driver::new()?;
    let value = driver.interpret(&module)?;
    println!("{}", driver.inspect(value)?);
    Ok(())
}

/// Print the requested tree, one node per line, indented with tabs.
pub fn debug(tree: Tree, file: Option<&Path>) -> anyhow::Result<()> {
    let (origin, source) = load_source(file)?;
    let trace = match tree {
        Tree::RawParse => raw_parse_tree(&origin, &source)?.to_debug(0),
        Tree::Syntax => syntax_tree(&origin, &source)?.debug_trace(0),
    };
    print!("{}", render(&trace));
    Ok(())
}
