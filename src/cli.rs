//! Command-line interface for Rip.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Rip - read and execute Rip source (from a file or standard in)
#[derive(Debug, Parser)]
#[command(name = "rip")]
#[command(author, about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// File to execute (standard in when absent)
    pub file: Option<PathBuf>,

    /// Make Rip chatty
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the compiler information for a file (or standard in)
    Debug {
        /// Type of tree to output
        #[arg(short, long, value_enum)]
        tree: Tree,

        file: Option<PathBuf>,
    },

    /// Print the version
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum Tree {
    /// Labeled tree straight out of the grammar
    RawParse,
    /// Normalized syntax tree
    #[value(alias = "parse")]
    Syntax,
}

impl Cli {
    /// Resolve the actual command to run
    pub fn resolve_command(&self) -> ResolvedCommand {
        match &self.command {
            Some(Commands::Debug { tree, file }) => ResolvedCommand::Debug {
                tree: *tree,
                file: file.clone(),
            },
            Some(Commands::Version) => ResolvedCommand::Version {
                verbose: self.verbose,
            },
            None => ResolvedCommand::Execute {
                file: self.file.clone(),
            },
        }
    }
}

/// Resolved command after processing CLI arguments
#[derive(Debug, PartialEq)]
pub enum ResolvedCommand {
    Execute { file: Option<PathBuf> },
    Debug { tree: Tree, file: Option<PathBuf> },
    Version { verbose: bool },
}
