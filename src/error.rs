//! # Error Definitions
//!
//! Every failure the front-end or the evaluator can produce is a [`RipError`]:
//!
//! - `Parse` - the grammar could not match the source
//! - `Compiler` - detected without evaluating anything (rebinding a name in one
//!   frame, a raw tree shape the normalizer does not know)
//! - `Runtime` - detected while evaluating (unknown property, no matching overload, ...)
//! - `Load` / `LoadIo` - `System.require` could not find or read a module
//! - `Internal` - a bug in the implementation itself, never a language-level error
//!
//! Only `Runtime` errors (and explicit `throw`s, which are not errors at all)
//! can be intercepted by a `catch` block.

use std::path::PathBuf;

use crate::location::Location;
use crate::parser::ParseError;

pub type RipResult<T> = Result<T, RipError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RipError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("compiler error: {message}{}", at(.location))]
    Compiler {
        message: String,
        location: Option<Location>,
    },

    #[error("runtime error: {message}{}", at(.location))]
    Runtime {
        message: String,
        location: Option<Location>,
    },

    #[error("load error: cannot find module `{name}` (searched {})", join_paths(.search_paths))]
    Load {
        name: String,
        search_paths: Vec<PathBuf>,
    },

    #[error("load error: cannot read `{}`: {message}", .path.display())]
    LoadIo { path: PathBuf, message: String },

    #[error("unexpected failure, please report: {0}")]
    Internal(String),
}

impl RipError {
    pub fn compiler(message: impl Into<String>) -> Self {
        RipError::Compiler {
            message: message.into(),
            location: None,
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        RipError::Runtime {
            message: message.into(),
            location: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        RipError::Internal(message.into())
    }

    /// Attach `location` unless the error already knows where it happened.
    pub fn at(self, location: &Location) -> Self {
        match self {
            RipError::Compiler {
                message,
                location: None,
            } => RipError::Compiler {
                message,
                location: Some(location.clone()),
            },
            RipError::Runtime {
                message,
                location: None,
            } => RipError::Runtime {
                message,
                location: Some(location.clone()),
            },
            other => other,
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            RipError::Parse(err) => err.location.as_ref(),
            RipError::Compiler { location, .. } | RipError::Runtime { location, .. } => {
                location.as_ref()
            }
            _ => None,
        }
    }

    /// Whether this is a bug in the implementation rather than in the program.
    pub fn is_internal(&self) -> bool {
        matches!(self, RipError::Internal(_))
    }
}

fn at(location: &Option<Location>) -> String {
    match location {
        Some(location) => format!(" (at {location})"),
        None => String::new(),
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "no search paths".to_string();
    }
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
