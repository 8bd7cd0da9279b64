use std::fs;
use std::path::{Path, PathBuf};

use crate::ast::Module;
use crate::desugar::normalize_module;
use crate::error::{RipError, RipResult};
use crate::parser::parse_source;

/// A module found by a [`ModuleLoader`], already normalized.
#[derive(Debug, Clone)]
pub struct LoadedModule {
    /// Resolved path; modules are cached under it
    pub path: PathBuf,
    pub module: Module,
}

/// Resolves the argument of `System.require` to a module.
pub trait ModuleLoader {
    fn load(&self, name: &str, search_paths: &[PathBuf]) -> RipResult<LoadedModule>;
}

/// Looks for `<dir>/<name>` and then `<dir>/<name>.rip` in every search path.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystemLoader;

impl FileSystemLoader {
    fn candidates(name: &str, search_paths: &[PathBuf]) -> Vec<PathBuf> {
        search_paths
            .iter()
            .flat_map(|directory| {
                [
                    directory.join(name),
                    directory.join(format!("{name}.rip")),
                ]
            })
            .collect()
    }

    fn read(path: &Path) -> RipResult<LoadedModule> {
        let source = fs::read_to_string(path).map_err(|err| RipError::LoadIo {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let origin = path.to_string_lossy();
        let raw = parse_source(&origin, &source)?;
        let module = normalize_module(&raw)?;

        Ok(LoadedModule {
            path: path.to_path_buf(),
            module,
        })
    }
}

impl ModuleLoader for FileSystemLoader {
    fn load(&self, name: &str, search_paths: &[PathBuf]) -> RipResult<LoadedModule> {
        let found = Self::candidates(name, search_paths)
            .into_iter()
            .find(|candidate| candidate.is_file());

        match found {
            Some(path) => {
                tracing::trace!(module = name, path = %path.display(), "module found");
                Self::read(&path)
            }
            None => Err(RipError::Load {
                name: name.to_string(),
                search_paths: search_paths.to_vec(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_is_tried_before_extension() {
        let candidates = FileSystemLoader::candidates("lib", &[PathBuf::from("a"), PathBuf::from("b")]);

        assert_eq!(
            candidates,
            vec![
                PathBuf::from("a/lib"),
                PathBuf::from("a/lib.rip"),
                PathBuf::from("b/lib"),
                PathBuf::from("b/lib.rip"),
            ]
        );
    }

    #[test]
    fn test_missing_module_lists_search_paths() {
        let err = FileSystemLoader
            .load("nowhere", &[PathBuf::from("/definitely/not/here")])
            .unwrap_err();

        assert!(matches!(err, RipError::Load { ref name, .. } if name == "nowhere"));
    }
}
