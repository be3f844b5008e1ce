// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! patsup-registry: loads pattern manifests from a directory of `.hcl`
//! files into the immutable `Pattern` values the engine spawns from.

mod error;
mod manifest;

pub use error::RegistryError;
pub use manifest::parse_manifest;

use indexmap::IndexMap;
use patsup_core::Pattern;
use std::path::{Path, PathBuf};

/// A loaded, deduplicated set of patterns, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    patterns: IndexMap<String, Pattern>,
}

impl Registry {
    /// Recursively scan `dir` for `*.hcl` manifest files and load every
    /// pattern they declare. A pattern name declared twice across files is
    /// an error — registries don't silently pick a winner.
    pub fn load_dir(dir: &Path) -> Result<Self, RegistryError> {
        if !dir.exists() {
            return Err(RegistryError::MissingDirectory(dir.to_path_buf()));
        }

        let mut patterns: IndexMap<String, Pattern> = IndexMap::new();
        for path in collect_manifest_files(dir)? {
            let content = std::fs::read_to_string(&path)
                .map_err(|source| RegistryError::Io { path: path.clone(), source })?;
            for pattern in parse_manifest(&path, &content)? {
                if patterns.contains_key(&pattern.name) {
                    return Err(RegistryError::Duplicate(pattern.name));
                }
                patterns.insert(pattern.name.clone(), pattern);
            }
        }

        tracing::info!(count = patterns.len(), dir = %dir.display(), "loaded pattern registry");
        Ok(Self { patterns })
    }

    pub fn get(&self, name: &str) -> Option<&Pattern> {
        self.patterns.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.patterns.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.values()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn collect_manifest_files(dir: &Path) -> Result<Vec<PathBuf>, RegistryError> {
    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        let entries = std::fs::read_dir(&current)
            .map_err(|source| RegistryError::Io { path: current.clone(), source })?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some("hcl") {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_manifest(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        let mut f = std::fs::File::create(path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn loads_patterns_from_multiple_files() {
        let dir = tempdir().unwrap();
        write_manifest(
            dir.path(),
            "a.hcl",
            r#"pattern "hello" { command = "echo" args = ["hi"] }"#,
        );
        write_manifest(
            dir.path(),
            "b.hcl",
            r#"pattern "world" { command = "echo" args = ["bye"] }"#,
        );

        let registry = Registry::load_dir(dir.path()).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("hello"));
        assert!(registry.contains("world"));
    }

    #[test]
    fn duplicate_pattern_name_across_files_is_an_error() {
        let dir = tempdir().unwrap();
        write_manifest(dir.path(), "a.hcl", r#"pattern "hello" { command = "echo" }"#);
        write_manifest(dir.path(), "b.hcl", r#"pattern "hello" { command = "echo" }"#);

        let err = Registry::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(name) if name == "hello"));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let err = Registry::load_dir(Path::new("/nonexistent/does/not/exist")).unwrap_err();
        assert!(matches!(err, RegistryError::MissingDirectory(_)));
    }

    #[test]
    fn ignores_non_hcl_files() {
        let dir = tempdir().unwrap();
        write_manifest(dir.path(), "readme.txt", "not a manifest");
        write_manifest(dir.path(), "a.hcl", r#"pattern "hello" { command = "echo" }"#);

        let registry = Registry::load_dir(dir.path()).unwrap();
        assert_eq!(registry.len(), 1);
    }
}
