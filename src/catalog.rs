//! Predefined automata stored as JSON files in one directory.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::wire::DfaDefinition;
use crate::{Error, Result};

const EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct Catalog {
    dir: PathBuf,
}

impl Catalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File names of the stored automata, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| Error::io(&self.dir, e))?.path();
            if !path.is_file() || path.extension() != Some(OsStr::new(EXTENSION)) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        debug!(dir = %self.dir.display(), count = names.len(), "listed catalog");
        Ok(names)
    }

    /// Resolves `name`, with or without its `.json` extension, inside the catalog directory.
    pub fn path_of(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(Error::InvalidExampleName(name.to_string()));
        }
        let file_name = if name.ends_with(".json") {
            name.to_string()
        } else {
            format!("{name}.{EXTENSION}")
        };
        Ok(self.dir.join(file_name))
    }

    pub fn load(&self, name: &str) -> Result<DfaDefinition> {
        load_definition(self.path_of(name)?)
    }
}

/// Reads one definition from a JSON file.
pub fn load_definition(path: impl AsRef<Path>) -> Result<DfaDefinition> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    debug!(path = %path.display(), "loaded definition");
    DfaDefinition::from_json(&json)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const TWO_STATES: &str = r#"{
        "states": ["q0", "q1"],
        "alphabet": ["a"],
        "transitions": [["q0", "a", "q1"], ["q1", "a", "q0"]],
        "start_state": "q0",
        "accept_states": ["q1"]
    }"#;

    fn catalog() -> (TempDir, Catalog) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("odd_a.json"), TWO_STATES).unwrap();
        fs::write(dir.path().join("broken.json"), "{").unwrap();
        fs::write(dir.path().join("notes.txt"), "not an automaton").unwrap();
        fs::create_dir(dir.path().join("nested.json")).unwrap();
        let catalog = Catalog::new(dir.path());
        (dir, catalog)
    }

    #[test]
    fn lists_json_files_only() {
        let (_dir, catalog) = catalog();
        assert_eq!(catalog.list().unwrap(), vec!["broken.json", "odd_a.json"]);
    }

    #[test]
    fn loads_with_or_without_extension() {
        let (_dir, catalog) = catalog();
        let with = catalog.load("odd_a.json").unwrap();
        let without = catalog.load("odd_a").unwrap();
        assert_eq!(with, without);
        assert!(with.to_automaton().unwrap().accepts("aaa".chars()));
    }

    #[test]
    fn rejects_names_leaving_the_directory() {
        let (_dir, catalog) = catalog();
        for name in ["../secret", "a/b", "a\\b", ".."] {
            assert!(matches!(
                catalog.load(name),
                Err(Error::InvalidExampleName(rejected)) if rejected == name
            ));
        }
    }

    #[test]
    fn reports_missing_and_malformed_files() {
        let (_dir, catalog) = catalog();
        assert!(matches!(catalog.load("absent"), Err(Error::Io { .. })));
        assert!(matches!(catalog.load("broken"), Err(Error::Json(_))));
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let catalog = Catalog::new("/nonexistent/automata");
        assert!(matches!(catalog.list(), Err(Error::Io { .. })));
    }
}
