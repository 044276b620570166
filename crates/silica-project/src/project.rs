//! The project: root, corpus, include directories, registered files.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use silica_syntax::TextStructure;

use crate::error::ProjectError;

/// A registered project source file.
///
/// Holds the resolved on-disk path and, once parsed, the lexed text
/// structure. Symbol-table entries refer to a `SourceFile` by its
/// root-relative path; they never own one.
#[derive(Debug)]
pub struct SourceFile {
    resolved_path: PathBuf,
    relative_path: String,
    text: Option<TextStructure>,
}

impl SourceFile {
    /// The absolute path the file was opened from.
    pub fn resolved_path(&self) -> &Path {
        &self.resolved_path
    }

    /// The root-relative registry key.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// The lexed view of the file, if it has been parsed.
    pub fn text_structure(&self) -> Option<&TextStructure> {
        self.text.as_ref()
    }
}

/// The set of source files the server works against.
///
/// Identified by a root directory and a corpus label. Include directories
/// and registered files keep insertion order; the registry is keyed by
/// root-relative path. A project is replaced wholesale when the session
/// root changes, never mutated across sessions.
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    corpus: String,
    include_dirs: IndexSet<PathBuf>,
    files: IndexMap<String, SourceFile>,
}

impl Project {
    pub fn new(
        root: impl Into<PathBuf>,
        include_paths: Vec<PathBuf>,
        corpus: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            corpus: corpus.into(),
            include_dirs: include_paths.into_iter().collect(),
            files: IndexMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn corpus(&self) -> &str {
        &self.corpus
    }

    /// Register an include directory. Re-adding keeps the original order.
    pub fn add_include_dir(&mut self, dir: PathBuf) {
        debug!(dir = %dir.display(), "adding include path");
        self.include_dirs.insert(dir);
    }

    pub fn include_dirs(&self) -> impl Iterator<Item = &Path> {
        self.include_dirs.iter().map(PathBuf::as_path)
    }

    /// Map an absolute path to a root-relative one.
    ///
    /// Paths outside the root pass through unchanged; the registry then
    /// simply has no entry for them.
    pub fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }

    /// Open and register a file by relative path.
    ///
    /// The path is resolved against the project root, then each include
    /// directory in order; absolute paths are used as-is. The file content
    /// is lexed eagerly. Opening an already-registered path is a no-op
    /// returning the existing entry.
    pub fn open_file(&mut self, relative: &str) -> Result<&SourceFile, ProjectError> {
        if !self.files.contains_key(relative) {
            let resolved = self
                .resolve_on_disk(relative)
                .ok_or_else(|| ProjectError::FileNotFound(relative.to_string()))?;
            let source = fs::read_to_string(&resolved).map_err(|source| ProjectError::Read {
                path: resolved.clone(),
                source,
            })?;
            debug!(file = %resolved.display(), "registering source file");
            self.files.insert(
                relative.to_string(),
                SourceFile {
                    resolved_path: resolved,
                    relative_path: relative.to_string(),
                    text: Some(TextStructure::new(source)),
                },
            );
        }
        self.files
            .get(relative)
            .ok_or_else(|| ProjectError::NotRegistered(relative.to_string()))
    }

    /// Look up an already-registered file.
    pub fn lookup(&self, relative: &str) -> Option<&SourceFile> {
        self.files.get(relative)
    }

    pub fn is_registered(&self, relative: &str) -> bool {
        self.files.contains_key(relative)
    }

    /// Registered files in registration order.
    pub fn files(&self) -> impl Iterator<Item = (&str, &SourceFile)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    fn resolve_on_disk(&self, relative: &str) -> Option<PathBuf> {
        let path = Path::new(relative);
        if path.is_absolute() {
            return path.is_file().then(|| path.to_path_buf());
        }
        let candidate = self.root.join(path);
        if candidate.is_file() {
            return Some(candidate);
        }
        self.include_dirs
            .iter()
            .map(|dir| {
                if dir.is_absolute() {
                    dir.join(path)
                } else {
                    self.root.join(dir).join(path)
                }
            })
            .find(|candidate| candidate.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn project_in(root: &Path) -> Project {
        Project::new(root, Vec::new(), "test")
    }

    #[test]
    fn test_open_file_registers_and_lexes() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("top.sv"), "module top; endmodule\n").unwrap();

        let mut project = project_in(dir.path());
        let file = project.open_file("top.sv").unwrap();
        assert_eq!(file.relative_path(), "top.sv");
        assert!(file.text_structure().is_some());
        assert!(project.is_registered("top.sv"));
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = tempdir().unwrap();
        let mut project = project_in(dir.path());
        let err = project.open_file("ghost.sv").unwrap_err();
        assert!(matches!(err, ProjectError::FileNotFound(_)));
        assert!(!project.is_registered("ghost.sv"));
    }

    #[test]
    fn test_open_resolves_through_include_dirs() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("inc")).unwrap();
        fs::write(dir.path().join("inc/defs.svh"), "parameter W = 8;\n").unwrap();

        let mut project = project_in(dir.path());
        project.add_include_dir(PathBuf::from("inc"));
        let file = project.open_file("defs.svh").unwrap();
        assert_eq!(file.resolved_path(), dir.path().join("inc/defs.svh"));
    }

    #[test]
    fn test_reopen_is_noop() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.sv"), "wire a;\n").unwrap();

        let mut project = project_in(dir.path());
        project.open_file("a.sv").unwrap();
        project.open_file("a.sv").unwrap();
        assert_eq!(project.file_count(), 1);
    }

    #[test]
    fn test_relative_path() {
        let dir = tempdir().unwrap();
        let project = project_in(dir.path());
        assert_eq!(project.relative_path(&dir.path().join("rtl/top.sv")), "rtl/top.sv");
        // Outside the root: passes through
        assert_eq!(project.relative_path(Path::new("/elsewhere/x.sv")), "/elsewhere/x.sv");
    }

    #[test]
    fn test_include_dirs_keep_order() {
        let dir = tempdir().unwrap();
        let mut project = project_in(dir.path());
        project.add_include_dir(PathBuf::from("d1"));
        project.add_include_dir(PathBuf::from("d2"));
        project.add_include_dir(PathBuf::from("d1"));
        let dirs: Vec<_> = project.include_dirs().collect();
        assert_eq!(dirs, vec![Path::new("d1"), Path::new("d2")]);
    }
}
