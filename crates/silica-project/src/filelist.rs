//! The `verible.filelist` project descriptor.
//!
//! A file list enumerates, one entry per line, the include directories and
//! source files of a project:
//!
//! ```text
//! # comment
//! +incdir+rtl/include
//! rtl/top.sv
//! rtl/alu.sv
//! ```
//!
//! Blank lines and `#` comments are ignored. `+incdir+<dir>` registers an
//! include directory; any other `+`-prefixed line is malformed and aborts
//! the whole parse (no partial registration). Every remaining line is a
//! source-file path.
//!
//! The descriptor has a fixed name and is discovered by checking each
//! directory from a starting point up to the filesystem root
//! ([`find_file_list`]). The walk itself is a pure function over an
//! injected existence predicate so it can be tested without a real
//! filesystem ([`find_file_list_with`]).

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fixed name of the project descriptor file.
pub const FILE_LIST_NAME: &str = "verible.filelist";

const INCDIR_PREFIX: &str = "+incdir+";

/// Parsed contents of a project descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileList {
    /// Include directories, in declaration order.
    pub include_dirs: Vec<PathBuf>,
    /// Source-file paths, in declaration order.
    pub file_paths: Vec<PathBuf>,
}

/// Errors from reading or parsing a file list.
#[derive(Debug, Error)]
pub enum FileListError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `+`-prefixed line that is not a recognized directive.
    #[error("line {line}: unknown directive `{text}`")]
    UnknownDirective { line: usize, text: String },

    /// A `+incdir+` with nothing after it.
    #[error("line {line}: empty include directory")]
    EmptyIncludeDir { line: usize },
}

impl FileList {
    /// Parse descriptor text.
    ///
    /// A malformed line fails the entire parse; an empty descriptor is a
    /// valid, empty file list.
    pub fn parse(text: &str) -> Result<FileList, FileListError> {
        let mut list = FileList::default();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(dir) = line.strip_prefix(INCDIR_PREFIX) {
                if dir.is_empty() {
                    return Err(FileListError::EmptyIncludeDir { line: idx + 1 });
                }
                list.include_dirs.push(PathBuf::from(dir));
            } else if line.starts_with('+') {
                return Err(FileListError::UnknownDirective {
                    line: idx + 1,
                    text: line.to_string(),
                });
            } else {
                list.file_paths.push(PathBuf::from(line));
            }
        }
        Ok(list)
    }

    /// Read and parse a descriptor from disk.
    pub fn from_file(path: &Path) -> Result<FileList, FileListError> {
        let text = std::fs::read_to_string(path).map_err(|source| FileListError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }
}

/// Search for the descriptor from `start` up the directory ancestry,
/// using `exists` to probe candidate paths.
///
/// Returns the path of the first descriptor found, or `None` once the
/// walk reaches a directory that is its own parent (the filesystem root).
pub fn find_file_list_with(start: &Path, exists: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(FILE_LIST_NAME);
        if exists(&candidate) {
            return Some(candidate);
        }
        match dir.parent() {
            Some(parent) if parent != dir => dir = parent.to_path_buf(),
            _ => return None,
        }
    }
}

/// Search for the descriptor on the real filesystem.
pub fn find_file_list(start: &Path) -> Option<PathBuf> {
    find_file_list_with(start, |p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_basic() {
        let list = FileList::parse("+incdir+inc\nrtl/top.sv\nrtl/alu.sv\n").unwrap();
        assert_eq!(list.include_dirs, vec![PathBuf::from("inc")]);
        assert_eq!(
            list.file_paths,
            vec![PathBuf::from("rtl/top.sv"), PathBuf::from("rtl/alu.sv")]
        );
    }

    #[test]
    fn test_parse_preserves_order() {
        let list = FileList::parse("+incdir+d1\n+incdir+d2\nb.sv\na.sv\n").unwrap();
        assert_eq!(
            list.include_dirs,
            vec![PathBuf::from("d1"), PathBuf::from("d2")]
        );
        assert_eq!(list.file_paths, vec![PathBuf::from("b.sv"), PathBuf::from("a.sv")]);
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let list = FileList::parse("# header\n\n  \ntop.sv\n# trailing\n").unwrap();
        assert_eq!(list.file_paths, vec![PathBuf::from("top.sv")]);
        assert!(list.include_dirs.is_empty());
    }

    #[test]
    fn test_parse_empty_descriptor_is_valid() {
        let list = FileList::parse("").unwrap();
        assert!(list.include_dirs.is_empty());
        assert!(list.file_paths.is_empty());
    }

    #[test]
    fn test_parse_unknown_directive_fails() {
        let err = FileList::parse("top.sv\n+define+FOO=1\n").unwrap_err();
        assert!(matches!(err, FileListError::UnknownDirective { line: 2, .. }));
    }

    #[test]
    fn test_parse_empty_incdir_fails() {
        let err = FileList::parse("+incdir+\n").unwrap_err();
        assert!(matches!(err, FileListError::EmptyIncludeDir { line: 1 }));
    }

    #[test]
    fn test_find_with_predicate_in_start_dir() {
        let found = find_file_list_with(Path::new("/proj/rtl"), |p| {
            p == Path::new("/proj/rtl/verible.filelist")
        });
        assert_eq!(found, Some(PathBuf::from("/proj/rtl/verible.filelist")));
    }

    #[test]
    fn test_find_with_predicate_in_ancestor() {
        let found = find_file_list_with(Path::new("/proj/rtl/core"), |p| {
            p == Path::new("/proj/verible.filelist")
        });
        assert_eq!(found, Some(PathBuf::from("/proj/verible.filelist")));
    }

    #[test]
    fn test_find_with_predicate_not_found() {
        assert_eq!(find_file_list_with(Path::new("/proj/rtl"), |_| false), None);
    }

    #[test]
    fn test_find_on_filesystem() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("rtl/core")).unwrap();
        fs::write(root.join(FILE_LIST_NAME), "top.sv\n").unwrap();

        let found = find_file_list(&root.join("rtl/core")).unwrap();
        assert_eq!(found, root.join(FILE_LIST_NAME));
    }

    #[test]
    fn test_from_file_missing_is_read_error() {
        let dir = tempdir().unwrap();
        let err = FileList::from_file(&dir.path().join("nope.filelist")).unwrap_err();
        assert!(matches!(err, FileListError::Read { .. }));
    }
}
