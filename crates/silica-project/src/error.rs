//! Project errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from file registration and lookup.
///
/// All of these are expected, recoverable conditions: a file listed in a
/// descriptor may simply not exist yet, and callers skip and continue.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// The path could not be resolved against the project root or any
    /// include directory.
    #[error("file not found in project: {0}")]
    FileNotFound(String),

    /// The file exists but could not be read.
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Lookup of a path that was never registered.
    #[error("file not registered in project: {0}")]
    NotRegistered(String),
}
