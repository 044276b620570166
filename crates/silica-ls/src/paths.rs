//! Translation between `file://` protocol identifiers and system paths.
//!
//! Resolution is deliberately naive: only the `file://` scheme is
//! recognized and no percent-decoding is attempted. Anything else yields
//! `None` and the caller degrades to an empty query result.

use std::path::{Component, Path, PathBuf};

/// The only URI scheme the server understands.
pub const FILE_SCHEME_PREFIX: &str = "file://";

/// The filesystem path carried by a `file://` URI.
///
/// Returns `None` for every other scheme.
pub fn uri_to_path(uri: &str) -> Option<&str> {
    uri.strip_prefix(FILE_SCHEME_PREFIX)
}

/// A `file://` URI for a filesystem path.
///
/// Relative paths are resolved against the current directory and the
/// result is lexically normalized, so translating a path to a URI and
/// back yields its canonical absolute form.
pub fn path_to_uri(path: &Path) -> String {
    let absolute = if path.is_absolute() {
        normalize(path)
    } else {
        match std::env::current_dir() {
            Ok(cwd) => normalize(&cwd.join(path)),
            Err(_) => normalize(path),
        }
    };
    format!("{FILE_SCHEME_PREFIX}{}", absolute.display())
}

/// Remove `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
