// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Silica language-server internals.
//!
//! The binary in `main.rs` wires these pieces to a tower-lsp server:
//!
//! - `paths` — translation between `file://` protocol identifiers and
//!   filesystem paths
//! - `buffers` — registry of open editor documents, lexed on every change
//! - `handler` — the symbol-table lifecycle (project setup, file-list
//!   loading, incremental and full builds, dirty tracking) and the
//!   go-to-definition query itself

pub mod buffers;
pub mod handler;
pub mod paths;

pub use buffers::BufferTracker;
pub use handler::SymbolTableHandler;
