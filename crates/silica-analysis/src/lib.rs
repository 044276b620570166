// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Project-wide symbol table for SystemVerilog sources.
//!
//! This crate builds and queries the tree index that backs go-to-definition:
//!
//! 1. **Build** — scans the token stream of each registered project file
//!    and records declarations as a tree of scopes (modules containing
//!    nets, functions containing ports, ...), while collecting every other
//!    identifier occurrence as a reference
//! 2. **Resolve** — links collected references to declarations, reporting
//!    each unresolved name as a non-fatal diagnostic
//!
//! Nothing in this crate aborts on malformed input: findings are pushed
//! into a caller-supplied diagnostic list and indexing continues.

pub mod diagnostic;
pub mod table;

pub use diagnostic::{Diagnostic, Severity};
pub use table::{SymbolInfo, SymbolKind, SymbolTable, SymbolTableNode};
