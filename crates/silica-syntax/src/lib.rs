// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Lexical analysis and text structure for SystemVerilog sources.
//!
//! This crate provides the per-file view the rest of Silica works against:
//! a token stream with byte spans and the position arithmetic needed to map
//! between editor coordinates and tokens.
//!
//! # Design
//!
//! - `lexer::Token` — SystemVerilog token subset, lexed with logos
//! - `text::TextStructure` — source text plus token spans and line index;
//!   supports token-at-position and range-for-identifier lookups
//!
//! Parsing beyond tokens (expressions, full syntax trees) is deliberately
//! absent; symbol indexing works directly on the token stream.

pub mod lexer;
pub mod text;

pub use lexer::Token;
pub use text::{LexError, LineColumn, LineColumnRange, TextStructure, TokenSpan};
