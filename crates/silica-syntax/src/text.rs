//! Per-file text structure: token spans plus position arithmetic.
//!
//! A [`TextStructure`] is the lexed view of one source file or editor
//! buffer. It keeps the original text, a line-start index, and the token
//! stream with byte spans, and answers the two queries definition
//! resolution needs:
//!
//! - which token contains a given line/column position
//! - where a given identifier text first occurs
//!
//! Lines and columns are 0-based byte coordinates, matching the editor
//! protocol's position encoding for the ASCII-dominated sources this
//! serves.

use logos::Logos;
use serde::{Deserialize, Serialize};

use crate::lexer::Token;

/// A 0-based line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineColumn {
    pub line: u32,
    pub column: u32,
}

impl LineColumn {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A half-open range between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineColumnRange {
    pub start: LineColumn,
    pub end: LineColumn,
}

/// One lexed token with its byte span in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSpan {
    pub token: Token,
    /// Byte offset of the token start.
    pub start: u32,
    /// Byte offset one past the token end.
    pub end: u32,
}

/// A span the lexer could not tokenize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexError {
    pub start: u32,
    pub end: u32,
}

/// Lexed view of a single source text.
#[derive(Debug, Clone, Default)]
pub struct TextStructure {
    source: String,
    /// Byte offsets of each line start; `line_starts[0]` is always 0 and a
    /// trailing EOF sentinel closes the last line.
    line_starts: Vec<u32>,
    tokens: Vec<TokenSpan>,
    errors: Vec<LexError>,
}

impl TextStructure {
    /// Lex `source` into a text structure.
    ///
    /// Unlexable spans are collected as [`LexError`]s rather than failing;
    /// the surrounding tokens remain available for lookup.
    pub fn new(source: String) -> Self {
        let line_starts = compute_line_starts(&source);
        let mut tokens = Vec::new();
        let mut errors = Vec::new();
        for (result, span) in Token::lexer(&source).spanned() {
            match result {
                Ok(token) => tokens.push(TokenSpan {
                    token,
                    start: span.start as u32,
                    end: span.end as u32,
                }),
                Err(()) => errors.push(LexError {
                    start: span.start as u32,
                    end: span.end as u32,
                }),
            }
        }
        Self {
            source,
            line_starts,
            tokens,
            errors,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[TokenSpan] {
        &self.tokens
    }

    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    /// The source text of a token.
    pub fn text_of(&self, token: &TokenSpan) -> &str {
        &self.source[token.start as usize..token.end as usize]
    }

    /// Number of lines (at least 1, even for empty sources).
    pub fn line_count(&self) -> usize {
        self.line_starts.len() - 1
    }

    /// Convert a position to a byte offset.
    ///
    /// Returns `None` if the line does not exist or the column lies beyond
    /// the end of its line.
    pub fn offset_at(&self, pos: LineColumn) -> Option<u32> {
        let line = pos.line as usize;
        if line >= self.line_count() {
            return None;
        }
        let offset = self.line_starts[line] + pos.column;
        if offset > self.line_starts[line + 1] {
            return None;
        }
        Some(offset)
    }

    /// Convert a byte offset to a position.
    ///
    /// Offsets beyond EOF clamp to the end of the text.
    pub fn position_at(&self, offset: u32) -> LineColumn {
        let offset = offset.min(self.source.len() as u32);
        // Binary search to find the line containing the offset.
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx.min(self.line_count().saturating_sub(1)),
            Err(idx) => idx - 1,
        };
        LineColumn {
            line: line as u32,
            column: offset - self.line_starts[line],
        }
    }

    /// Convert a byte range to a line/column range.
    pub fn range_of(&self, start: u32, end: u32) -> LineColumnRange {
        LineColumnRange {
            start: self.position_at(start),
            end: self.position_at(end),
        }
    }

    /// The token whose span contains `pos`, if any.
    ///
    /// Token-granular: positions in whitespace or comments have no token.
    pub fn token_at(&self, pos: LineColumn) -> Option<&TokenSpan> {
        let offset = self.offset_at(pos)?;
        let idx = self.tokens.partition_point(|t| t.end <= offset);
        let token = self.tokens.get(idx)?;
        (token.start <= offset).then_some(token)
    }

    /// The line/column range of the first token whose text equals `needle`.
    ///
    /// This is how a definition's source span is recovered from its name:
    /// the declaring file is re-queried for the first textual occurrence.
    pub fn range_for_text(&self, needle: &str) -> Option<LineColumnRange> {
        self.tokens
            .iter()
            .find(|t| self.text_of(t) == needle)
            .map(|t| self.range_of(t.start, t.end))
    }
}

/// Compute byte offsets of line starts, with an EOF sentinel.
fn compute_line_starts(source: &str) -> Vec<u32> {
    let mut line_starts = vec![0];
    for (idx, ch) in source.char_indices() {
        if ch == '\n' {
            line_starts.push((idx + 1) as u32);
        }
    }
    if line_starts.last() != Some(&(source.len() as u32)) {
        line_starts.push(source.len() as u32);
    }
    line_starts
}
