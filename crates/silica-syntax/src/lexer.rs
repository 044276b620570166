//! Tokenization of SystemVerilog source using logos.
//!
//! # Design
//!
//! - `Token` — the SystemVerilog token subset Silica indexes against:
//!   scope and declaration keywords, identifiers, literals, operators
//! - Comments and whitespace are stripped during lexing (not tokens)
//! - Compiler directives (`` `include``, `` `define`` and friends) are
//!   skipped line-oriented; a multi-line `` `define`` leaks its continuation
//!   lines as ordinary tokens, which the indexer tolerates
//!
//! # Examples
//!
//! ```
//! # use silica_syntax::lexer::*;
//! # use logos::Logos;
//! let source = "module top(input logic clk); endmodule";
//! let tokens: Vec<Result<Token, ()>> = Token::lexer(source).collect();
//! ```

use logos::Logos;
use std::sync::Arc;

/// SystemVerilog token.
///
/// Covers the subset of the language the symbol indexer and the
/// definition resolver need: enough keywords to recognize scopes and
/// declarations, and identifier/literal/operator tokens for everything
/// else. Tokens the subset does not model (e.g. `===`) lex as adjacent
/// simpler tokens, which is sufficient for token-granular lookup.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")] // Skip whitespace
#[logos(skip r"//[^\n]*")] // Skip line comments
#[logos(skip r"/\*([^*]|\*[^/])*\*/")] // Skip block comments
#[logos(skip r"`[a-zA-Z_][a-zA-Z0-9_]*[^\n]*")] // Skip compiler directives (line-oriented)
pub enum Token {
    // === Scope keywords ===
    /// Keyword `module`
    #[token("module")]
    Module,
    /// Keyword `endmodule`
    #[token("endmodule")]
    EndModule,
    /// Keyword `package`
    #[token("package")]
    Package,
    /// Keyword `endpackage`
    #[token("endpackage")]
    EndPackage,
    /// Keyword `class`
    #[token("class")]
    Class,
    /// Keyword `endclass`
    #[token("endclass")]
    EndClass,
    /// Keyword `interface`
    #[token("interface")]
    Interface,
    /// Keyword `endinterface`
    #[token("endinterface")]
    EndInterface,
    /// Keyword `function`
    #[token("function")]
    Function,
    /// Keyword `endfunction`
    #[token("endfunction")]
    EndFunction,
    /// Keyword `task`
    #[token("task")]
    Task,
    /// Keyword `endtask`
    #[token("endtask")]
    EndTask,

    // === Declaration keywords ===
    /// Keyword `typedef`
    #[token("typedef")]
    Typedef,
    /// Keyword `parameter`
    #[token("parameter")]
    Parameter,
    /// Keyword `localparam`
    #[token("localparam")]
    Localparam,
    /// Keyword `input`
    #[token("input")]
    Input,
    /// Keyword `output`
    #[token("output")]
    Output,
    /// Keyword `inout`
    #[token("inout")]
    Inout,
    /// Keyword `wire`
    #[token("wire")]
    Wire,
    /// Keyword `logic`
    #[token("logic")]
    Logic,
    /// Keyword `reg`
    #[token("reg")]
    Reg,
    /// Keyword `enum`
    #[token("enum")]
    Enum,
    /// Keyword `struct`
    #[token("struct")]
    Struct,
    /// Keyword `int`
    #[token("int")]
    Int,
    /// Keyword `integer`
    #[token("integer")]
    Integer,
    /// Keyword `void`
    #[token("void")]
    Void,

    // === Other keywords ===
    /// Keyword `assign`
    #[token("assign")]
    Assign,
    /// Keyword `always`
    #[token("always")]
    Always,
    /// Keyword `always_comb`
    #[token("always_comb")]
    AlwaysComb,
    /// Keyword `always_ff`
    #[token("always_ff")]
    AlwaysFf,
    /// Keyword `initial`
    #[token("initial")]
    Initial,
    /// Keyword `begin`
    #[token("begin")]
    Begin,
    /// Keyword `end`
    #[token("end")]
    End,
    /// Keyword `if`
    #[token("if")]
    If,
    /// Keyword `else`
    #[token("else")]
    Else,
    /// Keyword `for`
    #[token("for")]
    For,
    /// Keyword `case`
    #[token("case")]
    Case,
    /// Keyword `endcase`
    #[token("endcase")]
    EndCase,
    /// Keyword `posedge`
    #[token("posedge")]
    Posedge,
    /// Keyword `negedge`
    #[token("negedge")]
    Negedge,
    /// Keyword `return`
    #[token("return")]
    Return,
    /// Keyword `automatic`
    #[token("automatic")]
    Automatic,
    /// Keyword `static`
    #[token("static")]
    Static,
    /// Keyword `virtual`
    #[token("virtual")]
    Virtual,

    // === Operators ===
    /// Operator `+`
    #[token("+")]
    Plus,
    /// Operator `-`
    #[token("-")]
    Minus,
    /// Operator `*`
    #[token("*")]
    Star,
    /// Operator `/`
    #[token("/")]
    Slash,
    /// Operator `%`
    #[token("%")]
    Percent,
    /// Operator `^`
    #[token("^")]
    Caret,
    /// Operator `&`
    #[token("&")]
    Amp,
    /// Operator `&&`
    #[token("&&")]
    AmpAmp,
    /// Operator `|`
    #[token("|")]
    Pipe,
    /// Operator `||`
    #[token("||")]
    PipePipe,
    /// Operator `!`
    #[token("!")]
    Bang,
    /// Operator `~`
    #[token("~")]
    Tilde,
    /// Operator `=`
    #[token("=")]
    Eq,
    /// Operator `==`
    #[token("==")]
    EqEq,
    /// Operator `!=`
    #[token("!=")]
    BangEq,
    /// Operator `<`
    #[token("<")]
    Lt,
    /// Operator `<=` (also the non-blocking assignment)
    #[token("<=")]
    LtEq,
    /// Operator `>`
    #[token(">")]
    Gt,
    /// Operator `>=`
    #[token(">=")]
    GtEq,
    /// Operator `<<`
    #[token("<<")]
    Shl,
    /// Operator `>>`
    #[token(">>")]
    Shr,
    /// Operator `?`
    #[token("?")]
    Question,
    /// Operator `:`
    #[token(":")]
    Colon,
    /// Operator `::`
    #[token("::")]
    ColonColon,
    /// Operator `.`
    #[token(".")]
    Dot,
    /// Operator `,`
    #[token(",")]
    Comma,
    /// Operator `;`
    #[token(";")]
    Semicolon,
    /// Operator `#`
    #[token("#")]
    Hash,
    /// Operator `@`
    #[token("@")]
    At,
    /// Operator `'` (cast / assignment pattern)
    #[token("'")]
    Apostrophe,

    // === Delimiters ===
    /// Delimiter `(`
    #[token("(")]
    LParen,
    /// Delimiter `)`
    #[token(")")]
    RParen,
    /// Delimiter `{`
    #[token("{")]
    LBrace,
    /// Delimiter `}`
    #[token("}")]
    RBrace,
    /// Delimiter `[`
    #[token("[")]
    LBracket,
    /// Delimiter `]`
    #[token("]")]
    RBracket,

    // === Literals ===
    /// Unsigned decimal literal (e.g., 42, 1_000)
    #[regex(r"[0-9][0-9_]*")]
    Number,

    /// Based literal (e.g., 4'b1010, 8'hFF, 'x)
    ///
    /// The numeric value is never needed for indexing, so the raw text is
    /// left in the source and not decoded here.
    #[regex(r"[0-9][0-9_]*'[sS]?[bBoOdDhH][0-9a-fA-FxXzZ_?]+")]
    #[regex(r"'[sS]?[bBoOdDhH][0-9a-fA-FxXzZ_?]+")]
    BasedNumber,

    /// Real literal (e.g., 3.14, 1.5e9)
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    Real,

    /// String literal (e.g., "hello")
    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    /// Identifier (e.g., clk, data_out, state_t)
    ///
    /// Uses `Arc<str>` so tokens can be held in long-lived, shared
    /// structures (open-buffer maps are read across threads).
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_$]*", |lex| Arc::from(lex.slice()))]
    Ident(Arc<str>),

    /// Escaped identifier (e.g., `\bus-sel `), backslash to whitespace
    #[regex(r"\\[^ \t\r\n]+", |lex| Arc::from(lex.slice()))]
    EscapedIdent(Arc<str>),

    /// System identifier (e.g., $display, $clog2)
    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_$]*", |lex| Arc::from(lex.slice()))]
    SystemIdent(Arc<str>),
}

impl Token {
    /// The identifier text, if this token is a plain identifier.
    ///
    /// Escaped and system identifiers are excluded: neither can declare a
    /// symbol the resolver would look up by plain name.
    pub fn ident(&self) -> Option<&str> {
        match self {
            Token::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Whether this token opens a named scope (`module`, `class`, ...).
    pub fn opens_scope(&self) -> bool {
        matches!(
            self,
            Token::Module
                | Token::Package
                | Token::Class
                | Token::Interface
                | Token::Function
                | Token::Task
        )
    }

    /// Whether this token closes a named scope (`endmodule`, `endclass`, ...).
    pub fn closes_scope(&self) -> bool {
        matches!(
            self,
            Token::EndModule
                | Token::EndPackage
                | Token::EndClass
                | Token::EndInterface
                | Token::EndFunction
                | Token::EndTask
        )
    }

    /// Whether this token starts a data or port declaration statement.
    pub fn starts_declaration(&self) -> bool {
        matches!(
            self,
            Token::Parameter
                | Token::Localparam
                | Token::Input
                | Token::Output
                | Token::Inout
                | Token::Wire
                | Token::Logic
                | Token::Reg
        )
    }
}
