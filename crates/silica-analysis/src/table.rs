//! The symbol-table tree and its build/resolve passes.
//!
//! # Design
//!
//! - `SymbolTable` — tree rooted at an unkeyed node, one tree per project
//! - `SymbolTableNode` — key = declared name (root: none), value =
//!   [`SymbolInfo`], children keyed by name and unique among siblings
//! - Indexing is token-driven: scope keywords (`module` .. `endmodule`)
//!   nest, declaration keywords (`wire`, `parameter`, ...) declare, every
//!   other identifier is a reference for the resolve pass
//!
//! A node's source range is never cached. [`SymbolInfo`] records only the
//! origin file; the definition span is recovered on demand by re-querying
//! that file's text structure for the node's key (the first textual
//! occurrence of the name is, for well-formed declarations, the
//! declaration itself).
//!
//! The table is bound to exactly one project: the owner holds both and
//! replaces them together, so entries never outlive the project they were
//! built against.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::debug;

use silica_project::Project;
use silica_syntax::{TextStructure, Token, TokenSpan};

use crate::diagnostic::Diagnostic;

/// What kind of construct declared a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Root,
    Module,
    Package,
    Class,
    Interface,
    Function,
    Task,
    Typedef,
    Parameter,
    Net,
}

impl SymbolKind {
    /// Display name for logs and document-symbol listings.
    pub fn display_name(&self) -> &'static str {
        match self {
            SymbolKind::Root => "root",
            SymbolKind::Module => "module",
            SymbolKind::Package => "package",
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Function => "function",
            SymbolKind::Task => "task",
            SymbolKind::Typedef => "typedef",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Net => "net",
        }
    }
}

/// Definition metadata stored in a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    pub kind: SymbolKind,
    /// Root-relative path of the declaring file. A reference resolved
    /// through the project at query time, never ownership; `None` on the
    /// root and on scope nodes merged from a duplicate declaration.
    pub file_origin: Option<String>,
}

/// One entry in the symbol tree.
#[derive(Debug)]
pub struct SymbolTableNode {
    key: Option<String>,
    value: SymbolInfo,
    children: IndexMap<String, SymbolTableNode>,
}

impl SymbolTableNode {
    fn new(key: Option<String>, value: SymbolInfo) -> Self {
        Self {
            key,
            value,
            children: IndexMap::new(),
        }
    }

    /// The declared name; `None` only on the root.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn value(&self) -> &SymbolInfo {
        &self.value
    }

    /// Children in declaration order.
    pub fn children(&self) -> impl Iterator<Item = &SymbolTableNode> {
        self.children.values()
    }

    pub fn child(&self, name: &str) -> Option<&SymbolTableNode> {
        self.children.get(name)
    }
}

/// An identifier use site collected during build, linked by `resolve`.
#[derive(Debug)]
struct Reference {
    name: String,
    file: String,
}

/// Tree index mapping declared names to definition metadata.
#[derive(Debug)]
pub struct SymbolTable {
    root: SymbolTableNode,
    references: Vec<Reference>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            root: SymbolTableNode::new(
                None,
                SymbolInfo {
                    kind: SymbolKind::Root,
                    file_origin: None,
                },
            ),
            references: Vec::new(),
        }
    }

    pub fn root(&self) -> &SymbolTableNode {
        &self.root
    }

    /// Index every registered project file, merging into the tree.
    pub fn build(&mut self, project: &Project, diagnostics: &mut Vec<Diagnostic>) {
        for (relative, _) in project.files() {
            self.build_file(project, relative, diagnostics);
        }
    }

    /// Index one registered file, merging its definitions into the tree.
    ///
    /// Failures (unregistered path, unparsed content) become diagnostics;
    /// the table is left as it was.
    pub fn build_file(
        &mut self,
        project: &Project,
        relative: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let Some(file) = project.lookup(relative) else {
            diagnostics.push(Diagnostic::warning(
                relative,
                "file is not registered in the project",
            ));
            return;
        };
        let Some(text) = file.text_structure() else {
            diagnostics.push(Diagnostic::warning(relative, "file has not been parsed"));
            return;
        };
        for error in text.errors() {
            let pos = text.position_at(error.start);
            diagnostics.push(Diagnostic::warning(
                relative,
                format!("unrecognized text at {}:{}", pos.line + 1, pos.column + 1),
            ));
        }
        debug!(file = relative, "indexing symbols");
        self.index_tokens(relative, text, diagnostics);
    }

    /// Link collected references to definitions.
    ///
    /// Each unresolved name is reported once per file as an info-level
    /// diagnostic; resolution has no effect on the tree itself.
    pub fn resolve(&self, diagnostics: &mut Vec<Diagnostic>) {
        let mut missing: HashSet<(&str, &str)> = HashSet::new();
        let mut resolved = 0usize;
        for reference in &self.references {
            if self.find_definition(&reference.name).is_some() {
                resolved += 1;
            } else if missing.insert((reference.file.as_str(), reference.name.as_str())) {
                diagnostics.push(Diagnostic::info(
                    &reference.file,
                    format!("unresolved reference `{}`", reference.name),
                ));
            }
        }
        debug!(resolved, total = self.references.len(), "linked references");
    }

    /// Depth-first, pre-order search for the first node keyed `symbol`.
    ///
    /// The traversal is stack-driven rather than recursive so deeply
    /// nested scope chains cannot exhaust the call stack. The tree keeps
    /// no enclosing-scope information, so when the same name is declared
    /// in several scopes the first node in traversal order wins.
    pub fn find_definition(&self, symbol: &str) -> Option<&SymbolTableNode> {
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            if node.key() == Some(symbol) {
                return Some(node);
            }
            // Reversed so the first child is visited first.
            for child in node.children.values().rev() {
                stack.push(child);
            }
        }
        None
    }

    // ---- token-driven indexing ----

    fn index_tokens(&mut self, file: &str, text: &TextStructure, diagnostics: &mut Vec<Diagnostic>) {
        let tokens = text.tokens();
        let mut scopes: Vec<Option<String>> = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i].token;
            if token.opens_scope() {
                let kind = scope_kind(token);
                let (name, next) = if matches!(token, Token::Function | Token::Task) {
                    self.scan_callable_name(file, tokens, i + 1)
                } else {
                    scan_scope_name(tokens, i + 1)
                };
                if let Some(name) = &name {
                    self.declare(&scopes, name, kind, file, diagnostics);
                }
                scopes.push(name);
                i = next;
            } else if token.closes_scope() {
                scopes.pop();
                i += 1;
            } else if *token == Token::Typedef {
                i = self.scan_typedef(file, &scopes, tokens, i + 1, diagnostics);
            } else if token.starts_declaration() {
                i = self.scan_declaration(file, &scopes, tokens, i, diagnostics);
            } else {
                if let Some(name) = token.ident() {
                    self.reference(name, file);
                }
                i += 1;
            }
        }
    }

    /// Insert a declaration under the named scope path.
    ///
    /// A sibling with the same key keeps its first declaration; the
    /// duplicate is reported and dropped.
    fn declare(
        &mut self,
        scopes: &[Option<String>],
        name: &str,
        kind: SymbolKind,
        file: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let mut node = &mut self.root;
        for key in scopes.iter().flatten() {
            node = node.children.entry(key.clone()).or_insert_with(|| {
                SymbolTableNode::new(
                    Some(key.clone()),
                    SymbolInfo {
                        kind: SymbolKind::Module,
                        file_origin: None,
                    },
                )
            });
        }
        if node.children.contains_key(name) {
            diagnostics.push(Diagnostic::warning(
                file,
                format!("`{name}` is already declared in this scope; keeping the first declaration"),
            ));
            return;
        }
        node.children.insert(
            name.to_string(),
            SymbolTableNode::new(
                Some(name.to_string()),
                SymbolInfo {
                    kind,
                    file_origin: Some(file.to_string()),
                },
            ),
        );
    }

    fn reference(&mut self, name: &str, file: &str) {
        self.references.push(Reference {
            name: name.to_string(),
            file: file.to_string(),
        });
    }

    /// Name of a `function`/`task`: the last identifier before the first
    /// `(` or `;` (everything before it is return type or package path,
    /// recorded as references).
    fn scan_callable_name(
        &mut self,
        file: &str,
        tokens: &[TokenSpan],
        mut i: usize,
    ) -> (Option<String>, usize) {
        let mut last: Option<String> = None;
        while let Some(span) = tokens.get(i) {
            match &span.token {
                Token::Semicolon | Token::LParen => break,
                t if t.opens_scope() || t.closes_scope() => break,
                Token::Ident(name) => {
                    if let Some(previous) = last.replace(name.to_string()) {
                        self.reference(&previous, file);
                    }
                    i += 1;
                }
                _ => i += 1,
            }
        }
        (last, i)
    }

    /// `typedef ... NAME ;`: the declared name is the last identifier at
    /// zero nesting depth before the terminating `;`.
    fn scan_typedef(
        &mut self,
        file: &str,
        scopes: &[Option<String>],
        tokens: &[TokenSpan],
        mut i: usize,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> usize {
        let mut depth = 0i32;
        let mut last: Option<String> = None;
        while let Some(span) = tokens.get(i) {
            match &span.token {
                Token::Semicolon if depth == 0 => {
                    i += 1;
                    break;
                }
                Token::LBrace | Token::LBracket | Token::LParen => {
                    depth += 1;
                    i += 1;
                }
                Token::RBrace | Token::RBracket | Token::RParen => {
                    depth -= 1;
                    i += 1;
                }
                t if t.closes_scope() => break, // malformed; let the scope stack recover
                Token::Ident(name) => {
                    if depth == 0 {
                        if let Some(previous) = last.replace(name.to_string()) {
                            self.reference(&previous, file);
                        }
                    } else {
                        self.reference(name, file);
                    }
                    i += 1;
                }
                _ => i += 1,
            }
        }
        if let Some(name) = last {
            self.declare(scopes, &name, SymbolKind::Typedef, file, diagnostics);
        }
        i
    }

    /// A data or port declaration statement (`parameter`, `input`,
    /// `wire`, ...). Within the statement, the last identifier before
    /// each `,`, `;`, `=`, or closing `)` at zero nesting depth is the
    /// declared name; identifiers in ranges and initializers are
    /// references.
    fn scan_declaration(
        &mut self,
        file: &str,
        scopes: &[Option<String>],
        tokens: &[TokenSpan],
        start: usize,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> usize {
        let mut kind = declaration_kind(&tokens[start].token);
        let mut i = start + 1;
        let mut bracket = 0i32;
        let mut brace = 0i32;
        let mut paren = 0i32;
        let mut pending: Option<String> = None;
        let mut in_default = false;
        while let Some(span) = tokens.get(i) {
            let at_top = bracket == 0 && brace == 0 && paren == 0;
            match &span.token {
                Token::Semicolon if at_top => {
                    if !in_default {
                        self.declare_pending(&mut pending, scopes, kind, file, diagnostics);
                    }
                    i += 1;
                    break;
                }
                // Closing an enclosing port list; leave the paren to the caller.
                Token::RParen if paren == 0 => {
                    if !in_default {
                        self.declare_pending(&mut pending, scopes, kind, file, diagnostics);
                    }
                    break;
                }
                Token::Comma if at_top => {
                    if !in_default {
                        self.declare_pending(&mut pending, scopes, kind, file, diagnostics);
                    }
                    in_default = false;
                    i += 1;
                }
                Token::Eq if at_top => {
                    self.declare_pending(&mut pending, scopes, kind, file, diagnostics);
                    in_default = true;
                    i += 1;
                }
                t if t.starts_declaration() => {
                    if !in_default {
                        self.declare_pending(&mut pending, scopes, kind, file, diagnostics);
                    }
                    kind = declaration_kind(t);
                    in_default = false;
                    i += 1;
                }
                t if t.opens_scope() || t.closes_scope() => {
                    if !in_default {
                        self.declare_pending(&mut pending, scopes, kind, file, diagnostics);
                    }
                    break;
                }
                Token::LBracket => {
                    bracket += 1;
                    i += 1;
                }
                Token::RBracket => {
                    bracket -= 1;
                    i += 1;
                }
                Token::LBrace => {
                    brace += 1;
                    i += 1;
                }
                Token::RBrace => {
                    brace -= 1;
                    i += 1;
                }
                Token::LParen => {
                    paren += 1;
                    i += 1;
                }
                Token::RParen => {
                    paren -= 1;
                    i += 1;
                }
                Token::Ident(name) => {
                    if at_top && !in_default {
                        if let Some(previous) = pending.replace(name.to_string()) {
                            self.reference(&previous, file);
                        }
                    } else {
                        self.reference(name, file);
                    }
                    i += 1;
                }
                _ => i += 1,
            }
        }
        i
    }

    fn declare_pending(
        &mut self,
        pending: &mut Option<String>,
        scopes: &[Option<String>],
        kind: SymbolKind,
        file: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        if let Some(name) = pending.take() {
            self.declare(scopes, &name, kind, file, diagnostics);
        }
    }
}

/// Name of a `module`/`package`/`class`/`interface`: the first identifier
/// after the keyword, skipping lifetime and virtuality modifiers.
fn scan_scope_name(tokens: &[TokenSpan], mut i: usize) -> (Option<String>, usize) {
    while let Some(span) = tokens.get(i) {
        match &span.token {
            Token::Automatic | Token::Static | Token::Virtual => i += 1,
            Token::Ident(name) => return (Some(name.to_string()), i + 1),
            _ => break,
        }
    }
    (None, i)
}

fn scope_kind(token: &Token) -> SymbolKind {
    match token {
        Token::Package => SymbolKind::Package,
        Token::Class => SymbolKind::Class,
        Token::Interface => SymbolKind::Interface,
        Token::Function => SymbolKind::Function,
        Token::Task => SymbolKind::Task,
        _ => SymbolKind::Module,
    }
}

fn declaration_kind(token: &Token) -> SymbolKind {
    match token {
        Token::Parameter | Token::Localparam => SymbolKind::Parameter,
        _ => SymbolKind::Net,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Severity;
    use std::fs;
    use tempfile::tempdir;

    /// Build a table over an on-disk project with the given files.
    fn build(files: &[(&str, &str)]) -> (SymbolTable, Vec<Diagnostic>) {
        let dir = tempdir().unwrap();
        let mut project = Project::new(dir.path(), Vec::new(), "test");
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
            project.open_file(name).unwrap();
        }
        let mut table = SymbolTable::new();
        let mut diagnostics = Vec::new();
        table.build(&project, &mut diagnostics);
        (table, diagnostics)
    }

    /// Build and resolve, returning only the resolve diagnostics.
    fn build_and_resolve(files: &[(&str, &str)]) -> (SymbolTable, Vec<Diagnostic>) {
        let (table, _) = build(files);
        let mut diagnostics = Vec::new();
        table.resolve(&mut diagnostics);
        (table, diagnostics)
    }

    #[test]
    fn test_root_is_unkeyed() {
        let table = SymbolTable::new();
        assert_eq!(table.root().key(), None);
        assert_eq!(table.root().value().kind, SymbolKind::Root);
        assert!(table.find_definition("anything").is_none());
    }

    #[test]
    fn test_indexes_module_contents_as_children() {
        let (table, diagnostics) = build(&[(
            "top.sv",
            "module top;\n  logic q;\n  function integer f;\n    return 0;\n  endfunction\nendmodule\n",
        )]);
        assert!(diagnostics.is_empty());

        let top = table.find_definition("top").unwrap();
        assert_eq!(top.value().kind, SymbolKind::Module);
        assert_eq!(top.value().file_origin.as_deref(), Some("top.sv"));
        assert!(top.child("q").is_some());
        assert_eq!(top.child("f").unwrap().value().kind, SymbolKind::Function);
    }

    #[test]
    fn test_package_scope_nests_typedef() {
        let (table, _) = build(&[(
            "pkg.sv",
            "package pkg;\n  typedef logic [7:0] byte_t;\nendpackage\n",
        )]);
        let pkg = table.find_definition("pkg").unwrap();
        assert_eq!(pkg.value().kind, SymbolKind::Package);
        let byte_t = pkg.child("byte_t").unwrap();
        assert_eq!(byte_t.value().kind, SymbolKind::Typedef);
    }

    #[test]
    fn test_parameters_and_ansi_ports() {
        let (table, resolve_diags) = build_and_resolve(&[(
            "alu.sv",
            "module alu #(parameter WIDTH = 8)(\n  input logic [WIDTH-1:0] a,\n  output logic [WIDTH-1:0] y\n);\nendmodule\n",
        )]);
        let alu = table.find_definition("alu").unwrap();
        assert_eq!(alu.child("WIDTH").unwrap().value().kind, SymbolKind::Parameter);
        assert_eq!(alu.child("a").unwrap().value().kind, SymbolKind::Net);
        assert_eq!(alu.child("y").unwrap().value().kind, SymbolKind::Net);
        // The WIDTH uses inside the ranges all resolve.
        assert!(resolve_diags.is_empty());
    }

    #[test]
    fn test_typedef_enum_declares_trailing_name() {
        let (table, _) = build(&[(
            "types.sv",
            "typedef enum logic [1:0] {IDLE, BUSY} state_t;\n",
        )]);
        let node = table.find_definition("state_t").unwrap();
        assert_eq!(node.value().kind, SymbolKind::Typedef);
    }

    #[test]
    fn test_duplicate_sibling_keeps_first() {
        let (table, diagnostics) = build(&[
            ("a.sv", "module top; endmodule\n"),
            ("b.sv", "module top; endmodule\n"),
        ]);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("already declared"));
        let top = table.find_definition("top").unwrap();
        assert_eq!(top.value().file_origin.as_deref(), Some("a.sv"));
    }

    #[test]
    fn test_first_match_wins_in_preorder() {
        let (table, _) = build(&[
            ("a.sv", "module a;\n  wire x;\nendmodule\n"),
            ("b.sv", "module b;\n  wire x;\nendmodule\n"),
        ]);
        // Both modules declare `x`; pre-order traversal reaches a's first.
        let x = table.find_definition("x").unwrap();
        assert_eq!(x.value().file_origin.as_deref(), Some("a.sv"));
    }

    #[test]
    fn test_resolve_reports_unresolved_reference() {
        let (_, diagnostics) = build_and_resolve(&[(
            "m.sv",
            "module m;\n  logic q;\n  assign q = missing;\nendmodule\n",
        )]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Info);
        assert!(diagnostics[0].message.contains("missing"));
    }

    #[test]
    fn test_resolve_reports_each_name_once_per_file() {
        let (_, diagnostics) = build_and_resolve(&[(
            "m.sv",
            "module m;\n  assign a = ghost;\n  assign b = ghost;\nendmodule\n",
        )]);
        let ghosts = diagnostics
            .iter()
            .filter(|d| d.message.contains("ghost"))
            .count();
        assert_eq!(ghosts, 1);
    }

    #[test]
    fn test_instantiation_reference_resolves_to_module() {
        let (table, diagnostics) = build_and_resolve(&[(
            "top.sv",
            "module sub;\nendmodule\n\nmodule top;\n  sub u_sub();\nendmodule\n",
        )]);
        assert!(table.find_definition("sub").is_some());
        // `sub` and `u_sub` are uses; `sub` resolves, `u_sub` does not.
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("u_sub"));
    }

    #[test]
    fn test_unregistered_file_is_a_diagnostic() {
        let dir = tempdir().unwrap();
        let project = Project::new(dir.path(), Vec::new(), "test");
        let mut table = SymbolTable::new();
        let mut diagnostics = Vec::new();
        table.build_file(&project, "ghost.sv", &mut diagnostics);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
    }

    #[test]
    fn test_lex_error_is_a_diagnostic_not_a_failure() {
        let (table, diagnostics) = build(&[("bad.sv", "module ok;\nwire € x;\nendmodule\n")]);
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("unrecognized text")));
        // Indexing continued past the bad span.
        assert!(table.find_definition("ok").is_some());
        assert!(table.find_definition("x").is_some());
    }

    #[test]
    fn test_deeply_nested_search_is_iterative() {
        // A nesting depth that would overflow a recursive scan.
        let mut source = String::new();
        for depth in 0..5_000 {
            source.push_str(&format!("module m{depth};\n"));
        }
        source.push_str("  wire needle;\n");
        for _ in 0..5_000 {
            source.push_str("endmodule\n");
        }
        let (table, _) = build(&[("deep.sv", source.as_str())]);
        assert!(table.find_definition("needle").is_some());
    }
}
