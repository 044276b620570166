//! Symbol-table lifecycle and definition resolution.
//!
//! [`SymbolTableHandler`] owns one session's source of truth: the current
//! [`Project`], the [`SymbolTable`] built against it, and the dirty flag
//! that gates rebuilds. The three are one state struct replaced together,
//! never process-wide globals, and the caller serializes all access (the
//! server holds the handler behind a single mutex).
//!
//! Every failure path degrades to an empty result plus a log entry;
//! nothing in here is fatal.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tower_lsp::lsp_types::{Location, Position, Range, Url};
use tracing::{debug, error, info, warn};

use silica_analysis::{Severity, SymbolKind, SymbolTable};
use silica_project::{filelist, FileList, Project};
use silica_syntax::{LineColumn, LineColumnRange};

use crate::buffers::BufferTracker;
use crate::paths;

/// A symbol listed for one document, protocol-ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub name: String,
    pub kind: SymbolKind,
    pub range: LineColumnRange,
}

/// Owner of the (project, symbol table, dirty flag) triple.
#[derive(Debug, Default)]
pub struct SymbolTableHandler {
    project: Option<Project>,
    symbol_table: SymbolTable,
    /// Relative paths already indexed since the last reset; repeat
    /// incremental builds of the same file are skipped.
    checked_files: HashSet<String>,
    /// True when the table is stale relative to the project's file set
    /// (or edited buffer contents) and must be rebuilt before the next
    /// query is answered.
    files_dirty: bool,
}

impl SymbolTableHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.files_dirty
    }

    /// Mark the table stale; the next query rebuilds first.
    pub fn mark_dirty(&mut self) {
        self.files_dirty = true;
    }

    /// Install a new project, discarding any previous one, and reset the
    /// symbol table with it.
    pub fn set_project(
        &mut self,
        root: impl Into<PathBuf>,
        include_paths: Vec<PathBuf>,
        corpus: impl Into<String>,
    ) {
        self.project = Some(Project::new(root, include_paths, corpus));
        self.reset_symbol_table();
    }

    /// Discard the table and its bookkeeping.
    ///
    /// Safe with no project set; the fresh table stays empty until one is.
    pub fn reset_symbol_table(&mut self) {
        self.checked_files.clear();
        self.symbol_table = SymbolTable::new();
    }

    /// Incrementally index one registered file into the existing table.
    ///
    /// Other files' entries are untouched. Diagnostics are logged, never
    /// surfaced to the caller.
    pub fn build_symbol_table_for(&mut self, relative: &str) {
        let Some(project) = self.project.as_ref() else {
            return;
        };
        if !self.checked_files.insert(relative.to_string()) {
            return;
        }
        debug!(file = relative, "building symbol table for file");
        let mut diagnostics = Vec::new();
        self.symbol_table
            .build_file(project, relative, &mut diagnostics);
        log_diagnostics(&diagnostics);
    }

    /// Full rebuild: reset, index every registered file, link references.
    ///
    /// The dirty flag is cleared unconditionally at the end, regardless of
    /// what the build and resolve passes reported.
    pub fn build_project_symbol_table(&mut self) {
        self.reset_symbol_table();
        let Some(project) = self.project.as_ref() else {
            return;
        };
        info!(files = project.file_count(), "building project symbol table");
        let mut diagnostics = Vec::new();
        self.symbol_table.build(project, &mut diagnostics);
        log_diagnostics(&diagnostics);
        let mut diagnostics = Vec::new();
        self.symbol_table.resolve(&mut diagnostics);
        log_diagnostics(&diagnostics);
        for (relative, _) in project.files() {
            self.checked_files.insert(relative.to_string());
        }
        self.files_dirty = false;
    }

    /// Discover and apply the project file list, searching for the
    /// descriptor from `start_dir` up the directory ancestry.
    ///
    /// No descriptor is a silent no-op. A malformed descriptor aborts the
    /// whole load with a warning, leaving prior project state untouched.
    /// A listed file that cannot be opened is skipped with a warning and
    /// the load continues; each opened file is indexed incrementally.
    pub fn load_project_file_list(&mut self, start_dir: &Path) {
        if self.project.is_none() {
            return;
        }
        let Some(descriptor) = filelist::find_file_list(start_dir) else {
            info!(
                start = %start_dir.display(),
                "no {} found in directory ancestry",
                filelist::FILE_LIST_NAME
            );
            return;
        };
        info!(path = %descriptor.display(), "found project file list");
        let list = match FileList::from_file(&descriptor) {
            Ok(list) => list,
            Err(err) => {
                warn!(path = %descriptor.display(), "failed to parse file list: {err}");
                return;
            }
        };
        if let Some(project) = self.project.as_mut() {
            for dir in &list.include_dirs {
                project.add_include_dir(dir.clone());
            }
        }
        for path in &list.file_paths {
            let relative = path.to_string_lossy().into_owned();
            let opened = match self.project.as_mut() {
                Some(project) => match project.open_file(&relative) {
                    Ok(_) => true,
                    Err(err) => {
                        warn!(
                            path = %descriptor.display(),
                            "file included in file list not found: {err}"
                        );
                        false
                    }
                },
                None => false,
            };
            if opened {
                self.build_symbol_table_for(&relative);
            }
        }
    }

    /// Register a document the editor just opened, if it belongs to the
    /// project and is not yet part of the file set.
    ///
    /// A successful registration mutates the file set, so the table is
    /// marked dirty.
    pub fn track_opened_document(&mut self, uri: &str) {
        let Some(path) = paths::uri_to_path(uri) else {
            return;
        };
        let path = path.to_string();
        let Some(project) = self.project.as_mut() else {
            return;
        };
        if !Path::new(&path).starts_with(project.root()) {
            return;
        }
        let relative = project.relative_path(Path::new(&path));
        if project.is_registered(&relative) {
            return;
        }
        let opened = match project.open_file(&relative) {
            Ok(_) => true,
            Err(err) => {
                warn!(uri, "could not register opened document: {err}");
                false
            }
        };
        if opened {
            debug!(file = %relative, "opened document joins the project file set");
            self.files_dirty = true;
        }
    }

    /// Answer a go-to-definition query.
    ///
    /// Returns zero or exactly one location; every failure degrades to an
    /// empty list plus a log entry. The URI scheme is checked before
    /// anything else, so an unsupported scheme never triggers a rebuild.
    pub fn find_definition(
        &mut self,
        uri: &str,
        position: LineColumn,
        buffers: &BufferTracker,
    ) -> Vec<Location> {
        let Some(filepath) = paths::uri_to_path(uri) else {
            error!(uri, "could not convert URI to filesystem path");
            return Vec::new();
        };
        let filepath = filepath.to_string();
        if self.files_dirty {
            self.build_project_symbol_table();
        }
        let Some(project) = self.project.as_ref() else {
            debug!("no project set; cannot resolve definitions");
            return Vec::new();
        };
        let relative = project.relative_path(Path::new(&filepath));
        let Some(buffer) = buffers.get(uri) else {
            error!(uri, "buffer not found among opened buffers");
            return Vec::new();
        };
        let Some(token) = buffer.text().token_at(position) else {
            debug!(uri, position.line, position.column, "no token at position");
            return Vec::new();
        };
        let symbol = buffer.text().text_of(token).to_string();
        if project.lookup(&relative).is_none() {
            error!(uri, "unable to look up document in the project");
            return Vec::new();
        }
        let Some(node) = self.symbol_table.find_definition(&symbol) else {
            info!(symbol = %symbol, "symbol not found in symbol table");
            return Vec::new();
        };
        let Some(origin) = node.value().file_origin.as_deref() else {
            error!(symbol = %symbol, "origin file not available");
            return Vec::new();
        };
        let Some(origin_file) = project.lookup(origin) else {
            error!(symbol = %symbol, origin, "origin file not registered");
            return Vec::new();
        };
        let Some(text) = origin_file.text_structure() else {
            error!(symbol = %symbol, origin, "origin file's text structure is not parsed");
            return Vec::new();
        };
        let Some(key) = node.key() else {
            return Vec::new();
        };
        let Some(range) = text.range_for_text(key) else {
            warn!(symbol = %symbol, origin, "origin file no longer contains the symbol text");
            return Vec::new();
        };
        let uri_string = paths::path_to_uri(origin_file.resolved_path());
        match Url::parse(&uri_string) {
            Ok(uri) => vec![Location {
                uri,
                range: lsp_range(range),
            }],
            Err(err) => {
                error!(uri = %uri_string, "constructed an unparsable URI: {err}");
                Vec::new()
            }
        }
    }

    /// Symbols declared by one document, for document-symbol listings.
    ///
    /// Walks the tree with an explicit stack and keeps the nodes whose
    /// origin is the queried file, recomputing each range the same way
    /// definition resolution does.
    pub fn document_symbols(&mut self, uri: &str) -> Vec<SymbolEntry> {
        let Some(filepath) = paths::uri_to_path(uri) else {
            return Vec::new();
        };
        let filepath = filepath.to_string();
        if self.files_dirty {
            self.build_project_symbol_table();
        }
        let Some(project) = self.project.as_ref() else {
            return Vec::new();
        };
        let relative = project.relative_path(Path::new(&filepath));
        let Some(file) = project.lookup(&relative) else {
            return Vec::new();
        };
        let Some(text) = file.text_structure() else {
            return Vec::new();
        };
        let mut entries = Vec::new();
        let mut stack = vec![self.symbol_table.root()];
        while let Some(node) = stack.pop() {
            if let (Some(key), Some(origin)) = (node.key(), node.value().file_origin.as_deref()) {
                if origin == relative {
                    if let Some(range) = text.range_for_text(key) {
                        entries.push(SymbolEntry {
                            name: key.to_string(),
                            kind: node.value().kind,
                            range,
                        });
                    }
                }
            }
            stack.extend(node.children());
        }
        entries
    }
}

/// Map a syntax range onto the protocol's range type.
pub fn lsp_range(range: LineColumnRange) -> Range {
    Range {
        start: Position {
            line: range.start.line,
            character: range.start.column,
        },
        end: Position {
            line: range.end.line,
            character: range.end.column,
        },
    }
}

fn log_diagnostics(diagnostics: &[silica_analysis::Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.severity {
            Severity::Warning => warn!("{diagnostic}"),
            Severity::Info => info!("{diagnostic}"),
        }
    }
}
