//! Silica language server.
//!
//! A Language Server Protocol implementation for SystemVerilog built
//! around a project-wide symbol table.
//!
//! # Features
//!
//! - **Go-to-definition**: project-wide, driven by the symbol table
//! - **Document symbols**: every declaration the table knows in a file
//! - **Diagnostics**: unlexable text reported per open buffer
//!
//! Project configuration is discovered at startup: the workspace root is
//! taken from the initialize request and a `verible.filelist` descriptor
//! is searched for up the directory ancestry.

use tokio::sync::Mutex;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing_subscriber::EnvFilter;

use silica_ls::handler::{lsp_range, SymbolTableHandler};
use silica_ls::{paths, BufferTracker};
use silica_syntax::LineColumn;

/// The Silica language server backend.
struct Backend {
    /// LSP client for notifications and log messages.
    client: Client,
    /// The session's (project, symbol table, dirty flag) owner. One query
    /// runs start-to-finish at a time; this mutex is the serialization.
    handler: Mutex<SymbolTableHandler>,
    /// Open editor documents, relexed on every change.
    buffers: BufferTracker,
}

impl Backend {
    /// Publish lexical diagnostics for one open buffer.
    async fn publish_buffer_diagnostics(&self, uri: Url) {
        let diagnostics = match self.buffers.get(uri.as_str()) {
            Some(buffer) => {
                let text = buffer.text();
                text.errors()
                    .iter()
                    .map(|error| Diagnostic {
                        range: lsp_range(text.range_of(error.start, error.end)),
                        severity: Some(DiagnosticSeverity::ERROR),
                        source: Some("silica".to_string()),
                        message: "unrecognized text".to_string(),
                        ..Default::default()
                    })
                    .collect()
            }
            None => Vec::new(),
        };
        self.client.publish_diagnostics(uri, diagnostics, None).await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let root = params
            .root_uri
            .as_ref()
            .map(|uri| uri.as_str().to_string())
            .or_else(|| {
                params
                    .workspace_folders
                    .as_ref()
                    .and_then(|folders| folders.first())
                    .map(|folder| folder.uri.as_str().to_string())
            })
            .and_then(|uri| paths::uri_to_path(&uri).map(std::path::PathBuf::from));

        if let Some(root) = root {
            let corpus = root.to_string_lossy().into_owned();
            let mut handler = self.handler.lock().await;
            handler.set_project(root.clone(), Vec::new(), corpus);
            handler.load_project_file_list(&root);
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                definition_provider: Some(OneOf::Left(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "silica-ls".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        let files = self
            .handler
            .lock()
            .await
            .project()
            .map(|project| project.file_count())
            .unwrap_or(0);
        self.client
            .log_message(
                MessageType::INFO,
                format!("silica language server initialized ({files} project files)"),
            )
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        self.buffers.update(uri.as_str(), &params.text_document.text);
        self.handler.lock().await.track_opened_document(uri.as_str());
        self.publish_buffer_diagnostics(uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        // FULL sync: one change carrying the whole content.
        if let Some(change) = params.content_changes.into_iter().next() {
            self.buffers.update(uri.as_str(), &change.text);
            self.handler.lock().await.mark_dirty();
            self.publish_buffer_diagnostics(uri).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.buffers.remove(uri.as_str());
        // Clear diagnostics
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let locations = self.handler.lock().await.find_definition(
            uri.as_str(),
            LineColumn::new(position.line, position.character),
            &self.buffers,
        );
        Ok(locations.into_iter().next().map(GotoDefinitionResponse::Scalar))
    }

    #[allow(deprecated)] // SymbolInformation::deprecated must be populated
    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let uri = params.text_document.uri;
        let entries = self.handler.lock().await.document_symbols(uri.as_str());
        if entries.is_empty() {
            return Ok(None);
        }
        let symbols: Vec<SymbolInformation> = entries
            .into_iter()
            .map(|entry| SymbolInformation {
                name: entry.name,
                kind: table_kind_to_lsp(entry.kind),
                tags: None,
                deprecated: None,
                location: Location {
                    uri: uri.clone(),
                    range: lsp_range(entry.range),
                },
                container_name: None,
            })
            .collect();
        Ok(Some(DocumentSymbolResponse::Flat(symbols)))
    }
}

/// Convert our SymbolKind to LSP SymbolKind.
fn table_kind_to_lsp(kind: silica_analysis::SymbolKind) -> SymbolKind {
    match kind {
        silica_analysis::SymbolKind::Root => SymbolKind::FILE,
        silica_analysis::SymbolKind::Module => SymbolKind::MODULE,
        silica_analysis::SymbolKind::Package => SymbolKind::PACKAGE,
        silica_analysis::SymbolKind::Class => SymbolKind::CLASS,
        silica_analysis::SymbolKind::Interface => SymbolKind::INTERFACE,
        silica_analysis::SymbolKind::Function => SymbolKind::FUNCTION,
        silica_analysis::SymbolKind::Task => SymbolKind::METHOD,
        silica_analysis::SymbolKind::Typedef => SymbolKind::STRUCT,
        silica_analysis::SymbolKind::Parameter => SymbolKind::CONSTANT,
        silica_analysis::SymbolKind::Net => SymbolKind::VARIABLE,
    }
}

/// Initialize logging to stderr; stdout carries the protocol.
///
/// Use the `RUST_LOG` environment variable to override the default filter.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,silica_ls=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(|client| Backend {
        client,
        handler: Mutex::new(SymbolTableHandler::new()),
        buffers: BufferTracker::new(),
    });

    Server::new(stdin, stdout, socket).serve(service).await;
}
