use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    CodeActionParams, CodeActionResponse, DidChangeConfigurationParams,
    DidChangeTextDocumentParams, DidChangeWatchedFilesParams,
    DidChangeWatchedFilesRegistrationOptions, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, DidSaveTextDocumentParams, FileSystemWatcher, GlobPattern,
    InitializeParams, InitializeResult, InitializedParams, MessageType, Registration,
    ServerInfo, Url,
};
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, info, instrument, warn};

use wpflint_core::analysis::AnalysisEngine;
use wpflint_core::cancellation::CancellationToken;
use wpflint_core::config::{
    find_config_file, load_config_with_warnings, ConfigError, ConfigResult, CONFIG_FILENAME,
};

use crate::analysis::{analyze_documents, AnalyzedDocument};
use crate::capabilities::server_capabilities;
use crate::code_actions::generate_code_actions;
use crate::debouncer::Debouncer;
use crate::diagnostics::convert_diagnostics;
use crate::document::{is_csharp, DocumentStore};

/// State shared between request handlers and debounced analysis tasks.
#[derive(Clone)]
struct Workspace {
    client: Client,
    documents: Arc<DocumentStore>,
    engine: Arc<RwLock<Arc<AnalysisEngine>>>,
    analyzed: Arc<DashMap<Url, AnalyzedDocument>>,
    root: Arc<RwLock<Option<PathBuf>>>,
    current_run: Arc<Mutex<CancellationToken>>,
}

impl Workspace {
    fn engine(&self) -> Arc<AnalysisEngine> {
        self.engine.read().clone()
    }

    /// Re-analyzes every open C# document as one compilation and publishes the results.
    ///
    /// Starting a run cancels the one still in flight.
    async fn refresh(&self) {
        let token = CancellationToken::new();
        let previous = std::mem::replace(&mut *self.current_run.lock(), token.clone());
        previous.cancel();

        let documents = self.documents.snapshot();
        if documents.is_empty() {
            return;
        }
        let engine = self.engine();
        let count = documents.len();

        let result = tokio::task::spawn_blocking({
            let engine = Arc::clone(&engine);
            move || analyze_documents(&engine, &documents, &token)
        })
        .await;

        let analyzed = match result {
            Ok(Some(analyzed)) => analyzed,
            Ok(None) => {
                debug!(documents = count, "analysis superseded");
                return;
            }
            Err(error) => {
                warn!(%error, "analysis task failed");
                return;
            }
        };

        for document in analyzed {
            // Closed or edited since the snapshot; a later run covers it.
            if self.documents.version(&document.uri) != Some(document.version) {
                continue;
            }
            let diagnostics =
                convert_diagnostics(&document.file, &document.diagnostics, Some(engine.registry()));
            let (uri, version) = (document.uri.clone(), document.version);
            self.analyzed.insert(uri.clone(), document);
            self.client
                .publish_diagnostics(uri, diagnostics, Some(version))
                .await;
        }
        debug!(documents = count, "published diagnostics");
    }

    async fn reload_config(&self) {
        let root = self.root.read().clone();
        let loaded =
            tokio::task::spawn_blocking(move || load_workspace_config(root.as_deref())).await;

        match loaded {
            Ok(Ok(result)) => {
                for warning in &result.warnings {
                    self.client
                        .log_message(MessageType::WARNING, warning.clone())
                        .await;
                }
                *self.engine.write() = Arc::new(AnalysisEngine::with_config(&result.config));
                info!("configuration loaded");
            }
            Ok(Err(error)) => {
                warn!(%error, "keeping previous configuration");
                self.client
                    .show_message(MessageType::ERROR, format!("wpflint: {error}"))
                    .await;
            }
            Err(error) => warn!(%error, "configuration task failed"),
        }
    }
}

/// Configuration of the workspace at `root`; defaults when there is no `wpflint.toml`.
fn load_workspace_config(root: Option<&Path>) -> std::result::Result<ConfigResult, ConfigError> {
    match root.and_then(find_config_file) {
        Some(path) => load_config_with_warnings(&path),
        None => Ok(ConfigResult::default()),
    }
}

fn is_config_file(uri: &Url) -> bool {
    uri.path()
        .rsplit('/')
        .next()
        .is_some_and(|name| name == CONFIG_FILENAME)
}

pub struct WpflintLanguageServer {
    workspace: Workspace,
    debouncer: Arc<Debouncer>,
}

impl WpflintLanguageServer {
    pub fn new(client: Client) -> Self {
        Self {
            workspace: Workspace {
                client,
                documents: Arc::new(DocumentStore::new()),
                engine: Arc::new(RwLock::new(Arc::new(AnalysisEngine::new()))),
                analyzed: Arc::new(DashMap::new()),
                root: Arc::new(RwLock::new(None)),
                current_run: Arc::new(Mutex::new(CancellationToken::new())),
            },
            debouncer: Arc::new(Debouncer::new()),
        }
    }

    fn schedule_refresh(&self, uri: Url) {
        let workspace = self.workspace.clone();
        self.debouncer.schedule(uri, move |changed| async move {
            debug!(changed = changed.len(), "debounced refresh");
            workspace.refresh().await
        });
    }

    async fn watch_config_file(&self) {
        let options = DidChangeWatchedFilesRegistrationOptions {
            watchers: vec![FileSystemWatcher {
                glob_pattern: GlobPattern::String(format!("**/{CONFIG_FILENAME}")),
                kind: None,
            }],
        };
        let registration = Registration {
            id: "wpflint-config-watcher".to_string(),
            method: "workspace/didChangeWatchedFiles".to_string(),
            register_options: serde_json::to_value(options).ok(),
        };

        if let Err(error) = self.workspace.client.register_capability(vec![registration]).await {
            debug!(%error, "client does not support file watching");
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for WpflintLanguageServer {
    #[instrument(skip(self, params), name = "lsp/initialize")]
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        info!("initializing LSP server");

        let root = params
            .root_uri
            .or_else(|| {
                params
                    .workspace_folders
                    .and_then(|folders| folders.into_iter().next())
                    .map(|folder| folder.uri)
            })
            .and_then(|uri| uri.to_file_path().ok());
        *self.workspace.root.write() = root;

        Ok(InitializeResult {
            capabilities: server_capabilities(),
            server_info: Some(ServerInfo {
                name: "wpflint-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    #[instrument(skip(self, _params), name = "lsp/initialized")]
    async fn initialized(&self, _params: InitializedParams) {
        self.workspace.reload_config().await;
        self.watch_config_file().await;

        info!("LSP server initialized");
        self.workspace
            .client
            .log_message(MessageType::INFO, "wpflint-lsp initialized")
            .await;
    }

    #[instrument(skip(self), name = "lsp/shutdown")]
    async fn shutdown(&self) -> Result<()> {
        info!("shutting down LSP server");
        self.workspace.current_run.lock().cancel();
        Ok(())
    }

    #[instrument(skip(self, params), fields(uri = %params.text_document.uri), name = "lsp/textDocument/didOpen")]
    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        debug!(uri = %uri, "opening document");
        self.workspace.documents.open(
            uri.clone(),
            params.text_document.version,
            &params.text_document.text,
        );
        if is_csharp(&uri) {
            self.debouncer.cancel(&uri);
            self.workspace.refresh().await;
        }
    }

    #[instrument(skip(self, params), fields(uri = %params.text_document.uri), name = "lsp/textDocument/didChange")]
    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        debug!(uri = %uri, version, "document changed");
        if self.workspace.documents.change(&uri, version, &change.text) && is_csharp(&uri) {
            self.schedule_refresh(uri);
        }
    }

    #[instrument(skip(self, params), fields(uri = %params.text_document.uri), name = "lsp/textDocument/didSave")]
    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        if is_config_file(&params.text_document.uri) {
            info!("configuration saved, reloading");
            self.workspace.reload_config().await;
            self.workspace.refresh().await;
        }
    }

    #[instrument(skip(self, params), fields(uri = %params.text_document.uri), name = "lsp/textDocument/didClose")]
    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        debug!(uri = %uri, "closing document");
        self.workspace.documents.close(&uri);
        self.workspace.analyzed.remove(&uri);
        self.workspace
            .client
            .publish_diagnostics(uri.clone(), vec![], None)
            .await;
        if is_csharp(&uri) {
            self.schedule_refresh(uri);
        }
    }

    #[instrument(skip(self, params), fields(uri = %params.text_document.uri), name = "lsp/textDocument/codeAction")]
    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let uri = &params.text_document.uri;

        let actions = self
            .workspace
            .analyzed
            .get(uri)
            .map(|document| {
                generate_code_actions(uri, &document.file, &document.diagnostics, &params.range)
            })
            .unwrap_or_default();

        if actions.is_empty() {
            Ok(None)
        } else {
            Ok(Some(actions))
        }
    }

    #[instrument(skip(self, _params), name = "lsp/workspace/didChangeConfiguration")]
    async fn did_change_configuration(&self, _params: DidChangeConfigurationParams) {
        info!("configuration changed, reloading");
        self.workspace.reload_config().await;
        self.workspace.refresh().await;
    }

    #[instrument(skip(self, params), name = "lsp/workspace/didChangeWatchedFiles")]
    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        if params.changes.iter().any(|change| is_config_file(&change.uri)) {
            info!("configuration file changed, reloading");
            self.workspace.reload_config().await;
            self.workspace.refresh().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tower_lsp::lsp_types::{TextDocumentSyncCapability, TextDocumentSyncKind};

    #[test]
    fn server_declares_full_text_sync() {
        let capabilities = server_capabilities();

        match &capabilities.text_document_sync {
            Some(TextDocumentSyncCapability::Options(opts)) => {
                assert_eq!(opts.change, Some(TextDocumentSyncKind::FULL));
                assert_eq!(opts.open_close, Some(true));
            }
            _ => panic!("textDocumentSync must use Options variant"),
        }
    }

    #[test]
    fn recognizes_config_file_uris() {
        assert!(is_config_file(&Url::parse("file:///project/wpflint.toml").unwrap()));
        assert!(!is_config_file(&Url::parse("file:///project/Cargo.toml").unwrap()));
        assert!(!is_config_file(&Url::parse("file:///project/Gauge.cs").unwrap()));
    }

    #[test]
    fn workspace_without_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let result = load_workspace_config(Some(dir.path())).unwrap();

        assert!(result.config.rules.disabled.is_empty());
        assert!(load_workspace_config(None).is_ok());
    }

    #[test]
    fn workspace_config_is_read_from_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            "[rules]\ndisabled = [\"WPF0036\"]\nunknown = 1\n",
        )
        .unwrap();

        let result = load_workspace_config(Some(dir.path())).unwrap();

        assert_eq!(result.config.rules.disabled, vec!["WPF0036"]);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn invalid_workspace_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "[rules\n").unwrap();

        assert!(load_workspace_config(Some(dir.path())).is_err());
    }
}
