//! wpflint-lsp - reports WPF dependency property issues to editors over stdio

mod analysis;
mod capabilities;
mod cli;
mod code_actions;
mod debouncer;
mod diagnostics;
mod document;
mod logging;
mod server;

use clap::Parser;
use tower_lsp::{LspService, Server};

use crate::cli::Cli;
use crate::logging::init_logging;
use crate::server::WpflintLanguageServer;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        stdio_flag = cli.stdio,
        "starting wpflint-lsp"
    );

    let (service, socket) = LspService::new(WpflintLanguageServer::new);
    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
        .serve(service)
        .await;

    tracing::info!("wpflint-lsp stopped");
}
