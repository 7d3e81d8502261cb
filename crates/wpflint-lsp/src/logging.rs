//! Log setup for the server process
//!
//! stdout carries the protocol, so logs go to stderr or to a file rotated daily.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

use crate::cli::{Cli, LogFormat, Verbosity};

const DEFAULT_LOG_FILENAME: &str = "wpflint-lsp.log";

/// Installs the global subscriber. The returned guard flushes the file writer when
/// dropped, so it lives as long as the server.
pub fn init_logging(cli: &Cli) -> Option<WorkerGuard> {
    let (writer, guard) = match &cli.log_file {
        Some(path) => {
            let (writer, guard) = file_writer(path);
            (BoxMakeWriter::new(writer), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(cli.verbosity)));
    let layer: Box<dyn Layer<Registry> + Send + Sync> = match cli.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(filter)
            .boxed(),
        LogFormat::Text => fmt::layer()
            .with_writer(writer)
            .with_ansi(cli.log_file.is_none())
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(filter)
            .boxed(),
    };

    tracing_subscriber::registry().with(layer).init();
    guard
}

/// The server and the analyzer log at `verbosity`; dependencies only report warnings.
fn default_directives(verbosity: Verbosity) -> String {
    format!("warn,wpflint_lsp={0},wpflint_core={0}", verbosity.directive())
}

fn file_writer(path: &Path) -> (tracing_appender::non_blocking::NonBlocking, WorkerGuard) {
    let (directory, filename) = log_location(path);
    tracing_appender::non_blocking(tracing_appender::rolling::daily(directory, filename))
}

/// Directory and file name prefix of the rotated log files.
fn log_location(path: &Path) -> (&Path, &str) {
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_LOG_FILENAME);
    (directory, filename)
}
