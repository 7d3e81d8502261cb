use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// How much the server logs about itself and the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Verbosity {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    /// Level name as `EnvFilter` directives spell it.
    pub fn directive(self) -> &'static str {
        match self {
            Verbosity::Error => "error",
            Verbosity::Warn => "warn",
            Verbosity::Info => "info",
            Verbosity::Debug => "debug",
            Verbosity::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// wpflint-lsp reports WPF dependency property issues in C# documents as you type.
///
/// The protocol runs over stdin and stdout; logs go to stderr unless --log-file is given.
#[derive(Parser, Debug)]
#[command(name = "wpflint-lsp", version)]
pub struct Cli {
    /// Most detailed events to log
    #[arg(long = "log-level", value_enum, default_value_t = Verbosity::Info)]
    pub verbosity: Verbosity,

    /// Log to this file instead of stderr, rotated daily
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Shape of each log record
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Editors pass this to select the stdio transport, the only one served.
    #[arg(long, hide = true)]
    pub stdio: bool,
}
