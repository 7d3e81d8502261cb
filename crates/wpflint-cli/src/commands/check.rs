//! Check command - analyzes C# files for dependency property issues

use crate::output::json::JsonFormatter;
use crate::output::pretty::{colorize_severity, PrettyFormatter};
use crate::output::sarif::SarifFormatter;
use crate::workspace::{self, FileFilter};
use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use rayon::prelude::*;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use wpflint_core::analysis::AnalysisEngine;
use wpflint_core::cancellation::CancellationToken;
use wpflint_core::diagnostic::Diagnostic;
use wpflint_core::rules::{Confidence, Severity};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Files or directories to analyze
    #[arg(value_name = "PATHS", default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Output format for diagnostics
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Fail on warnings (exit code 1)
    #[arg(long)]
    pub fail_on_warnings: bool,

    /// Only report diagnostics at least this severe (error, warning, info, hint)
    #[arg(long, value_name = "LEVEL", value_parser = severity_arg)]
    pub severity: Option<Severity>,

    /// Only report diagnostics at least this certain (high, medium, low);
    /// overrides `min_confidence` in wpflint.toml
    #[arg(long, value_name = "LEVEL", value_parser = confidence_arg)]
    pub min_confidence: Option<Confidence>,

    /// Configuration file to use instead of the nearest wpflint.toml
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Source excerpts with the span underlined
    Pretty,
    /// One line per diagnostic
    Text,
    Json,
    /// One JSON record per line
    Ndjson,
    /// SARIF 2.1.0 for code scanning services
    Sarif,
}

const SEVERITIES: [Severity; 4] = [Severity::Error, Severity::Warning, Severity::Info, Severity::Hint];
const CONFIDENCES: [Confidence; 3] = [Confidence::High, Confidence::Medium, Confidence::Low];

fn severity_arg(value: &str) -> Result<Severity, String> {
    SEVERITIES
        .into_iter()
        .find(|severity| severity.as_str().eq_ignore_ascii_case(value))
        .ok_or_else(|| format!("expected one of error, warning, info, hint; got '{value}'"))
}

fn confidence_arg(value: &str) -> Result<Confidence, String> {
    CONFIDENCES
        .into_iter()
        .find(|confidence| confidence.as_str().eq_ignore_ascii_case(value))
        .ok_or_else(|| format!("expected one of high, medium, low; got '{value}'"))
}

/// Counts of what a check reported, used for the exit code.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CheckOutcome {
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl CheckOutcome {
    pub fn should_fail(&self, fail_on_warnings: bool) -> bool {
        self.errors > 0 || (fail_on_warnings && self.warnings > 0)
    }
}

impl CheckArgs {
    pub fn run(&self) -> Result<()> {
        self.configure_colors();

        let mut stdout = io::stdout().lock();
        let outcome = self.execute(&mut stdout)?;
        stdout.flush()?;

        if outcome.should_fail(self.fail_on_warnings) {
            process::exit(1);
        }

        Ok(())
    }

    pub fn execute<W: Write>(&self, out: &mut W) -> Result<CheckOutcome> {
        let min_severity = self.severity.unwrap_or(Severity::Hint);

        let start = self.paths.first().cloned().unwrap_or_else(|| PathBuf::from("."));
        let config_result = workspace::load_config(self.config.as_deref(), &start)?;
        for warning in &config_result.warnings {
            eprintln!("{} {}", "warning:".yellow().bold(), warning);
        }
        let config = config_result.config;

        let filter = FileFilter::from_config(&config)?;
        let files = workspace::discover_files(&self.paths, &filter)?;
        if files.is_empty() {
            writeln!(out, "No C# files found.")?;
            return Ok(CheckOutcome::default());
        }

        let parsed = workspace::parse_files(&files);
        let engine = AnalysisEngine::with_config(&config).with_min_confidence(self.min_confidence);
        let compilation = engine.compile(&parsed);
        let token = CancellationToken::new();

        let mut diagnostics: Vec<Diagnostic> = parsed
            .par_iter()
            .flat_map_iter(|file| engine.analyze_in(&compilation, file, &token))
            .filter(|d| d.severity <= min_severity)
            .collect();
        diagnostics.sort_by(|a, b| {
            (a.file.as_str(), a.line, a.column, a.rule_id.as_str())
                .cmp(&(b.file.as_str(), b.line, b.column, b.rule_id.as_str()))
        });

        tracing::info!(
            files = parsed.len(),
            diagnostics = diagnostics.len(),
            "Check finished"
        );

        let outcome = CheckOutcome {
            files: files.len(),
            errors: count(&diagnostics, Severity::Error),
            warnings: count(&diagnostics, Severity::Warning),
        };
        let analyzed_paths: Vec<String> = self
            .paths
            .iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect();

        match self.format {
            OutputFormat::Json => {
                let formatter = JsonFormatter::with_registry(engine.registry());
                writeln!(out, "{}", formatter.format(&diagnostics, files.len(), &analyzed_paths))?;
            }
            OutputFormat::Ndjson => {
                let formatter = JsonFormatter::with_registry(engine.registry());
                formatter.format_ndjson(&diagnostics, files.len(), &analyzed_paths, out)?;
            }
            OutputFormat::Sarif => {
                let formatter = SarifFormatter::with_registry(engine.registry());
                writeln!(out, "{}", formatter.format(&diagnostics))?;
            }
            OutputFormat::Text => write_text(out, &diagnostics, &outcome)?,
            OutputFormat::Pretty => {
                let sources: HashMap<String, String> = parsed
                    .iter()
                    .map(|file| (file.metadata().filename.clone(), file.source().to_string()))
                    .collect();
                let formatter = PrettyFormatter::with_sources(sources);
                write!(out, "{}", formatter.format(&diagnostics))?;
            }
        }

        Ok(outcome)
    }

    fn configure_colors(&self) {
        let no_color_env = std::env::var("NO_COLOR").is_ok();
        if self.no_color || no_color_env {
            colored::control::set_override(false);
        }
    }
}

fn write_text<W: Write>(out: &mut W, diagnostics: &[Diagnostic], outcome: &CheckOutcome) -> io::Result<()> {
    for diag in diagnostics {
        writeln!(
            out,
            "{}:{}:{}: {} [{}]: {}",
            diag.file,
            diag.line,
            diag.column,
            colorize_severity(&diag.severity),
            diag.rule_id.dimmed(),
            diag.message
        )?;

        if let Some(suggestion) = &diag.suggestion {
            writeln!(out, "  {} {}", "suggestion:".green(), suggestion)?;
        }
    }

    if !diagnostics.is_empty() {
        writeln!(out)?;
        writeln!(
            out,
            "Found {} error(s) and {} warning(s)",
            outcome.errors, outcome.warnings
        )?;
    }
    Ok(())
}

fn count(diagnostics: &[Diagnostic], severity: Severity) -> usize {
    diagnostics.iter().filter(|d| d.severity == severity).count()
}
