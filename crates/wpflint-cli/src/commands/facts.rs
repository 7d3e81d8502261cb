//! Facts command - dumps the recovered dependency property declarations as JSON

use crate::workspace::{self, FileFilter};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use wpflint_core::analysis::AnalysisEngine;
use wpflint_core::cancellation::CancellationToken;
use wpflint_core::dependency_property::{collect_facts, DependencyPropertyFacts};

#[derive(Args, Debug)]
pub struct FactsArgs {
    /// Files or directories to inspect
    #[arg(value_name = "PATHS", default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Configuration file to use instead of the nearest wpflint.toml
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Serialize)]
struct FileFacts {
    file: String,
    properties: Vec<DependencyPropertyFacts>,
}

impl FactsArgs {
    pub fn run(&self) -> Result<()> {
        let mut stdout = io::stdout().lock();
        self.execute(&mut stdout)?;
        stdout.flush()?;
        Ok(())
    }

    pub fn execute<W: Write>(&self, out: &mut W) -> Result<()> {
        let start = self.paths.first().cloned().unwrap_or_else(|| PathBuf::from("."));
        let config = workspace::load_config(self.config.as_deref(), &start)?.config;
        let filter = FileFilter::from_config(&config)?;
        let files = workspace::discover_files(&self.paths, &filter)?;
        let parsed = workspace::parse_files(&files);

        let engine = AnalysisEngine::with_config(&config);
        let compilation = engine.compile(&parsed);
        let token = CancellationToken::new();

        let report: Vec<FileFacts> = parsed
            .iter()
            .filter_map(|file| {
                let model = compilation.model_for(file)?;
                Some(FileFacts {
                    file: file.metadata().filename.clone(),
                    properties: collect_facts(&model, &token),
                })
            })
            .filter(|facts| !facts.properties.is_empty())
            .collect();

        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        Ok(())
    }
}
