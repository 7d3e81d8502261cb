//! Init command - writes a starter wpflint.toml next to a WPF project

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use walkdir::WalkDir;
use wpflint_core::config::{CONFIG_FILENAME, DEFAULT_CONFIG};

const PROJECT_SEARCH_DEPTH: usize = 3;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to write wpflint.toml into
    #[arg(value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,
}

/// Project files found under the target directory.
#[derive(Debug, Default, PartialEq)]
pub struct ProjectScan {
    pub wpf_projects: Vec<PathBuf>,
    pub other_projects: usize,
}

impl InitArgs {
    pub fn run(&self) -> Result<()> {
        let stdout = std::io::stdout();
        self.execute(&mut stdout.lock()).map(|_| ())
    }

    pub fn execute<W: Write>(&self, out: &mut W) -> Result<PathBuf> {
        if !self.dir.is_dir() {
            anyhow::bail!("'{}' is not a directory", self.dir.display());
        }
        let config_path = self.dir.join(CONFIG_FILENAME);
        if config_path.exists() && !self.force {
            anyhow::bail!(
                "Config file '{}' already exists. Use --force to overwrite.",
                config_path.display()
            );
        }

        fs::write(&config_path, DEFAULT_CONFIG)
            .with_context(|| format!("Failed to write '{}'", config_path.display()))?;
        writeln!(
            out,
            "{} Created {}",
            "✓".green().bold(),
            config_path.display().to_string().cyan()
        )?;

        let scan = scan_projects(&self.dir);
        tracing::debug!(wpf = scan.wpf_projects.len(), other = scan.other_projects, "scanned projects");
        for project in &scan.wpf_projects {
            writeln!(out, "  WPF project: {}", project.display())?;
        }
        if scan.wpf_projects.is_empty() && scan.other_projects > 0 {
            writeln!(
                out,
                "  {} no project here sets <UseWPF>true</UseWPF>",
                "note:".yellow().bold()
            )?;
        }

        Ok(config_path)
    }
}

/// Looks for `.csproj` files a few levels below `dir`, skipping build output.
pub fn scan_projects(dir: &Path) -> ProjectScan {
    let mut scan = ProjectScan::default();
    let projects = WalkDir::new(dir)
        .max_depth(PROJECT_SEARCH_DEPTH)
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            entry.depth() == 0 || !(name.starts_with('.') || name == "bin" || name == "obj")
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "csproj"));

    for project in projects {
        let uses_wpf = fs::read_to_string(project.path())
            .map(|content| content.contains("<UseWPF>true</UseWPF>"))
            .unwrap_or(false);
        if uses_wpf {
            scan.wpf_projects.push(project.into_path());
        } else {
            scan.other_projects += 1;
        }
    }
    scan.wpf_projects.sort();
    scan
}
