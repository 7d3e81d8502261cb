//! Locating configuration and C# sources for a run

use anyhow::{Context, Result};
use glob::Pattern;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use wpflint_core::config::{self, Config, ConfigResult};
use wpflint_core::parser::ParsedFile;

const SUPPORTED_EXTENSIONS: &[&str] = &["cs"];
const SKIPPED_DIRECTORIES: &[&str] = &["bin", "obj"];

/// Loads `explicit` when given, otherwise the nearest `wpflint.toml` above `start`.
///
/// A config file that exists but cannot be read or parsed is an error.
pub fn load_config(explicit: Option<&Path>, start: &Path) -> Result<ConfigResult> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let dir = if start.is_file() {
                start.parent().unwrap_or(start)
            } else {
                start
            };
            let dir = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
            config::find_config_file(&dir)
        }
    };

    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading configuration");
            config::load_config_with_warnings(&path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))
        }
        None => Ok(ConfigResult::default()),
    }
}

/// `include` / `exclude` patterns of the configuration, matched against paths relative to
/// the directory being searched.
pub struct FileFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl FileFilter {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            include: compile_patterns(&config.include, "include")?,
            exclude: compile_patterns(&config.exclude, "exclude")?,
        })
    }

    pub fn accepts(&self, relative: &Path) -> bool {
        (self.include.is_empty() || self.include.iter().any(|p| p.matches_path(relative)))
            && !self.exclude.iter().any(|p| p.matches_path(relative))
    }
}

fn compile_patterns(patterns: &[String], key: &str) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).with_context(|| format!("Invalid {key} pattern '{pattern}'"))
        })
        .collect()
}

/// C# files under `paths`, sorted. Files named explicitly are always analyzed.
pub fn discover_files(paths: &[PathBuf], filter: &FileFilter) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if !path.exists() {
            anyhow::bail!("Path does not exist: {}", path.display());
        }

        if path.is_file() {
            if is_supported_file(path) {
                files.push(path.clone());
            }
            continue;
        }

        files.extend(
            WalkDir::new(path)
                .into_iter()
                .filter_entry(|e| !is_skipped(e))
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .filter(|e| is_supported_file(e.path()))
                .filter(|e| filter.accepts(e.path().strip_prefix(path).unwrap_or(e.path())))
                .map(|e| e.path().to_path_buf()),
        );
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Reads and parses `files` in parallel; unreadable files are skipped with a warning.
pub fn parse_files(files: &[PathBuf]) -> Vec<ParsedFile> {
    files
        .par_iter()
        .filter_map(|path| match fs::read_to_string(path) {
            Ok(content) => Some(ParsedFile::from_source(&path.to_string_lossy(), &content)),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "Skipping unreadable file");
                None
            }
        })
        .collect()
}

fn is_supported_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}

fn is_skipped(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.') || SKIPPED_DIRECTORIES.contains(&name))
}
