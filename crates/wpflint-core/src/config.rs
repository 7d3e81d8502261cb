//! `wpflint.toml`
//!
//! The file is looked up from the analyzed directory upwards. Every section is optional;
//! keys the analyzer does not know are reported as warnings.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::rules::{Confidence, Severity};

pub const CONFIG_FILENAME: &str = "wpflint.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid configuration in '{}': {}", path.display(), source.message())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// A loaded configuration and the unknown keys found in it.
#[derive(Debug, Clone, Default)]
pub struct ConfigResult {
    pub config: Config,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Glob patterns relative to the searched directory; empty means every `.cs` file.
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub analysis: AnalysisConfig,
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Resolve `System.Windows` types against the built-in reference model.
    pub framework: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { framework: true }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RulesConfig {
    /// Rule ids or names.
    pub disabled: Vec<String>,
    /// Per-rule severity, keyed by id or name.
    pub severity: HashMap<String, Severity>,
    pub naming: Option<bool>,
    pub correctness: Option<bool>,
    pub usage: Option<bool>,
    pub min_confidence: Option<Confidence>,
}

/// Shape of the file, for unknown-key warnings.
enum Key {
    Value(&'static str),
    Table(&'static str, &'static [Key]),
    /// A table whose keys are chosen by the user.
    Map(&'static str),
}

impl Key {
    fn name(&self) -> &'static str {
        match self {
            Key::Value(name) | Key::Table(name, _) | Key::Map(name) => name,
        }
    }
}

const SCHEMA: &[Key] = &[
    Key::Value("include"),
    Key::Value("exclude"),
    Key::Table("analysis", &[Key::Value("framework")]),
    Key::Table(
        "rules",
        &[
            Key::Value("disabled"),
            Key::Map("severity"),
            Key::Value("naming"),
            Key::Value("correctness"),
            Key::Value("usage"),
            Key::Value("min_confidence"),
        ],
    ),
];

/// Nearest `wpflint.toml` in `start_dir` or one of its ancestors.
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_warnings(path).map(|result| result.config)
}

pub fn load_config_with_warnings(path: &Path) -> Result<ConfigResult, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_error = |source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let table: toml::Table = toml::from_str(&text).map_err(parse_error)?;
    let mut warnings = Vec::new();
    unknown_keys(&table, SCHEMA, "", &mut warnings);
    for warning in &warnings {
        tracing::debug!(path = %path.display(), "{warning}");
    }

    let config: Config = toml::Value::Table(table).try_into().map_err(parse_error)?;
    Ok(ConfigResult { config, warnings })
}

fn unknown_keys(table: &toml::Table, schema: &[Key], prefix: &str, warnings: &mut Vec<String>) {
    for (name, value) in table {
        let path = format!("{prefix}{name}");
        match schema.iter().find(|key| key.name() == name) {
            None => warnings.push(format!("Unknown config option '{path}'")),
            Some(Key::Table(_, nested)) => {
                if let toml::Value::Table(inner) = value {
                    unknown_keys(inner, nested, &format!("{path}."), warnings);
                }
            }
            Some(Key::Value(_) | Key::Map(_)) => {}
        }
    }
}

/// Contents written by `wpflint init`.
pub const DEFAULT_CONFIG: &str = r#"# wpflint configuration
exclude = ["**/bin/**", "**/obj/**"]

[analysis]
framework = true

[rules]
disabled = []
naming = true
correctness = true
usage = true

[rules.severity]
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(content: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn reads_every_section() {
        let (_dir, path) = write_config(
            r#"
include = ["src/**/*.cs"]
exclude = ["**/obj/**"]

[analysis]
framework = false

[rules]
disabled = ["WPF0036", "clr-property-name"]
naming = false
min_confidence = "medium"

[rules.severity]
WPF0041 = "error"
backing-field-name = "hint"
"#,
        );

        let config = load_config(&path).unwrap();

        assert_eq!(config.include, vec!["src/**/*.cs"]);
        assert_eq!(config.exclude, vec!["**/obj/**"]);
        assert!(!config.analysis.framework);
        assert_eq!(config.rules.disabled, vec!["WPF0036", "clr-property-name"]);
        assert_eq!(config.rules.naming, Some(false));
        assert_eq!(config.rules.usage, None);
        assert_eq!(config.rules.min_confidence, Some(Confidence::Medium));
        assert_eq!(config.rules.severity["WPF0041"], Severity::Error);
        assert_eq!(config.rules.severity["backing-field-name"], Severity::Hint);
    }

    #[test]
    fn empty_file_is_the_default_config() {
        let (_dir, path) = write_config("");

        let config = load_config(&path).unwrap();

        assert_eq!(config, Config::default());
        assert!(config.analysis.framework);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let (_dir, path) = write_config("[rules\ndisabled = ");

        let err = load_config(&path).unwrap_err();

        assert!(matches!(&err, ConfigError::Parse { path: p, .. } if *p == path));
        assert!(err.to_string().contains(CONFIG_FILENAME));
    }

    #[test]
    fn unknown_severity_is_a_parse_error() {
        let (_dir, path) = write_config("[rules.severity]\nWPF0041 = \"fatal\"\n");

        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn wrongly_typed_value_is_a_parse_error() {
        let (_dir, path) = write_config("[analysis]\nframework = \"yes\"\n");

        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();

        let result = load_config(&dir.path().join(CONFIG_FILENAME));

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn config_is_found_in_an_ancestor() {
        let (dir, path) = write_config("");
        let views = dir.path().join("src").join("Views");
        fs::create_dir_all(&views).unwrap();

        assert_eq!(find_config_file(dir.path()), Some(path.clone()));
        assert_eq!(find_config_file(&views), Some(path));
    }

    #[test]
    fn directory_named_like_the_config_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(CONFIG_FILENAME)).unwrap();

        assert_eq!(find_config_file(dir.path()), None);
    }

    #[test]
    fn unknown_keys_are_reported_with_their_path() {
        let (_dir, path) = write_config(
            r#"
include = ["src/**"]
unknown_option = true

[analysis]
framwork = false

[rules]
disabled = ["WPF0001"]
quality = true

[rules.severity]
WPF0001 = "error"
"#,
        );

        let result = load_config_with_warnings(&path).unwrap();

        assert_eq!(result.config.include, vec!["src/**"]);
        let mut warnings = result.warnings;
        warnings.sort();
        assert_eq!(
            warnings,
            vec![
                "Unknown config option 'analysis.framwork'",
                "Unknown config option 'rules.quality'",
                "Unknown config option 'unknown_option'",
            ]
        );
    }

    #[test]
    fn severity_keys_are_not_checked() {
        let (_dir, path) = write_config("[rules.severity]\nmy-own-name = \"info\"\n");

        assert!(load_config_with_warnings(&path).unwrap().warnings.is_empty());
    }

    #[test]
    fn default_template_loads_without_warnings() {
        let (_dir, path) = write_config(DEFAULT_CONFIG);

        let result = load_config_with_warnings(&path).unwrap();

        assert!(result.warnings.is_empty());
        assert!(result.config.analysis.framework);
        assert_eq!(result.config.exclude, vec!["**/bin/**", "**/obj/**"]);
        assert!(result.config.rules.severity.is_empty());
    }
}
