//! Explain command - provides detailed explanation of a rule

use crate::output::pretty::colorize_severity;
use crate::workspace;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::env;
use std::io::{self, Write};
use wpflint_core::analysis::AnalysisEngine;
use wpflint_core::rules::{Rule, RuleRegistry};

#[derive(Args, Debug)]
pub struct ExplainArgs {
    /// Rule ID or name to explain (e.g. "WPF0001", "backing-field-name")
    #[arg(value_name = "RULE", required_unless_present = "list")]
    pub rule_id: Option<String>,

    /// List every rule with its status
    #[arg(long, conflicts_with = "rule_id")]
    pub list: bool,
}

impl ExplainArgs {
    pub fn run(&self) -> Result<()> {
        let cwd = env::current_dir()?;
        let config = workspace::load_config(None, &cwd)?.config;
        let engine = AnalysisEngine::with_config(&config);

        let mut stdout = io::stdout().lock();
        if !self.execute(engine.registry(), &mut stdout)? {
            std::process::exit(1);
        }
        Ok(())
    }

    /// Writes the explanation; `false` when the rule is unknown.
    pub fn execute<W: Write>(&self, registry: &RuleRegistry, out: &mut W) -> Result<bool> {
        if self.list {
            write_list(registry, out)?;
            return Ok(true);
        }

        let Some(rule_ref) = self.rule_id.as_deref() else {
            write_list(registry, out)?;
            return Ok(true);
        };

        let rule = registry
            .get_rule(rule_ref)
            .or_else(|| registry.get_rule_by_name(rule_ref));

        match rule {
            Some(rule) => {
                write_rule(registry, rule, out)?;
                Ok(true)
            }
            None => {
                eprintln!("{} Unknown rule '{}'", "error:".red().bold(), rule_ref);
                eprintln!();
                eprintln!("Available rules:");
                for rule in registry.rules() {
                    let meta = rule.metadata();
                    eprintln!("  {} ({})", meta.id, meta.name);
                }
                Ok(false)
            }
        }
    }
}

fn write_rule<W: Write>(registry: &RuleRegistry, rule: &dyn Rule, out: &mut W) -> io::Result<()> {
    let metadata = rule.metadata();

    writeln!(out)?;
    writeln!(out, "{}", format!("Rule {}", metadata.id).bold())?;
    writeln!(out)?;
    writeln!(out, "  {}: {}", "Name".cyan(), metadata.name)?;
    writeln!(out, "  {}: {}", "Description".cyan(), metadata.description)?;
    writeln!(out, "  {}: {}", "Category".cyan(), metadata.category.as_str())?;
    writeln!(out, "  {}: {}", "Severity".cyan(), colorize_severity(&metadata.severity))?;

    if let Some(url) = metadata.docs_url {
        writeln!(out, "  {}: {}", "Documentation".cyan(), url)?;
    }

    if let Some(examples) = metadata.examples {
        writeln!(out)?;
        writeln!(out, "  {}:", "Examples".cyan())?;
        for line in examples.lines() {
            writeln!(out, "    {}", line)?;
        }
    }

    writeln!(out)?;
    let status = if registry.is_rule_enabled(metadata.id) {
        "enabled".green()
    } else {
        "disabled".red()
    };
    writeln!(out, "  {}: {}", "Status".cyan(), status)?;
    writeln!(out)
}

fn write_list<W: Write>(registry: &RuleRegistry, out: &mut W) -> io::Result<()> {
    for rule in registry.rules() {
        let meta = rule.metadata();
        let marker = if registry.is_rule_enabled(meta.id) {
            " ".normal()
        } else {
            "x".red()
        };
        writeln!(
            out,
            "{} {}  {:<40} {:<12} {}",
            marker,
            meta.id,
            meta.name,
            meta.category.as_str(),
            colorize_severity(&meta.severity)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wpflint_core::config::{Config, RulesConfig};

    fn explain(rule_id: Option<&str>, list: bool, config: &Config) -> (bool, String) {
        colored::control::set_override(false);
        let engine = AnalysisEngine::with_config(config);
        let args = ExplainArgs {
            rule_id: rule_id.map(str::to_string),
            list,
        };
        let mut out = Vec::new();
        let found = args.execute(engine.registry(), &mut out).unwrap();
        (found, String::from_utf8(out).unwrap())
    }

    #[test]
    fn explain_known_rule_by_id() {
        let (found, output) = explain(Some("WPF0001"), false, &Config::default());

        assert!(found);
        assert!(output.contains("Rule WPF0001"));
        assert!(output.contains("backing-field-name"));
        assert!(output.contains("Category: naming"));
        assert!(output.contains("Status: enabled"));
    }

    #[test]
    fn explain_rule_by_name_shows_examples() {
        let (found, output) = explain(Some("clr-property-name"), false, &Config::default());

        assert!(found);
        assert!(output.contains("Rule WPF0003"));
        assert!(output.contains("Examples:"));
    }

    #[test]
    fn explain_reports_disabled_rule() {
        let config = Config {
            rules: RulesConfig {
                disabled: vec!["set-value-type".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };

        let (_, output) = explain(Some("WPF0014"), false, &config);

        assert!(output.contains("Status: disabled"));
    }

    #[test]
    fn explain_unknown_rule_returns_false() {
        let (found, output) = explain(Some("WPF9999"), false, &Config::default());

        assert!(!found);
        assert!(output.is_empty());
    }

    #[test]
    fn list_shows_every_rule() {
        let config = Config::default();
        let (found, output) = explain(None, true, &config);

        assert!(found);
        let registry = AnalysisEngine::with_config(&config);
        assert_eq!(output.lines().count(), registry.registry().len());
        assert!(output.contains("WPF0043"));
    }
}
