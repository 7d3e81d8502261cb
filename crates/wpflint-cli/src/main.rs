//! `wpflint`: finds misdeclared and misused WPF dependency properties in C# sources

mod commands;
mod output;
mod workspace;

use clap::Parser;
use commands::Commands;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "wpflint",
    author,
    version,
    about = "Static analyzer for WPF dependency properties",
    long_about = "wpflint checks C# sources for misdeclared and misused WPF dependency properties.\n\n\
                  It reports naming and type mismatches between registrations, backing fields\n\
                  and CLR wrappers, and offers fixes for most of them."
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Logs go to stderr so they never mix with report output.
fn init_tracing(verbose: u8) {
    let level = ["warn", "debug", "trace"][usize::from(verbose.min(2))];
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,wpflint={level},wpflint_core={level}")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    cli.command.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::check::OutputFormat;
    use clap::CommandFactory;
    use std::path::PathBuf;
    use wpflint_core::rules::{Confidence, Severity};

    fn parse(args: &[&str]) -> Commands {
        Cli::try_parse_from(std::iter::once("wpflint").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[test]
    fn check_takes_paths_and_defaults_to_cwd() {
        let Commands::Check(explicit) = parse(&["check", "./src"]) else {
            panic!("expected check");
        };
        let Commands::Check(default) = parse(&["check"]) else {
            panic!("expected check");
        };

        assert_eq!(explicit.paths, vec![PathBuf::from("./src")]);
        assert_eq!(default.paths, vec![PathBuf::from(".")]);
        assert_eq!(default.format, OutputFormat::Pretty);
    }

    #[test]
    fn check_accepts_known_formats_only() {
        for (name, format) in [
            ("pretty", OutputFormat::Pretty),
            ("text", OutputFormat::Text),
            ("json", OutputFormat::Json),
            ("ndjson", OutputFormat::Ndjson),
            ("sarif", OutputFormat::Sarif),
        ] {
            let Commands::Check(args) = parse(&["check", "--format", name]) else {
                panic!("expected check");
            };
            assert_eq!(args.format, format);
        }
        assert!(Cli::try_parse_from(["wpflint", "check", "--format", "xml"]).is_err());
    }

    #[test]
    fn check_parses_level_filters() {
        let Commands::Check(args) = parse(&["check", "--severity", "error", "--min-confidence", "medium"])
        else {
            panic!("expected check");
        };

        assert_eq!(args.severity, Some(Severity::Error));
        assert_eq!(args.min_confidence, Some(Confidence::Medium));
        assert!(Cli::try_parse_from(["wpflint", "check", "--severity", "fatal"]).is_err());
    }

    #[test]
    fn check_reads_config_and_failure_flags() {
        let Commands::Check(args) = parse(&[
            "check",
            "Views",
            "Controls",
            "--config",
            "ci/wpflint.toml",
            "--fail-on-warnings",
        ]) else {
            panic!("expected check");
        };

        assert_eq!(args.paths.len(), 2);
        assert_eq!(args.config, Some(PathBuf::from("ci/wpflint.toml")));
        assert!(args.fail_on_warnings);
    }

    #[test]
    fn verbosity_is_global_and_counted() {
        let cli = Cli::try_parse_from(["wpflint", "check", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn init_takes_directory_and_force() {
        let Commands::Init(args) = parse(&["init", "src/App", "--force"]) else {
            panic!("expected init");
        };

        assert_eq!(args.dir, PathBuf::from("src/App"));
        assert!(args.force);
    }

    #[test]
    fn explain_takes_a_rule_or_list() {
        let Commands::Explain(one) = parse(&["explain", "clr-property-name"]) else {
            panic!("expected explain");
        };
        let Commands::Explain(all) = parse(&["explain", "--list"]) else {
            panic!("expected explain");
        };

        assert_eq!(one.rule_id.as_deref(), Some("clr-property-name"));
        assert!(!one.list);
        assert!(all.list);
        assert!(all.rule_id.is_none());
    }

    #[test]
    fn facts_takes_paths() {
        let Commands::Facts(args) = parse(&["facts", "Controls/Gauge.cs"]) else {
            panic!("expected facts");
        };

        assert_eq!(args.paths, vec![PathBuf::from("Controls/Gauge.cs")]);
    }

    #[test]
    fn command_names_match_subcommands() {
        let cli = Cli::command();
        let names: Vec<&str> = cli.get_subcommands().map(|c| c.get_name()).collect();

        assert_eq!(names, ["check", "init", "explain", "facts"]);
        assert_eq!(parse(&["facts"]).name(), "facts");
        assert_eq!(cli.get_version(), Some(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn check_help_lists_options() {
        let mut cli = Cli::command();
        let check = cli.find_subcommand_mut("check").unwrap();
        let help = check.render_help().to_string();

        assert!(help.contains("PATHS"));
        assert!(help.contains("--format"));
        assert!(help.contains("--min-confidence"));
    }
}
