//! Subcommands of the `wpflint` binary

pub mod check;
pub mod explain;
pub mod facts;
pub mod init;

pub use check::CheckArgs;
pub use explain::ExplainArgs;
pub use facts::FactsArgs;
pub use init::InitArgs;

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Report dependency property problems in C# sources
    Check(CheckArgs),

    /// Write a starter wpflint.toml
    Init(InitArgs),

    /// Describe a rule, or list them all
    Explain(ExplainArgs),

    /// Dump the dependency property facts of each file as JSON
    Facts(FactsArgs),
}

impl Commands {
    pub fn run(self) -> anyhow::Result<()> {
        let name = self.name();
        let _span = tracing::debug_span!("command", name).entered();
        match self {
            Commands::Check(args) => args.run(),
            Commands::Init(args) => args.run(),
            Commands::Explain(args) => args.run(),
            Commands::Facts(args) => args.run(),
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Commands::Check(_) => "check",
            Commands::Init(_) => "init",
            Commands::Explain(_) => "explain",
            Commands::Facts(_) => "facts",
        }
    }
}
