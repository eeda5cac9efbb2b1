//! CLI configuration and process wiring.

use clap::Parser;
use tracing::Level;

use crate::commands::Command;

/// Inspect and exercise cluster ring topology.
#[derive(Debug, Parser)]
#[command(name = "ringctl", version, about)]
pub struct CliConfig {
    /// Emit debug-level logs.
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    pub fn run(self) -> anyhow::Result<()> {
        let level = if self.verbose { Level::DEBUG } else { Level::INFO };
        tracing_subscriber::fmt().with_max_level(level).init();
        self.command.execute()
    }
}
