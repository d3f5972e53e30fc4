//! Command-line interface definitions for irqhook-demo.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Interrupt vector demos on a simulated MSX.
#[derive(Parser)]
#[command(name = "irqhook-demo", version, about)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// TOML file with `[machine]` and `[run]` settings.
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Frames to run the custom handler for (overrides `run.frames`).
    #[arg(long, global = true)]
    pub frames: Option<u64>,

    /// Print only the final summary.
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print vector operations and timings.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Replace the primary vector with a frame-counting handler, then restore.
    Isr,
    /// Drive the tick and device hooks through the resident chaining handler.
    Hooks,
    /// Drive the tick and device hooks under the firmware's own handler.
    FirmwareHooks,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["irqhook-demo", "hooks", "-v", "--frames", "30"]).unwrap();
        assert!(matches!(cli.command, Command::Hooks));
        assert!(cli.verbose);
        assert_eq!(cli.frames, Some(30));
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["irqhook-demo", "isr", "-q", "-v"]).is_err());
    }
}
