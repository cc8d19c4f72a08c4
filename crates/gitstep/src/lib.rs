//! Library interface for the `gitstep` CLI.
//!
//! Exposes the argument parser and command implementations so that `xtask`
//! can generate man pages and completions, and so commands can be tested
//! without spawning the binary. The entry point lives in `main.rs`.
//!
//! # Structure
//!
//! - [`Cli`] - The root argument parser (clap derive)
//! - [`Commands`] - Available subcommands
//! - [`commands`] - Command implementations
//! - [`terminal`] - The `inquire` prompt backend

pub mod commands;

pub mod terminal;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Color output preference.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect terminal capabilities automatically.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

impl ColorChoice {
    /// Set the global color override. Call once at startup.
    pub fn apply(self) {
        match self {
            Self::Auto => {}
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

const ENV_HELP: &str = "\
ENVIRONMENT VARIABLES:
    RUST_LOG             Log filter (e.g., debug, gitstep_core=trace)
    GITSTEP_LOG_PATH     Explicit log file path
    GITSTEP_LOG_DIR      Log directory

NAVIGATION:
    Press Esc to return to the previous question, Ctrl-C to abort.
";

/// Command-line interface definition for gitstep.
#[derive(Parser)]
#[command(name = "gitstep")]
#[command(about = "Step-by-step conventional commits, branches, and pull requests", long_about = None)]
#[command(version)]
#[command(after_long_help = ENV_HELP)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file (merged over discovered config)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run as if started in DIR
    #[arg(short = 'C', long, global = true)]
    pub chdir: Option<PathBuf>,

    /// Only print errors (suppresses warnings/info)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// More detail (repeatable; e.g. -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Colorize output
    #[arg(long, global = true, value_enum, default_value_t)]
    pub color: ColorChoice,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available subcommands for the CLI.
#[derive(Subcommand)]
pub enum Commands {
    /// Compose a conventional commit from the staged changes
    Commit(commands::commit::CommitArgs),

    /// Create and switch to a consistently named branch
    Branch(commands::branch::BranchArgs),

    /// Open a pull request for the current branch
    Pr(commands::pr::PrArgs),

    /// Show package, configuration, and repository information
    Info(commands::info::InfoArgs),

    /// Diagnose configuration and environment
    Doctor(commands::doctor::DoctorArgs),
}

/// Returns the clap command for documentation generation
pub fn command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        command().debug_assert();
    }

    #[test]
    fn commit_flags_parse() {
        let cli = Cli::try_parse_from([
            "gitstep",
            "commit",
            "--type",
            "feat",
            "--breaking",
            "--dry-run",
        ])
        .unwrap();
        let Commands::Commit(args) = cli.command else {
            panic!("expected commit");
        };
        assert_eq!(args.kind.as_deref(), Some("feat"));
        assert_eq!(args.breaking, Some(true));
        assert!(args.dry_run);
    }

    #[test]
    fn breaking_accepts_explicit_false() {
        let cli = Cli::try_parse_from(["gitstep", "commit", "--breaking=false"]).unwrap();
        let Commands::Commit(args) = cli.command else {
            panic!("expected commit");
        };
        assert_eq!(args.breaking, Some(false));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["gitstep", "info", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
    }
}
