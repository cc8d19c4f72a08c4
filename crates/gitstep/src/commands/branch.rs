//! Branch command: name a branch from a type and a description, then create it.

use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use gitstep_core::config::Config;
use gitstep_core::git;
use gitstep_core::workflow::WorkflowError;
use gitstep_core::workflow::branch::{self, BranchState};

/// Arguments for the `branch` subcommand.
#[derive(Args, Debug, Default)]
pub struct BranchArgs {
    /// What the branch is for (slugified into the name)
    #[arg(value_name = "DESCRIPTION")]
    pub description: Option<String>,

    /// Branch type (e.g., feature, fix)
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub kind: Option<String>,

    /// Print the branch name instead of creating it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Serialize)]
struct BranchReport<'a> {
    branch: &'a str,
    created: bool,
}

/// Execute the branch command.
#[instrument(name = "cmd_branch", skip_all, fields(dry_run = args.dry_run))]
pub fn cmd_branch(args: BranchArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing branch command");

    let seed = BranchState {
        kind: args.kind,
        description: args.description,
    };
    seed.check_seed(config)?;
    if !args.dry_run {
        super::ensure_repo()?;
    }

    let state = super::run_on_terminal(branch::flow(config), seed)?;
    let name = state.render(config)?;

    if !args.dry_run {
        if git::branch_exists(&name)? {
            return Err(WorkflowError::BranchExists(name).into());
        }
        git::create_branch(&name)?;
    }

    let report = BranchReport {
        branch: &name,
        created: !args.dry_run,
    };
    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if args.dry_run {
        println!("{}", report.branch);
    } else {
        println!("  {} Switched to new branch {}", "✓".green(), report.branch.cyan());
    }

    Ok(())
}
