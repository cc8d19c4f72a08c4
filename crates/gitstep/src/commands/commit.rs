//! Commit command: thin CLI layer over `gitstep_core::workflow::commit`.

use anyhow::Context;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use gitstep_core::config::Config;
use gitstep_core::git;
use gitstep_core::workflow::WorkflowError;
use gitstep_core::workflow::commit::{self, CommitState};

/// Arguments for the `commit` subcommand.
///
/// Every value given here is used as is and its question is not asked.
#[derive(Args, Debug, Default)]
pub struct CommitArgs {
    /// Commit type (e.g., feat, fix)
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub kind: Option<String>,

    /// Scope; pass an empty string for none
    #[arg(short, long)]
    pub scope: Option<String>,

    /// Short description for the subject line
    #[arg(short, long)]
    pub message: Option<String>,

    /// Extended description
    #[arg(short, long, conflicts_with = "no_body")]
    pub body: Option<String>,

    /// Mark as a breaking change (`--breaking=false` to answer no)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub breaking: Option<bool>,

    /// Don't ask for an extended description
    #[arg(long)]
    pub no_body: bool,

    /// Print the message instead of committing
    #[arg(long)]
    pub dry_run: bool,
}

impl CommitArgs {
    fn seed(&self) -> CommitState {
        CommitState {
            kind: self.kind.clone(),
            scope: self.scope.clone(),
            message: self.message.clone(),
            body: self.body.clone(),
            breaking: self.breaking,
        }
    }
}

#[derive(Serialize)]
struct CommitReport<'a> {
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    dry_run: bool,
}

/// Execute the commit command.
#[instrument(name = "cmd_commit", skip_all, fields(dry_run = args.dry_run))]
pub fn cmd_commit(args: CommitArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing commit command");

    let seed = args.seed();
    seed.check_seed(config)?;

    if !args.dry_run {
        super::ensure_repo()?;
        if !git::has_staged_changes()? {
            return Err(WorkflowError::NothingStaged.into());
        }
    }

    let ask_body = !args.no_body && config.commit_body();
    let state = super::run_on_terminal(commit::flow(config, ask_body), seed)?;
    let subject = state.render(config)?;
    let body = state.body();

    if !args.dry_run {
        git::commit(&subject, body).context("git commit failed")?;
    }

    let report = CommitReport {
        subject: &subject,
        body,
        dry_run: args.dry_run,
    };
    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if args.dry_run {
        println!("{}", report.subject);
        if let Some(body) = report.body {
            println!();
            println!("{body}");
        }
    } else {
        println!("  {} Committed: {}", "✓".green(), report.subject.cyan());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_args() -> CommitArgs {
        CommitArgs {
            kind: Some("fix".into()),
            scope: Some("parser".into()),
            message: Some("handle tabs".into()),
            breaking: Some(false),
            no_body: true,
            dry_run: true,
            ..CommitArgs::default()
        }
    }

    #[test]
    fn fully_seeded_dry_run_needs_no_terminal() {
        assert!(cmd_commit(seeded_args(), false, &Config::default()).is_ok());
        assert!(cmd_commit(seeded_args(), true, &Config::default()).is_ok());
    }

    #[test]
    fn unknown_type_fails_before_prompting() {
        let args = CommitArgs {
            kind: Some("nope".into()),
            ..seeded_args()
        };
        let err = cmd_commit(args, false, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("unknown type"));
    }

    #[test]
    fn seed_copies_flags() {
        let seed = seeded_args().seed();
        assert_eq!(seed.kind.as_deref(), Some("fix"));
        assert_eq!(seed.breaking, Some(false));
        assert!(seed.body.is_none());
    }
}
