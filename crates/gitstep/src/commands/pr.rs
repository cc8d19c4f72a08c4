//! Pull request command: collect base, title, and body, then hand off to `gh`.

use anyhow::Context;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use gitstep_core::config::Config;
use gitstep_core::git;
use gitstep_core::github::{self, GhError, PullRequest};
use gitstep_core::workflow::pr::{self, PrContext, PrState};

/// Arguments for the `pr` subcommand.
#[derive(Args, Debug, Default)]
pub struct PrArgs {
    /// Base branch to merge into
    #[arg(short, long)]
    pub base: Option<String>,

    /// Pull request title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Pull request description
    #[arg(long)]
    pub body: Option<String>,

    /// Open as a draft (`--draft=false` to answer no)
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub draft: Option<bool>,

    /// Print the gh command instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Serialize)]
struct PrReport<'a> {
    #[serde(flatten)]
    request: &'a PullRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    dry_run: bool,
}

/// Execute the pr command.
#[instrument(name = "cmd_pr", skip_all, fields(dry_run = args.dry_run))]
pub fn cmd_pr(args: PrArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing pr command");

    super::ensure_repo()?;
    if !args.dry_run && !github::gh_available() {
        return Err(GhError::NotInstalled.into());
    }

    let current = git::current_branch()?;
    let context = PrContext::new(
        config,
        git::local_branches()?,
        current.as_deref(),
        git::detect_default_branch()?,
        git::last_commit_subject()?,
    )?;
    let seed = PrState {
        base: args.base,
        title: args.title,
        body: args.body,
        draft: args.draft,
    };
    seed.check_seed(&context)?;

    let state = super::run_on_terminal(pr::flow(&context), seed)?;
    let request = state.into_request(context.pinned_draft)?;

    let url = if args.dry_run {
        None
    } else {
        let spinner = super::spinner("Opening pull request...");
        let result = github::create_pull_request(&request);
        spinner.finish_and_clear();
        result.context("failed to open pull request")?
    };

    let report = PrReport {
        request: &request,
        url: url.as_deref(),
        dry_run: args.dry_run,
    };
    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if args.dry_run {
        println!("{}", request.command_line());
    } else {
        println!(
            "  {} Opened pull request into {}",
            "✓".green(),
            request.base.cyan()
        );
        if let Some(url) = report.url {
            println!("  {}", url.cyan());
        }
    }

    Ok(())
}
