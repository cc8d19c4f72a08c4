//! Pull request creation through the GitHub CLI.
//!
//! `gh` handles authentication and remote resolution, so all we do is build
//! its argument list and read back the URL it prints.

use std::io::Write;
use std::process::Command;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Errors from `gh` invocations.
#[derive(Error, Debug)]
pub enum GhError {
    /// `gh` is not on `PATH`.
    #[error("the GitHub CLI (gh) is not installed or not on PATH")]
    NotInstalled,

    /// Failed to spawn `gh` or to write the body file.
    #[error("failed to run gh: {0}")]
    Exec(#[from] std::io::Error),

    /// `gh` exited non-zero.
    #[error("gh pr create failed: {stderr}")]
    Command {
        /// Captured stderr.
        stderr: String,
    },
}

/// Result alias for `gh` operations.
pub type GhResult<T> = Result<T, GhError>;

/// A pull request ready to be opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequest {
    /// Branch to merge into.
    pub base: String,
    /// PR title.
    pub title: String,
    /// PR description (may be empty).
    pub body: String,
    /// Open as a draft.
    pub draft: bool,
}

impl PullRequest {
    /// Arguments for `gh`, reading the body from `body_file`.
    pub fn args(&self, body_file: &str) -> Vec<String> {
        let mut args = vec![
            "pr".to_string(),
            "create".to_string(),
            "--base".to_string(),
            self.base.clone(),
            "--title".to_string(),
            self.title.clone(),
            "--body-file".to_string(),
            body_file.to_string(),
        ];
        if self.draft {
            args.push("--draft".to_string());
        }
        args
    }

    /// Shell-ish rendering of the command for `--dry-run` output.
    pub fn command_line(&self) -> String {
        let quoted: Vec<String> = self.args("<body>").iter().map(|a| quote(a)).collect();
        format!("gh {}", quoted.join(" "))
    }
}

/// Whether `gh` can be found on `PATH`.
pub fn gh_available() -> bool {
    which::which("gh").is_ok()
}

/// Open the pull request and return the URL `gh` reports, if any.
#[instrument(skip(request), fields(base = %request.base, draft = request.draft))]
pub fn create_pull_request(request: &PullRequest) -> GhResult<Option<String>> {
    if !gh_available() {
        return Err(GhError::NotInstalled);
    }

    let mut body = tempfile::NamedTempFile::new()?;
    body.write_all(request.body.as_bytes())?;
    body.flush()?;

    let args = request.args(&body.path().to_string_lossy());
    debug!(?args, "creating pull request");
    let output = Command::new("gh").args(&args).output()?;

    if !output.status.success() {
        return Err(GhError::Command {
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let url = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .rfind(|line| line.starts_with("http"))
        .map(ToString::to_string);
    info!(?url, "pull request created");
    Ok(url)
}

fn quote(arg: &str) -> String {
    if !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./<>:".contains(c))
    {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
