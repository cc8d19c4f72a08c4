//! Git operations.
//!
//! Shells out to `git` for everything so the user's hooks, signing keys, and
//! other configuration apply exactly as they would on the command line.

use std::io::Write;
use std::process::Command;

use thiserror::Error;
use tracing::{debug, info, instrument};

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// Failed to execute the `git` command (or to write its message file).
    #[error("failed to run git: {0}")]
    Exec(#[from] std::io::Error),

    /// `git` returned a non-zero exit code.
    #[error("git {command} failed: {stderr}")]
    Command {
        /// The git subcommand that failed (e.g., "commit").
        command: String,
        /// Captured stderr.
        stderr: String,
    },

    /// Not inside a git repository.
    #[error("not a git repository (or any parent up to mount point)")]
    NotARepo,
}

/// Result alias for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// Whether `git` can be found on `PATH`.
pub fn git_available() -> bool {
    which::which("git").is_ok()
}

/// Check if we're inside a git work tree.
#[instrument]
pub fn is_inside_repo() -> GitResult<bool> {
    match git(&["rev-parse", "--is-inside-work-tree"]) {
        Ok(output) => Ok(output.trim() == "true"),
        Err(GitError::Command { .. } | GitError::NotARepo) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Get the current branch name.
///
/// Returns `None` in a detached HEAD state.
#[instrument]
pub fn current_branch() -> GitResult<Option<String>> {
    let output = git(&["rev-parse", "--abbrev-ref", "HEAD"])?;
    let branch = output.trim().to_string();
    if branch == "HEAD" {
        debug!("detached HEAD");
        Ok(None)
    } else {
        debug!(%branch, "current branch");
        Ok(Some(branch))
    }
}

/// Detect the default branch by checking for `main` then `master`.
#[instrument]
pub fn detect_default_branch() -> GitResult<Option<String>> {
    for candidate in ["main", "master"] {
        if git(&["rev-parse", "--verify", "--quiet", candidate]).is_ok() {
            debug!(branch = candidate, "detected default branch");
            return Ok(Some(candidate.to_string()));
        }
    }
    debug!("no main/master branch found");
    Ok(None)
}

/// List local branch names, sorted by git.
#[instrument]
pub fn local_branches() -> GitResult<Vec<String>> {
    let output = git(&["for-each-ref", "--format=%(refname:short)", "refs/heads"])?;
    let branches: Vec<String> = output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect();
    debug!(count = branches.len(), "local branches");
    Ok(branches)
}

/// Whether the index holds anything to commit.
#[instrument]
pub fn has_staged_changes() -> GitResult<bool> {
    let output = Command::new("git")
        .args(["diff", "--cached", "--quiet"])
        .output()?;
    match output.status.code() {
        Some(0) => Ok(false),
        Some(1) => Ok(true),
        _ => Err(command_error("diff", &output.stderr)),
    }
}

/// Subject line of the most recent commit, if there is one.
#[instrument]
pub fn last_commit_subject() -> GitResult<Option<String>> {
    match git(&["log", "-1", "--format=%s"]) {
        Ok(output) => {
            let subject = output.trim();
            Ok((!subject.is_empty()).then(|| subject.to_string()))
        }
        // A repository without commits has no HEAD to log.
        Err(GitError::Command { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Whether a local branch named `name` already exists.
#[instrument]
pub fn branch_exists(name: &str) -> GitResult<bool> {
    let refname = format!("refs/heads/{name}");
    match git(&["show-ref", "--verify", "--quiet", &refname]) {
        Ok(_) => Ok(true),
        Err(GitError::Command { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Create `name` from the current HEAD and switch to it.
#[instrument]
pub fn create_branch(name: &str) -> GitResult<()> {
    git(&["switch", "--create", name])?;
    info!(branch = name, "created branch");
    Ok(())
}

/// Commit the staged changes with `subject` and an optional `body`.
///
/// The message goes through a temporary file and `git commit -F` so that
/// multi-line bodies survive intact.
#[instrument(skip(body))]
pub fn commit(subject: &str, body: Option<&str>) -> GitResult<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(compose_message(subject, body).as_bytes())?;
    file.flush()?;

    let path = file.path().to_string_lossy().into_owned();
    git(&["commit", "-F", &path])?;
    info!(%subject, "committed");
    Ok(())
}

/// Join a subject and optional body into a full commit message.
pub fn compose_message(subject: &str, body: Option<&str>) -> String {
    match body.map(str::trim).filter(|b| !b.is_empty()) {
        Some(body) => format!("{subject}\n\n{body}\n"),
        None => format!("{subject}\n"),
    }
}

/// Run a git command and return its stdout.
fn git(args: &[&str]) -> GitResult<String> {
    let output = Command::new("git").args(args).output()?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        Err(command_error(args.first().unwrap_or(&""), &output.stderr))
    }
}

fn command_error(command: &str, stderr: &[u8]) -> GitError {
    let stderr = String::from_utf8_lossy(stderr).trim().to_string();
    if stderr.contains("not a git repository") {
        return GitError::NotARepo;
    }
    GitError::Command {
        command: command.to_string(),
        stderr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Repository-dependent tests only assert when run from inside a checkout.

    #[test]
    fn is_inside_repo_returns_bool() {
        assert!(is_inside_repo().is_ok());
    }

    #[test]
    fn current_branch_works_in_repo() {
        if is_inside_repo().unwrap_or(false) {
            if let Ok(Some(branch)) = current_branch() {
                assert!(!branch.is_empty());
            }
        }
    }

    #[test]
    fn branch_queries_work_in_repo() {
        if is_inside_repo().unwrap_or(false) {
            assert!(detect_default_branch().is_ok());
            assert!(local_branches().is_ok());
            assert!(last_commit_subject().is_ok());
            assert!(has_staged_changes().is_ok());
        }
    }

    #[test]
    fn nonsense_branch_does_not_exist() {
        if is_inside_repo().unwrap_or(false) {
            assert!(!branch_exists("gitstep/definitely/not/a/branch").unwrap());
        }
    }

    #[test]
    fn git_error_on_bad_command() {
        assert!(git(&["not-a-real-subcommand"]).is_err());
    }

    #[test]
    fn command_error_detects_non_repo() {
        let err = command_error("status", b"fatal: not a git repository (or any parent)");
        assert!(matches!(err, GitError::NotARepo));

        let err = command_error("commit", b"  nothing to commit\n");
        assert!(
            matches!(err, GitError::Command { ref command, ref stderr } if command == "commit" && stderr == "nothing to commit")
        );
    }

    #[test]
    fn compose_message_with_body() {
        assert_eq!(
            compose_message("feat: x", Some("line one\nline two\n")),
            "feat: x\n\nline one\nline two\n"
        );
    }

    #[test]
    fn compose_message_blank_body_is_dropped() {
        assert_eq!(compose_message("fix: y", Some("   ")), "fix: y\n");
        assert_eq!(compose_message("fix: y", None), "fix: y\n");
    }
}
