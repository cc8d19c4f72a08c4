//! The concrete flows behind `gitstep commit`, `gitstep branch`, and
//! `gitstep pr`.
//!
//! Each submodule defines a state type, its partial enum, the steps that fill
//! it in, and a `flow()` builder. Values given on the command line are written
//! into the initial state before the flow starts; the matching steps report
//! themselves as seeded and never render.
//!
//! Nothing here touches git or GitHub. The binary runs the side effect only
//! after a flow has completed.

pub mod branch;
pub mod commit;
pub mod pr;

use thiserror::Error;

use crate::flow::{FlowError, Reply, StepOutcome};
use crate::git::GitError;
use crate::github::GhError;

/// Errors from running a workflow end to end.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The interactive flow failed or was cancelled.
    #[error(transparent)]
    Flow(#[from] FlowError),

    /// A git operation failed.
    #[error(transparent)]
    Git(#[from] GitError),

    /// A `gh` operation failed.
    #[error(transparent)]
    Gh(#[from] GhError),

    /// `--type` named a type that is not configured.
    #[error("unknown type {kind:?}; expected one of: {known}")]
    UnknownType {
        /// The rejected value.
        kind: String,
        /// Comma-separated configured types.
        known: String,
    },

    /// A value given on the command line failed validation.
    #[error("invalid --{flag}: {message}")]
    InvalidSeed {
        /// The flag name without dashes.
        flag: &'static str,
        /// Why it was rejected.
        message: String,
    },

    /// There is nothing staged to commit.
    #[error("nothing staged to commit (use git add first)")]
    NothingStaged,

    /// A branch with the rendered name already exists.
    #[error("branch {0:?} already exists")]
    BranchExists(String),

    /// No branch is available as a pull request base.
    #[error("no candidate base branches found")]
    NoBaseCandidates,

    /// The flow finished without filling in a required field.
    #[error("flow completed without a value for {0}")]
    Incomplete(&'static str),
}

impl WorkflowError {
    /// Whether the user cancelled the flow.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Flow(e) if e.is_cancelled())
    }
}

/// Result alias for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Turn a prompt reply into a step outcome.
fn outcome<T, P>(reply: Reply<T>, into: impl FnOnce(T) -> P) -> StepOutcome<P> {
    match reply {
        Reply::Value(value) => StepOutcome::Next(into(value)),
        Reply::Back => StepOutcome::Back,
    }
}

/// Validator rejecting blank input.
fn required(input: &str) -> Result<(), String> {
    if input.trim().is_empty() {
        Err("a value is required".to_string())
    } else {
        Ok(())
    }
}

/// Reject a seeded type that is not among `known`.
fn known_type<'k>(kind: &str, known: impl IntoIterator<Item = &'k str>) -> WorkflowResult<()> {
    let known: Vec<&str> = known.into_iter().collect();
    if known.contains(&kind) {
        Ok(())
    } else {
        Err(WorkflowError::UnknownType {
            kind: kind.to_string(),
            known: known.join(", "),
        })
    }
}

/// Position of `value` in `options`, if present.
fn position(options: &[String], value: Option<&str>) -> Option<usize> {
    value.and_then(|v| options.iter().position(|o| o == v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_type_lists_alternatives() {
        assert!(known_type("fix", ["feat", "fix"]).is_ok());
        let err = known_type("wip", ["feat", "fix"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown type \"wip\"; expected one of: feat, fix"
        );
    }

    #[test]
    fn required_rejects_blank() {
        assert!(required("  ").is_err());
        assert!(required("x").is_ok());
    }

    #[test]
    fn position_finds_value() {
        let options = vec!["a".to_string(), "b".to_string()];
        assert_eq!(position(&options, Some("b")), Some(1));
        assert_eq!(position(&options, Some("z")), None);
        assert_eq!(position(&options, None), None);
    }

    #[test]
    fn cancelled_flow_is_recognised() {
        assert!(WorkflowError::from(FlowError::Cancelled).is_cancelled());
        assert!(!WorkflowError::NothingStaged.is_cancelled());
    }
}
