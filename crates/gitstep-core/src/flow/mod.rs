//! Interactive step-flow engine.
//!
//! A flow is an ordered list of [`Step`]s driven by the [`Flow`] controller.
//! Each step renders one prompt through the [`PromptAdapter`], which in turn
//! claims the single [`SignalBroker`] slot while it waits for the user. The
//! controller only understands two outcomes: [`StepOutcome::Next`] (merge the
//! step's contribution and move on) and [`StepOutcome::Back`] (return to the
//! previous reachable step).
//!
//! # Constraints
//!
//! The engine is strictly sequential: exactly one prompt is pending at any
//! moment, and the broker holds at most one cancellation handle. Running two
//! flows concurrently in one process is unsupported; the broker rejects the
//! second registration with [`FlowError::SlotOccupied`].
//!
//! # Interruptions
//!
//! - A failed validator re-renders the prompt inside the adapter and never
//!   reaches the controller.
//! - The back key (Esc) becomes [`StepOutcome::Back`] when back navigation is
//!   enabled for the render, and does nothing otherwise.
//! - The full-process interrupt (Ctrl-C) surfaces as [`FlowError::Cancelled`]
//!   and propagates through [`Flow::run`] untouched.

pub mod broker;
pub mod controller;
pub mod prompt;
pub mod scripted;
pub mod step;

use thiserror::Error;

pub use broker::{CancelHandle, Key, SignalBroker, SlotGuard};
pub use controller::Flow;
pub use prompt::{
    Answer, Attempt, BACK_HINT, ConfirmPrompt, MultiSelectPrompt, Prompt, PromptAdapter,
    PromptBackend, Render, Reply, SelectPrompt, TextPrompt, Ui, Validator,
};
pub use step::{FlowState, FnStep, Step, StepOutcome};

/// Errors that escape a flow.
///
/// Back navigation and validation failures are not errors; they are handled
/// inside the controller and the adapter respectively.
#[derive(Error, Debug)]
pub enum FlowError {
    /// The user aborted the whole command (Ctrl-C).
    #[error("cancelled by user")]
    Cancelled,

    /// A prompt tried to claim the cancellation slot while another prompt
    /// still held it.
    #[error("cancellation slot already held by prompt {held}; concurrent prompts are unsupported")]
    SlotOccupied {
        /// Label of the prompt that currently holds the slot.
        held: String,
    },

    /// The backend answered with a value of the wrong kind for the prompt.
    #[error("expected {expected} answer, got {got}")]
    UnexpectedAnswer {
        /// The kind of answer the prompt asks for.
        expected: &'static str,
        /// The kind of answer the backend produced.
        got: &'static str,
    },

    /// The terminal backend failed (not a TTY, I/O error, bad configuration).
    #[error("prompt failed: {0}")]
    Prompt(String),

    /// A scripted backend ran out of scripted input.
    #[error("script exhausted while rendering {0:?}")]
    Script(String),
}

impl FlowError {
    /// Whether this error is the user-initiated full cancellation.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result alias for flow operations.
pub type FlowResult<T> = Result<T, FlowError>;
