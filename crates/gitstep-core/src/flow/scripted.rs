//! Deterministic prompt backend for tests.
//!
//! [`ScriptedBackend`] replays a queue of [`Scripted`] inputs and records
//! every label it was asked to render, so a test can assert both the final
//! state of a flow and the exact order in which steps appeared.

use std::collections::VecDeque;

use super::broker::Key;
use super::prompt::{Answer, Attempt, BACK_HINT, Prompt, PromptBackend};
use super::{FlowError, FlowResult};

/// One scripted user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scripted {
    /// Submit an answer.
    Answer(Answer),
    /// Press a key the widget does not consume.
    Key(Key),
    /// Press Ctrl-C.
    Interrupt,
}

impl Scripted {
    /// Submit text.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Answer(Answer::Text(value.into()))
    }

    /// Pick the option at `index`.
    pub const fn index(index: usize) -> Self {
        Self::Answer(Answer::Index(index))
    }

    /// Pick the options at `indices`.
    pub fn indices(indices: &[usize]) -> Self {
        Self::Answer(Answer::Indices(indices.to_vec()))
    }

    /// Answer a confirmation.
    pub const fn yes(value: bool) -> Self {
        Self::Answer(Answer::Bool(value))
    }

    /// Press Esc.
    pub const fn back() -> Self {
        Self::Key(Key::Escape)
    }
}

/// A prompt as it was shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// The prompt's own message.
    pub message: String,
    /// The label actually displayed.
    pub label: String,
    /// Prompt kind.
    pub kind: &'static str,
    /// The preselected value, as the user would see it.
    pub default: Option<String>,
}

impl Rendered {
    /// Whether the label carried the back hint.
    pub fn allows_back(&self) -> bool {
        self.label.ends_with(BACK_HINT)
    }
}

/// Replays scripted input.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    script: VecDeque<Scripted>,
    rendered: Vec<Rendered>,
    invalid: Vec<String>,
}

impl ScriptedBackend {
    /// Create a backend that will replay `script` in order.
    pub fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Every prompt rendered so far, in order.
    pub fn rendered(&self) -> &[Rendered] {
        &self.rendered
    }

    /// The messages of every prompt rendered so far, in order.
    pub fn messages(&self) -> Vec<&str> {
        self.rendered.iter().map(|r| r.message.as_str()).collect()
    }

    /// The labels of every prompt rendered so far, in order.
    pub fn labels(&self) -> Vec<&str> {
        self.rendered.iter().map(|r| r.label.as_str()).collect()
    }

    /// Validation messages reported so far.
    pub fn invalid_messages(&self) -> &[String] {
        &self.invalid
    }

    /// The preselected value of every prompt rendered so far, in order.
    pub fn defaults(&self) -> Vec<Option<&str>> {
        self.rendered.iter().map(|r| r.default.as_deref()).collect()
    }

    /// Scripted inputs not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

fn shown_default(prompt: &Prompt) -> Option<String> {
    match prompt {
        Prompt::Select(p) | Prompt::Search(p) => p.options.get(p.starting_cursor).cloned(),
        Prompt::Text(p) => p.default.clone(),
        Prompt::Confirm(p) => Some(p.default.to_string()),
        Prompt::MultiSelect(p) => {
            let picked: Vec<&str> = p
                .defaults
                .iter()
                .filter_map(|&i| p.options.get(i).map(String::as_str))
                .collect();
            Some(picked.join(", "))
        }
    }
}

impl PromptBackend for ScriptedBackend {
    fn attempt(&mut self, prompt: &Prompt, label: &str) -> FlowResult<Attempt> {
        self.rendered.push(Rendered {
            message: prompt.message().to_string(),
            label: label.to_string(),
            kind: prompt.kind(),
            default: shown_default(prompt),
        });
        match self.script.pop_front() {
            Some(Scripted::Answer(answer)) => Ok(Attempt::Answered(answer)),
            Some(Scripted::Key(key)) => Ok(Attempt::Key(key)),
            Some(Scripted::Interrupt) => Err(FlowError::Cancelled),
            None => Err(FlowError::Script(label.to_string())),
        }
    }

    fn invalid(&mut self, _prompt: &Prompt, message: &str) {
        self.invalid.push(message.to_string());
    }
}
