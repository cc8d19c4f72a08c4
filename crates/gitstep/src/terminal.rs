//! Terminal prompt backend built on `inquire`.
//!
//! inquire owns the raw-mode key loop, so Esc reaches us only as
//! `OperationCanceled` after the widget has closed. The backend reports that
//! as an unconsumed key and leaves the decision about what it means to the
//! prompt adapter.

use inquire::error::CustomUserError;
use inquire::validator::Validation;
use inquire::{Confirm, InquireError, MultiSelect, Select, Text};

use gitstep_core::flow::{
    Answer, Attempt, FlowError, FlowResult, Key, Prompt, PromptBackend, SelectPrompt, TextPrompt,
};

/// Renders prompts on the controlling terminal.
#[derive(Debug, Default)]
pub struct InquireBackend;

impl InquireBackend {
    /// Create a backend.
    pub const fn new() -> Self {
        Self
    }
}

impl PromptBackend for InquireBackend {
    fn attempt(&mut self, prompt: &Prompt, label: &str) -> FlowResult<Attempt> {
        let answer = match prompt {
            Prompt::Select(p) => select(p, label, false).map(Answer::Index),
            Prompt::Search(p) => select(p, label, true).map(Answer::Index),
            Prompt::Text(p) => text(p, label).map(Answer::Text),
            Prompt::Confirm(p) => {
                let mut confirm = Confirm::new(label).with_default(p.default);
                if let Some(help) = &p.help {
                    confirm = confirm.with_help_message(help);
                }
                confirm.prompt().map(Answer::Bool)
            }
            Prompt::MultiSelect(p) => {
                let mut multi = MultiSelect::new(label, p.options.clone()).with_default(&p.defaults);
                if let Some(help) = &p.help {
                    multi = multi.with_help_message(help);
                }
                multi
                    .raw_prompt()
                    .map(|picked| Answer::Indices(picked.into_iter().map(|o| o.index).collect()))
            }
        };
        classify(answer)
    }
}

fn select(prompt: &SelectPrompt, label: &str, filter: bool) -> Result<usize, InquireError> {
    let mut select = Select::new(label, prompt.options.clone())
        .with_starting_cursor(prompt.starting_cursor);
    if !filter {
        select = select.without_filtering();
    }
    if let Some(help) = &prompt.help {
        select = select.with_help_message(help);
    }
    select.raw_prompt().map(|choice| choice.index)
}

fn text(prompt: &TextPrompt, label: &str) -> Result<String, InquireError> {
    let mut text = Text::new(label);
    if let Some(default) = &prompt.default {
        text = text.with_default(default);
    }
    if let Some(placeholder) = &prompt.placeholder {
        text = text.with_placeholder(placeholder);
    }
    if let Some(help) = &prompt.help {
        text = text.with_help_message(help);
    }
    if let Some(validator) = prompt.validator().cloned() {
        text = text.with_validator(move |input: &str| {
            Ok::<Validation, CustomUserError>(match validator(input) {
                Ok(()) => Validation::Valid,
                Err(message) => Validation::Invalid(message.into()),
            })
        });
    }
    text.prompt()
}

fn classify(result: Result<Answer, InquireError>) -> FlowResult<Attempt> {
    match result {
        Ok(answer) => Ok(Attempt::Answered(answer)),
        Err(InquireError::OperationCanceled) => Ok(Attempt::Key(Key::Escape)),
        Err(InquireError::OperationInterrupted) => Err(FlowError::Cancelled),
        Err(InquireError::NotTTY) => Err(FlowError::Prompt(
            "stdin is not a terminal; pass the values as flags instead".to_string(),
        )),
        Err(err) => Err(FlowError::Prompt(err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn esc_becomes_a_key_press() {
        let attempt = classify(Err(InquireError::OperationCanceled)).unwrap();
        assert_eq!(attempt, Attempt::Key(Key::Escape));
    }

    #[test]
    fn ctrl_c_cancels() {
        assert!(matches!(
            classify(Err(InquireError::OperationInterrupted)),
            Err(FlowError::Cancelled)
        ));
    }

    #[test]
    fn no_tty_is_a_prompt_error() {
        assert!(matches!(
            classify(Err(InquireError::NotTTY)),
            Err(FlowError::Prompt(message)) if message.contains("flags")
        ));
    }

    #[test]
    fn answers_pass_through() {
        assert_eq!(
            classify(Ok(Answer::Bool(true))).unwrap(),
            Attempt::Answered(Answer::Bool(true))
        );
    }
}
