//! Single-prompt adapter.
//!
//! A [`PromptBackend`] knows how to put one primitive prompt on the terminal.
//! The [`PromptAdapter`] wraps a backend with the behavior every prompt in a
//! flow shares: the back hint on the label, the broker registration around
//! the render, local re-rendering on validation failure, and translating the
//! back key into [`Reply::Back`].
//!
//! Steps never see the adapter directly. They receive a [`Ui`] that carries
//! whether back navigation is enabled for the current render and exposes
//! typed helpers for each prompt kind.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use super::broker::{CancelHandle, Key, SignalBroker};
use super::{FlowError, FlowResult};

/// Suffix appended to a prompt label when back navigation is available.
pub const BACK_HINT: &str = "(esc to go back)";

/// Input validator for text prompts. `Err` carries the message shown inline.
pub type Validator = Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// Pick one option from a list.
///
/// Used for both [`Prompt::Select`] and the filterable [`Prompt::Search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectPrompt {
    /// Prompt label.
    pub message: String,
    /// Options in display order.
    pub options: Vec<String>,
    /// Index the cursor starts on.
    pub starting_cursor: usize,
    /// Help line shown under the options.
    pub help: Option<String>,
}

impl SelectPrompt {
    /// Create a select prompt with the cursor on the first option.
    pub fn new(message: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            message: message.into(),
            options,
            starting_cursor: 0,
            help: None,
        }
    }

    /// Start the cursor on `index` (clamped to the option list).
    pub fn with_starting_cursor(mut self, index: usize) -> Self {
        self.starting_cursor = index.min(self.options.len().saturating_sub(1));
        self
    }

    /// Set the help line.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Free-text entry.
#[derive(Clone)]
pub struct TextPrompt {
    /// Prompt label.
    pub message: String,
    /// Value used when the user submits an empty line.
    pub default: Option<String>,
    /// Greyed-out hint shown in the empty input.
    pub placeholder: Option<String>,
    /// Help line shown under the input.
    pub help: Option<String>,
    validator: Option<Validator>,
}

impl TextPrompt {
    /// Create a text prompt with no default and no validator.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            default: None,
            placeholder: None,
            help: None,
            validator: None,
        }
    }

    /// Set the default value. `None` leaves the prompt without a default.
    pub fn with_default(mut self, default: Option<String>) -> Self {
        self.default = default;
        self
    }

    /// Set the placeholder hint.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Set the help line.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Reject input for which `validator` returns `Err(message)`.
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// The validator, if any.
    pub fn validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    /// Run the validator against `input`. Prompts without one accept anything.
    pub fn validate(&self, input: &str) -> Result<(), String> {
        self.validator.as_ref().map_or(Ok(()), |v| v(input))
    }
}

impl fmt::Debug for TextPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextPrompt")
            .field("message", &self.message)
            .field("default", &self.default)
            .field("placeholder", &self.placeholder)
            .field("help", &self.help)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

/// Yes/no question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    /// Prompt label.
    pub message: String,
    /// Answer used when the user just presses enter.
    pub default: bool,
    /// Help line.
    pub help: Option<String>,
}

impl ConfirmPrompt {
    /// Create a confirmation defaulting to "no".
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            default: false,
            help: None,
        }
    }

    /// Set the default answer.
    pub const fn with_default(mut self, default: bool) -> Self {
        self.default = default;
        self
    }

    /// Set the help line.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Pick any number of options from a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSelectPrompt {
    /// Prompt label.
    pub message: String,
    /// Options in display order.
    pub options: Vec<String>,
    /// Indices selected when the prompt opens.
    pub defaults: Vec<usize>,
    /// Help line.
    pub help: Option<String>,
}

impl MultiSelectPrompt {
    /// Create a multi-select with nothing preselected.
    pub fn new(message: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            message: message.into(),
            options,
            defaults: Vec::new(),
            help: None,
        }
    }

    /// Preselect the given indices. Out-of-range indices are dropped.
    pub fn with_defaults(mut self, defaults: &[usize]) -> Self {
        let len = self.options.len();
        self.defaults = defaults.iter().copied().filter(|&i| i < len).collect();
        self
    }

    /// Set the help line.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// One primitive interaction.
#[derive(Debug, Clone)]
pub enum Prompt {
    /// Pick one of N options with arrow keys.
    Select(SelectPrompt),
    /// Pick one of N options, filtering by typed text.
    Search(SelectPrompt),
    /// Free text.
    Text(TextPrompt),
    /// Yes/no.
    Confirm(ConfirmPrompt),
    /// Pick any number of options.
    MultiSelect(MultiSelectPrompt),
}

impl Prompt {
    /// The unaugmented prompt label.
    pub fn message(&self) -> &str {
        match self {
            Self::Select(p) | Self::Search(p) => &p.message,
            Self::Text(p) => &p.message,
            Self::Confirm(p) => &p.message,
            Self::MultiSelect(p) => &p.message,
        }
    }

    /// Short name of the prompt kind (diagnostics).
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Select(_) => "select",
            Self::Search(_) => "search",
            Self::Text(_) => "text",
            Self::Confirm(_) => "confirm",
            Self::MultiSelect(_) => "multi-select",
        }
    }

    /// Check an answer against the prompt's own rule.
    fn validate(&self, answer: &Answer) -> Result<(), String> {
        match (self, answer) {
            (Self::Text(p), Answer::Text(input)) => p.validate(input),
            _ => Ok(()),
        }
    }
}

/// A value produced by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Index into the options of a select or search prompt.
    Index(usize),
    /// Indices into the options of a multi-select prompt.
    Indices(Vec<usize>),
    /// Text entry.
    Text(String),
    /// Confirmation.
    Bool(bool),
}

impl Answer {
    /// Short name of the answer kind (diagnostics).
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Index(_) => "index",
            Self::Indices(_) => "indices",
            Self::Text(_) => "text",
            Self::Bool(_) => "bool",
        }
    }
}

/// What a render produced: a value, or the back sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    /// The user answered.
    Value(T),
    /// The user asked to return to the previous step.
    Back,
}

impl<T> Reply<T> {
    /// Transform the value, keeping `Back` as is.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        match self {
            Self::Value(v) => Reply::Value(f(v)),
            Self::Back => Reply::Back,
        }
    }

    /// Whether this is the back sentinel.
    pub const fn is_back(&self) -> bool {
        matches!(self, Self::Back)
    }
}

/// Result of a single backend attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    /// The widget produced a value.
    Answered(Answer),
    /// The widget gave up because of a key it does not consume.
    Key(Key),
}

/// Puts one primitive prompt on the terminal.
///
/// Implementations return [`FlowError::Cancelled`] for the full-process
/// interrupt and never interpret the back key themselves.
pub trait PromptBackend {
    /// Render `prompt` once, using `label` in place of its message.
    fn attempt(&mut self, prompt: &Prompt, label: &str) -> FlowResult<Attempt>;

    /// Show a validation failure before the prompt is rendered again.
    fn invalid(&mut self, _prompt: &Prompt, _message: &str) {}
}

/// The render contract the flow controller depends on.
pub trait Render {
    /// Render `prompt`, returning its answer or [`Reply::Back`].
    fn render(&mut self, prompt: &Prompt, allow_back: bool) -> FlowResult<Reply<Answer>>;
}

/// Build the label shown for a prompt.
pub fn back_label(message: &str, allow_back: bool) -> String {
    if allow_back {
        format!("{message} {BACK_HINT}")
    } else {
        message.to_string()
    }
}

/// Wraps a [`PromptBackend`] with back navigation and validation.
#[derive(Debug)]
pub struct PromptAdapter<'b, B> {
    backend: B,
    broker: &'b SignalBroker,
    back_key: Key,
}

impl<'b, B: PromptBackend> PromptAdapter<'b, B> {
    /// Create an adapter that routes Esc through `broker`.
    pub const fn new(backend: B, broker: &'b SignalBroker) -> Self {
        Self {
            backend,
            broker,
            back_key: Key::Escape,
        }
    }

    /// Ask for a different back key.
    ///
    /// The broker keeps the first key it was attached with; once attached,
    /// the adapter follows the broker's key instead of this one.
    pub const fn with_back_key(mut self, key: Key) -> Self {
        self.back_key = key;
        self
    }

    /// The wrapped backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Consume the adapter, returning the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }
}

impl<B: PromptBackend> Render for PromptAdapter<'_, B> {
    fn render(&mut self, prompt: &Prompt, allow_back: bool) -> FlowResult<Reply<Answer>> {
        let broker = self.broker;
        broker.attach(self.back_key);
        if let Some(key) = broker.designated_key() {
            self.back_key = key;
        }

        let label = back_label(prompt.message(), allow_back);
        let guard = if allow_back {
            Some(broker.register(CancelHandle::new(prompt.message()))?)
        } else {
            None
        };

        loop {
            match self.backend.attempt(prompt, &label)? {
                Attempt::Answered(answer) => {
                    if let Err(message) = prompt.validate(&answer) {
                        debug!(prompt = prompt.message(), %message, "input rejected");
                        self.backend.invalid(prompt, &message);
                        continue;
                    }
                    return Ok(Reply::Value(answer));
                }
                Attempt::Key(key) => {
                    let delivered = broker.dispatch(key);
                    if guard.as_ref().is_some_and(|g| g.handle().is_signalled()) {
                        debug!(prompt = prompt.message(), "back requested");
                        return Ok(Reply::Back);
                    }
                    trace!(?key, delivered, allow_back, "key press ignored, rendering again");
                }
            }
        }
    }
}

/// Render context handed to a step.
pub struct Ui<'u> {
    renderer: &'u mut dyn Render,
    allow_back: bool,
}

impl<'u> Ui<'u> {
    /// Create a render context.
    pub fn new(renderer: &'u mut dyn Render, allow_back: bool) -> Self {
        Self {
            renderer,
            allow_back,
        }
    }

    /// Whether back navigation is enabled for this render.
    pub const fn allow_back(&self) -> bool {
        self.allow_back
    }

    /// Whether this is the first reachable step of the flow.
    pub const fn is_first(&self) -> bool {
        !self.allow_back
    }

    /// Render any prompt and get the untyped answer.
    pub fn prompt(&mut self, prompt: &Prompt) -> FlowResult<Reply<Answer>> {
        self.renderer.render(prompt, self.allow_back)
    }

    /// Pick one option; returns its index.
    pub fn select(&mut self, prompt: SelectPrompt) -> FlowResult<Reply<usize>> {
        let len = prompt.options.len();
        let reply = self.prompt(&Prompt::Select(prompt))?;
        pick(reply, len)
    }

    /// Pick one option with type-to-filter; returns its index.
    pub fn search(&mut self, prompt: SelectPrompt) -> FlowResult<Reply<usize>> {
        let len = prompt.options.len();
        let reply = self.prompt(&Prompt::Search(prompt))?;
        pick(reply, len)
    }

    /// Enter free text.
    pub fn text(&mut self, prompt: TextPrompt) -> FlowResult<Reply<String>> {
        match self.prompt(&Prompt::Text(prompt))? {
            Reply::Value(Answer::Text(text)) => Ok(Reply::Value(text)),
            Reply::Value(other) => Err(unexpected("text", &other)),
            Reply::Back => Ok(Reply::Back),
        }
    }

    /// Answer yes or no.
    pub fn confirm(&mut self, prompt: ConfirmPrompt) -> FlowResult<Reply<bool>> {
        match self.prompt(&Prompt::Confirm(prompt))? {
            Reply::Value(Answer::Bool(yes)) => Ok(Reply::Value(yes)),
            Reply::Value(other) => Err(unexpected("bool", &other)),
            Reply::Back => Ok(Reply::Back),
        }
    }

    /// Pick any number of options; returns their indices.
    pub fn multi_select(&mut self, prompt: MultiSelectPrompt) -> FlowResult<Reply<Vec<usize>>> {
        let len = prompt.options.len();
        match self.prompt(&Prompt::MultiSelect(prompt))? {
            Reply::Value(Answer::Indices(picked)) if picked.iter().all(|&i| i < len) => {
                Ok(Reply::Value(picked))
            }
            Reply::Value(other) => Err(unexpected("indices", &other)),
            Reply::Back => Ok(Reply::Back),
        }
    }
}

fn pick(reply: Reply<Answer>, len: usize) -> FlowResult<Reply<usize>> {
    match reply {
        Reply::Value(Answer::Index(i)) if i < len => Ok(Reply::Value(i)),
        Reply::Value(other) => Err(unexpected("index", &other)),
        Reply::Back => Ok(Reply::Back),
    }
}

const fn unexpected(expected: &'static str, got: &Answer) -> FlowError {
    FlowError::UnexpectedAnswer {
        expected,
        got: got.kind(),
    }
}
