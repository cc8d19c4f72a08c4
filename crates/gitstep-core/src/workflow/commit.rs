//! Conventional commit message flow.
//!
//! Steps, in order: type, scope, message, body, breaking. The resulting
//! subject line is rendered through the configured commit template.

use serde::Serialize;

use super::{WorkflowError, WorkflowResult, known_type, outcome, position, required};
use crate::config::{CommitType, Config};
use crate::flow::{
    ConfirmPrompt, Flow, FlowResult, FlowState, SelectPrompt, Step, StepOutcome, TextPrompt, Ui,
};
use crate::template;

const NO_SCOPE: &str = "(none)";

/// Answers collected by the commit flow.
///
/// A field that is `Some` before the flow starts was given on the command
/// line and its step never renders. An empty `scope` means "no scope".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitState {
    /// Commit type (e.g., `feat`).
    pub kind: Option<String>,
    /// Scope, empty for none.
    pub scope: Option<String>,
    /// Subject line text after the prefix.
    pub message: Option<String>,
    /// Extended description.
    pub body: Option<String>,
    /// Whether the change is breaking.
    pub breaking: Option<bool>,
}

/// One step's contribution to a [`CommitState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitField {
    /// Chosen type.
    Kind(String),
    /// Chosen scope (empty for none).
    Scope(String),
    /// Subject text.
    Message(String),
    /// Body text (may be empty).
    Body(String),
    /// Breaking change answer.
    Breaking(bool),
}

impl FlowState for CommitState {
    type Partial = CommitField;

    fn merge(&mut self, partial: CommitField) {
        match partial {
            CommitField::Kind(kind) => self.kind = Some(kind),
            CommitField::Scope(scope) => self.scope = Some(scope),
            CommitField::Message(message) => self.message = Some(message),
            CommitField::Body(body) => self.body = Some(body),
            CommitField::Breaking(breaking) => self.breaking = Some(breaking),
        }
    }
}

impl CommitState {
    /// Reject command-line values the flow would never have produced.
    pub fn check_seed(&self, config: &Config) -> WorkflowResult<()> {
        if let Some(kind) = &self.kind {
            let types = config.commit_types();
            known_type(kind, types.iter().map(|t| t.name.as_str()))?;
        }
        if let Some(message) = &self.message {
            required(message).map_err(|message| WorkflowError::InvalidSeed {
                flag: "message",
                message,
            })?;
        }
        Ok(())
    }

    /// Render the subject line through the configured template.
    pub fn render(&self, config: &Config) -> WorkflowResult<String> {
        let kind = self.kind.as_deref().ok_or(WorkflowError::Incomplete("type"))?;
        let message = self
            .message
            .as_deref()
            .ok_or(WorkflowError::Incomplete("message"))?;
        Ok(template::commit_subject(
            config.commit_template(),
            kind,
            self.scope.as_deref(),
            self.breaking.unwrap_or(false),
            message,
        ))
    }

    /// The body, if one was entered.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref().map(str::trim).filter(|b| !b.is_empty())
    }
}

/// Build the commit flow.
///
/// `ask_body` controls whether the body step is shown at all.
pub fn flow(config: &Config, ask_body: bool) -> Flow<'static, CommitState> {
    Flow::new()
        .step(TypeStep {
            types: config.commit_types(),
        })
        .step(ScopeStep {
            scopes: config.commit_scopes().to_vec(),
        })
        .step(MessageStep)
        .step(BodyStep { enabled: ask_body })
        .step(BreakingStep)
}

struct TypeStep {
    types: Vec<CommitType>,
}

impl TypeStep {
    fn labels(&self) -> Vec<String> {
        let width = self.types.iter().map(|t| t.name.len()).max().unwrap_or(0);
        self.types
            .iter()
            .map(|t| {
                format!("{:<width$}  {}", t.name, t.description)
                    .trim_end()
                    .to_string()
            })
            .collect()
    }
}

impl Step<CommitState> for TypeStep {
    fn id(&self) -> &str {
        "type"
    }

    fn run(&self, state: &CommitState, ui: &mut Ui<'_>) -> FlowResult<StepOutcome<CommitField>> {
        let names: Vec<String> = self.types.iter().map(|t| t.name.clone()).collect();
        let cursor = position(&names, state.kind.as_deref()).unwrap_or(0);
        let reply = ui.select(
            SelectPrompt::new("Type of change", self.labels()).with_starting_cursor(cursor),
        )?;
        Ok(outcome(reply, |i| CommitField::Kind(names[i].clone())))
    }

    fn seeded(&self, state: &CommitState) -> bool {
        state.kind.is_some()
    }
}

struct ScopeStep {
    scopes: Vec<String>,
}

impl Step<CommitState> for ScopeStep {
    fn id(&self) -> &str {
        "scope"
    }

    fn run(&self, state: &CommitState, ui: &mut Ui<'_>) -> FlowResult<StepOutcome<CommitField>> {
        if self.scopes.is_empty() {
            let reply = ui.text(
                TextPrompt::new("Scope")
                    .with_default(state.scope.clone().filter(|s| !s.is_empty()))
                    .with_help("leave empty for no scope"),
            )?;
            return Ok(outcome(reply, |s| CommitField::Scope(s.trim().to_string())));
        }

        let options: Vec<String> = std::iter::once(NO_SCOPE.to_string())
            .chain(self.scopes.iter().cloned())
            .collect();
        let cursor = position(&self.scopes, state.scope.as_deref()).map_or(0, |i| i + 1);
        let reply = ui.search(
            SelectPrompt::new("Scope", options)
                .with_starting_cursor(cursor)
                .with_help("type to filter"),
        )?;
        Ok(outcome(reply, |i| {
            CommitField::Scope(i.checked_sub(1).map_or_else(String::new, |i| self.scopes[i].clone()))
        }))
    }

    fn seeded(&self, state: &CommitState) -> bool {
        state.scope.is_some()
    }
}

struct MessageStep;

impl Step<CommitState> for MessageStep {
    fn id(&self) -> &str {
        "message"
    }

    fn run(&self, state: &CommitState, ui: &mut Ui<'_>) -> FlowResult<StepOutcome<CommitField>> {
        let reply = ui.text(
            TextPrompt::new("Short description")
                .with_default(state.message.clone())
                .with_placeholder("imperative, lower case, no period")
                .with_validator(required),
        )?;
        Ok(outcome(reply, |s| CommitField::Message(s.trim().to_string())))
    }

    fn seeded(&self, state: &CommitState) -> bool {
        state.message.is_some()
    }
}

struct BodyStep {
    enabled: bool,
}

impl Step<CommitState> for BodyStep {
    fn id(&self) -> &str {
        "body"
    }

    fn run(&self, state: &CommitState, ui: &mut Ui<'_>) -> FlowResult<StepOutcome<CommitField>> {
        let reply = ui.text(
            TextPrompt::new("Longer description")
                .with_default(state.body.clone().filter(|b| !b.is_empty()))
                .with_help("optional, press enter to skip"),
        )?;
        Ok(outcome(reply, CommitField::Body))
    }

    fn skip(&self, _state: &CommitState) -> bool {
        !self.enabled
    }

    fn seeded(&self, state: &CommitState) -> bool {
        state.body.is_some()
    }
}

struct BreakingStep;

impl Step<CommitState> for BreakingStep {
    fn id(&self) -> &str {
        "breaking"
    }

    fn run(&self, state: &CommitState, ui: &mut Ui<'_>) -> FlowResult<StepOutcome<CommitField>> {
        let reply = ui.confirm(
            ConfirmPrompt::new("Breaking change?").with_default(state.breaking.unwrap_or(false)),
        )?;
        Ok(outcome(reply, CommitField::Breaking))
    }

    fn seeded(&self, state: &CommitState) -> bool {
        state.breaking.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CommitConfig;
    use crate::flow::scripted::{Scripted, ScriptedBackend};
    use crate::flow::{FlowError, PromptAdapter, SignalBroker};

    fn run(
        config: &Config,
        ask_body: bool,
        state: CommitState,
        script: Vec<Scripted>,
    ) -> (FlowResult<CommitState>, ScriptedBackend) {
        let broker = SignalBroker::new();
        let mut adapter = PromptAdapter::new(ScriptedBackend::new(script), &broker);
        let result = flow(config, ask_body).run(state, &mut adapter);
        (result, adapter.into_backend())
    }

    fn with_scopes(scopes: &[&str]) -> Config {
        Config {
            commit: Some(CommitConfig {
                scopes: Some(scopes.iter().map(ToString::to_string).collect()),
                ..CommitConfig::default()
            }),
            ..Config::default()
        }
    }

    #[test]
    fn full_flow_renders_subject() {
        let config = Config::default();
        let (result, backend) = run(
            &config,
            true,
            CommitState::default(),
            vec![
                Scripted::index(1),
                Scripted::text(""),
                Scripted::text("handle empty input"),
                Scripted::text(""),
                Scripted::yes(false),
            ],
        );

        let state = result.unwrap();
        assert_eq!(state.render(&config).unwrap(), "fix: handle empty input");
        assert_eq!(state.body(), None);
        assert_eq!(
            backend.messages(),
            ["Type of change", "Scope", "Short description", "Longer description", "Breaking change?"]
        );
        assert!(!backend.rendered()[0].allows_back());
        assert!(backend.rendered()[1..].iter().all(|r| r.allows_back()));
    }

    #[test]
    fn type_labels_show_descriptions() {
        let config = Config::default();
        let step = TypeStep {
            types: config.commit_types(),
        };
        let labels = step.labels();
        assert!(labels[0].starts_with("feat "));
        assert!(labels[0].ends_with("A new feature"));
    }

    #[test]
    fn configured_scopes_use_search() {
        let config = with_scopes(&["auth", "api"]);
        let (result, backend) = run(
            &config,
            false,
            CommitState::default(),
            vec![
                Scripted::index(0),
                Scripted::index(2),
                Scripted::text("add token refresh"),
                Scripted::yes(true),
            ],
        );

        let state = result.unwrap();
        assert_eq!(state.render(&config).unwrap(), "feat(api)!: add token refresh");
        assert_eq!(backend.rendered()[1].kind, "search");
        assert_eq!(backend.rendered()[1].default.as_deref(), Some(NO_SCOPE));
    }

    #[test]
    fn none_option_clears_scope() {
        let config = with_scopes(&["auth"]);
        let (result, _) = run(
            &config,
            false,
            CommitState::default(),
            vec![
                Scripted::index(2),
                Scripted::index(0),
                Scripted::text("tidy"),
                Scripted::yes(false),
            ],
        );
        assert_eq!(result.unwrap().render(&config).unwrap(), "docs: tidy");
    }

    #[test]
    fn going_back_shows_committed_answers_as_defaults() {
        let config = with_scopes(&["auth", "api"]);
        let (result, backend) = run(
            &config,
            false,
            CommitState::default(),
            vec![
                Scripted::index(3),
                Scripted::index(1),
                Scripted::back(),
                Scripted::back(),
                Scripted::index(3),
                Scripted::index(1),
                Scripted::text("rename helpers"),
                Scripted::yes(false),
            ],
        );

        assert_eq!(
            result.unwrap().render(&config).unwrap(),
            "style(auth): rename helpers"
        );
        let defaults = backend.defaults();
        // Second visit to scope and type start on the earlier answers.
        assert_eq!(defaults[3], Some("auth"));
        assert!(defaults[4].is_some_and(|d| d.starts_with("style")));
    }

    #[test]
    fn flags_seed_their_steps() {
        let config = Config::default();
        let seed = CommitState {
            kind: Some("feat".into()),
            message: Some("add login".into()),
            breaking: Some(false),
            ..CommitState::default()
        };
        let (result, backend) = run(
            &config,
            true,
            seed,
            vec![Scripted::text("auth"), Scripted::text("details here")],
        );

        let state = result.unwrap();
        assert_eq!(state.render(&config).unwrap(), "feat(auth): add login");
        assert_eq!(state.body(), Some("details here"));
        assert_eq!(backend.messages(), ["Scope", "Longer description"]);
        assert!(!backend.rendered()[0].allows_back());
    }

    #[test]
    fn fully_seeded_flow_renders_nothing() {
        let config = Config::default();
        let seed = CommitState {
            kind: Some("fix".into()),
            scope: Some(String::new()),
            message: Some("x".into()),
            breaking: Some(true),
            ..CommitState::default()
        };
        let (result, backend) = run(&config, false, seed, vec![]);
        assert_eq!(result.unwrap().render(&config).unwrap(), "fix!: x");
        assert!(backend.rendered().is_empty());
    }

    #[test]
    fn blank_message_is_rejected_in_place() {
        let config = Config::default();
        let seed = CommitState {
            kind: Some("fix".into()),
            scope: Some(String::new()),
            ..CommitState::default()
        };
        let (result, backend) = run(
            &config,
            false,
            seed,
            vec![Scripted::text("   "), Scripted::text("ok"), Scripted::yes(false)],
        );
        assert_eq!(result.unwrap().render(&config).unwrap(), "fix: ok");
        assert_eq!(backend.invalid_messages(), ["a value is required"]);
        assert_eq!(
            backend.messages(),
            ["Short description", "Short description", "Breaking change?"]
        );
    }

    #[test]
    fn interrupt_cancels() {
        let (result, _) = run(
            &Config::default(),
            true,
            CommitState::default(),
            vec![Scripted::index(0), Scripted::Interrupt],
        );
        assert!(matches!(result, Err(FlowError::Cancelled)));
    }

    #[test]
    fn without_body_step_four_answers_complete_the_flow() {
        let config = Config::default();
        let (result, backend) = run(
            &config,
            false,
            CommitState::default(),
            vec![
                Scripted::index(0),
                Scripted::text(""),
                Scripted::text("add login"),
                Scripted::yes(false),
            ],
        );

        assert_eq!(result.unwrap().render(&config).unwrap(), "feat: add login");
        assert_eq!(backend.remaining(), 0);
        assert!(!backend.messages().contains(&"Longer description"));
    }

    #[test]
    fn answer_meant_for_skipped_body_step_is_rejected() {
        let (result, _) = run(
            &Config::default(),
            false,
            CommitState::default(),
            vec![
                Scripted::index(0),
                Scripted::text(""),
                Scripted::text("add login"),
                Scripted::text(""),
                Scripted::yes(false),
            ],
        );
        assert!(matches!(result, Err(FlowError::UnexpectedAnswer { .. })));
    }

    #[test]
    fn unknown_seeded_type_is_rejected() {
        let seed = CommitState {
            kind: Some("feature".into()),
            ..CommitState::default()
        };
        let err = seed.check_seed(&Config::default()).unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownType { ref kind, .. } if kind == "feature"));
    }

    #[test]
    fn blank_seeded_message_is_rejected() {
        let seed = CommitState {
            message: Some(" ".into()),
            ..CommitState::default()
        };
        assert!(matches!(
            seed.check_seed(&Config::default()),
            Err(WorkflowError::InvalidSeed { flag: "message", .. })
        ));
    }

    #[test]
    fn render_requires_type_and_message() {
        let state = CommitState::default();
        assert!(matches!(
            state.render(&Config::default()),
            Err(WorkflowError::Incomplete("type"))
        ));
    }

    #[test]
    fn custom_template_is_used() {
        let config = Config {
            commit: Some(CommitConfig {
                template: Some("[{type}] {message}".into()),
                ..CommitConfig::default()
            }),
            ..Config::default()
        };
        let state = CommitState {
            kind: Some("chore".into()),
            scope: Some("deps".into()),
            message: Some("bump".into()),
            ..CommitState::default()
        };
        assert_eq!(state.render(&config).unwrap(), "[chore] bump");
    }
}
