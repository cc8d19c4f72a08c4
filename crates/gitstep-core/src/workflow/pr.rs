//! Pull request flow: base branch, title, body, draft.
//!
//! Everything the flow needs from the repository is gathered up front into a
//! [`PrContext`], so the steps themselves never shell out.

use serde::Serialize;

use super::{WorkflowError, WorkflowResult, outcome, position, required};
use crate::config::Config;
use crate::flow::{
    ConfirmPrompt, Flow, FlowResult, FlowState, SelectPrompt, Step, StepOutcome, TextPrompt, Ui,
};
use crate::github::PullRequest;

/// Answers collected by the pull request flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrState {
    /// Branch to merge into.
    pub base: Option<String>,
    /// PR title.
    pub title: Option<String>,
    /// PR description.
    pub body: Option<String>,
    /// Open as a draft.
    pub draft: Option<bool>,
}

/// One step's contribution to a [`PrState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrField {
    /// Chosen base.
    Base(String),
    /// Entered title.
    Title(String),
    /// Entered body (may be empty).
    Body(String),
    /// Draft answer.
    Draft(bool),
}

impl FlowState for PrState {
    type Partial = PrField;

    fn merge(&mut self, partial: PrField) {
        match partial {
            PrField::Base(base) => self.base = Some(base),
            PrField::Title(title) => self.title = Some(title),
            PrField::Body(body) => self.body = Some(body),
            PrField::Draft(draft) => self.draft = Some(draft),
        }
    }
}

impl PrState {
    /// Reject command-line values the flow would never have produced.
    ///
    /// A seeded base must be one of the offered candidates, which already
    /// excludes the current branch.
    pub fn check_seed(&self, context: &PrContext) -> WorkflowResult<()> {
        if let Some(base) = &self.base
            && !context.candidates.contains(base)
        {
            return Err(WorkflowError::InvalidSeed {
                flag: "base",
                message: format!(
                    "{base:?} is not a base candidate; expected one of: {}",
                    context.candidates.join(", ")
                ),
            });
        }
        if let Some(title) = &self.title {
            required(title).map_err(|message| WorkflowError::InvalidSeed {
                flag: "title",
                message,
            })?;
        }
        Ok(())
    }

    /// The request to hand to `gh`.
    ///
    /// `pinned_draft` (from config) wins over the answered value.
    pub fn into_request(self, pinned_draft: Option<bool>) -> WorkflowResult<PullRequest> {
        Ok(PullRequest {
            base: self.base.ok_or(WorkflowError::Incomplete("base"))?,
            title: self.title.ok_or(WorkflowError::Incomplete("title"))?,
            body: self.body.unwrap_or_default().trim().to_string(),
            draft: pinned_draft.or(self.draft).unwrap_or(false),
        })
    }
}

/// Repository facts the pull request flow works from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrContext {
    /// Branches offered as the base.
    pub candidates: Vec<String>,
    /// Where the base cursor starts when nothing was chosen yet.
    pub default_base: Option<String>,
    /// Title offered when nothing was entered yet (last commit subject).
    pub suggested_title: Option<String>,
    /// Draft setting pinned by config; hides the draft question.
    pub pinned_draft: Option<bool>,
}

impl PrContext {
    /// Build a context from config and what git reported.
    ///
    /// Candidates are the configured bases, or the local branches when none
    /// are configured, minus the current branch.
    pub fn new(
        config: &Config,
        local_branches: Vec<String>,
        current: Option<&str>,
        default_base: Option<String>,
        suggested_title: Option<String>,
    ) -> WorkflowResult<Self> {
        let candidates: Vec<String> = config
            .pr_bases()
            .map_or(local_branches, <[String]>::to_vec)
            .into_iter()
            .filter(|branch| Some(branch.as_str()) != current)
            .collect();
        if candidates.is_empty() {
            return Err(WorkflowError::NoBaseCandidates);
        }
        Ok(Self {
            candidates,
            default_base,
            suggested_title,
            pinned_draft: config.pr_draft(),
        })
    }
}

/// Build the pull request flow.
pub fn flow(context: &PrContext) -> Flow<'static, PrState> {
    Flow::new()
        .step(BaseStep {
            candidates: context.candidates.clone(),
            default_base: context.default_base.clone(),
        })
        .step(TitleStep {
            suggested: context.suggested_title.clone(),
        })
        .step(BodyStep)
        .step(DraftStep {
            pinned: context.pinned_draft.is_some(),
        })
}

struct BaseStep {
    candidates: Vec<String>,
    default_base: Option<String>,
}

impl Step<PrState> for BaseStep {
    fn id(&self) -> &str {
        "base"
    }

    fn run(&self, state: &PrState, ui: &mut Ui<'_>) -> FlowResult<StepOutcome<PrField>> {
        let cursor = position(&self.candidates, state.base.as_deref())
            .or_else(|| position(&self.candidates, self.default_base.as_deref()))
            .unwrap_or(0);
        let reply = ui.search(
            SelectPrompt::new("Base branch", self.candidates.clone())
                .with_starting_cursor(cursor)
                .with_help("type to filter"),
        )?;
        Ok(outcome(reply, |i| PrField::Base(self.candidates[i].clone())))
    }

    fn seeded(&self, state: &PrState) -> bool {
        state.base.is_some()
    }
}

struct TitleStep {
    suggested: Option<String>,
}

impl Step<PrState> for TitleStep {
    fn id(&self) -> &str {
        "title"
    }

    fn run(&self, state: &PrState, ui: &mut Ui<'_>) -> FlowResult<StepOutcome<PrField>> {
        let default = state.title.clone().or_else(|| self.suggested.clone());
        let reply = ui.text(
            TextPrompt::new("Title")
                .with_default(default)
                .with_validator(required),
        )?;
        Ok(outcome(reply, |s| PrField::Title(s.trim().to_string())))
    }

    fn seeded(&self, state: &PrState) -> bool {
        state.title.is_some()
    }
}

struct BodyStep;

impl Step<PrState> for BodyStep {
    fn id(&self) -> &str {
        "body"
    }

    fn run(&self, state: &PrState, ui: &mut Ui<'_>) -> FlowResult<StepOutcome<PrField>> {
        let reply = ui.text(
            TextPrompt::new("Description")
                .with_default(state.body.clone().filter(|b| !b.is_empty()))
                .with_help("optional, press enter to skip"),
        )?;
        Ok(outcome(reply, PrField::Body))
    }

    fn seeded(&self, state: &PrState) -> bool {
        state.body.is_some()
    }
}

struct DraftStep {
    pinned: bool,
}

impl Step<PrState> for DraftStep {
    fn id(&self) -> &str {
        "draft"
    }

    fn run(&self, state: &PrState, ui: &mut Ui<'_>) -> FlowResult<StepOutcome<PrField>> {
        let reply = ui.confirm(
            ConfirmPrompt::new("Open as draft?").with_default(state.draft.unwrap_or(false)),
        )?;
        Ok(outcome(reply, PrField::Draft))
    }

    fn skip(&self, _state: &PrState) -> bool {
        self.pinned
    }

    fn seeded(&self, state: &PrState) -> bool {
        state.draft.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrConfig;
    use crate::flow::scripted::{Scripted, ScriptedBackend};
    use crate::flow::{PromptAdapter, SignalBroker};

    fn branches(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    fn context() -> PrContext {
        PrContext::new(
            &Config::default(),
            branches(&["develop", "feature/login", "main"]),
            Some("feature/login"),
            Some("main".into()),
            Some("feat: add login".into()),
        )
        .unwrap()
    }

    fn run(
        context: &PrContext,
        state: PrState,
        script: Vec<Scripted>,
    ) -> (FlowResult<PrState>, ScriptedBackend) {
        let broker = SignalBroker::new();
        let mut adapter = PromptAdapter::new(ScriptedBackend::new(script), &broker);
        let result = flow(context).run(state, &mut adapter);
        (result, adapter.into_backend())
    }

    #[test]
    fn current_branch_is_not_a_candidate() {
        assert_eq!(context().candidates, ["develop", "main"]);
    }

    #[test]
    fn configured_bases_replace_local_branches() {
        let config = Config {
            pr: Some(PrConfig {
                bases: Some(branches(&["main", "release"])),
                draft: None,
            }),
            ..Config::default()
        };
        let ctx = PrContext::new(&config, branches(&["main", "x"]), Some("main"), None, None).unwrap();
        assert_eq!(ctx.candidates, ["release"]);
    }

    #[test]
    fn no_candidates_is_an_error() {
        let result = PrContext::new(&Config::default(), branches(&["main"]), Some("main"), None, None);
        assert!(matches!(result, Err(WorkflowError::NoBaseCandidates)));
    }

    #[test]
    fn full_flow_builds_request() {
        let ctx = context();
        let (result, backend) = run(
            &ctx,
            PrState::default(),
            vec![
                Scripted::index(1),
                Scripted::text("feat: add login"),
                Scripted::text("Adds OAuth.\n"),
                Scripted::yes(true),
            ],
        );

        let request = result.unwrap().into_request(ctx.pinned_draft).unwrap();
        assert_eq!(
            request,
            PullRequest {
                base: "main".into(),
                title: "feat: add login".into(),
                body: "Adds OAuth.".into(),
                draft: true,
            }
        );
        // Cursor starts on the detected default branch, title on the last subject.
        assert_eq!(backend.defaults()[0], Some("main"));
        assert_eq!(backend.defaults()[1], Some("feat: add login"));
    }

    #[test]
    fn answered_title_wins_over_suggestion_after_back() {
        let ctx = context();
        let (result, backend) = run(
            &ctx,
            PrState::default(),
            vec![
                Scripted::index(0),
                Scripted::text("Login support"),
                Scripted::back(),
                Scripted::text("Login support v2"),
                Scripted::text(""),
                Scripted::yes(false),
            ],
        );

        let state = result.unwrap();
        assert_eq!(state.title.as_deref(), Some("Login support v2"));
        assert_eq!(backend.defaults()[3], Some("Login support"));
    }

    #[test]
    fn pinned_draft_hides_question() {
        let config = Config {
            pr: Some(PrConfig {
                bases: None,
                draft: Some(true),
            }),
            ..Config::default()
        };
        let ctx = PrContext::new(
            &config,
            branches(&["main", "topic"]),
            Some("topic"),
            None,
            None,
        )
        .unwrap();
        let (result, backend) = run(
            &ctx,
            PrState::default(),
            vec![Scripted::index(0), Scripted::text("Title"), Scripted::text("")],
        );

        let request = result.unwrap().into_request(ctx.pinned_draft).unwrap();
        assert!(request.draft);
        assert_eq!(backend.messages(), ["Base branch", "Title", "Description"]);
    }

    #[test]
    fn seeded_base_and_title() {
        let ctx = context();
        let seed = PrState {
            base: Some("develop".into()),
            title: Some("Ship it".into()),
            ..PrState::default()
        };
        let (result, backend) = run(&ctx, seed, vec![Scripted::text(""), Scripted::yes(false)]);
        let request = result.unwrap().into_request(None).unwrap();
        assert_eq!(request.base, "develop");
        assert!(!request.draft);
        assert_eq!(backend.messages(), ["Description", "Open as draft?"]);
        assert!(!backend.rendered()[0].allows_back());
    }

    #[test]
    fn into_request_requires_base() {
        assert!(matches!(
            PrState::default().into_request(None),
            Err(WorkflowError::Incomplete("base"))
        ));
    }

    #[test]
    fn seeded_base_must_be_a_candidate() {
        let ctx = context();
        let current = PrState {
            base: Some("feature/login".into()),
            ..PrState::default()
        };
        let err = current.check_seed(&ctx).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidSeed { flag: "base", .. }));
        assert!(err.to_string().contains("develop, main"));

        let typo = PrState {
            base: Some("mian".into()),
            ..PrState::default()
        };
        assert!(typo.check_seed(&ctx).is_err());

        let ok = PrState {
            base: Some("main".into()),
            title: Some("feat: add login".into()),
            ..PrState::default()
        };
        assert!(ok.check_seed(&ctx).is_ok());
    }

    #[test]
    fn blank_seeded_title_is_rejected() {
        let seed = PrState {
            title: Some("  ".into()),
            ..PrState::default()
        };
        assert!(matches!(
            seed.check_seed(&context()),
            Err(WorkflowError::InvalidSeed { flag: "title", .. })
        ));
    }
}
