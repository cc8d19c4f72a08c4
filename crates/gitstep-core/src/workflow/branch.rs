//! Branch naming flow: pick a type, describe the work, get a branch name.

use serde::Serialize;

use super::{WorkflowError, WorkflowResult, known_type, outcome, position};
use crate::config::Config;
use crate::flow::{Flow, FlowResult, FlowState, SelectPrompt, Step, StepOutcome, TextPrompt, Ui};
use crate::template;

/// Answers collected by the branch flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BranchState {
    /// Branch prefix (e.g., `feature`).
    pub kind: Option<String>,
    /// Free-text description, slugified when rendered.
    pub description: Option<String>,
}

/// One step's contribution to a [`BranchState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchField {
    /// Chosen prefix.
    Kind(String),
    /// Entered description.
    Description(String),
}

impl FlowState for BranchState {
    type Partial = BranchField;

    fn merge(&mut self, partial: BranchField) {
        match partial {
            BranchField::Kind(kind) => self.kind = Some(kind),
            BranchField::Description(description) => self.description = Some(description),
        }
    }
}

impl BranchState {
    /// Reject command-line values the flow would never have produced.
    pub fn check_seed(&self, config: &Config) -> WorkflowResult<()> {
        if let Some(kind) = &self.kind {
            let types = config.branch_types();
            known_type(kind, types.iter().map(String::as_str))?;
        }
        if let Some(description) = &self.description {
            valid_description(description).map_err(|message| WorkflowError::InvalidSeed {
                flag: "description",
                message,
            })?;
        }
        Ok(())
    }

    /// Render the branch name through the configured template.
    pub fn render(&self, config: &Config) -> WorkflowResult<String> {
        let kind = self.kind.as_deref().ok_or(WorkflowError::Incomplete("type"))?;
        let description = self
            .description
            .as_deref()
            .ok_or(WorkflowError::Incomplete("description"))?;
        Ok(template::branch_name(
            config.branch_template(),
            kind,
            description,
        ))
    }
}

/// Build the branch flow.
pub fn flow(config: &Config) -> Flow<'static, BranchState> {
    Flow::new()
        .step(TypeStep {
            types: config.branch_types(),
        })
        .step(DescriptionStep)
}

fn valid_description(input: &str) -> Result<(), String> {
    if template::slugify(input).is_empty() {
        Err("needs at least one letter or digit".to_string())
    } else {
        Ok(())
    }
}

struct TypeStep {
    types: Vec<String>,
}

impl Step<BranchState> for TypeStep {
    fn id(&self) -> &str {
        "type"
    }

    fn run(&self, state: &BranchState, ui: &mut Ui<'_>) -> FlowResult<StepOutcome<BranchField>> {
        let cursor = position(&self.types, state.kind.as_deref()).unwrap_or(0);
        let reply = ui.select(
            SelectPrompt::new("Branch type", self.types.clone()).with_starting_cursor(cursor),
        )?;
        Ok(outcome(reply, |i| BranchField::Kind(self.types[i].clone())))
    }

    fn seeded(&self, state: &BranchState) -> bool {
        state.kind.is_some()
    }
}

struct DescriptionStep;

impl Step<BranchState> for DescriptionStep {
    fn id(&self) -> &str {
        "description"
    }

    fn run(&self, state: &BranchState, ui: &mut Ui<'_>) -> FlowResult<StepOutcome<BranchField>> {
        let reply = ui.text(
            TextPrompt::new("What is this branch for?")
                .with_default(state.description.clone())
                .with_placeholder("add oauth login")
                .with_validator(valid_description),
        )?;
        Ok(outcome(reply, |s| BranchField::Description(s.trim().to_string())))
    }

    fn seeded(&self, state: &BranchState) -> bool {
        state.description.is_some()
    }
}
