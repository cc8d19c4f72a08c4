//! Step definitions and the flow state they contribute to.

use super::FlowResult;
use super::prompt::Ui;

/// What a step produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome<P> {
    /// The step completed; merge its contribution and move forward.
    Next(P),
    /// Return to the previous reachable step.
    Back,
}

/// Accumulated answers for one flow.
///
/// Each flow defines its own state type and a [`Partial`](FlowState::Partial)
/// enum naming what a single step may contribute. Merging overwrites the
/// named field; a backward move never retracts anything already merged.
pub trait FlowState {
    /// A single step's contribution.
    type Partial;

    /// Fold a contribution into the state.
    fn merge(&mut self, partial: Self::Partial);
}

/// One renderable point in a flow.
pub trait Step<S: FlowState> {
    /// Identifier, unique within the flow (diagnostics only).
    fn id(&self) -> &str;

    /// Render the step against the committed state.
    ///
    /// Defaults shown to the user must come from `state`, never from an
    /// earlier uncommitted edit.
    fn run(&self, state: &S, ui: &mut Ui<'_>) -> FlowResult<StepOutcome<S::Partial>>;

    /// Whether to bypass this step, given the current state.
    ///
    /// Evaluated every time the controller is about to land on the step, in
    /// either direction.
    fn skip(&self, _state: &S) -> bool {
        false
    }

    /// Whether the step's value was supplied before the flow started (e.g.
    /// from a command-line flag).
    ///
    /// Evaluated once against the initial state. A seeded step is skipped for
    /// the rest of the invocation, whatever later answers do to the state.
    fn seeded(&self, _state: &S) -> bool {
        false
    }
}

type RunFn<'a, S> =
    Box<dyn Fn(&S, &mut Ui<'_>) -> FlowResult<StepOutcome<<S as FlowState>::Partial>> + 'a>;
type Predicate<'a, S> = Box<dyn Fn(&S) -> bool + 'a>;

/// A step built from closures.
pub struct FnStep<'a, S: FlowState> {
    id: String,
    run: RunFn<'a, S>,
    skip: Option<Predicate<'a, S>>,
    seeded: Option<Predicate<'a, S>>,
}

impl<'a, S: FlowState> FnStep<'a, S> {
    /// Create a step that is never skipped.
    pub fn new<F>(id: impl Into<String>, run: F) -> Self
    where
        F: Fn(&S, &mut Ui<'_>) -> FlowResult<StepOutcome<S::Partial>> + 'a,
    {
        Self {
            id: id.into(),
            run: Box::new(run),
            skip: None,
            seeded: None,
        }
    }

    /// Skip the step whenever `predicate` holds for the current state.
    pub fn skip_when(mut self, predicate: impl Fn(&S) -> bool + 'a) -> Self {
        self.skip = Some(Box::new(predicate));
        self
    }

    /// Treat the step as seeded when `predicate` holds for the initial state.
    pub fn seeded_when(mut self, predicate: impl Fn(&S) -> bool + 'a) -> Self {
        self.seeded = Some(Box::new(predicate));
        self
    }
}

impl<S: FlowState> Step<S> for FnStep<'_, S> {
    fn id(&self) -> &str {
        &self.id
    }

    fn run(&self, state: &S, ui: &mut Ui<'_>) -> FlowResult<StepOutcome<S::Partial>> {
        (self.run)(state, ui)
    }

    fn skip(&self, state: &S) -> bool {
        self.skip.as_ref().is_some_and(|p| p(state))
    }

    fn seeded(&self, state: &S) -> bool {
        self.seeded.as_ref().is_some_and(|p| p(state))
    }
}
