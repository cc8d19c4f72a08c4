//! The flow controller: a state machine over a fixed step list.
//!
//! The cursor starts on the first reachable step and terminates when it
//! reaches the end of the list. On every landing the step's skip predicate is
//! re-evaluated, moving further in the direction of travel. Moving back past
//! the first reachable step clamps to it, so "back" there re-renders the same
//! step.

use tracing::{debug, instrument, trace};

use super::FlowResult;
use super::prompt::{Render, Ui};
use super::step::{FlowState, Step, StepOutcome};

/// An ordered list of steps over one state type.
pub struct Flow<'a, S: FlowState> {
    steps: Vec<Box<dyn Step<S> + 'a>>,
}

impl<'a, S: FlowState> Flow<'a, S> {
    /// Create an empty flow.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step.
    #[must_use]
    pub fn step(mut self, step: impl Step<S> + 'a) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Append a boxed step.
    pub fn push(&mut self, step: Box<dyn Step<S> + 'a>) {
        self.steps.push(step);
    }

    /// Number of steps, including ones that will be skipped.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the flow has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step ids in order.
    pub fn ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.id()).collect()
    }

    /// Drive the user through the steps, returning the final state.
    ///
    /// Errors raised while rendering (including [`FlowError::Cancelled`](super::FlowError::Cancelled))
    /// end the flow and are returned as is.
    #[instrument(skip_all, fields(steps = self.steps.len()))]
    pub fn run(self, mut state: S, renderer: &mut dyn Render) -> FlowResult<S> {
        let seeded: Vec<bool> = self.steps.iter().map(|s| s.seeded(&state)).collect();
        for (step, _) in self.steps.iter().zip(&seeded).filter(|(_, s)| **s) {
            debug!(step = step.id(), "step seeded before flow start");
        }

        let traversal = Traversal {
            steps: &self.steps,
            seeded,
        };

        let mut index = traversal.forward_from(0, &state);
        while index < traversal.steps.len() {
            let step = &traversal.steps[index];
            let allow_back = traversal.first_reachable(&state) != Some(index);
            debug!(step = step.id(), index, allow_back, "entering step");

            let mut ui = Ui::new(&mut *renderer, allow_back);
            match step.run(&state, &mut ui)? {
                StepOutcome::Next(partial) => {
                    trace!(step = step.id(), "merging step contribution");
                    state.merge(partial);
                    index = traversal.forward_from(index + 1, &state);
                }
                StepOutcome::Back => {
                    index = traversal.back_from(index, &state);
                    debug!(from = step.id(), to = index, "moved back");
                }
            }
        }

        debug!("flow completed");
        Ok(state)
    }
}

impl<S: FlowState> Default for Flow<'_, S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Skip evaluation for one run of a flow.
struct Traversal<'f, 'a, S: FlowState> {
    steps: &'f [Box<dyn Step<S> + 'a>],
    seeded: Vec<bool>,
}

impl<S: FlowState> Traversal<'_, '_, S> {
    fn skipped(&self, index: usize, state: &S) -> bool {
        let skipped = self.seeded[index] || self.steps[index].skip(state);
        if skipped {
            trace!(step = self.steps[index].id(), "skipping step");
        }
        skipped
    }

    /// First non-skipped index at or after `index`, or `len` if none.
    fn forward_from(&self, mut index: usize, state: &S) -> usize {
        while index < self.steps.len() && self.skipped(index, state) {
            index += 1;
        }
        index
    }

    /// Nearest non-skipped index before `index`, clamped to the first
    /// reachable step.
    fn back_from(&self, index: usize, state: &S) -> usize {
        let mut candidate = index;
        while candidate > 0 {
            candidate -= 1;
            if !self.skipped(candidate, state) {
                return candidate;
            }
        }
        self.forward_from(0, state)
    }

    fn first_reachable(&self, state: &S) -> Option<usize> {
        (0..self.steps.len()).find(|&i| !self.seeded[i] && !self.steps[i].skip(state))
    }
}
