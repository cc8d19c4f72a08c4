//! Command implementations

pub mod branch;

pub mod commit;

pub mod doctor;

pub mod info;

pub mod pr;

use anyhow::bail;
use indicatif::{ProgressBar, ProgressStyle};

use gitstep_core::flow::{Flow, FlowResult, FlowState, PromptAdapter, SignalBroker};
use gitstep_core::git;

use crate::terminal::InquireBackend;

/// Run a flow on the terminal.
///
/// A flow whose steps are all seeded returns without touching the terminal,
/// which is what makes fully flagged invocations scriptable.
pub fn run_on_terminal<S: FlowState>(flow: Flow<'_, S>, state: S) -> FlowResult<S> {
    let mut adapter = PromptAdapter::new(InquireBackend::new(), SignalBroker::global());
    flow.run(state, &mut adapter)
}

/// Fail unless the working directory is inside a git work tree.
pub fn ensure_repo() -> anyhow::Result<()> {
    if !git::is_inside_repo()? {
        bail!("not inside a git repository");
    }
    Ok(())
}

/// A spinner for work that blocks on an external command.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("  {spinner:.cyan} {msg}") {
        spinner.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    spinner.set_message(message.into());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}
