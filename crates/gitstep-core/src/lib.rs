//! Core library for gitstep.
//!
//! gitstep walks the user through conventional commits, branch names, and
//! pull requests one prompt at a time, with Esc stepping back to the previous
//! question. This crate holds everything except the terminal itself.
//!
//! # Modules
//!
//! - [`config`] - Configuration loading and management
//! - [`error`] - Configuration error types
//! - [`flow`] - The step-flow engine (controller, broker, prompt adapter)
//! - [`git`] - Git operations
//! - [`github`] - Pull request creation through the `gh` CLI
//! - [`template`] - Commit message and branch name templates
//! - [`workflow`] - The commit, branch, and pull request flows
//!
//! # Quick Start
//!
//! ```no_run
//! use gitstep_core::flow::{PromptAdapter, SignalBroker};
//! use gitstep_core::flow::scripted::{Scripted, ScriptedBackend};
//! use gitstep_core::workflow::commit::{self, CommitState};
//! use gitstep_core::ConfigLoader;
//!
//! let config = ConfigLoader::new().load().expect("config");
//! let backend = ScriptedBackend::new([
//!     Scripted::index(0),
//!     Scripted::text(""),
//!     Scripted::text("add login"),
//!     Scripted::yes(false),
//! ]);
//! let mut adapter = PromptAdapter::new(backend, SignalBroker::global());
//! let state = commit::flow(&config, false)
//!     .run(CommitState::default(), &mut adapter)
//!     .expect("flow");
//! println!("{}", state.render(&config).expect("render"));
//! ```
#![deny(unsafe_code)]

pub mod config;

pub mod error;

pub mod flow;

pub mod git;

pub mod github;

pub mod template;

pub mod workflow;

pub use config::{Config, ConfigLoader, LogLevel};

pub use error::{ConfigError, ConfigResult};

pub use flow::{FlowError, FlowResult};
