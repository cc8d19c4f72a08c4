//! Task implementations

pub mod completions;

pub mod man;

/// Name of the binary the generated files describe.
pub const BIN_NAME: &str = "gitstep";
