//! Adapters that run external programs: the workspace tidy command and the
//! source formatter.

mod formatter;
mod runner;

pub use formatter::{CommandFormatter, DEFAULT_FORMAT_COMMAND};
pub use runner::ProcessRunner;
