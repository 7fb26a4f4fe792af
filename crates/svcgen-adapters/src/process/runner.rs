use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, instrument};

use svcgen_core::{
    application::{ApplicationError, ports::CommandRunner},
    error::ScaffoldResult,
};

/// Runs a command line as a child process and waits for it.
///
/// The line is split with shell quoting rules but never passed to a shell.
/// The child's stdout is sent to our stderr so machine-readable output on
/// stdout stays clean.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    #[instrument(skip(self, cwd), fields(cwd = %cwd.display()))]
    fn run(&self, command_line: &str, cwd: &Path) -> ScaffoldResult<i32> {
        let command_line = command_line.trim();
        let failed = |reason: String| ApplicationError::CommandFailed {
            command: command_line.to_string(),
            reason,
        };

        let args = shell_words::split(command_line)
            .map_err(|e| failed(format!("failed to parse command: {e}")))?;
        let Some((program, rest)) = args.split_first() else {
            return Err(failed("command is empty".into()).into());
        };

        let status = Command::new(program)
            .args(rest)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(std::io::stderr())
            .status()
            .map_err(|e| failed(format!("failed to execute: {e}; ensure it is installed and in PATH")))?;

        let code = status.code().unwrap_or(-1);
        debug!(code, "command finished");
        Ok(code)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use svcgen_core::error::ScaffoldError;
    use tempfile::TempDir;

    #[test]
    fn returns_exit_code() {
        let dir = TempDir::new().unwrap();
        let runner = ProcessRunner::new();
        assert_eq!(runner.run("true", dir.path()).unwrap(), 0);
        assert_eq!(runner.run("sh -c 'exit 3'", dir.path()).unwrap(), 3);
    }

    #[test]
    fn runs_in_given_directory() {
        let dir = TempDir::new().unwrap();
        ProcessRunner::new()
            .run("sh -c 'touch marker'", dir.path())
            .unwrap();
        assert!(dir.path().join("marker").exists());
    }

    #[test]
    fn missing_program_is_command_failed() {
        let dir = TempDir::new().unwrap();
        let err = ProcessRunner::new()
            .run("svcgen-no-such-program --flag", dir.path())
            .unwrap_err();
        assert!(matches!(
            err,
            ScaffoldError::Application(ApplicationError::CommandFailed { .. })
        ));
    }

    #[test]
    fn empty_and_unbalanced_commands_are_rejected() {
        let dir = TempDir::new().unwrap();
        let runner = ProcessRunner::new();
        assert!(runner.run("   ", dir.path()).is_err());
        assert!(runner.run("echo 'unterminated", dir.path()).is_err());
    }
}
