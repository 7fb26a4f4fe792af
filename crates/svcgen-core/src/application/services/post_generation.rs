//! Workspace consistency steps that run after files are written:
//! formatting, then the dependency tidy command.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{CommandRunner, Formatter},
    },
    error::{ScaffoldError, ScaffoldResult},
};

/// Default workspace tidy command.
pub const DEFAULT_TIDY_COMMAND: &str = "pnpm go:tidy";

/// How a tidy failure is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TidyPolicy {
    /// Always run and wait; failure fails the scaffold.
    #[default]
    Required,
    /// Run and wait; failure is logged and the scaffold succeeds.
    BestEffort,
    /// Do not run the tidy command.
    Skip,
}

impl TidyPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::BestEffort => "best-effort",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for TidyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TidyPolicy {
    type Err = ScaffoldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "required" => Ok(Self::Required),
            "best-effort" | "best_effort" => Ok(Self::BestEffort),
            "skip" | "none" => Ok(Self::Skip),
            other => Err(ScaffoldError::configuration(format!(
                "unknown tidy policy '{other}' (expected required, best-effort or skip)"
            ))),
        }
    }
}

/// What happened to the tidy command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TidyOutcome {
    Succeeded,
    /// Failed under [`TidyPolicy::BestEffort`].
    Failed { reason: String },
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostGenerationOutcome {
    /// `false` when the formatter reported an error (logged, not propagated).
    pub formatted: bool,
    pub tidy: TidyOutcome,
}

/// Runs formatting and then tidy, in that order, once per scaffold.
pub struct PostGenerationRunner {
    formatter: Box<dyn Formatter>,
    runner: Box<dyn CommandRunner>,
    workspace_root: PathBuf,
    tidy_command: String,
    policy: TidyPolicy,
}

impl PostGenerationRunner {
    pub fn new(
        formatter: Box<dyn Formatter>,
        runner: Box<dyn CommandRunner>,
        workspace_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            formatter,
            runner,
            workspace_root: workspace_root.into(),
            tidy_command: DEFAULT_TIDY_COMMAND.to_string(),
            policy: TidyPolicy::default(),
        }
    }

    pub fn with_tidy_command(mut self, command: impl Into<String>) -> Self {
        self.tidy_command = command.into();
        self
    }

    pub fn with_policy(mut self, policy: TidyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> TidyPolicy {
        self.policy
    }

    pub fn tidy_command(&self) -> &str {
        &self.tidy_command
    }

    #[instrument(skip_all, fields(files = written_files.len(), policy = %self.policy))]
    pub fn run(&self, written_files: &[PathBuf]) -> ScaffoldResult<PostGenerationOutcome> {
        let formatted = match self.formatter.format(written_files) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "formatting generated files failed; continuing");
                false
            }
        };

        let tidy = self.tidy()?;
        Ok(PostGenerationOutcome { formatted, tidy })
    }

    fn tidy(&self) -> ScaffoldResult<TidyOutcome> {
        if self.policy == TidyPolicy::Skip {
            info!(command = %self.tidy_command, "tidy skipped by policy");
            return Ok(TidyOutcome::Skipped);
        }

        info!(command = %self.tidy_command, "running workspace tidy");
        let failure = match self.runner.run(&self.tidy_command, &self.workspace_root) {
            Ok(0) => return Ok(TidyOutcome::Succeeded),
            Ok(code) => format!("exited with status {code}"),
            Err(e) => e.to_string(),
        };

        match self.policy {
            TidyPolicy::BestEffort => {
                warn!(command = %self.tidy_command, reason = %failure, "tidy failed; continuing");
                Ok(TidyOutcome::Failed { reason: failure })
            }
            _ => Err(ApplicationError::TidyFailed {
                command: self.tidy_command.clone(),
                reason: failure,
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use crate::application::ports::{MockCommandRunner, MockFormatter};
    use mockall::{Sequence, predicate::eq};

    fn ok_formatter() -> MockFormatter {
        let mut f = MockFormatter::new();
        f.expect_format().returning(|_| Ok(()));
        f
    }

    fn runner_returning(code: i32) -> MockCommandRunner {
        let mut r = MockCommandRunner::new();
        r.expect_run()
            .with(eq(DEFAULT_TIDY_COMMAND), eq(Path::new("/ws")))
            .times(1)
            .returning(move |_, _| Ok(code));
        r
    }

    #[test]
    fn formats_before_tidy() {
        let mut seq = Sequence::new();
        let mut formatter = MockFormatter::new();
        formatter
            .expect_format()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(0));

        let out = PostGenerationRunner::new(Box::new(formatter), Box::new(runner), "/ws")
            .run(&[PathBuf::from("apps/services/x/main.go")])
            .unwrap();
        assert!(out.formatted);
        assert_eq!(out.tidy, TidyOutcome::Succeeded);
    }

    #[test]
    fn format_failure_is_not_propagated() {
        let mut formatter = MockFormatter::new();
        formatter.expect_format().returning(|_| {
            Err(ApplicationError::CommandFailed {
                command: "gofmt".into(),
                reason: "not found".into(),
            }
            .into())
        });
        let out = PostGenerationRunner::new(Box::new(formatter), Box::new(runner_returning(0)), "/ws")
            .run(&[])
            .unwrap();
        assert!(!out.formatted);
    }

    #[test]
    fn required_tidy_failure_is_fatal() {
        let err = PostGenerationRunner::new(Box::new(ok_formatter()), Box::new(runner_returning(1)), "/ws")
            .run(&[])
            .unwrap_err();
        assert!(matches!(
            err,
            ScaffoldError::Application(ApplicationError::TidyFailed { .. })
        ));
    }

    #[test]
    fn best_effort_tidy_failure_is_reported() {
        let out = PostGenerationRunner::new(Box::new(ok_formatter()), Box::new(runner_returning(2)), "/ws")
            .with_policy(TidyPolicy::BestEffort)
            .run(&[])
            .unwrap();
        assert_eq!(
            out.tidy,
            TidyOutcome::Failed {
                reason: "exited with status 2".into()
            }
        );
    }

    #[test]
    fn skip_never_runs_command() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().never();
        let out = PostGenerationRunner::new(Box::new(ok_formatter()), Box::new(runner), "/ws")
            .with_policy(TidyPolicy::Skip)
            .run(&[])
            .unwrap();
        assert_eq!(out.tidy, TidyOutcome::Skipped);
    }

    #[test]
    fn policy_parses() {
        assert_eq!("best-effort".parse::<TidyPolicy>().unwrap(), TidyPolicy::BestEffort);
        assert_eq!("SKIP".parse::<TidyPolicy>().unwrap(), TidyPolicy::Skip);
        assert!("sometimes".parse::<TidyPolicy>().is_err());
    }
}
