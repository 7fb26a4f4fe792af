//! Error handling for the svcgen CLI.
//!
//! Provides structured errors with:
//! - User-friendly messages
//! - Actionable suggestions
//! - Proper error chaining
//! - Exit code mapping

use std::error::Error;

use owo_colors::OwoColorize;
use thiserror::Error;

use svcgen_core::{application::ScaffoldFailure, error::ScaffoldError};

// Re-export so callers only need `use crate::error::*`.
pub use svcgen_core::error::ErrorCategory as CoreCategory;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input that clap could not catch.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ── Config errors ──────────────────────────────────────────────────────
    /// A configuration file could not be read, parsed, or written.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ── Core errors ────────────────────────────────────────────────────────
    /// An error from `svcgen-core` outside the scaffold pipeline
    /// (request parsing, registry lookups, policy validation).
    #[error(transparent)]
    Core(#[from] ScaffoldError),

    /// A scaffold run that stopped at some pipeline stage.
    #[error(transparent)]
    Scaffold(#[from] ScaffoldFailure),

    // ── System errors ──────────────────────────────────────────────────────
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Operation cancelled by user.
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<svcgen_core::domain::DomainError> for CliError {
    fn from(err: svcgen_core::domain::DomainError) -> Self {
        CliError::Core(err.into())
    }
}

impl CliError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { message, .. } => vec![
                format!("Check your input: {message}"),
                "Use --help for usage information".into(),
            ],

            Self::ConfigError { message, .. } => vec![
                format!("Configuration issue: {message}"),
                "Inspect the effective values with: svcgen config list".into(),
                "Create a default config with: svcgen init".into(),
            ],

            Self::Core(core_err) => core_err.suggestions(),

            Self::Scaffold(failure) => {
                let mut suggestions = failure.suggestions();
                suggestions.push(format!("Run id: {}", failure.run_id));
                suggestions
            }

            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {message}"),
                "Check file permissions".into(),
                "Ensure the parent directory exists".into(),
            ],

            Self::Cancelled => vec![
                "Operation was cancelled".into(),
                "No changes were made".into(),
            ],
        }
    }

    /// Get the error category for styling and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } | Self::Cancelled => ErrorCategory::UserError,
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Core(core) => ErrorCategory::from_core(core.category()),
            Self::Scaffold(failure) if failure.is_partial() => ErrorCategory::Partial,
            Self::Scaffold(failure) => ErrorCategory::from_core(failure.category()),
            Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category      | Code |
    /// |---------------|------|
    /// | Internal      |  1   |
    /// | User error    |  2   |
    /// | Not found     |  3   |
    /// | Configuration |  4   |
    /// | Partial       |  5   |
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::Internal => 1,
            ErrorCategory::UserError => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::Partial => 5,
        }
    }

    /// Format the error for display with colors and suggestions.
    pub fn format_colored(&self, verbose: bool) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\n{} {}\n\n",
            "✗".red().bold(),
            "Error:".red().bold()
        ));
        output.push_str(&format!("  {}\n", self.to_string().red()));

        if self.category() == ErrorCategory::Partial {
            output.push_str(&format!(
                "  {}\n",
                "The project is registered; its files may be incomplete.".yellow()
            ));
        }

        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                output.push_str(&format!(
                    "\n  {} {}\n",
                    "→".dimmed(),
                    err.to_string().dimmed()
                ));
                source = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str(&format!("\n{}\n", "Suggestions:".yellow().bold()));
            for suggestion in suggestions {
                output.push_str(&format!("  {suggestion}\n"));
            }
        }

        if !verbose {
            output.push('\n');
            output.push_str(&format!(
                "{} {}\n",
                "\u{2139}".blue(), // ℹ
                "Use -v / --verbose for more details.".dimmed(),
            ));
        }

        output
    }

    /// Plain-text version of [`Self::format_colored`], no ANSI codes.
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut out = String::new();
        out.push_str(&format!("\nError: {self}\n"));

        if self.category() == ErrorCategory::Partial {
            out.push_str("  The project is registered; its files may be incomplete.\n");
        }

        if verbose {
            let mut src = std::error::Error::source(self);
            while let Some(err) = src {
                out.push_str(&format!("  Caused by: {err}\n"));
                src = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                out.push_str(&format!("  {s}\n"));
            }
        }

        if !verbose {
            out.push_str("\nUse -v / --verbose for more details.\n");
        }

        out
    }

    /// Log the error using tracing.
    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError => tracing::warn!("User error: {}", self),
            ErrorCategory::NotFound => tracing::warn!("Not found: {}", self),
            ErrorCategory::Configuration => tracing::error!("Configuration error: {}", self),
            ErrorCategory::Partial => tracing::error!("Partial scaffold: {}", self),
            ErrorCategory::Internal => tracing::error!("Internal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// User input error (validation, invalid arguments, duplicates).
    UserError,
    /// Resource not found.
    NotFound,
    /// Configuration or template-set error.
    Configuration,
    /// Registered, then failed while writing files or post-processing.
    Partial,
    /// Internal/system error, including external programs.
    Internal,
}

impl ErrorCategory {
    fn from_core(category: CoreCategory) -> Self {
        match category {
            CoreCategory::Validation => Self::UserError,
            CoreCategory::NotFound => Self::NotFound,
            CoreCategory::Configuration | CoreCategory::Template => Self::Configuration,
            CoreCategory::External | CoreCategory::Internal => Self::Internal,
        }
    }
}

// ── IntoCli trait ─────────────────────────────────────────────────────────────

/// Extension trait to convert foreign error types into [`CliError`] at
/// call-sites with a descriptive context message.
///
/// There is no blanket impl; it would overlap with the concrete ones.
pub trait IntoCli<T> {
    /// Convert to `CliResult` attaching a human-readable context message.
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for Result<T, std::io::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::IoError {
            message: f().into(),
            source: e,
        })
    }
}

impl<T> IntoCli<T> for Result<T, ScaffoldError> {
    /// Core errors already carry their own context; the message is dropped.
    fn with_cli_context<F, S>(self, _f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(CliError::Core)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use svcgen_core::{
        application::{ApplicationError, ScaffoldService, Stage},
        domain::{DomainError, ServiceRequest, Variant},
    };

    fn duplicate() -> ScaffoldError {
        ApplicationError::DuplicateProject {
            name: "billing".into(),
        }
        .into()
    }

    /// Drives a real run against an empty template store. With the name
    /// already taken it stops at register, otherwise at materialize.
    fn failing_run(name_taken: bool) -> ScaffoldFailure {
        use svcgen_adapters::{
            CommandFormatter, InMemoryRegistry, InMemoryStore, MemoryFilesystem, ProcessRunner,
            SimpleRenderer, TreeMaterializer,
        };
        use svcgen_core::{
            application::{PostGenerationRunner, ports::ProjectRegistry},
            domain::VariantResolver,
        };

        let registry = InMemoryRegistry::new();
        let service = ScaffoldService::new(
            VariantResolver::default(),
            Box::new(registry.clone()),
            Box::new(TreeMaterializer::new(
                Box::new(InMemoryStore::new()),
                Box::new(SimpleRenderer::new()),
                Box::new(MemoryFilesystem::new()),
                "/ws",
            )),
            PostGenerationRunner::new(
                Box::new(CommandFormatter::new(Box::new(ProcessRunner::new()), "/ws")),
                Box::new(ProcessRunner::new()),
                "/ws",
            ),
        );
        let request = ServiceRequest::new("billing", Variant::Api).unwrap();
        if name_taken {
            let (_, descriptor) = service.plan(&request).unwrap();
            registry.register(&descriptor).unwrap();
        }
        service.scaffold(&request).unwrap_err()
    }

    // ── exit codes ────────────────────────────────────────────────────────

    #[test]
    fn exit_code_user_error() {
        assert_eq!(
            CliError::InvalidInput {
                message: "x".into(),
                source: None
            }
            .exit_code(),
            2
        );
        assert_eq!(CliError::Core(duplicate()).exit_code(), 2);
        let invalid: CliError = DomainError::InvalidName {
            name: "a/b".into(),
            reason: "not a single path segment".into(),
        }
        .into();
        assert_eq!(invalid.exit_code(), 2);
    }

    #[test]
    fn exit_code_not_found() {
        let err = CliError::Core(
            ApplicationError::ProjectNotFound {
                name: "ghost".into(),
            }
            .into(),
        );
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn exit_code_configuration() {
        assert_eq!(
            CliError::ConfigError {
                message: "x".into(),
                source: None
            }
            .exit_code(),
            4
        );
        let policy: CliError = DomainError::InvalidDeployPolicy("dup".into()).into();
        assert_eq!(policy.exit_code(), 4);
    }

    #[test]
    fn exit_code_internal() {
        assert_eq!(
            CliError::IoError {
                message: "x".into(),
                source: io::Error::other("e"),
            }
            .exit_code(),
            1
        );
    }

    #[test]
    fn registration_failure_uses_source_category() {
        let failure = failing_run(true);
        assert_eq!(failure.stage, Stage::Register);
        assert!(!failure.is_partial());
        assert_eq!(CliError::Scaffold(failure).exit_code(), 2);
    }

    #[test]
    fn failure_after_registration_is_partial() {
        let failure = failing_run(false);
        assert_eq!(failure.stage, Stage::Materialize);
        assert!(failure.is_partial());
        let err = CliError::Scaffold(failure);
        assert_eq!(err.category(), ErrorCategory::Partial);
        assert_eq!(err.exit_code(), 5);
        assert!(err.format_plain(false).contains("registered"));
        assert!(err.suggestions().iter().any(|s| s.starts_with("Run id:")));
    }

    // ── format ────────────────────────────────────────────────────────────

    #[test]
    fn format_plain_contains_error_header() {
        let s = CliError::Core(duplicate()).format_plain(false);
        assert!(s.contains("Error:"));
        assert!(s.contains("Suggestions:"));
        assert!(s.contains("svcgen show billing"));
    }

    #[test]
    fn format_plain_verbose_omits_hint() {
        let s = CliError::Cancelled.format_plain(true);
        assert!(!s.contains("--verbose"));
    }

    #[test]
    fn format_colored_lists_suggestions() {
        let s = CliError::Core(duplicate()).format_colored(false);
        assert!(s.contains("Suggestions:"));
        assert!(s.contains("--verbose"));
    }

    // ── IntoCli ───────────────────────────────────────────────────────────

    #[test]
    fn into_cli_io_error() {
        let result: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let cli: CliResult<()> = result.with_cli_context(|| "reading request");
        assert!(matches!(cli, Err(CliError::IoError { .. })));
    }

    #[test]
    fn into_cli_core_error() {
        let result: Result<(), ScaffoldError> = Err(duplicate());
        let cli: CliResult<()> = result.with_cli_context(|| "ignored");
        assert!(matches!(cli, Err(CliError::Core(_))));
    }
}
