//! Application layer errors.
//!
//! These errors represent failures in orchestration and in the adapters
//! behind the ports, not business rules. Business rule violations are
//! `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// A project with this name is already registered.
    #[error("project '{name}' is already registered")]
    DuplicateProject { name: String },

    #[error("project '{name}' is not registered")]
    ProjectNotFound { name: String },

    /// The project is registered but its files could not all be written.
    #[error("materializing template set '{template_set}' into {root} failed: {reason}")]
    MaterializationFailed {
        template_set: String,
        root: PathBuf,
        reason: String,
    },

    /// The workspace tidy command did not succeed.
    #[error("tidy command `{command}` failed: {reason}")]
    TidyFailed { command: String, reason: String },

    #[error("template set '{template_set}' not found")]
    TemplateNotFound { template_set: String },

    #[error("template rendering failed: {reason}")]
    RenderingFailed { reason: String },

    /// Filesystem operation failed.
    #[error("filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Refusing to overwrite a file that already has different content.
    #[error("refusing to overwrite existing file {path}")]
    FileExists { path: PathBuf },

    #[error("registry error: {reason}")]
    RegistryError { reason: String },

    /// Store access failed (lock poisoned, etc.).
    #[error("template store error")]
    StoreLockError,

    #[error("command `{command}` could not be run: {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("cannot resume from stage '{stage}': only materialize and post-generate can be resumed")]
    ResumeNotSupported { stage: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::DuplicateProject { name } => vec![
                format!("A project named '{name}' already exists in the workspace"),
                "Choose a different service name".into(),
                format!("Inspect it with: svcgen show {name}"),
            ],
            Self::ProjectNotFound { name } => vec![
                format!("No project named '{name}' is registered"),
                "Check the name, or run svcgen new without --resume-from".into(),
            ],
            Self::MaterializationFailed { root, .. } => vec![
                format!("The project is registered but {} is incomplete", root.display()),
                "Fix the cause above, then run: svcgen new <NAME> --variant <VARIANT> --resume-from materialize".into(),
            ],
            Self::TidyFailed { command, .. } => vec![
                format!("The project was generated, but `{command}` failed"),
                "Run the command by hand, or resume with --resume-from post-generate".into(),
                "Use --tidy-policy best-effort to continue past tidy failures".into(),
            ],
            Self::TemplateNotFound { template_set } => vec![
                format!("No template set named '{template_set}' is available"),
                "Check SVCGEN_TEMPLATES_DIR or templates.local_path in your config".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::FileExists { path } => vec![
                format!("{} already exists with different content", path.display()),
                "Move it out of the way before generating".into(),
            ],
            Self::StoreLockError => vec![
                "The template store is locked".into(),
                "Try again in a moment".into(),
            ],
            Self::CommandFailed { command, .. } => vec![
                format!("Could not start `{command}`"),
                "Make sure the program is installed and on PATH".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DuplicateProject { .. } | Self::ResumeNotSupported { .. } => {
                ErrorCategory::Validation
            }
            Self::ProjectNotFound { .. } | Self::TemplateNotFound { .. } => ErrorCategory::NotFound,
            Self::RenderingFailed { .. } => ErrorCategory::Template,
            Self::CommandFailed { .. } | Self::TidyFailed { .. } => ErrorCategory::External,
            Self::MaterializationFailed { .. }
            | Self::FilesystemError { .. }
            | Self::FileExists { .. }
            | Self::RegistryError { .. }
            | Self::StoreLockError => ErrorCategory::Internal,
        }
    }
}
