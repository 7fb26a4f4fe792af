//! The error type every public operation of this crate returns.
//!
//! Pipeline runs wrap it once more in
//! [`ScaffoldFailure`](crate::application::ScaffoldFailure) to record the
//! stage that failed.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScaffoldError {
    /// A request, name, template or graph broke a domain rule.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Registry, filesystem and process failures, surfaced through the ports.
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// The service was wired or invoked in a way it cannot run.
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl ScaffoldError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Hints for the user, most specific first.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {message}"),
                "Check your .svcgen.toml or SVCGEN__* environment variables".into(),
            ],
        }
    }

    /// Coarse grouping the CLI maps onto exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Configuration => ErrorCategory::Configuration,
                crate::domain::ErrorCategory::Template => ErrorCategory::Template,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Template,
    /// An external program (formatter, tidy) misbehaved.
    External,
    Internal,
}

pub type ScaffoldResult<T> = Result<T, ScaffoldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_categories_map_through() {
        let err: ScaffoldError = DomainError::InvalidName {
            name: "a/b".into(),
            reason: "x".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn configuration_errors_suggest_where_to_look() {
        let err = ScaffoldError::configuration("unknown tidy policy");
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.suggestions().iter().any(|s| s.contains(".svcgen.toml")));
    }

    #[test]
    fn transparent_display() {
        let err: ScaffoldError = ApplicationError::DuplicateProject { name: "svc".into() }.into();
        assert_eq!(err.to_string(), "project 'svc' is already registered");
    }
}
