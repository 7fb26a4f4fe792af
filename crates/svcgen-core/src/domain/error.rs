// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (carried inside staged failures)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Request Errors
    // ========================================================================
    #[error("unsupported service variant '{variant}'")]
    UnsupportedVariant { variant: String },

    #[error("invalid service name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    // ========================================================================
    // Target Graph Invariants
    // ========================================================================
    #[error("target '{target}' depends on unknown target '{dependency}'")]
    DanglingDependency { target: String, dependency: String },

    #[error("dependency cycle between targets: {}", cycle.join(" -> "))]
    DependencyCycle { cycle: Vec<String> },

    #[error("invalid deploy policy: {0}")]
    InvalidDeployPolicy(String),

    // ========================================================================
    // Template Errors
    // ========================================================================
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Template '{template_id}' has no content")]
    EmptyTemplate { template_id: String },

    #[error("Duplicate path in template: {path}")]
    DuplicatePath { path: String },

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("Path escapes the destination root: {path}")]
    PathEscapesRoot { path: String },

    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnsupportedVariant { variant } => vec![
                format!("'{variant}' is not a known service variant"),
                "Supported variants: api, graphql, worker, app, library".into(),
                "Try: svcgen list".into(),
            ],
            Self::InvalidName { name, reason } => vec![
                format!("Service name '{name}' is invalid: {reason}"),
                "Use a single path segment of letters, digits, '-' or '_'".into(),
                "Examples: billing-api, accounts_worker".into(),
            ],
            Self::InvalidRequest(msg) => vec![
                format!("Check the request document: {msg}"),
                "Canonical shape: {\"name\": \"...\", \"variant\": \"api\"}".into(),
                "Legacy documents must declare \"schemaVersion\": 1".into(),
            ],
            Self::DanglingDependency { .. } | Self::DependencyCycle { .. } => vec![
                "The built-in target graph is inconsistent".into(),
                "This is a bug, please report it".into(),
            ],
            Self::InvalidDeployPolicy(msg) => vec![
                format!("Deploy regions are misconfigured: {msg}"),
                "Check [deploy] in your svcgen configuration".into(),
            ],
            Self::EmptyTemplate { template_id } => vec![
                format!("Template set '{template_id}' is corrupted"),
                "Check the templates directory or unset SVCGEN_TEMPLATES_DIR".into(),
            ],
            Self::PathEscapesRoot { path } | Self::AbsolutePathNotAllowed { path } => vec![
                format!("Template path '{path}' would be written outside the project root"),
                "Template paths must be relative and must not contain '..'".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedVariant { .. }
            | Self::InvalidName { .. }
            | Self::InvalidRequest(_) => ErrorCategory::Validation,
            Self::InvalidDeployPolicy(_) => ErrorCategory::Configuration,
            Self::InvalidTemplate(_)
            | Self::EmptyTemplate { .. }
            | Self::DuplicatePath { .. }
            | Self::AbsolutePathNotAllowed { .. }
            | Self::PathEscapesRoot { .. } => ErrorCategory::Template,
            _ => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Configuration,
    Template,
    Internal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_path() {
        let err = DomainError::DependencyCycle {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "dependency cycle between targets: a -> b -> a");
    }

    #[test]
    fn unsupported_variant_suggests_list() {
        let err = DomainError::UnsupportedVariant {
            variant: "frontend".into(),
        };
        assert!(err.suggestions().iter().any(|s| s.contains("svcgen list")));
        assert_eq!(err.category(), ErrorCategory::Validation);
    }
}
