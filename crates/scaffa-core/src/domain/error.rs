// ============================================================================
// domain/error.rs - SCAFFOLD DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

use crate::error::ErrorCategory;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (they travel through observers and summaries)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
///
/// Every variant is raised synchronously, during registration or
/// classification, and is never swallowed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors (400-level equivalent)
    // ========================================================================
    #[error("invalid argument `{argument}`: {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },

    /// The value produced by classification is neither a plain config nor a
    /// canonical scaffold.
    #[error("invalid scaffold config: {0}")]
    InvalidConfig(String),

    #[error("target '{target}' already exists in scaffold {scaffold}")]
    DuplicateTarget { scaffold: String, target: String },

    #[error("invalid task spec '{spec}': {reason}")]
    InvalidTaskSpec { spec: String, reason: String },

    // ========================================================================
    // Not Found Errors (404-level equivalent)
    // ========================================================================
    #[error("scaffold '{name}' is not registered")]
    ScaffoldNotFound { name: String },

    #[error("scaffold '{scaffold}' has no target '{target}'")]
    UnknownTarget { scaffold: String, target: String },
}

impl DomainError {
    /// Shorthand for [`DomainError::InvalidArgument`].
    pub fn invalid_argument(argument: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidArgument { argument, reason } => vec![
                format!("Check the value passed as `{argument}`"),
                format!("Details: {reason}"),
            ],
            Self::InvalidConfig(msg) => vec![
                "A scaffold config must be a mapping of targets or a built scaffold".into(),
                "Factories must return one of those, not a name".into(),
                format!("Details: {msg}"),
            ],
            Self::DuplicateTarget { target, .. } => vec![
                format!("Rename one of the '{target}' targets"),
                "Existing targets are never replaced implicitly".into(),
            ],
            Self::InvalidTaskSpec { .. } => vec![
                "Use `scaffold` to run every target".into(),
                "Use `scaffold:target` to run a single target".into(),
            ],
            Self::ScaffoldNotFound { name } => vec![
                format!("Register '{name}' before resolving it"),
                "Try: scaffa list".into(),
            ],
            Self::UnknownTarget { scaffold, .. } => vec![
                format!("List the targets of '{scaffold}' with: scaffa list"),
            ],
        }
    }

    /// Validation failures and dangling references.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidArgument { .. }
            | Self::InvalidConfig(_)
            | Self::DuplicateTarget { .. }
            | Self::InvalidTaskSpec { .. } => ErrorCategory::Validation,
            Self::ScaffoldNotFound { .. } | Self::UnknownTarget { .. } => ErrorCategory::NotFound,
        }
    }
}
