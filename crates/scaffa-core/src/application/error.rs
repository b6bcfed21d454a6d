//! Application layer errors.
//!
//! These errors represent failures in orchestration, not business logic.
//! Business logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// The file processor reported a failure for a target.
    #[error("target '{target}' failed: {reason}")]
    CollaboratorFailure { target: String, reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// A files declaration names a transform nobody registered.
    #[error("Unknown transform '{name}'")]
    UnknownTransform { name: String },

    /// A transform rejected a file.
    #[error("Transform '{name}' failed on {path}: {reason}")]
    TransformFailed {
        name: String,
        path: PathBuf,
        reason: String,
    },

    /// Store access failed (lock poisoned, etc.).
    #[error("Scaffold store error")]
    StoreLockError,
}

impl ApplicationError {
    /// Wrap any processor error as a failure of `target`.
    ///
    /// Errors that already are a collaborator failure keep their target.
    pub fn collaborator(target: &str, err: &crate::error::ScaffaError) -> Self {
        match err {
            crate::error::ScaffaError::Application(
                failure @ Self::CollaboratorFailure { .. },
            ) => failure.clone(),
            other => Self::CollaboratorFailure {
                target: target.to_string(),
                reason: other.to_string(),
            },
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::CollaboratorFailure { target, .. } => vec![
                format!("Target '{}' stopped the run", target),
                "Files written by earlier targets are kept".into(),
                "Re-run a single target with: scaffa run <scaffold>:<target>".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::UnknownTransform { name } => vec![
                format!("Register a transform named '{}'", name),
                "Or remove it from the target's pipeline".into(),
            ],
            Self::StoreLockError => vec![
                "The scaffold store is locked".into(),
                "Try again in a moment".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CollaboratorFailure { .. } | Self::TransformFailed { .. } => {
                ErrorCategory::Collaborator
            }
            Self::FilesystemError { .. } | Self::StoreLockError => ErrorCategory::Internal,
            Self::UnknownTransform { .. } => ErrorCategory::Configuration,
        }
    }
}
