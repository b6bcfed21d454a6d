//! Errors returned by the engine.
//!
//! Domain and application errors pass through unchanged. The root type adds
//! the two failures that belong to neither layer: rejected configuration
//! (manifests, plugin hosts, task registries) and internal faults.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Any failure of a registry, resolver, executor or collaborator call.
#[derive(Debug, Error, Clone)]
pub enum ScaffaError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// Input from outside the engine that cannot be used as given.
    #[error("invalid configuration: {message}")]
    Configuration { message: String },

    /// A collaborator broke its contract in a way no caller can fix.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ScaffaError {
    /// Hints a host can show next to the message.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { .. } => {
                vec!["Check the manifest's [options] and [scaffolds] sections".into()]
            }
            Self::Internal { .. } => vec![
                "Please report this at https://github.com/cosecruz/scaffa/issues".into(),
            ],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => e.category(),
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Name of the target a collaborator failed on, if that is what happened.
    pub fn failed_target(&self) -> Option<&str> {
        match self {
            Self::Application(ApplicationError::CollaboratorFailure { target, .. }) => {
                Some(target)
            }
            _ => None,
        }
    }
}

/// Who has to act on an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The caller passed a bad name, config or spec.
    Validation,
    /// A scaffold or target reference points at nothing.
    NotFound,
    /// The manifest or a registration is inconsistent.
    Configuration,
    /// The file processor failed on a target.
    Collaborator,
    Internal,
}

pub type ScaffaResult<T> = Result<T, ScaffaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_errors_display_unwrapped() {
        let err = ScaffaError::from(DomainError::ScaffoldNotFound { name: "blog".into() });
        assert_eq!(err.to_string(), "scaffold 'blog' is not registered");
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn failed_target_only_for_collaborator_failures() {
        let failure = ScaffaError::from(ApplicationError::CollaboratorFailure {
            target: "docs".into(),
            reason: "disk full".into(),
        });
        assert_eq!(failure.failed_target(), Some("docs"));
        assert_eq!(failure.category(), ErrorCategory::Collaborator);

        let lock = ScaffaError::from(ApplicationError::StoreLockError);
        assert_eq!(lock.failed_target(), None);
    }
}
