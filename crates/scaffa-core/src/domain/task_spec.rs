//! `scaffold[:target]` run specs.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;

/// Separator between scaffold and target in a spec.
pub const SEPARATOR: char = ':';

/// A request to run a whole scaffold or one of its targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskSpec {
    scaffold: String,
    target: Option<String>,
}

impl TaskSpec {
    pub fn scaffold(name: impl Into<String>) -> Self {
        Self {
            scaffold: name.into(),
            target: None,
        }
    }

    pub fn target(scaffold: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            scaffold: scaffold.into(),
            target: Some(target.into()),
        }
    }

    pub fn scaffold_name(&self) -> &str {
        &self.scaffold
    }

    pub fn target_name(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

impl FromStr for TaskSpec {
    type Err = DomainError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| DomainError::InvalidTaskSpec {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = spec.split(SEPARATOR);
        let scaffold = parts.next().unwrap_or_default().trim();
        let target = parts.next().map(str::trim);

        if parts.next().is_some() {
            return Err(invalid("expected at most one ':'"));
        }
        if scaffold.is_empty() {
            return Err(invalid("missing scaffold name"));
        }

        match target {
            None => Ok(Self::scaffold(scaffold)),
            Some("") => Err(invalid("missing target name after ':'")),
            Some(target) => Ok(Self::target(scaffold, target)),
        }
    }
}

impl fmt::Display for TaskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some(target) => write!(f, "{}{SEPARATOR}{target}", self.scaffold),
            None => write!(f, "{}", self.scaffold),
        }
    }
}
