//! The `Target` entity and its raw definition.
//!
//! A [`TargetDefinition`] is what a plain config carries under a target key.
//! A [`Target`] is the canonical, named unit owned by a scaffold. Its name
//! always equals its key in the owning scaffold's target map.
//!
//! # Domain purity
//!
//! This module must not import `tracing`. Observability is the responsibility
//! of the application and CLI layers, not the domain.

use std::fmt;

use serde_json::Value;
use uuid::Uuid;

use crate::domain::{
    entities::files::FilesDeclaration,
    error::DomainError,
    options::{self, Options},
};

// ── Identity ──────────────────────────────────────────────────────────────────

/// Stable identity of a canonical target.
///
/// Assigned once when the target is created; every later resolution of the
/// owning scaffold hands out the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(Uuid);

impl TargetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TargetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Raw definition ────────────────────────────────────────────────────────────

/// A target as written in a plain config.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TargetDefinition {
    pub options: Options,
    pub files: Option<FilesDeclaration>,
}

impl TargetDefinition {
    /// A definition with no files; it is acknowledged but never dispatched.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_files(files: FilesDeclaration) -> Self {
        Self {
            options: Options::new(),
            files: Some(files),
        }
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Parse a definition from a raw JSON value.
    ///
    /// Accepted shapes:
    /// - `{ "options": {..}, "files": { "src": .. } }`
    /// - `{ "src": .., "dest": .. }` (shorthand: the object itself, minus
    ///   `options`, is the files declaration)
    /// - `{ "options": {..} }` (no files)
    pub fn from_value(name: &str, value: Value) -> Result<Self, DomainError> {
        let Value::Object(mut map) = value else {
            return Err(DomainError::InvalidConfig(format!(
                "target '{name}' must be a mapping"
            )));
        };

        let options = match map.remove("options") {
            Some(raw) => options::from_value(raw).ok_or_else(|| {
                DomainError::InvalidConfig(format!("options of target '{name}' must be a mapping"))
            })?,
            None => Options::new(),
        };

        let files = match map.remove("files") {
            Some(raw) => Some(FilesDeclaration::from_value(name, raw)?),
            None if map.contains_key("src") => {
                Some(FilesDeclaration::from_value(name, Value::Object(map))?)
            }
            None => None,
        };

        Ok(Self { options, files })
    }
}

// ── Entity ────────────────────────────────────────────────────────────────────

/// A named unit within a scaffold.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    id: TargetId,
    name: String,
    options: Options,
    files: Option<FilesDeclaration>,
}

impl Target {
    /// Create a canonical target from its definition.
    pub fn new(name: impl Into<String>, definition: TargetDefinition) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::invalid_argument(
                "target",
                "target names must not be empty",
            ));
        }

        Ok(Self {
            id: TargetId::new(),
            name,
            options: definition.options,
            files: definition.files,
        })
    }

    pub const fn id(&self) -> TargetId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn files(&self) -> Option<&FilesDeclaration> {
        self.files.as_ref()
    }

    /// `true` when the target declares file operations.
    pub fn has_files(&self) -> bool {
        self.files.is_some()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(files) = &self.files {
            write!(f, " [{}]", files.src.join(", "))?;
            if let Some(dest) = &files.dest {
                write!(f, " -> {}", dest.display())?;
            }
        }
        Ok(())
    }
}
