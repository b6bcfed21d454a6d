//! Files declarations and the values a file processor reports back.
//!
//! A [`FilesDeclaration`] says *what* a target reads and *where* it writes.
//! Matching, reading and writing belong to the file processor port; the
//! domain only carries the declaration and the shapes of what comes back
//! ([`FileNode`], [`FileItem`], [`FilesStage`]).

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{error::DomainError, options::Options};

/// Source patterns, destination, working directory and transform pipeline
/// for a single target.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilesDeclaration {
    /// Glob patterns relative to `cwd`. Patterns starting with `!` exclude.
    #[serde(deserialize_with = "one_or_many")]
    pub src: Vec<String>,

    /// Destination directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<PathBuf>,

    /// Directory `src` patterns are relative to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    /// Named transforms applied to each file, in order.
    #[serde(default, alias = "plugins", skip_serializing_if = "Vec::is_empty")]
    pub pipeline: Vec<String>,

    /// Matching options (for example `dot: true`).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub options: Options,
}

impl FilesDeclaration {
    pub fn new<I, S>(src: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            src: src.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn dest(mut self, dest: impl Into<PathBuf>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn pipe(mut self, transform: impl Into<String>) -> Self {
        self.pipeline.push(transform.into());
        self
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Parse a files declaration from a raw JSON value.
    pub fn from_value(target: &str, value: Value) -> Result<Self, DomainError> {
        serde_json::from_value(value).map_err(|e| {
            DomainError::InvalidConfig(format!("files of target '{target}': {e}"))
        })
    }

    /// Patterns that select files.
    pub fn includes(&self) -> impl Iterator<Item = &str> {
        self.src
            .iter()
            .map(String::as_str)
            .filter(|p| !p.starts_with('!'))
    }

    /// Patterns that exclude files, without their leading `!`.
    pub fn excludes(&self) -> impl Iterator<Item = &str> {
        self.src.iter().filter_map(|p| p.strip_prefix('!'))
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

/// An expanded mapping from matched sources to a destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub src: Vec<PathBuf>,
    pub dest: PathBuf,
}

/// One file produced by a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileItem {
    /// Name of the target that produced the file.
    pub target: String,
    pub src: PathBuf,
    pub dest: PathBuf,
    /// Size of the written content.
    pub bytes: u64,
}

/// Lifecycle stages a file processor reports while working on a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilesStage {
    /// The declaration was normalized against the working directory.
    Normalized,
    /// Source patterns were expanded into file nodes.
    Expanded,
    /// Every node was written.
    Written,
}

impl fmt::Display for FilesStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normalized => write!(f, "normalized"),
            Self::Expanded => write!(f, "expanded"),
            Self::Written => write!(f, "written"),
        }
    }
}
