//! The `Scaffold` aggregate root.
//!
//! A scaffold is the canonical form every raw config resolves to: an optional
//! identity, merged options, and targets in insertion order.
//!
//! Targets are shared as `Arc<Target>`. Cloning a scaffold, or re-resolving
//! it, never creates new target objects; two clones point at the same target
//! set. Keys are stable for the life of the value: targets can be added, but
//! an existing key is never replaced.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::domain::{
    config::PlainConfig,
    entities::target::{Target, TargetDefinition},
    error::DomainError,
    options::{self, Options},
};

/// Canonical scaffold.
#[derive(Debug, Clone, Default)]
pub struct Scaffold {
    name: Option<String>,
    options: Options,
    targets: IndexMap<String, Arc<Target>>,
}

impl Scaffold {
    /// An unnamed scaffold with no targets.
    pub fn new(options: Options) -> Self {
        Self {
            name: None,
            options,
            targets: IndexMap::new(),
        }
    }

    /// Build a canonical scaffold directly from a plain config.
    ///
    /// The config's own `name` and `options` are adopted as-is.
    pub fn from_config(config: &PlainConfig) -> Result<Self, DomainError> {
        let mut scaffold = Self::new(config.options.clone());
        scaffold.name = config.name.clone();
        scaffold.add_targets(config)?;
        Ok(scaffold)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn set_options(&mut self, options: Options) {
        self.options = options;
    }

    /// Deep-merge `overlay` onto the current options.
    pub fn merge_options(&mut self, overlay: &Options) {
        options::merge(&mut self.options, overlay);
    }

    /// Targets in insertion order.
    pub fn targets(&self) -> impl ExactSizeIterator<Item = &Arc<Target>> {
        self.targets.values()
    }

    pub fn target(&self, name: &str) -> Option<&Arc<Target>> {
        self.targets.get(name)
    }

    pub fn target_names(&self) -> impl ExactSizeIterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Add one target.
    ///
    /// Fails with [`DomainError::DuplicateTarget`] if `name` is already taken.
    pub fn add_target(
        &mut self,
        name: impl Into<String>,
        definition: TargetDefinition,
    ) -> Result<Arc<Target>, DomainError> {
        let name = name.into();
        if self.targets.contains_key(&name) {
            return Err(DomainError::DuplicateTarget {
                scaffold: self.display_name().to_string(),
                target: name,
            });
        }

        let target = Arc::new(Target::new(name.clone(), definition)?);
        self.targets.insert(name, Arc::clone(&target));
        Ok(target)
    }

    /// Add every target of `config`, returning the newly created targets in
    /// config order.
    ///
    /// All-or-nothing: nothing is added if any key collides.
    pub fn add_targets(&mut self, config: &PlainConfig) -> Result<Vec<Arc<Target>>, DomainError> {
        if let Some(name) = config.targets.keys().find(|k| self.targets.contains_key(*k)) {
            return Err(DomainError::DuplicateTarget {
                scaffold: self.display_name().to_string(),
                target: name.clone(),
            });
        }

        config
            .targets
            .iter()
            .map(|(name, definition)| self.add_target(name.clone(), definition.clone()))
            .collect()
    }

    /// Name for messages: the identity, or `<anonymous>`.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }

    /// `true` when both values share the exact same target objects.
    pub fn shares_targets_with(&self, other: &Scaffold) -> bool {
        self.targets.len() == other.targets.len()
            && self
                .targets
                .iter()
                .zip(other.targets.iter())
                .all(|((ka, a), (kb, b))| ka == kb && Arc::ptr_eq(a, b))
    }
}

impl fmt::Display for Scaffold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} targets)", self.display_name(), self.targets.len())
    }
}
