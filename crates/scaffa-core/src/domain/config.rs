//! Raw scaffold configs: the shapes a caller may hand to the engine.
//!
//! ```text
//! RawScaffoldConfig
//! ├── Name(String)        reference to a registered config
//! ├── Plain(PlainConfig)  target-name → definition, plus reserved keys
//! ├── Factory(..)         Fn(&Options) -> RawScaffoldConfig
//! └── Canonical(Scaffold) an already-built scaffold
//! ```
//!
//! Classification is a `match` over this union; there is no runtime type
//! inspection anywhere in the engine.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::domain::{
    entities::{scaffold::Scaffold, target::TargetDefinition},
    error::DomainError,
    options::{self, Options},
};

/// Reserved key carrying scaffold-level options.
pub const OPTIONS_KEY: &str = "options";
/// Reserved key carrying the scaffold name.
pub const NAME_KEY: &str = "name";

// ── Plain config ──────────────────────────────────────────────────────────────

/// A plain mapping from target name to target definition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlainConfig {
    pub name: Option<String>,
    pub options: Options,
    pub targets: IndexMap<String, TargetDefinition>,
}

impl PlainConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Add (or replace) a target definition.
    pub fn target(mut self, name: impl Into<String>, definition: TargetDefinition) -> Self {
        self.targets.insert(name.into(), definition);
        self
    }

    /// Parse a plain config from a JSON object.
    ///
    /// Every key other than `options` and `name` is a target.
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        let Value::Object(map) = value else {
            return Err(DomainError::InvalidConfig(
                "a plain scaffold config must be a mapping".into(),
            ));
        };

        let mut config = Self::new();
        for (key, raw) in map {
            match key.as_str() {
                OPTIONS_KEY => {
                    config.options = options::from_value(raw).ok_or_else(|| {
                        DomainError::InvalidConfig("`options` must be a mapping".into())
                    })?;
                }
                NAME_KEY => match raw {
                    Value::String(name) => config.name = Some(name),
                    Value::Null => {}
                    other => {
                        return Err(DomainError::InvalidConfig(format!(
                            "`name` must be a string, got {other}"
                        )));
                    }
                },
                _ => {
                    let definition = TargetDefinition::from_value(&key, raw)?;
                    config.targets.insert(key, definition);
                }
            }
        }
        Ok(config)
    }
}

impl TryFrom<Value> for PlainConfig {
    type Error = DomainError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

// ── Factory ───────────────────────────────────────────────────────────────────

type FactoryFn = dyn Fn(&Options) -> Result<RawScaffoldConfig, DomainError> + Send + Sync;

/// A function of options that produces the real config.
///
/// The options it receives are `{name, ..ambient}`.
#[derive(Clone)]
pub struct ScaffoldFactory(Arc<FactoryFn>);

impl ScaffoldFactory {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Options) -> Result<RawScaffoldConfig, DomainError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, options: &Options) -> Result<RawScaffoldConfig, DomainError> {
        (self.0)(options)
    }
}

impl fmt::Debug for ScaffoldFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ScaffoldFactory(..)")
    }
}

// ── Union ─────────────────────────────────────────────────────────────────────

/// Any config shape the engine accepts.
#[derive(Debug, Clone)]
pub enum RawScaffoldConfig {
    Name(String),
    Plain(PlainConfig),
    Factory(ScaffoldFactory),
    Canonical(Scaffold),
}

impl RawScaffoldConfig {
    /// Wrap a closure as a factory config.
    pub fn factory<F>(f: F) -> Self
    where
        F: Fn(&Options) -> Result<RawScaffoldConfig, DomainError> + Send + Sync + 'static,
    {
        Self::Factory(ScaffoldFactory::new(f))
    }

    /// Name carried by the config itself, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Plain(plain) => plain.name.as_deref(),
            Self::Canonical(scaffold) => scaffold.name(),
            Self::Name(_) | Self::Factory(_) => None,
        }
    }

    /// Stamp `name` onto mapping-like configs (plain and canonical).
    ///
    /// Name references and factories carry no name of their own and are left
    /// untouched.
    pub fn stamp_name(&mut self, name: &str) {
        match self {
            Self::Plain(plain) => plain.name = Some(name.to_string()),
            Self::Canonical(scaffold) => scaffold.set_name(name),
            Self::Name(_) | Self::Factory(_) => {}
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Plain(_) => "plain",
            Self::Factory(_) => "factory",
            Self::Canonical(_) => "canonical",
        }
    }

    pub const fn is_canonical(&self) -> bool {
        matches!(self, Self::Canonical(_))
    }
}

impl From<&str> for RawScaffoldConfig {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for RawScaffoldConfig {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<PlainConfig> for RawScaffoldConfig {
    fn from(config: PlainConfig) -> Self {
        Self::Plain(config)
    }
}

impl From<Scaffold> for RawScaffoldConfig {
    fn from(scaffold: Scaffold) -> Self {
        Self::Canonical(scaffold)
    }
}

impl From<ScaffoldFactory> for RawScaffoldConfig {
    fn from(factory: ScaffoldFactory) -> Self {
        Self::Factory(factory)
    }
}

impl TryFrom<Value> for RawScaffoldConfig {
    type Error = DomainError;

    /// Strings become name references, objects become plain configs.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(name) => Ok(Self::Name(name)),
            object @ Value::Object(_) => PlainConfig::from_value(object).map(Self::Plain),
            other => Err(DomainError::InvalidConfig(format!(
                "expected a scaffold name or mapping, got {other}"
            ))),
        }
    }
}
