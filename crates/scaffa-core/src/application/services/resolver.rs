//! Resolver - turns any raw config into a canonical [`Scaffold`].
//!
//! ```text
//! START → CLASSIFYING ─┬─ factory ──► FACTORY_INVOKE ──► CLASSIFYING
//!                      ├─ name ─────► registry lookup ──► CLASSIFYING
//!                      ├─ plain ────► CONSTRUCT ──────┐
//!                      └─ canonical ► CANONICAL_MERGE ┴─► EMIT_EVENTS → DONE
//! ```
//!
//! Option precedence (rightmost wins, deep merge):
//!
//! - new scaffold: `ambient ← config.options ← overrides`
//! - canonical:    `ambient ← scaffold.options ← overrides`
//!
//! Nothing is retried; any classification error ends the call.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, trace};

use crate::{
    application::{EventBus, services::registry::Registry},
    domain::{
        DomainError, Options, PlainConfig, RawScaffoldConfig, Scaffold, config::NAME_KEY, options,
    },
    error::ScaffaResult,
};

/// Builds the empty canonical scaffold a plain config is poured into.
pub type ScaffoldConstructor = Arc<dyn Fn(Options) -> Scaffold + Send + Sync>;

/// Outcome of classification: what the config turned out to be.
enum Classified {
    Plain(PlainConfig),
    Canonical(Scaffold),
}

/// Canonicalizes raw configs and announces what it finds.
pub struct Resolver {
    registry: Arc<Registry>,
    events: Arc<EventBus>,
    constructor: ScaffoldConstructor,
}

impl Resolver {
    pub fn new(registry: Arc<Registry>, events: Arc<EventBus>) -> Self {
        Self {
            registry,
            events,
            constructor: Arc::new(Scaffold::new),
        }
    }

    /// Replace the constructor used for new scaffolds.
    pub fn with_constructor(mut self, constructor: ScaffoldConstructor) -> Self {
        self.constructor = constructor;
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Resolve `config` with ambient options only.
    pub fn resolve(
        &self,
        config: impl Into<RawScaffoldConfig>,
        ambient: &Options,
    ) -> ScaffaResult<Scaffold> {
        self.resolve_with(config, ambient, &Options::new())
    }

    /// Resolve `config`, layering `overrides` over everything else.
    #[instrument(skip_all)]
    pub fn resolve_with(
        &self,
        config: impl Into<RawScaffoldConfig>,
        ambient: &Options,
        overrides: &Options,
    ) -> ScaffaResult<Scaffold> {
        let (name, classified) = self.classify(config.into(), ambient)?;

        let scaffold = match classified {
            Classified::Plain(plain) => self.construct(name, &plain, ambient, overrides)?,
            Classified::Canonical(scaffold) => self.redecorate(name, scaffold, ambient, overrides),
        };
        Ok(scaffold)
    }

    /// Walk factories and name references until a plain or canonical config
    /// is reached. Returns the working name alongside it.
    fn classify(
        &self,
        config: RawScaffoldConfig,
        ambient: &Options,
    ) -> ScaffaResult<(Option<String>, Classified)> {
        let mut name: Option<String> = None;
        let mut followed: Vec<String> = Vec::new();
        let mut from_factory = false;
        let mut current = config;

        loop {
            trace!(kind = current.kind(), "Classifying scaffold config");
            current = match current {
                RawScaffoldConfig::Factory(factory) => {
                    let mut factory_options = Options::new();
                    if let Some(name) = &name {
                        factory_options.insert(NAME_KEY.to_string(), Value::String(name.clone()));
                    }
                    options::merge(&mut factory_options, ambient);
                    from_factory = true;
                    factory.call(&factory_options)?
                }
                RawScaffoldConfig::Name(reference) => {
                    if from_factory {
                        return Err(DomainError::InvalidConfig(format!(
                            "factory for {} returned the name '{reference}', \
                             expected a mapping or a scaffold",
                            name.as_deref().unwrap_or("<anonymous>"),
                        ))
                        .into());
                    }
                    if followed.contains(&reference) {
                        return Err(DomainError::InvalidConfig(format!(
                            "cyclic scaffold reference: {} -> {reference}",
                            followed.join(" -> "),
                        ))
                        .into());
                    }
                    let raw = self.registry.get(&reference)?;
                    followed.push(reference.clone());
                    name = Some(reference);
                    raw
                }
                RawScaffoldConfig::Plain(plain) => {
                    if let Some(own) = &plain.name {
                        name = Some(own.clone());
                    }
                    return Ok((name, Classified::Plain(plain)));
                }
                RawScaffoldConfig::Canonical(scaffold) => {
                    if let Some(own) = scaffold.name() {
                        name = Some(own.to_string());
                    }
                    return Ok((name, Classified::Canonical(scaffold)));
                }
            };
        }
    }

    /// Build a new scaffold from a plain config.
    ///
    /// Targets are in place before `scaffold-discovered` fires, so observers
    /// see the whole set; one `target-discovered` follows per new target.
    fn construct(
        &self,
        name: Option<String>,
        plain: &PlainConfig,
        ambient: &Options,
        overrides: &Options,
    ) -> ScaffaResult<Scaffold> {
        let merged = options::merge_all([ambient, &plain.options, overrides]);
        let mut scaffold = (self.constructor)(merged);
        if let Some(name) = name {
            scaffold.set_name(name);
        }

        let added = scaffold.add_targets(plain)?;
        info!(
            scaffold = scaffold.display_name(),
            targets = added.len(),
            "Scaffold discovered"
        );

        self.events.scaffold(&scaffold);
        for target in &added {
            self.events.target(scaffold.name(), target);
        }
        Ok(scaffold)
    }

    /// Re-decorate an existing canonical scaffold.
    ///
    /// Every current target is re-announced, then the scaffold itself.
    fn redecorate(
        &self,
        name: Option<String>,
        mut scaffold: Scaffold,
        ambient: &Options,
        overrides: &Options,
    ) -> Scaffold {
        let merged = options::merge_all([ambient, scaffold.options(), overrides]);
        scaffold.set_options(merged);
        if let Some(name) = name {
            scaffold.set_name(name);
        }
        debug!(
            scaffold = scaffold.display_name(),
            targets = scaffold.len(),
            "Canonical scaffold re-resolved"
        );

        for target in scaffold.targets() {
            self.events.target(scaffold.name(), target);
        }
        self.events.scaffold(&scaffold);
        scaffold
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
