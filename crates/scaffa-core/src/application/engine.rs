//! The engine context hosts hold on to.
//!
//! A [`Scaffolder`] owns one registry, one event bus, the resolver and the
//! executor. Nothing is global: two scaffolders never see each other's
//! scaffolds.
//!
//! ```rust,ignore
//! let app = Scaffolder::builder(Arc::new(LocalFileProcessor::new()))
//!     .options(ambient)
//!     .task_registrar(tasks.clone())
//!     .build();
//!
//! app.set_scaffold("docs", config)?;
//! app.run_spec("docs:site", &Options::new()).await?;
//! ```

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::{
    application::{
        EventBus,
        events::ScaffoldObserver,
        ports::{FileProcessor, PluginHost, TaskRegistrar},
        services::{
            executor::{Executor, RunSummary},
            merge::MergedStream,
            registry::Registry,
            resolver::{Resolver, ScaffoldConstructor},
            tasks::TaskProjector,
        },
    },
    domain::{DomainError, Options, RawScaffoldConfig, Scaffold, Target, TaskSpec, options},
    error::ScaffaResult,
};

/// Capability name the engine installs itself under on a plugin host.
pub const CAPABILITY: &str = "scaffa";

/// Completion callback for [`Scaffolder::generate`].
pub type Done = Box<dyn FnOnce(ScaffaResult<RunSummary>) + Send>;

/// What [`Scaffolder::generate`] did.
#[derive(Debug)]
pub enum Generation {
    /// Ran in series; the outcome went to the callback.
    Completed,
    /// No callback was given; here is the merged stream.
    Streaming(MergedStream),
}

/// Result of [`Scaffolder::install`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    AlreadyApplied,
}

/// Scaffold registry, resolver and executor behind one handle.
pub struct Scaffolder {
    options: Options,
    events: Arc<EventBus>,
    registry: Arc<Registry>,
    resolver: Arc<Resolver>,
    executor: Executor,
}

impl Scaffolder {
    pub fn builder(processor: Arc<dyn FileProcessor>) -> ScaffolderBuilder {
        ScaffolderBuilder::new(processor)
    }

    /// Process-wide options, the lowest layer of every merge.
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn processor(&self) -> &Arc<dyn FileProcessor> {
        self.executor.processor()
    }

    /// Subscribe an observer. Subscribe before resolving to see everything.
    pub fn subscribe(&self, observer: Arc<dyn ScaffoldObserver>) {
        self.events.subscribe(observer);
    }

    /// Register a raw config under `name`.
    pub fn set_scaffold(
        &self,
        name: &str,
        config: impl Into<RawScaffoldConfig>,
    ) -> ScaffaResult<()> {
        self.registry.set(name, config.into())
    }

    /// The raw config registered under `name`.
    pub fn get_scaffold(&self, name: &str) -> ScaffaResult<RawScaffoldConfig> {
        self.registry.get(name)
    }

    /// Register `config` under `name` if given, then resolve `name`.
    pub fn scaffold(
        &self,
        name: &str,
        config: Option<RawScaffoldConfig>,
    ) -> ScaffaResult<Scaffold> {
        if let Some(config) = config {
            self.set_scaffold(name, config)?;
        }
        self.resolve(name, &Options::new())
    }

    /// Resolve `config` with the process-wide options under `options`.
    pub fn resolve(
        &self,
        config: impl Into<RawScaffoldConfig>,
        options: &Options,
    ) -> ScaffaResult<Scaffold> {
        self.resolver.resolve(config, &self.ambient(options))
    }

    pub async fn run_series(
        &self,
        config: impl Into<RawScaffoldConfig>,
        options: &Options,
    ) -> ScaffaResult<RunSummary> {
        self.executor
            .run_series(config, &self.ambient(options))
            .await
    }

    pub fn run_stream(
        &self,
        config: impl Into<RawScaffoldConfig>,
        options: &Options,
    ) -> ScaffaResult<MergedStream> {
        self.executor.run_stream(config, &self.ambient(options))
    }

    /// Run in series when `done` is given, otherwise hand back a stream.
    ///
    /// Resolution errors are returned directly. In series mode the run's
    /// outcome, including a target failure, goes to `done`.
    #[instrument(skip_all, fields(series = done.is_some()))]
    pub async fn generate(
        &self,
        config: impl Into<RawScaffoldConfig>,
        options: &Options,
        done: Option<Done>,
    ) -> ScaffaResult<Generation> {
        let Some(done) = done else {
            return self.run_stream(config, options).map(Generation::Streaming);
        };

        let scaffold = self.resolve(config, options)?;
        let outcome = self.executor.series(&scaffold, scaffold.targets()).await;
        done(outcome);
        Ok(Generation::Completed)
    }

    /// Run `scaffold` or `scaffold:target` in series.
    #[instrument(skip(self, options))]
    pub async fn run_spec(&self, spec: &str, options: &Options) -> ScaffaResult<RunSummary> {
        let (scaffold, selected) = self.select(spec, options)?;
        self.executor.series(&scaffold, &selected).await
    }

    /// Stream `scaffold` or `scaffold:target`.
    #[instrument(skip(self, options))]
    pub fn stream_spec(&self, spec: &str, options: &Options) -> ScaffaResult<MergedStream> {
        let (scaffold, selected) = self.select(spec, options)?;
        Ok(self.executor.stream(&scaffold, &selected))
    }

    fn select(&self, spec: &str, options: &Options) -> ScaffaResult<(Scaffold, Vec<Arc<Target>>)> {
        let spec: TaskSpec = spec.parse()?;
        let scaffold = self.resolve(spec.scaffold_name(), options)?;

        let selected = match spec.target_name() {
            None => scaffold.targets().cloned().collect(),
            Some(target) => {
                let found = scaffold
                    .target(target)
                    .cloned()
                    .ok_or_else(|| DomainError::UnknownTarget {
                        scaffold: spec.scaffold_name().to_string(),
                        target: target.to_string(),
                    })?;
                vec![found]
            }
        };
        Ok((scaffold, selected))
    }

    /// Install into `host` under [`CAPABILITY`], once.
    pub fn install(&self, host: &dyn PluginHost) -> ScaffaResult<InstallOutcome> {
        if host.is_applied(CAPABILITY) {
            debug!("Already installed on host");
            return Ok(InstallOutcome::AlreadyApplied);
        }
        host.register_capability(CAPABILITY)?;
        info!(capability = CAPABILITY, "Installed on host");
        Ok(InstallOutcome::Installed)
    }

    fn ambient(&self, options: &Options) -> Options {
        options::merge_all([&self.options, options])
    }
}

impl std::fmt::Debug for Scaffolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scaffolder")
            .field("options", &self.options)
            .field("registry", &self.registry)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Scaffolder`].
pub struct ScaffolderBuilder {
    processor: Arc<dyn FileProcessor>,
    options: Options,
    constructor: Option<ScaffoldConstructor>,
    observers: Vec<Arc<dyn ScaffoldObserver>>,
    registrar: Option<Arc<dyn TaskRegistrar>>,
}

impl ScaffolderBuilder {
    pub fn new(processor: Arc<dyn FileProcessor>) -> Self {
        Self {
            processor,
            options: Options::new(),
            constructor: None,
            observers: Vec::new(),
            registrar: None,
        }
    }

    /// Process-wide options.
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Use `constructor` to create new scaffolds.
    pub fn constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(Options) -> Scaffold + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(constructor));
        self
    }

    pub fn observer(mut self, observer: Arc<dyn ScaffoldObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Project every discovered scaffold into `registrar` as tasks.
    pub fn task_registrar(mut self, registrar: Arc<dyn TaskRegistrar>) -> Self {
        self.registrar = Some(registrar);
        self
    }

    pub fn build(self) -> Scaffolder {
        let events = Arc::new(EventBus::new());
        for observer in self.observers {
            events.subscribe(observer);
        }
        if let Some(registrar) = self.registrar {
            events.subscribe(Arc::new(TaskProjector::new(registrar)));
        }

        let registry = Arc::new(Registry::new(Arc::clone(&events)));
        let mut resolver = Resolver::new(Arc::clone(&registry), Arc::clone(&events));
        if let Some(constructor) = self.constructor {
            resolver = resolver.with_constructor(constructor);
        }
        let resolver = Arc::new(resolver);
        let executor = Executor::new(Arc::clone(&resolver), self.processor);

        debug!(observers = events.len(), "Scaffolder built");
        Scaffolder {
            options: self.options,
            events,
            registry,
            resolver,
            executor,
        }
    }
}
