//! Executor - drives the file processor over a scaffold's targets.
//!
//! Two strategies:
//!
//! - **series**: targets in key order, one at a time, fail-fast.
//! - **stream**: every target at once, fanned into one [`MergedStream`].
//!
//! Targets without a files declaration are acknowledged and skipped in both.

use std::sync::Arc;

use futures::{StreamExt, TryStreamExt};
use tracing::{debug, info, instrument, trace, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{FileProcessor, ProcessContext},
        services::{merge::MergedStream, resolver::Resolver},
    },
    domain::{Options, RawScaffoldConfig, Scaffold, Target, options},
    error::{ScaffaError, ScaffaResult},
};

/// Options a target is processed with: scaffold options under target options.
pub fn execution_options(scaffold: &Scaffold, target: &Target) -> Options {
    options::merge_all([scaffold.options(), target.options()])
}

/// Outcome of a sequential run, in visit order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Targets handed to the file processor.
    pub processed: Vec<String>,
    /// Targets without files.
    pub skipped: Vec<String>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.processed.len() + self.skipped.len()
    }
}

pub struct Executor {
    resolver: Arc<Resolver>,
    processor: Arc<dyn FileProcessor>,
}

impl Executor {
    pub fn new(resolver: Arc<Resolver>, processor: Arc<dyn FileProcessor>) -> Self {
        Self {
            resolver,
            processor,
        }
    }

    pub fn processor(&self) -> &Arc<dyn FileProcessor> {
        &self.processor
    }

    /// Resolve `config` and process its targets one after another.
    ///
    /// Stops at the first failing target; the error names that target.
    /// Files written by earlier targets are left in place.
    #[instrument(skip_all)]
    pub async fn run_series(
        &self,
        config: impl Into<RawScaffoldConfig>,
        ambient: &Options,
    ) -> ScaffaResult<RunSummary> {
        let scaffold = self.resolver.resolve(config, ambient)?;
        self.series(&scaffold, scaffold.targets()).await
    }

    /// Process `targets` of an already resolved scaffold in the given order.
    pub async fn series<'a, I>(&self, scaffold: &Scaffold, targets: I) -> ScaffaResult<RunSummary>
    where
        I: IntoIterator<Item = &'a Arc<Target>>,
    {
        let ctx = self.context(scaffold);
        let mut summary = RunSummary::default();

        for target in targets {
            if !target.has_files() {
                trace!(target = target.name(), "No files declared, skipping");
                summary.skipped.push(target.name().to_string());
                continue;
            }

            let options = execution_options(scaffold, target);
            debug!(
                scaffold = scaffold.display_name(),
                target = target.name(),
                "Processing target"
            );

            if let Err(err) = self.processor.process(target, &options, &ctx).await {
                warn!(target = target.name(), error = %err, "Target failed, stopping run");
                return Err(ApplicationError::collaborator(target.name(), &err).into());
            }
            summary.processed.push(target.name().to_string());
        }

        info!(
            scaffold = scaffold.display_name(),
            processed = summary.processed.len(),
            skipped = summary.skipped.len(),
            "Series complete"
        );
        Ok(summary)
    }

    /// Resolve `config` and start every target as a stream source.
    #[instrument(skip_all)]
    pub fn run_stream(
        &self,
        config: impl Into<RawScaffoldConfig>,
        ambient: &Options,
    ) -> ScaffaResult<MergedStream> {
        let scaffold = self.resolver.resolve(config, ambient)?;
        Ok(self.stream(&scaffold, scaffold.targets()))
    }

    /// Fan `targets` of an already resolved scaffold into one stream.
    ///
    /// Errors on a source are rewritten as a failure of its target.
    pub fn stream<'a, I>(&self, scaffold: &Scaffold, targets: I) -> MergedStream
    where
        I: IntoIterator<Item = &'a Arc<Target>>,
    {
        let ctx = self.context(scaffold);
        let mut merged = MergedStream::new();

        for target in targets {
            if !target.has_files() {
                trace!(target = target.name(), "No files declared, skipping");
                continue;
            }

            let name = target.name().to_string();
            let source = self
                .processor
                .process_stream(
                    Arc::clone(target),
                    execution_options(scaffold, target),
                    ctx.clone(),
                )
                .map_err(move |err| {
                    ScaffaError::from(ApplicationError::collaborator(&name, &err))
                })
                .boxed();
            merged.add(source);
        }

        debug!(
            scaffold = scaffold.display_name(),
            sources = merged.remaining(),
            "Streams merged"
        );
        merged
    }

    fn context(&self, scaffold: &Scaffold) -> ProcessContext {
        ProcessContext::new(
            Arc::clone(self.resolver.events()),
            scaffold.name().map(str::to_string),
        )
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use futures::stream;
    use serde_json::json;

    use super::*;
    use crate::application::{
        EventBus,
        ports::FileStream,
        services::registry::Registry,
    };
    use crate::domain::{FileItem, FilesDeclaration, PlainConfig, TargetDefinition};

    /// Records calls; fails on targets listed in `fail`; streams `count` items.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(String, Options)>>,
        fail: Vec<&'static str>,
    }

    impl Recorder {
        fn failing(fail: Vec<&'static str>) -> Self {
            Self {
                fail,
                ..Default::default()
            }
        }

        fn called(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
        }
    }

    #[async_trait]
    impl FileProcessor for Recorder {
        async fn process(
            &self,
            target: &Target,
            options: &Options,
            _ctx: &ProcessContext,
        ) -> ScaffaResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push((target.name().to_string(), options.clone()));
            if self.fail.contains(&target.name()) {
                return Err(ScaffaError::Internal {
                    message: "disk on fire".into(),
                });
            }
            Ok(())
        }

        fn process_stream(
            &self,
            target: Arc<Target>,
            options: Options,
            _ctx: ProcessContext,
        ) -> FileStream {
            let count = options.get("count").and_then(|v| v.as_u64()).unwrap_or(1);
            let fail = self.fail.contains(&target.name());
            let name = target.name().to_string();
            stream::iter((0..count).map(move |n| {
                if fail {
                    Err(ScaffaError::Internal {
                        message: "disk on fire".into(),
                    })
                } else {
                    Ok(FileItem {
                        target: name.clone(),
                        src: format!("{n}.txt").into(),
                        dest: format!("out/{n}.txt").into(),
                        bytes: n,
                    })
                }
            }))
            .boxed()
        }
    }

    fn executor(processor: Arc<Recorder>) -> Executor {
        let events = Arc::new(EventBus::new());
        let registry = Arc::new(Registry::new(events.clone()));
        Executor::new(Arc::new(Resolver::new(registry, events)), processor)
    }

    fn files() -> TargetDefinition {
        TargetDefinition::with_files(FilesDeclaration::new(["*.txt"]))
    }

    fn config(names: &[&str]) -> PlainConfig {
        names
            .iter()
            .fold(PlainConfig::new().named("demo"), |c, n| c.target(*n, files()))
    }

    #[tokio::test]
    async fn series_visits_in_key_order() {
        let recorder = Arc::new(Recorder::default());
        let exec = executor(recorder.clone());

        let summary = exec
            .run_series(config(&["c", "a", "b"]), &Options::new())
            .await
            .unwrap();
        assert_eq!(recorder.called(), vec!["c", "a", "b"]);
        assert_eq!(summary.processed, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn series_skips_targets_without_files() {
        let recorder = Arc::new(Recorder::default());
        let exec = executor(recorder.clone());
        let config = config(&["a"]).target("meta", TargetDefinition::empty());

        let summary = exec.run_series(config, &Options::new()).await.unwrap();
        assert_eq!(recorder.called(), vec!["a"]);
        assert_eq!(summary.skipped, vec!["meta"]);
        assert_eq!(summary.total(), 2);
    }

    #[tokio::test]
    async fn series_stops_at_first_failure() {
        let recorder = Arc::new(Recorder::failing(vec!["b"]));
        let exec = executor(recorder.clone());

        let err = exec
            .run_series(config(&["a", "b", "c", "d"]), &Options::new())
            .await
            .unwrap_err();
        assert_eq!(recorder.called(), vec!["a", "b"]);
        assert_eq!(err.failed_target(), Some("b"));
    }

    #[tokio::test]
    async fn target_options_override_scaffold_options() {
        let recorder = Arc::new(Recorder::default());
        let exec = executor(recorder.clone());
        let config = PlainConfig::new()
            .options(options::from_value(json!({"a": 1, "b": 1})).unwrap())
            .target(
                "t",
                files().options(options::from_value(json!({"b": 2})).unwrap()),
            );

        exec.run_series(config, &options::from_value(json!({"c": 3})).unwrap())
            .await
            .unwrap();

        let (_, seen) = recorder.calls.lock().unwrap()[0].clone();
        assert_eq!(seen, options::from_value(json!({"c": 3, "a": 1, "b": 2})).unwrap());
    }

    #[tokio::test]
    async fn stream_emits_every_item() {
        let recorder = Arc::new(Recorder::default());
        let exec = executor(recorder);
        let config = PlainConfig::new()
            .target("a", files().options(options::from_value(json!({"count": 2})).unwrap()))
            .target("b", files().options(options::from_value(json!({"count": 3})).unwrap()))
            .target("none", TargetDefinition::empty());

        let merged = exec.run_stream(config, &Options::new()).unwrap();
        assert_eq!(merged.remaining(), 2);
        let items: Vec<_> = merged.collect().await;
        assert_eq!(items.len(), 5);
        assert!(items.iter().all(Result::is_ok));
    }

    #[tokio::test]
    async fn stream_errors_name_their_target() {
        let recorder = Arc::new(Recorder::failing(vec!["bad"]));
        let exec = executor(recorder);

        let items: Vec<_> = exec
            .run_stream(config(&["ok", "bad"]), &Options::new())
            .unwrap()
            .collect()
            .await;
        let failed: Vec<_> = items
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(|e| e.failed_target().map(str::to_string))
            .collect();
        assert_eq!(failed, vec![Some("bad".to_string())]);
        assert_eq!(items.iter().filter(|r| r.is_ok()).count(), 1);
    }

    /// Tracks how many `process` calls are running at once.
    #[derive(Default)]
    struct InFlight {
        active: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FileProcessor for InFlight {
        async fn process(
            &self,
            _target: &Target,
            _options: &Options,
            _ctx: &ProcessContext,
        ) -> ScaffaResult<()> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
            self.active.fetch_sub(1, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn process_stream(
            &self,
            _target: Arc<Target>,
            _options: Options,
            _ctx: ProcessContext,
        ) -> FileStream {
            stream::empty().boxed()
        }
    }

    #[tokio::test]
    async fn series_never_overlaps_targets() {
        let processor = Arc::new(InFlight::default());
        let events = Arc::new(EventBus::new());
        let registry = Arc::new(Registry::new(events.clone()));
        let exec = Executor::new(Arc::new(Resolver::new(registry, events)), processor.clone());

        exec.run_series(config(&["a", "b", "c", "d"]), &Options::new())
            .await
            .unwrap();
        assert_eq!(processor.calls.load(Ordering::SeqCst), 4);
        assert_eq!(processor.peak.load(Ordering::SeqCst), 1);
    }
}
