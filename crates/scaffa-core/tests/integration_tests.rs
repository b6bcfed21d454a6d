//! Integration tests for scaffa-core.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::{StreamExt, stream};
use serde_json::json;

use scaffa_core::{
    application::{CompletionSignal, services::execution_options},
    domain::{DomainError, options},
    prelude::*,
};

/// File processor that records targets and produces `count` files each.
#[derive(Default)]
struct FakeProcessor {
    invoked: Mutex<Vec<String>>,
    fail_on: Option<&'static str>,
}

impl FakeProcessor {
    fn failing_on(target: &'static str) -> Self {
        Self {
            fail_on: Some(target),
            ..Self::default()
        }
    }

    fn invoked(&self) -> Vec<String> {
        self.invoked.lock().unwrap().clone()
    }

    fn items(target: &Target, options: &Options) -> Vec<FileItem> {
        let count = options.get("count").and_then(|v| v.as_u64()).unwrap_or(1);
        let dest = target
            .files()
            .and_then(|f| f.dest.clone())
            .unwrap_or_default();
        (0..count)
            .map(|n| FileItem {
                target: target.name().to_string(),
                src: PathBuf::from(format!("{n}.txt")),
                dest: dest.join(format!("{n}.txt")),
                bytes: 10,
            })
            .collect()
    }
}

#[async_trait]
impl FileProcessor for FakeProcessor {
    async fn process(
        &self,
        target: &Target,
        options: &Options,
        ctx: &ProcessContext,
    ) -> ScaffaResult<()> {
        self.invoked.lock().unwrap().push(target.name().to_string());
        if self.fail_on == Some(target.name()) {
            return Err(ScaffaError::Configuration {
                message: "pattern did not compile".into(),
            });
        }

        ctx.report(FilesStage::Normalized, target, &[]);
        let nodes: Vec<FileNode> = Self::items(target, options)
            .into_iter()
            .map(|item| FileNode {
                src: vec![item.src],
                dest: item.dest,
            })
            .collect();
        ctx.report(FilesStage::Expanded, target, &nodes);
        ctx.report(FilesStage::Written, target, &[]);
        Ok(())
    }

    fn process_stream(
        &self,
        target: Arc<Target>,
        options: Options,
        _ctx: ProcessContext,
    ) -> FileStream {
        self.invoked.lock().unwrap().push(target.name().to_string());
        stream::iter(Self::items(&target, &options).into_iter().map(Ok)).boxed()
    }
}

fn with_files(src: &str, dest: &str) -> TargetDefinition {
    TargetDefinition::with_files(FilesDeclaration::new([src]).dest(dest))
}

fn count(n: u64) -> Options {
    options::from_value(json!({ "count": n })).unwrap()
}

#[test]
fn test_registered_scaffold_resolves_with_its_targets() {
    let app = Scaffolder::builder(Arc::new(FakeProcessor::default())).build();
    app.set_scaffold(
        "foo",
        PlainConfig::new()
            .target("docs", with_files("*.md", "out/docs"))
            .target("site", with_files("*.html", "out/site")),
    )
    .unwrap();

    let scaffold = app.resolve("foo", &Options::new()).unwrap();

    assert_eq!(scaffold.name(), Some("foo"));
    assert_eq!(scaffold.target_names().collect::<Vec<_>>(), vec!["docs", "site"]);
    for (name, dest) in [("docs", "out/docs"), ("site", "out/site")] {
        let target = scaffold.target(name).unwrap();
        assert_eq!(target.name(), name);
        assert_eq!(
            target.files().unwrap().dest.as_deref(),
            Some(std::path::Path::new(dest))
        );
    }
}

#[test]
fn test_anonymous_shorthand_config() {
    let app = Scaffolder::builder(Arc::new(FakeProcessor::default())).build();
    let config =
        RawScaffoldConfig::try_from(json!({"foo": {"src": "a.txt", "dest": "X", "cwd": "Y"}}))
            .unwrap();

    let scaffold = app.resolve(config, &Options::new()).unwrap();

    assert_eq!(scaffold.name(), None);
    assert_eq!(scaffold.len(), 1);
    let files = scaffold.target("foo").unwrap().files().unwrap();
    assert_eq!(files.src, vec!["a.txt"]);
    assert_eq!(files.dest, Some(PathBuf::from("X")));
    assert_eq!(files.cwd, Some(PathBuf::from("Y")));
}

#[test]
fn test_factory_sees_ambient_options() {
    let app = Scaffolder::builder(Arc::new(FakeProcessor::default())).build();
    app.set_scaffold(
        "abc",
        ScaffoldFactory::new(|opts| {
            Ok(PlainConfig::new()
                .options(opts.clone())
                .target("foo", TargetDefinition::with_files(FilesDeclaration::new(["b.txt"])))
                .into())
        }),
    )
    .unwrap();

    let scaffold = app
        .resolve("abc", &options::from_value(json!({"x": 1})).unwrap())
        .unwrap();

    assert_eq!(scaffold.options().get("x"), Some(&json!(1)));
    assert_eq!(scaffold.name(), Some("abc"));
}

#[tokio::test]
async fn test_series_fails_fast_on_kth_target() {
    let names = ["one", "two", "three", "four", "five"];
    for (k, failing) in names.iter().enumerate() {
        let processor = Arc::new(FakeProcessor::failing_on(failing));
        let app = Scaffolder::builder(processor.clone()).build();
        let config = names
            .iter()
            .fold(PlainConfig::new(), |c, n| c.target(*n, with_files("*", "out")));

        let err = app.run_series(config, &Options::new()).await.unwrap_err();

        assert_eq!(processor.invoked().len(), k + 1);
        assert_eq!(err.failed_target(), Some(*failing));
    }
}

#[tokio::test]
async fn test_generate_reports_failure_to_callback() {
    let processor = Arc::new(FakeProcessor::failing_on("b"));
    let app = Scaffolder::builder(processor.clone()).build();
    let config = PlainConfig::new()
        .target("a", with_files("*", "out"))
        .target("b", with_files("*", "out"))
        .target("c", with_files("*", "out"));

    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    app.generate(
        config,
        &Options::new(),
        Some(Box::new(move |r: ScaffaResult<RunSummary>| {
            *sink.lock().unwrap() = Some(r);
        })),
    )
    .await
    .unwrap();

    let outcome = seen.lock().unwrap().take().unwrap();
    assert_eq!(outcome.unwrap_err().failed_target(), Some("b"));
    assert_eq!(processor.invoked(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_stream_emits_sum_of_items() {
    let app = Scaffolder::builder(Arc::new(FakeProcessor::default())).build();
    let sizes = [3u64, 0, 5, 1];
    let config = sizes.iter().enumerate().fold(PlainConfig::new(), |c, (i, n)| {
        c.target(format!("t{i}"), with_files("*", "out").options(count(*n)))
    });

    let mut merged = app.run_stream(config, &Options::new()).unwrap();
    let signals = Arc::new(Mutex::new(Vec::new()));
    let sink = signals.clone();
    merged.on_completion(move |s| sink.lock().unwrap().push(s));

    let items: Vec<_> = merged.collect().await;

    assert_eq!(items.len() as u64, sizes.iter().sum::<u64>());
    assert_eq!(
        *signals.lock().unwrap(),
        vec![CompletionSignal::Finish, CompletionSignal::End]
    );
}

#[test]
fn test_canonical_resolution_is_idempotent_on_identity() {
    let app = Scaffolder::builder(Arc::new(FakeProcessor::default())).build();
    let log = Arc::new(EventLog::new());
    app.subscribe(log.clone());

    let first = app
        .resolve(PlainConfig::new().target("a", with_files("*", "out")), &Options::new())
        .unwrap();
    let second = app.resolve(first.clone(), &Options::new()).unwrap();

    assert!(first.shares_targets_with(&second));
    assert!(Arc::ptr_eq(
        first.target("a").unwrap(),
        second.target("a").unwrap()
    ));
    assert_eq!(log.target_count(), 2);
    assert_eq!(log.scaffold_count(), 2);
}

#[test]
fn test_factory_options_differ_only_by_ambient() {
    let app = Scaffolder::builder(Arc::new(FakeProcessor::default())).build();
    app.set_scaffold(
        "abc",
        ScaffoldFactory::new(|_| {
            Ok(PlainConfig::new()
                .options(options::from_value(json!({"declared": "yes"})).unwrap())
                .target("t", TargetDefinition::empty())
                .into())
        }),
    )
    .unwrap();

    let one = app
        .resolve("abc", &options::from_value(json!({"env": "dev", "shared": 1})).unwrap())
        .unwrap();
    let two = app
        .resolve("abc", &options::from_value(json!({"env": "prod", "shared": 1})).unwrap())
        .unwrap();

    assert_eq!(one.options().get("declared"), two.options().get("declared"));
    assert_eq!(one.options().get("shared"), two.options().get("shared"));
    assert_ne!(one.options().get("env"), two.options().get("env"));
}

#[tokio::test]
async fn test_file_nodes_only_reach_listeners_that_ask() {
    let app = Scaffolder::builder(Arc::new(FakeProcessor::default())).build();
    let quiet = Arc::new(EventLog::new());
    app.subscribe(quiet.clone());

    let config = PlainConfig::new().target("a", with_files("*", "out").options(count(2)));
    app.run_series(config.clone(), &Options::new()).await.unwrap();

    let stages = quiet.count(|e| matches!(e, Event::FilesStage { .. }));
    assert_eq!(stages, 3);
    assert_eq!(quiet.count(|e| matches!(e, Event::FileNode(_))), 0);

    let listening = Arc::new(EventLog::with_file_nodes());
    app.subscribe(listening.clone());
    app.run_series(config, &Options::new()).await.unwrap();
    assert_eq!(listening.count(|e| matches!(e, Event::FileNode(_))), 2);
}

#[test]
fn test_execution_options_layer_target_over_scaffold() {
    let app = Scaffolder::builder(Arc::new(FakeProcessor::default())).build();
    let scaffold = app
        .resolve(
            PlainConfig::new()
                .options(options::from_value(json!({"nested": {"a": 1, "b": 1}})).unwrap())
                .target(
                    "t",
                    TargetDefinition::empty()
                        .options(options::from_value(json!({"nested": {"b": 2}})).unwrap()),
                ),
            &Options::new(),
        )
        .unwrap();

    let merged = execution_options(&scaffold, scaffold.target("t").unwrap());
    assert_eq!(merged.get("nested"), Some(&json!({"a": 1, "b": 2})));
}

#[test]
fn test_factory_returning_name_is_rejected() {
    let app = Scaffolder::builder(Arc::new(FakeProcessor::default())).build();
    app.set_scaffold("target", PlainConfig::new()).unwrap();
    let err = app
        .resolve(
            ScaffoldFactory::new(|_| Ok(RawScaffoldConfig::from("target"))),
            &Options::new(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ScaffaError::Domain(DomainError::InvalidConfig(_))
    ));
}
