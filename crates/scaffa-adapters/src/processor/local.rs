//! Local filesystem file processor.
//!
//! For each target:
//!
//! 1. **Normalized** - `cwd` and `dest` are resolved against the root.
//! 2. **Expanded** - `src` patterns are matched below `cwd` into file nodes.
//! 3. **Written** - every node is read, piped through its transforms and
//!    written below `dest` at the same relative path.
//!
//! `dry_run: true` in the options skips the writes but still reports sizes.

use std::{
    collections::VecDeque,
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use futures::{StreamExt, stream};
use glob::{MatchOptions, Pattern};
use tracing::{debug, instrument, trace};
use walkdir::WalkDir;

use scaffa_core::{
    application::{
        ApplicationError,
        ports::{FileProcessor, FileStream, ProcessContext},
    },
    domain::{FileItem, FileNode, FilesDeclaration, FilesStage, Options, Target, options},
    error::{ScaffaError, ScaffaResult},
};

use super::transform::{Transform, TransformRegistry};

/// Option key that turns writes off.
pub const DRY_RUN: &str = "dry_run";
/// Files option key that lets patterns match dotfiles.
pub const DOT: &str = "dot";

/// Production file processor using the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFileProcessor {
    root: PathBuf,
    transforms: Arc<TransformRegistry>,
}

/// A target after normalization and expansion.
struct Plan {
    nodes: Vec<FileNode>,
    cwd: PathBuf,
    pipeline: Vec<(String, Arc<dyn Transform>)>,
    dry_run: bool,
}

impl LocalFileProcessor {
    /// Create a processor resolving relative paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            transforms: Arc::new(TransformRegistry::with_builtins()),
        }
    }

    pub fn with_transforms(mut self, transforms: TransformRegistry) -> Self {
        self.transforms = Arc::new(transforms);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Normalize and expand `target`, reporting both stages.
    ///
    /// The directory walk runs on tokio's blocking pool.
    async fn plan(
        &self,
        target: &Target,
        options: &Options,
        ctx: &ProcessContext,
    ) -> ScaffaResult<Plan> {
        let Some(files) = target.files() else {
            return Ok(Plan {
                nodes: Vec::new(),
                cwd: self.root.clone(),
                pipeline: Vec::new(),
                dry_run: true,
            });
        };

        let cwd = self.root.join(files.cwd.as_deref().unwrap_or(Path::new(".")));
        let dest = self.root.join(files.dest.as_deref().unwrap_or(Path::new(".")));
        let pipeline = self.transforms.pipeline(&files.pipeline)?;
        ctx.report(FilesStage::Normalized, target, &[]);

        let dot = options::flag(&files.options, DOT) || options::flag(options, DOT);
        let nodes = {
            let (files, cwd, dest) = (files.clone(), cwd.clone(), dest);
            tokio::task::spawn_blocking(move || expand(&files, &cwd, &dest, dot))
                .await
                .map_err(|e| ScaffaError::Internal {
                    message: format!("pattern expansion did not finish: {e}"),
                })??
        };
        debug!(
            target = target.name(),
            cwd = %cwd.display(),
            files = nodes.len(),
            "Patterns expanded"
        );
        ctx.report(FilesStage::Expanded, target, &nodes);

        Ok(Plan {
            nodes,
            cwd,
            pipeline,
            dry_run: options::flag(options, DRY_RUN),
        })
    }

    /// Read, transform and write one node.
    async fn write(
        &self,
        target: &str,
        node: &FileNode,
        plan_cwd: &Path,
        pipeline: &[(String, Arc<dyn Transform>)],
        options: &Options,
        dry_run: bool,
    ) -> ScaffaResult<FileItem> {
        let mut contents = Vec::new();
        for src in &node.src {
            let bytes = tokio::fs::read(src)
                .await
                .map_err(|e| map_io_error(src, e, "read file"))?;
            contents.extend(bytes);
        }

        let first = node.src.first().map_or(node.dest.as_path(), PathBuf::as_path);
        let contents = self.transforms.apply(pipeline, first, contents, options)?;

        if dry_run {
            trace!(dest = %node.dest.display(), "Dry run, not writing");
        } else {
            if let Some(parent) = node.dest.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| map_io_error(parent, e, "create directory"))?;
            }
            tokio::fs::write(&node.dest, &contents)
                .await
                .map_err(|e| map_io_error(&node.dest, e, "write file"))?;
        }

        Ok(FileItem {
            target: target.to_string(),
            src: first.strip_prefix(plan_cwd).unwrap_or(first).to_path_buf(),
            dest: node.dest.clone(),
            bytes: contents.len() as u64,
        })
    }
}

impl Default for LocalFileProcessor {
    fn default() -> Self {
        Self::new(".")
    }
}

#[async_trait]
impl FileProcessor for LocalFileProcessor {
    #[instrument(skip_all, fields(target = target.name()))]
    async fn process(
        &self,
        target: &Target,
        options: &Options,
        ctx: &ProcessContext,
    ) -> ScaffaResult<()> {
        let plan = self.plan(target, options, ctx).await?;
        for node in &plan.nodes {
            self.write(
                target.name(),
                node,
                &plan.cwd,
                &plan.pipeline,
                options,
                plan.dry_run,
            )
            .await?;
        }
        ctx.report(FilesStage::Written, target, &[]);
        Ok(())
    }

    fn process_stream(
        &self,
        target: Arc<Target>,
        options: Options,
        ctx: ProcessContext,
    ) -> FileStream {
        let processor = self.clone();
        stream::once(async move {
            match processor.plan(&target, &options, &ctx).await {
                Ok(plan) => StreamState {
                    nodes: plan.nodes.into(),
                    cwd: plan.cwd,
                    pipeline: plan.pipeline,
                    dry_run: plan.dry_run,
                    processor,
                    target,
                    options,
                    ctx,
                }
                .into_stream(),
                Err(err) => stream::once(async move { Err(err) }).boxed(),
            }
        })
        .flatten()
        .boxed()
    }
}

struct StreamState {
    processor: LocalFileProcessor,
    nodes: VecDeque<FileNode>,
    cwd: PathBuf,
    pipeline: Vec<(String, Arc<dyn Transform>)>,
    dry_run: bool,
    target: Arc<Target>,
    options: Options,
    ctx: ProcessContext,
}

impl StreamState {
    /// One item per node, ending after the first error.
    fn into_stream(self) -> FileStream {
        stream::unfold(Some(self), |state| async move {
            let mut state = state?;
            let Some(node) = state.nodes.pop_front() else {
                state.ctx.report(FilesStage::Written, &state.target, &[]);
                return None;
            };
            let item = state
                .processor
                .write(
                    state.target.name(),
                    &node,
                    &state.cwd,
                    &state.pipeline,
                    &state.options,
                    state.dry_run,
                )
                .await;
            let next = item.is_ok().then_some(state);
            Some((item, next))
        })
        .boxed()
    }
}

/// Match `files.src` below `cwd`; one node per matched file.
///
/// Nodes come out sorted by path. Matching is relative to `cwd` and `*` does
/// not cross directory separators (use `**` for that). When `dest` lies below
/// `cwd` it is skipped, so earlier output is never matched again.
fn expand(
    files: &FilesDeclaration,
    cwd: &Path,
    dest: &Path,
    dot: bool,
) -> ScaffaResult<Vec<FileNode>> {
    let includes = compile(files.includes())?;
    let excludes = compile(files.excludes())?;
    let match_options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: !dot,
    };

    if !cwd.is_dir() {
        return Err(ApplicationError::FilesystemError {
            path: cwd.to_path_buf(),
            reason: "working directory does not exist".into(),
        }
        .into());
    }

    let output = dest
        .strip_prefix(cwd)
        .ok()
        .filter(|rel| !rel.as_os_str().is_empty());
    let walk = WalkDir::new(cwd).sort_by_file_name().into_iter().filter_entry(|entry| {
        match (output, entry.path().strip_prefix(cwd)) {
            (Some(output), Ok(relative)) => !relative.starts_with(output),
            _ => true,
        }
    });

    let mut nodes = Vec::new();
    for entry in walk {
        let entry = entry.map_err(|e| ApplicationError::FilesystemError {
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| cwd.to_path_buf()),
            reason: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(cwd) else {
            continue;
        };
        if !dot && is_hidden(relative) {
            continue;
        }

        let selected = includes
            .iter()
            .any(|p| p.matches_path_with(relative, match_options));
        let excluded = excludes
            .iter()
            .any(|p| p.matches_path_with(relative, match_options));
        if selected && !excluded {
            nodes.push(FileNode {
                src: vec![entry.path().to_path_buf()],
                dest: dest.join(relative),
            });
        }
    }
    Ok(nodes)
}

fn compile<'a>(patterns: impl Iterator<Item = &'a str>) -> ScaffaResult<Vec<Pattern>> {
    patterns
        .map(|p| {
            Pattern::new(p).map_err(|e| ScaffaError::Configuration {
                message: format!("invalid pattern '{p}': {e}"),
            })
        })
        .collect()
}

fn is_hidden(relative: &Path) -> bool {
    relative
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> ScaffaError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use scaffa_core::application::{EventBus, EventLog, events::Event};
    use scaffa_core::domain::TargetDefinition;

    /// Lay out `files` below a fresh temp dir.
    fn tree(files: &[(&str, &str)]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for (path, content) in files {
            let full = temp.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        temp
    }

    fn target(files: FilesDeclaration) -> Target {
        Target::new("docs", TargetDefinition::with_files(files)).unwrap()
    }

    fn listening() -> (ProcessContext, Arc<EventLog>) {
        let events = Arc::new(EventBus::new());
        let log = Arc::new(EventLog::with_file_nodes());
        events.subscribe(log.clone());
        (ProcessContext::new(events, Some("site".into())), log)
    }

    fn opts(value: serde_json::Value) -> Options {
        options::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn copies_matches_preserving_relative_paths() {
        let temp = tree(&[
            ("src/a.md", "A"),
            ("src/nested/b.md", "B"),
            ("src/c.txt", "C"),
        ]);
        let processor = LocalFileProcessor::new(temp.path());
        let target = target(FilesDeclaration::new(["**/*.md"]).cwd("src").dest("out"));

        processor
            .process(&target, &Options::new(), &ProcessContext::detached())
            .await
            .unwrap();

        assert_eq!(fs::read_to_string(temp.path().join("out/a.md")).unwrap(), "A");
        assert_eq!(
            fs::read_to_string(temp.path().join("out/nested/b.md")).unwrap(),
            "B"
        );
        assert!(!temp.path().join("out/c.txt").exists());
    }

    #[test]
    fn star_does_not_cross_directories() {
        let temp = tree(&[("a.md", ""), ("deep/b.md", "")]);
        let nodes = expand(
            &FilesDeclaration::new(["*.md"]),
            temp.path(),
            Path::new("out"),
            false,
        )
        .unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].dest, Path::new("out/a.md"));
    }

    #[test]
    fn exclusions_and_dotfiles() {
        let temp = tree(&[("a.md", ""), ("b.md", ""), (".hidden.md", "")]);
        let files = FilesDeclaration::new(["*.md", "!b.md"]);

        let without_dot = expand(&files, temp.path(), Path::new("o"), false).unwrap();
        assert_eq!(without_dot.len(), 1);

        let with_dot = expand(&files, temp.path(), Path::new("o"), true).unwrap();
        assert_eq!(with_dot.len(), 2);
    }

    #[test]
    fn dest_below_cwd_is_not_walked() {
        let temp = tree(&[("a.md", ""), ("out/a.md", ""), ("outline/b.md", "")]);
        let nodes = expand(
            &FilesDeclaration::new(["**/*"]),
            temp.path(),
            &temp.path().join("out"),
            false,
        )
        .unwrap();
        let sources: Vec<_> = nodes
            .iter()
            .map(|n| n.src[0].strip_prefix(temp.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(sources, vec![Path::new("a.md"), Path::new("outline/b.md")]);
    }

    #[tokio::test]
    async fn repeated_runs_do_not_nest_output() {
        let temp = tree(&[("a.md", "A")]);
        let processor = LocalFileProcessor::new(temp.path());
        let target = target(FilesDeclaration::new(["**/*"]).cwd(".").dest("out"));

        for _ in 0..2 {
            processor
                .process(&target, &Options::new(), &ProcessContext::detached())
                .await
                .unwrap();
        }
        assert!(temp.path().join("out/a.md").exists());
        assert!(!temp.path().join("out/out").exists());
    }

    #[test]
    fn missing_cwd_is_a_filesystem_error() {
        let temp = TempDir::new().unwrap();
        let err = expand(
            &FilesDeclaration::new(["*"]),
            &temp.path().join("nope"),
            Path::new("o"),
            false,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScaffaError::Application(ApplicationError::FilesystemError { .. })
        ));
    }

    #[tokio::test]
    async fn dry_run_writes_nothing() {
        let temp = tree(&[("a.md", "A")]);
        let processor = LocalFileProcessor::new(temp.path());
        let target = target(FilesDeclaration::new(["*.md"]).dest("out"));

        processor
            .process(&target, &opts(json!({"dry_run": true})), &ProcessContext::detached())
            .await
            .unwrap();
        assert!(!temp.path().join("out").exists());
    }

    #[tokio::test]
    async fn pipeline_renders_options() {
        let temp = tree(&[("a.md", "# {{title}}   \n")]);
        let processor = LocalFileProcessor::new(temp.path());
        let target = target(
            FilesDeclaration::new(["a.md"])
                .dest("out")
                .pipe("render")
                .pipe("trim"),
        );

        processor
            .process(&target, &opts(json!({"title": "Hello"})), &ProcessContext::detached())
            .await
            .unwrap();
        assert_eq!(
            fs::read_to_string(temp.path().join("out/a.md")).unwrap(),
            "# Hello\n"
        );
    }

    #[tokio::test]
    async fn unknown_transform_fails_before_writing() {
        let temp = tree(&[("a.md", "A")]);
        let processor = LocalFileProcessor::new(temp.path());
        let target = target(FilesDeclaration::new(["a.md"]).dest("out").pipe("minify"));

        let err = processor
            .process(&target, &Options::new(), &ProcessContext::detached())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ScaffaError::Application(ApplicationError::UnknownTransform { .. })
        ));
        assert!(!temp.path().join("out").exists());
    }

    #[tokio::test]
    async fn reports_stages_and_nodes() {
        let temp = tree(&[("a.md", "A"), ("b.md", "B")]);
        let processor = LocalFileProcessor::new(temp.path());
        let target = target(FilesDeclaration::new(["*.md"]).dest("out"));
        let (ctx, log) = listening();

        processor.process(&target, &Options::new(), &ctx).await.unwrap();

        let stages: Vec<_> = log
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::FilesStage { stage, .. } => Some(stage),
                _ => None,
            })
            .collect();
        assert_eq!(
            stages,
            vec![FilesStage::Normalized, FilesStage::Expanded, FilesStage::Written]
        );
        assert_eq!(log.count(|e| matches!(e, Event::FileNode(_))), 2);
    }

    #[tokio::test]
    async fn stream_yields_one_item_per_file() {
        let temp = tree(&[("a.md", "AA"), ("b.md", "B")]);
        let processor = LocalFileProcessor::new(temp.path());
        let target = Arc::new(target(FilesDeclaration::new(["*.md"]).dest("out")));

        let items: Vec<_> = processor
            .process_stream(target, Options::new(), ProcessContext::detached())
            .collect()
            .await;

        let items: Vec<_> = items.into_iter().map(Result::unwrap).collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].src, Path::new("a.md"));
        assert_eq!(items[0].bytes, 2);
        assert!(temp.path().join("out/b.md").exists());
    }

    #[tokio::test]
    async fn stream_surfaces_plan_errors() {
        let temp = TempDir::new().unwrap();
        let processor = LocalFileProcessor::new(temp.path());
        let target = Arc::new(target(FilesDeclaration::new(["*"]).cwd("missing")));

        let items: Vec<_> = processor
            .process_stream(target, Options::new(), ProcessContext::detached())
            .collect()
            .await;
        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
    }
}
