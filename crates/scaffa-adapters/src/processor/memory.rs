//! In-memory file processor for testing.

use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use futures::{StreamExt, stream};
use glob::Pattern;

use scaffa_core::{
    application::{
        ApplicationError,
        ports::{FileProcessor, FileStream, ProcessContext},
    },
    domain::{FileItem, FileNode, FilesStage, Options, Target},
    error::{ScaffaError, ScaffaResult},
};

/// In-memory sources and outputs, with an invocation log.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileProcessor {
    inner: Arc<RwLock<MemoryProcessorInner>>,
}

#[derive(Debug, Default)]
struct MemoryProcessorInner {
    sources: BTreeMap<PathBuf, String>,
    outputs: BTreeMap<PathBuf, String>,
    invocations: Vec<(String, Options)>,
    failures: HashMap<String, String>,
}

impl MemoryFileProcessor {
    /// Create a new empty processor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source file.
    pub fn with_source(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.sources.insert(path.into(), content.into());
        }
        self
    }

    /// Make every run of `target` fail with `reason`.
    pub fn fail_on(self, target: impl Into<String>, reason: impl Into<String>) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            inner.failures.insert(target.into(), reason.into());
        }
        self
    }

    /// Read an output file (testing helper).
    pub fn output(&self, path: impl AsRef<Path>) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner.outputs.get(path.as_ref()).cloned()
    }

    /// All output paths, sorted.
    pub fn outputs(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.outputs.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Targets processed so far, in call order.
    pub fn invocations(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|inner| inner.invocations.iter().map(|(t, _)| t.clone()).collect())
            .unwrap_or_default()
    }

    /// Options the `n`th invocation received.
    pub fn invocation_options(&self, n: usize) -> Option<Options> {
        let inner = self.inner.read().ok()?;
        inner.invocations.get(n).map(|(_, o)| o.clone())
    }

    /// Clear outputs and the invocation log.
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.outputs.clear();
            inner.invocations.clear();
        }
    }

    /// Log the call and expand the target's patterns against the sources.
    fn begin(
        &self,
        target: &Target,
        options: &Options,
        ctx: &ProcessContext,
    ) -> ScaffaResult<Vec<FileNode>> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner
            .invocations
            .push((target.name().to_string(), options.clone()));

        if let Some(reason) = inner.failures.get(target.name()) {
            return Err(ScaffaError::Internal {
                message: reason.clone(),
            });
        }

        let Some(files) = target.files() else {
            return Ok(Vec::new());
        };

        let cwd = files.cwd.clone().unwrap_or_default();
        let dest = files.dest.clone().unwrap_or_default();
        let includes = compile(files.includes())?;
        let excludes = compile(files.excludes())?;

        let nodes: Vec<FileNode> = inner
            .sources
            .keys()
            .filter_map(|path| {
                let relative = path.strip_prefix(&cwd).ok()?;
                let selected = includes.iter().any(|p| p.matches_path(relative));
                let excluded = excludes.iter().any(|p| p.matches_path(relative));
                (selected && !excluded).then(|| FileNode {
                    src: vec![path.clone()],
                    dest: dest.join(relative),
                })
            })
            .collect();
        drop(inner);

        ctx.report(FilesStage::Normalized, target, &[]);
        ctx.report(FilesStage::Expanded, target, &nodes);
        Ok(nodes)
    }

    fn write(&self, target: &str, node: &FileNode) -> ScaffaResult<FileItem> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        let content: String = node
            .src
            .iter()
            .filter_map(|src| inner.sources.get(src).cloned())
            .collect();
        let bytes = content.len() as u64;
        inner.outputs.insert(node.dest.clone(), content);

        Ok(FileItem {
            target: target.to_string(),
            src: node.src.first().cloned().unwrap_or_default(),
            dest: node.dest.clone(),
            bytes,
        })
    }
}

#[async_trait]
impl FileProcessor for MemoryFileProcessor {
    async fn process(
        &self,
        target: &Target,
        options: &Options,
        ctx: &ProcessContext,
    ) -> ScaffaResult<()> {
        let nodes = self.begin(target, options, ctx)?;
        for node in &nodes {
            self.write(target.name(), node)?;
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
        let nodes = match self.begin(&target, &options, &ctx) {
            Ok(nodes) => nodes,
            Err(err) => return stream::once(async move { Err(err) }).boxed(),
        };

        let items: Vec<_> = nodes
            .iter()
            .map(|node| self.write(target.name(), node))
            .collect();
        ctx.report(FilesStage::Written, &target, &[]);
        stream::iter(items).boxed()
    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use scaffa_core::domain::{FilesDeclaration, TargetDefinition};

    fn target(name: &str, files: FilesDeclaration) -> Target {
        Target::new(name, TargetDefinition::with_files(files)).unwrap()
    }

    fn processor() -> MemoryFileProcessor {
        MemoryFileProcessor::new()
            .with_source("docs/a.md", "A")
            .with_source("docs/b.md", "B")
            .with_source("docs/c.html", "C")
    }

    #[tokio::test]
    async fn copies_matches_under_dest() {
        let processor = processor();
        let target = target("docs", FilesDeclaration::new(["*.md"]).cwd("docs").dest("out"));

        processor
            .process(&target, &Options::new(), &ProcessContext::detached())
            .await
            .unwrap();

        assert_eq!(processor.output("out/a.md").as_deref(), Some("A"));
        assert_eq!(processor.outputs().len(), 2);
        assert_eq!(processor.invocations(), vec!["docs"]);
    }

    #[tokio::test]
    async fn injected_failure_is_returned() {
        let processor = processor().fail_on("docs", "boom");
        let target = target("docs", FilesDeclaration::new(["*"]));

        let err = processor
            .process(&target, &Options::new(), &ProcessContext::detached())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("boom"));
        assert!(processor.outputs().is_empty());
    }

    #[tokio::test]
    async fn stream_yields_items() {
        let processor = processor();
        let target = Arc::new(target(
            "docs",
            FilesDeclaration::new(["*", "!*.html"]).cwd("docs").dest("site"),
        ));

        let items: Vec<_> = processor
            .process_stream(target, Options::new(), ProcessContext::detached())
            .collect()
            .await;
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(Result::is_ok));
    }
}
