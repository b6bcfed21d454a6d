//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the engine needs from external systems.
//! The `scaffa-adapters` crate provides implementations.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::application::{EventBus, services::tasks::TaskDefinition};
use crate::domain::{FileItem, FileNode, FilesStage, Options, Target};
use crate::error::ScaffaResult;

/// Stream of produced files.
pub type FileStream = BoxStream<'static, ScaffaResult<FileItem>>;

/// Port for per-target file processing.
///
/// Implemented by:
/// - `scaffa_adapters::processor::LocalFileProcessor` (production)
/// - `scaffa_adapters::processor::MemoryFileProcessor` (testing)
///
/// ## Contract
///
/// - `process` resolves once the target is done; `Err` is a failure of that
///   target and stops a sequential run.
/// - `process_stream` yields one item per produced file and ends when the
///   target is done; an `Err` item is a failure of that target.
/// - Stages are reported through the [`ProcessContext`].
#[async_trait]
pub trait FileProcessor: Send + Sync {
    /// Process every file of `target` and resolve when finished.
    async fn process(
        &self,
        target: &Target,
        options: &Options,
        ctx: &ProcessContext,
    ) -> ScaffaResult<()>;

    /// Process `target` as a stream of produced files.
    fn process_stream(
        &self,
        target: Arc<Target>,
        options: Options,
        ctx: ProcessContext,
    ) -> FileStream;
}

/// Port receiving tasks projected from discovered scaffolds.
///
/// Implemented by:
/// - `scaffa_adapters::tasks::InMemoryTaskRegistry`
#[cfg_attr(test, mockall::automock)]
pub trait TaskRegistrar: Send + Sync {
    /// Make `tasks` the complete task set of `scaffold`.
    ///
    /// Whatever was registered for `scaffold` before is dropped, so a scaffold
    /// re-registered with fewer targets leaves no stale tasks behind.
    fn replace_tasks(&self, scaffold: &str, tasks: Vec<TaskDefinition>) -> ScaffaResult<()>;
}

/// Port onto the host's plugin registration.
///
/// Implemented by:
/// - `scaffa_adapters::plugins::PluginRegistry`
pub trait PluginHost: Send + Sync {
    /// Whether a capability named `name` is already installed.
    fn is_applied(&self, name: &str) -> bool;

    /// Record capability `name` as installed.
    fn register_capability(&self, name: &str) -> ScaffaResult<()>;
}

/// What a file processor gets to talk back to the engine.
#[derive(Debug, Clone)]
pub struct ProcessContext {
    events: Arc<EventBus>,
    scaffold: Option<String>,
}

impl ProcessContext {
    pub fn new(events: Arc<EventBus>, scaffold: Option<String>) -> Self {
        Self { events, scaffold }
    }

    /// A context whose reports go nowhere.
    pub fn detached() -> Self {
        Self::new(Arc::new(EventBus::new()), None)
    }

    /// Name of the scaffold being executed.
    pub fn scaffold(&self) -> Option<&str> {
        self.scaffold.as_deref()
    }

    /// Report that `target` reached `stage`.
    ///
    /// Always forwarded as a files-stage event. For [`FilesStage::Expanded`]
    /// each node is also forwarded as a file-node event, but only when some
    /// observer listens for file nodes.
    pub fn report(&self, stage: FilesStage, target: &Target, nodes: &[FileNode]) {
        self.events.files_stage(stage, target);
        if stage == FilesStage::Expanded && self.events.wants_file_nodes() {
            for node in nodes {
                self.events.file_node(node);
            }
        }
    }
}
