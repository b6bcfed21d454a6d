//! Task projection - scaffolds as invokable tasks.
//!
//! For every discovered, named scaffold the [`TaskProjector`] registers one
//! task per target plus a `default` task depending on all of them, in key
//! order. It performs no file I/O itself.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    application::{
        events::ScaffoldObserver,
        ports::{FileProcessor, ProcessContext, TaskRegistrar},
        services::executor::execution_options,
    },
    domain::{DomainError, Options, Scaffold, Target},
    error::ScaffaResult,
};

/// Name of the aggregate task registered for every scaffold.
pub const DEFAULT_TASK: &str = "default";

/// What running a task does.
#[derive(Debug, Clone)]
pub enum TaskAction {
    /// Hand one target to the file processor.
    Process {
        target: Arc<Target>,
        options: Options,
    },
    /// Nothing of its own; only its dependencies run.
    Noop,
}

/// A named task with its dependencies.
#[derive(Debug, Clone)]
pub struct TaskDefinition {
    pub name: String,
    pub dependencies: Vec<String>,
    pub action: TaskAction,
}

impl TaskDefinition {
    /// Task that processes `target` with the scaffold's options merged in.
    pub fn for_target(scaffold: &Scaffold, target: &Arc<Target>) -> Self {
        Self {
            name: target.name().to_string(),
            dependencies: Vec::new(),
            action: TaskAction::Process {
                target: Arc::clone(target),
                options: execution_options(scaffold, target),
            },
        }
    }

    /// The `default` task of `scaffold`.
    pub fn aggregate(scaffold: &Scaffold) -> Self {
        Self {
            name: DEFAULT_TASK.to_string(),
            dependencies: scaffold.target_names().map(str::to_string).collect(),
            action: TaskAction::Noop,
        }
    }

    /// Run this task's own action. Dependencies are the runner's business.
    pub async fn run(
        &self,
        processor: &dyn FileProcessor,
        ctx: &ProcessContext,
    ) -> ScaffaResult<()> {
        match &self.action {
            TaskAction::Process { target, options } if target.has_files() => {
                processor.process(target, options, ctx).await
            }
            _ => Ok(()),
        }
    }
}

/// Observer that mirrors discovered scaffolds into a [`TaskRegistrar`].
pub struct TaskProjector {
    registrar: Arc<dyn TaskRegistrar>,
}

impl TaskProjector {
    pub fn new(registrar: Arc<dyn TaskRegistrar>) -> Self {
        Self { registrar }
    }

    fn project(&self, scaffold_name: &str, scaffold: &Scaffold) -> ScaffaResult<()> {
        if scaffold.target(DEFAULT_TASK).is_some() {
            return Err(DomainError::invalid_argument(
                "target",
                format!("'{DEFAULT_TASK}' names the aggregate task of scaffold '{scaffold_name}'"),
            )
            .into());
        }

        let mut tasks: Vec<_> = scaffold
            .targets()
            .map(|target| TaskDefinition::for_target(scaffold, target))
            .collect();
        tasks.push(TaskDefinition::aggregate(scaffold));

        let count = tasks.len();
        self.registrar.replace_tasks(scaffold_name, tasks)?;
        debug!(scaffold = scaffold_name, tasks = count, "Tasks projected");
        Ok(())
    }
}

impl ScaffoldObserver for TaskProjector {
    fn on_scaffold(&self, scaffold: &Scaffold) {
        let Some(name) = scaffold.name() else {
            debug!("Anonymous scaffold, no tasks projected");
            return;
        };
        if let Err(err) = self.project(name, scaffold) {
            warn!(scaffold = name, error = %err, "Failed to project tasks");
        }
    }
}

impl std::fmt::Debug for TaskProjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskProjector").finish_non_exhaustive()
    }
}
