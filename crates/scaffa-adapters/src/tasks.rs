//! In-memory task registry.
//!
//! Tasks are keyed `scaffold:task`. Each projection replaces the scaffold's
//! whole namespace, so re-announced scaffolds never pile up duplicates and
//! removed targets do not linger.

use std::{
    collections::HashSet,
    sync::{Arc, RwLock},
};

use indexmap::IndexMap;
use tracing::{debug, instrument};

use scaffa_core::{
    application::{
        ApplicationError,
        ports::{FileProcessor, ProcessContext, TaskRegistrar},
        services::TaskDefinition,
    },
    domain::{DomainError, TaskSpec, task_spec::SEPARATOR},
    error::{ScaffaError, ScaffaResult},
};

/// Thread-safe store of projected tasks, in registration order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRegistry {
    inner: Arc<RwLock<IndexMap<String, TaskDefinition>>>,
}

impl InMemoryTaskRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry key of `task` in `scaffold`.
    pub fn qualified(scaffold: &str, task: &str) -> String {
        format!("{scaffold}{SEPARATOR}{task}")
    }

    pub fn get(&self, name: &str) -> Option<TaskDefinition> {
        self.inner.read().ok()?.get(name).cloned()
    }

    /// Every qualified task name, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|inner| inner.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Tasks registered under `scaffold`.
    pub fn tasks_for(&self, scaffold: &str) -> Vec<TaskDefinition> {
        let prefix = format!("{scaffold}{SEPARATOR}");
        self.inner
            .read()
            .map(|inner| {
                inner
                    .iter()
                    .filter(|(key, _)| key.starts_with(&prefix))
                    .map(|(_, task)| task.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Order in which `scaffold:task` and its dependencies run.
    ///
    /// Dependencies first, depth-first in declared order, each task once.
    pub fn plan(&self, spec: &str) -> ScaffaResult<Vec<TaskDefinition>> {
        let spec: TaskSpec = spec.parse()?;
        let scaffold = spec.scaffold_name();
        let root = spec.target_name().unwrap_or(scaffa_core::application::DEFAULT_TASK);

        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        let mut order = Vec::new();
        let mut done = HashSet::new();
        let mut visiting = Vec::new();
        visit(&inner, scaffold, root, &mut visiting, &mut done, &mut order)?;
        Ok(order)
    }

    /// Run `scaffold:task` after its dependencies. Returns the task names run.
    #[instrument(skip(self, processor, ctx))]
    pub async fn run(
        &self,
        spec: &str,
        processor: &dyn FileProcessor,
        ctx: &ProcessContext,
    ) -> ScaffaResult<Vec<String>> {
        let plan = self.plan(spec)?;
        let mut ran = Vec::with_capacity(plan.len());
        for task in plan {
            debug!(task = %task.name, "Running task");
            task.run(processor, ctx)
                .await
                .map_err(|err| ApplicationError::collaborator(&task.name, &err))?;
            ran.push(task.name);
        }
        Ok(ran)
    }
}

fn visit(
    tasks: &IndexMap<String, TaskDefinition>,
    scaffold: &str,
    name: &str,
    visiting: &mut Vec<String>,
    done: &mut HashSet<String>,
    order: &mut Vec<TaskDefinition>,
) -> ScaffaResult<()> {
    if done.contains(name) {
        return Ok(());
    }
    if visiting.iter().any(|n| n == name) {
        return Err(ScaffaError::Configuration {
            message: format!(
                "task dependency cycle in '{scaffold}': {} -> {name}",
                visiting.join(" -> ")
            ),
        });
    }

    let task = tasks
        .get(&InMemoryTaskRegistry::qualified(scaffold, name))
        .ok_or_else(|| DomainError::UnknownTarget {
            scaffold: scaffold.to_string(),
            target: name.to_string(),
        })?;

    visiting.push(name.to_string());
    for dependency in &task.dependencies {
        visit(tasks, scaffold, dependency, visiting, done, order)?;
    }
    visiting.pop();

    done.insert(name.to_string());
    order.push(task.clone());
    Ok(())
}

impl TaskRegistrar for InMemoryTaskRegistry {
    fn replace_tasks(&self, scaffold: &str, tasks: Vec<TaskDefinition>) -> ScaffaResult<()> {
        let prefix = format!("{scaffold}{SEPARATOR}");
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        let before = inner.len();
        inner.retain(|key, _| !key.starts_with(&prefix));
        let dropped = before - inner.len();

        for task in tasks {
            inner.insert(Self::qualified(scaffold, &task.name), task);
        }
        debug!(scaffold, dropped, "Tasks replaced");
        Ok(())
    }
}
