//! Lifecycle events and the observer seam.
//!
//! Hosts subscribe a [`ScaffoldObserver`] to the [`EventBus`] *before*
//! triggering resolution. Every hook has a no-op default, so an observer only
//! implements what it cares about.
//!
//! Events, in the order the engine emits them:
//!
//! | Hook              | When                                                       |
//! |-------------------|------------------------------------------------------------|
//! | `on_registered`   | a raw config is stored in the registry                     |
//! | `on_scaffold`     | a scaffold is discovered (new or re-resolved)              |
//! | `on_target`       | once per target, including every target on re-resolution  |
//! | `on_files_stage`  | the file processor reports a stage for a target            |
//! | `on_file_node`    | per node of an `Expanded` stage, only if someone listens   |
//!
//! Observers are called outside the bus lock, so an observer may call back
//! into the engine.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::domain::{FileNode, FilesStage, RawScaffoldConfig, Scaffold, Target, TargetId};

/// Receives lifecycle events.
pub trait ScaffoldObserver: Send + Sync {
    fn on_registered(&self, _name: &str, _config: &RawScaffoldConfig) {}

    fn on_scaffold(&self, _scaffold: &Scaffold) {}

    /// `scaffold` is the owning scaffold's name, if it has one.
    fn on_target(&self, _scaffold: Option<&str>, _target: &Target) {}

    fn on_files_stage(&self, _stage: FilesStage, _target: &Target) {}

    fn on_file_node(&self, _node: &FileNode) {}

    /// Whether this observer listens for file nodes.
    ///
    /// File nodes are only derived when at least one observer says yes.
    fn wants_file_nodes(&self) -> bool {
        false
    }
}

/// Fan-out of lifecycle events to subscribed observers.
#[derive(Default)]
pub struct EventBus {
    observers: RwLock<Vec<Arc<dyn ScaffoldObserver>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: Arc<dyn ScaffoldObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn wants_file_nodes(&self) -> bool {
        self.snapshot().iter().any(|o| o.wants_file_nodes())
    }

    pub fn registered(&self, name: &str, config: &RawScaffoldConfig) {
        self.each(|o| o.on_registered(name, config));
    }

    pub fn scaffold(&self, scaffold: &Scaffold) {
        self.each(|o| o.on_scaffold(scaffold));
    }

    pub fn target(&self, scaffold: Option<&str>, target: &Target) {
        self.each(|o| o.on_target(scaffold, target));
    }

    pub fn files_stage(&self, stage: FilesStage, target: &Target) {
        self.each(|o| o.on_files_stage(stage, target));
    }

    pub fn file_node(&self, node: &FileNode) {
        self.each(|o| o.on_file_node(node));
    }

    fn each(&self, f: impl Fn(&dyn ScaffoldObserver)) {
        for observer in self.snapshot() {
            f(observer.as_ref());
        }
    }

    // Clone the list so no lock is held while observers run.
    fn snapshot(&self) -> Vec<Arc<dyn ScaffoldObserver>> {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.len())
            .finish()
    }
}

// ── Recording observer ───────────────────────────────────────────────────────

/// A recorded lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Registered {
        name: String,
    },
    Scaffold {
        name: Option<String>,
        targets: Vec<String>,
    },
    Target {
        scaffold: Option<String>,
        name: String,
        id: TargetId,
    },
    FilesStage {
        stage: FilesStage,
        target: String,
    },
    FileNode(FileNode),
}

/// Observer that records every event it sees.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<Event>>,
    file_nodes: bool,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// An event log that also asks for file nodes.
    pub fn with_file_nodes() -> Self {
        Self {
            events: Mutex::default(),
            file_nodes: true,
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn scaffold_count(&self) -> usize {
        self.count(|e| matches!(e, Event::Scaffold { .. }))
    }

    pub fn target_count(&self) -> usize {
        self.count(|e| matches!(e, Event::Target { .. }))
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.lock().iter().filter(|e| pred(e)).count()
    }

    fn push(&self, event: Event) {
        self.lock().push(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Event>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ScaffoldObserver for EventLog {
    fn on_registered(&self, name: &str, _config: &RawScaffoldConfig) {
        self.push(Event::Registered {
            name: name.to_string(),
        });
    }

    fn on_scaffold(&self, scaffold: &Scaffold) {
        self.push(Event::Scaffold {
            name: scaffold.name().map(str::to_string),
            targets: scaffold.target_names().map(str::to_string).collect(),
        });
    }

    fn on_target(&self, scaffold: Option<&str>, target: &Target) {
        self.push(Event::Target {
            scaffold: scaffold.map(str::to_string),
            name: target.name().to_string(),
            id: target.id(),
        });
    }

    fn on_files_stage(&self, stage: FilesStage, target: &Target) {
        self.push(Event::FilesStage {
            stage,
            target: target.name().to_string(),
        });
    }

    fn on_file_node(&self, node: &FileNode) {
        self.push(Event::FileNode(node.clone()));
    }

    fn wants_file_nodes(&self) -> bool {
        self.file_nodes
    }
}
