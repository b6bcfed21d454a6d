//! Application layer for Scaffa.
//!
//! This layer contains:
//! - **Engine**: the [`Scaffolder`] context and its builder
//! - **Services**: Registry, Resolver, Executor, task projection
//! - **Events**: the observer seam hosts subscribe to
//! - **Ports**: Interface definitions (traits) for external collaborators
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business rules itself. Those live in `crate::domain`.

pub mod engine;
pub mod error;
pub mod events;
pub mod ports;
pub mod services;

pub use engine::{CAPABILITY, Done, Generation, InstallOutcome, Scaffolder, ScaffolderBuilder};
pub use error::ApplicationError;
pub use events::{Event, EventBus, EventLog, ScaffoldObserver};
pub use services::{
    CompletionSignal, DEFAULT_TASK, MergedStream, Registry, Resolver, RunSummary, TaskAction,
    TaskDefinition, TaskProjector,
};

// Re-export port traits (for adapter implementation)
pub use ports::{FileProcessor, FileStream, PluginHost, ProcessContext, TaskRegistrar};
