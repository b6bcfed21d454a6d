//! Application services - registry, resolution, execution, projection.
//!
//! Services coordinate the domain layer and ports. Each one owns a single
//! step of "name or config in, processed targets out".

pub mod executor;
pub mod merge;
pub mod registry;
pub mod resolver;
pub mod tasks;

pub use executor::{Executor, RunSummary, execution_options};
pub use merge::{CompletionSignal, MergedStream};
pub use registry::Registry;
pub use resolver::{Resolver, ScaffoldConstructor};
pub use tasks::{DEFAULT_TASK, TaskAction, TaskDefinition, TaskProjector};
