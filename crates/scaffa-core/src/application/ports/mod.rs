//! Application ports (traits) for external collaborators.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `scaffa-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `FileProcessor`: matches, transforms and writes a target's files
//!   - `TaskRegistrar`: receives projected tasks
//!   - `PluginHost`: tracks which capabilities are installed
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (The `Scaffolder` engine context)

pub mod output;

pub use output::{FileProcessor, FileStream, PluginHost, ProcessContext, TaskRegistrar};

#[cfg(test)]
pub use output::MockTaskRegistrar;
