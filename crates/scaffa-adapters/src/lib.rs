//! Infrastructure adapters for Scaffa.
//!
//! This crate implements the ports defined in `scaffa-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod manifest;
pub mod plugins;
pub mod processor;
pub mod tasks;

// Re-export commonly used adapters
pub use manifest::{Manifest, ManifestLoader};
pub use plugins::PluginRegistry;
pub use processor::{LocalFileProcessor, MemoryFileProcessor, TransformRegistry};
pub use tasks::InMemoryTaskRegistry;
