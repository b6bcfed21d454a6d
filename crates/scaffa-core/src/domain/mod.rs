// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Scaffa.
//!
//! This module contains the canonical scaffold model with no I/O and no
//! observability. Resolution, execution and events live in the application
//! layer; files are touched only through ports.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **No tracing**: Observability belongs to the application layer
//! - **Shared targets**: Targets are `Arc`-shared, never duplicated on re-resolution
//!
// Public API - what the world sees
pub mod config;
pub mod entities;
pub mod error;
pub mod options;
pub mod task_spec;

// Private implementation details - not visible outside domain
mod validation;

// Re-exports for convenience
pub use config::{PlainConfig, RawScaffoldConfig, ScaffoldFactory};
pub use entities::{
    files::{FileItem, FileNode, FilesDeclaration, FilesStage},
    scaffold::Scaffold,
    target::{Target, TargetDefinition, TargetId},
};
pub use crate::error::ErrorCategory;
pub use error::DomainError;
pub use options::Options;
pub use task_spec::TaskSpec;
pub use validation::DomainValidator;
