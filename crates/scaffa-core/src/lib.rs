//! Scaffa Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for Scaffa: it turns
//! scaffold configs of any shape into canonical scaffolds and drives a file
//! processor over their targets.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           scaffa-cli (host)             │
//! │     loads manifests, runs specs         │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Scaffolder (engine context)      │
//! │  Registry · Resolver · Executor · Bus   │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │       Application Ports (Traits)        │
//! │ FileProcessor · TaskRegistrar · Plugin  │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     scaffa-adapters (Infrastructure)    │
//! │  LocalFileProcessor, task registry, ... │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │ Scaffold, Target, Options, RawConfig    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scaffa_core::prelude::*;
//!
//! let app = Scaffolder::builder(processor).build();
//!
//! app.set_scaffold(
//!     "foo",
//!     PlainConfig::new()
//!         .target("docs", TargetDefinition::with_files(
//!             FilesDeclaration::new(["*.md"]).dest("out/docs"),
//!         )),
//! )?;
//!
//! let summary = app.run_series("foo", &Options::new()).await?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        Event, EventBus, EventLog, Generation, InstallOutcome, MergedStream, RunSummary,
        ScaffoldObserver, Scaffolder, ScaffolderBuilder, TaskAction, TaskDefinition,
        ports::{FileProcessor, FileStream, PluginHost, ProcessContext, TaskRegistrar},
    };
    pub use crate::domain::{
        FileItem, FileNode, FilesDeclaration, FilesStage, Options, PlainConfig,
        RawScaffoldConfig, Scaffold, ScaffoldFactory, Target, TargetDefinition, TargetId,
        TaskSpec,
    };
    pub use crate::error::{ScaffaError, ScaffaResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
