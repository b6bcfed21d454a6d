//! Command handlers and the workspace they share.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use scaffa_adapters::{InMemoryTaskRegistry, LocalFileProcessor, Manifest, ManifestLoader};
use scaffa_core::{
    application::{Scaffolder, ScaffoldObserver},
    domain::{FilesStage, Target},
};

use crate::{
    cli::GlobalArgs,
    config::AppConfig,
    error::{CliError, CliResult},
};

pub mod completions;
pub mod init;
pub mod list;
pub mod run;

/// A loaded manifest wired into an engine.
pub struct Workspace {
    pub app: Scaffolder,
    pub tasks: InMemoryTaskRegistry,
    pub manifest: Manifest,
    pub root: PathBuf,
}

impl Workspace {
    /// Load the manifest and register every scaffold it declares.
    pub fn open(global: &GlobalArgs, config: &AppConfig, root: Option<&Path>) -> CliResult<Self> {
        let root = config.root(root);
        let path = config.manifest_path(global.manifest.as_deref(), &root);
        if !path.is_file() {
            return Err(CliError::ManifestNotFound { path });
        }

        let manifest = ManifestLoader::new(&path).load()?;
        let tasks = InMemoryTaskRegistry::new();
        let app = Scaffolder::builder(Arc::new(LocalFileProcessor::new(root.clone())))
            .options(manifest.options.clone())
            .observer(Arc::new(StageLogger))
            .task_registrar(Arc::new(tasks.clone()))
            .build();
        let count = manifest.register_into(&app)?;

        debug!(manifest = %path.display(), scaffolds = count, "Workspace opened");
        Ok(Self {
            app,
            tasks,
            manifest,
            root,
        })
    }

    /// Scaffold names in manifest order.
    pub fn scaffold_names(&self) -> impl Iterator<Item = &str> {
        self.manifest.scaffolds.keys().map(String::as_str)
    }
}

/// Logs processor stages so `-v` shows progress.
struct StageLogger;

impl ScaffoldObserver for StageLogger {
    fn on_files_stage(&self, stage: FilesStage, target: &Target) {
        info!(target_name = target.name(), %stage, "Files stage");
    }
}
