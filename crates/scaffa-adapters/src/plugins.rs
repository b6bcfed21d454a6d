//! In-memory plugin host.

use std::sync::{Arc, RwLock};

use indexmap::IndexSet;
use tracing::debug;

use scaffa_core::{
    application::{ApplicationError, ports::PluginHost},
    error::{ScaffaError, ScaffaResult},
};

/// Records which capabilities have been installed.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    applied: Arc<RwLock<IndexSet<String>>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installed capabilities, in installation order.
    pub fn capabilities(&self) -> Vec<String> {
        self.applied
            .read()
            .map(|applied| applied.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl PluginHost for PluginRegistry {
    fn is_applied(&self, name: &str) -> bool {
        self.applied
            .read()
            .map(|applied| applied.contains(name))
            .unwrap_or(false)
    }

    fn register_capability(&self, name: &str) -> ScaffaResult<()> {
        let mut applied = self
            .applied
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        if !applied.insert(name.to_string()) {
            return Err(ScaffaError::Configuration {
                message: format!("capability '{name}' is already registered"),
            });
        }
        debug!(capability = name, "Capability registered");
        Ok(())
    }
}
