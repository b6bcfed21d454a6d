//! Manifest loader.
//!
//! A manifest declares ambient options and named scaffolds. Any format the
//! `config` crate reads works (`scaffa.toml`, `.yaml`, `.json`).
//!
//! ```toml
//! [options]
//! title = "My site"
//!
//! [scaffolds.foo.docs]
//! files = { src = ["*.md"], dest = "out/docs" }
//!
//! [scaffolds.foo.site]
//! src = "*.html"          # shorthand: the target itself is the files block
//! dest = "out/site"
//! ```
//!
//! Environment variables prefixed `SCAFFA__` override keys, with `__` as the
//! path separator: `SCAFFA__OPTIONS__DRY_RUN=true`.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use scaffa_core::{
    application::Scaffolder,
    domain::{Options, PlainConfig},
    error::{ScaffaError, ScaffaResult},
};

/// Default manifest file stem; the extension picks the format.
pub const MANIFEST_NAME: &str = "scaffa";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "SCAFFA";

/// A parsed manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    /// Ambient options for every scaffold.
    #[serde(default)]
    pub options: Options,

    /// Raw scaffold configs by name, in file order.
    #[serde(default)]
    pub scaffolds: IndexMap<String, Value>,
}

impl Manifest {
    /// Parse every scaffold into a plain config.
    pub fn configs(&self) -> ScaffaResult<Vec<(String, PlainConfig)>> {
        self.scaffolds
            .iter()
            .map(|(name, raw)| Ok((name.clone(), PlainConfig::from_value(raw.clone())?)))
            .collect()
    }

    /// Register every scaffold into `app`. Returns how many were registered.
    #[instrument(skip_all, fields(scaffolds = self.scaffolds.len()))]
    pub fn register_into(&self, app: &Scaffolder) -> ScaffaResult<usize> {
        let configs = self.configs()?;
        for (name, config) in &configs {
            app.set_scaffold(name, config.clone())?;
        }
        info!(count = configs.len(), "Manifest scaffolds registered");
        Ok(configs.len())
    }
}

/// Reads a [`Manifest`] from a file plus environment overrides.
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    path: PathBuf,
    env: Option<config::Map<String, String>>,
}

impl ManifestLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            env: None,
        }
    }

    /// Read overrides from `vars` instead of the process environment.
    pub fn with_environment<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Find `scaffa.{toml,yaml,yml,json}` in `dir`.
    pub fn discover(dir: &Path) -> Option<Self> {
        ["toml", "yaml", "yml", "json"]
            .iter()
            .map(|ext| dir.join(format!("{MANIFEST_NAME}.{ext}")))
            .find(|candidate| candidate.is_file())
            .map(Self::new)
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> ScaffaResult<Manifest> {
        if !self.path.is_file() {
            return Err(ScaffaError::Configuration {
                message: format!("manifest not found: {}", self.path.display()),
            });
        }

        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(self.env.clone());

        let manifest: Manifest = Config::builder()
            .add_source(File::from(self.path.as_path()))
            .add_source(environment)
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| ScaffaError::Configuration {
                message: format!("failed to load {}: {e}", self.path.display()),
            })?;

        debug!(
            scaffolds = manifest.scaffolds.len(),
            options = manifest.options.len(),
            "Manifest loaded"
        );
        Ok(manifest)
    }
}
