//! CLI settings.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns these settings; the core crate never sees them. Scaffold
//! definitions live in the manifest, not here.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables `SCAFFA_CLI__<SECTION>__<KEY>`
//! 3. Settings file (`--config`, or the per-user config directory)
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

/// Default manifest file name.
pub const DEFAULT_MANIFEST: &str = "scaffa.toml";

const ENV_PREFIX: &str = "SCAFFA_CLI";

/// CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Manifest to load when `--manifest` is not given.
    pub manifest: PathBuf,
    /// Directory relative paths resolve against; the current one if unset.
    pub root: Option<PathBuf>,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            root: None,
            output: OutputConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load settings, starting from defaults.
    ///
    /// An explicit `config_file` must exist. The per-user settings file is
    /// read only if present.
    pub fn load(config_file: Option<&PathBuf>) -> CliResult<Self> {
        let file = match config_file {
            Some(path) => File::from(path.as_path()).required(true),
            None => File::from(Self::config_path().as_path()).required(false),
        };
        Self::build(file, Environment::with_prefix(ENV_PREFIX).separator("__"))
    }

    fn build(
        file: File<config::FileSourceFile, config::FileFormat>,
        env: Environment,
    ) -> CliResult<Self> {
        Config::builder()
            .add_source(file)
            .add_source(env)
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|source| CliError::Settings {
                message: source.to_string(),
                source,
            })
    }

    /// Path to the per-user settings file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.scaffa-cli.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "scaffa", "scaffa")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".scaffa-cli.toml"))
    }

    /// The working root: `--root`, else the configured root, else `.`.
    pub fn root(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.root.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// The manifest path: `--manifest`, else the configured one, under `root`.
    pub fn manifest_path(&self, flag: Option<&Path>, root: &Path) -> PathBuf {
        let manifest = flag.unwrap_or(&self.manifest);
        if manifest.is_absolute() {
            manifest.to_path_buf()
        } else {
            root.join(manifest)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn no_env() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .source(Some(config::Map::new()))
    }

    #[test]
    fn default_manifest_is_scaffa_toml() {
        assert_eq!(AppConfig::default().manifest, PathBuf::from("scaffa.toml"));
        assert!(!AppConfig::default().output.no_color);
    }

    #[test]
    fn settings_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cli.toml");
        fs::write(&path, "manifest = \"build/site.toml\"\n[output]\nno_color = true\n").unwrap();

        let cfg = AppConfig::build(File::from(path.as_path()), no_env()).unwrap();
        assert_eq!(cfg.manifest, PathBuf::from("build/site.toml"));
        assert!(cfg.output.no_color);
        assert_eq!(cfg.root, None);
    }

    #[test]
    fn environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cli.toml");
        fs::write(&path, "manifest = \"a.toml\"\n").unwrap();

        let env = Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .source(Some(
                [("SCAFFA_CLI__MANIFEST".to_string(), "b.toml".to_string())]
                    .into_iter()
                    .collect(),
            ));
        let cfg = AppConfig::build(File::from(path.as_path()), env).unwrap();
        assert_eq!(cfg.manifest, PathBuf::from("b.toml"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = AppConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, CliError::Settings { .. }));
    }

    #[test]
    fn manifest_path_resolves_under_root() {
        let cfg = AppConfig::default();
        let root = cfg.root(Some(Path::new("proj")));
        assert_eq!(root, PathBuf::from("proj"));
        assert_eq!(
            cfg.manifest_path(None, &root),
            PathBuf::from("proj/scaffa.toml")
        );
        assert_eq!(
            cfg.manifest_path(Some(Path::new("other.toml")), &root),
            PathBuf::from("proj/other.toml")
        );
    }

    #[test]
    fn config_path_is_not_empty() {
        assert!(!AppConfig::config_path().as_os_str().is_empty());
    }
}
