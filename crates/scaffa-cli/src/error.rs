//! Errors of the `scaffa` binary and how they reach the user.

use std::error::Error as _;
use std::fmt::Write as _;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use thiserror::Error;

use scaffa_core::error::{ErrorCategory, ScaffaError};

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// `init` would overwrite a manifest.
    #[error("Manifest already exists at {path}")]
    ManifestExists { path: PathBuf },

    #[error("No manifest found at {path}")]
    ManifestNotFound { path: PathBuf },

    /// The CLI settings file or its environment overrides are unusable.
    #[error("Invalid CLI settings: {message}")]
    Settings {
        message: String,
        #[source]
        source: config::ConfigError,
    },

    /// Registration, resolution or a target run failed.
    #[error(transparent)]
    Core(#[from] ScaffaError),

    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Process exit status per failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Failure = 1,
    Usage = 2,
    NotFound = 3,
    Config = 4,
}

impl CliError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ManifestExists { .. } => vec![
                "Use --force to overwrite it".into(),
                "Use -m/--manifest to write somewhere else".into(),
            ],
            Self::ManifestNotFound { .. } => vec![
                "Create one with: scaffa init".into(),
                "Point at another file with -m/--manifest".into(),
            ],
            Self::Settings { .. } => vec![format!(
                "Check {} and SCAFFA_CLI__* variables",
                crate::config::AppConfig::config_path().display()
            )],
            Self::Core(err) => err.suggestions(),
            Self::Io { .. } => vec!["Check that the path exists and is writable".into()],
        }
    }

    pub fn exit(&self) -> Exit {
        match self {
            Self::ManifestExists { .. } => Exit::Usage,
            Self::ManifestNotFound { .. } => Exit::NotFound,
            Self::Settings { .. } => Exit::Config,
            Self::Core(err) => match err.category() {
                ErrorCategory::Validation => Exit::Usage,
                ErrorCategory::NotFound => Exit::NotFound,
                ErrorCategory::Configuration => Exit::Config,
                ErrorCategory::Collaborator | ErrorCategory::Internal => Exit::Failure,
            },
            Self::Io { .. } => Exit::Failure,
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit() as u8
    }

    /// The message block written to stderr.
    ///
    /// `verbose` adds the source chain and drops the hint pointing at `-v`.
    pub fn render(&self, color: bool, verbose: bool) -> String {
        let paint = |text: &str, f: fn(&str) -> String| {
            if color { f(text) } else { text.to_string() }
        };

        let mut out = String::new();
        let _ = writeln!(out, "\n{} {self}", paint("error:", |t| t.red().bold().to_string()));

        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                let _ = writeln!(out, "  caused by: {err}");
                source = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            let _ = writeln!(out, "\n{}", paint("hint:", |t| t.yellow().bold().to_string()));
            for suggestion in suggestions {
                let _ = writeln!(out, "  {suggestion}");
            }
        }

        if !verbose {
            let _ = writeln!(
                out,
                "\n{}",
                paint("Run again with --verbose for details.", |t| t.dimmed().to_string())
            );
        }
        out
    }

    pub fn log(&self) {
        match self.exit() {
            Exit::Usage | Exit::NotFound => tracing::warn!(error = %self, "Command rejected"),
            Exit::Config | Exit::Failure => tracing::error!(error = %self, "Command failed"),
        }
    }
}

/// Attach a message to an I/O failure.
pub trait IntoCli<T> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for Result<T, std::io::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| CliError::Io {
            message: f().into(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use scaffa_core::{application::ApplicationError, domain::DomainError};

    fn core(err: impl Into<ScaffaError>) -> CliError {
        CliError::Core(err.into())
    }

    #[test]
    fn exit_codes_follow_the_failure_kind() {
        let cases = [
            (
                CliError::ManifestExists {
                    path: "scaffa.toml".into(),
                },
                2,
            ),
            (
                core(DomainError::InvalidTaskSpec {
                    spec: "a:b:c".into(),
                    reason: "x".into(),
                }),
                2,
            ),
            (
                CliError::ManifestNotFound {
                    path: "scaffa.toml".into(),
                },
                3,
            ),
            (
                core(DomainError::UnknownTarget {
                    scaffold: "site".into(),
                    target: "nope".into(),
                }),
                3,
            ),
            (
                core(ScaffaError::Configuration {
                    message: "x".into(),
                }),
                4,
            ),
            (
                core(ApplicationError::CollaboratorFailure {
                    target: "docs".into(),
                    reason: "disk full".into(),
                }),
                1,
            ),
            (io::Error::other("e").into(), 1),
        ];
        for (err, code) in cases {
            assert_eq!(err.exit_code(), code, "{err}");
        }
    }

    #[test]
    fn missing_manifest_suggests_init() {
        let err = CliError::ManifestNotFound {
            path: "scaffa.toml".into(),
        };
        assert!(err.suggestions().iter().any(|s| s.contains("scaffa init")));
    }

    #[test]
    fn plain_render_has_hints_and_verbose_note() {
        let err = CliError::ManifestExists {
            path: PathBuf::from("/tmp/scaffa.toml"),
        };
        let text = err.render(false, false);
        assert!(text.contains("error: Manifest already exists at /tmp/scaffa.toml"));
        assert!(text.contains("--force"));
        assert!(text.contains("--verbose"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn verbose_render_shows_the_cause() {
        let err = Err::<(), _>(io::Error::other("disk full"))
            .with_cli_context(|| "Failed to write manifest")
            .unwrap_err();
        let text = err.render(false, true);
        assert!(text.contains("caused by: disk full"));
        assert!(!text.contains("--verbose"));
    }
}
