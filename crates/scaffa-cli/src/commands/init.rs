//! `scaffa init`: write a sample manifest.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::instrument;

use scaffa_core::error::ScaffaError;

use crate::{
    cli::{GlobalArgs, InitArgs},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::Reporter,
};

const HEADER: &str = "# Scaffa manifest.\n\
# `scaffa list` shows the tasks below; `scaffa run site` runs them all.\n\n";

#[derive(Debug, Serialize)]
struct SampleManifest {
    options: IndexMap<&'static str, &'static str>,
    scaffolds: IndexMap<&'static str, IndexMap<&'static str, SampleTarget>>,
}

#[derive(Debug, Serialize)]
struct SampleTarget {
    files: SampleFiles,
}

#[derive(Debug, Serialize)]
struct SampleFiles {
    cwd: &'static str,
    src: Vec<&'static str>,
    dest: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pipeline: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<IndexMap<&'static str, bool>>,
}

/// A `site` scaffold with a `docs` and a `pages` target.
fn sample() -> SampleManifest {
    let docs = SampleTarget {
        files: SampleFiles {
            cwd: "docs",
            src: vec!["**/*.md", "!drafts/**"],
            dest: "out/docs",
            pipeline: vec!["render"],
            options: Some(IndexMap::from([("dot", true)])),
        },
    };
    let pages = SampleTarget {
        files: SampleFiles {
            cwd: "pages",
            src: vec!["*.html"],
            dest: "out",
            pipeline: vec!["render", "trim"],
            options: None,
        },
    };

    SampleManifest {
        options: IndexMap::from([("title", "My Site")]),
        scaffolds: IndexMap::from([("site", IndexMap::from([("docs", docs), ("pages", pages)]))]),
    }
}

fn render_sample() -> CliResult<String> {
    let body = toml::to_string_pretty(&sample()).map_err(|e| ScaffaError::Internal {
        message: format!("sample manifest did not serialize: {e}"),
    })?;
    Ok(format!("{HEADER}{body}"))
}

#[instrument(skip_all, fields(force = args.force))]
pub fn execute(
    args: InitArgs,
    global: GlobalArgs,
    config: AppConfig,
    reporter: Reporter,
) -> CliResult<()> {
    let root = config.root(None);
    let path = config.manifest_path(global.manifest.as_deref(), &root);

    if path.exists() && !args.force {
        return Err(CliError::ManifestExists { path });
    }

    let contents = render_sample()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_cli_context(|| {
            format!("Failed to create directory '{}'", parent.display())
        })?;
    }
    std::fs::write(&path, contents)
        .with_cli_context(|| format!("Failed to write manifest to '{}'", path.display()))?;

    reporter.manifest_created(&path)?;
    Ok(())
}
