//! Command-line grammar of `scaffa`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;

pub mod global;
pub use global::{ColorChoice, GlobalArgs};

#[derive(Debug, Parser)]
#[command(
    name    = "scaffa",
    bin_name = "scaffa",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{26a1} Declarative file scaffolds",
    long_about = "Scaffa loads named scaffolds from a manifest and runs their \
                  targets, copying and transforming files into place.",
    after_help = "EXAMPLES:\n\
        \x20 scaffa init\n\
        \x20 scaffa run site\n\
        \x20 scaffa run site:docs --dry-run\n\
        \x20 scaffa run site --stream -o title=Docs\n\
        \x20 scaffa list site",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run scaffolds or single targets.
    #[command(
        visible_alias = "r",
        about = "Run scaffolds or targets",
        after_help = "EXAMPLES:\n\
            \x20 scaffa run site            # every target of 'site'\n\
            \x20 scaffa run site:docs       # only the 'docs' target\n\
            \x20 scaffa run site blog:feed  # several specs, in order"
    )]
    Run(RunArgs),

    /// List the tasks projected from the manifest.
    #[command(
        visible_alias = "ls",
        about = "List scaffold tasks",
        after_help = "EXAMPLES:\n\
            \x20 scaffa list\n\
            \x20 scaffa list site\n\
            \x20 scaffa list --format json"
    )]
    List(ListArgs),

    /// Write a sample manifest.
    #[command(
        about = "Create a sample scaffa.toml",
        after_help = "EXAMPLES:\n\
            \x20 scaffa init\n\
            \x20 scaffa init --force\n\
            \x20 scaffa -m build/scaffa.toml init"
    )]
    Init(InitArgs),

    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 scaffa completions bash > ~/.local/share/bash-completion/completions/scaffa\n\
            \x20 scaffa completions zsh  > ~/.zfunc/_scaffa\n\
            \x20 scaffa completions fish > ~/.config/fish/completions/scaffa.fish"
    )]
    Completions(CompletionsArgs),
}

/// Arguments for `scaffa run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// `scaffold` or `scaffold:target`.
    #[arg(value_name = "SPEC", required = true, num_args = 1..)]
    pub specs: Vec<String>,

    /// Print each file as soon as it is written, targets interleaved.
    #[arg(long = "stream", help = "Stream files from all targets at once")]
    pub stream: bool,

    /// Resolve and expand, but write nothing.
    #[arg(long = "dry-run", help = "Show what would be written without writing")]
    pub dry_run: bool,

    /// Directory relative paths are resolved against.
    #[arg(
        short = 'C',
        long = "root",
        value_name = "DIR",
        help = "Working directory for sources and destinations"
    )]
    pub root: Option<PathBuf>,

    /// Extra options, layered over the manifest's.
    #[arg(
        short = 'o',
        long = "option",
        value_name = "KEY=VALUE",
        value_parser = parse_option,
        help = "Set an option (repeatable); values are parsed as JSON when possible"
    )]
    pub options: Vec<(String, Value)>,
}

/// Parse `key=value`. The value is JSON if it parses, a string otherwise.
pub fn parse_option(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty option key in '{raw}'"));
    }
    let value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Arguments for `scaffa list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only list tasks of this scaffold.
    #[arg(value_name = "SCAFFOLD", help = "Filter by scaffold")]
    pub scaffold: Option<String>,

    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// How `scaffa list` prints tasks.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListFormat {
    /// Tasks with their dependencies, grouped under a heading.
    Table,
    /// One qualified task name per line.
    List,
    /// One object per task.
    Json,
}

/// Arguments for `scaffa init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing manifest.
    #[arg(short = 'f', long = "force", help = "Overwrite existing manifest")]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum, help = "Shell to print a completion script for")]
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::json;

    #[test]
    fn parse_run_command() {
        let cli = Cli::parse_from(["scaffa", "run", "site", "blog:feed", "--dry-run"]);
        let Commands::Run(args) = cli.command else {
            panic!("expected Run command");
        };
        assert_eq!(args.specs, vec!["site", "blog:feed"]);
        assert!(args.dry_run);
        assert!(!args.stream);
    }

    #[test]
    fn run_requires_a_spec() {
        assert!(Cli::try_parse_from(["scaffa", "run"]).is_err());
    }

    #[test]
    fn options_parse_as_json_or_string() {
        let cli = Cli::parse_from([
            "scaffa", "run", "site", "-o", "count=3", "-o", "title=My Site", "-o", "dot=true",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("expected Run command");
        };
        assert_eq!(
            args.options,
            vec![
                ("count".to_string(), json!(3)),
                ("title".to_string(), json!("My Site")),
                ("dot".to_string(), json!(true)),
            ]
        );
    }

    #[test]
    fn malformed_option_is_rejected() {
        assert!(parse_option("novalue").is_err());
        assert!(parse_option("=x").is_err());
        assert_eq!(parse_option("k=").unwrap(), ("k".to_string(), json!("")));
    }

    #[test]
    fn global_manifest_flag_after_subcommand() {
        let cli = Cli::parse_from(["scaffa", "list", "-m", "other.toml"]);
        assert_eq!(cli.global.manifest, Some(PathBuf::from("other.toml")));
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["scaffa", "--quiet", "--verbose", "list"]);
        assert!(result.is_err());
    }
}
