//! Implementation of the `scaffa run` command.
//!
//! Each spec runs to completion before the next starts. Without `--stream`
//! targets run one after another and stop at the first failure; with it all
//! selected targets run at once and files are printed as they land.

use futures::StreamExt;
use serde_json::{Value, json};
use tracing::{info, instrument};

use scaffa_adapters::processor::DRY_RUN;
use scaffa_core::domain::Options;

use crate::{
    cli::{GlobalArgs, RunArgs},
    commands::Workspace,
    config::AppConfig,
    error::{CliResult, IntoCli},
    output::{Reporter, file_json, summary_json},
};

#[instrument(skip_all, fields(specs = args.specs.len(), stream = args.stream))]
pub fn execute(
    args: RunArgs,
    global: GlobalArgs,
    config: AppConfig,
    reporter: Reporter,
) -> CliResult<()> {
    let workspace = Workspace::open(&global, &config, args.root.as_deref())?;
    let options = call_options(&args);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .with_cli_context(|| "failed to start the async runtime")?;

    if args.dry_run {
        reporter.dry_run()?;
    }

    let mut documents = Vec::new();
    for spec in &args.specs {
        if args.stream {
            let files = runtime.block_on(stream(&workspace, spec, &options, &reporter))?;
            reporter.streamed(spec, files.len())?;
            documents.push(json!({ "spec": spec, "files": files }));
        } else {
            let summary = runtime.block_on(workspace.app.run_spec(spec, &options))?;
            reporter.summary(spec, &summary)?;
            documents.push(summary_json(spec, &summary));
        }
    }

    if reporter.is_json() {
        reporter.json(&Value::Array(documents))?;
    }
    info!("All specs finished");
    Ok(())
}

/// Options given on the command line, layered over the manifest's.
fn call_options(args: &RunArgs) -> Options {
    let mut options: Options = args.options.iter().cloned().collect();
    if args.dry_run {
        options.insert(DRY_RUN.to_string(), Value::Bool(true));
    }
    options
}

/// Drain one spec's merged stream, returning the files in arrival order.
async fn stream(
    workspace: &Workspace,
    spec: &str,
    options: &Options,
    reporter: &Reporter,
) -> CliResult<Vec<Value>> {
    let mut merged = workspace.app.stream_spec(spec, options)?;
    let mut files = Vec::new();
    while let Some(item) = merged.next().await {
        let item = item?;
        reporter.file(&item)?;
        files.push(file_json(&item));
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn run_args(argv: &[&str]) -> RunArgs {
        match Cli::parse_from(argv).command {
            Commands::Run(args) => args,
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn dry_run_sets_the_option() {
        let options = call_options(&run_args(&["scaffa", "run", "site", "--dry-run"]));
        assert_eq!(options.get(DRY_RUN), Some(&Value::Bool(true)));
    }

    #[test]
    fn later_options_win() {
        let options = call_options(&run_args(&[
            "scaffa", "run", "site", "-o", "n=1", "-o", "n=2",
        ]));
        assert_eq!(options.get("n"), Some(&Value::from(2)));
        assert!(!options.contains_key(DRY_RUN));
    }
}
