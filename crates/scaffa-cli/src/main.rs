//! `scaffa`: load a scaffold manifest and run its scaffolds.
//!
//! Exit status is 0 on success, 2 for usage errors, 3 when a manifest,
//! scaffold or target is missing, 4 for bad settings and 1 otherwise.

use std::io::IsTerminal as _;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info, instrument};

use crate::{
    cli::{Cli, ColorChoice, Commands, global::no_color_env},
    config::AppConfig,
    error::{CliError, CliResult},
    logging::init_logging,
    output::Reporter,
};

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;

fn main() -> ExitCode {
    // Settings may come from a .env file; it is optional.
    let _ = dotenvy::dotenv();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too, with exit code 0.
            let _ = e.print();
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    if let Err(e) = init_logging(&cli.global) {
        eprintln!("scaffa: {e}");
        return ExitCode::FAILURE;
    }
    debug!(
        verbose = cli.global.verbose,
        color = ?cli.global.color,
        json = cli.global.json,
        "Arguments parsed"
    );

    let verbose = cli.global.verbose > 0;
    let color = cli.global.color;

    let config = match AppConfig::load(cli.global.config.as_ref()) {
        Ok(config) => config,
        Err(e) => return report_failure(e, color, verbose),
    };
    let reporter = Reporter::new(&cli.global, &config);

    match dispatch(cli, config, reporter) {
        Ok(()) => {
            info!("Done");
            ExitCode::SUCCESS
        }
        Err(e) => report_failure(e, color, verbose),
    }
}

#[instrument(skip_all)]
fn dispatch(cli: Cli, config: AppConfig, reporter: Reporter) -> CliResult<()> {
    match cli.command {
        Commands::Run(args) => commands::run::execute(args, cli.global, config, reporter),
        Commands::List(args) => commands::list::execute(args, cli.global, config, reporter),
        Commands::Init(args) => commands::init::execute(args, cli.global, config, reporter),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Log the failure, describe it on stderr and pick the exit status.
fn report_failure(err: CliError, color: ColorChoice, verbose: bool) -> ExitCode {
    err.log();
    let color = color.enabled(std::io::stderr().is_terminal(), no_color_env());
    eprint!("{}", err.render(color, verbose));
    ExitCode::from(err.exit_code())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn version_comes_from_the_package() {
        assert_eq!(Cli::command().get_version(), Some(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn usage_errors_exit_with_two() {
        let err = Cli::try_parse_from(["scaffa", "run"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
