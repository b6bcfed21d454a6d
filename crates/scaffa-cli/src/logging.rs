//! Tracing subscriber for the `scaffa` binary.
//!
//! Only the binary installs a subscriber; the library crates just emit. Logs
//! go to stderr so stdout stays clean for `--json`. `RUST_LOG` replaces the
//! level derived from `-v`/`-q`.

use std::io::IsTerminal as _;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{GlobalArgs, global::no_color_env};

/// Crates whose events are shown.
const CRATES: [&str; 3] = ["scaffa", "scaffa_core", "scaffa_adapters"];

pub fn init_logging(args: &GlobalArgs) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives(args.log_level())));
    let ansi = args
        .color
        .enabled(std::io::stderr().is_terminal(), no_color_env());

    let stderr = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("a tracing subscriber is already installed: {e}"))
}

fn directives(level: &str) -> String {
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}
