//! Flags accepted by every subcommand.

use std::path::PathBuf;

use clap::{ArgAction, Args, ValueEnum};

#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// More log output on stderr.
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true,
        help = "Log more (-v info, -vv debug, -vvv trace)"
    )]
    pub verbose: u8,

    /// Only errors are printed.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Print errors only"
    )]
    pub quiet: bool,

    /// When to color output. `NO_COLOR` turns `auto` off.
    #[arg(
        long = "color",
        global = true,
        value_enum,
        value_name = "WHEN",
        default_value_t = ColorChoice::Auto,
        help = "Color output: auto, always or never"
    )]
    pub color: ColorChoice,

    #[arg(
        short = 'c',
        long = "config",
        global = true,
        value_name = "FILE",
        help = "CLI settings file"
    )]
    pub config: Option<PathBuf>,

    /// Scaffold manifest to load instead of the configured one.
    #[arg(
        short = 'm',
        long = "manifest",
        global = true,
        value_name = "FILE",
        help = "Scaffold manifest (default: scaffa.toml)"
    )]
    pub manifest: Option<PathBuf>,

    /// One JSON document on stdout instead of status lines.
    #[arg(long = "json", global = true, help = "Print results as JSON")]
    pub json: bool,
}

impl GlobalArgs {
    /// Log level for the scaffa crates. `--quiet` wins over `-v`.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Color terminals unless `NO_COLOR` or the settings file say otherwise.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Whether a stream gets ANSI codes.
    ///
    /// `disabled` carries the `NO_COLOR` and settings-file switches and only
    /// matters for `auto`.
    pub fn enabled(self, tty: bool, disabled: bool) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => tty && !disabled,
        }
    }
}

/// `NO_COLOR` set to a non-empty value (<https://no-color.org>).
pub fn no_color_env() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
}
