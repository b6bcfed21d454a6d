//! What the commands print on stdout.
//!
//! Status lines are dropped by `--quiet`. With `--json` a command prints a
//! single JSON document instead, and status lines are skipped as well.

use std::io::{self, IsTerminal};
use std::path::Path;

use console::Term;
use owo_colors::OwoColorize;
use serde_json::{Value, json};

use scaffa_core::{application::RunSummary, domain::FileItem};

use crate::cli::global::{GlobalArgs, no_color_env};
use crate::config::AppConfig;

#[derive(Debug, Clone, Copy)]
enum Tone {
    Done,
    Note,
    Warn,
}

impl Tone {
    fn glyph(self) -> &'static str {
        match self {
            Self::Done => "\u{2713}",
            Self::Note => "\u{2139}",
            Self::Warn => "\u{26a0}",
        }
    }

    fn paint(self, text: &str) -> String {
        match self {
            Self::Done => text.green().bold().to_string(),
            Self::Note => text.blue().bold().to_string(),
            Self::Warn => text.yellow().bold().to_string(),
        }
    }
}

pub struct Reporter {
    color: bool,
    quiet: bool,
    json: bool,
    term: Term,
}

impl Reporter {
    pub fn new(global: &GlobalArgs, config: &AppConfig) -> Self {
        let disabled = config.output.no_color || no_color_env();
        Self {
            color: global.color.enabled(io::stdout().is_terminal(), disabled),
            quiet: global.quiet,
            json: global.json,
            term: Term::stdout(),
        }
    }

    /// `--json` was given.
    pub fn is_json(&self) -> bool {
        self.json
    }

    fn line(&self, text: &str) -> io::Result<()> {
        if self.quiet || self.json {
            return Ok(());
        }
        self.term.write_line(text)
    }

    fn status(&self, tone: Tone, msg: &str) -> io::Result<()> {
        let glyph = if self.color {
            tone.paint(tone.glyph())
        } else {
            tone.glyph().to_string()
        };
        self.line(&format!("{glyph} {msg}"))
    }

    fn detail(&self, msg: &str) -> io::Result<()> {
        if self.color {
            self.line(&format!("    {}", msg.dimmed()))
        } else {
            self.line(&format!("    {msg}"))
        }
    }

    pub fn dry_run(&self) -> io::Result<()> {
        self.status(Tone::Note, "Dry run: nothing will be written")
    }

    /// A file produced while streaming.
    pub fn file(&self, item: &FileItem) -> io::Result<()> {
        self.detail(&format!(
            "[{}] {} -> {}",
            item.target,
            item.src.display(),
            item.dest.display()
        ))
    }

    /// End of a streamed spec.
    pub fn streamed(&self, spec: &str, files: usize) -> io::Result<()> {
        self.status(Tone::Done, &format!("{spec}: {files} file(s)"))
    }

    /// End of a sequential spec.
    pub fn summary(&self, spec: &str, summary: &RunSummary) -> io::Result<()> {
        self.status(
            Tone::Done,
            &format!("{spec}: {} target(s) processed", summary.processed.len()),
        )?;
        for target in &summary.processed {
            self.detail(target)?;
        }
        if !summary.skipped.is_empty() {
            self.status(
                Tone::Warn,
                &format!("skipped (no files): {}", summary.skipped.join(", ")),
            )?;
        }
        Ok(())
    }

    pub fn manifest_created(&self, path: &Path) -> io::Result<()> {
        self.status(Tone::Done, &format!("Manifest created at {}", path.display()))
    }

    pub fn heading(&self, text: &str) -> io::Result<()> {
        if self.color {
            self.line(&text.cyan().bold().to_string())
        } else {
            self.line(text)
        }
    }

    pub fn plain(&self, text: &str) -> io::Result<()> {
        self.line(text)
    }

    /// Pretty JSON. Written even with `--quiet` so pipes keep working.
    pub fn json(&self, value: &Value) -> io::Result<()> {
        let text = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        self.term.write_line(&text)
    }
}

/// JSON form of a streamed file.
pub fn file_json(item: &FileItem) -> Value {
    json!({
        "target": item.target,
        "src": item.src,
        "dest": item.dest,
        "bytes": item.bytes,
    })
}

/// JSON form of a sequential run.
pub fn summary_json(spec: &str, summary: &RunSummary) -> Value {
    json!({
        "spec": spec,
        "processed": summary.processed,
        "skipped": summary.skipped,
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::cli::ColorChoice;

    fn reporter(quiet: bool, json: bool) -> Reporter {
        let args = GlobalArgs {
            verbose: 0,
            quiet,
            color: ColorChoice::Never,
            config: None,
            manifest: None,
            json,
        };
        Reporter::new(&args, &AppConfig::default())
    }

    #[test]
    fn never_means_no_color() {
        assert!(!reporter(false, false).color);
    }

    #[test]
    fn status_lines_are_skipped_when_quiet_or_json() {
        let summary = RunSummary {
            processed: vec!["docs".into()],
            skipped: vec!["meta".into()],
        };
        for out in [reporter(true, false), reporter(false, true)] {
            assert!(out.summary("site", &summary).is_ok());
            assert!(out.dry_run().is_ok());
        }
        assert!(reporter(false, true).is_json());
    }

    #[test]
    fn json_is_written_in_quiet_mode() {
        assert!(reporter(true, false).json(&json!(["site:docs"])).is_ok());
    }

    #[test]
    fn file_json_carries_paths_and_size() {
        let item = FileItem {
            target: "docs".into(),
            src: PathBuf::from("intro.md"),
            dest: PathBuf::from("out/docs/intro.md"),
            bytes: 10,
        };
        assert_eq!(
            file_json(&item),
            json!({"target": "docs", "src": "intro.md", "dest": "out/docs/intro.md", "bytes": 10})
        );
    }

    #[test]
    fn summary_json_lists_both_sets() {
        let summary = RunSummary {
            processed: vec!["docs".into(), "pages".into()],
            skipped: vec![],
        };
        assert_eq!(
            summary_json("site", &summary),
            json!({"spec": "site", "processed": ["docs", "pages"], "skipped": []})
        );
    }
}
