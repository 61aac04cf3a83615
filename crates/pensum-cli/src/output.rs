//! How command results reach the terminal, a pipe, or the renderer.
//!
//! Each handler gets an [`OutputMode`] and hands its result to
//! [`render_mode`] together with a text and a pretty writer; JSON comes for
//! free from `Serialize`.
//!
//! The mode is picked once per invocation, first match wins: `--format`,
//! then `--json`, then the `FORMAT` environment variable, then pretty on a
//! terminal and text on a pipe.

use clap::ValueEnum;
use pensum_core::ErrorCode;
use pensum_core::config::ConfigError;
use pensum_graph::GraphError;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

/// Shape of everything a command prints on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Headed sections for people.
    Pretty,
    /// One tab-separated record per line.
    Text,
    /// Pretty-printed JSON document.
    Json,
}

impl OutputMode {
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    /// Parse a `FORMAT` value; unknown values yield `None`.
    fn from_env_value(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

fn pick_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    stdout_is_tty: bool,
) -> OutputMode {
    format_flag
        .or_else(|| json_flag.then_some(OutputMode::Json))
        .or_else(|| format_env.and_then(OutputMode::from_env_value))
        .unwrap_or(if stdout_is_tty {
            OutputMode::Pretty
        } else {
            OutputMode::Text
        })
}

/// Mode for this process, from the flags and the environment.
pub fn resolve_output_mode(format_flag: Option<OutputMode>, json_flag: bool) -> OutputMode {
    let format_env = std::env::var("FORMAT").ok();
    pick_mode(
        format_flag,
        json_flag,
        format_env.as_deref(),
        io::stdout().is_terminal(),
    )
}

// ---------------------------------------------------------------------------
// Pretty helpers
// ---------------------------------------------------------------------------

const HEADING_UNDERLINE: usize = 72;

/// Heading line underlined with dashes.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}\n{}", "-".repeat(HEADING_UNDERLINE))
}

/// `Key:` padded to a fixed column, then the value.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    let key = format!("{key}:");
    writeln!(w, "{key:<12} {}", value.as_ref())
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Print `value` on stdout in `mode`.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    write_mode(&mut out, mode, value, text_fn, pretty_fn)
}

fn write_mode<T: Serialize>(
    out: &mut dyn Write,
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Pretty => pretty_fn(value, out)?,
        OutputMode::Text => text_fn(value, out)?,
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error as shown to the user: machine code, message and remediation hint.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub code: &'static str,
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}

impl CliError {
    /// Error for `code` with its table hint.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            kind: code.kind(),
            message: message.into(),
            hint: code.hint(),
        }
    }
}

impl From<&GraphError> for CliError {
    fn from(err: &GraphError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

impl From<&ConfigError> for CliError {
    fn from(err: &ConfigError) -> Self {
        Self::new(ErrorCode::ConfigParseError, err.to_string())
    }
}

/// Print `error` on stderr in `mode`.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let mut err = io::stderr().lock();
    write_error(&mut err, mode, error)
}

fn write_error(out: &mut dyn Write, mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    if mode.is_json() {
        serde_json::to_writer_pretty(&mut *out, &serde_json::json!({ "error": error }))?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "error[{}]: {}", error.code, error.message)?;
    if let Some(hint) = error.hint {
        writeln!(out, "  hint: {hint}")?;
    }
    Ok(())
}
