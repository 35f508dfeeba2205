//! Shared output layer for human/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: readable text for humans, or stable JSON for scripts.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--json` flag
//! 2. `FORMAT` env var → `"human"` | `"json"`
//! 3. Default: [`OutputMode::Human`]

use deskwatch_core::source::SourceError;
use serde::Serialize;
use std::io::{self, Write};

/// The two output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Readable text output.
    Human,
    /// Machine-readable JSON (one object per invocation).
    Json,
}

impl OutputMode {
    /// Returns `true` if JSON output was requested.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Resolve the output mode from the `--json` flag and environment.
///
/// Precedence:
/// 1. `--json`
/// 2. `FORMAT` env var → `human|json`
/// 3. Default: human.
#[must_use]
pub fn resolve_output_mode(json_flag: bool) -> OutputMode {
    let env_val = std::env::var("FORMAT").ok();
    resolve_output_mode_inner(json_flag, env_val.as_deref())
}

fn resolve_output_mode_inner(json_flag: bool, format_env: Option<&str>) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    if let Some(val) = format_env {
        match val.to_lowercase().as_str() {
            "json" => return OutputMode::Json,
            "human" => return OutputMode::Human,
            _ => {} // unknown value — fall through to the default
        }
    }

    OutputMode::Human
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "missing_config", "transport_error").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Create a simple error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    /// Create an error with a suggestion and error code.
    pub fn with_details(
        message: impl Into<String>,
        suggestion: impl Into<String>,
        error_code: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            suggestion: Some(suggestion.into()),
            error_code: Some(error_code.into()),
        }
    }
}

/// Convert a [`SourceError`] into a [`CliError`] with a matching hint.
impl From<&SourceError> for CliError {
    fn from(err: &SourceError) -> Self {
        let (suggestion, error_code) = match err {
            SourceError::Transport { .. } => (
                "Check the service URL and your network connection",
                "transport_error",
            ),
            SourceError::Status {
                status: 401 | 403, ..
            } => ("Check your credentials with 'dw setup'", "auth_rejected"),
            SourceError::Status { .. } => (
                "The service rejected the request; retry later",
                "http_error",
            ),
            SourceError::Payload { .. } => (
                "The response was not the expected JSON; check the base URL",
                "bad_payload",
            ),
        };
        Self::with_details(err.to_string(), suggestion, error_code)
    }
}

/// Render a serializable value to stdout in the requested format.
///
/// In JSON mode, the value is serialized with `serde_json`. In human mode,
/// the provided `human_fn` closure is called to produce text output.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Human => {
            human_fn(value, &mut out)?;
        }
    }
    Ok(())
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Human => {
            writeln!(out, "error: {}", error.message)?;
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

/// Write the horizontal separator used between human-output blocks.
pub fn rule(w: &mut dyn Write, width: usize) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "")
}

/// Render a service timestamp as `YYYY-MM-DD HH:MM:SS` in its own offset.
///
/// Unparseable input renders verbatim; empty input renders `"Unknown"`.
#[must_use]
pub fn format_date(raw: &str) -> String {
    if raw.is_empty() {
        return "Unknown".to_string();
    }
    deskwatch_core::recency::parse_date(raw).map_or_else(
        || raw.to_string(),
        |date| date.format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

/// Truncate to `max` characters, appending an ellipsis when shortened.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    }
}
