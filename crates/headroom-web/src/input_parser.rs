#![forbid(unsafe_code)]

//! JSON parser for host messages.
//!
//! [`parse_host_message`] accepts one JSON object posted by the embedding page
//! and returns the corresponding [`HostInput`]:
//!
//! ```json
//! {"kind":"scroll","ts_ms":16,"y":120.5}
//! {"kind":"resize","ts_ms":20,"width":1024}
//! {"kind":"route","ts_ms":30,"path":"/pricing"}
//! {"kind":"dismiss","ts_ms":40}
//! {"kind":"tick","ts_ms":300}
//! ```
//!
//! # Design
//!
//! Uses `serde_json` for robustness and is feature-gated behind
//! `input-parser`. Scroll offsets are passed through unclamped; the scroll
//! signal clamps them.

use serde::Deserialize;

use crate::HostInput;

/// Errors from parsing a host message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputParseError {
    /// Malformed JSON.
    Json(String),
    /// Missing required field.
    MissingField(&'static str),
    /// Unknown message kind.
    UnknownKind(String),
}

impl core::fmt::Display for InputParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "JSON parse error: {msg}"),
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
            Self::UnknownKind(kind) => write!(f, "unknown message kind: {kind}"),
        }
    }
}

impl std::error::Error for InputParseError {}

/// Internal deserialization target.
#[derive(Debug, Deserialize)]
struct RawMessage {
    kind: String,
    #[serde(default)]
    ts_ms: Option<u64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    path: Option<String>,
}

/// Parse one JSON host message into a [`HostInput`].
pub fn parse_host_message(json: &str) -> Result<HostInput, InputParseError> {
    let raw: RawMessage =
        serde_json::from_str(json).map_err(|e| InputParseError::Json(e.to_string()))?;
    let ts_ms = raw.ts_ms.ok_or(InputParseError::MissingField("ts_ms"))?;

    match raw.kind.as_str() {
        "scroll" => Ok(HostInput::Scroll {
            ts_ms,
            y: raw.y.ok_or(InputParseError::MissingField("y"))?,
        }),
        "resize" => Ok(HostInput::Resize {
            ts_ms,
            width_px: raw.width.ok_or(InputParseError::MissingField("width"))?,
        }),
        "route" => Ok(HostInput::Route {
            ts_ms,
            path: raw.path.ok_or(InputParseError::MissingField("path"))?,
        }),
        "dismiss" => Ok(HostInput::Dismiss { ts_ms }),
        "tick" => Ok(HostInput::Tick { ts_ms }),
        other => Err(InputParseError::UnknownKind(other.to_string())),
    }
}

/// Parse newline-delimited host messages, skipping blank lines.
///
/// Stops at the first bad line and reports its 1-based line number.
pub fn parse_host_messages(jsonl: &str) -> Result<Vec<HostInput>, (usize, InputParseError)> {
    jsonl
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| parse_host_message(line).map_err(|e| (i + 1, e)))
        .collect()
}
