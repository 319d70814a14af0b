//! Chat stream events
//!
//! Each line of the chat response stream is an independent JSON object
//! `{"type": "delta" | "status" | "error", "content": "..."}`. This module
//! maps those lines onto a closed Rust enum.

use serde::Deserialize;

/// One decoded chat stream event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Incremental assistant text, appended verbatim
    Delta(String),
    /// Progress narration (e.g. "Running code...", code output)
    Status(String),
    /// Failure narration from the backend
    Error(String),
}

impl StreamEvent {
    /// Text payload of the event
    pub fn content(&self) -> &str {
        match self {
            Self::Delta(c) | Self::Status(c) | Self::Error(c) => c,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: String,
}

/// Parse one stream line into an event
///
/// Returns `None` for blank lines, malformed JSON, and unknown event types.
/// Malformed lines are logged; a single bad record never aborts the stream.
///
/// # Examples
///
/// ```
/// use csvchat::stream::{parse_event, StreamEvent};
///
/// let event = parse_event(r#"{"type":"delta","content":"Hi"}"#);
/// assert_eq!(event, Some(StreamEvent::Delta("Hi".to_string())));
/// assert_eq!(parse_event("   "), None);
/// ```
pub fn parse_event(line: &str) -> Option<StreamEvent> {
    if line.trim().is_empty() {
        return None;
    }

    let raw: RawEvent = match serde_json::from_str(line) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("Dropping malformed stream record: {} ({})", e, line);
            return None;
        }
    };

    match raw.kind.as_str() {
        "delta" => Some(StreamEvent::Delta(raw.content)),
        "status" => Some(StreamEvent::Status(raw.content)),
        "error" => Some(StreamEvent::Error(raw.content)),
        other => {
            tracing::debug!("Ignoring stream event of unknown type '{}'", other);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_each_kind() {
        assert_eq!(
            parse_event(r#"{"type":"delta","content":"a"}"#),
            Some(StreamEvent::Delta("a".to_string()))
        );
        assert_eq!(
            parse_event(r#"{"type":"status","content":"Running code..."}"#),
            Some(StreamEvent::Status("Running code...".to_string()))
        );
        assert_eq!(
            parse_event(r#"{"type":"error","content":"Error: boom"}"#),
            Some(StreamEvent::Error("Error: boom".to_string()))
        );
    }

    #[test]
    fn test_blank_line_is_skipped() {
        assert_eq!(parse_event(""), None);
        assert_eq!(parse_event(" \t"), None);
    }

    #[test]
    fn test_malformed_json_is_dropped() {
        assert_eq!(parse_event(r#"{"type":"delta","content":"#), None);
        assert_eq!(parse_event("not json"), None);
    }

    #[test]
    fn test_unknown_type_is_ignored() {
        assert_eq!(parse_event(r#"{"type":"usage","content":"12 tokens"}"#), None);
    }

    #[test]
    fn test_missing_content_defaults_to_empty() {
        assert_eq!(
            parse_event(r#"{"type":"delta"}"#),
            Some(StreamEvent::Delta(String::new()))
        );
    }

    #[test]
    fn test_extra_fields_are_tolerated() {
        assert_eq!(
            parse_event(r#"{"type":"status","content":"ok","step":3}"#),
            Some(StreamEvent::Status("ok".to_string()))
        );
    }

    #[test]
    fn test_content_accessor() {
        assert_eq!(StreamEvent::Error("x".to_string()).content(), "x");
    }
}
