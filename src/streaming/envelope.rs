use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Per-line transport prefix used by SSE-style framing
pub const DATA_PREFIX: &str = "data:";

/// Completion marker some transports send before closing the channel
pub const DONE_SENTINEL: &str = "[DONE]";

/// One line of the stream, e.g. `{"message": "...", "done": false}`
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    message: Option<Value>,
}

/// The `message` field of a decoded envelope
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A text fragment, possibly a JSON-looking array with unquoted keys
    Text(String),
    /// An already structured array
    Array(Vec<Value>),
    /// Anything else (object, number, bool)
    Other,
}

impl From<Value> for Message {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Message::Text(text),
            Value::Array(items) => Message::Array(items),
            _ => Message::Other,
        }
    }
}

/// Strip framing noise from a raw line.
///
/// Returns `None` for blank lines, a bare `data:` prefix and the `[DONE]`
/// sentinel. With `require_data_prefix` set, unprefixed lines are dropped too.
pub fn normalize_line(raw: &str, require_data_prefix: bool) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let payload = match trimmed.strip_prefix(DATA_PREFIX) {
        Some(rest) => rest.trim(),
        None if require_data_prefix => return None,
        None => trimmed,
    };

    if payload.is_empty() || payload == DONE_SENTINEL {
        return None;
    }

    Some(payload)
}

/// Decode a normalized line into its `message`.
///
/// Lines that are not envelopes are skipped. With `lenient` set, a line
/// shaped like `{"message":"..."}` or `{"message":"...","done":false}`
/// whose string body is not properly escaped still yields the text between
/// the outer quotes. Whitespace around the separators is allowed.
pub fn decode_envelope(text: &str, lenient: bool) -> Option<Message> {
    match serde_json::from_str::<Envelope>(text) {
        Ok(envelope) => envelope.message.map(Message::from),
        Err(e) => {
            if lenient && let Some(raw) = recover_message(text) {
                debug!(error = %e, "recovered message from malformed envelope");
                return Some(Message::Text(raw));
            }
            debug!(error = %e, line = text, "skipping line that is not an envelope");
            None
        }
    }
}

fn recover_message(text: &str) -> Option<String> {
    let rest = text.strip_prefix('{')?.trim_start();
    let rest = rest.strip_prefix("\"message\"")?.trim_start();
    let rest = rest.strip_prefix(':')?.trim_start();
    let rest = rest.trim_end().strip_suffix('}')?.trim_end();
    let rest = strip_done_field(rest).unwrap_or(rest);
    let body = rest.strip_prefix('"')?.strip_suffix('"')?;

    match serde_json::from_str::<String>(&format!("\"{}\"", body)) {
        Ok(unescaped) => Some(unescaped),
        Err(_) => Some(body.to_string()),
    }
}

/// Drop a trailing `, "done": <bool>` member
fn strip_done_field(rest: &str) -> Option<&str> {
    let rest = rest
        .strip_suffix("true")
        .or_else(|| rest.strip_suffix("false"))?
        .trim_end();
    let rest = rest.strip_suffix(':')?.trim_end();
    let rest = rest.strip_suffix("\"done\"")?.trim_end();
    rest.strip_suffix(',').map(str::trim_end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_skips_noise() {
        assert_eq!(normalize_line("", false), None);
        assert_eq!(normalize_line("   \t", false), None);
        assert_eq!(normalize_line("data:", false), None);
        assert_eq!(normalize_line("data:   ", false), None);
        assert_eq!(normalize_line("data: [DONE]", false), None);
        assert_eq!(normalize_line("[DONE]", false), None);
    }

    #[test]
    fn test_normalize_strips_prefix() {
        assert_eq!(
            normalize_line("  data: {\"message\":\"x\"}\r", false),
            Some("{\"message\":\"x\"}")
        );
        assert_eq!(normalize_line("{\"a\":1}", false), Some("{\"a\":1}"));
    }

    #[test]
    fn test_normalize_requires_prefix() {
        assert_eq!(normalize_line("{\"message\":\"x\"}", true), None);
        assert_eq!(
            normalize_line("data:{\"message\":\"x\"}", true),
            Some("{\"message\":\"x\"}")
        );
    }

    #[test]
    fn test_decode_string_message() {
        let message = decode_envelope(r#"{"message":"hello","done":false}"#, false);
        assert_eq!(message, Some(Message::Text("hello".to_string())));
    }

    #[test]
    fn test_decode_array_message() {
        let message = decode_envelope(r#"{"message":[{"name":"사과"}]}"#, false);
        assert_eq!(message, Some(Message::Array(vec![json!({"name": "사과"})])));
    }

    #[test]
    fn test_decode_other_message() {
        assert_eq!(
            decode_envelope(r#"{"message":{"a":1}}"#, false),
            Some(Message::Other)
        );
    }

    #[test]
    fn test_decode_without_message() {
        assert_eq!(decode_envelope(r#"{"event":"ping"}"#, false), None);
        assert_eq!(decode_envelope(r#"{"message":null}"#, false), None);
    }

    #[test]
    fn test_decode_non_envelope() {
        assert_eq!(decode_envelope("heartbeat", true), None);
        assert_eq!(decode_envelope("[1,2,3]", true), None);
        assert_eq!(decode_envelope(r#"{"message":"unterminated"#, true), None);
    }

    #[test]
    fn test_lenient_recovery() {
        let line = r#"{"message":"[{name:"사과"}]"}"#;
        assert_eq!(decode_envelope(line, false), None);
        assert_eq!(
            decode_envelope(line, true),
            Some(Message::Text(r#"[{name:"사과"}]"#.to_string()))
        );
    }

    #[test]
    fn test_lenient_recovery_with_done_field() {
        let line = r#"{"message":"[{name:"사과"}]","done":false}"#;
        assert_eq!(
            decode_envelope(line, true),
            Some(Message::Text(r#"[{name:"사과"}]"#.to_string()))
        );

        let spaced = r#"{ "message" : "[{name:"배"}]" , "done" : true }"#;
        assert_eq!(
            decode_envelope(spaced, true),
            Some(Message::Text(r#"[{name:"배"}]"#.to_string()))
        );
    }

    #[test]
    fn test_lenient_recovery_keeps_unknown_trailer() {
        let line = r#"{"message":"a "quoted" word","id":7}"#;
        assert_eq!(decode_envelope(line, true), None);
    }
}
