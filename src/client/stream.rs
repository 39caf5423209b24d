//! Parsing for streamed chat-completion responses.
//!
//! The vendor streams server-sent-event-style lines: an optional `data: `
//! prefix, a JSON-encoded chunk per line, and a literal `[DONE]` terminator.
//! Some deployments answer a `stream: true` request with one complete JSON
//! message instead; those are accepted as a single-fragment "stream".

use serde::Deserialize;

/// Classification of one line of the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// Blank line or SSE keep-alive; carries nothing.
    Skip,
    /// `[DONE]` terminator; the stream is complete.
    Done,
    /// A payload expected to be a JSON chunk.
    Data(&'a str),
}

/// Classify one line of the response body.
///
/// Strips the SSE `data: ` prefix when present; lines without the prefix are
/// treated as bare payloads (the vendor has been observed sending both).
#[must_use]
pub fn parse_line(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Line::Skip;
    }
    let payload = trimmed.strip_prefix("data:").map_or(trimmed, str::trim_start);
    if payload == "[DONE]" {
        return Line::Done;
    }
    Line::Data(payload)
}

/// One JSON chunk of a chat-completion response.
///
/// Covers both delta events (`choices[].delta`) and complete single-shot
/// messages (`choices[].message`). Unknown fields are ignored and every
/// field is optional so malformed chunks degrade to "no fragments" rather
/// than a decode error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Chunk {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Choice {
    #[serde(default)]
    delta: Option<Fragmentful>,
    #[serde(default)]
    message: Option<Fragmentful>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Fragmentful {
    #[serde(default)]
    reasoning_content: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl Chunk {
    /// Parse a chunk from a line payload. Non-JSON payloads are skipped
    /// (`None`), matching the tolerance of the upstream protocol.
    #[must_use]
    pub fn parse(payload: &str) -> Option<Self> {
        serde_json::from_str(payload).ok()
    }

    /// Concatenated text carried by this chunk, reasoning before content
    /// within the same event. Empty when the chunk carries no fragment.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        let Some(choice) = self.choices.first() else {
            return out;
        };
        let source = choice.delta.as_ref().or(choice.message.as_ref());
        if let Some(fragments) = source {
            if let Some(reasoning) = &fragments.reasoning_content {
                out.push_str(reasoning);
            }
            if let Some(content) = &fragments.content {
                out.push_str(content);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("", Line::Skip)]
    #[case("   ", Line::Skip)]
    #[case("data: [DONE]", Line::Done)]
    #[case("[DONE]", Line::Done)]
    #[case("data: {\"x\":1}", Line::Data("{\"x\":1}"))]
    #[case("{\"x\":1}", Line::Data("{\"x\":1}"))]
    fn test_parse_line(#[case] input: &str, #[case] expected: Line<'_>) {
        assert_eq!(parse_line(input), expected);
    }

    #[test]
    fn test_delta_content_fragment() {
        let chunk = Chunk::parse(r#"{"choices":[{"delta":{"content":"hi"}}]}"#);
        assert_eq!(chunk.map(|c| c.text()), Some("hi".to_string()));
    }

    #[test]
    fn test_reasoning_precedes_content() {
        let chunk = Chunk::parse(
            r#"{"choices":[{"delta":{"reasoning_content":"think ","content":"answer"}}]}"#,
        );
        assert_eq!(chunk.map(|c| c.text()), Some("think answer".to_string()));
    }

    #[test]
    fn test_complete_message_fallback() {
        let chunk = Chunk::parse(r#"{"choices":[{"message":{"content":"full reply"}}]}"#);
        assert_eq!(chunk.map(|c| c.text()), Some("full reply".to_string()));
    }

    #[test]
    fn test_delta_wins_over_message() {
        let chunk = Chunk::parse(
            r#"{"choices":[{"delta":{"content":"d"},"message":{"content":"m"}}]}"#,
        );
        assert_eq!(chunk.map(|c| c.text()), Some("d".to_string()));
    }

    #[test]
    fn test_empty_choices_yields_no_text() {
        let chunk = Chunk::parse(r#"{"choices":[]}"#);
        assert_eq!(chunk.map(|c| c.text()), Some(String::new()));
    }

    #[test]
    fn test_malformed_payload_is_skipped() {
        assert!(Chunk::parse("not json").is_none());
    }

    #[test]
    fn test_unknown_fields_tolerated() {
        let chunk = Chunk::parse(
            r#"{"id":"x","created":1,"choices":[{"index":0,"delta":{"role":"assistant","content":"ok"},"finish_reason":null}]}"#,
        );
        assert_eq!(chunk.map(|c| c.text()), Some("ok".to_string()));
    }
}
