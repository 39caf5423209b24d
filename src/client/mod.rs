//! Blocking HTTP client for chat-completion latency tests.
//!
//! One [`LatencyClient`] is constructed per worker thread and reused across
//! the sequential model tests it runs. A model test never returns an error
//! across its boundary: every transport, HTTP-status, or decode failure is
//! folded into a failed [`TestResult`] so the runner can simply move on to
//! the next model.

pub mod stream;

use crate::config::Config;
use crate::report::{TestResult, ThinkingMode};
use serde::Serialize;
use std::fmt;
use std::io::{BufRead, BufReader};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};
use ureq::Agent;

/// Errors from the models-listing endpoint.
///
/// Per-model test failures never surface as errors; this type exists for
/// [`LatencyClient::fetch_models`], whose failure leaves the model list
/// unchanged and is reported to the user as-is.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be completed (DNS, connect, TLS, I/O).
    #[error("request failed: {0}")]
    Transport(String),
    /// The server answered with a non-success HTTP status.
    #[error("HTTP status {0}")]
    Status(u16),
    /// The response body was not the expected JSON shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
    /// The response parsed but contained no model identifiers.
    #[error("no model identifiers found in response")]
    NoModels,
}

/// Anything that can run one latency test against one model.
///
/// The runner is written against this trait so tests can drive it with a
/// stub instead of a live endpoint.
pub trait ModelTester: Send {
    /// Run one latency test against `model` and report the outcome.
    fn test_model(
        &self,
        model: &str,
        message: &str,
        system_prompt: Option<&str>,
        thinking: ThinkingMode,
    ) -> TestResult;
}

/// Client for one vendor chat-completion API, authenticated by bearer token.
pub struct LatencyClient {
    agent: Agent,
    base_url: String,
    models_url: String,
    auth: String,
    temperature: f32,
    max_tokens: u32,
}

// The bearer token stays out of Debug output.
impl fmt::Debug for LatencyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LatencyClient")
            .field("base_url", &self.base_url)
            .field("models_url", &self.models_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking: Option<Thinking>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct Thinking {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// What a consumed stream produced: the first-fragment latency (if any
/// fragment arrived) and the accumulated response text.
#[derive(Debug, Default)]
struct StreamOutcome {
    first_token: Option<Duration>,
    text: String,
}

impl LatencyClient {
    /// Create a client from an API key and the endpoint configuration.
    #[must_use]
    pub fn new(api_key: &str, config: &Config) -> Self {
        let agent_config = ureq::config::Config::builder()
            .timeout_connect(Some(Duration::from_secs(config.connect_timeout_secs)))
            .timeout_global(Some(Duration::from_secs(config.request_timeout_secs)))
            .build();
        Self {
            agent: agent_config.new_agent(),
            base_url: config.base_url.clone(),
            models_url: config.models_url.clone(),
            auth: format!("Bearer {api_key}"),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Issue one streaming chat-completion request and measure it.
    ///
    /// Records first-token time on the first non-empty fragment (reasoning
    /// text counts, concatenated before content within the same event) and
    /// total time on stream exhaustion. Failures of any kind yield a failed
    /// result; this method never panics or returns early past the one-model
    /// boundary.
    #[must_use]
    pub fn run_test(
        &self,
        model: &str,
        message: &str,
        system_prompt: Option<&str>,
        thinking: ThinkingMode,
    ) -> TestResult {
        let mut messages = Vec::with_capacity(2);
        if let Some(prompt) = system_prompt.filter(|p| !p.trim().is_empty()) {
            messages.push(ChatMessage {
                role: "system",
                content: prompt,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: message,
        });

        let request = ChatRequest {
            model,
            messages,
            stream: true,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            // `auto` is the vendor default; only send an explicit override.
            thinking: match thinking {
                ThinkingMode::Auto => None,
                mode => Some(Thinking { kind: mode.label() }),
            },
        };

        debug!(model, "starting latency test");
        let start = Instant::now();

        let response = match self
            .agent
            .post(&self.base_url)
            .header("Authorization", self.auth.as_str())
            .send_json(&request)
        {
            Ok(response) => response,
            Err(ureq::Error::StatusCode(status)) => {
                warn!(model, status, "chat completion rejected");
                return TestResult::failure(model, format!("HTTP status {status}"));
            }
            Err(err) => {
                warn!(model, error = %err, "chat completion request failed");
                return TestResult::failure(model, format!("request failed: {err}"));
            }
        };

        let reader = BufReader::new(response.into_body().into_reader());
        match consume_stream(reader, start) {
            Ok(outcome) => {
                let total = start.elapsed();
                let total_ms = u64::try_from(total.as_millis()).unwrap_or(u64::MAX);
                let chars = outcome.text.chars().count();
                debug!(model, total_ms, chars, "latency test finished");
                TestResult::success(model, outcome.first_token, total, &outcome.text)
            }
            Err(err) => {
                warn!(model, error = %err, "stream aborted");
                TestResult::failure(model, format!("stream aborted: {err}"))
            }
        }
    }

    /// Query the models-listing endpoint and extract model identifiers.
    ///
    /// Accepts an object carrying a `data`, `models`, or `model_infos`
    /// array, or a bare array; entries may be plain strings or objects with
    /// an `id`, `model`, or `model_id` field.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or HTTP failure, on a non-JSON body,
    /// or when no identifier can be extracted from the response.
    pub fn fetch_models(&self) -> Result<Vec<String>, ClientError> {
        let response = match self
            .agent
            .get(&self.models_url)
            .header("Authorization", self.auth.as_str())
            .call()
        {
            Ok(response) => response,
            Err(ureq::Error::StatusCode(status)) => return Err(ClientError::Status(status)),
            Err(err) => return Err(ClientError::Transport(err.to_string())),
        };

        let body: serde_json::Value = response
            .into_body()
            .read_json()
            .map_err(|err| ClientError::Decode(err.to_string()))?;

        extract_model_ids(&body)
    }
}

impl ModelTester for LatencyClient {
    fn test_model(
        &self,
        model: &str,
        message: &str,
        system_prompt: Option<&str>,
        thinking: ThinkingMode,
    ) -> TestResult {
        self.run_test(model, message, system_prompt, thinking)
    }
}

/// Drain a streamed response body line by line, recording the elapsed time
/// at the first non-empty fragment and accumulating all text.
///
/// An I/O error mid-stream discards everything gathered so far; the caller
/// turns it into a failed result with no timings.
fn consume_stream<R: BufRead>(reader: R, start: Instant) -> std::io::Result<StreamOutcome> {
    let mut outcome = StreamOutcome::default();

    for line in reader.lines() {
        let line = line?;
        match stream::parse_line(&line) {
            stream::Line::Skip => {}
            stream::Line::Done => break,
            stream::Line::Data(payload) => {
                let Some(chunk) = stream::Chunk::parse(payload) else {
                    continue;
                };
                let fragment = chunk.text();
                if fragment.is_empty() {
                    continue;
                }
                if outcome.first_token.is_none() {
                    outcome.first_token = Some(start.elapsed());
                }
                outcome.text.push_str(&fragment);
            }
        }
    }

    Ok(outcome)
}

/// Pull model identifiers out of a models-listing response body.
fn extract_model_ids(body: &serde_json::Value) -> Result<Vec<String>, ClientError> {
    let entries = if let Some(array) = body.as_array() {
        array.as_slice()
    } else {
        ["data", "models", "model_infos"]
            .iter()
            .find_map(|key| body.get(key).and_then(serde_json::Value::as_array))
            .map(Vec::as_slice)
            .ok_or_else(|| ClientError::Decode("response carries no model array".to_string()))?
    };

    let ids: Vec<String> = entries
        .iter()
        .filter_map(|entry| {
            if let Some(id) = entry.as_str() {
                return Some(id.to_string());
            }
            ["id", "model", "model_id"]
                .iter()
                .find_map(|key| entry.get(key).and_then(serde_json::Value::as_str))
                .map(str::to_string)
        })
        .collect();

    if ids.is_empty() {
        return Err(ClientError::NoModels);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use proptest::test_runner::TestCaseError;
    use std::io::{Cursor, Read};

    fn test_config(server_url: &str) -> Config {
        Config {
            base_url: format!("{server_url}/api/v3/chat/completions"),
            models_url: format!("{server_url}/api/v3/models"),
            ..Config::default()
        }
    }

    fn sse_body(fragments: &[&str]) -> String {
        let mut body = String::new();
        for fragment in fragments {
            body.push_str(&format!(
                "data: {{\"choices\":[{{\"delta\":{{\"content\":\"{fragment}\"}}}}]}}\n\n"
            ));
        }
        body.push_str("data: [DONE]\n");
        body
    }

    #[test]
    fn test_streaming_success() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/v3/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_body(sse_body(&["Hello", ", ", "world"]))
            .create();

        let client = LatencyClient::new("test-key", &test_config(&server.url()));
        let result = client.run_test("m1", "hi", None, ThinkingMode::Auto);
        mock.assert();

        assert!(result.success, "unexpected failure: {:?}", result.error);
        assert_eq!(result.response_length, 12);
        assert_eq!(result.preview, "Hello, world");
        let (Some(first), Some(total)) = (result.first_token_time, result.total_time) else {
            panic!("success result missing timings");
        };
        assert!(first <= total);
    }

    #[test]
    fn test_reasoning_concatenated_before_content() {
        let mut server = mockito::Server::new();
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"reasoning_content\":\"mull \",\"content\":\"over\"}}]}\n",
            "data: [DONE]\n",
        );
        let mock = server
            .mock("POST", "/api/v3/chat/completions")
            .with_status(200)
            .with_body(body)
            .create();

        let client = LatencyClient::new("k", &test_config(&server.url()));
        let result = client.run_test("m1", "hi", None, ThinkingMode::Enabled);
        mock.assert();

        assert!(result.success);
        assert_eq!(result.preview, "mull over");
    }

    #[test]
    fn test_single_shot_response_accepted() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/v3/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"whole reply"}}]}"#)
            .create();

        let client = LatencyClient::new("k", &test_config(&server.url()));
        let result = client.run_test("m1", "hi", None, ThinkingMode::Auto);
        mock.assert();

        assert!(result.success);
        assert_eq!(result.preview, "whole reply");
        // A complete message counts as a single fragment, so the first-token
        // time is the parse time of the whole body.
        assert_eq!(result.response_length, 11);
        assert!(result.first_token_time.is_some());
    }

    #[test]
    fn test_system_prompt_goes_first() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/v3/chat/completions")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"messages":[{"role":"system","content":"be terse"},{"role":"user","content":"hi"}],"stream":true}"#.to_string(),
            ))
            .with_status(200)
            .with_body(sse_body(&["ok"]))
            .create();

        let client = LatencyClient::new("k", &test_config(&server.url()));
        let result = client.run_test("m1", "hi", Some("be terse"), ThinkingMode::Auto);
        mock.assert();
        assert!(result.success);
    }

    #[test]
    fn test_thinking_mode_serialized_when_explicit() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/v3/chat/completions")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"thinking":{"type":"disabled"}}"#.to_string(),
            ))
            .with_status(200)
            .with_body(sse_body(&["ok"]))
            .create();

        let client = LatencyClient::new("k", &test_config(&server.url()));
        let result = client.run_test("m1", "hi", None, ThinkingMode::Disabled);
        mock.assert();
        assert!(result.success);
    }

    #[test]
    fn test_http_error_becomes_failed_result() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/v3/chat/completions")
            .with_status(401)
            .create();

        let client = LatencyClient::new("bad-key", &test_config(&server.url()));
        let result = client.run_test("m1", "hi", None, ThinkingMode::Auto);
        mock.assert();

        assert!(!result.success);
        assert!(result.first_token_time.is_none());
        assert!(result.total_time.is_none());
        let Some(error) = result.error else {
            panic!("failed result missing error");
        };
        assert!(error.contains("401"), "unexpected error: {error}");
    }

    #[test]
    fn test_connection_failure_becomes_failed_result() {
        // Nothing listens on port 1.
        let client = LatencyClient::new("k", &test_config("http://127.0.0.1:1"));
        let result = client.run_test("m1", "hi", None, ThinkingMode::Auto);
        assert!(!result.success);
        assert!(result.error.is_some());
        assert!(result.total_time.is_none());
    }

    /// A reader that yields its buffer, then fails, to simulate a transport
    /// error mid-stream.
    struct FailingReader {
        data: Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.data.read(buf)?;
            if n > 0 {
                Ok(n)
            } else {
                Err(std::io::Error::other("connection reset mid-stream"))
            }
        }
    }

    #[test]
    fn test_mid_stream_error_discards_partial_output() {
        let reader = FailingReader {
            data: Cursor::new(
                b"data: {\"choices\":[{\"delta\":{\"content\":\"partial\"}}]}\n".to_vec(),
            ),
        };
        let outcome = consume_stream(BufReader::new(reader), Instant::now());
        assert!(outcome.is_err());
    }

    #[test]
    fn test_zero_fragment_stream_has_no_first_token() -> std::io::Result<()> {
        let body = "data: {\"choices\":[{\"delta\":{}}]}\ndata: [DONE]\n";
        let outcome = consume_stream(Cursor::new(body), Instant::now())?;
        assert!(outcome.first_token.is_none());
        assert!(outcome.text.is_empty());
        Ok(())
    }

    #[test]
    fn test_non_json_lines_skipped() -> std::io::Result<()> {
        let body = ": keep-alive\ndata: garbage\ndata: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\ndata: [DONE]\n";
        let outcome = consume_stream(Cursor::new(body), Instant::now())?;
        assert_eq!(outcome.text, "x");
        Ok(())
    }

    proptest! {
        /// Any stream with at least one non-empty fragment yields a first
        /// token time and accumulates every fragment in order.
        #[test]
        fn prop_nonempty_stream_sets_first_token(
            fragments in proptest::collection::vec("[a-z]{1,8}", 1..20)
        ) {
            let refs: Vec<&str> = fragments.iter().map(String::as_str).collect();
            let body = sse_body(&refs);
            let start = Instant::now();
            let outcome = consume_stream(Cursor::new(body), start)
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert!(outcome.first_token.is_some());
            prop_assert!(outcome.first_token.unwrap_or_default() <= start.elapsed());
            prop_assert_eq!(outcome.text, fragments.concat());
        }
    }

    mod fetch_models {
        use super::*;
        use pretty_assertions::assert_eq;

        fn client_for(server: &mockito::Server) -> LatencyClient {
            LatencyClient::new("k", &test_config(&server.url()))
        }

        #[test]
        fn test_data_array_of_objects() -> Result<(), ClientError> {
            let mut server = mockito::Server::new();
            let mock = server
                .mock("GET", "/api/v3/models")
                .match_header("authorization", "Bearer k")
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(r#"{"data":[{"id":"m-a"},{"id":"m-b"}]}"#)
                .create();

            let models = client_for(&server).fetch_models()?;
            mock.assert();
            assert_eq!(models, vec!["m-a".to_string(), "m-b".to_string()]);
            Ok(())
        }

        #[test]
        fn test_bare_array_of_strings() -> Result<(), ClientError> {
            let mut server = mockito::Server::new();
            let mock = server
                .mock("GET", "/api/v3/models")
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(r#"["m-a","m-b"]"#)
                .create();

            let models = client_for(&server).fetch_models()?;
            mock.assert();
            assert_eq!(models, vec!["m-a".to_string(), "m-b".to_string()]);
            Ok(())
        }

        #[test]
        fn test_model_infos_with_mixed_keys() -> Result<(), ClientError> {
            let mut server = mockito::Server::new();
            let mock = server
                .mock("GET", "/api/v3/models")
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(
                    r#"{"model_infos":[{"model_id":"m-a"},{"model":"m-b"},"m-c",{"name":"ignored"}]}"#,
                )
                .create();

            let models = client_for(&server).fetch_models()?;
            mock.assert();
            assert_eq!(
                models,
                vec!["m-a".to_string(), "m-b".to_string(), "m-c".to_string()]
            );
            Ok(())
        }

        #[test]
        fn test_no_extractable_ids_is_explicit_error() {
            let mut server = mockito::Server::new();
            let mock = server
                .mock("GET", "/api/v3/models")
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(r#"{"data":[{"name":"no id here"}]}"#)
                .create();

            let result = client_for(&server).fetch_models();
            mock.assert();
            assert!(matches!(result, Err(ClientError::NoModels)));
        }

        #[test]
        fn test_missing_array_is_decode_error() {
            let mut server = mockito::Server::new();
            let mock = server
                .mock("GET", "/api/v3/models")
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(r#"{"ok":true}"#)
                .create();

            let result = client_for(&server).fetch_models();
            mock.assert();
            assert!(matches!(result, Err(ClientError::Decode(_))));
        }

        #[test]
        fn test_server_error_status() {
            let mut server = mockito::Server::new();
            let mock = server.mock("GET", "/api/v3/models").with_status(500).create();

            let result = client_for(&server).fetch_models();
            mock.assert();
            assert!(matches!(result, Err(ClientError::Status(500))));
        }
    }
}
