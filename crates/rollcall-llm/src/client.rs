// Claude API streaming client using reqwest-eventsource.
//
// Sends one message to the Anthropic Messages API with `stream: true` and
// accumulates the `content_block_delta` text of the Server-Sent Events into
// a single reply.

use futures_util::StreamExt;
use reqwest_eventsource::{Event, RequestBuilderExt};
use serde_json::Value;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("failed to create event source: {0}")]
    Connect(String),

    #[error("{0}")]
    Stream(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("stream ended without any content")]
    EmptyResponse,
}

/// A finished reply with its token usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

// ---------------------------------------------------------------------------
// ClaudeClient
// ---------------------------------------------------------------------------

/// Low-level Claude API streaming client.
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    api_url: String,
}

impl ClaudeClient {
    pub fn new(api_key: String, model: String, api_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            api_url,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a message and stream the reply until `message_stop`.
    ///
    /// Returns whatever text arrived if the stream closes early after
    /// producing some content.
    pub async fn complete(
        &self,
        system: &str,
        user_content: &str,
        max_tokens: u32,
    ) -> Result<Completion, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "stream": true,
            "system": system,
            "messages": [{ "role": "user", "content": user_content }]
        });

        let request = self
            .http
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body);

        let mut es = request
            .eventsource()
            .map_err(|e| LlmError::Connect(e.to_string()))?;

        let mut completion = Completion {
            text: String::new(),
            input_tokens: 0,
            output_tokens: 0,
        };

        while let Some(event) = es.next().await {
            match event {
                Ok(Event::Open) => {
                    debug!("SSE connection opened");
                }
                Ok(Event::Message(msg)) => {
                    let data = &msg.data;
                    match msg.event.as_str() {
                        "message_start" => {
                            match parse_input_tokens(data) {
                                Some(n) => completion.input_tokens = n,
                                None => warn!("failed to parse input_tokens from message_start"),
                            }
                        }
                        "content_block_delta" => {
                            if let Some(text) = parse_delta_text(data) {
                                completion.text.push_str(&text);
                            }
                        }
                        "message_delta" => {
                            if let Some(n) = parse_output_tokens(data) {
                                completion.output_tokens = n;
                            }
                        }
                        "message_stop" => {
                            debug!(
                                input_tokens = completion.input_tokens,
                                output_tokens = completion.output_tokens,
                                "message_stop, streaming complete"
                            );
                            es.close();
                            return Ok(completion);
                        }
                        "error" => {
                            es.close();
                            let message = parse_api_error(data)
                                .unwrap_or_else(|| "unknown API error".to_string());
                            return Err(LlmError::Api(message));
                        }
                        // ping, content_block_start, content_block_stop
                        other => {
                            debug!(event_type = other, "ignoring SSE event");
                        }
                    }
                }
                Err(err) => {
                    es.close();
                    if !completion.text.is_empty() {
                        warn!(?err, "SSE stream ended early, using partial reply");
                        return Ok(completion);
                    }
                    warn!(?err, "SSE stream error");
                    return Err(LlmError::Stream(extract_error_message(&err)));
                }
            }
        }

        if completion.text.is_empty() {
            Err(LlmError::EmptyResponse)
        } else {
            Ok(completion)
        }
    }
}

// ---------------------------------------------------------------------------
// SSE JSON parsing helpers
// ---------------------------------------------------------------------------

/// Extract `input_tokens` from a `message_start` event's JSON.
///
/// Expected shape: `{ "type": "message_start", "message": { "usage": { "input_tokens": N } } }`
pub(crate) fn parse_input_tokens(data: &str) -> Option<u32> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("message")?
        .get("usage")?
        .get("input_tokens")?
        .as_u64()
        .map(|n| n as u32)
}

/// Extract `delta.text` from a `content_block_delta` event's JSON.
pub(crate) fn parse_delta_text(data: &str) -> Option<String> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("delta")?
        .get("text")?
        .as_str()
        .map(|s| s.to_string())
}

/// Extract `usage.output_tokens` from a `message_delta` event's JSON.
pub(crate) fn parse_output_tokens(data: &str) -> Option<u32> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("usage")?
        .get("output_tokens")?
        .as_u64()
        .map(|n| n as u32)
}

/// Extract `error.message` from an `error` event's JSON.
///
/// Expected shape: `{ "type": "error", "error": { "type": "overloaded_error", "message": "Overloaded" } }`
pub(crate) fn parse_api_error(data: &str) -> Option<String> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("error")?
        .get("message")?
        .as_str()
        .map(|s| s.to_string())
}

fn extract_error_message(err: &reqwest_eventsource::Error) -> String {
    match err {
        reqwest_eventsource::Error::InvalidStatusCode(status, _response) => {
            format!("API returned status {status}")
        }
        reqwest_eventsource::Error::Transport(e) => {
            format!("Network error: {e}")
        }
        other => format!("Stream error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_message_start_input_tokens() {
        let data = r#"{
            "type": "message_start",
            "message": {
                "id": "msg_01",
                "type": "message",
                "role": "assistant",
                "content": [],
                "model": "claude-sonnet-4-5-20250929",
                "usage": { "input_tokens": 87, "output_tokens": 1 }
            }
        }"#;
        assert_eq!(parse_input_tokens(data), Some(87));
    }

    #[test]
    fn parse_message_start_without_usage() {
        let data = r#"{ "type": "message_start", "message": { "id": "msg_01" } }"#;
        assert_eq!(parse_input_tokens(data), None);
        assert_eq!(parse_input_tokens("not json"), None);
    }

    #[test]
    fn parse_delta_text_extracts_fragment() {
        let data = r#"{
            "type": "content_block_delta",
            "index": 0,
            "delta": { "type": "text_delta", "text": "[\"Night" }
        }"#;
        assert_eq!(parse_delta_text(data), Some("[\"Night".to_string()));
    }

    #[test]
    fn parse_delta_text_missing_or_broken() {
        assert_eq!(parse_delta_text(r#"{ "type": "content_block_delta" }"#), None);
        assert_eq!(parse_delta_text("{broken"), None);
    }

    #[test]
    fn parse_message_delta_output_tokens() {
        let data = r#"{
            "type": "message_delta",
            "delta": { "stop_reason": "end_turn", "stop_sequence": null },
            "usage": { "output_tokens": 23 }
        }"#;
        assert_eq!(parse_output_tokens(data), Some(23));
        assert_eq!(parse_output_tokens(r#"{ "delta": {} }"#), None);
    }

    #[test]
    fn parse_error_event_message() {
        let data = r#"{ "type": "error", "error": { "type": "overloaded_error", "message": "Overloaded" } }"#;
        assert_eq!(parse_api_error(data), Some("Overloaded".to_string()));
        assert_eq!(parse_api_error(r#"{ "type": "error" }"#), None);
    }

    #[tokio::test]
    async fn empty_api_key_fails_without_request() {
        let client = ClaudeClient::new(
            String::new(),
            "claude-sonnet-4-5-20250929".into(),
            "http://127.0.0.1:9/unused".into(),
        );
        let err = client.complete("sys", "hi", 16).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }
}
