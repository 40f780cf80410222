//! OpenAI-compatible chat-completions client.
//!
//! Speaks the `POST {base}/chat/completions` dialect, which means the relay
//! also works against any server that mimics it (vLLM, LM Studio, llama.cpp,
//! …) by pointing `CONFAB_OPENAI_BASE` somewhere else.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CompletionClient, CompletionError};
use crate::schemas::chat::ChatTurn;

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Option<Vec<Choice>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

// ── Client ───────────────────────────────────────────────────────────────────

/// HTTP client for one OpenAI-compatible endpoint.
///
/// Construction is infallible and does not touch the network; a missing or
/// wrong API key only surfaces when a completion is requested.
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String, CompletionError> {
        let request = CompletionRequest {
            model: &self.model,
            messages: turns,
        };

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Prefer the service's own error message, fall back to the raw body.
            let message = serde_json::from_str::<CompletionResponse>(&body)
                .ok()
                .and_then(|parsed| parsed.error)
                .map(|error| error.message)
                .unwrap_or(body);
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;

        // Some gateways report failures with 200 plus an `error` object.
        if let Some(error) = parsed.error {
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message: error.message,
            });
        }

        parsed
            .choices
            .and_then(|choices| choices.into_iter().next())
            .map(|choice| choice.message.content)
            .ok_or_else(|| CompletionError::Malformed("no choices in response".to_owned()))
    }
}

#[cfg(test)]
mod test {
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::db::Role;

    /// Serve `router` on an ephemeral port and return a base URL for it.
    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    fn turns() -> Vec<ChatTurn> {
        vec![
            ChatTurn {
                role: Role::User,
                content: "hello".to_owned(),
            },
            ChatTurn {
                role: Role::Assistant,
                content: "hi there".to_owned(),
            },
            ChatTurn {
                role: Role::User,
                content: "what did I just say?".to_owned(),
            },
        ]
    }

    #[test]
    fn parses_standard_response_body() {
        let body = r#"{
            "id": "chatcmpl-abc123",
            "object": "chat.completion",
            "model": "gpt-4o-2024-08-06",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "you said hello"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}
        }"#;

        let parsed: CompletionResponse = serde_json::from_str(body).unwrap();
        let content = parsed
            .choices
            .and_then(|choices| choices.into_iter().next())
            .map(|choice| choice.message.content);
        assert_eq!(content.as_deref(), Some("you said hello"));
    }

    #[test]
    fn parses_error_body() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        let parsed: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.error.map(|e| e.message).as_deref(),
            Some("Incorrect API key provided")
        );
    }

    #[tokio::test]
    async fn sends_history_and_returns_reply() {
        // Echo the last user turn back so the assertion proves the request
        // body really carried the conversation in lowercase-role form.
        let stub = Router::new().route(
            "/v1/chat/completions",
            post(|Json(body): Json<serde_json::Value>| async move {
                let last = body["messages"].as_array().unwrap().last().unwrap().clone();
                assert_eq!(body["model"], "gpt-4o");
                assert_eq!(body["messages"][0]["role"], "user");
                assert_eq!(body["messages"][1]["role"], "assistant");
                Json(json!({
                    "choices": [{
                        "message": {
                            "role": "assistant",
                            "content": format!("echo: {}", last["content"].as_str().unwrap()),
                        }
                    }]
                }))
            }),
        );
        let base = spawn_stub(stub).await;

        let client = OpenAiClient::new(base, "sk-test", "gpt-4o");
        let reply = client.complete(&turns()).await.unwrap();
        assert_eq!(reply, "echo: what did I just say?");
    }

    #[tokio::test]
    async fn surfaces_api_error_status_and_message() {
        let stub = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    axum::http::StatusCode::UNAUTHORIZED,
                    Json(json!({"error": {"message": "Incorrect API key provided"}})),
                )
            }),
        );
        let base = spawn_stub(stub).await;

        let client = OpenAiClient::new(base, "sk-bad", "gpt-4o");
        let err = client.complete(&turns()).await.unwrap_err();
        match err {
            CompletionError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejects_success_body_without_choices() {
        let stub = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({"object": "chat.completion", "choices": []})) }),
        );
        let base = spawn_stub(stub).await;

        let client = OpenAiClient::new(base, "sk-test", "gpt-4o");
        let err = client.complete(&turns()).await.unwrap_err();
        assert!(matches!(err, CompletionError::Malformed(_)));
    }

    #[test]
    fn trailing_slash_in_base_url_is_tolerated() {
        let client = OpenAiClient::new("https://api.openai.com/v1/", "sk-test", "gpt-4o");
        assert_eq!(
            client.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }
}
