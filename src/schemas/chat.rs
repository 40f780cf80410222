//! Relay API request / response types.
//!
//! `ChatTurn` is the `{role, content}` shape the completion service consumes;
//! `GET /api/context` returns exactly what would be sent upstream, which
//! makes the two views easy to diff when debugging prompts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::{Message, Role};

/// One `{role, content}` pair of the conversation, stripped of storage
/// metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatTurn {
    /// `"user"` or `"assistant"`.
    pub role: Role,
    /// The message text.
    pub content: String,
}

/// Request body for `POST /api/message`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    /// The user's message text.
    pub content: String,
}

/// Response body for `POST /api/message`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SendMessageResponse {
    /// The assistant's reply text, as returned by the completion service.
    pub reply: String,
}

/// Response body for `GET /api/context`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContextResponse {
    /// Full log projected onto `{role, content}`, oldest first.
    pub context: Vec<ChatTurn>,
}

/// A fully hydrated record in `GET /api/history`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntry {
    pub id: i64,
    /// RFC 3339 creation time.
    pub timestamp: DateTime<Utc>,
    pub role: Role,
    pub content: String,
}

/// Response body for `GET /api/history`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryResponse {
    /// Full log with storage metadata, oldest first.
    pub history: Vec<HistoryEntry>,
}

impl Message {
    pub fn to_turn(&self) -> ChatTurn {
        ChatTurn {
            role: self.role,
            content: self.content.clone(),
        }
    }

    pub fn to_entry(&self) -> HistoryEntry {
        HistoryEntry {
            id: self.id,
            timestamp: self.timestamp,
            role: self.role,
            content: self.content.clone(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn context_serializes_with_lowercase_roles() {
        let body = ContextResponse {
            context: vec![
                ChatTurn {
                    role: Role::User,
                    content: "hello".into(),
                },
                ChatTurn {
                    role: Role::Assistant,
                    content: "hi there".into(),
                },
            ],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["context"][0]["role"], "user");
        assert_eq!(json["context"][1]["role"], "assistant");
        assert_eq!(json["context"][1]["content"], "hi there");
    }

    #[test]
    fn history_entry_carries_all_four_fields() {
        let msg = Message {
            id: 7,
            timestamp: Utc::now(),
            role: Role::Assistant,
            content: "reply".into(),
        };
        let json = serde_json::to_value(msg.to_entry()).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "reply");
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn send_message_request_parses_plain_content() {
        let req: SendMessageRequest = serde_json::from_str(r#"{"content":"hello"}"#).unwrap();
        assert_eq!(req.content, "hello");
    }

    #[test]
    fn turn_projection_drops_storage_metadata() {
        let msg = Message {
            id: 3,
            timestamp: Utc::now(),
            role: Role::User,
            content: "hello".into(),
        };
        let json = serde_json::to_value(msg.to_turn()).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("timestamp").is_none());
        assert_eq!(json["role"], "user");
    }
}
