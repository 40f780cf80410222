//! Persistence layer for the conversation log.
//!
//! [`MessageStore`] defines the interface for the append-only message log.
//! The default implementation is [`sqlite::SqliteStore`].  To swap to another
//! database (Postgres, MySQL, …), implement [`MessageStore`] for your new
//! type and change the concrete type in [`crate::state::AppState`].
//!
//! All trait methods use `impl Future` in their signatures (stable since Rust
//! 1.75) so no extra `async-trait` crate is required here.

pub mod sqlite;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Author of a message in the conversation log.
///
/// Stored in SQLite as lowercase text and serialized the same way on the
/// wire, matching what the completion service expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("invalid message role: {other:?}")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single row in the `messages` table.
///
/// Messages are never updated or deleted; the log only grows.
#[derive(Debug, Clone)]
pub struct Message {
    /// Monotonically increasing rowid assigned by SQLite.
    pub id: i64,
    /// Creation time (UTC), assigned at append time.
    pub timestamp: DateTime<Utc>,
    /// `user` or `assistant`.
    pub role: Role,
    pub content: String,
}

/// Trait for the global append-only conversation log.
///
/// There is deliberately no update, delete, or filter surface: every client
/// reads and writes the same single log.
pub trait MessageStore: Send + Sync + 'static {
    /// Append a message with a server-assigned id and the current UTC time.
    /// Returns the record as stored.
    fn append(
        &self,
        role: Role,
        content: &str,
    ) -> impl std::future::Future<Output = Result<Message, sqlx::Error>> + Send;

    /// The full log, ordered by `(timestamp, id)` ascending so that records
    /// with equal timestamps keep insertion order.  Empty store → empty vec.
    fn list_all(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, sqlx::Error>> + Send;
}

// ── Tests ──────────────────────────────────────────────────────────────────────
