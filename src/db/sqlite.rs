//! SQLite implementation of [`MessageStore`].
//!
//! Uses [`sqlx`] with the `sqlite` feature.  The schema is created on connect
//! with `CREATE TABLE IF NOT EXISTS`: idempotent bootstrap, no migration
//! machinery.  Timestamps are stored as RFC 3339 text, which compares
//! correctly under SQLite's lexicographic TEXT ordering.
//!
//! # In-memory databases
//!
//! `"sqlite::memory:"` (used by tests) clamps the pool to a single
//! connection: a pooled in-memory database would otherwise hand every new
//! connection its own empty database.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::db::{Message, MessageStore, Role};

/// The one table this service owns.  `id` is the SQLite rowid and therefore
/// monotonically increasing, which [`MessageStore::list_all`] uses as the
/// tie-break for equal timestamps.
const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS messages (\
     id        INTEGER PRIMARY KEY AUTOINCREMENT, \
     timestamp TEXT NOT NULL, \
     role      TEXT NOT NULL, \
     content   TEXT NOT NULL\
     )";

/// SQLite-backed conversation log.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `url` and bootstrap the schema.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g.
    /// `"sqlite://confab.db"` or `"sqlite::memory:"` for tests.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }
}

impl MessageStore for SqliteStore {
    async fn append(&self, role: Role, content: &str) -> Result<Message, sqlx::Error> {
        let timestamp = Utc::now();
        let result =
            sqlx::query("INSERT INTO messages (timestamp, role, content) VALUES (?1, ?2, ?3)")
                .bind(timestamp.to_rfc3339())
                .bind(role.as_str())
                .bind(content)
                .execute(&self.pool)
                .await?;
        Ok(Message {
            id: result.last_insert_rowid(),
            timestamp,
            role,
            content: content.to_owned(),
        })
    }

    async fn list_all(&self) -> Result<Vec<Message>, sqlx::Error> {
        let rows: Vec<(i64, String, String, String)> = sqlx::query_as(
            "SELECT id, timestamp, role, content FROM messages ORDER BY timestamp ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|(id, timestamp, role, content)| {
                // A role this service never wrote means the file was edited
                // out-of-band; surface that instead of relabeling the row.
                let role = Role::from_str(&role).map_err(|e| sqlx::Error::Decode(e.into()))?;
                let timestamp = timestamp
                    .parse::<DateTime<Utc>>()
                    .unwrap_or_else(|e: chrono::ParseError| {
                        tracing::warn!(raw = %timestamp, error = %e, "failed to parse message timestamp; using now");
                        Utc::now()
                    });
                Ok(Message {
                    id,
                    timestamp,
                    role,
                    content,
                })
            })
            .collect()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    async fn memory_store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:")
            .await
            .expect("in-memory store")
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let store = memory_store().await;
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_returns_the_stored_record() {
        let store = memory_store().await;
        let msg = store.append(Role::User, "hello").await.unwrap();
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "hello");
        assert!(msg.id >= 1);
    }

    #[tokio::test]
    async fn ids_are_monotonic_and_listing_keeps_insertion_order() {
        let store = memory_store().await;
        // Appends land within the same second; ordering must still hold via
        // the rowid tie-break.
        for i in 0..6 {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            store.append(role, &format!("turn {i}")).await.unwrap();
        }
        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 6);
        for pair in all.windows(2) {
            assert!(pair[0].id < pair[1].id);
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
        assert_eq!(all[0].content, "turn 0");
        assert_eq!(all[5].content, "turn 5");
    }

    #[tokio::test]
    async fn schema_bootstrap_is_idempotent_across_reconnects() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("log.db").display());

        let store = SqliteStore::connect(&url).await.unwrap();
        store.append(Role::User, "persisted").await.unwrap();
        drop(store);

        let store = SqliteStore::connect(&url).await.unwrap();
        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].content, "persisted");
    }

    #[tokio::test]
    async fn garbage_timestamp_falls_back_instead_of_failing() {
        let store = memory_store().await;
        sqlx::query("INSERT INTO messages (timestamp, role, content) VALUES ('not-a-time', 'user', 'x')")
            .execute(&store.pool)
            .await
            .unwrap();
        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].role, Role::User);
    }

    #[tokio::test]
    async fn unknown_role_is_a_decode_error() {
        let store = memory_store().await;
        let now = Utc::now().to_rfc3339();
        sqlx::query("INSERT INTO messages (timestamp, role, content) VALUES (?1, 'moderator', 'x')")
            .bind(&now)
            .execute(&store.pool)
            .await
            .unwrap();
        assert!(matches!(
            store.list_all().await,
            Err(sqlx::Error::Decode(_))
        ));
    }
}
