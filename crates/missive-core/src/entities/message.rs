//! Repository surface over the `messages` table.
//!
//! Queries use the runtime-checked `sqlx::query*` forms so no
//! `DATABASE_URL` is needed at compile time. Timestamps are stored as
//! fixed-width RFC 3339 UTC strings, which keeps lexical and chronological
//! order identical for `ORDER BY created_at`.

use std::future::Future;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::entities::dao::{MessageDraft, MessageRecord};
use crate::entities::SqliteStore;

type MessageRow = (i64, String, String);

pub trait MessageStore: Send + Sync + 'static {
    /// Every message, in id order. Empty when the table is empty.
    fn list_messages(&self) -> impl Future<Output = Result<Vec<MessageRecord>, sqlx::Error>> + Send;

    fn get_message(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<MessageRecord>, sqlx::Error>> + Send;

    /// The message with the greatest `created_at`; ties go to the higher id.
    fn latest_message(
        &self,
    ) -> impl Future<Output = Result<Option<MessageRecord>, sqlx::Error>> + Send;

    /// One message chosen uniformly at random, or `None` when empty.
    fn random_message(
        &self,
    ) -> impl Future<Output = Result<Option<MessageRecord>, sqlx::Error>> + Send;

    fn message_exists(&self, id: i64) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    /// Insert a new row, assigning `id` and `created_at`.
    fn insert_message(
        &self,
        content: &str,
    ) -> impl Future<Output = Result<MessageRecord, sqlx::Error>> + Send;

    /// Replace the content of row `id` in a single statement.
    /// Returns `None` when no such row exists.
    fn update_message(
        &self,
        id: i64,
        content: &str,
    ) -> impl Future<Output = Result<Option<MessageRecord>, sqlx::Error>> + Send;

    /// Returns `true` if a row was removed.
    fn delete_message(&self, id: i64) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;

    /// Messages whose content contains `fragment` (case-sensitive), in id order.
    fn search_messages(
        &self,
        fragment: &str,
    ) -> impl Future<Output = Result<Vec<MessageRecord>, sqlx::Error>> + Send;

    fn count_messages(&self) -> impl Future<Output = Result<i64, sqlx::Error>> + Send;

    /// Insert-or-update dispatch on the draft's `id`.
    ///
    /// An insert always yields `Some`; an update yields `None` when the target
    /// row does not exist.
    fn save_message(
        &self,
        draft: MessageDraft,
    ) -> impl Future<Output = Result<Option<MessageRecord>, sqlx::Error>> + Send {
        async move {
            match draft.id {
                None => self.insert_message(&draft.content).await.map(Some),
                Some(id) => self.update_message(id, &draft.content).await,
            }
        }
    }
}

impl MessageStore for SqliteStore {
    async fn list_messages(&self) -> Result<Vec<MessageRecord>, sqlx::Error> {
        let rows: Vec<MessageRow> =
            sqlx::query_as("SELECT id, content, created_at FROM messages ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(into_record).collect()
    }

    async fn get_message(&self, id: i64) -> Result<Option<MessageRecord>, sqlx::Error> {
        let row: Option<MessageRow> =
            sqlx::query_as("SELECT id, content, created_at FROM messages WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(into_record).transpose()
    }

    async fn latest_message(&self) -> Result<Option<MessageRecord>, sqlx::Error> {
        let row: Option<MessageRow> = sqlx::query_as(
            "SELECT id, content, created_at FROM messages \
             ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        row.map(into_record).transpose()
    }

    async fn random_message(&self) -> Result<Option<MessageRecord>, sqlx::Error> {
        // Full scan + sort on every call; acceptable for small tables.
        let row: Option<MessageRow> = sqlx::query_as(
            "SELECT id, content, created_at FROM messages ORDER BY RANDOM() LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        row.map(into_record).transpose()
    }

    async fn message_exists(&self, id: i64) -> Result<bool, sqlx::Error> {
        let found: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM messages WHERE id = ?1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(found != 0)
    }

    async fn insert_message(&self, content: &str) -> Result<MessageRecord, sqlx::Error> {
        let created_at = encode_timestamp(Utc::now());
        let row: MessageRow = sqlx::query_as(
            "INSERT INTO messages (content, created_at) VALUES (?1, ?2) \
             RETURNING id, content, created_at",
        )
        .bind(content)
        .bind(&created_at)
        .fetch_one(&self.pool)
        .await?;
        into_record(row)
    }

    async fn update_message(
        &self,
        id: i64,
        content: &str,
    ) -> Result<Option<MessageRecord>, sqlx::Error> {
        let row: Option<MessageRow> = sqlx::query_as(
            "UPDATE messages SET content = ?1 WHERE id = ?2 \
             RETURNING id, content, created_at",
        )
        .bind(content)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(into_record).transpose()
    }

    async fn delete_message(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_messages(&self, fragment: &str) -> Result<Vec<MessageRecord>, sqlx::Error> {
        // instr() instead of LIKE: no wildcard escaping, case-sensitive.
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id, content, created_at FROM messages \
             WHERE instr(content, ?1) > 0 ORDER BY id ASC",
        )
        .bind(fragment)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(into_record).collect()
    }

    async fn count_messages(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM messages")
            .fetch_one(&self.pool)
            .await
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn encode_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn into_record((id, content, created_at): MessageRow) -> Result<MessageRecord, sqlx::Error> {
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| {
            tracing::warn!(id, raw = %created_at, error = %e, "unparseable message created_at");
            sqlx::Error::Decode(Box::new(e))
        })?
        .with_timezone(&Utc);
    Ok(MessageRecord { id, content, created_at })
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    async fn store() -> SqliteStore {
        SqliteStore::in_memory().await.expect("open in-memory store")
    }

    #[tokio::test]
    async fn empty_store_has_no_rows() {
        let store = store().await;
        assert!(store.list_messages().await.unwrap().is_empty());
        assert!(store.latest_message().await.unwrap().is_none());
        assert!(store.random_message().await.unwrap().is_none());
        assert!(store.get_message(1).await.unwrap().is_none());
        assert_eq!(store.count_messages().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let store = store().await;
        let before = Utc::now();
        let record = store.insert_message("hello").await.unwrap();
        assert!(record.id > 0);
        assert_eq!(record.content, "hello");
        assert!(record.created_at >= before - chrono::Duration::seconds(1));

        let fetched = store.get_message(record.id).await.unwrap().expect("row exists");
        assert_eq!(fetched, record);
        assert!(store.message_exists(record.id).await.unwrap());
    }

    #[tokio::test]
    async fn update_keeps_id_and_created_at() {
        let store = store().await;
        let original = store.insert_message("first").await.unwrap();
        let updated = store
            .update_message(original.id, "second")
            .await
            .unwrap()
            .expect("row exists");
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.content, "second");
    }

    #[tokio::test]
    async fn update_of_missing_row_is_none() {
        let store = store().await;
        assert!(store.update_message(42, "nope").await.unwrap().is_none());
        assert_eq!(store.count_messages().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn save_dispatches_on_draft_id() {
        let store = store().await;
        let inserted = store
            .save_message(MessageDraft::new("draft"))
            .await
            .unwrap()
            .expect("insert always yields a row");
        let replaced = store
            .save_message(MessageDraft::existing(inserted.id, "final"))
            .await
            .unwrap()
            .expect("row exists");
        assert_eq!(replaced.id, inserted.id);
        assert_eq!(replaced.content, "final");
        assert!(store
            .save_message(MessageDraft::existing(inserted.id + 100, "ghost"))
            .await
            .unwrap()
            .is_none());
        assert_eq!(store.count_messages().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_went_away() {
        let store = store().await;
        let record = store.insert_message("bye").await.unwrap();
        assert!(store.delete_message(record.id).await.unwrap());
        assert!(!store.delete_message(record.id).await.unwrap());
        assert!(!store.message_exists(record.id).await.unwrap());
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = store().await;
        let first = store.insert_message("a").await.unwrap();
        let second = store.insert_message("b").await.unwrap();
        store.delete_message(second.id).await.unwrap();
        let third = store.insert_message("c").await.unwrap();
        assert!(third.id > second.id);
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn latest_is_the_newest_row() {
        let store = store().await;
        store.insert_message("old").await.unwrap();
        store.insert_message("middle").await.unwrap();
        let newest = store.insert_message("new").await.unwrap();
        let latest = store.latest_message().await.unwrap().expect("non-empty");
        assert_eq!(latest.id, newest.id);
    }

    async fn insert_raw(store: &SqliteStore, id: i64, created_at: &str) {
        sqlx::query("INSERT INTO messages (id, content, created_at) VALUES (?1, ?2, ?3)")
            .bind(id)
            .bind(format!("message {id}"))
            .bind(created_at)
            .execute(&store.pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn latest_orders_by_created_at_not_id() {
        let store = store().await;
        insert_raw(&store, 1, "2030-01-01T00:00:00.000000Z").await;
        insert_raw(&store, 2, "2020-01-01T00:00:00.000000Z").await;
        let latest = store.latest_message().await.unwrap().expect("non-empty");
        assert_eq!(latest.id, 1);
    }

    #[tokio::test]
    async fn latest_breaks_timestamp_ties_by_higher_id() {
        let store = store().await;
        insert_raw(&store, 1, "2025-06-01T12:00:00.000000Z").await;
        insert_raw(&store, 3, "2025-06-01T12:00:00.000000Z").await;
        insert_raw(&store, 2, "2025-06-01T12:00:00.000000Z").await;
        let latest = store.latest_message().await.unwrap().expect("non-empty");
        assert_eq!(latest.id, 3);
    }

    #[tokio::test]
    async fn random_eventually_picks_every_row() {
        let store = store().await;
        let mut ids = HashSet::new();
        for content in ["one", "two", "three"] {
            ids.insert(store.insert_message(content).await.unwrap().id);
        }
        let mut seen = HashSet::new();
        for _ in 0..200 {
            seen.insert(store.random_message().await.unwrap().expect("non-empty").id);
        }
        assert_eq!(seen, ids);
    }

    #[tokio::test]
    async fn random_returns_an_existing_row() {
        let store = store().await;
        let mut ids = HashSet::new();
        for content in ["one", "two", "three"] {
            ids.insert(store.insert_message(content).await.unwrap().id);
        }
        for _ in 0..20 {
            let picked = store.random_message().await.unwrap().expect("non-empty");
            assert!(ids.contains(&picked.id));
        }
    }

    #[tokio::test]
    async fn list_is_in_id_order() {
        let store = store().await;
        for content in ["x", "y", "z"] {
            store.insert_message(content).await.unwrap();
        }
        let contents: Vec<String> = store
            .list_messages()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, ["x", "y", "z"]);
    }

    #[tokio::test]
    async fn search_matches_substrings_literally() {
        let store = store().await;
        store.insert_message("hello world").await.unwrap();
        store.insert_message("Hello there").await.unwrap();
        store.insert_message("100% done").await.unwrap();

        let hits = store.search_messages("hello").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "hello world");

        let hits = store.search_messages("%").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "100% done");
    }

    #[tokio::test]
    async fn closed_pool_surfaces_an_error() {
        let store = store().await;
        store.close().await;
        assert!(store.get_message(1).await.is_err());
        assert!(store.list_messages().await.is_err());
    }

    #[test]
    fn timestamps_encode_with_fixed_width() {
        let at = DateTime::parse_from_rfc3339("2025-03-04T05:06:07Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(encode_timestamp(at), "2025-03-04T05:06:07.000000Z");
    }

    #[test]
    fn garbage_timestamp_is_a_decode_error() {
        let err = into_record((1, "x".into(), "yesterday".into())).unwrap_err();
        assert!(matches!(err, sqlx::Error::Decode(_)));
    }
}
