//! Message service: validation and representation mapping over a
//! [`MessageStore`].
//!
//! The service is stateless apart from its store handle; every call is a
//! fresh round trip. Content is trimmed and checked before any mutation
//! reaches the store.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::entities::{MessageDraft, MessageRecord, MessageStore};
use crate::error::ServiceError;

/// `createdAt` wire format, second precision, no zone suffix.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// External representation of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: i64,
    pub content: String,
    /// UTC creation time.
    #[serde(with = "created_at_format")]
    #[schema(value_type = String, example = "2025-01-01T12:00:00")]
    pub created_at: NaiveDateTime,
}

impl From<MessageRecord> for MessageView {
    fn from(record: MessageRecord) -> Self {
        Self {
            id: record.id,
            content: record.content,
            created_at: record.created_at.naive_utc(),
        }
    }
}

mod created_at_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::CREATED_AT_FORMAT;

    pub fn serialize<S: Serializer>(at: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&at.format(CREATED_AT_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, CREATED_AT_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Trim `content` and reject it if nothing is left.
pub fn validate_content(content: &str) -> Result<&str, ServiceError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation("content must not be blank"));
    }
    Ok(trimmed)
}

#[derive(Debug)]
pub struct MessageService<S> {
    store: Arc<S>,
}

impl<S> Clone for MessageService<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store) }
    }
}

impl<S: MessageStore> MessageService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn list_all(&self) -> Result<Vec<MessageView>, ServiceError> {
        let records = self.store.list_messages().await?;
        Ok(records.into_iter().map(MessageView::from).collect())
    }

    pub async fn get_random(&self) -> Result<Option<MessageView>, ServiceError> {
        Ok(self.store.random_message().await?.map(MessageView::from))
    }

    pub async fn get_latest(&self) -> Result<Option<MessageView>, ServiceError> {
        Ok(self.store.latest_message().await?.map(MessageView::from))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<MessageView>, ServiceError> {
        Ok(self.store.get_message(id).await?.map(MessageView::from))
    }

    /// Persist a new message. The stored content is the trimmed input.
    pub async fn create(&self, content: &str) -> Result<MessageView, ServiceError> {
        let content = validate_content(content)?;
        let record = self.store.insert_message(content).await?;
        info!(id = record.id, "message created");
        Ok(record.into())
    }

    /// Replace the content of message `id`. `Ok(None)` if it does not exist.
    pub async fn update(&self, id: i64, content: &str) -> Result<Option<MessageView>, ServiceError> {
        let content = validate_content(content)?;
        let updated = self
            .store
            .save_message(MessageDraft::existing(id, content))
            .await?;
        match &updated {
            Some(_) => info!(id, "message updated"),
            None => debug!(id, "update skipped; message not found"),
        }
        Ok(updated.map(MessageView::from))
    }

    /// `Ok(false)` when there was nothing to delete.
    pub async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let deleted = self.store.delete_message(id).await?;
        if deleted {
            info!(id, "message deleted");
        } else {
            debug!(id, "delete skipped; message not found");
        }
        Ok(deleted)
    }

    /// Messages whose content contains the trimmed `fragment`.
    pub async fn search(&self, fragment: &str) -> Result<Vec<MessageView>, ServiceError> {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return Err(ServiceError::validation("search text must not be blank"));
        }
        let records = self.store.search_messages(fragment).await?;
        Ok(records.into_iter().map(MessageView::from).collect())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::SqliteStore;

    async fn service() -> (Arc<SqliteStore>, MessageService<SqliteStore>) {
        let store = Arc::new(SqliteStore::in_memory().await.expect("open store"));
        (Arc::clone(&store), MessageService::new(store))
    }

    #[test]
    fn blank_content_is_rejected() {
        for raw in ["", " ", "\t\n  "] {
            assert!(matches!(validate_content(raw), Err(ServiceError::Validation(_))));
        }
        assert_eq!(validate_content("  hi  ").unwrap(), "hi");
    }

    #[test]
    fn view_serializes_camel_case_with_second_precision() {
        let created_at =
            NaiveDateTime::parse_from_str("2025-06-07T08:09:10", CREATED_AT_FORMAT).unwrap();
        let view = MessageView { id: 7, content: "hi".into(), created_at };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["content"], "hi");
        assert_eq!(json["createdAt"], "2025-06-07T08:09:10");
    }

    #[tokio::test]
    async fn create_then_get_round_trips_content() {
        let (_, svc) = service().await;
        let created = svc.create("hello").await.unwrap();
        let fetched = svc.get_by_id(created.id).await.unwrap().expect("exists");
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.content, "hello");
    }

    #[tokio::test]
    async fn create_stores_trimmed_content() {
        let (_, svc) = service().await;
        let created = svc.create("  padded  ").await.unwrap();
        assert_eq!(created.content, "padded");
    }

    #[tokio::test]
    async fn blank_create_never_reaches_the_store() {
        let (store, svc) = service().await;
        assert!(matches!(svc.create("   ").await, Err(ServiceError::Validation(_))));
        assert_eq!(store.count_messages().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_replaces_only_content() {
        let (_, svc) = service().await;
        let created = svc.create("before").await.unwrap();
        let updated = svc.update(created.id, "after").await.unwrap().expect("exists");
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.content, "after");
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_none() {
        let (_, svc) = service().await;
        assert!(svc.update(999, "text").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn blank_update_is_rejected_even_for_unknown_ids() {
        let (_, svc) = service().await;
        let created = svc.create("keep").await.unwrap();
        assert!(matches!(svc.update(created.id, " ").await, Err(ServiceError::Validation(_))));
        assert!(matches!(svc.update(999, "").await, Err(ServiceError::Validation(_))));
        let unchanged = svc.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(unchanged.content, "keep");
    }

    #[tokio::test]
    async fn delete_of_unknown_id_leaves_store_untouched() {
        let (store, svc) = service().await;
        svc.create("stay").await.unwrap();
        assert!(!svc.delete(12345).await.unwrap());
        assert_eq!(store.count_messages().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_then_get_is_none() {
        let (_, svc) = service().await;
        let created = svc.create("gone soon").await.unwrap();
        assert!(svc.delete(created.id).await.unwrap());
        assert!(svc.get_by_id(created.id).await.unwrap().is_none());
        assert!(!svc.delete(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn list_all_matches_row_count() {
        let (store, svc) = service().await;
        assert!(svc.list_all().await.unwrap().is_empty());
        for n in 0..4 {
            svc.create(&format!("message {n}")).await.unwrap();
        }
        let listed = svc.list_all().await.unwrap();
        assert_eq!(listed.len() as i64, store.count_messages().await.unwrap());
    }

    #[tokio::test]
    async fn random_and_latest_on_empty_store_are_none() {
        let (_, svc) = service().await;
        assert!(svc.get_random().await.unwrap().is_none());
        assert!(svc.get_latest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn latest_is_the_last_created() {
        let (_, svc) = service().await;
        svc.create("first").await.unwrap();
        let last = svc.create("second").await.unwrap();
        assert_eq!(svc.get_latest().await.unwrap().unwrap().id, last.id);
    }

    #[tokio::test]
    async fn random_picks_an_existing_message() {
        let (_, svc) = service().await;
        let only = svc.create("solo").await.unwrap();
        assert_eq!(svc.get_random().await.unwrap().unwrap(), only);
    }

    #[tokio::test]
    async fn search_requires_text() {
        let (_, svc) = service().await;
        svc.create("needle in haystack").await.unwrap();
        assert!(matches!(svc.search("  ").await, Err(ServiceError::Validation(_))));
        assert_eq!(svc.search(" needle ").await.unwrap().len(), 1);
        assert!(svc.search("pin").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_not_mistaken_for_absence() {
        let (store, svc) = service().await;
        store.close().await;
        assert!(matches!(svc.get_by_id(1).await, Err(ServiceError::Store(_))));
        assert!(matches!(svc.delete(1).await, Err(ServiceError::Store(_))));
        assert!(matches!(svc.list_all().await, Err(ServiceError::Store(_))));
    }
}
