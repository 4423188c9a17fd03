use chrono::{DateTime, Utc};

/// A single row in the `messages` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    /// Assigned by SQLite on insert; never reused after deletion.
    pub id: i64,
    pub content: String,
    /// Set once at insert time.
    pub created_at: DateTime<Utc>,
}

/// Input to [`crate::entities::MessageStore::save_message`].
///
/// Without an `id` the draft is inserted as a new row; with one it replaces
/// the content of that row, leaving `id` and `created_at` untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub id: Option<i64>,
    pub content: String,
}

impl MessageDraft {
    pub fn new(content: impl Into<String>) -> Self {
        Self { id: None, content: content.into() }
    }

    pub fn existing(id: i64, content: impl Into<String>) -> Self {
        Self { id: Some(id), content: content.into() }
    }
}
