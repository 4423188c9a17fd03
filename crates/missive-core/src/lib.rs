//! missive-core – persistence and business rules for the message board.
//!
//! Layering, leaf first:
//! 1. [`entities::SqliteStore`] owns the SQLite pool and the `messages` table.
//! 2. [`entities::MessageStore`] is the repository surface over that table.
//! 3. [`services::MessageService`] validates input and turns records into
//!    [`services::MessageView`] representations.
//! 4. [`services::HealthReporter`] probes the store independently of the
//!    message API.
//!
//! Nothing here knows about HTTP; the server binary wires these pieces
//! together explicitly at startup.

pub mod entities;
pub mod error;
pub mod services;

pub use entities::{DatabaseInfo, MessageDraft, MessageRecord, MessageStore, SqliteStore, StoreProbe};
pub use error::ServiceError;
pub use services::{HealthReport, HealthReporter, HealthStatus, MessageService, MessageView};
