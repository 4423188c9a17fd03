pub mod health;
pub mod message;

pub use health::{HealthReport, HealthReporter, HealthStatus, DEFAULT_PROBE_TIMEOUT};
pub use message::{validate_content, MessageService, MessageView, CREATED_AT_FORMAT};
