pub mod message;

pub use message::{MessageDraft, MessageRecord};
