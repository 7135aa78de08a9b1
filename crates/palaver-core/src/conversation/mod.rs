//! Conversation domain module.
//!
//! This module contains the conversation-related domain models, the
//! transport contract toward the remote service, and the state
//! synchronizer that ties them together.
//!
//! # Module Structure
//!
//! - `id`: Identifier types (`ConversationId`, `PendingId`, `EntityId`)
//! - `model`: Conversation and file entities (`Conversation`, `FileRef`)
//! - `message`: Message types (`MessageRole`, `Message`)
//! - `draft`: Caller-supplied inputs (`MessageDraft`, `FileUpload`)
//! - `transport`: Remote service contract (`ChatTransport`, `MessageExchange`)
//! - `store`: State synchronizer (`ChatStore`, `ChatSnapshot`)

mod draft;
mod id;
mod message;
mod model;
mod store;
mod transport;

// Re-export public API
pub use draft::{FileUpload, MessageDraft};
pub use id::{ConversationId, EntityId, PendingId};
pub use message::{Message, MessageRole};
pub use model::{Conversation, FileRef};
pub use store::{ChatSnapshot, ChatStore};
pub use transport::{ChatTransport, MessageExchange};
