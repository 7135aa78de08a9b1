//! Conversation message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ConversationId, EntityId};

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
}

/// A single message in a conversation.
///
/// A message is either *confirmed* (its id was issued by the server) or
/// *pending* (a local placeholder appended optimistically while the send
/// request is in flight).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Pending or server-issued identity.
    pub id: EntityId,
    /// The conversation this message belongs to.
    pub conversation_id: ConversationId,
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
    /// Timestamp when the message was created.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Check if this message is still awaiting server confirmation
    pub fn is_pending(&self) -> bool {
        self.id.is_pending()
    }
}
