//! Transport contract toward the remote conversation service.
//!
//! Defines the interface the synchronizer calls into; `palaver-transport`
//! provides the HTTP implementation and tests provide in-memory mocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::draft::FileUpload;
use super::id::ConversationId;
use super::message::Message;
use super::model::{Conversation, FileRef};

/// The confirmed result of a successful message send: the user's message as
/// persisted by the server, plus the assistant reply it generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageExchange {
    /// The user's message with its server-issued id.
    pub user: Message,
    /// The generated assistant reply.
    pub assistant: Message,
}

/// An abstract client for the remote conversation service.
///
/// This trait decouples the synchronizer from the wire: implementations
/// marshal requests however they like, but must flatten every failure,
/// transport-level (timeout, connection refused) and application-level
/// (non-2xx status, business rejection) alike, into a single
/// [`crate::ChatError`] channel.
///
/// # Implementation Notes
///
/// Implementations must:
/// - Return entities whose ids are all server-confirmed
/// - Never retry on their own; retry is a caller decision
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Fetches the full conversation collection, most recently active first.
    async fn list_conversations(&self) -> Result<Vec<Conversation>>;

    /// Creates a conversation. When `title` is `None` the server picks a
    /// default.
    async fn create_conversation(&self, title: Option<&str>) -> Result<Conversation>;

    /// Renames a conversation.
    ///
    /// # Returns
    ///
    /// The updated conversation. Its title is authoritative; the server
    /// may normalize the requested one.
    async fn rename_conversation(
        &self,
        id: ConversationId,
        title: &str,
    ) -> Result<Conversation>;

    /// Deletes a conversation.
    async fn delete_conversation(&self, id: ConversationId) -> Result<()>;

    /// Fetches the ordered message history of a conversation.
    async fn list_messages(&self, id: ConversationId) -> Result<Vec<Message>>;

    /// Sends a user message and returns the confirmed exchange.
    async fn send_message(&self, id: ConversationId, content: &str) -> Result<MessageExchange>;

    /// Uploads a file into a conversation.
    async fn upload_file(&self, id: ConversationId, upload: &FileUpload) -> Result<FileRef>;

    /// Deletes a previously confirmed file from a conversation.
    async fn delete_file(&self, id: ConversationId, file_id: i64) -> Result<()>;
}
