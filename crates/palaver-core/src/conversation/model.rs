//! Conversation domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ConversationId, EntityId};

/// A file attached to a conversation.
///
/// Shares the pending/confirmed duality of [`super::Message`]: while an
/// upload is in flight the entry carries a pending id, `uploading: true`,
/// and a synthesized display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRef {
    /// Pending or server-issued identity.
    pub id: EntityId,
    /// Display name of the file.
    pub filename: String,
    /// Whether the upload is still in flight.
    pub uploading: bool,
}

/// A conversation as tracked by this client.
///
/// `updated_at` advances on every successful message send and drives the
/// most-recently-active-first ordering of the conversation list. The file
/// list lives on the conversation entity itself, so selection changes never
/// touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Server-issued identifier.
    pub id: ConversationId,
    /// Human-readable conversation title.
    pub title: String,
    /// Timestamp of the last activity.
    pub updated_at: DateTime<Utc>,
    /// Files attached to this conversation.
    #[serde(default)]
    pub files: Vec<FileRef>,
}
