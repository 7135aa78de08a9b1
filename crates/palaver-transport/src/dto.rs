//! Wire types for the conversation service.
//!
//! Every endpoint wraps its payload in a `{success, data, error}` envelope;
//! the DTOs here mirror the wire field names and convert into the core's
//! domain entities.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use palaver_core::conversation::{
    Conversation, ConversationId, EntityId, FileRef, Message, MessageRole,
};
use palaver_core::{ChatError, Result};

/// Response envelope used by every endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwraps the payload, turning a `success: false` envelope into a
    /// rejection carrying the server's message.
    pub fn into_data(self) -> Result<T> {
        if !self.success {
            return Err(ChatError::rejected(
                self.error.unwrap_or_else(|| "request failed".to_string()),
            ));
        }
        self.data
            .ok_or_else(|| ChatError::rejected("response missing data"))
    }

    /// Like [`Self::into_data`], for endpoints whose success carries no
    /// payload.
    pub fn into_unit(self) -> Result<()> {
        if !self.success {
            return Err(ChatError::rejected(
                self.error.unwrap_or_else(|| "request failed".to_string()),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConversationDto {
    pub id: i64,
    pub title: String,
    #[serde(deserialize_with = "de_timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub files: Vec<FileRefDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageDto {
    pub id: i64,
    pub conversation_id: i64,
    pub role: String,
    pub content: String,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileRefDto {
    pub id: i64,
    pub filename: String,
}

/// Payload of a successful message send: the persisted user message and the
/// generated assistant reply.
#[derive(Debug, Deserialize)]
pub(crate) struct ExchangeDto {
    pub user_message: MessageDto,
    pub ai_message: MessageDto,
}

impl From<ConversationDto> for Conversation {
    fn from(dto: ConversationDto) -> Self {
        Self {
            id: ConversationId(dto.id),
            title: dto.title,
            updated_at: dto.updated_at,
            files: dto.files.into_iter().map(FileRef::from).collect(),
        }
    }
}

impl From<FileRefDto> for FileRef {
    fn from(dto: FileRefDto) -> Self {
        Self {
            id: EntityId::Confirmed(dto.id),
            filename: dto.filename,
            uploading: false,
        }
    }
}

impl TryFrom<MessageDto> for Message {
    type Error = ChatError;

    fn try_from(dto: MessageDto) -> Result<Self> {
        let role = match dto.role.as_str() {
            "user" => MessageRole::User,
            // Older service builds report the assistant as "ai".
            "assistant" | "ai" => MessageRole::Assistant,
            other => {
                return Err(ChatError::rejected(format!(
                    "malformed response: unknown message role '{other}'"
                )));
            }
        };
        Ok(Self {
            id: EntityId::Confirmed(dto.id),
            conversation_id: ConversationId(dto.conversation_id),
            role,
            content: dto.content,
            created_at: dto.created_at,
        })
    }
}

/// Parses service timestamps.
///
/// The service usually emits RFC 3339, but some endpoints serialize naive
/// datetimes without an offset; those are taken as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .map(|naive| naive.and_utc())
        .map_err(|_| format!("unrecognized timestamp '{raw}'"))
}

fn de_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}
