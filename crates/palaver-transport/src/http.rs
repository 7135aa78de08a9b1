//! reqwest-backed implementation of the chat transport.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, multipart};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use palaver_core::conversation::{
    ChatTransport, Conversation, ConversationId, FileRef, FileUpload, Message, MessageExchange,
};
use palaver_core::{ChatError, Result};

use crate::config::ChatApiConfig;
use crate::dto::{ConversationDto, Envelope, ExchangeDto, FileRefDto, MessageDto};

/// `ChatTransport` implementation backed by the remote HTTP service.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct HttpChatTransport {
    client: Client,
    config: ChatApiConfig,
}

impl HttpChatTransport {
    /// Creates a transport with the provided configuration.
    pub fn new(config: ChatApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChatError::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Creates a transport configured from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ChatApiConfig::from_env())
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, response).await);
        }
        Ok(response)
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| ChatError::rejected(format!("malformed response: {e}")))?;
        envelope.into_data()
    }

    async fn execute_unit(&self, request: RequestBuilder) -> Result<()> {
        let response = self.send(request).await?;
        let envelope: Envelope<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| ChatError::rejected(format!("malformed response: {e}")))?;
        envelope.into_unit()
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        let dtos: Vec<ConversationDto> =
            self.execute(self.client.get(self.url("conversations"))).await?;
        Ok(dtos.into_iter().map(Conversation::from).collect())
    }

    async fn create_conversation(&self, title: Option<&str>) -> Result<Conversation> {
        #[derive(Serialize)]
        struct Body<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            title: Option<&'a str>,
        }

        let dto: ConversationDto = self
            .execute(
                self.client
                    .post(self.url("conversations"))
                    .json(&Body { title }),
            )
            .await?;
        debug!(conversation = dto.id, "conversation created");
        Ok(dto.into())
    }

    async fn rename_conversation(
        &self,
        id: ConversationId,
        title: &str,
    ) -> Result<Conversation> {
        #[derive(Serialize)]
        struct Body<'a> {
            title: &'a str,
        }

        let dto: ConversationDto = self
            .execute(
                self.client
                    .put(self.url(&format!("conversations/{id}")))
                    .json(&Body { title }),
            )
            .await?;
        Ok(dto.into())
    }

    async fn delete_conversation(&self, id: ConversationId) -> Result<()> {
        self.execute_unit(self.client.delete(self.url(&format!("conversations/{id}"))))
            .await
    }

    async fn list_messages(&self, id: ConversationId) -> Result<Vec<Message>> {
        let dtos: Vec<MessageDto> = self
            .execute(
                self.client
                    .get(self.url(&format!("conversations/{id}/messages"))),
            )
            .await?;
        dtos.into_iter().map(Message::try_from).collect()
    }

    async fn send_message(&self, id: ConversationId, content: &str) -> Result<MessageExchange> {
        #[derive(Serialize)]
        struct Body<'a> {
            content: &'a str,
        }

        let dto: ExchangeDto = self
            .execute(
                self.client
                    .post(self.url(&format!("conversations/{id}/messages")))
                    .json(&Body { content }),
            )
            .await?;
        Ok(MessageExchange {
            user: dto.user_message.try_into()?,
            assistant: dto.ai_message.try_into()?,
        })
    }

    async fn upload_file(&self, id: ConversationId, upload: &FileUpload) -> Result<FileRef> {
        let part = multipart::Part::bytes(upload.bytes.clone()).file_name(upload.filename.clone());
        let form = multipart::Form::new()
            .text("conversation_id", id.to_string())
            .part("file", part);

        let dto: FileRefDto = self
            .execute(self.client.post(self.url("upload")).multipart(form))
            .await?;
        debug!(conversation = %id, file = dto.id, "file uploaded");
        Ok(dto.into())
    }

    async fn delete_file(&self, id: ConversationId, file_id: i64) -> Result<()> {
        self.execute_unit(
            self.client
                .delete(self.url(&format!("conversations/{id}/files/{file_id}"))),
        )
        .await
    }
}

/// Maps a request that never produced a usable response onto the core's
/// failure taxonomy: the authority was not reached.
fn request_error(err: reqwest::Error) -> ChatError {
    ChatError::network(err.to_string())
}

/// Turns a non-2xx response into a rejection, preferring the server's error
/// payload over the canned per-status message.
async fn status_error(status: StatusCode, response: Response) -> ChatError {
    let detail = response
        .json::<Envelope<serde_json::Value>>()
        .await
        .ok()
        .and_then(|envelope| envelope.error);

    ChatError::rejected(detail.unwrap_or_else(|| status_message(status.as_u16())))
}

fn status_message(status: u16) -> String {
    match status {
        400 => "invalid request parameters".to_string(),
        401 => "unauthorized".to_string(),
        403 => "forbidden".to_string(),
        404 => "requested resource does not exist".to_string(),
        413 => "file exceeds the size limit".to_string(),
        500 => "internal server error".to_string(),
        other => format!("request failed ({other})"),
    }
}
