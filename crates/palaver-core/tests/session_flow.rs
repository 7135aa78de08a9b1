//! End-to-end exercise of the synchronizer against a stateful in-memory
//! service, covering a full client session through the public API.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use palaver_core::Result;
use palaver_core::conversation::{
    ChatStore, ChatTransport, Conversation, ConversationId, EntityId, FileRef, FileUpload,
    Message, MessageDraft, MessageExchange, MessageRole,
};
use palaver_core::error::ChatError;

/// A small in-memory stand-in for the conversation service: it sequences
/// ids, normalizes titles, and generates an assistant reply per send.
struct FakeService {
    state: Mutex<ServiceState>,
    next_id: AtomicI64,
}

#[derive(Default)]
struct ServiceState {
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
}

impl FakeService {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ServiceState::default()),
            next_id: AtomicI64::new(1),
        })
    }

    fn issue(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl ChatTransport for FakeService {
    async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        let state = self.state.lock().unwrap();
        let mut conversations = state.conversations.clone();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(conversations)
    }

    async fn create_conversation(&self, title: Option<&str>) -> Result<Conversation> {
        let conversation = Conversation {
            id: ConversationId(self.issue()),
            title: title.unwrap_or("New Chat").trim().to_string(),
            updated_at: Utc::now(),
            files: Vec::new(),
        };
        let mut state = self.state.lock().unwrap();
        state.conversations.push(conversation.clone());
        Ok(conversation)
    }

    async fn rename_conversation(
        &self,
        id: ConversationId,
        title: &str,
    ) -> Result<Conversation> {
        let mut state = self.state.lock().unwrap();
        let conversation = state
            .conversations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ChatError::rejected("conversation not found"))?;
        conversation.title = title.trim().to_string();
        Ok(conversation.clone())
    }

    async fn delete_conversation(&self, id: ConversationId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.conversations.retain(|c| c.id != id);
        state.messages.retain(|m| m.conversation_id != id);
        Ok(())
    }

    async fn list_messages(&self, id: ConversationId) -> Result<Vec<Message>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .messages
            .iter()
            .filter(|m| m.conversation_id == id)
            .cloned()
            .collect())
    }

    async fn send_message(&self, id: ConversationId, content: &str) -> Result<MessageExchange> {
        let mut state = self.state.lock().unwrap();
        let conversation = state
            .conversations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ChatError::rejected("conversation not found"))?;
        conversation.updated_at = Utc::now();

        let user = Message {
            id: EntityId::Confirmed(self.issue()),
            conversation_id: id,
            role: MessageRole::User,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        let assistant = Message {
            id: EntityId::Confirmed(self.issue()),
            conversation_id: id,
            role: MessageRole::Assistant,
            content: format!("You said: {content}"),
            created_at: Utc::now(),
        };
        state.messages.push(user.clone());
        state.messages.push(assistant.clone());
        Ok(MessageExchange { user, assistant })
    }

    async fn upload_file(&self, id: ConversationId, upload: &FileUpload) -> Result<FileRef> {
        let file = FileRef {
            id: EntityId::Confirmed(self.issue()),
            filename: upload.filename.clone(),
            uploading: false,
        };
        let mut state = self.state.lock().unwrap();
        let conversation = state
            .conversations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ChatError::rejected("conversation not found"))?;
        conversation.files.push(file.clone());
        Ok(file)
    }

    async fn delete_file(&self, id: ConversationId, file_id: i64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let conversation = state
            .conversations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ChatError::rejected("conversation not found"))?;
        conversation
            .files
            .retain(|f| f.id != EntityId::Confirmed(file_id));
        Ok(())
    }
}

#[tokio::test]
async fn test_full_session_flow() {
    let service = FakeService::new();
    let store = ChatStore::new(service.clone());

    // A fresh session starts empty.
    store.list_conversations().await.unwrap();
    assert!(store.snapshot().conversations.is_empty());

    // Create a conversation; it is selected with an empty history.
    let created = store
        .create_conversation(Some("Planning".into()))
        .await
        .unwrap();
    let snapshot = store.snapshot();
    assert_eq!(snapshot.current.as_ref().unwrap().id, created.id);
    assert!(snapshot.messages.is_empty());

    // Send a message; the exchange lands confirmed.
    store
        .send_message(created.id, MessageDraft::new("hello"))
        .await
        .unwrap();
    let snapshot = store.snapshot();
    assert_eq!(snapshot.messages.len(), 2);
    assert_eq!(snapshot.messages[0].role, MessageRole::User);
    assert_eq!(snapshot.messages[1].role, MessageRole::Assistant);
    assert_eq!(snapshot.messages[1].content, "You said: hello");
    assert!(snapshot.messages.iter().all(|m| m.id.is_confirmed()));

    // Rename round-trips through the server's normalization.
    store
        .rename_conversation(created.id, "  Planning v2  ")
        .await
        .unwrap();
    assert_eq!(store.snapshot().conversations[0].title, "Planning v2");

    // Attach a file, then remove it again.
    let attached = store
        .upload_file(created.id, FileUpload::new("agenda.md", b"# agenda".to_vec()))
        .await
        .unwrap()
        .expect("upload should attach to its conversation");
    assert_eq!(store.snapshot().conversations[0].files.len(), 1);
    store
        .delete_file(created.id, attached.id.confirmed().unwrap())
        .await
        .unwrap();
    assert!(store.snapshot().conversations[0].files.is_empty());

    // A refresh from the service agrees with the local view.
    store.list_conversations().await.unwrap();
    let snapshot = store.snapshot();
    assert_eq!(snapshot.conversations.len(), 1);
    assert_eq!(snapshot.conversations[0].title, "Planning v2");

    // Reselecting replays the stored history.
    store.select_conversation(created.id).await.unwrap();
    assert_eq!(store.snapshot().messages.len(), 2);

    // Deleting the conversation clears everything.
    store.delete_conversation(created.id).await.unwrap();
    let snapshot = store.snapshot();
    assert!(snapshot.conversations.is_empty());
    assert!(snapshot.current.is_none());
    assert!(snapshot.messages.is_empty());
}
