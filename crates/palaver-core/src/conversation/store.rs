//! Conversational state synchronizer.
//!
//! `ChatStore` owns the in-session collections (conversation list, current
//! selection, active message list) and keeps them consistent with the
//! remote authority behind a [`ChatTransport`]. Message sends and file
//! uploads apply optimistically: a pending placeholder becomes visible
//! before the request is issued and is reconciled in place or rolled back
//! once the request settles. Every other operation is confirmation-gated.
//!
//! All state mutation happens in synchronous critical sections (one at the
//! optimistic step, one at settle) and the lock is never held across an
//! `.await`, so concurrently in-flight operations only ever observe each
//! other's settled state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{ChatError, Result};

use super::draft::{FileUpload, MessageDraft};
use super::id::{ConversationId, EntityId, PendingId};
use super::message::{Message, MessageRole};
use super::model::{Conversation, FileRef};
use super::transport::{ChatTransport, MessageExchange};

/// Read-only view of the synchronizer's observable state.
///
/// Snapshots are plain clones: holding one never blocks the store, and a
/// snapshot taken between an operation's optimistic step and its settle
/// shows the pending placeholder.
#[derive(Debug, Clone)]
pub struct ChatSnapshot {
    /// All known conversations, most recently active first.
    pub conversations: Vec<Conversation>,
    /// The currently selected conversation, if any.
    pub current: Option<Conversation>,
    /// Message history of the selected conversation, oldest first.
    pub messages: Vec<Message>,
    /// Whether any operation is still in flight.
    pub busy: bool,
    /// Message of the most recent operation failure.
    pub last_error: Option<String>,
}

#[derive(Default)]
struct ChatState {
    conversations: Vec<Conversation>,
    current: Option<ConversationId>,
    messages: Vec<Message>,
    in_flight: usize,
    last_error: Option<String>,
}

/// Client-side synchronizer for conversations, messages, and files.
///
/// `ChatStore` is the single owner of its collections: callers mutate only
/// through the async operations below and read through [`Self::snapshot`]
/// or the [`Self::subscribe`] change notification.
///
/// # Failure contract
///
/// A failed operation leaves the observable state exactly as it was before
/// that operation's optimistic step, minus the optimistic step itself,
/// which is rolled back. No pending entity survives an operation's settle,
/// success or failure. Errors are recorded as `last_error` and re-surfaced
/// to the caller untouched; nothing is retried.
pub struct ChatStore {
    transport: Arc<dyn ChatTransport>,
    state: RwLock<ChatState>,
    next_pending: AtomicU64,
    revision: watch::Sender<u64>,
}

impl ChatStore {
    /// Creates a store over the given transport, with empty collections.
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            transport,
            state: RwLock::new(ChatState::default()),
            next_pending: AtomicU64::new(1),
            revision,
        }
    }

    /// Returns a read-only clone of the current observable state.
    pub fn snapshot(&self) -> ChatSnapshot {
        let state = self.read_state();
        ChatSnapshot {
            conversations: state.conversations.clone(),
            current: state.current.and_then(|id| {
                state.conversations.iter().find(|c| c.id == id).cloned()
            }),
            messages: state.messages.clone(),
            busy: state.in_flight > 0,
            last_error: state.last_error.clone(),
        }
    }

    /// Subscribes to change notifications.
    ///
    /// The receiver yields a monotonically increasing revision; every
    /// observable mutation bumps it. Use [`Self::snapshot`] to read the
    /// state behind a notification.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Message of the most recent operation failure, if any.
    pub fn last_error(&self) -> Option<String> {
        self.read_state().last_error.clone()
    }

    /// Replaces the conversation collection with the server's.
    ///
    /// Not optimistic: the prior collection stays visible until the call
    /// settles, then is wholesale-replaced. On failure the collection is
    /// left untouched.
    pub async fn list_conversations(&self) -> Result<()> {
        self.begin_op();
        match self.transport.list_conversations().await {
            Ok(conversations) => {
                debug!(count = conversations.len(), "conversation list replaced");
                self.mutate(|st| {
                    st.in_flight -= 1;
                    st.conversations = conversations;
                });
                Ok(())
            }
            Err(err) => Err(self.fail_op(err)),
        }
    }

    /// Creates a conversation and inserts it at the head of the list.
    ///
    /// Not optimistic. On success the new conversation also becomes the
    /// current selection, with an empty active message list.
    pub async fn create_conversation(&self, title: Option<String>) -> Result<Conversation> {
        self.begin_op();
        match self.transport.create_conversation(title.as_deref()).await {
            Ok(conversation) => {
                let created = conversation.clone();
                self.mutate(|st| {
                    st.in_flight -= 1;
                    st.current = Some(conversation.id);
                    st.messages.clear();
                    st.conversations.insert(0, conversation);
                });
                Ok(created)
            }
            Err(err) => Err(self.fail_op(err)),
        }
    }

    /// Renames a conversation.
    ///
    /// Not optimistic: the local title changes only after confirmation, and
    /// the *server-returned* title wins over the requested one, so any
    /// server-side normalization is respected.
    pub async fn rename_conversation(&self, id: ConversationId, title: &str) -> Result<()> {
        self.begin_op();
        match self.transport.rename_conversation(id, title).await {
            Ok(updated) => {
                self.mutate(|st| {
                    st.in_flight -= 1;
                    if let Some(conv) = st.conversations.iter_mut().find(|c| c.id == id) {
                        conv.title = updated.title;
                    }
                });
                Ok(())
            }
            Err(err) => Err(self.fail_op(err)),
        }
    }

    /// Deletes a conversation.
    ///
    /// Not optimistic. On success the conversation is removed; if it was
    /// the current selection, the selection and the active message list are
    /// cleared as well.
    pub async fn delete_conversation(&self, id: ConversationId) -> Result<()> {
        self.begin_op();
        match self.transport.delete_conversation(id).await {
            Ok(()) => {
                self.mutate(|st| {
                    st.in_flight -= 1;
                    st.conversations.retain(|c| c.id != id);
                    if st.current == Some(id) {
                        st.current = None;
                        st.messages.clear();
                    }
                });
                Ok(())
            }
            Err(err) => Err(self.fail_op(err)),
        }
    }

    /// Selects a conversation and loads its message history.
    ///
    /// An unknown id is a no-op, not an error. The message fetch happens
    /// first; selection and message list are applied together at settle, so
    /// a failed fetch changes nothing. File lists are untouched; they live
    /// on the conversation entities.
    pub async fn select_conversation(&self, id: ConversationId) -> Result<()> {
        let known = self.read(|st| st.conversations.iter().any(|c| c.id == id));
        if !known {
            debug!(conversation = %id, "select ignored: unknown conversation");
            return Ok(());
        }

        self.begin_op();
        match self.transport.list_messages(id).await {
            Ok(messages) => {
                self.mutate(|st| {
                    st.in_flight -= 1;
                    // The conversation may have been deleted while the
                    // fetch was in flight; selecting it then would dangle.
                    if st.conversations.iter().any(|c| c.id == id) {
                        st.current = Some(id);
                        st.messages = messages;
                    }
                });
                Ok(())
            }
            Err(err) => Err(self.fail_op(err)),
        }
    }

    /// Clears the current selection and the active message list.
    pub fn clear_selection(&self) {
        self.mutate(|st| {
            st.current = None;
            st.messages.clear();
        });
    }

    /// Sends a message, optimistically.
    ///
    /// A pending placeholder carrying the draft is appended to the active
    /// message list before the request is issued. On success the
    /// placeholder is replaced in place by the confirmed user/assistant
    /// pair (or, if it was concurrently removed, the pair is appended to
    /// the end), the parent conversation's `updated_at` advances, and the
    /// conversation list is re-sorted by descending `updated_at`. On
    /// failure the placeholder is removed, restoring the pre-call list.
    pub async fn send_message(
        &self,
        conversation_id: ConversationId,
        draft: MessageDraft,
    ) -> Result<MessageExchange> {
        let pending_id = self.fresh_pending_id();
        self.mutate(|st| {
            st.in_flight += 1;
            st.messages.push(Message {
                id: EntityId::Pending(pending_id),
                conversation_id,
                role: MessageRole::User,
                content: draft.content.clone(),
                created_at: Utc::now(),
            });
        });

        match self.transport.send_message(conversation_id, &draft.content).await {
            Ok(exchange) => {
                let settled = exchange.clone();
                self.mutate(|st| {
                    st.in_flight -= 1;
                    let confirmed = [exchange.user, exchange.assistant];
                    let slot = st
                        .messages
                        .iter()
                        .position(|m| m.id == EntityId::Pending(pending_id));
                    match slot {
                        Some(pos) => {
                            st.messages.splice(pos..=pos, confirmed);
                        }
                        // The placeholder was removed by a conversation
                        // switch or delete; keep the confirmed pair anyway.
                        None => st.messages.extend(confirmed),
                    }
                    if let Some(conv) =
                        st.conversations.iter_mut().find(|c| c.id == conversation_id)
                    {
                        conv.updated_at = Utc::now();
                    }
                    st.conversations
                        .sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
                });
                Ok(settled)
            }
            Err(err) => {
                warn!(conversation = %conversation_id, %err, "send failed, rolling back");
                self.mutate(|st| {
                    st.in_flight -= 1;
                    st.messages.retain(|m| m.id != EntityId::Pending(pending_id));
                    st.last_error = Some(err.to_string());
                });
                Err(err)
            }
        }
    }

    /// Uploads a file into a conversation, optimistically.
    ///
    /// A pending `FileRef` (`uploading: true`, synthesized display name) is
    /// appended to the conversation's file list before the request is
    /// issued. The operation stays bound to `conversation_id` through to
    /// settle: if the conversation or its pending entry is gone by then,
    /// the confirmed result is discarded (`Ok(None)`) rather than attached
    /// anywhere else. On failure the pending entry is removed.
    pub async fn upload_file(
        &self,
        conversation_id: ConversationId,
        upload: FileUpload,
    ) -> Result<Option<FileRef>> {
        let pending_id = self.fresh_pending_id();
        let placeholder = format!("{} (uploading…)", upload.filename);
        let inserted = self.mutate(|st| {
            match st.conversations.iter_mut().find(|c| c.id == conversation_id) {
                Some(conv) => {
                    conv.files.push(FileRef {
                        id: EntityId::Pending(pending_id),
                        filename: placeholder,
                        uploading: true,
                    });
                    st.in_flight += 1;
                    true
                }
                None => false,
            }
        });
        if !inserted {
            return Err(ChatError::not_found("conversation", conversation_id));
        }

        match self.transport.upload_file(conversation_id, &upload).await {
            Ok(file) => {
                let attached = self.mutate(|st| {
                    st.in_flight -= 1;
                    let Some(conv) =
                        st.conversations.iter_mut().find(|c| c.id == conversation_id)
                    else {
                        return false;
                    };
                    match conv
                        .files
                        .iter()
                        .position(|f| f.id == EntityId::Pending(pending_id))
                    {
                        Some(pos) => {
                            conv.files[pos] = file.clone();
                            true
                        }
                        None => false,
                    }
                });
                if attached {
                    Ok(Some(file))
                } else {
                    debug!(
                        conversation = %conversation_id,
                        filename = %file.filename,
                        "upload settled after its conversation went away, discarding"
                    );
                    Ok(None)
                }
            }
            Err(err) => {
                warn!(conversation = %conversation_id, %err, "upload failed, rolling back");
                self.mutate(|st| {
                    st.in_flight -= 1;
                    if let Some(conv) =
                        st.conversations.iter_mut().find(|c| c.id == conversation_id)
                    {
                        conv.files.retain(|f| f.id != EntityId::Pending(pending_id));
                    }
                    st.last_error = Some(err.to_string());
                });
                Err(err)
            }
        }
    }

    /// Deletes a confirmed file from a conversation.
    ///
    /// Not optimistic: the file list changes only after confirmation.
    pub async fn delete_file(&self, conversation_id: ConversationId, file_id: i64) -> Result<()> {
        self.begin_op();
        match self.transport.delete_file(conversation_id, file_id).await {
            Ok(()) => {
                self.mutate(|st| {
                    st.in_flight -= 1;
                    if let Some(conv) =
                        st.conversations.iter_mut().find(|c| c.id == conversation_id)
                    {
                        conv.files.retain(|f| f.id != EntityId::Confirmed(file_id));
                    }
                });
                Ok(())
            }
            Err(err) => Err(self.fail_op(err)),
        }
    }

    fn fresh_pending_id(&self) -> PendingId {
        PendingId(self.next_pending.fetch_add(1, Ordering::Relaxed))
    }

    /// Marks an operation as in flight (the `busy` flag in snapshots).
    fn begin_op(&self) {
        self.mutate(|st| st.in_flight += 1);
    }

    /// Settles a failed confirmation-gated operation: no rollback needed,
    /// just record the error and hand it back.
    fn fail_op(&self, err: ChatError) -> ChatError {
        self.mutate(|st| {
            st.in_flight -= 1;
            st.last_error = Some(err.to_string());
        });
        err
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut ChatState) -> T) -> T {
        let out = {
            let mut state = self.write_state();
            f(&mut state)
        };
        self.revision.send_modify(|rev| *rev += 1);
        out
    }

    fn read<T>(&self, f: impl FnOnce(&ChatState) -> T) -> T {
        f(&self.read_state())
    }

    // Lock guards never cross an `.await`; a poisoned lock can only mean a
    // panic inside one of the synchronous closures above, and the state is
    // still structurally sound, so recover rather than propagate the panic.
    fn write_state(&self) -> RwLockWriteGuard<'_, ChatState> {
        self.state.write().unwrap_or_else(|err| err.into_inner())
    }

    fn read_state(&self) -> RwLockReadGuard<'_, ChatState> {
        self.state.read().unwrap_or_else(|err| err.into_inner())
    }
}
