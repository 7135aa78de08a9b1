//! Caller-supplied inputs for mutation operations.

/// Content of a message the user wants to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    /// The message text.
    pub content: String,
}

impl MessageDraft {
    /// Creates a draft from the given content.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl From<&str> for MessageDraft {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

/// A file the user wants to attach to a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Name of the file as chosen by the user.
    pub filename: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Creates an upload from a filename and raw contents.
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}
