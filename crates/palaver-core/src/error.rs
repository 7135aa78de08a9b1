//! Error types for the Palaver client.

use thiserror::Error;

/// A shared error type for the client state layer and its transport.
///
/// The transport adapter flattens every failure into one of these variants;
/// the synchronizer does not distinguish causes beyond success vs. failure
/// and re-surfaces the error untouched after performing its own rollback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// The remote authority could not be reached (connect, timeout, DNS).
    #[error("network failure: {message}")]
    Network { message: String },

    /// The remote authority responded but declined the operation.
    #[error("rejected by server: {message}")]
    Rejected { message: String },

    /// A caller referenced an entity this client does not know about.
    #[error("{entity_type} not found: '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Internal error (should not happen in normal operation).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChatError {
    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a Rejected error
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a Network error
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Check if this is a Rejected error
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// A type alias for `Result<T, ChatError>`.
pub type Result<T> = std::result::Result<T, ChatError>;
