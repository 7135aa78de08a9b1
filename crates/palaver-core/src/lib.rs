//! Palaver core: client-side conversational state.
//!
//! This crate owns the in-session collections of a chat client
//! (conversations, the active message list, per-conversation files) and
//! keeps them consistent with a remote authority. Mutations are applied
//! optimistically where the protocol calls for it and reconciled or rolled
//! back once the corresponding request settles.
//!
//! The remote service is reached through the [`conversation::ChatTransport`]
//! trait; `palaver-transport` provides the HTTP implementation.

pub mod conversation;
pub mod error;

// Re-export common error type
pub use error::{ChatError, Result};
