//! Identifier types.
//!
//! Two disjoint id spaces exist in this client: identifiers issued by the
//! remote authority, and identifiers fabricated locally for entities whose
//! creation request is still in flight. The [`EntityId`] tag keeps the two
//! apart by construction.

use serde::{Deserialize, Serialize};

/// Server-issued conversation identifier.
///
/// The remote authority sequences these; they are never fabricated locally
/// and never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ConversationId(pub i64);

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Locally fabricated identifier for an entity whose creation is in flight.
///
/// Drawn from a per-store monotonic counter, so concurrently pending
/// entities can never collide and removal/replacement by id is unambiguous.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PendingId(pub u64);

impl std::fmt::Display for PendingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Identity of a message or file.
///
/// `Pending` entities are local placeholders awaiting confirmation;
/// `Confirmed` entities carry the id the server issued. Every pending id is
/// replaced by exactly one confirmed entity, or removed entirely, before
/// the operation that created it settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "id", rename_all = "snake_case")]
pub enum EntityId {
    /// Placeholder for an in-flight creation.
    Pending(PendingId),
    /// Confirmed by the remote authority.
    Confirmed(i64),
}

impl EntityId {
    /// Check if this id is still pending confirmation
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Check if this id was issued by the server
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }

    /// Returns the server-issued id, if confirmed.
    pub fn confirmed(&self) -> Option<i64> {
        match self {
            Self::Confirmed(id) => Some(*id),
            Self::Pending(_) => None,
        }
    }
}
