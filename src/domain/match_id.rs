//! Type-safe match identifier.
//!
//! [`MatchId`] wraps a [`uuid::Uuid`] (v4) so that ledger keys cannot be
//! mixed up with other UUIDs flowing through the gateway.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a recorded match.
///
/// Generated once when a result is submitted. Reversal keeps the id, so a
/// record is addressable for its whole lifetime in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(uuid::Uuid);

impl MatchId {
    /// Creates a new random `MatchId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `MatchId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for MatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for MatchId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

impl From<MatchId> for uuid::Uuid {
    fn from(id: MatchId) -> Self {
        id.0
    }
}
