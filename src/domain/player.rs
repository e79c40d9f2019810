//! Ladder participant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PlayerId;

/// A player occupying one slot of the ladder.
///
/// Only `rank` is interpreted by the engine. `contact` is an opaque external
/// handle (a phone number, a chat id) carried through untouched, and
/// `last_active_at` is informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Unique identity within the roster.
    pub id: PlayerId,
    /// Display name, never empty.
    pub name: String,
    /// Position on the ladder, `1` is the top.
    pub rank: u32,
    /// Opaque external contact handle.
    pub contact: Option<String>,
    /// Most recent match participation.
    pub last_active_at: Option<DateTime<Utc>>,
}

impl Player {
    /// Creates a player with no contact and no recorded activity.
    #[must_use]
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>, rank: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rank,
            contact: None,
            last_active_at: None,
        }
    }

    /// Sets the contact handle.
    #[must_use]
    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }
}
