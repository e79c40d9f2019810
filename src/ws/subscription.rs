//! Per-connection subscription manager.
//!
//! Tracks which players a WebSocket client follows and provides
//! server-side event filtering.

use std::collections::HashSet;

use crate::domain::{LadderEvent, PlayerId};

/// Manages the set of player subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Followed players. Ignored while `subscribe_all` is set.
    player_ids: HashSet<PlayerId>,
    /// Whether the client follows the whole ladder (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds players to the subscription set.
    pub fn subscribe(&mut self, ids: &[PlayerId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.player_ids.extend(ids.iter().cloned());
    }

    /// Removes players from the subscription set. Passing the wildcard
    /// turns it off.
    pub fn unsubscribe(&mut self, ids: &[PlayerId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for id in ids {
            self.player_ids.remove(id);
        }
    }

    /// Returns `true` if the event touches any followed player.
    ///
    /// Roster-wide events (renumbering) concern everyone whose rank moved.
    #[must_use]
    pub fn matches(&self, event: &LadderEvent) -> bool {
        self.subscribe_all || self.player_ids.iter().any(|id| event.concerns(id))
    }

    /// Returns the number of explicitly followed players.
    #[must_use]
    pub fn count(&self) -> usize {
        self.player_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}
