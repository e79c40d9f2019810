//! Domain layer: the ranking engine and its state.
//!
//! Everything here is synchronous and free of I/O. The roster holds the
//! rank state, the ranking engine resolves matches, the ledger keeps the
//! pre-match snapshots that make reversal and deletion possible, and the
//! event bus carries notifications out to subscribers.

pub mod event_bus;
pub mod ladder_event;
pub mod ladder_state;
pub mod ledger;
pub mod match_id;
pub mod match_record;
pub mod player;
pub mod player_id;
pub mod ranking;
pub mod restore;
pub mod reversal;
pub mod roster;
pub mod snapshot;

pub use event_bus::EventBus;
pub use ladder_event::LadderEvent;
pub use ladder_state::LadderState;
pub use ledger::MatchLedger;
pub use match_id::MatchId;
pub use match_record::MatchRecord;
pub use player::Player;
pub use player_id::PlayerId;
pub use ranking::{MatchResolution, resolve_match};
pub use restore::{PartialRestoreWarning, RestoredRoster};
pub use reversal::{Reversal, reverse_match};
pub use roster::{InvariantViolation, RankChanges, Roster};
pub use snapshot::{RankEntry, RankSnapshot};
