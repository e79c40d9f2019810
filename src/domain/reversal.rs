//! Administrative reversal of a recorded match.
//!
//! A reversal replays the match with the outcome swapped against the
//! ranking stored in the record, not the live one. Matches played after
//! the reversed one are not re-derived; only this match's contribution is
//! corrected.

use chrono::{DateTime, Utc};

use super::MatchRecord;
use super::ranking::{MatchResolution, resolve_standings};
use crate::error::LadderError;

/// Result of reversing a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reversal {
    /// The rewritten record: same id and snapshot, outcome swapped.
    pub record: MatchRecord,
    /// Replay of the swapped outcome from the pre-match snapshot.
    pub resolution: MatchResolution,
}

/// Reverses `record`.
///
/// The rewritten record keeps the original pre-match snapshot, so reversing
/// it again replays the original outcome.
///
/// # Errors
///
/// Returns [`LadderError::NoSnapshotAvailable`] when the record has no
/// snapshot, and [`LadderError::PlayerNotFound`] when the snapshot does not
/// contain both players.
pub fn reverse_match(record: &MatchRecord, now: DateTime<Utc>) -> Result<Reversal, LadderError> {
    let snapshot = record
        .roster_snapshot
        .as_ref()
        .ok_or(LadderError::NoSnapshotAvailable(record.id))?;

    let resolution = resolve_standings(snapshot, &record.loser_id, &record.winner_id, now)?;

    let reversed = MatchRecord {
        winner_id: record.loser_id.clone(),
        loser_id: record.winner_id.clone(),
        reversed_at: Some(now),
        ..record.clone()
    };

    Ok(Reversal {
        record: reversed,
        resolution,
    })
}
