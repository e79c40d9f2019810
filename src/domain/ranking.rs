//! Ladder ranking engine.
//!
//! Resolves a single challenge result against a ranking. When the winner
//! sits numerically below the loser (an upset), the winner leapfrogs into
//! the loser's slot and everyone from the loser down to the winner's old
//! slot drops by one. Otherwise nothing moves.
//!
//! Every function here is pure: the input is never mutated and the caller
//! decides when (and whether) to apply the result.

use chrono::{DateTime, Utc};

use super::roster::RankChanges;
use super::snapshot::RankSnapshot;
use super::{PlayerId, Roster};
use crate::error::LadderError;

/// Outcome of resolving one match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResolution {
    /// Player that won.
    pub winner_id: PlayerId,
    /// Player that lost.
    pub loser_id: PlayerId,
    /// `true` when the match was an upset and ranks moved.
    pub changed: bool,
    /// Complete target ranking after the match.
    pub standings: RankSnapshot,
    /// Only the players whose rank differs from the input.
    pub updated_ranks: RankChanges,
    /// Activity timestamp to record for the winner.
    pub active_at: DateTime<Utc>,
}

/// Resolves a match against the live roster.
///
/// # Errors
///
/// Returns [`LadderError::PlayerNotFound`] if either player is absent and
/// [`LadderError::InvalidRequest`] if both ids are the same.
pub fn resolve_match(
    roster: &Roster,
    winner_id: &PlayerId,
    loser_id: &PlayerId,
    now: DateTime<Utc>,
) -> Result<MatchResolution, LadderError> {
    resolve_standings(&roster.snapshot(), winner_id, loser_id, now)
}

/// Resolves a match against an arbitrary ranking, such as a stored
/// pre-match snapshot.
///
/// On an upset the whole sequence is renumbered `1..=N` rather than shifted
/// incrementally, so prior drift in `before` is healed as a side effect and
/// shows up in `updated_ranks`.
///
/// # Errors
///
/// Returns [`LadderError::PlayerNotFound`] if either player is absent or
/// the ranking holds fewer than two players, and
/// [`LadderError::InvalidRequest`] if both ids are the same.
pub fn resolve_standings(
    before: &RankSnapshot,
    winner_id: &PlayerId,
    loser_id: &PlayerId,
    now: DateTime<Utc>,
) -> Result<MatchResolution, LadderError> {
    // No opponent exists on a ladder of fewer than two players.
    if before.len() < 2 {
        let absent = [winner_id, loser_id]
            .into_iter()
            .find(|id| before.position_of(id).is_none())
            .unwrap_or(winner_id);
        return Err(LadderError::PlayerNotFound(absent.clone()));
    }
    if winner_id == loser_id {
        return Err(LadderError::InvalidRequest(format!(
            "player {winner_id} cannot play against themselves"
        )));
    }

    let winner_pos = before
        .position_of(winner_id)
        .ok_or_else(|| LadderError::PlayerNotFound(winner_id.clone()))?;
    let loser_pos = before
        .position_of(loser_id)
        .ok_or_else(|| LadderError::PlayerNotFound(loser_id.clone()))?;

    let winner_rank = before.rank_of(winner_id).unwrap_or(u32::MAX);
    let loser_rank = before.rank_of(loser_id).unwrap_or(0);

    // Equal ranks only happen on a corrupted roster; treat as a defence.
    if winner_rank <= loser_rank {
        return Ok(MatchResolution {
            winner_id: winner_id.clone(),
            loser_id: loser_id.clone(),
            changed: false,
            standings: before.clone(),
            updated_ranks: RankChanges::new(),
            active_at: now,
        });
    }

    let mut order: Vec<&PlayerId> = before.entries().iter().map(|e| &e.player_id).collect();
    let winner = order.remove(winner_pos);
    // The loser sorts ahead of the winner, so removing the winner leaves
    // `loser_pos` pointing at the loser.
    order.insert(loser_pos.min(order.len()), winner);

    let standings = RankSnapshot::from_order(order);
    let updated_ranks = standings.changes_since(before);

    Ok(MatchResolution {
        winner_id: winner_id.clone(),
        loser_id: loser_id.clone(),
        changed: true,
        standings,
        updated_ranks,
        active_at: now,
    })
}
