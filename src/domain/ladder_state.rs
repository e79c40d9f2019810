//! Roster and ledger combined into one consistent unit of state.
//!
//! [`LadderState`] sequences the engine steps that belong together:
//! snapshot first, then resolve, then apply the ranks and append the
//! record. It is synchronous and owns no locks; the service decides how
//! it is shared.

use chrono::{DateTime, Utc};

use super::ledger::{self, MatchLedger};
use super::ranking::{MatchResolution, resolve_match};
use super::restore::{RestoredRoster, plan_restore};
use super::reversal::reverse_match;
use super::roster::{InvariantViolation, RankChanges};
use super::{MatchId, MatchRecord, Player, PlayerId, Roster};
use crate::error::LadderError;

/// A submitted match after it has been applied.
#[derive(Debug, Clone)]
pub struct SubmittedMatch {
    /// Newly appended ledger entry.
    pub record: MatchRecord,
    /// What the engine computed.
    pub resolution: MatchResolution,
}

/// A reversal after it has been applied.
#[derive(Debug, Clone)]
pub struct ReversedMatch {
    /// Rewritten ledger entry.
    pub record: MatchRecord,
    /// Replay of the swapped outcome from the stored snapshot.
    pub resolution: MatchResolution,
    /// Writes actually made on the live roster, plus warnings.
    pub restore: RestoredRoster,
}

/// A deletion after it has been applied.
#[derive(Debug, Clone)]
pub struct DeletedMatch {
    /// Record removed from the ledger.
    pub record: MatchRecord,
    /// Writes made on the live roster, plus warnings.
    pub restore: RestoredRoster,
}

/// Ledger edit carried by a [`Staged`] write.
#[derive(Debug, Clone)]
enum LedgerChange {
    Keep,
    Append(MatchRecord),
    Replace(MatchRecord),
    Remove(MatchId),
}

/// A write computed against the current state but not yet applied.
///
/// Holds the next roster and the pending ledger edit. The ledger itself
/// is never copied; [`LadderState::commit`] applies the edit in place.
#[derive(Debug, Clone)]
pub struct Staged<T> {
    roster: Roster,
    ledger: LedgerChange,
    outcome: T,
}

impl<T> Staged<T> {
    fn roster_only(roster: Roster, outcome: T) -> Self {
        Self {
            roster,
            ledger: LedgerChange::Keep,
            outcome,
        }
    }

    /// Roster as it will be after commit.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Result of the staged operation.
    #[must_use]
    pub fn outcome(&self) -> &T {
        &self.outcome
    }
}

/// Live roster plus match history.
#[derive(Debug, Clone, Default)]
pub struct LadderState {
    /// Current ranking.
    pub roster: Roster,
    /// Every recorded match.
    pub ledger: MatchLedger,
}

impl LadderState {
    /// Creates an empty ladder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps state loaded from storage.
    #[must_use]
    pub fn from_parts(roster: Roster, ledger: MatchLedger) -> Self {
        Self { roster, ledger }
    }

    /// Applies a staged write.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::MatchNotFound`] if the ledger no longer holds
    /// the record the write was staged against; nothing is applied then.
    pub fn commit<T>(&mut self, staged: Staged<T>) -> Result<T, LadderError> {
        match staged.ledger {
            LedgerChange::Keep => {}
            LedgerChange::Append(record) => self.ledger.append(record),
            LedgerChange::Replace(record) => self.ledger.replace(record)?,
            LedgerChange::Remove(id) => {
                self.ledger.remove(id)?;
            }
        }
        self.roster = staged.roster;
        Ok(staged.outcome)
    }

    /// Resolves a result and stages the new ranks plus the ledger entry.
    ///
    /// # Errors
    ///
    /// Propagates engine errors.
    pub fn stage_submit(
        &self,
        winner_id: &PlayerId,
        loser_id: &PlayerId,
        now: DateTime<Utc>,
    ) -> Result<Staged<SubmittedMatch>, LadderError> {
        let snapshot = self.roster.snapshot();
        let resolution = resolve_match(&self.roster, winner_id, loser_id, now)?;

        let mut roster = self.roster.clone();
        roster.apply_ranks(&resolution.updated_ranks);
        roster.touch(winner_id, resolution.active_at);
        let record = MatchRecord::new(winner_id.clone(), loser_id.clone(), Some(snapshot), now);

        Ok(Staged {
            roster,
            ledger: LedgerChange::Append(record.clone()),
            outcome: SubmittedMatch { record, resolution },
        })
    }

    /// Stages the reversal of a recorded match.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::MatchNotFound`], [`LadderError::NoSnapshotAvailable`]
    /// or engine errors.
    pub fn stage_reverse(
        &self,
        match_id: MatchId,
        now: DateTime<Utc>,
    ) -> Result<Staged<ReversedMatch>, LadderError> {
        let reversal = reverse_match(self.ledger.get(match_id)?, now)?;
        let restore = plan_restore(&self.roster, &reversal.resolution.standings);

        let mut roster = self.roster.clone();
        roster.apply_ranks(&restore.updated_ranks);

        Ok(Staged {
            roster,
            ledger: LedgerChange::Replace(reversal.record.clone()),
            outcome: ReversedMatch {
                record: reversal.record,
                resolution: reversal.resolution,
                restore,
            },
        })
    }

    /// Stages the deletion of a recorded match.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::MatchNotFound`] for an unknown id.
    pub fn stage_delete(&self, match_id: MatchId) -> Result<Staged<DeletedMatch>, LadderError> {
        let record = self.ledger.get(match_id)?.clone();
        let restore = ledger::delete_match(&self.roster, &record);

        let mut roster = self.roster.clone();
        roster.apply_ranks(&restore.updated_ranks);

        Ok(Staged {
            roster,
            ledger: LedgerChange::Remove(match_id),
            outcome: DeletedMatch { record, restore },
        })
    }

    /// Stages a newcomer at the bottom of the ladder.
    ///
    /// # Errors
    ///
    /// See [`Roster::join`].
    pub fn stage_add_player(
        &self,
        id: PlayerId,
        name: &str,
        contact: Option<String>,
    ) -> Result<Staged<Player>, LadderError> {
        let mut roster = self.roster.clone();
        let player = roster.join(id, name, contact)?;
        Ok(Staged::roster_only(roster, player))
    }

    /// Stages a removal; the ledger is left alone.
    ///
    /// # Errors
    ///
    /// See [`Roster::remove`].
    pub fn stage_remove_player(
        &self,
        id: &PlayerId,
    ) -> Result<Staged<(Player, RankChanges)>, LadderError> {
        let mut roster = self.roster.clone();
        let removed = roster.remove(id)?;
        Ok(Staged::roster_only(roster, removed))
    }

    /// Stages a profile edit.
    ///
    /// # Errors
    ///
    /// See [`Roster::update_profile`].
    pub fn stage_update_player(
        &self,
        id: &PlayerId,
        name: Option<&str>,
        contact: Option<String>,
    ) -> Result<Staged<Player>, LadderError> {
        let mut roster = self.roster.clone();
        let player = roster.update_profile(id, name, contact)?;
        Ok(Staged::roster_only(roster, player))
    }

    /// Stages an administrator-triggered renumbering.
    #[must_use]
    pub fn stage_renumber(&self) -> Staged<RankChanges> {
        let mut roster = self.roster.clone();
        let changes = roster.renumber();
        Staged::roster_only(roster, changes)
    }

    /// Resolves a result, applies it and appends the ledger entry.
    ///
    /// # Errors
    ///
    /// Propagates engine errors; the state is untouched on failure.
    pub fn submit_match(
        &mut self,
        winner_id: &PlayerId,
        loser_id: &PlayerId,
        now: DateTime<Utc>,
    ) -> Result<SubmittedMatch, LadderError> {
        let staged = self.stage_submit(winner_id, loser_id, now)?;
        self.commit(staged)
    }

    /// Reverses a recorded match and pushes the replayed ranking onto the
    /// live roster.
    ///
    /// # Errors
    ///
    /// See [`LadderState::stage_reverse`]; the state is untouched on failure.
    pub fn reverse_match(
        &mut self,
        match_id: MatchId,
        now: DateTime<Utc>,
    ) -> Result<ReversedMatch, LadderError> {
        let staged = self.stage_reverse(match_id, now)?;
        self.commit(staged)
    }

    /// Deletes a recorded match, restoring its pre-match snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::MatchNotFound`] for an unknown id.
    pub fn delete_match(&mut self, match_id: MatchId) -> Result<DeletedMatch, LadderError> {
        let staged = self.stage_delete(match_id)?;
        self.commit(staged)
    }

    /// Adds a player at the bottom of the ladder.
    ///
    /// # Errors
    ///
    /// See [`Roster::join`].
    pub fn add_player(
        &mut self,
        id: PlayerId,
        name: &str,
        contact: Option<String>,
    ) -> Result<Player, LadderError> {
        self.roster.join(id, name, contact)
    }

    /// Removes a player and closes the gap. Ledger entries that reference
    /// the player are kept.
    ///
    /// # Errors
    ///
    /// See [`Roster::remove`].
    pub fn remove_player(&mut self, id: &PlayerId) -> Result<(Player, RankChanges), LadderError> {
        self.roster.remove(id)
    }

    /// Checks the dense-rank invariant.
    ///
    /// # Errors
    ///
    /// See [`Roster::validate`].
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        self.roster.validate()
    }
}
