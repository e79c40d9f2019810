//! Ladder service: serialises writes, persists diffs and emits events.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::ladder_event::LadderEvent;
use crate::domain::ladder_state::{DeletedMatch, ReversedMatch, SubmittedMatch};
use crate::domain::roster::RankViolation;
use crate::domain::{
    EventBus, LadderState, MatchId, MatchLedger, MatchRecord,
    PartialRestoreWarning, Player, PlayerId, RankChanges, Roster,
};
use crate::error::LadderError;
use crate::persistence::PostgresPersistence;

/// Consistent view of the roster's health.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterValidation {
    /// Players on the roster when it was checked.
    pub player_count: usize,
    /// Every gap, duplicate and out-of-range rank; empty when valid.
    pub violations: Vec<RankViolation>,
}

impl RosterValidation {
    /// Returns `true` if ranks form `1..=player_count`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Orchestration layer for all ladder operations.
///
/// Owns the [`LadderState`] behind a single write lock, which makes the
/// service the only writer: concurrent submissions are applied one after
/// the other, never interleaved. Every mutation follows the pattern:
/// acquire lock → stage (next roster plus pending ledger edit) → persist →
/// commit → emit event → return. A persistence failure drops the staged
/// write and leaves memory untouched.
#[derive(Debug, Clone)]
pub struct LadderService {
    state: Arc<RwLock<LadderState>>,
    event_bus: EventBus,
    persistence: Option<PostgresPersistence>,
}

impl LadderService {
    /// Creates an in-memory service over an empty ladder.
    #[must_use]
    pub fn new(event_bus: EventBus) -> Self {
        Self::with_state(LadderState::new(), event_bus)
    }

    /// Creates an in-memory service over existing state.
    #[must_use]
    pub fn with_state(state: LadderState, event_bus: EventBus) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
            event_bus,
            persistence: None,
        }
    }

    /// Hydrates the ladder from storage and writes through to it from then
    /// on. A roster that fails validation is loaded as-is and reported.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::PersistenceError`] if loading fails.
    pub async fn load(
        persistence: PostgresPersistence,
        event_bus: EventBus,
    ) -> Result<Self, LadderError> {
        let roster = Roster::from_players(persistence.load_players().await?);
        let ledger = MatchLedger::from_records(persistence.load_matches().await?);
        tracing::info!(
            players = roster.len(),
            matches = ledger.len(),
            "ladder loaded from storage"
        );
        if let Err(violation) = roster.validate() {
            tracing::warn!(%violation, "stored roster violates the dense-rank invariant");
        }

        let mut service = Self::with_state(LadderState::from_parts(roster, ledger), event_bus);
        service.persistence = Some(persistence);
        Ok(service)
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Current players in rank order.
    pub async fn roster(&self) -> Vec<Player> {
        self.state.read().await.roster.sorted_by_rank()
    }

    /// Looks up one player.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::PlayerNotFound`] for an unknown id.
    pub async fn player(&self, id: &PlayerId) -> Result<Player, LadderError> {
        self.state
            .read()
            .await
            .roster
            .find_by_id(id)
            .cloned()
            .ok_or_else(|| LadderError::PlayerNotFound(id.clone()))
    }

    /// Adds a player at the bottom of the ladder. A fresh id is generated
    /// when none is supplied.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::InvalidRequest`] for a blank name or taken id,
    /// or a persistence error.
    pub async fn add_player(
        &self,
        id: Option<PlayerId>,
        name: &str,
        contact: Option<String>,
    ) -> Result<Player, LadderError> {
        let mut state = self.state.write().await;
        let id = id.unwrap_or_else(PlayerId::generate);
        let staged = state.stage_add_player(id, name, contact)?;

        if let Some(store) = &self.persistence {
            store.save_players(std::slice::from_ref(staged.outcome())).await?;
        }
        let player = state.commit(staged)?;
        drop(state);

        let _ = self.event_bus.publish(LadderEvent::PlayerJoined {
            player_id: player.id.clone(),
            name: player.name.clone(),
            rank: player.rank,
            timestamp: Utc::now(),
        });
        tracing::info!(player_id = %player.id, rank = player.rank, "player joined");
        Ok(player)
    }

    /// Edits a player's name or contact.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::PlayerNotFound`], [`LadderError::InvalidRequest`]
    /// or a persistence error.
    pub async fn update_player(
        &self,
        id: &PlayerId,
        name: Option<&str>,
        contact: Option<String>,
    ) -> Result<Player, LadderError> {
        let mut state = self.state.write().await;
        let staged = state.stage_update_player(id, name, contact)?;

        if let Some(store) = &self.persistence {
            store.save_players(std::slice::from_ref(staged.outcome())).await?;
        }
        let player = state.commit(staged)?;
        drop(state);

        let _ = self.event_bus.publish(LadderEvent::PlayerUpdated {
            player_id: player.id.clone(),
            timestamp: Utc::now(),
        });
        tracing::info!(player_id = %player.id, "player updated");
        Ok(player)
    }

    /// Removes a player; everyone below moves up one slot.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::PlayerNotFound`] or a persistence error.
    pub async fn remove_player(&self, id: &PlayerId) -> Result<(Player, RankChanges), LadderError> {
        let mut state = self.state.write().await;
        let staged = state.stage_remove_player(id)?;

        if let Some(store) = &self.persistence {
            let (_, shifted) = staged.outcome();
            let players = players_for(staged.roster(), shifted.keys());
            store.delete_player(id, &players).await?;
        }
        let (removed, shifted) = state.commit(staged)?;
        drop(state);

        let _ = self.event_bus.publish(LadderEvent::PlayerRemoved {
            player_id: removed.id.clone(),
            updated_ranks: shifted.clone(),
            timestamp: Utc::now(),
        });
        tracing::info!(player_id = %removed.id, shifted = shifted.len(), "player removed");
        Ok((removed, shifted))
    }

    /// Submits a match result: snapshot, resolve, apply, record.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::PlayerNotFound`] if either player is absent,
    /// [`LadderError::InvalidRequest`] for a self-match, or a persistence
    /// error. Nothing is applied on failure.
    pub async fn submit_match(
        &self,
        winner_id: &PlayerId,
        loser_id: &PlayerId,
    ) -> Result<SubmittedMatch, LadderError> {
        let mut state = self.state.write().await;
        let staged = state.stage_submit(winner_id, loser_id, Utc::now())?;

        if let Some(store) = &self.persistence {
            let pending = staged.outcome();
            let players = players_for(
                staged.roster(),
                pending
                    .resolution
                    .updated_ranks
                    .keys()
                    .chain(std::iter::once(winner_id)),
            );
            store.save_match_result(&players, &pending.record).await?;
        }
        let submitted = state.commit(staged)?;
        drop(state);

        let _ = self.event_bus.publish(LadderEvent::MatchResolved {
            match_id: submitted.record.id,
            winner_id: submitted.record.winner_id.clone(),
            loser_id: submitted.record.loser_id.clone(),
            changed: submitted.resolution.changed,
            updated_ranks: submitted.resolution.updated_ranks.clone(),
            timestamp: Utc::now(),
        });
        tracing::info!(
            match_id = %submitted.record.id,
            winner_id = %winner_id,
            loser_id = %loser_id,
            changed = submitted.resolution.changed,
            "match resolved"
        );
        Ok(submitted)
    }

    /// Reverses a recorded match, replaying it from its stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::MatchNotFound`],
    /// [`LadderError::NoSnapshotAvailable`] or a persistence error.
    pub async fn reverse_match(&self, match_id: MatchId) -> Result<ReversedMatch, LadderError> {
        let mut state = self.state.write().await;
        let staged = state.stage_reverse(match_id, Utc::now())?;

        if let Some(store) = &self.persistence {
            let pending = staged.outcome();
            let players = players_for(staged.roster(), pending.restore.updated_ranks.keys());
            store.save_reversal(&players, &pending.record).await?;
        }
        let reversed = state.commit(staged)?;
        drop(state);

        log_warnings(match_id, &reversed.restore.warnings);
        let _ = self.event_bus.publish(LadderEvent::MatchReversed {
            match_id,
            winner_id: reversed.record.winner_id.clone(),
            loser_id: reversed.record.loser_id.clone(),
            updated_ranks: reversed.restore.updated_ranks.clone(),
            warnings: warning_messages(&reversed.restore.warnings),
            timestamp: Utc::now(),
        });
        tracing::info!(
            %match_id,
            winner_id = %reversed.record.winner_id,
            moved = reversed.restore.updated_ranks.len(),
            "match reversed"
        );
        Ok(reversed)
    }

    /// Deletes a recorded match and restores its pre-match snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::MatchNotFound`] or a persistence error.
    pub async fn delete_match(&self, match_id: MatchId) -> Result<DeletedMatch, LadderError> {
        let mut state = self.state.write().await;
        let staged = state.stage_delete(match_id)?;

        if let Some(store) = &self.persistence {
            let restore = &staged.outcome().restore;
            let players = players_for(staged.roster(), restore.updated_ranks.keys());
            store.delete_match(match_id, &players).await?;
        }
        let deleted = state.commit(staged)?;
        drop(state);

        log_warnings(match_id, &deleted.restore.warnings);
        let _ = self.event_bus.publish(LadderEvent::MatchDeleted {
            match_id,
            winner_id: deleted.record.winner_id.clone(),
            loser_id: deleted.record.loser_id.clone(),
            updated_ranks: deleted.restore.updated_ranks.clone(),
            warnings: warning_messages(&deleted.restore.warnings),
            timestamp: Utc::now(),
        });
        tracing::info!(
            %match_id,
            restored = deleted.restore.updated_ranks.len(),
            "match deleted"
        );
        Ok(deleted)
    }

    /// Ledger entries, most recent first, optionally for one player.
    pub async fn list_matches(&self, player_id: Option<&PlayerId>) -> Vec<MatchRecord> {
        let state = self.state.read().await;
        let records = match player_id {
            Some(id) => state.ledger.for_player(id),
            None => state.ledger.list(),
        };
        records.into_iter().cloned().collect()
    }

    /// Looks up one ledger entry.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::MatchNotFound`] for an unknown id.
    pub async fn get_match(&self, match_id: MatchId) -> Result<MatchRecord, LadderError> {
        self.state.read().await.ledger.get(match_id).cloned()
    }

    /// Checks the dense-rank invariant of the live roster.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::InvariantViolation`] with the full report; it
    /// is logged, never patched.
    pub async fn validate(&self) -> Result<(), LadderError> {
        let result = self.state.read().await.validate();
        result.map_err(|violation| {
            tracing::warn!(%violation, "roster invariant violated");
            LadderError::InvariantViolation(violation)
        })
    }

    /// Player count and every rank violation, read under one lock.
    pub async fn validation_report(&self) -> RosterValidation {
        let state = self.state.read().await;
        let report = RosterValidation {
            player_count: state.roster.len(),
            violations: state.validate().err().map(|v| v.violations).unwrap_or_default(),
        };
        drop(state);
        if !report.is_valid() {
            tracing::warn!(violations = report.violations.len(), "roster invariant violated");
        }
        report
    }

    /// Administrator-triggered renumbering of the whole roster.
    ///
    /// # Errors
    ///
    /// Returns a persistence error.
    pub async fn renumber(&self) -> Result<RankChanges, LadderError> {
        let mut state = self.state.write().await;
        let staged = state.stage_renumber();

        if staged.outcome().is_empty() {
            return Ok(RankChanges::new());
        }
        if let Some(store) = &self.persistence {
            store
                .save_players(&players_for(staged.roster(), staged.outcome().keys()))
                .await?;
        }
        let changes = state.commit(staged)?;
        drop(state);

        let _ = self.event_bus.publish(LadderEvent::RosterRenumbered {
            updated_ranks: changes.clone(),
            timestamp: Utc::now(),
        });
        tracing::info!(moved = changes.len(), "roster renumbered");
        Ok(changes)
    }
}

/// Current rows of the given players, skipping unknown ids.
fn players_for<'a>(roster: &Roster, ids: impl Iterator<Item = &'a PlayerId>) -> Vec<Player> {
    let ids: BTreeSet<&PlayerId> = ids.collect();
    ids.into_iter()
        .filter_map(|id| roster.find_by_id(id).cloned())
        .collect()
}

fn warning_messages(warnings: &[PartialRestoreWarning]) -> Vec<String> {
    warnings.iter().map(ToString::to_string).collect()
}

fn log_warnings(match_id: MatchId, warnings: &[PartialRestoreWarning]) {
    for warning in warnings {
        tracing::warn!(%match_id, %warning, "partial restore");
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    async fn service_with(ids: &[&str]) -> LadderService {
        let service = LadderService::new(EventBus::new(64));
        for id in ids {
            assert_ok!(service.add_player(Some(PlayerId::from(*id)), id, None).await);
        }
        service
    }

    async fn order(service: &LadderService) -> Vec<String> {
        service
            .roster()
            .await
            .into_iter()
            .map(|p| p.id.to_string())
            .collect()
    }

    #[tokio::test]
    async fn add_player_emits_event() {
        let service = LadderService::new(EventBus::new(8));
        let mut rx = service.event_bus().subscribe();
        let player = assert_ok!(service.add_player(None, "Alice", Some("+1".into())).await);
        assert_eq!(player.rank, 1);

        let Ok(event) = rx.recv().await else {
            panic!("expected event");
        };
        assert_eq!(event.event_type_str(), "player_joined");
        assert!(event.concerns(&player.id));
    }

    #[tokio::test]
    async fn submit_upset_reorders_and_records() {
        let service = service_with(&["A", "B", "C", "D"]).await;
        let mut rx = service.event_bus().subscribe();

        let submitted = assert_ok!(service.submit_match(&"D".into(), &"B".into()).await);
        assert!(submitted.resolution.changed);
        assert_eq!(order(&service).await, ["A", "D", "B", "C"]);
        assert_eq!(service.list_matches(None).await.len(), 1);
        assert_ok!(service.validate().await);

        let Ok(event) = rx.recv().await else {
            panic!("expected event");
        };
        assert_eq!(event.event_type_str(), "match_resolved");
        assert!(event.concerns(&"C".into()));
    }

    #[tokio::test]
    async fn unknown_player_leaves_state_untouched() {
        let service = service_with(&["A", "B"]).await;
        let err = assert_err!(service.submit_match(&"ghost".into(), &"A".into()).await);
        assert!(matches!(err, LadderError::PlayerNotFound(_)));
        assert!(service.list_matches(None).await.is_empty());
        assert_eq!(order(&service).await, ["A", "B"]);
    }

    #[tokio::test]
    async fn reverse_then_delete_round_trip() {
        let service = service_with(&["A", "B", "C"]).await;
        let submitted = assert_ok!(service.submit_match(&"A".into(), &"C".into()).await);
        assert_eq!(order(&service).await, ["A", "B", "C"]);

        let reversed = assert_ok!(service.reverse_match(submitted.record.id).await);
        assert!(reversed.restore.is_complete());
        assert_eq!(order(&service).await, ["C", "A", "B"]);
        let stored = assert_ok!(service.get_match(submitted.record.id).await);
        assert_eq!(stored.winner_id, PlayerId::from("C"));

        let deleted = assert_ok!(service.delete_match(submitted.record.id).await);
        assert!(deleted.restore.is_complete());
        assert_eq!(order(&service).await, ["A", "B", "C"]);
        assert_err!(service.get_match(submitted.record.id).await);
    }

    #[tokio::test]
    async fn reverse_without_snapshot_fails() {
        let mut state = LadderState::new();
        assert_ok!(state.add_player("A".into(), "A", None));
        assert_ok!(state.add_player("B".into(), "B", None));
        let record = state
            .ledger
            .record_match("B".into(), "A".into(), None, Utc::now());
        let service = LadderService::with_state(state, EventBus::new(8));

        let err = assert_err!(service.reverse_match(record.id).await);
        assert!(matches!(err, LadderError::NoSnapshotAvailable(_)));

        let deleted = assert_ok!(service.delete_match(record.id).await);
        assert_eq!(
            deleted.restore.warnings,
            vec![PartialRestoreWarning::SnapshotMissing]
        );
    }

    #[tokio::test]
    async fn list_matches_filters_by_player() {
        let service = service_with(&["A", "B", "C"]).await;
        assert_ok!(service.submit_match(&"B".into(), &"A".into()).await);
        assert_ok!(service.submit_match(&"C".into(), &"A".into()).await);
        assert_eq!(service.list_matches(Some(&"B".into())).await.len(), 1);
        assert_eq!(service.list_matches(Some(&"A".into())).await.len(), 2);
    }

    #[tokio::test]
    async fn renumber_repairs_corrupted_roster() {
        let state = LadderState::from_parts(
            Roster::from_players(vec![Player::new("A", "A", 1), Player::new("B", "B", 4)]),
            MatchLedger::new(),
        );
        let service = LadderService::with_state(state, EventBus::new(8));
        let err = assert_err!(service.validate().await);
        assert!(matches!(err, LadderError::InvariantViolation(_)));
        assert_eq!(err.error_code(), 2004);

        let changes = assert_ok!(service.renumber().await);
        assert_eq!(changes.get(&PlayerId::from("B")), Some(&2));
        assert_ok!(service.validate().await);
        assert!(assert_ok!(service.renumber().await).is_empty());
    }

    #[tokio::test]
    async fn concurrent_submissions_keep_ranks_dense() {
        let service = service_with(&["A", "B", "C", "D", "E", "F"]).await;
        let pairs = [("F", "A"), ("E", "B"), ("D", "C"), ("C", "F"), ("B", "E")];
        let mut handles = Vec::new();
        for (winner, loser) in pairs {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.submit_match(&winner.into(), &loser.into()).await
            }));
        }
        for handle in handles {
            let Ok(result) = handle.await else {
                panic!("task panicked");
            };
            assert_ok!(result);
        }
        assert_ok!(service.validate().await);
        assert_eq!(service.list_matches(None).await.len(), 5);
    }

    #[tokio::test]
    async fn remove_and_update_player() {
        let service = service_with(&["A", "B", "C"]).await;
        let updated = assert_ok!(
            service
                .update_player(&"B".into(), Some("Bea"), Some("+2".into()))
                .await
        );
        assert_eq!(updated.name, "Bea");

        let (removed, shifted) = assert_ok!(service.remove_player(&"A".into()).await);
        assert_eq!(removed.rank, 1);
        assert_eq!(shifted.len(), 2);
        assert_eq!(assert_ok!(service.player(&"B".into()).await).rank, 1);
        assert_err!(service.player(&"A".into()).await);
    }

    #[tokio::test]
    async fn validation_report_pairs_count_with_violations() {
        let state = LadderState::from_parts(
            Roster::from_players(vec![
                Player::new("A", "A", 1),
                Player::new("B", "B", 1),
                Player::new("C", "C", 5),
            ]),
            MatchLedger::new(),
        );
        let service = LadderService::with_state(state, EventBus::new(8));
        let report = service.validation_report().await;
        assert_eq!(report.player_count, 3);
        assert!(!report.is_valid());
        assert!(report.violations.contains(&RankViolation::Missing { rank: 2 }));

        assert_ok!(service.renumber().await);
        let report = service.validation_report().await;
        assert_eq!(report.player_count, 3);
        assert!(report.is_valid());
    }
}
