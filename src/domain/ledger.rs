//! Append-only history of resolved matches.

use chrono::{DateTime, Utc};

use super::restore::{RestoredRoster, plan_restore};
use super::snapshot::RankSnapshot;
use super::{MatchId, MatchRecord, PlayerId, Roster};
use crate::error::LadderError;

/// In-memory match ledger, kept in submission order.
///
/// Records are appended by [`MatchLedger::record_match`], rewritten only
/// by reversal through [`MatchLedger::replace`], and dropped by
/// administrative deletion.
#[derive(Debug, Clone, Default)]
pub struct MatchLedger {
    records: Vec<MatchRecord>,
}

impl MatchLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from stored records, ordering them by time.
    #[must_use]
    pub fn from_records(mut records: Vec<MatchRecord>) -> Self {
        records.sort_by_key(|r| r.occurred_at);
        Self { records }
    }

    /// Appends a new record. `snapshot` must be the ranking as it was
    /// before the match was applied.
    pub fn record_match(
        &mut self,
        winner_id: PlayerId,
        loser_id: PlayerId,
        snapshot: Option<RankSnapshot>,
        occurred_at: DateTime<Utc>,
    ) -> MatchRecord {
        let record = MatchRecord::new(winner_id, loser_id, snapshot, occurred_at);
        self.append(record.clone());
        record
    }

    /// Appends an already built record.
    pub fn append(&mut self, record: MatchRecord) {
        self.records.push(record);
    }

    /// Looks up a record.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::MatchNotFound`] for an unknown id.
    pub fn get(&self, id: MatchId) -> Result<&MatchRecord, LadderError> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .ok_or(LadderError::MatchNotFound(id))
    }

    /// Swaps in a rewritten record with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::MatchNotFound`] if no record has that id.
    pub fn replace(&mut self, record: MatchRecord) -> Result<(), LadderError> {
        let slot = self
            .records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or(LadderError::MatchNotFound(record.id))?;
        *slot = record;
        Ok(())
    }

    /// Removes a record from the ledger.
    ///
    /// # Errors
    ///
    /// Returns [`LadderError::MatchNotFound`] for an unknown id.
    pub fn remove(&mut self, id: MatchId) -> Result<MatchRecord, LadderError> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(LadderError::MatchNotFound(id))?;
        Ok(self.records.remove(index))
    }

    /// All records, most recent first.
    #[must_use]
    pub fn list(&self) -> Vec<&MatchRecord> {
        self.records.iter().rev().collect()
    }

    /// Records involving `player_id`, most recent first.
    #[must_use]
    pub fn for_player(&self, player_id: &PlayerId) -> Vec<&MatchRecord> {
        self.records
            .iter()
            .rev()
            .filter(|r| r.involves(player_id))
            .collect()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Plans the rank restoration that accompanies deleting `record`.
///
/// Every snapshot player still on the roster goes back to their snapshot
/// rank. Later joiners are left alone; any resulting density break is
/// reported, not repaired.
#[must_use]
pub fn delete_match(roster: &Roster, record: &MatchRecord) -> RestoredRoster {
    match &record.roster_snapshot {
        Some(snapshot) => plan_restore(roster, snapshot),
        None => RestoredRoster::without_snapshot(),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Player;
    use crate::domain::ranking::resolve_match;
    use chrono::Duration;

    fn four_players() -> Roster {
        Roster::from_players(vec![
            Player::new("A", "A", 1),
            Player::new("B", "B", 2),
            Player::new("C", "C", 3),
            Player::new("D", "D", 4),
        ])
    }

    #[test]
    fn record_and_get() {
        let mut ledger = MatchLedger::new();
        let record = ledger.record_match("D".into(), "B".into(), None, Utc::now());
        assert_eq!(ledger.len(), 1);
        let Ok(found) = ledger.get(record.id) else {
            panic!("record missing");
        };
        assert_eq!(found, &record);
        assert!(!found.is_reversible());
    }

    #[test]
    fn get_unknown_fails() {
        let ledger = MatchLedger::new();
        assert!(matches!(
            ledger.get(MatchId::new()),
            Err(LadderError::MatchNotFound(_))
        ));
    }

    #[test]
    fn list_is_most_recent_first() {
        let mut ledger = MatchLedger::new();
        let now = Utc::now();
        let first = ledger.record_match("A".into(), "B".into(), None, now);
        let second = ledger.record_match("C".into(), "D".into(), None, now + Duration::seconds(1));
        let ids: Vec<MatchId> = ledger.list().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn for_player_filters() {
        let mut ledger = MatchLedger::new();
        let now = Utc::now();
        ledger.record_match("A".into(), "B".into(), None, now);
        ledger.record_match("C".into(), "D".into(), None, now);
        ledger.record_match("B".into(), "C".into(), None, now);
        assert_eq!(ledger.for_player(&"B".into()).len(), 2);
        assert!(ledger.for_player(&"Z".into()).is_empty());
    }

    #[test]
    fn from_records_orders_by_time() {
        let now = Utc::now();
        let mut scratch = MatchLedger::new();
        let late = scratch.record_match("A".into(), "B".into(), None, now + Duration::hours(1));
        let early = scratch.record_match("C".into(), "D".into(), None, now);
        let ledger = MatchLedger::from_records(vec![late.clone(), early.clone()]);
        let ids: Vec<MatchId> = ledger.list().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![late.id, early.id]);
    }

    #[test]
    fn remove_drops_record() {
        let mut ledger = MatchLedger::new();
        let record = ledger.record_match("A".into(), "B".into(), None, Utc::now());
        assert!(ledger.remove(record.id).is_ok());
        assert!(ledger.is_empty());
        assert!(ledger.remove(record.id).is_err());
    }

    #[test]
    fn deleting_restores_snapshot_ranks() {
        let r0 = four_players();
        let Ok(res) = resolve_match(&r0, &"D".into(), &"B".into(), Utc::now()) else {
            panic!("resolve failed");
        };
        let mut live = r0.clone();
        live.apply_ranks(&res.updated_ranks);

        let mut ledger = MatchLedger::new();
        let record = ledger.record_match("D".into(), "B".into(), Some(r0.snapshot()), Utc::now());

        let restored = delete_match(&live, &record);
        assert!(restored.is_complete());
        live.apply_ranks(&restored.updated_ranks);
        assert_eq!(live.snapshot(), r0.snapshot());
    }

    #[test]
    fn deleting_without_snapshot_warns_and_restores_nothing() {
        let live = four_players();
        let mut ledger = MatchLedger::new();
        let record = ledger.record_match("D".into(), "B".into(), None, Utc::now());
        let restored = delete_match(&live, &record);
        assert!(restored.updated_ranks.is_empty());
        assert!(!restored.is_complete());
    }
}
