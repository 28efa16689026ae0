//! Reservation store
//!
//! Authoritative in-memory collection for a session. Every mutation writes
//! the whole collection through the persistence adapter while still holding
//! the write lock, so each public operation is atomic with respect to the
//! others on the same store.

use crate::adapter::PersistenceAdapter;
use crate::error::StoreError;
use crate::repository::{ReservationFilter, ReservationRepository};
use async_trait::async_trait;
use chrono::NaiveDate;
use motorbay_domain::{
    CalendarZone, Reservation, ReservationDraft, ReservationId, ReservationPatch,
};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

// =============================================================================
// Options
// =============================================================================

/// What a mutation reports when the durable write fails.
///
/// In both modes the in-memory change stands and the store stays usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistenceMode {
    /// Log, mark health degraded, return `Ok`
    #[default]
    BestEffort,
    /// Log, mark health degraded, return `StoreError::Unavailable`
    Strict,
}

impl FromStr for PersistenceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "best-effort" | "best_effort" | "besteffort" => Ok(Self::BestEffort),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown persistence mode: {}", other)),
        }
    }
}

impl fmt::Display for PersistenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BestEffort => write!(f, "best-effort"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

/// Store construction options
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
    /// Zone used for calendar-day filtering
    pub zone: CalendarZone,
    /// Behavior on failed durable writes
    pub mode: PersistenceMode,
}

/// Outcome of the most recent durable read or write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum PersistenceHealth {
    /// Last read/write succeeded
    Healthy,
    /// Last read/write failed; in-memory state may be ahead of the slot
    Degraded {
        /// Error that caused the degradation
        reason: String,
    },
}

impl PersistenceHealth {
    /// True when the last durable operation succeeded
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

// =============================================================================
// Store
// =============================================================================

struct StoreState {
    reservations: Vec<Reservation>,
    health: PersistenceHealth,
}

/// In-memory reservation store backed by a persistence adapter
pub struct ReservationStore {
    state: RwLock<StoreState>,
    adapter: PersistenceAdapter,
    options: StoreOptions,
}

impl ReservationStore {
    /// Open a store, loading the collection through `adapter`.
    ///
    /// Never fails: if the slot is unavailable the store starts empty with
    /// degraded health, and `reload` can be used once storage comes back.
    pub fn open(adapter: PersistenceAdapter, options: StoreOptions) -> Self {
        let (reservations, health) = match adapter.load() {
            Ok(reservations) => (reservations, PersistenceHealth::Healthy),
            Err(e) => {
                error!(
                    error.kind = "persistence",
                    error = %e,
                    key = adapter.key(),
                    "Failed to load reservations, starting empty"
                );
                (Vec::new(), PersistenceHealth::Degraded { reason: e.to_string() })
            },
        };

        info!(
            count = reservations.len(),
            zone = %options.zone,
            mode = %options.mode,
            "Reservation store opened"
        );

        Self {
            state: RwLock::new(StoreState { reservations, health }),
            adapter,
            options,
        }
    }

    /// Calendar zone used for day filtering
    pub fn zone(&self) -> CalendarZone {
        self.options.zone
    }

    /// Get the number of reservations
    pub async fn len(&self) -> usize {
        self.state.read().await.reservations.len()
    }

    /// True when the collection is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Outcome of the most recent durable read or write
    pub async fn persistence_health(&self) -> PersistenceHealth {
        self.state.read().await.health.clone()
    }

    /// Reservations for today in the store's calendar zone
    pub async fn today(&self) -> Vec<Reservation> {
        let today = self.options.zone.today();
        self.collect(|r| r.day_in(self.options.zone) == today).await
    }

    /// Replace the in-memory collection with a fresh load from the slot.
    ///
    /// On failure the current collection is kept and health is degraded.
    pub async fn reload(&self) -> Result<usize, StoreError> {
        let mut state = self.state.write().await;

        match self.adapter.load() {
            Ok(reservations) => {
                state.reservations = reservations;
                state.health = PersistenceHealth::Healthy;
                info!(count = state.reservations.len(), "Reservations reloaded");
                Ok(state.reservations.len())
            },
            Err(e) => {
                warn!(
                    error.kind = "persistence",
                    error = %e,
                    "Reload failed, keeping current state"
                );
                state.health = PersistenceHealth::Degraded { reason: e.to_string() };
                Err(e)
            },
        }
    }

    async fn collect(&self, predicate: impl Fn(&Reservation) -> bool) -> Vec<Reservation> {
        let state = self.state.read().await;
        state.reservations.iter().filter(|r| predicate(r)).cloned().collect()
    }

    /// Write the whole collection, recording the outcome in `state.health`.
    fn persist(&self, state: &mut StoreState) -> Result<(), StoreError> {
        match self.adapter.save(&state.reservations) {
            Ok(()) => {
                if !state.health.is_healthy() {
                    info!("Persistence recovered");
                }
                state.health = PersistenceHealth::Healthy;
                Ok(())
            },
            Err(e) => {
                warn!(
                    error.kind = "persistence",
                    error = %e,
                    mode = %self.options.mode,
                    "Failed to persist reservations, in-memory state kept"
                );
                state.health = PersistenceHealth::Degraded { reason: e.to_string() };
                match self.options.mode {
                    PersistenceMode::BestEffort => Ok(()),
                    PersistenceMode::Strict => Err(e),
                }
            },
        }
    }

    fn fresh_id(reservations: &[Reservation]) -> ReservationId {
        loop {
            let id = ReservationId::generate();
            if !reservations.iter().any(|r| r.id == id) {
                return id;
            }
        }
    }
}

// =============================================================================
// Repository Implementation
// =============================================================================

#[async_trait]
impl ReservationRepository for ReservationStore {
    async fn list(&self) -> Result<Vec<Reservation>, StoreError> {
        Ok(self.state.read().await.reservations.clone())
    }

    async fn find_by_id(&self, id: &ReservationId) -> Result<Option<Reservation>, StoreError> {
        let state = self.state.read().await;
        Ok(state.reservations.iter().find(|r| &r.id == id).cloned())
    }

    async fn find_by_date(&self, day: NaiveDate) -> Result<Vec<Reservation>, StoreError> {
        let zone = self.options.zone;
        Ok(self.collect(|r| r.day_in(zone) == day).await)
    }

    async fn search(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>, StoreError> {
        let zone = self.options.zone;
        Ok(self.collect(|r| filter.matches(r, zone)).await)
    }

    async fn create(&self, draft: ReservationDraft) -> Result<Reservation, StoreError> {
        let mut state = self.state.write().await;

        let reservation = Reservation::new(Self::fresh_id(&state.reservations), draft);
        state.reservations.push(reservation.clone());
        info!(id = %reservation.id, date = %reservation.date, "Reservation created");

        self.persist(&mut state)?;
        Ok(reservation)
    }

    async fn update(
        &self,
        id: &ReservationId,
        patch: ReservationPatch,
    ) -> Result<Reservation, StoreError> {
        let mut state = self.state.write().await;

        let reservation = state
            .reservations
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| StoreError::not_found("reservation", id.as_str()))?;

        let previous = reservation.status;
        reservation.apply(patch);
        let updated = reservation.clone();

        if updated.status != previous {
            info!(%id, from = %previous, to = %updated.status, "Reservation status changed");
        } else {
            info!(%id, "Reservation updated");
        }

        self.persist(&mut state)?;
        Ok(updated)
    }

    async fn remove(&self, id: &ReservationId) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        let before = state.reservations.len();
        state.reservations.retain(|r| &r.id != id);
        if state.reservations.len() < before {
            info!(%id, "Reservation removed");
        }

        self.persist(&mut state)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{EmptySeed, FixtureSeed};
    use crate::slot::{KeyValueSlot, MemorySlot};
    use motorbay_domain::{ReservationStatus, ReservationTime};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn utc() -> StoreOptions {
        StoreOptions {
            zone: CalendarZone::utc(),
            mode: PersistenceMode::BestEffort,
        }
    }

    fn create_test_store() -> (ReservationStore, Arc<MemorySlot>) {
        let slot = Arc::new(MemorySlot::new());
        let adapter = PersistenceAdapter::new(slot.clone(), Arc::new(FixtureSeed));
        (ReservationStore::open(adapter, utc()), slot)
    }

    fn kim_draft() -> ReservationDraft {
        ReservationDraft {
            customer_name: "Kim".to_string(),
            license_plate: "12A3456".to_string(),
            date: ReservationTime::parse("2024-03-15T10:00:00").unwrap(),
            service: "Oil change".to_string(),
            assigned_to: "Lee".to_string(),
            notes: None,
        }
    }

    fn persisted(slot: &MemorySlot) -> Vec<Reservation> {
        let raw = slot.get(PersistenceAdapter::DEFAULT_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[tokio::test]
    async fn test_open_seeds_empty_slot() {
        let (store, slot) = create_test_store();

        assert_eq!(store.len().await, FixtureSeed::LEN);
        assert_eq!(persisted(&slot).len(), FixtureSeed::LEN);
        assert!(store.persistence_health().await.is_healthy());
    }

    #[tokio::test]
    async fn test_create_scenario() {
        let (store, slot) = create_test_store();
        let existing: HashSet<_> = store.list().await.unwrap().into_iter().map(|r| r.id).collect();

        let created = store.create(kim_draft()).await.unwrap();

        assert_eq!(created.status, ReservationStatus::Scheduled);
        assert!(!existing.contains(&created.id));
        assert_eq!(created.notes, None);

        let listed = store.list().await.unwrap();
        assert_eq!(listed.last(), Some(&created));
        assert!(persisted(&slot).contains(&created));
    }

    #[tokio::test]
    async fn test_create_ids_unique() {
        let (store, _) = create_test_store();

        let mut ids = HashSet::new();
        for _ in 0..20 {
            let created = store.create(kim_draft()).await.unwrap();
            assert!(ids.insert(created.id));
        }
        assert_eq!(store.len().await, FixtureSeed::LEN + 20);
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let (store, _) = create_test_store();

        let found = store.find_by_id(&"res6".into()).await.unwrap();
        assert_eq!(found.map(|r| r.customer_name), Some("박서준".to_string()));

        assert!(store.find_by_id(&"nope".into()).await.unwrap().is_none());
    }

    // Transitions are deliberately unrestricted: every status is reachable
    // from every other, including Completed -> Scheduled.
    #[tokio::test]
    async fn test_update_status_any_transition() {
        let (store, _) = create_test_store();
        let id = store.create(kim_draft()).await.unwrap().id;

        for from in ReservationStatus::ALL {
            for to in ReservationStatus::ALL {
                store.update_status(&id, from).await.unwrap();
                let updated = store.update_status(&id, to).await.unwrap();
                assert_eq!(updated.status, to);

                let found = store.find_by_id(&id).await.unwrap().unwrap();
                assert_eq!(found.status, to, "{} -> {}", from, to);
            }
        }
    }

    #[tokio::test]
    async fn test_update_merges_and_persists() {
        let (store, slot) = create_test_store();
        let id = ReservationId::from("res8");

        let updated = store
            .update(
                &id,
                ReservationPatch {
                    notes: Some(Some("bring key".to_string())),
                    assigned_to: Some("박정비".to_string()),
                    ..ReservationPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, id);
        assert_eq!(updated.assigned_to, "박정비");
        assert_eq!(updated.service, "에어컨 가스 충전");
        assert_eq!(updated.notes.as_deref(), Some("bring key"));

        let stored = persisted(&slot).into_iter().find(|r| r.id == id).unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_update_not_found() {
        let (store, slot) = create_test_store();
        let before = slot.get(PersistenceAdapter::DEFAULT_KEY).unwrap();

        let err = store
            .update_status(&"ghost".into(), ReservationStatus::Confirmed)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(slot.get(PersistenceAdapter::DEFAULT_KEY).unwrap(), before);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let (store, slot) = create_test_store();
        let id = ReservationId::from("res3");

        store.remove(&id).await.unwrap();
        let after_first = store.list().await.unwrap();
        assert_eq!(after_first.len(), FixtureSeed::LEN - 1);
        assert!(store.find_by_id(&id).await.unwrap().is_none());

        store.remove(&id).await.unwrap();
        assert_eq!(store.list().await.unwrap(), after_first);
        assert_eq!(persisted(&slot), after_first);
    }

    #[tokio::test]
    async fn test_find_by_date_matches_list_subset() {
        let (store, _) = create_test_store();
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        let on_day = store.find_by_date(day).await.unwrap();
        let expected: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.day_in(CalendarZone::utc()) == day)
            .collect();

        assert_eq!(on_day, expected);
        // res4..res7 fall on the 15th
        assert_eq!(on_day.len(), 4);
    }

    #[tokio::test]
    async fn test_find_by_date_respects_zone() {
        let slot = Arc::new(MemorySlot::new());
        let adapter = PersistenceAdapter::new(slot.clone(), Arc::new(EmptySeed));
        let seoul = StoreOptions {
            zone: CalendarZone::east_hours(9).unwrap(),
            ..StoreOptions::default()
        };
        let store = ReservationStore::open(adapter.clone(), seoul);

        let mut draft = kim_draft();
        draft.date = ReservationTime::parse("2024-03-15T20:00:00Z").unwrap();
        store.create(draft).await.unwrap();

        let fifteenth = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let sixteenth = NaiveDate::from_ymd_opt(2024, 3, 16).unwrap();
        assert!(store.find_by_date(fifteenth).await.unwrap().is_empty());
        assert_eq!(store.find_by_date(sixteenth).await.unwrap().len(), 1);

        let utc_store = ReservationStore::open(adapter, utc());
        assert_eq!(utc_store.find_by_date(fifteenth).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_by_status_and_assignee() {
        let (store, _) = create_test_store();

        let filter = ReservationFilter {
            status: Some(ReservationStatus::Confirmed),
            assigned_to: Some("박정비".to_string()),
            ..ReservationFilter::default()
        };
        let ids: Vec<_> = store
            .search(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id.to_string())
            .collect();

        assert_eq!(ids, vec!["res4", "res7"]);
    }

    #[tokio::test]
    async fn test_unavailable_slot_opens_empty_and_degraded() {
        let slot = Arc::new(MemorySlot::unavailable());
        let adapter = PersistenceAdapter::new(slot.clone(), Arc::new(FixtureSeed));
        let store = ReservationStore::open(adapter, utc());

        assert!(store.is_empty().await);
        assert!(!store.persistence_health().await.is_healthy());

        // Still usable in memory
        let created = store.create(kim_draft()).await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec![created]);

        // Storage comes back: reload replaces memory with the seeded slot
        slot.set_available(true);
        assert_eq!(store.reload().await.unwrap(), FixtureSeed::LEN);
        assert!(store.persistence_health().await.is_healthy());
    }

    #[tokio::test]
    async fn test_best_effort_keeps_mutation_on_write_failure() {
        let (store, slot) = create_test_store();
        slot.set_available(false);

        let created = store.create(kim_draft()).await.unwrap();
        assert!(store.find_by_id(&created.id).await.unwrap().is_some());
        assert!(matches!(
            store.persistence_health().await,
            PersistenceHealth::Degraded { .. }
        ));

        slot.set_available(true);
        store.remove(&"res1".into()).await.unwrap();
        assert!(store.persistence_health().await.is_healthy());
        assert!(persisted(&slot).contains(&created));
    }

    #[tokio::test]
    async fn test_strict_mode_reports_write_failure() {
        let slot = Arc::new(MemorySlot::new());
        let adapter = PersistenceAdapter::new(slot.clone(), Arc::new(FixtureSeed));
        let store = ReservationStore::open(
            adapter,
            StoreOptions {
                zone: CalendarZone::utc(),
                mode: PersistenceMode::Strict,
            },
        );
        slot.set_available(false);

        let err = store.create(kim_draft()).await.unwrap_err();
        assert!(err.is_unavailable());
        // The in-memory change stands
        assert_eq!(store.len().await, FixtureSeed::LEN + 1);
    }

    #[tokio::test]
    async fn test_reload_failure_keeps_state() {
        let (store, slot) = create_test_store();
        slot.set_available(false);

        assert!(store.reload().await.is_err());
        assert_eq!(store.len().await, FixtureSeed::LEN);
    }

    #[test]
    fn test_persistence_mode_parse() {
        assert_eq!("best-effort".parse::<PersistenceMode>().unwrap(), PersistenceMode::BestEffort);
        assert_eq!("STRICT".parse::<PersistenceMode>().unwrap(), PersistenceMode::Strict);
        assert!("yolo".parse::<PersistenceMode>().is_err());
    }

    #[test]
    fn test_health_json() {
        let degraded = PersistenceHealth::Degraded { reason: "disk full".to_string() };
        assert_eq!(
            serde_json::to_value(&degraded).unwrap(),
            serde_json::json!({ "state": "degraded", "reason": "disk full" })
        );
        assert_eq!(
            serde_json::to_value(PersistenceHealth::Healthy).unwrap(),
            serde_json::json!({ "state": "healthy" })
        );
    }
}
