//! Fixture builders.

use std::sync::Arc;

use motorbay_domain::{CalendarZone, Reservation, ReservationDraft, ReservationTime};
use motorbay_store::{
    FixtureSeed, KeyValueSlot, MemorySlot, PersistenceAdapter, PersistenceMode, ReservationStore,
    SeedProvider, StoreOptions,
};

use crate::Result;

/// A store together with the memory slot behind it
pub struct TestStore {
    /// Shared store, as handed to the daemon
    pub store: Arc<ReservationStore>,
    /// Slot backing the store, for inspecting or breaking persistence
    pub slot: Arc<MemorySlot>,
}

/// Store options with a UTC calendar zone
pub fn utc() -> StoreOptions {
    StoreOptions {
        zone: CalendarZone::utc(),
        mode: PersistenceMode::BestEffort,
    }
}

/// Store options with a UTC+9 calendar zone
pub fn seoul() -> StoreOptions {
    StoreOptions {
        zone: CalendarZone::east_hours(9).expect("UTC+9 is a valid offset"),
        mode: PersistenceMode::BestEffort,
    }
}

/// The reference creation scenario: Kim, 12A3456, oil change with Lee.
pub fn kim_draft() -> ReservationDraft {
    ReservationDraft {
        customer_name: "Kim".to_string(),
        license_plate: "12A3456".to_string(),
        date: ReservationTime::parse("2024-03-15T10:00:00").expect("fixed timestamp parses"),
        service: "Oil change".to_string(),
        assigned_to: "Lee".to_string(),
        notes: None,
    }
}

/// Draft for `customer` at an ISO-8601 `date`.
pub fn draft(customer: &str, date: &str) -> Result<ReservationDraft> {
    Ok(ReservationDraft {
        customer_name: customer.to_string(),
        date: ReservationTime::parse(date)?,
        ..kim_draft()
    })
}

/// Store over a fresh memory slot seeded with the fixture set, UTC zone.
pub fn memory_store() -> TestStore {
    store_with(Arc::new(FixtureSeed), utc())
}

/// Store over a fresh memory slot with a custom seed and options.
pub fn store_with(seed: Arc<dyn SeedProvider>, options: StoreOptions) -> TestStore {
    let slot = Arc::new(MemorySlot::new());
    let adapter = PersistenceAdapter::new(slot.clone(), seed);
    TestStore {
        store: Arc::new(ReservationStore::open(adapter, options)),
        slot,
    }
}

/// Decode whatever the slot currently holds under the default key.
pub fn read_slot(slot: &dyn KeyValueSlot) -> Result<Vec<Reservation>> {
    let raw = slot
        .get(PersistenceAdapter::DEFAULT_KEY)?
        .ok_or_else(|| anyhow::anyhow!("slot is empty"))?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use motorbay_store::ReservationRepository;

    #[tokio::test]
    async fn test_memory_store_is_seeded() {
        let TestStore { store, slot } = memory_store();

        assert_eq!(store.len().await, FixtureSeed::LEN);
        assert_eq!(read_slot(slot.as_ref()).unwrap(), store.list().await.unwrap());
    }

    #[test]
    fn test_draft_overrides_customer_and_date() {
        let d = draft("Park", "2024-03-16T09:00:00+09:00").unwrap();
        assert_eq!(d.customer_name, "Park");
        assert_eq!(d.service, "Oil change");
        assert!(draft("Park", "soon").is_err());
    }
}
