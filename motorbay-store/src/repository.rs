//! Repository trait definition (Port)
//!
//! Defines the reservation storage interface used by the daemon and any
//! other caller. `ReservationStore` is the implementation.

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::NaiveDate;
use motorbay_domain::{
    CalendarZone, Reservation, ReservationDraft, ReservationId, ReservationPatch,
    ReservationStatus,
};

/// Conjunction of optional listing filters. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationFilter {
    /// Calendar day of the appointment
    pub date: Option<NaiveDate>,
    /// Exact status
    pub status: Option<ReservationStatus>,
    /// Exact plate
    pub license_plate: Option<String>,
    /// Exact assignee name
    pub assigned_to: Option<String>,
    /// Case-insensitive substring of the customer name
    pub customer_name: Option<String>,
}

impl ReservationFilter {
    /// Check a reservation against every set filter
    pub fn matches(&self, reservation: &Reservation, zone: CalendarZone) -> bool {
        if let Some(day) = self.date {
            if reservation.day_in(zone) != day {
                return false;
            }
        }
        if let Some(status) = self.status {
            if reservation.status != status {
                return false;
            }
        }
        if let Some(plate) = &self.license_plate {
            if &reservation.license_plate != plate {
                return false;
            }
        }
        if let Some(assignee) = &self.assigned_to {
            if &reservation.assigned_to != assignee {
                return false;
            }
        }
        if let Some(needle) = &self.customer_name {
            let needle = needle.to_lowercase();
            if !reservation.customer_name.to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }
}

/// Repository for Reservation entities
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// All reservations, in insertion order
    async fn list(&self) -> Result<Vec<Reservation>, StoreError>;

    /// Find a reservation by ID
    async fn find_by_id(&self, id: &ReservationId) -> Result<Option<Reservation>, StoreError>;

    /// Reservations whose appointment falls on `day`
    async fn find_by_date(&self, day: NaiveDate) -> Result<Vec<Reservation>, StoreError>;

    /// Reservations matching every set filter
    async fn search(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>, StoreError>;

    /// Create a reservation with a fresh id and `Scheduled` status
    async fn create(&self, draft: ReservationDraft) -> Result<Reservation, StoreError>;

    /// Merge `patch` over an existing reservation
    async fn update(
        &self,
        id: &ReservationId,
        patch: ReservationPatch,
    ) -> Result<Reservation, StoreError>;

    /// Set the status. Any status may follow any other.
    async fn update_status(
        &self,
        id: &ReservationId,
        status: ReservationStatus,
    ) -> Result<Reservation, StoreError> {
        self.update(id, ReservationPatch::status(status)).await
    }

    /// Remove a reservation. Removing an unknown id is not an error.
    async fn remove(&self, id: &ReservationId) -> Result<(), StoreError>;
}
