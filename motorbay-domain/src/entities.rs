//! Domain Entities for Motorbay
//!
//! The reservation entity and the shapes used to create and patch it.

use crate::value_objects::{CalendarZone, DomainError, ReservationTime};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// Reservation ID
// =============================================================================

/// Unique identifier for a Reservation
///
/// Opaque string. Fixture records use short ids (`res1`); generated ids are
/// `res-` followed by a time-ordered UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(String);

impl ReservationId {
    /// Generate a fresh, time-ordered id
    pub fn generate() -> Self {
        Self(format!("res-{}", Uuid::now_v7()))
    }

    /// Borrow the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReservationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ReservationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// =============================================================================
// Reservation Status
// =============================================================================

/// Reservation lifecycle status
///
/// Any status may follow any other; there is no transition table.
/// Serialized as the English name. Reading goes through `FromStr`, so JSON
/// accepts the same labels as query strings: any letter case, `canceled`,
/// and the Korean labels written by earlier dashboard builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ReservationStatus {
    /// Booked, awaiting confirmation
    #[default]
    Scheduled,
    /// Confirmed with the customer
    Confirmed,
    /// Called off
    Cancelled,
    /// Service done
    Completed,
}

impl ReservationStatus {
    /// Every status, in lifecycle order
    pub const ALL: [ReservationStatus; 4] = [
        ReservationStatus::Scheduled,
        ReservationStatus::Confirmed,
        ReservationStatus::Cancelled,
        ReservationStatus::Completed,
    ];

    /// Get the name of the status for display
    pub fn name(&self) -> &'static str {
        match self {
            ReservationStatus::Scheduled => "Scheduled",
            ReservationStatus::Confirmed => "Confirmed",
            ReservationStatus::Cancelled => "Cancelled",
            ReservationStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReservationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" | "예약됨" => Ok(ReservationStatus::Scheduled),
            "confirmed" | "확인됨" => Ok(ReservationStatus::Confirmed),
            "cancelled" | "canceled" | "취소됨" => Ok(ReservationStatus::Cancelled),
            "completed" | "완료됨" => Ok(ReservationStatus::Completed),
            _ => Err(DomainError::InvalidStatus(s.trim().to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for ReservationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Reservation
// =============================================================================

/// A scheduled service appointment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Immutable once assigned
    pub id: ReservationId,
    /// Customer display name
    pub customer_name: String,
    /// Plate as entered, unvalidated
    pub license_plate: String,
    /// Appointment time
    pub date: ReservationTime,
    /// Requested work
    pub service: String,
    /// Staff member handling the job
    pub assigned_to: String,
    /// Lifecycle status
    pub status: ReservationStatus,
    /// Optional free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Reservation {
    /// Create a new scheduled reservation from form data.
    ///
    /// Status is always `Scheduled`, whatever the caller intended.
    pub fn new(id: ReservationId, draft: ReservationDraft) -> Self {
        Self {
            id,
            customer_name: draft.customer_name,
            license_plate: draft.license_plate,
            date: draft.date,
            service: draft.service,
            assigned_to: draft.assigned_to,
            status: ReservationStatus::Scheduled,
            notes: draft.notes,
        }
    }

    /// Shallow-merge `patch` over this record. The id is never touched.
    pub fn apply(&mut self, patch: ReservationPatch) {
        let ReservationPatch {
            customer_name,
            license_plate,
            date,
            service,
            assigned_to,
            status,
            notes,
        } = patch;

        if let Some(customer_name) = customer_name {
            self.customer_name = customer_name;
        }
        if let Some(license_plate) = license_plate {
            self.license_plate = license_plate;
        }
        if let Some(date) = date {
            self.date = date;
        }
        if let Some(service) = service {
            self.service = service;
        }
        if let Some(assigned_to) = assigned_to {
            self.assigned_to = assigned_to;
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(notes) = notes {
            self.notes = notes;
        }
    }

    /// Calendar day of the appointment as seen from `zone`
    pub fn day_in(&self, zone: CalendarZone) -> NaiveDate {
        self.date.day_in(zone)
    }
}

// =============================================================================
// Draft (creation form data)
// =============================================================================

/// Fields supplied when creating a reservation.
///
/// The store accepts any draft as-is; required-field checks belong to the
/// caller (see [`ReservationDraft::validate`] and [`ReservationForm`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDraft {
    /// Customer display name
    pub customer_name: String,
    /// Plate as entered
    pub license_plate: String,
    /// Appointment time
    pub date: ReservationTime,
    /// Requested work
    pub service: String,
    /// Staff member handling the job
    pub assigned_to: String,
    /// Optional free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ReservationDraft {
    /// Check that every required text field is non-blank
    ///
    /// # Errors
    /// Returns `DomainError::MissingField` naming the first blank field
    pub fn validate(&self) -> Result<(), DomainError> {
        let required = [
            ("customerName", &self.customer_name),
            ("licensePlate", &self.license_plate),
            ("service", &self.service),
            ("assignedTo", &self.assigned_to),
        ];

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(DomainError::MissingField(field.to_string())),
            None => Ok(()),
        }
    }
}

/// Raw, unvalidated creation form as submitted by a client.
///
/// Every field is optional so that a missing field can be reported by name
/// instead of failing deserialization wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationForm {
    /// Required
    pub customer_name: Option<String>,
    /// Required
    pub license_plate: Option<String>,
    /// Required, ISO-8601
    pub date: Option<String>,
    /// Required
    pub service: Option<String>,
    /// Required
    pub assigned_to: Option<String>,
    /// Optional; blank is dropped
    pub notes: Option<String>,
}

impl ReservationForm {
    /// Validate the form and convert it into a draft.
    ///
    /// Blank notes are dropped.
    ///
    /// # Errors
    /// - `DomainError::MissingField` for the first absent or blank required field
    /// - `DomainError::InvalidTimestamp` if `date` does not parse
    pub fn into_draft(self) -> Result<ReservationDraft, DomainError> {
        fn required(field: &str, value: Option<String>) -> Result<String, DomainError> {
            match value {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(DomainError::MissingField(field.to_string())),
            }
        }

        let customer_name = required("customerName", self.customer_name)?;
        let license_plate = required("licensePlate", self.license_plate)?;
        let date = required("date", self.date)?;
        let service = required("service", self.service)?;
        let assigned_to = required("assignedTo", self.assigned_to)?;

        Ok(ReservationDraft {
            customer_name,
            license_plate,
            date: ReservationTime::parse(&date)?,
            service,
            assigned_to,
            notes: self.notes.filter(|notes| !notes.trim().is_empty()),
        })
    }
}

// =============================================================================
// Patch
// =============================================================================

/// Partial update. Absent fields are left untouched.
///
/// There is no `id` field: an `id` key in incoming JSON is ignored.
/// `notes` distinguishes "absent" (`None`) from an explicit `null`
/// (`Some(None)`), which clears the notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationPatch {
    /// New customer name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    /// New plate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
    /// New appointment time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<ReservationTime>,
    /// New service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// New assignee
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    /// New status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReservationStatus>,
    /// `Some(None)` clears the notes
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
}

impl ReservationPatch {
    /// Patch that only changes the status
    pub fn status(status: ReservationStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// True when applying this patch would change nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A field that is present maps to `Some`, even when its value is `null`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
