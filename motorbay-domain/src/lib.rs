//! Motorbay Domain Layer
//!
//! Pure reservation logic with zero I/O dependencies.
//! Contains the reservation entity, its form/patch shapes, and the
//! timestamp and calendar-zone value objects.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod entities;
pub mod value_objects;

// Re-export commonly used types
pub use entities::{
    Reservation, ReservationDraft, ReservationForm, ReservationId, ReservationPatch,
    ReservationStatus,
};
pub use value_objects::{CalendarZone, DomainError, Moment, ReservationTime};
