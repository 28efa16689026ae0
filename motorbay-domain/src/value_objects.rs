//! Value Objects for the Motorbay Domain
//!
//! Immutable, validated primitives used by the reservation entity.
//! All value objects enforce invariants at construction time.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Domain errors for validation at the boundary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A required form field was absent or blank
    #[error("{0} is required")]
    MissingField(String),

    /// Timestamp could not be parsed as ISO-8601
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Status is not one of the four known values
    #[error("Invalid reservation status: {0}")]
    InvalidStatus(String),

    /// Calendar zone is neither `local` nor a UTC offset
    #[error("Invalid calendar zone: {0}")]
    InvalidCalendarZone(String),
}

// =============================================================================
// ReservationTime
// =============================================================================

/// Parsed form of an appointment timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Moment {
    /// Absolute instant with an explicit UTC offset
    Zoned(DateTime<FixedOffset>),
    /// Wall-clock time in whatever calendar zone evaluates it
    Floating(NaiveDateTime),
}

/// Appointment timestamp.
///
/// The dashboard wrote two shapes of ISO-8601: zoned (`2024-03-15T10:00:00+09:00`,
/// `2024-03-15T01:00:00.000Z`) and floating wall-clock time without an offset
/// (`2024-03-15T10:00:00`). The text is kept exactly as read, so a stored
/// collection is written back byte-for-byte.
///
/// # Invariants
/// - `text` always parses to `moment`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReservationTime {
    moment: Moment,
    text: String,
}

impl ReservationTime {
    const FLOATING_FORMATS: [&'static str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

    /// Parse an ISO-8601 timestamp, keeping the input text
    ///
    /// # Errors
    /// Returns `DomainError::InvalidTimestamp` if neither shape matches
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let trimmed = value.trim();

        let moment = match DateTime::parse_from_rfc3339(trimmed) {
            Ok(zoned) => Moment::Zoned(zoned),
            Err(_) => Self::FLOATING_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(Moment::Floating)
                .ok_or_else(|| DomainError::InvalidTimestamp(trimmed.to_string()))?,
        };

        Ok(Self {
            moment,
            text: value.to_string(),
        })
    }

    /// Parsed value
    pub fn moment(&self) -> Moment {
        self.moment
    }

    /// Text as originally supplied
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Calendar day of this timestamp as seen from `zone`.
    ///
    /// Floating timestamps are already wall-clock time, so their date is
    /// taken as-is. Zoned timestamps are converted into `zone` first, which
    /// means the same instant can land on different days in different zones.
    pub fn day_in(&self, zone: CalendarZone) -> NaiveDate {
        match &self.moment {
            Moment::Zoned(instant) => zone.date_of(instant),
            Moment::Floating(wall_clock) => wall_clock.date(),
        }
    }
}

impl fmt::Display for ReservationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for ReservationTime {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<DateTime<FixedOffset>> for ReservationTime {
    fn from(instant: DateTime<FixedOffset>) -> Self {
        Self {
            moment: Moment::Zoned(instant),
            text: instant.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }
}

impl From<NaiveDateTime> for ReservationTime {
    fn from(wall_clock: NaiveDateTime) -> Self {
        Self {
            moment: Moment::Floating(wall_clock),
            text: wall_clock.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        }
    }
}

impl Serialize for ReservationTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for ReservationTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// CalendarZone
// =============================================================================

/// Timezone used to decide which calendar day a zoned timestamp falls on.
///
/// `Local` follows the evaluating process's timezone, which makes day
/// filtering depend on the host. Use `Fixed` for deterministic results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarZone {
    /// Local timezone of the running process
    #[default]
    Local,
    /// Fixed UTC offset
    Fixed(FixedOffset),
}

impl CalendarZone {
    /// UTC as a fixed zone
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    /// Fixed zone `hours` east of UTC
    ///
    /// # Errors
    /// Returns `DomainError::InvalidCalendarZone` if the offset is out of range
    pub fn east_hours(hours: i32) -> Result<Self, DomainError> {
        hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .map(Self::Fixed)
            .ok_or_else(|| DomainError::InvalidCalendarZone(format!("{hours}h")))
    }

    /// Calendar date of `instant` in this zone
    pub fn date_of(&self, instant: &DateTime<FixedOffset>) -> NaiveDate {
        match self {
            Self::Local => instant.with_timezone(&Local).date_naive(),
            Self::Fixed(offset) => instant.with_timezone(offset).date_naive(),
        }
    }

    /// Today's date in this zone
    pub fn today(&self) -> NaiveDate {
        self.date_of(&Utc::now().with_timezone(&Utc.fix()))
    }

    /// Parse `local`, `utc`/`z`, or an offset such as `+09:00`, `-0530`, `+9`
    ///
    /// # Errors
    /// Returns `DomainError::InvalidCalendarZone` for anything else
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let trimmed = value.trim();
        let invalid = || DomainError::InvalidCalendarZone(trimmed.to_string());

        match trimmed.to_lowercase().as_str() {
            "local" => return Ok(Self::Local),
            "utc" | "z" => return Ok(Self::utc()),
            _ => {},
        }

        let (sign, rest) = match trimmed.as_bytes().first() {
            Some(b'+') => (1, &trimmed[1..]),
            Some(b'-') => (-1, &trimmed[1..]),
            _ => return Err(invalid()),
        };

        let (hours, minutes) = match rest.split_once(':') {
            Some((h, m)) => (h, m),
            None if rest.len() == 4 && rest.is_ascii() => rest.split_at(2),
            None => (rest, "0"),
        };
        let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !digits(hours) || !digits(minutes) {
            return Err(invalid());
        }
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if hours > 23 || minutes > 59 {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Self::Fixed)
            .ok_or_else(invalid)
    }
}

impl FromStr for CalendarZone {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CalendarZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_floating() {
        let time = ReservationTime::parse("2024-03-15T10:00:00").unwrap();
        assert!(matches!(time.moment(), Moment::Floating(_)));
        assert_eq!(time.to_string(), "2024-03-15T10:00:00");
    }

    #[test]
    fn test_parse_floating_without_seconds() {
        let time = ReservationTime::parse("2024-03-15T10:30").unwrap();
        assert_eq!(time.to_string(), "2024-03-15T10:30");

        let expected = NaiveDate::from_ymd_opt(2024, 3, 15)
            .and_then(|d| d.and_hms_opt(10, 30, 0))
            .unwrap();
        assert_eq!(time.moment(), Moment::Floating(expected));
    }

    #[test]
    fn test_parse_zoned_keeps_offset() {
        let time = ReservationTime::parse("2024-03-15T10:00:00+09:00").unwrap();
        assert!(matches!(time.moment(), Moment::Zoned(_)));
        assert_eq!(time.to_string(), "2024-03-15T10:00:00+09:00");
    }

    #[test]
    fn test_zoned_millisecond_text_survives_serde() {
        // Browser `toISOString()` output
        let json = "\"2024-03-15T01:00:00.000Z\"";

        let time: ReservationTime = serde_json::from_str(json).unwrap();
        let seoul = CalendarZone::east_hours(9).unwrap();
        assert_eq!(time.day_in(seoul), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(serde_json::to_string(&time).unwrap(), json);
    }

    #[test]
    fn test_built_from_chrono_values() {
        let wall_clock = NaiveDate::from_ymd_opt(2024, 3, 15)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap();
        assert_eq!(ReservationTime::from(wall_clock).as_str(), "2024-03-15T09:00:00");

        let instant = DateTime::parse_from_rfc3339("2024-03-15T09:00:00+09:00").unwrap();
        assert_eq!(ReservationTime::from(instant).as_str(), "2024-03-15T09:00:00+09:00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            ReservationTime::parse("next tuesday"),
            Err(DomainError::InvalidTimestamp("next tuesday".to_string()))
        );
    }

    #[test]
    fn test_floating_day_ignores_zone() {
        let time = ReservationTime::parse("2024-03-15T23:30:00").unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        assert_eq!(time.day_in(CalendarZone::utc()), day);
        assert_eq!(time.day_in(CalendarZone::east_hours(9).unwrap()), day);
        assert_eq!(time.day_in(CalendarZone::east_hours(-8).unwrap()), day);
    }

    #[test]
    fn test_zoned_day_depends_on_zone() {
        // 23:30 UTC on the 15th is already the 16th in Seoul
        let time = ReservationTime::parse("2024-03-15T23:30:00Z").unwrap();

        assert_eq!(
            time.day_in(CalendarZone::utc()),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
        assert_eq!(
            time.day_in(CalendarZone::east_hours(9).unwrap()),
            NaiveDate::from_ymd_opt(2024, 3, 16).unwrap()
        );
    }

    #[test]
    fn test_serde_roundtrip_is_string() {
        let time = ReservationTime::parse("2024-03-15T10:00:00").unwrap();
        let json = serde_json::to_string(&time).unwrap();
        assert_eq!(json, "\"2024-03-15T10:00:00\"");

        let back: ReservationTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, time);
    }

    #[test]
    fn test_calendar_zone_parse() {
        assert_eq!(CalendarZone::parse("local").unwrap(), CalendarZone::Local);
        assert_eq!(CalendarZone::parse("UTC").unwrap(), CalendarZone::utc());
        assert_eq!(CalendarZone::parse("+09:00").unwrap(), CalendarZone::east_hours(9).unwrap());
        assert_eq!(CalendarZone::parse("+0900").unwrap(), CalendarZone::east_hours(9).unwrap());
        assert_eq!(CalendarZone::parse("-8").unwrap(), CalendarZone::east_hours(-8).unwrap());
        assert_eq!(
            CalendarZone::parse("+05:30").unwrap(),
            CalendarZone::Fixed(FixedOffset::east_opt(5 * 3600 + 1800).unwrap())
        );
    }

    #[test]
    fn test_calendar_zone_parse_invalid() {
        assert!(CalendarZone::parse("Asia/Seoul").is_err());
        assert!(CalendarZone::parse("+09:75").is_err());
        assert!(CalendarZone::parse("+30:00").is_err());
        assert!(CalendarZone::parse("+999999").is_err());
        assert!(CalendarZone::parse("-99999999999").is_err());
        assert!(CalendarZone::parse("+:30").is_err());
        assert!(CalendarZone::east_hours(i32::MAX).is_err());
    }
}
