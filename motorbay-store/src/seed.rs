//! Seed data providers
//!
//! The adapter asks a `SeedProvider` for the initial collection whenever the
//! slot is empty or holds something it cannot parse.

use chrono::NaiveDate;
use motorbay_domain::{Reservation, ReservationId, ReservationStatus, ReservationTime};
use motorbay_domain::ReservationStatus::{Cancelled, Completed, Confirmed, Scheduled};

/// Supplies the collection written to an empty slot
pub trait SeedProvider: Send + Sync {
    /// Produce the seed collection. Must be deterministic.
    fn seed(&self) -> Vec<Reservation>;
}

/// No seed: an empty slot stays empty
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySeed;

impl SeedProvider for EmptySeed {
    fn seed(&self) -> Vec<Reservation> {
        Vec::new()
    }
}

/// Caller-supplied seed set
#[derive(Debug, Clone, Default)]
pub struct StaticSeed(pub Vec<Reservation>);

impl SeedProvider for StaticSeed {
    fn seed(&self) -> Vec<Reservation> {
        self.0.clone()
    }
}

/// Built-in demo data: 15 reservations between 2024-03-14 and 2024-03-18.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureSeed;

impl FixtureSeed {
    /// Number of records in the fixture set
    pub const LEN: usize = 15;
}

type Fixture = (
    &'static str,    // id
    &'static str,    // customer
    &'static str,    // plate
    (u32, u32, u32), // day of March 2024, hour, minute
    &'static str,    // service
    &'static str,    // assignee
    ReservationStatus,
    Option<&'static str>, // notes
);

#[rustfmt::skip]
const FIXTURES: [Fixture; FixtureSeed::LEN] = [
    ("res1", "김철수", "12가 3456", (14, 9, 0), "엔진 오일 교체", "김수리", Completed,
        Some("합성유 요청")),
    ("res2", "이영희", "34나 5678", (14, 11, 0), "타이어 위치 교환", "박정비", Completed,
        None),
    ("res3", "박민수", "56다 7890", (14, 15, 30), "정기 점검", "김수리", Cancelled,
        Some("고객 요청으로 취소")),
    ("res4", "정수진", "78라 1234", (15, 9, 30), "브레이크 오일 교체", "박정비", Confirmed,
        None),
    ("res5", "최동욱", "90마 5678", (15, 16, 0), "와이퍼 교체", "김수리", Scheduled,
        None),
    ("res6", "박서준", "12하 3456", (15, 10, 0), "브레이크 패드 교체", "김수리", Scheduled,
        Some("프론트 브레이크 패드만 교체 요청")),
    ("res7", "김민지", "34거 5678", (15, 13, 30), "타이어 교체", "박정비", Confirmed,
        Some("4개 타이어 모두 교체")),
    ("res8", "이준호", "56너 7890", (16, 9, 0), "에어컨 가스 충전", "김수리", Scheduled,
        None),
    ("res9", "최유진", "78더 1234", (16, 11, 30), "엔진 오일 교체", "박정비", Scheduled,
        Some("합성유로 교체 요청")),
    ("res10", "정우성", "90러 5678", (16, 14, 0), "정기 점검", "김수리", Confirmed,
        Some("30,000km 정기 점검")),
    ("res11", "송혜교", "12머 3456", (17, 10, 30), "배터리 교체", "박정비", Scheduled,
        None),
    ("res12", "강동원", "34버 5678", (17, 13, 0), "와이퍼 교체", "김수리", Scheduled,
        Some("앞뒤 와이퍼 모두 교체")),
    ("res13", "전지현", "56서 7890", (18, 9, 30), "헤드라이트 교체", "박정비", Scheduled,
        Some("우측 헤드라이트만 교체")),
    ("res14", "현빈", "78어 1234", (18, 11, 0), "냉각수 교체", "김수리", Scheduled,
        None),
    ("res15", "손예진", "90저 5678", (18, 14, 30), "에어필터 교체", "박정비", Scheduled,
        Some("에어컨 필터도 함께 교체")),
];

impl SeedProvider for FixtureSeed {
    fn seed(&self) -> Vec<Reservation> {
        FIXTURES
            .iter()
            .filter_map(|&(id, customer, plate, slot, service, assignee, status, notes)| {
                let (day, hour, minute) = slot;
                let wall_clock =
                    NaiveDate::from_ymd_opt(2024, 3, day)?.and_hms_opt(hour, minute, 0)?;
                Some(Reservation {
                    id: ReservationId::from(id),
                    customer_name: customer.to_string(),
                    license_plate: plate.to_string(),
                    date: ReservationTime::from(wall_clock),
                    service: service.to_string(),
                    assigned_to: assignee.to_string(),
                    status,
                    notes: notes.map(str::to_string),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fixture_seed_is_complete_and_deterministic() {
        let first = FixtureSeed.seed();
        let second = FixtureSeed.seed();

        assert_eq!(first.len(), FixtureSeed::LEN);
        assert_eq!(first, second);
    }

    #[test]
    fn test_fixture_ids_unique() {
        let ids: HashSet<_> = FixtureSeed.seed().into_iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), FixtureSeed::LEN);
    }

    #[test]
    fn test_fixture_covers_every_status() {
        let seen: HashSet<_> = FixtureSeed.seed().into_iter().map(|r| r.status).collect();
        for status in ReservationStatus::ALL {
            assert!(seen.contains(&status), "missing {}", status);
        }
    }

    #[test]
    fn test_empty_and_static_seed() {
        assert!(EmptySeed.seed().is_empty());

        let fixtures = FixtureSeed.seed();
        let custom = StaticSeed(fixtures[..2].to_vec());
        assert_eq!(custom.seed(), fixtures[..2].to_vec());
    }
}
