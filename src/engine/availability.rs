use chrono::NaiveDate;
use serde::Serialize;
use ulid::Ulid;

use crate::model::{CalendarState, DateRange};

// ── Availability Index ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookedSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub reason: Option<String>,
}

/// What the public calendar page renders: committed stays and admin
/// closures, each ordered by start date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilitySnapshot {
    pub booked: Vec<BookedSpan>,
    pub blocked: Vec<BlockedSpan>,
}

/// Collect booked and blocked ranges, restricted to those overlapping
/// `window` when one is given. Ranges are returned whole, not clamped.
/// Both lists come out sorted by start because the state is kept sorted.
pub fn snapshot(cal: &CalendarState, window: Option<&DateRange>) -> AvailabilitySnapshot {
    let booked = match window {
        Some(w) => cal
            .bookings_overlapping(w)
            .map(|b| BookedSpan {
                start: b.range.start,
                end: b.range.end,
            })
            .collect(),
        None => cal
            .bookings
            .iter()
            .map(|b| BookedSpan {
                start: b.range.start,
                end: b.range.end,
            })
            .collect(),
    };
    let blocked = match window {
        Some(w) => cal
            .blocks_overlapping(w)
            .map(|b| BlockedSpan {
                start: b.range.start,
                end: b.range.end,
                reason: b.reason.clone(),
            })
            .collect(),
        None => cal
            .blocks
            .iter()
            .map(|b| BlockedSpan {
                start: b.range.start,
                end: b.range.end,
                reason: b.reason.clone(),
            })
            .collect(),
    };
    AvailabilitySnapshot { booked, blocked }
}

/// True if `range` overlaps any existing booking or block. This is the
/// one overlap predicate; booking and block validation both go through
/// it (or `booking_conflict`) so the feed and the writers cannot diverge.
pub fn conflicts(cal: &CalendarState, range: &DateRange) -> bool {
    cal.bookings_overlapping(range).next().is_some()
        || cal.blocks_overlapping(range).next().is_some()
}

/// The id of the first booking overlapping `range`, if any. Blocks are
/// ignored: an admin block may overlap other blocks, never a booking.
pub fn booking_conflict(cal: &CalendarState, range: &DateRange) -> Option<Ulid> {
    cal.bookings_overlapping(range).next().map(|b| b.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockedRange, Booking};
    use chrono::Utc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn range(a: u32, b: u32) -> DateRange {
        DateRange::new(day(a), day(b))
    }

    fn calendar(bookings: &[(u32, u32)], blocks: &[(u32, u32)]) -> CalendarState {
        let mut cal = CalendarState::new();
        for &(a, b) in bookings {
            let r = range(a, b);
            cal.insert_booking(Booking {
                id: Ulid::new(),
                range: r,
                name: "Guest".into(),
                phone: "+1".into(),
                guests: 1,
                comment: None,
                nights: r.nights() as u32,
                total_price: 0,
                created_at: Utc::now(),
            });
        }
        for &(a, b) in blocks {
            cal.insert_block(BlockedRange {
                id: Ulid::new(),
                range: range(a, b),
                reason: None,
                created_at: Utc::now(),
            });
        }
        cal
    }

    #[test]
    fn snapshot_without_window_returns_everything() {
        let cal = calendar(&[(20, 22), (3, 5)], &[(10, 12)]);
        let snap = snapshot(&cal, None);
        assert_eq!(snap.booked.len(), 2);
        assert_eq!(snap.blocked.len(), 1);
        // Ordered by start ascending.
        assert_eq!(snap.booked[0].start, day(3));
        assert_eq!(snap.booked[1].start, day(20));
    }

    #[test]
    fn snapshot_window_filters_by_overlap() {
        let cal = calendar(&[(3, 5), (10, 14), (20, 22)], &[(4, 6), (25, 28)]);
        let snap = snapshot(&cal, Some(&range(5, 21)));
        // [3,5) ends exactly at the window start — excluded (half-open).
        assert_eq!(snap.booked.len(), 2);
        assert_eq!(snap.booked[0].start, day(10));
        assert_eq!(snap.booked[1].start, day(20));
        // [4,6) reaches one day into the window and is returned whole.
        assert_eq!(snap.blocked.len(), 1);
        assert_eq!(snap.blocked[0].start, day(4));
        assert_eq!(snap.blocked[0].end, day(6));
    }

    #[test]
    fn conflicts_sees_bookings_and_blocks() {
        let cal = calendar(&[(7, 9)], &[(15, 18)]);
        assert!(conflicts(&cal, &range(8, 10)));
        assert!(conflicts(&cal, &range(14, 16)));
        assert!(!conflicts(&cal, &range(9, 15)));
        // Adjacency is not a conflict.
        assert!(!conflicts(&cal, &range(5, 7)));
        assert!(!conflicts(&cal, &range(18, 20)));
    }

    #[test]
    fn booking_conflict_ignores_blocks() {
        let cal = calendar(&[(7, 9)], &[(15, 18)]);
        assert!(booking_conflict(&cal, &range(8, 10)).is_some());
        assert!(booking_conflict(&cal, &range(14, 16)).is_none());
    }
}
