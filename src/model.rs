use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Half-open range of calendar dates `[start, end)`.
///
/// Check-out day is excluded so back-to-back stays can share a turnover
/// day: `[10, 12)` and `[12, 14)` do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        debug_assert!(start < end, "DateRange start must be before end");
        Self { start, end }
    }

    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_day(&self, day: NaiveDate) -> bool {
        self.start <= day && day < self.end
    }
}

/// A confirmed guest reservation. Deleted wholesale on cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Ulid,
    pub range: DateRange,
    pub name: String,
    pub phone: String,
    pub guests: u32,
    pub comment: Option<String>,
    pub nights: u32,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
}

/// An administrative closure of the calendar. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedRange {
    pub id: Ulid,
    pub range: DateRange,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-night prices and the minimum stay. Externally configured,
/// read-only to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub weekday_price: i64,
    pub weekend_price: i64,
    pub min_nights: u32,
}

/// The whole calendar of one property: bookings and blocks, each sorted
/// by range start so overlap scans can binary-search.
#[derive(Debug, Clone, Default)]
pub struct CalendarState {
    pub bookings: Vec<Booking>,
    pub blocks: Vec<BlockedRange>,
}

impl CalendarState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry_count(&self) -> usize {
        self.bookings.len() + self.blocks.len()
    }

    /// Insert maintaining sort order by range start.
    pub fn insert_booking(&mut self, booking: Booking) {
        let pos = self
            .bookings
            .partition_point(|b| b.range.start < booking.range.start);
        self.bookings.insert(pos, booking);
    }

    pub fn remove_booking(&mut self, id: Ulid) -> Option<Booking> {
        let pos = self.bookings.iter().position(|b| b.id == id)?;
        Some(self.bookings.remove(pos))
    }

    pub fn find_booking(&self, id: Ulid) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    pub fn insert_block(&mut self, block: BlockedRange) {
        let pos = self
            .blocks
            .partition_point(|b| b.range.start < block.range.start);
        self.blocks.insert(pos, block);
    }

    /// Bookings whose range overlaps the query window.
    /// Entries starting at or after `query.end` are skipped via binary search.
    pub fn bookings_overlapping(&self, query: &DateRange) -> impl Iterator<Item = &Booking> {
        let right = self
            .bookings
            .partition_point(|b| b.range.start < query.end);
        self.bookings[..right]
            .iter()
            .filter(move |b| b.range.end > query.start)
    }

    pub fn blocks_overlapping(&self, query: &DateRange) -> impl Iterator<Item = &BlockedRange> {
        let right = self.blocks.partition_point(|b| b.range.start < query.end);
        self.blocks[..right]
            .iter()
            .filter(move |b| b.range.end > query.start)
    }
}

/// The committed write events. This is the WAL record format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    BookingCreated { booking: Booking },
    BookingCancelled { id: Ulid },
    RangeBlocked { block: BlockedRange },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range(a: u32, b: u32) -> DateRange {
        DateRange::new(day(2024, 1, a), day(2024, 1, b))
    }

    fn booking(a: u32, b: u32) -> Booking {
        let r = range(a, b);
        Booking {
            id: Ulid::new(),
            range: r,
            name: "Guest".into(),
            phone: "+100".into(),
            guests: 2,
            comment: None,
            nights: r.nights() as u32,
            total_price: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn range_basics() {
        let r = range(10, 13);
        assert_eq!(r.nights(), 3);
        assert!(r.contains_day(day(2024, 1, 10)));
        assert!(r.contains_day(day(2024, 1, 12)));
        assert!(!r.contains_day(day(2024, 1, 13))); // half-open
    }

    #[test]
    fn range_overlap_half_open() {
        // Adjacent ranges share a turnover day and do not conflict.
        let a = range(10, 12);
        let b = range(12, 14);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));

        let c = range(10, 13);
        let d = range(12, 14);
        assert!(c.overlaps(&d));
        assert!(d.overlaps(&c)); // symmetric
    }

    #[test]
    fn insert_keeps_bookings_sorted() {
        let mut cal = CalendarState::new();
        cal.insert_booking(booking(20, 22));
        cal.insert_booking(booking(5, 8));
        cal.insert_booking(booking(12, 14));
        let starts: Vec<_> = cal.bookings.iter().map(|b| b.range.start).collect();
        assert_eq!(
            starts,
            vec![day(2024, 1, 5), day(2024, 1, 12), day(2024, 1, 20)]
        );
    }

    #[test]
    fn remove_booking_by_id() {
        let mut cal = CalendarState::new();
        let b = booking(10, 12);
        let id = b.id;
        cal.insert_booking(b);
        assert!(cal.remove_booking(id).is_some());
        assert!(cal.remove_booking(id).is_none());
        assert!(cal.bookings.is_empty());
    }

    #[test]
    fn overlapping_scan_skips_disjoint() {
        let mut cal = CalendarState::new();
        cal.insert_booking(booking(1, 3));
        cal.insert_booking(booking(10, 13));
        cal.insert_booking(booking(20, 25));

        let hits: Vec<_> = cal.bookings_overlapping(&range(12, 21)).collect();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].range.start, day(2024, 1, 10));
        assert_eq!(hits[1].range.start, day(2024, 1, 20));
    }

    #[test]
    fn overlapping_scan_excludes_adjacent() {
        let mut cal = CalendarState::new();
        cal.insert_booking(booking(10, 12));
        // Query starting exactly at the booking's end sees nothing.
        assert_eq!(cal.bookings_overlapping(&range(12, 14)).count(), 0);
        // Query ending exactly at the booking's start sees nothing.
        assert_eq!(cal.bookings_overlapping(&range(8, 10)).count(), 0);
    }

    #[test]
    fn blocks_may_overlap_each_other() {
        let mut cal = CalendarState::new();
        for (a, b) in [(10u32, 14u32), (12, 16)] {
            cal.insert_block(BlockedRange {
                id: Ulid::new(),
                range: range(a, b),
                reason: None,
                created_at: Utc::now(),
            });
        }
        assert_eq!(cal.blocks_overlapping(&range(13, 14)).count(), 2);
    }

    #[test]
    fn event_serialization_roundtrip() {
        let event = Event::BookingCreated {
            booking: booking(7, 9),
        };
        let bytes = bincode::serialize(&event).unwrap();
        let decoded: Event = bincode::deserialize(&bytes).unwrap();
        assert_eq!(event, decoded);
    }
}
