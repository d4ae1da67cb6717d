use chrono::NaiveDate;

use crate::limits::ADMIN_PAGE_SIZE;
use crate::model::{Booking, DateRange};

use super::availability::{self, AvailabilitySnapshot};
use super::{Engine, EngineError};

impl Engine {
    /// The public availability feed. Both bounds restrict the snapshot to
    /// overlapping ranges; with either bound missing, everything is
    /// returned (matching the client's initial full-calendar load).
    /// An inverted or empty window overlaps nothing and yields empty lists.
    pub async fn availability(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<AvailabilitySnapshot, EngineError> {
        let window = match (from, to) {
            (Some(f), Some(t)) => {
                if f >= t {
                    return Ok(AvailabilitySnapshot {
                        booked: Vec::new(),
                        blocked: Vec::new(),
                    });
                }
                Some(DateRange::new(f, t))
            }
            _ => None,
        };
        let cal = self.calendar().read().await;
        Ok(availability::snapshot(&cal, window.as_ref()))
    }

    /// Admin view: most recent first, capped at one page.
    pub async fn list_bookings(&self) -> Vec<Booking> {
        let cal = self.calendar().read().await;
        let mut rows = cal.bookings.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows.truncate(ADMIN_PAGE_SIZE);
        rows
    }
}
