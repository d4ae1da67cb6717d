use chrono::{Datelike, NaiveDate, Utc};
use ulid::Ulid;

use crate::limits::*;
use crate::model::{BlockedRange, Booking, DateRange, Event};
use crate::pricing;

use super::availability::{booking_conflict, conflicts};
use super::{Engine, EngineError};

/// A booking request with presence and date syntax already settled;
/// everything else is validated here.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub name: String,
    pub phone: String,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingReceipt {
    pub booking_id: Ulid,
    pub nights: u32,
    pub total_price: i64,
}

/// Dates must stay inside the supported window and the range inside the
/// maximum stay; applies to bookings and blocks alike.
fn validate_range(range: &DateRange) -> Result<(), EngineError> {
    if range.start.year() < MIN_VALID_YEAR || range.end.year() > MAX_VALID_YEAR {
        return Err(EngineError::InvalidDates);
    }
    if range.nights() > MAX_RANGE_NIGHTS {
        return Err(EngineError::LimitExceeded("range spans too many nights"));
    }
    Ok(())
}

impl Engine {
    /// The Booking Writer: validate, price, persist, notify — in that
    /// order, short-circuiting on the first failure. The conflict check
    /// and the insert happen under one write lock.
    pub async fn create_booking(&self, new: NewBooking) -> Result<BookingReceipt, EngineError> {
        if new.name.trim().is_empty() || new.phone.trim().is_empty() || new.guests == 0 {
            return Err(EngineError::MissingFields);
        }
        if new.name.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("name too long"));
        }
        if new.phone.len() > MAX_PHONE_LEN {
            return Err(EngineError::LimitExceeded("phone too long"));
        }
        if let Some(ref c) = new.comment
            && c.len() > MAX_COMMENT_LEN
        {
            return Err(EngineError::LimitExceeded("comment too long"));
        }

        let nights = pricing::nights_between(new.check_in, new.check_out)
            .map_err(|_| EngineError::InvalidDates)?;
        let range = DateRange::new(new.check_in, new.check_out);
        validate_range(&range)?;

        if nights < self.settings.min_nights {
            return Err(EngineError::BelowMinimumStay {
                min_nights: self.settings.min_nights,
            });
        }

        let mut cal = self.calendar().write().await;
        if cal.entry_count() >= MAX_CALENDAR_ENTRIES {
            return Err(EngineError::LimitExceeded("calendar is full"));
        }
        if conflicts(&cal, &range) {
            return Err(EngineError::DatesUnavailable);
        }

        let total_price = pricing::total_price(new.check_in, new.check_out, &self.settings)
            .map_err(|_| EngineError::InvalidDates)?;

        let booking = Booking {
            id: Ulid::new(),
            range,
            name: new.name,
            phone: new.phone,
            guests: new.guests,
            comment: new.comment,
            nights,
            total_price,
            created_at: Utc::now(),
        };
        let receipt = BookingReceipt {
            booking_id: booking.id,
            nights,
            total_price,
        };
        let event = Event::BookingCreated { booking };
        self.persist_and_apply(&mut cal, &event).await?;
        Ok(receipt)
    }

    /// The Admin Range Blocker. Subordinate to guest commitments: a block
    /// may overlap other blocks but never an existing booking.
    pub async fn block_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        reason: Option<String>,
    ) -> Result<Ulid, EngineError> {
        if (end - start).num_days() <= 0 {
            return Err(EngineError::InvalidDates);
        }
        let range = DateRange::new(start, end);
        validate_range(&range)?;
        if let Some(ref r) = reason
            && r.len() > MAX_REASON_LEN
        {
            return Err(EngineError::LimitExceeded("reason too long"));
        }

        let mut cal = self.calendar().write().await;
        if cal.entry_count() >= MAX_CALENDAR_ENTRIES {
            return Err(EngineError::LimitExceeded("calendar is full"));
        }
        if booking_conflict(&cal, &range).is_some() {
            return Err(EngineError::ConflictWithBooking);
        }

        let block = BlockedRange {
            id: Ulid::new(),
            range,
            reason,
            created_at: Utc::now(),
        };
        let id = block.id;
        let event = Event::RangeBlocked { block };
        self.persist_and_apply(&mut cal, &event).await?;
        Ok(id)
    }

    /// Idempotent delete: cancelling an unknown id is a no-op, not an
    /// error, and appends nothing to the WAL.
    pub async fn cancel_booking(&self, id: Ulid) -> Result<bool, EngineError> {
        let mut cal = self.calendar().write().await;
        if cal.find_booking(id).is_none() {
            return Ok(false);
        }
        let event = Event::BookingCancelled { id };
        self.persist_and_apply(&mut cal, &event).await?;
        Ok(true)
    }

    /// Rewrite the WAL with only the events needed to recreate the
    /// current state: one record per live booking and block.
    ///
    /// The read lock is held until the Compact command is enqueued: every
    /// append holds the write lock while it enqueues, so no append can
    /// land between the snapshot and the compaction in the command stream.
    /// An append ordered after Compact goes into the fresh WAL.
    pub async fn compact_wal(&self) -> Result<(), EngineError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        {
            let cal = self.calendar().read().await;
            let events: Vec<Event> = cal
                .bookings
                .iter()
                .map(|b| Event::BookingCreated { booking: b.clone() })
                .chain(cal.blocks.iter().map(|b| Event::RangeBlocked { block: b.clone() }))
                .collect();
            self.wal_tx
                .send(super::WalCommand::Compact {
                    events,
                    response: tx,
                })
                .await
                .map_err(|_| EngineError::WalError("WAL writer shut down".into()))?;
        }
        rx.await
            .map_err(|_| EngineError::WalError("WAL writer dropped response".into()))?
            .map_err(|e| EngineError::WalError(e.to_string()))
    }

    pub async fn wal_appends_since_compact(&self) -> u64 {
        let (tx, rx) = tokio::sync::oneshot::channel();
        if self
            .wal_tx
            .send(super::WalCommand::AppendsSinceCompact { response: tx })
            .await
            .is_err()
        {
            return 0;
        }
        rx.await.unwrap_or(0)
    }
}
