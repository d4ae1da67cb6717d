use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::model::{Booking, Event};

const CHANNEL_CAPACITY: usize = 256;

/// Broadcast hub for committed calendar events. Publishing never blocks
/// and a send with nobody listening is a no-op.
pub struct NotifyHub {
    tx: broadcast::Sender<Event>,
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    pub fn send(&self, event: &Event) {
        let _ = self.tx.send(event.clone());
    }
}

/// Where booking summaries end up. The transport (chat push, webhook) is
/// a collaborator behind this seam; the default just logs.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, text: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, text: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(target: "innkeep::notify", "{text}");
        Ok(())
    }
}

/// One-line summary of a fresh booking for the property owner.
pub fn booking_summary(booking: &Booking) -> String {
    let mut text = format!(
        "new booking {} | {} -> {} ({} nights) | {} guests | {} / {} | total {}",
        booking.id,
        booking.range.start,
        booking.range.end,
        booking.nights,
        booking.guests,
        booking.name,
        booking.phone,
        booking.total_price,
    );
    if let Some(ref comment) = booking.comment {
        text.push_str(" | ");
        text.push_str(comment);
    }
    text
}

/// Drains the hub and forwards booking summaries to the sink.
/// Best-effort by design: a sink failure is logged and counted, the
/// booking it belongs to was already committed.
pub async fn run_dispatcher(hub: Arc<NotifyHub>, sink: Arc<dyn NotificationSink>) {
    let mut rx = hub.subscribe();
    loop {
        match rx.recv().await {
            Ok(Event::BookingCreated { booking }) => {
                if let Err(e) = sink.deliver(&booking_summary(&booking)).await {
                    warn!("notification delivery failed for {}: {e}", booking.id);
                    metrics::counter!(crate::observability::NOTIFY_FAILURES_TOTAL).increment(1);
                }
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("notification dispatcher lagged, skipped {skipped} events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
