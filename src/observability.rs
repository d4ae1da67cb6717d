use std::net::SocketAddr;

use crate::engine::EngineError;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: bookings committed.
pub const BOOKINGS_TOTAL: &str = "innkeep_bookings_total";

/// Counter: booking attempts rejected. Labels: reason.
pub const BOOKINGS_REJECTED_TOTAL: &str = "innkeep_bookings_rejected_total";

/// Counter: admin blocks committed.
pub const BLOCKS_TOTAL: &str = "innkeep_blocks_total";

/// Counter: bookings cancelled.
pub const CANCELLATIONS_TOTAL: &str = "innkeep_cancellations_total";

/// Counter: admin requests with a wrong or missing credential.
pub const AUTH_FAILURES_TOTAL: &str = "innkeep_auth_failures_total";

/// Counter: notification sink delivery failures.
pub const NOTIFY_FAILURES_TOTAL: &str = "innkeep_notify_failures_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Histogram: WAL group-commit flush duration in seconds.
pub const WAL_FLUSH_DURATION_SECONDS: &str = "innkeep_wal_flush_duration_seconds";

/// Histogram: WAL group-commit batch size (events per flush).
pub const WAL_FLUSH_BATCH_SIZE: &str = "innkeep_wal_flush_batch_size";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}

/// Map a rejection to a short label for metrics.
pub fn rejection_label(err: &EngineError) -> &'static str {
    match err {
        EngineError::MissingFields => "missing_fields",
        EngineError::InvalidDates => "invalid_dates",
        EngineError::BelowMinimumStay { .. } => "below_minimum_stay",
        EngineError::DatesUnavailable => "dates_unavailable",
        EngineError::ConflictWithBooking => "conflict_with_booking",
        EngineError::LimitExceeded(_) => "limit_exceeded",
        EngineError::WalError(_) => "wal_error",
    }
}
