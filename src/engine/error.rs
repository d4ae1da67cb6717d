#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A required field was absent or blank.
    MissingFields,
    /// Dates out of order, out of bounds, or spanning zero nights.
    InvalidDates,
    /// Stay shorter than the configured minimum; carries it for display.
    BelowMinimumStay { min_nights: u32 },
    /// Requested stay overlaps an existing booking or block.
    DatesUnavailable,
    /// Requested block overlaps an existing booking.
    ConflictWithBooking,
    LimitExceeded(&'static str),
    WalError(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::MissingFields => write!(f, "missing required fields"),
            EngineError::InvalidDates => write!(f, "invalid date range"),
            EngineError::BelowMinimumStay { min_nights } => {
                write!(f, "stay is below the minimum of {min_nights} nights")
            }
            EngineError::DatesUnavailable => write!(f, "requested dates are unavailable"),
            EngineError::ConflictWithBooking => {
                write!(f, "range conflicts with an existing booking")
            }
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::WalError(e) => write!(f, "WAL error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}
