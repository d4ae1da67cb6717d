use std::time::Duration;

// Calendar dates outside this window are rejected outright; it keeps
// arithmetic far away from chrono's representable bounds.
pub const MIN_VALID_YEAR: i32 = 2000;
pub const MAX_VALID_YEAR: i32 = 2100;

/// Longest stay or block a single request may claim.
pub const MAX_RANGE_NIGHTS: i64 = 366;

/// Cap on bookings + blocks held in one calendar.
pub const MAX_CALENDAR_ENTRIES: usize = 50_000;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_PHONE_LEN: usize = 50;
pub const MAX_COMMENT_LEN: usize = 2_000;
pub const MAX_REASON_LEN: usize = 500;

/// Admin booking list page size.
pub const ADMIN_PAGE_SIZE: usize = 200;

/// A WAL append slower than this fails the write instead of hanging it.
pub const WAL_APPEND_TIMEOUT: Duration = Duration::from_secs(5);
