use chrono::{Datelike, NaiveDate, Weekday};

use crate::model::Settings;

/// The requested range does not span at least one whole night.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidDateRange;

impl std::fmt::Display for InvalidDateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "check-out must be after check-in")
    }
}

impl std::error::Error for InvalidDateRange {}

/// Whole-day difference between check-in and check-out.
pub fn nights_between(
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<u32, InvalidDateRange> {
    let nights = (check_out - check_in).num_days();
    if nights <= 0 {
        return Err(InvalidDateRange);
    }
    Ok(nights as u32)
}

/// Every date in `[check_in, check_out)`, in order. Recomputed from its
/// inputs on each call, nothing is cached.
pub fn night_dates(
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> impl Iterator<Item = NaiveDate> {
    check_in.iter_days().take_while(move |d| *d < check_out)
}

/// Friday and Saturday nights are weekend-priced. Fixed business rule.
pub fn is_weekend_night(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Fri | Weekday::Sat)
}

/// Sum of per-night prices over `[check_in, check_out)`.
/// Pure integer arithmetic, no side effects.
pub fn total_price(
    check_in: NaiveDate,
    check_out: NaiveDate,
    settings: &Settings,
) -> Result<i64, InvalidDateRange> {
    nights_between(check_in, check_out)?;
    Ok(night_dates(check_in, check_out)
        .map(|night| {
            if is_weekend_night(night) {
                settings.weekend_price
            } else {
                settings.weekday_price
            }
        })
        .sum())
}
