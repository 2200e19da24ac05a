//! Holding period classification
//!
//! A gain is long-term when the matched lot was held for strictly more than
//! one year. "One year" is a fixed 365 days of milliseconds and does not
//! follow the calendar: selling on the anniversary of the acquisition is
//! long-term when the span crosses a February 29th and short-term otherwise.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::fmt;

/// One year expressed in milliseconds (365 days, leap days ignored)
pub const ONE_YEAR_MS: i64 = 365 * 24 * 60 * 60 * 1000;

/// Whether a disposed quantity counts as a short or long term holding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingTerm {
    ShortTerm,
    LongTerm,
}

impl HoldingTerm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HoldingTerm::ShortTerm => "Short-term",
            HoldingTerm::LongTerm => "Long-term",
        }
    }
}

impl fmt::Display for HoldingTerm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a holding duration. Exactly one year is still short-term.
pub fn classify(held: Duration) -> HoldingTerm {
    if held.num_milliseconds() > ONE_YEAR_MS {
        HoldingTerm::LongTerm
    } else {
        HoldingTerm::ShortTerm
    }
}

/// Time elapsed between acquisition and disposal (negative if disposed first)
pub fn held_between(acquired: NaiveDate, disposed: NaiveDate) -> Duration {
    disposed.signed_duration_since(acquired)
}

/// Convenience wrapper classifying the span between two calendar days
pub fn classify_dates(acquired: NaiveDate, disposed: NaiveDate) -> HoldingTerm {
    classify(held_between(acquired, disposed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_exactly_one_year_is_short_term() {
        assert_eq!(classify(Duration::milliseconds(ONE_YEAR_MS)), HoldingTerm::ShortTerm);
        assert_eq!(classify(Duration::days(365)), HoldingTerm::ShortTerm);
    }

    #[test]
    fn test_one_millisecond_past_one_year_is_long_term() {
        let held = Duration::days(365) + Duration::milliseconds(1);
        assert_eq!(classify(held), HoldingTerm::LongTerm);
    }

    #[test]
    fn test_same_day_is_short_term() {
        assert_eq!(classify(Duration::zero()), HoldingTerm::ShortTerm);
    }

    #[test]
    fn test_leap_year_needs_366_days() {
        // 2020-02-01 -> 2021-02-01 spans Feb 29th: 366 days, long-term.
        assert_eq!(classify_dates(date(2020, 2, 1), date(2021, 2, 1)), HoldingTerm::LongTerm);
        // A calendar year without a leap day is exactly 365 days: short-term.
        assert_eq!(classify_dates(date(2021, 2, 1), date(2022, 2, 1)), HoldingTerm::ShortTerm);
        // The day after is long-term.
        assert_eq!(classify_dates(date(2021, 2, 1), date(2022, 2, 2)), HoldingTerm::LongTerm);
    }

    #[test]
    fn test_held_between_is_signed() {
        let held = held_between(date(2022, 3, 1), date(2022, 2, 1));
        assert!(held < Duration::zero());
    }
}
