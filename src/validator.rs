// =============================================================================
// Request Validator: interval / range compatibility
// =============================================================================
//
// Rules, first failure wins:
//   1. interval must be one of the supported values
//   2. 1m data is only kept upstream for about a week: range ∈ {1d, 5d, 1wk}
//   3. other intraday intervals: range must not exceed 60
//
// Rule 3 has two modes.  `NumericPrefix` compares the leading integer of the
// range string, exactly like the legacy server did, so "90d" is rejected but
// "1y" (prefix 1) and "max" (no prefix) pass.  `Calendar` converts the range
// to days first and treats ranges it cannot size as too long.
// =============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Interval, RequestShape};

/// Longest range, in days, served for intraday intervals other than 1m.
pub const MAX_INTRADAY_RANGE_DAYS: i64 = 60;

/// Ranges accepted together with the 1m interval.
pub const ONE_MINUTE_RANGES: [&str; 3] = ["1d", "5d", "1wk"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeCheck {
    #[default]
    NumericPrefix,
    Calendar,
}

/// Why a request shape was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    UnsupportedInterval(String),
    OneMinuteRange(String),
    IntradayRange { interval: Interval, range: String },
}

impl Rejection {
    /// Client-facing reason, returned verbatim in the 400 body.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnsupportedInterval(_) => "unsupported interval",
            Self::OneMinuteRange(_) => "1m interval restricted to 1d/5d/1wk range",
            Self::IntradayRange { .. } => "intraday interval restricted to ≤60-day range",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

impl std::error::Error for Rejection {}

/// Decide whether the provider can serve `(interval, range)`.
pub fn validate(interval: &str, range: &str, mode: RangeCheck) -> Result<RequestShape, Rejection> {
    let interval: Interval = interval
        .parse()
        .map_err(|_| Rejection::UnsupportedInterval(interval.to_string()))?;

    match interval {
        Interval::OneMinute => {
            if !ONE_MINUTE_RANGES.contains(&range) {
                return Err(Rejection::OneMinuteRange(range.to_string()));
            }
        }
        i if i.is_intraday() => {
            if exceeds_intraday_limit(range, mode) {
                return Err(Rejection::IntradayRange {
                    interval,
                    range: range.to_string(),
                });
            }
        }
        _ => {}
    }

    debug!(%interval, range, "request shape accepted");
    Ok(RequestShape {
        interval,
        range: range.to_string(),
    })
}

fn exceeds_intraday_limit(range: &str, mode: RangeCheck) -> bool {
    match mode {
        RangeCheck::NumericPrefix => {
            matches!(numeric_prefix(range), Some(n) if n > MAX_INTRADAY_RANGE_DAYS)
        }
        RangeCheck::Calendar => match range_in_days(range) {
            Some(days) => days > MAX_INTRADAY_RANGE_DAYS,
            None => true,
        },
    }
}

/// Leading integer of `s`: optional whitespace and sign, then digits.
///
/// `None` when there are no digits (`"max"`, `"ytd"`, `""`). Saturates
/// instead of overflowing.
pub fn numeric_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit);
    let mut seen = false;
    let mut value: i64 = 0;
    for d in digits {
        seen = true;
        value = value.saturating_mul(10).saturating_add(i64::from(d - b'0'));
    }

    seen.then_some(if negative { -value } else { value })
}

/// Calendar length of a range string such as `30d`, `1wk`, `6mo` or `2y`.
///
/// A bare number counts as days. Returns `None` for ranges without a number
/// or with an unknown unit.
pub fn range_in_days(range: &str) -> Option<i64> {
    let range = range.trim();
    let split = range
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(range.len());
    let (count, unit) = range.split_at(split);
    let count: i64 = count.parse().ok()?;

    let days_per_unit = match unit {
        "" | "d" => 1,
        "wk" => 7,
        "mo" => 30,
        "y" => 365,
        _ => return None,
    };
    Some(count.saturating_mul(days_per_unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(interval: &str, range: &str) -> Result<RequestShape, Rejection> {
        validate(interval, range, RangeCheck::NumericPrefix)
    }

    #[test]
    fn unsupported_interval_rejected_first() {
        let err = check("4h", "90d").unwrap_err();
        assert_eq!(err, Rejection::UnsupportedInterval("4h".into()));
        assert_eq!(err.reason(), "unsupported interval");
    }

    #[test]
    fn one_minute_outside_week_rejected() {
        let err = check("1m", "30d").unwrap_err();
        assert_eq!(err.to_string(), "1m interval restricted to 1d/5d/1wk range");
    }

    #[test]
    fn one_minute_allowed_ranges() {
        for range in ONE_MINUTE_RANGES {
            let shape = check("1m", range).unwrap();
            assert_eq!(shape.interval, Interval::OneMinute);
            assert_eq!(shape.range, range);
        }
    }

    #[test]
    fn intraday_over_sixty_rejected() {
        let err = check("15m", "90d").unwrap_err();
        assert_eq!(err.reason(), "intraday interval restricted to ≤60-day range");
        assert!(check("1h", "61d").is_err());
    }

    #[test]
    fn intraday_at_limit_accepted() {
        assert!(check("15m", "60d").is_ok());
        assert!(check("90m", "30d").is_ok());
    }

    #[test]
    fn intraday_prefix_quirk_accepts_year() {
        // "1y" has numeric prefix 1, which is not > 60.
        assert!(check("15m", "1y").is_ok());
        assert!(check("5m", "6mo").is_ok());
        assert!(check("5m", "max").is_ok());
    }

    #[test]
    fn daily_intervals_ignore_range() {
        assert!(check("1d", "10y").is_ok());
        assert!(check("1wk", "900d").is_ok());
    }

    #[test]
    fn calendar_mode_sizes_units() {
        let strict = |i: &str, r: &str| validate(i, r, RangeCheck::Calendar);
        assert!(strict("15m", "1y").is_err());
        assert!(strict("15m", "3mo").is_err());
        assert!(strict("15m", "2mo").is_ok());
        assert!(strict("15m", "8wk").is_ok());
        assert!(strict("15m", "max").is_err());
        // 1m keeps its own rule.
        assert!(strict("1m", "1wk").is_ok());
    }

    #[test]
    fn numeric_prefix_behaves_like_parse_int() {
        assert_eq!(numeric_prefix("90d"), Some(90));
        assert_eq!(numeric_prefix("1y"), Some(1));
        assert_eq!(numeric_prefix("  12wk"), Some(12));
        assert_eq!(numeric_prefix("-5d"), Some(-5));
        assert_eq!(numeric_prefix("max"), None);
        assert_eq!(numeric_prefix(""), None);
        assert_eq!(numeric_prefix("99999999999999999999999d"), Some(i64::MAX));
    }

    #[test]
    fn range_in_days_units() {
        assert_eq!(range_in_days("30d"), Some(30));
        assert_eq!(range_in_days("1wk"), Some(7));
        assert_eq!(range_in_days("6mo"), Some(180));
        assert_eq!(range_in_days("2y"), Some(730));
        assert_eq!(range_in_days("45"), Some(45));
        assert_eq!(range_in_days("ytd"), None);
        assert_eq!(range_in_days("5h"), None);
    }
}
