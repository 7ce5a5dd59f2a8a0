//! Usage window resolution
//!
//! A range expression is `[start][:end]` with dates as `YYYY-MM-DD`:
//!
//! | input                     | start             | end        |
//! |---------------------------|-------------------|------------|
//! | (none)                    | today - 14 days   | today      |
//! | `2025-01-01:2025-02-01`   | 2025-01-01        | 2025-02-01 |
//! | `2025-01-01:`             | 2025-01-01        | today      |
//! | `:2025-02-01`             | end - 180 days    | 2025-02-01 |
//!
//! Ends in the future are pulled back to today, and windows longer than
//! 180 days are narrowed by moving the start forward. Both adjustments are
//! reported, not rejected.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use simfleet_config::UsageSettings;
use simfleet_util::{format_date, DATE_FORMAT};
use std::fmt;
use tracing::debug;

use crate::DateRangeError;

/// Inclusive date window, `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", format_date(self.start), format_date(self.end))
    }
}

/// A recoverable change applied while resolving
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeAdjustment {
    EndClamped { requested: NaiveDate, today: NaiveDate },
    WindowNarrowed { requested_start: NaiveDate, start: NaiveDate, max_days: u32 },
}

impl fmt::Display for RangeAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeAdjustment::EndClamped { requested, today } => write!(
                f,
                "End date {} is in the future; using {}",
                format_date(*requested),
                format_date(*today)
            ),
            RangeAdjustment::WindowNarrowed {
                requested_start,
                start,
                max_days,
            } => write!(
                f,
                "Range exceeds {} days; start moved from {} to {}",
                max_days,
                format_date(*requested_start),
                format_date(*start)
            ),
        }
    }
}

/// Resolved window plus any adjustments made on the way
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRange {
    pub range: DateRange,
    pub adjustments: Vec<RangeAdjustment>,
}

impl ResolvedRange {
    pub fn was_adjusted(&self) -> bool {
        !self.adjustments.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRangeResolver {
    default_window_days: u32,
    max_window_days: u32,
}

impl Default for DateRangeResolver {
    fn default() -> Self {
        Self::from_settings(&UsageSettings::default())
    }
}

impl DateRangeResolver {
    pub fn new(default_window_days: u32, max_window_days: u32) -> Self {
        Self {
            default_window_days,
            max_window_days,
        }
    }

    pub fn from_settings(settings: &UsageSettings) -> Self {
        Self::new(settings.default_window_days, settings.max_window_days)
    }

    pub fn resolve(&self, input: Option<&str>, today: NaiveDate) -> Result<ResolvedRange, DateRangeError> {
        let max_window = Duration::days(i64::from(self.max_window_days));

        let (start_part, end_part) = match input.map(str::trim).filter(|s| !s.is_empty()) {
            None => ("", ""),
            Some(expr) => match expr.split_once(':') {
                Some((start, end)) => (start.trim(), end.trim()),
                None => (expr, ""),
            },
        };

        let (mut start, mut end) = match (start_part.is_empty(), end_part.is_empty()) {
            (true, true) => (
                today - Duration::days(i64::from(self.default_window_days)),
                today,
            ),
            (false, false) => {
                let start = parse_date(start_part)?;
                let end = parse_date(end_part)?;
                if start > end {
                    return Err(invalid_range(start, end));
                }
                (start, end)
            }
            (false, true) => (parse_date(start_part)?, today),
            (true, false) => {
                let end = parse_date(end_part)?;
                (end - max_window, end)
            }
        };

        let mut adjustments = Vec::new();

        if end > today {
            adjustments.push(RangeAdjustment::EndClamped {
                requested: end,
                today,
            });
            end = today;
        }

        if end - start > max_window {
            let narrowed = end - max_window;
            adjustments.push(RangeAdjustment::WindowNarrowed {
                requested_start: start,
                start: narrowed,
                max_days: self.max_window_days,
            });
            start = narrowed;
        }

        // A start after today survives clamping the end; that is still a bad range
        if start > end {
            return Err(invalid_range(start, end));
        }

        let range = DateRange { start, end };
        debug!(%range, adjusted = !adjustments.is_empty(), "Usage range resolved");

        Ok(ResolvedRange { range, adjustments })
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, DateRangeError> {
    // Length check rejects chrono's lenient single-digit month/day parsing
    if s.len() != 10 {
        return Err(DateRangeError::InvalidDateFormat(s.to_string()));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| DateRangeError::InvalidDateFormat(s.to_string()))
}

fn invalid_range(start: NaiveDate, end: NaiveDate) -> DateRangeError {
    DateRangeError::InvalidRange {
        start: format_date(start),
        end: format_date(end),
    }
}
