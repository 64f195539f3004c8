use crate::core::error::{Result, SettlementError};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive `[start, end]` time window for reports.
///
/// Deserialization goes through [`DateWindow::new`], so a reversed window
/// is rejected there too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WindowBounds")]
pub struct DateWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct WindowBounds {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<WindowBounds> for DateWindow {
    type Error = SettlementError;

    fn try_from(bounds: WindowBounds) -> Result<Self> {
        Self::new(bounds.start, bounds.end)
    }
}

impl DateWindow {
    /// Fails with `InvalidRange` if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(SettlementError::InvalidRange(format!(
                "start {} is after end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse ISO-8601 bounds.
    ///
    /// Each bound is either an RFC 3339 timestamp or a plain `YYYY-MM-DD`
    /// date. A plain start date means midnight; a plain end date covers the
    /// whole day.
    ///
    /// ```
    /// use marketplace_settlement::reporting::window::DateWindow;
    ///
    /// let window = DateWindow::parse("2020-08-10", "2020-08-15").unwrap();
    /// assert_eq!(window.end().to_rfc3339(), "2020-08-15T23:59:59.999999999+00:00");
    /// ```
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = parse_bound(start, false)?;
        let end = parse_bound(end, true)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

fn parse_bound(input: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Ok(instant.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|e| {
        SettlementError::InvalidRange(format!("cannot parse '{}' as a date: {}", input, e))
    })?;
    if !end_of_day {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    date.and_hms_nano_opt(23, 59, 59, 999_999_999)
        .map(|last| last.and_utc())
        .ok_or_else(|| SettlementError::InvalidRange(format!("no end of day for '{}'", input)))
}
