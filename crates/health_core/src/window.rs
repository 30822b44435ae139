use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HealthError;
use crate::types::SeriesPoint;

/// Trailing time range applied to a series for display.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeWindow {
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[default]
    #[serde(rename = "ALL")]
    All,
}

impl TimeWindow {
    pub const ALL_WINDOWS: [TimeWindow; 4] = [
        TimeWindow::OneMonth,
        TimeWindow::SixMonths,
        TimeWindow::OneYear,
        TimeWindow::All,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneMonth => "1M",
            Self::SixMonths => "6M",
            Self::OneYear => "1Y",
            Self::All => "ALL",
        }
    }

    /// Calendar months covered by the window, `None` for [`TimeWindow::All`].
    pub fn months(self) -> Option<u32> {
        match self {
            Self::OneMonth => Some(1),
            Self::SixMonths => Some(6),
            Self::OneYear => Some(12),
            Self::All => None,
        }
    }

    /// Earliest instant kept by the window. Month subtraction clamps to the
    /// last valid day, so 31 March minus one month is 29 or 28 February.
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let months = self.months()?;
        Some(
            now.checked_sub_months(Months::new(months))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        )
    }

    /// Points at or after the cutoff. [`TimeWindow::All`] returns the series
    /// unchanged.
    pub fn filter(self, series: Vec<SeriesPoint>, now: DateTime<Utc>) -> Vec<SeriesPoint> {
        match self.cutoff(now) {
            None => series,
            Some(cutoff) => series
                .into_iter()
                .filter(|point| point.timestamp >= cutoff)
                .collect(),
        }
    }

    /// [`TimeWindow::filter`] relative to the current time.
    pub fn filter_now(self, series: Vec<SeriesPoint>) -> Vec<SeriesPoint> {
        self.filter(series, Utc::now())
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = HealthError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let tag = value.trim().to_ascii_uppercase();
        TimeWindow::ALL_WINDOWS
            .into_iter()
            .find(|window| window.as_str() == tag)
            .ok_or_else(|| {
                HealthError::Config(format!(
                    "unknown time window '{value}', expected one of 1M, 6M, 1Y, ALL"
                ))
            })
    }
}
