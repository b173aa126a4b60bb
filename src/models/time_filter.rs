//! Lookback window shared by every search source.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Time filter accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    Hour,
    Day,
    Week,
    #[default]
    Month,
    Year,
    All,
}

impl TimeFilter {
    /// Lookback window in whole days; `0` means unbounded.
    ///
    /// `Hour` is shorter than a day and reports `0` here; use
    /// [`TimeFilter::lookback`] for the exact window.
    pub fn days(&self) -> i64 {
        match self {
            TimeFilter::Hour => 0,
            TimeFilter::Day => 1,
            TimeFilter::Week => 7,
            TimeFilter::Month => 30,
            TimeFilter::Year => 365,
            TimeFilter::All => 0,
        }
    }

    /// Exact lookback window, or `None` when unbounded.
    pub fn lookback(&self) -> Option<Duration> {
        match self {
            TimeFilter::Hour => Some(Duration::hours(1)),
            TimeFilter::All => None,
            other => Some(Duration::days(other.days())),
        }
    }

    /// Earliest creation instant admitted by this filter.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.lookback().map(|window| now - window)
    }

    /// Parameter value understood by Reddit's `t=` filter.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::Hour => "hour",
            TimeFilter::Day => "day",
            TimeFilter::Week => "week",
            TimeFilter::Month => "month",
            TimeFilter::Year => "year",
            TimeFilter::All => "all",
        }
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hour" => Ok(TimeFilter::Hour),
            "day" => Ok(TimeFilter::Day),
            "week" => Ok(TimeFilter::Week),
            "month" => Ok(TimeFilter::Month),
            "year" => Ok(TimeFilter::Year),
            "all" => Ok(TimeFilter::All),
            other => Err(AppError::validation(format!(
                "unknown time filter '{other}' (expected hour, day, week, month, year or all)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_mapping() {
        assert_eq!(TimeFilter::Day.days(), 1);
        assert_eq!(TimeFilter::Week.days(), 7);
        assert_eq!(TimeFilter::Month.days(), 30);
        assert_eq!(TimeFilter::Year.days(), 365);
        assert_eq!(TimeFilter::All.days(), 0);
    }

    #[test]
    fn test_cutoff() {
        let now = Utc::now();
        assert_eq!(TimeFilter::All.cutoff(now), None);
        assert_eq!(TimeFilter::Week.cutoff(now), Some(now - Duration::days(7)));
        assert_eq!(TimeFilter::Hour.cutoff(now), Some(now - Duration::hours(1)));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Month".parse::<TimeFilter>().unwrap(), TimeFilter::Month);
        assert_eq!("all".parse::<TimeFilter>().unwrap(), TimeFilter::All);
        assert!("fortnight".parse::<TimeFilter>().is_err());
    }
}
