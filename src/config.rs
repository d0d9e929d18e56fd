//! Session configuration
//!
//! A session covers one trading date. Input timestamps count nanoseconds
//! from midnight of that date; output timestamps count from the Unix epoch.

use chrono::{Local, NaiveDate, TimeZone, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid date {0}: YYYY must be at least 1970")]
    YearOutOfRange(u32),

    #[error("invalid date {0}: MM must be between 1 and 12 inclusive")]
    MonthOutOfRange(u32),

    #[error("invalid date {0}: DD must be between 1 and 31 inclusive")]
    DayOutOfRange(u32),

    #[error("invalid date {0}: not a calendar date")]
    NotACalendarDate(u32),

    #[error("midnight of {0} does not exist or is before the epoch in the selected time zone")]
    UnrepresentableMidnight(u32),
}

/// Which clock "midnight" is measured on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeBasis {
    #[default]
    Local,
    Utc,
}

/// A session date given as yyyymmdd, e.g. 20180618 for 18 Jun 2018
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionDate {
    yyyymmdd: u32,
    date: NaiveDate,
}

impl SessionDate {
    pub fn from_yyyymmdd(yyyymmdd: u32) -> Result<Self, ConfigError> {
        let year = yyyymmdd / 10000;
        let month = yyyymmdd % 10000 / 100;
        let day = yyyymmdd % 100;

        if year < 1970 {
            return Err(ConfigError::YearOutOfRange(yyyymmdd));
        }
        if !(1..=12).contains(&month) {
            return Err(ConfigError::MonthOutOfRange(yyyymmdd));
        }
        if !(1..=31).contains(&day) {
            return Err(ConfigError::DayOutOfRange(yyyymmdd));
        }

        let date = NaiveDate::from_ymd_opt(year as i32, month, day)
            .ok_or(ConfigError::NotACalendarDate(yyyymmdd))?;

        Ok(SessionDate { yyyymmdd, date })
    }

    pub fn yyyymmdd(&self) -> u32 {
        self.yyyymmdd
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Nanoseconds from the Unix epoch to midnight of this date
    ///
    /// When local midnight is ambiguous (DST fall-back) the earlier instant wins.
    pub fn epoch_midnight_nanos(&self, basis: TimeBasis) -> Result<u64, ConfigError> {
        let midnight = self.date.and_hms_opt(0, 0, 0).ok_or(ConfigError::NotACalendarDate(self.yyyymmdd))?;

        let nanos = match basis {
            TimeBasis::Utc => Utc.from_utc_datetime(&midnight).timestamp_nanos_opt(),
            TimeBasis::Local => Local
                .from_local_datetime(&midnight)
                .earliest()
                .and_then(|dt| dt.timestamp_nanos_opt()),
        };

        nanos
            .and_then(|n| u64::try_from(n).ok())
            .ok_or(ConfigError::UnrepresentableMidnight(self.yyyymmdd))
    }
}

/// Everything a `FeedProcessor` needs besides its output sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub date: SessionDate,
    pub time_basis: TimeBasis,
    /// Warn once the resequencer holds more than this many early packets
    pub pending_warn_threshold: usize,
}

impl SessionConfig {
    pub const DEFAULT_PENDING_WARN_THRESHOLD: usize = 1024;

    pub fn new(date: SessionDate) -> Self {
        SessionConfig {
            date,
            time_basis: TimeBasis::default(),
            pending_warn_threshold: Self::DEFAULT_PENDING_WARN_THRESHOLD,
        }
    }

    pub fn with_time_basis(mut self, time_basis: TimeBasis) -> Self {
        self.time_basis = time_basis;
        self
    }

    pub fn with_pending_warn_threshold(mut self, threshold: usize) -> Self {
        self.pending_warn_threshold = threshold;
        self
    }

    pub fn epoch_midnight_nanos(&self) -> Result<u64, ConfigError> {
        self.date.epoch_midnight_nanos(self.time_basis)
    }
}
