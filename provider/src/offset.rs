//! The `TimezoneOffset` type.

use core::fmt;

use tinystr::TinyAsciiStr;

use crate::{DataSourceError, DataSourceResult};

/// The maximum length of a time zone abbreviation.
///
/// `zic` limits designations to between 3 and 6 characters.
pub const MAX_ABBREVIATION_LEN: usize = 8;

/// `TimezoneOffset` represents a total UTC offset along with the metadata
/// observed with it.
///
/// Two offsets are equal when their total offset, daylight savings flag and
/// abbreviation are all equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimezoneOffset {
    utc_total_offset: i64,
    is_dst: bool,
    abbreviation: TinyAsciiStr<MAX_ABBREVIATION_LEN>,
}

impl TimezoneOffset {
    /// Creates a new `TimezoneOffset`.
    pub fn try_new(utc_total_offset: i64, is_dst: bool, abbreviation: &str) -> DataSourceResult<Self> {
        let abbreviation = TinyAsciiStr::try_from_str(abbreviation).map_err(|_| {
            DataSourceError::invalid_data().with_message("Invalid time zone abbreviation.")
        })?;
        Ok(Self {
            utc_total_offset,
            is_dst,
            abbreviation,
        })
    }

    /// Creates a new `TimezoneOffset` from an already validated abbreviation.
    #[inline]
    #[must_use]
    pub const fn new(
        utc_total_offset: i64,
        is_dst: bool,
        abbreviation: TinyAsciiStr<MAX_ABBREVIATION_LEN>,
    ) -> Self {
        Self {
            utc_total_offset,
            is_dst,
            abbreviation,
        }
    }

    /// Returns the total offset from UTC in seconds.
    #[inline]
    #[must_use]
    pub const fn utc_total_offset(&self) -> i64 {
        self.utc_total_offset
    }

    /// Returns whether this offset is a daylight savings time offset.
    #[inline]
    #[must_use]
    pub const fn is_dst(&self) -> bool {
        self.is_dst
    }

    /// Returns the abbreviation observed with this offset, e.g. "EST".
    #[inline]
    #[must_use]
    pub fn abbreviation(&self) -> &str {
        self.abbreviation.as_str()
    }
}

impl fmt::Display for TimezoneOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.utc_total_offset < 0 { '-' } else { '+' };
        let abs = self.utc_total_offset.unsigned_abs();
        let (hours, minutes, seconds) = (abs / 3600, (abs % 3600) / 60, abs % 60);
        write!(f, "{} ({sign}{hours:02}:{minutes:02}", self.abbreviation)?;
        if seconds != 0 {
            write!(f, ":{seconds:02}")?;
        }
        f.write_str(")")
    }
}
