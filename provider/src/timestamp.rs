//! Epoch-second instants.

use core::fmt;

/// Seconds per day, with every day assumed to be exactly 86,400 seconds long.
pub(crate) const SECONDS_PER_DAY: i64 = 86_400;

/// An instant expressed as a count of seconds since 1970-01-01T00:00:00,
/// ignoring leap seconds.
///
/// A `Timestamp` is either a UTC instant or a local wall-clock instant that
/// has had a fixed UTC offset applied to it. No calendar arithmetic is
/// performed beyond adding seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub(crate) i64);

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Timestamp> for i64 {
    fn from(value: Timestamp) -> Self {
        value.0
    }
}

impl Timestamp {
    /// Creates a new `Timestamp` from epoch seconds.
    #[inline]
    #[must_use]
    pub const fn from_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Returns the epoch seconds value of this `Timestamp`.
    #[inline]
    #[must_use]
    pub const fn as_seconds(&self) -> i64 {
        self.0
    }

    /// Returns this `Timestamp` shifted by `offset` seconds.
    ///
    /// Saturates at the bounds of `i64`; the TZif "big bang" sentinel is
    /// far enough from the bounds that any real offset fits.
    #[inline]
    #[must_use]
    pub const fn add_seconds(self, offset: i64) -> Self {
        Self(self.0.saturating_add(offset))
    }

    /// Returns the number of whole days since the epoch and the seconds into that day.
    #[inline]
    #[must_use]
    pub const fn to_days_and_seconds(self) -> (i64, i64) {
        (
            self.0.div_euclid(SECONDS_PER_DAY),
            self.0.rem_euclid(SECONDS_PER_DAY),
        )
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}
