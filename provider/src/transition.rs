//! The `TimezoneTransition` type.

use alloc::boxed::Box;
use core::fmt;
use core::hash::{Hash, Hasher};

use once_cell::race::OnceBox;

use crate::{Timestamp, TimezoneOffset};

/// `TimezoneTransition` represents a single change of the UTC offset observed
/// in a time zone.
///
/// The UTC instant of the transition, and the local instants bordering it, are
/// derived on first access and cached. Each derived value is a pure function
/// of the three immutable fields. Threads racing on first access may each
/// compute the value, but only one result is published and every result is
/// identical.
pub struct TimezoneTransition {
    offset: TimezoneOffset,
    previous_offset: TimezoneOffset,
    timestamp_value: i64,
    at: OnceBox<Timestamp>,
    local_end_at: OnceBox<Timestamp>,
    local_start_at: OnceBox<Timestamp>,
}

impl TimezoneTransition {
    /// Creates a new `TimezoneTransition`.
    ///
    /// `offset` is observed from `timestamp_value` onward, `previous_offset`
    /// is observed before it.
    #[must_use]
    pub const fn new(
        offset: TimezoneOffset,
        previous_offset: TimezoneOffset,
        timestamp_value: i64,
    ) -> Self {
        Self {
            offset,
            previous_offset,
            timestamp_value,
            at: OnceBox::new(),
            local_end_at: OnceBox::new(),
            local_start_at: OnceBox::new(),
        }
    }

    /// The offset observed after the transition.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> &TimezoneOffset {
        &self.offset
    }

    /// The offset observed before the transition.
    #[inline]
    #[must_use]
    pub const fn previous_offset(&self) -> &TimezoneOffset {
        &self.previous_offset
    }

    /// The epoch seconds of the transition, ignoring leap seconds.
    #[inline]
    #[must_use]
    pub const fn timestamp_value(&self) -> i64 {
        self.timestamp_value
    }

    /// The UTC instant at which the transition occurs.
    pub fn at(&self) -> Timestamp {
        *self
            .at
            .get_or_init(|| Box::new(Timestamp::from_seconds(self.timestamp_value)))
    }

    /// The local instant at which the previous observance ends.
    pub fn local_end_at(&self) -> Timestamp {
        *self.local_end_at.get_or_init(|| {
            Box::new(self.at().add_seconds(self.previous_offset.utc_total_offset()))
        })
    }

    /// The local instant at which the new observance begins.
    pub fn local_start_at(&self) -> Timestamp {
        *self
            .local_start_at
            .get_or_init(|| Box::new(self.at().add_seconds(self.offset.utc_total_offset())))
    }
}

impl Clone for TimezoneTransition {
    fn clone(&self) -> Self {
        Self::new(self.offset, self.previous_offset, self.timestamp_value)
    }
}

impl PartialEq for TimezoneTransition {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
            && self.previous_offset == other.previous_offset
            && self.timestamp_value == other.timestamp_value
    }
}

impl Eq for TimezoneTransition {}

impl Hash for TimezoneTransition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.offset.hash(state);
        self.previous_offset.hash(state);
        self.timestamp_value.hash(state);
    }
}

impl fmt::Debug for TimezoneTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimezoneTransition")
            .field("offset", &self.offset)
            .field("previous_offset", &self.previous_offset)
            .field("timestamp_value", &self.timestamp_value)
            .finish()
    }
}
