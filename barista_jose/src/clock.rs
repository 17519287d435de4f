//! Clocks used when validating time-based claims
//!
//! Validation reads the current time through the [`Clock`] trait so that
//! expiry checks can be pinned to a fixed instant in tests.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Unix time
///
/// Seconds elapsed since 1970-01-01T00:00:00Z, the representation used by
/// the `exp`, `nbf`, and `iat` claims.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct UnixTime(pub u64);

impl UnixTime {
    /// Adds a number of seconds, saturating at the far future
    #[must_use]
    pub const fn saturating_add(self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }
}

impl From<SystemTime> for UnixTime {
    #[inline]
    fn from(t: SystemTime) -> Self {
        // Instants before the epoch clamp to zero rather than panicking.
        let secs = t
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        UnixTime(secs)
    }
}

/// Something that can tell the current time
pub trait Clock {
    /// The current time according to this clock
    fn now(&self) -> UnixTime;
}

/// The system clock
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct System;

impl Clock for System {
    #[inline]
    fn now(&self) -> UnixTime {
        UnixTime::from(SystemTime::now())
    }
}

/// A clock frozen at a chosen instant
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedClock(UnixTime);

impl FixedClock {
    /// Creates a clock that always reports `time`
    #[inline]
    pub const fn new(time: UnixTime) -> Self {
        Self(time)
    }

    /// Moves the clock forward by `secs` seconds
    pub fn advance(&mut self, secs: u64) {
        self.0 = self.0.saturating_add(secs);
    }
}

impl Clock for FixedClock {
    #[inline]
    fn now(&self) -> UnixTime {
        self.0
    }
}
