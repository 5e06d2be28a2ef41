//! Fixed-point timestamps and clocks.

use core::fmt;

/// Seconds in a day.
pub const SECS_PER_DAY: i64 = 86_400;

/// Seconds from 1970-01-01 to 2000-01-01, both UTC.
pub const UNIX_EPOCH_OFFSET: i64 = 946_684_800;

/// `2^64 / 1_000_000`, the fraction step of one microsecond.
const MICROSECOND_FRACTION: u64 = 0x0000_10C6_F7A0_B5ED;

/// A signed 128-bit fixed-point time: whole seconds since
/// 2000-01-01 00:00:00 UTC in the high 64 bits, binary fraction of a second
/// in the low 64 bits.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i128);

impl Timestamp {
    /// Whole seconds, zero fraction.
    pub const fn from_secs(secs: i64) -> Self {
        Timestamp((secs as i128) << 64)
    }

    /// Seconds plus a binary fraction.
    pub const fn from_parts(secs: i64, fraction: u64) -> Self {
        Timestamp(((secs as i128) << 64) | fraction as i128)
    }

    /// The raw fixed-point value.
    pub const fn as_raw(self) -> i128 {
        self.0
    }

    /// Whole seconds, rounded toward negative infinity.
    pub const fn secs(self) -> i64 {
        (self.0 >> 64) as i64
    }

    /// Fractional part of a second in units of `2^-64`.
    pub const fn fraction(self) -> u64 {
        self.0 as u64
    }

    /// Drops the fractional part.
    pub const fn trunc(self) -> Self {
        Timestamp::from_secs(self.secs())
    }

    /// Adds whole seconds, `None` on overflow.
    pub fn checked_add_secs(self, secs: i64) -> Option<Self> {
        self.secs()
            .checked_add(secs)
            .map(|s| Timestamp::from_parts(s, self.fraction()))
    }

    /// Adds whole days, `None` on overflow.
    pub fn checked_add_days(self, days: i64) -> Option<Self> {
        self.checked_add_secs(days.checked_mul(SECS_PER_DAY)?)
    }

    /// Converts Unix time (seconds and microseconds since 1970) to a
    /// timestamp.
    pub fn from_unix(secs: i64, micros: u32) -> Self {
        Timestamp::from_parts(
            secs - UNIX_EPOCH_OFFSET,
            u64::from(micros).wrapping_mul(MICROSECOND_FRACTION),
        )
    }

    /// Salt bytes for the PRNG: seconds then fraction, each little-endian.
    pub(crate) fn salt_bytes(self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&self.secs().to_le_bytes());
        out[8..].copy_from_slice(&self.fraction().to_le_bytes());
        out
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}+{:#018x})", self.secs(), self.fraction())
    }
}

/// A source of the current time.
pub trait Clock {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

/// The operating system's wall clock.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};

        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => Timestamp::from_unix(d.as_secs() as i64, d.subsec_micros()),
            Err(_) => Timestamp::from_unix(0, 0),
        }
    }
}
