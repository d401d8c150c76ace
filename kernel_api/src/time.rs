//! Tick-based time
//!
//! The kernel's only clock is a monotonic counter advanced by the platform
//! timer at 100 Hz. Every timing contract in the core — sleep, preemption,
//! sound progress — is expressed in ticks; wall-clock time comes from the
//! RTC collaborator and is derived, never ambient.

use core::ops::{Add, Sub};
use serde::{Deserialize, Serialize};

/// Timer interrupt frequency: 100 interrupts per second.
pub const TICK_HZ: u64 = 100;

/// Milliseconds per tick. Sleep precision is bounded by this granularity.
pub const MS_PER_TICK: u64 = 10;

/// A count of 10 ms timer ticks since boot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Ticks(pub u64);

impl Ticks {
    pub const ZERO: Ticks = Ticks(0);

    /// Smallest tick count covering `ms` milliseconds (rounds up).
    pub const fn from_millis(ms: u64) -> Self {
        Ticks(ms.div_ceil(MS_PER_TICK))
    }

    pub const fn as_millis(self) -> u64 {
        self.0 * MS_PER_TICK
    }

    pub const fn as_secs(self) -> u64 {
        self.0 / TICK_HZ
    }
}

impl Add for Ticks {
    type Output = Ticks;

    fn add(self, other: Ticks) -> Ticks {
        Ticks(self.0 + other.0)
    }
}

impl Sub for Ticks {
    type Output = Ticks;

    fn sub(self, other: Ticks) -> Ticks {
        Ticks(self.0.saturating_sub(other.0))
    }
}

/// Decomposed civil date and time, as returned by `get_datetime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTime {
    pub year: i32,
    /// 1..=12
    pub month: u32,
    /// 1..=31
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// 0 = Sunday .. 6 = Saturday
    pub weekday: u32,
}

impl DateTime {
    /// Decomposes a Unix-epoch seconds value into civil date and time.
    ///
    /// Uses the days-from-civil inverse (Howard Hinnant's algorithm); valid
    /// for any timestamp this system will see.
    pub fn from_unix(ts: u64) -> Self {
        let days = (ts / 86_400) as i64;
        let secs_of_day = (ts % 86_400) as u32;

        // 1970-01-01 was a Thursday (weekday 4).
        let weekday = ((days + 4) % 7) as u32;

        let z = days + 719_468;
        let era = z.div_euclid(146_097);
        let doe = z.rem_euclid(146_097);
        let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
        let y = yoe + era * 400;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
        let month = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
        let year = (if month <= 2 { y + 1 } else { y }) as i32;

        Self {
            year,
            month,
            day,
            hour: secs_of_day / 3600,
            minute: (secs_of_day / 60) % 60,
            second: secs_of_day % 60,
            weekday,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_from_millis_rounds_up() {
        assert_eq!(Ticks::from_millis(0), Ticks(0));
        assert_eq!(Ticks::from_millis(10), Ticks(1));
        assert_eq!(Ticks::from_millis(15), Ticks(2));
        assert_eq!(Ticks::from_millis(500), Ticks(50));
    }

    #[test]
    fn test_ticks_arithmetic() {
        assert_eq!(Ticks(30) + Ticks(12), Ticks(42));
        assert_eq!(Ticks(30) - Ticks(12), Ticks(18));
        // Saturating: ticks never go negative
        assert_eq!(Ticks(5) - Ticks(10), Ticks(0));
    }

    #[test]
    fn test_datetime_epoch() {
        let dt = DateTime::from_unix(0);
        assert_eq!((dt.year, dt.month, dt.day), (1970, 1, 1));
        assert_eq!((dt.hour, dt.minute, dt.second), (0, 0, 0));
        // Thursday
        assert_eq!(dt.weekday, 4);
    }

    #[test]
    fn test_datetime_known_moment() {
        // 2024-02-29T12:34:56Z, a leap day on a Thursday
        let dt = DateTime::from_unix(1_709_210_096);
        assert_eq!((dt.year, dt.month, dt.day), (2024, 2, 29));
        assert_eq!((dt.hour, dt.minute, dt.second), (12, 34, 56));
        assert_eq!(dt.weekday, 4);
    }

    #[test]
    fn test_datetime_end_of_year() {
        // 2023-12-31T23:59:59Z, a Sunday
        let dt = DateTime::from_unix(1_704_067_199);
        assert_eq!((dt.year, dt.month, dt.day), (2023, 12, 31));
        assert_eq!((dt.hour, dt.minute, dt.second), (23, 59, 59));
        assert_eq!(dt.weekday, 0);
    }
}
