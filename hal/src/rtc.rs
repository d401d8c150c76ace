//! Real-time clock collaborator
//!
//! The RTC is read once at boot and thereafter wall-clock time is derived
//! as `base + uptime seconds`; the kernel never re-reads the device on the
//! hot path.

/// Real-time clock device.
pub trait RtcDevice {
    /// Unix-epoch seconds at the moment of the call.
    fn timestamp(&self) -> u64;
}

/// An RTC frozen at a configured moment. The kernel adds uptime on top, so
/// a fixed base still yields advancing wall-clock time in simulation.
pub struct FixedRtc {
    base: u64,
}

impl FixedRtc {
    /// 2025-01-01T00:00:00Z, an arbitrary but recognizable boot moment.
    pub const DEFAULT_BASE: u64 = 1_735_689_600;

    pub fn new(base: u64) -> Self {
        Self { base }
    }
}

impl Default for FixedRtc {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE)
    }
}

impl RtcDevice for FixedRtc {
    fn timestamp(&self) -> u64 {
        self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_rtc_reports_base() {
        let rtc = FixedRtc::new(1_000_000);
        assert_eq!(rtc.timestamp(), 1_000_000);
    }
}
