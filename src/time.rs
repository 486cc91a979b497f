//! Time abstraction for testability.
//!
//! The agent stamps events and health status with the current time.
//! [`Clock`] lets tests pin that time instead of reading the system clock.

use std::time::SystemTime;

/// Abstraction over system time.
///
/// # Example
///
/// ```
/// use yt_watch::time::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// assert!(clock.now() >= std::time::SystemTime::UNIX_EPOCH);
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> SystemTime;

    /// Returns the current time as whole seconds since the Unix epoch.
    fn unix_secs(&self) -> u64 {
        to_unix_secs(self.now())
    }
}

/// Production clock backed by [`SystemTime::now()`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Converts a timestamp to Unix seconds.
///
/// Pre-epoch timestamps collapse to 0.
#[must_use]
pub fn to_unix_secs(time: SystemTime) -> u64 {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}


#[cfg(test)]
mod tests {
    use super::mock::MockClock;
    use super::*;
    use std::time::Duration;

    #[test]
    fn system_clock_returns_current_time() {
        let before = SystemTime::now();
        let result = SystemClock.now();
        let after = SystemTime::now();

        assert!(result >= before);
        assert!(result <= after);
    }

    #[test]
    fn unix_secs_matches_epoch_offset() {
        let clock = MockClock::new(1_700_000_000);
        assert_eq!(clock.unix_secs(), 1_700_000_000);
    }

    #[test]
    fn pre_epoch_time_collapses_to_zero() {
        let before_epoch = SystemTime::UNIX_EPOCH - Duration::from_secs(10);
        assert_eq!(to_unix_secs(before_epoch), 0);
    }

    #[test]
    fn mock_clock_can_advance() {
        let clock = MockClock::new(0);
        clock.advance(Duration::from_secs(150));

        assert_eq!(clock.now(), SystemTime::UNIX_EPOCH + Duration::from_secs(150));
    }

    #[test]
    fn clocks_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SystemClock>();
        assert_send_sync::<MockClock>();
    }
}
