//! Logical simulation clock.
//!
//! Every timeout in the agent core is measured against this clock, never
//! against the wall clock. The runner advances it once per real tick; tests
//! advance it directly and exercise multi-second timeouts without sleeping.
//!
//! All arithmetic is checked. The frame counter and the elapsed time are
//! the only temporal state; handlers derive everything else from them.

use core::time::Duration;

use paprika_agents::Frame;

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Elapsed time would overflow.
    #[error("simulated time overflow")]
    TimeOverflow,

    /// Invalid clock configuration (e.g. a zero tick interval).
    #[error("invalid clock configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Fixed-step simulation clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimClock {
    /// Frames elapsed since start.
    tick: u64,

    /// Simulated time since start.
    now: Duration,

    /// Time added by [`SimClock::advance`].
    interval: Duration,
}

impl SimClock {
    /// Create a clock at tick 0 stepping by `interval`.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `interval` is zero.
    pub fn new(interval: Duration) -> Result<Self, ClockError> {
        if interval.is_zero() {
            return Err(ClockError::InvalidConfig {
                reason: "tick interval must be greater than zero".to_owned(),
            });
        }
        Ok(Self {
            tick: 0,
            now: Duration::ZERO,
            interval,
        })
    }

    /// Advance by one configured interval and return the new frame.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] or [`ClockError::TimeOverflow`]
    /// if a counter would overflow.
    pub fn advance(&mut self) -> Result<Frame, ClockError> {
        self.advance_by(self.interval)
    }

    /// Advance by an explicit `dt` and return the new frame.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] or [`ClockError::TimeOverflow`]
    /// if a counter would overflow.
    pub fn advance_by(&mut self, dt: Duration) -> Result<Frame, ClockError> {
        let tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        let now = self.now.checked_add(dt).ok_or(ClockError::TimeOverflow)?;
        self.tick = tick;
        self.now = now;
        Ok(Frame { tick, now, dt })
    }

    /// Current frame number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated time since start.
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// The fixed step used by [`SimClock::advance`].
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn clock_starts_at_zero() {
        let clock = SimClock::new(Duration::from_millis(50)).unwrap();
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[test]
    fn clock_advances_by_interval() {
        let mut clock = SimClock::new(Duration::from_millis(50)).unwrap();
        let frame = clock.advance().unwrap();
        assert_eq!(frame.tick, 1);
        assert_eq!(frame.now, Duration::from_millis(50));
        assert_eq!(frame.dt, Duration::from_millis(50));

        for _ in 0..19 {
            clock.advance().unwrap();
        }
        assert_eq!(clock.tick(), 20);
        assert_eq!(clock.now(), Duration::from_secs(1));
    }

    #[test]
    fn explicit_step_overrides_interval() {
        let mut clock = SimClock::new(Duration::from_millis(50)).unwrap();
        let frame = clock.advance_by(Duration::from_secs(2)).unwrap();
        assert_eq!(frame.dt, Duration::from_secs(2));
        assert_eq!(clock.now(), Duration::from_secs(2));
        assert_eq!(clock.interval(), Duration::from_millis(50));
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(matches!(
            SimClock::new(Duration::ZERO),
            Err(ClockError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn overflow_leaves_clock_unchanged() {
        let mut clock = SimClock::new(Duration::from_millis(50)).unwrap();
        clock.advance().unwrap();
        assert_eq!(clock.advance_by(Duration::MAX), Err(ClockError::TimeOverflow));
        assert_eq!(clock.tick(), 1);
    }
}
