//! Bounded polling of device status bits.
//!
//! Drivers wait on data-ready, reset-done and calibration flags by reading a
//! status register in a loop. The loop is always bounded by a [`Poller`]:
//!
//! ```ignore
//! let mut poller = self.config.poll.start();
//! while !self.status().await?.data_ready() {
//!     poller.wait(&mut self.delay).await.map_err(|_| Error::Timeout)?;
//! }
//! ```

use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;

/// The condition being polled for did not become true in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout;

/// How many times, and how often, a status bit is re-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Number of waits before giving up.
    pub attempts: u16,
    /// Time slept between two checks.
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            attempts: 100,
            interval: Duration::from_millis(1),
        }
    }
}

impl PollConfig {
    /// Creates a new polling configuration.
    pub const fn new(attempts: u16, interval: Duration) -> Self {
        Self { attempts, interval }
    }

    /// Sets the number of attempts.
    pub const fn with_attempts(mut self, attempts: u16) -> Self {
        self.attempts = attempts;
        self
    }

    /// Sets the interval between attempts.
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Upper bound of the time spent sleeping by one poll loop.
    pub fn budget(&self) -> Duration {
        self.interval * u32::from(self.attempts)
    }

    /// Starts a new poll loop.
    pub fn start(&self) -> Poller {
        Poller {
            remaining: self.attempts,
            interval_us: u32::try_from(self.interval.as_micros()).unwrap_or(u32::MAX),
        }
    }
}

/// The state of one bounded poll loop.
#[derive(Debug)]
pub struct Poller {
    remaining: u16,
    interval_us: u32,
}

impl Poller {
    /// Sleeps for one interval, or fails with [`Timeout`] once all attempts
    /// are spent. A failing call does not sleep.
    pub async fn wait<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Timeout> {
        if self.remaining == 0 {
            log::warn!("poll budget exhausted");
            return Err(Timeout);
        }
        self.remaining -= 1;
        delay.delay_us(self.interval_us).await;
        Ok(())
    }

    /// Attempts left before [`Poller::wait`] fails.
    pub fn remaining(&self) -> u16 {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_budget_is_a_tenth_of_a_second() {
        assert_eq!(PollConfig::default().budget(), Duration::from_millis(100));
    }

    #[test]
    fn builder_overrides_fields() {
        let config = PollConfig::default()
            .with_attempts(3)
            .with_interval(Duration::from_micros(250));
        assert_eq!(config.attempts, 3);
        assert_eq!(config.start().interval_us, 250);
        assert_eq!(config.start().remaining(), 3);
    }
}
