//! Cooperative countdown timer for the polling loop.
//!
//! A [`SoftTimer`] never blocks and never calls back into its owner. The
//! owner polls it with the current time and handles the returned tick
//! itself, which keeps every handler free of re-entrancy.

use crate::error::ConfigError;
use crate::time::{Duration, Instant};

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftTimer {
    interval: Duration,
    continuous: bool,
    running: bool,
    next_deadline: Instant,
    counter: u32,
}

impl SoftTimer {
    pub fn new(interval: Duration) -> Result<Self, ConfigError> {
        if interval.ticks() == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(Self {
            interval,
            continuous: false,
            running: false,
            next_deadline: Instant::from_ticks(0),
            counter: 0,
        })
    }

    /// Builder form of [`SoftTimer::set_continuous`].
    pub fn continuous(self, continuous: bool) -> Self {
        let mut s = self;
        s.continuous = continuous;
        s
    }

    pub fn set_interval(&mut self, interval: Duration) -> Result<(), ConfigError> {
        if interval.ticks() == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        self.interval = interval;
        Ok(())
    }

    pub fn set_continuous(&mut self, continuous: bool) {
        self.continuous = continuous;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn next_deadline(&self) -> Instant {
        self.next_deadline
    }

    /// Number of times the timer has fired since creation.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Arms the timer to fire one interval after `now`.
    pub fn start(&mut self, now: Instant) {
        self.start_at(now + self.interval);
    }

    /// Arms the timer with an explicit first deadline.
    pub fn start_at(&mut self, deadline: Instant) {
        self.next_deadline = deadline;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Pushes the deadline to one interval after `now`. Ignored while stopped.
    pub fn restart(&mut self, now: Instant) {
        if self.running {
            self.next_deadline = now + self.interval;
        }
    }

    /// Returns the fire count when the deadline has passed.
    ///
    /// A continuous timer advances its deadline by exactly one interval per
    /// fire, so a late poll is caught up by the following polls instead of
    /// shifting every later tick.
    pub fn poll(&mut self, now: Instant) -> Option<u32> {
        if !self.running || now < self.next_deadline {
            return None;
        }

        self.counter = self.counter.wrapping_add(1);
        if self.continuous {
            self.next_deadline = self.next_deadline + self.interval;
        } else {
            self.running = false;
        }
        Some(self.counter)
    }
}
