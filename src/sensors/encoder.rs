//! Single-channel wheel encoder.
//!
//! The sensor only reports level changes, not direction, so every pulse is
//! signed by the direction the wheel was last commanded in.

use crate::time::{millis_between, Instant};

/// Samples kept for the pulse-rate estimate.
pub const SAMPLE_WINDOW: usize = 5;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    Forward,
    Backward,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseSample {
    pub at: Instant,
    pub pulses: i32,
}

impl Default for PulseSample {
    fn default() -> Self {
        Self {
            at: Instant::from_ticks(0),
            pulses: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WheelEncoder<const N: usize = SAMPLE_WINDOW> {
    pulses: i32,
    direction: WheelDirection,
    level: bool,
    samples: [PulseSample; N],
    write_index: usize,
    filled: usize,
}

impl<const N: usize> Default for WheelEncoder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> WheelEncoder<N> {
    const WINDOW_OK: () = assert!(N >= 2, "a rate needs at least two samples");

    pub fn new() -> Self {
        let () = Self::WINDOW_OK;
        Self {
            pulses: 0,
            direction: WheelDirection::Forward,
            level: false,
            samples: [PulseSample::default(); N],
            write_index: 0,
            filled: 0,
        }
    }

    /// Follows the sign of the commanded speed. Zero keeps the direction and
    /// drops the rate estimate, since the wheel is about to stop.
    pub fn set_direction(&mut self, speed: f32) {
        if speed > 0.0 {
            self.direction = WheelDirection::Forward;
        } else if speed < 0.0 {
            self.direction = WheelDirection::Backward;
        } else {
            self.clear_samples();
        }
    }

    pub fn direction(&self) -> WheelDirection {
        self.direction
    }

    pub fn pulses(&self) -> i32 {
        self.pulses
    }

    /// Number of buffered samples, saturating at the window size.
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Feeds the sensor level read at `now`; returns the signed pulse on a
    /// level change.
    pub fn on_edge(&mut self, level: bool, now: Instant) -> Option<i32> {
        if level == self.level {
            return None;
        }
        self.level = level;

        let delta = match self.direction {
            WheelDirection::Forward => 1,
            WheelDirection::Backward => -1,
        };
        self.pulses = self.pulses.wrapping_add(delta);
        self.samples[self.write_index] = PulseSample {
            at: now,
            pulses: self.pulses,
        };
        self.write_index = (self.write_index + 1) % N;
        self.filled = (self.filled + 1).min(N);

        log::trace!("pulse {} total {} at {}", delta, self.pulses, now.ticks());
        Some(delta)
    }

    /// Signed pulse rate in pulses per second, 0 until the window is full.
    ///
    /// Past the newest sample the magnitude is capped at one pulse per
    /// elapsed time, so a stalled wheel decays towards 0.
    pub fn frequency(&self, now: Instant) -> f32 {
        if self.filled < N {
            return 0.0;
        }
        // With a full buffer the write slot holds the oldest sample.
        let oldest = self.samples[self.write_index];
        let newest = self.samples[(self.write_index + N - 1) % N];

        let span = millis_between(oldest.at, newest.at);
        if span == 0 {
            return 0.0;
        }
        let pps = newest.pulses.wrapping_sub(oldest.pulses) as f32 * 1000.0 / span as f32;

        let idle = millis_between(newest.at, now);
        if idle == 0 {
            return pps;
        }
        let bound = 1000.0 / idle as f32;
        pps.clamp(-bound, bound)
    }

    pub fn reset(&mut self) {
        self.pulses = 0;
        self.direction = WheelDirection::Forward;
        self.clear_samples();
    }

    fn clear_samples(&mut self) {
        self.write_index = 0;
        self.filled = 0;
    }
}
