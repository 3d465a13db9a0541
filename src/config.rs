//! Drive train geometry and controller tuning.
//!
//! Defaults describe the two-wheel chassis with 40-slot encoder disks. Build
//! a custom setup with the `with_*` setters and check it with
//! [`MotionConfig::validate`]; the controller refuses an invalid one.

use core::f32::consts::PI;

use crate::controls::actuator_curve::ActuatorCurve;
use crate::controls::motor_math::deg_to_rad;
use crate::error::ConfigError;
use crate::time::{dur_from_millis, Duration};

pub const MOTOR_SAFE_INTERVAL_MS: u64 = 10_000;
pub const MOTOR_CHECK_INTERVAL_MS: u64 = 300;

const WHEEL_DIAMETER: f32 = 0.067; // m
const PULSES_PER_REVOLUTION: u16 = 40;
const TRACK_WIDTH: f32 = 0.136; // m
const MAX_LIN_SPEED: f32 = 0.280; // m/s
const FEEDBACK_GAIN: f32 = 0.3;
const ON_DIRECTION_RANGE_DEG: f32 = 90.0;
const LINEAR_DIRECTION_RANGE_DEG: f32 = 30.0;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveGeometry {
    /// Wheel diameter, in the length unit reported by the odometry.
    pub wheel_diameter: f32,
    pub pulses_per_revolution: u16,
    /// Distance between the two wheel contact points.
    pub track_width: f32,
}

impl Default for DriveGeometry {
    fn default() -> Self {
        Self {
            wheel_diameter: WHEEL_DIAMETER,
            pulses_per_revolution: PULSES_PER_REVOLUTION,
            track_width: TRACK_WIDTH,
        }
    }
}

impl DriveGeometry {
    pub fn distance_per_pulse(&self) -> f32 {
        self.wheel_diameter * PI / self.pulses_per_revolution as f32
    }

    /// Heading change for a single pulse difference between the wheels.
    pub fn angle_per_pulse(&self) -> f32 {
        self.distance_per_pulse() / self.track_width
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.wheel_diameter.is_finite() && self.wheel_diameter > 0.0) {
            return Err(ConfigError::WheelDiameter);
        }
        if self.pulses_per_revolution == 0 {
            return Err(ConfigError::PulsesPerRevolution);
        }
        if !(self.track_width.is_finite() && self.track_width > 0.0) {
            return Err(ConfigError::TrackWidth);
        }
        Ok(())
    }
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionConfig {
    pub geometry: DriveGeometry,
    /// Linear wheel speed reached at full power.
    pub max_speed: f32,
    pub feedback_gain: f32,
    /// Heading error at which the turn request saturates, radians.
    pub on_direction_range: f32,
    /// Heading error beyond which translation is suppressed, radians.
    pub linear_direction_range: f32,
    /// Watchdog window: the robot halts without a move command for this long.
    pub safe_interval_ms: u64,
    /// Period of the control-law re-evaluation.
    pub check_interval_ms: u64,
    pub left_curve: ActuatorCurve,
    pub right_curve: ActuatorCurve,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            geometry: DriveGeometry::default(),
            max_speed: MAX_LIN_SPEED,
            feedback_gain: FEEDBACK_GAIN,
            on_direction_range: deg_to_rad(ON_DIRECTION_RANGE_DEG),
            linear_direction_range: deg_to_rad(LINEAR_DIRECTION_RANGE_DEG),
            safe_interval_ms: MOTOR_SAFE_INTERVAL_MS,
            check_interval_ms: MOTOR_CHECK_INTERVAL_MS,
            left_curve: ActuatorCurve::default(),
            right_curve: ActuatorCurve::default(),
        }
    }
}

impl MotionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_geometry(self, geometry: DriveGeometry) -> Self {
        let mut s = self;
        s.geometry = geometry;
        s
    }

    pub fn with_max_speed(self, max_speed: f32) -> Self {
        let mut s = self;
        s.max_speed = max_speed;
        s
    }

    pub fn with_feedback_gain(self, gain: f32) -> Self {
        let mut s = self;
        s.feedback_gain = gain;
        s
    }

    pub fn with_direction_ranges(self, on_direction: f32, linear_direction: f32) -> Self {
        let mut s = self;
        s.on_direction_range = on_direction;
        s.linear_direction_range = linear_direction;
        s
    }

    pub fn with_safe_interval_ms(self, millis: u64) -> Self {
        let mut s = self;
        s.safe_interval_ms = millis;
        s
    }

    pub fn with_check_interval_ms(self, millis: u64) -> Self {
        let mut s = self;
        s.check_interval_ms = millis;
        s
    }

    pub fn with_curves(self, left: ActuatorCurve, right: ActuatorCurve) -> Self {
        let mut s = self;
        s.left_curve = left;
        s.right_curve = right;
        s
    }

    pub fn safe_interval(&self) -> Duration {
        dur_from_millis(self.safe_interval_ms)
    }

    pub fn check_interval(&self) -> Duration {
        dur_from_millis(self.check_interval_ms)
    }

    /// Pulse rate of a wheel running at `max_speed`.
    pub fn max_pulses_per_sec(&self) -> f32 {
        self.max_speed / self.geometry.distance_per_pulse()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.geometry.validate()?;
        if !(self.max_speed.is_finite() && self.max_speed > 0.0) {
            return Err(ConfigError::MaxSpeed);
        }
        if !(self.feedback_gain.is_finite() && self.feedback_gain >= 0.0) {
            return Err(ConfigError::FeedbackGain);
        }
        let ranges = [self.on_direction_range, self.linear_direction_range];
        if !ranges.iter().all(|r| r.is_finite() && *r > 0.0) {
            return Err(ConfigError::DirectionRange);
        }
        if self.safe_interval_ms == 0 || self.check_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        self.left_curve.validate()?;
        self.right_curve.validate()
    }
}
