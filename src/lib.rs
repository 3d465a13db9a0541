//! Heading and speed control for a two-wheel differential-drive robot.
//!
//! [`MotionController`] turns "go this way at this speed" commands into
//! motor efforts, closing the loop over single-channel wheel encoders and
//! dead-reckoned odometry. The crate is `no_std` and allocation free; time
//! is always passed in by the caller as a millisecond [`time::Instant`].
//!
//! Motor drivers and pulse sensors plug in through the traits of
//! [`otomo_hardware`].

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod controls;
pub mod error;
pub mod sensors;
pub mod time;
pub mod timer;

pub use config::{DriveGeometry, MotionConfig};
pub use controls::actuator_curve::ActuatorCurve;
pub use controls::motion::{MotionController, MotionState, Side, WheelPowers};
pub use error::{ConfigError, MotionError};
pub use sensors::odometry::Pose;
pub use timer::SoftTimer;
