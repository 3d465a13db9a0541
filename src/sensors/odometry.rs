//! Differential-drive dead reckoning from the two wheel encoders.
//!
//! Position is integrated in pulse units and scaled to physical distance on
//! read. Heading grows when the left wheel runs ahead of the right one.

use num_traits::Float;

use super::encoder::WheelEncoder;
use crate::config::DriveGeometry;
use crate::controls::motor_math::normalize_rad;
use crate::error::{ConfigError, MotionError};
use crate::time::Instant;

/// Pose estimate at a point in time, in the geometry's length unit.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub at: Instant,
    pub x: f32,
    pub y: f32,
    /// Radians in `(-PI, PI]`.
    pub heading: f32,
}

#[derive(Debug, Clone)]
pub struct Odometry {
    left: WheelEncoder,
    right: WheelEncoder,
    distance_per_pulse: f32,
    angle_per_pulse: f32,
    x_pulses: f32,
    y_pulses: f32,
    heading: f32,
    updated_at: Instant,
}

impl Odometry {
    pub fn new(geometry: &DriveGeometry) -> Result<Self, ConfigError> {
        geometry.validate()?;
        Ok(Self {
            left: WheelEncoder::new(),
            right: WheelEncoder::new(),
            distance_per_pulse: geometry.distance_per_pulse(),
            angle_per_pulse: geometry.angle_per_pulse(),
            x_pulses: 0.0,
            y_pulses: 0.0,
            heading: 0.0,
            updated_at: Instant::from_ticks(0),
        })
    }

    /// Samples both wheel sensors; returns the new pose when either pulsed.
    pub fn poll(&mut self, left_level: bool, right_level: bool, now: Instant) -> Option<Pose> {
        let dl = self.left.on_edge(left_level, now).unwrap_or(0);
        let dr = self.right.on_edge(right_level, now).unwrap_or(0);
        if dl != 0 || dr != 0 {
            Some(self.update(dl, dr, now))
        } else {
            None
        }
    }

    /// Integrates one step of wheel pulses.
    pub fn update(&mut self, delta_left: i32, delta_right: i32, now: Instant) -> Pose {
        let (delta_left, delta_right) = (i64::from(delta_left), i64::from(delta_right));
        let ds = (delta_left + delta_right) as f32 / 2.0;
        self.x_pulses += ds * self.heading.cos();
        self.y_pulses += ds * self.heading.sin();
        let turn = (delta_left - delta_right) as f32 * self.angle_per_pulse;
        self.heading = normalize_rad(self.heading + turn);
        self.updated_at = now;

        let pose = self.pose();
        log::trace!(
            "pose ({}, {}) heading {} at {}",
            pose.x,
            pose.y,
            pose.heading,
            now.ticks()
        );
        pose
    }

    /// Passes the commanded wheel powers on to the encoders, which sign
    /// their next pulses with them.
    pub fn set_direction(&mut self, left: f32, right: f32) {
        self.left.set_direction(left);
        self.right.set_direction(right);
    }

    /// Overrides the heading, e.g. from an absolute attitude sensor.
    pub fn set_heading(&mut self, heading: f32) -> Result<(), MotionError> {
        if !heading.is_finite() {
            return Err(MotionError::InvalidCommand);
        }
        self.heading = normalize_rad(heading);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
        self.x_pulses = 0.0;
        self.y_pulses = 0.0;
        self.heading = 0.0;
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn x(&self) -> f32 {
        self.x_pulses * self.distance_per_pulse
    }

    pub fn y(&self) -> f32 {
        self.y_pulses * self.distance_per_pulse
    }

    pub fn pose(&self) -> Pose {
        Pose {
            at: self.updated_at,
            x: self.x(),
            y: self.y(),
            heading: self.heading,
        }
    }

    pub fn left_pps(&self, now: Instant) -> f32 {
        self.left.frequency(now)
    }

    pub fn right_pps(&self, now: Instant) -> f32 {
        self.right.frequency(now)
    }

    /// Left wheel linear speed, length unit per second.
    pub fn left_speed(&self, now: Instant) -> f32 {
        self.left_pps(now) * self.distance_per_pulse
    }

    pub fn right_speed(&self, now: Instant) -> f32 {
        self.right_pps(now) * self.distance_per_pulse
    }

    pub fn left_encoder(&self) -> &WheelEncoder {
        &self.left
    }

    pub fn right_encoder(&self) -> &WheelEncoder {
        &self.right
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::instant_from_millis;
    use approx::assert_abs_diff_eq;
    use core::f32::consts::{FRAC_PI_2, PI};

    fn geometry() -> DriveGeometry {
        DriveGeometry {
            wheel_diameter: 0.1,
            pulses_per_revolution: 10,
            track_width: 0.2,
        }
    }

    fn odometry() -> Odometry {
        Odometry::new(&geometry()).unwrap()
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        let geometry = DriveGeometry {
            track_width: 0.0,
            ..geometry()
        };
        assert_eq!(
            Odometry::new(&geometry).err(),
            Some(ConfigError::TrackWidth)
        );
    }

    #[test]
    fn equal_pulses_move_along_heading() {
        let mut odom = odometry();
        let dpp = geometry().distance_per_pulse();

        let pose = odom.update(1, 1, instant_from_millis(10));
        assert_eq!(pose.heading, 0.0);
        assert_abs_diff_eq!(pose.x, dpp, epsilon = 1e-7);
        assert_abs_diff_eq!(pose.y, 0.0, epsilon = 1e-7);

        odom.set_heading(FRAC_PI_2).unwrap();
        let pose = odom.update(1, 1, instant_from_millis(20));
        assert_eq!(pose.heading, FRAC_PI_2);
        assert_abs_diff_eq!(pose.x, dpp, epsilon = 1e-6);
        assert_abs_diff_eq!(pose.y, dpp, epsilon = 1e-6);
        assert_eq!(pose.at, instant_from_millis(20));
    }

    #[test]
    fn opposite_pulses_rotate_in_place() {
        let mut odom = odometry();
        let app = geometry().angle_per_pulse();

        let pose = odom.update(1, -1, instant_from_millis(10));
        assert_eq!(pose.x, 0.0);
        assert_eq!(pose.y, 0.0);
        assert_abs_diff_eq!(pose.heading, 2.0 * app, epsilon = 1e-6);

        let pose = odom.update(-1, 1, instant_from_millis(20));
        assert_abs_diff_eq!(pose.heading, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn non_finite_heading_override_is_rejected() {
        let mut odom = odometry();
        odom.set_heading(1.0).unwrap();
        assert_eq!(
            odom.set_heading(f32::NAN),
            Err(MotionError::InvalidCommand)
        );
        assert_eq!(
            odom.set_heading(f32::NEG_INFINITY),
            Err(MotionError::InvalidCommand)
        );
        assert_eq!(odom.heading(), 1.0);

        let pose = odom.update(1, 1, instant_from_millis(5));
        assert!(pose.x.is_finite() && pose.y.is_finite());
    }

    #[test]
    fn extreme_deltas_do_not_overflow() {
        let mut odom = odometry();
        let pose = odom.update(i32::MAX, i32::MAX, instant_from_millis(1));
        assert!(pose.x > 0.0);
        assert_eq!(pose.heading, 0.0);

        let pose = odom.update(i32::MIN, i32::MAX, instant_from_millis(2));
        assert!(pose.heading > -PI && pose.heading <= PI);
    }

    #[test]
    fn heading_stays_normalized() {
        let mut odom = odometry();
        // Turn 2 * app per step until just past half a revolution.
        let app = geometry().angle_per_pulse();
        let steps = (PI / (2.0 * app)) as i32 + 2;
        for k in 0..steps {
            let pose = odom.update(1, -1, instant_from_millis(k as u64));
            assert!(pose.heading > -PI && pose.heading <= PI);
        }
        assert!(odom.heading() < 0.0);
    }

    #[test]
    fn poll_integrates_edges_only() {
        let mut odom = odometry();
        assert_eq!(odom.poll(false, false, instant_from_millis(1)), None);

        let pose = odom.poll(true, true, instant_from_millis(2)).unwrap();
        assert!(pose.x > 0.0);
        assert_eq!(pose.heading, 0.0);

        // Left only, forward: heading increases.
        let pose = odom.poll(false, true, instant_from_millis(3)).unwrap();
        assert!(pose.heading > 0.0);
        assert_eq!(odom.left_encoder().pulses(), 2);
        assert_eq!(odom.right_encoder().pulses(), 1);
    }

    #[test]
    fn direction_signs_pulses() {
        let mut odom = odometry();
        odom.set_direction(-0.5, -0.5);
        let pose = odom.poll(true, true, instant_from_millis(5)).unwrap();
        assert!(pose.x < 0.0);
    }

    #[test]
    fn speeds_scale_pulse_rates() {
        let mut odom = odometry();
        let mut level = false;
        for k in 1..=5_u64 {
            level = !level;
            odom.poll(level, level, instant_from_millis(k * 20));
        }
        let now = instant_from_millis(100);
        assert_abs_diff_eq!(odom.left_pps(now), 50.0, epsilon = 1e-3);
        let dpp = geometry().distance_per_pulse();
        assert_abs_diff_eq!(odom.left_speed(now), 50.0 * dpp, epsilon = 1e-5);
        assert_abs_diff_eq!(odom.right_speed(now), 50.0 * dpp, epsilon = 1e-5);
    }

    #[test]
    fn reset_returns_to_origin() {
        let mut odom = odometry();
        odom.update(3, 1, instant_from_millis(1));
        odom.reset();
        assert_eq!((odom.x(), odom.y(), odom.heading()), (0.0, 0.0, 0.0));
        assert_eq!(odom.left_encoder().pulses(), 0);
    }
}
