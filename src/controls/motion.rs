//! Closed-loop heading and speed control of the differential drive.
//!
//! A move command holds a target heading and a normalized speed. Each
//! control step blends "turn towards the heading" against "run at speed"
//! with a small fuzzy rule set, then corrects every wheel command against
//! the pulse rate its encoder measures.
//!
//! The step runs from three places, all inside [`MotionController::poll`]
//! or a command call: on every wheel pulse, on the periodic check timer and
//! right after a move command. A watchdog halts the robot when move
//! commands stop arriving.

use num_traits::Float;
use otomo_hardware::motors::{MotorEffort, OpenLoopDrive, PulseInput};

use super::actuator_curve::ActuatorCurve;
use super::fuzzy::{fuzzy_not, fuzzy_or, fuzzy_positive, Defuzzifier};
use super::motor_math::{normalize_rad, saturate_pair};
use crate::config::MotionConfig;
use crate::error::{ConfigError, MotionError};
use crate::sensors::odometry::{Odometry, Pose};
use crate::time::Instant;
use crate::timer::SoftTimer;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MotionState {
    #[default]
    Halted,
    Moving,
}

/// Signed wheel powers in `[-1, 1]`, before actuator correction.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelPowers {
    pub left: f32,
    pub right: f32,
}

/// Everything the control law reads, sampled at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlInput {
    pub target_heading: f32,
    pub target_speed: f32,
    pub heading: f32,
    pub left_pps: f32,
    pub right_pps: f32,
}

/// Open-loop wheel commands for a heading error `turn` and a linear speed.
///
/// The turn term saturates at `on_direction_range`; translation fades out
/// as the heading error grows to `linear_direction_range`.
pub fn wheel_commands(
    turn: f32,
    target_speed: f32,
    config: &MotionConfig,
) -> Result<WheelPowers, MotionError> {
    let is_cw = fuzzy_positive(turn, config.on_direction_range);
    let is_ccw = fuzzy_positive(-turn, config.on_direction_range);
    let is_lin = fuzzy_not(fuzzy_positive(turn.abs(), config.linear_direction_range));

    let mut blend = Defuzzifier::new();
    let cw_speed = blend
        .add(1.0, is_cw)
        .add(-1.0, is_ccw)
        .add(0.0, fuzzy_not(fuzzy_or(is_cw, is_ccw)))
        .defuzzy()?;

    blend.reset();
    let lin_speed = blend
        .add(target_speed, is_lin)
        .add(0.0, fuzzy_not(is_lin))
        .defuzzy()?;

    let (left, right) = saturate_pair(lin_speed + cw_speed, lin_speed - cw_speed);
    Ok(WheelPowers { left, right })
}

/// Proportional correction of one wheel command against its measured rate.
///
/// A zero command stays zero so the wheel does not hunt around standstill.
pub fn feedback_power(command: f32, measured_pps: f32, config: &MotionConfig) -> f32 {
    if command == 0.0 {
        return 0.0;
    }
    let measured = measured_pps / config.max_pulses_per_sec();
    let error = command - measured;
    (command + error * config.feedback_gain).clamp(-1.0, 1.0)
}

/// One evaluation of the control law.
pub fn control_law(
    input: &ControlInput,
    config: &MotionConfig,
) -> Result<WheelPowers, MotionError> {
    let turn = normalize_rad(input.target_heading - input.heading);
    let commands = wheel_commands(turn, input.target_speed, config)?;
    let powers = WheelPowers {
        left: feedback_power(commands.left, input.left_pps, config),
        right: feedback_power(commands.right, input.right_pps, config),
    };
    log::trace!(
        "turn {} commands ({}, {}) powers ({}, {})",
        turn,
        commands.left,
        commands.right,
        powers.left,
        powers.right
    );
    Ok(powers)
}

pub struct MotionController<L, R, LS, RS>
where
    L: OpenLoopDrive,
    R: OpenLoopDrive,
    LS: PulseInput,
    RS: PulseInput,
{
    config: MotionConfig,
    left_motor: L,
    right_motor: R,
    left_sensor: LS,
    right_sensor: RS,
    odometry: Odometry,
    watchdog: SoftTimer,
    check_timer: SoftTimer,
    state: MotionState,
    target_heading: f32,
    target_speed: f32,
    powers: WheelPowers,
    last_poll: Instant,
}

impl<L, R, LS, RS> MotionController<L, R, LS, RS>
where
    L: OpenLoopDrive,
    R: OpenLoopDrive,
    LS: PulseInput,
    RS: PulseInput,
{
    pub fn new(
        config: MotionConfig,
        left_motor: L,
        right_motor: R,
        left_sensor: LS,
        right_sensor: RS,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let odometry = Odometry::new(&config.geometry)?;
        let watchdog = SoftTimer::new(config.safe_interval())?;
        let check_timer = SoftTimer::new(config.check_interval())?.continuous(true);

        let mut ctrl = Self {
            config,
            left_motor,
            right_motor,
            left_sensor,
            right_sensor,
            odometry,
            watchdog,
            check_timer,
            state: MotionState::Halted,
            target_heading: 0.0,
            target_speed: 0.0,
            powers: WheelPowers::default(),
            last_poll: Instant::from_ticks(0),
        };
        ctrl.apply_power(WheelPowers::default());
        Ok(ctrl)
    }

    /// Moves towards `direction` (radians) at `speed` in `[-1, 1]`.
    ///
    /// Also feeds the watchdog: the robot halts unless this is repeated
    /// within the configured safe interval.
    pub fn drive(&mut self, direction: f32, speed: f32, now: Instant) -> Result<(), MotionError> {
        if !direction.is_finite() || !speed.is_finite() {
            return Err(MotionError::InvalidCommand);
        }
        self.target_heading = normalize_rad(direction);
        self.target_speed = speed.clamp(-1.0, 1.0);

        match self.state {
            MotionState::Halted => {
                log::info!(
                    "moving: heading {} speed {}",
                    self.target_heading,
                    self.target_speed
                );
                self.state = MotionState::Moving;
                self.watchdog.start(now);
                self.check_timer.start(now);
            }
            MotionState::Moving => self.watchdog.restart(now),
        }
        self.control_step(now);
        Ok(())
    }

    /// Stops both motors and the timers. Safe to call in any state.
    pub fn halt(&mut self) {
        if self.state == MotionState::Moving {
            log::info!("halting");
        }
        self.target_speed = 0.0;
        self.state = MotionState::Halted;
        self.watchdog.stop();
        self.check_timer.stop();
        self.apply_power(WheelPowers::default());
    }

    /// Advances the loop. Wheel pulses are integrated before the timers are
    /// checked, so a timer-driven step at `now` sees the current pose.
    ///
    /// Returns the updated pose when a wheel pulsed during this call.
    pub fn poll(&mut self, now: Instant) -> Option<Pose> {
        self.last_poll = now;

        let left_level = self.left_sensor.level();
        let right_level = self.right_sensor.level();
        let pose = self.odometry.poll(left_level, right_level, now);
        if pose.is_some() {
            self.control_step(now);
        }

        if self.watchdog.poll(now).is_some() {
            log::warn!(
                "no move command for {} ms, halting",
                self.config.safe_interval_ms
            );
            self.halt();
        }

        if self.check_timer.poll(now).is_some() {
            self.control_step(now);
        }

        pose
    }

    /// Halts and moves the pose estimate back to the origin.
    pub fn reset(&mut self) {
        self.halt();
        self.odometry.reset();
    }

    /// Replaces the calibration of one motor.
    pub fn set_correction(&mut self, side: Side, curve: ActuatorCurve) -> Result<(), MotionError> {
        curve.validate()?;
        match side {
            Side::Left => self.config.left_curve = curve,
            Side::Right => self.config.right_curve = curve,
        }
        Ok(())
    }

    /// Overrides the estimated heading with an absolute one.
    pub fn set_heading(&mut self, heading: f32) -> Result<(), MotionError> {
        self.odometry.set_heading(heading)
    }

    pub fn is_moving(&self) -> bool {
        self.state == MotionState::Moving
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn target(&self) -> (f32, f32) {
        (self.target_heading, self.target_speed)
    }

    pub fn powers(&self) -> WheelPowers {
        self.powers
    }

    pub fn heading(&self) -> f32 {
        self.odometry.heading()
    }

    pub fn x(&self) -> f32 {
        self.odometry.x()
    }

    pub fn y(&self) -> f32 {
        self.odometry.y()
    }

    pub fn pose(&self) -> Pose {
        self.odometry.pose()
    }

    /// Left wheel speed as of the last poll.
    pub fn left_speed(&self) -> f32 {
        self.odometry.left_speed(self.last_poll)
    }

    pub fn right_speed(&self) -> f32 {
        self.odometry.right_speed(self.last_poll)
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn motors(&self) -> (&L, &R) {
        (&self.left_motor, &self.right_motor)
    }

    fn control_step(&mut self, now: Instant) {
        if self.state == MotionState::Halted {
            return;
        }
        let input = ControlInput {
            target_heading: self.target_heading,
            target_speed: self.target_speed,
            heading: self.odometry.heading(),
            left_pps: self.odometry.left_pps(now),
            right_pps: self.odometry.right_pps(now),
        };
        match control_law(&input, &self.config) {
            Ok(powers) => self.apply_power(powers),
            Err(e) => {
                log::error!("control step failed: {}", e);
                self.apply_power(WheelPowers::default());
            }
        }
    }

    fn apply_power(&mut self, powers: WheelPowers) {
        self.powers = powers;
        let left = self.config.left_curve.correct(powers.left);
        let right = self.config.right_curve.correct(powers.right);
        self.left_motor.drive(MotorEffort::from_power(left));
        self.right_motor.drive(MotorEffort::from_power(right));
        self.odometry.set_direction(powers.left, powers.right);
    }
}
