pub mod encoder;
pub mod hbridge;

use num_traits::float::FloatCore;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum MotorEffort {
    Forward(f32), // Measured as 0..=1 in terms of effort
    Backward(f32),
    Brake,
    #[default]
    Release,
}

impl MotorEffort {
    /// Maps a signed power in `[-1, 1]` to an effort. Zero releases the motor.
    pub fn from_power(power: f32) -> Self {
        let power = if power.is_nan() {
            0.0
        } else {
            power.clamp(-1.0, 1.0)
        };

        if power > 0.0 {
            MotorEffort::Forward(power)
        } else if power < 0.0 {
            MotorEffort::Backward(power.abs())
        } else {
            MotorEffort::Release
        }
    }

    /// Signed power of this effort, braking and releasing both read as 0.
    pub fn power(&self) -> f32 {
        match *self {
            MotorEffort::Forward(d) => d,
            MotorEffort::Backward(d) => -d,
            MotorEffort::Brake | MotorEffort::Release => 0.0,
        }
    }
}

pub trait OpenLoopDrive {
    fn drive(&mut self, effort: MotorEffort);
    fn current_effort(&self) -> MotorEffort;
}

/// A single wheel pulse sensor, sampled once per polling tick.
pub trait PulseInput {
    /// Current logic level of the sensor line.
    fn level(&mut self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_maps_to_effort() {
        assert_eq!(MotorEffort::from_power(0.5), MotorEffort::Forward(0.5));
        assert_eq!(MotorEffort::from_power(-0.25), MotorEffort::Backward(0.25));
        assert_eq!(MotorEffort::from_power(0.0), MotorEffort::Release);
    }

    #[test]
    fn power_is_saturated() {
        assert_eq!(MotorEffort::from_power(3.0), MotorEffort::Forward(1.0));
        assert_eq!(MotorEffort::from_power(-7.5), MotorEffort::Backward(1.0));
        assert_eq!(MotorEffort::from_power(f32::NAN), MotorEffort::Release);
    }

    #[test]
    fn effort_reads_back_signed_power() {
        assert_eq!(MotorEffort::Backward(0.4).power(), -0.4);
        assert_eq!(MotorEffort::Brake.power(), 0.0);
    }
}
