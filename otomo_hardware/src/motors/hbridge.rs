use embedded_hal::pwm::SetDutyCycle;

use super::{MotorEffort, OpenLoopDrive};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeError<A, B> {
    InputA(A),
    InputB(B),
}

/// Two-input H-bridge, one PWM channel per direction.
pub struct HBridge<A: SetDutyCycle, B: SetDutyCycle> {
    input_1: A,
    input_2: B,
    effort: MotorEffort,
}

impl<A: SetDutyCycle, B: SetDutyCycle> HBridge<A, B> {
    pub fn new(input_1: A, input_2: B) -> Self {
        let mut shield = Self {
            input_1,
            input_2,
            effort: MotorEffort::Release,
        };

        // set an initial state
        if let Err(e) = shield.run(MotorEffort::Release) {
            log::error!("h-bridge init failed: {:?}", e);
        }

        shield
    }

    pub fn run(&mut self, effort: MotorEffort) -> Result<(), BridgeError<A::Error, B::Error>> {
        let max_1 = self.input_1.max_duty_cycle();
        let max_2 = self.input_2.max_duty_cycle();
        let (a_duty, b_duty) = match effort {
            MotorEffort::Forward(d) => {
                let duty_ratio = d.clamp(0.0, 1.0);
                ((max_1 as f32 * duty_ratio) as u16, 0)
            }
            MotorEffort::Backward(d) => {
                let duty_ratio = d.clamp(0.0, 1.0);
                (0, (max_2 as f32 * duty_ratio) as u16)
            }
            MotorEffort::Brake => (max_1, max_2),
            MotorEffort::Release => (0, 0),
        };

        self.input_1
            .set_duty_cycle(a_duty)
            .map_err(BridgeError::InputA)?;
        self.input_2
            .set_duty_cycle(b_duty)
            .map_err(BridgeError::InputB)?;
        self.effort = effort;
        Ok(())
    }

    pub fn release(self) -> (A, B) {
        (self.input_1, self.input_2)
    }
}

impl<A: SetDutyCycle, B: SetDutyCycle> OpenLoopDrive for HBridge<A, B> {
    fn drive(&mut self, effort: MotorEffort) {
        if let Err(e) = self.run(effort) {
            log::warn!("h-bridge drive {:?} failed: {:?}", effort, e);
        }
    }

    fn current_effort(&self) -> MotorEffort {
        self.effort
    }
}
