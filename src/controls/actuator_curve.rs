use crate::error::ConfigError;

pub const CURVE_POINTS: usize = 5;

const IDENTITY: [f32; CURVE_POINTS] = [-1.0, -0.5, 0.0, 0.5, 1.0];

/// Piecewise-linear correction from requested speed to drive value.
///
/// Compensates the dead band and non-linear response of a DC motor on PWM.
/// Control points are calibrated per motor.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorCurve {
    xs: [f32; CURVE_POINTS],
    ys: [f32; CURVE_POINTS],
}

impl Default for ActuatorCurve {
    fn default() -> Self {
        Self {
            xs: IDENTITY,
            ys: IDENTITY,
        }
    }
}

impl ActuatorCurve {
    pub fn new(xs: [f32; CURVE_POINTS], ys: [f32; CURVE_POINTS]) -> Result<Self, ConfigError> {
        validate(&xs, &ys)?;
        Ok(Self { xs, ys })
    }

    pub fn set_correction(
        &mut self,
        xs: [f32; CURVE_POINTS],
        ys: [f32; CURVE_POINTS],
    ) -> Result<(), ConfigError> {
        validate(&xs, &ys)?;
        self.xs = xs;
        self.ys = ys;
        Ok(())
    }

    /// Re-checks a table that bypassed the constructors (e.g. deserialized).
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate(&self.xs, &self.ys)
    }

    pub fn points(&self) -> ([f32; CURVE_POINTS], [f32; CURVE_POINTS]) {
        (self.xs, self.ys)
    }

    /// Corrected drive value for `x` in `[-1, 1]`, clamped to `[-1, 1]`.
    pub fn correct(&self, x: f32) -> f32 {
        let x = x.clamp(-1.0, 1.0);
        let i = self.segment(x);
        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);
        let t = (x - x0) / (x1 - x0);
        // t == 1 only on the last control point, which must map exactly.
        let y = if t >= 1.0 { y1 } else { y0 + t * (y1 - y0) };
        y.clamp(-1.0, 1.0)
    }

    fn segment(&self, x: f32) -> usize {
        if x < self.xs[0] {
            return 0;
        }
        (0..CURVE_POINTS - 1)
            .find(|&i| self.xs[i] <= x && x < self.xs[i + 1])
            .unwrap_or(CURVE_POINTS - 2)
    }
}

fn validate(xs: &[f32; CURVE_POINTS], ys: &[f32; CURVE_POINTS]) -> Result<(), ConfigError> {
    let finite = xs.iter().chain(ys.iter()).all(|v| v.is_finite());
    let increasing = xs.windows(2).all(|w| w[0] < w[1]);
    if finite && increasing {
        Ok(())
    } else {
        Err(ConfigError::NonMonotonicCurve)
    }
}
