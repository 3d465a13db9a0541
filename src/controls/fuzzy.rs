use crate::error::MotionError;

/// Ramp membership: 0 at or below zero, 1 at or above `range`.
pub fn fuzzy_positive(value: f32, range: f32) -> f32 {
    (value / range).clamp(0.0, 1.0)
}

pub fn fuzzy_not(a: f32) -> f32 {
    1.0 - a
}

pub fn fuzzy_or(a: f32, b: f32) -> f32 {
    a.max(b)
}

/// Weighted-average defuzzifier.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Defuzzifier {
    weighted_sum: f32,
    total_weight: f32,
}

impl Defuzzifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: f32, weight: f32) -> &mut Self {
        self.weighted_sum += value * weight;
        self.total_weight += weight;
        self
    }

    /// Crisp value of the terms added so far.
    ///
    /// Fails instead of returning NaN when no term carried any weight, or
    /// when a term was not finite.
    pub fn defuzzy(&self) -> Result<f32, MotionError> {
        let usable = self.total_weight.is_finite()
            && self.total_weight != 0.0
            && self.weighted_sum.is_finite();
        if !usable {
            Err(MotionError::NoFuzzyWeight)
        } else {
            Ok(self.weighted_sum / self.total_weight)
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
