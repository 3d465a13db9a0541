use thiserror::Error;

/// Rejected setup values. Raised at construction, never during motion.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("timer interval must be longer than zero")]
    ZeroInterval,
    #[error("wheel diameter must be positive")]
    WheelDiameter,
    #[error("track width must be positive")]
    TrackWidth,
    #[error("pulses per revolution must be positive")]
    PulsesPerRevolution,
    #[error("max speed must be positive")]
    MaxSpeed,
    #[error("feedback gain must be finite and not negative")]
    FeedbackGain,
    #[error("fuzzy direction ranges must be positive")]
    DirectionRange,
    #[error("correction points must be finite with strictly increasing x")]
    NonMonotonicCurve,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MotionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("motion command must be finite")]
    InvalidCommand,
    #[error("defuzzification without any usable weighted term")]
    NoFuzzyWeight,
}
