pub mod actuator_curve;
pub mod fuzzy;
pub mod motion;
pub mod motor_math;
