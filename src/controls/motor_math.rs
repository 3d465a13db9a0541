use core::f32::consts::{PI, TAU};

use num_traits::Float;

/// Maps any finite angle in radians into `(-PI, PI]`.
///
/// The remainder is exact for any magnitude, and the final wrap is a
/// Sterbenz-exact subtraction, so the result is idempotent.
pub fn normalize_rad(angle: f32) -> f32 {
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

pub fn deg_to_rad(deg: f32) -> f32 {
    deg * (PI / 180.0)
}

/// Scales a wheel pair down so neither leaves `[-1, 1]`, keeping their ratio.
pub fn saturate_pair(left: f32, right: f32) -> (f32, f32) {
    let scale = left.abs().max(right.abs()).max(1.0);
    (left / scale, right / scale)
}
