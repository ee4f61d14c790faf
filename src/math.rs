/*
 * Math Module
 *
 * Vector helpers shared by the boid rules. Clamping rescales the vector
 * (v * (max / |v|)) instead of normalizing and multiplying, so the result is
 * reproducible to the bit across runs. Lengths use hypot so components near
 * f32::MAX do not overflow when squared.
 */

use glam::Vec2;

// Rescale a vector so its length does not exceed `max`, preserving direction
#[inline]
pub fn limit_magnitude(v: Vec2, max: f32) -> Vec2 {
    let length = magnitude(v);
    if length > max {
        v * (max / length)
    } else {
        v
    }
}

#[inline]
pub fn magnitude(v: Vec2) -> f32 {
    v.x.hypot(v.y)
}

// Unit vector in the direction of `v`, or zero for a zero-length input
#[inline]
pub fn normalize_or_zero(v: Vec2) -> Vec2 {
    let length = magnitude(v);
    if length > 0.0 {
        v / length
    } else {
        Vec2::ZERO
    }
}
