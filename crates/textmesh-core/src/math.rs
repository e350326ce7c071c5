//! Vector math re-exports.
//!
//! Layout code works in plain `f32`s; `Vec2` is used for offsets and anchors at the API edges.

pub use glam::{Vec2, vec2};

/// Floor `value` to `precision` steps (e.g. `1000.0` keeps three decimals).
#[inline]
pub fn floor_to(value: f32, precision: f32) -> f32 {
    if precision <= 0.0 {
        return value;
    }
    (value * precision).floor() / precision
}
