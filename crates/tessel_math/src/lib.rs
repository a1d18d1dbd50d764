//! Tessel math - vectors, rays, intervals and bounding boxes.
//!
//! Everything is double precision. `Vec3` is `glam::DVec3` and doubles as a
//! point, a direction and a linear RGB color.

pub use glam::{dvec3, DVec2 as Vec2, DVec3 as Vec3};

mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::{Ray, WHITE_WAVELENGTH};

/// Linear RGB color.
pub type Color = Vec3;

/// Relative luminance of a linear RGB color (Rec. 709 weights).
#[inline]
pub fn luminance(c: Color) -> f64 {
    0.2126 * c.x + 0.7152 * c.y + 0.0722 * c.z
}

/// Component of `v` along axis `n` (0=X, 1=Y, 2=Z).
#[inline]
pub fn axis_component(v: Vec3, n: usize) -> f64 {
    match n {
        0 => v.x,
        1 => v.y,
        _ => v.z,
    }
}
