//! Tessel renderer - tile-based CPU path tracing.
//!
//! A Monte Carlo path tracer: scenes are built from [`Hittable`] primitives
//! with shared [`Material`]s, accelerated by a [`BvhNode`], and rendered
//! either progressively on a [`TileRenderer`] worker pool or in one blocking
//! [`render`] call.

mod bvh;
mod camera;
mod config;
mod cuboid;
mod error;
mod fog;
mod framebuffer;
mod hittable;
mod material;
pub mod random;
mod rect;
mod renderer;
mod rotate;
mod sampler;
mod scheduler;
mod spectrum;
mod sphere;
mod tile;
mod triangle;
mod welford;

pub use bvh::{BvhNode, LEAF_MAX_SIZE, SAH_THRESHOLD};
pub use camera::Camera;
pub use config::{AdaptiveConfig, Background, RenderConfig};
pub use cuboid::Cuboid;
pub use error::{GeometryError, RenderError, RenderResult};
pub use fog::Fog;
pub use framebuffer::FrameBuffer;
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{
    reflect, refract, Anisotropic, Dielectric, DiffuseLight, DirectionalLight, Lambertian,
    Material, Metal, NormalShade, ScatterResult, Specular, ThinFilm,
};
pub use rect::{AxisRect, Plane};
pub use renderer::{
    color_to_rgba, linear_to_gamma, ray_color, render, render_pixel, sky_gradient, ImageBuffer,
};
pub use rotate::RotateY;
pub use sampler::{PixelFilter, PixelSample, SampleStrategy, Sampler};
pub use scheduler::{RenderState, TileRenderer};
pub use spectrum::{spectral_weight, wavelength_to_rgb, MAX_WAVELENGTH, MIN_WAVELENGTH};
pub use sphere::Sphere;
pub use tile::{create_tiles, render_tile, Tile, TileOrder, TileResult};
pub use triangle::Triangle;
pub use welford::WeightedWelford;

/// Re-export the math types scenes are built from
pub use tessel_math::{Aabb, Color, Interval, Ray, Vec3};
