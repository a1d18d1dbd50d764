//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Iterative ray tracing with configurable depth
//! - Filtered, optionally adaptive, multi-sampling per pixel
//! - Gamma correction

use log::info;
use rand::RngCore;
use rayon::prelude::*;
use std::time::Instant;
use tessel_math::{Color, Interval, Ray};

use crate::camera::Camera;
use crate::config::{Background, RenderConfig};
use crate::error::{RenderError, RenderResult};
use crate::hittable::Hittable;
use crate::spectrum::{sample_wavelength, spectral_weight};
use crate::tile::{create_tiles, render_tile, TileResult};
use crate::welford::WeightedWelford;

/// Compute the color seen by a ray.
///
/// Follows the path for at most `max_depth` bounces, accumulating emitted
/// light weighted by the product of attenuations so far. A path that is
/// still bouncing when the depth runs out contributes nothing further.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    max_depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let mut result = Color::ZERO;
    let mut attenuation = Color::ONE;
    let mut ray = *ray;
    let ray_t = Interval::new(config.t_min, f64::INFINITY);

    for _ in 0..max_depth {
        let rec = match world.hit(&ray, ray_t, rng) {
            Some(rec) => rec,
            None => {
                result += attenuation * background_color(&config.background, &ray);
                break;
            }
        };

        // Emission from lights
        result += attenuation * rec.material.emitted(&ray, &rec);

        match rec.material.scatter(&ray, &rec, rng) {
            Some(scatter) => {
                attenuation *= scatter.attenuation;
                ray = scatter.scattered;
            }
            // Absorbed
            None => break,
        }
    }

    result
}

fn background_color(background: &Background, ray: &Ray) -> Color {
    match background {
        Background::Sky => sky_gradient(ray),
        Background::Solid(color) => *color,
    }
}

/// Compute sky gradient background.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Clamp a value to [0, 1] range.
#[inline]
pub fn clamp_01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Convert a color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let r = (255.0 * clamp_01(linear_to_gamma(color.x))) as u8;
    let g = (255.0 * clamp_01(linear_to_gamma(color.y))) as u8;
    let b = (255.0 * clamp_01(linear_to_gamma(color.z))) as u8;
    [r, g, b, 255]
}

/// Estimate pixel `(x, y)`, row 0 at the top.
///
/// Takes up to `samples_per_pixel` filtered samples. With adaptive sampling
/// enabled the pixel stops early once its estimate has converged. Spectral
/// rendering traces every sample at its own wavelength.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> WeightedWelford {
    let mut estimate = WeightedWelford::new();
    let total = config.samples_per_pixel;
    let batch = config.adaptive.map(|a| a.batch_size(total));

    for index in 0..total {
        let sample = config.sampler.sample(
            rng,
            x,
            y,
            camera.image_width,
            camera.image_height,
            index,
            total,
        );
        let ray = camera.get_ray(sample.u, sample.v, rng);
        let color = if config.spectral {
            let wavelength = sample_wavelength(rng);
            let ray = ray.with_wavelength(wavelength);
            ray_color(&ray, world, config.max_depth, config, rng) * spectral_weight(wavelength)
        } else {
            ray_color(&ray, world, config.max_depth, config, rng)
        };
        estimate.add_sample(color, sample.weight);

        if let (Some(adaptive), Some(batch)) = (config.adaptive, batch) {
            let taken = index + 1;
            if taken % batch == 0
                && taken >= adaptive.min_samples
                && estimate.has_converged(adaptive.threshold)
            {
                break;
            }
        }
    }

    estimate
}

/// Simple image buffer for storing render output.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    /// Linear colors, row-major from the top-left
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Copy a rendered tile into place.
    pub fn write_tile(&mut self, result: &TileResult) {
        let tile = &result.tile;
        for (row, line) in result.pixels.chunks(tile.width as usize).enumerate() {
            let start = ((tile.y + row as u32) * self.width + tile.x) as usize;
            self.pixels[start..start + line.len()].copy_from_slice(line);
        }
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }
}

/// Render the entire scene to an image buffer, blocking until done.
///
/// Tiles are rendered on the rayon thread pool; see
/// [`crate::TileRenderer`] for a progressive, pollable render.
pub fn render(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
) -> RenderResult<ImageBuffer> {
    config.validate()?;
    let (width, height) = (camera.image_width, camera.image_height);
    if width == 0 || height == 0 {
        return Err(RenderError::EmptyResolution { width, height });
    }

    let start = Instant::now();
    let tiles = create_tiles(width, height, config.tile_size, config.tile_order);
    info!(
        "Rendering {}x{} in {} tiles at {} spp",
        width,
        height,
        tiles.len(),
        config.samples_per_pixel
    );

    let results: Vec<TileResult> = tiles
        .par_iter()
        .map(|tile| render_tile(tile, camera, world, config))
        .collect();

    let mut image = ImageBuffer::new(width, height);
    let mut samples = 0;
    for result in &results {
        image.write_tile(result);
        samples += result.samples;
    }

    info!(
        "Render finished in {:.2?} ({} camera samples)",
        start.elapsed(),
        samples
    );
    Ok(image)
}
