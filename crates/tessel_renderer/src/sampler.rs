//! Pixel sample placement and reconstruction filters.

use rand::{Rng, RngCore};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::random::gen_f64;

/// Standard deviation of [`SampleStrategy::Normal`] offsets, in pixels.
const NORMAL_SIGMA: f64 = 0.2;

/// Cells per side of the [`SampleStrategy::Grid`] pattern.
const GRID_SIZE: u32 = 10;

const GAUSSIAN_ALPHA: f64 = 8.0;

// Mitchell-Netravali parameters
const MITCHELL_B: f64 = 1.0 / 3.0;
const MITCHELL_C: f64 = 1.0 / 3.0;

/// Where inside a pixel each sample lands.
///
/// Offsets are relative to the pixel center, nominally in `[-0.5, 0.5]²`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleStrategy {
    /// Uniform random
    #[default]
    Uniform,
    /// One jittered sample per cell of a ⌊√n⌋ × ⌊√n⌋ grid, the rest uniform
    Stratified,
    /// Gaussian around the center; may fall outside the pixel
    Normal,
    /// Fixed 10×10 lattice, cycling every 100 samples
    Grid,
    /// Always the pixel center
    Center,
}

impl SampleStrategy {
    /// Offset from the pixel center for sample `index` of `total`.
    pub fn offset(self, rng: &mut dyn RngCore, index: u32, total: u32) -> (f64, f64) {
        match self {
            SampleStrategy::Uniform => (gen_f64(rng) - 0.5, gen_f64(rng) - 0.5),
            SampleStrategy::Stratified => {
                // The first n² samples fill an n×n grid, any remainder is uniform
                let n = ((total.max(1) as f64).sqrt() as u32).max(1);
                if index >= n * n {
                    return (gen_f64(rng) - 0.5, gen_f64(rng) - 0.5);
                }
                let (sx, sy) = (index % n, index / n);
                (
                    (sx as f64 + gen_f64(rng)) / n as f64 - 0.5,
                    (sy as f64 + gen_f64(rng)) / n as f64 - 0.5,
                )
            }
            SampleStrategy::Normal => {
                let dx: f64 = rng.sample(StandardNormal);
                let dy: f64 = rng.sample(StandardNormal);
                (dx * NORMAL_SIGMA, dy * NORMAL_SIGMA)
            }
            SampleStrategy::Grid => {
                let cell = index % (GRID_SIZE * GRID_SIZE);
                let size = GRID_SIZE as f64;
                (
                    ((cell % GRID_SIZE) as f64 + 0.5) / size - 0.5,
                    ((cell / GRID_SIZE) as f64 + 0.5) / size - 0.5,
                )
            }
            SampleStrategy::Center => (0.0, 0.0),
        }
    }
}

/// Reconstruction filter weighting each sample by its offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFilter {
    Box,
    /// Gaussian shifted down so the weight reaches zero at the pixel corner
    Gaussian,
    #[default]
    Mitchell,
}

impl PixelFilter {
    /// Weight of a sample at offset `(dx, dy)` from the pixel center.
    ///
    /// Can be zero or negative outside the pixel.
    pub fn weight(self, dx: f64, dy: f64) -> f64 {
        match self {
            PixelFilter::Box => 1.0,
            PixelFilter::Gaussian => {
                let corner = (-GAUSSIAN_ALPHA * 0.25).exp() * (-GAUSSIAN_ALPHA * 0.25).exp();
                (-GAUSSIAN_ALPHA * dx * dx).exp() * (-GAUSSIAN_ALPHA * dy * dy).exp() - corner
            }
            PixelFilter::Mitchell => 2.0 * mitchell_1d(dx) * mitchell_1d(dy),
        }
    }
}

/// Mitchell-Netravali kernel with its support scaled to the pixel.
fn mitchell_1d(x: f64) -> f64 {
    let (b, c) = (MITCHELL_B, MITCHELL_C);
    let x = (2.0 * x).abs();
    if x >= 2.0 {
        0.0
    } else if x > 1.0 {
        ((-b - 6.0 * c) * x * x * x
            + (6.0 * b + 30.0 * c) * x * x
            + (-12.0 * b - 48.0 * c) * x
            + (8.0 * b + 24.0 * c))
            / 6.0
    } else {
        ((12.0 - 9.0 * b - 6.0 * c) * x * x * x
            + (-18.0 + 12.0 * b + 6.0 * c) * x * x
            + (6.0 - 2.0 * b))
            / 6.0
    }
}

/// A sample position in viewport space together with its filter weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelSample {
    pub u: f64,
    /// Zero at the bottom of the image
    pub v: f64,
    pub weight: f64,
}

/// Combines a placement strategy with a reconstruction filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Sampler {
    pub strategy: SampleStrategy,
    pub filter: PixelFilter,
}

impl Sampler {
    pub fn new(strategy: SampleStrategy, filter: PixelFilter) -> Self {
        Self { strategy, filter }
    }

    /// Sample `index` of `total` for pixel `(x, y)`, where row 0 is the top
    /// of a `width × height` image.
    #[allow(clippy::too_many_arguments)]
    pub fn sample(
        &self,
        rng: &mut dyn RngCore,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        index: u32,
        total: u32,
    ) -> PixelSample {
        let (dx, dy) = self.strategy.offset(rng, index, total);
        PixelSample {
            u: (x as f64 + 0.5 + dx) / width as f64,
            v: 1.0 - (y as f64 + 0.5 + dy) / height as f64,
            weight: self.filter.weight(dx, dy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_box_filter_is_flat() {
        assert_eq!(PixelFilter::Box.weight(0.0, 0.0), 1.0);
        assert_eq!(PixelFilter::Box.weight(0.49, -0.3), 1.0);
    }

    #[test]
    fn test_gaussian_filter_vanishes_at_corner() {
        assert_relative_eq!(PixelFilter::Gaussian.weight(0.5, 0.5), 0.0, epsilon = 1e-12);
        assert_relative_eq!(
            PixelFilter::Gaussian.weight(0.0, 0.0),
            1.0 - (-4.0f64).exp(),
            epsilon = 1e-12
        );
        // Depends on both offsets
        assert!(PixelFilter::Gaussian.weight(0.0, 0.4) < PixelFilter::Gaussian.weight(0.0, 0.0));
    }

    #[test]
    fn test_mitchell_filter_values() {
        assert_relative_eq!(PixelFilter::Mitchell.weight(0.0, 0.0), 2.0 * 64.0 / 81.0, epsilon = 1e-12);
        assert_relative_eq!(mitchell_1d(0.5), 1.0 / 18.0, epsilon = 1e-12);
        // Support ends two pixel half-widths out
        assert_relative_eq!(mitchell_1d(1.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mitchell_filter_is_zero_beyond_support() {
        assert_eq!(mitchell_1d(1.2), 0.0);
        assert_eq!(mitchell_1d(-3.0), 0.0);
        // Two far offsets must not multiply into a positive weight
        assert_eq!(PixelFilter::Mitchell.weight(1.5, -1.5), 0.0);
        assert!(PixelFilter::Mitchell.weight(0.8, 0.0) < 0.0);
    }

    #[test]
    fn test_center_sample_maps_to_pixel_center() {
        let sampler = Sampler::new(SampleStrategy::Center, PixelFilter::Box);
        let mut rng = StdRng::seed_from_u64(42);

        let top_left = sampler.sample(&mut rng, 0, 0, 4, 2, 0, 1);
        assert_relative_eq!(top_left.u, 0.125);
        assert_relative_eq!(top_left.v, 0.75);
        assert_eq!(top_left.weight, 1.0);

        let bottom_right = sampler.sample(&mut rng, 3, 1, 4, 2, 0, 1);
        assert_relative_eq!(bottom_right.u, 0.875);
        assert_relative_eq!(bottom_right.v, 0.25);
    }

    #[test]
    fn test_uniform_samples_stay_inside_pixel() {
        let sampler = Sampler::new(SampleStrategy::Uniform, PixelFilter::Mitchell);
        let mut rng = StdRng::seed_from_u64(42);

        for i in 0..500 {
            let s = sampler.sample(&mut rng, 3, 5, 10, 10, i, 500);
            assert!(s.u >= 0.3 && s.u < 0.4);
            assert!(s.v > 0.4 && s.v <= 0.5);
            assert!(s.weight > 0.0);
        }
    }

    #[test]
    fn test_stratified_covers_every_cell() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = [false; 16];
        for i in 0..16 {
            let (dx, dy) = SampleStrategy::Stratified.offset(&mut rng, i, 16);
            let cx = ((dx + 0.5) * 4.0) as usize;
            let cy = ((dy + 0.5) * 4.0) as usize;
            seen[cy * 4 + cx] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_stratified_stays_centered_for_non_square_counts() {
        let mut rng = StdRng::seed_from_u64(42);
        let pixels = 200;
        let mut sum = (0.0, 0.0);

        for _ in 0..pixels {
            let offsets: Vec<_> = (0..10)
                .map(|i| SampleStrategy::Stratified.offset(&mut rng, i, 10))
                .collect();
            // Every row of the 3×3 grid is visited, including the bottom one
            assert!(offsets.iter().any(|&(_, dy)| dy > 1.0 / 6.0));
            assert!(offsets.iter().any(|&(dx, _)| dx > 1.0 / 6.0));
            for (dx, dy) in offsets {
                assert!((-0.5..0.5).contains(&dx) && (-0.5..0.5).contains(&dy));
                sum.0 += dx;
                sum.1 += dy;
            }
        }

        let count = (pixels * 10) as f64;
        assert!((sum.0 / count).abs() < 0.02);
        assert!((sum.1 / count).abs() < 0.02);
    }

    #[test]
    fn test_grid_offsets_cycle() {
        let mut rng = StdRng::seed_from_u64(42);
        let first = SampleStrategy::Grid.offset(&mut rng, 0, 200);
        let again = SampleStrategy::Grid.offset(&mut rng, 100, 200);
        assert_eq!(first, again);
        assert_relative_eq!(first.0, -0.45, epsilon = 1e-12);
        assert_relative_eq!(first.1, -0.45, epsilon = 1e-12);
    }

    #[test]
    fn test_normal_offsets_are_concentrated() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 4000;
        let mean_sq: f64 = (0..n)
            .map(|i| SampleStrategy::Normal.offset(&mut rng, i, n).0.powi(2))
            .sum::<f64>()
            / n as f64;
        assert!((mean_sq - NORMAL_SIGMA * NORMAL_SIGMA).abs() < 0.005);
    }
}
