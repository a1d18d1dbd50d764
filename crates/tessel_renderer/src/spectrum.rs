//! Single-wavelength sampling of the visible band.
//!
//! A spectral sample traces one camera ray at a random wavelength and tints
//! its radiance by that wavelength's color. The tint is normalized so it
//! averages to white over the band, which keeps wavelength-independent
//! scenes unbiased while dispersive materials split light into colors.

use std::sync::OnceLock;

use rand::RngCore;
use tessel_math::Color;

use crate::random::gen_range_f64;

/// Shortest sampled wavelength in nm.
pub const MIN_WAVELENGTH: f64 = 380.0;
/// Longest sampled wavelength in nm.
pub const MAX_WAVELENGTH: f64 = 720.0;

const NORMALIZATION_STEPS: usize = 1024;

/// Approximate color of monochromatic light, zero outside the visible band.
pub fn wavelength_to_rgb(wavelength: f64) -> Color {
    let w = wavelength;
    let rgb = if (380.0..440.0).contains(&w) {
        Color::new((440.0 - w) / 60.0, 0.0, 1.0)
    } else if (440.0..490.0).contains(&w) {
        Color::new(0.0, (w - 440.0) / 50.0, 1.0)
    } else if (490.0..510.0).contains(&w) {
        Color::new(0.0, 1.0, (510.0 - w) / 20.0)
    } else if (510.0..580.0).contains(&w) {
        Color::new((w - 510.0) / 70.0, 1.0, 0.0)
    } else if (580.0..645.0).contains(&w) {
        Color::new(1.0, (645.0 - w) / 65.0, 0.0)
    } else if (645.0..=MAX_WAVELENGTH).contains(&w) {
        Color::new(1.0, 0.0, 0.0)
    } else {
        return Color::ZERO;
    };

    // Sensitivity falls off towards both ends of the band
    let falloff = if w < 420.0 {
        0.3 + 0.7 * (w - 380.0) / 40.0
    } else if w > 700.0 {
        0.3 + 0.7 * (MAX_WAVELENGTH - w) / 20.0
    } else {
        1.0
    };
    rgb * falloff
}

/// Mean of [`wavelength_to_rgb`] over the band, per channel.
fn band_mean() -> Color {
    static MEAN: OnceLock<Color> = OnceLock::new();
    *MEAN.get_or_init(|| {
        let step = (MAX_WAVELENGTH - MIN_WAVELENGTH) / NORMALIZATION_STEPS as f64;
        let sum: Color = (0..NORMALIZATION_STEPS)
            .map(|i| wavelength_to_rgb(MIN_WAVELENGTH + (i as f64 + 0.5) * step))
            .sum();
        sum / NORMALIZATION_STEPS as f64
    })
}

/// Tint for a sample traced at `wavelength`; averages to white over the band.
pub fn spectral_weight(wavelength: f64) -> Color {
    wavelength_to_rgb(wavelength) / band_mean()
}

/// Uniform wavelength in `[MIN_WAVELENGTH, MAX_WAVELENGTH)`.
pub fn sample_wavelength(rng: &mut dyn RngCore) -> f64 {
    gen_range_f64(rng, MIN_WAVELENGTH, MAX_WAVELENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_primary_hues() {
        assert_eq!(wavelength_to_rgb(450.0).z, 1.0);
        assert_eq!(wavelength_to_rgb(450.0).x, 0.0);
        assert_eq!(wavelength_to_rgb(530.0).y, 1.0);
        assert_eq!(wavelength_to_rgb(660.0), Color::new(1.0, 0.0, 0.0));
        assert_eq!(wavelength_to_rgb(300.0), Color::ZERO);
        assert_eq!(wavelength_to_rgb(800.0), Color::ZERO);
    }

    #[test]
    fn test_weight_is_non_negative() {
        for i in 0..=340 {
            let w = spectral_weight(MIN_WAVELENGTH + i as f64);
            assert!(w.min_element() >= 0.0);
        }
    }

    #[test]
    fn test_weight_averages_to_white() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 20_000;
        let mean: Color = (0..n)
            .map(|_| spectral_weight(sample_wavelength(&mut rng)))
            .sum::<Color>()
            / n as f64;
        assert!((mean - Color::ONE).abs().max_element() < 0.05);
    }

    #[test]
    fn test_sampled_wavelengths_stay_in_band() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let w = sample_wavelength(&mut rng);
            assert!((MIN_WAVELENGTH..MAX_WAVELENGTH).contains(&w));
        }
    }
}
