//! Render configuration.

use serde::{Deserialize, Serialize};
use tessel_math::Color;

use crate::error::{RenderError, RenderResult};
use crate::sampler::Sampler;
use crate::tile::TileOrder;

/// Radiance returned by rays that leave the scene.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    /// White at the horizon blending to light blue overhead
    #[default]
    Sky,
    Solid(Color),
}

/// Per-pixel early termination once the estimate is precise enough.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveConfig {
    /// Allowed 95% confidence half-width relative to the pixel's luminance
    pub threshold: f64,
    /// Fraction of `samples_per_pixel` taken between convergence checks
    pub batch_fraction: f64,
    /// Samples always taken before the first check
    pub min_samples: u32,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            threshold: 0.05,
            batch_fraction: 1.0 / 20.0,
            min_samples: 16,
        }
    }
}

impl AdaptiveConfig {
    /// Samples between two convergence checks, at least one.
    pub fn batch_size(&self, samples_per_pixel: u32) -> u32 {
        ((samples_per_pixel as f64 * self.batch_fraction) as u32).max(1)
    }
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per pixel (upper bound when adaptive sampling is on)
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    pub background: Background,
    /// Minimum ray parameter accepted as a hit, avoids self-intersection
    pub t_min: f64,
    /// Tile edge length in pixels
    pub tile_size: u32,
    pub tile_order: TileOrder,
    /// Worker threads; `None` uses the available parallelism
    pub threads: Option<usize>,
    /// Base seed for the per-tile random streams
    pub seed: u64,
    pub sampler: Sampler,
    pub adaptive: Option<AdaptiveConfig>,
    /// Trace each sample at a random visible wavelength so dispersive
    /// materials separate colors
    pub spectral: bool,
    /// Factor applied to the previous frame when a new render starts
    pub fade: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 100,
            max_depth: 50,
            background: Background::Sky,
            t_min: 1e-4,
            tile_size: 32,
            tile_order: TileOrder::Scanline,
            threads: None,
            seed: 0,
            sampler: Sampler::default(),
            adaptive: None,
            spectral: false,
            fade: 0.5,
        }
    }
}

impl RenderConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> RenderResult<Self> {
        let config: RenderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> RenderResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> RenderResult<()> {
        let invalid = |msg: &str| Err(RenderError::InvalidConfig(msg.to_string()));

        if self.samples_per_pixel == 0 {
            return invalid("samples_per_pixel must be at least 1");
        }
        if self.tile_size == 0 {
            return invalid("tile_size must be at least 1");
        }
        if !(self.t_min > 0.0) {
            return invalid("t_min must be positive");
        }
        if !(0.0..=1.0).contains(&self.fade) {
            return invalid("fade must be within [0, 1]");
        }
        if self.threads == Some(0) {
            return invalid("threads must be at least 1");
        }
        if let Some(adaptive) = &self.adaptive {
            if !(adaptive.threshold > 0.0) {
                return invalid("adaptive threshold must be positive");
            }
            if !(adaptive.batch_fraction > 0.0 && adaptive.batch_fraction <= 1.0) {
                return invalid("adaptive batch_fraction must be within (0, 1]");
            }
        }
        Ok(())
    }

    /// Number of worker threads to use.
    pub fn thread_count(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::{PixelFilter, SampleStrategy};

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.samples_per_pixel, 100);
        assert_eq!(config.max_depth, 50);
        assert_eq!(config.tile_size, 32);
        assert_eq!(config.background, Background::Sky);
        assert_eq!(config.sampler.strategy, SampleStrategy::Uniform);
        assert_eq!(config.sampler.filter, PixelFilter::Mitchell);
        assert!(!config.spectral);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = RenderConfig::from_json(
            r#"{
                "samples_per_pixel": 16,
                "background": { "solid": [0.1, 0.2, 0.3] },
                "tile_order": "spiral",
                "sampler": { "filter": "gaussian" },
                "adaptive": { "threshold": 0.02 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.samples_per_pixel, 16);
        assert_eq!(config.max_depth, 50);
        assert_eq!(config.background, Background::Solid(Color::new(0.1, 0.2, 0.3)));
        assert_eq!(config.tile_order, TileOrder::Spiral);
        assert_eq!(config.sampler.strategy, SampleStrategy::Uniform);
        assert_eq!(config.sampler.filter, PixelFilter::Gaussian);

        let adaptive = config.adaptive.unwrap();
        assert_eq!(adaptive.threshold, 0.02);
        assert_eq!(adaptive.min_samples, 16);
    }

    #[test]
    fn test_json_round_trip() {
        let config = RenderConfig {
            seed: 1234,
            threads: Some(3),
            spectral: true,
            ..RenderConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(RenderConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_validate_rejects_degenerate_values() {
        let zero_samples = RenderConfig {
            samples_per_pixel: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(zero_samples.validate(), Err(RenderError::InvalidConfig(_))));

        let zero_tiles = RenderConfig {
            tile_size: 0,
            ..RenderConfig::default()
        };
        assert!(zero_tiles.validate().is_err());

        let bad_fade = RenderConfig {
            fade: 1.5,
            ..RenderConfig::default()
        };
        assert!(bad_fade.validate().is_err());

        for t_min in [0.0, -1e-3, f64::NAN] {
            let config = RenderConfig {
                t_min,
                ..RenderConfig::default()
            };
            assert!(matches!(config.validate(), Err(RenderError::InvalidConfig(_))));
        }

        assert!(matches!(
            RenderConfig::from_json(r#"{ "tile_size": 0 }"#),
            Err(RenderError::InvalidConfig(_))
        ));
        assert!(matches!(
            RenderConfig::from_json("not json"),
            Err(RenderError::Config(_))
        ));
    }

    #[test]
    fn test_adaptive_batch_size() {
        let adaptive = AdaptiveConfig::default();
        assert_eq!(adaptive.batch_size(100), 5);
        assert_eq!(adaptive.batch_size(10), 1);
    }
}
