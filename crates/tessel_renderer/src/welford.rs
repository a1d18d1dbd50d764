//! Weighted running mean and variance of pixel samples.

use tessel_math::{luminance, Color, Vec3};

/// z-score of the two-sided 95% confidence interval.
const CONFIDENCE_Z: f64 = 1.96;

/// Luminance floor for the relative convergence test, so that near-black
/// pixels do not demand unbounded precision.
const MIN_LUMINANCE: f64 = 1e-3;

/// West's weighted variant of Welford's online algorithm over colors.
///
/// Every channel is tracked independently. One estimator belongs to one
/// pixel and is only touched by the worker rendering it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedWelford {
    mean: Color,
    sum2: Color,
    weight_sum: f64,
    sample_count: u32,
}

impl WeightedWelford {
    pub fn new() -> Self {
        Self {
            mean: Color::ZERO,
            sum2: Color::ZERO,
            weight_sum: 0.0,
            sample_count: 0,
        }
    }

    /// Add a sample with the given weight.
    ///
    /// Non-positive weights and non-finite samples are ignored.
    pub fn add_sample(&mut self, x: Color, weight: f64) {
        if !(weight > 0.0) || !x.is_finite() {
            return;
        }

        self.weight_sum += weight;
        self.sample_count += 1;

        let delta = x - self.mean;
        self.mean += (weight / self.weight_sum) * delta;
        let new_delta = x - self.mean;
        self.sum2 += weight * delta * new_delta;
    }

    pub fn mean(&self) -> Color {
        self.mean
    }

    /// Weighted sample variance; zero until the weights sum past one.
    pub fn variance(&self) -> Color {
        if self.weight_sum <= 1.0 {
            return Color::ZERO;
        }
        self.sum2 / (self.weight_sum - 1.0)
    }

    pub fn standard_deviation(&self) -> Color {
        sqrt(self.variance())
    }

    /// Half-width of the 95% confidence interval of the mean.
    pub fn convergence(&self) -> Color {
        if self.weight_sum <= 0.0 {
            return Color::ZERO;
        }
        CONFIDENCE_Z * sqrt(self.variance() / self.weight_sum)
    }

    pub fn weight_sum(&self) -> f64 {
        self.weight_sum
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Whether the confidence interval is within `threshold` of the mean,
    /// measured in luminance.
    pub fn has_converged(&self, threshold: f64) -> bool {
        if self.weight_sum <= 1.0 {
            return false;
        }
        luminance(self.convergence()) <= threshold * luminance(self.mean).max(MIN_LUMINANCE)
    }
}

impl Default for WeightedWelford {
    fn default() -> Self {
        Self::new()
    }
}

/// Componentwise square root, clamping tiny negative rounding residue.
fn sqrt(v: Vec3) -> Vec3 {
    v.max(Vec3::ZERO).to_array().map(f64::sqrt).into()
}
