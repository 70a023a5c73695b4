//! Deterministic noise generation for the mock bench

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Noise parameters for simulated readings.
#[derive(Debug, Clone, Copy)]
pub struct NoiseConfig {
    /// Standard deviation of ADC jitter, in quantization counts
    pub quantization_stddev: f32,
    /// RNG seed, fixed so runs are reproducible
    pub seed: u64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            quantization_stddev: 0.0,
            seed: 42,
        }
    }
}

/// Seeded Gaussian jitter source.
pub(crate) struct NoiseGenerator {
    rng: StdRng,
    quantization: Option<Normal<f32>>,
}

impl NoiseGenerator {
    pub fn new(config: NoiseConfig) -> Self {
        let quantization = if config.quantization_stddev > 0.0 {
            Normal::new(0.0, config.quantization_stddev).ok()
        } else {
            None
        };
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            quantization,
        }
    }

    /// One sample of ADC jitter, zero when noise is disabled
    pub fn quantization_jitter(&mut self) -> f32 {
        match &self.quantization {
            Some(normal) => normal.sample(&mut self.rng),
            None => 0.0,
        }
    }
}
