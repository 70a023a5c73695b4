//! Infrared proximity filtering
//!
//! The raw IR channel jitters badly, so one reading is the outlier-tolerant
//! average of a burst of samples: take the burst mean, softly clamp any
//! sample outside the tolerance band back to that mean (the sample count
//! never changes), then average the corrected set. The result is converted
//! to centimeters with an empirically fit power law.

use crate::config::InfraredConfig;
use crate::drivers::AnalogDriver;
use crate::error::{Error, Result};

/// Produces one outlier-tolerant averaged infrared reading per call.
pub struct ProximityFilter {
    driver: Box<dyn AnalogDriver>,
    config: InfraredConfig,
}

impl ProximityFilter {
    /// Create a proximity filter over the given analog driver
    pub fn new(driver: Box<dyn AnalogDriver>, config: InfraredConfig) -> Self {
        Self { driver, config }
    }

    /// Take one burst of samples and return the corrected quantization value.
    ///
    /// Propagates the underlying analog fault instead of fabricating a
    /// reading when the channel is unavailable.
    pub fn read_quantization(&mut self) -> Result<f32> {
        let count = self.config.sample_count as usize;
        if count == 0 {
            return Err(Error::InvalidParameter(
                "infrared sample_count must be at least 1".to_string(),
            ));
        }

        let mut samples = Vec::with_capacity(count);
        for _ in 0..count {
            samples.push(f32::from(self.driver.read()?));
        }

        let mean = samples.iter().sum::<f32>() / count as f32;
        let low = mean - self.config.outlier_tolerance;
        let high = mean + self.config.outlier_tolerance;

        // Soft clamp: outliers are replaced by the mean, not discarded
        let corrected: f32 = samples
            .iter()
            .map(|&s| if s < low || s > high { mean } else { s })
            .sum();
        Ok(corrected / count as f32)
    }

    /// One averaged IR distance in centimeters.
    pub fn measure(&mut self) -> Result<f32> {
        let quantization = self.read_quantization()?;
        Ok(self.quantization_to_distance(quantization))
    }

    /// Empirical power-law conversion from quantization counts to centimeters.
    pub fn quantization_to_distance(&self, quantization: f32) -> f32 {
        self.config.power_a * quantization.powf(self.config.power_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Analog driver that replays queued readings, then faults
    struct ScriptedAnalog {
        readings: VecDeque<u16>,
    }

    impl ScriptedAnalog {
        fn new(readings: &[u16]) -> Self {
            Self {
                readings: readings.iter().copied().collect(),
            }
        }
    }

    impl AnalogDriver for ScriptedAnalog {
        fn read(&mut self) -> Result<u16> {
            self.readings
                .pop_front()
                .ok_or_else(|| Error::SensorFault("analog channel exhausted".to_string()))
        }
    }

    fn filter_with(readings: &[u16]) -> ProximityFilter {
        ProximityFilter::new(
            Box::new(ScriptedAnalog::new(readings)),
            InfraredConfig::default(),
        )
    }

    #[test]
    fn test_steady_signal_passes_through() {
        let filter = &mut filter_with(&[100; 30]);
        let q = filter.read_quantization().unwrap();
        assert!((q - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_outlier_clamped_to_mean() {
        // 29 samples of 100 plus one spike of 400:
        // mean = 110, band [100, 120], spike replaced by 110,
        // corrected mean = (29 * 100 + 110) / 30 = 100.333...
        let mut readings = vec![100u16; 29];
        readings.push(400);
        let filter = &mut filter_with(&readings);

        let q = filter.read_quantization().unwrap();
        assert!((q - 100.333_33).abs() < 1e-3);
    }

    #[test]
    fn test_sample_count_preserved_by_clamping() {
        // Clamping replaces rather than discards, so the corrected average
        // of an all-outlier-free burst equals the plain mean even when the
        // burst straddles the tolerance band edges.
        let mut readings = Vec::new();
        for i in 0..30u16 {
            readings.push(95 + (i % 10));
        }
        let filter = &mut filter_with(&readings);

        let plain_mean = readings.iter().map(|&r| f32::from(r)).sum::<f32>() / 30.0;
        let q = filter.read_quantization().unwrap();
        assert!((q - plain_mean).abs() < 1e-4);
    }

    #[test]
    fn test_analog_fault_propagates() {
        // Burst cut short after 5 samples
        let filter = &mut filter_with(&[100; 5]);
        assert!(matches!(
            filter.read_quantization(),
            Err(Error::SensorFault(_))
        ));
    }

    #[test]
    fn test_power_law_conversion() {
        let filter = filter_with(&[]);
        // 2364.5 * 77^-0.888 = 49.95cm
        let cm = filter.quantization_to_distance(77.0);
        assert!((cm - 49.95).abs() < 0.1, "got {}", cm);
    }

    #[test]
    fn test_zero_quantization_reads_as_infinitely_far() {
        let filter = filter_with(&[]);
        assert!(filter.quantization_to_distance(0.0).is_infinite());
    }

    #[test]
    fn test_measure_composes_filter_and_conversion() {
        let filter = &mut filter_with(&[77; 30]);
        let cm = filter.measure().unwrap();
        assert!((cm - 49.95).abs() < 0.1, "got {}", cm);
    }

    #[test]
    fn test_zero_sample_count_rejected() {
        let mut filter = ProximityFilter::new(
            Box::new(ScriptedAnalog::new(&[])),
            InfraredConfig {
                sample_count: 0,
                ..InfraredConfig::default()
            },
        );
        assert!(matches!(
            filter.read_quantization(),
            Err(Error::InvalidParameter(_))
        ));
    }
}
