//! Configuration for the sweep-ranging pipeline
//!
//! Loads configuration from a TOML file. Every section carries the
//! empirically calibrated defaults for the reference head, so a missing
//! config file is not fatal for development use.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    pub ranging: RangingConfig,
    pub infrared: InfraredConfig,
    pub segmentation: SegmentationConfig,
    pub selection: SelectionConfig,
    pub sweep: SweepConfig,
    pub logging: LoggingConfig,
    /// Simulated scene for the mock bench (demo binary only)
    #[serde(default)]
    pub simulation: Option<SimulationConfig>,
}

/// Acoustic pulse timing configuration
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RangingConfig {
    /// Linear calibration slope, centimeters per capture tick
    pub k1: f64,
    /// Linear calibration offset in centimeters
    pub k2: f64,
    /// Ticks in one free-running capture timer period
    pub timer_period_ticks: u32,
    /// Bounded wait for the complete echo, in milliseconds
    pub echo_timeout_ms: u64,
    /// Largest plausible number of timer overflows within one echo
    pub max_overflows: u32,
}

impl Default for RangingConfig {
    fn default() -> Self {
        Self {
            // Calibrated against the reference head (robot 4)
            k1: 0.069_729_73,
            k2: 3.648_162_2,
            timer_period_ticks: 65_536,
            echo_timeout_ms: 100,
            max_overflows: 4,
        }
    }
}

/// Infrared proximity filter configuration
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct InfraredConfig {
    /// Raw analog samples taken per reading
    pub sample_count: u32,
    /// Samples farther than this from the mean are clamped to it
    pub outlier_tolerance: f32,
    /// Power-law coefficient for quantization-to-centimeters conversion
    pub power_a: f32,
    /// Power-law exponent, negative (closer targets quantize higher)
    pub power_b: f32,
}

impl Default for InfraredConfig {
    fn default() -> Self {
        Self {
            sample_count: 30,
            outlier_tolerance: 10.0,
            power_a: 2364.5,
            power_b: -0.888,
        }
    }
}

/// Object segmentation thresholds and capacities
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct SegmentationConfig {
    /// IR distance below which a new detection opens, in centimeters
    pub near_threshold_cm: f32,
    /// IR distance at or above which an open detection is out of range
    pub far_threshold_cm: f32,
    /// Object list capacity for a report-everything sweep
    pub sweep_capacity: usize,
    /// Object list capacity for a find-nearest sweep
    pub nearest_capacity: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            near_threshold_cm: 85.0,
            far_threshold_cm: 150.0,
            sweep_capacity: 20,
            nearest_capacity: 10,
        }
    }
}

/// Post-sweep object selection filters
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct SelectionConfig {
    /// Objects no wider than this are discarded as unreliable targets
    pub min_width_cm: u32,
    /// Objects farther than this are discarded, the estimate degrades with range
    pub max_distance_cm: u32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            min_width_cm: 3,
            max_distance_cm: 100,
        }
    }
}

/// Sweep timing configuration
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct SweepConfig {
    /// Settling wait after homing the head to 0 degrees, in milliseconds
    pub start_settle_ms: u64,
    /// Mechanical settling wait after each one-degree step, in milliseconds
    pub step_settle_ms: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            start_settle_ms: 1000,
            step_settle_ms: 10,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Simulated scene description for the mock bench
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// Background return when no object covers the head angle; absent means
    /// no reflector at all (echo timeouts)
    pub wall_distance_cm: Option<u32>,
    /// Standard deviation of simulated ADC jitter, in quantization counts
    #[serde(default)]
    pub quantization_stddev: f32,
    /// Seed for deterministic noise
    #[serde(default = "default_seed")]
    pub random_seed: u64,
    /// Simulated physical objects
    #[serde(default)]
    pub objects: Vec<SimObject>,
}

/// One simulated object in the scene
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct SimObject {
    /// First degree covered by the object
    pub start_deg: u16,
    /// Last degree covered by the object (inclusive)
    pub end_deg: u16,
    /// Distance from the head, in centimeters
    pub distance_cm: u32,
}

fn default_seed() -> u64 {
    42
}

impl ScanConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: ScanConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ranging: RangingConfig::default(),
            infrared: InfraredConfig::default(),
            segmentation: SegmentationConfig::default(),
            selection: SelectionConfig::default(),
            sweep: SweepConfig::default(),
            logging: LoggingConfig::default(),
            simulation: None,
        }
    }
}
