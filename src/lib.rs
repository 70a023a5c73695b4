//! netra-scan - Sweep-ranging head control for a mobile robot
//!
//! Sweeps a rotating sensor head across a 180-degree arc, fuses an
//! acoustic time-of-flight sensor with an infrared proximity sensor, and
//! segments the per-degree sample stream into a bounded list of discrete
//! objects, each with an angular position, range and width estimate.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  sweep/                     │  <- Orchestration
//! │   (SweepController, cancellation)           │
//! └─────────────────────────────────────────────┘
//!                       │
//! ┌──────────────────────────┬──────────────────┐
//! │      segmentation/       │    selection/    │  <- Core algorithms
//! │   (ObjectSegmenter)      │ (ObjectSelector) │
//! └──────────────────────────┴──────────────────┘
//!                       │
//! ┌─────────────────────────────────────────────┐
//! │                 ranging/                    │  <- Sensor processing
//! │    (PulseTimer, ProximityFilter)            │
//! └─────────────────────────────────────────────┘
//!                       │
//! ┌─────────────────────────────────────────────┐
//! │            drivers/ + devices/              │  <- Hardware abstraction
//! │   (capability traits, mock bench)           │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The sweep runs on a single logical thread; the only concurrent producer
//! is the edge-capture side of the pulse driver, which delivers completed
//! capture events to the polling loop over a bounded channel.
//!
//! # Example
//!
//! ```no_run
//! use netra_scan::config::ScanConfig;
//! use netra_scan::devices::mock::{MockBench, Scene, SceneObject};
//! use netra_scan::drivers::NoopDelay;
//! use netra_scan::{CancelToken, SweepController};
//!
//! let config = ScanConfig::default();
//! let scene = Scene {
//!     objects: vec![SceneObject { start_deg: 40, end_deg: 60, distance_cm: 50 }],
//!     wall_distance_cm: Some(300),
//! };
//! let bench = MockBench::new(scene, config.ranging, config.infrared);
//!
//! let mut controller = SweepController::new(
//!     Box::new(bench.servo()),
//!     Box::new(bench.pulse()),
//!     Box::new(bench.analog()),
//!     Box::new(NoopDelay),
//!     config,
//! );
//! let outcome = controller.sweep(&CancelToken::new())?;
//! println!("{} objects", outcome.objects.len());
//! # Ok::<(), netra_scan::Error>(())
//! ```

pub mod config;
pub mod devices;
pub mod drivers;
pub mod error;
pub mod ranging;
pub mod segmentation;
pub mod selection;
pub mod sweep;

// Re-export commonly used types
pub use config::ScanConfig;
pub use error::{Error, Result};
pub use ranging::{ProximityFilter, PulseTimer};
pub use segmentation::{Object, ObjectSegmenter, RawSample, SegmenterConfig, Segmentation};
pub use selection::ObjectSelector;
pub use sweep::{CancelToken, SweepController, SweepOutcome, SWEEP_STEPS};
