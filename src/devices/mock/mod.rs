//! Mock bench: hardware-free simulation of the ranging head
//!
//! Simulates everything the sweep pipeline touches so segmentation and
//! selection can be developed and tested without a robot:
//!
//! | Capability | Simulation method |
//! |------------|-------------------|
//! | Servo head | Shared angle register |
//! | IR channel | Power-law inversion of the scene distance + seeded jitter |
//! | Ping pulse | Per-pulse capture thread emitting rising/falling edges |
//!
//! The pulse simulation advances a free-running tick counter between
//! pulses, so captures land at arbitrary timer phases and the consumer's
//! overflow folding is genuinely exercised. The capture thread plays the
//! role of the hardware interrupt: it runs preemptively relative to the
//! polling loop and hands over each edge as a complete event through the
//! bounded channel.

mod noise;
mod scene;

pub use noise::NoiseConfig;
pub use scene::{Scene, SceneObject};

use crate::config::{InfraredConfig, RangingConfig};
use crate::drivers::{AnalogDriver, EdgeEvent, EdgeKind, PulseDriver, ServoDriver};
use crate::error::{Error, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use noise::NoiseGenerator;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;

/// Dead ticks between arming capture and the echo leading edge
const PULSE_LEAD_TICKS: u64 = 1_000;
/// Free-running ticks elapsing between consecutive pulses
const INTER_PULSE_TICKS: u64 = 40_000;

/// Shared simulated hardware state
struct BenchState {
    /// Current head angle in degrees
    angle: u16,
    /// Free-running capture timer
    ticks: u64,
    scene: Scene,
    noise: NoiseGenerator,
}

/// Simulated ranging head handing out driver implementations.
pub struct MockBench {
    state: Arc<Mutex<BenchState>>,
    ranging: RangingConfig,
    infrared: InfraredConfig,
}

impl MockBench {
    /// Create a noiseless bench over the given scene
    pub fn new(scene: Scene, ranging: RangingConfig, infrared: InfraredConfig) -> Self {
        Self::with_noise(scene, ranging, infrared, NoiseConfig::default())
    }

    /// Create a bench with seeded sensor jitter
    pub fn with_noise(
        scene: Scene,
        ranging: RangingConfig,
        infrared: InfraredConfig,
        noise: NoiseConfig,
    ) -> Self {
        let state = BenchState {
            angle: 0,
            ticks: 0,
            scene,
            noise: NoiseGenerator::new(noise),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            ranging,
            infrared,
        }
    }

    /// Servo driver backed by the shared angle register
    pub fn servo(&self) -> MockServo {
        MockServo {
            state: Arc::clone(&self.state),
        }
    }

    /// Analog driver producing IR quantization values for the scene
    pub fn analog(&self) -> MockAnalog {
        MockAnalog {
            state: Arc::clone(&self.state),
            infrared: self.infrared,
        }
    }

    /// Pulse driver with a simulated capture interrupt
    pub fn pulse(&self) -> MockPulse {
        let (tx, rx) = bounded(8);
        MockPulse {
            state: Arc::clone(&self.state),
            ranging: self.ranging,
            tx,
            rx,
        }
    }

    /// Current head angle, for assertions on re-aiming
    pub fn head_angle(&self) -> u16 {
        self.state.lock().angle
    }
}

/// Servo driver writing to the bench's angle register
pub struct MockServo {
    state: Arc<Mutex<BenchState>>,
}

impl ServoDriver for MockServo {
    fn set_angle(&mut self, degrees: u16) -> Result<()> {
        if degrees > 180 {
            return Err(Error::InvalidParameter(format!(
                "head angle {} out of range (0..=180)",
                degrees
            )));
        }
        self.state.lock().angle = degrees;
        Ok(())
    }
}

/// Analog driver inverting the IR power law against the scene
pub struct MockAnalog {
    state: Arc<Mutex<BenchState>>,
    infrared: InfraredConfig,
}

impl AnalogDriver for MockAnalog {
    fn read(&mut self) -> Result<u16> {
        let mut state = self.state.lock();
        let distance = state.scene.distance_at(state.angle);

        // Invert distance = a * q^b to get the quantization the filter
        // will convert back; an empty sky quantizes to zero
        let quantization = match distance {
            Some(cm) => {
                let ratio = cm as f32 / self.infrared.power_a;
                ratio.powf(1.0 / self.infrared.power_b)
            }
            None => 0.0,
        };

        let jittered = quantization + state.noise.quantization_jitter();
        Ok(jittered.round().clamp(0.0, 1023.0) as u16)
    }
}

/// Pulse driver emitting simulated edge captures
pub struct MockPulse {
    state: Arc<Mutex<BenchState>>,
    ranging: RangingConfig,
    tx: Sender<EdgeEvent>,
    rx: Receiver<EdgeEvent>,
}

impl PulseDriver for MockPulse {
    fn emit_pulse(&mut self) -> Result<()> {
        let (rising_at, falling_at) = {
            let mut state = self.state.lock();
            state.ticks = state.ticks.wrapping_add(INTER_PULSE_TICKS);

            let Some(distance_cm) = state.scene.distance_at(state.angle) else {
                // Nothing reflects: capture never fires, the consumer
                // times out
                return Ok(());
            };

            // Invert the linear calibration to get the round-trip ticks
            let delta =
                ((f64::from(distance_cm) - self.ranging.k2) / self.ranging.k1).max(0.0).round()
                    as u64;

            let rising_at = state.ticks.wrapping_add(PULSE_LEAD_TICKS);
            let falling_at = rising_at.wrapping_add(delta);
            state.ticks = falling_at;
            (rising_at, falling_at)
        };

        let period = u64::from(self.ranging.timer_period_ticks);
        let rising = EdgeEvent {
            kind: EdgeKind::Rising,
            ticks: (rising_at % period) as u32,
            overflows: (rising_at / period) as u32,
        };
        let falling = EdgeEvent {
            kind: EdgeKind::Falling,
            ticks: (falling_at % period) as u32,
            overflows: (falling_at / period) as u32,
        };

        let tx = self.tx.clone();
        thread::Builder::new()
            .name("echo-capture".to_string())
            .spawn(move || {
                // Stands in for the capture ISR: delivers each edge as a
                // complete snapshot, never a partial write
                let _ = tx.send(rising);
                let _ = tx.send(falling);
            })
            .map_err(|e| Error::Other(format!("failed to spawn capture thread: {}", e)))?;

        Ok(())
    }

    fn edges(&self) -> Receiver<EdgeEvent> {
        self.rx.clone()
    }
}
