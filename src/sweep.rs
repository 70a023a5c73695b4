//! Sweep orchestration
//!
//! Drives the head through a 180-degree arc one degree at a time, taking
//! one acoustic and one infrared reading per step and feeding the pair to
//! the segmenter. The loop is sequential and blocking; the only concurrent
//! producer is the edge-capture side of the pulse driver, which hands the
//! polling loop completed captures through a bounded channel.
//!
//! The scan state and object list are owned exclusively by the sweep in
//! progress; nothing else can observe them until the sweep returns.

use crate::config::ScanConfig;
use crate::drivers::{AnalogDriver, Delay, PulseDriver, ServoDriver};
use crate::error::Result;
use crate::ranging::{ProximityFilter, PulseTimer};
use crate::segmentation::{Object, ObjectSegmenter, RawSample, SegmenterConfig};
use crate::selection::ObjectSelector;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Degree steps in one full sweep
pub const SWEEP_STEPS: u16 = 180;

/// Cooperative cancellation handle for an in-flight sweep.
///
/// Cloning shares the flag, so a signal handler or supervising thread can
/// abort a sweep the polling loop is running. Without a cancellation
/// request a sweep behaves exactly as an uninterrupted 180-step pass.
#[derive(Debug, Clone)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token in the not-cancelled state
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Request cancellation of the sweep observing this token
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one sweep.
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    /// Detected objects, in degree order
    pub objects: Vec<Object>,
    /// True when the object list hit capacity and later detections were refused
    pub truncated: bool,
    /// Degree steps actually executed (180 unless cancelled)
    pub steps_completed: u16,
    /// True when the sweep stopped early on a cancellation request
    pub cancelled: bool,
}

/// Steps the head across the arc and runs the ranging pipeline per degree.
pub struct SweepController {
    servo: Box<dyn ServoDriver>,
    pulse: PulseTimer,
    infrared: ProximityFilter,
    delay: Box<dyn Delay>,
    config: ScanConfig,
}

impl SweepController {
    /// Wire up the controller from its four hardware capabilities
    pub fn new(
        servo: Box<dyn ServoDriver>,
        pulse: Box<dyn PulseDriver>,
        analog: Box<dyn AnalogDriver>,
        delay: Box<dyn Delay>,
        config: ScanConfig,
    ) -> Self {
        let pulse = PulseTimer::new(pulse, config.ranging);
        let infrared = ProximityFilter::new(analog, config.infrared);
        Self {
            servo,
            pulse,
            infrared,
            delay,
            config,
        }
    }

    /// Run one full report-everything sweep.
    ///
    /// Always returns an outcome: momentary sensor glitches degrade single
    /// steps to "nothing seen" rather than aborting the scan. Only a head
    /// positioning failure is fatal, since the sweep geometry is gone.
    pub fn sweep(&mut self, cancel: &CancelToken) -> Result<SweepOutcome> {
        let capacity = self.config.segmentation.sweep_capacity;
        self.run_sweep(capacity, cancel)
    }

    /// Sweep, then reduce the object list to the best approach candidate.
    ///
    /// Re-aims the head at the chosen object before returning it. `None`
    /// is the normal outcome when nothing qualifies; callers must not
    /// substitute a default object.
    pub fn find_nearest_qualifying(&mut self, cancel: &CancelToken) -> Result<Option<Object>> {
        let capacity = self.config.segmentation.nearest_capacity;
        let outcome = self.run_sweep(capacity, cancel)?;
        if outcome.truncated {
            log::warn!("find-nearest sweep truncated at {} objects", capacity);
        }

        let selector = ObjectSelector::new(self.config.selection);
        match selector.select(&outcome.objects) {
            Some(object) => {
                log::info!(
                    "selected object: {}deg, {}cm away, {}cm wide",
                    object.degree_position,
                    object.cm_distance,
                    object.cm_width
                );
                self.servo.set_angle(object.degree_position)?;
                Ok(Some(object))
            }
            None => {
                log::info!(
                    "no qualifying object among {} detections",
                    outcome.objects.len()
                );
                Ok(None)
            }
        }
    }

    fn run_sweep(&mut self, capacity: usize, cancel: &CancelToken) -> Result<SweepOutcome> {
        let segmenter_config = SegmenterConfig {
            near_threshold_cm: self.config.segmentation.near_threshold_cm,
            far_threshold_cm: self.config.segmentation.far_threshold_cm,
            capacity,
        };
        // Fresh segmenter per sweep: no residue from earlier runs
        let mut segmenter = ObjectSegmenter::new(segmenter_config);

        self.servo.set_angle(0)?;
        self.delay
            .delay(Duration::from_millis(self.config.sweep.start_settle_ms));

        let step_settle = Duration::from_millis(self.config.sweep.step_settle_ms);
        let mut steps_completed = 0u16;
        let mut cancelled = false;

        for degree in 0..SWEEP_STEPS {
            if cancel.is_cancelled() {
                log::info!("sweep cancelled at {} degrees", degree);
                cancelled = true;
                break;
            }

            self.servo.set_angle(degree)?;
            self.delay.delay(step_settle);

            let sample = self.take_sample(degree);
            segmenter.push(sample);
            log::debug!(
                "{:>3}deg  ir={:>6.1}cm  ping={:>4}cm  detecting={}",
                degree,
                sample.ir_distance_cm,
                sample.ping_distance_cm,
                segmenter.is_detecting()
            );

            steps_completed += 1;
        }

        let segmentation = segmenter.finish();
        log::info!(
            "sweep complete: {} steps, {} objects{}{}",
            steps_completed,
            segmentation.objects.len(),
            if segmentation.truncated {
                " (truncated)"
            } else {
                ""
            },
            if cancelled { " (cancelled)" } else { "" }
        );

        Ok(SweepOutcome {
            objects: segmentation.objects,
            truncated: segmentation.truncated,
            steps_completed,
            cancelled,
        })
    }

    /// Take one dual-sensor reading at the current head position.
    ///
    /// A fault or echo timeout on either channel degrades the whole step to
    /// a "nothing seen" sample so one glitch cannot corrupt the scan.
    fn take_sample(&mut self, degree: u16) -> RawSample {
        let ping = match self.pulse.measure() {
            Ok(cm) => Some(cm),
            Err(e) => {
                log::warn!("ping measurement failed at {} degrees: {}", degree, e);
                None
            }
        };
        let ir = match self.infrared.measure() {
            Ok(cm) => Some(cm),
            Err(e) => {
                log::warn!("infrared measurement failed at {} degrees: {}", degree, e);
                None
            }
        };

        match (ping, ir) {
            (Some(ping_distance_cm), Some(ir_distance_cm)) => RawSample {
                degree,
                ping_distance_cm,
                ir_distance_cm,
            },
            _ => RawSample {
                degree,
                ping_distance_cm: 0,
                ir_distance_cm: f32::INFINITY,
            },
        }
    }
}
