//! Object segmentation over a per-degree sample stream
//!
//! Consumes one `(ping distance, IR distance)` pair per degree step and
//! folds the stream into discrete object records. Detection state is driven
//! by the IR distance against two thresholds: a detection opens when the
//! reading drops below the near threshold and stays open while it remains
//! below the far threshold. A single out-of-range sample is tolerated as
//! sensor noise; two consecutive out-of-range samples close the detection.
//!
//! A segmenter is built fresh for each sweep, so an object from an earlier
//! sweep can never leak into a later result set.

use std::f64::consts::PI;

/// Thresholds and capacity for one sweep's segmentation.
#[derive(Debug, Clone, Copy)]
pub struct SegmenterConfig {
    /// IR distance below which a new detection opens, in centimeters
    pub near_threshold_cm: f32,
    /// IR distance at or above which an open detection is out of range
    pub far_threshold_cm: f32,
    /// Maximum number of objects accepted in one sweep
    pub capacity: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            near_threshold_cm: 85.0,
            far_threshold_cm: 150.0,
            capacity: 20,
        }
    }
}

/// One physical detection from a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Object {
    /// Degree at which the detection opened (0..=179)
    pub degree_position: u16,
    /// Mean acoustic range over the detection, in centimeters.
    /// Zero until the detection closes.
    pub cm_distance: u32,
    /// Angular-diameter width estimate, in centimeters
    pub cm_width: u32,
    /// Consecutive degree steps the detection spanned (>= 1)
    pub scanned_degrees: u16,
}

/// One per-degree input sample. Not retained once folded in.
#[derive(Debug, Clone, Copy)]
pub struct RawSample {
    /// Head angle the sample was taken at
    pub degree: u16,
    /// Acoustic range, in centimeters
    pub ping_distance_cm: u32,
    /// Filtered IR range, in centimeters; infinite means "nothing seen"
    pub ir_distance_cm: f32,
}

/// Finalized output of one sweep's segmentation.
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    /// Detected objects, in degree order
    pub objects: Vec<Object>,
    /// True when a detection was refused because the list was at capacity
    pub truncated: bool,
}

#[derive(Debug, Clone, Copy)]
enum DetectState {
    Idle,
    Detecting {
        /// Index of the open object in the list
        index: usize,
        /// Running sum of ping distances folded into the detection
        sum_cm: u64,
        /// Ping distance of a first out-of-range sample, held back until
        /// the next sample decides whether it was noise inside the object
        /// or the start of the gap that closes it
        pending: Option<u32>,
    },
}

/// Stateful per-sweep segmentation of the sample stream.
pub struct ObjectSegmenter {
    config: SegmenterConfig,
    objects: Vec<Object>,
    state: DetectState,
    truncated: bool,
}

impl ObjectSegmenter {
    /// Create a segmenter with an empty object list
    pub fn new(config: SegmenterConfig) -> Self {
        Self {
            config,
            objects: Vec::new(),
            state: DetectState::Idle,
            truncated: false,
        }
    }

    /// Whether a detection is currently open
    pub fn is_detecting(&self) -> bool {
        matches!(self.state, DetectState::Detecting { .. })
    }

    /// Fold one per-degree sample into the detection state.
    pub fn push(&mut self, sample: RawSample) {
        let near = self.config.near_threshold_cm;
        let far = self.config.far_threshold_cm;

        match &mut self.state {
            DetectState::Idle => {
                if sample.ir_distance_cm >= near {
                    return;
                }
                if self.objects.len() >= self.config.capacity {
                    if !self.truncated {
                        log::warn!(
                            "object list full ({} entries), refusing further detections this sweep",
                            self.config.capacity
                        );
                        self.truncated = true;
                    }
                    return;
                }
                self.objects.push(Object {
                    degree_position: sample.degree,
                    cm_distance: 0,
                    cm_width: 0,
                    scanned_degrees: 1,
                });
                self.state = DetectState::Detecting {
                    index: self.objects.len() - 1,
                    sum_cm: u64::from(sample.ping_distance_cm),
                    pending: None,
                };
            }
            DetectState::Detecting {
                index,
                sum_cm,
                pending,
            } => {
                if sample.ir_distance_cm < far {
                    let object = &mut self.objects[*index];
                    // A held-back noise sample turned out to be interior
                    if let Some(held) = pending.take() {
                        object.scanned_degrees += 1;
                        *sum_cm += u64::from(held);
                    }
                    object.scanned_degrees += 1;
                    *sum_cm += u64::from(sample.ping_distance_cm);
                } else if pending.is_none() {
                    // First out-of-range sample: tolerate as noise, decide
                    // on the next sample
                    *pending = Some(sample.ping_distance_cm);
                } else {
                    // Second consecutive out-of-range sample closes the
                    // detection; the held sample was the start of the gap
                    let (closed_index, closed_sum) = (*index, *sum_cm);
                    self.state = DetectState::Idle;
                    self.finalize(closed_index, closed_sum);
                }
            }
        }
    }

    /// Close any open detection and return the finalized object list.
    pub fn finish(mut self) -> Segmentation {
        if let DetectState::Detecting { index, sum_cm, .. } = self.state {
            // Sweep ended mid-detection: finalize with what accumulated.
            // A held-back out-of-range sample is discarded.
            self.finalize(index, sum_cm);
        }
        Segmentation {
            objects: self.objects,
            truncated: self.truncated,
        }
    }

    /// Compute the mean range and angular-diameter width of a closed object.
    fn finalize(&mut self, index: usize, sum_cm: u64) {
        let object = &mut self.objects[index];
        let scanned = f64::from(object.scanned_degrees);

        let mean = sum_cm as f64 / scanned;
        object.cm_distance = (mean + 0.5).floor() as u32;

        // Angular diameter: the arc the object stayed visible over, viewed
        // from its mean range, taken as its apparent width
        let half_angle_rad = scanned * PI / 360.0;
        let width = 2.0 * f64::from(object.cm_distance) * half_angle_rad.tan();
        object.cm_width = (width + 0.5).floor() as u32;

        log::debug!(
            "closed object: {}deg, {}cm over {} steps, width {}cm",
            object.degree_position,
            object.cm_distance,
            object.scanned_degrees,
            object.cm_width
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(degree: u16, ping: u32, ir: f32) -> RawSample {
        RawSample {
            degree,
            ping_distance_cm: ping,
            ir_distance_cm: ir,
        }
    }

    /// Feed a full 180-step sweep where IR reads `near_ir` inside the given
    /// inclusive degree spans and `far_ir` everywhere else.
    fn run_sweep(
        segmenter: &mut ObjectSegmenter,
        spans: &[(u16, u16)],
        ping: u32,
        near_ir: f32,
        far_ir: f32,
    ) {
        for degree in 0..180u16 {
            let inside = spans.iter().any(|&(d0, d1)| degree >= d0 && degree <= d1);
            let ir = if inside { near_ir } else { far_ir };
            segmenter.push(sample(degree, ping, ir));
        }
    }

    #[test]
    fn test_single_span_yields_single_object() {
        let mut segmenter = ObjectSegmenter::new(SegmenterConfig::default());
        run_sweep(&mut segmenter, &[(10, 20)], 40, 50.0, 200.0);
        let result = segmenter.finish();

        assert_eq!(result.objects.len(), 1);
        let object = &result.objects[0];
        assert_eq!(object.degree_position, 10);
        assert_eq!(object.scanned_degrees, 11);
        assert!(!result.truncated);
    }

    #[test]
    fn test_mean_distance_of_constant_ping() {
        let mut segmenter = ObjectSegmenter::new(SegmenterConfig::default());
        run_sweep(&mut segmenter, &[(1, 30)], 40, 50.0, 200.0);
        let result = segmenter.finish();

        assert_eq!(result.objects.len(), 1);
        let object = &result.objects[0];
        assert_eq!(object.degree_position, 1);
        assert_eq!(object.scanned_degrees, 30);
        assert_eq!(object.cm_distance, 40);
        // 2 * 40 * tan(30 * pi / 360) = 21.4cm
        assert_eq!(object.cm_width, 21);
    }

    #[test]
    fn test_mean_distance_of_varying_ping() {
        let mut segmenter = ObjectSegmenter::new(SegmenterConfig::default());
        // Three in-range samples with pings 30, 40, 53 -> mean 41, rounded
        segmenter.push(sample(5, 30, 50.0));
        segmenter.push(sample(6, 40, 50.0));
        segmenter.push(sample(7, 53, 50.0));
        let result = segmenter.finish();

        assert_eq!(result.objects[0].cm_distance, 41);
    }

    #[test]
    fn test_width_matches_angular_diameter_formula() {
        let mut segmenter = ObjectSegmenter::new(SegmenterConfig::default());
        run_sweep(&mut segmenter, &[(90, 104)], 50, 60.0, 200.0);
        let result = segmenter.finish();

        let object = &result.objects[0];
        assert_eq!(object.scanned_degrees, 15);
        let expected =
            2.0 * f64::from(object.cm_distance) * (15.0 * PI / 360.0).tan();
        assert!((expected - 13.165).abs() < 1e-3);
        assert_eq!(object.cm_width, (expected + 0.5).floor() as u32);
    }

    #[test]
    fn test_single_noise_sample_does_not_close() {
        let mut segmenter = ObjectSegmenter::new(SegmenterConfig::default());
        for degree in 10..=20u16 {
            // One isolated out-of-range blip in the middle of the object
            let ir = if degree == 15 { 200.0 } else { 50.0 };
            segmenter.push(sample(degree, 40, ir));
        }
        // Two consecutive out-of-range samples end it
        segmenter.push(sample(21, 40, 200.0));
        segmenter.push(sample(22, 40, 200.0));
        let result = segmenter.finish();

        assert_eq!(result.objects.len(), 1);
        // The blip degree still counts toward the span
        assert_eq!(result.objects[0].scanned_degrees, 11);
        assert_eq!(result.objects[0].cm_distance, 40);
    }

    #[test]
    fn test_two_consecutive_out_of_range_close() {
        let mut segmenter = ObjectSegmenter::new(SegmenterConfig::default());
        run_sweep(&mut segmenter, &[(10, 20), (40, 50)], 40, 50.0, 200.0);
        let result = segmenter.finish();

        assert_eq!(result.objects.len(), 2);
        assert_eq!(result.objects[0].degree_position, 10);
        assert_eq!(result.objects[0].scanned_degrees, 11);
        assert_eq!(result.objects[1].degree_position, 40);
        assert_eq!(result.objects[1].scanned_degrees, 11);
    }

    #[test]
    fn test_trailing_noise_not_counted_in_span() {
        // IR in range for [10, 20], out of range from 21 on. The sample at
        // 21 arms the noise tolerance but must not inflate the span.
        let mut segmenter = ObjectSegmenter::new(SegmenterConfig::default());
        run_sweep(&mut segmenter, &[(10, 20)], 40, 50.0, 200.0);
        let result = segmenter.finish();

        assert_eq!(result.objects[0].scanned_degrees, 11);
    }

    #[test]
    fn test_open_detection_finalized_at_end_of_sweep() {
        let mut segmenter = ObjectSegmenter::new(SegmenterConfig::default());
        run_sweep(&mut segmenter, &[(170, 179)], 60, 50.0, 200.0);
        let result = segmenter.finish();

        assert_eq!(result.objects.len(), 1);
        let object = &result.objects[0];
        assert_eq!(object.degree_position, 170);
        assert_eq!(object.scanned_degrees, 10);
        assert_eq!(object.cm_distance, 60);
        assert!(object.cm_width > 0);
    }

    #[test]
    fn test_capacity_overflow_truncates_instead_of_overrunning() {
        let config = SegmenterConfig {
            capacity: 2,
            ..SegmenterConfig::default()
        };
        let mut segmenter = ObjectSegmenter::new(config);
        run_sweep(
            &mut segmenter,
            &[(10, 12), (30, 32), (50, 52), (70, 72)],
            40,
            50.0,
            200.0,
        );
        let result = segmenter.finish();

        assert!(result.truncated);
        assert_eq!(result.objects.len(), 2);
        assert_eq!(result.objects[0].degree_position, 10);
        assert_eq!(result.objects[1].degree_position, 30);
    }

    #[test]
    fn test_open_threshold_is_near_not_far() {
        // 100cm is below far (150) but above near (85): it must not open a
        // detection, only sustain one already open.
        let mut segmenter = ObjectSegmenter::new(SegmenterConfig::default());
        segmenter.push(sample(0, 40, 100.0));
        assert!(!segmenter.is_detecting());

        segmenter.push(sample(1, 40, 50.0));
        assert!(segmenter.is_detecting());
        segmenter.push(sample(2, 40, 100.0));
        assert!(segmenter.is_detecting());
        let result = segmenter.finish();

        assert_eq!(result.objects.len(), 1);
        assert_eq!(result.objects[0].scanned_degrees, 2);
    }

    #[test]
    fn test_infinite_ir_never_detects() {
        let mut segmenter = ObjectSegmenter::new(SegmenterConfig::default());
        for degree in 0..180u16 {
            segmenter.push(sample(degree, 0, f32::INFINITY));
        }
        let result = segmenter.finish();
        assert!(result.objects.is_empty());
        assert!(!result.truncated);
    }
}
