//! Acoustic time-of-flight pulse timing
//!
//! One `measure()` call emits a single ranging pulse and waits (bounded)
//! for the capture handler to deliver the echo's rising and falling edges.
//! The handler runs preemptively relative to this polling side; the bounded
//! channel in [`PulseDriver::edges`] is the atomic hand-off between the two.

use crate::config::RangingConfig;
use crate::drivers::{EdgeEvent, EdgeKind, PulseDriver};
use crate::error::{Error, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::time::Instant;

/// Times one acoustic pulse and converts its round trip to a distance.
pub struct PulseTimer {
    driver: Box<dyn PulseDriver>,
    edges: Receiver<EdgeEvent>,
    config: RangingConfig,
}

impl PulseTimer {
    /// Create a pulse timer over the given transducer driver
    pub fn new(driver: Box<dyn PulseDriver>, config: RangingConfig) -> Self {
        let edges = driver.edges();
        Self {
            driver,
            edges,
            config,
        }
    }

    /// Emit one pulse and return the measured distance in centimeters.
    ///
    /// Blocks until the echo completes or `echo_timeout_ms` elapses, in
    /// which case [`Error::EchoTimeout`] is returned. Captures left over
    /// from an earlier pulse are drained first, so a timeout can never
    /// surface stale data as a fresh reading.
    pub fn measure(&mut self) -> Result<u32> {
        while self.edges.try_recv().is_ok() {}

        self.driver.emit_pulse()?;

        let deadline = Instant::now() + std::time::Duration::from_millis(self.config.echo_timeout_ms);
        let rising = self.await_edge(EdgeKind::Rising, deadline)?;
        let falling = self.await_edge(EdgeKind::Falling, deadline)?;

        let delta = self.fold_delta(&rising, &falling)?;
        Ok(self.delta_to_distance(delta))
    }

    /// Wait for the next capture of the given polarity, up to the deadline.
    fn await_edge(&self, kind: EdgeKind, deadline: Instant) -> Result<EdgeEvent> {
        loop {
            let remaining = deadline
                .checked_duration_since(Instant::now())
                .ok_or(Error::EchoTimeout)?;
            match self.edges.recv_timeout(remaining) {
                Ok(event) if event.kind == kind => return Ok(event),
                // Out-of-order capture (e.g. a falling edge before our
                // rising edge was seen): keep waiting for the right one
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout) => return Err(Error::EchoTimeout),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(Error::SensorFault("edge capture channel closed".to_string()))
                }
            }
        }
    }

    /// Fold timer overflows into the captured tick span.
    ///
    /// An echo may straddle one or more free-running timer periods, so the
    /// elapsed ticks are
    /// `(falling.overflows - rising.overflows) * period + falling.ticks - rising.ticks`.
    fn fold_delta(&self, rising: &EdgeEvent, falling: &EdgeEvent) -> Result<u64> {
        let wraps = falling.overflows.wrapping_sub(rising.overflows);
        if wraps > self.config.max_overflows {
            return Err(Error::CaptureOverflow { overflows: wraps });
        }

        let delta = i64::from(wraps) * i64::from(self.config.timer_period_ticks)
            + i64::from(falling.ticks)
            - i64::from(rising.ticks);
        if delta < 0 {
            return Err(Error::SensorFault(format!(
                "capture ran backwards: rising {} falling {} wraps {}",
                rising.ticks, falling.ticks, wraps
            )));
        }
        Ok(delta as u64)
    }

    /// Linear calibration from capture ticks to centimeters.
    ///
    /// `cm = delta * k1 + k2`, rounded half-up to the nearest integer.
    pub fn delta_to_distance(&self, delta: u64) -> u32 {
        let cm = delta as f64 * self.config.k1 + self.config.k2;
        (cm + 0.5).floor().max(0.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{bounded, Sender};

    /// Pulse driver that replays a scripted batch of edge events per pulse
    struct ScriptedPulse {
        tx: Sender<EdgeEvent>,
        rx: Receiver<EdgeEvent>,
        script: Vec<Vec<EdgeEvent>>,
        pulses: usize,
    }

    impl ScriptedPulse {
        fn new(script: Vec<Vec<EdgeEvent>>) -> Self {
            let (tx, rx) = bounded(16);
            Self {
                tx,
                rx,
                script,
                pulses: 0,
            }
        }
    }

    impl PulseDriver for ScriptedPulse {
        fn emit_pulse(&mut self) -> Result<()> {
            if let Some(events) = self.script.get(self.pulses) {
                for event in events {
                    self.tx.send(*event).unwrap();
                }
            }
            self.pulses += 1;
            Ok(())
        }

        fn edges(&self) -> Receiver<EdgeEvent> {
            self.rx.clone()
        }
    }

    fn rising(ticks: u32, overflows: u32) -> EdgeEvent {
        EdgeEvent {
            kind: EdgeKind::Rising,
            ticks,
            overflows,
        }
    }

    fn falling(ticks: u32, overflows: u32) -> EdgeEvent {
        EdgeEvent {
            kind: EdgeKind::Falling,
            ticks,
            overflows,
        }
    }

    fn short_timeout_config() -> RangingConfig {
        RangingConfig {
            echo_timeout_ms: 20,
            ..RangingConfig::default()
        }
    }

    #[test]
    fn test_measure_simple_echo() {
        // delta = 521 ticks -> 521 * 0.06972973 + 3.6481622 = 39.98cm -> 40
        let driver = ScriptedPulse::new(vec![vec![rising(1000, 0), falling(1521, 0)]]);
        let mut timer = PulseTimer::new(Box::new(driver), short_timeout_config());

        assert_eq!(timer.measure().unwrap(), 40);
    }

    #[test]
    fn test_measure_folds_timer_overflow() {
        // Echo straddles one timer wrap: rising near the top of the period,
        // falling shortly after the wrap. Effective delta must still be 521.
        let period = RangingConfig::default().timer_period_ticks;
        let driver = ScriptedPulse::new(vec![vec![
            rising(period - 100, 3),
            falling(421, 4),
        ]]);
        let mut timer = PulseTimer::new(Box::new(driver), short_timeout_config());

        assert_eq!(timer.measure().unwrap(), 40);
    }

    #[test]
    fn test_measure_timeout_when_no_echo() {
        let driver = ScriptedPulse::new(vec![vec![]]);
        let mut timer = PulseTimer::new(Box::new(driver), short_timeout_config());

        assert!(matches!(timer.measure(), Err(Error::EchoTimeout)));
    }

    #[test]
    fn test_measure_timeout_on_missing_falling_edge() {
        let driver = ScriptedPulse::new(vec![vec![rising(100, 0)]]);
        let mut timer = PulseTimer::new(Box::new(driver), short_timeout_config());

        assert!(matches!(timer.measure(), Err(Error::EchoTimeout)));
    }

    #[test]
    fn test_stale_captures_are_drained() {
        // The first pulse delivers two complete echoes; only one is read.
        // The second pulse produces nothing, so the second measure must
        // drain the stale leftover pair and time out rather than report it.
        let driver = ScriptedPulse::new(vec![
            vec![rising(0, 0), falling(500, 0), rising(0, 1), falling(500, 1)],
            vec![],
        ]);
        let mut timer = PulseTimer::new(Box::new(driver), short_timeout_config());

        assert!(timer.measure().is_ok());
        assert!(matches!(timer.measure(), Err(Error::EchoTimeout)));
    }

    #[test]
    fn test_implausible_overflow_span_rejected() {
        let config = short_timeout_config();
        let driver = ScriptedPulse::new(vec![vec![
            rising(0, 0),
            falling(0, config.max_overflows + 1),
        ]]);
        let mut timer = PulseTimer::new(Box::new(driver), config);

        assert!(matches!(
            timer.measure(),
            Err(Error::CaptureOverflow { .. })
        ));
    }

    #[test]
    fn test_out_of_order_falling_edge_is_skipped() {
        // A spurious falling edge before the rising edge must not pair up
        // with the later falling edge.
        let driver = ScriptedPulse::new(vec![vec![
            falling(50, 0),
            rising(1000, 0),
            falling(1521, 0),
        ]]);
        let mut timer = PulseTimer::new(Box::new(driver), short_timeout_config());

        assert_eq!(timer.measure().unwrap(), 40);
    }

    #[test]
    fn test_delta_to_distance_rounds_half_up() {
        let timer = PulseTimer::new(
            Box::new(ScriptedPulse::new(vec![])),
            RangingConfig {
                k1: 1.0,
                k2: 0.5,
                ..RangingConfig::default()
            },
        );
        // 10 * 1.0 + 0.5 = 10.5 -> rounds up
        assert_eq!(timer.delta_to_distance(10), 11);
        // 10 * 1.0 + 0.49 rounds down
        let timer = PulseTimer::new(
            Box::new(ScriptedPulse::new(vec![])),
            RangingConfig {
                k1: 1.0,
                k2: 0.49,
                ..RangingConfig::default()
            },
        );
        assert_eq!(timer.delta_to_distance(10), 10);
    }
}
