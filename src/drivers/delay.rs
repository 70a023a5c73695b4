//! Injected wait capability

use std::time::Duration;

/// Bounded cooperative wait.
///
/// The sweep's mechanical-settling and echo-window waits all go through
/// this trait so the pipeline's timing assumptions stay testable with a
/// simulated clock instead of a real hardware delay.
pub trait Delay: Send {
    /// Wait for the given duration
    fn delay(&mut self, duration: Duration);
}

/// Delay backed by the OS scheduler
pub struct SystemDelay;

impl Delay for SystemDelay {
    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Zero-cost delay for simulated benches
pub struct NoopDelay;

impl Delay for NoopDelay {
    fn delay(&mut self, _duration: Duration) {}
}
