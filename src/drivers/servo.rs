//! Sensor head positioning driver trait

use crate::error::Result;

/// Rotates the sensor head.
///
/// Calls are fire-and-forget: the driver commands the position and returns
/// without waiting for the head to arrive. Mechanical settling time is the
/// caller's concern, handled through its injected [`Delay`].
///
/// [`Delay`]: crate::drivers::Delay
pub trait ServoDriver: Send {
    /// Command the head to the given angle (0..=180 degrees)
    fn set_angle(&mut self, degrees: u16) -> Result<()>;
}
