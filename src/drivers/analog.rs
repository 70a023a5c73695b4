//! Analog input driver trait

use crate::error::Result;

/// One blocking sample from the infrared analog channel.
///
/// Readings are raw quantization counts in 0..=1023. A driver that cannot
/// produce a sample must return a `SensorFault` rather than fabricating a
/// value.
pub trait AnalogDriver: Send {
    /// Take one blocking analog sample
    fn read(&mut self) -> Result<u16>;
}
