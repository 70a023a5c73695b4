//! Dual-sensor ranging: acoustic pulse timing and infrared filtering

pub mod infrared;
pub mod pulse;

pub use infrared::ProximityFilter;
pub use pulse::PulseTimer;
