//! Hardware capability traits
//!
//! Each trait covers exactly one capability the ranging core consumes:
//! analog sampling, head positioning, pulse emission with edge capture,
//! and waiting. Keeping waits behind [`Delay`] lets the sweep run against
//! a no-op clock in tests.

pub mod analog;
pub mod delay;
pub mod pulse;
pub mod servo;

pub use analog::AnalogDriver;
pub use delay::{Delay, NoopDelay, SystemDelay};
pub use pulse::{EdgeEvent, EdgeKind, PulseDriver};
pub use servo::ServoDriver;
