//! Device implementations
//!
//! Only the simulated bench lives in-tree; real board drivers belong to
//! the firmware side of the robot and implement the same traits there.

pub mod mock;
