//! Ranging pulse driver trait and edge-capture events

use crate::error::Result;
use crossbeam_channel::Receiver;

/// Edge polarity of one capture event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Echo leading edge
    Rising,
    /// Echo trailing edge
    Falling,
}

/// One completed edge capture, produced in interrupt context.
///
/// `ticks` is the free-running capture-timer count latched at the edge and
/// `overflows` the number of timer overflows seen since the counter last
/// reset. Each event is a complete snapshot delivered over a bounded
/// channel, so the consumer never observes a half-written pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEvent {
    pub kind: EdgeKind,
    /// Timer count latched at the edge
    pub ticks: u32,
    /// Timer overflow count at capture time
    pub overflows: u32,
}

/// Acoustic ranging transducer with hardware edge capture.
pub trait PulseDriver: Send {
    /// Drive the transducer for one ranging pulse and arm edge capture.
    ///
    /// Capture must be held off while the output is driven so the outgoing
    /// pulse cannot self-trigger, then re-armed for the echo.
    fn emit_pulse(&mut self) -> Result<()>;

    /// Channel on which armed captures deliver their edge events.
    fn edges(&self) -> Receiver<EdgeEvent>;
}
