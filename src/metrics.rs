//! Metric helpers for `hashframe`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. Without the
//! `metrics` feature the helpers do nothing.

use crate::frames::{FrameKind, FramesError};

/// Name of the counter tracking frames sent and received.
pub const FRAMES_TOTAL: &str = "hashframe_frames_total";
/// Name of the counter tracking packets reassembled or confirmed.
pub const PACKETS_TOTAL: &str = "hashframe_packets_total";
/// Name of the counter tracking outbound rewinds after a partial confirmation.
pub const RESYNCS_TOTAL: &str = "hashframe_resyncs_total";
/// Name of the counter tracking error occurrences.
pub const ERRORS_TOTAL: &str = "hashframe_errors_total";

/// Direction of frame processing.
#[derive(Clone, Copy, Debug)]
pub enum Direction {
    /// Frames received from the peer.
    Inbound,
    /// Frames produced for the peer.
    Outbound,
}

impl Direction {
    #[cfg_attr(not(feature = "metrics"), allow(dead_code))]
    fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Record a processed frame of `kind` for the given direction.
#[cfg(feature = "metrics")]
pub fn inc_frames(direction: Direction, kind: FrameKind) {
    metrics::counter!(
        FRAMES_TOTAL,
        "direction" => direction.as_str(),
        "kind" => kind.as_str()
    )
    .increment(1);
}

/// Record a packet reassembled (inbound) or confirmed by the peer (outbound).
#[cfg(feature = "metrics")]
pub fn inc_packets(direction: Direction) {
    metrics::counter!(PACKETS_TOTAL, "direction" => direction.as_str()).increment(1);
}

/// Record an outbound rewind.
#[cfg(feature = "metrics")]
pub fn inc_resyncs() { metrics::counter!(RESYNCS_TOTAL).increment(1); }

/// Record an error occurrence.
#[cfg(feature = "metrics")]
pub fn inc_errors(error: &FramesError) {
    metrics::counter!(ERRORS_TOTAL, "kind" => error.kind()).increment(1);
}

/// Record a processed frame of `kind` for the given direction.
#[cfg(not(feature = "metrics"))]
pub fn inc_frames(_direction: Direction, _kind: FrameKind) {}

/// Record a packet reassembled (inbound) or confirmed by the peer (outbound).
#[cfg(not(feature = "metrics"))]
pub fn inc_packets(_direction: Direction) {}

/// Record an outbound rewind.
#[cfg(not(feature = "metrics"))]
pub fn inc_resyncs() {}

/// Record an error occurrence.
#[cfg(not(feature = "metrics"))]
pub fn inc_errors(_error: &FramesError) {}
