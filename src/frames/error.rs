//! Error and recovery types emitted by the frame state machine.
//!
//! Errors fall into three groups. Configuration and caller mistakes never
//! touch protocol state. Malformed frames degrade into a forced resync and
//! leave the context usable. Hash-chain divergence is sticky: the context
//! refuses every further operation until [`Frames::clear`](super::Frames::clear)
//! is called.

use thiserror::Error;

use super::ChainHash;

/// Errors produced by [`Frames`](super::Frames).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FramesError {
    /// The requested frame size lies outside `16..=128`.
    #[error("invalid frame size {size}: must be within 16..=128")]
    InvalidFrameSize { size: usize },
    /// A frame or metadata buffer does not have the expected length.
    #[error("buffer length mismatch: expected {expected}, got {actual}")]
    FrameLength { expected: usize, actual: usize },
    /// A frame or reassembly buffer could not be allocated.
    #[error("out of memory allocating {requested} bytes")]
    OutOfMemory { requested: usize },
    /// A tail frame declared a length that does not fit its payload.
    #[error("invalid tail length {tail}: payload holds at most {payload}")]
    InvalidTailLength { tail: usize, payload: usize },
    /// A frame matched neither the data nor the tail hash expected at the
    /// current position.
    #[error("corrupt frame at position {position}: hash {received} does not continue the chain")]
    CorruptFrame { position: usize, received: ChainHash },
    /// The peer acknowledged a hash that matches no position of the current
    /// outbound history.
    #[error("hash chain diverged: peer claims {claimed}, outbound chain starts at {outbase}")]
    Diverged {
        claimed: ChainHash,
        outbase: ChainHash,
    },
}

/// How a caller should react to a [`FramesError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recovery {
    /// Keep going; the next outbound frame is already a resync meta frame.
    Resync,
    /// Retry the same call later; no state was changed.
    Retry,
    /// Call [`Frames::clear`](super::Frames::clear) (and usually renegotiate
    /// the session) before using the context again.
    Reset,
    /// The call itself was wrong; fix the arguments or configuration.
    Reject,
}

impl Recovery {
    /// Returns the recovery name as a static string for metrics and logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resync => "resync",
            Self::Retry => "retry",
            Self::Reset => "reset",
            Self::Reject => "reject",
        }
    }
}

impl FramesError {
    /// Recommended reaction to this error.
    #[must_use]
    pub const fn recovery(&self) -> Recovery {
        match self {
            Self::InvalidFrameSize { .. } | Self::FrameLength { .. } => Recovery::Reject,
            Self::OutOfMemory { .. } => Recovery::Retry,
            Self::InvalidTailLength { .. } | Self::CorruptFrame { .. } => Recovery::Resync,
            Self::Diverged { .. } => Recovery::Reset,
        }
    }

    /// Whether this error leaves the context faulted until cleared.
    #[must_use]
    pub const fn is_fatal(&self) -> bool { matches!(self, Self::Diverged { .. }) }

    /// Short label used for metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidFrameSize { .. } => "invalid_frame_size",
            Self::FrameLength { .. } => "frame_length",
            Self::OutOfMemory { .. } => "out_of_memory",
            Self::InvalidTailLength { .. } => "invalid_tail_length",
            Self::CorruptFrame { .. } => "corrupt_frame",
            Self::Diverged { .. } => "diverged",
        }
    }
}
