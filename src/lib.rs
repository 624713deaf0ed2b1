#![doc(html_root_url = "https://docs.rs/hashframe/latest")]
//! Public API for the `hashframe` library.
//!
//! This crate carries variable-length packets across transports that only
//! move fixed-size frames. Packets are fragmented into frames, reassembled on
//! the other side, and implicitly acknowledged through a rolling hash chain
//! rather than sequence numbers. The core is a synchronous, I/O-free state
//! machine driven by the caller's transport loop.

pub mod byte_order;
pub mod codec;
pub mod frames;
pub mod hash;
pub mod metrics;
pub mod packet;

pub use codec::FixedFrameCodec;
pub use frames::{
    ChainHash,
    FrameKind,
    FrameSize,
    Frames,
    FramesError,
    Inbound,
    Recovery,
};
pub use packet::Packet;
