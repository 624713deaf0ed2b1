//! Hash-chained framing of packets over fixed-size transport frames.
//!
//! Outbound packets are sliced into frames of a configured size; inbound
//! frames are reassembled into packets. No sequence numbers are transmitted:
//! every frame ends in a rolling hash that chains it to everything exchanged
//! before, which doubles as implicit acknowledgement, duplicate detection and
//! loss detection. Each sub-module focuses on a single concept.

pub mod chain;
pub mod config;
pub mod error;
mod pool;
pub mod state;
pub mod wire;

pub use chain::{ChainHash, ChainHashes, chain_hash, chunk_at, fold};
pub use config::FrameSize;
pub use error::{FramesError, Recovery};
pub use state::{Frames, Inbound};
pub use wire::FrameKind;
