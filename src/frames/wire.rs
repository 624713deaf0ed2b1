//! Frame layout on the wire and classification of inbound frames.
//!
//! For a frame size `S` with `payload = S - 4`:
//!
//! ```text
//! data  | chunk (payload bytes)                    | chain hash (4) |
//! tail  | chunk (t bytes) | zeros | t (1 byte)     | chain hash (4) |
//! meta  | rx (4) | tx (4) | ping | 0 | metadata ... | murmur4(payload) (4) |
//! ```
//!
//! Frames carry no type tag. An inbound frame is classified by which hash its
//! trailing word satisfies, tried in a fixed order: self-consistent (meta),
//! equal to the last accepted hash (duplicate), continuation over the full
//! payload (data), continuation over the declared tail prefix (tail).

use super::{
    ChainHash,
    FrameSize,
    FramesError,
    chain::fold,
    config::{HASH_LEN, META_OFFSET, PING_OFFSET},
};
use crate::{
    byte_order::{read_wire_u32_at, write_wire_u32_at},
    hash::{murmur_into, murmur4},
};

/// Kind of frame written by [`Frames::outbox`](super::Frames::outbox).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    /// Acknowledgement, keepalive or resync frame.
    Meta,
    /// Full non-final fragment of a packet.
    Data,
    /// Final fragment of a packet.
    Tail,
}

impl FrameKind {
    /// Returns the kind name as a static string for metrics and logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Meta => "meta",
            Self::Data => "data",
            Self::Tail => "tail",
        }
    }
}

/// An inbound frame, classified once against the receive state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WireFrame<'a> {
    Meta {
        received: ChainHash,
        sent: ChainHash,
        ping: bool,
        metadata: &'a [u8],
    },
    Duplicate,
    Data {
        chunk: &'a [u8],
        hash: ChainHash,
    },
    Tail {
        chunk: &'a [u8],
        hash: ChainHash,
    },
}

impl<'a> WireFrame<'a> {
    /// Classify `frame` given the last accepted hash and the position of the
    /// next expected frame.
    pub(crate) fn classify(
        frame: &'a [u8],
        size: FrameSize,
        inlast: ChainHash,
        position: usize,
    ) -> Result<Self, FramesError> {
        check_len(frame, size)?;
        let payload_len = size.payload();
        let (payload, trailer) = frame.split_at(payload_len);
        let received = ChainHash::new(read_word(trailer, 0));

        let whole = murmur4(payload);
        if received.get() == whole {
            return Ok(Self::Meta {
                received: ChainHash::new(read_word(payload, 0)),
                sent: ChainHash::new(read_word(payload, 4)),
                ping: payload[PING_OFFSET] != 0,
                metadata: &payload[META_OFFSET..],
            });
        }

        if received == inlast {
            return Ok(Self::Duplicate);
        }

        if received == fold(inlast, payload, position) {
            return Ok(Self::Data {
                chunk: payload,
                hash: received,
            });
        }

        let tail = usize::from(payload[payload_len - 1]);
        if tail >= payload_len {
            return Err(FramesError::InvalidTailLength {
                tail,
                payload: payload_len,
            });
        }
        let chunk = &payload[..tail];
        if received != fold(inlast, chunk, position) {
            return Err(FramesError::CorruptFrame { position, received });
        }
        Ok(Self::Tail {
            chunk,
            hash: received,
        })
    }
}

/// Write a meta frame carrying the local receive and send hashes.
///
/// A `ping` meta frame asks the peer to answer with a meta frame of its own.
///
/// # Errors
///
/// Returns [`FramesError::FrameLength`] if `frame` is not exactly one frame
/// long or `metadata` exceeds the metadata capacity.
pub(crate) fn write_meta(
    frame: &mut [u8],
    size: FrameSize,
    received: ChainHash,
    sent: ChainHash,
    ping: bool,
    metadata: Option<&[u8]>,
) -> Result<(), FramesError> {
    check_len(frame, size)?;
    let metadata = metadata.unwrap_or_default();
    let capacity = size.metadata_capacity();
    if metadata.len() > capacity {
        return Err(FramesError::FrameLength {
            expected: capacity,
            actual: metadata.len(),
        });
    }

    let (payload, trailer) = frame.split_at_mut(size.payload());
    payload.fill(0);
    write_wire_u32_at(payload, 0, received.get());
    write_wire_u32_at(payload, 4, sent.get());
    payload[PING_OFFSET] = u8::from(ping);
    payload[META_OFFSET..META_OFFSET + metadata.len()].copy_from_slice(metadata);
    murmur_into(payload, trailer);
    Ok(())
}

/// Write the data or tail frame carrying `chunk` with its chain `hash`.
pub(crate) fn write_chunk(
    frame: &mut [u8],
    size: FrameSize,
    chunk: &[u8],
    hash: ChainHash,
) -> Result<FrameKind, FramesError> {
    check_len(frame, size)?;
    let payload_len = size.payload();
    debug_assert!(chunk.len() <= payload_len, "chunk exceeds frame payload");
    let (payload, trailer) = frame.split_at_mut(payload_len);
    payload.fill(0);
    payload[..chunk.len()].copy_from_slice(chunk);

    let kind = if chunk.len() == payload_len {
        FrameKind::Data
    } else {
        // `chunk.len() < payload_len <= 124`, so the length fits one byte.
        payload[payload_len - 1] = u8::try_from(chunk.len()).unwrap_or(u8::MAX);
        FrameKind::Tail
    };
    write_wire_u32_at(trailer, 0, hash.get());
    Ok(kind)
}

fn check_len(frame: &[u8], size: FrameSize) -> Result<(), FramesError> {
    if frame.len() == size.get() {
        Ok(())
    } else {
        Err(FramesError::FrameLength {
            expected: size.get(),
            actual: frame.len(),
        })
    }
}

fn read_word(buf: &[u8], offset: usize) -> u32 {
    debug_assert!(buf.len() >= offset + HASH_LEN);
    read_wire_u32_at(buf, offset).unwrap_or_default()
}
