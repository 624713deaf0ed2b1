//! Rolling hash chain shared by the send and receive paths.
//!
//! Instead of sequence numbers, each frame carries the hash of its chunk
//! folded into the hash of everything exchanged before it, plus the frame's
//! position within the packet. Both peers derive the chain with the same
//! functions here, so a sender verifying an acknowledgement and a receiver
//! validating a frame can never disagree about the arithmetic.

use std::iter::FusedIterator;

use derive_more::{Display, From, Into};

use crate::hash::murmur4;

/// A 32-bit link of the rolling hash chain.
///
/// # Examples
///
/// ```
/// use hashframe::frames::ChainHash;
///
/// let hash = ChainHash::new(0x2a);
/// assert_eq!(hash.get(), 42);
/// assert_eq!(hash.to_string(), "0x0000002a");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, From, Into)]
#[display("{_0:#010x}")]
pub struct ChainHash(u32);

impl ChainHash {
    /// Starting value of both accumulators on a fresh or cleared context.
    ///
    /// A zero seed would make the chain of a fresh session start from the
    /// hash of an empty chunk.
    pub const SEED: Self = Self(42);

    /// Wrap a raw hash value.
    #[must_use]
    pub const fn new(value: u32) -> Self { Self(value) }

    /// Return the raw hash value.
    #[must_use]
    pub const fn get(self) -> u32 { self.0 }
}

impl Default for ChainHash {
    fn default() -> Self { Self::SEED }
}

/// Fold `chunk`, sent at frame `position`, into the chain ending at `prev`.
///
/// The 1-based frame number is mixed in modulo 2^32 so a replay of an
/// identical chunk at another offset cannot alias, and so an empty tail at
/// position 0 (`murmur4("") == 0`) still moves the chain forward.
///
/// # Examples
///
/// ```
/// use hashframe::frames::{ChainHash, fold};
///
/// let next = fold(ChainHash::SEED, b"", 0);
/// assert_eq!(next.get(), 43);
/// ```
#[must_use]
pub fn fold(prev: ChainHash, chunk: &[u8], position: usize) -> ChainHash {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "positions are folded modulo 2^32"
    )]
    let number = (position as u32).wrapping_add(1);
    ChainHash((prev.0 ^ murmur4(chunk)).wrapping_add(number))
}

/// Return the chunk of `packet` carried by frame `index`.
///
/// Full frames carry `payload` bytes; the final frame carries the remaining
/// `len % payload` bytes, which may be none. Returns `None` once `index` is
/// past the final frame.
#[must_use]
pub fn chunk_at(packet: &[u8], payload: usize, index: usize) -> Option<&[u8]> {
    let start = index.checked_mul(payload)?;
    if start > packet.len() {
        return None;
    }
    let end = start.saturating_add(payload).min(packet.len());
    packet.get(start..end)
}

/// Iterator over the chain hash after each successive frame of a packet.
///
/// The first item is the hash after frame 0, the last the hash carried by
/// the packet's tail frame.
#[derive(Clone, Debug)]
pub struct ChainHashes<'a> {
    packet: &'a [u8],
    payload: usize,
    index: usize,
    hash: ChainHash,
}

impl<'a> ChainHashes<'a> {
    /// Walk `packet` in `payload`-sized frames starting from `base`.
    #[must_use]
    pub const fn new(base: ChainHash, packet: &'a [u8], payload: usize) -> Self {
        Self {
            packet,
            payload,
            index: 0,
            hash: base,
        }
    }
}

impl Iterator for ChainHashes<'_> {
    type Item = ChainHash;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk = chunk_at(self.packet, self.payload, self.index)?;
        self.hash = fold(self.hash, chunk, self.index);
        self.index += 1;
        Some(self.hash)
    }
}

impl FusedIterator for ChainHashes<'_> {}

/// Chain hash after the first `frames` frames of `packet`, starting at `base`.
///
/// With `frames == 0` this is `base` itself. Counts beyond the packet's frame
/// total stop at the tail frame.
#[must_use]
pub fn chain_hash(base: ChainHash, packet: &[u8], payload: usize, frames: usize) -> ChainHash {
    ChainHashes::new(base, packet, payload)
        .take(frames)
        .last()
        .unwrap_or(base)
}
