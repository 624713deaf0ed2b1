//! Storage for received fragments of the packet being reassembled.
//!
//! Each accepted data frame owns one payload-sized buffer. Buffers are kept
//! in arrival order in a single vector, so releasing a long backlog is a
//! plain loop rather than a recursive walk of linked nodes.

use super::FramesError;

/// Cache of payload buffers for the in-progress inbound packet.
#[derive(Debug)]
pub(crate) struct FramePool {
    payload: usize,
    frames: Vec<Box<[u8]>>,
}

impl FramePool {
    pub(crate) const fn new(payload: usize) -> Self {
        Self {
            payload,
            frames: Vec::new(),
        }
    }

    /// Number of cached frames, which is also the position of the next
    /// expected frame.
    pub(crate) fn len(&self) -> usize { self.frames.len() }

    pub(crate) fn is_empty(&self) -> bool { self.frames.is_empty() }

    /// Bytes held by cached frames.
    pub(crate) fn buffered(&self) -> usize { self.frames.len() * self.payload }

    /// Allocate a zeroed frame, copy `chunk` into it and append it.
    ///
    /// On failure the pool is left untouched.
    pub(crate) fn allocate(&mut self, chunk: &[u8]) -> Result<(), FramesError> {
        debug_assert!(chunk.len() <= self.payload, "chunk exceeds frame payload");
        let requested = self.payload;
        self.frames
            .try_reserve(1)
            .map_err(|_| FramesError::OutOfMemory { requested })?;

        let mut frame = Vec::new();
        frame
            .try_reserve_exact(requested)
            .map_err(|_| FramesError::OutOfMemory { requested })?;
        frame.resize(requested, 0);
        if let Some(slot) = frame.get_mut(..chunk.len()) {
            slot.copy_from_slice(chunk);
        }
        self.frames.push(frame.into_boxed_slice());
        Ok(())
    }

    /// Drop every cached frame, returning how many were released.
    pub(crate) fn release_all(&mut self) -> usize {
        let released = self.frames.len();
        self.frames.clear();
        released
    }

    /// Concatenate all cached frames followed by `tail` into one buffer sized
    /// exactly once, consuming the cache.
    ///
    /// If the buffer cannot be allocated the cache is kept intact.
    pub(crate) fn assemble(&mut self, tail: &[u8]) -> Result<Vec<u8>, FramesError> {
        let requested = self.buffered() + tail.len();
        let mut packet = Vec::new();
        packet
            .try_reserve_exact(requested)
            .map_err(|_| FramesError::OutOfMemory { requested })?;
        for frame in self.frames.drain(..) {
            packet.extend_from_slice(&frame);
        }
        packet.extend_from_slice(tail);
        debug_assert_eq!(packet.len(), requested);
        Ok(packet)
    }
}
