//! Frame size configuration shared by both directions of a context.

use derive_more::{Display, Into};

use super::FramesError;

/// Bytes at the end of every frame reserved for the trailing hash.
pub const HASH_LEN: usize = 4;

/// Offset of the ping flag inside a meta frame payload.
pub const PING_OFFSET: usize = 8;

/// Offset of the metadata block inside a meta frame payload.
///
/// Bytes 0-3 carry the last received hash, 4-7 the last sent hash, 8 the ping
/// flag and 9 is reserved.
pub const META_OFFSET: usize = 10;

/// A validated transport frame size in bytes.
///
/// The size is fixed for the lifetime of a [`Frames`](super::Frames) context
/// and bounds all payload arithmetic: `payload = size - 4`.
///
/// # Examples
///
/// ```
/// use hashframe::frames::FrameSize;
///
/// let size = FrameSize::new(64).expect("within bounds");
/// assert_eq!(size.payload(), 60);
/// assert_eq!(size.metadata_capacity(), 50);
/// assert!(FrameSize::new(15).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Into)]
#[display("{_0}")]
pub struct FrameSize(usize);

impl FrameSize {
    /// Smallest accepted frame size.
    pub const MIN: usize = 16;
    /// Largest accepted frame size.
    pub const MAX: usize = 128;
    /// Frame size used by [`Default`].
    pub const DEFAULT: Self = Self(64);

    /// Validate a frame size.
    ///
    /// # Errors
    ///
    /// Returns [`FramesError::InvalidFrameSize`] when `size` lies outside
    /// `16..=128`.
    pub const fn new(size: usize) -> Result<Self, FramesError> {
        if size < Self::MIN || size > Self::MAX {
            return Err(FramesError::InvalidFrameSize { size });
        }
        Ok(Self(size))
    }

    /// Total frame length in bytes.
    #[must_use]
    pub const fn get(self) -> usize { self.0 }

    /// Bytes available for packet data in one frame.
    #[must_use]
    pub const fn payload(self) -> usize { self.0 - HASH_LEN }

    /// Bytes available for metadata in one meta frame.
    #[must_use]
    pub const fn metadata_capacity(self) -> usize { self.payload() - META_OFFSET }

    /// Number of data and tail frames needed to carry `len` bytes.
    ///
    /// Every packet ends in a tail frame holding `len % payload` bytes, so a
    /// packet whose length is a multiple of the payload ends with an empty
    /// tail.
    #[must_use]
    pub const fn frames_for(self, len: usize) -> usize { len / self.payload() + 1 }
}

impl Default for FrameSize {
    fn default() -> Self { Self::DEFAULT }
}

impl TryFrom<usize> for FrameSize {
    type Error = FramesError;

    fn try_from(value: usize) -> Result<Self, Self::Error> { Self::new(value) }
}
