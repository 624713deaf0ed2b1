//! Fixed-size framing over byte streams.
//!
//! [`Frames`](crate::frames::Frames) exchanges frames of a configured size but
//! leaves transport I/O to the caller. Over a link with natural message
//! boundaries each message is one frame. Over a byte stream (a TCP socket, a
//! serial line) [`FixedFrameCodec`] cuts the stream into exactly `S`-byte
//! frames and refuses to write anything else, so it can drive
//! `tokio_util::codec::Framed` directly.

use std::io;

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::frames::FrameSize;

/// Codec splitting a byte stream into frames of one fixed size.
///
/// # Examples
///
/// ```
/// use bytes::{Bytes, BytesMut};
/// use hashframe::{codec::FixedFrameCodec, frames::FrameSize};
/// use tokio_util::codec::{Decoder, Encoder};
///
/// let mut codec = FixedFrameCodec::new(FrameSize::new(16).expect("valid size"));
/// let mut wire = BytesMut::new();
/// codec
///     .encode(Bytes::from(vec![7_u8; 16]), &mut wire)
///     .expect("frame has the configured size");
/// let frame = codec.decode(&mut wire).expect("decode").expect("one frame");
/// assert_eq!(frame.len(), 16);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedFrameCodec {
    size: FrameSize,
}

impl FixedFrameCodec {
    /// Construct a codec for frames of `size` bytes.
    #[must_use]
    pub const fn new(size: FrameSize) -> Self { Self { size } }

    /// Return the frame size this codec reads and writes.
    #[must_use]
    pub const fn frame_size(&self) -> FrameSize { self.size }
}

impl Decoder for FixedFrameCodec {
    type Item = Bytes;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let size = self.size.get();
        if src.len() < size {
            src.reserve(size - src.len());
            return Ok(None);
        }
        Ok(Some(src.split_to(size).freeze()))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // Clean close: no data remaining at frame boundary
        if src.is_empty() {
            return Ok(None);
        }
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        tracing::debug!(
            bytes_received = src.len(),
            frame_size = self.size.get(),
            "stream closed mid-frame"
        );
        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "stream closed mid-frame: received {} of {} bytes",
                src.len(),
                self.size
            ),
        ))
    }
}

impl Encoder<Bytes> for FixedFrameCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.len() != self.size.get() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "frame length {} does not match frame size {}",
                    item.len(),
                    self.size
                ),
            ));
        }
        dst.extend_from_slice(&item);
        Ok(())
    }
}
