//! Packet abstraction carried by the framing layer.
//!
//! The framing layer never looks inside a packet. It needs a raw byte view to
//! slice outbound packets into frames, and a way to turn a reassembled byte
//! buffer back into a packet. Protocols with their own self-delimited header
//! implement [`Packet`] for their packet type; `Vec<u8>` and [`Bytes`] work
//! out of the box for opaque payloads.

use std::{convert::Infallible, error::Error};

use bytes::Bytes;

/// An ordered, opaque byte buffer that can be framed and reassembled.
pub trait Packet: Sized {
    /// Error returned when reassembled bytes do not form a valid packet.
    type Error: Error + Send + Sync + 'static;

    /// Borrow the raw bytes to be transmitted.
    fn as_bytes(&self) -> &[u8];

    /// Parse a reassembled byte buffer into a packet.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] when `bytes` is not a well-formed packet.
    fn parse(bytes: Vec<u8>) -> Result<Self, Self::Error>;

    /// Length of the raw byte view.
    fn len(&self) -> usize { self.as_bytes().len() }

    /// Whether the raw byte view is empty.
    fn is_empty(&self) -> bool { self.len() == 0 }
}

impl Packet for Vec<u8> {
    type Error = Infallible;

    fn as_bytes(&self) -> &[u8] { self.as_slice() }

    fn parse(bytes: Vec<u8>) -> Result<Self, Self::Error> { Ok(bytes) }
}

impl Packet for Bytes {
    type Error = Infallible;

    fn as_bytes(&self) -> &[u8] { self.as_ref() }

    fn parse(bytes: Vec<u8>) -> Result<Self, Self::Error> { Ok(Bytes::from(bytes)) }
}
