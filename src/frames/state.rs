//! The frame state machine: one context per connection.
//!
//! [`Frames`] owns both queues (reassembled inbound packets and outbound
//! packets awaiting transmission), the fragment cache and the two rolling hash
//! accumulators. It performs no I/O: the caller's transport loop feeds every
//! received frame to [`Frames::inbox`] and asks [`Frames::outbox`] for the
//! next frame to transmit, pacing both with [`Frames::ready`] and
//! [`Frames::awaiting`].

use std::{collections::VecDeque, iter};

use bytes::Bytes;
use log::{debug, trace, warn};

use super::{
    ChainHash,
    FrameKind,
    FrameSize,
    FramesError,
    Recovery,
    chain::{ChainHashes, chain_hash, chunk_at, fold},
    pool::FramePool,
    wire::{WireFrame, write_chunk, write_meta},
};
use crate::{
    metrics::{self, Direction},
    packet::Packet,
};

/// Outcome of feeding one frame to [`Frames::inbox`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inbound {
    /// A meta frame was processed.
    Meta,
    /// The frame repeated the last accepted frame and was ignored.
    Duplicate,
    /// A non-final fragment was cached.
    Data,
    /// A tail frame completed a packet of `len` bytes.
    Packet {
        /// Length of the reassembled packet.
        len: usize,
    },
}

/// Outbound packet plus the number of its bytes already framed.
///
/// `peak` is the most frames ever sent for the packet. A rewind lowers the
/// frame cursor but never `peak`, so an acknowledgement for any frame already
/// on the wire still matches.
#[derive(Debug)]
struct Pending<P> {
    packet: P,
    sent: usize,
    peak: usize,
}

impl<P: Packet> Pending<P> {
    fn remaining(&self) -> usize { self.packet.len().saturating_sub(self.sent) }
}

/// Bidirectional framing context.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use hashframe::frames::Frames;
///
/// let mut alice: Frames<Bytes> = Frames::new(32).expect("valid frame size");
/// let mut bob: Frames<Bytes> = Frames::new(32).expect("valid frame size");
///
/// alice.send(Some(Bytes::from_static(b"hello, bob")));
/// let mut frame = [0_u8; 32];
/// while alice
///     .outbox(&mut frame, None)
///     .expect("alice is healthy")
///     .is_some()
/// {
///     bob.inbox(&frame, None).expect("frame accepted");
/// }
///
/// assert_eq!(bob.receive().as_deref(), Some(b"hello, bob".as_slice()));
/// ```
#[derive(Debug)]
pub struct Frames<P: Packet = Bytes> {
    size: FrameSize,
    cache: FramePool,
    inbox: VecDeque<P>,
    outbox: VecDeque<Pending<P>>,
    inlast: ChainHash,
    outbase: ChainHash,
    out: usize,
    flush: bool,
    ping: bool,
    fault: Option<FramesError>,
}

impl<P: Packet> Frames<P> {
    /// Create a context exchanging frames of `frame_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FramesError::InvalidFrameSize`] unless `frame_size` is within
    /// `16..=128`.
    pub fn new(frame_size: usize) -> Result<Self, FramesError> {
        Ok(Self::with_size(FrameSize::new(frame_size)?))
    }

    /// Create a context from an already validated frame size.
    #[must_use]
    pub fn with_size(size: FrameSize) -> Self {
        Self {
            size,
            cache: FramePool::new(size.payload()),
            inbox: VecDeque::new(),
            outbox: VecDeque::new(),
            inlast: ChainHash::SEED,
            outbase: ChainHash::SEED,
            out: 0,
            flush: false,
            ping: false,
            fault: None,
        }
    }

    /// Configured frame size.
    #[must_use]
    pub const fn frame_size(&self) -> FrameSize { self.size }

    /// Reset hash state, counters and the fragment cache, clearing any fault.
    ///
    /// Queued inbound and outbound packets are kept; the head outbound packet
    /// will be sent again from its first frame.
    pub fn clear(&mut self) {
        let released = self.cache.release_all();
        self.inlast = ChainHash::SEED;
        self.outbase = ChainHash::SEED;
        self.out = 0;
        self.flush = false;
        self.ping = false;
        self.fault = None;
        if let Some(head) = self.outbox.front_mut() {
            head.sent = 0;
            head.peak = 0;
        }
        debug!("frames cleared: released {released} cached frames");
    }

    /// Release every queued packet and cached frame.
    pub fn free(mut self) {
        let released = self.cache.release_all();
        debug!(
            "frames freed: {} inbound packets, {} outbound packets, {released} cached frames",
            self.inbox.len(),
            self.outbox.len(),
        );
    }

    /// Queue `packet` for transmission, or request a ping when `None`.
    ///
    /// A ping makes the next [`outbox`](Self::outbox) call emit a meta frame
    /// the peer always answers, used as keepalive, to recover a lost tail or
    /// confirmation, or to carry metadata.
    pub fn send(&mut self, packet: Option<P>) {
        match packet {
            Some(packet) => self.outbox.push_back(Pending {
                packet,
                sent: 0,
                peak: 0,
            }),
            None => {
                self.flush = true;
                self.ping = true;
            }
        }
    }

    /// Request a ping meta frame on the next outbound opportunity.
    pub fn flush(&mut self) { self.send(None); }

    /// Dequeue the next fully reassembled inbound packet.
    pub fn receive(&mut self) -> Option<P> { self.inbox.pop_front() }

    /// Feed one received frame into the context.
    ///
    /// When the frame is a meta frame and `metadata` is provided, the meta
    /// frame's metadata block is copied into it, truncated to the shorter of
    /// the two.
    ///
    /// # Errors
    ///
    /// - [`FramesError::FrameLength`] if `frame` is not exactly one frame long.
    /// - [`FramesError::InvalidTailLength`] or [`FramesError::CorruptFrame`]
    ///   for malformed frames; a resync meta frame is scheduled and the context
    ///   stays usable.
    /// - [`FramesError::OutOfMemory`] if a fragment or the reassembly buffer
    ///   cannot be allocated; state is unchanged and the frame may be fed again.
    /// - [`FramesError::Diverged`] if the peer acknowledges a hash unknown to
    ///   the outbound chain. The context is faulted and every later call
    ///   returns the same error until [`clear`](Self::clear).
    pub fn inbox(
        &mut self,
        frame: &[u8],
        metadata: Option<&mut [u8]>,
    ) -> Result<Inbound, FramesError> {
        self.check_fault()?;
        let position = self.cache.len();
        let classified = WireFrame::classify(frame, self.size, self.inlast, position)
            .inspect_err(|err| self.reject(*err))?;

        match classified {
            WireFrame::Meta {
                received,
                sent,
                ping,
                metadata: block,
            } => {
                metrics::inc_frames(Direction::Inbound, FrameKind::Meta);
                self.confirm(received)?;
                if let Some(out) = metadata {
                    let n = out.len().min(block.len());
                    out[..n].copy_from_slice(&block[..n]);
                }
                self.flush = self.ping || ping || sent != self.inlast;
                if sent != self.inlast {
                    debug!(
                        "peer sent up to {sent} but last received is {}, flushing",
                        self.inlast
                    );
                } else if ping {
                    trace!("answering ping at {sent}");
                }
                Ok(Inbound::Meta)
            }
            WireFrame::Duplicate => {
                trace!("skipping duplicate frame {}", self.inlast);
                Ok(Inbound::Duplicate)
            }
            WireFrame::Data { chunk, hash } => {
                self.cache.allocate(chunk)?;
                metrics::inc_frames(Direction::Inbound, FrameKind::Data);
                // A locally requested ping survives; resyncs and acks do not.
                self.flush = self.ping;
                self.inlast = hash;
                trace!("cached data frame {position} hash {hash}");
                Ok(Inbound::Data)
            }
            WireFrame::Tail { chunk, hash } => {
                let bytes = self.cache.assemble(chunk)?;
                metrics::inc_frames(Direction::Inbound, FrameKind::Tail);
                self.flush = true;
                self.inlast = hash;
                let len = bytes.len();
                match P::parse(bytes) {
                    Ok(packet) => {
                        metrics::inc_packets(Direction::Inbound);
                        debug!("reassembled {len} byte packet from {} frames", position + 1);
                        self.inbox.push_back(packet);
                    }
                    Err(err) => warn!("dropping unparsable {len} byte packet: {err}"),
                }
                Ok(Inbound::Packet { len })
            }
        }
    }

    /// Produce the next frame to transmit into `frame`.
    ///
    /// Returns the kind of frame written, or `None` when there is nothing to
    /// send (no flush pending and the head packet, if any, is fully framed).
    /// `metadata` is embedded when a meta frame is written.
    ///
    /// # Errors
    ///
    /// Returns [`FramesError::FrameLength`] if `frame` is not exactly one frame
    /// long or `metadata` exceeds the metadata capacity, and the sticky
    /// [`FramesError::Diverged`] error on a faulted context.
    pub fn outbox(
        &mut self,
        frame: &mut [u8],
        metadata: Option<&[u8]>,
    ) -> Result<Option<FrameKind>, FramesError> {
        self.check_fault()?;
        let payload = self.size.payload();
        let head = self
            .outbox
            .front()
            .map(|pending| pending.packet.as_bytes())
            .unwrap_or_default();
        let current = chain_hash(self.outbase, head, payload, self.out);

        if self.flush {
            write_meta(frame, self.size, self.inlast, current, self.ping, metadata)?;
            self.flush = false;
            self.ping = false;
            metrics::inc_frames(Direction::Outbound, FrameKind::Meta);
            trace!("sent meta frame rx {} tx {current}", self.inlast);
            return Ok(Some(FrameKind::Meta));
        }

        let Some(pending) = self.outbox.front_mut() else {
            return Ok(None);
        };
        let bytes = pending.packet.as_bytes();
        let Some(chunk) = chunk_at(bytes, payload, self.out) else {
            return Ok(None);
        };
        let hash = fold(current, chunk, self.out);
        let kind = write_chunk(frame, self.size, chunk, hash)?;
        pending.sent = ((self.out + 1) * payload).min(bytes.len());
        self.out += 1;
        pending.peak = pending.peak.max(self.out);
        metrics::inc_frames(Direction::Outbound, kind);
        trace!("sent {} frame {} hash {hash}", kind.as_str(), self.out - 1);
        Ok(Some(kind))
    }

    /// Whether the caller should call [`outbox`](Self::outbox): a flush is
    /// pending or packets are queued.
    ///
    /// # Errors
    ///
    /// Returns the sticky [`FramesError::Diverged`] error on a faulted context.
    pub fn ready(&self) -> Result<bool, FramesError> {
        self.check_fault()?;
        Ok(self.flush || !self.outbox.is_empty())
    }

    /// Whether more inbound frames are expected: a packet is mid-reassembly, or
    /// the head outbound packet is still being framed or awaits the peer's
    /// confirmation.
    ///
    /// # Errors
    ///
    /// Returns the sticky [`FramesError::Diverged`] error on a faulted context.
    pub fn awaiting(&self) -> Result<bool, FramesError> {
        self.check_fault()?;
        Ok(!self.cache.is_empty() || !self.outbox.is_empty())
    }

    /// Bytes buffered inbound: queued packets plus cached fragments.
    #[must_use]
    pub fn inlen(&self) -> usize {
        self.inbox.iter().map(Packet::len).sum::<usize>() + self.cache.buffered()
    }

    /// Bytes queued outbound that have not been framed yet.
    #[must_use]
    pub fn outlen(&self) -> usize { self.outbox.iter().map(Pending::remaining).sum() }

    /// Whether the context is faulted by hash-chain divergence.
    #[must_use]
    pub const fn is_faulted(&self) -> bool { self.fault.is_some() }

    /// Whether the next outbound frame will be a meta frame.
    #[must_use]
    pub const fn is_flushing(&self) -> bool { self.flush }

    /// Hash of the last accepted inbound frame.
    #[must_use]
    pub const fn inbound_hash(&self) -> ChainHash { self.inlast }

    /// Hash the current outbound packet's chain starts from.
    #[must_use]
    pub const fn outbound_base(&self) -> ChainHash { self.outbase }

    /// Number of fragments cached for the packet being reassembled.
    #[must_use]
    pub fn cached_frames(&self) -> usize { self.cache.len() }

    /// Number of frames of the head outbound packet sent and not rewound.
    #[must_use]
    pub const fn sent_frames(&self) -> usize { self.out }

    /// Number of reassembled packets waiting in the inbox.
    #[must_use]
    pub fn inbox_len(&self) -> usize { self.inbox.len() }

    /// Number of packets waiting in the outbox, including the head packet.
    #[must_use]
    pub fn outbox_len(&self) -> usize { self.outbox.len() }

    fn check_fault(&self) -> Result<(), FramesError> {
        match self.fault {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn reject(&mut self, err: FramesError) {
        metrics::inc_errors(&err);
        if err.recovery() == Recovery::Resync {
            self.flush = true;
            warn!("rejected frame at position {}: {err}", self.cache.len());
        }
    }

    /// Match the peer's acknowledged hash against the head packet's chain,
    /// rewinding or retiring the packet accordingly.
    fn confirm(&mut self, claimed: ChainHash) -> Result<(), FramesError> {
        let payload = self.size.payload();
        let Some(pending) = self.outbox.front() else {
            return if claimed == self.outbase {
                Ok(())
            } else {
                Err(self.diverge(claimed))
            };
        };
        let bytes = pending.packet.as_bytes();
        let total = self.size.frames_for(bytes.len());
        let len = bytes.len();
        let matched = iter::once(self.outbase)
            .chain(ChainHashes::new(self.outbase, bytes, payload))
            .take(pending.peak + 1)
            .position(|hash| hash == claimed);
        let Some(position) = matched else {
            return Err(self.diverge(claimed));
        };

        if position == total {
            self.outbox.pop_front();
            self.outbase = claimed;
            self.out = 0;
            metrics::inc_packets(Direction::Outbound);
            debug!("peer confirmed {len} byte packet, chain now at {claimed}");
            return Ok(());
        }

        if position < self.out {
            metrics::inc_resyncs();
            debug!("peer confirmed {position} of {} sent frames, rewinding", self.out);
        } else if position > self.out {
            debug!("peer holds {position} frames, skipping ahead from {}", self.out);
        }
        self.out = position;
        if let Some(pending) = self.outbox.front_mut() {
            pending.sent = (position * payload).min(len);
        }
        Ok(())
    }

    fn diverge(&mut self, claimed: ChainHash) -> FramesError {
        let err = FramesError::Diverged {
            claimed,
            outbase: self.outbase,
        };
        warn!("{err}; faulting until cleared");
        metrics::inc_errors(&err);
        self.fault = Some(err);
        err
    }
}

impl<P: Packet> Default for Frames<P> {
    fn default() -> Self { Self::with_size(FrameSize::default()) }
}
