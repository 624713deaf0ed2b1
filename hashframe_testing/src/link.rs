//! An in-memory link between two [`Frames`] contexts.
//!
//! [`Link`] plays the transport loop for both peers: it moves every frame
//! each side has to send into the other side, optionally losing, repeating or
//! damaging scripted frames on the way, and pings from whichever side is
//! still waiting once the link goes quiet.

use std::collections::HashMap;

use bytes::Bytes;
use hashframe::{FrameSize, Frames, FramesError, Packet, Recovery};

/// Upper bound on rounds before [`Link::settle`] gives up.
pub const MAX_ROUNDS: usize = 256;

/// What happens to one frame in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fate {
    /// The frame arrives unchanged.
    Deliver,
    /// The frame is lost.
    Drop,
    /// The frame arrives twice.
    Duplicate,
    /// The byte at the given offset (modulo the frame size) is inverted.
    Corrupt(usize),
}

/// Direction of travel across the link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// From peer `a` to peer `b`.
    AtoB,
    /// From peer `b` to peer `a`.
    BtoA,
}

/// Per-direction counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Frames handed to the link by the sender.
    pub sent: usize,
    /// Frames accepted by the receiver, duplicates included.
    pub delivered: usize,
    /// Frames lost in transit.
    pub dropped: usize,
    /// Frames damaged in transit.
    pub corrupted: usize,
    /// Frames the receiver rejected and answered with a resync.
    pub rejected: usize,
    /// Pings sent because the link went quiet with work outstanding.
    pub pings: usize,
}

#[derive(Debug, Default)]
struct Channel {
    script: HashMap<usize, Fate>,
    stats: Stats,
}

impl Channel {
    fn fate(&self) -> Fate {
        self.script
            .get(&self.stats.sent)
            .copied()
            .unwrap_or(Fate::Deliver)
    }
}

/// Two peers joined by a scripted in-memory link.
#[derive(Debug)]
pub struct Link<P: Packet = Bytes> {
    /// The first peer.
    pub a: Frames<P>,
    /// The second peer.
    pub b: Frames<P>,
    forward: Channel,
    backward: Channel,
}

impl<P: Packet> Link<P> {
    /// Join two fresh contexts exchanging frames of `size` bytes.
    #[must_use]
    pub fn new(size: FrameSize) -> Self {
        Self {
            a: Frames::with_size(size),
            b: Frames::with_size(size),
            forward: Channel::default(),
            backward: Channel::default(),
        }
    }

    /// Script the fate of the `n`-th frame sent in `direction`, counting
    /// from zero. Unscripted frames are delivered.
    #[must_use]
    pub fn with_fate(mut self, direction: Direction, n: usize, fate: Fate) -> Self {
        self.channel_mut(direction).script.insert(n, fate);
        self
    }

    /// Counters for `direction`.
    #[must_use]
    pub fn stats(&self, direction: Direction) -> Stats {
        match direction {
            Direction::AtoB => self.forward.stats,
            Direction::BtoA => self.backward.stats,
        }
    }

    /// Move every frame currently pending in `direction`, returning how many
    /// frames the sender produced.
    ///
    /// # Errors
    ///
    /// Returns any error other than a resync-recoverable rejection.
    pub fn pump(&mut self, direction: Direction) -> Result<usize, FramesError> {
        let (from, to, channel) = match direction {
            Direction::AtoB => (&mut self.a, &mut self.b, &mut self.forward),
            Direction::BtoA => (&mut self.b, &mut self.a, &mut self.backward),
        };
        let mut frame = vec![0_u8; from.frame_size().get()];
        let mut produced = 0;
        while from.outbox(&mut frame, None)?.is_some() {
            produced += 1;
            let copies = match channel.fate() {
                Fate::Deliver => 1,
                Fate::Drop => {
                    channel.stats.dropped += 1;
                    0
                }
                Fate::Duplicate => 2,
                Fate::Corrupt(offset) => {
                    let len = frame.len();
                    frame[offset % len] ^= 0xff;
                    channel.stats.corrupted += 1;
                    1
                }
            };
            channel.stats.sent += 1;
            for _ in 0..copies {
                match to.inbox(&frame, None) {
                    Ok(_) => channel.stats.delivered += 1,
                    Err(err) if err.recovery() == Recovery::Resync => channel.stats.rejected += 1,
                    Err(err) => return Err(err),
                }
            }
        }
        Ok(produced)
    }

    /// Run the link until both peers are idle and neither awaits anything,
    /// returning the number of rounds taken.
    ///
    /// When a round moves no frame but a peer still awaits inbound frames,
    /// that peer pings to recover whatever was lost.
    ///
    /// # Errors
    ///
    /// Propagates unrecoverable errors from either peer.
    ///
    /// # Panics
    ///
    /// Panics if the link does not settle within [`MAX_ROUNDS`] rounds.
    pub fn settle(&mut self) -> Result<usize, FramesError> {
        for round in 1..=MAX_ROUNDS {
            let moved = self.pump(Direction::AtoB)? + self.pump(Direction::BtoA)?;
            if moved > 0 {
                continue;
            }
            let a_waits = self.a.awaiting()?;
            let b_waits = self.b.awaiting()?;
            if !a_waits && !b_waits {
                return Ok(round);
            }
            if a_waits {
                self.a.flush();
                self.forward.stats.pings += 1;
            }
            if b_waits {
                self.b.flush();
                self.backward.stats.pings += 1;
            }
        }
        panic!("link did not settle within {MAX_ROUNDS} rounds");
    }

    fn channel_mut(&mut self, direction: Direction) -> &mut Channel {
        match direction {
            Direction::AtoB => &mut self.forward,
            Direction::BtoA => &mut self.backward,
        }
    }
}
