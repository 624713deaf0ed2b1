//! Utilities for exercising [`hashframe`] contexts in tests.
//!
//! [`Link`] joins two contexts through a scripted in-memory transport that
//! can lose, repeat or damage individual frames. [`LoggerHandle`] and the
//! [`logger`] fixture give tests exclusive access to captured log records.
//!
//! ```rust
//! use bytes::Bytes;
//! use hashframe::FrameSize;
//! use hashframe_testing::{Direction, Fate, Link};
//!
//! let mut link: Link<Bytes> = Link::new(FrameSize::DEFAULT)
//!     .with_fate(Direction::AtoB, 0, Fate::Drop);
//! link.a.send(Some(Bytes::from_static(b"lost once, delivered anyway")));
//! link.settle().expect("link recovers");
//! assert!(link.b.receive().is_some());
//! ```

pub mod link;
pub mod logging;

pub use link::{Direction, Fate, Link, MAX_ROUNDS, Stats};
pub use logging::{LoggerHandle, logger};
