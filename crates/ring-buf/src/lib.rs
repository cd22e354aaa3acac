//! A fixed-capacity byte FIFO built on claim and acknowledge.
//!
//! Both sides of a [`RingBuf`] work in two steps. A claim hands out a
//! contiguous span of storage without copying; an acknowledge commits all or
//! part of what was claimed. Until then the other side cannot see the bytes,
//! and acknowledging zero throws the claim away, which gives read-without-consume
//! and all-or-nothing writes for free.
//!
//! ```
//! use ring_buf::RingBuf;
//!
//! let mut ring = RingBuf::from_array([0; 8]);
//!
//! let span = ring.put_claim(3);
//! span.copy_from_slice(b"abc");
//! ring.put_ack(3).unwrap();
//!
//! assert_eq!(ring.get_claim(8), b"abc");
//! ring.get_ack(0).unwrap(); // peeked, still buffered
//! assert_eq!(ring.used_space(), 3);
//! ```
//!
//! Everything else is built on those four calls:
//! - [`RingBuf::put`] / [`RingBuf::get`] copy across the end of storage,
//! - [`RingBuf::put_all`] / [`RingBuf::get_all`] commit everything or nothing,
//! - [`RingBuf::put_circ`] drops the oldest bytes when full,
//! - [`ItemRing`] frames length-prefixed items,
//! - [`RingBuf::get_claim_chunks`] and [`RingBuf::get_claim_yield`] walk the
//!   buffered bytes in fixed-size chunks.
//!
//! There is no internal synchronization; a ring is driven through `&mut self`.

mod chunks;
mod circ;
mod error;
mod item;
mod ring;
mod zone;

pub use chunks::{ClaimChunks, Yielded};
pub use error::Error;
pub use item::{ItemLength, ItemRing};
pub use ring::{RingBuf, SIZE_MAX};
pub use zone::{Zone, physical_offset};
