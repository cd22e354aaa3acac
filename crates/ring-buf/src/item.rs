//! Length-prefixed items on top of a [`RingBuf`].
//!
//! Every item is stored as a little-endian [`ItemLength`] followed by the item
//! bytes. Framing only holds if nothing else writes to the ring, so
//! [`ItemRing`] owns its ring and exposes no raw put or get.

use crate::{Error, RingBuf};

/// Length prefix of an item.
pub type ItemLength = u16;

const PREFIX: usize = size_of::<ItemLength>();

#[derive(Debug)]
pub struct ItemRing<S> {
    ring: RingBuf<S>,
}

impl<const N: usize> ItemRing<[u8; N]> {
    #[must_use]
    pub const fn from_array(storage: [u8; N]) -> Self {
        Self {
            ring: RingBuf::from_array(storage),
        }
    }
}

impl<S> ItemRing<S> {
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Bytes used, prefixes included.
    #[must_use]
    pub const fn used_space(&self) -> usize {
        self.ring.used_space()
    }

    #[must_use]
    pub const fn free_space(&self) -> usize {
        self.ring.free_space()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    pub fn reset(&mut self, base: isize) {
        self.ring.reset(base);
    }

    /// Gives back the raw ring. Buffered items stay framed as described in the
    /// module docs.
    pub fn into_inner(self) -> RingBuf<S> {
        self.ring
    }
}

impl<S: AsRef<[u8]>> ItemRing<S> {
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self {
            ring: RingBuf::new(storage),
        }
    }

    pub fn with_capacity(storage: S, capacity: usize) -> Result<Self, Error> {
        RingBuf::with_capacity(storage, capacity).map(|ring| Self { ring })
    }

    /// Length of the oldest item, without consuming it.
    pub fn peek_len(&mut self) -> Option<usize> {
        let mut prefix = [0; PREFIX];
        let read = self.ring.get(&mut prefix);
        self.ring.rollback_get();

        (read == PREFIX).then(|| usize::from(ItemLength::from_le_bytes(prefix)))
    }

    fn next_len(&mut self) -> Result<usize, Error> {
        self.peek_len().ok_or_else(|| Error::TryAgain {
            len: PREFIX,
            available: self.ring.used_space(),
        })
    }

    /// Copies the oldest item into `out`, consumes it and returns its length.
    ///
    /// An empty ring and an `out` too short for the item both leave the ring
    /// untouched.
    pub fn get(&mut self, out: &mut [u8]) -> Result<usize, Error> {
        let len = self.next_len()?;
        if len > out.len() {
            return Err(Error::OutputTooSmall {
                len,
                capacity: out.len(),
            });
        }

        let claimed = self.ring.discard(PREFIX) + self.ring.get(&mut out[..len]);
        self.ring.get_ack(claimed)?;

        Ok(len)
    }

    /// Consumes the oldest item without copying it and returns its length.
    pub fn discard(&mut self) -> Result<usize, Error> {
        let len = self.next_len()?;
        let claimed = self.ring.discard(PREFIX + len);
        self.ring.get_ack(claimed)?;

        Ok(len)
    }
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> ItemRing<S> {
    /// Puts the length prefix and `item` and acknowledges both as one unit.
    pub fn put(&mut self, item: &[u8]) -> Result<(), Error> {
        let free = self.ring.free_space();
        let too_large = Error::MessageTooLarge {
            len: PREFIX + item.len(),
            free,
        };

        let Ok(len) = ItemLength::try_from(item.len()) else {
            return Err(too_large);
        };
        if PREFIX + item.len() > free {
            return Err(too_large);
        }

        let claimed = self.ring.put(&len.to_le_bytes()) + self.ring.put(item);
        self.ring.put_ack(claimed)
    }
}
