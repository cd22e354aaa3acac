use std::ops::Range;

use tracing::{debug, trace};

use crate::Error;

/// Unsigned distance from `from` to `to` in the logical stream.
///
/// Offsets wrap in two's complement, so the distance stays correct when a zone
/// crosses `isize::MAX`.
#[inline]
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub(crate) const fn distance(from: isize, to: isize) -> usize {
    to.wrapping_sub(from) as usize
}

/// Maps an offset relative to a zone's base onto storage.
///
/// A relative offset that has reached `capacity` belongs to the next wrap
/// segment, so it folds back to the start of storage.
#[inline]
#[must_use]
pub const fn physical_offset(relative: usize, capacity: usize) -> usize {
    if relative >= capacity {
        relative - capacity
    } else {
        relative
    }
}

/// One side of the stream cursor: `base <= tail <= head`.
///
/// `tail` is the committed boundary, `head` is the end of the pending claim and
/// `base` is the start of the current wrap segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Zone {
    base: isize,
    head: isize,
    tail: isize,
}

impl Zone {
    #[must_use]
    pub const fn new(base: isize) -> Self {
        Self {
            base,
            head: base,
            tail: base,
        }
    }

    #[must_use]
    pub const fn base(&self) -> isize {
        self.base
    }

    #[must_use]
    pub const fn head(&self) -> isize {
        self.head
    }

    #[must_use]
    pub const fn tail(&self) -> isize {
        self.tail
    }

    /// Bytes claimed since the last acknowledge.
    #[must_use]
    pub const fn claimed(&self) -> usize {
        distance(self.tail, self.head)
    }

    /// Physical start of the next claim and the contiguous run left before the
    /// end of storage.
    #[inline]
    const fn next_run(&self, capacity: usize) -> (usize, usize) {
        let start = physical_offset(distance(self.base, self.head), capacity);
        (start, capacity - start)
    }

    /// Largest claim that would succeed right now without touching the zone.
    #[must_use]
    pub const fn claimable(&self, capacity: usize, available: usize) -> usize {
        let (_, run) = self.next_run(capacity);
        if run < available { run } else { available }
    }

    /// Extends the claim by up to `len` bytes, never past the end of storage and
    /// never past `available`. Returns the claimed storage range.
    pub fn claim(&mut self, len: usize, capacity: usize, available: usize) -> Range<usize> {
        let (start, run) = self.next_run(capacity);
        let len = len.min(run).min(available);
        self.head = self.head.wrapping_add_unsigned(len);
        start..start + len
    }

    /// Commits `len` bytes of the pending claim and drops the remainder.
    pub fn ack(&mut self, len: usize, capacity: usize) -> Result<(), Error> {
        let claimed = self.claimed();
        if len > claimed {
            debug!(len, claimed, "rejected acknowledge beyond claim");
            return Err(Error::InvalidAck {
                acked: len,
                claimed,
            });
        }

        self.tail = self.tail.wrapping_add_unsigned(len);
        self.head = self.tail;

        if distance(self.base, self.tail) >= capacity {
            self.base = self.base.wrapping_add_unsigned(capacity);
            trace!(base = self.base, "zone wrapped");
        }

        Ok(())
    }

    /// Drops the pending claim; same as acknowledging zero bytes.
    pub const fn rollback(&mut self) {
        self.head = self.tail;
    }
}
