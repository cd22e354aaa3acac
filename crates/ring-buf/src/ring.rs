use std::fmt;

use tracing::trace;

use crate::{
    Error,
    zone::{Zone, distance},
};

/// Largest capacity a ring can have.
///
/// Offsets are signed, so half the address space is left as headroom for the
/// base-relative arithmetic.
pub const SIZE_MAX: usize = isize::MIN.unsigned_abs();

/// A fixed-capacity FIFO of bytes driven by claim and acknowledge.
///
/// Each side owns a [`Zone`]. A claim hands out a contiguous span of storage and
/// reserves it; an acknowledge commits some or all of that span and drops the
/// rest. Put claims draw against free space, get claims draw against used
/// space. Neither side sees the other's bytes until they are acknowledged.
///
/// The ring never allocates. `S` is whatever owns the bytes: an array, a boxed
/// slice, a `Vec<u8>` or a borrowed `&mut [u8]`.
pub struct RingBuf<S> {
    storage: S,
    size: usize,
    put: Zone,
    get: Zone,
}

impl<const N: usize> RingBuf<[u8; N]> {
    /// Creates a ring over an owned array with capacity `N`.
    #[must_use]
    pub const fn from_array(storage: [u8; N]) -> Self {
        Self::from_parts(storage, N)
    }
}

impl<S> RingBuf<S> {
    const fn from_parts(storage: S, size: usize) -> Self {
        Self {
            storage,
            size,
            put: Zone::new(0),
            get: Zone::new(0),
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.size
    }

    /// Bytes committed by the putter that the getter has not claimed.
    #[must_use]
    pub const fn used_space(&self) -> usize {
        distance(self.get.head(), self.put.tail())
    }

    /// Bytes neither committed nor claimed by the putter.
    #[must_use]
    pub const fn free_space(&self) -> usize {
        self.size - distance(self.get.tail(), self.put.head())
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.used_space() == 0
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.free_space() == 0
    }

    /// Outstanding put claim since the last [`RingBuf::put_ack`].
    #[must_use]
    pub const fn put_claimed(&self) -> usize {
        self.put.claimed()
    }

    /// Outstanding get claim since the last [`RingBuf::get_ack`].
    #[must_use]
    pub const fn get_claimed(&self) -> usize {
        self.get.claimed()
    }

    #[must_use]
    pub const fn put_zone(&self) -> &Zone {
        &self.put
    }

    #[must_use]
    pub const fn get_zone(&self) -> &Zone {
        &self.get
    }

    /// Re-bases both zones at `base`, logically erasing everything buffered.
    ///
    /// Any base works. Starting close to `isize::MAX` pushes the zones across
    /// the signed overflow boundary after a few bytes.
    pub fn reset(&mut self, base: isize) {
        trace!(base, "reset");
        self.put = Zone::new(base);
        self.get = Zone::new(base);
    }

    /// Commits `len` bytes of the outstanding put claim, making them visible to
    /// the getter. Acknowledging zero discards the claim.
    pub fn put_ack(&mut self, len: usize) -> Result<(), Error> {
        self.put.ack(len, self.size)
    }

    /// Releases `len` bytes of the outstanding get claim back to the putter.
    /// Acknowledging zero leaves everything in place for the next get.
    pub fn get_ack(&mut self, len: usize) -> Result<(), Error> {
        self.get.ack(len, self.size)
    }

    pub(crate) const fn rollback_put(&mut self) {
        self.put.rollback();
    }

    pub(crate) const fn rollback_get(&mut self) {
        self.get.rollback();
    }

    /// Storage and put zone for reading, get zone for claiming.
    pub(crate) const fn parts_mut(&mut self) -> (&S, &Zone, &mut Zone) {
        (&self.storage, &self.put, &mut self.get)
    }

    /// Gives the storage back, discarding the zones.
    pub fn into_inner(self) -> S {
        self.storage
    }
}

impl<S: AsRef<[u8]>> RingBuf<S> {
    /// Creates a ring whose capacity is the whole of `storage`.
    #[must_use]
    pub fn new(storage: S) -> Self {
        let size = storage.as_ref().len();
        Self::from_parts(storage, size)
    }

    /// Creates a ring using only the first `capacity` bytes of `storage`.
    pub fn with_capacity(storage: S, capacity: usize) -> Result<Self, Error> {
        if capacity > SIZE_MAX {
            return Err(Error::CapacityTooLarge {
                capacity,
                max: SIZE_MAX,
            });
        }

        let len = storage.as_ref().len();
        if capacity > len {
            return Err(Error::StorageTooSmall { len, capacity });
        }

        Ok(Self::from_parts(storage, capacity))
    }

    /// Claims up to `len` contiguous bytes of used space.
    ///
    /// The span never crosses the end of storage, so it may be shorter than
    /// requested even when more data is buffered; claim again for the rest.
    pub fn get_claim(&mut self, len: usize) -> &[u8] {
        let available = self.used_space();
        let range = self.get.claim(len, self.size, available);
        &self.storage.as_ref()[range]
    }

    /// Copies buffered bytes into `out` and returns how many were copied.
    ///
    /// **Does not acknowledge.** Follow up with [`RingBuf::get_ack`].
    pub fn get(&mut self, out: &mut [u8]) -> usize {
        let mut copied = 0;

        while copied < out.len() {
            let span = self.get_claim(out.len() - copied);
            if span.is_empty() {
                break;
            }

            let len = span.len();
            out[copied..copied + len].copy_from_slice(span);
            copied += len;
        }

        copied
    }

    /// Claims up to `len` buffered bytes without copying them anywhere.
    ///
    /// **Does not acknowledge.**
    pub fn discard(&mut self, len: usize) -> usize {
        let mut dropped = 0;

        while dropped < len {
            let claimed = self.get_claim(len - dropped).len();
            if claimed == 0 {
                break;
            }
            dropped += claimed;
        }

        dropped
    }

    /// Fills `out` completely and acknowledges, or takes nothing.
    pub fn get_all(&mut self, out: &mut [u8]) -> Result<(), Error> {
        let available = self.used_space();
        let copied = self.get(out);

        if copied < out.len() {
            self.rollback_get();
            return Err(Error::TryAgain {
                len: out.len(),
                available,
            });
        }

        self.get_ack(copied)
    }
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> RingBuf<S> {
    /// Claims up to `len` contiguous bytes of free space for writing.
    ///
    /// Nothing written here is visible to the getter until
    /// [`RingBuf::put_ack`].
    pub fn put_claim(&mut self, len: usize) -> &mut [u8] {
        let available = self.free_space();
        let range = self.put.claim(len, self.size, available);
        &mut self.storage.as_mut()[range]
    }

    /// Copies as much of `data` as fits and returns how many bytes were queued.
    ///
    /// **Does not acknowledge.** A short count means the ring filled up.
    pub fn put(&mut self, mut data: &[u8]) -> usize {
        let mut queued = 0;

        while !data.is_empty() {
            let span = self.put_claim(data.len());
            if span.is_empty() {
                break;
            }

            let (chunk, rest) = data.split_at(span.len());
            span.copy_from_slice(chunk);
            queued += chunk.len();
            data = rest;
        }

        queued
    }

    /// Queues and acknowledges all of `data`, or nothing.
    pub fn put_all(&mut self, data: &[u8]) -> Result<(), Error> {
        let free = self.free_space();
        let queued = self.put(data);

        if queued < data.len() {
            self.rollback_put();
            return Err(Error::MessageTooLarge {
                len: data.len(),
                free,
            });
        }

        self.put_ack(queued)
    }
}

impl<S> fmt::Debug for RingBuf<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuf")
            .field("size", &self.size)
            .field("used", &self.used_space())
            .field("free", &self.free_space())
            .field("put", &self.put)
            .field("get", &self.get)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let ring = RingBuf::from_array([0; 16]);
        assert_eq!(ring.capacity(), 16);
        assert_eq!(ring.used_space(), 0);
        assert_eq!(ring.free_space(), 16);
        assert!(ring.is_empty());
        assert!(!ring.is_full());
    }

    #[test]
    fn test_with_capacity() {
        let ring = RingBuf::with_capacity(vec![0u8; 32], 10).unwrap();
        assert_eq!(ring.capacity(), 10);

        assert_eq!(
            RingBuf::with_capacity(vec![0u8; 4], 5).unwrap_err(),
            Error::StorageTooSmall {
                len: 4,
                capacity: 5
            }
        );
    }

    #[test]
    fn test_put_invisible_until_ack() {
        let mut ring = RingBuf::from_array([0; 8]);

        assert_eq!(ring.put(&[1, 2, 3]), 3);
        assert_eq!(ring.used_space(), 0);
        assert_eq!(ring.free_space(), 5);
        assert_eq!(ring.put_claimed(), 3);

        ring.put_ack(3).unwrap();
        assert_eq!(ring.used_space(), 3);
        assert_eq!(ring.free_space(), 5);
    }

    #[test]
    fn test_basic_operations() {
        let mut ring = RingBuf::new(vec![0u8; 16]);

        ring.put_all(&[1, 2, 3, 4]).unwrap();

        assert_eq!(ring.get_claim(16), &[1, 2, 3, 4]);
        ring.get_ack(2).unwrap();
        assert_eq!(ring.get_claim(16), &[3, 4]);
        ring.get_ack(2).unwrap();

        assert!(ring.is_empty());
        assert_eq!(ring.free_space(), 16);
    }

    #[test]
    fn test_wrap_around() {
        let mut ring = RingBuf::from_array([0; 4]);

        ring.put_all(&[1, 2, 3, 4]).unwrap();
        assert!(ring.is_full());

        let mut out = [0; 2];
        ring.get_all(&mut out).unwrap();
        assert_eq!(out, [1, 2]);

        ring.put_all(&[5, 6]).unwrap();

        // contiguous claims stop at the end of storage
        assert_eq!(ring.get_claim(4), &[3, 4]);
        assert_eq!(ring.get_claim(4), &[5, 6]);
        ring.get_ack(4).unwrap();
        assert!(ring.is_empty());
    }

    #[test]
    fn test_put_claim_stops_at_end_of_storage() {
        let mut ring = RingBuf::from_array([0; 8]);
        ring.put_all(&[0; 6]).unwrap();
        ring.discard(6);
        ring.get_ack(6).unwrap();

        assert_eq!(ring.put_claim(5).len(), 2);
        assert_eq!(ring.put_claim(5).len(), 5);
        assert_eq!(ring.put_claimed(), 7);
        assert_eq!(ring.free_space(), 1);
    }

    #[test]
    fn test_put_short_when_full() {
        let mut ring = RingBuf::from_array([0; 4]);
        assert_eq!(ring.put(&[1, 2, 3, 4, 5, 6]), 4);
        ring.put_ack(4).unwrap();
        assert_eq!(ring.put(&[7]), 0);
    }

    #[test]
    fn test_ack_more_than_claimed() {
        let mut ring = RingBuf::from_array([0; 8]);
        ring.put(&[1, 2]);

        assert_eq!(
            ring.put_ack(3),
            Err(Error::InvalidAck {
                acked: 3,
                claimed: 2
            })
        );
        assert_eq!(
            ring.get_ack(1),
            Err(Error::InvalidAck {
                acked: 1,
                claimed: 0
            })
        );
    }

    #[test]
    fn test_put_all_rolls_back() {
        let mut ring = RingBuf::from_array([0; 8]);
        ring.put_all(&[0; 5]).unwrap();

        assert_eq!(
            ring.put_all(&[0; 4]),
            Err(Error::MessageTooLarge { len: 4, free: 3 })
        );
        assert_eq!(ring.used_space(), 5);
        assert_eq!(ring.free_space(), 3);
        assert_eq!(ring.put_claimed(), 0);
    }

    #[test]
    fn test_get_all_rolls_back() {
        let mut ring = RingBuf::from_array([0; 8]);
        ring.put_all(&[9, 8]).unwrap();

        let mut out = [0; 3];
        assert_eq!(
            ring.get_all(&mut out),
            Err(Error::TryAgain {
                len: 3,
                available: 2
            })
        );
        assert_eq!(ring.used_space(), 2);
        assert_eq!(ring.get_claimed(), 0);
    }

    #[test]
    fn test_discard_then_zero_ack_keeps_data() {
        let mut ring = RingBuf::from_array([0; 8]);
        ring.put_all(&[1, 2, 3]).unwrap();

        assert_eq!(ring.discard(10), 3);
        assert!(ring.is_empty());
        ring.get_ack(0).unwrap();

        let mut out = [0; 3];
        ring.get_all(&mut out).unwrap();
        assert_eq!(out, [1, 2, 3]);
    }

    #[test]
    fn test_reset_erases_content() {
        let mut ring = RingBuf::from_array([0; 8]);
        ring.put_all(&[1, 2, 3]).unwrap();
        ring.put(&[4]);

        ring.reset(-5);
        assert!(ring.is_empty());
        assert_eq!(ring.free_space(), 8);
        assert_eq!(*ring.put_zone(), Zone::new(-5));
        assert_eq!(*ring.get_zone(), Zone::new(-5));
    }

    #[test]
    fn test_borrowed_storage() {
        let mut bytes = [0u8; 4];
        {
            let mut ring = RingBuf::new(&mut bytes[..]);
            ring.put_all(b"ab").unwrap();
        }

        assert_eq!(&bytes[..2], b"ab");
    }

    #[test]
    fn test_zero_capacity() {
        let mut ring = RingBuf::new(Vec::<u8>::new());
        assert!(ring.is_empty());
        assert!(ring.is_full());
        assert_eq!(ring.put(b"x"), 0);
        assert!(ring.put_all(b"").is_ok());
    }
}
