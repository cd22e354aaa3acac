use std::{iter::FusedIterator, ops::ControlFlow};

use crate::{
    RingBuf,
    zone::{Zone, distance},
};

/// Zero-copy iterator over fixed-size get claims.
///
/// Each step claims exactly `chunk` contiguous bytes and yields them with a
/// zero-based index. Iteration ends at the first chunk that cannot be claimed
/// whole, either because the used space ran out or because the contiguous run
/// before the end of storage is shorter than `chunk`. Nothing is acknowledged:
/// follow up with [`RingBuf::get_ack`] of zero to leave the ring untouched, or
/// of [`ClaimChunks::claimed`] to consume what was seen.
#[must_use]
pub struct ClaimChunks<'a> {
    storage: &'a [u8],
    size: usize,
    put: &'a Zone,
    get: &'a mut Zone,
    chunk: usize,
    index: usize,
}

impl ClaimChunks<'_> {
    /// Whether the next call to [`Iterator::next`] yields a chunk.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.chunk != 0 && self.get.claimable(self.size, self.available()) >= self.chunk
    }

    /// Chunks yielded so far.
    #[must_use]
    pub const fn yielded(&self) -> usize {
        self.index
    }

    /// Bytes claimed by this iterator so far.
    #[must_use]
    pub const fn claimed(&self) -> usize {
        self.index * self.chunk
    }

    const fn available(&self) -> usize {
        distance(self.get.head(), self.put.tail())
    }
}

impl<'a> Iterator for ClaimChunks<'a> {
    type Item = (usize, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.has_more() {
            return None;
        }

        let available = self.available();
        let range = self.get.claim(self.chunk, self.size, available);
        debug_assert_eq!(range.len(), self.chunk);

        let index = self.index;
        self.index += 1;

        let storage: &'a [u8] = self.storage;
        Some((index, &storage[range]))
    }
}

impl FusedIterator for ClaimChunks<'_> {}

/// How a yield loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Yielded<B> {
    /// Ran out of whole chunks after yielding this many.
    Exhausted(usize),
    /// The callback broke out with this value.
    Stopped(B),
}

impl<B> Yielded<B> {
    #[must_use]
    pub const fn count(&self) -> Option<usize> {
        match self {
            Self::Exhausted(count) => Some(*count),
            Self::Stopped(_) => None,
        }
    }

    #[must_use]
    pub fn into_break(self) -> Option<B> {
        match self {
            Self::Exhausted(_) => None,
            Self::Stopped(value) => Some(value),
        }
    }
}

impl<S: AsRef<[u8]>> RingBuf<S> {
    /// Lazily claims `chunk`-sized spans of used space. See [`ClaimChunks`].
    ///
    /// A `chunk` of zero yields nothing.
    pub fn get_claim_chunks(&mut self, chunk: usize) -> ClaimChunks<'_> {
        let size = self.capacity();
        let (storage, put, get) = self.parts_mut();

        ClaimChunks {
            storage: storage.as_ref(),
            size,
            put,
            get,
            chunk,
            index: 0,
        }
    }

    /// Claims `chunk`-sized spans and hands each to `f` along with its index
    /// until `f` breaks or a whole chunk can no longer be claimed.
    ///
    /// **Does not acknowledge.**
    pub fn get_claim_yield<B>(
        &mut self,
        chunk: usize,
        mut f: impl FnMut(&[u8], usize) -> ControlFlow<B>,
    ) -> Yielded<B> {
        let mut chunks = self.get_claim_chunks(chunk);

        for (index, span) in &mut chunks {
            if let ControlFlow::Break(value) = f(span, index) {
                return Yielded::Stopped(value);
            }
        }

        Yielded::Exhausted(chunks.yielded())
    }

    /// Copying counterpart of [`RingBuf::get_claim_yield`]: fills `buf` from
    /// the ring on each step, across the end of storage if need be, and hands
    /// it to `f`.
    ///
    /// **Does not acknowledge.**
    pub fn get_yield<B>(
        &mut self,
        buf: &mut [u8],
        mut f: impl FnMut(&[u8], usize) -> ControlFlow<B>,
    ) -> Yielded<B> {
        let mut index = 0;

        while !buf.is_empty() && self.used_space() >= buf.len() {
            let copied = self.get(buf);
            debug_assert_eq!(copied, buf.len());

            if let ControlFlow::Break(value) = f(buf, index) {
                return Yielded::Stopped(value);
            }
            index += 1;
        }

        Yielded::Exhausted(index)
    }
}
