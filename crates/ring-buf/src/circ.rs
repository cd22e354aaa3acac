use tracing::trace;

use crate::{Error, RingBuf};

impl<S: AsRef<[u8]> + AsMut<[u8]>> RingBuf<S> {
    /// Puts and acknowledges `data`, dropping the oldest `data.len()` bytes first
    /// if the ring is full.
    ///
    /// Fails only when `data` still does not fit after eviction, which cannot
    /// happen when the capacity is a whole multiple of a fixed record size.
    pub fn put_circ(&mut self, data: &[u8]) -> Result<(), Error> {
        if self.is_full() {
            let evicted = self.discard(data.len());
            trace!(evicted, "ring full, evicting oldest bytes");
            self.get_ack(evicted)?;
        }

        let free = self.free_space();
        if data.len() > free {
            return Err(Error::MessageTooLarge {
                len: data.len(),
                free,
            });
        }

        let queued = self.put(data);
        self.put_ack(queued)
    }
}
