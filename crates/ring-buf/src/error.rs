use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Acknowledged more bytes than were claimed since the last acknowledge.
    #[error("cannot acknowledge {acked} bytes, only {claimed} are claimed")]
    InvalidAck { acked: usize, claimed: usize },

    #[error("message of {len} bytes does not fit in {free} bytes of free space")]
    MessageTooLarge { len: usize, free: usize },

    #[error("requested {len} bytes but only {available} are available")]
    TryAgain { len: usize, available: usize },

    #[error("item of {len} bytes does not fit in an output buffer of {capacity} bytes")]
    OutputTooSmall { len: usize, capacity: usize },

    #[error("storage of {len} bytes cannot hold a capacity of {capacity} bytes")]
    StorageTooSmall { len: usize, capacity: usize },

    #[error("capacity of {capacity} bytes exceeds the maximum of {max} bytes")]
    CapacityTooLarge { capacity: usize, max: usize },
}
