use thiserror::Error;

/// Errors surfaced by the key format, block codec and seeking iterators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed or out-of-range caller input (sequence number past 56 bits,
    /// a buffer too short for the constructor it was handed to).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The call was well formed but the bytes being decoded break the format
    /// (restart offsets past the data region, lengths overrunning the buffer).
    #[error("corruption: {0}")]
    Corruption(String),

    /// `next_entry` was called on an exhausted iterator.
    #[error("no such element")]
    NoSuchElement,
}

impl Error {
    /// Returns `true` for [`Error::Corruption`].
    #[must_use]
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::Corruption(_))
    }
}

/// Result type alias used throughout the storage layer.
pub type Result<T> = std::result::Result<T, Error>;
