use std::fmt;

use bytes::Bytes;
use dbformat::{Error, InternalKey, Result};
use iterator::{RawIterator, SeekingIterator};
use tracing::warn;

/// Presents a raw-bytes iterator whose keys are encoded internal keys as an
/// [`InternalKey`]-keyed iterator.
///
/// Seeks encode the target and delegate; every yielded key is decoded on
/// the fly. A stored key that does not decode is reported as
/// [`Error::Corruption`] and ends the iteration: the record is never
/// skipped. Seeking again clears the error.
pub struct InternalTableIterator<I> {
    inner: I,
    failed: bool,
}

impl<I: RawIterator> InternalTableIterator<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            failed: false,
        }
    }

    /// Returns the wrapped raw iterator.
    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: RawIterator> SeekingIterator for InternalTableIterator<I> {
    type Key = InternalKey;

    fn seek_to_first(&mut self) {
        self.failed = false;
        self.inner.seek_to_first();
    }

    fn seek(&mut self, target: &InternalKey) -> Result<()> {
        self.failed = false;
        self.inner.seek(&target.encode()[..])
    }

    fn has_next(&self) -> bool {
        !self.failed && self.inner.has_next()
    }

    fn next_entry(&mut self) -> Result<(InternalKey, Bytes)> {
        if self.failed {
            return Err(Error::NoSuchElement);
        }
        let (raw_key, value) = self.inner.next_entry()?;
        match InternalKey::decode_bytes(Bytes::from(raw_key)) {
            Ok(key) => Ok((key, value)),
            Err(e) => {
                warn!(error = %e, "stored key is not an internal key");
                self.failed = true;
                Err(match e {
                    Error::InvalidArgument(msg) => Error::Corruption(format!("stored key: {msg}")),
                    other => other,
                })
            }
        }
    }
}

impl<I: fmt::Debug> fmt::Debug for InternalTableIterator<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternalTableIterator")
            .field("from_iterator", &self.inner)
            .field("failed", &self.failed)
            .finish()
    }
}
