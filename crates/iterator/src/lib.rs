//! # iterator - Seeking Iterators
//!
//! The cursor contract shared by every sorted container in the storage layer:
//! data blocks, whole tables and memtables. Higher layers (merging, snapshot
//! reads, compaction) drive any of them the same way:
//!
//! ```text
//! seek_to_first() / seek(target)   position the cursor
//! has_next()                       would next_entry() succeed?
//! next_entry()                     yield (key, value), advance
//! ```
//!
//! The protocol is pull-based and single-threaded: all state lives in the
//! cursor, nothing runs in the background, and an iterator is restarted only
//! by seeking it again.
//!
//! Two flavors exist, differing only in key type:
//!
//! | Trait                | Key            | Implemented by                     |
//! |----------------------|----------------|------------------------------------|
//! | [`RawIterator`]      | `[u8]`         | block iterators                    |
//! | [`InternalIterator`] | [`InternalKey`]| internal-key adapters, memtables   |
//!
//! Both are blanket-implemented aliases of [`SeekingIterator`].

use bytes::Bytes;
use dbformat::{InternalKey, Result};

/// A cursor over `(key, value)` pairs in ascending key order that can be
/// positioned at an arbitrary key.
pub trait SeekingIterator {
    /// Key type, borrowed form (`[u8]` or [`InternalKey`]).
    type Key: ?Sized + ToOwned;

    /// Positions the cursor so the next call to
    /// [`next_entry`](SeekingIterator::next_entry) yields the first entry.
    /// Idempotent. Never fails.
    fn seek_to_first(&mut self);

    /// Positions the cursor so the next call to
    /// [`next_entry`](SeekingIterator::next_entry) yields the first entry whose
    /// key is `>= target`. If there is none the iterator is left exhausted.
    ///
    /// # Errors
    ///
    /// [`dbformat::Error::Corruption`] if the underlying bytes are damaged;
    /// the iterator is then exhausted.
    fn seek(&mut self, target: &Self::Key) -> Result<()>;

    /// Returns `true` while there are entries left to yield.
    ///
    /// Entries are decoded lazily, so `true` means the cursor has not run
    /// out of input, not that the next entry is intact: a damaged entry is
    /// only detected by the [`next_entry`](SeekingIterator::next_entry) that
    /// decodes it, which then fails with [`dbformat::Error::Corruption`] and
    /// leaves the iterator exhausted.
    fn has_next(&self) -> bool;

    /// Yields the next entry and advances.
    ///
    /// # Errors
    ///
    /// [`dbformat::Error::NoSuchElement`] when called with `has_next() ==
    /// false`, [`dbformat::Error::Corruption`] when the entry cannot be
    /// decoded.
    fn next_entry(&mut self) -> Result<(<Self::Key as ToOwned>::Owned, Bytes)>;

    /// Drains every remaining entry into a `Vec`, stopping at the first error.
    fn collect_all(&mut self) -> Result<Vec<(<Self::Key as ToOwned>::Owned, Bytes)>> {
        let mut out = Vec::new();
        while self.has_next() {
            out.push(self.next_entry()?);
        }
        Ok(out)
    }
}

/// A seeking iterator keyed by raw bytes.
pub trait RawIterator: SeekingIterator<Key = [u8]> {}

impl<T: SeekingIterator<Key = [u8]> + ?Sized> RawIterator for T {}

/// A seeking iterator keyed by [`InternalKey`].
pub trait InternalIterator: SeekingIterator<Key = InternalKey> {}

impl<T: SeekingIterator<Key = InternalKey> + ?Sized> InternalIterator for T {}

impl<I: SeekingIterator + ?Sized> SeekingIterator for Box<I> {
    type Key = I::Key;

    fn seek_to_first(&mut self) {
        (**self).seek_to_first()
    }

    fn seek(&mut self, target: &Self::Key) -> Result<()> {
        (**self).seek(target)
    }

    fn has_next(&self) -> bool {
        (**self).has_next()
    }

    fn next_entry(&mut self) -> Result<(<I::Key as ToOwned>::Owned, Bytes)> {
        (**self).next_entry()
    }
}
