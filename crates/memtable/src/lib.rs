//! In-memory sorted buffer of recent writes, keyed by [`InternalKey`].
//!
//! Every put and delete is kept as its own version; nothing is overwritten.
//! Reads pick the newest version visible at a snapshot sequence number, and
//! [`MemTable::iter`] exposes all versions through the same seeking-iterator
//! contract as an on-disk table.

use std::collections::btree_map::{self, BTreeMap};
use std::ops::Bound;

use bytes::Bytes;
use dbformat::{Error, InternalKey, Result, ValueType, MAX_SEQUENCE_NUMBER};
use iterator::SeekingIterator;

/// Outcome of a point lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The newest visible version is a live value.
    Value(Bytes),
    /// The newest visible version is a tombstone.
    Deleted,
}

#[derive(Debug, Default)]
pub struct MemTable {
    map: BTreeMap<InternalKey, Bytes>,
    approx_size: usize,
}

impl MemTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a put of `value` under `user_key` at sequence `seq`.
    pub fn put(&mut self, user_key: impl Into<Bytes>, value: impl Into<Bytes>, seq: u64) -> Result<()> {
        self.insert(InternalKey::new(user_key, seq, ValueType::Value)?, value.into())
    }

    /// Records a tombstone for `user_key` at sequence `seq`.
    pub fn delete(&mut self, user_key: impl Into<Bytes>, seq: u64) -> Result<()> {
        self.insert(InternalKey::new(user_key, seq, ValueType::Deletion)?, Bytes::new())
    }

    fn insert(&mut self, key: InternalKey, value: Bytes) -> Result<()> {
        if self.map.contains_key(&key) {
            return Err(Error::InvalidArgument(format!(
                "sequence number {} already used for this key",
                key.sequence()
            )));
        }
        self.approx_size += key.encoded_len() + value.len();
        self.map.insert(key, value);
        Ok(())
    }

    /// Newest version of `user_key` with sequence `<= snapshot`.
    pub fn get(&self, user_key: &[u8], snapshot: u64) -> Option<Lookup> {
        let start = InternalKey::new(
            Bytes::copy_from_slice(user_key),
            snapshot.min(MAX_SEQUENCE_NUMBER),
            ValueType::Value,
        )
        .ok()?;
        let (key, value) = self
            .map
            .range((Bound::Included(start), Bound::Unbounded))
            .next()?;
        if key.user_key().as_ref() != user_key {
            return None;
        }
        Some(match key.value_type() {
            ValueType::Value => Lookup::Value(value.clone()),
            ValueType::Deletion => Lookup::Deleted,
        })
    }

    /// Seeking iterator over every version, positioned at the first entry.
    pub fn iter(&self) -> MemTableIterator<'_> {
        let mut iter = MemTableIterator {
            map: &self.map,
            range: self.map.range::<InternalKey, _>(..),
            peeked: None,
        };
        iter.seek_to_first();
        iter
    }

    /// Number of versions stored (tombstones included).
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Approximate bytes held: encoded keys plus values.
    pub fn approx_size(&self) -> usize {
        self.approx_size
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.approx_size = 0;
    }
}

/// Cursor over a [`MemTable`] borrowed for the iterator's lifetime.
pub struct MemTableIterator<'a> {
    map: &'a BTreeMap<InternalKey, Bytes>,
    range: btree_map::Range<'a, InternalKey, Bytes>,
    peeked: Option<(&'a InternalKey, &'a Bytes)>,
}

impl<'a> SeekingIterator for MemTableIterator<'a> {
    type Key = InternalKey;

    fn seek_to_first(&mut self) {
        self.range = self.map.range::<InternalKey, _>(..);
        self.peeked = self.range.next();
    }

    fn seek(&mut self, target: &InternalKey) -> Result<()> {
        self.range = self
            .map
            .range((Bound::Included(target.clone()), Bound::Unbounded));
        self.peeked = self.range.next();
        Ok(())
    }

    fn has_next(&self) -> bool {
        self.peeked.is_some()
    }

    fn next_entry(&mut self) -> Result<(InternalKey, Bytes)> {
        let (key, value) = self.peeked.take().ok_or(Error::NoSuchElement)?;
        self.peeked = self.range.next();
        Ok((key.clone(), value.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn memtable_put_get_delete() -> Result<()> {
        let mut m = MemTable::new();
        m.put("k1", "v1", 1)?;
        assert_eq!(m.len(), 1);
        assert_eq!(m.get(b"k1", 10), Some(Lookup::Value(Bytes::from_static(b"v1"))));

        m.put("k1", "v2", 2)?;
        assert_eq!(m.get(b"k1", 10), Some(Lookup::Value(Bytes::from_static(b"v2"))));

        m.delete("k1", 3)?;
        assert_eq!(m.get(b"k1", 10), Some(Lookup::Deleted));
        // every version is retained
        assert_eq!(m.len(), 3);
        Ok(())
    }

    #[test]
    fn get_respects_snapshot() -> Result<()> {
        let mut m = MemTable::new();
        m.put("k", "old", 2)?;
        m.delete("k", 5)?;
        m.put("k", "new", 8)?;

        assert_eq!(m.get(b"k", 1), None);
        assert_eq!(m.get(b"k", 2), Some(Lookup::Value(Bytes::from_static(b"old"))));
        assert_eq!(m.get(b"k", 4), Some(Lookup::Value(Bytes::from_static(b"old"))));
        assert_eq!(m.get(b"k", 5), Some(Lookup::Deleted));
        assert_eq!(m.get(b"k", 7), Some(Lookup::Deleted));
        assert_eq!(m.get(b"k", u64::MAX), Some(Lookup::Value(Bytes::from_static(b"new"))));
        Ok(())
    }

    #[test]
    fn get_does_not_leak_into_next_user_key() -> Result<()> {
        let mut m = MemTable::new();
        m.put("a", "1", 1)?;
        m.put("ab", "2", 2)?;
        assert_eq!(m.get(b"aa", 10), None);
        assert_eq!(m.get(b"b", 10), None);
        Ok(())
    }

    #[test]
    fn reused_sequence_is_rejected() -> Result<()> {
        let mut m = MemTable::new();
        m.put("k", "v", 1)?;
        assert!(matches!(m.put("k", "w", 1), Err(Error::InvalidArgument(_))));
        // a different kind is a different internal key
        m.delete("k", 1)?;
        assert_eq!(m.len(), 2);
        Ok(())
    }

    #[test]
    fn out_of_range_sequence_is_rejected() {
        let mut m = MemTable::new();
        assert!(matches!(
            m.put("k", "v", MAX_SEQUENCE_NUMBER + 1),
            Err(Error::InvalidArgument(_))
        ));
        assert!(m.is_empty());
    }

    #[test]
    fn approx_size_counts_keys_and_values() -> Result<()> {
        let mut m = MemTable::new();
        assert_eq!(m.approx_size(), 0);
        m.put("a", "aaa", 1)?;
        assert_eq!(m.approx_size(), 1 + 8 + 3);
        m.delete("a", 2)?;
        assert_eq!(m.approx_size(), 2 * (1 + 8) + 3);
        m.clear();
        assert_eq!(m.approx_size(), 0);
        assert!(m.is_empty());
        Ok(())
    }

    #[test]
    fn iterator_yields_newest_version_first() -> Result<()> {
        let mut m = MemTable::new();
        m.put("b", "b1", 1)?;
        m.put("a", "a2", 2)?;
        m.put("a", "a3", 3)?;

        let all = m.iter().collect_all()?;
        let order: Vec<(&[u8], u64)> = all
            .iter()
            .map(|(k, _)| (k.user_key().as_ref(), k.sequence()))
            .collect();
        assert_eq!(order, vec![(&b"a"[..], 3), (&b"a"[..], 2), (&b"b"[..], 1)]);
        Ok(())
    }

    #[test]
    fn iterator_seek_and_exhaustion() -> Result<()> {
        let mut m = MemTable::new();
        m.put("a", "1", 1)?;
        m.put("c", "3", 3)?;

        let mut it = m.iter();
        it.seek(&InternalKey::new("b", MAX_SEQUENCE_NUMBER, ValueType::Value)?)?;
        let (k, v) = it.next_entry()?;
        assert_eq!(k.user_key().as_ref(), b"c");
        assert_eq!(v, Bytes::from_static(b"3"));
        assert!(!it.has_next());
        assert_eq!(it.next_entry().unwrap_err(), Error::NoSuchElement);

        it.seek_to_first();
        assert!(it.has_next());
        assert_eq!(it.next_entry()?.0.user_key().as_ref(), b"a");
        Ok(())
    }

    #[test]
    fn empty_memtable_iterator_is_exhausted() {
        let m = MemTable::new();
        let mut it = m.iter();
        it.seek_to_first();
        assert!(!it.has_next());
    }
}
