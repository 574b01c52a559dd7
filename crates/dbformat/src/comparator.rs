//! Total orderings over raw byte strings.
//!
//! A block does not know what its keys mean; it is handed a comparator
//! consistent with the one the block was written with and threads it down to
//! every iterator. Comparators are shared as `Arc<dyn Comparator>` between a
//! block and all of its iterators, so they must be `Send + Sync`.

use std::cmp::Ordering;
use std::sync::Arc;

use byteorder::{BigEndian, ByteOrder};

use crate::sequence::TAG_BYTES;

/// A total order over byte strings.
pub trait Comparator: Send + Sync {
    /// Compares `a` with `b`.
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering;

    /// Identifies the ordering. Data written under one name must be read
    /// back under the same name.
    fn name(&self) -> &'static str;
}

/// Plain lexicographic byte order.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytewiseComparator;

impl Comparator for BytewiseComparator {
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }

    fn name(&self) -> &'static str {
        "leveldb.BytewiseComparator"
    }
}

/// Orders encoded internal keys: user key ascending under `user_comparator`,
/// then tag descending (newest sequence first).
///
/// Buffers shorter than the tag are not internal keys. They are ordered
/// bytewise as a whole so the comparator stays total.
#[derive(Clone)]
pub struct InternalKeyComparator {
    user_comparator: Arc<dyn Comparator>,
}

impl InternalKeyComparator {
    pub fn new(user_comparator: Arc<dyn Comparator>) -> Self {
        Self { user_comparator }
    }
}

impl Default for InternalKeyComparator {
    fn default() -> Self {
        Self::new(Arc::new(BytewiseComparator))
    }
}

impl std::fmt::Debug for InternalKeyComparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InternalKeyComparator")
            .field("user_comparator", &self.user_comparator.name())
            .finish()
    }
}

impl Comparator for InternalKeyComparator {
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        if a.len() < TAG_BYTES || b.len() < TAG_BYTES {
            return a.cmp(b);
        }
        let (a_user, a_tag) = a.split_at(a.len() - TAG_BYTES);
        let (b_user, b_tag) = b.split_at(b.len() - TAG_BYTES);
        self.user_comparator
            .compare(a_user, b_user)
            .then_with(|| BigEndian::read_u64(b_tag).cmp(&BigEndian::read_u64(a_tag)))
    }

    fn name(&self) -> &'static str {
        "leveldb.InternalKeyComparator"
    }
}
