use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use dbformat::{Comparator, Error, Result};
use iterator::SeekingIterator;
use tracing::trace;

use crate::block_iter::BlockIterator;
use crate::coding::{get_fixed32, U32_BYTES};

/// One immutable data block.
///
/// Keys are prefix compressed. Every so often the compression is restarted
/// and a full key is written; the offsets of those restart records are
/// stored at the end of the block so a seek can binary search them instead
/// of decoding the block from the start.
///
/// ```text
/// ┌──────────────────────────────┬────────────────────────┬───────────────┐
/// │ data: record ... record      │ restart offsets u32 LE │ count u32 LE  │
/// └──────────────────────────────┴────────────────────────┴───────────────┘
/// ```
///
/// The buffer is reference counted: [`Block::iter`] hands each iterator a
/// cheap clone of the two regions, never a copy.
#[derive(Clone)]
pub struct Block {
    block: Bytes,
    data: Bytes,
    restarts: Bytes,
    comparator: Arc<dyn Comparator>,
}

impl Block {
    /// Parses the restart index out of `block`.
    ///
    /// `comparator` must be the ordering the block was written with.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `block` is shorter than the 4-byte
    /// restart count or the restart index would not fit in it.
    pub fn new(block: Bytes, comparator: Arc<dyn Comparator>) -> Result<Self> {
        if block.len() < U32_BYTES {
            return Err(Error::InvalidArgument(format!(
                "block is corrupt: size must be at least {U32_BYTES} bytes, got {}",
                block.len()
            )));
        }

        let count_offset = block.len() - U32_BYTES;
        let restart_count = get_fixed32(&block, count_offset)? as usize;

        let (data, restarts) = if restart_count > 0 {
            let restart_offset = restart_count
                .checked_add(1)
                .and_then(|n| n.checked_mul(U32_BYTES))
                .and_then(|index_len| block.len().checked_sub(index_len))
                .filter(|&offset| offset < count_offset)
                .ok_or_else(|| {
                    Error::InvalidArgument(format!(
                        "block is corrupt: {restart_count} restart offsets do not fit in {} bytes",
                        block.len()
                    ))
                })?;
            (
                block.slice(..restart_offset),
                block.slice(restart_offset..count_offset),
            )
        } else {
            (Bytes::new(), Bytes::new())
        };

        trace!(
            size = block.len(),
            data_len = data.len(),
            restart_count,
            comparator = comparator.name(),
            "parsed block"
        );

        Ok(Self {
            block,
            data,
            restarts,
            comparator,
        })
    }

    /// Total size of the wrapped buffer, restart index included.
    #[must_use]
    pub fn size(&self) -> usize {
        self.block.len()
    }

    /// Number of restart points in the index.
    #[must_use]
    pub fn restart_count(&self) -> usize {
        self.restarts.len() / U32_BYTES
    }

    /// `true` if the block has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns an independent iterator positioned before the first record.
    #[must_use]
    pub fn iter(&self) -> BlockIterator {
        let mut iter = BlockIterator::new(
            self.data.clone(),
            self.restarts.clone(),
            Arc::clone(&self.comparator),
        );
        iter.seek_to_first();
        iter
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("size", &self.size())
            .field("data_len", &self.data.len())
            .field("restart_count", &self.restart_count())
            .field("comparator", &self.comparator.name())
            .finish()
    }
}
