use std::cmp::Ordering;
use std::sync::Arc;

use bytes::Bytes;
use dbformat::{Comparator, Error, Result};

use crate::coding::{put_fixed32, put_varint, U32_BYTES};

/// Serializes sorted key/value pairs into the layout [`Block`](crate::Block)
/// reads.
///
/// Each record is written as
///
/// ```text
/// shared_len varint | unshared_len varint | value_len varint | unshared key bytes | value
/// ```
///
/// where `shared_len` is the length of the prefix shared with the previous
/// key. Every `restart_interval` records the prefix compression restarts:
/// the full key is written (`shared_len = 0`) and the record's offset is
/// appended to the restart index.
pub struct BlockBuilder {
    buffer: Vec<u8>,
    restarts: Vec<u32>,
    restart_interval: usize,
    /// Records written since the last restart point.
    counter: usize,
    entries: usize,
    last_key: Vec<u8>,
    comparator: Arc<dyn Comparator>,
}

impl BlockBuilder {
    /// Creates an empty builder. A `restart_interval` of 0 is treated as 1.
    pub fn new(restart_interval: usize, comparator: Arc<dyn Comparator>) -> Self {
        Self {
            buffer: Vec::new(),
            restarts: vec![0],
            restart_interval: restart_interval.max(1),
            counter: 0,
            entries: 0,
            last_key: Vec::new(),
            comparator,
        }
    }

    /// Appends a record.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `key` does not sort strictly after the
    /// previously added key, or the block would outgrow the 32-bit restart
    /// offsets.
    pub fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        if self.entries > 0 && self.comparator.compare(key, &self.last_key) != Ordering::Greater {
            return Err(Error::InvalidArgument(format!(
                "keys must be added in strictly increasing order under {}",
                self.comparator.name()
            )));
        }

        let shared = if self.counter < self.restart_interval {
            shared_prefix_len(&self.last_key, key)
        } else {
            let offset = u32::try_from(self.buffer.len()).map_err(|_| {
                Error::InvalidArgument("block data exceeds 4 GiB restart offset range".into())
            })?;
            self.restarts.push(offset);
            self.counter = 0;
            0
        };
        let unshared = &key[shared..];

        put_varint(&mut self.buffer, shared as u64)?;
        put_varint(&mut self.buffer, unshared.len() as u64)?;
        put_varint(&mut self.buffer, value.len() as u64)?;
        self.buffer.extend_from_slice(unshared);
        self.buffer.extend_from_slice(value);

        self.last_key.truncate(shared);
        self.last_key.extend_from_slice(unshared);
        self.counter += 1;
        self.entries += 1;
        Ok(())
    }

    /// Size of the block [`finish`](BlockBuilder::finish) would return now.
    #[must_use]
    pub fn estimated_size(&self) -> usize {
        self.buffer.len() + self.restarts.len() * U32_BYTES + U32_BYTES
    }

    /// Number of records added.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Appends the restart index and returns the finished block.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the restart count does not fit the
    /// 32-bit trailer.
    pub fn finish(self) -> Result<Bytes> {
        let count = u32::try_from(self.restarts.len()).map_err(|_| {
            Error::InvalidArgument(format!(
                "{} restart points exceed the 32-bit restart count",
                self.restarts.len()
            ))
        })?;
        let mut block = self.buffer;
        block.reserve((self.restarts.len() + 1) * U32_BYTES);
        for restart in &self.restarts {
            put_fixed32(&mut block, *restart);
        }
        put_fixed32(&mut block, count);
        Ok(block.into())
    }
}

fn shared_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
