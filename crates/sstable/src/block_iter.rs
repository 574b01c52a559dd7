use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use bytes::Bytes;
use dbformat::{Comparator, Error, Result};
use iterator::SeekingIterator;
use tracing::warn;

use crate::coding::{get_fixed32, get_varint, U32_BYTES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unpositioned,
    Positioned,
    Exhausted,
}

/// A record decoded from the data region.
struct Record {
    key: Vec<u8>,
    value: Range<usize>,
    /// Offset of the record that follows.
    next: usize,
}

/// Seeking iterator over the records of one [`Block`](crate::Block).
///
/// The iterator owns only cheap handles on the block's data and restart
/// regions plus its own cursor: `offset` of the next record to decode and
/// `key`, the full key of the record before it, which is the source of the
/// next record's shared prefix. Iterators over the same block never share
/// mutable state.
///
/// Any length field that would read past the data region yields
/// [`Error::Corruption`] and exhausts the iterator.
pub struct BlockIterator {
    data: Bytes,
    restarts: Bytes,
    comparator: Arc<dyn Comparator>,
    state: State,
    offset: usize,
    key: Vec<u8>,
}

impl BlockIterator {
    /// Creates an unpositioned iterator. [`Block::iter`](crate::Block::iter)
    /// is the usual entry point.
    pub fn new(data: Bytes, restarts: Bytes, comparator: Arc<dyn Comparator>) -> Self {
        Self {
            data,
            restarts,
            comparator,
            state: State::Unpositioned,
            offset: 0,
            key: Vec::new(),
        }
    }

    fn restart_count(&self) -> usize {
        self.restarts.len() / U32_BYTES
    }

    fn restart_point(&self, index: usize) -> Result<usize> {
        let offset = get_fixed32(&self.restarts, index * U32_BYTES)? as usize;
        if offset >= self.data.len() {
            return Err(Error::Corruption(format!(
                "restart point {index} at offset {offset} is outside data region of {} bytes",
                self.data.len()
            )));
        }
        Ok(offset)
    }

    /// Decodes the record at `offset`, taking its shared prefix from `prev_key`.
    fn decode_record(&self, offset: usize, prev_key: &[u8]) -> Result<Record> {
        let mut input = self.data.get(offset..).unwrap_or_default();
        let remaining = input.len();
        let shared = get_varint(&mut input)?;
        let unshared = get_varint(&mut input)?;
        let value_len = get_varint(&mut input)?;
        let key_start = offset + (remaining - input.len());

        let shared = usize::try_from(shared)
            .ok()
            .filter(|&s| s <= prev_key.len())
            .ok_or_else(|| {
                Error::Corruption(format!(
                    "record at offset {offset} shares {shared} bytes with a {} byte key",
                    prev_key.len()
                ))
            })?;

        let key_end = checked_end(key_start, unshared, self.data.len(), offset, "key")?;
        let value_end = checked_end(key_end, value_len, self.data.len(), offset, "value")?;

        let mut key = Vec::with_capacity(shared + (key_end - key_start));
        key.extend_from_slice(&prev_key[..shared]);
        key.extend_from_slice(&self.data[key_start..key_end]);

        Ok(Record {
            key,
            value: key_end..value_end,
            next: value_end,
        })
    }

    /// Full key stored at restart point `index`.
    fn restart_key(&self, index: usize) -> Result<Vec<u8>> {
        let offset = self.restart_point(index)?;
        // Restart records carry no shared prefix, so an empty previous key
        // decodes them; a non-zero prefix length surfaces as corruption.
        Ok(self.decode_record(offset, &[])?.key)
    }

    /// Greatest restart point whose key is strictly less than `target`, or
    /// `None` if every restart key is `>= target`.
    ///
    /// Restart points are sparse, so this only narrows the region; equal keys
    /// are resolved by the forward scan.
    fn find_restart(&self, target: &[u8]) -> Result<Option<usize>> {
        let mut left = 0;
        let mut right = self.restart_count() - 1;
        while left < right {
            let mid = (left + right + 1) / 2;
            let key = self.restart_key(mid)?;
            if self.comparator.compare(&key, target) == Ordering::Less {
                left = mid;
            } else {
                right = mid - 1;
            }
        }
        if left == 0 && self.comparator.compare(&self.restart_key(0)?, target) != Ordering::Less {
            return Ok(None);
        }
        Ok(Some(left))
    }

    fn scan_to(&mut self, target: &[u8]) -> Result<()> {
        // With no restart key below the target, the scan starts at the top of
        // the data region rather than at the first restart point.
        self.offset = match self.find_restart(target)? {
            Some(restart) => self.restart_point(restart)?,
            None => 0,
        };
        self.key.clear();
        self.state = State::Positioned;

        while self.offset < self.data.len() {
            let record = self.decode_record(self.offset, &self.key)?;
            if self.comparator.compare(&record.key, target) != Ordering::Less {
                // Leave the cursor in front of this record.
                return Ok(());
            }
            self.offset = record.next;
            self.key = record.key;
        }
        self.state = State::Exhausted;
        Ok(())
    }

    fn fail(&mut self, err: Error) -> Error {
        warn!(offset = self.offset, error = %err, "block iterator hit corrupt data");
        self.state = State::Exhausted;
        err
    }
}

fn checked_end(start: usize, len: u64, limit: usize, offset: usize, what: &str) -> Result<usize> {
    usize::try_from(len)
        .ok()
        .and_then(|len| start.checked_add(len))
        .filter(|&end| end <= limit)
        .ok_or_else(|| {
            Error::Corruption(format!(
                "record at offset {offset}: {what} length {len} overruns data region of {limit} bytes"
            ))
        })
}

impl SeekingIterator for BlockIterator {
    type Key = [u8];

    fn seek_to_first(&mut self) {
        self.offset = 0;
        self.key.clear();
        self.state = if self.data.is_empty() {
            State::Exhausted
        } else {
            State::Positioned
        };
    }

    fn seek(&mut self, target: &[u8]) -> Result<()> {
        if self.data.is_empty() || self.restart_count() == 0 {
            self.state = State::Exhausted;
            return Ok(());
        }
        self.scan_to(target).map_err(|e| self.fail(e))
    }

    fn has_next(&self) -> bool {
        self.state == State::Positioned && self.offset < self.data.len()
    }

    fn next_entry(&mut self) -> Result<(Vec<u8>, Bytes)> {
        if !self.has_next() {
            return Err(Error::NoSuchElement);
        }
        let record = match self.decode_record(self.offset, &self.key) {
            Ok(record) => record,
            Err(e) => return Err(self.fail(e)),
        };
        self.offset = record.next;
        self.key.clone_from(&record.key);
        if self.offset >= self.data.len() {
            self.state = State::Exhausted;
        }
        Ok((record.key, self.data.slice(record.value)))
    }
}

impl fmt::Debug for BlockIterator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockIterator")
            .field("state", &self.state)
            .field("offset", &self.offset)
            .field("data_len", &self.data.len())
            .field("restart_count", &self.restart_count())
            .finish()
    }
}
