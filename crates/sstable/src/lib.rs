//! # SSTable - Sorted Data Blocks
//!
//! The on-disk block codec of the storage layer and the iterators that read
//! it.
//!
//! A table is a sequence of immutable data blocks. Loading a block from a
//! file (and decompressing it) happens elsewhere; this crate starts from an
//! already resident byte buffer.
//!
//! ## Block layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ DATA REGION                                                      │
//! │                                                                  │
//! │ shared_len (varint) | unshared_len (varint) | value_len (varint) │
//! │ unshared key bytes | value bytes                                 │
//! │                                                                  │
//! │ ... repeated, sorted by key ...                                  │
//! ├──────────────────────────────────────────────────────────────────┤
//! │ RESTART INDEX                                                    │
//! │                                                                  │
//! │ restart_offset (u32 LE) ... | restart_count (u32 LE)             │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A record's full key is the first `shared_len` bytes of the previous
//! record's key followed by its unshared bytes. Records at restart offsets
//! always have `shared_len == 0`, so a seek can binary search the restart
//! index and then scan forward from a restart point.
//!
//! Varints are unsigned LEB128; fixed-width integers are little-endian.
//!
//! ## Reading internal keys
//!
//! Blocks are keyed by raw bytes. When the stored keys are encoded
//! [`dbformat::InternalKey`]s, wrap the block iterator in an
//! [`InternalTableIterator`] and open the block with a
//! [`dbformat::InternalKeyComparator`].

mod block;
mod block_iter;
mod builder;
pub mod coding;
mod internal;

pub use block::Block;
pub use block_iter::BlockIterator;
pub use builder::BlockBuilder;
pub use internal::InternalTableIterator;

#[cfg(test)]
mod tests;
