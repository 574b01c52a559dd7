//! # dbformat - Internal Key Format
//!
//! The key model shared by every sorted container in the storage layer.
//!
//! A user key is never stored alone. Each write is stamped with a
//! monotonically increasing **sequence number** and a [`ValueType`]
//! (live value or tombstone), and the triple is flattened into a single
//! sortable byte string, the *internal key*:
//!
//! ```text
//! ┌──────────────────────────┬─────────────────────────────────────┐
//! │ user_key (variable)      │ tag: u64 BE = sequence << 8 | type   │
//! └──────────────────────────┴─────────────────────────────────────┘
//! ```
//!
//! The sequence number occupies the upper 56 bits of the tag, so for a fixed
//! user key the tag grows with the sequence number. [`InternalKeyComparator`]
//! orders the tag **descending**, which puts the newest version of a key
//! first. That is what snapshot reads and compaction rely on.
//!
//! ## Module Responsibilities
//!
//! | Module         | Purpose                                            |
//! |----------------|----------------------------------------------------|
//! | [`sequence`]   | pack / unpack of `(sequence, type)` into a tag     |
//! | [`key`]        | [`InternalKey`] value type, encode / decode        |
//! | [`comparator`] | byte-string orderings threaded into blocks         |
//! | [`error`]      | [`Error`] taxonomy for the whole storage layer     |

pub mod comparator;
pub mod error;
pub mod key;
pub mod sequence;

pub use comparator::{BytewiseComparator, Comparator, InternalKeyComparator};
pub use error::{Error, Result};
pub use key::InternalKey;
pub use sequence::{
    pack_sequence_and_type, unpack_sequence_number, unpack_value_type, ValueType,
    MAX_SEQUENCE_NUMBER, TAG_BYTES,
};

#[cfg(test)]
mod tests;
