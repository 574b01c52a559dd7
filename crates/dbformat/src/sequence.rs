//! Packing of a sequence number and a [`ValueType`] into one 64-bit tag.
//!
//! ```text
//! [sequence: 56 bits][value_type: 8 bits]
//! ```

use std::fmt;

use crate::error::{Error, Result};

/// Largest sequence number that fits in the 56-bit tag field.
pub const MAX_SEQUENCE_NUMBER: u64 = (1 << 56) - 1;

/// Width of the packed tag suffix of an encoded internal key.
pub const TAG_BYTES: usize = 8;

/// Distinguishes puts from deletes.
///
/// A delete does not remove anything; it writes a tombstone that shadows
/// older versions of the same user key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ValueType {
    /// A deletion tombstone.
    Deletion = 0x00,
    /// A live value.
    Value = 0x01,
}

impl ValueType {
    /// The byte stored in the low 8 bits of the tag.
    #[must_use]
    pub fn persistent_id(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ValueType {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self> {
        match id {
            0x00 => Ok(ValueType::Deletion),
            0x01 => Ok(ValueType::Value),
            other => Err(Error::InvalidArgument(format!(
                "unknown value type {other:#04x}"
            ))),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Deletion => f.write_str("DELETION"),
            ValueType::Value => f.write_str("VALUE"),
        }
    }
}

/// Packs `sequence` and `value_type` into a tag.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `sequence` does not fit in 56 bits.
pub fn pack_sequence_and_type(sequence: u64, value_type: ValueType) -> Result<u64> {
    if sequence > MAX_SEQUENCE_NUMBER {
        return Err(Error::InvalidArgument(format!(
            "sequence number {sequence} exceeds maximum {MAX_SEQUENCE_NUMBER}"
        )));
    }
    Ok(tag_of(sequence, value_type))
}

/// Shift-and-or behind every tag. Callers bound `sequence` to 56 bits.
pub(crate) const fn tag_of(sequence: u64, value_type: ValueType) -> u64 {
    (sequence << 8) | value_type as u64
}

/// Extracts the sequence number from a tag. Total over all inputs.
#[must_use]
pub fn unpack_sequence_number(tag: u64) -> u64 {
    tag >> 8
}

/// Extracts the value type from a tag.
///
/// # Errors
///
/// A tag produced by [`pack_sequence_and_type`] always unpacks. A low byte
/// that names no [`ValueType`] can only come from foreign or damaged bytes
/// and yields [`Error::Corruption`].
pub fn unpack_value_type(tag: u64) -> Result<ValueType> {
    let id = (tag & 0xff) as u8;
    ValueType::try_from(id)
        .map_err(|_| Error::Corruption(format!("tag {tag:#018x} has unknown value type {id:#04x}")))
}
