use std::cmp::Ordering;
use std::fmt;

use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;

use crate::error::{Error, Result};
use crate::sequence::{
    tag_of, unpack_sequence_number, unpack_value_type, ValueType, MAX_SEQUENCE_NUMBER, TAG_BYTES,
};

/// A user key stamped with a sequence number and a [`ValueType`].
///
/// Immutable once built. The user key is held as [`Bytes`], so clones and
/// keys decoded with [`InternalKey::decode_bytes`] share the underlying
/// buffer instead of copying it.
///
/// Equality and hashing are structural over all three fields. Ordering is
/// `user_key` ascending (bytewise), then `sequence` descending, then
/// `value_type` descending: the newest version of a user key sorts first.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct InternalKey {
    user_key: Bytes,
    sequence: u64,
    value_type: ValueType,
}

impl InternalKey {
    /// Builds an internal key from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `sequence` is larger than
    /// [`MAX_SEQUENCE_NUMBER`]. A sequence number is never clamped.
    pub fn new(user_key: impl Into<Bytes>, sequence: u64, value_type: ValueType) -> Result<Self> {
        if sequence > MAX_SEQUENCE_NUMBER {
            return Err(Error::InvalidArgument(format!(
                "sequence number {sequence} exceeds maximum {MAX_SEQUENCE_NUMBER}"
            )));
        }
        Ok(Self {
            user_key: user_key.into(),
            sequence,
            value_type,
        })
    }

    /// Decodes an encoded internal key, copying the user key out of `data`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `data` is shorter than the 8-byte tag,
    /// [`Error::Corruption`] if the tag names an unknown value type.
    pub fn decode(data: &[u8]) -> Result<Self> {
        Self::check_encoded_len(data.len())?;
        Self::decode_bytes(Bytes::copy_from_slice(data))
    }

    /// Decodes an encoded internal key without copying: the user key is a
    /// slice of `data`.
    ///
    /// # Errors
    ///
    /// Same as [`InternalKey::decode`].
    pub fn decode_bytes(data: Bytes) -> Result<Self> {
        Self::check_encoded_len(data.len())?;
        let split = data.len() - TAG_BYTES;
        let tag = BigEndian::read_u64(&data[split..]);
        Ok(Self {
            user_key: data.slice(..split),
            sequence: unpack_sequence_number(tag),
            value_type: unpack_value_type(tag)?,
        })
    }

    fn check_encoded_len(len: usize) -> Result<()> {
        if len < TAG_BYTES {
            return Err(Error::InvalidArgument(format!(
                "encoded internal key must be at least {TAG_BYTES} bytes, got {len}"
            )));
        }
        Ok(())
    }

    /// Serializes to `user_key || tag` where tag is a big-endian u64.
    ///
    /// Always exactly `user_key().len() + 8` bytes.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut buf = vec![0u8; self.user_key.len() + TAG_BYTES];
        buf[..self.user_key.len()].copy_from_slice(&self.user_key);
        BigEndian::write_u64(&mut buf[self.user_key.len()..], self.tag());
        buf.into()
    }

    /// The packed `(sequence << 8) | value_type` word.
    #[must_use]
    pub fn tag(&self) -> u64 {
        // `new` and `decode_bytes` both bound the sequence to 56 bits.
        tag_of(self.sequence, self.value_type)
    }

    #[must_use]
    pub fn user_key(&self) -> &Bytes {
        &self.user_key
    }

    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    #[must_use]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Length of [`InternalKey::encode`] without building it.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        self.user_key.len() + TAG_BYTES
    }
}

impl Ord for InternalKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.user_key
            .cmp(&other.user_key)
            .then_with(|| other.sequence.cmp(&self.sequence))
            .then_with(|| other.value_type.cmp(&self.value_type))
    }
}

impl PartialOrd for InternalKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// User keys may carry user data; diagnostics only show their length.
struct Redacted(usize);

impl fmt::Debug for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} bytes>", self.0)
    }
}

impl fmt::Debug for InternalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternalKey")
            .field("user_key", &Redacted(self.user_key.len()))
            .field("sequence", &self.sequence)
            .field("value_type", &self.value_type)
            .finish()
    }
}

impl fmt::Display for InternalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} bytes>@{}:{}",
            self.user_key.len(),
            self.sequence,
            self.value_type
        )
    }
}

