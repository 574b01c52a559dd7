//! Integer codecs used by the block format.
//!
//! Record length fields are unsigned LEB128 varints (LevelDB `varint32`
//! compatible). Restart offsets and the restart count are fixed 32-bit
//! little-endian words.

use byteorder::{ByteOrder, LittleEndian};
use dbformat::{Error, Result};

/// Width of a restart offset and of the trailing restart count.
pub const U32_BYTES: usize = 4;

/// Appends `v` as an unsigned LEB128 varint.
///
/// # Errors
///
/// [`Error::InvalidArgument`] if the encoder reports a write failure.
pub fn put_varint(dst: &mut Vec<u8>, v: u64) -> Result<()> {
    leb128::write::unsigned(dst, v)
        .map(|_| ())
        .map_err(|e| Error::InvalidArgument(format!("cannot encode varint {v}: {e}")))
}

/// Reads an unsigned varint from the front of `input`, advancing it.
///
/// # Errors
///
/// [`Error::Corruption`] if the varint is truncated or does not fit in 64
/// bits.
pub fn get_varint(input: &mut &[u8]) -> Result<u64> {
    leb128::read::unsigned(input).map_err(|e| match e {
        leb128::read::Error::IoError(_) => Error::Corruption("truncated varint".into()),
        leb128::read::Error::Overflow => Error::Corruption("varint overflows u64".into()),
    })
}

/// Appends `v` as a fixed 32-bit little-endian word.
pub fn put_fixed32(dst: &mut Vec<u8>, v: u32) {
    let mut buf = [0u8; U32_BYTES];
    LittleEndian::write_u32(&mut buf, v);
    dst.extend_from_slice(&buf);
}

/// Reads a fixed 32-bit little-endian word at `offset`.
///
/// # Errors
///
/// [`Error::Corruption`] if fewer than four bytes remain at `offset`.
pub fn get_fixed32(src: &[u8], offset: usize) -> Result<u32> {
    let end = offset
        .checked_add(U32_BYTES)
        .filter(|&end| end <= src.len())
        .ok_or_else(|| {
            Error::Corruption(format!(
                "fixed32 at offset {offset} overruns buffer of {} bytes",
                src.len()
            ))
        })?;
    Ok(LittleEndian::read_u32(&src[offset..end]))
}
