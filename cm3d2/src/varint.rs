//! A 7-bit encoded Int32 stores a signed 32 bit integer, reinterpreted as unsigned, in groups of
//! seven bits, least significant group first. The high bit of every byte is set if another group
//! follows. Since 32 bits never need more than five groups, a sixth group means the stream is
//! corrupt. Strings use this encoding for their length prefix.

use crate::error::{ReadError, WriteError};
use crate::reader::Reader;
use crate::serializable::Serializable;
use crate::writer::Writer;

/// The maximum number of bytes a 7-bit encoded Int32 occupies
pub const MAX_GROUPS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VarInt32(pub i32);

impl From<i32> for VarInt32 {
    fn from(value: i32) -> Self {
        VarInt32(value)
    }
}

impl From<VarInt32> for i32 {
    fn from(value: VarInt32) -> Self {
        value.0
    }
}

/// Encodes `value` into `buf` and returns the number of used bytes.
pub fn encode(value: i32, buf: &mut [u8; MAX_GROUPS]) -> usize {
    let mut v = value as u32;
    let mut c = 0;
    while v >= 0x80 {
        buf[c] = (v as u8) | 0x80;
        v >>= 7;
        c += 1;
    }
    buf[c] = v as u8;
    c + 1
}

/// The number of bytes `encode` uses for `value`, between 1 and `MAX_GROUPS`.
pub fn encoded_len(value: i32) -> usize {
    let bits = 32 - (value as u32).leading_zeros() as usize;
    (bits.max(1) + 6) / 7
}

/// Returns the decoded value and the number of consumed bytes
pub fn decode<B: ?Sized + AsRef<[u8]>>(buf: &B) -> Result<(i32, usize), ReadError> {
    let mut value = 0u32;
    for (c, byte) in buf.as_ref().iter().enumerate() {
        if c == MAX_GROUPS {
            return Err(ReadError::VarIntOverflow);
        }
        value |= ((byte & 0x7f) as u32) << (7 * c);
        if byte & 0x80 == 0 {
            return Ok((value as i32, c + 1));
        }
    }
    Err(ReadError::Eof)
}

impl Serializable for VarInt32 {
    /// Reads one byte at a time, so nothing after the last group is consumed.
    fn read_with(reader: &mut Reader<'_>) -> Result<Self, ReadError> {
        let mut buf = [0u8; MAX_GROUPS];
        for c in 0..MAX_GROUPS {
            buf[c] = reader.read()?;
            if buf[c] & 0x80 == 0 {
                let (value, _) = decode(&buf[..=c])?;
                return Ok(VarInt32(value));
            }
        }
        Err(ReadError::VarIntOverflow)
    }

    fn write_with(&self, writer: &mut Writer<'_>) -> Result<(), WriteError> {
        let mut buf = [0u8; MAX_GROUPS];
        let c = encode(self.0, &mut buf);
        writer.write_bytes(&buf[..c])
    }
}
