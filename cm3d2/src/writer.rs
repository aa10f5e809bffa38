use crate::encoding::Encoding;
use crate::error::WriteError;
use crate::raw::{Raw, STACK_BUFFER};
use crate::serializable::{Serializable, SerializableInstance};
use crate::varint::VarInt32;
use std::io::Write;

/// A sequential cursor over a borrowed byte sink. The sink is never closed by the writer, and a
/// failed write does not undo the bytes that were already emitted.
pub struct Writer<'w> {
    sink: &'w mut dyn Write,
    emitted: u64,
}

impl<'w> Writer<'w> {

    pub fn new<W: Write>(sink: &'w mut W) -> Self {
        Self { sink, emitted: 0 }
    }

    /// The number of bytes emitted by this writer so far
    pub fn position(&self) -> u64 {
        self.emitted
    }

    pub fn write<T: Serializable>(&mut self, value: &T) -> Result<(), WriteError> {
        value.write_with(self)
    }

    /// Writes the value if there is one and fails with `WriteError::Absent` otherwise. Values which
    /// may legitimately be missing belong in an `Omittable` or a `BoolPrefixedNullable`.
    pub fn write_some<T: Serializable>(&mut self, value: Option<&T>) -> Result<(), WriteError> {
        match value {
            Some(value) => self.write(value),
            None        => Err(WriteError::Absent),
        }
    }

    /// Writes a value whose write consumes per-pass state, like the armed length of a length-defined
    /// collection.
    pub fn write_instance<T: SerializableInstance + ?Sized>(&mut self, value: &mut T) -> Result<(), WriteError> {
        value.write_with(self)
    }

    pub fn write_raw<T: Raw>(&mut self, value: &T) -> Result<(), WriteError> {
        if T::SIZE <= STACK_BUFFER {
            let mut buf = [0u8; STACK_BUFFER];
            let buf = &mut buf[..T::SIZE];
            value.write_raw(buf);
            self.write_bytes(buf)
        } else {
            let mut buf = vec![0u8; T::SIZE];
            value.write_raw(&mut buf);
            self.write_bytes(&buf)
        }
    }

    /// Writes all values with a single write of `values.len() * T::SIZE` bytes.
    pub fn write_raw_slice<T: Raw>(&mut self, values: &[T]) -> Result<(), WriteError> {
        if T::SIZE == 0 || values.is_empty() {
            return Ok(());
        }
        let len = values.len().checked_mul(T::SIZE).ok_or(WriteError::Length(values.len()))?;
        let mut buf = vec![0u8; len];
        for (chunk, value) in buf.chunks_exact_mut(T::SIZE).zip(values) {
            value.write_raw(chunk);
        }
        self.write_bytes(&buf)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), WriteError> {
        self.sink.write_all(bytes)?;
        self.emitted += bytes.len() as u64;
        Ok(())
    }

    pub fn write_string(&mut self, s: &str) -> Result<(), WriteError> {
        self.write_string_with(s, Encoding::Utf8)
    }

    /// Writes the encoded byte length as a 7-bit encoded Int32, followed by the encoded bytes.
    pub fn write_string_with(&mut self, s: &str, encoding: Encoding) -> Result<(), WriteError> {
        let bytes = encoding.encode(s)?;
        let len = i32::try_from(bytes.len()).map_err(|_| WriteError::Length(bytes.len()))?;
        self.write(&VarInt32(len))?;
        self.write_bytes(&bytes)
    }

    /// Writes the count of a length-prefixed collection.
    pub(crate) fn write_count(&mut self, count: usize) -> Result<(), WriteError> {
        let count = i32::try_from(count).map_err(|_| WriteError::Length(count))?;
        self.write(&count)
    }

    pub fn flush(&mut self) -> Result<(), WriteError> {
        Ok(self.sink.flush()?)
    }

    /// Logs `note` with the number of bytes emitted so far. The sink cannot tell its own
    /// position, so this is relative to where the writer started.
    pub fn debug_log(&self, note: &str) {
        log::debug!("{} after 0x{:08X} bytes written", note, self.emitted);
    }

}
