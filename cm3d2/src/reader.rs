use crate::encoding::Encoding;
use crate::error::ReadError;
use crate::raw::{Raw, STACK_BUFFER};
use crate::serializable::{Serializable, SerializableInstance};
use crate::varint::VarInt32;
use std::io::{self, Read, Seek, SeekFrom};

trait SeekRead: Read + Seek {}

impl<T: Read + Seek + ?Sized> SeekRead for T {}

enum Source<'r> {
    Seekable(&'r mut dyn SeekRead),
    Forward(&'r mut dyn Read),
}

impl Read for Source<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Source::Seekable(s) => s.read(buf),
            Source::Forward(s)  => s.read(buf),
        }
    }
}

/// Where to return to after a peek
#[derive(Clone, Copy)]
struct Mark {
    stream: u64,
    consumed: u64,
}

/// A sequential cursor over a borrowed byte stream. The stream is never closed by the reader; it
/// is handed back to the caller, at whatever position the pass left it, once the reader is
/// dropped. A failed read does not roll the stream back.
pub struct Reader<'r> {
    source: Source<'r>,
    consumed: u64,
}

impl<'r> Reader<'r> {

    /// A reader over a seekable stream. All operations, including peeks, are available.
    pub fn new<S: Read + Seek>(stream: &'r mut S) -> Self {
        Self { source: Source::Seekable(stream), consumed: 0 }
    }

    /// A reader over a stream that can only go forward. Peeking fails with
    /// `ReadError::NotSeekable`, and so does reading an `Omittable`.
    pub fn forward_only<R: Read>(stream: &'r mut R) -> Self {
        Self { source: Source::Forward(stream), consumed: 0 }
    }

    pub fn is_seekable(&self) -> bool {
        matches!(self.source, Source::Seekable(_))
    }

    /// The number of bytes consumed by this reader so far
    pub fn position(&self) -> u64 {
        self.consumed
    }

    /// Returns the next byte without consuming it, or `None` at the end of the stream.
    pub fn peek_byte(&mut self) -> Result<Option<u8>, ReadError> {
        let mark = self.mark()?;
        let mut byte = [0u8];
        let c = loop {
            match self.source.read(&mut byte) {
                Ok(c) => break c,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };
        self.reset(mark)?;
        Ok(if c == 0 { None } else { Some(byte[0]) })
    }

    /// Reads a whole value and moves back to where the read started. Unlike `peek_byte` the end of
    /// the stream is an error here.
    pub fn peek<T: Serializable>(&mut self) -> Result<T, ReadError> {
        let mark = self.mark()?;
        let value = T::read_with(self)?;
        self.reset(mark)?;
        Ok(value)
    }

    pub fn peek_string(&mut self) -> Result<String, ReadError> {
        self.peek_string_with(Encoding::Utf8)
    }

    pub fn peek_string_with(&mut self, encoding: Encoding) -> Result<String, ReadError> {
        let mark = self.mark()?;
        let value = self.read_string_with(encoding)?;
        self.reset(mark)?;
        Ok(value)
    }

    pub fn read<T: Serializable>(&mut self) -> Result<T, ReadError> {
        T::read_with(self)
    }

    /// Always reads a value and wraps it in `Some`. This is not an optional read: use `Omittable`
    /// or `BoolPrefixedNullable` for values which may be missing from the stream.
    pub fn read_some<T: Serializable>(&mut self) -> Result<Option<T>, ReadError> {
        self.read().map(Some)
    }

    /// Reads into an existing instance, for types that need state set up before they can be read.
    pub fn read_into<T: SerializableInstance + ?Sized>(&mut self, target: &mut T) -> Result<(), ReadError> {
        target.read_with(self)
    }

    pub fn read_raw<T: Raw>(&mut self) -> Result<T, ReadError> {
        if T::SIZE <= STACK_BUFFER {
            let mut buf = [0u8; STACK_BUFFER];
            let buf = &mut buf[..T::SIZE];
            self.read_exact_into(buf)?;
            T::read_raw(buf)
        } else {
            let buf = self.read_bytes(T::SIZE)?;
            T::read_raw(&buf)
        }
    }

    /// Reads `count` raw values with a single read of `count * T::SIZE` bytes.
    pub fn read_raw_slice<T: Raw>(&mut self, count: usize) -> Result<Vec<T>, ReadError> {
        if T::SIZE == 0 {
            return (0..count).map(|_| T::read_raw(&[])).collect();
        }
        let len = count.checked_mul(T::SIZE).ok_or(ReadError::Allocation)?;
        let bytes = self.read_bytes(len)?;
        bytes.chunks_exact(T::SIZE).map(T::read_raw).collect()
    }

    /// Reads exactly `len` bytes. The buffer grows with the data actually read, so a corrupt length
    /// runs into `ReadError::Eof` instead of a huge allocation.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, ReadError> {
        let mut buf = Vec::new();
        let c = (&mut self.source).take(len as u64).read_to_end(&mut buf)?;
        self.consumed += c as u64;
        if c == len {
            Ok(buf)
        } else {
            Err(ReadError::Eof)
        }
    }

    pub fn read_string(&mut self) -> Result<String, ReadError> {
        self.read_string_with(Encoding::Utf8)
    }

    /// Reads a 7-bit encoded byte length followed by that many bytes of text.
    pub fn read_string_with(&mut self, encoding: Encoding) -> Result<String, ReadError> {
        let VarInt32(len) = self.read()?;
        let len = usize::try_from(len).map_err(|_| ReadError::NegativeLength(len))?;
        let bytes = self.read_bytes(len)?;
        encoding.decode(bytes)
    }

    /// Reads a string and fails with `ReadError::Signature` unless it equals `expected`.
    pub fn read_signature(&mut self, expected: &str) -> Result<(), ReadError> {
        let found = self.read_string()?;
        if found == expected {
            Ok(())
        } else {
            Err(ReadError::Signature { expected: expected.to_owned(), found })
        }
    }

    /// The absolute position of the underlying stream, which differs from `position` when the
    /// reader was created on a stream that was not at its start.
    pub fn stream_position(&mut self) -> Result<u64, ReadError> {
        match &mut self.source {
            Source::Seekable(s) => Ok(s.stream_position()?),
            Source::Forward(_)  => Err(ReadError::NotSeekable),
        }
    }

    /// Logs `note` with the absolute stream position, or with the consumed byte count if the
    /// stream cannot tell its position.
    pub fn debug_log(&mut self, note: &str) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        match self.stream_position() {
            Ok(at) => log::debug!("{} at stream position 0x{:08X}", note, at),
            Err(_) => log::debug!("{} after 0x{:08X} bytes consumed", note, self.consumed),
        }
    }

    fn read_exact_into(&mut self, buf: &mut [u8]) -> Result<(), ReadError> {
        self.source.read_exact(buf)?;
        self.consumed += buf.len() as u64;
        Ok(())
    }

    fn mark(&mut self) -> Result<Mark, ReadError> {
        Ok(Mark { stream: self.stream_position()?, consumed: self.consumed })
    }

    fn reset(&mut self, mark: Mark) -> Result<(), ReadError> {
        if let Source::Seekable(s) = &mut self.source {
            s.seek(SeekFrom::Start(mark.stream))?;
        }
        log::trace!("peeked {} bytes", self.consumed - mark.consumed);
        self.consumed = mark.consumed;
        Ok(())
    }

}
