use std::fmt::{Display, Formatter, self};
use std::io;

/// A `ReadError` together with the reader position at which it occurred.
#[derive(Debug)]
pub struct ReaderError {
    inner: ReadError,
    at: u64,
}

impl ReaderError {
    pub fn into_inner(self) -> ReadError {
        self.inner
    }

    pub fn inner(&self) -> &ReadError {
        &self.inner
    }

    /// Number of bytes the reader had consumed when the pass failed.
    pub fn position(&self) -> u64 {
        self.at
    }
}

impl std::error::Error for ReaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
       Some(&self.inner)
    }
}

impl Display for ReaderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{} at input position {}", self.inner, self.at)
    }
}

#[derive(Debug)]
pub enum ReadError {
    /// The stream ended before the value was complete
    Eof,
    Io(io::Error),
    /// A 7-bit encoded Int32 had more than five groups
    VarIntOverflow,
    Signature { expected: String, found: String },
    Format(String),
    Utf8(std::str::Utf8Error),
    /// Bytes that are not valid in the named encoding
    Encoding(&'static str),
    /// An integer read for an enum that has no variant with that value
    Discriminant { ty: &'static str, value: i64 },
    NegativeLength(i32),
    NotSeekable,
    UndefinedLength { collection: &'static str, element: &'static str },
    Allocation,
}

impl ReadError {
    pub fn at(self, at: u64) -> ReaderError {
        ReaderError { inner: self, at }
    }
}

impl From<io::Error> for ReadError {
    fn from(e: io::Error) -> ReadError {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => ReadError::Eof,
            _ => ReadError::Io(e),
        }
    }
}

impl From<std::str::Utf8Error> for ReadError {
    fn from(e: std::str::Utf8Error) -> ReadError {
        ReadError::Utf8(e)
    }
}

impl From<std::string::FromUtf8Error> for ReadError {
    fn from(e: std::string::FromUtf8Error) -> ReadError {
        ReadError::Utf8(e.utf8_error())
    }
}

impl From<std::collections::TryReserveError> for ReadError {
    fn from(_e: std::collections::TryReserveError) -> ReadError {
        ReadError::Allocation
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReadError::Io(e) => Some(e),
            ReadError::Utf8(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for ReadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            ReadError::Eof => f.write_str("Unexpected end of stream while reading"),
            ReadError::Io(e) => write!(f, "IO error {}", e),
            ReadError::VarIntOverflow => f.write_str("Too many bytes in what should have been a 7 bit encoded Int32"),
            ReadError::Signature { expected, found } => write!(f, "Expected signature \"{}\" but instead found \"{}\"", expected, found),
            ReadError::Format(msg) => f.write_str(msg),
            ReadError::Utf8(e) => write!(f, "String was not valid Utf-8: {}", e),
            ReadError::Encoding(name) => write!(f, "String was not valid {}", name),
            ReadError::Discriminant { ty, value } => write!(f, "Value {} is not a variant of {}", value, ty),
            ReadError::NegativeLength(value) => write!(f, "Length {} is negative", value),
            ReadError::NotSeekable => f.write_str("Cannot peek because the stream does not support seeking"),
            ReadError::UndefinedLength { collection, element } => write!(f, "The length of {}<{}> was never set", collection, element),
            ReadError::Allocation => f.write_str("An allocation failed"),
        }
    }
}

/// A `WriteError` together with the writer position at which it occurred.
#[derive(Debug)]
pub struct WriterError {
    inner: WriteError,
    at: u64,
}

impl WriterError {
    pub fn into_inner(self) -> WriteError {
        self.inner
    }

    pub fn inner(&self) -> &WriteError {
        &self.inner
    }

    /// Number of bytes the writer had emitted when the pass failed.
    pub fn position(&self) -> u64 {
        self.at
    }
}

impl std::error::Error for WriterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
       Some(&self.inner)
    }
}

impl Display for WriterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{} at output position {}", self.inner, self.at)
    }
}

#[derive(Debug)]
pub enum WriteError {
    Io(io::Error),
    /// `Writer::write_some` was handed `None`
    Absent,
    /// A collection or string is too long for its 32 bit length field
    Length(usize),
    UndefinedLength { collection: &'static str },
    LengthMismatch(LengthError),
    /// The string contains characters the named encoding cannot represent
    Encoding(&'static str),
    Format(String),
}

impl WriteError {
    pub fn at(self, at: u64) -> WriterError {
        WriterError { inner: self, at }
    }
}

impl From<io::Error> for WriteError {
    fn from(e: io::Error) -> WriteError {
        WriteError::Io(e)
    }
}

impl From<LengthError> for WriteError {
    fn from(e: LengthError) -> WriteError {
        WriteError::LengthMismatch(e)
    }
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WriteError::Io(e) => Some(e),
            WriteError::LengthMismatch(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for WriteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            WriteError::Io(e) => write!(f, "IO error {}", e),
            WriteError::Absent => f.write_str("Cannot write a value that is not present"),
            WriteError::Length(value) => write!(f, "Length {} exceeds maximum {}", value, i32::MAX),
            WriteError::UndefinedLength { collection } => write!(f, "The length of {} has changed since the last validation, or was never validated", collection),
            WriteError::LengthMismatch(e) => Display::fmt(e, f),
            WriteError::Encoding(name) => write!(f, "String cannot be represented in {}", name),
            WriteError::Format(msg) => f.write_str(msg),
        }
    }
}

/// Raised by `LengthDefined::validate_length` when a collection does not have the length its
/// governing field declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthError {
    pub collection: String,
    pub definition: String,
    pub expected: usize,
    pub actual: usize,
}

impl std::error::Error for LengthError {}

impl Display for LengthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}.len() must be equal to {} ({}) but is {}", self.collection, self.definition, self.expected, self.actual)
    }
}

/// An index outside of the addressable range of a `HugeArray`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexError {
    pub index: i64,
    pub len: i64,
}

impl std::error::Error for IndexError {}

impl Display for IndexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Index {} is out of range for length {}", self.index, self.len)
    }
}

/// A `HugeArray` length outside of `0..=MAX_LEN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityError {
    pub len: i64,
    pub max: i64,
}

impl std::error::Error for CapacityError {}

impl Display for CapacityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Length {} is outside of the capacity of a HugeArray (0 to {})", self.len, self.max)
    }
}
