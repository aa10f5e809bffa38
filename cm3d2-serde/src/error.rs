use std;
use std::fmt::{self, Display};
use serde::{de, ser};
use cm3d2::{ReadError, WriteError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub struct DeserializationError {
    inner: Error,
    at: u64,
}

impl DeserializationError {
    pub fn into_inner(self) -> Error {
        self.inner
    }

    pub fn position(&self) -> u64 {
        self.at
    }
}

impl std::error::Error for DeserializationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.inner)
    }
}

impl Display for DeserializationError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{} at input position {}", self.inner, self.at)
    }
}

#[derive(Debug)]
pub enum Error {
    // Decode
    Read(ReadError),
    Trailing,
    NotSelfDescribing,
    Char(String),
    Int,
    // Encode
    Length,
    Write(WriteError),
    // Both
    Message(String),
}

impl Error {
    pub fn at(self, at: u64) -> DeserializationError {
        DeserializationError { inner: self, at }
    }

    /// Hands the error to a hand-written format that embeds a serde value.
    pub(crate) fn into_read_error(self) -> ReadError {
        match self {
            Error::Read(e) => e,
            other => ReadError::Format(other.to_string()),
        }
    }

    pub(crate) fn into_write_error(self) -> WriteError {
        match self {
            Error::Write(e) => e,
            other => WriteError::Format(other.to_string()),
        }
    }
}

impl ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Message(msg) => fmt.write_str(msg),
            Error::Read(e) => write!(fmt, "Reading error: {}", e),
            Error::Write(e) => write!(fmt, "Writing error: {}", e),
            Error::Length => fmt.write_str("Length required"),
            Error::Trailing => fmt.write_str("Trailing bytes in input"),
            Error::NotSelfDescribing => fmt.write_str("The format is not self-describing, the type of every value must be known"),
            Error::Char(s) => write!(fmt, "Expected a single character but found \"{}\"", s),
            Error::Int => fmt.write_str("Integer didn't fit into target type"),
        }
    }
}

impl From<ReadError> for Error {
    fn from(e: ReadError) -> Error {
        Error::Read(e)
    }
}

impl From<WriteError> for Error {
    fn from(e: WriteError) -> Error {
        Error::Write(e)
    }
}

impl From<std::num::TryFromIntError> for Error {
    fn from(_e: std::num::TryFromIntError) -> Error {
        Error::Int
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read(e) => Some(e),
            Error::Write(e) => Some(e),
            _ => None,
        }
    }
}
