//! The contract between the core and every file format. A format type reads and writes its fields
//! itself, in the fixed order of its byte layout, by calling back into the `Reader` or `Writer`.

use crate::error::{ReadError, WriteError};
use crate::raw::Raw;
use crate::reader::Reader;
use crate::writer::Writer;

/// A type that can construct itself from a stream and write itself back.
///
/// All [`Raw`] types implement this trait by reading or writing their bytes verbatim.
pub trait Serializable: Sized {
    fn read_with(reader: &mut Reader<'_>) -> Result<Self, ReadError>;
    fn write_with(&self, writer: &mut Writer<'_>) -> Result<(), WriteError>;
}

/// A type that needs an existing instance to read into, because state that is not part of its own
/// bytes has to be supplied first. The length of a length-governed collection is the typical case.
///
/// Writing takes `&mut self` as well, since a write may consume state armed for this one pass.
pub trait SerializableInstance {
    fn read_with(&mut self, reader: &mut Reader<'_>) -> Result<(), ReadError>;
    fn write_with(&mut self, writer: &mut Writer<'_>) -> Result<(), WriteError>;
}

impl<T: Raw> Serializable for T {
    #[inline]
    fn read_with(reader: &mut Reader<'_>) -> Result<Self, ReadError> {
        reader.read_raw()
    }

    #[inline]
    fn write_with(&self, writer: &mut Writer<'_>) -> Result<(), WriteError> {
        writer.write_raw(self)
    }
}

impl Serializable for String {
    fn read_with(reader: &mut Reader<'_>) -> Result<Self, ReadError> {
        reader.read_string()
    }

    fn write_with(&self, writer: &mut Writer<'_>) -> Result<(), WriteError> {
        writer.write_string(self)
    }
}
