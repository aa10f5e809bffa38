//! Wrappers for values that may be missing from a stream.
//!
//! [`BoolPrefixedNullable`] writes a boolean presence flag in front of the value and can appear
//! anywhere in a format. [`Omittable`] writes nothing at all for a missing value; its presence is
//! decided by whether any bytes remain, so it only works as the very last field of a format.

use crate::error::{ReadError, WriteError};
use crate::reader::Reader;
use crate::serializable::Serializable;
use crate::writer::Writer;

/// A trailing value that is present if and only if the stream has bytes left.
///
/// Reading peeks one byte and therefore needs a seekable reader. If no byte is left the value is
/// absent and nothing is consumed; otherwise the whole value is read, and running out of bytes
/// halfway is still an `Eof` error. An absent value writes no bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Omittable<T>(pub Option<T>);

/// A value preceded by one boolean byte that tells whether it is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoolPrefixedNullable<T>(pub Option<T>);

macro_rules! impl_nullable {
    ($name:ident) => {
        impl<T> $name<T> {
            pub fn new(value: T) -> Self {
                Self(Some(value))
            }

            pub fn none() -> Self {
                Self(None)
            }

            pub fn has_value(&self) -> bool {
                self.0.is_some()
            }

            pub fn value(&self) -> Option<&T> {
                self.0.as_ref()
            }

            pub fn value_mut(&mut self) -> Option<&mut T> {
                self.0.as_mut()
            }

            pub fn into_option(self) -> Option<T> {
                self.0
            }
        }

        impl<T> Default for $name<T> {
            fn default() -> Self {
                Self(None)
            }
        }

        impl<T> From<Option<T>> for $name<T> {
            fn from(value: Option<T>) -> Self {
                Self(value)
            }
        }

        impl<T> From<$name<T>> for Option<T> {
            fn from(value: $name<T>) -> Self {
                value.0
            }
        }
    };
}

impl_nullable!(Omittable);
impl_nullable!(BoolPrefixedNullable);

impl<T: Serializable> Serializable for Omittable<T> {
    fn read_with(reader: &mut Reader<'_>) -> Result<Self, ReadError> {
        match reader.peek_byte()? {
            Some(_) => Ok(Self(Some(reader.read()?))),
            None => {
                log::trace!("omitted value at stream position 0x{:08X}", reader.position());
                Ok(Self(None))
            },
        }
    }

    fn write_with(&self, writer: &mut Writer<'_>) -> Result<(), WriteError> {
        match &self.0 {
            Some(value) => writer.write(value),
            None        => Ok(()),
        }
    }
}

impl<T: Serializable> Serializable for BoolPrefixedNullable<T> {
    fn read_with(reader: &mut Reader<'_>) -> Result<Self, ReadError> {
        if reader.read::<bool>()? {
            Ok(Self(Some(reader.read()?)))
        } else {
            Ok(Self(None))
        }
    }

    fn write_with(&self, writer: &mut Writer<'_>) -> Result<(), WriteError> {
        match &self.0 {
            Some(value) => {
                writer.write(&true)?;
                writer.write(value)
            },
            None => writer.write(&false),
        }
    }
}
