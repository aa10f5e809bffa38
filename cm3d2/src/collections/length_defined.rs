//! Collections whose element count is the value of another field. The count is never stored next to
//! the elements, so the surrounding format has to hand it over before each pass: `set_length`
//! before a read, `validate_length` before a write. Either call arms the collection for exactly one
//! read or write. A second pass, or a change of the element count after arming, fails.
//!
//! ```
//! use cm3d2::{LengthDefined, LengthDefinedArray, Reader, Writer};
//! use std::io::Cursor;
//!
//! let mut weights = LengthDefinedArray::from(vec![0.25f32, 0.75]);
//! let mut buf: Vec<u8> = Vec::new();
//! let mut writer = Writer::new(&mut buf);
//! writer.write(&(weights.len() as i32)).unwrap();
//! weights.validate_length(weights.len()).unwrap();
//! writer.write_instance(&mut weights).unwrap();
//!
//! let mut input = Cursor::new(buf);
//! let mut reader = Reader::new(&mut input);
//! let count: i32 = reader.read().unwrap();
//! let mut read = LengthDefinedArray::<f32>::new();
//! read.set_length(count as usize);
//! reader.read_into(&mut read).unwrap();
//! assert_eq!(read, weights);
//! ```

use super::short_type_name;
use crate::encoding::Encoding;
use crate::error::{LengthError, ReadError, WriteError};
use crate::raw::Raw;
use crate::reader::Reader;
use crate::serializable::{Serializable, SerializableInstance};
use crate::writer::Writer;
use std::ops::{Deref, DerefMut};

pub trait LengthDefined: SerializableInstance {

    /// Call before reading. Resizes the collection to exactly `len` elements, keeping the
    /// overlapping prefix and filling new slots with default values, and arms it for one read.
    fn set_length(&mut self, len: usize);

    /// Call before writing. Arms the collection for one write if it has exactly `len` elements.
    fn validate_length(&mut self, len: usize) -> Result<(), LengthError> {
        self.validate_length_named(len, None, None)
    }

    /// Like `validate_length`, but names the collection and its governing field in the error.
    fn validate_length_named(&mut self, len: usize, collection: Option<&str>, definition: Option<&str>) -> Result<(), LengthError>;

    /// Arms and reads in one step.
    fn read_defined(reader: &mut Reader<'_>, len: usize) -> Result<Self, ReadError> where Self: Default + Sized {
        let mut collection = Self::default();
        collection.set_length(len);
        reader.read_into(&mut collection)?;
        Ok(collection)
    }

    /// Validates and writes in one step.
    fn write_defined(&mut self, writer: &mut Writer<'_>, len: usize) -> Result<(), WriteError> {
        self.validate_length(len)?;
        writer.write_instance(self)
    }
}

/// The length a collection was armed with, if any
#[derive(Debug, Clone, Copy, Default)]
struct DefinedLength(Option<usize>);

impl DefinedLength {
    fn arm(&mut self, len: usize) {
        self.0 = Some(len);
    }

    /// Disarms and tells whether the armed length still matches `actual`.
    fn take(&mut self, actual: usize) -> bool {
        self.0.take() == Some(actual)
    }
}

fn validate<C: ?Sized>(
    defined: &mut DefinedLength,
    actual: usize,
    len: usize,
    collection: Option<&str>,
    definition: Option<&str>,
) -> Result<(), LengthError> {
    if actual != len {
        defined.0 = None;
        return Err(LengthError {
            collection: collection.unwrap_or(short_type_name::<C>()).to_owned(),
            definition: definition.unwrap_or("length").to_owned(),
            expected: len,
            actual,
        });
    }
    log::trace!("{} validated for {} elements", short_type_name::<C>(), len);
    defined.arm(len);
    Ok(())
}

fn undefined_read<C: ?Sized, T: ?Sized>() -> ReadError {
    ReadError::UndefinedLength { collection: short_type_name::<C>(), element: short_type_name::<T>() }
}

fn undefined_write<C: ?Sized>() -> WriteError {
    WriteError::UndefinedLength { collection: short_type_name::<C>() }
}

macro_rules! impl_collection {
    ($name:ident<$t:ident>, $target:ty) => {
        impl<$t> Default for $name<$t> {
            fn default() -> Self {
                Self { items: Vec::new(), defined: DefinedLength::default() }
            }
        }

        impl<$t> From<Vec<$t>> for $name<$t> {
            fn from(items: Vec<$t>) -> Self {
                Self { items, defined: DefinedLength::default() }
            }
        }

        impl<$t: PartialEq> PartialEq for $name<$t> {
            fn eq(&self, other: &Self) -> bool {
                self.items == other.items
            }
        }

        impl<$t> Deref for $name<$t> {
            type Target = $target;

            fn deref(&self) -> &Self::Target {
                &self.items
            }
        }

        impl<$t> DerefMut for $name<$t> {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.items
            }
        }

        impl<$t> $name<$t> {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn into_vec(self) -> Vec<$t> {
                self.items
            }
        }
    };
}

/// An array of raw values whose length is defined by another field. Elements are read and written
/// as one contiguous block of bytes.
#[derive(Debug, Clone)]
pub struct LengthDefinedArray<T> {
    items: Vec<T>,
    defined: DefinedLength,
}

impl_collection!(LengthDefinedArray<T>, [T]);

impl<T: Raw> SerializableInstance for LengthDefinedArray<T> {
    fn read_with(&mut self, reader: &mut Reader<'_>) -> Result<(), ReadError> {
        if !self.defined.take(self.items.len()) {
            return Err(undefined_read::<Self, T>());
        }
        self.items = reader.read_raw_slice(self.items.len())?;
        Ok(())
    }

    fn write_with(&mut self, writer: &mut Writer<'_>) -> Result<(), WriteError> {
        if !self.defined.take(self.items.len()) {
            return Err(undefined_write::<Self>());
        }
        writer.write_raw_slice(&self.items)
    }
}

impl<T: Raw + Default> LengthDefined for LengthDefinedArray<T> {
    fn set_length(&mut self, len: usize) {
        self.items.resize_with(len, T::default);
        log::trace!("LengthDefinedArray set to {} elements", len);
        self.defined.arm(len);
    }

    fn validate_length_named(&mut self, len: usize, collection: Option<&str>, definition: Option<&str>) -> Result<(), LengthError> {
        validate::<Self>(&mut self.defined, self.items.len(), len, collection, definition)
    }
}

/// A list of values whose length is defined by another field. Elements are read and written one by
/// one in index order.
#[derive(Debug, Clone)]
pub struct LengthDefinedList<T> {
    items: Vec<T>,
    defined: DefinedLength,
}

impl_collection!(LengthDefinedList<T>, Vec<T>);

impl<T: Serializable> SerializableInstance for LengthDefinedList<T> {
    fn read_with(&mut self, reader: &mut Reader<'_>) -> Result<(), ReadError> {
        if !self.defined.take(self.items.len()) {
            return Err(undefined_read::<Self, T>());
        }
        for item in self.items.iter_mut() {
            *item = reader.read()?;
        }
        Ok(())
    }

    fn write_with(&mut self, writer: &mut Writer<'_>) -> Result<(), WriteError> {
        if !self.defined.take(self.items.len()) {
            return Err(undefined_write::<Self>());
        }
        for item in self.items.iter() {
            writer.write(item)?;
        }
        Ok(())
    }
}

impl<T: Serializable + Default> LengthDefined for LengthDefinedList<T> {
    fn set_length(&mut self, len: usize) {
        self.items.resize_with(len, T::default);
        log::trace!("LengthDefinedList set to {} elements", len);
        self.defined.arm(len);
    }

    fn validate_length_named(&mut self, len: usize, collection: Option<&str>, definition: Option<&str>) -> Result<(), LengthError> {
        validate::<Self>(&mut self.defined, self.items.len(), len, collection, definition)
    }
}

/// A list of strings whose length is defined by another field. All strings share one encoding.
#[derive(Debug, Clone, Default)]
pub struct LengthDefinedStringList {
    items: Vec<String>,
    defined: DefinedLength,
    pub encoding: Encoding,
}

impl LengthDefinedStringList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoding(encoding: Encoding) -> Self {
        Self { encoding, ..Self::default() }
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

impl From<Vec<String>> for LengthDefinedStringList {
    fn from(items: Vec<String>) -> Self {
        Self { items, ..Self::default() }
    }
}

impl PartialEq for LengthDefinedStringList {
    fn eq(&self, other: &Self) -> bool {
        self.encoding == other.encoding && self.items == other.items
    }
}

impl Deref for LengthDefinedStringList {
    type Target = Vec<String>;

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl DerefMut for LengthDefinedStringList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.items
    }
}

impl SerializableInstance for LengthDefinedStringList {
    fn read_with(&mut self, reader: &mut Reader<'_>) -> Result<(), ReadError> {
        if !self.defined.take(self.items.len()) {
            return Err(undefined_read::<Self, String>());
        }
        for item in self.items.iter_mut() {
            *item = reader.read_string_with(self.encoding)?;
        }
        Ok(())
    }

    fn write_with(&mut self, writer: &mut Writer<'_>) -> Result<(), WriteError> {
        if !self.defined.take(self.items.len()) {
            return Err(undefined_write::<Self>());
        }
        for item in self.items.iter() {
            writer.write_string_with(item, self.encoding)?;
        }
        Ok(())
    }
}

impl LengthDefined for LengthDefinedStringList {
    fn set_length(&mut self, len: usize) {
        self.items.resize_with(len, String::new);
        log::trace!("LengthDefinedStringList set to {} elements", len);
        self.defined.arm(len);
    }

    fn validate_length_named(&mut self, len: usize, collection: Option<&str>, definition: Option<&str>) -> Result<(), LengthError> {
        validate::<Self>(&mut self.defined, self.items.len(), len, collection, definition)
    }
}
