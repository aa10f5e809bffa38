//! Collections that store their own element count, as a raw little-endian `i32`, in front of the
//! elements.

use crate::encoding::Encoding;
use crate::error::{ReadError, WriteError};
use crate::raw::Raw;
use crate::reader::Reader;
use crate::serializable::{Serializable, SerializableInstance};
use crate::writer::Writer;
use std::ops::{Deref, DerefMut};

/// Upper bound for the capacity reserved from a count read off the stream. Longer lists grow while
/// they are read.
const PREALLOCATION_LIMIT: usize = 4096;

fn read_count(reader: &mut Reader<'_>) -> Result<usize, ReadError> {
    let count: i32 = reader.read()?;
    usize::try_from(count).map_err(|_| ReadError::NegativeLength(count))
}

macro_rules! impl_collection {
    ($name:ident<$t:ident>) => {
        impl<$t> Default for $name<$t> {
            fn default() -> Self {
                Self(Vec::new())
            }
        }

        impl<$t> From<Vec<$t>> for $name<$t> {
            fn from(items: Vec<$t>) -> Self {
                Self(items)
            }
        }

        impl<$t> FromIterator<$t> for $name<$t> {
            fn from_iter<I: IntoIterator<Item = $t>>(iter: I) -> Self {
                Self(iter.into_iter().collect())
            }
        }

        impl<$t> Deref for $name<$t> {
            type Target = Vec<$t>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl<$t> DerefMut for $name<$t> {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl<$t> $name<$t> {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn into_vec(self) -> Vec<$t> {
                self.0
            }
        }
    };
}

/// A length-prefixed array of raw values, read and written as one contiguous block after the count.
#[derive(Debug, Clone, PartialEq)]
pub struct LengthPrefixedArray<T>(Vec<T>);

impl_collection!(LengthPrefixedArray<T>);

impl<T: Raw> Serializable for LengthPrefixedArray<T> {
    fn read_with(reader: &mut Reader<'_>) -> Result<Self, ReadError> {
        let count = read_count(reader)?;
        Ok(Self(reader.read_raw_slice(count)?))
    }

    fn write_with(&self, writer: &mut Writer<'_>) -> Result<(), WriteError> {
        writer.write_count(self.0.len())?;
        writer.write_raw_slice(&self.0)
    }
}

/// A length-prefixed list of values, each read and written on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct LengthPrefixedList<T>(Vec<T>);

impl_collection!(LengthPrefixedList<T>);

impl<T: Serializable> Serializable for LengthPrefixedList<T> {
    fn read_with(reader: &mut Reader<'_>) -> Result<Self, ReadError> {
        let count = read_count(reader)?;
        let mut items = Vec::new();
        items.try_reserve(count.min(PREALLOCATION_LIMIT))?;
        for _ in 0..count {
            items.push(reader.read()?);
        }
        Ok(Self(items))
    }

    fn write_with(&self, writer: &mut Writer<'_>) -> Result<(), WriteError> {
        writer.write_count(self.0.len())?;
        for item in self.0.iter() {
            writer.write(item)?;
        }
        Ok(())
    }
}

/// A length-prefixed list of strings that share one encoding. The encoding is not on wire, so the
/// list is read into an instance that already carries it, see `with_encoding`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LengthPrefixedStringList {
    items: Vec<String>,
    pub encoding: Encoding,
}

impl LengthPrefixedStringList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoding(encoding: Encoding) -> Self {
        Self { items: Vec::new(), encoding }
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }

    pub fn read_with_encoding(reader: &mut Reader<'_>, encoding: Encoding) -> Result<Self, ReadError> {
        let mut list = Self::with_encoding(encoding);
        reader.read_into(&mut list)?;
        Ok(list)
    }
}

impl From<Vec<String>> for LengthPrefixedStringList {
    fn from(items: Vec<String>) -> Self {
        Self { items, encoding: Encoding::default() }
    }
}

impl Deref for LengthPrefixedStringList {
    type Target = Vec<String>;

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl DerefMut for LengthPrefixedStringList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.items
    }
}

impl SerializableInstance for LengthPrefixedStringList {
    /// Replaces the items with those in the stream, decoded with `self.encoding`.
    fn read_with(&mut self, reader: &mut Reader<'_>) -> Result<(), ReadError> {
        let count = read_count(reader)?;
        let mut items = Vec::new();
        items.try_reserve(count.min(PREALLOCATION_LIMIT))?;
        for _ in 0..count {
            items.push(reader.read_string_with(self.encoding)?);
        }
        self.items = items;
        Ok(())
    }

    fn write_with(&mut self, writer: &mut Writer<'_>) -> Result<(), WriteError> {
        writer.write_count(self.items.len())?;
        for item in self.items.iter() {
            writer.write_string_with(item, self.encoding)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{LengthPrefixedArray, LengthPrefixedList, LengthPrefixedStringList};
    use crate::encoding::Encoding;
    use crate::error::ReadError;
    use crate::reader::Reader;
    use crate::{from_bytes, from_bytes_into, to_bytes, to_bytes_instance};
    use std::io::Cursor;

    crate::raw_struct! {
        #[derive(Debug, Clone, Copy, PartialEq, Default)]
        struct Keyframe {
            time: f32,
            value: f32,
            tan_in: f32,
            tan_out: f32,
        }
    }

    #[test]
    fn empty() {
        assert_eq!(to_bytes(&LengthPrefixedArray::<f32>::new()).unwrap(), [0, 0, 0, 0]);
        assert_eq!(to_bytes(&LengthPrefixedList::<String>::new()).unwrap(), [0, 0, 0, 0]);
        assert!(from_bytes::<LengthPrefixedArray<f32>>(&[0, 0, 0, 0]).unwrap().is_empty());
    }

    #[test]
    fn count_is_raw_int() {
        let array: LengthPrefixedArray<u8> = (0..200).collect();
        let bytes = to_bytes(&array).unwrap();
        assert_eq!(bytes[..4], [200, 0, 0, 0]);
        assert_eq!(bytes.len(), 204);
        assert_eq!(from_bytes::<LengthPrefixedArray<u8>>(&bytes).unwrap(), array);
    }

    #[test]
    fn keyframes() {
        let frames = LengthPrefixedArray::from(vec![
            Keyframe { time: 0.0, value: 1.0, tan_in: 0.0, tan_out: 0.0 },
            Keyframe { time: 0.5, value: -1.0, tan_in: 0.25, tan_out: 0.25 },
        ]);
        let bytes = to_bytes(&frames).unwrap();
        assert_eq!(bytes.len(), 4 + 2 * 16);
        assert_eq!(bytes[20..24], 0.5f32.to_le_bytes());
        assert_eq!(from_bytes::<LengthPrefixedArray<Keyframe>>(&bytes).unwrap(), frames);
    }

    #[test]
    fn nested_lists() {
        let list = LengthPrefixedList::from(vec![
            LengthPrefixedList::from(vec![String::from("a")]),
            LengthPrefixedList::new(),
        ]);
        let bytes = to_bytes(&list).unwrap();
        assert_eq!(bytes, [2, 0, 0, 0, 1, 0, 0, 0, 1, b'a', 0, 0, 0, 0]);
        assert_eq!(from_bytes::<LengthPrefixedList<LengthPrefixedList<String>>>(&bytes).unwrap(), list);
    }

    #[test]
    fn negative_count() {
        let bytes = [0xffu8, 0xff, 0xff, 0xff];
        assert!(matches!(from_bytes::<LengthPrefixedList<u8>>(&bytes).unwrap_err().into_inner(), ReadError::NegativeLength(-1)));
        assert!(matches!(from_bytes::<LengthPrefixedArray<u8>>(&bytes).unwrap_err().into_inner(), ReadError::NegativeLength(-1)));
    }

    #[test]
    fn count_beyond_input() {
        let bytes = [0xffu8, 0xff, 0xff, 0x7f, 0x01];
        assert!(matches!(from_bytes::<LengthPrefixedList<u8>>(&bytes).unwrap_err().into_inner(), ReadError::Eof));
        assert!(matches!(from_bytes::<LengthPrefixedArray<u8>>(&bytes).unwrap_err().into_inner(), ReadError::Eof));
    }

    #[test]
    fn strings() {
        let mut list = LengthPrefixedStringList::from(vec![String::from("_ShadowColor"), String::from("toon")]);
        let bytes = to_bytes_instance(&mut list).unwrap();
        assert_eq!(bytes[..5], [2, 0, 0, 0, 12]);
        let mut read = LengthPrefixedStringList::from(vec![String::from("stale")]);
        from_bytes_into(&bytes, &mut read).unwrap();
        assert_eq!(read, list);
    }

    #[test]
    fn strings_keep_their_encoding() {
        let mut utf16 = LengthPrefixedStringList::with_encoding(Encoding::Utf16Le);
        utf16.push(String::from("a"));
        utf16.push(String::from("メイド"));
        let bytes = to_bytes_instance(&mut utf16).unwrap();
        assert_eq!(bytes[..7], [2, 0, 0, 0, 2, b'a', 0]);
        assert_eq!(bytes.len(), 4 + 3 + 7);

        let mut read = LengthPrefixedStringList::with_encoding(Encoding::Utf16Le);
        from_bytes_into(&bytes, &mut read).unwrap();
        assert_eq!(read, utf16);
        assert_eq!(read[1], "メイド");

        let mut input = Cursor::new(&bytes);
        let read = LengthPrefixedStringList::read_with_encoding(&mut Reader::new(&mut input), Encoding::Utf16Le).unwrap();
        assert_eq!(read, utf16);

        let mut ascii = LengthPrefixedStringList::with_encoding(Encoding::Ascii);
        let e = from_bytes_into(&bytes, &mut ascii).unwrap_err();
        assert!(matches!(e.into_inner(), ReadError::Encoding("ASCII")));
    }
}
