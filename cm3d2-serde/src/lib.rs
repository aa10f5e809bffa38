//! Conveniently serialize and deserialize your Rust data structures with the binary conventions of
//! the CM3D2 asset formats.
//!
//! A struct is the concatenation of its fields in declaration order, with no names or tags on wire,
//! which is exactly how the hand-written formats in `cm3d2` lay out their fields. Together with the
//! [`Serde`] adapter this lets plain data blocks be derived instead of written by hand.
//!
//! | serde type      | wire format                                             |
//! |-----------------|---------------------------------------------------------|
//! | bool            | one byte                                                |
//! | integers, float | little-endian, fixed width                              |
//! | char, str       | 7-bit encoded Int32 byte length followed by UTF-8 bytes |
//! | bytes, seq      | `i32` element count followed by the elements            |
//! | map             | `i32` entry count followed by key, value, key, value... |
//! | option          | presence as one byte followed by the value if present   |
//! | unit            | nothing                                                 |
//! | struct, tuple   | the fields, one after another                           |
//! | enum            | variant index as `i32` followed by the variant's fields  |
//!
//! The format is not self-describing, so `deserialize_any` and with it untagged enums, flattened
//! structs and skipped unknown fields are not supported.
//!
//! # Examples
//!
//! ```
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! enum Slot {
//!     Body,
//!     Head,
//!     Hair,
//! }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Item {
//!     slot: Slot,
//!     name: String,
//!     priority: f32,
//! }
//!
//! let item = Item { slot: Slot::Hair, name: "hair_f".to_string(), priority: 1.0 };
//! let bytes = cm3d2_serde::to_bytes(&item).unwrap();
//! assert_eq!(bytes, [
//!     0x02, 0x00, 0x00, 0x00,             // variant index of Slot::Hair
//!     0x06,                               // string of 6 bytes
//!       0x68, 0x61, 0x69, 0x72, 0x5f, 0x66, // 'hair_f'
//!     0x00, 0x00, 0x80, 0x3f,             // 1.0f32
//! ]);
//!
//! let deserialized: Item = cm3d2_serde::from_bytes(&bytes).unwrap();
//! assert_eq!(item, deserialized);
//! ```

mod de;
mod error;
mod ser;

pub use de::{from_bytes, from_reader, Deserializer};
pub use error::{DeserializationError, Error, Result};
pub use ser::{to_bytes, to_writer, Serializer};

use cm3d2::{ReadError, Reader, Serializable, WriteError, Writer};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Wraps a serde type so that it can be a field of a hand-written format.
///
/// ```
/// use cm3d2::{ReadError, Reader, Serializable, WriteError, Writer};
/// use cm3d2_serde::Serde;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, PartialEq, Debug)]
/// struct Bounds {
///     min: [f32; 3],
///     max: [f32; 3],
/// }
///
/// #[derive(PartialEq, Debug)]
/// struct Header {
///     version: i32,
///     bounds: Serde<Bounds>,
/// }
///
/// impl Serializable for Header {
///     fn read_with(reader: &mut Reader<'_>) -> Result<Self, ReadError> {
///         Ok(Header { version: reader.read()?, bounds: reader.read()? })
///     }
///
///     fn write_with(&self, writer: &mut Writer<'_>) -> Result<(), WriteError> {
///         writer.write(&self.version)?;
///         writer.write(&self.bounds)
///     }
/// }
///
/// let header = Header { version: 2001, bounds: Serde(Bounds { min: [-1.0; 3], max: [1.0; 3] }) };
/// let bytes = cm3d2::to_bytes(&header).unwrap();
/// assert_eq!(bytes.len(), 4 + 24);
/// assert_eq!(cm3d2::from_bytes::<Header>(&bytes).unwrap(), header);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Serde<T>(pub T);

impl<T: Serialize + DeserializeOwned> Serializable for Serde<T> {
    fn read_with(reader: &mut Reader<'_>) -> std::result::Result<Self, ReadError> {
        T::deserialize(&mut Deserializer::new(reader)).map(Serde).map_err(Error::into_read_error)
    }

    fn write_with(&self, writer: &mut Writer<'_>) -> std::result::Result<(), WriteError> {
        self.0.serialize(&mut Serializer::new(writer)).map_err(Error::into_write_error)
    }
}
