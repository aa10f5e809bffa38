use serde::de::{self, DeserializeOwned, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess, SeqAccess, VariantAccess, Visitor};
use serde::de::value::U32Deserializer;
use cm3d2::{ReadError, Reader};
use std::io::{Cursor, Read, Seek};

use crate::error::{DeserializationError, Error, Result};

/// Reads serde values with the CM3D2 conventions through a borrowed `Reader`. Since the format is
/// not self-describing, every value is read as the type the visitor asks for.
pub struct Deserializer<'a, 'r> {
    reader: &'a mut Reader<'r>,
}

impl<'a, 'r> Deserializer<'a, 'r> {
    pub fn new(reader: &'a mut Reader<'r>) -> Self {
        Deserializer { reader }
    }
}

/// Deserializes a `T` that has to span all of `bytes`.
pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> std::result::Result<T, DeserializationError> {
    let mut input = Cursor::new(bytes);
    let mut reader = Reader::new(&mut input);
    let result = T::deserialize(&mut Deserializer::new(&mut reader));
    let t = result.map_err(|e| e.at(reader.position()))?;
    match reader.peek_byte() {
        Ok(None) => Ok(t),
        Ok(Some(_)) => Err(Error::Trailing.at(reader.position())),
        Err(e) => Err(Error::Read(e).at(reader.position())),
    }
}

/// Deserializes a `T` from the current position of `stream` and leaves the stream right after it.
pub fn from_reader<R: Read + Seek, T: DeserializeOwned>(stream: &mut R) -> std::result::Result<T, DeserializationError> {
    let mut reader = Reader::new(stream);
    let result = T::deserialize(&mut Deserializer::new(&mut reader));
    result.map_err(|e| e.at(reader.position()))
}

impl<'a, 'r> Deserializer<'a, 'r> {

    #[inline]
    fn decode<T: cm3d2::Serializable>(&mut self) -> Result<T> {
        Ok(self.reader.read()?)
    }

    fn decode_count(&mut self) -> Result<usize> {
        let count: i32 = self.decode()?;
        usize::try_from(count).map_err(|_| Error::Read(ReadError::NegativeLength(count)))
    }

}

impl<'de, 'x, 'a, 'r> de::Deserializer<'de> for &'x mut Deserializer<'a, 'r> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(Error::NotSelfDescribing)
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_bool(self.decode()?)
    }

    fn deserialize_i8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i8(self.decode()?)
    }

    fn deserialize_i16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i16(self.decode()?)
    }

    fn deserialize_i32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i32(self.decode()?)
    }

    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_i64(self.decode()?)
    }

    fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u8(self.decode()?)
    }

    fn deserialize_u16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u16(self.decode()?)
    }

    fn deserialize_u32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u32(self.decode()?)
    }

    fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_u64(self.decode()?)
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_f32(self.decode()?)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_f64(self.decode()?)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let v = self.reader.read_string()?;
        let mut chars = v.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(Error::Char(v)),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_string(self.reader.read_string()?)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_byte_buf(visitor)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let len = self.decode_count()?;
        visitor.visit_byte_buf(self.reader.read_bytes(len)?)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        if self.decode::<bool>()? {
            visitor.visit_some(self)
        } else {
            visitor.visit_none()
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let len = self.decode_count()?;
        visitor.visit_seq(Counted::new(self, len))
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value> {
        visitor.visit_seq(Counted::new(self, len))
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(self, _name: &'static str, len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let len = self.decode_count()?;
        visitor.visit_map(Counted::new(self, len))
    }

    fn deserialize_struct<V: Visitor<'de>>(self, _name: &'static str, fields: &'static [&'static str], visitor: V) -> Result<V::Value> {
        self.deserialize_tuple(fields.len(), visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(self, _name: &'static str, _variants: &'static [&'static str], visitor: V) -> Result<V::Value> {
        visitor.visit_enum(EnumDeserializer::new(self))
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(Error::NotSelfDescribing)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(Error::NotSelfDescribing)
    }

    fn is_human_readable(&self) -> bool {
        false
    }

}

/// A sequence or map whose element count is already known
struct Counted<'x, 'a, 'r> {
    de: &'x mut Deserializer<'a, 'r>,
    remaining: usize,
}

impl<'x, 'a, 'r> Counted<'x, 'a, 'r> {
    fn new(de: &'x mut Deserializer<'a, 'r>, remaining: usize) -> Self {
        Self { de, remaining }
    }
}

impl<'de, 'x, 'a, 'r> SeqAccess<'de> for Counted<'x, 'a, 'r> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        if self.remaining == 0 {
            Ok(None)
        } else {
            self.remaining -= 1;
            seed.deserialize(&mut *self.de).map(Some)
        }
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }

}

impl<'de, 'x, 'a, 'r> MapAccess<'de> for Counted<'x, 'a, 'r> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        if self.remaining == 0 {
            Ok(None)
        } else {
            self.remaining -= 1;
            seed.deserialize(&mut *self.de).map(Some)
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        seed.deserialize(&mut *self.de)
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

struct EnumDeserializer<'x, 'a, 'r> {
    de: &'x mut Deserializer<'a, 'r>,
}

impl<'x, 'a, 'r> EnumDeserializer<'x, 'a, 'r> {
    fn new(de: &'x mut Deserializer<'a, 'r>) -> Self {
        Self { de }
    }
}

impl<'de, 'x, 'a, 'r> EnumAccess<'de> for EnumDeserializer<'x, 'a, 'r> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant)> {
        let index: i32 = self.de.decode()?;
        let deserializer: U32Deserializer<Error> = u32::try_from(index)?.into_deserializer();
        let variant = seed.deserialize(deserializer)?;
        Ok((variant, self))
    }
}

impl<'de, 'x, 'a, 'r> VariantAccess<'de> for EnumDeserializer<'x, 'a, 'r> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(self.de)
    }

    fn tuple_variant<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_tuple(self.de, len, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(self, fields: &'static [&'static str], visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_tuple(self.de, fields.len(), visitor)
    }

}
