use serde::{ser, Serialize};
use cm3d2::Writer;
use std::io::Write;

use crate::error::{Error, Result};

/// Writes serde values with the CM3D2 conventions through a borrowed `Writer`.
pub struct Serializer<'a, 'w> {
    writer: &'a mut Writer<'w>,
}

pub fn to_bytes<T: ?Sized + Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    to_writer(&mut buf, value)?;
    Ok(buf)
}

pub fn to_writer<T: ?Sized + Serialize, W: Write>(mut sink: W, value: &T) -> Result<()> {
    let mut writer = Writer::new(&mut sink);
    value.serialize(&mut Serializer::new(&mut writer))?;
    Ok(writer.flush()?)
}

impl<'a, 'w> Serializer<'a, 'w> {
    pub fn new(writer: &'a mut Writer<'w>) -> Self {
        Serializer { writer }
    }

    fn serialize_count(&mut self, len: usize) -> Result<()> {
        Ok(self.writer.write(&i32::try_from(len)?)?)
    }

    fn serialize_variant_index(&mut self, index: u32) -> Result<()> {
        Ok(self.writer.write(&i32::try_from(index)?)?)
    }
}

impl<'x, 'a, 'w> ser::Serializer for &'x mut Serializer<'a, 'w> {

    type Ok = ();
    type Error = Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, v: bool) -> Result<()> {
        Ok(self.writer.write(&v)?)
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        Ok(self.writer.write(&v)?)
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        Ok(self.writer.write(&v)?)
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        Ok(self.writer.write(&v)?)
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        Ok(self.writer.write(&v)?)
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        Ok(self.writer.write(&v)?)
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        Ok(self.writer.write(&v)?)
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        Ok(self.writer.write(&v)?)
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        Ok(self.writer.write(&v)?)
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        Ok(self.writer.write(&v)?)
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        Ok(self.writer.write(&v)?)
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.serialize_str(v.encode_utf8(&mut [0u8; 4]))
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        Ok(self.writer.write_string(v)?)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.serialize_count(v.len())?;
        Ok(self.writer.write_bytes(v)?)
    }

    fn serialize_none(self) -> Result<()> {
        Ok(self.writer.write(&false)?)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<()> {
        self.writer.write(&true)?;
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(self, _name: &'static str, index: u32, _variant: &'static str) -> Result<()> {
        self.serialize_variant_index(index)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _name: &'static str, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(self, _name: &'static str, index: u32, _variant: &'static str, value: &T) -> Result<()> {
        self.serialize_variant_index(index)?;
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        match len {
            Some(l) => {
                self.serialize_count(l)?;
                Ok(self)
            },
            None => Err(Error::Length),
        }
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeTupleStruct> {
        Ok(self)
    }

    fn serialize_tuple_variant(self, _name: &'static str, index: u32, _variant: &'static str, _len: usize) -> Result<Self::SerializeTupleVariant> {
        self.serialize_variant_index(index)?;
        Ok(self)
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        match len {
            Some(l) => {
                self.serialize_count(l)?;
                Ok(self)
            },
            None => Err(Error::Length),
        }
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(self)
    }

    fn serialize_struct_variant(self, _name: &'static str, index: u32, _variant: &'static str, _len: usize) -> Result<Self::SerializeStructVariant> {
        self.serialize_variant_index(index)?;
        Ok(self)
    }

    fn is_human_readable(&self) -> bool {
        false
    }

}

impl<'x, 'a, 'w> ser::SerializeSeq for &'x mut Serializer<'a, 'w> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }

}

impl<'x, 'a, 'w> ser::SerializeTuple for &'x mut Serializer<'a, 'w> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'x, 'a, 'w> ser::SerializeTupleStruct for &'x mut Serializer<'a, 'w> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'x, 'a, 'w> ser::SerializeTupleVariant for &'x mut Serializer<'a, 'w> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'x, 'a, 'w> ser::SerializeMap for &'x mut Serializer<'a, 'w> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        key.serialize(&mut **self)
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }

}

impl<'x, 'a, 'w> ser::SerializeStruct for &'x mut Serializer<'a, 'w> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _key: &'static str, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }

}

impl<'x, 'a, 'w> ser::SerializeStructVariant for &'x mut Serializer<'a, 'w> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _key: &'static str, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }

}
