//! Reading and writing of the binary asset formats used by CM3D2 and COM3D2: models, materials,
//! menus and animations.
//!
//! Every format is a fixed sequence of fields without any tags or framing. A format type implements
//! [`Serializable`] and reads or writes its fields itself, in order, through a [`Reader`] or
//! [`Writer`]. Plain values with a packed layout implement [`Raw`] and need no code at all.
//!
//! # Wire conventions
//!
//! * all integers and floats are little-endian, booleans take exactly one byte
//! * strings are a 7-bit encoded Int32 byte length followed by the encoded bytes (UTF-8 by default)
//! * length-prefixed collections start with their element count as a raw `i32`
//! * length-defined collections store no count, it is the value of another field
//! * a [`BoolPrefixedNullable`] is a presence byte followed by the value
//! * an [`Omittable`] is present if and only if bytes are left, so it must be the last field
//!
//! # Examples
//!
//! ```
//! use cm3d2::{LengthPrefixedArray, ReadError, Reader, Serializable, WriteError, Writer};
//!
//! cm3d2::raw_struct! {
//!     #[derive(Debug, Clone, Copy, PartialEq, Default)]
//!     pub struct Keyframe {
//!         pub time: f32,
//!         pub value: f32,
//!         pub tan_in: f32,
//!         pub tan_out: f32,
//!     }
//! }
//!
//! #[derive(Debug, PartialEq)]
//! struct Channel {
//!     id: u8,
//!     keyframes: LengthPrefixedArray<Keyframe>,
//! }
//!
//! impl Serializable for Channel {
//!     fn read_with(reader: &mut Reader<'_>) -> Result<Self, ReadError> {
//!         Ok(Channel { id: reader.read()?, keyframes: reader.read()? })
//!     }
//!
//!     fn write_with(&self, writer: &mut Writer<'_>) -> Result<(), WriteError> {
//!         writer.write(&self.id)?;
//!         writer.write(&self.keyframes)
//!     }
//! }
//!
//! let channel = Channel {
//!     id: 104,
//!     keyframes: LengthPrefixedArray::from(vec![Keyframe { time: 0.0, value: 1.0, tan_in: 0.0, tan_out: 0.0 }]),
//! };
//! let bytes = cm3d2::to_bytes(&channel).unwrap();
//! assert_eq!(bytes.len(), 1 + 4 + 16);
//! assert_eq!(bytes[..5], [
//!     0x68,                   // channel id
//!     0x01, 0x00, 0x00, 0x00, // one keyframe
//! ]);
//! assert_eq!(cm3d2::from_bytes::<Channel>(&bytes).unwrap(), channel);
//! ```

pub mod collections;
mod encoding;
mod error;
mod nullable;
mod raw;
mod reader;
mod serializable;
pub mod varint;
mod writer;

pub use collections::{
    ContinuousList, HugeArray, LengthDefined, LengthDefinedArray, LengthDefinedList, LengthDefinedStringList,
    LengthPrefixedArray, LengthPrefixedList, LengthPrefixedStringList,
};
pub use encoding::Encoding;
pub use error::*;
pub use nullable::{BoolPrefixedNullable, Omittable};
pub use raw::Raw;
pub use reader::Reader;
pub use serializable::{Serializable, SerializableInstance};
pub use varint::VarInt32;
pub use writer::Writer;

use std::io::{Cursor, Read, Seek, Write};

/// Serializes `value` into a new buffer.
pub fn to_bytes<T: Serializable>(value: &T) -> Result<Vec<u8>, WriterError> {
    let mut buf = Vec::new();
    to_writer(&mut buf, value)?;
    Ok(buf)
}

/// Serializes `value` into `sink` and returns the number of written bytes.
pub fn to_writer<W: Write, T: Serializable>(sink: &mut W, value: &T) -> Result<u64, WriterError> {
    let mut writer = Writer::new(sink);
    let result = writer.write(value).and_then(|()| writer.flush());
    result.map_err(|e| e.at(writer.position()))?;
    Ok(writer.position())
}

/// Serializes a value whose write consumes per-pass state into a new buffer, see
/// [`SerializableInstance`].
pub fn to_bytes_instance<T: SerializableInstance + ?Sized>(value: &mut T) -> Result<Vec<u8>, WriterError> {
    let mut buf = Vec::new();
    to_writer_instance(&mut buf, value)?;
    Ok(buf)
}

/// Like [`to_writer`] for a [`SerializableInstance`].
pub fn to_writer_instance<W: Write, T: SerializableInstance + ?Sized>(sink: &mut W, value: &mut T) -> Result<u64, WriterError> {
    let mut writer = Writer::new(sink);
    let result = writer.write_instance(value).and_then(|()| writer.flush());
    result.map_err(|e| e.at(writer.position()))?;
    Ok(writer.position())
}

/// Deserializes a `T` from the start of `bytes`. Bytes after the value are ignored.
pub fn from_bytes<T: Serializable>(bytes: &[u8]) -> Result<T, ReaderError> {
    let mut input = Cursor::new(bytes);
    from_reader(&mut input)
}

/// Deserializes a `T` from the current position of `stream`. The stream is left right after the
/// value, or wherever reading stopped if it failed.
pub fn from_reader<R: Read + Seek, T: Serializable>(stream: &mut R) -> Result<T, ReaderError> {
    let mut reader = Reader::new(stream);
    let result = reader.read();
    result.map_err(|e| e.at(reader.position()))
}

/// Reads into an existing instance from the start of `bytes`. Bytes after the value are ignored.
pub fn from_bytes_into<T: SerializableInstance + ?Sized>(bytes: &[u8], target: &mut T) -> Result<(), ReaderError> {
    let mut input = Cursor::new(bytes);
    from_reader_into(&mut input, target)
}

/// Reads into an existing instance, see [`SerializableInstance`].
pub fn from_reader_into<R: Read + Seek, T: SerializableInstance + ?Sized>(stream: &mut R, target: &mut T) -> Result<(), ReaderError> {
    let mut reader = Reader::new(stream);
    let result = reader.read_into(target);
    result.map_err(|e| e.at(reader.position()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Debug;

    fn assert_roundtrip<T: Serializable + PartialEq + Debug>(value: &T) -> Vec<u8> {
        let bytes = to_bytes(value).unwrap();
        let decoded = from_bytes::<T>(&bytes).unwrap();
        assert_eq!(*value, decoded);
        bytes
    }

    crate::raw_struct! {
        #[derive(Debug, Clone, Copy, PartialEq, Default)]
        struct Float2 {
            x: f32,
            y: f32,
        }
    }

    crate::raw_struct! {
        #[derive(Debug, Clone, Copy, PartialEq, Default)]
        struct Float3 {
            x: f32,
            y: f32,
            z: f32,
        }
    }

    crate::raw_struct! {
        #[derive(Debug, Clone, Copy, PartialEq, Default)]
        struct Keyframe {
            time: f32,
            value: f32,
            tan_in: f32,
            tan_out: f32,
        }
    }

    crate::raw_struct! {
        #[derive(Debug, Clone, Copy, PartialEq, Default)]
        struct MuneKeyUsage {
            left: bool,
            right: bool,
        }
    }

    crate::raw_enum! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum FileVersion: i32 {
            Cm3d2 = 1000,
            Com3d2 = 2000,
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Tex2d {
        name: String,
        path: String,
        offset: Float2,
        scale: Float2,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Property {
        Tex { name: String, tex2d: Option<Tex2d> },
        Col { name: String, color: [f32; 4] },
        F { name: String, number: f32 },
    }

    impl Serializable for Property {
        fn read_with(reader: &mut Reader<'_>) -> Result<Self, ReadError> {
            let tag = reader.read_string()?;
            let name = reader.read_string()?;
            match tag.as_str() {
                "tex" => {
                    let tex2d = match reader.read_string()?.as_str() {
                        "tex2d" => Some(Tex2d {
                            name: reader.read()?,
                            path: reader.read()?,
                            offset: reader.read()?,
                            scale: reader.read()?,
                        }),
                        "null" => None,
                        other => return Err(ReadError::Format(format!("Unknown texture kind \"{}\"", other))),
                    };
                    Ok(Property::Tex { name, tex2d })
                },
                "col" => Ok(Property::Col { name, color: reader.read()? }),
                "f"   => Ok(Property::F { name, number: reader.read()? }),
                other => Err(ReadError::Format(format!("Found property with invalid type \"{}\"", other))),
            }
        }

        fn write_with(&self, writer: &mut Writer<'_>) -> Result<(), WriteError> {
            match self {
                Property::Tex { name, tex2d } => {
                    writer.write_string("tex")?;
                    writer.write_string(name)?;
                    match tex2d {
                        Some(tex) => {
                            writer.write_string("tex2d")?;
                            writer.write(&tex.name)?;
                            writer.write(&tex.path)?;
                            writer.write(&tex.offset)?;
                            writer.write(&tex.scale)
                        },
                        None => writer.write_string("null"),
                    }
                },
                Property::Col { name, color } => {
                    writer.write_string("col")?;
                    writer.write_string(name)?;
                    writer.write(color)
                },
                Property::F { name, number } => {
                    writer.write_string("f")?;
                    writer.write_string(name)?;
                    writer.write(number)
                },
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Mate {
        version: FileVersion,
        name: String,
        material_name: String,
        shader_name: String,
        shader_filename: String,
        properties: Vec<Property>,
    }

    impl Serializable for Mate {
        fn read_with(reader: &mut Reader<'_>) -> Result<Self, ReadError> {
            reader.read_signature("CM3D2_MATERIAL")?;
            let version = reader.read()?;
            let name = reader.read()?;
            let material_name = reader.read()?;
            let shader_name = reader.read()?;
            let shader_filename = reader.read()?;
            let mut properties = Vec::new();
            while reader.peek_string()? != "end" {
                properties.push(reader.read()?);
            }
            reader.read_signature("end")?;
            Ok(Mate { version, name, material_name, shader_name, shader_filename, properties })
        }

        fn write_with(&self, writer: &mut Writer<'_>) -> Result<(), WriteError> {
            writer.write_string("CM3D2_MATERIAL")?;
            writer.write(&self.version)?;
            writer.write(&self.name)?;
            writer.write(&self.material_name)?;
            writer.write(&self.shader_name)?;
            writer.write(&self.shader_filename)?;
            for property in self.properties.iter() {
                writer.write(property)?;
            }
            writer.write_string("end")
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Channel {
        id: u8,
        keyframes: LengthPrefixedArray<Keyframe>,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Track {
        path: String,
        channels: Vec<Channel>,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Anm {
        version: i32,
        tracks: Vec<Track>,
        mune_key: Omittable<MuneKeyUsage>,
    }

    impl Serializable for Anm {
        fn read_with(reader: &mut Reader<'_>) -> Result<Self, ReadError> {
            reader.read_signature("CM3D2_ANIM")?;
            let version = reader.read()?;
            let mut tracks = Vec::new();
            while reader.peek::<u8>()? == 1 {
                reader.read::<u8>()?;
                let mut track = Track { path: reader.read()?, channels: Vec::new() };
                while reader.peek::<u8>()? > 1 {
                    track.channels.push(Channel { id: reader.read()?, keyframes: reader.read()? });
                }
                tracks.push(track);
            }
            match reader.read::<u8>()? {
                0 => Ok(Anm { version, tracks, mune_key: reader.read()? }),
                x => Err(ReadError::Format(format!("Unexpected channel id {} (expected 0)", x))),
            }
        }

        fn write_with(&self, writer: &mut Writer<'_>) -> Result<(), WriteError> {
            writer.write_string("CM3D2_ANIM")?;
            writer.write(&self.version)?;
            for track in self.tracks.iter() {
                writer.write(&1u8)?;
                writer.write(&track.path)?;
                for channel in track.channels.iter() {
                    if channel.id <= 1 {
                        return Err(WriteError::Format(format!("Channel id {} must be greater than 1", channel.id)));
                    }
                    writer.write(&channel.id)?;
                    writer.write(&channel.keyframes)?;
                }
            }
            writer.write(&0u8)?;
            writer.write(&self.mune_key)
        }
    }

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Mesh {
        bone_names: LengthDefinedStringList,
        vertices: LengthDefinedArray<Float3>,
        uv: LengthDefinedArray<Float2>,
    }

    fn count(value: i32) -> Result<usize, ReadError> {
        usize::try_from(value).map_err(|_| ReadError::NegativeLength(value))
    }

    impl SerializableInstance for Mesh {
        fn read_with(&mut self, reader: &mut Reader<'_>) -> Result<(), ReadError> {
            let bone_count = count(reader.read()?)?;
            let vertex_count = count(reader.read()?)?;
            self.bone_names.set_length(bone_count);
            reader.read_into(&mut self.bone_names)?;
            self.vertices.set_length(vertex_count);
            reader.read_into(&mut self.vertices)?;
            self.uv.set_length(vertex_count);
            reader.read_into(&mut self.uv)
        }

        fn write_with(&mut self, writer: &mut Writer<'_>) -> Result<(), WriteError> {
            let bone_count = self.bone_names.len();
            let vertex_count = self.vertices.len();
            writer.write(&(bone_count as i32))?;
            writer.write(&(vertex_count as i32))?;
            self.bone_names.validate_length(bone_count)?;
            writer.write_instance(&mut self.bone_names)?;
            self.vertices.validate_length_named(vertex_count, Some("vertices"), Some("vertex_count"))?;
            writer.write_instance(&mut self.vertices)?;
            self.uv.validate_length_named(vertex_count, Some("uv"), Some("vertex_count"))?;
            writer.write_instance(&mut self.uv)
        }
    }

    fn mate() -> Mate {
        Mate {
            version: FileVersion::Cm3d2,
            name: String::from("skin"),
            material_name: String::from("Skin_body"),
            shader_name: String::from("CM3D2/Toony_Lighted"),
            shader_filename: String::from("CM3D2__Toony_Lighted"),
            properties: vec![
                Property::Tex {
                    name: String::from("_MainTex"),
                    tex2d: Some(Tex2d {
                        name: String::from("skin_a"),
                        path: String::from("Assets/texture/skin_a.png"),
                        offset: Float2 { x: 0.0, y: 0.0 },
                        scale: Float2 { x: 1.0, y: 1.0 },
                    }),
                },
                Property::Tex { name: String::from("_ToonRamp"), tex2d: None },
                Property::Col { name: String::from("_Color"), color: [1.0, 1.0, 1.0, 1.0] },
                Property::F { name: String::from("_Shininess"), number: 0.25 },
            ],
        }
    }

    fn anm(mune_key: Option<MuneKeyUsage>) -> Anm {
        let keyframes = LengthPrefixedArray::from(vec![
            Keyframe { time: 0.0, value: 0.5, tan_in: 0.0, tan_out: 0.0 },
            Keyframe { time: 1.0, value: -0.5, tan_in: 0.0, tan_out: 0.0 },
        ]);
        Anm {
            version: 1001,
            tracks: vec![
                Track {
                    path: String::from("Bip01"),
                    channels: vec![
                        Channel { id: 100, keyframes: keyframes.clone() },
                        Channel { id: 104, keyframes },
                    ],
                },
                Track { path: String::from("Bip01/Bip01 Pelvis"), channels: Vec::new() },
            ],
            mune_key: Omittable(mune_key),
        }
    }

    #[test]
    fn material() {
        let bytes = assert_roundtrip(&mate());
        assert_eq!(bytes[..15], *b"\x0eCM3D2_MATERIAL");
        assert_eq!(bytes[15..19], [0xe8, 0x03, 0x00, 0x00]);
        assert_eq!(bytes[bytes.len() - 4..], *b"\x03end");
    }

    #[test]
    fn material_wrong_signature() {
        let mut bytes = to_bytes(&mate()).unwrap();
        bytes[1] = b'X';
        let e = from_bytes::<Mate>(&bytes).unwrap_err();
        assert_eq!(e.position(), 15);
        assert!(matches!(e.into_inner(), ReadError::Signature { .. }));
    }

    #[test]
    fn material_unknown_property() {
        let mut bytes = to_bytes(&Mate { properties: Vec::new(), ..mate() }).unwrap();
        let len = bytes.len();
        bytes[len - 3..].copy_from_slice(b"vex");
        bytes.extend_from_slice(b"\x01a");
        assert!(matches!(from_bytes::<Mate>(&bytes).unwrap_err().into_inner(), ReadError::Format(_)));
    }

    #[test]
    fn material_unknown_version() {
        let mut bytes = to_bytes(&mate()).unwrap();
        bytes[16] = 0x04;
        assert!(matches!(
            from_bytes::<Mate>(&bytes).unwrap_err().into_inner(),
            ReadError::Discriminant { ty: "FileVersion", value: 1256 }
        ));
    }

    #[test]
    fn animation() {
        let with_trailer = assert_roundtrip(&anm(Some(MuneKeyUsage { left: true, right: false })));
        let without_trailer = assert_roundtrip(&anm(None));
        assert_eq!(with_trailer.len(), without_trailer.len() + 2);
        assert_eq!(with_trailer[with_trailer.len() - 3..], [0x00, 0x01, 0x00]);
        assert_eq!(without_trailer[without_trailer.len() - 1], 0x00);
    }

    #[test]
    fn animation_truncated_trailer() {
        let mut bytes = to_bytes(&anm(None)).unwrap();
        bytes.push(0x01);
        assert!(matches!(from_bytes::<Anm>(&bytes).unwrap_err().into_inner(), ReadError::Eof));
    }

    #[test]
    fn animation_invalid_channel() {
        let mut value = anm(None);
        value.tracks[0].channels[0].id = 1;
        assert!(matches!(to_bytes(&value).unwrap_err().into_inner(), WriteError::Format(_)));
    }

    #[test]
    fn animation_from_stream() {
        let bytes = to_bytes(&anm(None)).unwrap();
        let mut input = Cursor::new(bytes);
        assert_eq!(from_reader::<_, Anm>(&mut input).unwrap(), anm(None));
        let mut forward: &[u8] = input.get_ref();
        let e = Reader::forward_only(&mut forward).read::<Anm>().unwrap_err();
        assert!(matches!(e, ReadError::NotSeekable));
    }

    #[test]
    fn mesh() {
        let mut mesh = Mesh {
            bone_names: LengthDefinedStringList::from(vec![String::from("Bip01"), String::from("Bip01 Head")]),
            vertices: LengthDefinedArray::from(vec![Float3 { x: 0.0, y: 1.5, z: 0.25 }; 3]),
            uv: LengthDefinedArray::from(vec![Float2 { x: 0.5, y: 0.5 }; 3]),
        };
        let mut bytes: Vec<u8> = Vec::new();
        assert_eq!(to_writer_instance(&mut bytes, &mut mesh).unwrap(), 8 + 6 + 11 + 3 * 12 + 3 * 8);

        let mut read = Mesh::default();
        from_reader_into(&mut Cursor::new(&bytes), &mut read).unwrap();
        assert_eq!(read, mesh);
    }

    #[test]
    fn mesh_length_mismatch() {
        let mut mesh = Mesh {
            bone_names: LengthDefinedStringList::new(),
            vertices: LengthDefinedArray::from(vec![Float3::default(); 2]),
            uv: LengthDefinedArray::from(vec![Float2::default(); 1]),
        };
        let mut bytes: Vec<u8> = Vec::new();
        let e = Writer::new(&mut bytes).write_instance(&mut mesh).unwrap_err();
        match e {
            WriteError::LengthMismatch(e) => assert_eq!(e.to_string(), "uv.len() must be equal to vertex_count (2) but is 1"),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
