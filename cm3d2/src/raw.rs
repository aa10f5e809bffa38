//! Fixed-size values that are stored as their raw little-endian bytes.
//!
//! A type implementing [`Raw`] occupies exactly [`Raw::SIZE`] bytes on wire, without any padding.
//! Structs are the concatenation of their fields in declaration order, enums are stored as their
//! underlying integer and booleans always take a single byte. Every `Raw` type is also
//! [`Serializable`](crate::Serializable), so it can be handed to `Reader::read` and
//! `Writer::write` directly.
//!
//! Use [`raw_struct!`](crate::raw_struct) and [`raw_enum!`](crate::raw_enum) to declare packed
//! structs and integer-backed enums.

use crate::error::ReadError;
use std::mem::size_of;

/// Raw values up to this size are converted through a stack buffer
pub(crate) const STACK_BUFFER: usize = 64;

/// A plain value with a packed, padding-free byte layout.
pub trait Raw: Copy {
    /// The number of bytes this type occupies on wire
    const SIZE: usize;

    /// `buf` is exactly `SIZE` bytes long.
    fn write_raw(&self, buf: &mut [u8]);

    /// `buf` is exactly `SIZE` bytes long.
    fn read_raw(buf: &[u8]) -> Result<Self, ReadError>;
}

macro_rules! impl_raw_primitive {
    ($($t:ty),*) => {
        $(
            impl Raw for $t {
                const SIZE: usize = size_of::<$t>();

                #[inline]
                fn write_raw(&self, buf: &mut [u8]) {
                    buf.copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn read_raw(buf: &[u8]) -> Result<Self, ReadError> {
                    let mut bytes = [0u8; size_of::<$t>()];
                    bytes.copy_from_slice(buf);
                    Ok(<$t>::from_le_bytes(bytes))
                }
            }
        )*
    };
}

impl_raw_primitive!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl Raw for bool {
    const SIZE: usize = 1;

    #[inline]
    fn write_raw(&self, buf: &mut [u8]) {
        buf[0] = *self as u8;
    }

    #[inline]
    fn read_raw(buf: &[u8]) -> Result<Self, ReadError> {
        Ok(buf[0] != 0)
    }
}

impl<T: Raw + Default, const N: usize> Raw for [T; N] {
    const SIZE: usize = T::SIZE * N;

    fn write_raw(&self, buf: &mut [u8]) {
        for (i, element) in self.iter().enumerate() {
            element.write_raw(&mut buf[i * T::SIZE..(i + 1) * T::SIZE]);
        }
    }

    fn read_raw(buf: &[u8]) -> Result<Self, ReadError> {
        let mut array = [T::default(); N];
        for (i, element) in array.iter_mut().enumerate() {
            *element = T::read_raw(&buf[i * T::SIZE..(i + 1) * T::SIZE])?;
        }
        Ok(array)
    }
}

/// Declares a struct and implements [`Raw`] for it by concatenating its fields in declaration
/// order. Every field type must implement `Raw` and the struct must derive `Clone` and `Copy`.
///
/// ```
/// cm3d2::raw_struct! {
///     #[derive(Debug, Clone, Copy, PartialEq, Default)]
///     pub struct Keyframe {
///         pub time: f32,
///         pub value: f32,
///         pub tan_in: f32,
///         pub tan_out: f32,
///     }
/// }
///
/// use cm3d2::Raw;
/// assert_eq!(Keyframe::SIZE, 16);
/// ```
#[macro_export]
macro_rules! raw_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($(#[$fmeta:meta])* $fvis:vis $field:ident : $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $($(#[$fmeta])* $fvis $field: $ty),*
        }

        impl $crate::Raw for $name {
            const SIZE: usize = 0 $(+ <$ty as $crate::Raw>::SIZE)*;

            #[allow(unused_mut, unused_variables, unused_assignments)]
            fn write_raw(&self, buf: &mut [u8]) {
                let mut offset = 0;
                $(
                    <$ty as $crate::Raw>::write_raw(&self.$field, &mut buf[offset..offset + <$ty as $crate::Raw>::SIZE]);
                    offset += <$ty as $crate::Raw>::SIZE;
                )*
            }

            #[allow(unused_mut, unused_variables, unused_assignments)]
            fn read_raw(buf: &[u8]) -> ::std::result::Result<Self, $crate::ReadError> {
                let mut offset = 0;
                $(
                    let $field = <$ty as $crate::Raw>::read_raw(&buf[offset..offset + <$ty as $crate::Raw>::SIZE])?;
                    offset += <$ty as $crate::Raw>::SIZE;
                )*
                Ok(Self { $($field),* })
            }
        }
    };
}

/// Declares a fieldless enum with an explicit integer representation and implements [`Raw`] for
/// it. On wire the enum is its underlying integer; reading a value without a matching variant
/// fails with `ReadError::Discriminant`.
///
/// ```
/// cm3d2::raw_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq, Eq)]
///     pub enum FileVersion: i32 {
///         Cm3d2 = 1000,
///         Com3d2 = 2000,
///     }
/// }
///
/// use cm3d2::Raw;
/// assert_eq!(FileVersion::SIZE, 4);
/// ```
#[macro_export]
macro_rules! raw_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $repr:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:expr),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr($repr)]
        $vis enum $name {
            $($(#[$vmeta])* $variant = $value),*
        }

        impl $crate::Raw for $name {
            const SIZE: usize = <$repr as $crate::Raw>::SIZE;

            #[inline]
            fn write_raw(&self, buf: &mut [u8]) {
                <$repr as $crate::Raw>::write_raw(&(*self as $repr), buf)
            }

            fn read_raw(buf: &[u8]) -> ::std::result::Result<Self, $crate::ReadError> {
                match <$repr as $crate::Raw>::read_raw(buf)? {
                    $(x if x == $name::$variant as $repr => Ok($name::$variant),)*
                    x => Err($crate::ReadError::Discriminant { ty: stringify!($name), value: x as i64 }),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::Raw;
    use crate::error::ReadError;

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
        struct Mixed {
            flag: bool,
            id: u16,
            position: Float3,
            pair: [i8; 2],
        }
    }

    crate::raw_enum! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum Kind: u16 {
            Bone = 1,
            Mesh = 0x0201,
        }
    }

    fn to_vec<T: Raw>(value: &T) -> Vec<u8> {
        let mut buf = vec![0u8; T::SIZE];
        value.write_raw(&mut buf);
        buf
    }

    #[test]
    fn integers_are_little_endian() {
        assert_eq!(to_vec(&1234567890i32), [0xd2, 0x02, 0x96, 0x49]);
        assert_eq!(to_vec(&12345u16), [0x39, 0x30]);
        assert_eq!(to_vec(&-2i64), [0xfe, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(i32::read_raw(&[0xd2, 0x02, 0x96, 0x49]).unwrap(), 1234567890);
    }

    #[test]
    fn bool_is_one_byte() {
        assert_eq!(bool::SIZE, 1);
        assert_eq!(to_vec(&true), [1]);
        assert_eq!(to_vec(&false), [0]);
        assert!(bool::read_raw(&[0x7f]).unwrap());
        assert!(!bool::read_raw(&[0]).unwrap());
    }

    #[test]
    fn structs_are_packed() {
        assert_eq!(Float3::SIZE, 12);
        assert_eq!(Mixed::SIZE, 1 + 2 + 12 + 2);
        let value = Mixed { flag: true, id: 0x0102, position: Float3 { x: 0.1, y: 2.3, z: 4.5 }, pair: [-1, 7] };
        let bytes = to_vec(&value);
        assert_eq!(bytes[..3], [1, 0x02, 0x01]);
        assert_eq!(bytes[3..7], 0.1f32.to_le_bytes());
        assert_eq!(bytes[15..], [0xff, 7]);
        assert_eq!(Mixed::read_raw(&bytes).unwrap(), value);
    }

    #[test]
    fn enums_use_underlying_type() {
        assert_eq!(Kind::SIZE, 2);
        assert_eq!(to_vec(&Kind::Mesh), [0x01, 0x02]);
        assert_eq!(Kind::read_raw(&[1, 0]).unwrap(), Kind::Bone);
        assert!(matches!(Kind::read_raw(&[3, 0]), Err(ReadError::Discriminant { ty: "Kind", value: 3 })));
    }
}
