use crate::error::{ReadError, WriteError};
use std::borrow::Cow;

/// The text encoding of a length-prefixed string. The length prefix always counts encoded bytes,
/// not characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    /// Seven bit ASCII. Strings with other characters are rejected in both directions.
    Ascii,
    Utf16Le,
}

impl Encoding {

    pub fn name(&self) -> &'static str {
        match *self {
            Encoding::Utf8    => "UTF-8",
            Encoding::Ascii   => "ASCII",
            Encoding::Utf16Le => "UTF-16LE",
        }
    }

    pub fn encode<'a>(&self, s: &'a str) -> Result<Cow<'a, [u8]>, WriteError> {
        match *self {
            Encoding::Utf8                   => Ok(Cow::Borrowed(s.as_bytes())),
            Encoding::Ascii if s.is_ascii()  => Ok(Cow::Borrowed(s.as_bytes())),
            Encoding::Ascii                  => Err(WriteError::Encoding(self.name())),
            Encoding::Utf16Le                => Ok(Cow::Owned(s.encode_utf16().flat_map(u16::to_le_bytes).collect())),
        }
    }

    pub fn decode(&self, bytes: Vec<u8>) -> Result<String, ReadError> {
        match *self {
            Encoding::Utf8                       => Ok(String::from_utf8(bytes)?),
            Encoding::Ascii if bytes.is_ascii()  => Ok(String::from_utf8(bytes)?),
            Encoding::Ascii                      => Err(ReadError::Encoding(self.name())),
            Encoding::Utf16Le if bytes.len() % 2 != 0 => Err(ReadError::Encoding(self.name())),
            Encoding::Utf16Le => {
                let units: Vec<u16> = bytes.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect();
                String::from_utf16(&units).map_err(|_| ReadError::Encoding(self.name()))
            },
        }
    }

}

#[cfg(test)]
mod tests {
    use super::Encoding;
    use crate::error::{ReadError, WriteError};

    #[test]
    fn utf8() {
        let s = "ﾒｲﾄﾞ服 maid";
        let bytes = Encoding::Utf8.encode(s).unwrap().into_owned();
        assert_eq!(bytes.len(), s.len());
        assert_eq!(Encoding::Utf8.decode(bytes).unwrap(), s);
        assert!(matches!(Encoding::Utf8.decode(vec![0xc3, 0x28]), Err(ReadError::Utf8(_))));
    }

    #[test]
    fn ascii() {
        assert_eq!(Encoding::Ascii.encode("end").unwrap().into_owned(), b"end");
        assert!(matches!(Encoding::Ascii.encode("é"), Err(WriteError::Encoding("ASCII"))));
        assert!(matches!(Encoding::Ascii.decode(vec![0x80]), Err(ReadError::Encoding("ASCII"))));
    }

    #[test]
    fn utf16() {
        let bytes = Encoding::Utf16Le.encode("aé").unwrap().into_owned();
        assert_eq!(bytes, [0x61, 0x00, 0xe9, 0x00]);
        assert_eq!(Encoding::Utf16Le.decode(bytes).unwrap(), "aé");
        assert!(matches!(Encoding::Utf16Le.decode(vec![0x61]), Err(ReadError::Encoding("UTF-16LE"))));
    }
}
