use crate::error::{ReadError, WriteError};
use crate::reader::Reader;
use crate::serializable::Serializable;
use crate::writer::Writer;
use std::ops::{Deref, DerefMut};

/// A list without a count. Every element, the first one included, is preceded by a `true` byte,
/// and a `false` byte follows the last element.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousList<T>(Vec<T>);

impl<T> ContinuousList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl<T> Default for ContinuousList<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> From<Vec<T>> for ContinuousList<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T> FromIterator<T> for ContinuousList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T> Deref for ContinuousList<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for ContinuousList<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T: Serializable> Serializable for ContinuousList<T> {
    fn read_with(reader: &mut Reader<'_>) -> Result<Self, ReadError> {
        let mut items = Vec::new();
        while reader.read::<bool>()? {
            items.push(reader.read()?);
        }
        Ok(Self(items))
    }

    fn write_with(&self, writer: &mut Writer<'_>) -> Result<(), WriteError> {
        for item in self.0.iter() {
            writer.write(&true)?;
            writer.write(item)?;
        }
        writer.write(&false)
    }
}
