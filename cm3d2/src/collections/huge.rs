//! Storage for arrays that may hold more elements than a 32 bit index can address. Elements live
//! in blocks of at most 2^31 elements, and a 64 bit index splits into a block and an offset.

use crate::error::{CapacityError, IndexError};
use std::ops::{Index, IndexMut};

/// The largest index a `HugeArray` can address
pub const MAX_INDEX: i64 = i64::MAX >> 1;

/// The largest length of a `HugeArray`, enough to hold `MAX_INDEX`
pub const MAX_LEN: i64 = MAX_INDEX + 1;

/// Number of elements per block
const BLOCK_LEN: i64 = 1 << 31;

/// Splits `index` into `(block, offset, valid)`. The index is valid if it lies in
/// `0..=MAX_INDEX`; for invalid indices block and offset are still computed but meaningless.
///
/// ```
/// use cm3d2::collections::huge::translate_index;
///
/// assert_eq!(translate_index(i32::MAX as i64 + 1), (1, 0, true));
/// assert!(!translate_index(-1).2);
/// ```
pub fn translate_index(index: i64) -> (i32, i32, bool) {
    let block = (index >> 31) as i32;
    let offset = (index & i32::MAX as i64) as i32;
    (block, offset, (0..=MAX_INDEX).contains(&index))
}

fn check_len(len: i64) -> Result<(), CapacityError> {
    if (0..=MAX_LEN).contains(&len) {
        Ok(())
    } else {
        Err(CapacityError { len, max: MAX_LEN })
    }
}

/// A one dimensional array with a 64 bit length.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HugeArray<T> {
    blocks: Vec<Vec<T>>,
    len: i64,
}

impl<T: Clone + Default> HugeArray<T> {
    /// An array of `len` default values.
    pub fn new(len: i64) -> Result<Self, CapacityError> {
        check_len(len)?;
        let mut blocks = Vec::new();
        let mut remaining = len;
        while remaining > 0 {
            let block_len = remaining.min(BLOCK_LEN);
            blocks.push(vec![T::default(); block_len as usize]);
            remaining -= block_len;
        }
        Ok(Self { blocks, len })
    }
}

impl<T> HugeArray<T> {

    pub fn len(&self) -> i64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: i64) -> Option<&T> {
        let (block, offset) = self.locate(index)?;
        self.blocks.get(block)?.get(offset)
    }

    pub fn get_mut(&mut self, index: i64) -> Option<&mut T> {
        let (block, offset) = self.locate(index)?;
        self.blocks.get_mut(block)?.get_mut(offset)
    }

    pub fn set(&mut self, index: i64, value: T) -> Result<(), IndexError> {
        let len = self.len;
        match self.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            },
            None => Err(IndexError { index, len }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.blocks.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.blocks.iter_mut().flatten()
    }

    fn locate(&self, index: i64) -> Option<(usize, usize)> {
        match translate_index(index) {
            (block, offset, true) if index < self.len => Some((block as usize, offset as usize)),
            _                                        => None,
        }
    }

}

impl<T> From<Vec<T>> for HugeArray<T> {
    fn from(mut items: Vec<T>) -> Self {
        let len = items.len() as i64;
        let mut blocks = Vec::new();
        while items.len() as i64 > BLOCK_LEN {
            let rest = items.split_off(BLOCK_LEN as usize);
            blocks.push(items);
            items = rest;
        }
        if !items.is_empty() {
            blocks.push(items);
        }
        Self { blocks, len }
    }
}

impl<T> Index<i64> for HugeArray<T> {
    type Output = T;

    fn index(&self, index: i64) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => panic!("index {} out of range for HugeArray of length {}", index, self.len),
        }
    }
}

impl<T> IndexMut<i64> for HugeArray<T> {
    fn index_mut(&mut self, index: i64) -> &mut T {
        let len = self.len;
        match self.get_mut(index) {
            Some(value) => value,
            None => panic!("index {} out of range for HugeArray of length {}", index, len),
        }
    }
}
