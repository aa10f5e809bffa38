//! Sequence types. They differ in where the element count lives:
//!
//! * length-defined collections store no count at all, it is the value of some other field of the
//!   surrounding format and has to be supplied before every read and write
//! * length-prefixed collections store their count as a raw `i32` in front of the elements
//! * a continuous list marks every element with a `true` byte and ends with a `false` byte
//!
//! [`HugeArray`] is not a wire type but the in-memory storage for arrays with more elements than a
//! 32 bit index can address.

pub mod continuous;
pub mod huge;
pub mod length_defined;
pub mod length_prefixed;

pub use continuous::ContinuousList;
pub use huge::HugeArray;
pub use length_defined::{LengthDefined, LengthDefinedArray, LengthDefinedList, LengthDefinedStringList};
pub use length_prefixed::{LengthPrefixedArray, LengthPrefixedList, LengthPrefixedStringList};

/// The short name of a type, without its module path and generic arguments
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let name = std::any::type_name::<T>();
    let name = name.split('<').next().unwrap_or(name);
    name.rsplit("::").next().unwrap_or(name)
}
