//! Typed value registry
//!
//! A single logical field can hold one of a closed set of element types:
//! the ten numeric scalars, a UTF-8 string, a 1-D array of each numeric
//! type, or an array of strings. The concrete type is recorded as an explicit
//! discriminant ([`ValueType`]) next to the payload; decoders dispatch on the
//! discriminant only and never inspect payload bytes to guess the type.
//!
//! # Wire layout
//!
//! Each payload is a one-field wrapper table (`Byte`, `ArrayDouble`, ...)
//! whose field 0 holds the scalar inline, or an offset to a string or
//! vector.
//!
//! # Ownership
//!
//! [`Value`] owns its data and is what encoders consume. [`ValueRef`] is the
//! decoded form: arrays and strings borrow from the message buffer. Call
//! [`ValueRef::to_owned`] to detach from the buffer.

mod decode;
mod encode;
mod infer;

use std::fmt;

use crate::flatbuf::{Element, StringVector, VectorView};
use crate::{ProtocolError, Result};

pub use decode::decode_value;
pub use encode::{encode_array, encode_scalar, encode_string, encode_string_array, encode_value};

pub(crate) use decode::decode_array;

// =============================================================================
// Discriminants
// =============================================================================

/// Value discriminant (matches the `Value` union in the f142 schema)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueType {
    Byte = 1,
    UByte = 2,
    Short = 3,
    UShort = 4,
    Int = 5,
    UInt = 6,
    Long = 7,
    ULong = 8,
    Float = 9,
    Double = 10,
    ArrayByte = 11,
    ArrayUByte = 12,
    ArrayShort = 13,
    ArrayUShort = 14,
    ArrayInt = 15,
    ArrayUInt = 16,
    ArrayLong = 17,
    ArrayULong = 18,
    ArrayFloat = 19,
    ArrayDouble = 20,
    String = 21,
    ArrayString = 22,
}

impl ValueType {
    /// Parse from the raw union tag; `None` for NONE (0) and unknown tags
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            1 => Self::Byte,
            2 => Self::UByte,
            3 => Self::Short,
            4 => Self::UShort,
            5 => Self::Int,
            6 => Self::UInt,
            7 => Self::Long,
            8 => Self::ULong,
            9 => Self::Float,
            10 => Self::Double,
            11 => Self::ArrayByte,
            12 => Self::ArrayUByte,
            13 => Self::ArrayShort,
            14 => Self::ArrayUShort,
            15 => Self::ArrayInt,
            16 => Self::ArrayUInt,
            17 => Self::ArrayLong,
            18 => Self::ArrayULong,
            19 => Self::ArrayFloat,
            20 => Self::ArrayDouble,
            21 => Self::String,
            22 => Self::ArrayString,
            _ => return None,
        })
    }

    /// Convert to raw union tag
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Check if this discriminant denotes a 1-D array
    #[inline]
    pub const fn is_array(self) -> bool {
        matches!(
            self,
            Self::ArrayByte
                | Self::ArrayUByte
                | Self::ArrayShort
                | Self::ArrayUShort
                | Self::ArrayInt
                | Self::ArrayUInt
                | Self::ArrayLong
                | Self::ArrayULong
                | Self::ArrayFloat
                | Self::ArrayDouble
                | Self::ArrayString
        )
    }

    /// Schema name of the wrapper table
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Byte => "Byte",
            Self::UByte => "UByte",
            Self::Short => "Short",
            Self::UShort => "UShort",
            Self::Int => "Int",
            Self::UInt => "UInt",
            Self::Long => "Long",
            Self::ULong => "ULong",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::ArrayByte => "ArrayByte",
            Self::ArrayUByte => "ArrayUByte",
            Self::ArrayShort => "ArrayShort",
            Self::ArrayUShort => "ArrayUShort",
            Self::ArrayInt => "ArrayInt",
            Self::ArrayUInt => "ArrayUInt",
            Self::ArrayLong => "ArrayLong",
            Self::ArrayULong => "ArrayULong",
            Self::ArrayFloat => "ArrayFloat",
            Self::ArrayDouble => "ArrayDouble",
            Self::String => "String",
            Self::ArrayString => "ArrayString",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Native numeric type → (scalar discriminant, array discriminant)
pub trait ValueElement: Element {
    /// Discriminant for a single value of this type
    const SCALAR: ValueType;
    /// Discriminant for a 1-D array of this type
    const ARRAY: ValueType;
}

macro_rules! impl_value_element {
    ($($ty:ty => $scalar:ident, $array:ident);* $(;)?) => {
        $(
            impl ValueElement for $ty {
                const SCALAR: ValueType = ValueType::$scalar;
                const ARRAY: ValueType = ValueType::$array;
            }
        )*
    };
}

impl_value_element! {
    i8 => Byte, ArrayByte;
    u8 => UByte, ArrayUByte;
    i16 => Short, ArrayShort;
    u16 => UShort, ArrayUShort;
    i32 => Int, ArrayInt;
    u32 => UInt, ArrayUInt;
    i64 => Long, ArrayLong;
    u64 => ULong, ArrayULong;
    f32 => Float, ArrayFloat;
    f64 => Double, ArrayDouble;
}

// =============================================================================
// Owned values
// =============================================================================

/// An owned typed value, ready to encode
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    ArrayI8(Vec<i8>),
    ArrayU8(Vec<u8>),
    ArrayI16(Vec<i16>),
    ArrayU16(Vec<u16>),
    ArrayI32(Vec<i32>),
    ArrayU32(Vec<u32>),
    ArrayI64(Vec<i64>),
    ArrayU64(Vec<u64>),
    ArrayF32(Vec<f32>),
    ArrayF64(Vec<f64>),
    ArrayString(Vec<String>),
}

impl Value {
    /// Discriminant that encoding this value will record
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::I8(_) => ValueType::Byte,
            Self::U8(_) => ValueType::UByte,
            Self::I16(_) => ValueType::Short,
            Self::U16(_) => ValueType::UShort,
            Self::I32(_) => ValueType::Int,
            Self::U32(_) => ValueType::UInt,
            Self::I64(_) => ValueType::Long,
            Self::U64(_) => ValueType::ULong,
            Self::F32(_) => ValueType::Float,
            Self::F64(_) => ValueType::Double,
            Self::String(_) => ValueType::String,
            Self::ArrayI8(_) => ValueType::ArrayByte,
            Self::ArrayU8(_) => ValueType::ArrayUByte,
            Self::ArrayI16(_) => ValueType::ArrayShort,
            Self::ArrayU16(_) => ValueType::ArrayUShort,
            Self::ArrayI32(_) => ValueType::ArrayInt,
            Self::ArrayU32(_) => ValueType::ArrayUInt,
            Self::ArrayI64(_) => ValueType::ArrayLong,
            Self::ArrayU64(_) => ValueType::ArrayULong,
            Self::ArrayF32(_) => ValueType::ArrayFloat,
            Self::ArrayF64(_) => ValueType::ArrayDouble,
            Self::ArrayString(_) => ValueType::ArrayString,
        }
    }

    /// Number of dimensions: 0 for scalars and strings, 1 for arrays
    #[inline]
    pub fn ndim(&self) -> usize {
        usize::from(self.value_type().is_array())
    }

    /// Infer a typed value from a dynamically typed JSON value
    ///
    /// Text is detected first; integers become `I64` (or `U64` when only
    /// representable unsigned) and any other number becomes `F64`. Arrays
    /// follow the same rule across all elements.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` for objects, booleans, null, nested arrays
    /// and arrays mixing strings with numbers.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        infer::infer_value(value)
    }
}

impl TryFrom<&serde_json::Value> for Value {
    type Error = ProtocolError;

    fn try_from(value: &serde_json::Value) -> Result<Self> {
        Self::from_json(value)
    }
}

macro_rules! impl_value_from {
    ($($ty:ty => $scalar:ident, $array:ident);* $(;)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(v: $ty) -> Self {
                    Self::$scalar(v)
                }
            }

            impl From<Vec<$ty>> for Value {
                #[inline]
                fn from(v: Vec<$ty>) -> Self {
                    Self::$array(v)
                }
            }

            impl From<&[$ty]> for Value {
                #[inline]
                fn from(v: &[$ty]) -> Self {
                    Self::$array(v.to_vec())
                }
            }
        )*
    };
}

impl_value_from! {
    i8 => I8, ArrayI8;
    u8 => U8, ArrayU8;
    i16 => I16, ArrayI16;
    u16 => U16, ArrayU16;
    i32 => I32, ArrayI32;
    u32 => U32, ArrayU32;
    i64 => I64, ArrayI64;
    u64 => U64, ArrayU64;
    f32 => F32, ArrayF32;
    f64 => F64, ArrayF64;
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Self::ArrayString(v)
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Self::ArrayString(v.into_iter().map(str::to_owned).collect())
    }
}

// =============================================================================
// Borrowed values
// =============================================================================

/// A decoded typed value borrowing from the message buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRef<'a> {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    String(&'a str),
    ArrayI8(VectorView<'a, i8>),
    ArrayU8(VectorView<'a, u8>),
    ArrayI16(VectorView<'a, i16>),
    ArrayU16(VectorView<'a, u16>),
    ArrayI32(VectorView<'a, i32>),
    ArrayU32(VectorView<'a, u32>),
    ArrayI64(VectorView<'a, i64>),
    ArrayU64(VectorView<'a, u64>),
    ArrayF32(VectorView<'a, f32>),
    ArrayF64(VectorView<'a, f64>),
    ArrayString(StringVector<'a>),
}

impl<'a> ValueRef<'a> {
    /// Discriminant this value was decoded with
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::I8(_) => ValueType::Byte,
            Self::U8(_) => ValueType::UByte,
            Self::I16(_) => ValueType::Short,
            Self::U16(_) => ValueType::UShort,
            Self::I32(_) => ValueType::Int,
            Self::U32(_) => ValueType::UInt,
            Self::I64(_) => ValueType::Long,
            Self::U64(_) => ValueType::ULong,
            Self::F32(_) => ValueType::Float,
            Self::F64(_) => ValueType::Double,
            Self::String(_) => ValueType::String,
            Self::ArrayI8(_) => ValueType::ArrayByte,
            Self::ArrayU8(_) => ValueType::ArrayUByte,
            Self::ArrayI16(_) => ValueType::ArrayShort,
            Self::ArrayU16(_) => ValueType::ArrayUShort,
            Self::ArrayI32(_) => ValueType::ArrayInt,
            Self::ArrayU32(_) => ValueType::ArrayUInt,
            Self::ArrayI64(_) => ValueType::ArrayLong,
            Self::ArrayU64(_) => ValueType::ArrayULong,
            Self::ArrayF32(_) => ValueType::ArrayFloat,
            Self::ArrayF64(_) => ValueType::ArrayDouble,
            Self::ArrayString(_) => ValueType::ArrayString,
        }
    }

    /// Number of dimensions: 0 for scalars and strings, 1 for arrays
    #[inline]
    pub fn ndim(&self) -> usize {
        usize::from(self.value_type().is_array())
    }

    /// Element count: 1 for scalars and strings
    pub fn len(&self) -> usize {
        match self {
            Self::ArrayI8(v) => v.len(),
            Self::ArrayU8(v) => v.len(),
            Self::ArrayI16(v) => v.len(),
            Self::ArrayU16(v) => v.len(),
            Self::ArrayI32(v) => v.len(),
            Self::ArrayU32(v) => v.len(),
            Self::ArrayI64(v) => v.len(),
            Self::ArrayU64(v) => v.len(),
            Self::ArrayF32(v) => v.len(),
            Self::ArrayF64(v) => v.len(),
            Self::ArrayString(v) => v.len(),
            _ => 1,
        }
    }

    /// Check if this is an array with no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get as string, if this is a `String` value
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Copy into an owned [`Value`] that no longer borrows the buffer
    ///
    /// # Errors
    ///
    /// Fails only for string arrays containing malformed elements.
    pub fn to_owned(&self) -> Result<Value> {
        Ok(match *self {
            Self::I8(v) => Value::I8(v),
            Self::U8(v) => Value::U8(v),
            Self::I16(v) => Value::I16(v),
            Self::U16(v) => Value::U16(v),
            Self::I32(v) => Value::I32(v),
            Self::U32(v) => Value::U32(v),
            Self::I64(v) => Value::I64(v),
            Self::U64(v) => Value::U64(v),
            Self::F32(v) => Value::F32(v),
            Self::F64(v) => Value::F64(v),
            Self::String(s) => Value::String(s.to_owned()),
            Self::ArrayI8(v) => Value::ArrayI8(v.to_vec()),
            Self::ArrayU8(v) => Value::ArrayU8(v.to_vec()),
            Self::ArrayI16(v) => Value::ArrayI16(v.to_vec()),
            Self::ArrayU16(v) => Value::ArrayU16(v.to_vec()),
            Self::ArrayI32(v) => Value::ArrayI32(v.to_vec()),
            Self::ArrayU32(v) => Value::ArrayU32(v.to_vec()),
            Self::ArrayI64(v) => Value::ArrayI64(v.to_vec()),
            Self::ArrayU64(v) => Value::ArrayU64(v.to_vec()),
            Self::ArrayF32(v) => Value::ArrayF32(v.to_vec()),
            Self::ArrayF64(v) => Value::ArrayF64(v.to_vec()),
            Self::ArrayString(v) => Value::ArrayString(v.to_vec()?),
        })
    }
}
