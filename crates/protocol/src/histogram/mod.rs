//! N-dimensional histograms (`hs00`)
//!
//! A histogram message carries a row-major flattened data array, an optional
//! errors array of the same shape, and one metadata record per dimension
//! (length, unit, label and bin boundaries).
//!
//! Data, errors and each dimension's bin boundaries are independent typed
//! arrays: any of them may be `u32`, `u64`, `f32` or `f64`, recorded by the
//! `Array` union discriminant ([`ArrayType`]).
//!
//! # Example
//!
//! ```
//! use streaming_protocol::{DimensionMetaData, Histogram, decode_histogram, encode_histogram};
//!
//! let histogram = Histogram {
//!     source: Some("detector_1".into()),
//!     timestamp: 123_456,
//!     current_shape: vec![2, 3],
//!     dim_metadata: vec![
//!         DimensionMetaData::new(2, "m", "x", vec![0.0f64, 1.0, 2.0]),
//!         DimensionMetaData::new(3, "m", "y", vec![0u64, 1, 2, 3]),
//!     ],
//!     data: vec![1u64, 2, 3, 4, 5, 6].into(),
//!     ..Histogram::default()
//! };
//!
//! let buf = encode_histogram(&histogram)?;
//! let decoded = decode_histogram(&buf)?;
//! assert_eq!(decoded.data.get_f64(&[1, 2]), Some(6.0));
//! assert_eq!(decoded.to_owned()?, histogram);
//! # Ok::<(), streaming_protocol::ProtocolError>(())
//! ```

mod decode;
mod encode;
mod shape;

use std::fmt;

use crate::flatbuf::VectorView;
use crate::value::ValueElement;
use crate::{ProtocolError, Result};

pub use decode::decode_histogram;
pub use encode::{encode_histogram, encode_histogram_with};
pub use shape::{NdArray, Shape};

// =============================================================================
// Discriminants
// =============================================================================

/// Histogram array discriminant (matches the `Array` union in the hs00 schema)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ArrayType {
    UInt = 1,
    ULong = 2,
    Double = 3,
    Float = 4,
}

impl ArrayType {
    /// Parse from the raw union tag; `None` for NONE (0) and unknown tags
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::UInt),
            2 => Some(Self::ULong),
            3 => Some(Self::Double),
            4 => Some(Self::Float),
            _ => None,
        }
    }

    /// Convert to raw union tag
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Schema name of the wrapper table
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UInt => "ArrayUInt",
            Self::ULong => "ArrayULong",
            Self::Double => "ArrayDouble",
            Self::Float => "ArrayFloat",
        }
    }
}

impl fmt::Display for ArrayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Element types a histogram array can hold
pub trait HistogramElement: ValueElement {
    /// Discriminant for an array of this type
    const ARRAY_TYPE: ArrayType;

    /// Lossy conversion used for uniform numeric access
    fn to_f64(self) -> f64;
}

impl HistogramElement for u32 {
    const ARRAY_TYPE: ArrayType = ArrayType::UInt;

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl HistogramElement for u64 {
    const ARRAY_TYPE: ArrayType = ArrayType::ULong;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl HistogramElement for f32 {
    const ARRAY_TYPE: ArrayType = ArrayType::Float;

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl HistogramElement for f64 {
    const ARRAY_TYPE: ArrayType = ArrayType::Double;

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}

// =============================================================================
// Owned arrays
// =============================================================================

/// An owned, flat histogram array
///
/// `u32`, `u64`, `f32` and `f64` are kept as given. Other unsigned integers
/// are promoted to `u64`. Signed integers are promoted to `u64` and rejected
/// with `UnsupportedType` if any is negative. JSON input follows the same
/// rule: an all-integer array becomes `u64` (or is rejected), while any
/// fractional number makes the whole array `f64`.
#[derive(Debug, Clone, PartialEq)]
pub enum HistogramArray {
    U32(Vec<u32>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl Default for HistogramArray {
    fn default() -> Self {
        Self::F64(Vec::new())
    }
}

impl HistogramArray {
    /// Discriminant that encoding this array will record
    pub fn array_type(&self) -> ArrayType {
        match self {
            Self::U32(_) => ArrayType::UInt,
            Self::U64(_) => ArrayType::ULong,
            Self::F32(_) => ArrayType::Float,
            Self::F64(_) => ArrayType::Double,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            Self::U32(v) => v.len(),
            Self::U64(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
        }
    }

    /// Check if the array has no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build from dynamically typed JSON
    ///
    /// Nested arrays are flattened in row-major order. Element types follow
    /// the promotion rules of [`HistogramArray`]; an empty array gives `f64`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` for anything other than numbers and
    /// arrays of numbers, or for a negative value in an all-integer array.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let mut numbers = Vec::new();
        flatten_json(value, &mut numbers)?;

        if !numbers.is_empty() && numbers.iter().all(|n| !n.is_f64()) {
            return numbers
                .iter()
                .map(|n| {
                    n.as_u64().ok_or_else(|| {
                        ProtocolError::unsupported_type(format!("negative value {n} in integer histogram array"))
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(Self::U64);
        }

        Ok(Self::F64(
            numbers.iter().map(|n| n.as_f64().unwrap_or(f64::NAN)).collect(),
        ))
    }
}

fn flatten_json<'v>(value: &'v serde_json::Value, out: &mut Vec<&'v serde_json::Number>) -> Result<()> {
    match value {
        serde_json::Value::Number(n) => {
            out.push(n);
            Ok(())
        }
        serde_json::Value::Array(items) => items.iter().try_for_each(|item| flatten_json(item, out)),
        other => Err(ProtocolError::unsupported_type(format!(
            "histogram arrays hold numbers only, got {other}"
        ))),
    }
}

impl TryFrom<&serde_json::Value> for HistogramArray {
    type Error = ProtocolError;

    fn try_from(value: &serde_json::Value) -> Result<Self> {
        Self::from_json(value)
    }
}

macro_rules! impl_native {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<$ty>> for HistogramArray {
                #[inline]
                fn from(v: Vec<$ty>) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_native!(u32 => U32, u64 => U64, f32 => F32, f64 => F64);

macro_rules! impl_unsigned_promotion {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<Vec<$ty>> for HistogramArray {
                fn from(v: Vec<$ty>) -> Self {
                    Self::U64(v.into_iter().map(|x| x as u64).collect())
                }
            }
        )*
    };
}

impl_unsigned_promotion!(u8, u16, usize);

macro_rules! impl_signed_promotion {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TryFrom<Vec<$ty>> for HistogramArray {
                type Error = ProtocolError;

                fn try_from(v: Vec<$ty>) -> Result<Self> {
                    v.into_iter()
                        .map(|x| {
                            u64::try_from(x).map_err(|_| {
                                ProtocolError::unsupported_type(format!(
                                    "negative value {x} in {} histogram array",
                                    stringify!($ty)
                                ))
                            })
                        })
                        .collect::<Result<Vec<_>>>()
                        .map(Self::U64)
                }
            }
        )*
    };
}

impl_signed_promotion!(i8, i16, i32, i64);

// =============================================================================
// Borrowed arrays
// =============================================================================

/// A decoded flat histogram array borrowing from the message buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HistogramArrayRef<'a> {
    U32(VectorView<'a, u32>),
    U64(VectorView<'a, u64>),
    F32(VectorView<'a, f32>),
    F64(VectorView<'a, f64>),
}

impl<'a> HistogramArrayRef<'a> {
    /// Discriminant this array was decoded with
    pub fn array_type(&self) -> ArrayType {
        match self {
            Self::U32(_) => ArrayType::UInt,
            Self::U64(_) => ArrayType::ULong,
            Self::F32(_) => ArrayType::Float,
            Self::F64(_) => ArrayType::Double,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            Self::U32(v) => v.len(),
            Self::U64(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
        }
    }

    /// Check if the array has no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index` converted to `f64`
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        match self {
            Self::U32(v) => v.get(index).map(HistogramElement::to_f64),
            Self::U64(v) => v.get(index).map(HistogramElement::to_f64),
            Self::F32(v) => v.get(index).map(HistogramElement::to_f64),
            Self::F64(v) => v.get(index),
        }
    }

    /// Sub-array of `len` elements starting at `start`
    pub fn slice(&self, start: usize, len: usize) -> Option<Self> {
        Some(match self {
            Self::U32(v) => Self::U32(v.slice(start, len)?),
            Self::U64(v) => Self::U64(v.slice(start, len)?),
            Self::F32(v) => Self::F32(v.slice(start, len)?),
            Self::F64(v) => Self::F64(v.slice(start, len)?),
        })
    }

    /// Copy into an owned array
    pub fn to_owned(&self) -> HistogramArray {
        match self {
            Self::U32(v) => HistogramArray::U32(v.to_vec()),
            Self::U64(v) => HistogramArray::U64(v.to_vec()),
            Self::F32(v) => HistogramArray::F32(v.to_vec()),
            Self::F64(v) => HistogramArray::F64(v.to_vec()),
        }
    }
}

// =============================================================================
// Records
// =============================================================================

/// Metadata for one histogram dimension
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DimensionMetaData {
    /// Number of bins along this dimension
    pub length: u32,
    pub unit: String,
    pub label: String,
    /// Bin edges (usually `length + 1` values)
    pub bin_boundaries: HistogramArray,
}

impl DimensionMetaData {
    pub fn new(
        length: u32,
        unit: impl Into<String>,
        label: impl Into<String>,
        bin_boundaries: impl Into<HistogramArray>,
    ) -> Self {
        Self {
            length,
            unit: unit.into(),
            label: label.into(),
            bin_boundaries: bin_boundaries.into(),
        }
    }
}

/// An owned histogram, ready to encode
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Histogram {
    /// Producer name; omitted from the message when `None`
    pub source: Option<String>,
    pub timestamp: u64,
    /// Extent of each dimension
    pub current_shape: Vec<u32>,
    /// One record per dimension
    pub dim_metadata: Vec<DimensionMetaData>,
    /// Row-major flattened counts
    pub data: HistogramArray,
    /// Row-major flattened errors, same shape as `data`
    pub errors: Option<HistogramArray>,
    pub last_metadata_timestamp: Option<u64>,
    pub info: Option<String>,
}

/// Decoded metadata for one dimension
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedDimension<'a> {
    pub length: u32,
    /// Unit (empty if absent)
    pub unit: &'a str,
    /// Label (empty if absent)
    pub label: &'a str,
    pub bin_boundaries: HistogramArrayRef<'a>,
}

impl DecodedDimension<'_> {
    /// Copy into an owned record
    pub fn to_owned(&self) -> DimensionMetaData {
        DimensionMetaData {
            length: self.length,
            unit: self.unit.to_owned(),
            label: self.label.to_owned(),
            bin_boundaries: self.bin_boundaries.to_owned(),
        }
    }
}

/// A decoded histogram borrowing from the input buffer
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedHistogram<'a> {
    /// Source name (empty if absent)
    pub source: &'a str,
    pub timestamp: u64,
    pub current_shape: Shape,
    pub dim_metadata: Vec<DecodedDimension<'a>>,
    /// Data reshaped to `current_shape`
    pub data: NdArray<'a>,
    /// Errors reshaped to `current_shape` (`None` if absent)
    pub errors: Option<NdArray<'a>>,
    /// `None` if absent
    pub last_metadata_timestamp: Option<u64>,
    /// Free text (empty if absent)
    pub info: &'a str,
}

impl DecodedHistogram<'_> {
    /// Copy into an owned histogram that no longer borrows the buffer
    ///
    /// Empty source and info become `None`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` if `current_shape` has an extent that does
    /// not fit the wire's `u32`.
    pub fn to_owned(&self) -> Result<Histogram> {
        Ok(Histogram {
            source: non_empty(self.source),
            timestamp: self.timestamp,
            current_shape: self.current_shape.to_u32()?,
            dim_metadata: self.dim_metadata.iter().map(DecodedDimension::to_owned).collect(),
            data: self.data.values().to_owned(),
            errors: self.errors.as_ref().map(|e| e.values().to_owned()),
            last_metadata_timestamp: self.last_metadata_timestamp,
            info: non_empty(self.info),
        })
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_owned())
}

#[cfg(test)]
#[path = "histogram_test.rs"]
mod histogram_test;
