//! Value decoding
//!
//! Dispatch is on the recorded discriminant only. Array and string payloads
//! come back as views into the message buffer.

use super::{ValueElement, ValueRef, ValueType};
use crate::flatbuf::{FlatTable, VectorView};
use crate::{ProtocolError, Result};

/// Decode a union member given its raw tag and wrapper table
///
/// # Errors
///
/// Returns `CorruptMessage` for the NONE tag, for unknown tags and when the
/// wrapper table is missing.
pub fn decode_value<'a>(tag: u8, table: Option<FlatTable<'a>>) -> Result<ValueRef<'a>> {
    let value_type = ValueType::from_u8(tag)
        .ok_or_else(|| ProtocolError::corrupt(format!("unknown value type discriminant {tag}")))?;
    let table =
        table.ok_or_else(|| ProtocolError::corrupt(format!("{value_type} value table is missing")))?;

    Ok(match value_type {
        ValueType::Byte => ValueRef::I8(decode_scalar(&table)),
        ValueType::UByte => ValueRef::U8(decode_scalar(&table)),
        ValueType::Short => ValueRef::I16(decode_scalar(&table)),
        ValueType::UShort => ValueRef::U16(decode_scalar(&table)),
        ValueType::Int => ValueRef::I32(decode_scalar(&table)),
        ValueType::UInt => ValueRef::U32(decode_scalar(&table)),
        ValueType::Long => ValueRef::I64(decode_scalar(&table)),
        ValueType::ULong => ValueRef::U64(decode_scalar(&table)),
        ValueType::Float => ValueRef::F32(decode_scalar(&table)),
        ValueType::Double => ValueRef::F64(decode_scalar(&table)),
        ValueType::String => ValueRef::String(table.read_string(0)?.unwrap_or_default()),
        ValueType::ArrayByte => ValueRef::ArrayI8(decode_array(&table)?),
        ValueType::ArrayUByte => ValueRef::ArrayU8(decode_array(&table)?),
        ValueType::ArrayShort => ValueRef::ArrayI16(decode_array(&table)?),
        ValueType::ArrayUShort => ValueRef::ArrayU16(decode_array(&table)?),
        ValueType::ArrayInt => ValueRef::ArrayI32(decode_array(&table)?),
        ValueType::ArrayUInt => ValueRef::ArrayU32(decode_array(&table)?),
        ValueType::ArrayLong => ValueRef::ArrayI64(decode_array(&table)?),
        ValueType::ArrayULong => ValueRef::ArrayU64(decode_array(&table)?),
        ValueType::ArrayFloat => ValueRef::ArrayF32(decode_array(&table)?),
        ValueType::ArrayDouble => ValueRef::ArrayF64(decode_array(&table)?),
        ValueType::ArrayString => ValueRef::ArrayString(table.read_string_vector(0)?.unwrap_or_default()),
    })
}

/// Field 0 of a scalar wrapper; absent means the schema default (zero)
#[inline]
fn decode_scalar<T: ValueElement>(table: &FlatTable<'_>) -> T {
    table.read_scalar(0, T::default())
}

/// Field 0 of an array wrapper; an absent vector reads as empty
pub(crate) fn decode_array<'a, T: ValueElement>(table: &FlatTable<'a>) -> Result<VectorView<'a, T>> {
    let values = table.read_vector::<T>(0)?.unwrap_or_default();
    tracing::trace!(kind = %T::ARRAY, len = values.len(), "decoded array");
    Ok(values)
}
