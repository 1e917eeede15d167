//! Value encoding
//!
//! Every variant is written as its one-field wrapper table. The table
//! offset and the discriminant are returned together; the caller stores
//! them in the union's two slots of its own table.

use super::{Value, ValueElement, ValueType};
use crate::Result;
use crate::flatbuf::{FlatBuilder, UOffset};

/// Write `value` as a wrapper table and report its discriminant
pub fn encode_value(fbb: &mut FlatBuilder, value: &Value) -> Result<(UOffset, ValueType)> {
    match value {
        Value::I8(v) => encode_scalar(fbb, *v),
        Value::U8(v) => encode_scalar(fbb, *v),
        Value::I16(v) => encode_scalar(fbb, *v),
        Value::U16(v) => encode_scalar(fbb, *v),
        Value::I32(v) => encode_scalar(fbb, *v),
        Value::U32(v) => encode_scalar(fbb, *v),
        Value::I64(v) => encode_scalar(fbb, *v),
        Value::U64(v) => encode_scalar(fbb, *v),
        Value::F32(v) => encode_scalar(fbb, *v),
        Value::F64(v) => encode_scalar(fbb, *v),
        Value::String(s) => encode_string(fbb, s),
        Value::ArrayI8(v) => encode_array(fbb, v),
        Value::ArrayU8(v) => encode_array(fbb, v),
        Value::ArrayI16(v) => encode_array(fbb, v),
        Value::ArrayU16(v) => encode_array(fbb, v),
        Value::ArrayI32(v) => encode_array(fbb, v),
        Value::ArrayU32(v) => encode_array(fbb, v),
        Value::ArrayI64(v) => encode_array(fbb, v),
        Value::ArrayU64(v) => encode_array(fbb, v),
        Value::ArrayF32(v) => encode_array(fbb, v),
        Value::ArrayF64(v) => encode_array(fbb, v),
        Value::ArrayString(v) => encode_string_array(fbb, v),
    }
}

/// Write a scalar wrapper table
///
/// The value is always written, even when zero, so the decoded table
/// carries the field explicitly.
pub fn encode_scalar<T: ValueElement>(fbb: &mut FlatBuilder, value: T) -> Result<(UOffset, ValueType)> {
    fbb.start_table()?;
    fbb.push_slot_always(0, value)?;
    Ok((fbb.end_table()?, T::SCALAR))
}

/// Write an array wrapper table around a vector of `T`
pub fn encode_array<T: ValueElement>(fbb: &mut FlatBuilder, values: &[T]) -> Result<(UOffset, ValueType)> {
    let vector = fbb.create_vector(values)?;
    Ok((wrap_offset(fbb, vector)?, T::ARRAY))
}

/// Write a string wrapper table
pub fn encode_string(fbb: &mut FlatBuilder, s: &str) -> Result<(UOffset, ValueType)> {
    let string = fbb.create_string(s)?;
    Ok((wrap_offset(fbb, string)?, ValueType::String))
}

/// Write a string-array wrapper table
pub fn encode_string_array<S: AsRef<str>>(fbb: &mut FlatBuilder, values: &[S]) -> Result<(UOffset, ValueType)> {
    let offsets = create_strings(fbb, values)?;
    let vector = fbb.create_vector_of_offsets(&offsets)?;
    Ok((wrap_offset(fbb, vector)?, ValueType::ArrayString))
}

/// Write every string before the vector that will reference them
///
/// Strings are written last-to-first so they appear in order in memory; the
/// returned offsets are in input order.
fn create_strings<S: AsRef<str>>(fbb: &mut FlatBuilder, values: &[S]) -> Result<Vec<UOffset>> {
    let mut offsets = values
        .iter()
        .rev()
        .map(|s| fbb.create_string(s.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    offsets.reverse();
    Ok(offsets)
}

fn wrap_offset(fbb: &mut FlatBuilder, child: UOffset) -> Result<UOffset> {
    fbb.start_table()?;
    fbb.push_slot_offset(0, child)?;
    fbb.end_table()
}
