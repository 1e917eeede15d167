//! Histogram decoding

use super::encode::{dim_field, field};
use super::{ArrayType, DecodedDimension, DecodedHistogram, HistogramArrayRef, NdArray, Shape};
use crate::flatbuf::FlatTable;
use crate::schema::SchemaId;
use crate::value::decode_array;
use crate::{ProtocolError, Result};

/// Decode a histogram message
///
/// The shape is read first; data and errors are then reshaped to it.
///
/// # Errors
///
/// `SchemaMismatch` if the buffer is not tagged `hs00`; `CorruptMessage` if
/// the shape or data is missing or an array discriminant is unknown;
/// `ShapeMismatch` if data or errors do not fill the shape.
pub fn decode_histogram(buf: &[u8]) -> Result<DecodedHistogram<'_>> {
    SchemaId::HISTOGRAM.check(buf)?;
    let root = FlatTable::root(buf)?;

    let current_shape = root
        .read_vector::<u32>(field::CURRENT_SHAPE.into())?
        .ok_or_else(|| ProtocolError::missing_field("current_shape"))?;
    let current_shape = Shape::from_u32(&current_shape.to_vec());

    let dim_metadata = root
        .read_vector_of_tables(field::DIM_METADATA.into())?
        .unwrap_or_default()
        .iter()
        .map(decode_dimension)
        .collect::<Result<Vec<_>>>()?;

    let data = decode_histogram_array(&root, field::DATA_TYPE)?
        .ok_or_else(|| ProtocolError::missing_field("data"))?;
    let data = NdArray::new(current_shape.clone(), data, "data")?;

    let errors = decode_histogram_array(&root, field::ERRORS_TYPE)?
        .map(|errors| NdArray::new(current_shape.clone(), errors, "errors"))
        .transpose()?;

    let last_metadata_timestamp = root
        .has_field(field::LAST_METADATA_TIMESTAMP.into())
        .then(|| root.read_u64(field::LAST_METADATA_TIMESTAMP.into(), 0));

    Ok(DecodedHistogram {
        source: root.read_string(field::SOURCE.into())?.unwrap_or_default(),
        timestamp: root.read_u64(field::TIMESTAMP.into(), 0),
        current_shape,
        dim_metadata,
        data,
        errors,
        last_metadata_timestamp,
        info: root.read_string(field::INFO.into())?.unwrap_or_default(),
    })
}

fn decode_dimension<'a>(table: &FlatTable<'a>) -> Result<DecodedDimension<'a>> {
    let bin_boundaries = decode_histogram_array(table, dim_field::BIN_BOUNDARIES_TYPE)?
        .ok_or_else(|| ProtocolError::missing_field("bin_boundaries"))?;

    Ok(DecodedDimension {
        length: table.read_scalar(dim_field::LENGTH.into(), 0u32),
        unit: table.read_string(dim_field::UNIT.into())?.unwrap_or_default(),
        label: table.read_string(dim_field::LABEL.into())?.unwrap_or_default(),
        bin_boundaries,
    })
}

/// Decode the `Array` union whose type byte is at `type_field`
///
/// Returns `None` when the union is absent (NONE tag and no table).
fn decode_histogram_array<'a>(table: &FlatTable<'a>, type_field: u16) -> Result<Option<HistogramArrayRef<'a>>> {
    let (tag, wrapper) = table.read_union(type_field.into())?;
    let wrapper = match (tag, wrapper) {
        (0, None) => return Ok(None),
        (_, Some(wrapper)) => wrapper,
        (_, None) => {
            return Err(ProtocolError::corrupt(format!(
                "histogram array tag {tag} without a value table"
            )));
        }
    };

    let array_type = ArrayType::from_u8(tag)
        .ok_or_else(|| ProtocolError::corrupt(format!("unknown histogram array discriminant {tag}")))?;

    Ok(Some(match array_type {
        ArrayType::UInt => HistogramArrayRef::U32(decode_array(&wrapper)?),
        ArrayType::ULong => HistogramArrayRef::U64(decode_array(&wrapper)?),
        ArrayType::Double => HistogramArrayRef::F64(decode_array(&wrapper)?),
        ArrayType::Float => HistogramArrayRef::F32(decode_array(&wrapper)?),
    }))
}
