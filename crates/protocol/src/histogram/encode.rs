//! Histogram encoding

use bytes::Bytes;

use super::{ArrayType, DimensionMetaData, Histogram, HistogramArray, Shape};
use crate::config::ShapeValidation;
use crate::envelope::{Envelope, Header};
use crate::flatbuf::{FlatBuilder, UOffset};
use crate::schema::SchemaId;
use crate::value::encode_array;
use crate::{CodecConfig, ProtocolError, Result};

pub(super) mod field {
    pub const SOURCE: u16 = 0;
    pub const TIMESTAMP: u16 = 1;
    pub const DIM_METADATA: u16 = 2;
    pub const LAST_METADATA_TIMESTAMP: u16 = 3;
    pub const CURRENT_SHAPE: u16 = 4;
    pub const DATA_TYPE: u16 = 6;
    pub const DATA: u16 = 7;
    pub const ERRORS_TYPE: u16 = 8;
    pub const ERRORS: u16 = 9;
    pub const INFO: u16 = 10;
}

pub(super) mod dim_field {
    pub const LENGTH: u16 = 0;
    pub const UNIT: u16 = 1;
    pub const LABEL: u16 = 2;
    pub const BIN_BOUNDARIES_TYPE: u16 = 3;
    pub const BIN_BOUNDARIES: u16 = 4;
}

/// Encode a histogram with the default codec config
pub fn encode_histogram(histogram: &Histogram) -> Result<Bytes> {
    encode_histogram_with(&CodecConfig::default(), histogram)
}

/// Encode a histogram with an explicit codec config
///
/// # Errors
///
/// With [`ShapeValidation::Strict`], returns `ShapeMismatch` when the data
/// or errors element count differs from the product of `current_shape`, or
/// when the number of dimension records differs from its rank.
pub fn encode_histogram_with(config: &CodecConfig, histogram: &Histogram) -> Result<Bytes> {
    match config.shape_validation {
        ShapeValidation::Strict => validate(histogram)?,
        ShapeValidation::Deferred => {
            tracing::trace!(shape = ?histogram.current_shape, "histogram shape not validated")
        }
    }

    let mut envelope = match &histogram.source {
        Some(source) => Envelope::begin_with_source(SchemaId::HISTOGRAM, field::SOURCE, source, config)?,
        None => Envelope::begin(SchemaId::HISTOGRAM, config),
    };
    let fbb = envelope.builder();

    let dimensions = histogram
        .dim_metadata
        .iter()
        .map(|dim| encode_dimension(fbb, dim))
        .collect::<Result<Vec<_>>>()?;
    let dim_vector = fbb.create_vector_of_offsets(&dimensions)?;

    let shape = fbb.create_vector(&histogram.current_shape)?;

    let (data, data_type) = encode_histogram_array(fbb, &histogram.data)?;

    let errors = histogram
        .errors
        .as_ref()
        .map(|errors| encode_histogram_array(fbb, errors))
        .transpose()?;

    let info = histogram
        .info
        .as_deref()
        .map(|info| fbb.create_string(info))
        .transpose()?;

    envelope.start_root()?;
    let fbb = envelope.builder();
    fbb.push_slot_offset(field::DIM_METADATA, dim_vector)?;
    fbb.push_slot_offset(field::CURRENT_SHAPE, shape)?;
    fbb.push_slot_offset(field::DATA, data)?;
    fbb.push_slot(field::DATA_TYPE, data_type.as_u8(), 0)?;
    if let Some((errors, errors_type)) = errors {
        fbb.push_slot_offset(field::ERRORS, errors)?;
        fbb.push_slot(field::ERRORS_TYPE, errors_type.as_u8(), 0)?;
    }
    if let Some(info) = info {
        fbb.push_slot_offset(field::INFO, info)?;
    }
    if let Some(timestamp) = histogram.last_metadata_timestamp {
        fbb.push_slot_always(field::LAST_METADATA_TIMESTAMP, timestamp)?;
    }

    envelope.finish(Header::new().timestamp(field::TIMESTAMP, histogram.timestamp))
}

fn validate(histogram: &Histogram) -> Result<()> {
    let shape = Shape::from_u32(&histogram.current_shape);
    shape.check_len("data", histogram.data.len())?;
    if let Some(errors) = &histogram.errors {
        shape.check_len("errors", errors.len())?;
    }
    if histogram.dim_metadata.len() != shape.rank() {
        return Err(ProtocolError::shape_mismatch(
            "dim_metadata",
            shape.rank(),
            histogram.dim_metadata.len(),
        ));
    }
    Ok(())
}

fn encode_dimension(fbb: &mut FlatBuilder, dim: &DimensionMetaData) -> Result<UOffset> {
    let unit = fbb.create_string(&dim.unit)?;
    let label = fbb.create_string(&dim.label)?;
    let (bins, bins_type) = encode_histogram_array(fbb, &dim.bin_boundaries)?;

    fbb.start_table()?;
    fbb.push_slot(dim_field::LENGTH, dim.length, 0)?;
    fbb.push_slot_offset(dim_field::UNIT, unit)?;
    fbb.push_slot_offset(dim_field::LABEL, label)?;
    fbb.push_slot_offset(dim_field::BIN_BOUNDARIES, bins)?;
    fbb.push_slot(dim_field::BIN_BOUNDARIES_TYPE, bins_type.as_u8(), 0)?;
    fbb.end_table()
}

/// Write an array wrapper table and report its `Array` union discriminant
fn encode_histogram_array(fbb: &mut FlatBuilder, array: &HistogramArray) -> Result<(UOffset, ArrayType)> {
    let (offset, _) = match array {
        HistogramArray::U32(v) => encode_array(fbb, v)?,
        HistogramArray::U64(v) => encode_array(fbb, v)?,
        HistogramArray::F32(v) => encode_array(fbb, v)?,
        HistogramArray::F64(v) => encode_array(fbb, v)?,
    };
    Ok((offset, array.array_type()))
}
