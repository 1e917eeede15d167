//! Tests for hs00 histograms

use super::*;
use crate::config::ShapeValidation;
use crate::flatbuf::FlatTable;
use crate::schema::SchemaId;
use crate::CodecConfig;
use serde_json::json;

fn full_1d() -> Histogram {
    Histogram {
        source: Some("some_source".into()),
        timestamp: 123_456,
        current_shape: vec![5],
        dim_metadata: vec![DimensionMetaData::new(5, "m", "some_label", vec![0u64, 1, 2, 3, 4, 5])],
        data: vec![1u64, 2, 3, 4, 5].into(),
        errors: Some(vec![5u64, 4, 3, 2, 1].into()),
        last_metadata_timestamp: Some(123_456),
        info: Some("info_string".into()),
    }
}

fn deferred() -> CodecConfig {
    CodecConfig {
        shape_validation: ShapeValidation::Deferred,
        ..CodecConfig::default()
    }
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_full_1d_round_trip() {
    let original = full_1d();
    let buf = encode_histogram(&original).unwrap();
    assert_eq!(&buf[4..8], b"hs00");

    let decoded = decode_histogram(&buf).unwrap();
    assert_eq!(decoded.source, "some_source");
    assert_eq!(decoded.timestamp, 123_456);
    assert_eq!(decoded.current_shape.dims(), &[5]);
    assert_eq!(decoded.dim_metadata.len(), 1);

    let dim = &decoded.dim_metadata[0];
    assert_eq!(dim.length, 5);
    assert_eq!(dim.unit, "m");
    assert_eq!(dim.label, "some_label");
    assert_eq!(dim.bin_boundaries.array_type(), ArrayType::ULong);
    assert_eq!(dim.bin_boundaries.to_owned(), HistogramArray::U64(vec![0, 1, 2, 3, 4, 5]));

    assert_eq!(decoded.data.values().to_owned(), HistogramArray::U64(vec![1, 2, 3, 4, 5]));
    let errors = decoded.errors.as_ref().unwrap();
    assert_eq!(errors.values().to_owned(), HistogramArray::U64(vec![5, 4, 3, 2, 1]));
    assert_eq!(decoded.info, "info_string");
    assert_eq!(decoded.last_metadata_timestamp, Some(123_456));

    assert_eq!(decoded.to_owned().unwrap(), original);
}

#[test]
fn test_minimal_1d_defaults() {
    let original = Histogram {
        timestamp: 123_456,
        current_shape: vec![5],
        dim_metadata: vec![DimensionMetaData::new(5, "m", "some_label", vec![0.0f64, 1.0, 2.0, 3.0, 4.0, 5.0])],
        data: vec![1.0f64, 2.0, 3.0, 4.0, 5.0].into(),
        ..Histogram::default()
    };
    let buf = encode_histogram(&original).unwrap();
    let decoded = decode_histogram(&buf).unwrap();

    assert_eq!(decoded.source, "");
    assert_eq!(decoded.info, "");
    assert!(decoded.errors.is_none());
    assert_eq!(decoded.last_metadata_timestamp, None);
    assert_eq!(decoded.to_owned().unwrap(), original);
}

#[test]
fn test_2d_round_trip_row_major() {
    let original = Histogram {
        timestamp: 1,
        current_shape: vec![2, 5],
        dim_metadata: vec![
            DimensionMetaData::new(2, "b", "x", vec![10.0f64, 11.0, 12.0]),
            DimensionMetaData::new(5, "m", "y", vec![0.0f64, 1.0, 2.0, 3.0, 4.0, 5.0]),
        ],
        data: vec![1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0].into(),
        errors: Some(vec![5.0f64, 4.0, 3.0, 2.0, 1.0, 10.0, 9.0, 8.0, 7.0, 6.0].into()),
        ..Histogram::default()
    };

    let buf = encode_histogram(&original).unwrap();
    let decoded = decode_histogram(&buf).unwrap();

    assert_eq!(decoded.data.ndim(), 2);
    assert_eq!(decoded.data.get_f64(&[0, 0]), Some(1.0));
    assert_eq!(decoded.data.get_f64(&[0, 4]), Some(5.0));
    assert_eq!(decoded.data.get_f64(&[1, 0]), Some(6.0));
    assert_eq!(decoded.data.get_f64(&[1, 4]), Some(10.0));
    assert_eq!(decoded.data.get_f64(&[2, 0]), None);

    let row = decoded.data.subarray(1).unwrap();
    assert_eq!(row.shape().dims(), &[5]);
    assert_eq!(row.values().to_owned(), HistogramArray::F64(vec![6.0, 7.0, 8.0, 9.0, 10.0]));
    assert!(decoded.data.subarray(2).is_none());

    let errors = decoded.errors.as_ref().unwrap();
    assert_eq!(errors.shape(), decoded.data.shape());
    assert_eq!(errors.get_f64(&[1, 0]), Some(10.0));

    assert_eq!(decoded.to_owned().unwrap(), original);
}

#[test]
fn test_independent_array_typing() {
    let original = Histogram {
        current_shape: vec![3],
        dim_metadata: vec![DimensionMetaData::new(3, "", "", vec![0u32, 1, 2, 3])],
        data: vec![0.5f64, 1.5, 2.5].into(),
        errors: Some(vec![1u64, 2, 3].into()),
        ..Histogram::default()
    };
    let buf = encode_histogram(&original).unwrap();
    let decoded = decode_histogram(&buf).unwrap();

    assert_eq!(decoded.data.values().array_type(), ArrayType::Double);
    assert_eq!(decoded.errors.as_ref().unwrap().values().array_type(), ArrayType::ULong);
    assert_eq!(decoded.dim_metadata[0].bin_boundaries.array_type(), ArrayType::UInt);
    assert_eq!(decoded.to_owned().unwrap(), original);
}

#[test]
fn test_f32_data() {
    let original = Histogram {
        current_shape: vec![2],
        dim_metadata: vec![DimensionMetaData::new(2, "s", "t", vec![0.0f32, 1.0, 2.0])],
        data: vec![0.25f32, 0.75].into(),
        ..Histogram::default()
    };
    let buf = encode_histogram(&original).unwrap();
    let decoded = decode_histogram(&buf).unwrap();
    assert_eq!(decoded.data.values().array_type(), ArrayType::Float);
    assert_eq!(decoded.to_owned().unwrap(), original);
}

#[test]
fn test_explicit_zero_last_metadata_timestamp() {
    let original = Histogram {
        current_shape: vec![1],
        dim_metadata: vec![DimensionMetaData::new(1, "", "", vec![0u64, 1])],
        data: vec![7u64].into(),
        last_metadata_timestamp: Some(0),
        ..Histogram::default()
    };
    let buf = encode_histogram(&original).unwrap();
    let decoded = decode_histogram(&buf).unwrap();
    assert_eq!(decoded.last_metadata_timestamp, Some(0));
}

// =============================================================================
// Shape Validation Tests
// =============================================================================

#[test]
fn test_strict_rejects_short_data() {
    let mut histogram = full_1d();
    histogram.data = vec![1u64, 2, 3].into();
    let result = encode_histogram(&histogram);
    assert!(matches!(
        result,
        Err(ProtocolError::ShapeMismatch { field: "data", expected: 5, actual: 3 })
    ));
}

#[test]
fn test_strict_rejects_mismatched_errors() {
    let mut histogram = full_1d();
    histogram.errors = Some(vec![1u64].into());
    let result = encode_histogram(&histogram);
    assert!(matches!(
        result,
        Err(ProtocolError::ShapeMismatch { field: "errors", expected: 5, actual: 1 })
    ));
}

#[test]
fn test_strict_rejects_missing_dimension_record() {
    let mut histogram = full_1d();
    histogram.current_shape = vec![5, 1];
    let result = encode_histogram(&histogram);
    assert!(matches!(
        result,
        Err(ProtocolError::ShapeMismatch { field: "dim_metadata", expected: 2, actual: 1 })
    ));
}

#[test]
fn test_deferred_encodes_then_decode_rejects() {
    let mut histogram = full_1d();
    histogram.data = vec![1u64, 2, 3].into();

    let buf = encode_histogram_with(&deferred(), &histogram).unwrap();
    let result = decode_histogram(&buf);
    assert!(matches!(
        result,
        Err(ProtocolError::ShapeMismatch { field: "data", expected: 5, actual: 3 })
    ));
}

#[test]
fn test_deferred_allows_dimension_count_mismatch() {
    let mut histogram = full_1d();
    histogram.dim_metadata.clear();
    let buf = encode_histogram_with(&deferred(), &histogram).unwrap();
    let decoded = decode_histogram(&buf).unwrap();
    assert!(decoded.dim_metadata.is_empty());
}

// =============================================================================
// Decode Error Tests
// =============================================================================

#[test]
fn test_decode_rejects_other_schema() {
    let mut buf = encode_histogram(&full_1d()).unwrap().to_vec();
    buf[4..8].copy_from_slice(b"f142");
    let result = decode_histogram(&buf);
    assert!(matches!(
        result,
        Err(ProtocolError::SchemaMismatch { expected, .. }) if expected == SchemaId::HISTOGRAM
    ));
}

#[test]
fn test_decode_unknown_data_discriminant() {
    let mut buf = encode_histogram(&full_1d()).unwrap().to_vec();

    // Locate the data_type byte through the root vtable and corrupt it
    let root = FlatTable::root(&buf).unwrap();
    assert_eq!(root.read_u8(6, 0), ArrayType::ULong.as_u8());
    let table_pos = u32::from_le_bytes(buf[0..4].try_into().unwrap()) as usize;
    let soffset = i32::from_le_bytes(buf[table_pos..table_pos + 4].try_into().unwrap());
    let vtable_pos = (table_pos as i64 - i64::from(soffset)) as usize;
    let slot = vtable_pos + 4 + 6 * 2;
    let field_offset = u16::from_le_bytes(buf[slot..slot + 2].try_into().unwrap()) as usize;
    buf[table_pos + field_offset] = 9;

    let result = decode_histogram(&buf);
    assert!(matches!(result, Err(ProtocolError::CorruptMessage(msg)) if msg.contains('9')));
}

// =============================================================================
// Array Conversion Tests
// =============================================================================

#[test]
fn test_native_arrays_preserved() {
    assert_eq!(HistogramArray::from(vec![1u32]).array_type(), ArrayType::UInt);
    assert_eq!(HistogramArray::from(vec![1u64]).array_type(), ArrayType::ULong);
    assert_eq!(HistogramArray::from(vec![1.0f32]).array_type(), ArrayType::Float);
    assert_eq!(HistogramArray::from(vec![1.0f64]).array_type(), ArrayType::Double);
}

#[test]
fn test_unsigned_promotion() {
    assert_eq!(HistogramArray::from(vec![1u8, 2]), HistogramArray::U64(vec![1, 2]));
    assert_eq!(HistogramArray::from(vec![300u16]), HistogramArray::U64(vec![300]));
    assert_eq!(HistogramArray::from(vec![7usize]), HistogramArray::U64(vec![7]));
}

#[test]
fn test_signed_promotion() {
    assert_eq!(
        HistogramArray::try_from(vec![0i64, 5, 10]).unwrap(),
        HistogramArray::U64(vec![0, 5, 10])
    );
    assert_eq!(HistogramArray::try_from(vec![3i32]).unwrap(), HistogramArray::U64(vec![3]));

    let result = HistogramArray::try_from(vec![1i32, -1]);
    assert!(matches!(result, Err(ProtocolError::UnsupportedType(_))));
}

#[test]
fn test_json_arrays() {
    assert_eq!(
        HistogramArray::from_json(&json!([1, 2, 3])).unwrap(),
        HistogramArray::U64(vec![1, 2, 3])
    );
    assert_eq!(
        HistogramArray::from_json(&json!([1, 2.5])).unwrap(),
        HistogramArray::F64(vec![1.0, 2.5])
    );
    assert_eq!(
        HistogramArray::from_json(&json!([[1, 2], [3, 4]])).unwrap(),
        HistogramArray::U64(vec![1, 2, 3, 4])
    );
    assert_eq!(HistogramArray::from_json(&json!([])).unwrap(), HistogramArray::F64(vec![]));

    assert_eq!(
        HistogramArray::from_json(&json!([-1.5, 2])).unwrap(),
        HistogramArray::F64(vec![-1.5, 2.0])
    );

    let result = HistogramArray::try_from(&json!(["a"]));
    assert!(matches!(result, Err(ProtocolError::UnsupportedType(_))));
    let result = HistogramArray::try_from(&json!({"re": 1, "im": 0}));
    assert!(matches!(result, Err(ProtocolError::UnsupportedType(_))));
}

#[test]
fn test_array_type_tags() {
    for tag in 1..=4u8 {
        assert_eq!(ArrayType::from_u8(tag).unwrap().as_u8(), tag);
    }
    assert_eq!(ArrayType::from_u8(0), None);
    assert_eq!(ArrayType::from_u8(5), None);
    assert_eq!(ArrayType::Double.to_string(), "ArrayDouble");
}

// =============================================================================
// Shape Tests
// =============================================================================

#[test]
fn test_shape_arithmetic() {
    let shape = Shape::new(vec![2, 3, 4]);
    assert_eq!(shape.rank(), 3);
    assert_eq!(shape.element_count(), Some(24));
    assert_eq!(shape.strides(), vec![12, 4, 1]);
    assert_eq!(shape.flat_index(&[1, 2, 3]), Some(23));
    assert_eq!(shape.flat_index(&[0, 1, 0]), Some(4));
    assert_eq!(shape.flat_index(&[2, 0, 0]), None);
    assert_eq!(shape.flat_index(&[0, 0]), None);
    assert_eq!(shape.unravel(23), Some(vec![1, 2, 3]));
    assert_eq!(shape.unravel(24), None);
    assert_eq!(shape.inner(), Shape::new(vec![3, 4]));
}

#[test]
fn test_shape_edge_cases() {
    let scalar = Shape::new(vec![]);
    assert_eq!(scalar.element_count(), Some(1));
    assert_eq!(scalar.flat_index(&[]), Some(0));

    let empty = Shape::new(vec![3, 0]);
    assert_eq!(empty.element_count(), Some(0));
    assert_eq!(empty.unravel(0), None);

    let huge = Shape::new(vec![usize::MAX, 2]);
    assert_eq!(huge.element_count(), None);

    assert_eq!(Shape::from_u32(&[2, 3]).to_u32().unwrap(), vec![2, 3]);
}

#[test]
fn test_json_negative_integers_rejected_like_native() {
    let json = HistogramArray::from_json(&json!([1, -2, 3]));
    assert!(matches!(json, Err(ProtocolError::UnsupportedType(_))));

    let native = HistogramArray::try_from(vec![1i64, -2, 3]);
    assert!(matches!(native, Err(ProtocolError::UnsupportedType(_))));
}

#[cfg(target_pointer_width = "64")]
#[test]
fn test_shape_extent_beyond_u32_rejected() {
    let shape = Shape::new(vec![2, u32::MAX as usize + 1]);
    assert!(matches!(shape.to_u32(), Err(ProtocolError::UnsupportedType(_))));
}

#[test]
fn test_decoded_to_owned_rejects_oversized_shape() {
    let buf = encode_histogram(&full_1d()).unwrap();
    let mut decoded = decode_histogram(&buf).unwrap();
    decoded.current_shape = Shape::new(vec![usize::MAX]);
    assert!(matches!(decoded.to_owned(), Err(ProtocolError::UnsupportedType(_))));
}

#[test]
fn test_array_get_huge_index() {
    let buf = encode_histogram(&full_1d()).unwrap();
    let decoded = decode_histogram(&buf).unwrap();
    let values = decoded.data.values();
    assert_eq!(values.get_f64(4), Some(5.0));
    assert_eq!(values.get_f64(5), None);
    assert_eq!(values.get_f64(usize::MAX / 8), None);
    assert_eq!(values.get_f64(usize::MAX), None);
}
