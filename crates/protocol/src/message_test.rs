//! Tests for schema-based dispatch

use super::*;
use crate::histogram::{DimensionMetaData, Histogram, encode_histogram};
use crate::log_data::encode_log_value;
use crate::messages::{
    CacheEntry, ConfigUpdate, ConnectionInfo, EventData, RunStart, RunStop, Status, Timestamps,
    encode_cache_entry, encode_config_update, encode_connection_info, encode_event_data,
    encode_run_start, encode_run_stop, encode_status, encode_timestamps,
};
use crate::schema::SchemaId;
use crate::value::Value;
use crate::ProtocolError;

fn sample_histogram() -> Histogram {
    Histogram {
        current_shape: vec![2],
        dim_metadata: vec![DimensionMetaData::new(2, "us", "tof", vec![0.0f64, 1.0, 2.0])],
        data: vec![3u64, 4].into(),
        ..Histogram::default()
    }
}

#[test]
fn test_dispatch_every_kind() {
    let buffers = [
        (
            encode_log_value(&Value::F32(1.0), "pv", 1, None, None).unwrap(),
            MessageKind::LogData,
        ),
        (encode_histogram(&sample_histogram()).unwrap(), MessageKind::Histogram),
        (encode_event_data(&EventData::default()).unwrap(), MessageKind::EventData),
        (encode_run_stop(&RunStop::new("job")).unwrap(), MessageKind::RunStop),
        (
            encode_connection_info(&ConnectionInfo::default()).unwrap(),
            MessageKind::ConnectionInfo,
        ),
        (encode_timestamps(&Timestamps::default()).unwrap(), MessageKind::Timestamps),
        (encode_run_start(&RunStart::new("job", "file.nxs")).unwrap(), MessageKind::RunStart),
        (encode_status(&Status::default()).unwrap(), MessageKind::Status),
        (encode_cache_entry(&CacheEntry::default()).unwrap(), MessageKind::CacheEntry),
        (
            encode_config_update(&ConfigUpdate::default()).unwrap(),
            MessageKind::ForwarderConfig,
        ),
    ];
    assert_eq!(buffers.len(), MessageKind::ALL.len());

    for (buf, expected) in &buffers {
        let decoded = decode_message(buf).unwrap();
        assert_eq!(decoded.kind(), *expected);
    }
}

#[test]
fn test_dispatch_preserves_payload() {
    let buf = encode_log_value(&Value::U16(7), "motor", 99, None, None).unwrap();
    let DecodedMessage::LogData(log) = decode_message(&buf).unwrap() else {
        panic!("expected log data");
    };
    assert_eq!(log.source_name, "motor");
    assert_eq!(log.value.to_owned().unwrap(), Value::U16(7));
}

#[test]
fn test_dispatch_unknown_schema() {
    let mut buf = encode_run_stop(&RunStop::new("job")).unwrap().to_vec();
    buf[4..8].copy_from_slice(b"zz99");

    let result = decode_message(&buf);
    assert!(matches!(
        result,
        Err(ProtocolError::UnknownSchema(id)) if id == SchemaId::new(*b"zz99")
    ));
}

#[test]
fn test_dispatch_too_short() {
    let result = decode_message(b"abc");
    assert!(matches!(result, Err(ProtocolError::MessageTooShort { .. })));
}

#[test]
fn test_dispatch_propagates_decode_errors() {
    let mut histogram = sample_histogram();
    histogram.data = vec![1u64].into();
    let config = crate::CodecConfig {
        shape_validation: crate::ShapeValidation::Deferred,
        ..crate::CodecConfig::default()
    };
    let buf = crate::histogram::encode_histogram_with(&config, &histogram).unwrap();

    let result = decode_message(&buf);
    assert!(matches!(result, Err(ProtocolError::ShapeMismatch { .. })));
}
