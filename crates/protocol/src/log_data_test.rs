//! Tests for f142 log value messages

use super::*;
use crate::flatbuf::FlatTable;
use crate::value::ValueType;
use serde_json::json;

fn encode(value: Value) -> Bytes {
    encode_log_value(&value, "test_source", 1_234_567_890, None, None).unwrap()
}

fn assert_round_trip(value: Value) {
    let buf = encode(value.clone());
    let decoded = decode_log_value(&buf).unwrap();
    assert_eq!(decoded.value.value_type(), value.value_type());
    assert_eq!(decoded.value.to_owned().unwrap(), value);
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_round_trip_envelope_fields() {
    let buf = encode_log_value(
        &Value::F64(21.5),
        "temperature:sensor_1",
        1_700_000_000_123_456_789,
        None,
        None,
    )
    .unwrap();

    let decoded = decode_log_value(&buf).unwrap();
    assert_eq!(decoded.source_name, "temperature:sensor_1");
    assert_eq!(decoded.timestamp_unix_ns, 1_700_000_000_123_456_789);
    assert_eq!(decoded.value, ValueRef::F64(21.5));
}

#[test]
fn test_round_trip_all_scalar_types() {
    assert_round_trip(Value::I8(-128));
    assert_round_trip(Value::U8(255));
    assert_round_trip(Value::I16(-1234));
    assert_round_trip(Value::U16(65535));
    assert_round_trip(Value::I32(-123_456));
    assert_round_trip(Value::U32(3_000_000_000));
    assert_round_trip(Value::I64(-9_000_000_000));
    assert_round_trip(Value::U64(18_000_000_000_000_000_000));
    assert_round_trip(Value::F32(2.5));
    assert_round_trip(Value::F64(1e-300));
    assert_round_trip(Value::from("some text"));
}

#[test]
fn test_round_trip_all_array_types() {
    assert_round_trip(Value::ArrayI8(vec![-1, 2, -3]));
    assert_round_trip(Value::ArrayU8(vec![1, 2, 3]));
    assert_round_trip(Value::ArrayI16(vec![-1000, 1000]));
    assert_round_trip(Value::ArrayU16(vec![1, 2, 3, 4]));
    assert_round_trip(Value::ArrayI32(vec![i32::MIN, i32::MAX]));
    assert_round_trip(Value::ArrayU32(vec![u32::MAX]));
    assert_round_trip(Value::ArrayI64(vec![1, -1]));
    assert_round_trip(Value::ArrayU64(vec![u64::MAX, 0]));
    assert_round_trip(Value::ArrayF32(vec![1.5, -1.5]));
    assert_round_trip(Value::ArrayF64(vec![0.1, 0.2, 0.3]));
    assert_round_trip(Value::from(vec!["alpha", "beta", "gamma"]));
}

#[test]
fn test_u16_array_not_widened() {
    let buf = encode(Value::ArrayU16(vec![1, 2, 3]));
    let decoded = decode_log_value(&buf).unwrap();
    assert_eq!(decoded.value.value_type(), ValueType::ArrayUShort);
    let ValueRef::ArrayU16(view) = decoded.value else {
        panic!("expected u16 array, got {:?}", decoded.value);
    };
    assert_eq!(view.to_vec(), vec![1u16, 2, 3]);
}

#[test]
fn test_json_input_inference() {
    let cases = [
        (json!(42), Value::I64(42)),
        (json!(2.5), Value::F64(2.5)),
        (json!("on"), Value::String("on".into())),
        (json!([1, 2]), Value::ArrayI64(vec![1, 2])),
        (json!(["x", "y"]), Value::ArrayString(vec!["x".into(), "y".into()])),
    ];
    for (input, expected) in cases {
        let value = Value::from_json(&input).unwrap();
        assert_eq!(value, expected);
        assert_round_trip(value);
    }
}

#[test]
fn test_complex_number_rejected_before_encoding() {
    let result = Value::from_json(&json!({"re": 1.0, "im": -1.0}));
    assert!(matches!(result, Err(ProtocolError::UnsupportedType(_))));
}

#[test]
fn test_missing_source_name_decodes_empty() {
    let buf = encode_log_value(&Value::I32(1), "", 0, None, None).unwrap();
    let decoded = decode_log_value(&buf).unwrap();
    assert_eq!(decoded.source_name, "");
    assert_eq!(decoded.timestamp_unix_ns, 0);
}

// =============================================================================
// Alarm Tests
// =============================================================================

#[test]
fn test_alarm_defaults_when_absent() {
    let buf = encode(Value::I32(7));
    let decoded = decode_log_value(&buf).unwrap();
    assert_eq!(decoded.alarm_status, AlarmStatus::NoChange);
    assert_eq!(decoded.alarm_severity, AlarmSeverity::NoChange);
}

#[test]
fn test_alarm_round_trip() {
    let buf = encode_log_value(
        &Value::F64(99.0),
        "pv",
        1,
        Some(AlarmStatus::HiHi),
        Some(AlarmSeverity::Major),
    )
    .unwrap();
    let decoded = decode_log_value(&buf).unwrap();
    assert_eq!(decoded.alarm_status, AlarmStatus::HiHi);
    assert_eq!(decoded.alarm_severity, AlarmSeverity::Major);
}

#[test]
fn test_alarm_no_change_written_explicitly() {
    let buf = encode_log_value(&Value::F64(1.0), "pv", 1, Some(AlarmStatus::NoChange), None).unwrap();
    let root = FlatTable::root(&buf).unwrap();
    assert!(root.has_field(4));
    assert!(!root.has_field(5));
}

#[test]
fn test_severity_without_status_not_emitted() {
    let buf = encode_log_value(&Value::I32(1), "pv", 1, None, Some(AlarmSeverity::Major)).unwrap();

    let root = FlatTable::root(&buf).unwrap();
    assert!(!root.has_field(4));
    assert!(!root.has_field(5));

    let decoded = decode_log_value(&buf).unwrap();
    assert_eq!(decoded.alarm_status, AlarmStatus::NoChange);
    assert_eq!(decoded.alarm_severity, AlarmSeverity::NoChange);
}

#[test]
fn test_alarm_enum_wire_values() {
    assert_eq!(AlarmStatus::NoAlarm.as_u16(), 0);
    assert_eq!(AlarmStatus::WriteAccess.as_u16(), 21);
    assert_eq!(AlarmStatus::NoChange.as_u16(), 22);
    assert_eq!(AlarmSeverity::Minor.as_u16(), 0);
    assert_eq!(AlarmSeverity::NoChange.as_u16(), 4);

    for v in 0..=22u16 {
        assert_eq!(AlarmStatus::from_u16(v).unwrap().as_u16(), v);
    }
    for v in 0..=4u16 {
        assert_eq!(AlarmSeverity::from_u16(v).unwrap().as_u16(), v);
    }
    assert_eq!(AlarmStatus::from_u16(23), None);
    assert_eq!(AlarmSeverity::from_u16(5), None);
}

// =============================================================================
// Framing Tests
// =============================================================================

#[test]
fn test_schema_id_stamped() {
    let buf = encode(Value::I8(1));
    assert_eq!(&buf[4..8], b"f142");
}

#[test]
fn test_decode_rejects_other_schema() {
    let mut buf = encode(Value::I8(1)).to_vec();
    buf[4..8].copy_from_slice(b"hs00");

    let result = decode_log_value(&buf);
    assert!(matches!(
        result,
        Err(ProtocolError::SchemaMismatch { expected, actual })
            if expected == SchemaId::LOG_DATA && actual == SchemaId::HISTOGRAM
    ));
}

#[test]
fn test_decode_too_short() {
    let result = decode_log_value(&[0, 0, 0]);
    assert!(matches!(result, Err(ProtocolError::MessageTooShort { .. })));
}

#[test]
fn test_encode_with_small_limit() {
    let config = CodecConfig {
        max_message_size: 64,
        ..CodecConfig::default()
    };
    let result = encode_log_value_with(&config, &Value::ArrayF64(vec![0.0; 100]), "pv", 0, None, None);
    assert!(matches!(result, Err(ProtocolError::BufferOverflow { .. })));
}

#[test]
fn test_encode_with_tiny_initial_capacity() {
    let config = CodecConfig {
        initial_capacity: 8,
        ..CodecConfig::default()
    };
    let value = Value::ArrayI64((0..1000).collect());
    let buf = encode_log_value_with(&config, &value, "growing", 5, None, None).unwrap();
    let decoded = decode_log_value(&buf).unwrap();
    assert_eq!(decoded.value.to_owned().unwrap(), value);
}
