//! Tests for fixed-schema messages

use super::*;
use crate::schema::SchemaId;
use crate::ProtocolError;

fn retag(buf: &[u8], tag: &[u8; 4]) -> Vec<u8> {
    let mut buf = buf.to_vec();
    buf[4..8].copy_from_slice(tag);
    buf
}

// =============================================================================
// ev42 Tests
// =============================================================================

fn sample_events() -> EventData {
    EventData {
        source_name: "some_source".into(),
        message_id: 123_456,
        pulse_time: 567_890,
        time_of_flight: vec![1, 2, 3, 4, 5, 6, 7, 8, 9],
        detector_id: vec![10, 20, 30, 40, 50, 60, 70, 80, 90],
        isis_data: None,
    }
}

#[test]
fn test_event_data_round_trip() {
    let original = sample_events();
    let buf = encode_event_data(&original).unwrap();
    assert_eq!(&buf[4..8], b"ev42");

    let decoded = decode_event_data(&buf).unwrap();
    assert_eq!(decoded.source_name, "some_source");
    assert_eq!(decoded.message_id, 123_456);
    assert_eq!(decoded.pulse_time, 567_890);
    assert_eq!(decoded.time_of_flight, original.time_of_flight);
    assert_eq!(decoded.detector_id, original.detector_id);
    assert_eq!(decoded.isis_data, None);
    assert_eq!(decoded.to_owned(), original);
}

#[test]
fn test_event_data_with_isis() {
    let original = EventData {
        isis_data: Some(IsisData {
            period_number: 5,
            run_state: RunState::Running,
            proton_charge: 1.25,
        }),
        ..sample_events()
    };
    let buf = encode_event_data(&original).unwrap();
    let decoded = decode_event_data(&buf).unwrap();
    assert_eq!(decoded.isis_data, original.isis_data);
    assert_eq!(decoded.to_owned(), original);
}

#[test]
fn test_event_data_isis_defaults() {
    let original = EventData {
        isis_data: Some(IsisData::default()),
        ..sample_events()
    };
    let buf = encode_event_data(&original).unwrap();
    let decoded = decode_event_data(&buf).unwrap();
    assert_eq!(
        decoded.isis_data,
        Some(IsisData {
            period_number: 0,
            run_state: RunState::Setup,
            proton_charge: 0.0,
        })
    );
}

#[test]
fn test_event_data_empty_arrays() {
    let buf = encode_event_data(&EventData::default()).unwrap();
    let decoded = decode_event_data(&buf).unwrap();
    assert!(decoded.time_of_flight.is_empty());
    assert!(decoded.detector_id.is_empty());
    assert_eq!(decoded.source_name, "");
}

#[test]
fn test_event_data_wrong_tag() {
    let buf = retag(&encode_event_data(&sample_events()).unwrap(), b"1234");
    let result = decode_event_data(&buf);
    assert!(matches!(result, Err(ProtocolError::SchemaMismatch { .. })));
}

#[test]
fn test_run_state_wire_values() {
    assert_eq!(RunState::from_i8(0), Some(RunState::Setup));
    assert_eq!(RunState::from_i8(1), Some(RunState::Running));
    assert_eq!(RunState::from_i8(2), None);
    assert_eq!(RunState::Running.as_i8(), 1);
}

// =============================================================================
// 6s4t Tests
// =============================================================================

#[test]
fn test_run_stop_round_trip() {
    let original = RunStop {
        job_id: "some_key".into(),
        run_name: "test_run".into(),
        service_id: "filewriter1".into(),
        stop_time: 578_214,
    };
    let buf = encode_run_stop(&original).unwrap();
    assert_eq!(&buf[4..8], b"6s4t");

    let decoded = decode_run_stop(&buf).unwrap();
    assert_eq!(decoded.job_id, "some_key");
    assert_eq!(decoded.run_name, "test_run");
    assert_eq!(decoded.service_id, "filewriter1");
    assert_eq!(decoded.stop_time, 578_214);
    assert_eq!(decoded.to_owned(), original);
}

#[test]
fn test_run_stop_defaults() {
    let original = RunStop::new("job");
    assert_eq!(original.run_name, "test_run");

    let buf = encode_run_stop(&original).unwrap();
    let decoded = decode_run_stop(&buf).unwrap();
    assert_eq!(decoded.service_id, "");
    assert_eq!(decoded.stop_time, 0);
    assert_eq!(decoded.to_owned(), original);
}

#[test]
fn test_run_stop_wrong_tag() {
    let buf = retag(&encode_run_stop(&RunStop::new("job")).unwrap(), b"1234");
    let result = decode_run_stop(&buf);
    assert!(matches!(
        result,
        Err(ProtocolError::SchemaMismatch { expected, actual })
            if expected == SchemaId::RUN_STOP && actual == SchemaId::new(*b"1234")
    ));
}

// =============================================================================
// ep00 Tests
// =============================================================================

#[test]
fn test_connection_info_round_trip() {
    let original = ConnectionInfo {
        timestamp_ns: 1_593_620_746_000_000_000,
        event_type: ConnectionEventType::Disconnected,
        source_name: "test_source".into(),
        service_id: Some("test_service".into()),
    };
    let buf = encode_connection_info(&original).unwrap();
    assert_eq!(&buf[4..8], b"ep00");

    let decoded = decode_connection_info(&buf).unwrap();
    assert_eq!(decoded.timestamp_ns, 1_593_620_746_000_000_000);
    assert_eq!(decoded.event_type, ConnectionEventType::Disconnected);
    assert_eq!(decoded.source_name, "test_source");
    assert_eq!(decoded.service_id, Some("test_service"));
    assert_eq!(decoded.to_owned(), original);
}

#[test]
fn test_connection_info_without_service_id() {
    let original = ConnectionInfo {
        timestamp_ns: 1,
        event_type: ConnectionEventType::Unknown,
        source_name: "pv".into(),
        service_id: None,
    };
    let buf = encode_connection_info(&original).unwrap();
    let decoded = decode_connection_info(&buf).unwrap();
    assert_eq!(decoded.service_id, None);
    assert_eq!(decoded.event_type, ConnectionEventType::Unknown);
}

#[test]
fn test_connection_info_wrong_tag() {
    let buf = retag(&encode_connection_info(&ConnectionInfo::default()).unwrap(), b"f142");
    let result = decode_connection_info(&buf);
    assert!(matches!(result, Err(ProtocolError::SchemaMismatch { .. })));
}

#[test]
fn test_connection_event_type_wire_values() {
    for v in 0..=4u16 {
        assert_eq!(ConnectionEventType::from_u16(v).unwrap().as_u16(), v);
    }
    assert_eq!(ConnectionEventType::from_u16(5), None);
    assert_eq!(ConnectionEventType::NeverConnected.as_str(), "never_connected");
}

// =============================================================================
// tdct Tests
// =============================================================================

#[test]
fn test_timestamps_round_trip() {
    let original = Timestamps {
        name: "some_name".into(),
        timestamps: vec![0, 1, 2, 3, u64::MAX],
        sequence_counter: Some(42),
    };
    let buf = encode_timestamps(&original).unwrap();
    assert_eq!(&buf[4..8], b"tdct");

    let decoded = decode_timestamps(&buf).unwrap();
    assert_eq!(decoded.name, "some_name");
    assert_eq!(decoded.timestamps, original.timestamps);
    assert_eq!(decoded.sequence_counter, Some(42));
    assert_eq!(decoded.to_owned(), original);
}

#[test]
fn test_timestamps_without_sequence_counter() {
    let original = Timestamps {
        name: "chopper".into(),
        timestamps: vec![10, 20],
        sequence_counter: None,
    };
    let buf = encode_timestamps(&original).unwrap();
    let decoded = decode_timestamps(&buf).unwrap();
    assert_eq!(decoded.sequence_counter, None);
    assert_eq!(decoded.to_owned(), original);
}

#[test]
fn test_timestamps_zero_sequence_counter_kept() {
    let original = Timestamps {
        name: "chopper".into(),
        timestamps: vec![],
        sequence_counter: Some(0),
    };
    let buf = encode_timestamps(&original).unwrap();
    let decoded = decode_timestamps(&buf).unwrap();
    assert_eq!(decoded.sequence_counter, Some(0));
}

#[test]
fn test_timestamps_wrong_tag() {
    let buf = retag(&encode_timestamps(&Timestamps::default()).unwrap(), b"ev42");
    let result = decode_timestamps(&buf);
    assert!(matches!(result, Err(ProtocolError::SchemaMismatch { .. })));
}

// =============================================================================
// pl72 Tests
// =============================================================================

fn sample_run_start() -> RunStart {
    RunStart {
        job_id: "some_key".into(),
        filename: "test_file.nxs".into(),
        start_time: 567_890,
        stop_time: 578_214,
        run_name: "test_run".into(),
        nexus_structure: "{}".into(),
        service_id: "filewriter1".into(),
        instrument_name: "LOKI".into(),
        broker: "localhost:9092".into(),
        n_periods: 1,
    }
}

#[test]
fn test_run_start_round_trip() {
    let original = sample_run_start();
    let buf = encode_run_start(&original).unwrap();
    assert_eq!(&buf[4..8], b"pl72");

    let decoded = decode_run_start(&buf).unwrap();
    assert_eq!(decoded.job_id, "some_key");
    assert_eq!(decoded.filename, "test_file.nxs");
    assert_eq!(decoded.start_time, 567_890);
    assert_eq!(decoded.stop_time, 578_214);
    assert_eq!(decoded.run_name, "test_run");
    assert_eq!(decoded.nexus_structure, "{}");
    assert_eq!(decoded.service_id, "filewriter1");
    assert_eq!(decoded.instrument_name, "LOKI");
    assert_eq!(decoded.broker, "localhost:9092");
    assert_eq!(decoded.n_periods, 1);
    assert_eq!(decoded.to_owned(), original);
}

#[test]
fn test_run_start_defaults() {
    let original = RunStart::new("job", "file.nxs");
    assert!(original.start_time > 0);
    assert_eq!(original.stop_time, 0);
    assert_eq!(original.instrument_name, "TEST");

    let buf = encode_run_start(&original).unwrap();
    let decoded = decode_run_start(&buf).unwrap();
    assert_eq!(decoded.stop_time, 0);
    assert_eq!(decoded.service_id, "");
    assert_eq!(decoded.n_periods, 1);
    assert_eq!(decoded.to_owned(), original);
}

#[test]
fn test_run_start_periods() {
    let original = RunStart {
        n_periods: 4,
        ..sample_run_start()
    };
    let buf = encode_run_start(&original).unwrap();
    assert_eq!(decode_run_start(&buf).unwrap().n_periods, 4);
}

#[test]
fn test_run_start_wrong_tag() {
    let buf = retag(&encode_run_start(&sample_run_start()).unwrap(), b"1234");
    let result = decode_run_start(&buf);
    assert!(matches!(
        result,
        Err(ProtocolError::SchemaMismatch { expected, .. }) if expected == SchemaId::RUN_START
    ));
}

// =============================================================================
// x5f2 Tests
// =============================================================================

fn sample_status() -> Status {
    Status {
        software_name: "nicos/test".into(),
        software_version: "1.0.0".into(),
        service_id: "1a2b3c".into(),
        host_name: "localhost".into(),
        process_id: 1234,
        update_interval: 0,
        status_json: r#"{"content" : "log_or_status_message"}"#.into(),
    }
}

#[test]
fn test_status_round_trip() {
    let original = sample_status();
    let buf = encode_status(&original).unwrap();
    assert_eq!(&buf[4..8], b"x5f2");

    let decoded = decode_status(&buf).unwrap();
    assert_eq!(decoded.software_name, "nicos/test");
    assert_eq!(decoded.software_version, "1.0.0");
    assert_eq!(decoded.service_id, "1a2b3c");
    assert_eq!(decoded.host_name, "localhost");
    assert_eq!(decoded.process_id, 1234);
    assert_eq!(decoded.update_interval, 0);
    assert_eq!(decoded.status_json, original.status_json);
    assert_eq!(decoded.to_owned(), original);
}

#[test]
fn test_status_wrong_tag() {
    let buf = retag(&encode_status(&sample_status()).unwrap(), b"1234");
    let result = decode_status(&buf);
    assert!(matches!(result, Err(ProtocolError::SchemaMismatch { .. })));
}

// =============================================================================
// ns10 Tests
// =============================================================================

#[test]
fn test_cache_entry_round_trip() {
    let original = CacheEntry {
        key: "some_key".into(),
        time: 123_456.0,
        ttl: 567_890.0,
        expired: true,
        value: "some_value".into(),
    };
    let buf = encode_cache_entry(&original).unwrap();
    assert_eq!(&buf[4..8], b"ns10");

    let decoded = decode_cache_entry(&buf).unwrap();
    assert_eq!(decoded.key, "some_key");
    assert_eq!(decoded.time, 123_456.0);
    assert_eq!(decoded.ttl, 567_890.0);
    assert!(decoded.expired);
    assert_eq!(decoded.value, "some_value");
    assert_eq!(decoded.to_owned(), original);
}

#[test]
fn test_cache_entry_defaults() {
    let buf = encode_cache_entry(&CacheEntry::default()).unwrap();
    let decoded = decode_cache_entry(&buf).unwrap();
    assert_eq!(decoded.key, "");
    assert_eq!(decoded.ttl, 0.0);
    assert!(!decoded.expired);
    assert_eq!(decoded.value, "");
}

#[test]
fn test_cache_entry_wrong_tag() {
    let buf = retag(&encode_cache_entry(&CacheEntry::default()).unwrap(), b"1234");
    let result = decode_cache_entry(&buf);
    assert!(matches!(result, Err(ProtocolError::SchemaMismatch { .. })));
}

// =============================================================================
// rf5k Tests
// =============================================================================

#[test]
fn test_config_update_with_streams() {
    let original = ConfigUpdate {
        config_change: UpdateType::Add,
        streams: vec![
            StreamInfo::new("channel1", "f142", "topic1", Protocol::Pva),
            StreamInfo::new("channel2", "TdcTime", "topic2", Protocol::Ca),
        ],
    };
    let buf = encode_config_update(&original).unwrap();
    assert_eq!(&buf[4..8], b"rf5k");

    let decoded = decode_config_update(&buf).unwrap();
    assert_eq!(decoded.config_change, UpdateType::Add);
    assert_eq!(decoded.streams.len(), 2);
    assert_eq!(decoded.streams[0].channel, "channel1");
    assert_eq!(decoded.streams[1].schema, "TdcTime");
    assert_eq!(decoded.streams[1].protocol, Protocol::Ca);
    assert_eq!(decoded.to_owned(), original);
}

#[test]
fn test_config_update_without_streams() {
    let original = ConfigUpdate {
        config_change: UpdateType::RemoveAll,
        streams: vec![],
    };
    let buf = encode_config_update(&original).unwrap();
    let decoded = decode_config_update(&buf).unwrap();
    assert_eq!(decoded.config_change, UpdateType::RemoveAll);
    assert!(decoded.streams.is_empty());
    assert_eq!(decoded.to_owned(), original);
}

#[test]
fn test_config_update_wrong_tag() {
    let buf = retag(&encode_config_update(&ConfigUpdate::default()).unwrap(), b"1234");
    let result = decode_config_update(&buf);
    assert!(matches!(result, Err(ProtocolError::SchemaMismatch { .. })));
}

#[test]
fn test_config_enum_wire_values() {
    for v in 0..=2u16 {
        assert_eq!(UpdateType::from_u16(v).unwrap().as_u16(), v);
        assert_eq!(Protocol::from_u16(v).unwrap().as_u16(), v);
    }
    assert_eq!(UpdateType::from_u16(3), None);
    assert_eq!(Protocol::from_u16(3), None);
    assert_eq!(UpdateType::RemoveAll.as_str(), "remove_all");
}
