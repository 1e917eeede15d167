//! Log value messages (`f142`)
//!
//! One typed value from a named source at a point in time, optionally
//! annotated with an EPICS-style alarm status and severity.
//!
//! # Example
//!
//! ```
//! use streaming_protocol::{AlarmSeverity, AlarmStatus, Value, decode_log_value, encode_log_value};
//!
//! let buf = encode_log_value(
//!     &Value::U16(42),
//!     "motor:position",
//!     1_700_000_000_000_000_000,
//!     Some(AlarmStatus::High),
//!     Some(AlarmSeverity::Minor),
//! )?;
//!
//! let decoded = decode_log_value(&buf)?;
//! assert_eq!(decoded.source_name, "motor:position");
//! assert_eq!(decoded.value.to_owned()?, Value::U16(42));
//! assert_eq!(decoded.alarm_status, AlarmStatus::High);
//! # Ok::<(), streaming_protocol::ProtocolError>(())
//! ```

use bytes::Bytes;

use crate::envelope::{Envelope, Header};
use crate::flatbuf::FlatTable;
use crate::schema::SchemaId;
use crate::value::{Value, ValueRef, decode_value, encode_value};
use crate::{CodecConfig, ProtocolError, Result};

mod field {
    pub const SOURCE_NAME: u16 = 0;
    pub const VALUE_TYPE: u16 = 1;
    pub const VALUE: u16 = 2;
    pub const TIMESTAMP: u16 = 3;
    pub const STATUS: u16 = 4;
    pub const SEVERITY: u16 = 5;
}

// =============================================================================
// Alarm enums
// =============================================================================

/// EPICS alarm status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u16)]
pub enum AlarmStatus {
    NoAlarm = 0,
    Read = 1,
    Write = 2,
    HiHi = 3,
    High = 4,
    LoLo = 5,
    Low = 6,
    State = 7,
    Cos = 8,
    Comm = 9,
    Timed = 10,
    HwLimit = 11,
    Calc = 12,
    Scan = 13,
    Link = 14,
    Soft = 15,
    BadSub = 16,
    Udf = 17,
    Disable = 18,
    Simm = 19,
    ReadAccess = 20,
    WriteAccess = 21,
    /// Status unchanged since the previous update (also the absent value)
    #[default]
    NoChange = 22,
}

impl AlarmStatus {
    /// Parse from the wire value
    pub const fn from_u16(value: u16) -> Option<Self> {
        Some(match value {
            0 => Self::NoAlarm,
            1 => Self::Read,
            2 => Self::Write,
            3 => Self::HiHi,
            4 => Self::High,
            5 => Self::LoLo,
            6 => Self::Low,
            7 => Self::State,
            8 => Self::Cos,
            9 => Self::Comm,
            10 => Self::Timed,
            11 => Self::HwLimit,
            12 => Self::Calc,
            13 => Self::Scan,
            14 => Self::Link,
            15 => Self::Soft,
            16 => Self::BadSub,
            17 => Self::Udf,
            18 => Self::Disable,
            19 => Self::Simm,
            20 => Self::ReadAccess,
            21 => Self::WriteAccess,
            22 => Self::NoChange,
            _ => return None,
        })
    }

    /// Convert to the wire value
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

/// EPICS alarm severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u16)]
pub enum AlarmSeverity {
    Minor = 0,
    Major = 1,
    NoAlarm = 2,
    Invalid = 3,
    /// Severity unchanged since the previous update (also the absent value)
    #[default]
    NoChange = 4,
}

impl AlarmSeverity {
    /// Parse from the wire value
    pub const fn from_u16(value: u16) -> Option<Self> {
        Some(match value {
            0 => Self::Minor,
            1 => Self::Major,
            2 => Self::NoAlarm,
            3 => Self::Invalid,
            4 => Self::NoChange,
            _ => return None,
        })
    }

    /// Convert to the wire value
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

// =============================================================================
// Encode
// =============================================================================

/// Encode a log value message with the default codec config
///
/// `alarm_severity` is only written when `alarm_status` is given.
pub fn encode_log_value(
    value: &Value,
    source_name: &str,
    timestamp_unix_ns: u64,
    alarm_status: Option<AlarmStatus>,
    alarm_severity: Option<AlarmSeverity>,
) -> Result<Bytes> {
    encode_log_value_with(
        &CodecConfig::default(),
        value,
        source_name,
        timestamp_unix_ns,
        alarm_status,
        alarm_severity,
    )
}

/// Encode a log value message with an explicit codec config
pub fn encode_log_value_with(
    config: &CodecConfig,
    value: &Value,
    source_name: &str,
    timestamp_unix_ns: u64,
    alarm_status: Option<AlarmStatus>,
    alarm_severity: Option<AlarmSeverity>,
) -> Result<Bytes> {
    let mut envelope =
        Envelope::begin_with_source(SchemaId::LOG_DATA, field::SOURCE_NAME, source_name, config)?;

    let (value_offset, value_type) = encode_value(envelope.builder(), value)?;

    envelope.start_root()?;
    let fbb = envelope.builder();
    fbb.push_slot_offset(field::VALUE, value_offset)?;
    fbb.push_slot(field::VALUE_TYPE, value_type.as_u8(), 0)?;

    envelope.finish(
        Header::new()
            .timestamp(field::TIMESTAMP, timestamp_unix_ns)
            .status(field::STATUS, alarm_status.map(AlarmStatus::as_u16))
            .severity(field::SEVERITY, alarm_severity.map(AlarmSeverity::as_u16)),
    )
}

// =============================================================================
// Decode
// =============================================================================

/// A decoded log value message borrowing from the input buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedLogData<'a> {
    /// Source name (empty if absent)
    pub source_name: &'a str,
    /// The typed value, in the type it was encoded with
    pub value: ValueRef<'a>,
    /// Timestamp in nanoseconds since the Unix epoch
    pub timestamp_unix_ns: u64,
    /// Alarm status (`NoChange` if absent)
    pub alarm_status: AlarmStatus,
    /// Alarm severity (`NoChange` if absent)
    pub alarm_severity: AlarmSeverity,
}

/// Decode a log value message
///
/// # Errors
///
/// `SchemaMismatch` if the buffer is not tagged `f142`; `CorruptMessage` for
/// an unknown value discriminant or alarm enumerant.
pub fn decode_log_value(buf: &[u8]) -> Result<DecodedLogData<'_>> {
    SchemaId::LOG_DATA.check(buf)?;
    let root = FlatTable::root(buf)?;

    let source_name = root.read_string(field::SOURCE_NAME.into())?.unwrap_or_default();
    let (tag, table) = root.read_union(field::VALUE_TYPE.into())?;
    let value = decode_value(tag, table)?;
    let timestamp_unix_ns = root.read_u64(field::TIMESTAMP.into(), 0);

    let status = root.read_scalar(field::STATUS.into(), AlarmStatus::NoChange.as_u16());
    let alarm_status = AlarmStatus::from_u16(status)
        .ok_or_else(|| ProtocolError::corrupt(format!("unknown alarm status {status}")))?;

    let severity = root.read_scalar(field::SEVERITY.into(), AlarmSeverity::NoChange.as_u16());
    let alarm_severity = AlarmSeverity::from_u16(severity)
        .ok_or_else(|| ProtocolError::corrupt(format!("unknown alarm severity {severity}")))?;

    Ok(DecodedLogData {
        source_name,
        value,
        timestamp_unix_ns,
        alarm_status,
        alarm_severity,
    })
}

#[cfg(test)]
#[path = "log_data_test.rs"]
mod log_data_test;
