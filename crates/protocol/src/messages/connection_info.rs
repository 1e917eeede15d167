//! EPICS connection status (`ep00`)
//!
//! # Schema
//!
//! ```text
//! enum EventType : ushort { UNKNOWN, NEVER_CONNECTED, CONNECTED, DISCONNECTED, DESTROYED }
//! table EpicsConnectionInfo {
//!     timestamp:ulong (id: 0);
//!     type:EventType (id: 1);
//!     source_name:string (id: 2);
//!     service_id:string (id: 3);
//! }
//! ```

use bytes::Bytes;

use crate::envelope::{Envelope, Header};
use crate::flatbuf::FlatTable;
use crate::schema::SchemaId;
use crate::{CodecConfig, ProtocolError, Result};

mod field {
    pub const TIMESTAMP: u16 = 0;
    pub const TYPE: u16 = 1;
    pub const SOURCE_NAME: u16 = 2;
    pub const SERVICE_ID: u16 = 3;
}

/// Connection state change of an EPICS channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u16)]
pub enum ConnectionEventType {
    #[default]
    Unknown = 0,
    NeverConnected = 1,
    Connected = 2,
    Disconnected = 3,
    Destroyed = 4,
}

impl ConnectionEventType {
    /// Parse from the wire value
    #[inline]
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::Unknown),
            1 => Some(Self::NeverConnected),
            2 => Some(Self::Connected),
            3 => Some(Self::Disconnected),
            4 => Some(Self::Destroyed),
            _ => None,
        }
    }

    /// Convert to the wire value
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::NeverConnected => "never_connected",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Destroyed => "destroyed",
        }
    }
}

/// A connection status update, ready to encode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionInfo {
    pub timestamp_ns: u64,
    pub event_type: ConnectionEventType,
    pub source_name: String,
    pub service_id: Option<String>,
}

/// A decoded connection status update borrowing from the input buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedConnectionInfo<'a> {
    pub timestamp_ns: u64,
    pub event_type: ConnectionEventType,
    /// Source name (empty if absent)
    pub source_name: &'a str,
    pub service_id: Option<&'a str>,
}

impl DecodedConnectionInfo<'_> {
    /// Copy into an owned update
    pub fn to_owned(&self) -> ConnectionInfo {
        ConnectionInfo {
            timestamp_ns: self.timestamp_ns,
            event_type: self.event_type,
            source_name: self.source_name.to_owned(),
            service_id: self.service_id.map(str::to_owned),
        }
    }
}

/// Encode a connection status update with the default codec config
pub fn encode_connection_info(info: &ConnectionInfo) -> Result<Bytes> {
    encode_connection_info_with(&CodecConfig::default(), info)
}

/// Encode a connection status update with an explicit codec config
pub fn encode_connection_info_with(config: &CodecConfig, info: &ConnectionInfo) -> Result<Bytes> {
    let mut envelope = Envelope::begin_with_source(
        SchemaId::CONNECTION_INFO,
        field::SOURCE_NAME,
        &info.source_name,
        config,
    )?;

    let service_id = info
        .service_id
        .as_deref()
        .map(|id| envelope.builder().create_string(id))
        .transpose()?;

    envelope.start_root()?;
    let fbb = envelope.builder();
    if let Some(service_id) = service_id {
        fbb.push_slot_offset(field::SERVICE_ID, service_id)?;
    }
    fbb.push_slot(field::TYPE, info.event_type.as_u16(), 0)?;

    envelope.finish(Header::new().timestamp(field::TIMESTAMP, info.timestamp_ns))
}

/// Decode a connection status update
pub fn decode_connection_info(buf: &[u8]) -> Result<DecodedConnectionInfo<'_>> {
    SchemaId::CONNECTION_INFO.check(buf)?;
    let root = FlatTable::root(buf)?;

    let raw_type = root.read_scalar(field::TYPE.into(), 0u16);
    let event_type = ConnectionEventType::from_u16(raw_type)
        .ok_or_else(|| ProtocolError::corrupt(format!("unknown connection event type {raw_type}")))?;

    Ok(DecodedConnectionInfo {
        timestamp_ns: root.read_u64(field::TIMESTAMP.into(), 0),
        event_type,
        source_name: root.read_string(field::SOURCE_NAME.into())?.unwrap_or_default(),
        service_id: root.read_string(field::SERVICE_ID.into())?,
    })
}
