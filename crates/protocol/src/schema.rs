//! Schema identifiers and message framing
//!
//! Every message carries a 4-byte ASCII schema identifier at bytes [4,8),
//! directly after the FlatBuffers root offset. Encoders stamp it once the
//! table encoding is finished; decoders check it before touching any field.

use std::fmt;

use crate::{ProtocolError, Result};

/// Offset of the schema identifier within a message
pub const SCHEMA_ID_OFFSET: usize = 4;

/// Length of the schema identifier in bytes
pub const SCHEMA_ID_LENGTH: usize = 4;

/// Smallest buffer that can carry a root offset and a schema identifier
pub const HEADER_LENGTH: usize = SCHEMA_ID_OFFSET + SCHEMA_ID_LENGTH;

/// 4-byte message kind tag
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaId([u8; SCHEMA_ID_LENGTH]);

impl SchemaId {
    /// Log data with a typed value
    pub const LOG_DATA: Self = Self(*b"f142");
    /// N-dimensional histogram
    pub const HISTOGRAM: Self = Self(*b"hs00");
    /// Neutron event data
    pub const EVENT_DATA: Self = Self(*b"ev42");
    /// Run stop command
    pub const RUN_STOP: Self = Self(*b"6s4t");
    /// EPICS connection status
    pub const CONNECTION_INFO: Self = Self(*b"ep00");
    /// Timestamp list
    pub const TIMESTAMPS: Self = Self(*b"tdct");
    /// Run start command
    pub const RUN_START: Self = Self(*b"pl72");
    /// Service status report
    pub const STATUS: Self = Self(*b"x5f2");
    /// NICOS cache entry
    pub const CACHE_ENTRY: Self = Self(*b"ns10");
    /// Forwarder configuration update
    pub const FORWARDER_CONFIG: Self = Self(*b"rf5k");

    /// Create from raw bytes
    #[inline]
    pub const fn new(bytes: [u8; SCHEMA_ID_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Raw tag bytes
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; SCHEMA_ID_LENGTH] {
        &self.0
    }

    /// Read the identifier from a buffer without validating it
    ///
    /// # Errors
    ///
    /// Returns `MessageTooShort` if the buffer has no room for a header.
    pub fn of(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_LENGTH {
            return Err(ProtocolError::too_short(HEADER_LENGTH, buf.len()));
        }
        let mut tag = [0u8; SCHEMA_ID_LENGTH];
        tag.copy_from_slice(&buf[SCHEMA_ID_OFFSET..HEADER_LENGTH]);
        Ok(Self(tag))
    }

    /// Overwrite bytes [4,8) of a finished buffer with this identifier
    ///
    /// Must only run after the table encoding has been finalized, since the
    /// builder leaves a placeholder at that position.
    pub fn stamp(self, buf: &mut [u8]) -> Result<()> {
        if buf.len() < HEADER_LENGTH {
            return Err(ProtocolError::too_short(HEADER_LENGTH, buf.len()));
        }
        buf[SCHEMA_ID_OFFSET..HEADER_LENGTH].copy_from_slice(&self.0);
        Ok(())
    }

    /// Verify that a buffer carries this identifier
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if the tag differs, `MessageTooShort` if the
    /// buffer cannot hold a header.
    pub fn check(self, buf: &[u8]) -> Result<()> {
        let actual = Self::of(buf)?;
        if actual != self {
            tracing::debug!(expected = %self, actual = %actual, "rejecting message with wrong schema");
            return Err(ProtocolError::schema_mismatch(self, actual));
        }
        Ok(())
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchemaId(\"{self}\")")
    }
}

/// Message families understood by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// `f142` log data
    LogData,
    /// `hs00` histogram
    Histogram,
    /// `ev42` event data
    EventData,
    /// `6s4t` run stop
    RunStop,
    /// `ep00` connection info
    ConnectionInfo,
    /// `tdct` timestamps
    Timestamps,
    /// `pl72` run start
    RunStart,
    /// `x5f2` status
    Status,
    /// `ns10` cache entry
    CacheEntry,
    /// `rf5k` forwarder configuration
    ForwarderConfig,
}

impl MessageKind {
    /// All known kinds
    pub const ALL: [Self; 10] = [
        Self::LogData,
        Self::Histogram,
        Self::EventData,
        Self::RunStart,
        Self::RunStop,
        Self::ConnectionInfo,
        Self::Timestamps,
        Self::Status,
        Self::CacheEntry,
        Self::ForwarderConfig,
    ];

    /// Wire identifier for this kind
    #[inline]
    pub const fn schema_id(self) -> SchemaId {
        match self {
            Self::LogData => SchemaId::LOG_DATA,
            Self::Histogram => SchemaId::HISTOGRAM,
            Self::EventData => SchemaId::EVENT_DATA,
            Self::RunStop => SchemaId::RUN_STOP,
            Self::ConnectionInfo => SchemaId::CONNECTION_INFO,
            Self::Timestamps => SchemaId::TIMESTAMPS,
            Self::RunStart => SchemaId::RUN_START,
            Self::Status => SchemaId::STATUS,
            Self::CacheEntry => SchemaId::CACHE_ENTRY,
            Self::ForwarderConfig => SchemaId::FORWARDER_CONFIG,
        }
    }

    /// Look up the kind for an identifier
    pub fn from_schema_id(id: SchemaId) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.schema_id() == id)
    }

    /// Identify the kind of a raw message
    ///
    /// # Errors
    ///
    /// Returns `UnknownSchema` for tags outside the known set.
    pub fn of(buf: &[u8]) -> Result<Self> {
        let id = SchemaId::of(buf)?;
        Self::from_schema_id(id).ok_or(ProtocolError::UnknownSchema(id))
    }

    /// Get the string name of this kind
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LogData => "log_data",
            Self::Histogram => "histogram",
            Self::EventData => "event_data",
            Self::RunStop => "run_stop",
            Self::ConnectionInfo => "connection_info",
            Self::Timestamps => "timestamps",
            Self::RunStart => "run_start",
            Self::Status => "status",
            Self::CacheEntry => "cache_entry",
            Self::ForwarderConfig => "forwarder_config",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
