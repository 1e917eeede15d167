//! Forwarder configuration updates (`rf5k`)
//!
//! # Schema
//!
//! ```text
//! enum UpdateType : ushort { ADD, REMOVE, REMOVEALL }
//! enum Protocol : ushort { PVA, CA, FAKE }
//! table Stream {
//!     channel:string (id: 0);
//!     schema:string (id: 1);
//!     topic:string (id: 2);
//!     protocol:Protocol (id: 3);
//! }
//! table ConfigUpdate {
//!     config_change:UpdateType (id: 0);
//!     streams:[Stream] (id: 1);
//! }
//! ```

use bytes::Bytes;

use crate::envelope::{Envelope, Header};
use crate::flatbuf::{FlatBuilder, FlatTable, UOffset};
use crate::schema::SchemaId;
use crate::{CodecConfig, ProtocolError, Result};

mod field {
    pub const CONFIG_CHANGE: u16 = 0;
    pub const STREAMS: u16 = 1;
}

mod stream_field {
    pub const CHANNEL: u16 = 0;
    pub const SCHEMA: u16 = 1;
    pub const TOPIC: u16 = 2;
    pub const PROTOCOL: u16 = 3;
}

/// What a configuration update does to the forwarded streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u16)]
pub enum UpdateType {
    #[default]
    Add = 0,
    Remove = 1,
    RemoveAll = 2,
}

impl UpdateType {
    /// Parse from the wire value
    #[inline]
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::Add),
            1 => Some(Self::Remove),
            2 => Some(Self::RemoveAll),
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
            Self::Add => "add",
            Self::Remove => "remove",
            Self::RemoveAll => "remove_all",
        }
    }
}

/// EPICS transport used to subscribe to a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u16)]
pub enum Protocol {
    /// pvAccess
    #[default]
    Pva = 0,
    /// Channel Access
    Ca = 1,
    /// Generated test data
    Fake = 2,
}

impl Protocol {
    /// Parse from the wire value
    #[inline]
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::Pva),
            1 => Some(Self::Ca),
            2 => Some(Self::Fake),
            _ => None,
        }
    }

    /// Convert to the wire value
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

/// One channel-to-topic stream
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct StreamInfo {
    pub channel: String,
    /// Schema identifier the channel is forwarded as, e.g. `f142`
    pub schema: String,
    pub topic: String,
    pub protocol: Protocol,
}

impl StreamInfo {
    pub fn new(
        channel: impl Into<String>,
        schema: impl Into<String>,
        topic: impl Into<String>,
        protocol: Protocol,
    ) -> Self {
        Self {
            channel: channel.into(),
            schema: schema.into(),
            topic: topic.into(),
            protocol,
        }
    }
}

/// A configuration update, ready to encode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigUpdate {
    pub config_change: UpdateType,
    pub streams: Vec<StreamInfo>,
}

/// A decoded stream borrowing from the input buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedStream<'a> {
    pub channel: &'a str,
    pub schema: &'a str,
    pub topic: &'a str,
    pub protocol: Protocol,
}

impl DecodedStream<'_> {
    /// Copy into an owned stream
    pub fn to_owned(&self) -> StreamInfo {
        StreamInfo::new(self.channel, self.schema, self.topic, self.protocol)
    }
}

/// A decoded configuration update borrowing from the input buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedConfigUpdate<'a> {
    pub config_change: UpdateType,
    pub streams: Vec<DecodedStream<'a>>,
}

impl DecodedConfigUpdate<'_> {
    /// Copy into an owned update
    pub fn to_owned(&self) -> ConfigUpdate {
        ConfigUpdate {
            config_change: self.config_change,
            streams: self.streams.iter().map(DecodedStream::to_owned).collect(),
        }
    }
}

/// Encode a configuration update with the default codec config
pub fn encode_config_update(update: &ConfigUpdate) -> Result<Bytes> {
    encode_config_update_with(&CodecConfig::default(), update)
}

/// Encode a configuration update with an explicit codec config
///
/// The stream vector is omitted when there are no streams.
pub fn encode_config_update_with(config: &CodecConfig, update: &ConfigUpdate) -> Result<Bytes> {
    let mut envelope = Envelope::begin(SchemaId::FORWARDER_CONFIG, config);
    let fbb = envelope.builder();

    let streams = if update.streams.is_empty() {
        None
    } else {
        let offsets = update
            .streams
            .iter()
            .map(|stream| encode_stream(fbb, stream))
            .collect::<Result<Vec<_>>>()?;
        Some(fbb.create_vector_of_offsets(&offsets)?)
    };

    envelope.start_root()?;
    let fbb = envelope.builder();
    if let Some(streams) = streams {
        fbb.push_slot_offset(field::STREAMS, streams)?;
    }
    fbb.push_slot(field::CONFIG_CHANGE, update.config_change.as_u16(), 0)?;

    envelope.finish(Header::new())
}

fn encode_stream(fbb: &mut FlatBuilder, stream: &StreamInfo) -> Result<UOffset> {
    let channel = fbb.create_string(&stream.channel)?;
    let schema = fbb.create_string(&stream.schema)?;
    let topic = fbb.create_string(&stream.topic)?;

    fbb.start_table()?;
    fbb.push_slot(stream_field::PROTOCOL, stream.protocol.as_u16(), 0)?;
    fbb.push_slot_offset(stream_field::TOPIC, topic)?;
    fbb.push_slot_offset(stream_field::SCHEMA, schema)?;
    fbb.push_slot_offset(stream_field::CHANNEL, channel)?;
    fbb.end_table()
}

/// Decode a configuration update; a missing stream vector decodes as empty
pub fn decode_config_update(buf: &[u8]) -> Result<DecodedConfigUpdate<'_>> {
    SchemaId::FORWARDER_CONFIG.check(buf)?;
    let root = FlatTable::root(buf)?;

    let change = root.read_scalar(field::CONFIG_CHANGE.into(), 0u16);
    let config_change = UpdateType::from_u16(change)
        .ok_or_else(|| ProtocolError::corrupt(format!("unknown config update type {change}")))?;

    let streams = root
        .read_vector_of_tables(field::STREAMS.into())?
        .unwrap_or_default()
        .iter()
        .map(decode_stream)
        .collect::<Result<Vec<_>>>()?;

    Ok(DecodedConfigUpdate {
        config_change,
        streams,
    })
}

fn decode_stream<'a>(table: &FlatTable<'a>) -> Result<DecodedStream<'a>> {
    let protocol = table.read_scalar(stream_field::PROTOCOL.into(), 0u16);
    Ok(DecodedStream {
        channel: table.read_string(stream_field::CHANNEL.into())?.unwrap_or_default(),
        schema: table.read_string(stream_field::SCHEMA.into())?.unwrap_or_default(),
        topic: table.read_string(stream_field::TOPIC.into())?.unwrap_or_default(),
        protocol: Protocol::from_u16(protocol)
            .ok_or_else(|| ProtocolError::corrupt(format!("unknown stream protocol {protocol}")))?,
    })
}
