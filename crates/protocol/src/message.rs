//! Decoding by schema identifier
//!
//! Consumers reading a mixed stream do not know the message kind in
//! advance. [`decode_message`] reads the identifier and routes the buffer to
//! the matching decoder.

use crate::histogram::{DecodedHistogram, decode_histogram};
use crate::log_data::{DecodedLogData, decode_log_value};
use crate::messages::{
    DecodedCacheEntry, DecodedConfigUpdate, DecodedConnectionInfo, DecodedEventData, DecodedRunStart,
    DecodedRunStop, DecodedStatus, DecodedTimestamps, decode_cache_entry, decode_config_update,
    decode_connection_info, decode_event_data, decode_run_start, decode_run_stop, decode_status,
    decode_timestamps,
};
use crate::schema::MessageKind;
use crate::Result;

/// Any decoded message, borrowing from the input buffer
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedMessage<'a> {
    LogData(DecodedLogData<'a>),
    Histogram(DecodedHistogram<'a>),
    EventData(DecodedEventData<'a>),
    RunStop(DecodedRunStop<'a>),
    ConnectionInfo(DecodedConnectionInfo<'a>),
    Timestamps(DecodedTimestamps<'a>),
    RunStart(DecodedRunStart<'a>),
    Status(DecodedStatus<'a>),
    CacheEntry(DecodedCacheEntry<'a>),
    ForwarderConfig(DecodedConfigUpdate<'a>),
}

impl DecodedMessage<'_> {
    /// Message family this message belongs to
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::LogData(_) => MessageKind::LogData,
            Self::Histogram(_) => MessageKind::Histogram,
            Self::EventData(_) => MessageKind::EventData,
            Self::RunStop(_) => MessageKind::RunStop,
            Self::ConnectionInfo(_) => MessageKind::ConnectionInfo,
            Self::Timestamps(_) => MessageKind::Timestamps,
            Self::RunStart(_) => MessageKind::RunStart,
            Self::Status(_) => MessageKind::Status,
            Self::CacheEntry(_) => MessageKind::CacheEntry,
            Self::ForwarderConfig(_) => MessageKind::ForwarderConfig,
        }
    }
}

/// Decode a message of any known kind
///
/// # Errors
///
/// Returns `UnknownSchema` if the identifier names no known kind, or the
/// kind-specific decode error.
pub fn decode_message(buf: &[u8]) -> Result<DecodedMessage<'_>> {
    let kind = MessageKind::of(buf)?;
    tracing::trace!(kind = %kind, size = buf.len(), "decoding message");

    Ok(match kind {
        MessageKind::LogData => DecodedMessage::LogData(decode_log_value(buf)?),
        MessageKind::Histogram => DecodedMessage::Histogram(decode_histogram(buf)?),
        MessageKind::EventData => DecodedMessage::EventData(decode_event_data(buf)?),
        MessageKind::RunStop => DecodedMessage::RunStop(decode_run_stop(buf)?),
        MessageKind::ConnectionInfo => DecodedMessage::ConnectionInfo(decode_connection_info(buf)?),
        MessageKind::Timestamps => DecodedMessage::Timestamps(decode_timestamps(buf)?),
        MessageKind::RunStart => DecodedMessage::RunStart(decode_run_start(buf)?),
        MessageKind::Status => DecodedMessage::Status(decode_status(buf)?),
        MessageKind::CacheEntry => DecodedMessage::CacheEntry(decode_cache_entry(buf)?),
        MessageKind::ForwarderConfig => DecodedMessage::ForwarderConfig(decode_config_update(buf)?),
    })
}

#[cfg(test)]
#[path = "message_test.rs"]
mod message_test;
