//! Streaming Protocol - FlatBuffers message codecs for data-acquisition streams
//!
//! This crate encodes and decodes the binary messages exchanged between
//! data-acquisition services:
//! - `f142` log data - one typed value (scalar, string or 1-D array) with alarm state
//! - `hs00` histograms - N-dimensional typed data, errors and bin boundaries
//! - `ev42`, `pl72`, `6s4t`, `ep00`, `tdct`, `x5f2`, `ns10`, `rf5k` - fixed-schema
//!   event, run control, connection, timestamp, status, cache and forwarder
//!   configuration messages
//!
//! # Design Principles
//!
//! - **Explicit typing**: every typed field carries a discriminant; widths and
//!   signedness survive a round trip and decoders never guess from bytes
//! - **Zero-copy decode**: decoded arrays and strings borrow from the input
//!   buffer; `to_vec`/`to_owned` detach them
//! - **Immutable output**: encoders return `bytes::Bytes`
//!
//! # Wire Format
//!
//! Standard FlatBuffers layout with the 4-byte schema identifier at bytes
//! [4,8). Tables are built and parsed directly without code generation (see
//! [`flatbuf`]).

mod config;
mod envelope;
mod error;
pub mod flatbuf;
mod histogram;
mod log_data;
mod message;
pub mod messages;
mod schema;
mod value;

pub use config::{CodecConfig, DEFAULT_INITIAL_CAPACITY, DEFAULT_MAX_MESSAGE_SIZE, ShapeValidation};
pub use envelope::{Envelope, Header};
pub use error::ProtocolError;
pub use histogram::{
    ArrayType, DecodedDimension, DecodedHistogram, DimensionMetaData, Histogram, HistogramArray,
    HistogramArrayRef, HistogramElement, NdArray, Shape, decode_histogram, encode_histogram,
    encode_histogram_with,
};
pub use log_data::{
    AlarmSeverity, AlarmStatus, DecodedLogData, decode_log_value, encode_log_value, encode_log_value_with,
};
pub use message::{DecodedMessage, decode_message};
pub use messages::{
    CacheEntry, ConfigUpdate, ConnectionEventType, ConnectionInfo, DecodedCacheEntry, DecodedConfigUpdate,
    DecodedConnectionInfo, DecodedEventData, DecodedRunStart, DecodedRunStop, DecodedStatus, DecodedStream,
    DecodedTimestamps, EventData, IsisData, Protocol, RunStart, RunState, RunStop, Status, StreamInfo,
    Timestamps, UpdateType, decode_cache_entry, decode_config_update, decode_connection_info,
    decode_event_data, decode_run_start, decode_run_stop, decode_status, decode_timestamps,
    encode_cache_entry, encode_cache_entry_with, encode_config_update, encode_config_update_with,
    encode_connection_info, encode_connection_info_with, encode_event_data, encode_event_data_with,
    encode_run_start, encode_run_start_with, encode_run_stop, encode_run_stop_with, encode_status,
    encode_status_with, encode_timestamps, encode_timestamps_with,
};
pub use schema::{HEADER_LENGTH, MessageKind, SCHEMA_ID_LENGTH, SCHEMA_ID_OFFSET, SchemaId};
pub use value::{
    Value, ValueElement, ValueRef, ValueType, decode_value, encode_array, encode_scalar, encode_string,
    encode_string_array, encode_value,
};

// Re-export bytes for convenience
pub use bytes::Bytes;

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
