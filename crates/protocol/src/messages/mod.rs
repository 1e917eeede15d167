//! Fixed-schema messages
//!
//! Message kinds whose root table has a fixed layout and no typed-value
//! dispatch. Each kind has an `encode_*`/`decode_*` pair keyed by its own
//! schema identifier and framed the same way as log values and histograms.

pub mod cache_entry;
pub mod connection_info;
pub mod event_data;
pub mod forwarder_config;
pub mod run_start;
pub mod run_stop;
pub mod status;
pub mod timestamps;

pub use cache_entry::{
    CacheEntry, DecodedCacheEntry, decode_cache_entry, encode_cache_entry, encode_cache_entry_with,
};
pub use connection_info::{
    ConnectionEventType, ConnectionInfo, DecodedConnectionInfo, decode_connection_info,
    encode_connection_info, encode_connection_info_with,
};
pub use event_data::{
    DecodedEventData, EventData, IsisData, RunState, decode_event_data, encode_event_data,
    encode_event_data_with,
};
pub use forwarder_config::{
    ConfigUpdate, DecodedConfigUpdate, DecodedStream, Protocol, StreamInfo, UpdateType,
    decode_config_update, encode_config_update, encode_config_update_with,
};
pub use run_start::{
    DecodedRunStart, RunStart, decode_run_start, encode_run_start, encode_run_start_with,
};
pub use run_stop::{DecodedRunStop, RunStop, decode_run_stop, encode_run_stop, encode_run_stop_with};
pub use status::{DecodedStatus, Status, decode_status, encode_status, encode_status_with};
pub use timestamps::{
    DecodedTimestamps, Timestamps, decode_timestamps, encode_timestamps, encode_timestamps_with,
};

#[cfg(test)]
#[path = "messages_test.rs"]
mod messages_test;
