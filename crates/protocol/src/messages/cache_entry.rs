//! NICOS cache entries (`ns10`)
//!
//! # Schema
//!
//! ```text
//! table CacheEntry {
//!     key:string (id: 0);
//!     time:double (id: 1);
//!     ttl:double (id: 2);
//!     expired:bool = false (id: 3);
//!     value:string (id: 4);
//! }
//! ```

use bytes::Bytes;

use crate::envelope::{Envelope, Header};
use crate::flatbuf::FlatTable;
use crate::schema::SchemaId;
use crate::{CodecConfig, Result};

mod field {
    pub const KEY: u16 = 0;
    pub const TIME: u16 = 1;
    pub const TTL: u16 = 2;
    pub const EXPIRED: u16 = 3;
    pub const VALUE: u16 = 4;
}

/// A cache entry, ready to encode
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CacheEntry {
    pub key: String,
    /// Seconds since the Unix epoch
    pub time: f64,
    /// Time to live in seconds; 0 means no expiry
    pub ttl: f64,
    pub expired: bool,
    pub value: String,
}

/// A decoded cache entry borrowing from the input buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedCacheEntry<'a> {
    pub key: &'a str,
    pub time: f64,
    pub ttl: f64,
    pub expired: bool,
    pub value: &'a str,
}

impl DecodedCacheEntry<'_> {
    /// Copy into an owned entry
    pub fn to_owned(&self) -> CacheEntry {
        CacheEntry {
            key: self.key.to_owned(),
            time: self.time,
            ttl: self.ttl,
            expired: self.expired,
            value: self.value.to_owned(),
        }
    }
}

/// Encode a cache entry with the default codec config
pub fn encode_cache_entry(entry: &CacheEntry) -> Result<Bytes> {
    encode_cache_entry_with(&CodecConfig::default(), entry)
}

/// Encode a cache entry with an explicit codec config
pub fn encode_cache_entry_with(config: &CodecConfig, entry: &CacheEntry) -> Result<Bytes> {
    let mut envelope = Envelope::begin(SchemaId::CACHE_ENTRY, config);
    let fbb = envelope.builder();
    let value = fbb.create_string(&entry.value)?;
    let key = fbb.create_string(&entry.key)?;

    envelope.start_root()?;
    let fbb = envelope.builder();
    fbb.push_slot_offset(field::VALUE, value)?;
    fbb.push_slot(field::TTL, entry.ttl, 0.0)?;
    fbb.push_slot(field::TIME, entry.time, 0.0)?;
    fbb.push_slot_offset(field::KEY, key)?;
    // bool is a single byte on the wire
    fbb.push_slot(field::EXPIRED, u8::from(entry.expired), 0)?;

    envelope.finish(Header::new())
}

/// Decode a cache entry; absent strings decode as empty
pub fn decode_cache_entry(buf: &[u8]) -> Result<DecodedCacheEntry<'_>> {
    SchemaId::CACHE_ENTRY.check(buf)?;
    let root = FlatTable::root(buf)?;

    Ok(DecodedCacheEntry {
        key: root.read_string(field::KEY.into())?.unwrap_or_default(),
        time: root.read_scalar(field::TIME.into(), 0.0f64),
        ttl: root.read_scalar(field::TTL.into(), 0.0f64),
        expired: root.read_u8(field::EXPIRED.into(), 0) != 0,
        value: root.read_string(field::VALUE.into())?.unwrap_or_default(),
    })
}
