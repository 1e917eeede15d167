//! Chopper timestamps (`tdct`)
//!
//! # Schema
//!
//! ```text
//! table timestamp {
//!     name:string (id: 0);
//!     timestamps:[ulong] (id: 1);
//!     sequence_counter:ulong (id: 2);
//! }
//! ```

use bytes::Bytes;

use crate::envelope::{Envelope, Header};
use crate::flatbuf::{FlatTable, VectorView};
use crate::schema::SchemaId;
use crate::{CodecConfig, Result};

mod field {
    pub const NAME: u16 = 0;
    pub const TIMESTAMPS: u16 = 1;
    pub const SEQUENCE_COUNTER: u16 = 2;
}

/// A batch of timestamps, ready to encode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Timestamps {
    pub name: String,
    /// Nanoseconds since the Unix epoch
    pub timestamps: Vec<u64>,
    pub sequence_counter: Option<u64>,
}

/// A decoded batch of timestamps borrowing from the input buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedTimestamps<'a> {
    pub name: &'a str,
    pub timestamps: VectorView<'a, u64>,
    pub sequence_counter: Option<u64>,
}

impl DecodedTimestamps<'_> {
    pub fn to_owned(&self) -> Timestamps {
        Timestamps {
            name: self.name.to_owned(),
            timestamps: self.timestamps.to_vec(),
            sequence_counter: self.sequence_counter,
        }
    }
}

/// Encode timestamps with the default codec config
pub fn encode_timestamps(timestamps: &Timestamps) -> Result<Bytes> {
    encode_timestamps_with(&CodecConfig::default(), timestamps)
}

/// Encode timestamps with an explicit codec config
pub fn encode_timestamps_with(config: &CodecConfig, timestamps: &Timestamps) -> Result<Bytes> {
    let mut envelope =
        Envelope::begin_with_source(SchemaId::TIMESTAMPS, field::NAME, &timestamps.name, config)?;
    let values = envelope.builder().create_vector(&timestamps.timestamps)?;

    envelope.start_root()?;
    let fbb = envelope.builder();
    fbb.push_slot_offset(field::TIMESTAMPS, values)?;
    if let Some(counter) = timestamps.sequence_counter {
        fbb.push_slot_always(field::SEQUENCE_COUNTER, counter)?;
    }

    envelope.finish(Header::new())
}

/// Decode timestamps
pub fn decode_timestamps(buf: &[u8]) -> Result<DecodedTimestamps<'_>> {
    SchemaId::TIMESTAMPS.check(buf)?;
    let root = FlatTable::root(buf)?;

    let sequence_counter = root
        .has_field(field::SEQUENCE_COUNTER.into())
        .then(|| root.read_u64(field::SEQUENCE_COUNTER.into(), 0));

    Ok(DecodedTimestamps {
        name: root.read_string(field::NAME.into())?.unwrap_or_default(),
        timestamps: root.read_vector(field::TIMESTAMPS.into())?.unwrap_or_default(),
        sequence_counter,
    })
}
