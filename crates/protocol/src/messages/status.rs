//! Service status reports (`x5f2`)
//!
//! # Schema
//!
//! ```text
//! table Status {
//!     software_name:string (id: 0);
//!     software_version:string (id: 1);
//!     service_id:string (id: 2);
//!     host_name:string (id: 3);
//!     process_id:uint (id: 4);
//!     update_interval:uint (id: 5);
//!     status_json:string (id: 6);
//! }
//! ```

use bytes::Bytes;

use crate::envelope::{Envelope, Header};
use crate::flatbuf::FlatTable;
use crate::schema::SchemaId;
use crate::{CodecConfig, Result};

mod field {
    pub const SOFTWARE_NAME: u16 = 0;
    pub const SOFTWARE_VERSION: u16 = 1;
    pub const SERVICE_ID: u16 = 2;
    pub const HOST_NAME: u16 = 3;
    pub const PROCESS_ID: u16 = 4;
    pub const UPDATE_INTERVAL: u16 = 5;
    pub const STATUS_JSON: u16 = 6;
}

/// A status report, ready to encode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Status {
    pub software_name: String,
    pub software_version: String,
    pub service_id: String,
    pub host_name: String,
    pub process_id: u32,
    /// Milliseconds between reports
    pub update_interval: u32,
    /// Free-form JSON payload
    pub status_json: String,
}

/// A decoded status report borrowing from the input buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedStatus<'a> {
    pub software_name: &'a str,
    pub software_version: &'a str,
    pub service_id: &'a str,
    pub host_name: &'a str,
    pub process_id: u32,
    pub update_interval: u32,
    pub status_json: &'a str,
}

impl DecodedStatus<'_> {
    /// Copy into an owned report
    pub fn to_owned(&self) -> Status {
        Status {
            software_name: self.software_name.to_owned(),
            software_version: self.software_version.to_owned(),
            service_id: self.service_id.to_owned(),
            host_name: self.host_name.to_owned(),
            process_id: self.process_id,
            update_interval: self.update_interval,
            status_json: self.status_json.to_owned(),
        }
    }
}

/// Encode a status report with the default codec config
pub fn encode_status(status: &Status) -> Result<Bytes> {
    encode_status_with(&CodecConfig::default(), status)
}

/// Encode a status report with an explicit codec config
pub fn encode_status_with(config: &CodecConfig, status: &Status) -> Result<Bytes> {
    let mut envelope = Envelope::begin(SchemaId::STATUS, config);
    let fbb = envelope.builder();
    let software_name = fbb.create_string(&status.software_name)?;
    let software_version = fbb.create_string(&status.software_version)?;
    let service_id = fbb.create_string(&status.service_id)?;
    let host_name = fbb.create_string(&status.host_name)?;
    let status_json = fbb.create_string(&status.status_json)?;

    envelope.start_root()?;
    let fbb = envelope.builder();
    fbb.push_slot_offset(field::SOFTWARE_NAME, software_name)?;
    fbb.push_slot_offset(field::SOFTWARE_VERSION, software_version)?;
    fbb.push_slot_offset(field::SERVICE_ID, service_id)?;
    fbb.push_slot_offset(field::HOST_NAME, host_name)?;
    fbb.push_slot(field::PROCESS_ID, status.process_id, 0)?;
    fbb.push_slot(field::UPDATE_INTERVAL, status.update_interval, 0)?;
    fbb.push_slot_offset(field::STATUS_JSON, status_json)?;

    envelope.finish(Header::new())
}

/// Decode a status report; absent strings decode as empty
pub fn decode_status(buf: &[u8]) -> Result<DecodedStatus<'_>> {
    SchemaId::STATUS.check(buf)?;
    let root = FlatTable::root(buf)?;

    Ok(DecodedStatus {
        software_name: root.read_string(field::SOFTWARE_NAME.into())?.unwrap_or_default(),
        software_version: root.read_string(field::SOFTWARE_VERSION.into())?.unwrap_or_default(),
        service_id: root.read_string(field::SERVICE_ID.into())?.unwrap_or_default(),
        host_name: root.read_string(field::HOST_NAME.into())?.unwrap_or_default(),
        process_id: root.read_scalar(field::PROCESS_ID.into(), 0u32),
        update_interval: root.read_scalar(field::UPDATE_INTERVAL.into(), 0u32),
        status_json: root.read_string(field::STATUS_JSON.into())?.unwrap_or_default(),
    })
}
