//! Run stop commands (`6s4t`)
//!
//! # Schema
//!
//! ```text
//! table RunStop {
//!     stop_time:ulong (id: 0);
//!     run_name:string (id: 1);
//!     job_id:string (id: 2);
//!     service_id:string (id: 3);
//! }
//! ```

use bytes::Bytes;

use crate::envelope::{Envelope, Header};
use crate::flatbuf::FlatTable;
use crate::schema::SchemaId;
use crate::{CodecConfig, Result};

mod field {
    pub const STOP_TIME: u16 = 0;
    pub const RUN_NAME: u16 = 1;
    pub const JOB_ID: u16 = 2;
    pub const SERVICE_ID: u16 = 3;
}

/// A run stop command, ready to encode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStop {
    pub job_id: String,
    pub run_name: String,
    /// Target service; empty addresses every service
    pub service_id: String,
    /// Stop time in milliseconds since the Unix epoch; 0 means now
    pub stop_time: u64,
}

impl RunStop {
    /// Stop `job_id` immediately on every service
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            run_name: "test_run".into(),
            service_id: String::new(),
            stop_time: 0,
        }
    }
}

/// A decoded run stop command borrowing from the input buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedRunStop<'a> {
    pub job_id: &'a str,
    pub run_name: &'a str,
    pub service_id: &'a str,
    pub stop_time: u64,
}

impl DecodedRunStop<'_> {
    /// Copy into an owned command
    pub fn to_owned(&self) -> RunStop {
        RunStop {
            job_id: self.job_id.to_owned(),
            run_name: self.run_name.to_owned(),
            service_id: self.service_id.to_owned(),
            stop_time: self.stop_time,
        }
    }
}

/// Encode a run stop command with the default codec config
pub fn encode_run_stop(run_stop: &RunStop) -> Result<Bytes> {
    encode_run_stop_with(&CodecConfig::default(), run_stop)
}

/// Encode a run stop command with an explicit codec config
pub fn encode_run_stop_with(config: &CodecConfig, run_stop: &RunStop) -> Result<Bytes> {
    let mut envelope = Envelope::begin(SchemaId::RUN_STOP, config);
    let fbb = envelope.builder();
    let service_id = fbb.create_string(&run_stop.service_id)?;
    let job_id = fbb.create_string(&run_stop.job_id)?;
    let run_name = fbb.create_string(&run_stop.run_name)?;

    envelope.start_root()?;
    let fbb = envelope.builder();
    fbb.push_slot_offset(field::SERVICE_ID, service_id)?;
    fbb.push_slot_offset(field::JOB_ID, job_id)?;
    fbb.push_slot_offset(field::RUN_NAME, run_name)?;

    envelope.finish(Header::new().timestamp(field::STOP_TIME, run_stop.stop_time))
}

/// Decode a run stop command; absent strings decode as empty
pub fn decode_run_stop(buf: &[u8]) -> Result<DecodedRunStop<'_>> {
    SchemaId::RUN_STOP.check(buf)?;
    let root = FlatTable::root(buf)?;

    Ok(DecodedRunStop {
        job_id: root.read_string(field::JOB_ID.into())?.unwrap_or_default(),
        run_name: root.read_string(field::RUN_NAME.into())?.unwrap_or_default(),
        service_id: root.read_string(field::SERVICE_ID.into())?.unwrap_or_default(),
        stop_time: root.read_u64(field::STOP_TIME.into(), 0),
    })
}
