//! Run start commands (`pl72`)
//!
//! # Schema
//!
//! ```text
//! table RunStart {
//!     start_time:ulong (id: 0);
//!     stop_time:ulong (id: 1);
//!     run_name:string (id: 2);
//!     instrument_name:string (id: 3);
//!     nexus_structure:string (id: 4);
//!     job_id:string (id: 5);
//!     broker:string (id: 6);
//!     service_id:string (id: 7);
//!     filename:string (id: 8);
//!     n_periods:uint = 1 (id: 9);
//! }
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;

use crate::envelope::{Envelope, Header};
use crate::flatbuf::FlatTable;
use crate::schema::SchemaId;
use crate::{CodecConfig, Result};

mod field {
    pub const START_TIME: u16 = 0;
    pub const STOP_TIME: u16 = 1;
    pub const RUN_NAME: u16 = 2;
    pub const INSTRUMENT_NAME: u16 = 3;
    pub const NEXUS_STRUCTURE: u16 = 4;
    pub const JOB_ID: u16 = 5;
    pub const BROKER: u16 = 6;
    pub const SERVICE_ID: u16 = 7;
    pub const FILENAME: u16 = 8;
    pub const N_PERIODS: u16 = 9;
}

const DEFAULT_N_PERIODS: u32 = 1;

/// A run start command, ready to encode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStart {
    pub job_id: String,
    pub filename: String,
    /// Start time in milliseconds since the Unix epoch
    pub start_time: u64,
    /// Stop time in milliseconds since the Unix epoch; 0 means open-ended
    pub stop_time: u64,
    pub run_name: String,
    /// NeXus file structure as JSON
    pub nexus_structure: String,
    /// Target service; empty addresses every service
    pub service_id: String,
    pub instrument_name: String,
    pub broker: String,
    pub n_periods: u32,
}

impl RunStart {
    /// Start `job_id` writing `filename` now, with no stop time
    pub fn new(job_id: impl Into<String>, filename: impl Into<String>) -> Self {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();

        Self {
            job_id: job_id.into(),
            filename: filename.into(),
            start_time: now_ms,
            stop_time: 0,
            run_name: "test_run".into(),
            nexus_structure: "{}".into(),
            service_id: String::new(),
            instrument_name: "TEST".into(),
            broker: "localhost:9092".into(),
            n_periods: DEFAULT_N_PERIODS,
        }
    }
}

/// A decoded run start command borrowing from the input buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedRunStart<'a> {
    pub job_id: &'a str,
    pub filename: &'a str,
    pub start_time: u64,
    pub stop_time: u64,
    pub run_name: &'a str,
    pub nexus_structure: &'a str,
    pub service_id: &'a str,
    pub instrument_name: &'a str,
    pub broker: &'a str,
    pub n_periods: u32,
}

impl DecodedRunStart<'_> {
    /// Copy into an owned command
    pub fn to_owned(&self) -> RunStart {
        RunStart {
            job_id: self.job_id.to_owned(),
            filename: self.filename.to_owned(),
            start_time: self.start_time,
            stop_time: self.stop_time,
            run_name: self.run_name.to_owned(),
            nexus_structure: self.nexus_structure.to_owned(),
            service_id: self.service_id.to_owned(),
            instrument_name: self.instrument_name.to_owned(),
            broker: self.broker.to_owned(),
            n_periods: self.n_periods,
        }
    }
}

/// Encode a run start command with the default codec config
pub fn encode_run_start(run_start: &RunStart) -> Result<Bytes> {
    encode_run_start_with(&CodecConfig::default(), run_start)
}

/// Encode a run start command with an explicit codec config
pub fn encode_run_start_with(config: &CodecConfig, run_start: &RunStart) -> Result<Bytes> {
    let mut envelope = Envelope::begin(SchemaId::RUN_START, config);
    let fbb = envelope.builder();
    let service_id = fbb.create_string(&run_start.service_id)?;
    let broker = fbb.create_string(&run_start.broker)?;
    let job_id = fbb.create_string(&run_start.job_id)?;
    let nexus_structure = fbb.create_string(&run_start.nexus_structure)?;
    let instrument_name = fbb.create_string(&run_start.instrument_name)?;
    let run_name = fbb.create_string(&run_start.run_name)?;
    let filename = fbb.create_string(&run_start.filename)?;

    envelope.start_root()?;
    let fbb = envelope.builder();
    fbb.push_slot_offset(field::SERVICE_ID, service_id)?;
    fbb.push_slot_offset(field::BROKER, broker)?;
    fbb.push_slot_offset(field::JOB_ID, job_id)?;
    fbb.push_slot_offset(field::NEXUS_STRUCTURE, nexus_structure)?;
    fbb.push_slot_offset(field::INSTRUMENT_NAME, instrument_name)?;
    fbb.push_slot_offset(field::RUN_NAME, run_name)?;
    fbb.push_slot(field::STOP_TIME, run_start.stop_time, 0)?;
    fbb.push_slot_offset(field::FILENAME, filename)?;
    fbb.push_slot(field::N_PERIODS, run_start.n_periods, DEFAULT_N_PERIODS)?;

    envelope.finish(Header::new().timestamp(field::START_TIME, run_start.start_time))
}

/// Decode a run start command; absent strings decode as empty
pub fn decode_run_start(buf: &[u8]) -> Result<DecodedRunStart<'_>> {
    SchemaId::RUN_START.check(buf)?;
    let root = FlatTable::root(buf)?;

    Ok(DecodedRunStart {
        job_id: root.read_string(field::JOB_ID.into())?.unwrap_or_default(),
        filename: root.read_string(field::FILENAME.into())?.unwrap_or_default(),
        start_time: root.read_u64(field::START_TIME.into(), 0),
        stop_time: root.read_u64(field::STOP_TIME.into(), 0),
        run_name: root.read_string(field::RUN_NAME.into())?.unwrap_or_default(),
        nexus_structure: root.read_string(field::NEXUS_STRUCTURE.into())?.unwrap_or_default(),
        service_id: root.read_string(field::SERVICE_ID.into())?.unwrap_or_default(),
        instrument_name: root.read_string(field::INSTRUMENT_NAME.into())?.unwrap_or_default(),
        broker: root.read_string(field::BROKER.into())?.unwrap_or_default(),
        n_periods: root.read_scalar(field::N_PERIODS.into(), DEFAULT_N_PERIODS),
    })
}
