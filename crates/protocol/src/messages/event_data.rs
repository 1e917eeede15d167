//! Neutron event data (`ev42`)
//!
//! One pulse worth of detection events: parallel arrays of time-of-flight
//! and detector id, plus optional ISIS facility data.
//!
//! # Schema
//!
//! ```text
//! table ISISData {
//!     period_number:uint (id: 0);
//!     run_state:RunState (id: 1);
//!     proton_charge:float (id: 2);
//! }
//! union FacilityData { ISISData }
//! table EventMessage {
//!     source_name:string (id: 0);
//!     message_id:ulong (id: 1);
//!     pulse_time:ulong (id: 2);
//!     time_of_flight:[uint] (id: 3);
//!     detector_id:[uint] (id: 4);
//!     facility_specific_data:FacilityData (id: 5, 6);
//! }
//! ```

use bytes::Bytes;

use crate::envelope::{Envelope, Header};
use crate::flatbuf::{FlatBuilder, FlatTable, UOffset, VectorView};
use crate::schema::SchemaId;
use crate::{CodecConfig, ProtocolError, Result};

mod field {
    pub const SOURCE_NAME: u16 = 0;
    pub const MESSAGE_ID: u16 = 1;
    pub const PULSE_TIME: u16 = 2;
    pub const TIME_OF_FLIGHT: u16 = 3;
    pub const DETECTOR_ID: u16 = 4;
    pub const FACILITY_TYPE: u16 = 5;
    pub const FACILITY_DATA: u16 = 6;
}

mod isis_field {
    pub const PERIOD_NUMBER: u16 = 0;
    pub const RUN_STATE: u16 = 1;
    pub const PROTON_CHARGE: u16 = 2;
}

/// `FacilityData` union tag for ISIS data
const FACILITY_ISIS: u8 = 1;

/// Accelerator run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i8)]
pub enum RunState {
    #[default]
    Setup = 0,
    Running = 1,
}

impl RunState {
    /// Parse from the wire value
    #[inline]
    pub const fn from_i8(value: i8) -> Option<Self> {
        match value {
            0 => Some(Self::Setup),
            1 => Some(Self::Running),
            _ => None,
        }
    }

    /// Convert to the wire value
    #[inline]
    pub const fn as_i8(self) -> i8 {
        self as i8
    }
}

/// ISIS facility-specific pulse data
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IsisData {
    pub period_number: u32,
    pub run_state: RunState,
    pub proton_charge: f32,
}

/// An event message, ready to encode
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventData {
    pub source_name: String,
    pub message_id: u64,
    /// Pulse time in nanoseconds since the Unix epoch
    pub pulse_time: u64,
    pub time_of_flight: Vec<u32>,
    pub detector_id: Vec<u32>,
    pub isis_data: Option<IsisData>,
}

/// A decoded event message borrowing from the input buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedEventData<'a> {
    pub source_name: &'a str,
    pub message_id: u64,
    pub pulse_time: u64,
    pub time_of_flight: VectorView<'a, u32>,
    pub detector_id: VectorView<'a, u32>,
    pub isis_data: Option<IsisData>,
}

impl DecodedEventData<'_> {
    /// Copy into an owned message
    pub fn to_owned(&self) -> EventData {
        EventData {
            source_name: self.source_name.to_owned(),
            message_id: self.message_id,
            pulse_time: self.pulse_time,
            time_of_flight: self.time_of_flight.to_vec(),
            detector_id: self.detector_id.to_vec(),
            isis_data: self.isis_data,
        }
    }
}

/// Encode an event message with the default codec config
pub fn encode_event_data(event: &EventData) -> Result<Bytes> {
    encode_event_data_with(&CodecConfig::default(), event)
}

/// Encode an event message with an explicit codec config
pub fn encode_event_data_with(config: &CodecConfig, event: &EventData) -> Result<Bytes> {
    let mut envelope =
        Envelope::begin_with_source(SchemaId::EVENT_DATA, field::SOURCE_NAME, &event.source_name, config)?;
    let fbb = envelope.builder();

    let time_of_flight = fbb.create_vector(&event.time_of_flight)?;
    let detector_id = fbb.create_vector(&event.detector_id)?;
    let isis = event.isis_data.map(|isis| encode_isis(fbb, &isis)).transpose()?;

    envelope.start_root()?;
    let fbb = envelope.builder();
    fbb.push_slot(field::MESSAGE_ID, event.message_id, 0)?;
    fbb.push_slot_offset(field::TIME_OF_FLIGHT, time_of_flight)?;
    fbb.push_slot_offset(field::DETECTOR_ID, detector_id)?;
    if let Some(isis) = isis {
        fbb.push_slot_offset(field::FACILITY_DATA, isis)?;
        fbb.push_slot(field::FACILITY_TYPE, FACILITY_ISIS, 0)?;
    }

    envelope.finish(Header::new().timestamp(field::PULSE_TIME, event.pulse_time))
}

fn encode_isis(fbb: &mut FlatBuilder, isis: &IsisData) -> Result<UOffset> {
    fbb.start_table()?;
    fbb.push_slot(isis_field::PROTON_CHARGE, isis.proton_charge, 0.0)?;
    fbb.push_slot(isis_field::PERIOD_NUMBER, isis.period_number, 0)?;
    fbb.push_slot(isis_field::RUN_STATE, isis.run_state.as_i8(), 0)?;
    fbb.end_table()
}

/// Decode an event message
pub fn decode_event_data(buf: &[u8]) -> Result<DecodedEventData<'_>> {
    SchemaId::EVENT_DATA.check(buf)?;
    let root = FlatTable::root(buf)?;

    let (facility, facility_table) = root.read_union(field::FACILITY_TYPE.into())?;
    let isis_data = match (facility, facility_table) {
        (0, _) => None,
        (FACILITY_ISIS, Some(table)) => Some(decode_isis(&table)?),
        (FACILITY_ISIS, None) => return Err(ProtocolError::corrupt("ISIS data table is missing")),
        (other, _) => {
            return Err(ProtocolError::corrupt(format!(
                "unknown facility data discriminant {other}"
            )));
        }
    };

    Ok(DecodedEventData {
        source_name: root.read_string(field::SOURCE_NAME.into())?.unwrap_or_default(),
        message_id: root.read_u64(field::MESSAGE_ID.into(), 0),
        pulse_time: root.read_u64(field::PULSE_TIME.into(), 0),
        time_of_flight: root.read_vector(field::TIME_OF_FLIGHT.into())?.unwrap_or_default(),
        detector_id: root.read_vector(field::DETECTOR_ID.into())?.unwrap_or_default(),
        isis_data,
    })
}

fn decode_isis(table: &FlatTable<'_>) -> Result<IsisData> {
    let run_state = table.read_scalar(isis_field::RUN_STATE.into(), 0i8);
    Ok(IsisData {
        period_number: table.read_scalar(isis_field::PERIOD_NUMBER.into(), 0u32),
        run_state: RunState::from_i8(run_state)
            .ok_or_else(|| ProtocolError::corrupt(format!("unknown run state {run_state}")))?,
        proton_charge: table.read_scalar(isis_field::PROTON_CHARGE.into(), 0.0f32),
    })
}
