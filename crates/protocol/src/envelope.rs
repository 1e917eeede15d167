//! Message envelope
//!
//! Wraps a [`FlatBuilder`] for one message: the source name goes in first,
//! the kind-specific payload is written next, and [`Envelope::finish`] adds
//! the header fields, closes the root table, finalizes the buffer and stamps
//! the schema identifier.
//!
//! # Layout order
//!
//! ```text
//! begin            -> source string
//! (caller)         -> payload children (strings, vectors, value tables)
//! start_root       -> root table opened, source field added
//! (caller)         -> payload fields of the root table
//! finish           -> timestamp [status [severity]], end root, finish, stamp
//! ```

use bytes::Bytes;

use crate::flatbuf::{FlatBuilder, UOffset};
use crate::schema::SchemaId;
use crate::{CodecConfig, Result};

/// Header fields added to the root table when the envelope is finished
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Header {
    timestamp: Option<(u16, u64)>,
    status: Option<(u16, u16)>,
    severity: Option<(u16, u16)>,
}

impl Header {
    /// Header with no fields
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Primary timestamp in `field` (omitted on the wire when zero)
    #[inline]
    #[must_use]
    pub fn timestamp(mut self, field: u16, value: u64) -> Self {
        self.timestamp = Some((field, value));
        self
    }

    /// Alarm status in `field`, if any
    #[inline]
    #[must_use]
    pub fn status(mut self, field: u16, value: Option<u16>) -> Self {
        self.status = value.map(|v| (field, v));
        self
    }

    /// Alarm severity in `field`; only written when a status is present
    #[inline]
    #[must_use]
    pub fn severity(mut self, field: u16, value: Option<u16>) -> Self {
        self.severity = value.map(|v| (field, v));
        self
    }
}

/// An open message under construction
#[derive(Debug)]
pub struct Envelope {
    builder: FlatBuilder,
    schema: SchemaId,
    source: Option<(u16, UOffset)>,
    root_open: bool,
}

impl Envelope {
    /// Start a message without a source name
    pub fn begin(schema: SchemaId, config: &CodecConfig) -> Self {
        Self {
            builder: FlatBuilder::from_config(config),
            schema,
            source: None,
            root_open: false,
        }
    }

    /// Start a message whose root table carries `source_name` in `source_field`
    ///
    /// The string is written before anything else so that every payload
    /// child still precedes the root table.
    pub fn begin_with_source(
        schema: SchemaId,
        source_field: u16,
        source_name: &str,
        config: &CodecConfig,
    ) -> Result<Self> {
        let mut envelope = Self::begin(schema, config);
        let offset = envelope.builder.create_string(source_name)?;
        envelope.source = Some((source_field, offset));
        Ok(envelope)
    }

    /// Schema identifier this envelope will be stamped with
    #[inline]
    pub fn schema(&self) -> SchemaId {
        self.schema
    }

    /// Offset of the source string, if one was written
    #[inline]
    pub fn source_offset(&self) -> Option<UOffset> {
        self.source.map(|(_, offset)| offset)
    }

    /// Builder for payload children and root fields
    #[inline]
    pub fn builder(&mut self) -> &mut FlatBuilder {
        &mut self.builder
    }

    /// Open the root table and add the source field
    ///
    /// All payload children must be written before this call.
    pub fn start_root(&mut self) -> Result<()> {
        self.builder.start_table()?;
        self.root_open = true;
        if let Some((field, offset)) = self.source {
            self.builder.push_slot_offset(field, offset)?;
        }
        Ok(())
    }

    /// Add header fields, close the root table and produce the final buffer
    ///
    /// Severity is dropped when no status is given: it is meaningless on its
    /// own.
    pub fn finish(mut self, header: Header) -> Result<Bytes> {
        if !self.root_open {
            self.start_root()?;
        }

        if let Some((field, timestamp)) = header.timestamp {
            self.builder.push_slot(field, timestamp, 0u64)?;
        }

        if let Some((status_field, status)) = header.status {
            self.builder.push_slot_always(status_field, status)?;
            if let Some((severity_field, severity)) = header.severity {
                self.builder.push_slot_always(severity_field, severity)?;
            }
        }

        let root = self.builder.end_table()?;
        let mut finished = self.builder.finish(root)?;
        self.schema.stamp(finished.as_mut_slice())?;

        tracing::trace!(schema = %self.schema, size = finished.len(), "message encoded");
        Ok(finished.into_bytes())
    }
}

#[cfg(test)]
#[path = "envelope_test.rs"]
mod envelope_test;
