//! Back-to-front FlatBuffers arena
//!
//! Produces the same layout as the reference FlatBuffers builders: data is
//! prepended at the head of a buffer that grows towards lower addresses, so
//! every object must be complete before anything that points at it is
//! started. Offsets are measured from the end of the buffer.
//!
//! # Lifecycle
//!
//! A `FlatBuilder` is open until [`FlatBuilder::finish`] consumes it and
//! hands back a [`FinishedBuffer`]. Within the open state the builder checks
//! that tables and vectors are not nested and that offsets only refer to
//! objects that have already been written.

use bytes::Bytes;

use super::Element;
use crate::config::{DEFAULT_INITIAL_CAPACITY, DEFAULT_MAX_MESSAGE_SIZE};
use crate::schema::HEADER_LENGTH;
use crate::{CodecConfig, ProtocolError, Result};

/// Offset of a finished object, counted from the end of the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UOffset(u32);

impl UOffset {
    /// Raw offset value
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
struct FieldLoc {
    field: u16,
    offset: u32,
}

/// Append-only arena for building one FlatBuffers message
#[derive(Debug)]
pub struct FlatBuilder {
    buf: Vec<u8>,
    head: usize,
    min_align: usize,
    field_locs: Vec<FieldLoc>,
    table_start: Option<u32>,
    vector_open: bool,
    vtables: Vec<u32>,
    max_size: usize,
}

impl Default for FlatBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FlatBuilder {
    /// Create a builder with the default initial capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_CAPACITY)
    }

    /// Create a builder with a given initial capacity in bytes
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(HEADER_LENGTH);
        Self {
            buf: vec![0u8; capacity],
            head: capacity,
            min_align: 1,
            field_locs: Vec::new(),
            table_start: None,
            vector_open: false,
            vtables: Vec::new(),
            max_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }

    /// Create a builder sized and limited by a codec config
    pub fn from_config(config: &CodecConfig) -> Self {
        let mut builder = Self::with_capacity(config.initial_capacity);
        builder.max_size = config.max_message_size;
        builder
    }

    /// Bytes written so far; also the offset of the most recent object
    #[inline]
    pub fn offset(&self) -> u32 {
        self.used() as u32
    }

    #[inline]
    fn used(&self) -> usize {
        self.buf.len() - self.head
    }

    // =========================================================================
    // Raw prepend operations
    // =========================================================================

    /// Make sure at least `additional` bytes are free in front of the head
    fn grow(&mut self, additional: usize) {
        if self.head >= additional {
            return;
        }

        let used = self.used();
        let mut new_len = self.buf.len().max(1) * 2;
        while new_len - used < additional {
            new_len *= 2;
        }

        let mut grown = vec![0u8; new_len];
        let new_head = new_len - used;
        grown[new_head..].copy_from_slice(&self.buf[self.head..]);
        self.buf = grown;
        self.head = new_head;
    }

    fn pad(&mut self, n: usize) {
        self.head -= n;
        self.buf[self.head..self.head + n].fill(0);
    }

    /// Align so that after writing `additional` bytes, a value of `size`
    /// bytes lands on a `size`-aligned address (relative to the buffer end)
    fn prep(&mut self, size: usize, additional: usize) {
        if size > self.min_align {
            self.min_align = size;
        }
        let align_size = (size - (self.used() + additional) % size) % size;
        self.grow(align_size + size + additional);
        self.pad(align_size);
    }

    /// Write a value at the head; caller guarantees space and alignment
    #[inline]
    fn place<T: Element>(&mut self, value: T) {
        self.head -= T::SIZE;
        value.write_le(&mut self.buf[self.head..self.head + T::SIZE]);
    }

    /// Prepend an aligned scalar
    pub fn push<T: Element>(&mut self, value: T) -> UOffset {
        self.prep(T::SIZE, 0);
        self.place(value);
        UOffset(self.offset())
    }

    /// Prepend a relative offset pointing at an already written object
    pub fn push_uoffset(&mut self, target: UOffset) -> Result<UOffset> {
        self.prep(4, 0);
        if target.0 == 0 || target.0 > self.offset() {
            return Err(ProtocolError::invalid_state(
                "offset refers to an object that has not been written",
            ));
        }
        let rel = self.offset() - target.0 + 4;
        self.place::<u32>(rel);
        Ok(UOffset(self.offset()))
    }

    fn check_not_nested(&self, msg: &'static str) -> Result<()> {
        if self.table_start.is_some() || self.vector_open {
            return Err(ProtocolError::invalid_state(msg));
        }
        Ok(())
    }

    // =========================================================================
    // Strings and vectors
    // =========================================================================

    /// Write a NUL-terminated, length-prefixed UTF-8 string
    pub fn create_string(&mut self, s: &str) -> Result<UOffset> {
        self.check_not_nested("create_string called inside an open table or vector")?;

        let bytes = s.as_bytes();
        let length = len_u32(bytes.len())?;
        self.prep(4, bytes.len() + 1);
        self.place::<u8>(0);
        self.head -= bytes.len();
        self.buf[self.head..self.head + bytes.len()].copy_from_slice(bytes);
        self.place::<u32>(length);
        Ok(UOffset(self.offset()))
    }

    /// Write a vector of scalars, preserving slice order on the wire
    pub fn create_vector<T: Element>(&mut self, items: &[T]) -> Result<UOffset> {
        self.start_vector(T::SIZE, items.len(), T::SIZE)?;
        // Prepending reverses order, so walk back-to-front
        for &item in items.iter().rev() {
            self.place(item);
        }
        self.end_vector(items.len())
    }

    /// Write a vector of offsets to previously written objects
    pub fn create_vector_of_offsets(&mut self, items: &[UOffset]) -> Result<UOffset> {
        self.start_vector(4, items.len(), 4)?;
        for &item in items.iter().rev() {
            self.push_uoffset(item)?;
        }
        self.end_vector(items.len())
    }

    fn start_vector(&mut self, elem_size: usize, num_elems: usize, alignment: usize) -> Result<()> {
        self.check_not_nested("vector started inside an open table or vector")?;

        let bytes = elem_size
            .checked_mul(num_elems)
            .ok_or(ProtocolError::message_too_large(usize::MAX, self.max_size))?;
        if bytes > self.max_size {
            return Err(ProtocolError::message_too_large(bytes, self.max_size));
        }

        self.vector_open = true;
        self.prep(4, bytes);
        self.prep(alignment, bytes);
        Ok(())
    }

    fn end_vector(&mut self, num_elems: usize) -> Result<UOffset> {
        self.vector_open = false;
        let length = len_u32(num_elems)?;
        self.place::<u32>(length);
        Ok(UOffset(self.offset()))
    }

    // =========================================================================
    // Tables
    // =========================================================================

    /// Open a table; all of its children must already be written
    pub fn start_table(&mut self) -> Result<()> {
        self.check_not_nested("start_table called inside an open table or vector")?;
        self.field_locs.clear();
        self.table_start = Some(self.offset());
        Ok(())
    }

    /// Add a scalar field, omitted when equal to the schema default
    pub fn push_slot<T: Element>(&mut self, field: u16, value: T, default: T) -> Result<()> {
        if value == default {
            return self.require_table();
        }
        self.push_slot_always(field, value)
    }

    /// Add a scalar field even when it equals the schema default
    pub fn push_slot_always<T: Element>(&mut self, field: u16, value: T) -> Result<()> {
        self.require_table()?;
        let offset = self.push(value);
        self.field_locs.push(FieldLoc {
            field,
            offset: offset.0,
        });
        Ok(())
    }

    /// Add an offset field referencing a string, vector or table
    pub fn push_slot_offset(&mut self, field: u16, target: UOffset) -> Result<()> {
        self.require_table()?;
        let offset = self.push_uoffset(target)?;
        self.field_locs.push(FieldLoc {
            field,
            offset: offset.0,
        });
        Ok(())
    }

    fn require_table(&self) -> Result<()> {
        if self.table_start.is_none() {
            return Err(ProtocolError::invalid_state("field added outside of a table"));
        }
        Ok(())
    }

    /// Close the open table, writing (or reusing) its vtable
    pub fn end_table(&mut self) -> Result<UOffset> {
        let start = self
            .table_start
            .ok_or(ProtocolError::invalid_state("end_table called without start_table"))?;

        // soffset placeholder, patched once the vtable position is known
        self.push::<i32>(0);
        let object_offset = self.offset();

        let num_fields = self
            .field_locs
            .iter()
            .map(|loc| usize::from(loc.field) + 1)
            .max()
            .unwrap_or(0);

        let mut vtable = vec![0u16; 2 + num_fields];
        vtable[0] = len_u16(4 + 2 * num_fields)?;
        vtable[1] = len_u16((object_offset - start) as usize)?;
        for loc in &self.field_locs {
            vtable[2 + usize::from(loc.field)] = len_u16((object_offset - loc.offset) as usize)?;
        }

        let vtable_offset = match self.find_vtable(&vtable) {
            Some(existing) => existing,
            None => {
                for &entry in vtable.iter().rev() {
                    self.push::<u16>(entry);
                }
                let written = self.offset();
                self.vtables.push(written);
                written
            }
        };

        // vtable = table - soffset
        let soffset = (i64::from(vtable_offset) - i64::from(object_offset)) as i32;
        let table_pos = self.buf.len() - object_offset as usize;
        self.buf[table_pos..table_pos + 4].copy_from_slice(&soffset.to_le_bytes());

        self.table_start = None;
        self.field_locs.clear();
        Ok(UOffset(object_offset))
    }

    fn find_vtable(&self, vtable: &[u16]) -> Option<u32> {
        self.vtables.iter().rev().copied().find(|&candidate| {
            let pos = self.buf.len() - candidate as usize;
            vtable.iter().enumerate().all(|(i, &entry)| {
                let at = pos + 2 * i;
                self.buf
                    .get(at..at + 2)
                    .is_some_and(|b| u16::from_le_bytes([b[0], b[1]]) == entry)
            })
        })
    }

    // =========================================================================
    // Finish
    // =========================================================================

    /// Finalize the message with `root` as the root table
    ///
    /// Reserves the 4 bytes at [4,8) for the schema identifier; they are left
    /// zeroed for the framer to stamp.
    pub fn finish(mut self, root: UOffset) -> Result<FinishedBuffer> {
        self.check_not_nested("finish called with an open table or vector")?;

        let align = self.min_align.max(4);
        self.prep(align, HEADER_LENGTH);
        // identifier placeholder
        self.place::<u32>(0);
        self.push_uoffset(root)?;

        let size = self.used();
        if size > self.max_size {
            return Err(ProtocolError::message_too_large(size, self.max_size));
        }

        let data = self.buf.split_off(self.head);
        Ok(FinishedBuffer { data })
    }
}

#[inline]
fn len_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| ProtocolError::message_too_large(len, u32::MAX as usize))
}

#[inline]
fn len_u16(len: usize) -> Result<u16> {
    u16::try_from(len).map_err(|_| ProtocolError::invalid_flatbuffer("table too large for vtable"))
}

/// A finalized message, still mutable for the schema identifier stamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedBuffer {
    data: Vec<u8>,
}

impl FinishedBuffer {
    /// Message bytes
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Mutable message bytes (only the header should be touched)
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Message length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the message is empty (never true for a finished message)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Freeze into an immutable, cheaply clonable buffer
    #[inline]
    pub fn into_bytes(self) -> Bytes {
        Bytes::from(self.data)
    }
}
