//! FlatBuffer table parsing helpers
//!
//! Generic utilities for parsing FlatBuffer tables without code generation.
//! Field indices are vtable slot numbers (the schema's field ids), not byte
//! offsets.

use super::{Element, StringVector, VectorView, follow_offset, read_i32, read_str_at, read_u16, read_u32};
use crate::schema::HEADER_LENGTH;
use crate::{ProtocolError, Result};

/// Helper for parsing FlatBuffer tables
#[derive(Debug, Clone, Copy)]
pub struct FlatTable<'a> {
    buf: &'a [u8],
    table_offset: usize,
    vtable_offset: usize,
    vtable_fields: usize,
}

impl<'a> FlatTable<'a> {
    /// Parse the root table of a message
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer cannot hold a header or the root
    /// offset points outside the buffer.
    pub fn root(buf: &'a [u8]) -> Result<Self> {
        if buf.len() < HEADER_LENGTH {
            return Err(ProtocolError::too_short(HEADER_LENGTH, buf.len()));
        }

        let root_offset = read_u32(buf, 0)? as usize;
        if root_offset < HEADER_LENGTH || root_offset >= buf.len() {
            return Err(ProtocolError::invalid_flatbuffer(format!(
                "root offset {} exceeds buffer length {}",
                root_offset,
                buf.len()
            )));
        }

        Self::parse(buf, root_offset)
    }

    /// Parse a table at the given offset
    pub fn parse(buf: &'a [u8], table_offset: usize) -> Result<Self> {
        if table_offset.saturating_add(4) > buf.len() {
            return Err(ProtocolError::invalid_flatbuffer("table offset out of bounds"));
        }

        // FlatBuffers spec: vtable = table - soffset, for either sign
        let vtable_soffset = read_i32(buf, table_offset)?;
        let vtable_offset = if vtable_soffset >= 0 {
            table_offset
                .checked_sub(vtable_soffset as usize)
                .ok_or_else(|| ProtocolError::invalid_flatbuffer("vtable offset underflow"))?
        } else {
            // Negative soffset: vtable after the table (shared vtables)
            table_offset
                .checked_add(vtable_soffset.unsigned_abs() as usize)
                .ok_or_else(|| ProtocolError::invalid_flatbuffer("vtable offset overflow"))?
        };

        if vtable_offset.saturating_add(4) > buf.len() {
            return Err(ProtocolError::invalid_flatbuffer("vtable out of bounds"));
        }

        let vtable_size = read_u16(buf, vtable_offset)? as usize;
        if vtable_size < 4 || vtable_offset + vtable_size > buf.len() {
            return Err(ProtocolError::invalid_flatbuffer(format!(
                "invalid vtable size {} at offset {}",
                vtable_size, vtable_offset
            )));
        }

        let vtable_fields = (vtable_size - 4) / 2;

        Ok(Self {
            buf,
            table_offset,
            vtable_offset,
            vtable_fields,
        })
    }

    /// Underlying message bytes
    #[inline]
    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    /// Get field offset from vtable
    fn field_offset(&self, field_index: usize) -> Option<usize> {
        if field_index >= self.vtable_fields {
            return None;
        }

        let slot_offset = self.vtable_offset + 4 + (field_index * 2);
        let field_offset = read_u16(self.buf, slot_offset).ok()? as usize;
        if field_offset == 0 {
            None
        } else {
            Some(self.table_offset + field_offset)
        }
    }

    /// Check whether a field is present in the vtable
    #[inline]
    pub fn has_field(&self, field_index: usize) -> bool {
        self.field_offset(field_index).is_some()
    }

    /// Read a scalar field with default
    pub fn read_scalar<T: Element>(&self, field_index: usize, default: T) -> T {
        self.field_offset(field_index)
            .and_then(|off| self.buf.get(off..off + T::SIZE))
            .map(T::read_le)
            .unwrap_or(default)
    }

    /// Read u8 field with default
    #[inline]
    pub fn read_u8(&self, field_index: usize, default: u8) -> u8 {
        self.read_scalar(field_index, default)
    }

    /// Read u64 field with default
    #[inline]
    pub fn read_u64(&self, field_index: usize, default: u64) -> u64 {
        self.read_scalar(field_index, default)
    }

    /// Resolve an offset field to the absolute position it points at
    fn target(&self, field_index: usize) -> Result<Option<usize>> {
        match self.field_offset(field_index) {
            Some(field_offset) => follow_offset(self.buf, field_offset).map(Some),
            None => Ok(None),
        }
    }

    /// Read nested table field
    pub fn read_table(&self, field_index: usize) -> Result<Option<FlatTable<'a>>> {
        match self.target(field_index)? {
            Some(offset) => FlatTable::parse(self.buf, offset).map(Some),
            None => Ok(None),
        }
    }

    /// Read a union: the type byte at `type_field` and the table in the
    /// following slot
    pub fn read_union(&self, type_field: usize) -> Result<(u8, Option<FlatTable<'a>>)> {
        let tag = self.read_u8(type_field, 0);
        let table = self.read_table(type_field + 1)?;
        Ok((tag, table))
    }

    /// Locate a vector's elements: (data start, element count)
    fn vector_bounds(&self, field_index: usize, elem_size: usize) -> Result<Option<(usize, usize)>> {
        let Some(vector_offset) = self.target(field_index)? else {
            return Ok(None);
        };

        let length = read_u32(self.buf, vector_offset)? as usize;
        let data_start = vector_offset + 4;
        let data_end = length
            .checked_mul(elem_size)
            .and_then(|bytes| data_start.checked_add(bytes))
            .ok_or_else(|| ProtocolError::invalid_flatbuffer("vector length overflow"))?;

        if data_end > self.buf.len() {
            return Err(ProtocolError::invalid_flatbuffer(format!(
                "vector data extends past buffer: {} + {} > {}",
                data_start,
                length * elem_size,
                self.buf.len()
            )));
        }

        Ok(Some((data_start, length)))
    }

    /// Read bytes vector
    pub fn read_bytes(&self, field_index: usize) -> Result<Option<&'a [u8]>> {
        Ok(self
            .vector_bounds(field_index, 1)?
            .map(|(start, len)| &self.buf[start..start + len]))
    }

    /// Read a vector of scalars as a borrowed view
    pub fn read_vector<T: Element>(&self, field_index: usize) -> Result<Option<VectorView<'a, T>>> {
        Ok(self
            .vector_bounds(field_index, T::SIZE)?
            .map(|(start, len)| VectorView::new(&self.buf[start..start + len * T::SIZE])))
    }

    /// Read string field
    pub fn read_string(&self, field_index: usize) -> Result<Option<&'a str>> {
        match self.target(field_index)? {
            Some(offset) => read_str_at(self.buf, offset).map(Some),
            None => Ok(None),
        }
    }

    /// Read a vector of strings as a borrowed view
    pub fn read_string_vector(&self, field_index: usize) -> Result<Option<StringVector<'a>>> {
        Ok(self
            .vector_bounds(field_index, 4)?
            .map(|(start, len)| StringVector::new(self.buf, start, len)))
    }

    /// Read vector of tables
    pub fn read_vector_of_tables(&self, field_index: usize) -> Result<Option<Vec<FlatTable<'a>>>> {
        let Some((data_start, length)) = self.vector_bounds(field_index, 4)? else {
            return Ok(None);
        };

        let mut tables = Vec::with_capacity(length);
        for i in 0..length {
            let elem_offset = follow_offset(self.buf, data_start + i * 4)?;
            tables.push(FlatTable::parse(self.buf, elem_offset)?);
        }

        Ok(Some(tables))
    }
}
