//! FlatBuffers wire primitives
//!
//! Binary-compatible building and zero-copy parsing of FlatBuffers tables
//! without code generation.
//!
//! # Wire Format
//!
//! ```text
//! [4 bytes: root offset] [4 bytes: schema identifier] ... -> [table]
//!                                                             |
//!                                                             v
//!                                                   [vtable soffset (i32)]
//!                                                   [field data...]
//!
//! [vtable]
//! [vtable size (u16)]
//! [table size (u16)]
//! [field offsets (u16 each, 0 = absent)]
//! ```
//!
//! The builder grows back-to-front: children (strings, vectors, nested
//! tables) are written before the tables that reference them, and vector
//! elements are prepended in reverse order.
//!
//! # Safety
//!
//! The reader performs bounds checking on all accesses. Invalid messages
//! return errors rather than panicking or reading out of bounds.

mod builder;
mod element;
mod table;
mod vector;

pub use builder::{FinishedBuffer, FlatBuilder, UOffset};
pub use element::Element;
pub use table::FlatTable;
pub use vector::{StringVector, VectorView};

use crate::{ProtocolError, Result};

// =============================================================================
// Read Helpers
// =============================================================================

#[inline]
pub(crate) fn read_u16(buf: &[u8], offset: usize) -> Result<u16> {
    read_le::<u16>(buf, offset)
}

#[inline]
pub(crate) fn read_u32(buf: &[u8], offset: usize) -> Result<u32> {
    read_le::<u32>(buf, offset)
}

#[inline]
pub(crate) fn read_i32(buf: &[u8], offset: usize) -> Result<i32> {
    read_le::<i32>(buf, offset)
}

#[inline]
fn read_le<T: Element>(buf: &[u8], offset: usize) -> Result<T> {
    let end = offset
        .checked_add(T::SIZE)
        .ok_or_else(|| ProtocolError::invalid_flatbuffer("offset overflow"))?;
    match buf.get(offset..end) {
        Some(bytes) => Ok(T::read_le(bytes)),
        None => Err(ProtocolError::too_short(end, buf.len())),
    }
}

/// Follow a relative uoffset stored at `offset`
#[inline]
pub(crate) fn follow_offset(buf: &[u8], offset: usize) -> Result<usize> {
    let rel = read_u32(buf, offset)? as usize;
    let target = offset
        .checked_add(rel)
        .ok_or_else(|| ProtocolError::invalid_flatbuffer("offset overflow"))?;
    if target >= buf.len() {
        return Err(ProtocolError::invalid_flatbuffer(format!(
            "offset {} exceeds buffer length {}",
            target,
            buf.len()
        )));
    }
    Ok(target)
}

/// Read a length-prefixed UTF-8 string located at `offset`
pub(crate) fn read_str_at(buf: &[u8], offset: usize) -> Result<&str> {
    let length = read_u32(buf, offset)? as usize;
    let data_start = offset + 4;
    let data_end = data_start
        .checked_add(length)
        .ok_or_else(|| ProtocolError::invalid_flatbuffer("string length overflow"))?;

    let bytes = buf.get(data_start..data_end).ok_or_else(|| {
        ProtocolError::invalid_flatbuffer(format!(
            "string data extends past buffer: {} + {} > {}",
            data_start,
            length,
            buf.len()
        ))
    })?;

    std::str::from_utf8(bytes).map_err(|_| ProtocolError::invalid_flatbuffer("invalid UTF-8 string"))
}
