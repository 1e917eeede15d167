//! Borrowed views over FlatBuffers vectors
//!
//! Views never copy: they hold a slice of the source message and decode
//! elements on access. Use `to_vec` to materialize an owned copy that can
//! outlive the message.

use std::fmt;
use std::marker::PhantomData;

use super::{Element, follow_offset, read_str_at};
use crate::{ProtocolError, Result};

// =============================================================================
// Numeric vectors
// =============================================================================

/// Zero-copy view of a vector of little-endian scalars
#[derive(Clone, Copy)]
pub struct VectorView<'a, T> {
    bytes: &'a [u8],
    _marker: PhantomData<T>,
}

impl<'a, T: Element> VectorView<'a, T> {
    /// Wrap raw element bytes; any trailing partial element is ignored
    #[inline]
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        let whole = bytes.len() - bytes.len() % T::SIZE;
        Self {
            bytes: &bytes[..whole],
            _marker: PhantomData,
        }
    }

    /// An empty view
    #[inline]
    pub fn empty() -> Self {
        Self::new(&[])
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len() / T::SIZE
    }

    /// Check if the vector has no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Element at `index`, or None if out of range
    #[inline]
    pub fn get(&self, index: usize) -> Option<T> {
        let start = index.checked_mul(T::SIZE)?;
        let end = start.checked_add(T::SIZE)?;
        let chunk = self.bytes.get(start..end)?;
        Some(T::read_le(chunk))
    }

    /// Iterate over elements in wire order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = T> + DoubleEndedIterator + use<'a, T> {
        self.bytes.chunks_exact(T::SIZE).map(T::read_le)
    }

    /// Sub-view of `len` elements starting at `start`
    pub fn slice(&self, start: usize, len: usize) -> Option<Self> {
        let from = start.checked_mul(T::SIZE)?;
        let to = from.checked_add(len.checked_mul(T::SIZE)?)?;
        self.bytes.get(from..to).map(Self::new)
    }

    /// Raw little-endian element bytes
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Copy the elements into an owned vector
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

impl<T: Element> Default for VectorView<'_, T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Element> fmt::Debug for VectorView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Element> PartialEq for VectorView<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Element> PartialEq<[T]> for VectorView<'_, T> {
    fn eq(&self, other: &[T]) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter().copied())
    }
}

impl<T: Element> PartialEq<Vec<T>> for VectorView<'_, T> {
    fn eq(&self, other: &Vec<T>) -> bool {
        *self == *other.as_slice()
    }
}

// =============================================================================
// String vectors
// =============================================================================

/// Zero-copy view of a vector of strings
///
/// There is no contiguous representation for strings, so each element is
/// resolved by indexed access through its offset slot.
#[derive(Clone, Copy)]
pub struct StringVector<'a> {
    buf: &'a [u8],
    slots_start: usize,
    len: usize,
}

impl<'a> StringVector<'a> {
    #[inline]
    pub(crate) fn new(buf: &'a [u8], slots_start: usize, len: usize) -> Self {
        Self {
            buf,
            slots_start,
            len,
        }
    }

    /// An empty view
    #[inline]
    pub fn empty() -> Self {
        Self::new(&[], 0, 0)
    }

    /// Number of strings
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the vector has no strings
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// String at `index`
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or the element is
    /// malformed.
    pub fn get(&self, index: usize) -> Result<&'a str> {
        if index >= self.len {
            return Err(ProtocolError::invalid_flatbuffer(format!(
                "string index {} out of range for vector of {}",
                index, self.len
            )));
        }
        let slot = self.slots_start + index * 4;
        let target = follow_offset(self.buf, slot)?;
        read_str_at(self.buf, target)
    }

    /// Iterate over strings in wire order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Result<&'a str>> + use<'a> {
        let view = *self;
        (0..self.len).map(move |i| view.get(i))
    }

    /// Copy the strings into owned values
    pub fn to_vec(&self) -> Result<Vec<String>> {
        self.iter().map(|s| s.map(str::to_owned)).collect()
    }
}

impl Default for StringVector<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for StringVector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for item in self.iter() {
            match item {
                Ok(s) => list.entry(&s),
                Err(_) => list.entry(&"<invalid>"),
            };
        }
        list.finish()
    }
}

impl PartialEq for StringVector<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| matches!((a, b), (Ok(a), Ok(b)) if a == b))
    }
}
