//! Row-major shapes and reshaped views

use super::HistogramArrayRef;
use crate::{ProtocolError, Result};

/// Extent of each dimension of an N-dimensional array
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// Shape from wire dimensions
    pub fn from_u32(dims: &[u32]) -> Self {
        Self::new(dims.iter().map(|&d| d as usize).collect())
    }

    /// Wire dimensions
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` if an extent does not fit in a `u32`.
    pub fn to_u32(&self) -> Result<Vec<u32>> {
        self.dims
            .iter()
            .map(|&d| {
                u32::try_from(d)
                    .map_err(|_| ProtocolError::unsupported_type(format!("dimension extent {d} exceeds u32")))
            })
            .collect()
    }

    /// Number of dimensions
    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Product of all extents (1 for rank 0), `None` on overflow
    pub fn element_count(&self) -> Option<usize> {
        self.dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    /// Row-major strides in elements
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1usize; self.dims.len()];
        for i in (0..self.dims.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1].saturating_mul(self.dims[i + 1]);
        }
        strides
    }

    /// Flat offset of a multi-dimensional index, `None` if out of bounds
    pub fn flat_index(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.dims.len() {
            return None;
        }
        index
            .iter()
            .zip(&self.dims)
            .zip(self.strides())
            .try_fold(0usize, |acc, ((&i, &dim), stride)| {
                if i >= dim {
                    return None;
                }
                acc.checked_add(i.checked_mul(stride)?)
            })
    }

    /// Multi-dimensional index of a flat offset, `None` if out of bounds
    pub fn unravel(&self, mut flat: usize) -> Option<Vec<usize>> {
        if flat >= self.element_count()? {
            return None;
        }
        let mut index = Vec::with_capacity(self.dims.len());
        for stride in self.strides() {
            index.push(flat / stride);
            flat %= stride;
        }
        Some(index)
    }

    /// Shape with the first axis removed
    pub fn inner(&self) -> Self {
        Self::new(self.dims.iter().skip(1).copied().collect())
    }

    /// Check that a flat array of `len` elements fills this shape
    pub(crate) fn check_len(&self, field: &'static str, len: usize) -> Result<()> {
        let expected = self
            .element_count()
            .ok_or_else(|| ProtocolError::corrupt(format!("{field} shape overflows: {:?}", self.dims)))?;
        if expected != len {
            return Err(ProtocolError::shape_mismatch(field, expected, len));
        }
        Ok(())
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

/// A flat array viewed with an N-dimensional row-major shape
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray<'a> {
    shape: Shape,
    values: HistogramArrayRef<'a>,
}

impl<'a> NdArray<'a> {
    /// Reshape `values`; fails if the element count does not match
    pub fn new(shape: Shape, values: HistogramArrayRef<'a>, field: &'static str) -> Result<Self> {
        shape.check_len(field, values.len())?;
        Ok(Self { shape, values })
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Underlying flat values in row-major order
    #[inline]
    pub fn values(&self) -> HistogramArrayRef<'a> {
        self.values
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.rank()
    }

    /// Total number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Element at a multi-dimensional index, converted to `f64`
    pub fn get_f64(&self, index: &[usize]) -> Option<f64> {
        self.values.get_f64(self.shape.flat_index(index)?)
    }

    /// The `i`-th slice along the first axis, one rank lower
    pub fn subarray(&self, i: usize) -> Option<NdArray<'a>> {
        let (&first, _) = self.shape.dims.split_first()?;
        if i >= first {
            return None;
        }
        let inner = self.shape.inner();
        let len = inner.element_count()?;
        let values = self.values.slice(i.checked_mul(len)?, len)?;
        Some(NdArray { shape: inner, values })
    }
}
