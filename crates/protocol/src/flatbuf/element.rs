//! Fixed-width scalar elements
//!
//! The closed set of numeric types that can live inline in a table or in a
//! vector. All are stored little-endian.

use std::fmt;

mod sealed {
    pub trait Sealed {}
}

/// A numeric scalar with a fixed little-endian wire representation
pub trait Element: sealed::Sealed + Copy + PartialEq + Default + fmt::Debug + Send + Sync + 'static {
    /// Width in bytes (also the required alignment)
    const SIZE: usize;

    /// Write the value into the first `SIZE` bytes of `dst`
    fn write_le(self, dst: &mut [u8]);

    /// Read a value from the first `SIZE` bytes of `src`
    fn read_le(src: &[u8]) -> Self;
}

macro_rules! impl_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Element for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn write_le(self, dst: &mut [u8]) {
                    dst[..Self::SIZE].copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn read_le(src: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&src[..Self::SIZE]);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_element!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);
