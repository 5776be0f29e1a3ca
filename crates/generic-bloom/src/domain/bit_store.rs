//! Packed fixed-length bit vector backing a Bloom filter
//!
//! INVARIANTS:
//! - Length is at least 8 and always a multiple of 8
//! - Bits are only ever set, never cleared; the store never shrinks

use bitvec::prelude::*;

use crate::error::FilterError;

/// Fixed-length packed bit vector.
///
/// The requested size is rounded up to the next byte boundary and the
/// rounded size is the canonical [`len`](Self::len) used for index reduction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitStore {
    bits: BitVec<u8, Lsb0>,
}

impl BitStore {
    /// Create a zeroed store holding at least `size_bits` bits.
    pub fn new(size_bits: usize) -> Result<Self, FilterError> {
        let rounded = Self::rounded_len(size_bits)?;
        Ok(Self {
            bits: bitvec![u8, Lsb0; 0; rounded],
        })
    }

    /// Length a store created with `size_bits` would have, without allocating.
    pub fn rounded_len(size_bits: usize) -> Result<usize, FilterError> {
        if size_bits == 0 {
            return Err(FilterError::invalid_argument(
                "bit_count",
                "must be greater than zero",
            ));
        }

        size_bits.div_ceil(8).checked_mul(8).ok_or_else(|| {
            FilterError::invalid_argument("bit_count", "must fit in memory once rounded to bytes")
        })
    }

    /// Length in bits, after rounding.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Always false: a store holds at least one byte.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<bool, FilterError> {
        self.bits
            .get(index)
            .map(|bit| *bit)
            .ok_or(FilterError::IndexOutOfRange {
                index,
                len: self.len(),
            })
    }

    pub fn set(&mut self, index: usize) -> Result<(), FilterError> {
        let len = self.len();
        if index >= len {
            return Err(FilterError::IndexOutOfRange { index, len });
        }
        self.bits.set(index, true);
        Ok(())
    }

    /// Read the bit at `index % len`.
    pub fn get_wrapping(&self, index: usize) -> bool {
        self.bits[index % self.bits.len()]
    }

    /// Set the bit at `index % len`.
    pub fn set_wrapping(&mut self, index: usize) {
        let len = self.bits.len();
        self.bits.set(index % len, true);
    }

    /// Number of bits currently set.
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    /// Underlying bytes, bit 0 in the least-significant bit of byte 0.
    pub fn as_bytes(&self) -> &[u8] {
        self.bits.as_raw_slice()
    }
}
