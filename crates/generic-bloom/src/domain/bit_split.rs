//! Slicing a hash bit-stream into fixed-width integers
//!
//! Bit `i` of a stream is bit `i % 8` of byte `i / 8`. Two slicers exist,
//! one per derivation strategy, and each strategy only ever uses its own:
//!
//! - `split_lsb_first` (extend-and-split): a running accumulator, stream
//!   bit 0 lands in the least-significant bit of the first integer.
//! - `split_msb_first` (generator): every group is assembled starting at its
//!   most-significant bit, the group's last stream bit, walking down to its
//!   first stream bit.
//!
//! Integers are at most 31 bits so every index fits a native signed integer.

use bitvec::prelude::*;

use crate::error::FilterError;

/// Widest index either slicer will produce.
pub const MAX_INDEX_BITS: usize = 31;

fn validate_width(name: &'static str, width: usize) -> Result<(), FilterError> {
    if width == 0 {
        return Err(FilterError::invalid_argument(name, "must be at least 1"));
    }
    if width > MAX_INDEX_BITS {
        return Err(FilterError::ItemTooLarge(format!(
            "index width {width} exceeds {MAX_INDEX_BITS} bits"
        )));
    }
    Ok(())
}

/// Slice `bytes` into as many `width`-bit integers as it fully contains.
pub fn split_lsb_first(bytes: &[u8], width: usize) -> Result<Vec<u32>, FilterError> {
    validate_width("width", width)?;
    Ok(pack_lsb_first(bytes, width, usize::MAX))
}

/// Slice the first `size * count` bits of `bytes` into `count` integers.
pub fn split_msb_first(bytes: &[u8], size: usize, count: usize) -> Result<Vec<u32>, FilterError> {
    validate_width("size", size)?;

    let available = bytes.len() * 8;
    match size.checked_mul(count) {
        Some(needed) if needed <= available => {}
        _ => {
            return Err(FilterError::ItemTooLarge(format!(
                "{count} indexes of {size} bits exceed the {available}-bit stream"
            )))
        }
    }

    Ok(pack_msb_first(bytes.view_bits::<Lsb0>(), size, count))
}

/// Unchecked LSB-first packing, stopping after `limit` integers.
///
/// `width` must already be within `1..=MAX_INDEX_BITS`.
pub(crate) fn pack_lsb_first(bytes: &[u8], width: usize, limit: usize) -> Vec<u32> {
    let mask = (1u64 << width) - 1;
    let mut values = Vec::with_capacity(limit.min(bytes.len() * 8 / width));

    let mut acc: u64 = 0;
    let mut held = 0usize;
    for &byte in bytes {
        acc |= u64::from(byte) << held;
        held += 8;

        while held >= width {
            if values.len() == limit {
                return values;
            }
            values.push((acc & mask) as u32);
            acc >>= width;
            held -= width;
        }
    }

    values
}

/// Unchecked MSB-first packing of `count` groups of `size` bits.
///
/// `bits` must hold at least `size * count` bits.
pub(crate) fn pack_msb_first(bits: &BitSlice<u8, Lsb0>, size: usize, count: usize) -> Vec<u32> {
    bits.chunks_exact(size)
        .take(count)
        .map(|group| {
            group
                .iter()
                .by_vals()
                .rev()
                .fold(0u32, |item, bit| (item << 1) | u32::from(bit))
        })
        .collect()
}
