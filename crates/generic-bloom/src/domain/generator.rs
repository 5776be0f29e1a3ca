//! Generator index derivation
//!
//! One primitive type produces a bit-stream sized exactly to the request:
//!
//! - a fixed primitive is invoked once and must cover every bit on its own;
//! - a keyed primitive is invoked once per key `0..hashes_needed`, each
//!   output written into its own region of one buffer.
//!
//! The stream is then sliced MSB-first into `index_count` groups.
//!
//! Keyed invocations are independent, so above [`PARALLEL_THRESHOLD`] they
//! run on the rayon pool. Regions never overlap, so the result does not
//! depend on completion order.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use bitvec::prelude::*;
use rayon::prelude::*;
use tracing::debug;

use super::bit_split::{pack_msb_first, MAX_INDEX_BITS};
use super::index::IndexFunction;
use crate::adapters::KeyedPrimitive;
use crate::error::FilterError;
use crate::ports::{ElementEncoder, HashPrimitive, KeyedHashPrimitive};

/// Parallel threshold - keyed invocations per element below this run sequentially.
pub const PARALLEL_THRESHOLD: usize = 4;

/// Source of hash bits for the generator strategy.
#[derive(Clone, Debug)]
pub enum HashGenerator {
    /// Invoked once per element; its width bounds `index_bits * index_count`.
    Fixed(Arc<dyn HashPrimitive>),
    /// Re-keyed as many times as the request needs.
    Keyed(Arc<dyn KeyedHashPrimitive>),
}

impl Default for HashGenerator {
    /// HMAC-SHA512, keyed.
    fn default() -> Self {
        Self::keyed(KeyedPrimitive::hmac_sha512())
    }
}

impl HashGenerator {
    pub fn fixed(primitive: impl HashPrimitive + 'static) -> Self {
        Self::Fixed(Arc::new(primitive))
    }

    pub fn keyed(primitive: impl KeyedHashPrimitive + 'static) -> Self {
        Self::Keyed(Arc::new(primitive))
    }

    /// Bits produced by one invocation of the underlying primitive.
    pub fn output_bits(&self) -> usize {
        match self {
            Self::Fixed(p) => p.output_bits(),
            Self::Keyed(p) => p.output_bits(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fixed(p) => p.name(),
            Self::Keyed(p) => p.name(),
        }
    }

    /// Build an index function emitting `index_count` values below
    /// `2^ceil(log2(max_value))`.
    ///
    /// Every budget check happens here, so the returned function never fails.
    pub fn generate<T: ?Sized, E: ElementEncoder<T>>(
        &self,
        max_value: usize,
        index_count: usize,
        encoder: E,
    ) -> Result<GeneratedIndexes<T, E>, FilterError> {
        let plan = self.plan(max_value, index_count)?;

        debug!(
            primitive = self.name(),
            max_value,
            index_bits = plan.index_bits,
            index_count,
            hashes_per_query = plan.hashes_needed,
            "Built generator index function"
        );

        Ok(GeneratedIndexes {
            generator: self.clone(),
            index_bits: plan.index_bits,
            index_count,
            hashes_needed: plan.hashes_needed,
            encoder,
            _element: PhantomData,
        })
    }

    /// Check that this generator can serve the request, without building it.
    pub fn validate(&self, max_value: usize, index_count: usize) -> Result<(), FilterError> {
        self.plan(max_value, index_count).map(|_| ())
    }

    fn plan(&self, max_value: usize, index_count: usize) -> Result<GeneratorPlan, FilterError> {
        if max_value == 0 {
            return Err(FilterError::invalid_argument(
                "max_value",
                "must be at least 1",
            ));
        }
        if index_count == 0 {
            return Err(FilterError::invalid_argument(
                "index_count",
                "must be at least 1",
            ));
        }

        let index_bits = index_bits_for(max_value);
        if index_bits > MAX_INDEX_BITS {
            return Err(FilterError::ItemTooLarge(format!(
                "index width {index_bits} exceeds {MAX_INDEX_BITS} bits"
            )));
        }
        let needed = index_bits.checked_mul(index_count).ok_or_else(|| {
            FilterError::ItemTooLarge(format!(
                "{index_count} indexes of {index_bits} bits overflow"
            ))
        })?;

        let available = self.output_bits();
        if available == 0 {
            return Err(FilterError::InvalidPrimitiveList(format!(
                "primitive {} produces no output bits",
                self.name()
            )));
        }
        let hashes_needed = match self {
            Self::Fixed(_) => {
                if needed > available {
                    return Err(FilterError::InsufficientHashBits { needed, available });
                }
                1
            }
            Self::Keyed(_) => needed.div_ceil(available),
        };

        Ok(GeneratorPlan {
            index_bits,
            hashes_needed,
        })
    }
}

struct GeneratorPlan {
    index_bits: usize,
    hashes_needed: usize,
}

/// `ceil(log2(max_value))`, at least 1.
pub fn index_bits_for(max_value: usize) -> usize {
    if max_value <= 2 {
        return 1;
    }
    (usize::BITS - (max_value - 1).leading_zeros()) as usize
}

/// Index function built by [`HashGenerator::generate`].
pub struct GeneratedIndexes<T: ?Sized, E> {
    generator: HashGenerator,
    index_bits: usize,
    index_count: usize,
    hashes_needed: usize,
    encoder: E,
    _element: PhantomData<fn(&T)>,
}

impl<T: ?Sized, E> GeneratedIndexes<T, E> {
    pub fn index_bits(&self) -> usize {
        self.index_bits
    }

    pub fn index_count(&self) -> usize {
        self.index_count
    }

    /// Primitive invocations per element.
    pub fn hashes_per_query(&self) -> usize {
        self.hashes_needed
    }

    fn bit_stream(&self, encoded: &[u8]) -> Vec<u8> {
        let total_bytes = (self.index_bits * self.index_count).div_ceil(8);

        let mut buffer = match &self.generator {
            HashGenerator::Fixed(primitive) => primitive.compute(encoded),
            HashGenerator::Keyed(primitive) => {
                keyed_stream(primitive.as_ref(), encoded, self.hashes_needed)
            }
        };

        if buffer.len() < total_bytes {
            buffer.resize(total_bytes, 0);
        }
        buffer
    }
}

/// Concatenate `hashes` keyed outputs, key `i` written at region `i`.
fn keyed_stream(primitive: &dyn KeyedHashPrimitive, encoded: &[u8], hashes: usize) -> Vec<u8> {
    let region = primitive.output_bits().div_ceil(8);
    let mut buffer = vec![0u8; region * hashes];

    let fill = |(seed, chunk): (usize, &mut [u8])| {
        let output = primitive.compute_keyed(&(seed as u32).to_le_bytes(), encoded);
        let len = output.len().min(chunk.len());
        chunk[..len].copy_from_slice(&output[..len]);
    };

    if hashes < PARALLEL_THRESHOLD {
        buffer.chunks_mut(region).enumerate().for_each(fill);
    } else {
        buffer.par_chunks_mut(region).enumerate().for_each(fill);
    }

    buffer
}

impl<T: ?Sized, E: ElementEncoder<T>> IndexFunction<T> for GeneratedIndexes<T, E> {
    fn indexes(&self, item: &T) -> Vec<u32> {
        let encoded = self.encoder.encode(item);
        let stream = self.bit_stream(&encoded);
        pack_msb_first(stream.view_bits::<Lsb0>(), self.index_bits, self.index_count)
    }
}

impl<T: ?Sized, E> fmt::Debug for GeneratedIndexes<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedIndexes")
            .field("generator", &self.generator)
            .field("index_bits", &self.index_bits)
            .field("index_count", &self.index_count)
            .field("hashes_needed", &self.hashes_needed)
            .finish()
    }
}
