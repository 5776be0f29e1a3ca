//! Generic Bloom filter
//!
//! INVARIANTS:
//! - No false negatives: once `add(x)` returns, `probably_contains(x)` is true
//! - Bit count and index function are fixed for the filter's lifetime
//! - Bits are never cleared

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use super::bit_store::BitStore;
use super::extend_split::ExtendAndSplit;
use super::generator::HashGenerator;
use super::index::{index_width_for, IndexFunction};
use super::parameters::{calculate_fpr, FilterParameters, Sizing};
use crate::error::FilterError;
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::{ElementEncoder, HashPrimitive, ProbabilisticSet};

/// Bloom filter over elements of type `T`
///
/// A space-efficient probabilistic set: false positives are possible,
/// false negatives are not. Elements reach the filter only through its index
/// function, so `T` may be unsized (`str`, `[u8]`).
///
/// Not synchronized. Concurrent `probably_contains` calls are fine; `add`
/// needs exclusive access, which `&mut self` already enforces.
pub struct BloomFilter<T: ?Sized + 'static> {
    bits: BitStore,
    index_fn: Box<dyn IndexFunction<T>>,
    /// `None` when built from an opaque index function
    index_count: Option<usize>,
    metrics: Arc<dyn MetricsRecorder>,
}

impl<T: ?Sized + 'static> BloomFilter<T> {
    /// Create a filter over an arbitrary index function.
    ///
    /// Emitted indexes are reduced modulo the rounded bit count.
    pub fn from_index_function(
        bit_count: usize,
        index_fn: impl IndexFunction<T> + 'static,
    ) -> Result<Self, FilterError> {
        let bits = BitStore::new(bit_count)?;
        debug!(bit_count = bits.len(), "Created Bloom filter from index function");
        Ok(Self::assemble(bits, Box::new(index_fn), None))
    }

    /// Create an extend-and-split filter with explicit parameters.
    ///
    /// `primitives` is walked in order and repeated as needed; a single
    /// primitive is a one-element list.
    pub fn new<E>(
        bit_count: usize,
        indexes_per_item: usize,
        primitives: &[Arc<dyn HashPrimitive>],
        encoder: E,
    ) -> Result<Self, FilterError>
    where
        E: ElementEncoder<T> + 'static,
    {
        let params = Sizing::Explicit {
            bit_count,
            indexes_per_item,
        }
        .plan()?;
        Self::from_parameters(&params, primitives, encoder)
    }

    /// Create an extend-and-split filter sized for a memory budget.
    pub fn with_memory_budget<E>(
        target_bytes: usize,
        expected_items: usize,
        primitives: &[Arc<dyn HashPrimitive>],
        encoder: E,
    ) -> Result<Self, FilterError>
    where
        E: ElementEncoder<T> + 'static,
    {
        let params = Sizing::MemoryBudget {
            target_bytes,
            expected_items,
        }
        .plan()?;
        Self::from_parameters(&params, primitives, encoder)
    }

    /// Create an extend-and-split filter sized for a false positive rate.
    pub fn with_false_positive_rate<E>(
        rate: f64,
        expected_items: usize,
        primitives: &[Arc<dyn HashPrimitive>],
        encoder: E,
    ) -> Result<Self, FilterError>
    where
        E: ElementEncoder<T> + 'static,
    {
        let params = Sizing::FalsePositiveRate {
            rate,
            expected_items,
        }
        .plan()?;
        Self::from_parameters(&params, primitives, encoder)
    }

    /// Create an extend-and-split filter from planned parameters.
    ///
    /// Index width is the bit length of the rounded bit count.
    pub fn from_parameters<E>(
        params: &FilterParameters,
        primitives: &[Arc<dyn HashPrimitive>],
        encoder: E,
    ) -> Result<Self, FilterError>
    where
        E: ElementEncoder<T> + 'static,
    {
        let bit_count = BitStore::rounded_len(params.bit_count)?;
        let index_fn = ExtendAndSplit::new(
            primitives,
            index_width_for(bit_count),
            params.index_count,
            encoder,
        )?;

        let bits = BitStore::new(bit_count)?;
        debug!(
            bit_count,
            index_count = params.index_count,
            index_width = index_fn.index_width(),
            invocations = index_fn.invocations(),
            expected_fpr = ?params.expected_fpr,
            "Created extend-and-split Bloom filter"
        );
        Ok(Self::assemble(
            bits,
            Box::new(index_fn),
            Some(params.index_count),
        ))
    }

    /// Create a generator-strategy filter from planned parameters.
    pub fn from_generator<E>(
        params: &FilterParameters,
        generator: &HashGenerator,
        encoder: E,
    ) -> Result<Self, FilterError>
    where
        E: ElementEncoder<T> + 'static,
    {
        let bit_count = BitStore::rounded_len(params.bit_count)?;
        let index_fn = generator.generate(bit_count, params.index_count, encoder)?;

        let bits = BitStore::new(bit_count)?;
        debug!(
            bit_count,
            index_count = params.index_count,
            index_bits = index_fn.index_bits(),
            hashes_per_query = index_fn.hashes_per_query(),
            primitive = generator.name(),
            expected_fpr = ?params.expected_fpr,
            "Created generator Bloom filter"
        );
        Ok(Self::assemble(
            bits,
            Box::new(index_fn),
            Some(params.index_count),
        ))
    }

    fn assemble(
        bits: BitStore,
        index_fn: Box<dyn IndexFunction<T>>,
        index_count: Option<usize>,
    ) -> Self {
        Self {
            bits,
            index_fn,
            index_count,
            metrics: Arc::new(NoOpMetrics),
        }
    }

    /// Attach a metrics recorder. Creation is recorded on it immediately,
    /// and the previous recorder sees the filter freed.
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics.record_filter_freed(self.bits.len());
        metrics.record_filter_created(self.bits.len(), self.index_count.unwrap_or(0));
        self.metrics = metrics;
        self
    }

    /// Insert an element. Inserting it again changes nothing.
    pub fn add(&mut self, item: &T) {
        let start = Instant::now();
        for index in self.index_fn.indexes(item) {
            self.bits.set_wrapping(index as usize);
        }
        self.metrics.record_insert(start.elapsed());
    }

    /// Test if an element might be in the filter
    ///
    /// Returns:
    /// - `true` if the element might be in the set (could be false positive)
    /// - `false` if the element is definitely NOT in the set (never false negative)
    ///
    /// Stops at the first unset bit.
    pub fn probably_contains(&self, item: &T) -> bool {
        let start = Instant::now();
        let found = self
            .index_fn
            .indexes(item)
            .into_iter()
            .all(|index| self.bits.get_wrapping(index as usize));
        self.metrics.record_lookup(start.elapsed(), found);
        found
    }

    /// Test if an element might be in the filter (constant-time)
    ///
    /// Always reads every derived bit and folds them into a branchless
    /// accumulator, so timing does not reveal which bit was unset.
    /// Use this when the filter answers queries from untrusted parties.
    pub fn contains_constant_time(&self, item: &T) -> bool {
        let start = Instant::now();
        let mut result: u8 = 1;
        for index in self.index_fn.indexes(item) {
            result &= self.bits.get_wrapping(index as usize) as u8;
        }
        let found = result == 1;
        self.metrics.record_lookup(start.elapsed(), found);
        found
    }

    /// Filter size in bits, after rounding to whole bytes.
    pub fn bit_count(&self) -> usize {
        self.bits.len()
    }

    /// Indexes derived per item, when known.
    pub fn index_count(&self) -> Option<usize> {
        self.index_count
    }

    /// Number of bits set in the filter
    pub fn bits_set(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn bit_store(&self) -> &BitStore {
        &self.bits
    }

    pub(crate) fn metrics(&self) -> &dyn MetricsRecorder {
        self.metrics.as_ref()
    }

    /// Expected false positive rate after `items` distinct insertions
    ///
    /// Formula: FPR = (1 - e^(-kn/m))^k
    pub fn estimated_false_positive_rate(&self, items: usize) -> Option<f64> {
        self.index_count
            .map(|k| calculate_fpr(self.bits.len(), items, k))
    }
}

impl<T: ?Sized + 'static> ProbabilisticSet<T> for BloomFilter<T> {
    fn add(&mut self, item: &T) {
        BloomFilter::add(self, item);
    }

    fn probably_contains(&self, item: &T) -> bool {
        BloomFilter::probably_contains(self, item)
    }
}

impl<T: ?Sized + 'static> Drop for BloomFilter<T> {
    fn drop(&mut self) {
        self.metrics.record_filter_freed(self.bits.len());
    }
}

impl<T: ?Sized + 'static> fmt::Debug for BloomFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BloomFilter")
            .field("bit_count", &self.bits.len())
            .field("index_count", &self.index_count)
            .field("bits_set", &self.bits.count_ones())
            .finish_non_exhaustive()
    }
}
