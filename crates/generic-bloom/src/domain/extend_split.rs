//! Extend-and-split index derivation
//!
//! A short list of fixed-width primitives is repeated until its combined
//! output covers `index_width * index_count` bits. Every invocation hashes
//! the encoded element behind a little-endian seed that counts invocations,
//! so repeated primitives still produce distinct output. The outputs are
//! concatenated and sliced LSB-first.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use bitvec::prelude::*;
use tracing::debug;

use super::bit_split::{pack_lsb_first, MAX_INDEX_BITS};
use super::index::IndexFunction;
use crate::error::FilterError;
use crate::ports::{ElementEncoder, HashPrimitive};

/// Repeat `primitives` in order until their widths add up to `bits_needed`.
///
/// Zero-width primitives are kept in the list but contribute nothing; the
/// list must hold at least one primitive with a positive width.
pub fn extend_list(
    primitives: &[Arc<dyn HashPrimitive>],
    bits_needed: usize,
) -> Result<Vec<Arc<dyn HashPrimitive>>, FilterError> {
    if bits_needed == 0 {
        return Err(FilterError::invalid_argument(
            "bits_needed",
            "must be at least 1",
        ));
    }
    if primitives.is_empty() {
        return Err(FilterError::InvalidPrimitiveList(
            "at least one primitive is required".into(),
        ));
    }
    if primitives.iter().all(|p| p.output_bits() == 0) {
        return Err(FilterError::InvalidPrimitiveList(
            "no primitive produces any output bits".into(),
        ));
    }

    let mut extended = Vec::new();
    let mut accumulated = 0usize;
    for primitive in primitives.iter().cycle() {
        extended.push(Arc::clone(primitive));
        accumulated = accumulated.saturating_add(primitive.output_bits());
        if accumulated >= bits_needed {
            break;
        }
    }

    Ok(extended)
}

/// Bytes of seed prefixed to the element for an extended list of `len` entries.
pub fn seed_width(len: usize) -> usize {
    if len < 0xff {
        1
    } else if len <= 0xffff {
        2
    } else {
        4
    }
}

/// Index function built by the extend-and-split strategy.
pub struct ExtendAndSplit<T: ?Sized, E> {
    extended: Vec<Arc<dyn HashPrimitive>>,
    seed_width: usize,
    index_width: usize,
    index_count: usize,
    encoder: E,
    _element: PhantomData<fn(&T)>,
}

impl<T: ?Sized, E: ElementEncoder<T>> ExtendAndSplit<T, E> {
    /// Validate the request and build the extended primitive list.
    pub fn new(
        primitives: &[Arc<dyn HashPrimitive>],
        index_width: usize,
        index_count: usize,
        encoder: E,
    ) -> Result<Self, FilterError> {
        if index_width == 0 {
            return Err(FilterError::invalid_argument(
                "index_width",
                "must be at least 1",
            ));
        }
        if index_width > MAX_INDEX_BITS {
            return Err(FilterError::ItemTooLarge(format!(
                "index width {index_width} exceeds {MAX_INDEX_BITS} bits"
            )));
        }
        if index_count == 0 {
            return Err(FilterError::invalid_argument(
                "index_count",
                "must be at least 1",
            ));
        }

        let bits_needed = index_width.checked_mul(index_count).ok_or_else(|| {
            FilterError::ItemTooLarge(format!(
                "{index_count} indexes of {index_width} bits overflow"
            ))
        })?;
        let extended = extend_list(primitives, bits_needed)?;
        let seed_width = seed_width(extended.len());

        debug!(
            index_width,
            index_count,
            bits_needed,
            extended_len = extended.len(),
            seed_width,
            "Built extend-and-split index function"
        );

        Ok(Self {
            extended,
            seed_width,
            index_width,
            index_count,
            encoder,
            _element: PhantomData,
        })
    }

    /// Number of primitive invocations per element.
    pub fn invocations(&self) -> usize {
        self.extended.len()
    }

    pub fn index_width(&self) -> usize {
        self.index_width
    }

    pub fn index_count(&self) -> usize {
        self.index_count
    }

    fn bit_stream(&self, encoded: &[u8]) -> BitVec<u8, Lsb0> {
        let bits_needed = self.index_width * self.index_count;
        let mut stream = BitVec::<u8, Lsb0>::with_capacity(bits_needed);
        let mut input = Vec::with_capacity(self.seed_width + encoded.len());

        for (seed, primitive) in self.extended.iter().enumerate() {
            input.clear();
            input.extend_from_slice(&(seed as u32).to_le_bytes()[..self.seed_width]);
            input.extend_from_slice(encoded);

            let output = primitive.compute(&input);
            let bits = output.view_bits::<Lsb0>();
            let width = primitive.output_bits().min(bits.len());
            stream.extend_from_bitslice(&bits[..width]);
        }

        // Only a primitive returning less than it declares leaves a gap
        if stream.len() < bits_needed {
            stream.resize(bits_needed, false);
        }
        stream
    }
}

impl<T: ?Sized, E: ElementEncoder<T>> IndexFunction<T> for ExtendAndSplit<T, E> {
    fn indexes(&self, item: &T) -> Vec<u32> {
        let encoded = self.encoder.encode(item);
        let stream = self.bit_stream(&encoded);
        pack_lsb_first(stream.as_raw_slice(), self.index_width, self.index_count)
    }
}

impl<T: ?Sized, E> fmt::Debug for ExtendAndSplit<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendAndSplit")
            .field("extended", &self.extended)
            .field("seed_width", &self.seed_width)
            .field("index_width", &self.index_width)
            .field("index_count", &self.index_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{CanonicalEncoder, DigestPrimitive};

    /// Declares `bits` of output and returns `bits / 8` copies of `fill`.
    #[derive(Debug)]
    struct FixedWidth {
        bits: usize,
        fill: u8,
    }

    impl HashPrimitive for FixedWidth {
        fn name(&self) -> &'static str {
            "fixed-width"
        }

        fn output_bits(&self) -> usize {
            self.bits
        }

        fn compute(&self, _data: &[u8]) -> Vec<u8> {
            vec![self.fill; self.bits.div_ceil(8)]
        }
    }

    fn fixed(bits: usize) -> Arc<dyn HashPrimitive> {
        Arc::new(FixedWidth { bits, fill: 0xff })
    }

    fn sha256() -> Arc<dyn HashPrimitive> {
        Arc::new(DigestPrimitive::sha256())
    }

    #[test]
    fn test_extend_list_is_minimal() {
        let p = fixed(32);
        let list = [Arc::clone(&p)];

        for needed in 1..=32 {
            let extended = extend_list(&list, needed).unwrap();
            assert_eq!(extended.len(), 1, "{needed} bits need a single pass");
            assert!(Arc::ptr_eq(&extended[0], &p));
        }
        for needed in 33..=64 {
            let extended = extend_list(&list, needed).unwrap();
            assert_eq!(extended.len(), 2, "{needed} bits need two passes");
            assert!(extended.iter().all(|e| Arc::ptr_eq(e, &p)));
        }
    }

    #[test]
    fn test_extend_list_wraps_in_order() {
        let a = fixed(8);
        let b = fixed(16);
        let extended = extend_list(&[Arc::clone(&a), Arc::clone(&b)], 40).unwrap();

        // 8 + 16 + 8 + 16 = 48 >= 40
        assert_eq!(extended.len(), 4);
        assert!(Arc::ptr_eq(&extended[0], &a));
        assert!(Arc::ptr_eq(&extended[1], &b));
        assert!(Arc::ptr_eq(&extended[2], &a));
        assert!(Arc::ptr_eq(&extended[3], &b));
    }

    #[test]
    fn test_extend_list_tolerates_zero_width_entries() {
        let extended = extend_list(&[fixed(0), fixed(32), fixed(0)], 64).unwrap();

        let total: usize = extended.iter().map(|p| p.output_bits()).sum();
        assert!(total >= 64);
        assert_eq!(extended.len(), 5);
    }

    #[test]
    fn test_extend_list_rejects_empty_and_zero_width_lists() {
        assert!(matches!(
            extend_list(&[], 8),
            Err(FilterError::InvalidPrimitiveList(_))
        ));
        assert!(matches!(
            extend_list(&[fixed(0)], 8),
            Err(FilterError::InvalidPrimitiveList(_))
        ));
        assert!(matches!(
            extend_list(&[fixed(0), fixed(0)], 8),
            Err(FilterError::InvalidPrimitiveList(_))
        ));
    }

    #[test]
    fn test_extend_list_rejects_zero_bits_needed() {
        let err = extend_list(&[sha256()], 0).unwrap_err();

        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_extend_list_saturates_huge_widths() {
        let extended = extend_list(&[fixed(usize::MAX), fixed(8)], usize::MAX).unwrap();

        assert_eq!(extended.len(), 1);
    }

    #[test]
    fn test_seed_width_grows_with_list() {
        assert_eq!(seed_width(1), 1);
        assert_eq!(seed_width(254), 1);
        assert_eq!(seed_width(255), 2);
        assert_eq!(seed_width(65_535), 2);
        assert_eq!(seed_width(65_536), 4);
    }

    #[test]
    fn test_indexes_match_recorded_sha256_values() {
        let f = ExtendAndSplit::<[u8], _>::new(&[sha256()], 11, 3, CanonicalEncoder).unwrap();

        assert_eq!(f.invocations(), 1);
        assert_eq!(f.indexes(&b"bloom"[..]), vec![230, 915, 812]);
    }

    #[test]
    fn test_repeated_primitive_is_reseeded() {
        // 30 * 11 = 330 bits: two SHA-256 invocations with seeds 0 and 1
        let f = ExtendAndSplit::<[u8], _>::new(&[sha256()], 11, 30, CanonicalEncoder).unwrap();
        let indexes = f.indexes(&b"bloom"[..]);

        assert_eq!(f.invocations(), 2);
        assert_eq!(indexes.len(), 30);
        assert_eq!(&indexes[..3], &[230, 915, 812]);
        assert_eq!(&indexes[22..24], &[303, 33]);
        assert_eq!(indexes[29], 1576);
    }

    #[test]
    fn test_indexes_fit_requested_width() {
        let f = ExtendAndSplit::<u64, _>::new(&[sha256()], 7, 20, CanonicalEncoder).unwrap();

        for item in 0..100u64 {
            let indexes = f.indexes(&item);
            assert_eq!(indexes.len(), 20);
            assert!(indexes.iter().all(|i| *i < 128), "item {item}: {indexes:?}");
        }
    }

    #[test]
    fn test_short_primitive_output_is_padded() {
        #[derive(Debug)]
        struct Liar;

        impl HashPrimitive for Liar {
            fn name(&self) -> &'static str {
                "liar"
            }

            fn output_bits(&self) -> usize {
                64
            }

            fn compute(&self, _data: &[u8]) -> Vec<u8> {
                vec![0xff]
            }
        }

        let liar: Arc<dyn HashPrimitive> = Arc::new(Liar);
        let f = ExtendAndSplit::<u8, _>::new(&[liar], 8, 8, CanonicalEncoder).unwrap();

        assert_eq!(f.indexes(&1), vec![0xff, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_new_rejects_bad_requests() {
        assert!(matches!(
            ExtendAndSplit::<u8, _>::new(&[sha256()], 32, 1, CanonicalEncoder),
            Err(FilterError::ItemTooLarge(_))
        ));
        assert!(ExtendAndSplit::<u8, _>::new(&[sha256()], 0, 1, CanonicalEncoder)
            .unwrap_err()
            .is_invalid_argument());
        assert!(ExtendAndSplit::<u8, _>::new(&[sha256()], 8, 0, CanonicalEncoder)
            .unwrap_err()
            .is_invalid_argument());
        assert!(matches!(
            ExtendAndSplit::<u8, _>::new(&[], 8, 1, CanonicalEncoder),
            Err(FilterError::InvalidPrimitiveList(_))
        ));
    }
}
