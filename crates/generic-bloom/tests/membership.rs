//! End-to-end membership properties over the public API.

use std::collections::HashSet;
use std::sync::Arc;

use generic_bloom::{
    BloomFilter, CanonicalEncoder, DigestPrimitive, ErasedBloomFilter, FilterError,
    FilterParameters, HashAlgorithm, HashCodePrimitive, HashGenerator, HashPrimitive,
    KeyedPrimitive, Murmur3Primitive, Sizing,
};
use proptest::prelude::*;
use rand::Rng;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn primitive_sets() -> Vec<Vec<Arc<dyn HashPrimitive>>> {
    vec![
        vec![Arc::new(DigestPrimitive::sha256())],
        vec![Arc::new(DigestPrimitive::sha512())],
        vec![Arc::new(HashCodePrimitive::new())],
        vec![
            Arc::new(Murmur3Primitive::new()),
            Arc::new(DigestPrimitive::keccak256()),
        ],
    ]
}

fn planned(rate: f64, expected_items: usize) -> FilterParameters {
    Sizing::FalsePositiveRate {
        rate,
        expected_items,
    }
    .plan()
    .unwrap()
}

fn random_items(rng: &mut impl Rng, count: usize, exclude: &HashSet<Vec<u8>>) -> Vec<Vec<u8>> {
    let mut items = HashSet::with_capacity(count);
    while items.len() < count {
        let len = rng.gen_range(1..48);
        let item: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        if !exclude.contains(&item) {
            items.insert(item);
        }
    }
    items.into_iter().collect()
}

/// Observed false positive rate of a freshly built filter holding `n`
/// random items, queried with `n` disjoint random items.
fn observed_rate(
    mut build: impl FnMut() -> BloomFilter<Vec<u8>>,
    n: usize,
    rng: &mut impl Rng,
) -> f64 {
    let mut filter = build();
    let inserted = random_items(rng, n, &HashSet::new());
    for item in &inserted {
        filter.add(item);
    }

    let inserted: HashSet<Vec<u8>> = inserted.into_iter().collect();
    let probes = random_items(rng, n, &inserted);
    let hits = probes
        .iter()
        .filter(|item| filter.probably_contains(item))
        .count();
    hits as f64 / n as f64
}

/// Passes if any of `attempts` trials stays within `rate + rate * (1 - rate)`.
fn assert_rate_bounded(
    label: &str,
    rate: f64,
    n: usize,
    mut build: impl FnMut() -> BloomFilter<Vec<u8>>,
) {
    const ATTEMPTS: usize = 3;
    let bound = rate + rate * (1.0 - rate);
    let mut rng = rand::thread_rng();

    let mut observed = Vec::with_capacity(ATTEMPTS);
    for _ in 0..ATTEMPTS {
        let fpr = observed_rate(&mut build, n, &mut rng);
        if fpr <= bound {
            return;
        }
        observed.push(fpr);
    }
    panic!("{label}: observed rates {observed:?} all exceed bound {bound} for target {rate}");
}

#[test]
fn test_extend_and_split_false_positive_rate_bounded() {
    init_tracing();

    for rate in [0.1, 0.01] {
        for primitives in primitive_sets() {
            let label = format!("{primitives:?}");
            assert_rate_bounded(&label, rate, 2000, || {
                BloomFilter::with_false_positive_rate(rate, 2000, &primitives, CanonicalEncoder)
                    .unwrap()
            });
        }
    }
}

#[test]
fn test_generator_false_positive_rate_bounded() {
    init_tracing();

    let generators = [
        HashGenerator::default(),
        HashGenerator::keyed(KeyedPrimitive::hmac_sha256()),
        HashGenerator::keyed(Murmur3Primitive::new()),
        HashGenerator::fixed(DigestPrimitive::sha512()),
    ];

    for rate in [0.1, 0.01] {
        let params = planned(rate, 2000);
        for generator in &generators {
            assert_rate_bounded(generator.name(), rate, 2000, || {
                BloomFilter::from_generator(&params, generator, CanonicalEncoder).unwrap()
            });
        }
    }
}

#[test]
fn test_memory_budget_filters_hold_many_items() {
    init_tracing();

    let mut filter = BloomFilter::<u64>::with_memory_budget(
        64 * 1024,
        50_000,
        &[HashAlgorithm::Sha256.primitive()],
        CanonicalEncoder,
    )
    .unwrap();

    for i in 0..50_000u64 {
        filter.add(&i);
    }
    let missing = (0..50_000u64).filter(|i| !filter.probably_contains(i)).count();

    assert_eq!(missing, 0, "No false negatives at capacity");
}

#[test]
fn test_type_erased_filter_rejects_foreign_values() {
    init_tracing();

    let mut filter = ErasedBloomFilter::new(
        BloomFilter::<i32>::with_false_positive_rate(
            0.01,
            100,
            &[HashAlgorithm::Sha256.primitive()],
            CanonicalEncoder,
        )
        .unwrap(),
    );

    #[derive(Debug)]
    struct Unrelated;

    let expected = FilterError::InvalidElementType { expected: "i32" };
    assert_eq!(filter.add(&"0"), Err(expected.clone()));
    assert_eq!(filter.add(&0i64), Err(expected.clone()));
    assert_eq!(filter.add(&0.0f64), Err(expected.clone()));
    assert_eq!(filter.add(&None::<i32>), Err(expected.clone()));
    assert_eq!(filter.add(&Unrelated), Err(expected.clone()));
    assert_eq!(filter.bits_set(), 0);

    assert_eq!(filter.probably_contains(&"0"), Err(expected.clone()));
    assert_eq!(filter.probably_contains(&0i64), Err(expected.clone()));
    assert_eq!(filter.probably_contains(&0.0f64), Err(expected.clone()));
    assert_eq!(filter.probably_contains(&None::<i32>), Err(expected.clone()));
    assert_eq!(filter.probably_contains(&Unrelated), Err(expected));

    filter.add(&0i32).unwrap();
    assert_eq!(filter.probably_contains(&0i32), Ok(true));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_extend_and_split_has_no_false_negatives(
        items in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 1..400),
        rate in 0.001f64..0.5,
        set in 0usize..4,
    ) {
        let sets = primitive_sets();
        let primitives = &sets[set];
        let mut filter =
            BloomFilter::<Vec<u8>>::with_false_positive_rate(rate, items.len(), primitives, CanonicalEncoder)
                .unwrap();

        for item in &items {
            filter.add(item);
        }
        for item in &items {
            prop_assert!(filter.probably_contains(item), "lost {:?}", item);
        }
    }

    #[test]
    fn prop_generator_has_no_false_negatives(
        items in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 1..400),
        target_bytes in 1usize..4096,
    ) {
        let params = Sizing::MemoryBudget {
            target_bytes,
            expected_items: items.len(),
        }
        .plan()
        .unwrap();
        let mut filter =
            BloomFilter::<[u8]>::from_generator(&params, &HashGenerator::default(), CanonicalEncoder)
                .unwrap();

        for item in &items {
            filter.add(item);
        }
        for item in &items {
            prop_assert!(filter.probably_contains(item), "lost {:?}", item);
        }
    }

    #[test]
    fn prop_strings_have_no_false_negatives(items in prop::collection::vec(".*", 1..200)) {
        let mut filter =
            BloomFilter::<str>::with_memory_budget(512, items.len(), &primitive_sets()[0], CanonicalEncoder)
                .unwrap();

        for item in &items {
            filter.add(item);
        }
        for item in &items {
            prop_assert!(filter.probably_contains(item));
        }
    }

    #[test]
    fn prop_add_is_idempotent(item in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut filter =
            BloomFilter::<[u8]>::new(1024, 5, &primitive_sets()[0], CanonicalEncoder).unwrap();

        filter.add(&item);
        let once = filter.bit_store().clone();
        filter.add(&item);

        prop_assert_eq!(filter.bit_store(), &once);
    }
}
