//! # Generic Bloom Benchmarks
//!
//! | Group | Measures |
//! |-------|----------|
//! | extend-and-split | add / lookup per primitive list |
//! | generator | add / lookup, fixed vs keyed fan-out |
//! | planner | parameter planning |

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use generic_bloom::{
    BloomFilter, CanonicalEncoder, DigestPrimitive, HashCodePrimitive, HashGenerator,
    HashPrimitive, KeyedPrimitive, Murmur3Primitive, Sizing,
};
use rand::Rng;

const ITEMS: usize = 10_000;

fn random_items(count: usize) -> Vec<Vec<u8>> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| (0..32).map(|_| rng.gen()).collect())
        .collect()
}

fn bench_extend_and_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("extend-and-split");
    group.measurement_time(Duration::from_secs(5));

    let items = random_items(ITEMS);
    let lists: [(&str, Vec<Arc<dyn HashPrimitive>>); 3] = [
        ("sha256", vec![Arc::new(DigestPrimitive::sha256())]),
        ("murmur3", vec![Arc::new(Murmur3Primitive::new())]),
        ("hash_code", vec![Arc::new(HashCodePrimitive::new())]),
    ];

    for (name, primitives) in &lists {
        group.throughput(Throughput::Elements(ITEMS as u64));

        group.bench_with_input(BenchmarkId::new("add", name), &items, |b, items| {
            b.iter(|| {
                let mut filter = BloomFilter::<[u8]>::with_false_positive_rate(
                    0.01,
                    ITEMS,
                    primitives,
                    CanonicalEncoder,
                )
                .unwrap();
                for item in items {
                    filter.add(item);
                }
                black_box(filter.bits_set())
            })
        });

        let mut filter =
            BloomFilter::<[u8]>::with_false_positive_rate(0.01, ITEMS, primitives, CanonicalEncoder)
                .unwrap();
        for item in &items {
            filter.add(item);
        }
        group.bench_with_input(BenchmarkId::new("lookup", name), &items, |b, items| {
            b.iter(|| {
                items
                    .iter()
                    .filter(|item| filter.probably_contains(item))
                    .count()
            })
        });
    }

    group.finish();
}

fn bench_generator(c: &mut Criterion) {
    let mut group = c.benchmark_group("generator");
    group.measurement_time(Duration::from_secs(5));

    let items = random_items(ITEMS);
    let generators = [
        ("sha512_fixed", HashGenerator::fixed(DigestPrimitive::sha512())),
        ("hmac_sha256_keyed", HashGenerator::keyed(KeyedPrimitive::hmac_sha256())),
        ("hmac_sha512_keyed", HashGenerator::default()),
    ];

    // Tight rates need more keyed invocations per item
    for rate in [0.01, 1e-9] {
        let params = Sizing::FalsePositiveRate {
            rate,
            expected_items: ITEMS,
        }
        .plan()
        .unwrap();

        for (name, generator) in &generators {
            let Ok(mut filter) =
                BloomFilter::<[u8]>::from_generator(&params, generator, CanonicalEncoder)
            else {
                continue;
            };
            for item in &items {
                filter.add(item);
            }

            group.throughput(Throughput::Elements(ITEMS as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("lookup_{name}"), rate),
                &items,
                |b, items| {
                    b.iter(|| {
                        items
                            .iter()
                            .filter(|item| filter.probably_contains(item))
                            .count()
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_planner(c: &mut Criterion) {
    c.bench_function("planner/false_positive_rate", |b| {
        b.iter(|| {
            Sizing::FalsePositiveRate {
                rate: black_box(0.001),
                expected_items: black_box(1_000_000),
            }
            .plan()
        })
    });
}

criterion_group!(benches, bench_extend_and_split, bench_generator, bench_planner);
criterion_main!(benches);
