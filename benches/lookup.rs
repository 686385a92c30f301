//! Benchmarks for trie insert and longest-prefix lookup.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use patricia_route::{BitString, PrefixTrie};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Route-table-like prefixes: mostly /16 to /24, a few short ones.
fn generate_prefixes(n: usize, rng: &mut StdRng) -> Vec<(BitString, u32)> {
    (0..n)
        .map(|i| {
            let len = match rng.gen_range(0..10) {
                0 => rng.gen_range(8..16),
                1..=2 => 16,
                3..=8 => 24,
                _ => rng.gen_range(25..=32),
            };
            (BitString::from_u32(rng.gen(), len), i as u32)
        })
        .collect()
}

fn generate_keys(n: usize, rng: &mut StdRng) -> Vec<BitString> {
    (0..n).map(|_| BitString::from_u32(rng.gen(), 32)).collect()
}

/// Linear scan over every prefix, keeping the longest match.
fn linear_lookup<'a>(table: &'a [(BitString, u32)], key: &BitString) -> Option<&'a u32> {
    table
        .iter()
        .filter(|(p, _)| key.starts_with(p))
        .max_by_key(|(p, _)| p.len())
        .map(|(_, v)| v)
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    let mut rng = StdRng::seed_from_u64(42);

    for size in [1_000, 10_000, 100_000] {
        let prefixes = generate_prefixes(size, &mut rng);

        group.bench_with_input(BenchmarkId::new("PrefixTrie", size), &prefixes, |b, prefixes| {
            b.iter(|| {
                let mut trie = PrefixTrie::new();
                for (p, v) in prefixes {
                    let _ = trie.insert(p, *v);
                }
                black_box(trie)
            });
        });
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    let mut rng = StdRng::seed_from_u64(7);
    let keys = generate_keys(1_000, &mut rng);

    for size in [1_000, 10_000, 100_000] {
        let prefixes = generate_prefixes(size, &mut rng);
        let trie: PrefixTrie<u32> = prefixes.iter().cloned().collect();

        group.bench_with_input(BenchmarkId::new("PrefixTrie", size), &keys, |b, keys| {
            b.iter(|| {
                let mut hits = 0u32;
                for key in keys {
                    if trie.longest_match(key).is_some() {
                        hits += 1;
                    }
                }
                black_box(hits)
            });
        });

        if size <= 10_000 {
            group.bench_with_input(BenchmarkId::new("LinearScan", size), &keys, |b, keys| {
                b.iter(|| {
                    let mut hits = 0u32;
                    for key in keys {
                        if linear_lookup(&prefixes, key).is_some() {
                            hits += 1;
                        }
                    }
                    black_box(hits)
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_lookup);
criterion_main!(benches);
