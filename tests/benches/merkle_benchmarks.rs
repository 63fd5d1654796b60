//! # Merkle Rebuild Benchmarks
//!
//! | Stage | Operation | Scales with |
//! |-------|-----------|-------------|
//! | mr-01 | Root over N leaves | leaves per bundle |
//! | mr-01 | Decode + hash a tendermint bundle | items per bundle |
//! | mr-04 | Reorder shuffled roots | roots in flight |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;

use mr_01_merkle_tree::{build_root_in_place, bundle_root, decode_bundle};
use mr_04_pipeline::MinQueue;
use shared_types::RuntimeTag;

// ============================================================================
// MR-01: Merkle Tree Builder
// ============================================================================

fn bench_build_root(c: &mut Criterion) {
    let mut group = c.benchmark_group("mr-01-build-root");
    group.measurement_time(Duration::from_secs(5));

    let mut rng = rand::thread_rng();
    for size in [1usize, 100, 1_000, 10_000] {
        let leaves: Vec<[u8; 32]> = (0..size)
            .map(|_| {
                let mut hash = [0u8; 32];
                rng.fill(&mut hash);
                hash
            })
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("leaves", size), &leaves, |b, leaves| {
            b.iter(|| black_box(build_root_in_place(leaves.clone())))
        });
    }

    group.finish();
}

// ============================================================================
// MR-01: Leaf Hash Strategy
// ============================================================================

fn bench_bundle_root(c: &mut Criterion) {
    let mut group = c.benchmark_group("mr-01-bundle-root");

    for items in [10usize, 100, 1_000] {
        let payload = format!(
            "[{}]",
            (0..items)
                .map(|h| format!(
                    r#"{{"key":"{h}","value":{{"block":{{"height":"{h}","txs":["dGVzdA=="]}},"block_results":{{"height":"{h}"}}}}}}"#
                ))
                .collect::<Vec<_>>()
                .join(",")
        );

        group.throughput(Throughput::Bytes(payload.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("tendermint", items),
            payload.as_bytes(),
            |b, payload| {
                b.iter(|| {
                    let items = decode_bundle(payload).unwrap();
                    black_box(bundle_root(&items, RuntimeTag::Tendermint).unwrap())
                })
            },
        );
    }

    group.finish();
}

// ============================================================================
// MR-04: Reordering Writer queue
// ============================================================================

fn bench_reorder(c: &mut Criterion) {
    let mut group = c.benchmark_group("mr-04-reorder");

    for in_flight in [16u64, 256, 4_096] {
        let mut arrivals: Vec<u64> = (0..in_flight).collect();
        arrivals.shuffle(&mut rand::thread_rng());

        group.throughput(Throughput::Elements(in_flight));
        group.bench_with_input(
            BenchmarkId::new("shuffled", in_flight),
            &arrivals,
            |b, arrivals| {
                b.iter(|| {
                    let mut queue = MinQueue::new();
                    let mut next = 0u64;
                    for &ordinal in arrivals {
                        queue.push(ordinal, [0u8; 32]);
                        while queue.peek_key() == Some(&next) {
                            queue.pop();
                            next += 1;
                        }
                    }
                    black_box(next)
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_build_root, bench_bundle_root, bench_reorder);

criterion_main!(benches);
