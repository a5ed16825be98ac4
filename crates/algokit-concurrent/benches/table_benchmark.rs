use algokit_concurrent::{ConcurrentSet, FineGrainedHashTable, GlobalLockHashTable};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::thread;

const BUCKETS: usize = 256;
const OPS_PER_THREAD: u64 = 5_000;

/// Each thread inserts its own key range, then looks it up again.
fn hammer<S: ConcurrentSet<u64>>(table: &S, threads: u64) {
    thread::scope(|s| {
        for t in 0..threads {
            s.spawn(move || {
                let base = t * OPS_PER_THREAD;
                for k in base..base + OPS_PER_THREAD {
                    table.insert(k);
                }
                for k in base..base + OPS_PER_THREAD {
                    black_box(table.contains(&k));
                }
            });
        }
    });
}

fn bench_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_table");
    group.sample_size(20);

    for threads in [1u64, 2, 4, 8] {
        group.throughput(Throughput::Elements(threads * OPS_PER_THREAD * 2));
        group.bench_with_input(BenchmarkId::new("fine_grained", threads), &threads, |b, &n| {
            b.iter(|| {
                let table = FineGrainedHashTable::<u64>::new(BUCKETS);
                hammer(&table, n);
                black_box(table.size())
            })
        });
        group.bench_with_input(BenchmarkId::new("global_lock", threads), &threads, |b, &n| {
            b.iter(|| {
                let table = GlobalLockHashTable::<u64>::new(BUCKETS);
                hammer(&table, n);
                black_box(table.size())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tables);
criterion_main!(benches);
