use algokit_collections::IdentityBuildHasher;
use algokit_concurrent::{ConcurrentSet, FineGrainedHashTable, GlobalLockHashTable};
use std::sync::Barrier;
use std::thread;

fn insert_disjoint<S: ConcurrentSet<u64>>(table: &S, threads: u64, per_thread: u64) {
    let barrier = Barrier::new(threads as usize);
    thread::scope(|s| {
        for t in 0..threads {
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                for i in 0..per_thread {
                    table.insert(t * per_thread + i);
                }
            });
        }
    });
}

#[test]
fn size_is_exact_after_parallel_inserts() {
    let fine = FineGrainedHashTable::<u64>::new(64);
    insert_disjoint(&fine, 8, 5_000);
    assert_eq!(fine.size(), 40_000);

    let coarse = GlobalLockHashTable::<u64>::new(64);
    insert_disjoint(&coarse, 8, 5_000);
    assert_eq!(coarse.size(), 40_000);
}

#[test]
fn single_bucket_contention_keeps_the_chain_intact() {
    // every key lands in the same bucket
    let table = FineGrainedHashTable::<u64, _>::with_hasher(1, IdentityBuildHasher::default());
    insert_disjoint(&table, 6, 1_000);
    assert_eq!(table.bucket_len(0), Some(6_000));

    let mut all = table.snapshot();
    all.sort_unstable();
    assert_eq!(all, (0..6_000).collect::<Vec<u64>>());
}

#[test]
fn mixed_insert_and_remove_settles_to_the_right_size() {
    let table = FineGrainedHashTable::<u64>::new(16);
    for k in 0..10_000 {
        table.insert(k);
    }

    thread::scope(|s| {
        // removers take the even keys, inserters add a fresh range
        for part in 0..4u64 {
            let table = &table;
            s.spawn(move || {
                for k in (part * 2_500..(part + 1) * 2_500).filter(|k| k % 2 == 0) {
                    assert!(table.remove(&k));
                }
            });
            s.spawn(move || {
                for k in 0..1_000 {
                    table.insert(100_000 + part * 1_000 + k);
                }
            });
        }
    });

    assert_eq!(table.size(), 5_000 + 4_000);
    assert!(!table.contains(&0));
    assert!(table.contains(&1));
    assert!(table.contains(&103_999));
    let total: usize = (0..table.bucket_count())
        .filter_map(|i| table.bucket_len(i))
        .sum();
    assert_eq!(total, table.size());
}

#[test]
fn remove_only_touches_one_duplicate() {
    let table = FineGrainedHashTable::with_hasher(3, IdentityBuildHasher::default());
    for v in [0i64, 3, 6, 1, 4, 3] {
        table.insert(v);
    }
    assert_eq!(table.size(), 6);
    assert!(table.remove(&3));
    assert!(table.contains(&3));
    assert!(table.remove(&3));
    assert!(!table.contains(&3));
    assert!(table.contains(&0) && table.contains(&6));
    assert_eq!(table.bucket_len(0), Some(2));
}
