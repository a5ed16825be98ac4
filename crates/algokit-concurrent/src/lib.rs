//! Concurrent sorting and hashing for algokit
//!
//! - `merge_sort`: sequential merge sort kernel and merge step
//! - `fork_join`: fork the left half, sort the right inline, join
//! - `scope` / `structured`: cancelling task scopes and the merge sort built on them
//! - `hash_table`: per-bucket reader/writer locked hash table
//! - `coarse`: single-mutex baseline table

pub mod coarse;
pub mod fork_join;
pub mod hash_table;
pub mod merge_sort;
pub mod metrics;
pub mod pool;
pub mod scope;
pub mod structured;

pub use coarse::GlobalLockHashTable;
pub use fork_join::ForkJoinMergeSort;
pub use hash_table::{ConcurrentSet, FineGrainedHashTable, TableStats, TableStatsSnapshot};
pub use merge_sort::{merge, merge_sort, merge_sort_by, try_merge_sort_by, SequentialMergeSort};
pub use metrics::{SortMetrics, SortMetricsSnapshot};
pub use pool::WorkerPool;
pub use scope::{Spawner, StructuredScope, TaskFailure};
pub use structured::StructuredMergeSort;

pub use algokit_core::{MergeSorter, SortError};
