//! Sequential collections for algokit
//!
//! - `list`: ordered sequence, the bucket container of the hash tables
//! - `queue`: FIFO queue on top of `List`
//! - `binary_tree`: arena-backed binary tree with the four classic traversals
//! - `hashing`: value to bucket mapping
//! - `chained_hash_table` / `chained_hash_map`: separate-chaining tables

pub mod binary_tree;
pub mod chained_hash_map;
pub mod chained_hash_table;
pub mod hashing;
pub mod list;
pub mod queue;

pub use binary_tree::{BinaryTree, NodeId};
pub use chained_hash_map::{ChainedHashMap, Entry};
pub use chained_hash_table::ChainedHashTable;
pub use hashing::{BucketIndexer, IdentityBuildHasher, IdentityHasher};
pub use list::List;
pub use queue::{Queue, QueueError};
