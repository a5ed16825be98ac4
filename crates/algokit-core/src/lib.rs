//! Shared building blocks for the algokit crates
//!
//! - `config`: layered settings for sorters and tables
//! - `error`: error types shared across crates
//! - `logging`: tracing subscriber bootstrap
//! - `traits`: the `MergeSorter` and `BucketStore` contracts

pub mod config;
pub mod error;
pub mod logging;
pub mod traits;

pub use config::{LoggingConfig, SchedulerKind, Settings, SortConfig, TableConfig};
pub use error::*;
pub use logging::init_tracing;
pub use traits::*;
