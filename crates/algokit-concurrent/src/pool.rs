use algokit_core::{AlgoError, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;

/// Where a parallel sorter runs its tasks.
#[derive(Debug, Clone, Default)]
pub enum WorkerPool {
    /// rayon's global pool.
    #[default]
    Global,
    /// A pool owned by the sorter (and any clones of it).
    Dedicated(Arc<ThreadPool>),
}

impl WorkerPool {
    pub fn with_threads(num_threads: usize) -> Result<Self> {
        if num_threads == 0 {
            return Err(AlgoError::InvalidConfig(
                "worker pool needs at least one thread".into(),
            ));
        }
        ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("algokit-worker-{}", i))
            .build()
            .map(|pool| Self::Dedicated(Arc::new(pool)))
            .map_err(|e| AlgoError::ThreadPool(e.to_string()))
    }

    pub fn from_threads(num_threads: Option<usize>) -> Result<Self> {
        match num_threads {
            Some(n) => Self::with_threads(n),
            None => Ok(Self::Global),
        }
    }

    /// Run `op` inside the pool; rayon joins and scopes inside `op` use it.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match self {
            Self::Global => op(),
            Self::Dedicated(pool) => pool.install(op),
        }
    }

    pub fn current_num_threads(&self) -> usize {
        match self {
            Self::Global => rayon::current_num_threads(),
            Self::Dedicated(pool) => pool.current_num_threads(),
        }
    }
}
