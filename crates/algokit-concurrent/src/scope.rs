//! A cancelling task scope on top of `rayon::scope`.
//!
//! Every task spawned through a [`StructuredScope`] has finished by the time
//! [`StructuredScope::run`] returns. The first task to fail cancels the scope's
//! token, tasks that have not started yet are skipped, and running tasks are
//! expected to poll the token they are handed. Nested scopes hang off the
//! parent's token, so cancelling a scope cancels everything below it.

use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Why a scoped task did not complete.
pub enum TaskFailure<E> {
    Failed(E),
    /// Skipped or interrupted after the scope was cancelled.
    Cancelled,
    Panicked(Box<dyn Any + Send + 'static>),
}

impl<E> TaskFailure<E> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl<E: fmt::Debug> fmt::Debug for TaskFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
            Self::Cancelled => f.write_str("Cancelled"),
            Self::Panicked(_) => f.write_str("Panicked(..)"),
        }
    }
}

pub struct StructuredScope<E> {
    token: CancellationToken,
    first_failure: Mutex<Option<TaskFailure<E>>>,
    launched: AtomicUsize,
}

impl<E: Send> StructuredScope<E> {
    pub fn new() -> Self {
        Self::with_token(CancellationToken::new())
    }

    /// A scope that is cancelled whenever `parent` is.
    pub fn nested(parent: &CancellationToken) -> Self {
        Self::with_token(parent.child_token())
    }

    fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            first_failure: Mutex::new(None),
            launched: AtomicUsize::new(0),
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Tasks spawned so far, including ones skipped after cancellation.
    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::Relaxed)
    }

    /// Run `body`, wait for everything it spawned, and report the first failure.
    ///
    /// A real failure is preferred over `Cancelled` when both were recorded.
    pub fn run<'scope, OP>(&'scope self, body: OP) -> Result<(), TaskFailure<E>>
    where
        OP: FnOnce(&Spawner<'_, 'scope, E>) + Send,
    {
        rayon::scope(|inner| {
            let spawner = Spawner { inner, owner: self };
            body(&spawner);
        });
        match self.first_failure.lock().take() {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    fn execute<T>(&self, task: T)
    where
        T: FnOnce(&CancellationToken) -> Result<(), TaskFailure<E>>,
    {
        if self.token.is_cancelled() {
            self.record(TaskFailure::Cancelled);
            return;
        }
        match panic::catch_unwind(AssertUnwindSafe(|| task(&self.token))) {
            Ok(Ok(())) => {}
            Ok(Err(failure)) => self.record(failure),
            Err(payload) => self.record(TaskFailure::Panicked(payload)),
        }
    }

    fn record(&self, failure: TaskFailure<E>) {
        {
            let mut slot = self.first_failure.lock();
            let keep_new = match slot.as_ref() {
                None => true,
                Some(existing) => existing.is_cancelled() && !failure.is_cancelled(),
            };
            if keep_new {
                if !failure.is_cancelled() {
                    warn!(
                        panicked = matches!(failure, TaskFailure::Panicked(_)),
                        "scoped task failed, cancelling siblings"
                    );
                }
                *slot = Some(failure);
            }
        }
        self.token.cancel();
    }
}

impl<E: Send> Default for StructuredScope<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle passed to the body of [`StructuredScope::run`].
pub struct Spawner<'a, 'scope, E> {
    inner: &'a rayon::Scope<'scope>,
    owner: &'scope StructuredScope<E>,
}

impl<'a, 'scope, E: Send> Spawner<'a, 'scope, E> {
    /// Queue `task` on the pool. It receives the scope's token and is skipped
    /// entirely if the scope is already cancelled when it starts.
    pub fn spawn<T>(&self, task: T)
    where
        T: FnOnce(&CancellationToken) -> Result<(), TaskFailure<E>> + Send + 'scope,
    {
        let owner = self.owner;
        owner.launched.fetch_add(1, Ordering::Relaxed);
        self.inner.spawn(move |_| owner.execute(task));
    }

    pub fn token(&self) -> &CancellationToken {
        &self.owner.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    fn pool() -> rayon::ThreadPool {
        rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap()
    }

    #[test]
    fn all_tasks_finish_before_run_returns() {
        let done = AtomicUsize::new(0);
        let scope: StructuredScope<()> = StructuredScope::new();
        let outcome = pool().install(|| {
            scope.run(|s| {
                for _ in 0..16 {
                    s.spawn(|_| {
                        done.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    });
                }
            })
        });
        assert!(outcome.is_ok());
        assert_eq!(done.load(Ordering::SeqCst), 16);
        assert_eq!(scope.launched(), 16);
        assert!(!scope.is_cancelled());
    }

    #[test]
    fn failure_cancels_running_sibling() {
        let sibling_started = AtomicBool::new(false);
        let sibling_saw_cancel = AtomicBool::new(false);
        let scope: StructuredScope<&str> = StructuredScope::new();
        let outcome = pool().install(|| {
            scope.run(|s| {
                s.spawn(|token| {
                    sibling_started.store(true, Ordering::SeqCst);
                    while !token.is_cancelled() {
                        std::thread::yield_now();
                    }
                    sibling_saw_cancel.store(true, Ordering::SeqCst);
                    Err(TaskFailure::Cancelled)
                });
                s.spawn(|_| {
                    // fail only once the sibling is known to be running
                    while !sibling_started.load(Ordering::SeqCst) {
                        std::thread::yield_now();
                    }
                    Err(TaskFailure::Failed("boom"))
                });
            })
        });
        assert!(matches!(outcome, Err(TaskFailure::Failed("boom"))));
        assert!(sibling_saw_cancel.load(Ordering::SeqCst));
    }

    #[test]
    fn cancelled_scope_skips_new_tasks() {
        let ran = AtomicBool::new(false);
        let scope: StructuredScope<()> = StructuredScope::new();
        scope.token().cancel();
        let outcome = scope.run(|s| {
            s.spawn(|_| {
                ran.store(true, Ordering::SeqCst);
                Ok(())
            })
        });
        assert!(matches!(outcome, Err(TaskFailure::Cancelled)));
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[test]
    fn parent_cancellation_reaches_nested_scope() {
        let parent: StructuredScope<()> = StructuredScope::new();
        let child: StructuredScope<()> = StructuredScope::nested(parent.token());
        assert!(!child.is_cancelled());
        parent.token().cancel();
        assert!(child.is_cancelled());

        // and not the other way round
        let parent: StructuredScope<()> = StructuredScope::new();
        let child: StructuredScope<()> = StructuredScope::nested(parent.token());
        child.token().cancel();
        assert!(!parent.is_cancelled());
    }

    #[test]
    fn panic_is_captured_as_failure() {
        let scope: StructuredScope<()> = StructuredScope::new();
        let outcome = scope.run(|s| s.spawn(|_| panic!("comparator exploded")));
        match outcome {
            Err(TaskFailure::Panicked(payload)) => {
                assert_eq!(payload.downcast_ref::<&str>(), Some(&"comparator exploded"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
