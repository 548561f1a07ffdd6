// src/pool/completion.rs
//! One-shot result slot shared by a job (writer) and its submitter (reader).
//!
//! The slot is a `OnceCell`: `set` on the worker and `wait` on the submitter
//! form a release/acquire pair, so everything the job wrote before finishing
//! is visible to the thread that observes the result.

use super::error::TaskError;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

type Slot<R> = OnceCell<Result<R, TaskError>>;

/// Creates a connected promise/handle pair.
pub(crate) fn pair<R>() -> (Promise<R>, CompletionHandle<R>) {
    let slot = Arc::new(OnceCell::new());
    (
        Promise {
            slot: Some(Arc::clone(&slot)),
        },
        CompletionHandle { slot },
    )
}

/// Writer side. Fulfilled at most once; dropping it unfulfilled resolves the
/// handle to `TaskError::Abandoned`.
pub(crate) struct Promise<R> {
    slot: Option<Arc<Slot<R>>>,
}

impl<R> Promise<R> {
    pub(crate) fn fulfill(mut self, outcome: Result<R, TaskError>) {
        if let Some(slot) = self.slot.take() {
            // Only this promise writes the slot, and `self` is consumed here.
            let _ = slot.set(outcome);
        }
    }
}

impl<R> Drop for Promise<R> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            let _ = slot.set(Err(TaskError::Abandoned));
        }
    }
}

/// Reader side, returned by [`WorkerPool::submit`](super::WorkerPool::submit).
///
/// Waiting does not consume the handle: every call to [`wait`](Self::wait)
/// returns the same stored outcome, and the job is never re-run.
pub struct CompletionHandle<R> {
    slot: Arc<Slot<R>>,
}

impl<R> CompletionHandle<R> {
    /// Blocks until the job has finished, then returns its value or failure.
    pub fn wait(&self) -> Result<&R, TaskError> {
        self.slot.wait().as_ref().map_err(Clone::clone)
    }

    /// Returns the outcome if the job has already finished.
    pub fn try_get(&self) -> Option<Result<&R, TaskError>> {
        self.slot
            .get()
            .map(|outcome| outcome.as_ref().map_err(Clone::clone))
    }

    pub fn is_finished(&self) -> bool {
        self.slot.get().is_some()
    }
}

impl<R> fmt::Debug for CompletionHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionHandle")
            .field("finished", &self.is_finished())
            .finish()
    }
}
