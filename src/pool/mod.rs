// src/pool/mod.rs
//! Fixed-size worker pool with a shared FIFO queue.
//!
//! - Jobs are boxed closures queued under a `Mutex` and handed to workers
//!   through a `Condvar`; workers park while the queue is empty.
//! - Each submission returns a [`CompletionHandle`] the submitter can block on.
//! - A panicking job is caught and reported through its handle; the worker
//!   that ran it keeps serving the queue.
//! - Shutdown drains the queue before joining, so no submitted job is lost.
//!   Dropping the pool shuts it down.

mod completion;
mod error;


pub use completion::CompletionHandle;
pub use error::{PoolError, TaskError};

use log::{debug, info, trace, warn};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

struct QueueState {
    jobs: VecDeque<Job>,
    shutting_down: bool,
}

/// State shared between the pool handle and its workers.
struct Shared {
    queue: Mutex<QueueState>,
    job_available: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // Jobs never run under this lock, so poisoning means the pool itself is broken.
        self.queue.lock().expect("worker pool queue lock poisoned")
    }
}

/// A fixed set of worker threads executing submitted jobs.
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
}

impl WorkerPool {
    /// Starts `size` worker threads.
    pub fn new(size: usize) -> Result<Self, PoolError> {
        if size == 0 {
            return Err(PoolError::InvalidWorkerCount);
        }

        let shared = Arc::new(Shared {
            queue: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                shutting_down: false,
            }),
            job_available: Condvar::new(),
        });

        let pool = WorkerPool {
            shared,
            workers: Mutex::new(Vec::with_capacity(size)),
            size,
        };

        for worker_id in 0..size {
            let shared = Arc::clone(&pool.shared);
            let spawned = thread::Builder::new()
                .name(format!("pool-worker-{}", worker_id))
                .spawn(move || worker_loop(worker_id, shared));

            match spawned {
                Ok(handle) => pool.join_handles().push(handle),
                Err(source) => {
                    // `pool` drops here and joins whatever already started.
                    return Err(PoolError::Spawn {
                        worker: worker_id,
                        source,
                    });
                }
            }
        }

        info!("WorkerPool: started {} workers", size);
        Ok(pool)
    }

    /// Number of worker threads. Fixed for the lifetime of the pool.
    pub fn worker_count(&self) -> usize {
        self.size
    }

    /// Jobs waiting in the queue (not counting ones currently running).
    pub fn queued(&self) -> usize {
        self.shared.lock().jobs.len()
    }

    /// Queues `task` and returns a handle to its eventual result.
    ///
    /// Arguments are bound by capturing them in the closure. Fails with
    /// [`PoolError::ShutDown`] once [`shutdown`](Self::shutdown) has begun;
    /// the rejected task is dropped without running.
    pub fn submit<F, R>(&self, task: F) -> Result<CompletionHandle<R>, PoolError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + Sync + 'static,
    {
        let (promise, handle) = completion::pair();
        let job: Job = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(task)).map_err(TaskError::from_panic);
            if let Err(e) = &outcome {
                warn!(
                    "{}: {}",
                    thread::current().name().unwrap_or("pool-worker"),
                    e
                );
            }
            promise.fulfill(outcome);
        });

        {
            let mut state = self.shared.lock();
            if state.shutting_down {
                return Err(PoolError::ShutDown);
            }
            state.jobs.push_back(job);
        }
        self.shared.job_available.notify_one();
        Ok(handle)
    }

    /// Stops accepting jobs, lets workers drain the queue, and joins them.
    ///
    /// Jobs already running finish normally. Later calls are no-ops: a call
    /// racing the first one may return before the workers are joined, so only
    /// the first caller can treat the return as a join point.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.lock();
            if state.shutting_down {
                return;
            }
            state.shutting_down = true;
            debug!(
                "WorkerPool: shutdown requested with {} jobs queued",
                state.jobs.len()
            );
        }
        self.shared.job_available.notify_all();

        let workers: Vec<_> = self.join_handles().drain(..).collect();
        for worker in workers {
            let name = worker.thread().name().unwrap_or("pool-worker").to_string();
            if worker.join().is_err() {
                // Jobs are unwound inside the worker, so this is the loop itself failing.
                warn!("WorkerPool: {} exited by panic", name);
            }
        }
        info!("WorkerPool: all {} workers joined", self.size);
    }

    fn join_handles(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.workers
            .lock()
            .expect("worker pool join handle lock poisoned")
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(worker_id: usize, shared: Arc<Shared>) {
    trace!("pool-worker-{}: started", worker_id);
    loop {
        let job = {
            let state = shared.lock();
            let mut state = shared
                .job_available
                .wait_while(state, |s| s.jobs.is_empty() && !s.shutting_down)
                .expect("worker pool queue lock poisoned");
            match state.jobs.pop_front() {
                Some(job) => job,
                // Woken with an empty queue: only happens once shutdown is set.
                None => break,
            }
        };
        job();
    }
    trace!("pool-worker-{}: exiting", worker_id);
}
