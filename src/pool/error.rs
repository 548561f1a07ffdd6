// src/pool/error.rs

use std::any::Any;
use thiserror::Error;

/// Errors raised by the pool itself, as opposed to the jobs it runs.
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("worker pool needs at least one worker")]
    InvalidWorkerCount,
    #[error("failed to spawn worker thread {worker}")]
    Spawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("job submitted after the worker pool was shut down")]
    ShutDown,
}

/// Failure of a single job, delivered through its completion handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("job panicked: {0}")]
    Panicked(String),
    #[error("job was dropped before it ran")]
    Abandoned,
}

impl TaskError {
    /// Turns a payload caught by `catch_unwind` into an error.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        TaskError::Panicked(message)
    }
}
