//! Error types for the resource pool

use std::time::Duration;
use thiserror::Error;

/// Error produced by a resource factory during pool construction.
pub type FactoryError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("pool is closed")]
    Closed,

    #[error("timed out after {0:?} waiting for a free handle")]
    TimedOut(Duration),

    #[error("released handle is not checked out from this pool")]
    InvalidArgument,

    #[error("factory is not able to fill the pool: {0}")]
    FactoryFailed(#[source] FactoryError),
}

pub type PoolResult<T> = Result<T, PoolError>;
