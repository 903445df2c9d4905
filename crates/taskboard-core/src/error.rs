//! Error taxonomy surfaced to the boundary layer.
//!
//! `NotFound`, `Conflict`, and `BadRequest` are caller-correctable and map to
//! transport statuses outside this crate; `Storage` wraps infrastructure
//! failures as values so the caller gets a structured outcome, not a crash.

use taskboard_storage::StoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid request: {0}")]
    BadRequest(String),
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl Error {
    /// Map a store error, giving `StoreError::NotFound` a contextual message.
    pub(crate) fn from_store(e: StoreError, what: impl Into<String>) -> Self {
        match e {
            StoreError::NotFound => Error::NotFound(what.into()),
            other => Error::Storage(other),
        }
    }
}
