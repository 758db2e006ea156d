//! Engine error types.
//!
//! Defines `EngineError` for every failure the history/diff/blame engine can
//! report. Most variants are recovered close to where they occur:
//! - `RevisionUnavailable` → fallback to HEAD (fatal only if HEAD is gone)
//! - `PathNotFound` → rendered as a "not found" fragment
//! - `PatchUnavailable` → one degraded diff row
//! - `BackendUnavailable` → fatal for the request
//!
//! The HTTP mapping lives in `routes`, the core knows nothing about transport.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Repository unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Revision unavailable: {0}")]
    RevisionUnavailable(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Patch unavailable: {0}")]
    PatchUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
