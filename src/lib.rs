//! repo-pages: history, diff and blame pages for a git repository.
//!
//! - `git`: repository backend, ref resolution, history walk, diff, blame, search
//! - `models`: owned view models
//! - `render`: HTML fragment renderers over a `Sink`
//! - `context`: per-request composition of the above
//! - `routes`: axum handlers serving the fragments

pub mod config;
pub mod context;
pub mod error;
pub mod git;
pub mod models;
pub mod render;
pub mod routes;

#[cfg(test)]
mod test_support;

pub use config::EngineConfig;
pub use context::{LogRequest, RequestContext};
pub use error::{EngineError, Result};
