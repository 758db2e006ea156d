//! HTML fragment renderers.
//!
//! - `sink`: output sink trait, escaping and link helpers
//! - `diff`: unified, side-by-side and stat views
//! - `blame`: coalesced blame table
//! - `log`: commit lists, commit header, refs, not-found fragment
//!
//! Renderers are pure functions over view models; they never talk to the
//! repository and carry no transport concepts.

pub mod blame;
pub mod diff;
pub mod log;
pub mod sink;

pub use blame::render_blame;
pub use diff::render_diff;
pub use log::{render_commit, render_commit_list, render_log, render_not_found, render_refs, Decorations};
pub use sink::{Sink, WriteSink};
