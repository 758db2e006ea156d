//! View models produced by the engine and consumed by the renderers.
//!
//! - `commit`: Commit, Signature, CommitPage, Ref
//! - `tree`: TreeEntry
//! - `diff`: Diff, FileDiff, Delta, Hunk, Line, stats
//! - `blame`: Blame, BlameHunk, BlameLine
//!
//! Everything here is request-scoped and owns its data; nothing borrows from
//! the backend.

pub mod blame;
pub mod commit;
pub mod diff;
pub mod tree;

pub use blame::*;
pub use commit::*;
pub use diff::*;
pub use tree::*;
