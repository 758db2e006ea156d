pub mod blame;
pub mod diff;
pub mod history;
pub mod refs;
pub mod repository;
pub mod search;

pub use diff::{DiffView, TreeDiff};
pub use history::{CommitWalk, WalkOrder};
pub use repository::GitRepository;
pub use search::SearchKind;
