//! Git operations using git2-rs.

pub mod commits;
pub mod history;
pub mod range;
pub mod tags;

pub use commits::{CommitClassifier, CommitGrammar, ParsedCommit};
pub use history::{Git2History, HistoryCommit, HistoryProvider, HistoryWalk, TagInfo};
pub use range::{Boundary, RangeStart, TagSelection, resolve_boundaries};
