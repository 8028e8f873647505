//! Changelog aggregation, rendering and writing.

pub mod aggregate;
pub mod format;
pub mod writer;

pub use aggregate::{aggregate_boundary, build_changelog};
pub use format::{ChangelogEntry, CommitRecord, GroupedCommits};
pub use writer::{generate_summary, render_changelog, write_changelog};
