//! Per-boundary commit aggregation.

use tracing::debug;

use crate::error::GitError;
use crate::git::{Boundary, CommitClassifier, HistoryProvider};

use super::format::{ChangelogEntry, CommitRecord, GroupedCommits};

/// Classify the commits of one boundary and group them by label.
///
/// The walk starts at `boundary.stop` and leaves out everything reachable from
/// a start commit, so merged side branches land in the boundary that merged
/// them. Reaching the start commit itself also ends the walk. Any read
/// failure aborts the whole boundary.
pub fn aggregate_boundary<P: HistoryProvider + ?Sized>(
    provider: &P,
    boundary: &Boundary,
    classifier: &CommitClassifier,
) -> Result<ChangelogEntry, GitError> {
    let mut commits = GroupedCommits::new();
    let mut visited = 0usize;

    for commit in provider.walk_history(boundary.stop, boundary.start)? {
        let commit = commit?;
        if boundary.start.excludes(commit.id) {
            break;
        }
        visited += 1;

        let Some(parsed) = classifier.classify(&commit.message) else {
            continue;
        };

        commits
            .entry(parsed.group.clone())
            .or_default()
            .push(CommitRecord::new(parsed, &commit));
    }

    let entry = ChangelogEntry {
        tag: boundary.name.clone(),
        message: boundary.message.clone(),
        date: boundary.date.clone(),
        commits,
    };

    debug!(
        tag = %entry.tag,
        visited,
        kept = entry.commit_count(),
        "Aggregated boundary"
    );

    Ok(entry)
}

/// Aggregate every boundary, preserving their order.
pub fn build_changelog<P: HistoryProvider + ?Sized>(
    provider: &P,
    boundaries: &[Boundary],
    classifier: &CommitClassifier,
) -> Result<Vec<ChangelogEntry>, GitError> {
    boundaries
        .iter()
        .map(|boundary| aggregate_boundary(provider, boundary, classifier))
        .collect()
}
