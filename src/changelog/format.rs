//! Changelog data handed to the renderer.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::git::{HistoryCommit, ParsedCommit};

/// Length of the abbreviated commit hash shown in changelogs.
pub const SHORT_ID_LEN: usize = 7;

/// A classified commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    pub id: String,
    pub short_id: String,
    #[serde(rename = "type")]
    pub commit_type: String,
    pub scope: String,
    pub header: String,
    pub body: String,
    pub author: String,
    pub timestamp: DateTime<FixedOffset>,
    pub breaking: bool,
    pub group: String,
}

impl CommitRecord {
    /// Attach a commit's identity and authorship to its parsed message.
    pub fn new(parsed: ParsedCommit, commit: &HistoryCommit) -> Self {
        let id = commit.id.to_string();
        let short_id = id.chars().take(SHORT_ID_LEN).collect();

        Self {
            id,
            short_id,
            commit_type: parsed.commit_type,
            scope: parsed.scope,
            header: parsed.header,
            body: parsed.body,
            author: commit.author.clone(),
            timestamp: commit.time,
            breaking: parsed.breaking,
            group: parsed.group,
        }
    }
}

/// Commits of one boundary grouped by label, in walk order within each group.
pub type GroupedCommits = BTreeMap<String, Vec<CommitRecord>>;

/// One release section of the changelog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogEntry {
    pub tag: String,
    pub message: String,
    pub date: String,
    pub commits: GroupedCommits,
}

impl ChangelogEntry {
    pub fn is_empty(&self) -> bool {
        self.commits.values().all(Vec::is_empty)
    }

    pub fn commit_count(&self) -> usize {
        self.commits.values().map(Vec::len).sum()
    }

    /// Records of one group, empty if the group is absent.
    pub fn group(&self, label: &str) -> &[CommitRecord] {
        self.commits.get(label).map(Vec::as_slice).unwrap_or(&[])
    }
}
