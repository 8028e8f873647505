//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::cell::Cell;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use git2::{Oid, Repository, Signature, Time};

use changelister::git::{
    Git2History, HistoryCommit, HistoryProvider, HistoryWalk, RangeStart, TagInfo,
};
use changelister::GitError;

/// Author time of the first commit created by a [`TestRepo`] (2023-11-14T22:13:20Z).
pub const BASE_TIME: i64 = 1_700_000_000;

/// Build a label table from `(type, label)` pairs.
pub fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// A test git repository builder for integration tests.
///
/// Every signature advances a private clock by one minute, so commit order
/// never depends on the wall clock.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
    clock: Cell<i64>,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self {
            dir,
            repo,
            clock: Cell::new(BASE_TIME),
        }
    }

    /// Open the repository through the git2 history provider.
    pub fn history(&self) -> Git2History {
        Git2History::open(self.dir.path()).expect("Failed to open test repo")
    }

    /// Get the next test signature for commits and tags.
    fn signature(&self) -> Signature<'static> {
        let now = self.clock.get();
        self.clock.set(now + 60);
        Signature::new("Test User", "test@example.com", &Time::new(now, 0))
            .expect("Failed to create signature")
    }

    /// Create a commit with the given message on HEAD. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        self.commit_with_parents(Some("HEAD"), message, &parents)
    }

    /// Create a commit on top of `parent` without moving HEAD, as on a side branch.
    pub fn side_commit(&self, message: &str, parent: Oid) -> Oid {
        let parent = self.repo.find_commit(parent).expect("Failed to find parent");
        self.commit_with_parents(None, message, &[&parent])
    }

    /// Create a merge commit on HEAD whose second parent is `other`.
    pub fn merge(&self, message: &str, other: Oid) -> Oid {
        let head = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("Failed to find HEAD commit");
        let other = self.repo.find_commit(other).expect("Failed to find merged commit");
        self.commit_with_parents(Some("HEAD"), message, &[&head, &other])
    }

    fn commit_with_parents(
        &self,
        update_ref: Option<&str>,
        message: &str,
        parents: &[&git2::Commit],
    ) -> Oid {
        let sig = self.signature();

        // Create or update a file to have something to commit
        let file_path = self.dir.path().join("test.txt");
        std::fs::write(&file_path, format!("{}\n{}", message, self.clock.get()))
            .expect("Failed to write test file");

        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(std::path::Path::new("test.txt")).expect("Failed to add file");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        self.repo
            .commit(update_ref, &sig, &sig, message, &tree, parents)
            .expect("Failed to create commit")
    }

    /// Create a lightweight tag pointing to the given OID.
    pub fn tag_lightweight(&self, name: &str, oid: Oid) {
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo.tag_lightweight(name, &obj, false).expect("Failed to create lightweight tag");
    }

    /// Create an annotated tag pointing to the given OID.
    pub fn tag_annotated(&self, name: &str, oid: Oid, message: &str) {
        let sig = self.signature();
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo.tag(name, &obj, &sig, message, false).expect("Failed to create annotated tag");
    }
}

/// In-memory linear history, for cases a real repository cannot produce.
pub struct FakeHistory {
    /// Oldest first.
    commits: Vec<HistoryCommit>,
    /// Newest first, with the index of the tagged commit.
    tags: Vec<(TagInfo, usize)>,
    broken: Option<usize>,
}

impl FakeHistory {
    /// Build a linear history from messages, oldest first.
    pub fn linear(messages: &[&str]) -> Self {
        let commits = messages
            .iter()
            .enumerate()
            .map(|(i, message)| HistoryCommit {
                id: Self::oid(i),
                message: message.to_string(),
                author: "Fake Author".to_string(),
                time: DateTime::<Utc>::from_timestamp(BASE_TIME + i as i64 * 60, 0)
                    .expect("valid timestamp")
                    .fixed_offset(),
            })
            .collect();

        Self {
            commits,
            tags: Vec::new(),
            broken: None,
        }
    }

    pub fn oid(index: usize) -> Oid {
        Oid::from_str(&format!("{:040x}", index + 1)).expect("valid oid")
    }

    /// Tag the commit at `index`. Tags must be added oldest first.
    pub fn with_tag(mut self, name: &str, index: usize) -> Self {
        let info = TagInfo {
            name: name.to_string(),
            message: String::new(),
            date: String::new(),
        };
        self.tags.insert(0, (info, index));
        self
    }

    /// Make reading the commit at `index` fail.
    pub fn broken_at(mut self, index: usize) -> Self {
        self.broken = Some(index);
        self
    }
}

impl HistoryProvider for FakeHistory {
    fn list_tags(&self) -> Result<Vec<TagInfo>, GitError> {
        Ok(self.tags.iter().map(|(info, _)| info.clone()).collect())
    }

    fn resolve_tag_commit(&self, name: &str) -> Result<Oid, GitError> {
        self.tags
            .iter()
            .find(|(info, _)| info.name == name)
            .map(|(_, index)| Self::oid(*index))
            .ok_or_else(|| GitError::TagNotFound(name.to_string()))
    }

    fn head_commit(&self) -> Result<Oid, GitError> {
        Ok(Self::oid(self.commits.len() - 1))
    }

    /// Linear history has no side branches, so `start` is left to the caller.
    fn walk_history(&self, from: Oid, _start: RangeStart) -> Result<HistoryWalk<'_>, GitError> {
        let position = self
            .commits
            .iter()
            .position(|c| c.id == from)
            .ok_or_else(|| {
                GitError::history(format!("commit {}", from), git2::Error::from_str("not found"))
            })?;

        let broken = self.broken;
        Ok(Box::new(
            self.commits[..=position]
                .iter()
                .enumerate()
                .rev()
                .map(move |(index, commit)| {
                    if broken == Some(index) {
                        Err(GitError::history(
                            format!("commit {}", commit.id),
                            git2::Error::from_str("object is corrupt"),
                        ))
                    } else {
                        Ok(commit.clone())
                    }
                }),
        ))
    }

    fn root_commit(&self) -> Result<Oid, GitError> {
        Ok(Self::oid(0))
    }
}
