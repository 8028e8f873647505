//! Repository history provider.
//!
//! [`HistoryProvider`] is the seam between the changelog core and the object
//! store. [`Git2History`] implements it on top of a git2 repository; tests
//! can substitute an in-memory history.

use std::path::Path;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use git2::{Commit, Oid, Repository, Sort};

use crate::error::GitError;

use super::range::RangeStart;
use super::tags;

/// A tag as listed by the provider.
///
/// `message` and `date` are empty for lightweight tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    pub name: String,
    pub message: String,
    pub date: String,
}

/// One commit delivered by a history walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryCommit {
    pub id: Oid,
    pub message: String,
    pub author: String,
    pub time: DateTime<FixedOffset>,
}

impl HistoryCommit {
    /// Create a HistoryCommit from a git2 Commit.
    pub fn from_git2_commit(commit: &Commit) -> Self {
        let author = commit.author();

        Self {
            id: commit.id(),
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
            author: author.name().unwrap_or("unknown").to_string(),
            time: to_datetime(author.when()),
        }
    }
}

/// Lazily produced commits, newest first.
pub type HistoryWalk<'a> = Box<dyn Iterator<Item = Result<HistoryCommit, GitError>> + 'a>;

/// Read access to tags and commit history.
pub trait HistoryProvider {
    /// All tags, newest first.
    fn list_tags(&self) -> Result<Vec<TagInfo>, GitError>;

    /// The commit a tag points to, dereferencing annotated tag objects.
    fn resolve_tag_commit(&self, name: &str) -> Result<Oid, GitError>;

    /// The commit HEAD points to.
    fn head_commit(&self) -> Result<Oid, GitError>;

    /// Walk the commits reachable from `from` in descending commit-time order.
    ///
    /// With a [`RangeStart::Commit`] start, implementations should leave out
    /// every commit reachable from it, including commits merged in from side
    /// branches. The walk is lazy, so callers may stop consuming it at any point.
    fn walk_history(&self, from: Oid, start: RangeStart) -> Result<HistoryWalk<'_>, GitError>;

    /// The first commit without parents reached by following first parents from HEAD.
    fn root_commit(&self) -> Result<Oid, GitError>;
}

/// History provider backed by a git2 repository.
pub struct Git2History {
    repo: Repository,
}

impl Git2History {
    /// Open the repository at or above `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GitError> {
        let repo = Repository::discover(path).map_err(GitError::OpenRepository)?;
        Ok(Self { repo })
    }

    fn head(&self) -> Result<Commit<'_>, GitError> {
        let head = self
            .repo
            .head()
            .map_err(|e| GitError::history("HEAD", e))?;

        head.peel_to_commit()
            .map_err(|e| GitError::history("HEAD commit", e))
    }
}

impl HistoryProvider for Git2History {
    fn list_tags(&self) -> Result<Vec<TagInfo>, GitError> {
        tags::list_tags(&self.repo)
    }

    fn resolve_tag_commit(&self, name: &str) -> Result<Oid, GitError> {
        tags::resolve_tag_commit(&self.repo, name)
    }

    fn head_commit(&self) -> Result<Oid, GitError> {
        Ok(self.head()?.id())
    }

    fn walk_history(&self, from: Oid, start: RangeStart) -> Result<HistoryWalk<'_>, GitError> {
        let mut revwalk = self
            .repo
            .revwalk()
            .map_err(|e| GitError::history("revision walker", e))?;
        revwalk
            .set_sorting(Sort::TIME)
            .map_err(|e| GitError::history("revision walker", e))?;
        revwalk
            .push(from)
            .map_err(|e| GitError::history(format!("commit {}", from), e))?;
        if let RangeStart::Commit(hidden) = start {
            revwalk
                .hide(hidden)
                .map_err(|e| GitError::history(format!("commit {}", hidden), e))?;
        }

        let repo = &self.repo;
        Ok(Box::new(revwalk.map(move |oid_result| {
            let oid = oid_result.map_err(|e| GitError::history("commit history", e))?;
            let commit = repo
                .find_commit(oid)
                .map_err(|e| GitError::history(format!("commit {}", oid), e))?;
            Ok(HistoryCommit::from_git2_commit(&commit))
        })))
    }

    fn root_commit(&self) -> Result<Oid, GitError> {
        let mut commit = self.head()?;

        while commit.parent_count() > 0 {
            let child = commit.id();
            commit = commit
                .parent(0)
                .map_err(|e| GitError::history(format!("first parent of commit {}", child), e))?;
        }

        Ok(commit.id())
    }
}

/// Convert a git timestamp to a chrono datetime, keeping its UTC offset.
pub(crate) fn to_datetime(time: git2::Time) -> DateTime<FixedOffset> {
    let utc = DateTime::<Utc>::from_timestamp(time.seconds(), 0).unwrap_or_default();
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60).unwrap_or_else(|| Utc.fix());

    utc.with_timezone(&offset)
}
