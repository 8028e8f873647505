//! Release boundary resolution.
//!
//! Splits history into one commit range per tag plus the unreleased range
//! between the newest tag and HEAD.

use git2::Oid;
use tracing::debug;

use crate::error::GitError;

use super::history::{HistoryProvider, TagInfo};

/// Lower bound of a boundary's commit range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeStart {
    /// The walk stops when it reaches this commit, which is excluded.
    Commit(Oid),
    /// The repository root. The walk runs until history is exhausted and the
    /// root commit is included.
    Root(Oid),
}

impl RangeStart {
    pub fn oid(&self) -> Oid {
        match self {
            Self::Commit(oid) | Self::Root(oid) => *oid,
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root(_))
    }

    /// Whether the walk must stop before `oid`.
    pub fn excludes(&self, oid: Oid) -> bool {
        matches!(self, Self::Commit(start) if *start == oid)
    }
}

/// One release window: commits reachable from `stop` down to `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    pub name: String,
    pub message: String,
    pub date: String,
    pub start: RangeStart,
    pub stop: Oid,
}

/// Which boundaries to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSelection {
    /// The unreleased range followed by every tag, newest first.
    All,
    /// Only the range owned by the named tag.
    Single(String),
}

impl TagSelection {
    /// An empty selector means all tags.
    pub fn from_selector(selector: &str) -> Self {
        if selector.is_empty() {
            Self::All
        } else {
            Self::Single(selector.to_string())
        }
    }
}

/// Resolve the boundaries for a tag selection.
///
/// In [`TagSelection::All`] mode the result is ordered unreleased, newest
/// tag, ..., oldest tag, and each boundary's `stop` equals the start commit of
/// the boundary before it.
pub fn resolve_boundaries<P: HistoryProvider + ?Sized>(
    provider: &P,
    selection: &TagSelection,
    unreleased: &str,
) -> Result<Vec<Boundary>, GitError> {
    match selection {
        TagSelection::All => resolve_all(provider, unreleased),
        TagSelection::Single(name) => Ok(vec![resolve_single(provider, name)?]),
    }
}

fn resolve_all<P: HistoryProvider + ?Sized>(
    provider: &P,
    unreleased: &str,
) -> Result<Vec<Boundary>, GitError> {
    let mut chronological = provider.list_tags()?;
    chronological.reverse();

    let commits = chronological
        .iter()
        .map(|tag| provider.resolve_tag_commit(&tag.name))
        .collect::<Result<Vec<Oid>, GitError>>()?;

    let root = RangeStart::Root(provider.root_commit()?);
    let head = provider.head_commit()?;

    let unreleased_start = commits.last().map_or(root, |oid| RangeStart::Commit(*oid));

    let mut boundaries = Vec::with_capacity(chronological.len() + 1);
    boundaries.push(Boundary {
        name: unreleased.to_string(),
        message: String::new(),
        date: String::new(),
        start: unreleased_start,
        stop: head,
    });

    let mut stop = unreleased_start.oid();
    for (index, tag) in chronological.into_iter().enumerate().rev() {
        let start = match index.checked_sub(1) {
            Some(older) => RangeStart::Commit(commits[older]),
            None => root,
        };

        debug!(tag = %tag.name, stop = %stop, start = %start.oid(), "Resolved tag boundary");
        boundaries.push(tag_boundary(tag, start, stop));
        stop = start.oid();
    }

    Ok(boundaries)
}

fn resolve_single<P: HistoryProvider + ?Sized>(
    provider: &P,
    name: &str,
) -> Result<Boundary, GitError> {
    let mut tags = provider.list_tags()?;

    let Some(position) = tags.iter().position(|t| t.name == name) else {
        debug!(tag = %name, "Requested tag is not in the repository");
        return Err(GitError::TagNotFound(name.to_string()));
    };

    let stop = provider.resolve_tag_commit(name)?;
    let start = match tags.get(position + 1) {
        Some(older) => RangeStart::Commit(provider.resolve_tag_commit(&older.name)?),
        None => RangeStart::Root(provider.root_commit()?),
    };

    Ok(tag_boundary(tags.swap_remove(position), start, stop))
}

fn tag_boundary(tag: TagInfo, start: RangeStart, stop: Oid) -> Boundary {
    Boundary {
        name: tag.name,
        message: tag.message,
        date: tag.date,
        start,
        stop,
    }
}
