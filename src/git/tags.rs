//! Tag enumeration and dereferencing.

use std::collections::HashMap;

use git2::{Oid, Repository, Sort};
use tracing::{debug, warn};

use crate::error::GitError;

use super::history::{TagInfo, to_datetime};

/// Date format used for tag annotations.
pub const TAG_DATE_FORMAT: &str = "%Y-%m-%d";

/// A tag resolved against the repository, before ordering.
struct ResolvedTag {
    info: TagInfo,
    commit: Oid,
    commit_time: i64,
    tagger_time: i64,
}

/// List every tag in the repository, newest first.
///
/// Tags reachable from HEAD come first, in the order a topological, time-sorted
/// walk from HEAD meets their commits. Tags that HEAD cannot reach follow,
/// ordered by their commit time. Several tags on one commit are ordered by
/// tagger date, then by name.
pub fn list_tags(repo: &Repository) -> Result<Vec<TagInfo>, GitError> {
    let mut by_commit: HashMap<Oid, Vec<ResolvedTag>> = HashMap::new();

    for (name, oid) in tag_references(repo)? {
        match resolve_tag(repo, &name, oid) {
            Ok(tag) => by_commit.entry(tag.commit).or_default().push(tag),
            Err(e) => warn!(tag = %name, error = %e, "Skipping tag that does not point to a commit"),
        }
    }

    for tags in by_commit.values_mut() {
        tags.sort_by(|a, b| {
            b.tagger_time
                .cmp(&a.tagger_time)
                .then_with(|| b.info.name.cmp(&a.info.name))
        });
    }

    let mut ordered = Vec::new();

    if let Some(head) = repo.head().ok().and_then(|h| h.target()) {
        let mut revwalk = repo
            .revwalk()
            .map_err(|e| GitError::history("revision walker", e))?;
        revwalk
            .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
            .map_err(|e| GitError::history("revision walker", e))?;
        revwalk
            .push(head)
            .map_err(|e| GitError::history(format!("commit {}", head), e))?;

        for oid in revwalk {
            if by_commit.is_empty() {
                break;
            }
            let oid = oid.map_err(|e| GitError::history("commit history", e))?;
            if let Some(tags) = by_commit.remove(&oid) {
                ordered.extend(tags.into_iter().map(|t| t.info));
            }
        }
    }

    if !by_commit.is_empty() {
        let mut unreachable: Vec<ResolvedTag> = by_commit.into_values().flatten().collect();
        debug!(
            count = unreachable.len(),
            "Found tags not reachable from HEAD, ordering them by commit time"
        );
        unreachable.sort_by(|a, b| {
            b.commit_time
                .cmp(&a.commit_time)
                .then_with(|| b.tagger_time.cmp(&a.tagger_time))
                .then_with(|| b.info.name.cmp(&a.info.name))
        });
        ordered.extend(unreachable.into_iter().map(|t| t.info));
    }

    Ok(ordered)
}

/// Resolve a tag name to the commit it points to.
///
/// Annotated tags are peeled through their tag object; lightweight tags
/// already point at a commit.
pub fn resolve_tag_commit(repo: &Repository, name: &str) -> Result<Oid, GitError> {
    let reference = match repo.find_reference(&format!("refs/tags/{}", name)) {
        Ok(reference) => reference,
        Err(e) if e.code() == git2::ErrorCode::NotFound => {
            return Err(GitError::TagNotFound(name.to_string()));
        }
        Err(e) => return Err(GitError::history(format!("tag '{}'", name), e)),
    };

    let commit = reference
        .peel_to_commit()
        .map_err(|e| GitError::history(format!("commit of tag '{}'", name), e))?;

    Ok(commit.id())
}

/// Collect `(name, oid)` for every tag reference, skipping non-UTF-8 names.
fn tag_references(repo: &Repository) -> Result<Vec<(String, Oid)>, GitError> {
    let mut references = Vec::new();

    repo.tag_foreach(|oid, name_bytes| {
        if let Ok(name_str) = std::str::from_utf8(name_bytes) {
            let name = name_str
                .strip_prefix("refs/tags/")
                .unwrap_or(name_str)
                .to_string();
            references.push((name, oid));
        } else {
            warn!("Skipping tag with OID {} - name is not valid UTF-8", oid);
        }
        true // Continue iteration
    })
    .map_err(|e| GitError::history("tag list", e))?;

    Ok(references)
}

fn resolve_tag(repo: &Repository, name: &str, oid: Oid) -> Result<ResolvedTag, git2::Error> {
    let object = repo.find_object(oid, None)?;
    let commit = object.peel_to_commit()?;

    let (message, date, tagger_time) = match object.as_tag() {
        Some(tag) => {
            let tagger = tag.tagger();
            let when = tagger.as_ref().map(|sig| sig.when());
            (
                tag.message().unwrap_or("").trim_end().to_string(),
                when.map(|t| to_datetime(t).format(TAG_DATE_FORMAT).to_string())
                    .unwrap_or_default(),
                when.map(|t| t.seconds()).unwrap_or(0),
            )
        }
        None => {
            debug!(tag = %name, "Lightweight tag, no annotation");
            (String::new(), String::new(), 0)
        }
    };

    Ok(ResolvedTag {
        info: TagInfo {
            name: name.to_string(),
            message,
            date,
        },
        commit: commit.id(),
        commit_time: commit.time().seconds(),
        tagger_time,
    })
}
