//! changelister - generate a grouped changelog from git tags and conventional commits.
//!
//! # Overview
//!
//! changelister splits the commit history into one range per tag plus the
//! unreleased range, classifies every commit message against a conventional
//! commit grammar built from a configurable type table, and renders the
//! grouped result through a template.

pub mod changelog;
pub mod config;
pub mod error;
pub mod git;

// Re-export commonly used types
pub use changelog::{ChangelogEntry, CommitRecord, build_changelog};
pub use config::{Config, OutputFormat};
pub use error::{ConfigError, GitError, RenderError};
pub use git::{Boundary, CommitClassifier, Git2History, HistoryProvider, RangeStart, TagSelection};
