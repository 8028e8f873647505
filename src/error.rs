//! Error types for changelister modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Tag '{0}' does not exist in the repository")]
    TagNotFound(String),

    #[error("Failed to read {context}: {source}")]
    HistoryRead {
        context: String,
        #[source]
        source: git2::Error,
    },
}

impl GitError {
    /// Wrap a git2 failure that happened while reading history objects.
    pub fn history(context: impl Into<String>, source: git2::Error) -> Self {
        Self::HistoryRead {
            context: context.into(),
            source,
        }
    }
}

/// Errors from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Template '{0}' not found")]
    TemplateNotFound(String),

    #[error("Unknown output format '{0}' (expected 'markdown' or 'json')")]
    InvalidFormat(String),
}

/// Errors from rendering and writing the changelog.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to read template {}: {source}", path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Failed to serialize changelog: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write changelog: {0}")]
    WriteFailed(#[source] std::io::Error),
}
