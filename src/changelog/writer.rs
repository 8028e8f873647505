//! Render and write the changelog.

use std::io::Write;
use std::path::Path;

use chrono::Utc;
use minijinja::{Environment, context};
use tracing::debug;

use crate::config::{OutputFormat, TemplateSource};
use crate::error::RenderError;

use super::format::ChangelogEntry;

/// Template used when no template file is configured or found.
pub const DEFAULT_TEMPLATE: &str = r#"# Changelog

{% for entry in entries %}
## {{ entry.tag }}{{ " - " ~ entry.date if entry.date }}

{% if entry.message %}
{{ entry.message }}

{% endif %}
{% for group, commits in entry.commits|items %}
### {{ group|title }}

{% for commit in commits %}
- {{ "**BREAKING** " if commit.breaking }}{{ commit.scope ~ " " if commit.scope }}{{ commit.header }} ({{ commit.short_id }})
{% endfor %}

{% endfor %}
{% endfor %}
"#;

const TEMPLATE_NAME: &str = "changelog";

/// Render the entries in the requested format.
///
/// `template` is only consulted for [`OutputFormat::Markdown`].
pub fn render_changelog(
    format: OutputFormat,
    template: &TemplateSource,
    entries: &[ChangelogEntry],
) -> Result<String, RenderError> {
    match format {
        OutputFormat::Markdown => {
            let source = match template {
                TemplateSource::Builtin => DEFAULT_TEMPLATE.to_string(),
                TemplateSource::File(path) => read_template(path)?,
            };
            render_template(&source, entries)
        }
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(entries)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Render entries through a minijinja template source.
///
/// The template sees `entries` and `generated_at` (RFC 3339).
pub fn render_template(source: &str, entries: &[ChangelogEntry]) -> Result<String, RenderError> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    env.add_template(TEMPLATE_NAME, source)?;

    let template = env.get_template(TEMPLATE_NAME)?;
    let rendered = template.render(context! {
        entries => entries,
        generated_at => Utc::now().to_rfc3339(),
    })?;

    Ok(rendered)
}

fn read_template(path: &Path) -> Result<String, RenderError> {
    debug!(path = %path.display(), "Reading changelog template");
    std::fs::read_to_string(path).map_err(|source| RenderError::TemplateRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Write rendered content to `path` atomically.
///
/// The content goes to a temporary file in the destination directory which
/// then replaces `path`, so a failed write never leaves a partial file.
pub fn write_changelog(path: &Path, content: &str) -> Result<(), RenderError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(RenderError::WriteFailed)?;
    file.write_all(content.as_bytes())
        .map_err(RenderError::WriteFailed)?;
    file.persist(path)
        .map_err(|e| RenderError::WriteFailed(e.error))?;

    Ok(())
}

/// Generate a summary message for the user.
pub fn generate_summary(entries: &[ChangelogEntry], destination: &str) -> String {
    let releases = entries.len();
    let commits: usize = entries.iter().map(ChangelogEntry::commit_count).sum();

    let release_word = if releases == 1 { "release" } else { "releases" };
    let commit_word = if commits == 1 { "commit" } else { "commits" };

    format!(
        "Wrote {} {} ({} {}) to {}",
        releases, release_word, commits, commit_word, destination
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::changelog::format::GroupedCommits;

    fn empty_entry(tag: &str) -> ChangelogEntry {
        ChangelogEntry {
            tag: tag.to_string(),
            message: String::new(),
            date: String::new(),
            commits: GroupedCommits::new(),
        }
    }

    #[test]
    fn test_default_template_renders_headings() {
        let mut entry = empty_entry("v1.0.0");
        entry.date = "2024-01-01".to_string();
        entry.message = "First stable release".to_string();

        let rendered = render_template(DEFAULT_TEMPLATE, &[empty_entry("Unreleased"), entry]).unwrap();

        assert!(rendered.starts_with("# Changelog\n"));
        assert!(rendered.contains("## Unreleased\n"));
        assert!(rendered.contains("## v1.0.0 - 2024-01-01\n"));
        assert!(rendered.contains("First stable release\n"));
    }

    #[test]
    fn test_template_syntax_error() {
        let result = render_template("{% for x in %}", &[]);
        assert!(matches!(result, Err(RenderError::Template(_))));
    }

    #[test]
    fn test_json_format_ignores_template() {
        let template = TemplateSource::File(PathBuf::from("/nonexistent/changelog.tmpl"));
        let json = render_changelog(OutputFormat::Json, &template, &[empty_entry("Unreleased")]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["tag"], "Unreleased");
    }

    #[test]
    fn test_missing_template_file() {
        let template = TemplateSource::File(PathBuf::from("/nonexistent/changelog.tmpl"));
        let result = render_changelog(OutputFormat::Markdown, &template, &[]);
        assert!(matches!(result, Err(RenderError::TemplateRead { .. })));
    }

    #[test]
    fn test_generate_summary() {
        let summary = generate_summary(&[empty_entry("Unreleased")], "CHANGELOG.md");
        assert_eq!(summary, "Wrote 1 release (0 commits) to CHANGELOG.md");
    }
}
