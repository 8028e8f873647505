//! Configuration loading.
//!
//! Values are layered, lowest to highest precedence: built-in defaults, a
//! YAML config file, `CHANGELISTER_*` environment variables, then command-line
//! flags ([`ConfigOverrides`]).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Directory name used under the XDG config and data directories.
pub const APP_DIR: &str = "changelister";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "changelister.yaml";

/// Config file looked up under `$XDG_CONFIG_HOME/changelister/`.
pub const USER_CONFIG_FILE: &str = "config.yaml";

/// Template file searched for when none is configured.
pub const DEFAULT_TEMPLATE_FILE: &str = "changelog.tmpl";

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "CHANGELISTER_";

/// Output format of the rendered changelog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidFormat(s.to_string())),
        }
    }
}

/// Where the Markdown template comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Builtin,
    File(PathBuf),
}

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the git repository.
    pub path: PathBuf,
    /// Tag selector: empty for all tags, otherwise a single tag name.
    pub tag: String,
    /// Name of the boundary between the newest tag and HEAD.
    pub unreleased: String,
    pub template: Option<String>,
    /// Output file, or `-` for stdout.
    pub output: String,
    pub format: OutputFormat,
    /// Commit type token to group label. The keys are the accepted types.
    pub commit_types: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            tag: String::new(),
            unreleased: "Unreleased".to_string(),
            template: None,
            output: "CHANGELOG.md".to_string(),
            format: OutputFormat::Markdown,
            commit_types: default_commit_types(),
        }
    }
}

fn default_commit_types() -> BTreeMap<String, String> {
    [
        ("feat", "added"),
        ("fix", "fixed"),
        ("refactor", "changed"),
        ("perf", "changed"),
        ("revert", "removed"),
        ("docs", "other"),
        ("build", "other"),
        ("ci", "other"),
        ("chore", "other"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Values given on the command line. `None` leaves the lower layers untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub path: Option<PathBuf>,
    pub tag: Option<String>,
    pub unreleased: Option<String>,
    pub template: Option<String>,
    pub output: Option<String>,
    pub format: Option<OutputFormat>,
}

impl Config {
    /// Apply `CHANGELISTER_*` environment variables.
    ///
    /// Empty values are ignored, except `CHANGELISTER_TAG` where empty selects all tags.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(path) = env_value("PATH") {
            self.path = PathBuf::from(path);
        }
        if let Ok(tag) = std::env::var(format!("{}TAG", ENV_PREFIX)) {
            self.tag = tag;
        }
        if let Some(unreleased) = env_value("UNRELEASED") {
            self.unreleased = unreleased;
        }
        if let Some(template) = env_value("TEMPLATE") {
            self.template = Some(template);
        }
        if let Some(output) = env_value("OUTPUT") {
            self.output = output;
        }
        if let Some(format) = env_value("FORMAT") {
            self.format = format.parse()?;
        }
        Ok(())
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(path) = overrides.path {
            self.path = path;
        }
        if let Some(tag) = overrides.tag {
            self.tag = tag;
        }
        if let Some(unreleased) = overrides.unreleased {
            self.unreleased = unreleased;
        }
        if let Some(template) = overrides.template {
            self.template = Some(template);
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        if let Some(format) = overrides.format {
            self.format = format;
        }
        self
    }

    pub fn writes_to_stdout(&self) -> bool {
        self.output == "-"
    }

    /// Locate the Markdown template.
    ///
    /// A configured template must exist. Without one, `changelog.tmpl` is
    /// searched for and the built-in template is used if it is not found.
    pub fn template_source(&self) -> Result<TemplateSource, ConfigError> {
        match self.template.as_deref().filter(|t| !t.is_empty()) {
            Some(name) => locate_template(name)
                .map(TemplateSource::File)
                .ok_or_else(|| ConfigError::TemplateNotFound(name.to_string())),
            None => Ok(locate_template(DEFAULT_TEMPLATE_FILE)
                .map(TemplateSource::File)
                .unwrap_or(TemplateSource::Builtin)),
        }
    }
}

/// Load configuration from file and environment.
///
/// An explicit `config_path` must exist. Otherwise the first existing file of
/// [`config_file_candidates`] is used, or the defaults when there is none.
pub fn load_config(config_path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => config_file_candidates().into_iter().find(|p| p.is_file()),
    };

    let mut config = match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading config file");
            read_config_file(&path)?
        }
        None => {
            debug!("No config file found, using defaults");
            Config::default()
        }
    };

    config.apply_env()?;
    Ok(config)
}

/// Parse one YAML config file. Missing keys take their default values.
pub fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;

    if content.trim().is_empty() {
        return Ok(Config::default());
    }

    serde_yaml::from_str(&content).map_err(|source| ConfigError::ParseFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// Config file locations in lookup order.
pub fn config_file_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = config_home() {
        candidates.push(dir.join(APP_DIR).join(USER_CONFIG_FILE));
    }
    candidates
}

/// Find a template by name: as given, then under the XDG data directory.
pub fn locate_template(name: &str) -> Option<PathBuf> {
    let direct = PathBuf::from(name);
    if direct.is_file() {
        return Some(direct);
    }

    let shared = data_home()?.join(APP_DIR).join(name);
    shared.is_file().then_some(shared)
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(format!("{}{}", ENV_PREFIX, key))
        .ok()
        .filter(|v| !v.is_empty())
}

fn xdg_dir(var: &str, fallback: &[&str]) -> Option<PathBuf> {
    match std::env::var_os(var) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::home_dir().map(|home| fallback.iter().fold(home, |p, part| p.join(part))),
    }
}

fn config_home() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", &[".config"])
}

fn data_home() -> Option<PathBuf> {
    xdg_dir("XDG_DATA_HOME", &[".local", "share"])
}
