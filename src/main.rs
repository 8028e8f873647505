//! changelister - CLI entry point.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use changelister::changelog::{build_changelog, generate_summary, render_changelog, write_changelog};
use changelister::config::{ConfigOverrides, OutputFormat, TemplateSource, load_config};
use changelister::git::{CommitClassifier, Git2History, TagSelection, resolve_boundaries};

/// Generate a grouped changelog from git tags and conventional commits.
#[derive(Parser, Debug)]
#[command(name = "changelister")]
#[command(about = "Generate a grouped changelog from git tags and conventional commits")]
#[command(version)]
struct Cli {
    /// Configuration file (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the git repository
    #[arg(short = 'C', long)]
    path: Option<PathBuf>,

    /// Only generate the section of this tag (all tags if empty)
    #[arg(short, long)]
    tag: Option<String>,

    /// Name of the section for commits after the newest tag
    #[arg(long)]
    unreleased: Option<String>,

    /// Template used to render the changelog
    #[arg(long)]
    template: Option<String>,

    /// Output file, or - for stdout
    #[arg(short = 'o', long)]
    output: Option<String>,

    /// Output format: markdown or json
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Dry run - print changelog without writing
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            path: self.path.clone(),
            tag: self.tag.clone(),
            unreleased: self.unreleased.clone(),
            template: self.template.clone(),
            output: self.output.clone(),
            format: self.format,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Step 1: Load configuration
    let config = load_config(cli.config.as_deref())
        .context("Failed to load configuration")?
        .with_overrides(cli.overrides());

    let template = match config.format {
        OutputFormat::Markdown => config
            .template_source()
            .context("Failed to locate changelog template")?,
        OutputFormat::Json => TemplateSource::Builtin,
    };

    let classifier = CommitClassifier::new(config.commit_types.clone())
        .context("Invalid commit types in configuration")?;

    // Step 2: Open git repository
    let history = Git2History::open(&config.path).with_context(|| {
        format!("Not a git repository: {}", config.path.display())
    })?;

    // Step 3: Resolve release boundaries
    let selection = TagSelection::from_selector(&config.tag);
    let boundaries = resolve_boundaries(&history, &selection, &config.unreleased)
        .context("Failed to resolve release boundaries")?;

    info!(count = boundaries.len(), "Resolved release boundaries");

    // Step 4: Classify and group commits
    let entries = build_changelog(&history, &boundaries, &classifier)
        .context("Failed to read commit history")?;

    // Step 5: Render and write
    let rendered = render_changelog(config.format, &template, &entries)
        .context("Failed to render changelog")?;

    if cli.dry_run || config.writes_to_stdout() {
        print!("{}", rendered);
        return Ok(());
    }

    write_changelog(Path::new(&config.output), &rendered)
        .with_context(|| format!("Failed to write {}", config.output))?;

    println!("✓ {}", generate_summary(&entries, &config.output));

    Ok(())
}

/// Log to stderr. `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "changelister=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
