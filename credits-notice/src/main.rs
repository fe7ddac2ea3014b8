//! credits-notice - copyright credits to MusicBrainz relationships
//!
//! Reads pasted credits (liner notes, streaming service footers), extracts
//! copyright and legal statements and resolves the named labels.
//! Relationships are printed to stdout as JSON lines; prompts and logs go to
//! stderr.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use credits_common::config::{resolve_data_folder, TomlConfig};
use credits_common::storage::{JsonFileStore, KeyValueStore};
use credits_notice::cache::{entity_cache, name_cache, MemoCache};
use credits_notice::client::{EntityProvider, MusicBrainzClient};
use credits_notice::resolve::{
    AutomaticResolution, ManualResolution, Orchestrator, ResolutionStrategy, SequentialIds,
};
use credits_notice::session::process_credits;
use credits_notice::terminal::{JsonLinesEditor, TerminalConfirmation};
use credits_notice::{parse_copyright_notice, Entity};
use tokio::io::{AsyncReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for credits-notice
#[derive(Parser, Debug)]
#[command(name = "credits-notice")]
#[command(about = "Extract copyright statements and link them to MusicBrainz labels")]
#[command(version)]
struct Args {
    /// Config file (default: platform config folder)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Folder holding the learned name mappings
    #[arg(short, long, global = true)]
    data_folder: Option<PathBuf>,

    /// Log level, overrides the config file (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the statements found in the credits as JSON lines
    Parse {
        /// Credits file (default: stdin)
        file: Option<PathBuf>,
    },

    /// Resolve the statements and print the resulting relationships
    Resolve {
        /// Credits file (default: stdin, requires --auto)
        file: Option<PathBuf>,

        /// MBID of the release the relationships are added to
        #[arg(long)]
        release: String,

        /// MBIDs of recordings that also get ℗ relationships
        #[arg(long = "recording")]
        recordings: Vec<String>,

        /// Take the first search result instead of asking
        #[arg(long)]
        auto: bool,

        /// Print the credits without the parsed lines afterwards
        #[arg(long)]
        remove_parsed: bool,
    },

    /// Inspect or reset the learned name mappings
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Print the learned mappings as JSON
    Show,
    /// Forget all learned mappings
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Initialize tracing
    let level = args.log_level.clone().unwrap_or_else(|| config.logging.level.clone());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let data_folder = resolve_data_folder(args.data_folder.as_deref(), &config);
    info!(data_folder = %data_folder.display(), "Using data folder");

    match args.command {
        Command::Parse { file } => parse(file.as_deref()).await,
        Command::Resolve {
            file,
            release,
            recordings,
            auto,
            remove_parsed,
        } => {
            if file.is_none() && !auto {
                bail!("Interactive resolution reads answers from stdin, pass the credits as a file");
            }
            let text = read_credits(file.as_deref()).await?;
            resolve(&config, &data_folder, &text, &release, &recordings, auto, remove_parsed).await
        }
        Command::Cache { action } => {
            let names = open_name_cache(&data_folder)?;
            match action {
                CacheAction::Show => {
                    let json: serde_json::Value = serde_json::from_str(&names.to_json()?)?;
                    println!("{}", serde_json::to_string_pretty(&json)?);
                }
                CacheAction::Clear => {
                    let count = names.len();
                    names.clear()?;
                    info!(entries = count, "Name cache cleared");
                }
            }
            Ok(())
        }
    }
}

async fn parse(file: Option<&Path>) -> Result<()> {
    let text = read_credits(file).await?;
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        for statement in parse_copyright_notice(line) {
            println!("{}", serde_json::to_string(&statement)?);
        }
    }
    Ok(())
}

async fn resolve(
    config: &TomlConfig,
    data_folder: &Path,
    text: &str,
    release: &str,
    recordings: &[String],
    auto: bool,
    remove_parsed: bool,
) -> Result<()> {
    let provider: Arc<dyn EntityProvider> = Arc::new(
        MusicBrainzClient::new(&config.musicbrainz).context("Failed to create MusicBrainz client")?,
    );
    let entities = Arc::new(entity_cache(Arc::clone(&provider)));
    let names = Arc::new(open_name_cache(data_folder)?);

    let source = fetch(&entities, release, "release").await?;
    let mut recording_entities = Vec::with_capacity(recordings.len());
    for mbid in recordings {
        recording_entities.push(fetch(&entities, mbid, "recording").await?);
    }

    let orchestrator = Orchestrator::new(
        source,
        Arc::clone(&entities),
        Arc::clone(&names),
        Arc::new(JsonLinesEditor::new(tokio::io::stdout())),
        Arc::new(SequentialIds::new()),
    )
    .with_recordings(recording_entities);

    let strategy: Box<dyn ResolutionStrategy> = if auto {
        Box::new(AutomaticResolution::new(Arc::clone(&provider)))
    } else {
        let surface = TerminalConfirmation::new(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stderr(),
            Arc::clone(&entities),
        )
        .with_suggestions(Arc::clone(&provider));
        Box::new(ManualResolution::new(Arc::new(surface)))
    };

    let report = process_credits(&orchestrator, text, strategy.as_ref()).await;

    info!(
        parsed = report.parsed_lines.len(),
        skipped = report.skipped_lines.len(),
        relationships_added = report.relationships_added,
        "Credits processed"
    );
    if !report.parsed_lines.is_empty() {
        eprintln!("\nParsed copyright notice:\n{}", report.edit_note_message());
    }
    if remove_parsed {
        eprintln!("\nRemaining credits:\n{}", report.remaining_text());
    }
    Ok(())
}

fn open_name_cache(data_folder: &Path) -> Result<MemoCache<(String, String), String>> {
    let store: Arc<dyn KeyValueStore> = Arc::new(
        JsonFileStore::in_folder(data_folder)
            .with_context(|| format!("Failed to open store in {}", data_folder.display()))?,
    );
    let names = name_cache(Some(store));
    names.load().context("Failed to load name cache")?;
    Ok(names)
}

async fn fetch(entities: &MemoCache<String, Entity>, mbid: &str, entity_type: &str) -> Result<Entity> {
    entities
        .get(mbid.to_string())
        .await
        .with_context(|| format!("Failed to fetch {} {}", entity_type, mbid))?
        .with_context(|| format!("Unknown {} {}", entity_type, mbid))
}

async fn read_credits(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}
