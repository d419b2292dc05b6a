//! `clinyx`: extract clinical entities from note files and print JSON.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use clinyx_common::EngineConfig;
use clinyx_ner::{CodeRegistry, Document, ExtractionEngine, Normaliser};

/// Pattern-based clinical entity extraction
#[derive(Parser)]
#[command(name = "clinyx", author, version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Engine config file (defaults to $CLINYX_CONFIG, then ./clinyx.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print single-line JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract entities from one note file
    Extract {
        file: PathBuf,

        /// Document id for the result (defaults to the file stem)
        #[arg(long)]
        id: Option<String>,
    },

    /// Extract entities from several note files concurrently
    Batch {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the normalized form of a term and its codes
    Normalize { text: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::load_default().context("loading default config")?,
    };
    debug!(?config, "Engine config");

    match cli.command {
        Commands::Extract { file, id } => {
            let engine = engine(config)?;
            let text = read_note(&file)?;
            let id = id.unwrap_or_else(|| file_stem(&file));
            let result = engine.extract_entities(&text, Some(&id))?;
            info!(
                document = %id,
                entities = result.entities.len(),
                "Extracted {}",
                file.display()
            );
            print_json(&result, cli.compact)?;
        }
        Commands::Batch { files } => {
            let engine = engine(config)?;
            let documents = files
                .iter()
                .map(|path| Ok(Document::new(file_stem(path), read_note(path)?)))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let results = engine.batch_extract_entities(documents).await;
            print_json(&results, cli.compact)?;
        }
        Commands::Normalize { text } => {
            let normaliser = Normaliser::builtin()?;
            let normalized = normaliser.normalize(&text);
            let codes = normaliser.attach_codes(&CodeRegistry::builtin(), &normalized);
            let output = serde_json::json!({
                "input": text,
                "normalized": normalized,
                "codes": codes,
            });
            print_json(&output, cli.compact)?;
        }
    }

    Ok(())
}

fn engine(config: EngineConfig) -> anyhow::Result<ExtractionEngine> {
    let engine = ExtractionEngine::new(config);
    engine.initialize().context("initializing extraction engine")?;
    Ok(engine)
}

fn read_note(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> anyhow::Result<()> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", json);
    Ok(())
}
