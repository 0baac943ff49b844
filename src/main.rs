use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use topic_graph_engine::config::{Config, LogFormat};
use topic_graph_engine::layout::layout_visible_components;
use topic_graph_engine::migrate::migrate;
use topic_graph_engine::TopicDocument;

/// Maintenance tooling for persisted topic documents.
#[derive(Debug, Parser)]
#[command(name = "topic-graph-engine", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Migrate a persisted document to the current schema.
    Migrate {
        /// Path to the persisted JSON document.
        file: PathBuf,
        /// Where to write the migrated document (defaults to stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate that a document matches the current schema.
    Validate {
        /// Path to the persisted JSON document.
        file: PathBuf,
    },
    /// Re-lay-out every diagram in a current-schema document.
    Layout {
        /// Path to the persisted JSON document.
        file: PathBuf,
        /// Where to write the laid-out document (defaults to stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_logging(&config);

    let cli = Cli::parse();
    if let Err(e) = run(cli.command, &config) {
        error!(error = %e, "Command failed");
        return Err(e);
    }
    Ok(())
}

fn run(command: Command, config: &Config) -> anyhow::Result<()> {
    match command {
        Command::Migrate { file, output } => {
            let document = load_and_migrate(&file)?;
            info!(version = document.version, "Document migrated");
            write_document(&document, output)
        }
        Command::Validate { file } => {
            let document = load_and_migrate(&file)?;
            info!(
                diagrams = document.diagrams.len(),
                version = document.version,
                "Document is valid"
            );
            Ok(())
        }
        Command::Layout { file, output } => {
            let mut document = load_and_migrate(&file)?;
            for diagram in document.diagrams.values_mut() {
                layout_visible_components(diagram, &config.layout);
            }
            info!(diagrams = document.diagrams.len(), "Diagrams laid out");
            write_document(&document, output)
        }
    }
}

fn load_and_migrate(file: &PathBuf) -> anyhow::Result<TopicDocument> {
    let raw = fs::read_to_string(file)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    let version = value
        .get("version")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(0) as u32;
    Ok(migrate(value, version)?)
}

fn write_document(document: &TopicDocument, output: Option<PathBuf>) -> anyhow::Result<()> {
    let serialized = serde_json::to_string_pretty(document)?;
    match output {
        Some(path) => fs::write(path, serialized)?,
        None => println!("{}", serialized),
    }
    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
