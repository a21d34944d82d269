//! Shelf Inspect - load a saved catalog and print reports about it.
//!
//! The file is restored through the same validating path the engine uses for
//! any restore, so a file that loads here will load anywhere.

mod config;
mod error;
mod report;

use crate::config::{Config, Format};
use crate::error::{AppError, Result};
use shelf_engine::{Library, SnapshotMetadata};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shelf_inspect=info,shelf_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    run(&config)?;
    Ok(())
}

fn run(config: &Config) -> Result<()> {
    tracing::info!("Loading {}", config.data_file.display());
    let library = load(&config.data_file, config.format)?;

    let metadata = SnapshotMetadata::from(&library.snapshot());
    tracing::info!(
        "Loaded {} records and {} collections ({} memberships, highest id {})",
        metadata.record_count,
        metadata.collection_count,
        metadata.membership_slots,
        metadata.max_id
    );

    let stdout = io::stdout();
    report::write_report(&library, config.report, stdout.lock())
        .map_err(|e| AppError::io(Path::new("<stdout>"), e))?;

    if let Some(path) = &config.export {
        export(&library, path)?;
        tracing::info!("Exported to {}", path.display());
    }

    Ok(())
}

fn load(path: &Path, format: Format) -> Result<Library> {
    let mut library = Library::new();
    match format {
        Format::Text => {
            let file = File::open(path).map_err(|e| AppError::io(path, e))?;
            library.restore_text(BufReader::new(file))?;
        }
        Format::Json => {
            let json = fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
            library.restore_json(&json)?;
        }
    }
    Ok(library)
}

fn export(library: &Library, path: &Path) -> Result<()> {
    match Format::for_path(path) {
        Format::Text => {
            let file = File::create(path).map_err(|e| AppError::io(path, e))?;
            library.save_text(BufWriter::new(file))?;
        }
        Format::Json => {
            let json = library.save_json()?;
            fs::write(path, json).map_err(|e| AppError::io(path, e))?;
        }
    }
    Ok(())
}
