//! Loading the survey tables named on the command line.

use anyhow::Context;
use clap::Args;
use hab_data::pipeline::Dataset;
use hab_db::Database;
use log::info;
use std::path::Path;

/// Where the habitat and stream tables are read from.
#[derive(Args, Debug, Clone)]
pub struct DataSource {
    /// Habitat observations CSV
    #[arg(long, default_value = "fixtures/habitat.csv")]
    pub habitat_csv: String,

    /// Stream geometry CSV (only read by the streams command)
    #[arg(long, default_value = "fixtures/streams.csv")]
    pub streams_csv: String,
}

fn read(path: &str) -> anyhow::Result<String> {
    if !Path::new(path).exists() {
        anyhow::bail!("{} not found", path);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path))
}

impl DataSource {
    /// Open a database holding the habitat table.
    pub fn habitat_db(&self) -> anyhow::Result<Database> {
        let db = Database::new()?;
        db.load_habitat(&read(&self.habitat_csv)?)
            .with_context(|| format!("failed to load {}", self.habitat_csv))?;
        Ok(db)
    }

    /// Open a database holding the stream geometry.
    pub fn streams_db(&self) -> anyhow::Result<Database> {
        let db = Database::new()?;
        db.load_streams(&read(&self.streams_csv)?)
            .with_context(|| format!("failed to load {}", self.streams_csv))?;
        Ok(db)
    }
}

/// Snapshot the store into the immutable dataset the pipeline runs on.
pub fn snapshot(db: &Database) -> anyhow::Result<Dataset> {
    let observations = db.query_all_observations()?;
    let trend_table = db.query_trend_table(None)?;
    info!(
        "Dataset snapshot: {} observations, {} trend series",
        observations.len(),
        trend_table.len()
    );
    Ok(Dataset::with_trend_table(observations, trend_table))
}
