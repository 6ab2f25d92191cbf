// src/io.rs
//
// CSV load/save glue around the in-memory core. The matcher and table
// builder never touch disk; everything file-shaped lives here.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::core::{BenchmarkRecord, BuildingRecord, EmissionsRecord};
use crate::models::matching::ManualOverride;

pub fn load_building_records(path: &Path) -> Result<Vec<BuildingRecord>> {
    load_csv(path)
}

pub fn load_emissions_records(path: &Path) -> Result<Vec<EmissionsRecord>> {
    load_csv(path)
}

pub fn load_benchmark_records(path: &Path) -> Result<Vec<BenchmarkRecord>> {
    load_csv(path)
}

fn load_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let rows: Vec<T> = reader
        .deserialize()
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Manual override decisions are optional input: a missing file is a logged
/// no-op and a malformed file logs a warning and leaves the matched set
/// unchanged. Neither aborts the run.
pub fn load_manual_overrides(path: &Path) -> Vec<ManualOverride> {
    if !path.exists() {
        info!("No manual mapping file found at {}", path.display());
        return Vec::new();
    }
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(err) => {
            warn!("Could not open manual mapping file {}: {}", path.display(), err);
            return Vec::new();
        }
    };
    match parse_overrides(file) {
        Ok(decisions) => {
            info!(
                "Loaded {} manual mapping decisions from {}",
                decisions.len(),
                path.display()
            );
            decisions
        }
        Err(err) => {
            warn!(
                "Ignoring malformed manual mapping file {}: {:#}",
                path.display(),
                err
            );
            Vec::new()
        }
    }
}

pub fn parse_overrides<R: Read>(reader: R) -> Result<Vec<ManualOverride>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let decisions: Vec<ManualOverride> = csv_reader
        .deserialize()
        .collect::<std::result::Result<_, _>>()
        .context("Failed to parse manual mapping rows")?;
    Ok(decisions)
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to open {} for writing", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!("Saved {} rows to {}", rows.len(), path.display());
    Ok(())
}
