use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use linkage_lib::io;
use linkage_lib::master_table::build_master_table;
use linkage_lib::matching::{apply_overrides, build_review_queue, CandidateIndex, Matcher, MatcherConfig};
use linkage_lib::models::{MatchResult, MatchRunStats};
use linkage_lib::normalize::normalize_record;
use log::info;
use uuid::Uuid;

/// Match LEED certified buildings against NYC energy and emissions registries.
#[derive(Debug, Parser)]
#[command(name = "match_buildings")]
struct Cli {
    /// Cleaned LEED registry CSV
    #[arg(long)]
    leed: PathBuf,

    /// Cleaned NYC energy grades CSV
    #[arg(long)]
    nyc: PathBuf,

    /// LL97 emissions CSV, joined by BBL
    #[arg(long)]
    ll97: Option<PathBuf>,

    /// Secondary benchmarking CSV, used to backfill empty columns
    #[arg(long)]
    benchmarking: Option<PathBuf>,

    /// Manual mapping decisions CSV (match/reject/skip)
    #[arg(long)]
    manual_mapping: Option<PathBuf>,

    /// Directory for the output tables
    #[arg(long, default_value = "data/matched")]
    out_dir: PathBuf,

    #[arg(long, default_value_t = 80)]
    fuzzy_address_threshold: u8,

    #[arg(long, default_value_t = 75)]
    fuzzy_name_threshold: u8,

    #[arg(long, default_value_t = 50)]
    min_confidence: u8,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let run_id = Uuid::new_v4().to_string();
    let run_timestamp = Utc::now();
    let started = Instant::now();
    info!("Starting building matching run {}", run_id);

    let mut leed_records =
        io::load_building_records(&cli.leed).context("Failed to load LEED records")?;
    let mut nyc_records =
        io::load_building_records(&cli.nyc).context("Failed to load NYC records")?;
    let emissions = match &cli.ll97 {
        Some(path) => io::load_emissions_records(path).context("Failed to load LL97 records")?,
        None => Vec::new(),
    };
    let supplement = match &cli.benchmarking {
        Some(path) => {
            io::load_benchmark_records(path).context("Failed to load benchmarking records")?
        }
        None => Vec::new(),
    };

    // Idempotent, so already-cleaned inputs pass through unchanged.
    for record in leed_records.iter_mut() {
        normalize_record(record);
    }
    for record in nyc_records.iter_mut() {
        normalize_record(record);
    }

    let index = CandidateIndex::build(&nyc_records);
    let config = MatcherConfig {
        fuzzy_address_threshold: cli.fuzzy_address_threshold,
        fuzzy_name_threshold: cli.fuzzy_name_threshold,
        min_confidence: cli.min_confidence,
    };
    let matcher = Matcher::new(&index, config);

    info!(
        "Matching {} LEED records against {} NYC records",
        leed_records.len(),
        index.len()
    );
    let progress = ProgressBar::new(leed_records.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress.set_message("matching buildings");
    let mut results: Vec<MatchResult> = leed_records
        .iter()
        .map(|record| {
            let result = matcher.match_record(record);
            progress.inc(1);
            result
        })
        .collect();
    progress.finish_and_clear();

    let matched = results.iter().filter(|r| r.is_matched()).count();
    let review_queue = build_review_queue(&results, &leed_records, config.min_confidence);
    info!(
        "Matching complete: {} matched, {} unmatched, {} in review queue",
        matched,
        results.len() - matched,
        review_queue.len()
    );

    if let Some(path) = &cli.manual_mapping {
        let decisions = io::load_manual_overrides(path);
        apply_overrides(&mut results, &decisions, &index);
    }

    let master = build_master_table(&results, &leed_records, &nyc_records, &emissions, &supplement);

    io::write_csv(&cli.out_dir.join("master_matched.csv"), &master)?;
    io::write_csv(&cli.out_dir.join("review_queue.csv"), &review_queue)?;
    io::write_csv(&cli.out_dir.join("matched_results.csv"), &results)?;

    let stats = MatchRunStats::from_results(&run_id, run_timestamp, &results, review_queue.len());
    let stats_path = cli.out_dir.join("match_stats.json");
    std::fs::write(&stats_path, serde_json::to_string_pretty(&stats)?)
        .with_context(|| format!("Failed to write {}", stats_path.display()))?;
    info!("Saved run statistics to {}", stats_path.display());

    info!(
        "Run {} finished: {} master rows in {:.1}s",
        run_id,
        master.len(),
        started.elapsed().as_secs_f64()
    );
    Ok(())
}
