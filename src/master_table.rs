// src/master_table.rs
//
// Joins the (overridden) match results back to the full LEED, NYC, LL97, and
// benchmarking field sets, producing one denormalized row per surviving match
// result. Pure function of its input tables; re-running regenerates the whole
// table.

use std::collections::HashMap;

use log::info;

use crate::models::core::{BenchmarkRecord, BuildingRecord, EmissionsRecord, SourceName};
use crate::models::matching::{MatchMethod, MatchResult};
use crate::normalize::normalize_bbl;
use serde::{Deserialize, Serialize};

/// One row of the fixed 20-column output contract. Every column exists even
/// when never populated; `None` serializes as the empty sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterRecord {
    pub source_id: String,
    pub source_name: SourceName,
    pub building_name_raw: String,
    pub address_raw: String,
    pub address_norm: String,
    pub bbl: String,
    pub bin: String,
    pub borough: String,
    pub zip: String,
    pub leed_level: Option<String>,
    pub leed_cert_year: Option<i32>,
    pub energy_grade: Option<String>,
    pub energy_star_score: Option<f64>,
    pub site_eui: Option<f64>,
    pub ghg_emissions_tco2e: Option<f64>,
    pub ll97_limit_tco2e: Option<f64>,
    pub ll97_overage_tco2e: Option<f64>,
    pub match_confidence: u8,
    pub match_method: MatchMethod,
    pub match_notes: String,
}

pub fn build_master_table(
    results: &[MatchResult],
    leed_records: &[BuildingRecord],
    nyc_records: &[BuildingRecord],
    emissions: &[EmissionsRecord],
    supplement: &[BenchmarkRecord],
) -> Vec<MasterRecord> {
    let leed_by_id: HashMap<&str, &BuildingRecord> = leed_records
        .iter()
        .map(|r| (r.source_id.as_str(), r))
        .collect();

    // Emissions deduplicated by normalized BBL, first occurrence wins.
    let mut emissions_by_bbl: HashMap<String, &EmissionsRecord> = HashMap::new();
    for record in emissions {
        let key = normalize_bbl(&record.bbl);
        if !key.is_empty() {
            emissions_by_bbl.entry(key).or_insert(record);
        }
    }
    let mut supplement_by_bbl: HashMap<String, &BenchmarkRecord> = HashMap::new();
    for record in supplement {
        let key = normalize_bbl(&record.bbl);
        if !key.is_empty() {
            supplement_by_bbl.entry(key).or_insert(record);
        }
    }

    let mut rows = Vec::with_capacity(results.len());
    let mut row_bbls = Vec::with_capacity(results.len());

    for result in results {
        let leed = leed_by_id.get(result.leed_source_id.as_str()).copied();
        let nyc = result.nyc_index.and_then(|i| nyc_records.get(i));

        // Matched NYC parcel id is the better emissions join key; fall back
        // to the LEED side when the match carries none.
        let bbl_key = match nyc {
            Some(n) if !n.bbl_norm.is_empty() => n.bbl_norm.clone(),
            _ => leed.map(|l| l.bbl_norm.clone()).unwrap_or_default(),
        };
        let ll97 = emissions_by_bbl.get(bbl_key.as_str()).copied();

        let pick = |leed_val: Option<&str>, nyc_val: Option<&str>| -> String {
            match leed_val {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => nyc_val.unwrap_or_default().to_string(),
            }
        };

        rows.push(MasterRecord {
            source_id: result.leed_source_id.clone(),
            source_name: leed.map(|l| l.source_name).unwrap_or(SourceName::Leed),
            building_name_raw: leed.map(|l| l.building_name_raw.clone()).unwrap_or_default(),
            address_raw: leed.map(|l| l.address_raw.clone()).unwrap_or_default(),
            address_norm: leed.map(|l| l.address_norm.clone()).unwrap_or_default(),
            bbl: pick(
                leed.map(|l| l.bbl.as_str()),
                nyc.map(|n| n.bbl.as_str()),
            ),
            bin: pick(
                leed.map(|l| l.bin.as_str()),
                nyc.map(|n| n.bin.as_str()),
            ),
            borough: pick(
                leed.map(|l| l.borough.as_str()),
                nyc.map(|n| n.borough.as_str()),
            ),
            zip: pick(leed.map(|l| l.zip.as_str()), nyc.map(|n| n.zip.as_str())),
            leed_level: leed.and_then(|l| l.leed_level.clone()),
            leed_cert_year: leed.and_then(|l| l.leed_cert_year),
            energy_grade: nyc.and_then(|n| n.energy_grade.clone()),
            energy_star_score: nyc.and_then(|n| n.energy_star_score),
            site_eui: nyc.and_then(|n| n.site_eui),
            ghg_emissions_tco2e: ll97.and_then(|e| e.ghg_emissions_tco2e),
            ll97_limit_tco2e: ll97.and_then(|e| e.ll97_limit_tco2e),
            ll97_overage_tco2e: ll97.and_then(|e| e.ll97_overage_tco2e),
            match_confidence: result.match_confidence,
            match_method: result.match_method,
            match_notes: result.match_notes.clone(),
        });
        row_bbls.push(bbl_key);
    }

    backfill_from_supplement(&mut rows, &row_bbls, &supplement_by_bbl);

    info!("Master table built: {} rows", rows.len());
    rows
}

/// The secondary benchmarking source only fills contract columns the primary
/// joins left entirely empty; a column with any value at all keeps precedence.
fn backfill_from_supplement(
    rows: &mut [MasterRecord],
    row_bbls: &[String],
    supplement_by_bbl: &HashMap<String, &BenchmarkRecord>,
) {
    if supplement_by_bbl.is_empty() {
        return;
    }

    let score_empty = rows.iter().all(|r| r.energy_star_score.is_none());
    let eui_empty = rows.iter().all(|r| r.site_eui.is_none());
    let ghg_empty = rows.iter().all(|r| r.ghg_emissions_tco2e.is_none());
    if !score_empty && !eui_empty && !ghg_empty {
        return;
    }

    for (row, bbl) in rows.iter_mut().zip(row_bbls) {
        if let Some(bench) = supplement_by_bbl.get(bbl.as_str()) {
            if score_empty {
                row.energy_star_score = bench.energy_star_score;
            }
            if eui_empty {
                row.site_eui = bench.site_eui;
            }
            if ghg_empty {
                row.ghg_emissions_tco2e = bench.ghg_emissions_tco2e;
            }
        }
    }
}
