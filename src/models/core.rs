// src/models/core.rs

use serde::{Deserialize, Serialize};

/// Tag identifying which registry a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SourceName {
    #[default]
    #[serde(rename = "LEED")]
    Leed,
    #[serde(rename = "NYC_ENERGY_GRADES")]
    NycEnergyGrades,
    #[serde(rename = "NYC_BENCHMARKING")]
    NycBenchmarking,
    #[serde(rename = "NYC_LL97")]
    NycLl97,
}

impl SourceName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceName::Leed => "LEED",
            SourceName::NycEnergyGrades => "NYC_ENERGY_GRADES",
            SourceName::NycBenchmarking => "NYC_BENCHMARKING",
            SourceName::NycLl97 => "NYC_LL97",
        }
    }
}

/// One row from either source table. The `*_norm` fields are derived by the
/// normalizer and never hand-edited; an empty string means "no usable value".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildingRecord {
    pub source_id: String,
    #[serde(default)]
    pub source_name: SourceName,
    #[serde(default)]
    pub building_name_raw: String,
    #[serde(default)]
    pub address_raw: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub bbl: String,
    #[serde(default)]
    pub bin: String,
    #[serde(default)]
    pub borough: String,

    #[serde(default)]
    pub address_norm: String,
    #[serde(default)]
    pub zip_norm: String,
    #[serde(default)]
    pub bbl_norm: String,
    #[serde(default)]
    pub bin_norm: String,
    #[serde(default)]
    pub borough_norm: String,
    #[serde(default)]
    pub building_name_norm: String,

    // LEED-side attributes
    #[serde(default)]
    pub leed_level: Option<String>,
    #[serde(default)]
    pub leed_cert_year: Option<i32>,

    // NYC-side attributes
    #[serde(default)]
    pub energy_grade: Option<String>,
    #[serde(default)]
    pub energy_star_score: Option<f64>,
    #[serde(default)]
    pub site_eui: Option<f64>,
}

/// One row from the LL97 emissions dataset, joined into the master table by
/// parcel ID (BBL).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmissionsRecord {
    #[serde(default)]
    pub bbl: String,
    #[serde(default)]
    pub ghg_emissions_tco2e: Option<f64>,
    #[serde(default)]
    pub ll97_limit_tco2e: Option<f64>,
    #[serde(default)]
    pub ll97_overage_tco2e: Option<f64>,
}

/// One row from the secondary benchmarking dataset. Only consulted for master
/// table columns the primary emissions join left entirely empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    #[serde(default)]
    pub bbl: String,
    #[serde(default)]
    pub energy_star_score: Option<f64>,
    #[serde(default)]
    pub site_eui: Option<f64>,
    #[serde(default)]
    pub ghg_emissions_tco2e: Option<f64>,
}
