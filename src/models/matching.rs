// src/models/matching.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of match methods. Each method owns a fixed confidence band;
/// `band()` is the single place tier priorities live, so adding a method
/// without slotting it into the ladder fails the monotonicity test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    ExactParcel,
    ExactBuildingId,
    ExactAddressZip,
    ExactAddressBorough,
    ExactAddressNoZip,
    FuzzyAddress,
    FuzzyName,
    ManualReview,
    None,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::ExactParcel => "exact_parcel",
            MatchMethod::ExactBuildingId => "exact_building_id",
            MatchMethod::ExactAddressZip => "exact_address_zip",
            MatchMethod::ExactAddressBorough => "exact_address_borough",
            MatchMethod::ExactAddressNoZip => "exact_address_no_zip",
            MatchMethod::FuzzyAddress => "fuzzy_address",
            MatchMethod::FuzzyName => "fuzzy_name",
            MatchMethod::ManualReview => "manual_review",
            MatchMethod::None => "none",
        }
    }

    /// Inclusive (floor, ceiling) confidence band for this method.
    pub fn band(&self) -> (u8, u8) {
        match self {
            MatchMethod::ExactParcel => (100, 100),
            MatchMethod::ExactBuildingId => (100, 100),
            MatchMethod::ExactAddressZip => (90, 90),
            MatchMethod::ExactAddressBorough => (88, 88),
            MatchMethod::ExactAddressNoZip => (85, 85),
            MatchMethod::FuzzyAddress => (70, 89),
            MatchMethod::FuzzyName => (50, 69),
            MatchMethod::ManualReview => (100, 100),
            MatchMethod::None => (0, 0),
        }
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Best match for one LEED record. `nyc_index` is the position of the chosen
/// candidate in the NYC table snapshot; `None` means unmatched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub leed_source_id: String,
    pub nyc_index: Option<usize>,
    pub match_confidence: u8,
    pub match_method: MatchMethod,
    pub match_notes: String,
}

impl MatchResult {
    pub fn unmatched(leed_source_id: String) -> Self {
        MatchResult {
            leed_source_id,
            nyc_index: None,
            match_confidence: 0,
            match_method: MatchMethod::None,
            match_notes: "No match found".to_string(),
        }
    }

    pub fn is_matched(&self) -> bool {
        self.nyc_index.is_some()
    }
}

/// A match too uncertain for automatic acceptance, carrying enough of the
/// LEED record for a human to triage it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewQueueEntry {
    pub leed_source_id: String,
    pub nyc_index: Option<usize>,
    pub match_confidence: u8,
    pub match_method: MatchMethod,
    pub match_notes: String,
    pub building_name_raw: String,
    pub address_raw: String,
    pub zip: String,
}

/// Human decision replayed onto the automatic matches. Modeled as a closed
/// enum so an invalid decision is a parse-time error, not a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrideDecision {
    Match,
    Reject,
    Skip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualOverride {
    pub leed_source_id: String,
    #[serde(default)]
    pub nyc_source_id: String,
    pub decision: OverrideDecision,
    #[serde(default)]
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_bands_are_monotone_down_the_ladder() {
        let ladder = [
            MatchMethod::ExactParcel,
            MatchMethod::ExactBuildingId,
            MatchMethod::ExactAddressZip,
            MatchMethod::ExactAddressBorough,
            MatchMethod::ExactAddressNoZip,
            MatchMethod::FuzzyAddress,
            MatchMethod::FuzzyName,
            MatchMethod::None,
        ];
        for pair in ladder.windows(2) {
            let (hi_floor, _) = pair[0].band();
            let (lo_floor, _) = pair[1].band();
            assert!(
                hi_floor >= lo_floor,
                "{} floor below {} floor",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn bands_stay_inside_confidence_domain() {
        for method in [
            MatchMethod::ExactParcel,
            MatchMethod::ExactBuildingId,
            MatchMethod::ExactAddressZip,
            MatchMethod::ExactAddressBorough,
            MatchMethod::ExactAddressNoZip,
            MatchMethod::FuzzyAddress,
            MatchMethod::FuzzyName,
            MatchMethod::ManualReview,
            MatchMethod::None,
        ] {
            let (floor, ceiling) = method.band();
            assert!(floor <= ceiling);
            assert!(ceiling <= 100);
        }
    }

    #[test]
    fn decision_parses_only_known_values() {
        let parsed: OverrideDecision = serde_json::from_str("\"reject\"").unwrap();
        assert_eq!(parsed, OverrideDecision::Reject);
        assert!(serde_json::from_str::<OverrideDecision>("\"maybe\"").is_err());
    }
}
