// src/matching/matcher.rs
//
// Tiered matching of LEED records against the candidate index. Strategies run
// in fixed priority order under a greedy ratchet: each tier is only attempted
// while the running confidence sits below that tier's ceiling, and only
// overwrites the best-so-far when it strictly improves it. Ties inside a tier
// resolve to the first candidate in NYC table order, which keeps runs
// deterministic.

use log::info;

use crate::matching::candidate_index::CandidateIndex;
use crate::matching::similarity::token_sort_ratio;
use crate::models::core::BuildingRecord;
use crate::models::matching::{MatchMethod, MatchResult};

/// Thresholds gating the fuzzy tiers and the review queue. Passed in at
/// matcher construction rather than read from ambient state.
#[derive(Debug, Clone, Copy)]
pub struct MatcherConfig {
    pub fuzzy_address_threshold: u8,
    pub fuzzy_name_threshold: u8,
    pub min_confidence: u8,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        MatcherConfig {
            fuzzy_address_threshold: 80,
            fuzzy_name_threshold: 75,
            min_confidence: 50,
        }
    }
}

pub struct Matcher<'a> {
    index: &'a CandidateIndex,
    config: MatcherConfig,
}

struct BestMatch {
    position: Option<usize>,
    confidence: u8,
    method: MatchMethod,
    notes: String,
}

impl<'a> Matcher<'a> {
    pub fn new(index: &'a CandidateIndex, config: MatcherConfig) -> Self {
        Matcher { index, config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn match_all(&self, records: &[BuildingRecord]) -> Vec<MatchResult> {
        info!(
            "Matching {} LEED records against {} NYC records",
            records.len(),
            self.index.len()
        );
        let results: Vec<MatchResult> = records.iter().map(|r| self.match_record(r)).collect();
        let matched = results.iter().filter(|r| r.is_matched()).count();
        info!(
            "Matching complete: {} matched, {} unmatched",
            matched,
            results.len() - matched
        );
        results
    }

    /// Run the tier ladder for one LEED record. Expects the record's `*_norm`
    /// fields to be populated; empty fields skip their tiers rather than fail.
    pub fn match_record(&self, record: &BuildingRecord) -> MatchResult {
        let bbl = record.bbl_norm.as_str();
        let bin = record.bin_norm.as_str();
        let addr = record.address_norm.as_str();
        let zip = record.zip_norm.as_str();
        let name = record.building_name_norm.as_str();
        let borough = record.borough_norm.as_str();

        let mut best = BestMatch {
            position: None,
            confidence: 0,
            method: MatchMethod::None,
            notes: String::new(),
        };

        // Tier 1: deterministic parcel ID
        if !bbl.is_empty() {
            if let Some(position) = self.index.lookup_bbl(bbl) {
                best = BestMatch {
                    position: Some(position),
                    confidence: 100,
                    method: MatchMethod::ExactParcel,
                    notes: format!("BBL={}", bbl),
                };
            }
        }

        // Tier 2: deterministic building ID
        if best.confidence < 100 && !bin.is_empty() {
            if let Some(position) = self.index.lookup_bin(bin) {
                best = BestMatch {
                    position: Some(position),
                    confidence: 100,
                    method: MatchMethod::ExactBuildingId,
                    notes: format!("BIN={}", bin),
                };
            }
        }

        // Tier 3: exact normalized address + ZIP
        if best.confidence < 95 && !addr.is_empty() && !zip.is_empty() {
            if let Some(position) = self.index.lookup_address_zip(addr, zip) {
                best = BestMatch {
                    position: Some(position),
                    confidence: 90,
                    method: MatchMethod::ExactAddressZip,
                    notes: format!("addr={}, zip={}", addr, zip),
                };
            }
        }

        // Tier 4: exact address without ZIP, borough-qualified when possible.
        // The scan stops at the first borough-qualified hit; otherwise the
        // first unqualified hit is remembered as a fallback.
        if best.confidence < 90 && !addr.is_empty() {
            let mut unqualified: Option<usize> = None;
            let mut qualified: Option<usize> = None;
            for entry in self.index.address_entries() {
                if entry.address != addr {
                    continue;
                }
                if !borough.is_empty() && entry.borough == borough {
                    qualified = Some(entry.position);
                    break;
                }
                if unqualified.is_none() {
                    unqualified = Some(entry.position);
                }
            }
            if let Some(position) = qualified {
                if best.confidence < 88 {
                    best = BestMatch {
                        position: Some(position),
                        confidence: 88,
                        method: MatchMethod::ExactAddressBorough,
                        notes: format!("addr={}, borough={}", addr, borough),
                    };
                }
            } else if let Some(position) = unqualified {
                if best.confidence < 85 {
                    best = BestMatch {
                        position: Some(position),
                        confidence: 85,
                        method: MatchMethod::ExactAddressNoZip,
                        notes: format!("addr={}", addr),
                    };
                }
            }
        }

        // Tier 5: fuzzy address, candidates bounded to the same ZIP (or the
        // same borough when the LEED record has no ZIP).
        if best.confidence < 80 && !addr.is_empty() {
            let threshold = self.config.fuzzy_address_threshold;
            let mut top: Option<(usize, f64, &str)> = None;
            for entry in self.index.address_entries() {
                let in_scope = if !zip.is_empty() {
                    entry.zip == zip
                } else if !borough.is_empty() {
                    entry.borough == borough
                } else {
                    false
                };
                if !in_scope {
                    continue;
                }
                let score = token_sort_ratio(addr, &entry.address);
                if score < threshold as f64 {
                    continue;
                }
                if top.map_or(true, |(_, best_score, _)| score > best_score) {
                    top = Some((entry.position, score, entry.address.as_str()));
                }
            }
            if let Some((position, score, candidate)) = top {
                let confidence = rescale_to_band(score, threshold, 70, 89);
                if confidence > best.confidence {
                    best = BestMatch {
                        position: Some(position),
                        confidence,
                        method: MatchMethod::FuzzyAddress,
                        notes: format!("score={:.0}, addr={}", score, candidate),
                    };
                }
            }
        }

        // Tier 6: fuzzy building name, candidates sharing ZIP or borough.
        if best.confidence < 70 && !name.is_empty() {
            let threshold = self.config.fuzzy_name_threshold;
            let mut top: Option<(usize, f64, &str)> = None;
            for entry in self.index.address_entries() {
                if entry.name.is_empty() {
                    continue;
                }
                let same_zip = !zip.is_empty() && entry.zip == zip;
                let same_borough = !borough.is_empty() && entry.borough == borough;
                if !same_zip && !same_borough {
                    continue;
                }
                let score = token_sort_ratio(name, &entry.name);
                if score < threshold as f64 {
                    continue;
                }
                if top.map_or(true, |(_, best_score, _)| score > best_score) {
                    top = Some((entry.position, score, entry.name.as_str()));
                }
            }
            if let Some((position, score, candidate)) = top {
                let confidence = rescale_to_band(score, threshold, 50, 69);
                if confidence > best.confidence {
                    best = BestMatch {
                        position: Some(position),
                        confidence,
                        method: MatchMethod::FuzzyName,
                        notes: format!("score={:.0}, name={}", score, candidate),
                    };
                }
            }
        }

        match best.position {
            Some(_) => MatchResult {
                leed_source_id: record.source_id.clone(),
                nyc_index: best.position,
                match_confidence: best.confidence,
                match_method: best.method,
                match_notes: best.notes,
            },
            None => MatchResult::unmatched(record.source_id.clone()),
        }
    }
}

/// Linearly rescale a raw similarity score (threshold..=100) onto the tier's
/// confidence band, clamped to the band bounds.
fn rescale_to_band(score: f64, threshold: u8, floor: u8, ceiling: u8) -> u8 {
    if threshold >= 100 {
        return ceiling;
    }
    let t = threshold as f64;
    let span = (ceiling - floor) as f64;
    let confidence = floor as f64 + (score - t) * span / (100.0 - t);
    confidence.clamp(floor as f64, ceiling as f64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_record;

    fn leed(id: &str) -> BuildingRecord {
        BuildingRecord {
            source_id: id.into(),
            ..Default::default()
        }
    }

    fn nyc(id: &str) -> BuildingRecord {
        leed(id)
    }

    fn match_one(a: BuildingRecord, b: Vec<BuildingRecord>) -> MatchResult {
        match_one_with(a, b, MatcherConfig::default())
    }

    fn match_one_with(
        a: BuildingRecord,
        b: Vec<BuildingRecord>,
        config: MatcherConfig,
    ) -> MatchResult {
        let index = CandidateIndex::build(&b);
        let matcher = Matcher::new(&index, config);
        matcher.match_record(&a)
    }

    #[test]
    fn identical_parcel_ids_match_at_100() {
        let mut a = leed("L1");
        a.bbl_norm = "1001234005".into();
        let mut b = nyc("N1");
        b.bbl_norm = "1001234005".into();

        let result = match_one(a, vec![b]);
        assert_eq!(result.nyc_index, Some(0));
        assert_eq!(result.match_confidence, 100);
        assert_eq!(result.match_method, MatchMethod::ExactParcel);
    }

    #[test]
    fn parcel_ties_break_to_first_table_position() {
        let mut a = leed("L1");
        a.bbl_norm = "1001234005".into();
        let mut b1 = nyc("N1");
        b1.bbl_norm = "1001234005".into();
        let mut b2 = nyc("N2");
        b2.bbl_norm = "1001234005".into();

        let result = match_one(a, vec![b1, b2]);
        assert_eq!(result.nyc_index, Some(0));
    }

    #[test]
    fn building_id_matches_when_parcel_misses() {
        let mut a = leed("L1");
        a.bbl_norm = "9999999999".into();
        a.bin_norm = "1087281".into();
        let mut b = nyc("N1");
        b.bbl_norm = "1001234005".into();
        b.bin_norm = "1087281".into();

        let result = match_one(a, vec![b]);
        assert_eq!(result.match_confidence, 100);
        assert_eq!(result.match_method, MatchMethod::ExactBuildingId);
    }

    #[test]
    fn raw_addresses_normalize_to_exact_address_zip_match() {
        let mut a = leed("L1");
        a.address_raw = "123 WEST 42 STREET".into();
        a.zip = "10036".into();
        normalize_record(&mut a);

        let mut b = nyc("N1");
        b.address_raw = "123 West 42nd St, Suite 500".into();
        b.zip = "10036".into();
        normalize_record(&mut b);
        assert_eq!(a.address_norm, "123 W 42 ST");
        assert_eq!(b.address_norm, "123 W 42 ST");

        let result = match_one(a, vec![b]);
        assert_eq!(result.match_confidence, 90);
        assert_eq!(result.match_method, MatchMethod::ExactAddressZip);
    }

    #[test]
    fn address_match_with_same_borough_scores_88() {
        let mut a = leed("L1");
        a.address_norm = "100 MAIN ST".into();
        a.borough_norm = "MANHATTAN".into();
        let mut b = nyc("N1");
        b.address_norm = "100 MAIN ST".into();
        b.zip_norm = "10001".into();
        b.borough_norm = "MANHATTAN".into();

        let result = match_one(a, vec![b]);
        assert_eq!(result.match_confidence, 88);
        assert_eq!(result.match_method, MatchMethod::ExactAddressBorough);
    }

    #[test]
    fn address_match_without_borough_scores_85() {
        let mut a = leed("L1");
        a.address_norm = "100 MAIN ST".into();
        a.borough_norm = "MANHATTAN".into();
        let mut b = nyc("N1");
        b.address_norm = "100 MAIN ST".into();
        b.borough_norm = "BROOKLYN".into();

        let result = match_one(a, vec![b]);
        assert_eq!(result.match_confidence, 85);
        assert_eq!(result.match_method, MatchMethod::ExactAddressNoZip);
    }

    #[test]
    fn borough_qualified_candidate_beats_earlier_unqualified_one() {
        let mut a = leed("L1");
        a.address_norm = "100 MAIN ST".into();
        a.borough_norm = "MANHATTAN".into();
        let mut b1 = nyc("N1");
        b1.address_norm = "100 MAIN ST".into();
        b1.borough_norm = "BROOKLYN".into();
        let mut b2 = nyc("N2");
        b2.address_norm = "100 MAIN ST".into();
        b2.borough_norm = "MANHATTAN".into();

        let result = match_one(a, vec![b1, b2]);
        assert_eq!(result.nyc_index, Some(1));
        assert_eq!(result.match_confidence, 88);
        assert_eq!(result.match_method, MatchMethod::ExactAddressBorough);
    }

    #[test]
    fn fuzzy_address_lands_in_its_band() {
        let mut a = leed("L1");
        a.address_norm = "123 W 42 ST".into();
        a.zip_norm = "10036".into();
        let mut b = nyc("N1");
        b.address_norm = "123 W 43 ST".into();
        b.zip_norm = "10036".into();

        let result = match_one(a, vec![b]);
        assert_eq!(result.match_method, MatchMethod::FuzzyAddress);
        assert!(
            (70..=89).contains(&result.match_confidence),
            "confidence {} outside fuzzy address band",
            result.match_confidence
        );
    }

    #[test]
    fn fuzzy_address_ignores_candidates_in_other_zips() {
        let mut a = leed("L1");
        a.address_norm = "123 W 42 ST".into();
        a.zip_norm = "10036".into();
        let mut b = nyc("N1");
        b.address_norm = "123 W 42 ST E".into();
        b.zip_norm = "11201".into();

        let result = match_one(a, vec![b]);
        assert!(!result.is_matched());
    }

    #[test]
    fn fuzzy_address_uses_borough_scope_when_zip_missing() {
        let mut a = leed("L1");
        a.address_norm = "123 W 42 ST".into();
        a.borough_norm = "MANHATTAN".into();
        let mut b = nyc("N1");
        b.address_norm = "123 W 43 ST".into();
        b.zip_norm = "10036".into();
        b.borough_norm = "MANHATTAN".into();

        let result = match_one(a, vec![b]);
        assert_eq!(result.match_method, MatchMethod::FuzzyAddress);
    }

    #[test]
    fn perfect_fuzzy_name_scores_top_of_band() {
        let mut a = leed("L1");
        a.building_name_norm = "ACME TOWER".into();
        a.zip_norm = "10036".into();
        let mut b = nyc("N1");
        b.address_norm = "99 BROADWAY".into();
        b.zip_norm = "10036".into();
        b.building_name_norm = "ACME TOWER".into();

        let result = match_one(a, vec![b]);
        assert_eq!(result.match_method, MatchMethod::FuzzyName);
        assert_eq!(result.match_confidence, 69);
    }

    #[test]
    fn fuzzy_name_respects_threshold() {
        let mut a = leed("L1");
        a.building_name_norm = "ACME TOWER".into();
        a.zip_norm = "10036".into();
        let mut b = nyc("N1");
        b.address_norm = "99 BROADWAY".into();
        b.zip_norm = "10036".into();
        b.building_name_norm = "ACME TOWER".into();

        let config = MatcherConfig {
            fuzzy_name_threshold: 100,
            ..Default::default()
        };
        let result = match_one_with(a, vec![b], config);
        // Exactly at a threshold of 100 the score still qualifies.
        assert_eq!(result.match_method, MatchMethod::FuzzyName);
        assert_eq!(result.match_confidence, 69);
    }

    #[test]
    fn record_with_no_usable_fields_is_unmatched() {
        let a = leed("L1");
        let mut b = nyc("N1");
        b.address_norm = "1 MAIN ST".into();
        b.zip_norm = "10001".into();

        let result = match_one(a, vec![b]);
        assert!(!result.is_matched());
        assert_eq!(result.match_confidence, 0);
        assert_eq!(result.match_method, MatchMethod::None);
        assert_eq!(result.match_notes, "No match found");
    }

    #[test]
    fn confidence_stays_in_domain_across_tiers() {
        let mut a = leed("L1");
        a.address_norm = "123 W 42 ST".into();
        a.zip_norm = "10036".into();
        a.building_name_norm = "ACME TOWER".into();
        let mut b1 = nyc("N1");
        b1.address_norm = "123 W 43 ST".into();
        b1.zip_norm = "10036".into();
        let mut b2 = nyc("N2");
        b2.address_norm = "500 OCEAN PKWY".into();
        b2.zip_norm = "10036".into();
        b2.building_name_norm = "ACME TOWERS".into();

        let result = match_one(a, vec![b1, b2]);
        assert!(result.match_confidence <= 100);
        let (floor, ceiling) = result.match_method.band();
        assert!(result.match_confidence >= floor);
        assert!(result.match_confidence <= ceiling);
    }

    #[test]
    fn equal_fuzzy_scores_keep_first_candidate() {
        let mut a = leed("L1");
        a.address_norm = "123 W 42 ST".into();
        a.zip_norm = "10036".into();
        let mut b1 = nyc("N1");
        b1.address_norm = "123 W 43 ST".into();
        b1.zip_norm = "10036".into();
        let b2 = b1.clone();

        let result = match_one(a, vec![b1, b2]);
        assert_eq!(result.nyc_index, Some(0));
    }

    #[test]
    fn rescale_maps_threshold_to_floor_and_100_to_ceiling() {
        assert_eq!(rescale_to_band(80.0, 80, 70, 89), 70);
        assert_eq!(rescale_to_band(100.0, 80, 70, 89), 89);
        assert_eq!(rescale_to_band(90.0, 80, 70, 89), 79);
        assert_eq!(rescale_to_band(75.0, 75, 50, 69), 50);
        assert_eq!(rescale_to_band(100.0, 75, 50, 69), 69);
    }
}
