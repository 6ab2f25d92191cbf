// src/matching/review.rs

use std::collections::HashMap;

use log::info;

use crate::models::core::BuildingRecord;
use crate::models::matching::{MatchResult, ReviewQueueEntry};

/// Partition matcher output into the human review queue: matched results
/// below the confidence floor, then every unmatched record, in matcher
/// output order with no deduplication.
pub fn build_review_queue(
    results: &[MatchResult],
    leed_records: &[BuildingRecord],
    min_confidence: u8,
) -> Vec<ReviewQueueEntry> {
    let by_id: HashMap<&str, &BuildingRecord> = leed_records
        .iter()
        .map(|r| (r.source_id.as_str(), r))
        .collect();

    let low_confidence = results
        .iter()
        .filter(|r| r.is_matched() && r.match_confidence < min_confidence);
    let unmatched = results.iter().filter(|r| !r.is_matched());

    let queue: Vec<ReviewQueueEntry> = low_confidence
        .chain(unmatched)
        .map(|result| to_entry(result, by_id.get(result.leed_source_id.as_str()).copied()))
        .collect();

    info!(
        "Review queue built: {} entries (confidence floor {})",
        queue.len(),
        min_confidence
    );
    queue
}

fn to_entry(result: &MatchResult, record: Option<&BuildingRecord>) -> ReviewQueueEntry {
    ReviewQueueEntry {
        leed_source_id: result.leed_source_id.clone(),
        nyc_index: result.nyc_index,
        match_confidence: result.match_confidence,
        match_method: result.match_method,
        match_notes: result.match_notes.clone(),
        building_name_raw: record.map(|r| r.building_name_raw.clone()).unwrap_or_default(),
        address_raw: record.map(|r| r.address_raw.clone()).unwrap_or_default(),
        zip: record.map(|r| r.zip.clone()).unwrap_or_default(),
    }
}
