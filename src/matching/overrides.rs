// src/matching/overrides.rs

use log::{info, warn};

use crate::matching::candidate_index::CandidateIndex;
use crate::models::matching::{ManualOverride, MatchMethod, MatchResult, OverrideDecision};

/// Replay human decisions onto the automatic matches, strictly in input
/// order, so a later decision for the same LEED id supersedes an earlier one.
///
/// `match` forces confidence 100 and method `manual_review`, resolving the
/// NYC source id to its table position through the index; `reject` removes
/// any automatic match for that id; `skip` is recorded input with no effect.
pub fn apply_overrides(
    results: &mut Vec<MatchResult>,
    decisions: &[ManualOverride],
    index: &CandidateIndex,
) {
    if decisions.is_empty() {
        return;
    }
    info!("Applying {} manual mapping decisions", decisions.len());

    for decision in decisions {
        match decision.decision {
            OverrideDecision::Skip => {}
            OverrideDecision::Reject => {
                results.retain(|r| {
                    !(r.leed_source_id == decision.leed_source_id && r.is_matched())
                });
            }
            OverrideDecision::Match => {
                let nyc_index = index.position_of(&decision.nyc_source_id);
                if nyc_index.is_none() {
                    warn!(
                        "Manual match for {} names unknown NYC source id {}",
                        decision.leed_source_id, decision.nyc_source_id
                    );
                }
                let notes = if decision.notes.trim().is_empty() {
                    "manual override".to_string()
                } else {
                    decision.notes.clone()
                };
                match results
                    .iter_mut()
                    .find(|r| r.leed_source_id == decision.leed_source_id)
                {
                    Some(existing) => {
                        existing.nyc_index = nyc_index;
                        existing.match_confidence = 100;
                        existing.match_method = MatchMethod::ManualReview;
                        existing.match_notes = notes;
                    }
                    None => {
                        results.push(MatchResult {
                            leed_source_id: decision.leed_source_id.clone(),
                            nyc_index,
                            match_confidence: 100,
                            match_method: MatchMethod::ManualReview,
                            match_notes: notes,
                        });
                    }
                }
            }
        }
    }
}
