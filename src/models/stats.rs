// src/models/stats.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::matching::{MatchMethod, MatchResult};

#[derive(Debug, Clone, Serialize)]
pub struct MatchMethodStats {
    pub method: MatchMethod,
    pub count: usize,
    pub avg_confidence: f64,
}

/// Per-run summary written alongside the output tables.
#[derive(Debug, Clone, Serialize)]
pub struct MatchRunStats {
    pub run_id: String,
    pub run_timestamp: DateTime<Utc>,
    pub total_records: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub review_queue_size: usize,
    pub method_stats: Vec<MatchMethodStats>,
}

impl MatchRunStats {
    pub fn from_results(
        run_id: &str,
        run_timestamp: DateTime<Utc>,
        results: &[MatchResult],
        review_queue_size: usize,
    ) -> Self {
        let mut by_method: HashMap<MatchMethod, (usize, u64)> = HashMap::new();
        for result in results {
            let entry = by_method.entry(result.match_method).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += result.match_confidence as u64;
        }

        let mut method_stats: Vec<MatchMethodStats> = by_method
            .into_iter()
            .map(|(method, (count, sum))| MatchMethodStats {
                method,
                count,
                avg_confidence: sum as f64 / count as f64,
            })
            .collect();
        method_stats.sort_by(|a, b| b.count.cmp(&a.count).then(a.method.as_str().cmp(b.method.as_str())));

        let matched = results.iter().filter(|r| r.is_matched()).count();
        MatchRunStats {
            run_id: run_id.to_string(),
            run_timestamp,
            total_records: results.len(),
            matched,
            unmatched: results.len() - matched,
            review_queue_size,
            method_stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_counts_per_method() {
        let results = vec![
            MatchResult {
                leed_source_id: "L1".into(),
                nyc_index: Some(0),
                match_confidence: 100,
                match_method: MatchMethod::ExactParcel,
                match_notes: String::new(),
            },
            MatchResult {
                leed_source_id: "L2".into(),
                nyc_index: Some(1),
                match_confidence: 90,
                match_method: MatchMethod::ExactAddressZip,
                match_notes: String::new(),
            },
            MatchResult::unmatched("L3".into()),
        ];
        let stats = MatchRunStats::from_results("run", Utc::now(), &results, 1);
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.matched, 2);
        assert_eq!(stats.unmatched, 1);
        assert_eq!(stats.review_queue_size, 1);
        assert_eq!(stats.method_stats.len(), 3);
        let parcel = stats
            .method_stats
            .iter()
            .find(|s| s.method == MatchMethod::ExactParcel)
            .unwrap();
        assert_eq!(parcel.count, 1);
        assert!((parcel.avg_confidence - 100.0).abs() < f64::EPSILON);
    }
}
