// src/lib.rs
pub mod io;
pub mod master_table;
pub mod matching;
pub mod models;
pub mod normalize;

// Re-export common types for easier access
pub use master_table::{build_master_table, MasterRecord};
pub use matching::{
    apply_overrides, build_review_queue, CandidateIndex, Matcher, MatcherConfig,
};
pub use models::{
    BenchmarkRecord, BuildingRecord, EmissionsRecord, ManualOverride, MatchMethod, MatchResult,
    MatchRunStats, OverrideDecision, ReviewQueueEntry, SourceName,
};
