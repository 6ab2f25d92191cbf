// src/models/mod.rs

pub mod core;
pub mod matching;
pub mod stats;

pub use self::core::{BenchmarkRecord, BuildingRecord, EmissionsRecord, SourceName};
pub use matching::{ManualOverride, MatchMethod, MatchResult, OverrideDecision, ReviewQueueEntry};
pub use stats::{MatchMethodStats, MatchRunStats};
