// src/matching/mod.rs

pub mod candidate_index;
pub mod matcher;
pub mod overrides;
pub mod review;
pub mod similarity;

pub use candidate_index::{AddressEntry, CandidateIndex};
pub use matcher::{Matcher, MatcherConfig};
pub use overrides::apply_overrides;
pub use review::build_review_queue;
