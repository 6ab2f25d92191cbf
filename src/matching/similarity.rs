// src/matching/similarity.rs

use strsim::normalized_levenshtein;

/// Token-order-insensitive similarity ratio on a 0-100 scale.
///
/// Both strings are split on whitespace, their tokens sorted and rejoined,
/// and the result compared with normalized Levenshtein. This mirrors a
/// token-sort ratio: "PARK AVE 100" and "100 PARK AVE" score 100.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let sorted_a = sort_tokens(a);
    let sorted_b = sort_tokens(b);
    normalized_levenshtein(&sorted_a, &sorted_b) * 100.0
}

fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_100() {
        assert!((token_sort_ratio("123 W 42 ST", "123 W 42 ST") - 100.0).abs() < 1e-9);
    }

    #[test]
    fn token_order_is_ignored() {
        assert!((token_sort_ratio("ACME TOWER", "TOWER ACME") - 100.0).abs() < 1e-9);
    }

    #[test]
    fn near_misses_score_high_but_below_100() {
        let score = token_sort_ratio("123 W 42 ST", "125 W 42 ST");
        assert!(score > 80.0 && score < 100.0, "score was {score}");
    }

    #[test]
    fn unrelated_strings_score_low() {
        assert!(token_sort_ratio("123 W 42 ST", "987 OCEAN PKWY") < 50.0);
    }
}
