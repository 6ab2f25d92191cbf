// src/normalize.rs
//
// Canonicalization of addresses, identifiers, and names for building records.
// Every function here is idempotent and returns an empty string when the input
// carries no usable value.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::models::core::BuildingRecord;

// Street suffix standardization (USPS Publication 28)
const SUFFIXES: &[(&str, &str)] = &[
    ("AVENUE", "AVE"),
    ("AVE", "AVE"),
    ("AV", "AVE"),
    ("BOULEVARD", "BLVD"),
    ("BLVD", "BLVD"),
    ("CIRCLE", "CIR"),
    ("CIR", "CIR"),
    ("COURT", "CT"),
    ("CT", "CT"),
    ("DRIVE", "DR"),
    ("DR", "DR"),
    ("EXPRESSWAY", "EXPY"),
    ("EXPY", "EXPY"),
    ("HIGHWAY", "HWY"),
    ("HWY", "HWY"),
    ("LANE", "LN"),
    ("LN", "LN"),
    ("PARKWAY", "PKWY"),
    ("PKWY", "PKWY"),
    ("PLACE", "PL"),
    ("PL", "PL"),
    ("PLAZA", "PLZ"),
    ("PLZ", "PLZ"),
    ("ROAD", "RD"),
    ("RD", "RD"),
    ("SQUARE", "SQ"),
    ("SQ", "SQ"),
    ("STREET", "ST"),
    ("ST", "ST"),
    ("STR", "ST"),
    ("TERRACE", "TER"),
    ("TER", "TER"),
    ("TURNPIKE", "TPKE"),
    ("TPKE", "TPKE"),
    ("WAY", "WAY"),
];

const DIRECTIONS: &[(&str, &str)] = &[
    ("NORTH", "N"),
    ("SOUTH", "S"),
    ("EAST", "E"),
    ("WEST", "W"),
    ("NORTHEAST", "NE"),
    ("NORTHWEST", "NW"),
    ("SOUTHEAST", "SE"),
    ("SOUTHWEST", "SW"),
    ("N", "N"),
    ("S", "S"),
    ("E", "E"),
    ("W", "W"),
    ("NE", "NE"),
    ("NW", "NW"),
    ("SE", "SE"),
    ("SW", "SW"),
];

const BOROUGHS: &[(&str, &str)] = &[
    ("manhattan", "MANHATTAN"),
    ("new york", "MANHATTAN"),
    ("ny", "MANHATTAN"),
    ("bronx", "BRONX"),
    ("the bronx", "BRONX"),
    ("bx", "BRONX"),
    ("brooklyn", "BROOKLYN"),
    ("bk", "BROOKLYN"),
    ("kings", "BROOKLYN"),
    ("queens", "QUEENS"),
    ("qn", "QUEENS"),
    ("staten island", "STATEN ISLAND"),
    ("si", "STATEN ISLAND"),
    ("richmond", "STATEN ISLAND"),
];

const NAME_FILLERS: &[&str] = &["THE", "BUILDING", "BLDG", "AT", "OF"];

static SUFFIX_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| SUFFIXES.iter().copied().collect());
static DIRECTION_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| DIRECTIONS.iter().copied().collect());
static BOROUGH_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| BOROUGHS.iter().copied().collect());

// Ordinal street numbers: 42ND -> 42. The suffix must be attached to the
// digits, otherwise "42 ST" (a street) would be eaten.
static ORDINAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)(?:ST|ND|RD|TH)\b").unwrap());

// Unit / suite / floor designators and the token following them.
static UNIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:SUITE|STE|UNIT|APT|APARTMENT|FLOOR|FL|RM|ROOM)\b\s*[\w\-]*|#\s*[\w\-]*")
        .unwrap()
});

// Punctuation except hyphens (kept for queens-style house numbers like 123-45).
static PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[.,;:!?()"']"#).unwrap());
static NAME_PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[.,;:!?()"'/\-]"#).unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Structured street address, reassembled in fixed component order.
#[derive(Debug, Default)]
struct ParsedAddress {
    number: String,
    pre_directional: String,
    street_name: String,
    suffix: String,
    post_directional: String,
}

impl ParsedAddress {
    fn reassemble(&self) -> String {
        [
            self.number.as_str(),
            self.pre_directional.as_str(),
            self.street_name.as_str(),
            self.suffix.as_str(),
            self.post_directional.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// Normalize a raw address string for matching.
///
/// Uppercase, strip punctuation, drop unit designators, flatten ordinals,
/// then parse into (number, pre-dir, name, suffix, post-dir) and reassemble
/// with USPS suffix and directional abbreviations. When structured parsing
/// fails, falls back to a token-by-token pass that applies only the suffix
/// and direction maps, preserving token order.
pub fn normalize_address(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }
    let addr = raw.trim().to_uppercase();
    let addr = PUNCT_RE.replace_all(&addr, "");
    let addr = UNIT_RE.replace_all(&addr, "");
    let addr = ORDINAL_RE.replace_all(&addr, "$1");
    let addr = WS_RE.replace_all(addr.trim(), " ").into_owned();
    if addr.is_empty() {
        return String::new();
    }

    match parse_street_address(&addr) {
        Some(parsed) => parsed.reassemble(),
        None => fallback_normalize(&addr),
    }
}

fn parse_street_address(addr: &str) -> Option<ParsedAddress> {
    let tokens: Vec<&str> = addr.split_whitespace().collect();
    let first = tokens.first()?;
    if !first.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let mut parsed = ParsedAddress {
        number: first.to_string(),
        ..Default::default()
    };

    let mut start = 1;
    let mut end = tokens.len();
    // Pre-directional only counts when a street name can still follow it.
    if end - start > 1 {
        if let Some(dir) = DIRECTION_MAP.get(tokens[start]) {
            parsed.pre_directional = dir.to_string();
            start += 1;
        }
    }
    if end > start {
        if let Some(dir) = DIRECTION_MAP.get(tokens[end - 1]) {
            parsed.post_directional = dir.to_string();
            end -= 1;
        }
    }
    if end > start {
        if let Some(suffix) = SUFFIX_MAP.get(tokens[end - 1]) {
            parsed.suffix = suffix.to_string();
            end -= 1;
        }
    }
    if end <= start {
        // No street name survived; treat as unparseable.
        return None;
    }
    parsed.street_name = tokens[start..end].join(" ");
    Some(parsed)
}

fn fallback_normalize(addr: &str) -> String {
    addr.split_whitespace()
        .map(|token| {
            SUFFIX_MAP
                .get(token)
                .or_else(|| DIRECTION_MAP.get(token))
                .copied()
                .unwrap_or(token)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a ZIP code to a 5-digit string. Short nonempty inputs are
/// left-padded with zeros; empty input stays empty.
pub fn normalize_zip(raw: &str) -> String {
    let head = raw
        .trim()
        .split(|c| c == '-' || c == '.')
        .next()
        .unwrap_or("");
    let digits: String = head.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        String::new()
    } else if digits.len() >= 5 {
        digits[..5].to_string()
    } else {
        format!("{:0>5}", digits)
    }
}

/// Normalize a BBL (borough-block-lot) to its digit string. No fixed length
/// is enforced; consumers must not assume ten digits.
pub fn normalize_bbl(raw: &str) -> String {
    raw.trim().chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalize a BIN (Building Identification Number) to its digit string,
/// dropping any decimal fraction first.
pub fn normalize_bin(raw: &str) -> String {
    let head = raw.trim().split('.').next().unwrap_or("");
    head.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalize a borough / city name to its standard uppercase form. Unmapped
/// values come back uppercased and trimmed, unchanged otherwise.
pub fn normalize_borough(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let key = trimmed.to_lowercase();
    match BOROUGH_MAP.get(key.as_str()) {
        Some(canonical) => canonical.to_string(),
        None => trimmed.to_uppercase(),
    }
}

/// Normalize a building name for fuzzy matching: uppercase, punctuation to
/// spaces, filler tokens removed, whitespace collapsed.
pub fn normalize_building_name(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }
    let name = raw.trim().to_uppercase();
    let name = NAME_PUNCT_RE.replace_all(&name, " ");
    name.split_whitespace()
        .filter(|token| !NAME_FILLERS.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Energy letter grades outside {A, B, C, D} are treated as absent.
pub fn sanitize_energy_grade(raw: &str) -> Option<String> {
    let grade = raw.trim().to_uppercase();
    match grade.as_str() {
        "A" | "B" | "C" | "D" => Some(grade),
        _ => None,
    }
}

/// Fill every derived `*_norm` field of a record from its raw fields.
pub fn normalize_record(record: &mut BuildingRecord) {
    record.address_norm = normalize_address(&record.address_raw);
    record.zip_norm = normalize_zip(&record.zip);
    record.bbl_norm = normalize_bbl(&record.bbl);
    record.bin_norm = normalize_bin(&record.bin);
    record.borough_norm = normalize_borough(&record.borough);
    record.building_name_norm = normalize_building_name(&record.building_name_raw);
    record.energy_grade = record
        .energy_grade
        .as_deref()
        .and_then(sanitize_energy_grade);
}
