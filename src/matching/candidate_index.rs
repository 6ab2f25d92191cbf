// src/matching/candidate_index.rs

use std::collections::HashMap;

use log::info;

use crate::models::core::BuildingRecord;

/// One NYC record's matching surface for linear and fuzzy scans. Entries are
/// kept in table order so ties resolve to the first-seen candidate.
#[derive(Debug, Clone)]
pub struct AddressEntry {
    pub position: usize,
    pub address: String,
    pub zip: String,
    pub borough: String,
    pub name: String,
}

/// Lookup structures over a frozen snapshot of the NYC table. Built once per
/// matching run; the matcher only ever holds a shared reference.
#[derive(Debug, Default)]
pub struct CandidateIndex {
    by_bbl: HashMap<String, Vec<usize>>,
    by_bin: HashMap<String, Vec<usize>>,
    by_address_zip: HashMap<String, Vec<usize>>,
    address_entries: Vec<AddressEntry>,
    source_ids: Vec<String>,
    position_by_source_id: HashMap<String, usize>,
}

impl CandidateIndex {
    /// Single pass over the NYC records. Records with an empty normalized
    /// key are left out of that map so empty strings never collide.
    pub fn build(records: &[BuildingRecord]) -> Self {
        let mut index = CandidateIndex::default();
        for (position, record) in records.iter().enumerate() {
            if !record.bbl_norm.is_empty() {
                index
                    .by_bbl
                    .entry(record.bbl_norm.clone())
                    .or_default()
                    .push(position);
            }
            if !record.bin_norm.is_empty() {
                index
                    .by_bin
                    .entry(record.bin_norm.clone())
                    .or_default()
                    .push(position);
            }
            if !record.address_norm.is_empty() && !record.zip_norm.is_empty() {
                index
                    .by_address_zip
                    .entry(address_zip_key(&record.address_norm, &record.zip_norm))
                    .or_default()
                    .push(position);
            }
            if !record.address_norm.is_empty() {
                index.address_entries.push(AddressEntry {
                    position,
                    address: record.address_norm.clone(),
                    zip: record.zip_norm.clone(),
                    borough: record.borough_norm.clone(),
                    name: record.building_name_norm.clone(),
                });
            }
            index
                .position_by_source_id
                .entry(record.source_id.clone())
                .or_insert(position);
            index.source_ids.push(record.source_id.clone());
        }
        info!(
            "Candidate index built: {} records, {} BBL keys, {} BIN keys, {} address+zip keys",
            records.len(),
            index.by_bbl.len(),
            index.by_bin.len(),
            index.by_address_zip.len()
        );
        index
    }

    /// First-indexed position for a BBL, table order.
    pub fn lookup_bbl(&self, bbl: &str) -> Option<usize> {
        self.by_bbl.get(bbl).and_then(|v| v.first().copied())
    }

    pub fn lookup_bin(&self, bin: &str) -> Option<usize> {
        self.by_bin.get(bin).and_then(|v| v.first().copied())
    }

    pub fn lookup_address_zip(&self, address: &str, zip: &str) -> Option<usize> {
        self.by_address_zip
            .get(&address_zip_key(address, zip))
            .and_then(|v| v.first().copied())
    }

    pub fn address_entries(&self) -> &[AddressEntry] {
        &self.address_entries
    }

    pub fn source_id_at(&self, position: usize) -> Option<&str> {
        self.source_ids.get(position).map(String::as_str)
    }

    pub fn position_of(&self, source_id: &str) -> Option<usize> {
        self.position_by_source_id.get(source_id).copied()
    }

    pub fn len(&self) -> usize {
        self.source_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source_ids.is_empty()
    }
}

fn address_zip_key(address: &str, zip: &str) -> String {
    format!("{}|{}", address, zip)
}
