use std::collections::HashSet;

use crate::ModuleRecord;

/// Append-only, idempotent collection of the records of one search.
///
/// Insertion order is preserved; sorting is left to the query engine.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<ModuleRecord>,
    keys: HashSet<String>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record unless its identity key is already stored.
    ///
    /// Returns `true` when the record was appended. Later duplicates are
    /// discarded even if their status or rank differ from the stored copy.
    pub fn insert(&mut self, mut record: ModuleRecord) -> bool {
        let key = record.identity_key();
        if self.keys.contains(&key) {
            return false;
        }
        record.refresh_derived();
        self.keys.insert(key);
        self.records.push(record);
        true
    }

    /// Inserts every record and returns how many were new.
    pub fn extend<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = ModuleRecord>,
    {
        records
            .into_iter()
            .map(|record| usize::from(self.insert(record)))
            .sum()
    }

    /// Ordered copy of the stored records, optionally restricted to names
    /// containing `name_filter` (case-insensitive).
    pub fn snapshot(&self, name_filter: Option<&str>) -> Vec<ModuleRecord> {
        let needle = name_filter
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
            .map(str::to_lowercase);
        match needle {
            Some(needle) => self
                .records
                .iter()
                .filter(|record| record.name.to_lowercase().contains(&needle))
                .cloned()
                .collect(),
            None => self.records.clone(),
        }
    }

    pub fn records(&self) -> &[ModuleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops every record; used when a search is retried from scratch.
    pub fn clear(&mut self) {
        self.records.clear();
        self.keys.clear();
    }
}
