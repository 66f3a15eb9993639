use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::ModuleRecord;

/// Which record schema, and therefore which facets, apply to a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueryMode {
    #[default]
    Ancestor,
    Trigger,
}

impl QueryMode {
    /// Trigger mode iff every record is a trigger module. An empty record
    /// set has no evidence either way and stays in ancestor mode.
    pub fn detect(records: &[ModuleRecord]) -> Self {
        if !records.is_empty() && records.iter().all(ModuleRecord::is_trigger) {
            QueryMode::Trigger
        } else {
            QueryMode::Ancestor
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QueryMode::Ancestor => "ancestor",
            QueryMode::Trigger => "trigger",
        }
    }
}

/// Observed min/max of a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn point(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    fn include(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

fn widen(slot: &mut Option<NumericRange>, value: Option<f64>) {
    let Some(value) = value else {
        return;
    };
    match slot {
        Some(range) => range.include(value),
        None => *slot = Some(NumericRange::point(value)),
    }
}

fn widen_map(map: &mut BTreeMap<String, NumericRange>, key: &str, value: Option<f64>) {
    let Some(value) = value else {
        return;
    };
    match map.get_mut(key) {
        Some(range) => range.include(value),
        None => {
            map.insert(key.to_string(), NumericRange::point(value));
        }
    }
}

/// Orders seller statuses with `Online` first, `Offline` second, and the
/// rest alphabetically.
pub fn compare_status(a: &str, b: &str) -> Ordering {
    fn rank(status: &str) -> u8 {
        match status.to_lowercase().as_str() {
            "online" => 0,
            "offline" => 1,
            _ => 2,
        }
    }
    rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
}

/// Facet schema discovered from the records themselves.
///
/// The numeric ranges seed placeholders only; they never constrain filtering.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FacetSchema {
    /// Every attribute seen on an ancestor record.
    pub attribute_names: BTreeSet<String>,
    /// Value range per attribute, for attributes with at least one value.
    pub attribute_ranges: BTreeMap<String, NumericRange>,
    pub negative_attributes: BTreeSet<String>,
    pub module_names: BTreeSet<String>,
    pub statuses: Vec<String>,
    pub sockets: BTreeSet<String>,
    pub platforms: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub price: Option<NumericRange>,
    pub required_rank: Option<NumericRange>,
    pub reroll: Option<NumericRange>,
    pub age_days: Option<NumericRange>,
    pub age_hours: Option<NumericRange>,
    /// Trigger attribute names in first-appearance order.
    pub trigger_attributes: IndexSet<String>,
    pub trigger_ranges: BTreeMap<String, NumericRange>,
    pub record_count: usize,
}

impl FacetSchema {
    /// Full discovery over a record set.
    pub fn discover(records: &[ModuleRecord]) -> Self {
        let mut schema = Self::default();
        schema.extend(records);
        schema
    }

    /// Folds appended records into the schema. The result is identical to
    /// calling [`FacetSchema::discover`] on the combined record set.
    pub fn extend(&mut self, records: &[ModuleRecord]) {
        for record in records {
            self.absorb(record);
        }
        self.statuses.sort_by(|a, b| compare_status(a, b));
    }

    fn absorb(&mut self, record: &ModuleRecord) {
        self.record_count += 1;
        let derived = &record.derived;

        if !record.name.is_empty() {
            self.module_names.insert(record.name.clone());
        }
        if !record.category.is_empty() {
            self.categories.insert(record.category.clone());
        }
        if let Some(status) = record.seller_status.as_ref().filter(|s| !s.is_empty()) {
            if !self.statuses.contains(status) {
                self.statuses.push(status.clone());
            }
        }
        if let Some(socket) = record.socket_type.as_ref().filter(|s| !s.is_empty()) {
            self.sockets.insert(socket.clone());
        }
        if let Some(platform) = record.platform.as_ref().filter(|s| !s.is_empty()) {
            self.platforms.insert(platform.clone());
        }

        widen(&mut self.price, record.price_value());
        widen(&mut self.required_rank, derived.mr_val.map(|v| v as f64));
        widen(&mut self.reroll, derived.reroll_val.map(|v| v as f64));
        widen(&mut self.age_days, derived.age_days);
        widen(&mut self.age_hours, derived.age_hours);

        for (name, value) in &derived.attr_values {
            self.attribute_names.insert(name.clone());
            widen_map(&mut self.attribute_ranges, name, *value);
        }
        for name in &derived.neg_attributes {
            self.negative_attributes.insert(name.clone());
        }
        for (name, value) in &derived.trigger_values {
            self.trigger_attributes.insert(name.clone());
            widen_map(&mut self.trigger_ranges, name, *value);
        }
    }
}
