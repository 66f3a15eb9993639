use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Inclusive numeric bounds; an unset side is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RangeFilter {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeFilter {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn between(min: f64, max: f64) -> Self {
        Self::new(Some(min), Some(max))
    }

    pub fn is_active(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }

    /// Absent values are never excluded by a range.
    pub fn admits(&self, value: Option<f64>) -> bool {
        value.is_none_or(|value| self.contains(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

/// Every facet of one view. The default value is the neutral state that
/// lets every record through.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FacetState {
    pub price: RangeFilter,
    pub required_rank: RangeFilter,
    pub reroll: RangeFilter,
    pub age_days: RangeFilter,
    pub age_hours: RangeFilter,
    /// Case-insensitive substring of the seller name; empty disables.
    pub seller: String,
    pub statuses: BTreeSet<String>,
    /// Selected attributes, each with an optional value range.
    pub attributes: BTreeMap<String, RangeFilter>,
    pub negative_attributes: BTreeSet<String>,
    pub module_names: BTreeSet<String>,
    pub sockets: BTreeSet<String>,
    pub platforms: BTreeSet<String>,
    pub trigger_ranges: BTreeMap<String, RangeFilter>,
    pub categories: BTreeSet<String>,
    pub sort: SortKey,
}

impl FacetState {
    pub fn neutral() -> Self {
        Self::default()
    }

    /// Copy with inactive trigger ranges and blank seller whitespace removed,
    /// so that equivalent states compare equal.
    pub fn normalized(&self) -> Self {
        let mut state = self.clone();
        state.seller = state.seller.trim().to_string();
        state.trigger_ranges.retain(|_, range| range.is_active());
        state
    }

    pub fn is_neutral(&self) -> bool {
        self.normalized() == Self::neutral()
    }

    /// Equality after normalization; drives the save-control dirty flag.
    pub fn same_as(&self, other: &FacetState) -> bool {
        self.normalized() == other.normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_bounds_are_inclusive() {
        let range = RangeFilter::between(10.0, 10.0);
        assert!(range.contains(10.0));
        assert!(!range.contains(10.01));
        assert!(RangeFilter::default().contains(f64::MAX));
        assert!(range.admits(None));
    }

    #[test]
    fn inactive_trigger_ranges_do_not_make_state_dirty() {
        let mut state = FacetState::neutral();
        state
            .trigger_ranges
            .insert("Fire".into(), RangeFilter::default());
        state.seller = "  ".into();
        assert!(state.is_neutral());
    }
}
