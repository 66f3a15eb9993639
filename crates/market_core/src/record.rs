use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::parse;

/// One labeled stat line of a module listing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stat {
    /// Original line, including any `(+)`/`(-)` marker and trailing range.
    pub raw: String,
    pub positive: bool,
    pub negative: bool,
    /// Actual rolled value when the listing exposes one.
    pub value: Option<String>,
}

impl Stat {
    /// Builds a stat from its raw line, reading the sign from the marker.
    pub fn from_raw(raw: impl Into<String>, value: Option<String>) -> Self {
        let raw = raw.into();
        let (positive, negative) = parse::stat_sign(&raw);
        Self {
            raw,
            positive,
            negative,
            value,
        }
    }

    /// Canonical attribute label usable as a map key.
    pub fn attribute(&self) -> String {
        parse::attribute_label(&self.raw)
    }

    /// Parsed numeric value: the exposed value when present, otherwise the
    /// mean of the numbers in the trailing range token.
    pub fn numeric_value(&self) -> Option<f64> {
        self.value
            .as_deref()
            .and_then(parse::parse_number)
            .or_else(|| parse::average_numbers(parse::trailing_token(&self.raw)))
    }
}

/// Numeric side-fields computed on insert into a [`crate::RecordStore`].
///
/// They are not part of a record's identity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DerivedFields {
    #[serde(rename = "__mrVal")]
    pub mr_val: Option<i64>,
    #[serde(rename = "__rerollVal")]
    pub reroll_val: Option<i64>,
    #[serde(rename = "__ageDays")]
    pub age_days: Option<f64>,
    #[serde(rename = "__ageHours")]
    pub age_hours: Option<f64>,
    /// One parsed value per attribute (ancestor listings).
    pub attr_values: BTreeMap<String, Option<f64>>,
    /// Attributes whose stat line carried the `(-)` marker.
    pub neg_attributes: IndexSet<String>,
    /// Attribute values in stat order (trigger listings).
    pub trigger_values: IndexMap<String, Option<f64>>,
}

/// A normalized marketplace listing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRecord {
    pub name: String,
    /// `"Ancestor"` or `"Trigger"` as displayed by the marketplace.
    pub category: String,
    pub socket_type: Option<String>,
    pub required_rank: Option<String>,
    /// Free text without a currency word, e.g. `"1,250"`.
    pub price: String,
    pub platform: Option<String>,
    pub reroll_count: Option<String>,
    pub seller_name: Option<String>,
    pub seller_status: Option<String>,
    pub seller_rank: Option<String>,
    pub reg_date: Option<String>,
    pub attributes: IndexSet<String>,
    pub stats: Vec<Stat>,
    #[serde(default)]
    pub derived: DerivedFields,
}

impl ModuleRecord {
    /// Dedup key within one search: `name|price|sellerName`.
    pub fn identity_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.name,
            self.price,
            self.seller_name.as_deref().unwrap_or_default()
        )
    }

    pub fn is_trigger(&self) -> bool {
        self.category.to_lowercase().contains("trigger")
    }

    /// Parsed price, see [`parse::parse_price`].
    pub fn price_value(&self) -> Option<f64> {
        parse::parse_price(&self.price)
    }

    /// Recomputes every derived field from the extracted ones.
    pub fn refresh_derived(&mut self) {
        let age = self.reg_date.as_deref().and_then(parse::parse_age);
        let mut derived = DerivedFields {
            mr_val: self.required_rank.as_deref().and_then(parse::parse_first_int),
            reroll_val: parse::parse_reroll(self.reroll_count.as_deref()),
            age_days: age.map(|a| a.days),
            age_hours: age.map(|a| a.hours),
            ..DerivedFields::default()
        };

        let trigger = self.is_trigger();
        for stat in &self.stats {
            if trigger {
                let (name, value) = parse::split_trigger_stat(&stat.raw);
                let value = stat
                    .value
                    .as_deref()
                    .and_then(parse::parse_number)
                    .or(value);
                if !name.is_empty() {
                    derived.trigger_values.entry(name).or_insert(value);
                }
                continue;
            }

            let name = stat.attribute();
            if name.is_empty() {
                continue;
            }
            if stat.negative {
                derived.neg_attributes.insert(name.clone());
            }
            derived
                .attr_values
                .entry(name)
                .or_insert_with(|| stat.numeric_value());
        }

        self.derived = derived;
    }

    /// Returns a copy with derived fields filled in.
    pub fn with_derived(mut self) -> Self {
        self.refresh_derived();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ancestor() -> ModuleRecord {
        ModuleRecord {
            name: "Ancestral Flame".into(),
            category: "Ancestor".into(),
            price: "1,250".into(),
            required_rank: Some("Mastery Rank 12".into()),
            reroll_count: Some("-".into()),
            reg_date: Some("2 days ago".into()),
            seller_name: Some("Bunny".into()),
            stats: vec![
                Stat::from_raw("(+)Skill Power [+1%~+3%]", None),
                Stat::from_raw("(-)DEF [-10%~-5%]", Some("-7%".into())),
            ],
            ..ModuleRecord::default()
        }
    }

    #[test]
    fn identity_key_joins_name_price_seller() {
        assert_eq!(ancestor().identity_key(), "Ancestral Flame|1,250|Bunny");
    }

    #[test]
    fn derived_fields_for_ancestor() {
        let record = ancestor().with_derived();
        let d = &record.derived;
        assert_eq!(d.mr_val, Some(12));
        assert_eq!(d.reroll_val, Some(0));
        assert_eq!(d.age_days, Some(2.0));
        assert_eq!(d.age_hours, Some(48.0));
        assert_eq!(d.attr_values["Skill Power"], Some(2.0));
        assert_eq!(d.attr_values["DEF"], Some(-7.0));
        assert!(d.neg_attributes.contains("DEF"));
        assert!(d.trigger_values.is_empty());
    }

    #[test]
    fn trigger_values_keep_stat_order() {
        let record = ModuleRecord {
            category: "Trigger".into(),
            stats: vec![
                Stat::from_raw("Zeta Boost (Max) 5", None),
                Stat::from_raw("Alpha Boost 2.5%", None),
            ],
            ..ModuleRecord::default()
        }
        .with_derived();

        let names: Vec<_> = record.derived.trigger_values.keys().cloned().collect();
        assert_eq!(names, vec!["Zeta Boost".to_string(), "Alpha Boost".to_string()]);
        assert_eq!(record.derived.trigger_values["Alpha Boost"], Some(2.5));
        assert!(record.derived.attr_values.is_empty());
    }
}
