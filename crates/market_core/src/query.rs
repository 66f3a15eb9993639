//! Faceted Query Engine: pure evaluation of a [`FacetState`] over records.
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::{FacetState, ModuleRecord, QueryMode, SortKey};

fn contains_ci(set: &BTreeSet<String>, value: Option<&str>) -> bool {
    let Some(value) = value else {
        return false;
    };
    let value = value.to_lowercase();
    set.iter().any(|item| item.to_lowercase() == value)
}

/// Returns true iff the record passes every active predicate.
pub fn passes(record: &ModuleRecord, state: &FacetState, mode: QueryMode) -> bool {
    let derived = &record.derived;

    if !state.categories.is_empty() && !contains_ci(&state.categories, Some(&record.category)) {
        return false;
    }

    for (attribute, range) in &state.attributes {
        if !record.attributes.contains(attribute) && !derived.attr_values.contains_key(attribute) {
            return false;
        }
        let value = derived.attr_values.get(attribute).copied().flatten();
        if !range.admits(value) {
            return false;
        }
    }

    if !state.sockets.is_empty() && !contains_ci(&state.sockets, record.socket_type.as_deref()) {
        return false;
    }
    if !state.platforms.is_empty() && !contains_ci(&state.platforms, record.platform.as_deref()) {
        return false;
    }

    if !state.price.admits(record.price_value()) {
        return false;
    }

    if mode == QueryMode::Ancestor {
        if !state.required_rank.admits(derived.mr_val.map(|v| v as f64)) {
            return false;
        }
        if !state.reroll.admits(derived.reroll_val.map(|v| v as f64)) {
            return false;
        }
    }

    if !state.statuses.is_empty() && !contains_ci(&state.statuses, record.seller_status.as_deref())
    {
        return false;
    }

    if !state.age_days.admits(derived.age_days) || !state.age_hours.admits(derived.age_hours) {
        return false;
    }

    let needle = state.seller.trim().to_lowercase();
    if !needle.is_empty() {
        let seller = record.seller_name.as_deref().unwrap_or_default().to_lowercase();
        if !seller.contains(&needle) {
            return false;
        }
    }

    if state
        .negative_attributes
        .iter()
        .any(|name| derived.neg_attributes.contains(name))
    {
        return false;
    }

    match mode {
        QueryMode::Ancestor => {
            if !state.module_names.is_empty() && !state.module_names.contains(&record.name) {
                return false;
            }
        }
        QueryMode::Trigger => {
            for (attribute, range) in &state.trigger_ranges {
                if !range.is_active() {
                    continue;
                }
                match derived.trigger_values.get(attribute).copied().flatten() {
                    Some(value) if range.contains(value) => {}
                    _ => return false,
                }
            }
        }
    }

    true
}

fn compare_price(a: &ModuleRecord, b: &ModuleRecord, descending: bool) -> Ordering {
    match (a.price_value(), b.price_value()) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
        // Unpriced listings sink to the bottom in both directions.
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Folds accented Latin letters onto their base letter.
fn fold_accent(c: char) -> char {
    match c {
        'à'..='å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è'..='ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ì'..='ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => 'i',
        'ł' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ò'..='ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ř' => 'r',
        'ś' | 'ŝ' | 'ş' | 'š' => 's',
        'ţ' | 'ť' => 't',
        'ù'..='ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}

fn collation_key(name: &str) -> String {
    name.to_lowercase().chars().map(fold_accent).collect()
}

/// Case- and accent-insensitive; accented forms follow their base on ties.
fn compare_name(a: &ModuleRecord, b: &ModuleRecord) -> Ordering {
    collation_key(&a.name)
        .cmp(&collation_key(&b.name))
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

/// Stable sort by the selected key.
pub fn sort_records(records: &mut [ModuleRecord], key: SortKey) {
    records.sort_by(|a, b| compare(a, b, key));
}

fn compare(a: &ModuleRecord, b: &ModuleRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::PriceAsc => compare_price(a, b, false),
        SortKey::PriceDesc => compare_price(a, b, true),
        SortKey::NameAsc => compare_name(a, b),
        SortKey::NameDesc => compare_name(a, b).reverse(),
    }
}

/// Indices into `records` of the visible subset, in display order.
pub fn evaluate_indices(records: &[ModuleRecord], state: &FacetState, mode: QueryMode) -> Vec<usize> {
    let mut indices: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| passes(record, state, mode))
        .map(|(idx, _)| idx)
        .collect();
    indices.sort_by(|&a, &b| compare(&records[a], &records[b], state.sort));
    indices
}

/// Filters and sorts, returning the visible records.
pub fn evaluate(records: &[ModuleRecord], state: &FacetState, mode: QueryMode) -> Vec<ModuleRecord> {
    evaluate_indices(records, state, mode)
        .into_iter()
        .map(|idx| records[idx].clone())
        .collect()
}
