mod common;

use common::{ancestor, init_logging, with_stat};
use market_core::RecordStore;
use pretty_assertions::assert_eq;

#[test]
fn same_identity_is_stored_once() {
    init_logging();
    let mut store = RecordStore::new();
    assert!(store.insert(ancestor("Flame", "1,000", "Bunny")));
    assert!(!store.insert(ancestor("Flame", "1,000", "Bunny")));
    assert_eq!(store.len(), 1);
}

#[test]
fn first_seen_copy_wins_even_if_status_changes() {
    init_logging();
    let mut store = RecordStore::new();
    store.insert(ancestor("Flame", "1,000", "Bunny"));

    let mut later = ancestor("Flame", "1,000", "Bunny");
    later.seller_status = Some("Offline".to_string());
    later.seller_rank = Some("40".to_string());
    assert!(!store.insert(later));

    assert_eq!(store.records()[0].seller_status.as_deref(), Some("Online"));
    assert_eq!(store.records()[0].seller_rank, None);
}

#[test]
fn different_price_or_seller_is_a_new_listing() {
    init_logging();
    let mut store = RecordStore::new();
    let inserted = store.extend(vec![
        ancestor("Flame", "1,000", "Bunny"),
        ancestor("Flame", "1,100", "Bunny"),
        ancestor("Flame", "1,000", "Viessa"),
        ancestor("Flame", "1,000", "Bunny"),
    ]);
    assert_eq!(inserted, 3);
    assert_eq!(store.len(), 3);
}

#[test]
fn insert_computes_derived_fields() {
    init_logging();
    let mut store = RecordStore::new();
    let mut record = with_stat(ancestor("Flame", "500", "Bunny"), "(+)Power [10~20]", None);
    record.required_rank = Some("Rank 9".to_string());
    record.reroll_count = Some("-".to_string());
    record.reg_date = Some("5 hours ago".to_string());
    store.insert(record);

    let derived = &store.records()[0].derived;
    assert_eq!(derived.mr_val, Some(9));
    assert_eq!(derived.reroll_val, Some(0));
    assert_eq!(derived.age_hours, Some(5.0));
    assert_eq!(derived.attr_values["Power"], Some(15.0));
}

#[test]
fn snapshot_preserves_order_and_filters_by_name() {
    init_logging();
    let mut store = RecordStore::new();
    store.extend(vec![
        ancestor("Zephyr Core", "10", "a"),
        ancestor("Azure Flame", "20", "b"),
        ancestor("Flame Heart", "30", "c"),
    ]);

    let names = |records: Vec<market_core::ModuleRecord>| {
        records.into_iter().map(|r| r.name).collect::<Vec<_>>()
    };
    assert_eq!(
        names(store.snapshot(None)),
        vec!["Zephyr Core", "Azure Flame", "Flame Heart"]
    );
    assert_eq!(
        names(store.snapshot(Some("FLAME"))),
        vec!["Azure Flame", "Flame Heart"]
    );
    assert_eq!(names(store.snapshot(Some("  "))).len(), 3);
}

#[test]
fn clear_allows_reinsertion() {
    init_logging();
    let mut store = RecordStore::new();
    store.insert(ancestor("Flame", "1", "a"));
    store.clear();
    assert!(store.is_empty());
    assert!(store.insert(ancestor("Flame", "1", "a")));
}
