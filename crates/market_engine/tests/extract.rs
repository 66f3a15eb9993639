use market_engine::{normalize_price, CompiledSelectors, ListingExtractor, ListingSelectors};
use market_core::RecordStore;
use pretty_assertions::assert_eq;

fn extractor() -> ListingExtractor {
    ListingExtractor::new(&ListingSelectors::default())
}

const ANCESTOR: &str = r#"
<div class="market-item" data-module-type="ancestor">
  <span class="item-name">Blast Shot</span>
  <span class="item-category">Ancestor</span>
  <span class="item-socket">Cerulean</span>
  <span class="item-rank">Mastery Rank 12</span>
  <span class="item-price">1,250 Caliber</span>
  <span class="item-platform">PC</span>
  <span class="item-reroll">-</span>
  <div class="seller">
    <span class="seller-name">Bob <em class="seller-status">Online</em></span>
    <span class="seller-rank">Rank 20</span>
  </div>
  <span class="item-date">3 days ago</span>
  <ul class="item-stats">
    <li class="stat"><span class="stat-label">(+)Fire Damage [+1.2%~+3.4%]</span><span class="stat-value">+2.5%</span></li>
    <li class="stat negative"><span class="stat-label">Reload Speed [-5%~-10%]</span></li>
  </ul>
</div>"#;

#[test]
fn ancestor_listing_reads_every_field() {
    let record = extractor().extract(ANCESTOR).expect("record");

    assert_eq!(record.name, "Blast Shot");
    assert_eq!(record.category, "Ancestor");
    assert_eq!(record.socket_type.as_deref(), Some("Cerulean"));
    assert_eq!(record.required_rank.as_deref(), Some("Mastery Rank 12"));
    assert_eq!(record.price, "1,250");
    assert_eq!(record.platform.as_deref(), Some("PC"));
    assert_eq!(record.reroll_count.as_deref(), Some("-"));
    assert_eq!(record.seller_name.as_deref(), Some("Bob"));
    assert_eq!(record.seller_status.as_deref(), Some("Online"));
    assert_eq!(record.seller_rank.as_deref(), Some("Rank 20"));
    assert_eq!(record.reg_date.as_deref(), Some("3 days ago"));

    let attributes: Vec<_> = record.attributes.iter().cloned().collect();
    assert_eq!(attributes, vec!["Fire Damage", "Reload Speed"]);
    assert!(record.stats[0].positive);
    assert_eq!(record.stats[0].value.as_deref(), Some("+2.5%"));
    assert!(record.stats[1].negative);
    assert_eq!(record.stats[1].value, None);
}

#[test]
fn extracted_ancestor_derives_values() {
    let record = extractor().extract(ANCESTOR).expect("record").with_derived();

    assert_eq!(record.derived.mr_val, Some(12));
    assert_eq!(record.derived.reroll_val, Some(0));
    assert_eq!(record.derived.age_days, Some(3.0));
    assert_eq!(record.derived.attr_values.get("Fire Damage"), Some(&Some(2.5)));
    assert_eq!(record.derived.attr_values.get("Reload Speed"), Some(&Some(-7.5)));
    assert!(record.derived.neg_attributes.contains("Reload Speed"));
}

#[test]
fn trigger_listing_is_dispatched_by_kind() {
    let html = r#"
<div class="market-item" data-module-type="trigger">
  <span class="item-name">Inferno Core</span>
  <span class="item-price">900</span>
  <ul class="item-effects">
    <li class="effect">Fire Resistance (Max) +12.5%</li>
    <li class="effect">Skill Power 40</li>
  </ul>
</div>"#;
    let record = extractor().extract(html).expect("record").with_derived();

    assert_eq!(record.category, "Trigger");
    assert!(record.is_trigger());
    let attributes: Vec<_> = record.attributes.iter().cloned().collect();
    assert_eq!(attributes, vec!["Fire Resistance", "Skill Power"]);
    assert_eq!(record.stats[0].raw, "Fire Resistance (Max) +12.5%");
    assert_eq!(
        record.derived.trigger_values.get("Fire Resistance"),
        Some(&Some(12.5))
    );
    assert_eq!(record.derived.trigger_values.get("Skill Power"), Some(&Some(40.0)));
}

#[test]
fn trigger_class_also_selects_trigger_schema() {
    let html = r#"<div class="market-item trigger"><span class="item-name">Spark</span><span class="effect">Crit Rate 3%</span></div>"#;
    let selectors = ListingSelectors {
        trigger_stat: ".effect".to_string(),
        ..ListingSelectors::default()
    };
    let record = ListingExtractor::new(&selectors).extract(html).expect("record");
    assert_eq!(record.category, "Trigger");
    assert_eq!(record.stats.len(), 1);
}

#[test]
fn missing_markup_degrades_to_empty_fields() {
    let html = r#"<div class="market-item"><span class="item-name">Lonely</span></div>"#;
    let record = extractor().extract(html).expect("record");

    assert_eq!(record.name, "Lonely");
    assert_eq!(record.category, "Ancestor");
    assert_eq!(record.price, "");
    assert_eq!(record.seller_name, None);
    assert_eq!(record.seller_status, None);
    assert!(record.stats.is_empty());
    assert!(record.attributes.is_empty());
}

#[test]
fn nameless_or_empty_fragments_are_skipped() {
    let extractor = extractor();
    assert_eq!(extractor.extract(r#"<div class="market-item"></div>"#), None);
    assert_eq!(extractor.extract("just text"), None);
    assert_eq!(extractor.extract(""), None);

    let fragments = vec![
        r#"<div><span class="item-name">A</span></div>"#.to_string(),
        "<div></div>".to_string(),
    ];
    assert_eq!(extractor.extract_all(&fragments).len(), 1);
}

#[test]
fn seller_name_drops_status_words() {
    let html = r#"<div><span class="item-name">X</span><div class="seller"><span class="seller-name">Alice   offline</span></div></div>"#;
    let record = extractor().extract(html).expect("record");
    assert_eq!(record.seller_name.as_deref(), Some("Alice"));
}

#[test]
fn seller_status_falls_back_to_class() {
    let html = r#"<div><span class="item-name">X</span><div class="seller"><span class="seller-name">Alice</span><i class="seller-status offline"></i></div></div>"#;
    let record = extractor().extract(html).expect("record");
    assert_eq!(record.seller_status.as_deref(), Some("Offline"));
}

#[test]
fn invalid_selector_matches_nothing() {
    engine_logging::initialize_for_tests();
    let selectors = ListingSelectors {
        price: "[[[".to_string(),
        ..ListingSelectors::default()
    };
    let record = ListingExtractor::new(&selectors).extract(ANCESTOR).expect("record");
    assert_eq!(record.price, "");
    assert_eq!(record.name, "Blast Shot");

    let compiled = CompiledSelectors::new(&selectors);
    assert_eq!(
        market_engine::extract_listing(ANCESTOR, &compiled).map(|r| r.name),
        Some("Blast Shot".to_string())
    );
}

#[test]
fn price_drops_unit_letters() {
    assert_eq!(normalize_price("1,250 Caliber"), "1,250");
    assert_eq!(normalize_price("Caliber 3000"), "3000");
    assert_eq!(normalize_price("free"), "");
    assert_eq!(normalize_price("1,250Caliber"), "1,250");
}

#[test]
fn attached_units_keep_listings_distinct() {
    let listing = |price: &str| {
        format!(
            r#"<div class="market-item"><span class="item-name">Blast</span><span class="item-price">{price}</span><div class="seller"><span class="seller-name">Bob</span></div></div>"#
        )
    };
    let records = extractor().extract_all(&[listing("1,250Caliber"), listing("900Caliber")]);
    let prices: Vec<_> = records.iter().map(|r| r.price.as_str()).collect();
    assert_eq!(prices, vec!["1,250", "900"]);

    let mut store = RecordStore::new();
    assert_eq!(store.extend(records), 2);
}
