#![allow(dead_code)]
use std::sync::Once;

use market_core::{ModuleRecord, Stat};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

pub fn ancestor(name: &str, price: &str, seller: &str) -> ModuleRecord {
    ModuleRecord {
        name: name.to_string(),
        category: "Ancestor".to_string(),
        price: price.to_string(),
        seller_name: Some(seller.to_string()),
        seller_status: Some("Online".to_string()),
        ..ModuleRecord::default()
    }
}

pub fn trigger(name: &str, price: &str, seller: &str) -> ModuleRecord {
    ModuleRecord {
        category: "Trigger".to_string(),
        ..ancestor(name, price, seller)
    }
}

pub fn with_stat(mut record: ModuleRecord, raw: &str, value: Option<&str>) -> ModuleRecord {
    let stat = Stat::from_raw(raw, value.map(str::to_string));
    let label = if record.is_trigger() {
        market_core::parse::split_trigger_stat(raw).0
    } else {
        stat.attribute()
    };
    record.attributes.insert(label);
    record.stats.push(stat);
    record
}
