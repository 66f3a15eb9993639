//! Field extractors: one rendered listing element -> one [`ModuleRecord`].
//!
//! Every field degrades to empty/absent when its markup is missing; the
//! marketplace layout is not guaranteed stable.
use std::sync::LazyLock;

use ego_tree::NodeRef;
use engine_logging::engine_warn;
use market_core::parse::split_trigger_stat;
use market_core::{ModuleRecord, Stat};
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::settings::ListingSelectors;

static STATUS_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(online|offline)\b").expect("status pattern"));

static LETTERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{L}+").expect("letter pattern"));

/// Selectors compiled once per search. Invalid selectors are logged and
/// behave as if nothing matched.
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    kind_attribute: String,
    name: Option<Selector>,
    category: Option<Selector>,
    socket: Option<Selector>,
    required_rank: Option<Selector>,
    price: Option<Selector>,
    platform: Option<Selector>,
    reroll: Option<Selector>,
    seller_name: Option<Selector>,
    seller_status: Option<Selector>,
    seller_rank: Option<Selector>,
    reg_date: Option<Selector>,
    stat: Option<Selector>,
    stat_label: Option<Selector>,
    stat_value: Option<Selector>,
    trigger_stat: Option<Selector>,
}

fn compile(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(err) => {
            engine_warn!("Ignoring invalid selector {:?}: {:?}", css, err);
            None
        }
    }
}

impl CompiledSelectors {
    pub fn new(selectors: &ListingSelectors) -> Self {
        Self {
            kind_attribute: selectors.kind_attribute.clone(),
            name: compile(&selectors.name),
            category: compile(&selectors.category),
            socket: compile(&selectors.socket),
            required_rank: compile(&selectors.required_rank),
            price: compile(&selectors.price),
            platform: compile(&selectors.platform),
            reroll: compile(&selectors.reroll),
            seller_name: compile(&selectors.seller_name),
            seller_status: compile(&selectors.seller_status),
            seller_rank: compile(&selectors.seller_rank),
            reg_date: compile(&selectors.reg_date),
            stat: compile(&selectors.stat),
            stat_label: compile(&selectors.stat_label),
            stat_value: compile(&selectors.stat_value),
            trigger_stat: compile(&selectors.trigger_stat),
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first<'a>(element: ElementRef<'a>, selector: &Option<Selector>) -> Option<ElementRef<'a>> {
    selector
        .as_ref()
        .and_then(|selector| element.select(selector).next())
}

fn element_text(element: ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn text_of(element: ElementRef, selector: &Option<Selector>) -> Option<String> {
    first(element, selector)
        .map(element_text)
        .filter(|text| !text.is_empty())
}

fn own_text(node: NodeRef<'_, Node>) -> String {
    let mut out = String::new();
    for child in node.children() {
        if let Node::Text(text) = child.value() {
            out.push_str(text);
            out.push(' ');
        }
    }
    out
}

fn has_class(element: ElementRef, class: &str) -> bool {
    element
        .value()
        .classes()
        .any(|c| c.eq_ignore_ascii_case(class))
}

/// Strips any currency/unit word so the presentation layer can append one
/// canonical unit.
pub fn normalize_price(text: &str) -> String {
    collapse_whitespace(&LETTERS.replace_all(text, " "))
}

/// Seller name from the node's literal text only, with any leaked
/// online/offline fragments removed.
fn seller_name(element: ElementRef, selectors: &CompiledSelectors) -> Option<String> {
    let node = first(element, &selectors.seller_name)?;
    let text = own_text(*node);
    let cleaned = collapse_whitespace(&STATUS_WORDS.replace_all(&text, " "));
    (!cleaned.is_empty()).then_some(cleaned)
}

fn seller_status(element: ElementRef, selectors: &CompiledSelectors) -> Option<String> {
    let node = first(element, &selectors.seller_status)?;
    let text = element_text(node);
    if !text.is_empty() {
        return Some(text);
    }
    if has_class(node, "online") {
        Some("Online".to_string())
    } else if has_class(node, "offline") {
        Some("Offline".to_string())
    } else {
        None
    }
}

/// Fields shared by both listing schemas.
fn common_fields(element: ElementRef, selectors: &CompiledSelectors, category: &str) -> ModuleRecord {
    ModuleRecord {
        name: text_of(element, &selectors.name).unwrap_or_default(),
        category: text_of(element, &selectors.category).unwrap_or_else(|| category.to_string()),
        socket_type: text_of(element, &selectors.socket),
        required_rank: text_of(element, &selectors.required_rank),
        price: text_of(element, &selectors.price)
            .map(|price| normalize_price(&price))
            .unwrap_or_default(),
        platform: text_of(element, &selectors.platform),
        reroll_count: text_of(element, &selectors.reroll),
        seller_name: seller_name(element, selectors),
        seller_status: seller_status(element, selectors),
        seller_rank: text_of(element, &selectors.seller_rank),
        reg_date: text_of(element, &selectors.reg_date),
        ..ModuleRecord::default()
    }
}

fn ancestor_stat(node: ElementRef, selectors: &CompiledSelectors) -> Option<Stat> {
    let raw = text_of(node, &selectors.stat_label).unwrap_or_else(|| element_text(node));
    if raw.is_empty() {
        return None;
    }
    let value = text_of(node, &selectors.stat_value);
    let mut stat = Stat::from_raw(raw, value);
    if !stat.positive && !stat.negative {
        if has_class(node, "negative") {
            stat.negative = true;
        } else if has_class(node, "positive") {
            stat.positive = true;
        }
    }
    Some(stat)
}

/// Extracts an ancestor-schema listing.
pub fn extract_ancestor(element: ElementRef, selectors: &CompiledSelectors) -> ModuleRecord {
    let mut record = common_fields(element, selectors, "Ancestor");
    if let Some(stat_selector) = selectors.stat.as_ref() {
        for node in element.select(stat_selector) {
            if let Some(stat) = ancestor_stat(node, selectors) {
                let attribute = stat.attribute();
                if !attribute.is_empty() {
                    record.attributes.insert(attribute);
                }
                record.stats.push(stat);
            }
        }
    }
    record
}

/// Extracts a trigger-schema listing. Each effect line keeps its trailing
/// numeric token in `raw`.
pub fn extract_trigger(element: ElementRef, selectors: &CompiledSelectors) -> ModuleRecord {
    let mut record = common_fields(element, selectors, "Trigger");
    if !record.is_trigger() {
        record.category = "Trigger".to_string();
    }
    let stat_selector = selectors.trigger_stat.as_ref().or(selectors.stat.as_ref());
    if let Some(stat_selector) = stat_selector {
        for node in element.select(stat_selector) {
            let raw = element_text(node);
            if raw.is_empty() {
                continue;
            }
            let (attribute, _) = split_trigger_stat(&raw);
            if !attribute.is_empty() {
                record.attributes.insert(attribute);
            }
            record.stats.push(Stat::from_raw(raw, None));
        }
    }
    record
}

fn is_trigger_listing(element: ElementRef, selectors: &CompiledSelectors) -> bool {
    let by_attribute = element
        .value()
        .attr(&selectors.kind_attribute)
        .is_some_and(|kind| kind.to_lowercase().contains("trigger"));
    by_attribute || has_class(element, "trigger")
}

/// Parses one listing's outer HTML, dispatching on its type indicator.
/// Unknown kinds use the ancestor schema. Fragments without an element or
/// without a name yield `None`.
pub fn extract_listing(fragment: &str, selectors: &CompiledSelectors) -> Option<ModuleRecord> {
    let html = Html::parse_fragment(fragment);
    let element = html.root_element().children().find_map(ElementRef::wrap)?;
    let record = if is_trigger_listing(element, selectors) {
        extract_trigger(element, selectors)
    } else {
        extract_ancestor(element, selectors)
    };
    (!record.name.is_empty()).then_some(record)
}

/// Parses serialized listing elements into records.
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    selectors: CompiledSelectors,
}

impl ListingExtractor {
    pub fn new(selectors: &ListingSelectors) -> Self {
        Self {
            selectors: CompiledSelectors::new(selectors),
        }
    }

    pub fn extract(&self, fragment: &str) -> Option<ModuleRecord> {
        extract_listing(fragment, &self.selectors)
    }

    pub fn extract_all(&self, fragments: &[String]) -> Vec<ModuleRecord> {
        fragments
            .iter()
            .filter_map(|fragment| self.extract(fragment))
            .collect()
    }
}
