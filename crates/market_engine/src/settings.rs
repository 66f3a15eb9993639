use std::time::Duration;

use market_core::PollPolicy;
use serde::{Deserialize, Serialize};

/// CSS selectors that locate listing pieces on the marketplace page.
///
/// These are coupled to the site's current markup and expected to change,
/// so they live in configuration rather than in code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSelectors {
    pub listing: String,
    pub loader: String,
    /// Attribute on a listing element naming its module kind.
    pub kind_attribute: String,
    pub name: String,
    pub category: String,
    pub socket: String,
    pub required_rank: String,
    pub price: String,
    pub platform: String,
    pub reroll: String,
    pub seller_name: String,
    pub seller_status: String,
    pub seller_rank: String,
    pub reg_date: String,
    pub stat: String,
    pub stat_label: String,
    pub stat_value: String,
    pub trigger_stat: String,
    pub category_dropdown: String,
    pub name_input: String,
    pub platform_dropdown: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            listing: ".market-list .market-item".to_string(),
            loader: ".market-list .loading".to_string(),
            kind_attribute: "data-module-type".to_string(),
            name: ".item-name".to_string(),
            category: ".item-category".to_string(),
            socket: ".item-socket".to_string(),
            required_rank: ".item-rank".to_string(),
            price: ".item-price".to_string(),
            platform: ".item-platform".to_string(),
            reroll: ".item-reroll".to_string(),
            seller_name: ".seller .seller-name".to_string(),
            seller_status: ".seller .seller-status".to_string(),
            seller_rank: ".seller .seller-rank".to_string(),
            reg_date: ".item-date".to_string(),
            stat: ".item-stats .stat".to_string(),
            stat_label: ".stat-label".to_string(),
            stat_value: ".stat-value".to_string(),
            trigger_stat: ".item-effects .effect".to_string(),
            category_dropdown: "select[name='category']".to_string(),
            name_input: "input[name='keyword']".to_string(),
            platform_dropdown: "select[name='platform']".to_string(),
        }
    }
}

/// Timing, limits, and target page of the extraction controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub market_url: String,
    pub navigation_timeout_ms: u64,
    /// Wait after each setup action for the page's own lazy loading.
    pub settle_delay_ms: u64,
    pub poll_interval_ms: u64,
    pub max_polls: u32,
    pub stable_polls_required: u32,
    pub zero_result_timeout_ms: u64,
    pub headless: bool,
    pub selectors: ListingSelectors,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            market_url: "https://tfd.nexon.com/en/market".to_string(),
            navigation_timeout_ms: 30_000,
            settle_delay_ms: 8_000,
            poll_interval_ms: 700,
            max_polls: 60,
            stable_polls_required: 3,
            zero_result_timeout_ms: 30_000,
            headless: true,
            selectors: ListingSelectors::default(),
        }
    }
}

impl EngineSettings {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            max_polls: self.max_polls,
            stable_polls_required: self.stable_polls_required,
            zero_result_timeout: Duration::from_millis(self.zero_result_timeout_ms),
        }
    }
}
