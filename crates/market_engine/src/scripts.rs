//! Scripts injected into the marketplace page.
//!
//! Every interpolated value goes through `serde_json` so it lands in the
//! script as a properly escaped JavaScript string literal.

use serde::Deserialize;

use crate::settings::ListingSelectors;

pub const SCROLL_TO_BOTTOM: &str = r#"(() => {
  const root = document.scrollingElement || document.documentElement || document.body;
  window.scrollTo(0, root.scrollHeight);
  return root.scrollHeight;
})()"#;

fn js_str(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Picks the `<select>` option whose value or label matches `wanted`
/// (case-insensitive) and fires the change events the page listens for.
fn select_option(selector: &str, wanted: &str) -> String {
    format!(
        r#"(() => {{
  const select = document.querySelector({selector});
  const wanted = {wanted}.trim().toLowerCase();
  if (!select || !wanted) return false;
  const option = Array.from(select.options || []).find(o =>
    (o.value || '').trim().toLowerCase() === wanted ||
    (o.textContent || '').trim().toLowerCase() === wanted);
  if (!option) return false;
  select.value = option.value;
  select.dispatchEvent(new Event('input', {{ bubbles: true }}));
  select.dispatchEvent(new Event('change', {{ bubbles: true }}));
  return true;
}})()"#,
        selector = js_str(selector),
        wanted = js_str(wanted),
    )
}

/// Setup step 1: module type / category dropdown.
pub fn select_category(selectors: &ListingSelectors, module_type: &str) -> String {
    select_option(&selectors.category_dropdown, module_type)
}

/// Setup step 2: free-text module name query.
pub fn enter_name(selectors: &ListingSelectors, name: &str) -> String {
    format!(
        r#"(() => {{
  const input = document.querySelector({selector});
  if (!input) return false;
  input.focus();
  input.value = {name};
  input.dispatchEvent(new Event('input', {{ bubbles: true }}));
  input.dispatchEvent(new Event('change', {{ bubbles: true }}));
  input.dispatchEvent(new KeyboardEvent('keydown', {{ key: 'Enter', bubbles: true }}));
  input.dispatchEvent(new KeyboardEvent('keyup', {{ key: 'Enter', bubbles: true }}));
  return true;
}})()"#,
        selector = js_str(&selectors.name_input),
        name = js_str(name),
    )
}

/// Setup step 3: platform dropdown.
pub fn select_platform(selectors: &ListingSelectors, platform: &str) -> String {
    select_option(&selectors.platform_dropdown, platform)
}

/// Poll step: serializes every rendered listing and reports loader state.
pub fn parse_pass(selectors: &ListingSelectors) -> String {
    format!(
        r#"(() => {{
  const items = Array.from(document.querySelectorAll({listing}));
  const loader = document.querySelector({loader});
  let loaderVisible = false;
  if (loader) {{
    const style = window.getComputedStyle(loader);
    loaderVisible = style.display !== 'none' && style.visibility !== 'hidden' && loader.offsetParent !== null;
  }}
  return {{
    listings: items.map(el => el.outerHTML),
    visibleCount: items.length,
    loaderVisible,
  }};
}})()"#,
        listing = js_str(&selectors.listing),
        loader = js_str(&selectors.loader),
    )
}

/// Result of one [`parse_pass`] injection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsePass {
    #[serde(default)]
    pub listings: Vec<String>,
    pub visible_count: usize,
    #[serde(default)]
    pub loader_visible: bool,
}

impl ParsePass {
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolated_values_are_escaped() {
        let script = enter_name(&ListingSelectors::default(), "Bob's \"module\"");
        assert!(script.contains(r#""Bob's \"module\"""#));
    }

    #[test]
    fn parse_pass_result_requires_visible_count() {
        let ok = ParsePass::from_value(serde_json::json!({
            "listings": ["<div></div>"],
            "visibleCount": 1,
        }))
        .unwrap();
        assert_eq!(ok.visible_count, 1);
        assert!(!ok.loader_visible);

        assert!(ParsePass::from_value(serde_json::json!({ "listings": [] })).is_err());
    }
}
