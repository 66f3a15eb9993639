//! Lenient text-to-number parsing for the free-text fields of a listing.
//!
//! Every helper returns `None` instead of failing: the marketplace markup is
//! not under our control and partial fields are normal.
use std::sync::LazyLock;

use regex::Regex;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?\d+(?:\.\d+)?").expect("number pattern"));

static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("integer pattern"));

static AGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d+(?:\.\d+)?|an?|one)\s*(seconds?|secs?|minutes?|mins?|hours?|hrs?|days?|weeks?|months?|years?)\b",
    )
    .expect("age pattern")
});

/// Relative listing age expressed both in days and in hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Age {
    pub days: f64,
    pub hours: f64,
}

/// Price as a number, obtained by dropping every non-digit character.
///
/// `"1,250 Caliber"` parses as `1250`.
pub fn parse_price(price: &str) -> Option<f64> {
    let digits: String = price.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// First run of digits in the text, e.g. `"Mastery Rank 12"` -> `12`.
pub fn parse_first_int(text: &str) -> Option<i64> {
    INTEGER
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

/// Reroll counts show `-` (or nothing) for modules that were never rerolled.
pub fn parse_reroll(text: Option<&str>) -> Option<i64> {
    let text = text.map(str::trim).unwrap_or_default();
    if text.is_empty() || text == "-" {
        return Some(0);
    }
    parse_first_int(text)
}

/// First signed decimal number in the text, ignoring thousands separators.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned = text.replace(',', "");
    NUMBER
        .find(&cleaned)
        .and_then(|m| m.as_str().parse().ok())
}

/// Mean of every number found in the text, e.g. `"[+1.2%~+3.4%]"` -> `2.3`.
pub fn average_numbers(text: &str) -> Option<f64> {
    let cleaned = text.replace(',', "");
    let values: Vec<f64> = NUMBER
        .find_iter(&cleaned)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Parses a relative age phrase such as `"3 days ago"` or `"an hour ago"`.
///
/// Phrases measured in days or longer report hours as `days * 24`.
pub fn parse_age(text: &str) -> Option<Age> {
    let lowered = text.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    if lowered.contains("just now") || lowered == "now" || lowered == "today" {
        return Some(Age {
            days: 0.0,
            hours: 0.0,
        });
    }
    if lowered.contains("yesterday") {
        return Some(Age {
            days: 1.0,
            hours: 24.0,
        });
    }

    let caps = AGE.captures(&lowered)?;
    let amount = match &caps[1] {
        "a" | "an" | "one" => 1.0,
        digits => digits.parse::<f64>().ok()?,
    };
    let unit = &caps[2];
    let days = if unit.starts_with("sec") {
        amount / 86_400.0
    } else if unit.starts_with("min") {
        amount / 1_440.0
    } else if unit.starts_with('h') {
        amount / 24.0
    } else if unit.starts_with('d') {
        amount
    } else if unit.starts_with('w') {
        amount * 7.0
    } else if unit.starts_with("mon") {
        amount * 30.0
    } else {
        amount * 365.0
    };
    let hours = if unit.starts_with("sec") {
        amount / 3_600.0
    } else if unit.starts_with("min") {
        amount / 60.0
    } else if unit.starts_with('h') {
        amount
    } else {
        days * 24.0
    };
    Some(Age { days, hours })
}

/// Sign annotation carried by a stat line: `(+)` or `(-)`.
pub fn stat_sign(raw: &str) -> (bool, bool) {
    let trimmed = raw.trim_start();
    (trimmed.starts_with("(+)"), trimmed.starts_with("(-)"))
}

fn strip_sign_marker(raw: &str) -> &str {
    let trimmed = raw.trim_start();
    trimmed
        .strip_prefix("(+)")
        .or_else(|| trimmed.strip_prefix("(-)"))
        .unwrap_or(trimmed)
}

/// Canonical attribute label of a stat line.
///
/// Strips a leading `(+)`/`(-)` marker and truncates at the first `[` or `(`.
pub fn attribute_label(raw: &str) -> String {
    let body = strip_sign_marker(raw);
    let end = body.find(['[', '(']).unwrap_or(body.len());
    body[..end].trim().to_string()
}

/// Magnitude token at the end of a stat line: the bracketed range when there
/// is one, otherwise the last whitespace-separated word.
pub fn trailing_token(raw: &str) -> &str {
    let body = strip_sign_marker(raw);
    if let Some(idx) = body.find(['[', '(']) {
        return body[idx..].trim();
    }
    body.split_whitespace().last().unwrap_or("")
}

/// Splits a trigger stat line into its attribute name and trailing value.
///
/// `"Fire Resistance (Max) +12.5%"` yields `("Fire Resistance", Some(12.5))`.
pub fn split_trigger_stat(raw: &str) -> (String, Option<f64>) {
    let body = strip_sign_marker(raw).trim();
    let (label, value) = match body.rsplit_once(char::is_whitespace) {
        Some((head, tail)) => match parse_number(tail) {
            Some(value) => (head, Some(value)),
            None => (body, None),
        },
        None => (body, None),
    };
    let end = label.find('(').unwrap_or(label.len());
    (label[..end].trim().to_string(), value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_drops_units_and_separators() {
        assert_eq!(parse_price("1,250 Caliber"), Some(1250.0));
        assert_eq!(parse_price("Caliber"), None);
    }

    #[test]
    fn reroll_dash_is_zero() {
        assert_eq!(parse_reroll(Some("-")), Some(0));
        assert_eq!(parse_reroll(None), Some(0));
        assert_eq!(parse_reroll(Some("4 times")), Some(4));
        assert_eq!(parse_reroll(Some("n/a")), None);
    }

    #[test]
    fn day_phrases_multiply_hours() {
        let age = parse_age("3 days ago").unwrap();
        assert_eq!(age.days, 3.0);
        assert_eq!(age.hours, 72.0);
    }

    #[test]
    fn hour_and_minute_phrases() {
        let age = parse_age("an hour ago").unwrap();
        assert_eq!(age.hours, 1.0);
        assert!((age.days - 1.0 / 24.0).abs() < 1e-9);

        let age = parse_age("30 minutes ago").unwrap();
        assert_eq!(age.hours, 0.5);
        assert_eq!(parse_age("just now").unwrap().days, 0.0);
        assert!(parse_age("sometime").is_none());
    }

    #[test]
    fn labels_strip_marker_and_range() {
        assert_eq!(attribute_label("(+)Skill Power [+1.2%~+3.4%]"), "Skill Power");
        assert_eq!(attribute_label("(-)DEF (10 ~ 20)"), "DEF");
        assert_eq!(attribute_label("Plain"), "Plain");
        assert_eq!(stat_sign("(-)DEF"), (false, true));
    }

    #[test]
    fn trailing_token_prefers_brackets() {
        assert_eq!(trailing_token("(+)Skill Power [+1.2%~+3.4%]"), "[+1.2%~+3.4%]");
        assert_eq!(trailing_token("HP 120"), "120");
        assert!((average_numbers("[+1.2%~+3.4%]").unwrap() - 2.3).abs() < 1e-9);
    }

    #[test]
    fn trigger_split_takes_label_before_parenthesis() {
        assert_eq!(
            split_trigger_stat("Fire Resistance (Max) +12.5%"),
            ("Fire Resistance".to_string(), Some(12.5))
        );
        assert_eq!(
            split_trigger_stat("Unique Effect"),
            ("Unique Effect".to_string(), None)
        );
    }
}
