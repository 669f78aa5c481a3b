//! Locale-aware number and euro-amount parsing.
//!
//! Page text mixes `"1.234,56"` (Dutch) and `"12.5"` forms; the rule here is
//! fixed rather than locale-detected: when both separators appear, the comma
//! is the decimal separator.

use std::sync::LazyLock;

use regex::Regex;

static EURO_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"€\s*([0-9][0-9.,]*)").expect("valid euro amount regex"));

static NUMERIC_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9][0-9.,]*").expect("valid numeric run regex"));

static PER_KG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9][0-9.,]*)\s*/\s*kg").expect("valid per-kg regex")
});

/// Parses a locale-formatted number.
///
/// - `"1.234,56"` → `1234.56` (dots dropped, comma is the decimal separator)
/// - `"12,5"` → `12.5`
/// - `"12.5"` → `12.5`
///
/// Returns `None` for blank input, unparseable text, or non-finite results.
#[must_use]
pub fn parse_locale_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let has_comma = trimmed.contains(',');
    let has_dot = trimmed.contains('.');
    let normalized = if has_comma && has_dot {
        trimmed.replace('.', "").replacen(',', ".", 1)
    } else if has_comma {
        trimmed.replacen(',', ".", 1)
    } else {
        trimmed.to_string()
    };

    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Collapses every whitespace run to a single space and trims the ends.
#[must_use]
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses the first `€`-prefixed amount in `text`, e.g. `"Prijs: € 2,49"`.
#[must_use]
pub fn parse_euro_price(text: &str) -> Option<f64> {
    let normalized = collapse_whitespace(text);
    let caps = EURO_AMOUNT.captures(&normalized)?;
    parse_locale_number(caps.get(1)?.as_str())
}

/// Smallest parseable number among all numeric runs in `text`.
///
/// Price elements often split euros and cents into separate nodes, or carry
/// stray superscript digits; taking the minimum keeps the price itself
/// rather than a concatenation artefact.
#[must_use]
pub(crate) fn min_numeric_value(text: &str) -> Option<f64> {
    NUMERIC_RUN
        .find_iter(text)
        .filter_map(|m| parse_locale_number(m.as_str()))
        .reduce(f64::min)
}

/// Parses a native `"<amount> /kg"` unit-price label.
#[must_use]
pub(crate) fn parse_euro_per_kg(text: &str) -> Option<f64> {
    let normalized = collapse_whitespace(text);
    let caps = PER_KG.captures(&normalized)?;
    parse_locale_number(caps.get(1)?.as_str())
}
