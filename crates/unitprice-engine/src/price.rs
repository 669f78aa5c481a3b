//! Base-price location and multi-buy promotion detection inside a card.

use std::sync::LazyLock;

use regex::Regex;
use unitprice_core::{PricePolicy, TieBreak};

use crate::number::{collapse_whitespace, min_numeric_value, parse_euro_price, parse_locale_number};
use crate::page::{NodeId, Page};
use crate::Engine;

static BUNDLE_SHIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+)\s*voor\s*(?:€\s*)?([0-9][0-9.,]*)").expect("valid bundle shield regex")
});

static FREE_ITEM_SHIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+)\s*\+\s*([0-9]+)\s*gratis").expect("valid free-item shield regex")
});

static WAS_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bwas\b").expect("valid old-price class regex"));

/// Price found for one card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceInfo {
    pub base_euro: f64,
    /// Per-item price under an active promotion; always below `base_euro`.
    pub promo_euro: Option<f64>,
    /// Element the base price was read from, used only to place labels.
    pub source: NodeId,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    price: f64,
    tier: u8,
    node: NodeId,
}

/// Reads the price held by one price-amount element.
///
/// An `aria-label` carrying a euro amount wins over visible text; the
/// visible fallback takes the smallest numeric run in the flattened text.
#[must_use]
pub fn parse_price_amount_element(page: &Page, el: NodeId) -> Option<f64> {
    let with_euro_label = if page.has_attr(el, "aria-label") {
        Some(el)
    } else {
        page.descendants(el).into_iter().find(|d| {
            page.attr(*d, "aria-label")
                .is_some_and(|label| label.contains('€'))
        })
    };
    if let Some(node) = with_euro_label {
        if let Some(price) = page.attr(node, "aria-label").and_then(parse_euro_price) {
            return Some(price);
        }
    }

    let any_label = first_with_aria_label(page, el);
    if let Some(node) = any_label.filter(|n| Some(*n) != with_euro_label) {
        if let Some(price) = page.attr(node, "aria-label").and_then(parse_euro_price) {
            return Some(price);
        }
    }

    let text = collapse_whitespace(&page.text_content(el));
    if text.is_empty() {
        return None;
    }
    min_numeric_value(&text)
}

fn first_with_aria_label(page: &Page, el: NodeId) -> Option<NodeId> {
    page.descendants(el)
        .into_iter()
        .find(|d| page.has_attr(*d, "aria-label"))
}

/// Priority tier of a price element: 0 for bonus/highlight styling, 2 for an
/// old (struck-through) price, 1 otherwise. Lower tiers are preferred.
fn price_tier(page: &Page, el: NodeId) -> u8 {
    let class_name = page.attr(el, "class").unwrap_or_default().to_lowercase();
    let aria_source = if page.has_attr(el, "aria-label") {
        Some(el)
    } else {
        first_with_aria_label(page, el)
    };
    let aria_lower = aria_source
        .and_then(|n| page.attr(n, "aria-label"))
        .unwrap_or_default()
        .to_lowercase();

    if class_name.contains("bonus") || class_name.contains("highlight") {
        0
    } else if WAS_CLASS.is_match(&class_name) || aria_lower.contains("oude prijs") {
        2
    } else {
        1
    }
}

fn is_better(candidate: &Candidate, best: &Candidate, policy: PricePolicy) -> bool {
    if candidate.tier != best.tier {
        return candidate.tier < best.tier;
    }
    match policy.tie_break {
        TieBreak::LowestPrice => candidate.price < best.price,
        TieBreak::DocumentOrder => false,
    }
}

/// Locates the card's base price and any promotional per-item price.
///
/// Price-amount elements are ranked by tier and then by the policy's
/// tie-break. When none of them yields a price, the first `€` amount in
/// the card's generic text containers is used instead, without promotion.
#[must_use]
pub fn find_best_price_in_card(page: &Page, card: NodeId, engine: &Engine) -> Option<PriceInfo> {
    let mut best: Option<Candidate> = None;

    for el in page.select(card, &engine.markers.price_amount) {
        let Some(price) = parse_price_amount_element(page, el) else {
            continue;
        };
        let tier = if engine.policy.tiered {
            price_tier(page, el)
        } else {
            1
        };
        let candidate = Candidate {
            price,
            tier,
            node: el,
        };
        if best.is_none_or(|b| is_better(&candidate, &b, engine.policy)) {
            best = Some(candidate);
        }
    }

    let Some(best) = best else {
        return find_fallback_price(page, card, engine);
    };

    let promo_euro = apply_multi_buy_promotion(page, card, best.price, engine)
        .filter(|promo| *promo < best.price);

    Some(PriceInfo {
        base_euro: best.price,
        promo_euro,
        source: best.node,
    })
}

fn find_fallback_price(page: &Page, card: NodeId, engine: &Engine) -> Option<PriceInfo> {
    page.select(card, &engine.markers.text_container)
        .into_iter()
        .find_map(|el| {
            parse_euro_price(&page.text_content(el)).map(|price| PriceInfo {
                base_euro: price,
                promo_euro: None,
                source: el,
            })
        })
}

/// Lowest per-item price implied by the card's promotion shields.
///
/// Returns the raw minimum; callers decide whether it undercuts the base.
#[must_use]
pub fn apply_multi_buy_promotion(
    page: &Page,
    card: NodeId,
    base_price: f64,
    engine: &Engine,
) -> Option<f64> {
    if !base_price.is_finite() {
        return None;
    }

    page.select(card, &engine.markers.shield_text)
        .into_iter()
        .filter_map(|el| promotion_per_item(&page.text_content(el), base_price))
        .reduce(f64::min)
}

/// Per-item price implied by one shield text.
///
/// - `"3 VOOR 5.00"` → `5.00 / 3`
/// - `"2 + 1 GRATIS"` → `base × 2 / 3`
#[must_use]
pub fn promotion_per_item(shield_text: &str, base_price: f64) -> Option<f64> {
    let text = collapse_whitespace(shield_text).to_lowercase();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = BUNDLE_SHIELD.captures(&text) {
        let qty = parse_locale_number(caps.get(1)?.as_str())?;
        let bundle_price = parse_locale_number(caps.get(2)?.as_str())?;
        if qty <= 0.0 {
            return None;
        }
        return Some(bundle_price / qty).filter(|v| v.is_finite());
    }

    let caps = FREE_ITEM_SHIELD.captures(&text)?;
    let pay_count = parse_locale_number(caps.get(1)?.as_str())?;
    let free_count = parse_locale_number(caps.get(2)?.as_str())?;
    if pay_count <= 0.0 {
        return None;
    }
    Some(base_price * pay_count / (pay_count + free_count)).filter(|v| v.is_finite())
}

#[cfg(test)]
#[path = "price_test.rs"]
mod tests;
