//! Unit-price labels injected next to each card's price.

use std::sync::LazyLock;

use scraper::Selector;
use unitprice_core::UnitKind;

use crate::detect::detect_units_on_page;
use crate::page::{NodeId, Page};
use crate::resolve::{resolve_unit_price, PriceOrigin, Resolution};
use crate::Engine;

pub const LABEL_CLASS: &str = "ah-ext-unit-price";
pub const BASE_LABEL_CLASS: &str = "ah-ext-unit-price-base";
pub const PROMO_LABEL_CLASS: &str = "ah-ext-unit-price-promo";

const BASE_LABEL_STYLE: &str = "font-size: 0.75rem; color: #555; margin-top: 2px;";
const PROMO_LABEL_STYLE: &str = "font-size: 0.75rem; color: #f60; margin-top: 0; font-weight: 600;";

static BASE_LABEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".ah-ext-unit-price-base").expect("valid base label selector")
});
static PROMO_LABEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".ah-ext-unit-price-promo").expect("valid promo label selector")
});

/// `1.6` with unit `"kg"` → `"€ 1,60 / kg"`.
#[must_use]
pub fn format_unit_price(value: f64, unit_label: &str) -> String {
    let euros = format!("{value:.2}").replace('.', ",");
    format!("€ {euros} / {unit_label}")
}

/// Creates or updates the base (and promo) label for one card.
///
/// Labels live under the parent of `source`, or under the card when there is
/// no source. Existing labels are reused so repeated passes never stack
/// them; the promo label is removed when no promo price applies.
pub fn inject_unit_price_label(
    page: &mut Page,
    card: NodeId,
    base_unit_price: f64,
    source: Option<NodeId>,
    unit_label: &str,
    promo_unit_price: Option<f64>,
) {
    if !base_unit_price.is_finite() || base_unit_price <= 0.0 {
        return;
    }
    let parent = source.and_then(|s| page.parent(s)).unwrap_or(card);

    if let Some(label) =
        find_or_create_label(page, parent, &BASE_LABEL, BASE_LABEL_CLASS, BASE_LABEL_STYLE)
    {
        set_text_if_changed(page, label, &format_unit_price(base_unit_price, unit_label));
    }

    match promo_unit_price.filter(|p| p.is_finite() && *p > 0.0) {
        Some(promo) => {
            if let Some(label) = find_or_create_label(
                page,
                parent,
                &PROMO_LABEL,
                PROMO_LABEL_CLASS,
                PROMO_LABEL_STYLE,
            ) {
                set_text_if_changed(page, label, &format_unit_price(promo, unit_label));
            }
        }
        None => {
            if let Some(label) = page.select_first(parent, &PROMO_LABEL) {
                page.detach(label);
            }
        }
    }
}

fn find_or_create_label(
    page: &mut Page,
    parent: NodeId,
    existing: &Selector,
    class: &str,
    style: &str,
) -> Option<NodeId> {
    if let Some(label) = page.select_first(parent, existing) {
        return Some(label);
    }
    let markup = format!(r#"<div class="{LABEL_CLASS} {class}" style="{style}"></div>"#);
    let label = page.create_fragment(&markup)?;
    page.append_child(parent, label);
    Some(label)
}

fn set_text_if_changed(page: &mut Page, node: NodeId, text: &str) {
    if page.text_content(node) != text {
        page.set_text(node, text);
    }
}

/// A card that received a unit price during a labeling pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledCard {
    pub card: NodeId,
    pub resolution: Resolution,
}

/// Labels one card with the first of `units` that resolves.
///
/// Cards showing a native per-kg price are reported but not labeled.
pub fn label_card(
    page: &mut Page,
    card: NodeId,
    units: &[UnitKind],
    engine: &Engine,
) -> Option<LabeledCard> {
    let resolution = units
        .iter()
        .find_map(|kind| resolve_unit_price(page, card, *kind, engine))?;

    if resolution.origin == PriceOrigin::Computed {
        let unit = resolution.unit_price;
        inject_unit_price_label(
            page,
            card,
            unit.base_value,
            resolution.source,
            unit.kind.label(),
            unit.promo_value,
        );
    }
    Some(LabeledCard { card, resolution })
}

/// Runs a labeling pass over every card candidate on the page.
///
/// When `units` is empty the page's unit kinds are detected first; a page
/// without any unit kind is left untouched.
pub fn label_all_cards(page: &mut Page, units: &[UnitKind], engine: &Engine) -> Vec<LabeledCard> {
    let detected;
    let units = if units.is_empty() {
        detected = detect_units_on_page(page, engine);
        detected.as_slice()
    } else {
        units
    };
    if units.is_empty() {
        tracing::debug!("no unit kinds on page, skipping labels");
        return Vec::new();
    }

    let cards = page.select(page.root(), &engine.markers.card);
    let candidates = cards.len();
    let labeled: Vec<LabeledCard> = cards
        .into_iter()
        .filter_map(|card| {
            let result = label_card(page, card, units, engine);
            if result.is_none() {
                tracing::debug!(card = ?card, "no unit price for card");
            }
            result
        })
        .collect();

    tracing::debug!(candidates, labeled = labeled.len(), "labeling pass complete");
    labeled
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: &str = r#"<html><body><ul>
        <li data-testhook="product-card">
          <div class="price"><span data-testid="price-amount" aria-label="€ 3,00">3.00</span></div>
          <span data-testid="product-unit-size">1,5 kg</span>
        </li>
    </ul></body></html>"#;

    fn css(selector: &str) -> Selector {
        Selector::parse(selector).expect("valid test selector")
    }

    fn labels(page: &Page, class: &str) -> Vec<String> {
        page.select(page.root(), &css(&format!(".{class}")))
            .into_iter()
            .map(|n| page.text_content(n))
            .collect()
    }

    #[test]
    fn format_uses_comma_and_two_decimals() {
        assert_eq!(format_unit_price(1.6, "kg"), "€ 1,60 / kg");
        assert_eq!(format_unit_price(12.346, "L"), "€ 12,35 / L");
    }

    #[test]
    fn label_is_placed_next_to_price_source() {
        let mut page = Page::parse_html(CARD);
        let labeled = label_all_cards(&mut page, &[UnitKind::Weight], &Engine::default());
        assert_eq!(labeled.len(), 1);

        let price_wrapper = page
            .select_first(page.root(), &css(".price"))
            .expect("price wrapper");
        let label = page
            .select_first(price_wrapper, &BASE_LABEL)
            .expect("base label");
        assert_eq!(page.text_content(label), "€ 2,00 / kg");
        assert_eq!(page.attr(label, "class"), Some("ah-ext-unit-price ah-ext-unit-price-base"));
    }

    #[test]
    fn repeated_passes_keep_one_label() {
        let mut page = Page::parse_html(CARD);
        let engine = Engine::default();
        label_all_cards(&mut page, &[], &engine);
        label_all_cards(&mut page, &[], &engine);
        assert_eq!(labels(&page, BASE_LABEL_CLASS), vec!["€ 2,00 / kg"]);
    }

    #[test]
    fn promo_label_added_then_removed() {
        let mut page = Page::parse_html(CARD);
        let card = page
            .select_first(page.root(), &Engine::default().markers.card)
            .expect("card");
        inject_unit_price_label(&mut page, card, 2.0, None, "kg", Some(1.6));
        assert_eq!(labels(&page, PROMO_LABEL_CLASS), vec!["€ 1,60 / kg"]);

        inject_unit_price_label(&mut page, card, 2.0, None, "kg", None);
        assert!(labels(&page, PROMO_LABEL_CLASS).is_empty());
        assert_eq!(labels(&page, BASE_LABEL_CLASS), vec!["€ 2,00 / kg"]);
    }

    #[test]
    fn invalid_base_is_ignored() {
        let mut page = Page::parse_html(CARD);
        let card = page
            .select_first(page.root(), &Engine::default().markers.card)
            .expect("card");
        inject_unit_price_label(&mut page, card, f64::NAN, None, "kg", None);
        inject_unit_price_label(&mut page, card, 0.0, None, "kg", None);
        assert!(labels(&page, LABEL_CLASS).is_empty());
    }

    #[test]
    fn native_per_kg_cards_are_not_labeled() {
        let mut page = Page::parse_html(
            r#"<html><body><article>
                <span data-testid="price-amount" aria-label="€ 3,00">3.00</span>
                <span data-testid="product-unit-size">1,5 kg</span>
                <p>€ 1,99/kg</p>
            </article></body></html>"#,
        );
        let labeled = label_all_cards(&mut page, &[], &Engine::default());
        assert_eq!(labeled.len(), 1);
        assert_eq!(labeled[0].resolution.origin, PriceOrigin::NativeLabel);
        assert!(labels(&page, LABEL_CLASS).is_empty());
    }

    #[test]
    fn page_without_units_is_untouched() {
        let mut page = Page::parse_html(
            r#"<html><body><article><span data-testid="price-amount">€ 1,00</span></article></body></html>"#,
        );
        let before = page.to_html();
        assert!(label_all_cards(&mut page, &[], &Engine::default()).is_empty());
        assert_eq!(page.to_html(), before);
    }

    #[test]
    fn falls_through_units_until_one_resolves() {
        let mut page = Page::parse_html(
            r#"<html><body><article>
                <span data-testid="price-amount" aria-label="€ 2,00">2.00</span>
                <span data-testid="product-unit-size">4 stuks</span>
            </article></body></html>"#,
        );
        let labeled = label_all_cards(
            &mut page,
            &[UnitKind::Weight, UnitKind::Piece],
            &Engine::default(),
        );
        assert_eq!(labeled[0].resolution.unit_price.kind, UnitKind::Piece);
        assert_eq!(labels(&page, BASE_LABEL_CLASS), vec!["€ 0,50 / st"]);
    }
}
