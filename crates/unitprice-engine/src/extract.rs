//! Price-and-quantity extraction for one card and one unit kind.

use unitprice_core::{Quantity, UnitKind};

use crate::number::parse_euro_price;
use crate::page::{NodeId, Page};
use crate::price::{find_best_price_in_card, PriceInfo};
use crate::quantity::parse_quantity;
use crate::Engine;

/// Everything needed to compute a unit price for a card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extraction {
    pub base_euro: f64,
    pub promo_euro: Option<f64>,
    pub source: NodeId,
    pub quantity: Quantity,
}

/// Extracts the card's price and its package size as a `kind` quantity.
///
/// The price comes from the base-price locator and the size from the first
/// unit-size field. When either is missing, the card's generic text
/// containers are scanned in document order until both are known.
#[must_use]
pub fn extract_price_and_quantity(
    page: &Page,
    card: NodeId,
    kind: UnitKind,
    engine: &Engine,
) -> Option<Extraction> {
    let mut price = find_best_price_in_card(page, card, engine);
    let mut quantity = page
        .select_first(card, &engine.markers.unit_size)
        .and_then(|el| parse_quantity(&page.text_content(el), kind));

    if price.is_none() || quantity.is_none() {
        for el in page.select(card, &engine.markers.text_container) {
            let text = page.text_content(el);
            if price.is_none() {
                price = parse_euro_price(&text).map(|base_euro| PriceInfo {
                    base_euro,
                    promo_euro: None,
                    source: el,
                });
            }
            if quantity.is_none() {
                quantity = parse_quantity(&text, kind);
            }
            if price.is_some() && quantity.is_some() {
                break;
            }
        }
    }

    let price = price.filter(|p| p.base_euro.is_finite() && p.base_euro > 0.0)?;
    let quantity = quantity?;
    Some(Extraction {
        base_euro: price.base_euro,
        promo_euro: price.promo_euro,
        source: price.source,
        quantity,
    })
}

#[must_use]
pub fn extract_price_and_weight(page: &Page, card: NodeId, engine: &Engine) -> Option<Extraction> {
    extract_price_and_quantity(page, card, UnitKind::Weight, engine)
}

#[must_use]
pub fn extract_price_and_volume(page: &Page, card: NodeId, engine: &Engine) -> Option<Extraction> {
    extract_price_and_quantity(page, card, UnitKind::Volume, engine)
}

#[must_use]
pub fn extract_price_and_pieces(page: &Page, card: NodeId, engine: &Engine) -> Option<Extraction> {
    extract_price_and_quantity(page, card, UnitKind::Piece, engine)
}

#[must_use]
pub fn extract_price_and_length(page: &Page, card: NodeId, engine: &Engine) -> Option<Extraction> {
    extract_price_and_quantity(page, card, UnitKind::Length, engine)
}

#[must_use]
pub fn extract_price_and_washes(page: &Page, card: NodeId, engine: &Engine) -> Option<Extraction> {
    extract_price_and_quantity(page, card, UnitKind::Wash, engine)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(inner: &str) -> (Page, NodeId) {
        let page = Page::parse_html(&format!(
            r#"<html><body><article>{inner}</article></body></html>"#
        ));
        let card = page
            .select_first(page.root(), &Engine::default().markers.card)
            .expect("fixture card");
        (page, card)
    }

    #[test]
    fn uses_price_amount_and_unit_size_fields() {
        let (page, card) = card(
            r#"<span data-testid="price-amount" aria-label="€ 3,00">3.00</span>
               <span data-testid="product-unit-size">1,5 kg</span>"#,
        );
        let got = extract_price_and_weight(&page, card, &Engine::default()).expect("extraction");
        assert!((got.base_euro - 3.0).abs() < 1e-9);
        assert!((got.quantity.amount - 1.5).abs() < 1e-9);
        assert_eq!(got.quantity.kind, UnitKind::Weight);
    }

    #[test]
    fn falls_back_to_text_scan_for_quantity() {
        let (page, card) = card(
            r#"<span data-testid="price-amount" aria-label="€ 1,20">1.20</span>
               <p>Cola zero 6 x 33 cl</p>"#,
        );
        let got = extract_price_and_volume(&page, card, &Engine::default()).expect("extraction");
        assert!((got.quantity.amount - 1.98).abs() < 1e-9);
    }

    #[test]
    fn unit_size_for_other_kind_triggers_scan() {
        let (page, card) = card(
            r#"<span data-testid="price-amount" aria-label="€ 4,00">4.00</span>
               <span data-testid="product-unit-size">500 g</span>
               <p>10 stuks</p>"#,
        );
        let got = extract_price_and_pieces(&page, card, &Engine::default()).expect("extraction");
        assert!((got.quantity.amount - 10.0).abs() < 1e-9);
    }

    #[test]
    fn missing_quantity_is_none() {
        let (page, card) = card(r#"<span data-testid="price-amount" aria-label="€ 2,00">2</span>"#);
        assert!(extract_price_and_length(&page, card, &Engine::default()).is_none());
    }

    #[test]
    fn missing_price_is_none() {
        let (page, card) = card(r#"<span data-testid="product-unit-size">38 wasbeurten</span>"#);
        assert!(extract_price_and_washes(&page, card, &Engine::default()).is_none());
    }

    #[test]
    fn text_only_card_yields_both() {
        let (page, card) = card("<div>\n<p>€ 2,50</p>\n<p>2 x 20 wasbeurten</p>\n</div>");
        let got = extract_price_and_washes(&page, card, &Engine::default()).expect("extraction");
        assert!((got.base_euro - 2.5).abs() < 1e-9);
        assert!((got.quantity.amount - 40.0).abs() < 1e-9);
        assert!(got.promo_euro.is_none());
    }
}
