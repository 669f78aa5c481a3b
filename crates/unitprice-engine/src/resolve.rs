//! Per-card unit-price resolution.
//!
//! Resolution never touches the page; the labeling pass decides what to
//! inject from the returned [`Resolution`].

use serde::Serialize;
use unitprice_core::{UnitKind, UnitPrice};

use crate::extract::extract_price_and_quantity;
use crate::number::parse_euro_per_kg;
use crate::page::{NodeId, Page};
use crate::Engine;

/// Where a resolved unit price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceOrigin {
    /// A per-kg label already rendered on the page.
    NativeLabel,
    /// Derived from the card's price and package size.
    Computed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub unit_price: UnitPrice,
    /// Element the price was read from; labels are placed next to it.
    pub source: Option<NodeId>,
    pub origin: PriceOrigin,
}

impl Resolution {
    #[must_use]
    pub fn sort_value(&self) -> f64 {
        self.unit_price.sort_value()
    }
}

/// Finds a visible `"<amount> /kg"` label inside the card.
#[must_use]
pub fn find_native_unit_price(page: &Page, card: NodeId, engine: &Engine) -> Option<(NodeId, f64)> {
    page.select(card, &engine.markers.native_unit_price)
        .into_iter()
        .find_map(|el| {
            let text = page.text_content(el);
            let looks_like_label = text.contains("/kg")
                && (text.contains('€') || text.chars().any(|c| c.is_ascii_digit()));
            if !looks_like_label {
                return None;
            }
            parse_euro_per_kg(&text)
                .filter(|v| v.is_finite() && *v > 0.0)
                .map(|value| (el, value))
        })
}

/// Resolves the card's unit price for `kind`.
///
/// For kg a native per-kg label is reused as-is. Otherwise the base and
/// promo prices are divided by the extracted quantity.
#[must_use]
pub fn resolve_unit_price(
    page: &Page,
    card: NodeId,
    kind: UnitKind,
    engine: &Engine,
) -> Option<Resolution> {
    if kind == UnitKind::Weight {
        if let Some((node, value)) = find_native_unit_price(page, card, engine) {
            return Some(Resolution {
                unit_price: UnitPrice::new(kind, value, None)?,
                source: Some(node),
                origin: PriceOrigin::NativeLabel,
            });
        }
    }

    let extraction = extract_price_and_quantity(page, card, kind, engine)?;
    let amount = extraction.quantity.amount;
    let base_value = extraction.base_euro / amount;
    let promo_value = extraction
        .promo_euro
        .filter(|p| *p > 0.0)
        .map(|p| p / amount);

    Some(Resolution {
        unit_price: UnitPrice::new(kind, base_value, promo_value)?,
        source: Some(extraction.source),
        origin: PriceOrigin::Computed,
    })
}
