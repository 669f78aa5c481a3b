//! Unit-kind detection from the page's unit-size fields.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use unitprice_core::UnitKind;

use crate::page::Page;
use crate::Engine;

static DETECTORS: LazyLock<[(UnitKind, Regex); 5]> = LazyLock::new(|| {
    [
        (UnitKind::Weight, r"\b(kg|g)\b"),
        (UnitKind::Volume, r"\b(ml|cl|l|liter)\b"),
        (UnitKind::Wash, r"\bwasbeurt"),
        (UnitKind::Piece, r"\b(st\.?|stuk|stuks)\b"),
        (UnitKind::Length, r"\b(mm|cm|m|meter|meters)\b"),
    ]
    .map(|(kind, pattern)| (kind, Regex::new(pattern).expect("valid unit detector regex")))
});

/// Unit kinds mentioned in one size text, e.g. `"1 l / 1 kg"` → kg and l.
#[must_use]
pub fn classify_unit_text(text: &str) -> Vec<UnitKind> {
    let lower = text.to_lowercase();
    DETECTORS
        .iter()
        .filter(|(_, re)| re.is_match(&lower))
        .map(|(kind, _)| *kind)
        .collect()
}

/// Unit kinds observed in the first `detection_limit` unit-size fields,
/// in canonical order.
#[must_use]
pub fn detect_units_on_page(page: &Page, engine: &Engine) -> Vec<UnitKind> {
    let found: BTreeSet<UnitKind> = page
        .select(page.root(), &engine.markers.unit_size)
        .into_iter()
        .take(engine.detection_limit)
        .flat_map(|el| classify_unit_text(&page.text_content(el)))
        .collect();

    let units: Vec<UnitKind> = UnitKind::CANONICAL_ORDER
        .into_iter()
        .filter(|kind| found.contains(kind))
        .collect();
    tracing::debug!(units = ?units, "detected unit kinds");
    units
}
