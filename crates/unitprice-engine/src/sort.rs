//! Reordering of product cards by unit price.
//!
//! Cards are grouped by the container that holds them and each group is
//! reordered in place by re-appending its cards. Layout sections such as
//! `<body>` or `<main>` are never reordered directly.

use std::cmp::Ordering;

use serde::Serialize;
use unitprice_core::UnitKind;

use crate::label::label_card;
use crate::page::{NodeId, Page};
use crate::Engine;

const LAYOUT_TAGS: &[&str] = &["html", "body", "main", "footer", "header"];

/// One card considered for sorting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortEntry {
    pub card: NodeId,
    pub container: NodeId,
    /// Sort value for the requested unit, `None` when the card has none.
    pub value: Option<f64>,
}

fn is_layout(page: &Page, id: NodeId) -> bool {
    page.tag(id).is_some_and(|tag| LAYOUT_TAGS.contains(&tag))
}

/// Container whose children are reordered for `card`.
fn sort_container(page: &Page, card: NodeId) -> Option<NodeId> {
    let parent = page.parent(card).filter(|p| page.is_element(*p))?;
    if !is_layout(page, parent) {
        return Some(parent);
    }
    page.parent(parent)
        .filter(|gp| page.is_element(*gp) && !is_layout(page, *gp))
}

/// Collects every card candidate sitting in a multi-child container.
///
/// Resolving a card for `kind` also refreshes its label.
pub fn collect_sort_entries(page: &mut Page, kind: UnitKind, engine: &Engine) -> Vec<SortEntry> {
    let mut entries = Vec::new();
    for card in page.select(page.root(), &engine.markers.card) {
        let Some(container) = sort_container(page, card) else {
            continue;
        };
        if page.element_children(container).len() < 2 {
            continue;
        }
        let value = label_card(page, card, &[kind], engine).map(|l| l.resolution.sort_value());
        entries.push(SortEntry {
            card,
            container,
            value,
        });
    }
    entries
}

/// Stable ordering by value; entries without a value always go last.
pub fn order_entries(entries: &mut [SortEntry], ascending: bool) {
    entries.sort_by(|a, b| match (a.value, b.value) {
        (Some(x), Some(y)) if ascending => x.total_cmp(&y),
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Cards of one container, in the order they were re-appended.
#[derive(Debug, Clone, PartialEq)]
pub struct SortedGroup {
    pub container: NodeId,
    pub entries: Vec<SortEntry>,
}

/// Groups entries by container, keeping first-seen document order.
fn group_by_container(entries: Vec<SortEntry>) -> Vec<SortedGroup> {
    let mut groups: Vec<SortedGroup> = Vec::new();
    for entry in entries {
        match groups.iter_mut().find(|g| g.container == entry.container) {
            Some(group) => group.entries.push(entry),
            None => groups.push(SortedGroup {
                container: entry.container,
                entries: vec![entry],
            }),
        }
    }
    groups
}

/// Sorts every product container on the page by `kind` unit price and
/// returns the groups that were reordered.
///
/// Containers with fewer than two priced cards are left alone and are not
/// returned. `None` means no card on the page has a unit price for `kind`.
pub fn sort_product_groups(
    page: &mut Page,
    kind: UnitKind,
    ascending: bool,
    engine: &Engine,
) -> Option<Vec<SortedGroup>> {
    let entries = collect_sort_entries(page, kind, engine);
    let priced = entries.iter().filter(|e| e.value.is_some()).count();
    if priced == 0 {
        tracing::info!(unit = %kind, "no products with a unit price on this page");
        return None;
    }

    let mut sorted = Vec::new();
    for mut group in group_by_container(entries) {
        if group.entries.iter().filter(|e| e.value.is_some()).count() < 2 {
            continue;
        }
        order_entries(&mut group.entries, ascending);
        group.entries.retain(|e| page.is_attached(e.card));
        for entry in &group.entries {
            page.append_child(group.container, entry.card);
        }
        sorted.push(group);
    }

    tracing::info!(
        unit = %kind,
        products = priced,
        containers = sorted.len(),
        direction = if ascending { "asc" } else { "desc" },
        "sorted products by unit price"
    );
    Some(sorted)
}

/// Sorts every product container on the page by `kind` unit price.
///
/// Returns `false` when no card on the page has a unit price for `kind`.
pub fn sort_products_by_unit(
    page: &mut Page,
    kind: UnitKind,
    ascending: bool,
    engine: &Engine,
) -> bool {
    sort_product_groups(page, kind, ascending, engine).is_some()
}

/// One entry of the unit-price sort menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortOption {
    pub id: String,
    pub unit: UnitKind,
    pub ascending: bool,
    pub label: String,
}

/// Ascending and descending options for each unit kind, in the given order.
#[must_use]
pub fn sort_options(units: &[UnitKind]) -> Vec<SortOption> {
    units
        .iter()
        .flat_map(|unit| {
            [true, false].map(|ascending| {
                let (direction, suffix) = if ascending {
                    ("asc", "laag-hoog")
                } else {
                    ("desc", "hoog-laag")
                };
                SortOption {
                    id: format!("ah-ext-option-sorting-unit-price-{unit}-{direction}"),
                    unit: *unit,
                    ascending,
                    label: format!("{} ({suffix})", unit.sort_name()),
                }
            })
        })
        .collect()
}
