//! Command handlers for the CLI.
//!
//! Each handler reads one saved listing page, runs the engine over it and
//! prints a plain-text (or JSON) summary. Annotated pages are only written
//! when an output path is given.

use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use unitprice_core::UnitKind;
use unitprice_engine::label::LabeledCard;
use unitprice_engine::{
    detect_units_on_page, format_unit_price, sort_options, Controller, NodeId, Page, PriceOrigin,
    SortedGroup,
};

const NAME_WIDTH: usize = 40;

async fn read_page(path: &Path) -> anyhow::Result<Page> {
    let html = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read page {}", path.display()))?;
    Ok(Page::parse_html(&html))
}

async fn write_page(page: &Page, path: &Path) -> anyhow::Result<()> {
    tokio::fs::write(path, page.to_html())
        .await
        .with_context(|| format!("failed to write page {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote annotated page");
    Ok(())
}

/// Short name for a card: its `id` attribute, else its leading text.
pub(crate) fn card_name(page: &Page, card: NodeId) -> String {
    if let Some(id) = page.attr(card, "id") {
        return id.to_string();
    }
    let text = page
        .text_content(card)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if text.chars().count() > NAME_WIDTH {
        format!("{}...", text.chars().take(NAME_WIDTH).collect::<String>())
    } else {
        text
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CardRow {
    pub card: String,
    pub unit: UnitKind,
    pub base: f64,
    pub promo: Option<f64>,
    pub sort_value: f64,
    pub origin: PriceOrigin,
}

pub(crate) fn card_rows(page: &Page, labeled: &[LabeledCard]) -> Vec<CardRow> {
    labeled
        .iter()
        .map(|l| {
            let price = l.resolution.unit_price;
            CardRow {
                card: card_name(page, l.card),
                unit: price.kind,
                base: price.base_value,
                promo: price.promo_value,
                sort_value: l.resolution.sort_value(),
                origin: l.resolution.origin,
            }
        })
        .collect()
}

fn print_rows(rows: &[CardRow]) {
    println!("{:<46}{:<20}PROMO", "CARD", "UNIT PRICE");
    for row in rows {
        let label = row.unit.label();
        let promo = row
            .promo
            .map(|p| format_unit_price(p, label))
            .unwrap_or_default();
        println!(
            "{:<46}{:<20}{}",
            row.card,
            format_unit_price(row.base, label),
            promo
        );
    }
}

/// Label every card on the page and print the resolved unit prices.
///
/// # Errors
///
/// Returns an error if the page cannot be read, the JSON cannot be
/// serialized, or the annotated page cannot be written.
pub(crate) async fn run_label(
    controller: &mut Controller,
    file: &Path,
    output: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let mut page = read_page(file).await?;
    let report = controller.init(&mut page);
    let rows = card_rows(&page, &report.labeled);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else if rows.is_empty() {
        println!("no unit prices found on this page");
    } else {
        print_rows(&rows);
    }

    if let Some(path) = output {
        write_page(&page, path).await?;
    }
    Ok(())
}

/// Prints each reordered container with its cards in their new order.
fn print_groups(page: &Page, groups: &[SortedGroup], unit: UnitKind) {
    for (index, group) in groups.iter().enumerate() {
        if index > 0 {
            println!();
        }
        println!("container {} ({} cards)", index + 1, group.entries.len());
        println!("{:<6}{:<46}UNIT PRICE", "#", "CARD");
        for (position, entry) in group.entries.iter().enumerate() {
            let price = entry
                .value
                .map_or_else(|| "-".to_string(), |v| format_unit_price(v, unit.label()));
            println!("{:<6}{:<46}{}", position + 1, card_name(page, entry.card), price);
        }
    }
}

/// Sort the page's product cards by `unit` price and print the new order
/// of every reordered container.
///
/// # Errors
///
/// Returns an error if the page cannot be read or written.
pub(crate) async fn run_sort(
    controller: &mut Controller,
    file: &Path,
    unit: UnitKind,
    ascending: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let mut page = read_page(file).await?;
    controller.init(&mut page);

    match controller.sort_groups(&mut page, unit, ascending) {
        Some(groups) if groups.is_empty() => {
            println!(
                "no container holds two or more products with a price per {}",
                unit.label()
            );
        }
        Some(groups) => print_groups(&page, &groups, unit),
        None => println!("no products with a price per {} on this page", unit.label()),
    }

    if let Some(path) = output {
        write_page(&page, path).await?;
    }
    Ok(())
}

/// Print the unit kinds detected on the page and their sort options.
///
/// # Errors
///
/// Returns an error if the page cannot be read.
pub(crate) async fn run_units(controller: &Controller, file: &Path) -> anyhow::Result<()> {
    let page = read_page(file).await?;
    let units = detect_units_on_page(&page, controller.engine());
    if units.is_empty() {
        println!("no unit kinds found on this page");
        return Ok(());
    }

    println!("{:<8}{:<44}ID", "UNIT", "OPTION");
    for option in sort_options(&units) {
        println!("{:<8}{:<44}{}", option.unit.as_str(), option.label, option.id);
    }
    Ok(())
}
