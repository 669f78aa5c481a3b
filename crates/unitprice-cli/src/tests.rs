use std::time::Duration;

use unitprice_engine::{Engine, Page, Selector};

use super::*;

const PAGE: &str = r#"<html><body><ul>
    <li id="melk"><span data-testid="price-amount" aria-label="€ 1,20">1.20</span><span data-testid="product-unit-size">1 l</span></li>
    <li><span data-testid="price-amount" aria-label="€ 0,90">0.90</span><span data-testid="product-unit-size">500 ml</span><span>Karnemelk vol houdbaar extra romig familieverpakking</span></li>
</ul></body></html>"#;

fn controller() -> Controller {
    Controller::new(Engine::default(), Duration::from_millis(100))
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("unitprice-cli-{}-{name}", std::process::id()))
}

#[test]
fn parses_label_command_with_output_and_json() {
    let cli = Cli::try_parse_from(["unitprice", "label", "page.html", "-o", "out.html", "--json"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Label {
            ref file,
            output: Some(ref out),
            json: true,
        }) if file == &PathBuf::from("page.html") && out == &PathBuf::from("out.html")
    ));
}

#[test]
fn parses_sort_command_unit_and_direction() {
    let cli = Cli::try_parse_from(["unitprice", "sort", "page.html", "--unit", "KG", "--desc"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Sort {
            unit: UnitKind::Weight,
            desc: true,
            output: None,
            ..
        })
    ));
}

#[test]
fn sort_defaults_to_ascending() {
    let cli = Cli::try_parse_from(["unitprice", "sort", "page.html", "-u", "wash"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Sort {
            unit: UnitKind::Wash,
            desc: false,
            ..
        })
    ));
}

#[test]
fn sort_rejects_unknown_unit() {
    assert!(Cli::try_parse_from(["unitprice", "sort", "page.html", "--unit", "liter"]).is_err());
}

#[test]
fn sort_requires_unit() {
    assert!(Cli::try_parse_from(["unitprice", "sort", "page.html"]).is_err());
}

#[test]
fn parses_global_markers_flag() {
    let cli = Cli::try_parse_from(["unitprice", "units", "page.html", "--markers", "m.yaml"])
        .expect("expected valid cli args");
    assert_eq!(cli.markers, Some(PathBuf::from("m.yaml")));
    assert!(matches!(cli.command, Some(Commands::Units { .. })));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["unitprice"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn card_name_prefers_id_then_truncated_text() {
    let page = Page::parse_html(PAGE);
    let cards = page.select(page.root(), &Selector::parse("li").expect("valid selector"));
    assert_eq!(commands::card_name(&page, cards[0]), "melk");

    let name = commands::card_name(&page, cards[1]);
    assert!(name.ends_with("..."));
    assert_eq!(name.chars().count(), 43);
}

#[test]
fn card_rows_carry_unit_prices() {
    let mut page = Page::parse_html(PAGE);
    let report = controller().init(&mut page);
    let rows = commands::card_rows(&page, &report.labeled);

    let melk = rows.iter().find(|r| r.card == "melk").expect("melk row");
    assert_eq!(melk.unit, UnitKind::Volume);
    assert!((melk.base - 1.2).abs() < 1e-9);
    assert!(melk.promo.is_none());

    let json = serde_json::to_value(melk).expect("serialize row");
    assert_eq!(json["unit"], "l");
    assert_eq!(json["origin"], "computed");
}

#[tokio::test]
async fn run_label_writes_annotated_page() {
    let input = temp_path("label-in.html");
    let output = temp_path("label-out.html");
    tokio::fs::write(&input, PAGE).await.expect("write input");

    commands::run_label(&mut controller(), &input, Some(&output), true)
        .await
        .expect("label run");

    let written = tokio::fs::read_to_string(&output).await.expect("read output");
    assert!(written.contains("€ 1,20 / L"));
    assert!(written.contains("€ 1,80 / L"));

    tokio::fs::remove_file(&input).await.ok();
    tokio::fs::remove_file(&output).await.ok();
}

#[tokio::test]
async fn run_sort_writes_reordered_page() {
    let input = temp_path("sort-in.html");
    let output = temp_path("sort-out.html");
    tokio::fs::write(&input, PAGE).await.expect("write input");

    commands::run_sort(&mut controller(), &input, UnitKind::Volume, false, Some(&output))
        .await
        .expect("sort run");

    let written = tokio::fs::read_to_string(&output).await.expect("read output");
    let melk = written.find(r#"id="melk""#).expect("melk card");
    let karnemelk = written.find("Karnemelk").expect("karnemelk card");
    assert!(karnemelk < melk);

    tokio::fs::remove_file(&input).await.ok();
    tokio::fs::remove_file(&output).await.ok();
}

#[tokio::test]
async fn missing_page_is_an_error() {
    let err = commands::run_units(&controller(), &temp_path("missing.html"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("failed to read page"));
}
