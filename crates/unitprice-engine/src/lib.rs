pub mod controller;
pub mod debounce;
pub mod detect;
pub mod error;
pub mod extract;
pub mod label;
pub mod number;
pub mod page;
pub mod price;
pub mod quantity;
pub mod resolve;
pub mod sort;

pub use controller::{Controller, ScanReport, Session, SortOutcome};
pub use debounce::{debounce_notices, Debouncer};
pub use detect::{classify_unit_text, detect_units_on_page};
pub use error::EngineError;
pub use extract::{extract_price_and_quantity, Extraction};
pub use label::{format_unit_price, inject_unit_price_label, label_all_cards, LabeledCard};
pub use number::{parse_euro_price, parse_locale_number};
pub use page::{NodeId, Page};
pub use scraper::Selector;
pub use price::{apply_multi_buy_promotion, find_best_price_in_card, PriceInfo};
pub use quantity::parse_quantity;
pub use resolve::{resolve_unit_price, PriceOrigin, Resolution};
pub use sort::{sort_options, sort_product_groups, sort_products_by_unit, SortOption, SortedGroup};

use unitprice_core::{load_markers, EngineConfig, MarkerSelectors, PricePolicy};

/// Read-only settings shared by every extraction and scan.
#[derive(Debug, Clone)]
pub struct Engine {
    pub markers: MarkerSelectors,
    pub policy: PricePolicy,
    /// Maximum unit-size fields inspected per detection pass.
    pub detection_limit: usize,
}

impl Engine {
    #[must_use]
    pub fn new(config: &EngineConfig, markers: MarkerSelectors) -> Self {
        Self {
            markers,
            policy: config.price_policy,
            detection_limit: config.detection_limit,
        }
    }

    /// Builds an engine from configuration, reading page markers from
    /// `config.markers_path` when set.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if the markers file cannot be read,
    /// parsed, or compiled.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let markers = match &config.markers_path {
            Some(path) => {
                let markers = load_markers(path)?.compile()?;
                tracing::info!(path = %path.display(), "loaded page markers");
                markers
            }
            None => MarkerSelectors::default(),
        };
        Ok(Self::new(config, markers))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(&EngineConfig::default(), MarkerSelectors::default())
    }
}
