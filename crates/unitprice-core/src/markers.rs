//! Structural markers identifying the retailer's page regions.
//!
//! The engine is only as good as these markers: they name which elements are
//! product cards, price amounts, unit-size fields and promotion shields. Each
//! marker is a CSS selector list. The defaults describe the retailer's current
//! markup; a YAML file can replace any of them when the page changes.

use std::path::Path;

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Every marker the engine reads, as CSS selector source text. Missing YAML
/// keys keep their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageMarkers {
    /// Elements that may be a product card.
    pub card: String,
    /// The per-product price amount field.
    pub price_amount: String,
    /// The per-product package size field.
    pub unit_size: String,
    /// Promotion badge text fragments.
    pub shield_text: String,
    /// Generic containers scanned when the dedicated fields fail.
    pub text_container: String,
    /// Containers scanned for a native "/kg" price label.
    pub native_unit_price: String,
}

impl Default for PageMarkers {
    fn default() -> Self {
        Self {
            card: r#"[data-testhook*="product"], [data-testhook*="Product"], [data-testid*="product"], article, li"#
                .to_string(),
            price_amount: r#"[data-testid="price-amount"]"#.to_string(),
            unit_size: r#"[data-testid="product-unit-size"]"#.to_string(),
            shield_text: r#"[class*="shield_text"]"#.to_string(),
            text_container: "span, div, p".to_string(),
            native_unit_price: "span, div, p".to_string(),
        }
    }
}

/// Compiled form of [`PageMarkers`].
#[derive(Debug, Clone)]
pub struct MarkerSelectors {
    pub card: Selector,
    pub price_amount: Selector,
    pub unit_size: Selector,
    pub shield_text: Selector,
    pub text_container: Selector,
    pub native_unit_price: Selector,
}

impl Default for MarkerSelectors {
    fn default() -> Self {
        PageMarkers::default()
            .compile()
            .expect("valid default page markers")
    }
}

impl PageMarkers {
    /// Parses every marker into a [`Selector`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for a blank marker and
    /// `ConfigError::InvalidSelector` for one that is not valid CSS.
    pub fn compile(&self) -> Result<MarkerSelectors, ConfigError> {
        Ok(MarkerSelectors {
            card: compile_marker("card", &self.card)?,
            price_amount: compile_marker("price_amount", &self.price_amount)?,
            unit_size: compile_marker("unit_size", &self.unit_size)?,
            shield_text: compile_marker("shield_text", &self.shield_text)?,
            text_container: compile_marker("text_container", &self.text_container)?,
            native_unit_price: compile_marker("native_unit_price", &self.native_unit_price)?,
        })
    }
}

fn compile_marker(name: &str, css: &str) -> Result<Selector, ConfigError> {
    if css.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "marker '{name}' must not be empty"
        )));
    }
    Selector::parse(css).map_err(|e| ConfigError::InvalidSelector {
        marker: name.to_string(),
        reason: e.to_string(),
    })
}

/// Load and validate page markers from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_markers(path: &Path) -> Result<PageMarkers, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::MarkersFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_markers(&content)
}

fn parse_markers(content: &str) -> Result<PageMarkers, ConfigError> {
    let markers: PageMarkers =
        serde_yaml::from_str(content).map_err(ConfigError::MarkersFileParse)?;
    markers.compile()?;
    Ok(markers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_compile() {
        let markers = PageMarkers::default();
        assert!(markers.compile().is_ok());
        assert!(markers.card.contains("article"));
    }

    #[test]
    fn yaml_overrides_only_given_markers() {
        let yaml = r#"
price_amount: '[data-qa="price"]'
card: article.tile
"#;
        let markers = parse_markers(yaml).unwrap();
        assert_eq!(markers.price_amount, r#"[data-qa="price"]"#);
        assert_eq!(markers.card, "article.tile");
        assert_eq!(markers.unit_size, PageMarkers::default().unit_size);
    }

    #[test]
    fn empty_marker_is_rejected() {
        let err = parse_markers("card: ''\n").unwrap_err();
        assert!(err.to_string().contains("'card' must not be empty"));
    }

    #[test]
    fn invalid_css_is_rejected() {
        let err = parse_markers("shield_text: 'div[[['\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidSelector { ref marker, .. } if marker == "shield_text"
        ));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = parse_markers("card: [unclosed\n").unwrap_err();
        assert!(matches!(err, ConfigError::MarkersFileParse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_markers(Path::new("/nonexistent/markers.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::MarkersFileIo { .. }));
    }
}
