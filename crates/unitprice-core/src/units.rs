use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Normalization basis for a unit price.
///
/// Serializes to the fixed vocabulary `kg`, `l`, `wash`, `piece`, `m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    #[serde(rename = "kg")]
    Weight,
    #[serde(rename = "l")]
    Volume,
    #[serde(rename = "wash")]
    Wash,
    #[serde(rename = "piece")]
    Piece,
    #[serde(rename = "m")]
    Length,
}

impl UnitKind {
    /// Canonical ordering used for detection results and sort options.
    pub const CANONICAL_ORDER: [UnitKind; 5] = [
        UnitKind::Weight,
        UnitKind::Volume,
        UnitKind::Wash,
        UnitKind::Piece,
        UnitKind::Length,
    ];

    /// Identifier from the unit vocabulary (`"kg"`, `"l"`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UnitKind::Weight => "kg",
            UnitKind::Volume => "l",
            UnitKind::Wash => "wash",
            UnitKind::Piece => "piece",
            UnitKind::Length => "m",
        }
    }

    /// Unit suffix shown in injected labels, e.g. `"€ 1,20 / L"`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            UnitKind::Weight => "kg",
            UnitKind::Volume => "L",
            UnitKind::Wash => "wasbeurt",
            UnitKind::Piece => "st",
            UnitKind::Length => "m",
        }
    }

    /// Dutch sort-option name as rendered in the page's sorting dropdown.
    #[must_use]
    pub fn sort_name(self) -> &'static str {
        match self {
            UnitKind::Weight => "Prijs per kg",
            UnitKind::Volume => "Prijs per liter",
            UnitKind::Wash => "Prijs per wasbeurt",
            UnitKind::Piece => "Prijs per stuk",
            UnitKind::Length => "Prijs per meter",
        }
    }
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" => Ok(UnitKind::Weight),
            "l" => Ok(UnitKind::Volume),
            "wash" => Ok(UnitKind::Wash),
            "piece" => Ok(UnitKind::Piece),
            "m" => Ok(UnitKind::Length),
            other => Err(CoreError::UnknownUnit(other.to_string())),
        }
    }
}

/// A package size normalized to the canonical unit of its kind
/// (kg, L, pieces, m or washes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quantity {
    pub amount: f64,
    pub kind: UnitKind,
}

impl Quantity {
    /// Returns `None` unless `amount` is finite and strictly positive.
    #[must_use]
    pub fn new(amount: f64, kind: UnitKind) -> Option<Self> {
        (amount.is_finite() && amount > 0.0).then_some(Self { amount, kind })
    }
}

/// Unit price computed for one card during one scan.
///
/// `promo_value` is only ever set when it is strictly below `base_value`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnitPrice {
    pub kind: UnitKind,
    pub base_value: f64,
    pub promo_value: Option<f64>,
}

impl UnitPrice {
    /// Builds a unit price, rejecting a non-finite or non-positive base and
    /// dropping any promo value that does not undercut it.
    #[must_use]
    pub fn new(kind: UnitKind, base_value: f64, promo_value: Option<f64>) -> Option<Self> {
        if !base_value.is_finite() || base_value <= 0.0 {
            return None;
        }
        let promo_value =
            promo_value.filter(|p| p.is_finite() && *p > 0.0 && *p < base_value);
        Some(Self {
            kind,
            base_value,
            promo_value,
        })
    }

    /// The value products are ordered by: the promo unit price when one
    /// applies, otherwise the base unit price.
    #[must_use]
    pub fn sort_value(&self) -> f64 {
        self.promo_value.map_or(self.base_value, |p| p.min(self.base_value))
    }
}
