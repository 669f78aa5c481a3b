//! Package-size parsing from free-form size text.
//!
//! One [`QuantityParser`] exists per [`UnitKind`]; each is built from a
//! [`QuantityGrammar`] naming its unit tokens and sub-unit divisors. Every
//! parser tries the multipack form (`"6 x 33 cl"`) before the simple form
//! (`"330 ml"`) and reports the total in the kind's canonical unit.

use std::sync::LazyLock;

use regex::Regex;
use unitprice_core::{Quantity, UnitKind};

use crate::number::{collapse_whitespace, parse_locale_number};

/// Unit vocabulary for one unit kind.
#[derive(Debug)]
pub struct QuantityGrammar {
    pub kind: UnitKind,
    /// Regex alternatives for the unit token, tried left to right.
    pub tokens: &'static [&'static str],
    /// Divisor converting a sub-unit token into the canonical unit. Tokens
    /// not listed are already canonical.
    pub divisors: &'static [(&'static str, f64)],
    /// Require a word boundary right after the unit token.
    pub word_boundary: bool,
}

pub const GRAMMARS: [QuantityGrammar; 5] = [
    QuantityGrammar {
        kind: UnitKind::Weight,
        tokens: &["kg", "g"],
        divisors: &[("g", 1000.0)],
        word_boundary: true,
    },
    QuantityGrammar {
        kind: UnitKind::Volume,
        tokens: &["ml", "cl", "l", "liter"],
        divisors: &[("ml", 1000.0), ("cl", 100.0)],
        word_boundary: true,
    },
    QuantityGrammar {
        kind: UnitKind::Wash,
        tokens: &[r"wasbeurt\w*"],
        divisors: &[],
        word_boundary: false,
    },
    QuantityGrammar {
        kind: UnitKind::Piece,
        tokens: &["st", "stuk", "stuks", r"st\."],
        divisors: &[],
        word_boundary: true,
    },
    QuantityGrammar {
        kind: UnitKind::Length,
        tokens: &["mm", "cm", "m", "meter", "meters"],
        divisors: &[("mm", 1000.0), ("cm", 100.0)],
        word_boundary: true,
    },
];

#[derive(Debug)]
pub struct QuantityParser {
    kind: UnitKind,
    multipack: Regex,
    simple: Regex,
    divisors: &'static [(&'static str, f64)],
}

impl QuantityParser {
    /// Compiles the multipack and simple patterns for `grammar`.
    ///
    /// # Panics
    ///
    /// Panics if a grammar token is not a valid regex fragment; grammars are
    /// static, so this surfaces on first use in tests.
    #[must_use]
    pub fn new(grammar: &QuantityGrammar) -> Self {
        let alternatives = grammar.tokens.join("|");
        let boundary = if grammar.word_boundary { r"\b" } else { "" };
        let multipack = Regex::new(&format!(
            r"([0-9]+)\s*[x×]\s*([0-9]+[.,]?[0-9]*)\s*({alternatives}){boundary}"
        ))
        .expect("valid multipack regex");
        let simple = Regex::new(&format!(
            r"([0-9]+[.,]?[0-9]*)\s*({alternatives}){boundary}"
        ))
        .expect("valid simple quantity regex");

        Self {
            kind: grammar.kind,
            multipack,
            simple,
            divisors: grammar.divisors,
        }
    }

    #[must_use]
    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Parses `text` into a total amount in the canonical unit.
    ///
    /// A multipack match that fails numeric parsing does not fall through to
    /// the simple form; the size text is treated as unusable.
    #[must_use]
    pub fn parse(&self, text: &str) -> Option<f64> {
        let lower = collapse_whitespace(text).to_lowercase();

        if let Some(caps) = self.multipack.captures(&lower) {
            let count = parse_locale_number(caps.get(1)?.as_str())?;
            let amount = parse_locale_number(caps.get(2)?.as_str())?;
            let divisor = self.divisor(caps.get(3)?.as_str());
            return positive(count * amount / divisor);
        }

        let caps = self.simple.captures(&lower)?;
        let amount = parse_locale_number(caps.get(1)?.as_str())?;
        let divisor = self.divisor(caps.get(2)?.as_str());
        positive(amount / divisor)
    }

    fn divisor(&self, token: &str) -> f64 {
        self.divisors
            .iter()
            .find(|(unit, _)| *unit == token)
            .map_or(1.0, |(_, d)| *d)
    }
}

fn positive(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

static PARSERS: LazyLock<Vec<QuantityParser>> =
    LazyLock::new(|| GRAMMARS.iter().map(QuantityParser::new).collect());

/// The shared parser for `kind`.
#[must_use]
pub fn parser_for(kind: UnitKind) -> &'static QuantityParser {
    PARSERS
        .iter()
        .find(|p| p.kind == kind)
        .unwrap_or_else(|| unreachable!("every unit kind has a grammar"))
}

/// Parses `text` as a quantity of `kind`.
#[must_use]
pub fn parse_quantity(text: &str, kind: UnitKind) -> Option<Quantity> {
    parser_for(kind)
        .parse(text)
        .and_then(|amount| Quantity::new(amount, kind))
}

/// `"2 x 250 g"` → `0.5`.
#[must_use]
pub fn parse_weight_kg(text: &str) -> Option<f64> {
    parser_for(UnitKind::Weight).parse(text)
}

/// `"6 x 33 cl"` → `1.98`.
#[must_use]
pub fn parse_volume_liters(text: &str) -> Option<f64> {
    parser_for(UnitKind::Volume).parse(text)
}

/// `"3 x 10 stuks"` → `30`.
#[must_use]
pub fn parse_pieces(text: &str) -> Option<f64> {
    parser_for(UnitKind::Piece).parse(text)
}

/// `"50 cm"` → `0.5`.
#[must_use]
pub fn parse_length_meters(text: &str) -> Option<f64> {
    parser_for(UnitKind::Length).parse(text)
}

/// `"2 x 20 wasbeurten"` → `40`.
#[must_use]
pub fn parse_washes(text: &str) -> Option<f64> {
    parser_for(UnitKind::Wash).parse(text)
}

#[cfg(test)]
#[path = "quantity_test.rs"]
mod tests;
