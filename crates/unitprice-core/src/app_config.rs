use std::path::PathBuf;

/// How candidates are ordered when several price elements sit in one card
/// and share a priority tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Cheapest candidate wins.
    #[default]
    LowestPrice,
    /// First candidate in document order wins.
    DocumentOrder,
}

impl std::fmt::Display for TieBreak {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TieBreak::LowestPrice => write!(f, "lowest"),
            TieBreak::DocumentOrder => write!(f, "document"),
        }
    }
}

/// Base-price selection policy for cards exposing several price elements.
///
/// With `tiered` set, bonus/highlight-styled prices (tier 0) beat plain
/// prices (tier 1), which beat struck-through "old" prices (tier 2). Without
/// it every candidate sits in tier 1 and only `tie_break` decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricePolicy {
    pub tiered: bool,
    pub tie_break: TieBreak,
}

impl Default for PricePolicy {
    fn default() -> Self {
        Self {
            tiered: true,
            tie_break: TieBreak::LowestPrice,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of unit-size fields inspected per detection pass.
    pub detection_limit: usize,
    /// Coalescing window for mutation-triggered rescans.
    pub debounce_ms: u64,
    pub log_level: String,
    pub price_policy: PricePolicy,
    /// Optional YAML file overriding the page's structural markers.
    pub markers_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            detection_limit: 80,
            debounce_ms: 100,
            log_level: "info".to_string(),
            price_policy: PricePolicy::default(),
            markers_path: None,
        }
    }
}
