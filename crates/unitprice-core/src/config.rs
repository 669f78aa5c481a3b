use crate::app_config::{EngineConfig, PricePolicy, TieBreak};
use crate::ConfigError;

/// Load engine configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_engine_config() -> Result<EngineConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_engine_config_from_env()
}

/// Load engine configuration from environment variables already in the process.
///
/// Unlike [`load_engine_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_engine_config_from_env() -> Result<EngineConfig, ConfigError> {
    build_engine_config(|key| std::env::var(key))
}

/// Build engine configuration using the provided env-var lookup function.
///
/// Every variable is optional; absent variables fall back to
/// [`EngineConfig::default`].
fn build_engine_config<F>(lookup: F) -> Result<EngineConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let defaults = EngineConfig::default();

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_usize = |var: &str, default: usize| -> Result<usize, ConfigError> {
        let raw = or_default(var, &default.to_string());
        raw.trim()
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
        let raw = or_default(var, &default.to_string());
        raw.trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let detection_limit = parse_usize("UNITPRICE_DETECTION_LIMIT", defaults.detection_limit)?;
    if detection_limit == 0 {
        return Err(invalid(
            "UNITPRICE_DETECTION_LIMIT",
            "must be at least 1".to_string(),
        ));
    }

    let debounce_ms = parse_u64("UNITPRICE_DEBOUNCE_MS", defaults.debounce_ms)?;
    let log_level = or_default("UNITPRICE_LOG_LEVEL", &defaults.log_level);

    let tiered = parse_bool(&or_default("UNITPRICE_PRICE_TIERS", "true"))
        .ok_or_else(|| invalid("UNITPRICE_PRICE_TIERS", "expected true or false".to_string()))?;
    let tie_break = parse_tie_break(&or_default("UNITPRICE_PRICE_TIE_BREAK", "lowest"))?;

    let markers_path = lookup("UNITPRICE_MARKERS_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    Ok(EngineConfig {
        detection_limit,
        debounce_ms,
        log_level,
        price_policy: PricePolicy { tiered, tie_break },
        markers_path,
    })
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string into a `TieBreak` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_tie_break(s: &str) -> Result<TieBreak, ConfigError> {
    match s.trim() {
        "lowest" => Ok(TieBreak::LowestPrice),
        "document" => Ok(TieBreak::DocumentOrder),
        other => Err(ConfigError::InvalidEnvVar {
            var: "UNITPRICE_PRICE_TIE_BREAK".to_string(),
            reason: format!("unknown tie-break '{other}'; expected lowest or document"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
