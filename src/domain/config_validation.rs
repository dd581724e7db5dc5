//! Configuration validation.
//!
//! Validates config fields before a screening run starts.

use crate::domain::error::GapscreenError;
use crate::domain::screen::MAX_LOOKBACK_DAYS;
use crate::domain::universe::MarketSuffixes;
use crate::ports::config_port::ConfigPort;

pub fn validate_screen_config(config: &dyn ConfigPort) -> Result<(), GapscreenError> {
    validate_lookback(config)?;
    validate_floor(config, "price_floor")?;
    validate_floor(config, "volume_floor")?;
    validate_floor(config, "ratio_floor")?;
    validate_universe(config)?;
    validate_fetch(config)?;
    validate_delimiter(config, "report")?;
    Ok(())
}

/// Field delimiter from its name or literal character.
///
/// Names exist because `;` and `#` start comments in INI files.
pub fn parse_delimiter(value: &str) -> Option<u8> {
    match value.trim().to_lowercase().as_str() {
        "semicolon" => Some(b';'),
        "comma" => Some(b','),
        "tab" => Some(b'\t'),
        "pipe" => Some(b'|'),
        other if other.len() == 1 && other.is_ascii() => other.bytes().next(),
        _ => None,
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> GapscreenError {
    GapscreenError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_lookback(config: &dyn ConfigPort) -> Result<(), GapscreenError> {
    let Some(raw) = config.get_trimmed("screen", "lookback_days") else {
        return Ok(());
    };
    match raw.parse::<u32>() {
        Ok(days) if (1..=MAX_LOOKBACK_DAYS).contains(&days) => Ok(()),
        _ => Err(invalid(
            "screen",
            "lookback_days",
            &format!(
                "lookback_days must be a whole number of days between 1 and {MAX_LOOKBACK_DAYS}"
            ),
        )),
    }
}

fn validate_floor(config: &dyn ConfigPort, key: &str) -> Result<(), GapscreenError> {
    if let Some(raw) = config.get_trimmed("screen", key) {
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => {}
            _ => {
                return Err(invalid(
                    "screen",
                    key,
                    &format!("{key} must be a non-negative number"),
                ));
            }
        }
    }
    Ok(())
}

fn validate_delimiter(config: &dyn ConfigPort, section: &str) -> Result<(), GapscreenError> {
    if let Some(delimiter) = config.get_trimmed(section, "delimiter") {
        if parse_delimiter(&delimiter).is_none() {
            return Err(invalid(
                section,
                "delimiter",
                "delimiter must be a single ASCII character or one of semicolon, comma, tab, pipe",
            ));
        }
    }
    Ok(())
}

fn validate_universe(config: &dyn ConfigPort) -> Result<(), GapscreenError> {
    validate_delimiter(config, "universe")?;
    if let Some(markets) = config.get_trimmed("universe", "markets") {
        MarketSuffixes::parse(&markets)
            .map_err(|e| invalid("universe", "markets", &e.to_string()))?;
    }
    Ok(())
}

fn validate_fetch(config: &dyn ConfigPort) -> Result<(), GapscreenError> {
    if config.get_int("fetch", "workers", 4) < 1 {
        return Err(invalid("fetch", "workers", "workers must be at least 1"));
    }
    if config.get_int("fetch", "timeout_secs", 20) < 1 {
        return Err(invalid(
            "fetch",
            "timeout_secs",
            "timeout_secs must be at least 1",
        ));
    }
    match config.get_trimmed("fetch", "source").as_deref() {
        None | Some("yahoo") => {}
        Some("csv") => {
            if config.get_trimmed("fetch", "data_dir").is_none() {
                return Err(GapscreenError::ConfigMissing {
                    section: "fetch".to_string(),
                    key: "data_dir".to_string(),
                });
            }
        }
        Some(_) => {
            return Err(invalid(
                "fetch",
                "source",
                "source must be 'yahoo' or 'csv'",
            ));
        }
    }
    if let Some(level) = config.get_trimmed("fetch", "log_level") {
        if level.parse::<log::Level>().is_err() {
            return Err(invalid(
                "fetch",
                "log_level",
                "log_level must be one of error, warn, info, debug, trace",
            ));
        }
    }
    Ok(())
}
