//! Ticker universe resolution.
//!
//! Maps exchange instrument rows (symbol, market name, currency) to data
//! source ticker identifiers by keeping a single currency and appending the
//! exchange suffix of the first matching market.

use std::collections::HashSet;

pub const DEFAULT_CURRENCY: &str = "EUR";

/// One row of the instrument list. Any field may be absent in the source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstrumentRow {
    pub symbol: Option<String>,
    pub market: Option<String>,
    pub currency: Option<String>,
}

impl InstrumentRow {
    pub fn new(symbol: &str, market: &str, currency: &str) -> Self {
        Self {
            symbol: Some(symbol.to_string()),
            market: Some(market.to_string()),
            currency: Some(currency.to_string()),
        }
    }
}

/// Ordered market-name substring to ticker suffix mapping. First match wins.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSuffixes {
    entries: Vec<(String, String)>,
}

impl Default for MarketSuffixes {
    fn default() -> Self {
        Self::new(vec![
            ("PARIS", ".PA"),
            ("AMSTERDAM", ".AS"),
            ("BRUSSELS", ".BR"),
            ("MILAN", ".MI"),
            ("LISBON", ".LS"),
            ("OSLO", ".OL"),
            ("DUBLIN", ".IR"),
        ])
    }
}

impl MarketSuffixes {
    pub fn new<K: Into<String>, S: Into<String>>(entries: Vec<(K, S)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, s)| (k.into().to_uppercase(), s.into()))
                .collect(),
        }
    }

    /// Parse `PARIS:.PA,AMSTERDAM:.AS` style mappings, preserving order.
    pub fn parse(input: &str) -> Result<Self, UniverseError> {
        let mut entries = Vec::new();
        for token in input.split(',') {
            let token = token.trim();
            if token.is_empty() {
                return Err(UniverseError::EmptyToken);
            }
            let (market, suffix) = token
                .split_once(':')
                .map(|(m, s)| (m.trim(), s.trim()))
                .filter(|(m, s)| !m.is_empty() && !s.is_empty())
                .ok_or_else(|| UniverseError::InvalidMarketMapping(token.to_string()))?;
            entries.push((market, suffix));
        }
        Ok(Self::new(entries))
    }

    pub fn suffix_for(&self, market: &str) -> Option<&str> {
        let market = market.to_uppercase();
        self.entries
            .iter()
            .find(|(key, _)| market.contains(key.as_str()))
            .map(|(_, suffix)| suffix.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum UniverseError {
    #[error("empty token in list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),

    #[error("invalid market mapping '{0}' (expected MARKET:SUFFIX)")]
    InvalidMarketMapping(String),
}

/// Resolve instrument rows into ticker identifiers.
///
/// Rows missing a field, quoted in another currency, or listed on an unknown
/// market are skipped without error. Duplicates are kept.
pub fn resolve_tickers(
    rows: &[InstrumentRow],
    currency: &str,
    suffixes: &MarketSuffixes,
) -> Vec<String> {
    rows.iter()
        .filter_map(|row| resolve_row(row, currency, suffixes))
        .collect()
}

fn resolve_row(row: &InstrumentRow, currency: &str, suffixes: &MarketSuffixes) -> Option<String> {
    let symbol = non_blank(row.symbol.as_deref())?;
    let market = non_blank(row.market.as_deref())?;
    let row_currency = non_blank(row.currency.as_deref())?;

    if !row_currency.eq_ignore_ascii_case(currency.trim()) {
        return None;
    }

    let suffix = suffixes.suffix_for(market)?;
    if symbol.ends_with(suffix) {
        Some(symbol.to_string())
    } else {
        Some(format!("{symbol}{suffix}"))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a comma-separated ticker list given on the command line.
pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}
