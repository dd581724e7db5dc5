//! Cross-ticker aggregation and summary statistics.
//!
//! The aggregate table is the union of every ticker's filtered rows sorted
//! by date. Rows sharing a date keep ticker processing order. Every summary
//! statistic is computed from per-ticker groups in ticker order, so the
//! statistics themselves do not depend on processing order.

use crate::domain::bar::TransformedBar;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateTable {
    rows: Vec<TransformedBar>,
}

impl AggregateTable {
    /// Concatenate per-ticker tables in the given order, then stable-sort by date.
    pub fn from_tables<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = Vec<TransformedBar>>,
    {
        let mut rows: Vec<TransformedBar> = tables.into_iter().flatten().collect();
        rows.sort_by_key(|r| r.date);
        Self { rows }
    }

    pub fn rows(&self) -> &[TransformedBar] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows partitioned by ticker, each partition in date order.
    pub fn by_ticker(&self) -> BTreeMap<&str, Vec<&TransformedBar>> {
        let mut groups: BTreeMap<&str, Vec<&TransformedBar>> = BTreeMap::new();
        for row in &self.rows {
            groups.entry(row.ticker.as_str()).or_default().push(row);
        }
        groups
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.rows.first()?.date, self.rows.last()?.date))
    }
}

/// A single filtered row seen as a trade: buy at close, sell at next open.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub ticker: String,
    pub date: NaiveDate,
    pub delta_pct: f64,
}

/// A ticker's mean delta with the date of its most extreme trade.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerMean {
    pub ticker: String,
    pub mean_delta: f64,
    /// Peak date for the best ticker, trough date for the worst.
    pub extreme_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStatistics {
    pub mean_delta: f64,
    pub transaction_count: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub ticker_means: BTreeMap<String, f64>,
    pub best_ticker: TickerMean,
    pub worst_ticker: TickerMean,
    pub best_trade: TradeRecord,
    pub worst_trade: TradeRecord,
}

impl SummaryStatistics {
    /// `None` when the table holds no row with a delta.
    ///
    /// Ties are resolved deterministically:
    /// - best/worst ticker: lexicographically smallest ticker among equal means
    /// - peak/trough date: earliest date among equal deltas
    /// - best/worst trade: earliest date, then smallest ticker
    pub fn compute(table: &AggregateTable) -> Option<Self> {
        let groups: BTreeMap<&str, Vec<TradeRecord>> = table
            .by_ticker()
            .into_iter()
            .map(|(ticker, rows)| (ticker, rows.into_iter().filter_map(trade_of).collect()))
            .filter(|(_, trades): &(&str, Vec<TradeRecord>)| !trades.is_empty())
            .collect();

        if groups.is_empty() {
            return None;
        }

        let mut total = 0.0_f64;
        let mut transaction_count = 0usize;
        let mut ticker_means = BTreeMap::new();
        for (ticker, trades) in &groups {
            let sum: f64 = trades.iter().map(|t| t.delta_pct).sum();
            total += sum;
            transaction_count += trades.len();
            ticker_means.insert(ticker.to_string(), sum / trades.len() as f64);
        }

        let (best_name, best_mean) = extreme_mean(&ticker_means, Ordering::Greater)?;
        let (worst_name, worst_mean) = extreme_mean(&ticker_means, Ordering::Less)?;

        let best_peak = extreme_trade(groups.get(best_name.as_str())?.iter(), Ordering::Greater)?;
        let worst_trough = extreme_trade(groups.get(worst_name.as_str())?.iter(), Ordering::Less)?;

        let all_trades = || groups.values().flatten();
        let best_trade = extreme_trade(all_trades(), Ordering::Greater)?;
        let worst_trade = extreme_trade(all_trades(), Ordering::Less)?;

        let first_date = all_trades().map(|t| t.date).min()?;
        let last_date = all_trades().map(|t| t.date).max()?;

        Some(Self {
            mean_delta: total / transaction_count as f64,
            transaction_count,
            first_date,
            last_date,
            best_ticker: TickerMean {
                ticker: best_name,
                mean_delta: best_mean,
                extreme_date: best_peak.date,
            },
            worst_ticker: TickerMean {
                ticker: worst_name,
                mean_delta: worst_mean,
                extreme_date: worst_trough.date,
            },
            ticker_means,
            best_trade,
            worst_trade,
        })
    }
}

fn trade_of(row: &TransformedBar) -> Option<TradeRecord> {
    Some(TradeRecord {
        ticker: row.ticker.clone(),
        date: row.date,
        delta_pct: row.delta_pct?,
    })
}

/// First ticker (in map order) whose mean is strictly beyond all earlier ones.
fn extreme_mean(means: &BTreeMap<String, f64>, direction: Ordering) -> Option<(String, f64)> {
    means
        .iter()
        .fold(None, |acc: Option<(&String, f64)>, (ticker, &mean)| match acc {
            Some((_, current)) if mean.total_cmp(&current) != direction => acc,
            _ => Some((ticker, mean)),
        })
        .map(|(ticker, mean)| (ticker.clone(), mean))
}

fn extreme_trade<'a, I>(trades: I, direction: Ordering) -> Option<TradeRecord>
where
    I: Iterator<Item = &'a TradeRecord>,
{
    trades
        .reduce(|current, candidate| {
            let replace = match candidate.delta_pct.total_cmp(&current.delta_pct) {
                Ordering::Equal => {
                    (candidate.date, &candidate.ticker) < (current.date, &current.ticker)
                }
                ordering => ordering == direction,
            };
            if replace { candidate } else { current }
        })
        .cloned()
}
