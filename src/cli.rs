//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

use crate::adapters::console_report_adapter::ConsoleReportAdapter;
use crate::adapters::csv_history_adapter::CsvHistoryAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::universe_csv_adapter::UniverseCsvAdapter;
use crate::domain::config_validation::{parse_delimiter, validate_screen_config};
use crate::domain::error::GapscreenError;
use crate::domain::filter::Thresholds;
use crate::domain::screen::{self, ScreenConfig, ScreenReport};
use crate::domain::universe::{
    parse_codes, resolve_tickers, MarketSuffixes, DEFAULT_CURRENCY,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::history_port::HistoryPort;
use crate::ports::report_port::ReportPort;
use crate::ports::universe_port::UniversePort;

pub const DEFAULT_UNIVERSE_PATH: &str = "input.csv";

#[derive(Parser, Debug)]
#[command(name = "gapscreen", about = "Overnight gap screener for equity universes")]
pub struct Cli {
    /// Debug-level logging for gapscreen
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Screen the universe over the lookback window
    Scan {
        /// Number of calendar days to look back
        #[arg(short, long, visible_alias = "jours")]
        days: Option<u32>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Instrument list (Symbol, Market, Currency columns)
        #[arg(short, long)]
        universe: Option<PathBuf>,
        /// Comma-separated tickers, bypassing the universe file
        #[arg(long)]
        tickers: Option<String>,
        /// Read history from <TICKER>.csv files in this directory
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Export the aggregate table as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        workers: Option<usize>,
        /// Validate configuration and resolve tickers without fetching
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the resolved ticker list
    Tickers {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        universe: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Scan {
            days,
            config,
            universe,
            tickers,
            data_dir,
            output,
            workers,
            dry_run,
        } => {
            let options = ScanOptions {
                days,
                universe,
                tickers,
                data_dir,
                output,
                workers,
            };
            run_scan(config.as_ref(), &options, dry_run)
        }
        Command::Tickers { config, universe } => run_tickers(config.as_ref(), universe.as_deref()),
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct ScanOptions {
    pub days: Option<u32>,
    pub universe: Option<PathBuf>,
    pub tickers: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub workers: Option<usize>,
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    let Some(path) = path else {
        return Ok(FileConfigAdapter::empty());
    };
    log::info!("loading config from {}", path.display());
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = GapscreenError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        log::error!("{err}");
        ExitCode::from(&err)
    })
}

fn fail(err: GapscreenError) -> ExitCode {
    log::error!("{err}");
    ExitCode::from(&err)
}

pub fn build_screen_config(
    adapter: &dyn ConfigPort,
    options: &ScanOptions,
    as_of: NaiveDate,
) -> Result<ScreenConfig, GapscreenError> {
    let lookback_days = match options.days {
        Some(days) => days,
        None => {
            let days = adapter.get_int(
                "screen",
                "lookback_days",
                i64::from(screen::DEFAULT_LOOKBACK_DAYS),
            );
            u32::try_from(days).map_err(|_| GapscreenError::ConfigInvalid {
                section: "screen".into(),
                key: "lookback_days".into(),
                reason: format!("{days} is out of range"),
            })?
        }
    };
    if lookback_days == 0 || lookback_days > screen::MAX_LOOKBACK_DAYS {
        return Err(GapscreenError::ConfigInvalid {
            section: "screen".into(),
            key: "lookback_days".into(),
            reason: format!(
                "lookback_days must be between 1 and {}",
                screen::MAX_LOOKBACK_DAYS
            ),
        });
    }

    let defaults = Thresholds::default();
    let thresholds = Thresholds {
        price_floor: adapter.get_double("screen", "price_floor", defaults.price_floor),
        volume_floor: adapter.get_double("screen", "volume_floor", defaults.volume_floor),
        ratio_floor: adapter.get_double("screen", "ratio_floor", defaults.ratio_floor),
    };

    let workers = match options.workers {
        Some(n) => n,
        None => adapter.get_int("fetch", "workers", screen::DEFAULT_WORKERS as i64).max(1) as usize,
    };

    Ok(ScreenConfig {
        lookback_days,
        thresholds,
        workers: workers.max(1),
        as_of,
    })
}

/// Tickers from the `--tickers` list, or resolved from the universe file.
pub fn resolve_universe(
    adapter: &dyn ConfigPort,
    universe_override: Option<&Path>,
    tickers_override: Option<&str>,
) -> Result<Vec<String>, GapscreenError> {
    if let Some(list) = tickers_override {
        return parse_codes(list).map_err(|e| GapscreenError::ConfigInvalid {
            section: "cli".into(),
            key: "tickers".into(),
            reason: e.to_string(),
        });
    }

    let path = universe_override
        .map(Path::to_path_buf)
        .or_else(|| adapter.get_trimmed("universe", "path").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_UNIVERSE_PATH));
    let delimiter = adapter
        .get_trimmed("universe", "delimiter")
        .and_then(|d| parse_delimiter(&d))
        .unwrap_or(b';');
    let currency = adapter
        .get_trimmed("universe", "currency")
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
    let suffixes = match adapter.get_trimmed("universe", "markets") {
        Some(markets) => {
            MarketSuffixes::parse(&markets).map_err(|e| GapscreenError::ConfigInvalid {
                section: "universe".into(),
                key: "markets".into(),
                reason: e.to_string(),
            })?
        }
        None => MarketSuffixes::default(),
    };

    log::info!("reading universe from {}", path.display());
    let rows = UniverseCsvAdapter::new(path, delimiter).load_instruments()?;
    let tickers = resolve_tickers(&rows, &currency, &suffixes);
    log::info!(
        "{} tickers resolved from {} instrument rows ({})",
        tickers.len(),
        rows.len(),
        currency
    );
    Ok(tickers)
}

pub fn build_history_port(
    adapter: &dyn ConfigPort,
    data_dir_override: Option<&Path>,
    as_of: NaiveDate,
) -> Result<Box<dyn HistoryPort>, GapscreenError> {
    let data_dir = data_dir_override
        .map(Path::to_path_buf)
        .or_else(|| adapter.get_trimmed("fetch", "data_dir").map(PathBuf::from));
    let source = adapter
        .get_trimmed("fetch", "source")
        .unwrap_or_else(|| "yahoo".to_string());

    if data_dir_override.is_some() || source.eq_ignore_ascii_case("csv") {
        let dir = data_dir.ok_or_else(|| GapscreenError::ConfigMissing {
            section: "fetch".into(),
            key: "data_dir".into(),
        })?;
        log::info!("reading history from {}", dir.display());
        return Ok(Box::new(CsvHistoryAdapter::new(dir, as_of)));
    }

    build_yahoo_port(adapter)
}

#[cfg(feature = "yahoo")]
fn build_yahoo_port(adapter: &dyn ConfigPort) -> Result<Box<dyn HistoryPort>, GapscreenError> {
    use crate::adapters::yahoo_adapter::{YahooAdapter, YahooSettings, DEFAULT_TIMEOUT_SECS};

    let defaults = YahooSettings::default();
    let timeout = adapter.get_int("fetch", "timeout_secs", DEFAULT_TIMEOUT_SECS as i64).max(1);
    let settings = YahooSettings {
        base_url: adapter
            .get_trimmed("fetch", "base_url")
            .unwrap_or(defaults.base_url),
        timeout: std::time::Duration::from_secs(timeout as u64),
        diagnostics: adapter
            .get_trimmed("fetch", "log_level")
            .and_then(|l| l.parse().ok())
            .unwrap_or(defaults.diagnostics),
    };
    Ok(Box::new(YahooAdapter::new(settings)?))
}

#[cfg(not(feature = "yahoo"))]
fn build_yahoo_port(_adapter: &dyn ConfigPort) -> Result<Box<dyn HistoryPort>, GapscreenError> {
    Err(GapscreenError::ConfigInvalid {
        section: "fetch".into(),
        key: "source".into(),
        reason: "yahoo feature is required unless source = csv".into(),
    })
}

fn run_scan(config_path: Option<&PathBuf>, options: &ScanOptions, dry_run: bool) -> ExitCode {
    // Stage 1: Load and validate config
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_screen_config(&adapter) {
        return fail(e);
    }

    let as_of = chrono::Local::now().date_naive();
    let config = match build_screen_config(&adapter, options, as_of) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };

    // Stage 2: Resolve tickers
    let tickers = match resolve_universe(
        &adapter,
        options.universe.as_deref(),
        options.tickers.as_deref(),
    ) {
        Ok(t) => t,
        Err(e) => return fail(e),
    };

    if dry_run {
        println!("{} tickers detected", tickers.len());
        println!(
            "Window: {} days ({} to {}), {} workers",
            config.lookback_days,
            config.start_date(),
            config.as_of,
            config.workers
        );
        println!(
            "Thresholds: close > {}, volume_euros > {}, high/open > {}",
            config.thresholds.price_floor,
            config.thresholds.volume_floor,
            config.thresholds.ratio_floor
        );
        return ExitCode::SUCCESS;
    }

    // Stage 3: Build the history source
    let port = match build_history_port(&adapter, options.data_dir.as_deref(), as_of) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    // Stage 4: Screen, aggregate and report
    let report = match run_screen_pipeline(port.as_ref(), &tickers, &config) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    let output = options
        .output
        .clone()
        .or_else(|| adapter.get_trimmed("report", "output").map(PathBuf::from));
    match write_reports(&report, output, report_delimiter(&adapter)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}

pub fn run_screen_pipeline(
    port: &dyn HistoryPort,
    tickers: &[String],
    config: &ScreenConfig,
) -> Result<ScreenReport, GapscreenError> {
    let stop = AtomicBool::new(false);
    screen::run_screen(port, tickers, config, &stop)
}

/// `[report] delimiter`, comma when unset.
pub fn report_delimiter(adapter: &dyn ConfigPort) -> u8 {
    adapter
        .get_trimmed("report", "delimiter")
        .and_then(|d| parse_delimiter(&d))
        .unwrap_or(b',')
}

/// Console report, then the CSV export when an output path is set.
pub fn write_reports(
    report: &ScreenReport,
    output: Option<PathBuf>,
    delimiter: u8,
) -> Result<(), GapscreenError> {
    ConsoleReportAdapter::new().write(report)?;
    if let Some(path) = output {
        CsvReportAdapter::new(path)
            .with_delimiter(delimiter)
            .write(report)?;
    }
    Ok(())
}

fn run_tickers(config_path: Option<&PathBuf>, universe: Option<&Path>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_screen_config(&adapter) {
        return fail(e);
    }

    match resolve_universe(&adapter, universe, None) {
        Ok(tickers) => {
            for ticker in &tickers {
                println!("{}", ticker);
            }
            log::info!("{} tickers resolved", tickers.len());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}
