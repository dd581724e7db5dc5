//! End-to-end screening through the domain pipeline with a mock history port.

mod common;

use approx::assert_relative_eq;
use common::*;
use gapscreen::adapters::console_report_adapter::render;
use gapscreen::domain::screen::{run_screen, ScreenReport};
use gapscreen::domain::universe::{resolve_tickers, InstrumentRow, MarketSuffixes};
use proptest::prelude::*;
use std::sync::atomic::AtomicBool;

fn screen(port: &MockHistoryPort, list: &[&str]) -> ScreenReport {
    run_screen(port, &tickers(list), &sample_config(), &AtomicBool::new(false)).unwrap()
}

mod pipeline {
    use super::*;

    #[test]
    fn two_bar_gap_is_selected() {
        let port = MockHistoryPort::new().with_bars(
            "AAA",
            vec![
                make_bar("2024-06-03", 10.0, 12.0, 11.0, 200_000.0),
                make_bar("2024-06-04", 11.5, 11.6, 11.4, 150_000.0),
            ],
        );

        let report = screen(&port, &["AAA"]);

        assert_eq!(report.table.len(), 1);
        let row = &report.table.rows()[0];
        assert_eq!(row.ticker, "AAA");
        assert_eq!(row.date, date(2024, 6, 3));
        assert_eq!(row.next_open, Some(11.5));
        assert_relative_eq!(row.high_open_ratio.unwrap(), 1.2, epsilon = 1e-12);
        assert_relative_eq!(row.delta_pct.unwrap(), 100.0 * 0.5 / 11.0, epsilon = 1e-9);
        assert_relative_eq!(row.volume_euros, 2_200_000.0, epsilon = 1e-6);

        let summary = report.summary.as_ref().unwrap();
        assert_eq!(summary.transaction_count, 1);
        assert_eq!(summary.best_ticker.ticker, "AAA");
        assert_eq!(summary.worst_ticker.ticker, "AAA");
    }

    #[test]
    fn empty_universe_makes_no_fetch_calls() {
        let rows: Vec<InstrumentRow> = Vec::new();
        let resolved = resolve_tickers(&rows, "EUR", &MarketSuffixes::default());
        let port = MockHistoryPort::new();

        let report = run_screen(&port, &resolved, &sample_config(), &AtomicBool::new(false))
            .unwrap();

        assert_eq!(port.calls(), 0);
        assert_eq!(report.tickers_detected, 0);
        assert!(report.table.is_empty());
        assert!(report.summary.is_none());

        let text = render(&report);
        assert!(text.starts_with("0 tickers detected"));
        assert!(!text.contains("Mean delta"));
    }

    #[test]
    fn last_bar_gap_is_a_near_miss_not_a_failure() {
        let port = MockHistoryPort::new().with_bars(
            "LAST",
            vec![
                flat_bar("2024-06-06", 20.0),
                gap_bar("2024-06-07", 20.0),
            ],
        );

        let report = screen(&port, &["LAST"]);

        assert!(report.table.is_empty());
        assert_eq!(report.failed_downloads(), 0);
        assert_eq!(report.near_miss_count(), 1);
        assert_eq!(report.near_misses[0].dates, vec![date(2024, 6, 7)]);
    }

    #[test]
    fn failing_ticker_does_not_abort_batch() {
        let port = MockHistoryPort::new()
            .with_bars(
                "GOOD.PA",
                vec![gap_bar("2024-06-03", 10.0), flat_bar("2024-06-04", 10.5)],
            )
            .with_error("BAD.PA", "connection reset")
            .with_bars("EMPTY.PA", Vec::new());

        let report = screen(&port, &["BAD.PA", "GOOD.PA", "EMPTY.PA"]);

        assert_eq!(port.calls(), 3);
        assert_eq!(report.tickers_detected, 3);
        assert_eq!(report.failed_downloads(), 2);
        assert!(report.failed_tickers.contains(&"BAD.PA".to_string()));
        assert!(report.failed_tickers.contains(&"EMPTY.PA".to_string()));
        assert_eq!(report.table.len(), 1);
        assert_eq!(report.table.rows()[0].ticker, "GOOD.PA");
    }

    #[test]
    fn incomplete_bars_are_skipped_before_shift() {
        let mut missing_close = gap_bar("2024-06-04", 12.0);
        missing_close.close = None;
        let port = MockHistoryPort::new().with_bars(
            "GAP.PA",
            vec![
                gap_bar("2024-06-03", 10.0),
                missing_close,
                flat_bar("2024-06-05", 11.0),
            ],
        );

        let report = screen(&port, &["GAP.PA"]);

        assert_eq!(report.table.len(), 1);
        assert_eq!(report.table.rows()[0].next_open, Some(11.0));
    }
}

mod aggregation {
    use super::*;

    fn three_ticker_port() -> MockHistoryPort {
        MockHistoryPort::new()
            .with_bars(
                "AAA.PA",
                vec![
                    gap_bar("2024-06-03", 10.0),
                    make_bar("2024-06-04", 11.0, 13.2, 11.0, 200_000.0),
                    flat_bar("2024-06-05", 10.0),
                ],
            )
            .with_bars(
                "BBB.AS",
                vec![gap_bar("2024-06-03", 50.0), flat_bar("2024-06-04", 49.0)],
            )
            .with_bars(
                "CCC.MI",
                vec![gap_bar("2024-06-04", 5.0), flat_bar("2024-06-05", 5.5)],
            )
    }

    #[test]
    fn table_is_sorted_by_date() {
        let report = screen(&three_ticker_port(), &["CCC.MI", "AAA.PA", "BBB.AS"]);

        let dates: Vec<_> = report.table.rows().iter().map(|r| r.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        assert_eq!(report.table.len(), 4);
    }

    #[test]
    fn summary_identifies_winner_and_loser() {
        let report = screen(&three_ticker_port(), &["AAA.PA", "BBB.AS", "CCC.MI"]);
        let summary = report.summary.unwrap();

        // AAA: +10% then -9.0909%, BBB: -2%, CCC: +10%
        assert_eq!(summary.transaction_count, 4);
        assert_eq!(summary.best_ticker.ticker, "CCC.MI");
        assert_eq!(summary.worst_ticker.ticker, "BBB.AS");
        assert_eq!(summary.worst_trade.ticker, "AAA.PA");
        assert_eq!(summary.worst_trade.date, date(2024, 6, 4));
        assert_eq!(summary.best_trade.ticker, "AAA.PA");
        assert_eq!(summary.best_trade.date, date(2024, 6, 3));
        assert_eq!(summary.first_date, date(2024, 6, 3));
        assert_eq!(summary.last_date, date(2024, 6, 4));
    }

    #[test]
    fn summary_is_independent_of_ticker_order() {
        let port = three_ticker_port();
        let a = screen(&port, &["AAA.PA", "BBB.AS", "CCC.MI"]).summary;
        let b = screen(&port, &["CCC.MI", "BBB.AS", "AAA.PA"]).summary;
        assert_eq!(a, b);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn summary_ignores_processing_order(
        closes in prop::collection::vec(1.0f64..100.0, 2..6),
        shift in 0usize..6,
    ) {
        let names: Vec<String> = (0..closes.len()).map(|i| format!("T{i}.PA")).collect();
        let mut port = MockHistoryPort::new();
        for (name, close) in names.iter().zip(&closes) {
            port = port.with_bars(
                name,
                vec![gap_bar("2024-06-03", *close), flat_bar("2024-06-04", close * 1.03)],
            );
        }

        let mut rotated = names.clone();
        rotated.rotate_left(shift % names.len());

        let config = sample_config();
        let stop = AtomicBool::new(false);
        let a = run_screen(&port, &names, &config, &stop).unwrap();
        let b = run_screen(&port, &rotated, &config, &stop).unwrap();

        prop_assert_eq!(a.table.len(), b.table.len());
        prop_assert_eq!(a.summary, b.summary);
    }
}
