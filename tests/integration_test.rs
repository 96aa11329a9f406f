//! Integration tests for the simulation core.
//!
//! Tests cover:
//! - Run requests through a mock data port (filtering, provider failure, short series)
//! - Bracket priority when one bar touches both levels
//! - RSI entries and exits on engineered series
//! - Single-binding passthrough independent of weight
//! - Balance identity and weight normalisation invariants (proptest)

mod common;

use approx::assert_relative_eq;
use common::*;
use proptest::prelude::*;
use signalbench::domain::aggregator::{BindingSet, StrategyBinding};
use signalbench::domain::backtest::{
    BacktestConfig, BacktestReport, BacktestRequest, run_backtest, run_request,
};
use signalbench::domain::error::SignalbenchError;
use signalbench::domain::position::{ExitReason, Position, Side};
use signalbench::domain::strategy::StrategyKind;

fn no_warmup() -> BacktestConfig {
    BacktestConfig {
        warmup_bars: 0,
        ..BacktestConfig::default()
    }
}

fn fast_ma_cross(weight: f64) -> StrategyBinding {
    let params = StrategyKind::MaCrossover
        .default_params()
        .with("shortPeriod", 2.0)
        .with("longPeriod", 3.0);
    StrategyBinding::new(StrategyKind::MaCrossover, weight).with_params(params)
}

fn request(symbol: &str, bindings: Vec<StrategyBinding>) -> BacktestRequest {
    BacktestRequest {
        bindings,
        symbol: symbol.to_string(),
        interval: "1h".to_string(),
        initial_balance: 10_000.0,
        from: None,
        to: None,
        take_profit_ratio: 3.0,
        config: BacktestConfig::default(),
    }
}

/// Final balance minus everything the trade log explains; should be zero.
fn unexplained_balance(report: &BacktestReport, last_close: f64) -> f64 {
    let realized: f64 = report.trades.iter().filter_map(|t| t.pnl).sum();
    let unrealized: f64 = report
        .trades
        .iter()
        .filter(|t| t.is_open())
        .map(|t| (last_close - t.entry_price) * t.quantity)
        .sum();
    report.final_balance - (report.initial_balance + realized + unrealized)
}

mod run_requests {
    use super::*;

    #[test]
    fn flat_series_with_ma_crossover_never_trades() {
        let bars: Vec<Bar> = (0..200).map(|i| flat_bar(i, 100.0)).collect();
        let port = MockDataPort::new().with_bars("BTCUSDT", bars);
        let req = request(
            "BTCUSDT",
            vec![StrategyBinding::new(StrategyKind::MaCrossover, 100.0)],
        );

        let report = run_request(&port, &req).unwrap();

        assert_eq!(report.trades.len(), 0);
        assert_eq!(report.metrics.total_trades, 0);
        assert_relative_eq!(report.final_balance, 10_000.0);
        assert_eq!(port.fetches.get(), 1);
    }

    #[test]
    fn range_is_forwarded_to_provider() {
        let port = MockDataPort::new().with_bars("BTCUSDT", wave_bars(300, 100.0));
        let mut req = request(
            "BTCUSDT",
            vec![StrategyBinding::new(StrategyKind::Rsi, 100.0)],
        );
        req.from = Some(100 * HOUR_MS);
        req.to = Some(199 * HOUR_MS);

        let report = run_request(&port, &req).unwrap();

        // 100 bars in range, 50 of them warm-up.
        assert_eq!(report.equity_curve.len(), 50);
        assert_eq!(report.equity_curve[0].timestamp, 150 * HOUR_MS);
    }

    #[test]
    fn provider_failure_is_fatal() {
        let port = MockDataPort::new().with_error("BTCUSDT", "connection refused");
        let req = request("BTCUSDT", vec![fast_ma_cross(100.0)]);

        let err = run_request(&port, &req).unwrap_err();

        assert!(matches!(err, SignalbenchError::Data { reason } if reason == "connection refused"));
    }

    #[test]
    fn fewer_than_two_bars_is_fatal() {
        let port = MockDataPort::new().with_bars("BTCUSDT", vec![flat_bar(0, 100.0)]);
        let req = request("BTCUSDT", vec![fast_ma_cross(100.0)]);

        let err = run_request(&port, &req).unwrap_err();

        assert!(matches!(
            err,
            SignalbenchError::InsufficientData { bars: 1, minimum: 2, .. }
        ));
    }

    #[test]
    fn unknown_symbol_has_no_bars() {
        let port = MockDataPort::new();
        let req = request("NOPE", vec![fast_ma_cross(100.0)]);
        assert!(matches!(
            run_request(&port, &req),
            Err(SignalbenchError::InsufficientData { bars: 0, .. })
        ));
    }
}

mod brackets {
    use super::*;

    #[test]
    fn take_profit_beats_stop_loss_on_the_same_bar() {
        let bars = vec![
            flat_bar(0, 100.0),
            flat_bar(1, 100.0),
            flat_bar(2, 100.0),
            Bar {
                high: 101.0,
                close: 101.0,
                ..flat_bar(3, 100.0)
            },
            Bar {
                high: 105.0,
                low: 95.0,
                ..flat_bar(4, 100.0)
            },
        ];

        let report = run_backtest(&bars, &[fast_ma_cross(100.0)], 10_000.0, 3.0, &no_warmup()).unwrap();

        assert_eq!(report.trades.len(), 1);
        let trade = &report.trades[0];
        assert_eq!(trade.exit_reason, Some(ExitReason::TakeProfit { ratio: 3.0 }));
        assert_relative_eq!(trade.exit_price.unwrap(), 101.0 * 1.03, epsilon = 1e-9);
        assert_eq!(trade.exit_timestamp, Some(4 * HOUR_MS));
    }

    #[test]
    fn stop_loss_exit_is_a_loss() {
        let bars = vec![
            flat_bar(0, 100.0),
            flat_bar(1, 100.0),
            flat_bar(2, 100.0),
            Bar {
                high: 101.0,
                close: 101.0,
                ..flat_bar(3, 100.0)
            },
            Bar {
                high: 101.0,
                low: 99.0,
                close: 99.5,
                ..flat_bar(4, 100.0)
            },
        ];

        let report = run_backtest(&bars, &[fast_ma_cross(100.0)], 10_000.0, 3.0, &no_warmup()).unwrap();

        let trade = &report.trades[0];
        assert_eq!(trade.exit_reason, Some(ExitReason::StopLoss));
        assert_relative_eq!(trade.exit_price.unwrap(), 101.0 * 0.99, epsilon = 1e-9);
        assert!(trade.pnl.unwrap() < 0.0);
        assert_eq!(report.metrics.losing_trades, 1);
        assert_relative_eq!(report.metrics.win_rate, 0.0);
    }

    proptest! {
        #[test]
        fn bracket_levels_depend_only_on_entry(entry in 1.0f64..10_000.0, ratio in 1.0f64..10.0) {
            let pos = Position {
                entry_price: entry,
                entry_timestamp: 0,
                side: Side::Long,
                quantity: 1.0,
            };
            prop_assert!((pos.stop_loss_price(1.0) - entry * 0.99).abs() < 1e-9 * entry);
            prop_assert!(
                (pos.take_profit_price(1.0, ratio) - entry * (1.0 + 0.01 * ratio)).abs() < 1e-9 * entry
            );
        }
    }
}

mod rsi_scenarios {
    use super::*;

    fn rsi() -> Vec<StrategyBinding> {
        vec![StrategyBinding::new(StrategyKind::Rsi, 100.0)]
    }

    #[test]
    fn rising_series_never_buys() {
        let closes: Vec<f64> = (0..150).map(|i| 100.0 + i as f64 * 0.1).collect();
        let bars = bars_from_closes(&closes);

        let report = run_backtest(&bars, &rsi(), 10_000.0, 10.0, &no_warmup()).unwrap();

        assert!(report.trades.is_empty());
    }

    #[test]
    fn dip_entry_then_overbought_exit() {
        // 21 falling bars, then 40 rising ones in steps too small to reach a bracket.
        let mut closes: Vec<f64> = (0..21).map(|i| 101.0 - 0.05 * i as f64).collect();
        closes.extend((1..=40).map(|i| 100.0 + 0.05 * i as f64));
        let bars = bars_from_closes(&closes);

        let report = run_backtest(&bars, &rsi(), 10_000.0, 10.0, &no_warmup()).unwrap();

        assert_eq!(report.trades.len(), 1);
        let trade = &report.trades[0];
        assert_eq!(trade.entry_timestamp, 14 * HOUR_MS);
        assert!(trade.entry_reason.as_deref().unwrap().contains("oversold"));
        assert_eq!(trade.exit_reason, Some(ExitReason::StrategySignal));
        assert!(trade.exit_timestamp.unwrap() > 21 * HOUR_MS);
        assert!(trade.pnl.unwrap() > 0.0);
        assert_eq!(report.metrics.winning_trades, 1);
        assert!(report.metrics.profit_factor.is_infinite());
    }
}

mod aggregation {
    use super::*;

    #[test]
    fn single_binding_ignores_its_weight() {
        let bars = wave_bars(400, 100.0);
        let heavy = run_backtest(&bars, &[fast_ma_cross(100.0)], 10_000.0, 2.0, &BacktestConfig::default())
            .unwrap();
        let light = run_backtest(&bars, &[fast_ma_cross(7.0)], 10_000.0, 2.0, &BacktestConfig::default())
            .unwrap();

        assert!(!heavy.trades.is_empty());
        assert_eq!(heavy.trades, light.trades);
        assert_relative_eq!(heavy.final_balance, light.final_balance);
    }

    #[test]
    fn combined_run_is_named_after_its_bindings() {
        let bars = wave_bars(120, 100.0);
        let bindings = vec![
            StrategyBinding::new(StrategyKind::Rsi, 50.0),
            StrategyBinding::new(StrategyKind::Macd, 50.0),
        ];

        let report = run_backtest(&bars, &bindings, 10_000.0, 2.0, &BacktestConfig::default()).unwrap();

        assert_eq!(report.strategy_name, "Combined: RSI Overbought/Oversold (50%), MACD Crossover (50%)");
    }

    #[test]
    fn zero_total_weight_never_trades() {
        let bars = wave_bars(300, 100.0);
        let bindings = vec![
            StrategyBinding::new(StrategyKind::Rsi, 0.0),
            StrategyBinding::new(StrategyKind::Stochastic, 0.0),
        ];

        let report = run_backtest(&bars, &bindings, 10_000.0, 2.0, &BacktestConfig::default()).unwrap();

        assert!(report.trades.is_empty());
    }
}

#[derive(Debug, Clone)]
enum Edit {
    Add(usize),
    Remove(usize),
}

fn edits() -> impl Strategy<Value = Vec<Edit>> {
    prop::collection::vec(
        prop_oneof![
            (0usize..8).prop_map(Edit::Add),
            (0usize..8).prop_map(Edit::Remove),
        ],
        1..30,
    )
}

fn random_walk() -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec((-0.02f64..0.02, 0.0f64..0.015, 0.0f64..0.015), 60..220).prop_map(
        |steps| {
            let mut close = 100.0;
            steps
                .into_iter()
                .enumerate()
                .map(|(i, (ret, up, down))| {
                    let open = close;
                    close *= 1.0 + ret;
                    Bar {
                        timestamp: i as i64 * HOUR_MS,
                        open,
                        high: open.max(close) * (1.0 + up),
                        low: open.min(close) * (1.0 - down),
                        close,
                        volume: 100.0 + i as f64,
                    }
                })
                .collect()
        },
    )
}

fn binding_sets() -> impl Strategy<Value = Vec<StrategyBinding>> {
    prop::collection::vec((0usize..8, 0.0f64..100.0), 1..4).prop_map(|picks| {
        let kinds: Vec<StrategyKind> = StrategyKind::all().collect();
        let mut bindings: Vec<StrategyBinding> = Vec::new();
        for (idx, weight) in picks {
            let kind = kinds[idx];
            if bindings.iter().all(|b| b.kind != kind) {
                bindings.push(StrategyBinding::new(kind, weight));
            }
        }
        bindings
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn final_balance_is_explained_by_trades(
        bars in random_walk(),
        bindings in binding_sets(),
        ratio in 1.0f64..5.0,
    ) {
        let report = run_backtest(&bars, &bindings, 10_000.0, ratio, &BacktestConfig::default()).unwrap();
        let last_close = bars[bars.len() - 1].close;

        prop_assert!(unexplained_balance(&report, last_close).abs() < 1e-6);

        let m = &report.metrics;
        prop_assert!(m.winning_trades + m.losing_trades <= m.total_trades);
        prop_assert!((m.win_rate + (100.0 - m.win_rate) - 100.0).abs() < 1e-9);
        prop_assert!(report.trades.iter().filter(|t| t.is_open()).count() <= 1);
        if let Some(open) = report.trades.iter().position(|t| t.is_open()) {
            prop_assert_eq!(open, report.trades.len() - 1);
        }
    }

    #[test]
    fn weights_sum_to_100_after_add_or_remove(ops in edits()) {
        let kinds: Vec<StrategyKind> = StrategyKind::all().collect();
        let mut set = BindingSet::new();
        for op in ops {
            match op {
                Edit::Add(k) => set.add(kinds[k]),
                Edit::Remove(i) => {
                    if !set.is_empty() {
                        set.remove(i % set.len());
                    }
                }
            }
            if !set.is_empty() {
                prop_assert!((set.total_weight() - 100.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn set_weight_renormalises(weights in prop::collection::vec(0.1f64..100.0, 2..6), new in 0.1f64..500.0) {
        let kinds: Vec<StrategyKind> = StrategyKind::all().collect();
        let bindings: Vec<StrategyBinding> = weights
            .iter()
            .enumerate()
            .map(|(i, &w)| StrategyBinding::new(kinds[i], w))
            .collect();
        let mut set = BindingSet::from(bindings);
        prop_assert!(set.set_weight(0, new));
        prop_assert!((set.total_weight() - 100.0).abs() < 1e-9);
    }
}
