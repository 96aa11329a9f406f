//! Backtest simulator: the per-bar loop over a loaded series.
//!
//! Each bar after the warm-up offset first gets the bracket checks of an open
//! position. Only when no bracket fired is the aggregated strategy decision
//! applied at the bar's close.

use tracing::{debug, info};

use super::aggregator::{StrategyBinding, aggregate, strategy_name};
use super::error::SignalbenchError;
use super::metrics::{EquityPoint, Metrics};
use super::ohlcv::{Bar, validate_series};
use super::position::TradeRecord;
use super::strategy::{EvaluationContext, StrategyParams};
use super::tracker::{Brackets, PositionTracker};
use crate::ports::data_port::MarketDataPort;

/// Leading bars skipped before the first decision.
pub const DEFAULT_WARMUP_BARS: usize = 50;
/// Stop-loss distance below entry, in percent.
pub const DEFAULT_STOP_LOSS_PCT: f64 = 1.0;
/// A run needs at least this many bars.
pub const MIN_BARS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestConfig {
    pub warmup_bars: usize,
    pub stop_loss_pct: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            warmup_bars: DEFAULT_WARMUP_BARS,
            stop_loss_pct: DEFAULT_STOP_LOSS_PCT,
        }
    }
}

/// Everything needed to fetch data for and run one backtest.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestRequest {
    pub bindings: Vec<StrategyBinding>,
    pub symbol: String,
    pub interval: String,
    pub initial_balance: f64,
    /// Inclusive lower bound, epoch milliseconds.
    pub from: Option<i64>,
    /// Inclusive upper bound, epoch milliseconds.
    pub to: Option<i64>,
    pub take_profit_ratio: f64,
    pub config: BacktestConfig,
}

#[derive(Debug, Clone)]
pub struct BacktestReport {
    pub strategy_name: String,
    pub initial_balance: f64,
    pub final_balance: f64,
    pub trades: Vec<TradeRecord>,
    pub equity_curve: Vec<EquityPoint>,
    pub metrics: Metrics,
}

/// Simulate `bindings` over `bars`.
///
/// Fails before any state is created when the series is shorter than
/// [`MIN_BARS`] or violates the bar invariants.
pub fn run_backtest(
    bars: &[Bar],
    bindings: &[StrategyBinding],
    initial_balance: f64,
    take_profit_ratio: f64,
    config: &BacktestConfig,
) -> Result<BacktestReport, SignalbenchError> {
    if bars.len() < MIN_BARS {
        return Err(SignalbenchError::InvalidBars {
            reason: format!("need at least {MIN_BARS} bars, got {}", bars.len()),
        });
    }
    validate_series(bars)?;

    let mut tracker = PositionTracker::new(
        initial_balance,
        Brackets {
            stop_loss_pct: config.stop_loss_pct,
            take_profit_ratio,
        },
    );
    let mut equity_curve = Vec::with_capacity(bars.len().saturating_sub(config.warmup_bars));
    let no_params = StrategyParams::new();

    for (i, bar) in bars.iter().enumerate().skip(config.warmup_bars) {
        if tracker.check_brackets(bar).is_none() {
            let action = {
                let ctx = EvaluationContext {
                    bars: &bars[..=i],
                    balance: tracker.balance(),
                    position: tracker.position(),
                    params: &no_params,
                    current_index: i,
                };
                aggregate(bindings, &ctx)
            };
            tracker.apply(&action, bar);
        }

        equity_curve.push(EquityPoint {
            timestamp: bar.timestamp,
            equity: tracker.equity(bar.close),
        });
    }

    let last_bar = &bars[bars.len() - 1];
    if let Some(position) = tracker.position() {
        debug!(
            price = last_bar.close,
            unrealized = position.unrealized_pnl(last_bar.close),
            "marking open position to market"
        );
    }
    let (final_balance, trades) = tracker.settle(last_bar);
    let metrics = Metrics::compute(&trades, &equity_curve, initial_balance, final_balance);

    info!(
        completed = metrics.total_trades,
        won = metrics.winning_trades,
        lost = metrics.losing_trades,
        counts_consistent = metrics.winning_trades + metrics.losing_trades <= metrics.total_trades,
        win_rate = metrics.win_rate,
        profit_factor = metrics.profit_factor,
        total_profit = metrics.total_profit,
        total_loss = metrics.total_loss,
        final_balance,
        "backtest finished"
    );

    Ok(BacktestReport {
        strategy_name: strategy_name(bindings),
        initial_balance,
        final_balance,
        trades,
        equity_curve,
        metrics,
    })
}

/// Fetch the requested series once and simulate it.
pub fn run_request<P: MarketDataPort + ?Sized>(
    port: &P,
    request: &BacktestRequest,
) -> Result<BacktestReport, SignalbenchError> {
    let bars = port.fetch_bars(&request.symbol, &request.interval, request.from, request.to)?;
    if bars.len() < MIN_BARS {
        return Err(SignalbenchError::InsufficientData {
            symbol: request.symbol.clone(),
            interval: request.interval.clone(),
            bars: bars.len(),
            minimum: MIN_BARS,
        });
    }
    info!(
        symbol = %request.symbol,
        interval = %request.interval,
        bars = bars.len(),
        strategies = request.bindings.len(),
        "running backtest"
    );

    run_backtest(
        &bars,
        &request.bindings,
        request.initial_balance,
        request.take_profit_ratio,
        &request.config,
    )
}
