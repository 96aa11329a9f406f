//! Summary statistics for a finished backtest.

use chrono::Duration;

use super::position::TradeRecord;

/// Mark-to-market account value after one simulated bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub timestamp: i64,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    /// Trades with an exit. A position still open at the end is not counted.
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub breakeven_trades: usize,
    /// Percentage of completed trades with positive PnL (0-100).
    pub win_rate: f64,
    pub total_profit: f64,
    /// Sum of losing PnL as a positive magnitude.
    pub total_loss: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    /// Magnitude of the worst losing trade.
    pub largest_loss: f64,
    pub avg_holding_period: Option<Duration>,
    pub total_return_pct: f64,
    /// Largest peak-to-trough decline of the equity curve, as a fraction.
    pub max_drawdown: f64,
    /// Longest run of bars spent below a previous equity peak.
    pub max_drawdown_bars: usize,
}

impl Metrics {
    pub fn compute(
        trades: &[TradeRecord],
        equity_curve: &[EquityPoint],
        initial_balance: f64,
        final_balance: f64,
    ) -> Self {
        let mut winning_trades = 0usize;
        let mut losing_trades = 0usize;
        let mut breakeven_trades = 0usize;
        let mut total_profit = 0.0_f64;
        let mut total_loss = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut total_holding = Duration::zero();

        let completed = trades.iter().filter_map(|t| Some((t.pnl?, t.holding_period?)));
        for (pnl, holding) in completed {
            if pnl > 0.0 {
                winning_trades += 1;
                total_profit += pnl;
                largest_win = largest_win.max(pnl);
            } else if pnl < 0.0 {
                losing_trades += 1;
                total_loss += pnl.abs();
                largest_loss = largest_loss.max(pnl.abs());
            } else {
                breakeven_trades += 1;
            }
            total_holding += holding;
        }

        let total_trades = winning_trades + losing_trades + breakeven_trades;
        let win_rate = if total_trades > 0 {
            winning_trades as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let profit_factor = if total_loss > 0.0 {
            total_profit / total_loss
        } else if total_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_win = if winning_trades > 0 {
            total_profit / winning_trades as f64
        } else {
            0.0
        };
        let avg_loss = if losing_trades > 0 {
            total_loss / losing_trades as f64
        } else {
            0.0
        };
        let avg_holding_period = (total_trades > 0).then(|| total_holding / total_trades as i32);

        let total_return_pct = if initial_balance > 0.0 {
            (final_balance - initial_balance) / initial_balance * 100.0
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_bars) = compute_drawdown(equity_curve);

        Metrics {
            total_trades,
            winning_trades,
            losing_trades,
            breakeven_trades,
            win_rate,
            total_profit,
            total_loss,
            profit_factor,
            avg_win,
            avg_loss,
            largest_win,
            largest_loss,
            avg_holding_period,
            total_return_pct,
            max_drawdown,
            max_drawdown_bars,
        }
    }
}

fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, usize) {
    let Some(first) = equity_curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;
    let mut max_duration = 0usize;
    let mut duration = 0usize;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
            duration = 0;
        } else if peak > 0.0 && point.equity < peak {
            max_dd = max_dd.max((peak - point.equity) / peak);
            duration += 1;
            max_duration = max_duration.max(duration);
        }
    }

    (max_dd, max_duration)
}
