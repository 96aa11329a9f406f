//! Position tracker: the FLAT / IN_POSITION state machine.
//!
//! While in a position the bracket levels are checked before any strategy
//! signal, take-profit first. At most one exit happens per bar.

use tracing::debug;

use super::ohlcv::Bar;
use super::position::{ExitReason, Position, Side, TradeRecord};
use super::strategy::{ActionKind, TradeAction};

/// Fixed bracket distances applied to every position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brackets {
    /// Stop-loss distance below entry, in percent.
    pub stop_loss_pct: f64,
    /// Take-profit distance as a multiple of the stop-loss distance.
    pub take_profit_ratio: f64,
}

/// A completed exit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exit {
    pub price: f64,
    pub pnl: f64,
    pub reason: ExitReason,
}

#[derive(Debug, Clone)]
pub struct PositionTracker {
    balance: f64,
    position: Option<Position>,
    trades: Vec<TradeRecord>,
    brackets: Brackets,
}

impl PositionTracker {
    pub fn new(initial_balance: f64, brackets: Brackets) -> Self {
        PositionTracker {
            balance: initial_balance,
            position: None,
            trades: Vec::new(),
            brackets,
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    /// Balance plus the unrealized PnL of any open position at `price`.
    pub fn equity(&self, price: f64) -> f64 {
        self.balance
            + self
                .position
                .as_ref()
                .map_or(0.0, |p| p.unrealized_pnl(price))
    }

    /// Exit on a bracket level touched by `bar`, take-profit before stop-loss.
    pub fn check_brackets(&mut self, bar: &Bar) -> Option<Exit> {
        let position = self.position.as_ref()?;
        let Brackets {
            stop_loss_pct,
            take_profit_ratio,
        } = self.brackets;

        let take_profit = position.take_profit_price(stop_loss_pct, take_profit_ratio);
        let stop_loss = position.stop_loss_price(stop_loss_pct);

        if bar.high >= take_profit {
            return self.close(
                bar.timestamp,
                take_profit,
                ExitReason::TakeProfit {
                    ratio: take_profit_ratio,
                },
            );
        }

        if bar.low <= stop_loss {
            return self.close(bar.timestamp, stop_loss, ExitReason::StopLoss);
        }

        None
    }

    /// Act on the aggregated decision at the bar's close. BUY only opens when
    /// flat and SELL only closes when in a position; anything else is ignored.
    pub fn apply(&mut self, action: &TradeAction, bar: &Bar) -> Option<Exit> {
        match action.kind {
            ActionKind::Buy if self.is_flat() => {
                self.open(action, bar);
                None
            }
            ActionKind::Sell if !self.is_flat() => {
                self.close(bar.timestamp, bar.close, ExitReason::StrategySignal)
            }
            _ => None,
        }
    }

    fn open(&mut self, action: &TradeAction, bar: &Bar) {
        let quantity = action.amount / 100.0 * self.balance / bar.close;
        if !quantity.is_finite() || quantity <= 0.0 {
            debug!(
                timestamp = bar.timestamp,
                amount = action.amount,
                "skipping entry with non-positive size"
            );
            return;
        }

        let position = Position {
            entry_price: bar.close,
            entry_timestamp: bar.timestamp,
            side: Side::Long,
            quantity,
        };
        debug!(
            timestamp = bar.timestamp,
            price = bar.close,
            quantity,
            reason = action.reason.as_deref().unwrap_or(""),
            "entry"
        );
        self.trades
            .push(TradeRecord::open(&position, action.reason.clone()));
        self.position = Some(position);
    }

    fn close(&mut self, timestamp: i64, price: f64, reason: ExitReason) -> Option<Exit> {
        let position = self.position.take()?;
        let pnl = position.unrealized_pnl(price);
        self.balance += pnl;

        if let Some(record) = self.trades.last_mut().filter(|t| t.is_open()) {
            record.close(timestamp, price, pnl, reason);
        }
        debug!(timestamp, price, pnl, reason = %reason, "exit");

        Some(Exit { price, pnl, reason })
    }

    /// End of run: mark any open position to `last_bar.close` and fold the
    /// unrealized PnL into the balance. The open trade record keeps no exit.
    pub fn settle(self, last_bar: &Bar) -> (f64, Vec<TradeRecord>) {
        let final_balance = self.equity(last_bar.close);
        (final_balance, self.trades)
    }
}
