//! Open position and trade log records.

use chrono::Duration;
use std::fmt;

/// Position direction. Only long positions are simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Long,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_price: f64,
    pub entry_timestamp: i64,
    pub side: Side,
    pub quantity: f64,
}

impl Position {
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        match self.side {
            Side::Long => (price - self.entry_price) * self.quantity,
        }
    }

    /// Stop-loss level `stop_loss_pct` percent below entry.
    pub fn stop_loss_price(&self, stop_loss_pct: f64) -> f64 {
        self.entry_price * (1.0 - stop_loss_pct / 100.0)
    }

    /// Take-profit level at `take_profit_ratio` times the stop-loss distance
    /// above entry.
    pub fn take_profit_price(&self, stop_loss_pct: f64, take_profit_ratio: f64) -> f64 {
        self.entry_price * (1.0 + stop_loss_pct / 100.0 * take_profit_ratio)
    }
}

/// Why a trade was closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExitReason {
    TakeProfit { ratio: f64 },
    StopLoss,
    StrategySignal,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::TakeProfit { ratio } => write!(f, "Take Profit (1:{})", ratio),
            ExitReason::StopLoss => write!(f, "Stop Loss (1:1)"),
            ExitReason::StrategySignal => write!(f, "Strategy Signal"),
        }
    }
}

/// One entry in the trade log. Open while `exit_timestamp` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub entry_timestamp: i64,
    pub entry_price: f64,
    pub side: Side,
    pub quantity: f64,
    pub entry_reason: Option<String>,
    pub exit_timestamp: Option<i64>,
    pub exit_price: Option<f64>,
    pub pnl: Option<f64>,
    pub holding_period: Option<Duration>,
    pub exit_reason: Option<ExitReason>,
}

impl TradeRecord {
    pub fn open(position: &Position, entry_reason: Option<String>) -> Self {
        TradeRecord {
            entry_timestamp: position.entry_timestamp,
            entry_price: position.entry_price,
            side: position.side,
            quantity: position.quantity,
            entry_reason,
            exit_timestamp: None,
            exit_price: None,
            pnl: None,
            holding_period: None,
            exit_reason: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.exit_timestamp.is_none()
    }

    /// Fill in the exit fields. Called exactly once per record.
    pub fn close(&mut self, timestamp: i64, price: f64, pnl: f64, reason: ExitReason) {
        self.exit_timestamp = Some(timestamp);
        self.exit_price = Some(price);
        self.pnl = Some(pnl);
        self.holding_period = Some(Duration::milliseconds(timestamp - self.entry_timestamp));
        self.exit_reason = Some(reason);
    }
}

/// Render a holding period as `"2d 3h"`, `"5h 12m"`, `"4m 30s"` or `"45s"`.
pub fn format_holding_period(period: Duration) -> String {
    let seconds = period.num_seconds();
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{}d {}h", days, hours % 24)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}
