//! Signal-generating strategy modules.
//!
//! Each technical method lives in its own submodule exposing `NAME`,
//! `DESCRIPTION`, `PARAMS` (its parameter schema) and `evaluate`. The flat
//! [`REGISTRY`] table ties them to [`StrategyKind`], which is how the rest of
//! the crate selects and calls a module.
//!
//! Evaluation is a pure function of the [`EvaluationContext`]. A module that
//! does not have enough history for its own calculation answers HOLD with a
//! reason rather than failing.

pub mod bollinger;
pub mod ichimoku;
pub mod ma_crossover;
pub mod macd;
pub mod params;
pub mod parabolic_sar;
pub mod rsi;
pub mod stochastic;
pub mod vwap;

use std::fmt;
use std::str::FromStr;

use crate::domain::error::SignalbenchError;
use crate::domain::ohlcv::Bar;
use crate::domain::position::Position;

pub use params::{ParamDefinition, ParamKind, ParamValue, StrategyParams, default_params};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Buy => write!(f, "BUY"),
            ActionKind::Sell => write!(f, "SELL"),
            ActionKind::Hold => write!(f, "HOLD"),
        }
    }
}

/// A module's recommendation for the current bar. `amount` is a percentage of
/// the balance (0-100).
#[derive(Debug, Clone, PartialEq)]
pub struct TradeAction {
    pub kind: ActionKind,
    pub amount: f64,
    pub reason: Option<String>,
}

impl TradeAction {
    pub fn buy(amount: f64, reason: impl Into<String>) -> Self {
        TradeAction {
            kind: ActionKind::Buy,
            amount,
            reason: Some(reason.into()),
        }
    }

    pub fn sell(amount: f64, reason: impl Into<String>) -> Self {
        TradeAction {
            kind: ActionKind::Sell,
            amount,
            reason: Some(reason.into()),
        }
    }

    pub fn hold() -> Self {
        TradeAction {
            kind: ActionKind::Hold,
            amount: 0.0,
            reason: None,
        }
    }

    pub fn hold_because(reason: impl Into<String>) -> Self {
        TradeAction {
            kind: ActionKind::Hold,
            amount: 0.0,
            reason: Some(reason.into()),
        }
    }
}

/// Everything a module may look at when evaluating one bar.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// History up to and including the current bar.
    pub bars: &'a [Bar],
    pub balance: f64,
    pub position: Option<&'a Position>,
    pub params: &'a StrategyParams,
    pub current_index: usize,
}

impl<'a> EvaluationContext<'a> {
    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    pub fn in_position(&self) -> bool {
        self.position.is_some()
    }

    /// The same context seen through another parameter map.
    pub fn with_params(&self, params: &'a StrategyParams) -> Self {
        EvaluationContext { params, ..*self }
    }
}

/// Percentage of balance committed per trade; shared by every module.
pub(crate) const TRADE_AMOUNT: ParamDefinition = ParamDefinition {
    name: "tradeAmount",
    label: "Trade Amount (%)",
    description: "Percentage of available balance to use for each trade.",
    kind: ParamKind::Number {
        default: 10.0,
        min: 1.0,
        max: 100.0,
        step: 1.0,
    },
};

pub(crate) fn trade_amount(params: &StrategyParams) -> f64 {
    params.number(TRADE_AMOUNT.name, 10.0)
}

/// One row of the strategy registry.
pub struct StrategyEntry {
    pub kind: StrategyKind,
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamDefinition],
    pub evaluate: fn(&EvaluationContext) -> TradeAction,
}

/// Every available strategy module, in [`StrategyKind`] declaration order.
pub static REGISTRY: [StrategyEntry; 8] = [
    StrategyEntry {
        kind: StrategyKind::MaCrossover,
        id: "ma_crossover",
        name: ma_crossover::NAME,
        description: ma_crossover::DESCRIPTION,
        params: ma_crossover::PARAMS,
        evaluate: ma_crossover::evaluate,
    },
    StrategyEntry {
        kind: StrategyKind::Rsi,
        id: "rsi",
        name: rsi::NAME,
        description: rsi::DESCRIPTION,
        params: rsi::PARAMS,
        evaluate: rsi::evaluate,
    },
    StrategyEntry {
        kind: StrategyKind::Macd,
        id: "macd",
        name: macd::NAME,
        description: macd::DESCRIPTION,
        params: macd::PARAMS,
        evaluate: macd::evaluate,
    },
    StrategyEntry {
        kind: StrategyKind::BollingerBands,
        id: "bollinger",
        name: bollinger::NAME,
        description: bollinger::DESCRIPTION,
        params: bollinger::PARAMS,
        evaluate: bollinger::evaluate,
    },
    StrategyEntry {
        kind: StrategyKind::Stochastic,
        id: "stochastic",
        name: stochastic::NAME,
        description: stochastic::DESCRIPTION,
        params: stochastic::PARAMS,
        evaluate: stochastic::evaluate,
    },
    StrategyEntry {
        kind: StrategyKind::Ichimoku,
        id: "ichimoku",
        name: ichimoku::NAME,
        description: ichimoku::DESCRIPTION,
        params: ichimoku::PARAMS,
        evaluate: ichimoku::evaluate,
    },
    StrategyEntry {
        kind: StrategyKind::ParabolicSar,
        id: "parabolic_sar",
        name: parabolic_sar::NAME,
        description: parabolic_sar::DESCRIPTION,
        params: parabolic_sar::PARAMS,
        evaluate: parabolic_sar::evaluate,
    },
    StrategyEntry {
        kind: StrategyKind::Vwap,
        id: "vwap",
        name: vwap::NAME,
        description: vwap::DESCRIPTION,
        params: vwap::PARAMS,
        evaluate: vwap::evaluate,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    MaCrossover,
    Rsi,
    Macd,
    BollingerBands,
    Stochastic,
    Ichimoku,
    ParabolicSar,
    Vwap,
}

impl StrategyKind {
    pub fn all() -> impl Iterator<Item = StrategyKind> {
        REGISTRY.iter().map(|e| e.kind)
    }

    pub fn entry(self) -> &'static StrategyEntry {
        &REGISTRY[self as usize]
    }

    pub fn id(self) -> &'static str {
        self.entry().id
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }

    pub fn description(self) -> &'static str {
        self.entry().description
    }

    pub fn param_schema(self) -> &'static [ParamDefinition] {
        self.entry().params
    }

    pub fn default_params(self) -> StrategyParams {
        default_params(self.param_schema())
    }

    pub fn evaluate(self, ctx: &EvaluationContext) -> TradeAction {
        (self.entry().evaluate)(ctx)
    }

    /// Look up by registry id or display name, ignoring case.
    pub fn from_name(name: &str) -> Option<StrategyKind> {
        let name = name.trim();
        REGISTRY
            .iter()
            .find(|e| e.id.eq_ignore_ascii_case(name) || e.name.eq_ignore_ascii_case(name))
            .map(|e| e.kind)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = SignalbenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::from_name(s).ok_or_else(|| SignalbenchError::UnknownStrategy {
            name: s.to_string(),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::ohlcv::Bar;

    /// Bars with open = high = low = close at one-minute spacing.
    pub fn flat_bars(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: i as i64 * 60_000,
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    /// Bars with a +/- `spread` high/low envelope around each close.
    pub fn ranged_bars(closes: &[f64], spread: f64) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: i as i64 * 60_000,
                open: close,
                high: close + spread,
                low: close - spread,
                close,
                volume: 1000.0,
            })
            .collect()
    }
}
