//! Simple moving-average crossover.
//!
//! BUY when the short SMA moves from at-or-below the long SMA to strictly
//! above it while flat; SELL on the mirror-image cross while in a position.

use super::{EvaluationContext, ParamDefinition, ParamKind, TRADE_AMOUNT, TradeAction, trade_amount};
use crate::domain::indicator::sma;
use crate::domain::ohlcv::closes;

pub const NAME: &str = "MA Crossover";
pub const DESCRIPTION: &str = "A strategy that generates buy signals when a short-term moving average crosses above a long-term moving average, and sell signals when it crosses below.";

pub const PARAMS: &[ParamDefinition] = &[
    ParamDefinition {
        name: "shortPeriod",
        label: "Short MA Period",
        description: "Number of candles for calculating the short-term moving average. Smaller values are more responsive to recent price changes.",
        kind: ParamKind::Number {
            default: 9.0,
            min: 2.0,
            max: 50.0,
            step: 1.0,
        },
    },
    ParamDefinition {
        name: "longPeriod",
        label: "Long MA Period",
        description: "Number of candles for calculating the long-term moving average. Larger values provide more stable trend identification.",
        kind: ParamKind::Number {
            default: 21.0,
            min: 5.0,
            max: 200.0,
            step: 1.0,
        },
    },
    TRADE_AMOUNT,
];

pub fn evaluate(ctx: &EvaluationContext) -> TradeAction {
    let short_period = ctx.params.period("shortPeriod", 9);
    let long_period = ctx.params.period("longPeriod", 21);
    let amount = trade_amount(ctx.params);

    if ctx.bars.len() < long_period.max(short_period) + 1 {
        return TradeAction::hold_because("Insufficient data for MA calculation");
    }

    let prices = closes(ctx.bars);
    let previous = &prices[..prices.len() - 1];

    let (Some(short), Some(long), Some(prev_short), Some(prev_long)) = (
        sma(&prices, short_period),
        sma(&prices, long_period),
        sma(previous, short_period),
        sma(previous, long_period),
    ) else {
        return TradeAction::hold_because("Insufficient data for MA calculation");
    };

    let crossed_above = prev_short <= prev_long && short > long;
    let crossed_below = prev_short >= prev_long && short < long;

    if crossed_above && ctx.is_flat() {
        TradeAction::buy(
            amount,
            format!("Short MA ({:.2}) crossed above Long MA ({:.2})", short, long),
        )
    } else if crossed_below && ctx.in_position() {
        TradeAction::sell(
            amount,
            format!("Short MA ({:.2}) crossed below Long MA ({:.2})", short, long),
        )
    } else {
        TradeAction::hold()
    }
}
