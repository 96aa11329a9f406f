//! Rolling VWAP mean reversion.
//!
//! The bands are computed over the window that includes the current bar and
//! compared against the previous close: a buy needs the previous close below
//! both VWAP and the lower band with the current close back above VWAP.

use super::{EvaluationContext, ParamDefinition, ParamKind, TRADE_AMOUNT, TradeAction, trade_amount};
use crate::domain::indicator::vwap;

pub const NAME: &str = "VWAP";
pub const DESCRIPTION: &str = "Volume-Weighted Average Price strategy that generates signals based on price action around the VWAP line, providing insights into the true average price considering volume.";

pub const PARAMS: &[ParamDefinition] = &[
    ParamDefinition {
        name: "period",
        label: "VWAP Period",
        description: "Number of candles used to calculate the VWAP. Longer periods create a more stable line less prone to false signals.",
        kind: ParamKind::Number {
            default: 14.0,
            min: 5.0,
            max: 100.0,
            step: 1.0,
        },
    },
    ParamDefinition {
        name: "deviation",
        label: "Deviation Multiplier",
        description: "Multiplier for standard deviation bands around VWAP. Higher values require stronger price movements to generate signals.",
        kind: ParamKind::Number {
            default: 1.5,
            min: 0.5,
            max: 3.0,
            step: 0.1,
        },
    },
    TRADE_AMOUNT,
];

const INSUFFICIENT: &str = "Insufficient data for VWAP calculation";

pub fn evaluate(ctx: &EvaluationContext) -> TradeAction {
    let period = ctx.params.period("period", 14);
    let deviation = ctx.params.number("deviation", 1.5);
    let amount = trade_amount(ctx.params);

    let n = ctx.bars.len();
    if n < period.max(2) {
        return TradeAction::hold_because(INSUFFICIENT);
    }
    let Some(band) = vwap(ctx.bars, period) else {
        return TradeAction::hold_because(INSUFFICIENT);
    };

    let price = ctx.bars[n - 1].close;
    let prev_price = ctx.bars[n - 2].close;
    let crossed_above = prev_price < band.vwap && price > band.vwap;
    let crossed_below = prev_price > band.vwap && price < band.vwap;

    if crossed_above && prev_price < band.lower(deviation) && ctx.is_flat() {
        TradeAction::buy(
            amount,
            format!(
                "Price crossed above VWAP from oversold area (Price: {:.2}, VWAP: {:.2})",
                price, band.vwap
            ),
        )
    } else if crossed_below && prev_price > band.upper(deviation) && ctx.in_position() {
        TradeAction::sell(
            amount,
            format!(
                "Price crossed below VWAP from overbought area (Price: {:.2}, VWAP: {:.2})",
                price, band.vwap
            ),
        )
    } else {
        TradeAction::hold()
    }
}
