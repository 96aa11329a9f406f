//! RSI overbought/oversold thresholds.

use super::{EvaluationContext, ParamDefinition, ParamKind, TRADE_AMOUNT, TradeAction, trade_amount};
use crate::domain::indicator::wilder_rsi;
use crate::domain::ohlcv::closes;

pub const NAME: &str = "RSI Overbought/Oversold";
pub const DESCRIPTION: &str = "A strategy that generates buy signals when RSI is oversold and sell signals when RSI is overbought.";

pub const PARAMS: &[ParamDefinition] = &[
    ParamDefinition {
        name: "period",
        label: "RSI Period",
        description: "Number of candles used to calculate the Relative Strength Index. Standard value is 14; lower values make RSI more sensitive to price changes.",
        kind: ParamKind::Number {
            default: 14.0,
            min: 2.0,
            max: 50.0,
            step: 1.0,
        },
    },
    ParamDefinition {
        name: "oversoldThreshold",
        label: "Oversold Threshold",
        description: "RSI value below this level triggers a buy signal. Lower values mean more conservative buy entries (deeper oversold conditions).",
        kind: ParamKind::Number {
            default: 30.0,
            min: 10.0,
            max: 40.0,
            step: 1.0,
        },
    },
    ParamDefinition {
        name: "overboughtThreshold",
        label: "Overbought Threshold",
        description: "RSI value above this level triggers a sell signal. Higher values mean more conservative sell entries (stronger overbought conditions).",
        kind: ParamKind::Number {
            default: 70.0,
            min: 60.0,
            max: 90.0,
            step: 1.0,
        },
    },
    TRADE_AMOUNT,
];

pub fn evaluate(ctx: &EvaluationContext) -> TradeAction {
    let period = ctx.params.period("period", 14);
    let oversold = ctx.params.number("oversoldThreshold", 30.0);
    let overbought = ctx.params.number("overboughtThreshold", 70.0);
    let amount = trade_amount(ctx.params);

    let Some(rsi) = wilder_rsi(&closes(ctx.bars), period) else {
        return TradeAction::hold_because("Insufficient data for RSI calculation");
    };

    if rsi <= oversold && ctx.is_flat() {
        TradeAction::buy(
            amount,
            format!("RSI ({:.2}) is oversold (below {})", rsi, oversold),
        )
    } else if rsi >= overbought && ctx.in_position() {
        TradeAction::sell(
            amount,
            format!("RSI ({:.2}) is overbought (above {})", rsi, overbought),
        )
    } else {
        TradeAction::hold()
    }
}
