//! Stochastic oscillator %K/%D crossovers inside the extreme zones.

use super::{EvaluationContext, ParamDefinition, ParamKind, TRADE_AMOUNT, TradeAction, trade_amount};
use crate::domain::indicator::stochastic;

pub const NAME: &str = "Stochastic Oscillator";
pub const DESCRIPTION: &str = "A momentum strategy that compares a security's closing price to its price range over a specific period. Generates signals when the oscillator crosses above or below specific thresholds.";

pub const PARAMS: &[ParamDefinition] = &[
    ParamDefinition {
        name: "kPeriod",
        label: "K Period",
        description: "Number of periods for %K line calculation. Represents the main stochastic line and measures current price relative to the high-low range.",
        kind: ParamKind::Number {
            default: 14.0,
            min: 5.0,
            max: 50.0,
            step: 1.0,
        },
    },
    ParamDefinition {
        name: "dPeriod",
        label: "D Period",
        description: "Number of periods for %D line calculation. This is a moving average of %K and helps identify trend reversals.",
        kind: ParamKind::Number {
            default: 3.0,
            min: 1.0,
            max: 20.0,
            step: 1.0,
        },
    },
    ParamDefinition {
        name: "overbought",
        label: "Overbought Level",
        description: "Level above which the market is considered overbought, suggesting a potential sell signal.",
        kind: ParamKind::Number {
            default: 80.0,
            min: 50.0,
            max: 95.0,
            step: 1.0,
        },
    },
    ParamDefinition {
        name: "oversold",
        label: "Oversold Level",
        description: "Level below which the market is considered oversold, suggesting a potential buy signal.",
        kind: ParamKind::Number {
            default: 20.0,
            min: 5.0,
            max: 50.0,
            step: 1.0,
        },
    },
    TRADE_AMOUNT,
];

const INSUFFICIENT: &str = "Insufficient data for Stochastic calculation";

pub fn evaluate(ctx: &EvaluationContext) -> TradeAction {
    let k_period = ctx.params.period("kPeriod", 14);
    let d_period = ctx.params.period("dPeriod", 3);
    let overbought = ctx.params.number("overbought", 80.0);
    let oversold = ctx.params.number("oversold", 20.0);
    let amount = trade_amount(ctx.params);

    if ctx.bars.len() < k_period + d_period {
        return TradeAction::hold_because(INSUFFICIENT);
    }

    let Some(series) = stochastic(ctx.bars, k_period, d_period) else {
        return TradeAction::hold_because(INSUFFICIENT);
    };
    let n = series.k.len();
    if n < 2 {
        return TradeAction::hold_because(INSUFFICIENT);
    }
    let (k, d) = (series.k[n - 1], series.d[n - 1]);
    let (prev_k, prev_d) = (series.k[n - 2], series.d[n - 2]);

    if prev_k < prev_d && k > d && k < oversold && ctx.is_flat() {
        TradeAction::buy(
            amount,
            format!(
                "Stochastic bullish crossover in oversold region (K: {:.2}, D: {:.2})",
                k, d
            ),
        )
    } else if prev_k > prev_d && k < d && k > overbought && ctx.in_position() {
        TradeAction::sell(
            amount,
            format!(
                "Stochastic bearish crossover in overbought region (K: {:.2}, D: {:.2})",
                k, d
            ),
        )
    } else {
        TradeAction::hold()
    }
}
