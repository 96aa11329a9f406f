//! Parabolic SAR reversals.

use super::{EvaluationContext, ParamDefinition, ParamKind, TRADE_AMOUNT, TradeAction, trade_amount};
use crate::domain::indicator::parabolic_sar;

pub const NAME: &str = "Parabolic SAR";
pub const DESCRIPTION: &str = "A trend-following indicator that places dots above or below price to indicate potential reversals. When dots move from above to below, it generates buy signals, and vice versa.";

pub const PARAMS: &[ParamDefinition] = &[
    ParamDefinition {
        name: "initialAcceleration",
        label: "Initial Acceleration",
        description: "Starting value for the acceleration factor. Higher values make the indicator more responsive but can lead to more false signals.",
        kind: ParamKind::Number {
            default: 0.02,
            min: 0.01,
            max: 0.1,
            step: 0.01,
        },
    },
    ParamDefinition {
        name: "maxAcceleration",
        label: "Max Acceleration",
        description: "Maximum value for the acceleration factor. Limits how quickly the indicator can change direction.",
        kind: ParamKind::Number {
            default: 0.2,
            min: 0.1,
            max: 0.5,
            step: 0.01,
        },
    },
    TRADE_AMOUNT,
];

const MIN_BARS: usize = 3;

pub fn evaluate(ctx: &EvaluationContext) -> TradeAction {
    let initial_af = ctx.params.number("initialAcceleration", 0.02);
    let max_af = ctx.params.number("maxAcceleration", 0.2);
    let amount = trade_amount(ctx.params);

    let n = ctx.bars.len();
    if n < MIN_BARS {
        return TradeAction::hold_because("Insufficient data for Parabolic SAR calculation");
    }

    let sar = parabolic_sar(ctx.bars, initial_af, max_af);
    let (sar_now, sar_prev) = (sar[n - 1], sar[n - 2]);
    let (price, prev_price) = (ctx.bars[n - 1].close, ctx.bars[n - 2].close);

    if sar_prev > prev_price && sar_now < price && ctx.is_flat() {
        TradeAction::buy(
            amount,
            format!(
                "Parabolic SAR crossed below price (SAR: {:.2}, Price: {:.2})",
                sar_now, price
            ),
        )
    } else if sar_prev < prev_price && sar_now > price && ctx.in_position() {
        TradeAction::sell(
            amount,
            format!(
                "Parabolic SAR crossed above price (SAR: {:.2}, Price: {:.2})",
                sar_now, price
            ),
        )
    } else {
        TradeAction::hold()
    }
}
