//! Bollinger Bands in two modes.
//!
//! `bounce` trades touches of the bands: buy at or below the lower band, sell
//! at or above the upper band. `squeeze` buys when bandwidth breaks out of a
//! low-volatility squeeze and sells once price reaches the upper band.

use super::{EvaluationContext, ParamDefinition, ParamKind, TRADE_AMOUNT, TradeAction, trade_amount};
use crate::domain::indicator::bollinger;
use crate::domain::ohlcv::closes;

pub const NAME: &str = "Bollinger Bands";
pub const DESCRIPTION: &str = "A strategy that generates buy signals when price touches the lower band and sell signals when price touches the upper band.";

pub const MODE_BOUNCE: &str = "bounce";
pub const MODE_SQUEEZE: &str = "squeeze";

pub const PARAMS: &[ParamDefinition] = &[
    ParamDefinition {
        name: "period",
        label: "Period",
        description: "Number of candles used to calculate the moving average and standard deviation. Standard value is 20; affects how responsive bands are to price changes.",
        kind: ParamKind::Number {
            default: 20.0,
            min: 5.0,
            max: 100.0,
            step: 1.0,
        },
    },
    ParamDefinition {
        name: "stdDev",
        label: "Standard Deviations",
        description: "Width of bands as a multiple of standard deviation. Higher values create wider bands, resulting in fewer but potentially more reliable signals.",
        kind: ParamKind::Number {
            default: 2.0,
            min: 1.0,
            max: 3.0,
            step: 0.1,
        },
    },
    ParamDefinition {
        name: "mode",
        label: "Strategy Mode",
        description: "Bounce: Trade when price touches the bands. Squeeze: Trade when volatility increases after a period of low volatility.",
        kind: ParamKind::Select {
            default: MODE_BOUNCE,
            options: &[MODE_BOUNCE, MODE_SQUEEZE],
        },
    },
    ParamDefinition {
        name: "squeezeThreshold",
        label: "Squeeze Threshold",
        description: "Maximum bandwidth value that qualifies as a volatility squeeze. Lower values mean tighter squeezes before triggering trades.",
        kind: ParamKind::Number {
            default: 0.1,
            min: 0.05,
            max: 0.5,
            step: 0.01,
        },
    },
    TRADE_AMOUNT,
];

const INSUFFICIENT: &str = "Insufficient data for Bollinger Bands calculation";

pub fn evaluate(ctx: &EvaluationContext) -> TradeAction {
    let period = ctx.params.period("period", 20);
    let multiplier = ctx.params.number("stdDev", 2.0);
    let mode = ctx.params.text("mode", MODE_BOUNCE);
    let squeeze_threshold = ctx.params.number("squeezeThreshold", 0.1);
    let amount = trade_amount(ctx.params);

    if ctx.bars.len() < period + 10 {
        return TradeAction::hold_because(INSUFFICIENT);
    }

    let prices = closes(ctx.bars);
    let price = prices[prices.len() - 1];
    let (Some(bands), Some(prev_bands)) = (
        bollinger(&prices, period, multiplier),
        bollinger(&prices[..prices.len() - 1], period, multiplier),
    ) else {
        return TradeAction::hold_because(INSUFFICIENT);
    };

    match mode {
        MODE_BOUNCE => {
            if price <= bands.lower && ctx.is_flat() {
                return TradeAction::buy(
                    amount,
                    format!(
                        "Price ({:.2}) touched lower Bollinger Band ({:.2})",
                        price, bands.lower
                    ),
                );
            }
            if price >= bands.upper && ctx.in_position() {
                return TradeAction::sell(
                    amount,
                    format!(
                        "Price ({:.2}) touched upper Bollinger Band ({:.2})",
                        price, bands.upper
                    ),
                );
            }
        }
        MODE_SQUEEZE => {
            let is_squeezed = bands.bandwidth < squeeze_threshold;
            let was_squeezing = prev_bands.bandwidth < squeeze_threshold;
            let expanding = bands.bandwidth > prev_bands.bandwidth;

            if was_squeezing && expanding && !is_squeezed && ctx.is_flat() {
                return TradeAction::buy(
                    amount,
                    format!(
                        "Bollinger Bands expanding after squeeze (bandwidth: {:.3})",
                        bands.bandwidth
                    ),
                );
            }
            if ctx.in_position() && price >= bands.upper {
                return TradeAction::sell(
                    amount,
                    format!("Price ({:.2}) reached upper band after squeeze breakout", price),
                );
            }
        }
        _ => {}
    }

    TradeAction::hold()
}
