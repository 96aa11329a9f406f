//! Ichimoku Cloud: Tenkan/Kijun crosses confirmed by price against the cloud.

use super::{EvaluationContext, ParamDefinition, ParamKind, TRADE_AMOUNT, TradeAction, trade_amount};
use crate::domain::indicator::midpoint;
use crate::domain::ohlcv::Bar;

pub const NAME: &str = "Ichimoku Cloud";
pub const DESCRIPTION: &str = "A comprehensive strategy that identifies support/resistance levels, momentum, trend direction and possible reversal points using multiple technical calculations.";

/// Cloud displacement in bars. Only used to size the history requirement.
pub const DISPLACEMENT: usize = 26;

pub const PARAMS: &[ParamDefinition] = &[
    ParamDefinition {
        name: "tenkanPeriod",
        label: "Tenkan-sen Period",
        description: "Number of periods for Tenkan-sen (Conversion Line). Acts as a short-term moving average and represents near-term support/resistance.",
        kind: ParamKind::Number {
            default: 9.0,
            min: 5.0,
            max: 30.0,
            step: 1.0,
        },
    },
    ParamDefinition {
        name: "kijunPeriod",
        label: "Kijun-sen Period",
        description: "Number of periods for Kijun-sen (Base Line). Acts as a medium-term moving average and represents medium-term support/resistance.",
        kind: ParamKind::Number {
            default: 26.0,
            min: 10.0,
            max: 60.0,
            step: 1.0,
        },
    },
    ParamDefinition {
        name: "senkouSpanBPeriod",
        label: "Senkou Span B Period",
        description: "Number of periods for Senkou Span B (one component of the \"cloud\"). Represents long-term support/resistance.",
        kind: ParamKind::Number {
            default: 52.0,
            min: 30.0,
            max: 120.0,
            step: 1.0,
        },
    },
    TRADE_AMOUNT,
];

const INSUFFICIENT: &str = "Insufficient data for Ichimoku calculation";

struct Lines {
    tenkan: f64,
    kijun: f64,
}

fn lines(bars: &[Bar], tenkan: usize, kijun: usize) -> Option<Lines> {
    Some(Lines {
        tenkan: midpoint(bars, tenkan)?,
        kijun: midpoint(bars, kijun)?,
    })
}

pub fn evaluate(ctx: &EvaluationContext) -> TradeAction {
    let tenkan_period = ctx.params.period("tenkanPeriod", 9);
    let kijun_period = ctx.params.period("kijunPeriod", 26);
    let span_b_period = ctx.params.period("senkouSpanBPeriod", 52);
    let amount = trade_amount(ctx.params);

    let required = tenkan_period.max(kijun_period).max(span_b_period) + DISPLACEMENT;
    if ctx.bars.len() < required {
        return TradeAction::hold_because(INSUFFICIENT);
    }

    let previous_bars = &ctx.bars[..ctx.bars.len() - 1];
    let (Some(current), Some(previous), Some(span_b)) = (
        lines(ctx.bars, tenkan_period, kijun_period),
        lines(previous_bars, tenkan_period, kijun_period),
        midpoint(ctx.bars, span_b_period),
    ) else {
        return TradeAction::hold_because(INSUFFICIENT);
    };
    let span_a = (current.tenkan + current.kijun) / 2.0;
    let price = ctx.bars[ctx.bars.len() - 1].close;

    let bullish_cross = previous.tenkan < previous.kijun && current.tenkan > current.kijun;
    let bearish_cross = previous.tenkan > previous.kijun && current.tenkan < current.kijun;
    let above_cloud = price > span_a.max(span_b);
    let below_cloud = price < span_a.min(span_b);

    if bullish_cross && above_cloud && ctx.is_flat() {
        TradeAction::buy(
            amount,
            format!(
                "Bullish TK Cross above cloud (Tenkan: {:.2}, Kijun: {:.2})",
                current.tenkan, current.kijun
            ),
        )
    } else if bearish_cross && below_cloud && ctx.in_position() {
        TradeAction::sell(
            amount,
            format!(
                "Bearish TK Cross below cloud (Tenkan: {:.2}, Kijun: {:.2})",
                current.tenkan, current.kijun
            ),
        )
    } else {
        TradeAction::hold()
    }
}
