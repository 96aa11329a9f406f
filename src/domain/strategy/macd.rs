//! MACD line / signal line crossover.

use super::{EvaluationContext, ParamDefinition, ParamKind, TRADE_AMOUNT, TradeAction, trade_amount};
use crate::domain::indicator::macd;
use crate::domain::ohlcv::closes;

pub const NAME: &str = "MACD Crossover";
pub const DESCRIPTION: &str = "A strategy that generates buy signals when the MACD line crosses above the signal line, and sell signals when it crosses below.";

pub const PARAMS: &[ParamDefinition] = &[
    ParamDefinition {
        name: "fastPeriod",
        label: "Fast EMA Period",
        description: "Period length for the fast Exponential Moving Average. Lower values make it more responsive to recent price movements. Standard value is 12.",
        kind: ParamKind::Number {
            default: 12.0,
            min: 2.0,
            max: 50.0,
            step: 1.0,
        },
    },
    ParamDefinition {
        name: "slowPeriod",
        label: "Slow EMA Period",
        description: "Period length for the slow Exponential Moving Average. Higher values provide more smoothing and focus on longer-term trends. Standard value is 26.",
        kind: ParamKind::Number {
            default: 26.0,
            min: 5.0,
            max: 100.0,
            step: 1.0,
        },
    },
    ParamDefinition {
        name: "signalPeriod",
        label: "Signal Period",
        description: "Number of candles used to calculate the signal line (EMA of MACD line). Affects how quickly the signal line responds to changes in the MACD line. Standard value is 9.",
        kind: ParamKind::Number {
            default: 9.0,
            min: 2.0,
            max: 50.0,
            step: 1.0,
        },
    },
    TRADE_AMOUNT,
];

const INSUFFICIENT: &str = "Insufficient data for MACD calculation";

pub fn evaluate(ctx: &EvaluationContext) -> TradeAction {
    let fast = ctx.params.period("fastPeriod", 12);
    let slow = ctx.params.period("slowPeriod", 26);
    let signal = ctx.params.period("signalPeriod", 9);
    let amount = trade_amount(ctx.params);

    // Twice the longest window so both EMAs and the signal line have settled.
    let minimum = fast.max(slow).max(signal) * 2;
    if ctx.bars.len() < minimum {
        return TradeAction::hold_because(INSUFFICIENT);
    }

    let prices = closes(ctx.bars);
    let (Some(current), Some(previous)) = (
        macd(&prices, fast, slow, signal),
        macd(&prices[..prices.len() - 1], fast, slow, signal),
    ) else {
        return TradeAction::hold_because(INSUFFICIENT);
    };

    let crossed_above = previous.line <= previous.signal && current.line > current.signal;
    let crossed_below = previous.line >= previous.signal && current.line < current.signal;

    if crossed_above && ctx.is_flat() {
        TradeAction::buy(
            amount,
            format!(
                "MACD ({:.2}) crossed above Signal ({:.2})",
                current.line, current.signal
            ),
        )
    } else if crossed_below && ctx.in_position() {
        TradeAction::sell(
            amount,
            format!(
                "MACD ({:.2}) crossed below Signal ({:.2})",
                current.line, current.signal
            ),
        )
    } else {
        TradeAction::hold()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::{Position, Side};
    use crate::domain::strategy::ActionKind;
    use crate::domain::strategy::params::default_params;
    use crate::domain::strategy::test_support::flat_bars;

    fn run(closes: &[f64], position: Option<&Position>) -> TradeAction {
        let bars = flat_bars(closes);
        let params = default_params(PARAMS);
        let ctx = EvaluationContext {
            bars: &bars,
            balance: 10_000.0,
            position,
            params: &params,
            current_index: bars.len() - 1,
        };
        evaluate(&ctx)
    }

    fn position() -> Position {
        Position {
            entry_price: 100.0,
            entry_timestamp: 0,
            side: Side::Long,
            quantity: 1.0,
        }
    }

    #[test]
    fn jump_after_flat_run_crosses_above() {
        let mut closes = vec![100.0; 60];
        closes.push(110.0);
        let action = run(&closes, None);
        assert_eq!(action.kind, ActionKind::Buy);
        assert!(action.reason.unwrap().starts_with("MACD ("));
    }

    #[test]
    fn drop_after_flat_run_crosses_below() {
        let mut closes = vec![100.0; 60];
        closes.push(90.0);
        let pos = position();
        assert_eq!(run(&closes, Some(&pos)).kind, ActionKind::Sell);
        // No sell signal without a position to close.
        assert_eq!(run(&closes, None).kind, ActionKind::Hold);
    }

    #[test]
    fn flat_series_holds() {
        assert_eq!(run(&vec![100.0; 80], None), TradeAction::hold());
    }

    #[test]
    fn needs_twice_longest_period() {
        let action = run(&vec![100.0; 51], None);
        assert_eq!(action.reason.as_deref(), Some(INSUFFICIENT));
        assert_ne!(run(&vec![100.0; 52], None).reason.as_deref(), Some(INSUFFICIENT));
    }
}
