//! Parabolic SAR (stop and reverse).
//!
//! The initial trend is taken from the first two closes. Each step moves the
//! SAR toward the extreme point by the acceleration factor, which grows by the
//! initial factor on every new extreme up to the maximum. In an uptrend the SAR
//! is clamped to at most the previous two lows (at least the previous two highs
//! in a downtrend). When price pierces the SAR the trend flips, the SAR resets
//! to the current bar's high (or low) and acceleration resets.

use crate::domain::ohlcv::Bar;

/// One SAR value per bar. Empty when fewer than two bars are given.
pub fn parabolic_sar(bars: &[Bar], initial_af: f64, max_af: f64) -> Vec<f64> {
    if bars.len() < 2 {
        return Vec::new();
    }

    let mut sar = Vec::with_capacity(bars.len());
    let mut af = initial_af;
    let mut uptrend = bars[1].close > bars[0].close;
    let mut ep;

    if uptrend {
        ep = bars[1].high;
        sar.push(bars[0].low);
    } else {
        ep = bars[1].low;
        sar.push(bars[0].high);
    }

    for i in 1..bars.len() {
        let prev_sar = sar[i - 1];
        let candidate = prev_sar + af * (ep - prev_sar);
        let before = if i >= 2 { &bars[i - 2] } else { &bars[i - 1] };

        if uptrend {
            if bars[i].high > ep {
                ep = bars[i].high;
                af = (af + initial_af).min(max_af);
            }
            let limited = candidate.min(bars[i - 1].low).min(before.low);
            if bars[i].low < limited {
                uptrend = false;
                af = initial_af;
                ep = bars[i].low;
                sar.push(bars[i].high);
            } else {
                sar.push(limited);
            }
        } else {
            if bars[i].low < ep {
                ep = bars[i].low;
                af = (af + initial_af).min(max_af);
            }
            let limited = candidate.max(bars[i - 1].high).max(before.high);
            if bars[i].high > limited {
                uptrend = true;
                af = initial_af;
                ep = bars[i].high;
                sar.push(bars[i].low);
            } else {
                sar.push(limited);
            }
        }
    }

    sar
}
