//! Technical indicator library.
//!
//! Every function here is pure and works on the trailing window of the slice it
//! is given (the last `period` values or bars). When the slice is shorter than
//! the window the function returns `None` (or an empty series) so callers can
//! report an insufficient-data condition instead of failing.
//!
//! Standard deviations use the population variance (divide by N).

pub mod bollinger;
pub mod ema;
pub mod extrema;
pub mod macd;
pub mod parabolic_sar;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod stochastic;
pub mod vwap;

pub use bollinger::{BollingerBands, bollinger};
pub use ema::ema_series;
pub use extrema::{highest_high, lowest_low, midpoint};
pub use macd::{MacdPoint, macd};
pub use parabolic_sar::parabolic_sar;
pub use rsi::wilder_rsi;
pub use sma::{sma, sma_series};
pub use stddev::stddev;
pub use stochastic::{StochasticSeries, stochastic};
pub use vwap::{VwapBand, vwap};

/// The last `period` elements of `values`, or `None` if there are fewer.
pub(crate) fn trailing<T>(values: &[T], period: usize) -> Option<&[T]> {
    if period == 0 || values.len() < period {
        return None;
    }
    Some(&values[values.len() - period..])
}
