//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the SMA of the first n values, then
//! EMA[i] = (V[i] - EMA[i-1]) * k + EMA[i-1].

/// EMA series. The first element is the seed over `values[..period]`; the
/// result has `values.len() - period + 1` elements, or none when `values` is
/// shorter than `period`.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len() - period + 1);
    let mut ema = values[..period].iter().sum::<f64>() / period as f64;
    out.push(ema);

    for &v in &values[period..] {
        ema = (v - ema) * k + ema;
        out.push(ema);
    }

    out
}
