//! RSI (Relative Strength Index) with Wilder's smoothing.
//!
//! - First average: simple mean of gains/losses over the first n price changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Needs at least n + 1 closes (n price changes). The whole slice is consumed,
//! so the value depends on every close given, not just the last n.

pub fn wilder_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() <= period {
        return None;
    }

    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    let mut avg_gain = changes[..period]
        .iter()
        .map(|&c| if c > 0.0 { c } else { 0.0 })
        .sum::<f64>()
        / period as f64;
    let mut avg_loss = changes[..period]
        .iter()
        .map(|&c| if c < 0.0 { -c } else { 0.0 })
        .sum::<f64>()
        / period as f64;

    let n = period as f64;
    for &change in &changes[period..] {
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };
        avg_gain = (avg_gain * (n - 1.0) + gain) / n;
        avg_loss = (avg_loss * (n - 1.0) + loss) / n;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }
    Some(100.0 - (100.0 / (1.0 + avg_gain / avg_loss)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_insufficient_closes() {
        assert_eq!(wilder_rsi(&[], 14), None);
        assert_eq!(wilder_rsi(&[100.0; 14], 14), None);
        assert!(wilder_rsi(&[100.0; 15], 14).is_some());
    }

    #[test]
    fn rsi_zero_period() {
        assert_eq!(wilder_rsi(&[100.0, 101.0], 0), None);
    }

    #[test]
    fn rsi_all_gains_no_losses() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let rsi = wilder_rsi(&closes, 14).unwrap();
        assert!(
            (rsi - 100.0).abs() < f64::EPSILON,
            "RSI should be 100 when all gains"
        );
    }

    #[test]
    fn rsi_all_losses_no_gains() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let rsi = wilder_rsi(&closes, 14).unwrap();
        assert!((rsi - 0.0).abs() < f64::EPSILON, "RSI should be 0 when all losses");
    }

    #[test]
    fn rsi_flat_prices_is_100() {
        // No losses at all, so avg_loss == 0.
        let rsi = wilder_rsi(&[50.0; 20], 14).unwrap();
        assert!((rsi - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_in_range() {
        let closes: Vec<f64> = (1..=40)
            .map(|i| 100.0 + (i as f64 % 7.0 - 3.0) * 2.0)
            .collect();
        let rsi = wilder_rsi(&closes, 14).unwrap();
        assert!((0.0..=100.0).contains(&rsi), "RSI {} out of range", rsi);
    }

    #[test]
    fn rsi_wilder_smoothing_by_hand() {
        // period 2: changes +2, -1, +1
        // seed gain = (2 + 0) / 2 = 1.0, seed loss = (0 + 1) / 2 = 0.5
        // smoothed gain = (1.0 * 1 + 1) / 2 = 1.0, loss = (0.5 * 1 + 0) / 2 = 0.25
        // RS = 4, RSI = 100 - 100 / 5 = 80
        let rsi = wilder_rsi(&[10.0, 12.0, 11.0, 12.0], 2).unwrap();
        assert!((rsi - 80.0).abs() < 1e-10);
    }

    #[test]
    fn rsi_known_calculation() {
        let closes = [
            44.0, 44.25, 44.50, 43.75, 44.50, 44.25, 44.75, 45.25, 45.50, 45.25, 45.50, 46.0,
            46.25, 46.0, 46.50,
        ];
        let rsi = wilder_rsi(&closes, 14).unwrap();
        assert!(rsi > 50.0 && rsi < 100.0, "RSI should be in bullish territory");
    }
}
