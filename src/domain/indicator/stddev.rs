//! Standard Deviation.
//!
//! Population standard deviation over the last n values:
//! STDDEV(n) = sqrt(sum((V[j] - SMA(n))^2) / n)

use super::trailing;

pub fn stddev(values: &[f64], period: usize) -> Option<f64> {
    let window = trailing(values, period)?;
    let mean = window.iter().sum::<f64>() / period as f64;

    let variance: f64 = window
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / period as f64;

    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stddev_constant_values() {
        let v = stddev(&[100.0, 100.0, 100.0, 100.0, 100.0], 3).unwrap();
        assert!((v - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stddev_basic_calculation() {
        let v = stddev(&[10.0, 20.0, 30.0], 3).unwrap();
        let sma: f64 = (10.0 + 20.0 + 30.0) / 3.0;
        let expected: f64 =
            ((10.0 - sma).powi(2) + (20.0 - sma).powi(2) + (30.0 - sma).powi(2)) / 3.0;
        assert!((v - expected.sqrt()).abs() < 1e-10);
    }

    #[test]
    fn stddev_known_values() {
        let v = stddev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8).unwrap();
        assert!((v - 2.0).abs() < 1e-10);
    }

    #[test]
    fn stddev_uses_trailing_window() {
        // Only the last two values (4, 8) count: mean 6, population stddev 2.
        let v = stddev(&[100.0, 4.0, 8.0], 2).unwrap();
        assert!((v - 2.0).abs() < 1e-10);
    }

    #[test]
    fn stddev_insufficient() {
        assert_eq!(stddev(&[1.0, 2.0], 5), None);
    }
}
