// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The first EMA value is seeded with the SMA of the first `period` closes and
// lands at index `period - 1`.
// =============================================================================

use super::undefined;

/// Compute the EMA series for `closes` with look-back `period`.
///
/// The result has one entry per close. The first `period - 1` entries are NaN.
///
/// # Edge cases
/// - `period == 0` => all NaN
/// - `closes.len() < period` => all NaN
/// - A NaN close propagates through every later value of the recurrence.
pub fn ema(closes: &[f64], period: usize) -> Vec<f64> {
    let mut out = undefined(closes.len());
    if period == 0 || closes.len() < period {
        return out;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);

    // Seed: SMA of the first `period` values.
    let seed = closes[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = seed;

    let mut prev = seed;
    for (slot, &close) in out[period..].iter_mut().zip(&closes[period..]) {
        prev = close * multiplier + prev * (1.0 - multiplier);
        *slot = prev;
    }

    out
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_empty_input() {
        assert!(ema(&[], 5).is_empty());
    }

    #[test]
    fn ema_period_zero() {
        let out = ema(&[1.0, 2.0, 3.0], 0);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn ema_insufficient_data() {
        let out = ema(&[1.0, 2.0], 5);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn ema_period_equals_length() {
        let out = ema(&[2.0, 4.0, 6.0], 3);
        assert_eq!(out.len(), 3);
        assert!(out[0].is_nan() && out[1].is_nan());
        // Should be the SMA = (2+4+6)/3 = 4.0
        assert!((out[2] - 4.0).abs() < 1e-10);
    }

    #[test]
    fn ema_seed_is_mean_of_first_period() {
        let closes = vec![5.0, 1.0, 9.0, 3.0, 7.0, 2.0];
        let out = ema(&closes, 4);
        assert!(out[..3].iter().all(|v| v.is_nan()));
        assert!((out[3] - 4.5).abs() < 1e-12);
    }

    #[test]
    fn ema_known_values() {
        // 5-period EMA of [1,2,3,4,5,6,7,8,9,10]
        // SMA of first 5 = 3.0, multiplier = 2/6 = 1/3
        let closes: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let out = ema(&closes, 5);
        assert_eq!(out.len(), 10);

        let mult = 2.0 / 6.0;
        let mut expected = 3.0;
        assert!((out[4] - expected).abs() < 1e-10);
        for (i, &c) in closes.iter().enumerate().skip(5) {
            expected = c * mult + expected * (1.0 - mult);
            assert!(
                (out[i] - expected).abs() < 1e-10,
                "index {i}: got {}, expected {expected}",
                out[i]
            );
        }
    }

    #[test]
    fn ema_of_constant_series_is_constant() {
        let out = ema(&[100.0; 30], 10);
        for v in &out[9..] {
            assert!((v - 100.0).abs() < 1e-10);
        }
    }
}
