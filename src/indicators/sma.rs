// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
//   SMA_i = (close_{i-period+1} + ... + close_i) / period
//
// Each window is summed afresh, so `period == 1` reproduces the input exactly.

use super::undefined;

/// Sliding-window mean over `period` closes.
///
/// Output index `i` is NaN while `i + 1 < period`. A zero `period` yields an
/// all-NaN series.
pub fn sma(prices: &[f64], period: usize) -> Vec<f64> {
    let mut out = undefined(prices.len());
    if period == 0 || prices.len() < period {
        return out;
    }

    let divisor = period as f64;
    for (offset, window) in prices.windows(period).enumerate() {
        out[offset + period - 1] = window.iter().sum::<f64>() / divisor;
    }
    out
}
