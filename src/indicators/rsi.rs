// =============================================================================
// Relative Strength Index (RSI): Wilder's Smoothing
// =============================================================================
//
// Step 1: Compute price changes (deltas) from consecutive closes and split
//         them into gains and losses.
// Step 2: Seed average gain / average loss with the SMA of the first `period`
//         gains / losses.
// Step 3: Apply Wilder's smoothing for every later bar:
//            avg_gain = (prev_avg_gain * (period - 1) + current_gain) / period
//            avg_loss = (prev_avg_loss * (period - 1) + current_loss) / period
// Step 4: RS  = avg_gain / avg_loss
//         RSI = 100 - 100 / (1 + RS)
//
// A zero average loss is replaced by `ZERO_LOSS_EPSILON` rather than special
// cased, so an all-gain run reads just under 100 and a flat run reads 0.
// =============================================================================

use super::undefined;

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Stand-in for a zero average loss.
pub const ZERO_LOSS_EPSILON: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsiParams {
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self {
            period: DEFAULT_RSI_PERIOD,
        }
    }
}

/// Compute the full RSI series for `closes`.
///
/// The first defined value sits at index `period`; everything before it is
/// NaN. Returns an all-NaN series when `period == 0` or there are not at least
/// `period + 1` closes.
pub fn rsi(closes: &[f64], params: RsiParams) -> Vec<f64> {
    let period = params.period;
    let mut out = undefined(closes.len());
    if period == 0 || closes.len() <= period {
        return out;
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| split_delta(w[1] - w[0]))
        .unzip();

    let period_f = period as f64;
    let mut avg_gain = gains[..period].iter().sum::<f64>() / period_f;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period_f;
    out[period] = rsi_from_averages(avg_gain, avg_loss);

    // gains[i - 1] is the move that ends on close i.
    for i in (period + 1)..closes.len() {
        avg_gain = (avg_gain * (period_f - 1.0) + gains[i - 1]) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + losses[i - 1]) / period_f;
        out[i] = rsi_from_averages(avg_gain, avg_loss);
    }

    out
}

/// Split a delta into `(gain, loss)`, both non-negative. NaN stays NaN.
fn split_delta(delta: f64) -> (f64, f64) {
    if delta.is_nan() {
        (f64::NAN, f64::NAN)
    } else if delta > 0.0 {
        (delta, 0.0)
    } else {
        (0.0, -delta)
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    let avg_loss = if avg_loss == 0.0 {
        ZERO_LOSS_EPSILON
    } else {
        avg_loss
    };
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
