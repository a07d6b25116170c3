// =============================================================================
// Moving Average Convergence / Divergence (MACD)
// =============================================================================
//
//   line      = EMA_fast(close) - EMA_slow(close)
//   signal    = EMA_signal(line), taken over the defined part of `line` only
//   histogram = line - signal
//
// The signal EMA runs on the compacted defined values of the line and is then
// scattered back onto the same indices, so its first defined index is
// `slow - 1 + signal - 1`.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::{defined_indices, ema, scatter};
use crate::types::nan_as_null;

pub const DEFAULT_MACD_FAST: usize = 12;
pub const DEFAULT_MACD_SLOW: usize = 26;
pub const DEFAULT_MACD_SIGNAL: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: DEFAULT_MACD_FAST,
            slow: DEFAULT_MACD_SLOW,
            signal: DEFAULT_MACD_SIGNAL,
        }
    }
}

/// The three MACD series, each as long as the input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacdResult {
    #[serde(with = "nan_as_null")]
    pub line: Vec<f64>,
    #[serde(with = "nan_as_null")]
    pub signal: Vec<f64>,
    #[serde(with = "nan_as_null")]
    pub histogram: Vec<f64>,
}

pub fn macd(closes: &[f64], params: MacdParams) -> MacdResult {
    let fast = ema(closes, params.fast);
    let slow = ema(closes, params.slow);
    let line = difference(&fast, &slow);

    let defined = defined_indices(&line);
    let compact: Vec<f64> = defined.iter().map(|&i| line[i]).collect();
    let signal = scatter(&ema(&compact, params.signal), &defined, closes.len());

    let histogram = difference(&line, &signal);

    MacdResult {
        line,
        signal,
        histogram,
    }
}

/// Element-wise `a - b`, NaN wherever either side is undefined.
fn difference(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            if x.is_nan() || y.is_nan() {
                f64::NAN
            } else {
                x - y
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1)
            .collect()
    }

    fn first_defined(series: &[f64]) -> Option<usize> {
        series.iter().position(|v| !v.is_nan())
    }

    #[test]
    fn macd_lengths_match_input() {
        for n in [0, 1, 10, 26, 40, 120] {
            let r = macd(&wave(n), MacdParams::default());
            assert_eq!(r.line.len(), n);
            assert_eq!(r.signal.len(), n);
            assert_eq!(r.histogram.len(), n);
        }
    }

    #[test]
    fn macd_warm_up_boundaries() {
        let r = macd(&wave(80), MacdParams::default());
        assert_eq!(first_defined(&r.line), Some(25));
        assert_eq!(first_defined(&r.signal), Some(25 + 8));
        assert_eq!(first_defined(&r.histogram), Some(33));
    }

    #[test]
    fn macd_too_short_for_signal() {
        // Line defined from 25, but only 5 line values < signal period 9.
        let r = macd(&wave(30), MacdParams::default());
        assert_eq!(first_defined(&r.line), Some(25));
        assert!(r.signal.iter().all(|v| v.is_nan()));
        assert!(r.histogram.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn macd_histogram_is_line_minus_signal() {
        let r = macd(&wave(100), MacdParams::default());
        for i in 0..100 {
            if !r.line[i].is_nan() && !r.signal[i].is_nan() {
                assert_eq!(r.histogram[i], r.line[i] - r.signal[i]);
            } else {
                assert!(r.histogram[i].is_nan());
            }
        }
    }

    #[test]
    fn macd_signal_matches_ema_of_defined_line() {
        let params = MacdParams {
            fast: 3,
            slow: 5,
            signal: 4,
        };
        let closes = wave(40);
        let r = macd(&closes, params);

        let suffix: Vec<f64> = r.line[4..].to_vec();
        let expected = ema(&suffix, 4);
        for (j, &e) in expected.iter().enumerate() {
            let got = r.signal[4 + j];
            if e.is_nan() {
                assert!(got.is_nan());
            } else {
                assert!((got - e).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn macd_line_is_fast_minus_slow() {
        let closes = wave(60);
        let r = macd(&closes, MacdParams::default());
        let fast = ema(&closes, 12);
        let slow = ema(&closes, 26);
        for i in 25..60 {
            assert!((r.line[i] - (fast[i] - slow[i])).abs() < 1e-12);
        }
    }

    #[test]
    fn macd_of_constant_series_is_zero() {
        let r = macd(&[50.0; 60], MacdParams::default());
        for i in 33..60 {
            assert!(r.line[i].abs() < 1e-10);
            assert!(r.signal[i].abs() < 1e-10);
            assert!(r.histogram[i].abs() < 1e-10);
        }
    }
}
