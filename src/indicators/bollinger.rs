// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ).  σ is the population standard deviation of the
// same `period` window (divisor `period`).  A flat window gives σ = 0 and all
// three bands coincide.

use serde::{Deserialize, Serialize};

use super::{sma, undefined};
use crate::types::nan_as_null;

pub const DEFAULT_BOLLINGER_PERIOD: usize = 20;
pub const DEFAULT_BOLLINGER_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerParams {
    pub period: usize,
    pub multiplier: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            period: DEFAULT_BOLLINGER_PERIOD,
            multiplier: DEFAULT_BOLLINGER_MULTIPLIER,
        }
    }
}

/// Upper, middle and lower bands, each as long as the input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BollingerBands {
    #[serde(with = "nan_as_null")]
    pub upper: Vec<f64>,
    #[serde(with = "nan_as_null")]
    pub middle: Vec<f64>,
    #[serde(with = "nan_as_null")]
    pub lower: Vec<f64>,
}

/// Calculate Bollinger Bands for the given closing prices.
///
/// `upper` and `lower` are NaN for `i < period - 1`, matching `middle`.
pub fn bollinger(closes: &[f64], params: BollingerParams) -> BollingerBands {
    let period = params.period;
    let middle = sma(closes, period);
    let mut upper = undefined(closes.len());
    let mut lower = undefined(closes.len());

    if period > 0 {
        let period_f = period as f64;
        for (offset, window) in closes.windows(period).enumerate() {
            let i = offset + period - 1;
            let mean = window.iter().sum::<f64>() / period_f;
            let variance = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / period_f;
            let band = params.multiplier * variance.sqrt();
            upper[i] = middle[i] + band;
            lower[i] = middle[i] - band;
        }
    }

    BollingerBands {
        upper,
        middle,
        lower,
    }
}
