// =============================================================================
// IndicatorSet: every chart overlay for one price series
// =============================================================================
//
// Upstream leaves `null` closes in intraday data where no trade printed.  The
// recurrences (EMA, RSI, MACD) would carry one NaN to the end of the series,
// so the set is computed over the defined closes only and scattered back onto
// their original indices.  A gap slot stays undefined in every output.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::{
    bollinger, defined_indices, ema, macd, rsi, scatter, sma, BollingerBands, BollingerParams,
    MacdParams, MacdResult, RsiParams,
};
use crate::types::nan_as_null;

/// Short and long SMA overlays drawn on the price chart.
pub const SHORT_SMA_PERIOD: usize = 50;
pub const LONG_SMA_PERIOD: usize = 200;
pub const DEFAULT_EMA_PERIOD: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSet {
    #[serde(with = "nan_as_null")]
    pub sma_short: Vec<f64>,
    #[serde(with = "nan_as_null")]
    pub sma_long: Vec<f64>,
    #[serde(with = "nan_as_null")]
    pub ema: Vec<f64>,
    #[serde(with = "nan_as_null")]
    pub rsi: Vec<f64>,
    pub macd: MacdResult,
    pub bollinger: BollingerBands,
}

impl IndicatorSet {
    /// Evaluate every indicator with its default parameters.
    ///
    /// Undefined closes are skipped, not propagated; see the module header.
    pub fn compute(closes: &[f64]) -> Self {
        let defined = defined_indices(closes);
        if defined.len() == closes.len() {
            return Self::compute_gap_free(closes);
        }

        let compact: Vec<f64> = defined.iter().map(|&i| closes[i]).collect();
        Self::compute_gap_free(&compact).scattered(&defined, closes.len())
    }

    fn compute_gap_free(closes: &[f64]) -> Self {
        Self {
            sma_short: sma(closes, SHORT_SMA_PERIOD),
            sma_long: sma(closes, LONG_SMA_PERIOD),
            ema: ema(closes, DEFAULT_EMA_PERIOD),
            rsi: rsi(closes, RsiParams::default()),
            macd: macd(closes, MacdParams::default()),
            bollinger: bollinger(closes, BollingerParams::default()),
        }
    }

    /// Move every value to `indices[j]` in series of length `len`.
    fn scattered(self, indices: &[usize], len: usize) -> Self {
        let place = |values: Vec<f64>| scatter(&values, indices, len);
        Self {
            sma_short: place(self.sma_short),
            sma_long: place(self.sma_long),
            ema: place(self.ema),
            rsi: place(self.rsi),
            macd: MacdResult {
                line: place(self.macd.line),
                signal: place(self.macd.signal),
                histogram: place(self.macd.histogram),
            },
            bollinger: BollingerBands {
                upper: place(self.bollinger.upper),
                middle: place(self.bollinger.middle),
                lower: place(self.bollinger.lower),
            },
        }
    }
}
