// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free transforms over a closing-price series.  Every public
// function returns a series with exactly one value per input price; positions
// that lack enough history hold `f64::NAN` instead of being dropped, so the
// output zips 1:1 with the input timestamps.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod set;
pub mod sma;

pub use bollinger::{bollinger, BollingerBands, BollingerParams};
pub use ema::ema;
pub use macd::{macd, MacdParams, MacdResult};
pub use rsi::{rsi, RsiParams};
pub use set::IndicatorSet;
pub use sma::sma;

/// A series of `len` undefined values.
pub(crate) fn undefined(len: usize) -> Vec<f64> {
    vec![f64::NAN; len]
}

/// Indices of `series` that hold a defined (non-NaN) value, in order.
pub(crate) fn defined_indices(series: &[f64]) -> Vec<usize> {
    series
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .map(|(i, _)| i)
        .collect()
}

/// Place `values[j]` at `indices[j]` in a fresh series of length `len`.
/// Slots without a value stay NaN.
pub(crate) fn scatter(values: &[f64], indices: &[usize], len: usize) -> Vec<f64> {
    let mut out = undefined(len);
    for (&idx, &v) in indices.iter().zip(values) {
        out[idx] = v;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defined_indices_skips_leading_and_interior_nan() {
        let series = [f64::NAN, f64::NAN, 1.0, 2.0, f64::NAN, 3.0];
        assert_eq!(defined_indices(&series), vec![2, 3, 5]);
    }

    #[test]
    fn scatter_restores_positions() {
        let out = scatter(&[10.0, 20.0], &[3, 5], 6);
        assert_eq!(out.len(), 6);
        assert!(out[..3].iter().all(|v| v.is_nan()));
        assert_eq!(out[3], 10.0);
        assert!(out[4].is_nan());
        assert_eq!(out[5], 20.0);
    }

    #[test]
    fn scatter_with_fewer_values_than_indices() {
        // Values beyond the end of `values` leave the slot undefined.
        let out = scatter(&[1.0], &[0, 1], 2);
        assert_eq!(out[0], 1.0);
        assert!(out[1].is_nan());
    }
}
