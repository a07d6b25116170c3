// =============================================================================
// Shared types used across the stock-signals service
// =============================================================================

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

// =============================================================================
// Interval
// =============================================================================

/// Sampling granularity accepted by the upstream chart endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "2m")]
    TwoMinutes,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "60m")]
    SixtyMinutes,
    #[serde(rename = "90m")]
    NinetyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1wk")]
    OneWeek,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
}

impl Interval {
    pub const ALL: [Interval; 15] = [
        Self::OneMinute,
        Self::TwoMinutes,
        Self::FiveMinutes,
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
        Self::SixtyMinutes,
        Self::NinetyMinutes,
        Self::OneHour,
        Self::OneDay,
        Self::FiveDays,
        Self::OneWeek,
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::OneYear,
    ];

    /// Wire representation used in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::TwoMinutes => "2m",
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::ThirtyMinutes => "30m",
            Self::SixtyMinutes => "60m",
            Self::NinetyMinutes => "90m",
            Self::OneHour => "1h",
            Self::OneDay => "1d",
            Self::FiveDays => "5d",
            Self::OneWeek => "1wk",
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
        }
    }

    /// Any granularity finer than one day.
    pub fn is_intraday(&self) -> bool {
        matches!(
            self,
            Self::OneMinute
                | Self::TwoMinutes
                | Self::FiveMinutes
                | Self::FifteenMinutes
                | Self::ThirtyMinutes
                | Self::SixtyMinutes
                | Self::NinetyMinutes
                | Self::OneHour
        )
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a supported interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownInterval(pub String);

impl fmt::Display for UnknownInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown interval '{}'", self.0)
    }
}

impl std::error::Error for UnknownInterval {}

impl FromStr for Interval {
    type Err = UnknownInterval;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| UnknownInterval(s.to_string()))
    }
}

// =============================================================================
// RequestShape
// =============================================================================

/// A validated `(interval, range)` pair, built once per request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RequestShape {
    pub interval: Interval,
    pub range: String,
}

// =============================================================================
// PriceSeries
// =============================================================================

/// Closing prices with their timestamps (epoch seconds) and volumes.
///
/// `timestamps` and `prices` always share one length. `volumes` is either
/// empty (the provider sent none) or the same length. Missing upstream
/// observations are kept as NaN so index `i` means the same bar everywhere.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    pub timestamps: Vec<i64>,
    #[serde(with = "nan_as_null")]
    pub prices: Vec<f64>,
    #[serde(with = "nan_as_null", default)]
    pub volumes: Vec<f64>,
}

impl PriceSeries {
    pub fn new(timestamps: Vec<i64>, prices: Vec<f64>, volumes: Vec<f64>) -> Result<Self> {
        if timestamps.len() != prices.len() {
            bail!(
                "price series misaligned: {} timestamps vs {} prices",
                timestamps.len(),
                prices.len()
            );
        }
        if !volumes.is_empty() && volumes.len() != prices.len() {
            bail!(
                "price series misaligned: {} volumes vs {} prices",
                volumes.len(),
                prices.len()
            );
        }
        Ok(Self {
            timestamps,
            prices,
            volumes,
        })
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

// =============================================================================
// Options chain (secondary collaborator payload)
// =============================================================================

/// Expiration dates plus the raw option contracts, passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsChain {
    pub expiration_dates: Vec<i64>,
    pub options: serde_json::Value,
}

// =============================================================================
// NaN <-> null
// =============================================================================

/// Serde adapter for `Vec<f64>` that writes non-finite values as `null` and
/// reads `null` back as NaN, so warm-up regions survive a JSON round trip.
pub mod nan_as_null {
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for v in values {
            let item = if v.is_finite() { Some(*v) } else { None };
            seq.serialize_element(&item)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let raw: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
        Ok(raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}
