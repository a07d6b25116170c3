// =============================================================================
// Upstream price provider
// =============================================================================
//
// The only I/O-bound collaborator.  Implementations must return either a
// complete, aligned `PriceSeries` or an error; nothing partial.

pub mod yahoo;

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{OptionsChain, PriceSeries, RequestShape};

pub use yahoo::YahooClient;

#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Closing prices, timestamps and volumes for `ticker` over `shape`.
    async fn fetch_series(&self, ticker: &str, shape: &RequestShape) -> Result<PriceSeries>;

    /// Option expirations and contracts for `ticker`.
    async fn fetch_options(&self, ticker: &str) -> Result<OptionsChain>;
}

/// The provider answered but had nothing for the ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoDataError {
    pub ticker: String,
}

impl fmt::Display for NoDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No stock data found for ticker: {}", self.ticker)
    }
}

impl std::error::Error for NoDataError {}
