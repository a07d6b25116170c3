// =============================================================================
// Central Application State
// =============================================================================
//
// Shared by every request handler via `Arc<AppState>`.
//
// Thread safety:
//   - Atomic counter for lock-free request accounting.
//   - parking_lot::RwLock around the series cache; the lock is never held
//     across an await.
// =============================================================================

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use parking_lot::RwLock;
use tracing::debug;

use crate::config::ServerConfig;
use crate::provider::PriceProvider;
use crate::types::{Interval, PriceSeries, RequestShape};

/// Identifies one upstream chart request.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct SeriesKey {
    pub ticker: String,
    pub range: String,
    pub interval: Interval,
}

impl SeriesKey {
    pub fn new(ticker: &str, shape: &RequestShape) -> Self {
        Self {
            ticker: ticker.to_uppercase(),
            range: shape.range.clone(),
            interval: shape.interval,
        }
    }
}

impl std::fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}/{}", self.ticker, self.range, self.interval)
    }
}

struct CachedSeries {
    series: PriceSeries,
    fetched_at: Instant,
}

pub struct AppState {
    pub config: ServerConfig,
    pub provider: Arc<dyn PriceProvider>,
    cache: RwLock<HashMap<SeriesKey, CachedSeries>>,
    requests_served: AtomicU64,
}

impl AppState {
    pub fn new(config: ServerConfig, provider: Arc<dyn PriceProvider>) -> Self {
        Self {
            config,
            provider,
            cache: RwLock::new(HashMap::new()),
            requests_served: AtomicU64::new(0),
        }
    }

    pub fn record_request(&self) -> u64 {
        self.requests_served.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn requests_served(&self) -> u64 {
        self.requests_served.load(Ordering::Relaxed)
    }

    /// Fetch a series, answering from the cache while it is fresh.
    ///
    /// Failed fetches are never cached.
    pub async fn load_series(&self, ticker: &str, shape: &RequestShape) -> Result<PriceSeries> {
        let Some(ttl) = self.config.cache_ttl() else {
            return self.provider.fetch_series(ticker, shape).await;
        };

        let key = SeriesKey::new(ticker, shape);
        if let Some(hit) = self.cached(&key, ttl) {
            debug!(key = %key, "series served from cache");
            return Ok(hit);
        }

        let series = self.provider.fetch_series(ticker, shape).await?;
        self.evict_expired(ttl);
        self.cache.write().insert(
            key,
            CachedSeries {
                series: series.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(series)
    }

    fn cached(&self, key: &SeriesKey, ttl: std::time::Duration) -> Option<PriceSeries> {
        let cache = self.cache.read();
        let entry = cache.get(key)?;
        (entry.fetched_at.elapsed() < ttl).then(|| entry.series.clone())
    }

    fn evict_expired(&self, ttl: std::time::Duration) {
        self.cache
            .write()
            .retain(|_, entry| entry.fetched_at.elapsed() < ttl);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory provider shared by state and router tests.

    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    use crate::provider::{NoDataError, PriceProvider};
    use crate::types::{OptionsChain, PriceSeries, RequestShape};

    pub enum Canned {
        Series(PriceSeries),
        NoData,
        Fail(&'static str),
    }

    pub struct FakeProvider {
        pub canned: Canned,
        pub options: Option<OptionsChain>,
        pub series_calls: AtomicUsize,
    }

    impl FakeProvider {
        pub fn new(canned: Canned) -> Self {
            Self {
                canned,
                options: None,
                series_calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.series_calls.load(Ordering::SeqCst)
        }
    }

    /// Closes 1..=n with timestamps one hour apart.
    pub fn ramp(n: usize) -> PriceSeries {
        let timestamps = (0..n as i64).map(|i| 1_700_000_000 + i * 3600).collect();
        let prices = (1..=n).map(|i| i as f64).collect();
        let volumes = vec![1_000.0; n];
        PriceSeries::new(timestamps, prices, volumes).unwrap()
    }

    #[async_trait]
    impl PriceProvider for FakeProvider {
        async fn fetch_series(&self, ticker: &str, _shape: &RequestShape) -> Result<PriceSeries> {
            self.series_calls.fetch_add(1, Ordering::SeqCst);
            match &self.canned {
                Canned::Series(s) => Ok(s.clone()),
                Canned::NoData => Err(NoDataError {
                    ticker: ticker.to_string(),
                }
                .into()),
                Canned::Fail(msg) => Err(anyhow!(*msg)),
            }
        }

        async fn fetch_options(&self, ticker: &str) -> Result<OptionsChain> {
            self.options
                .clone()
                .ok_or_else(|| anyhow!("No options data found for ticker: {ticker}"))
        }
    }
}
