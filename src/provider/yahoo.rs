// =============================================================================
// Yahoo Finance client: chart and options endpoints
// =============================================================================
//
//   GET {base}/v8/finance/chart/{ticker}?range=..&interval=..
//   GET {base}/v7/finance/options/{ticker}
//
// The ticker is pushed as a single encoded path segment and range/interval go
// through the query encoder, so nothing in them can reshape the request.
// Null closes/volumes in the chart payload become NaN so the three columns
// stay aligned with `timestamp`.
// =============================================================================

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{NoDataError, PriceProvider};
use crate::types::{OptionsChain, PriceSeries, RequestShape};

const USER_AGENT: &str = "Mozilla/5.0";

// -----------------------------------------------------------------------------
// Wire format
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartData>>,
    error: Option<UpstreamError>,
}

#[derive(Debug, Deserialize)]
struct UpstreamError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsEnvelope {
    option_chain: OptionsBody,
}

#[derive(Debug, Deserialize)]
struct OptionsBody {
    result: Option<Vec<OptionsData>>,
    error: Option<UpstreamError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsData {
    #[serde(default)]
    expiration_dates: Vec<i64>,
    #[serde(default)]
    options: serde_json::Value,
}

// -----------------------------------------------------------------------------
// Client
// -----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct YahooClient {
    base_url: Url,
    client: reqwest::Client,
}

impl YahooClient {
    /// Build a client whose every request is bounded by `timeout`.
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref().trim_end_matches('/'))
            .with_context(|| format!("invalid upstream base URL: {}", base_url.as_ref()))?;
        if base_url.cannot_be_a_base() {
            bail!("upstream base URL cannot carry a path: {base_url}");
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        debug!(%base_url, ?timeout, "YahooClient initialised");
        Ok(Self { base_url, client })
    }

    /// `base_url` with `segments` appended, each percent-encoded on its own.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("upstream base URL cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let resp = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {url} request failed"))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .with_context(|| format!("failed to read response body from {url}"))?;

        // Yahoo reports unknown symbols as a 404 with a well-formed error body,
        // so try the body before giving up on the status.
        match serde_json::from_str(&text) {
            Ok(body) => Ok(body),
            Err(e) if status.is_success() => {
                Err(e).with_context(|| format!("failed to parse response from {url}"))
            }
            Err(_) => bail!("upstream returned {status}: {}", truncate(&text, 200)),
        }
    }
}

#[async_trait]
impl PriceProvider for YahooClient {
    #[instrument(skip(self), name = "yahoo::fetch_series")]
    async fn fetch_series(&self, ticker: &str, shape: &RequestShape) -> Result<PriceSeries> {
        let url = self.endpoint(&["v8", "finance", "chart", ticker])?;
        let query = [
            ("range", shape.range.as_str()),
            ("interval", shape.interval.as_str()),
        ];
        let envelope: ChartEnvelope = self.get_json(url, &query).await?;
        let series = series_from_chart(ticker, envelope)?;
        debug!(ticker, count = series.len(), "chart fetched");
        Ok(series)
    }

    #[instrument(skip(self), name = "yahoo::fetch_options")]
    async fn fetch_options(&self, ticker: &str) -> Result<OptionsChain> {
        let url = self.endpoint(&["v7", "finance", "options", ticker])?;
        let envelope: OptionsEnvelope = self.get_json(url, &[]).await?;
        let chain = chain_from_options(ticker, envelope)?;
        debug!(ticker, expirations = chain.expiration_dates.len(), "options fetched");
        Ok(chain)
    }
}

// -----------------------------------------------------------------------------
// Payload conversion
// -----------------------------------------------------------------------------

fn series_from_chart(ticker: &str, envelope: ChartEnvelope) -> Result<PriceSeries> {
    let no_data = || NoDataError {
        ticker: ticker.to_string(),
    };

    if let Some(err) = envelope.chart.error {
        if err.code == "Not Found" {
            return Err(no_data().into());
        }
        bail!("upstream chart error: {} - {}", err.code, err.description);
    }

    let data = envelope
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(no_data)?;
    let quote = data.indicators.quote.into_iter().next().ok_or_else(no_data)?;

    let prices = quote.close.into_iter().map(|c| c.unwrap_or(f64::NAN)).collect();
    let volumes: Vec<f64> = quote.volume.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
    if volumes.is_empty() {
        warn!(ticker, "chart payload carried no volumes");
    }

    let series = PriceSeries::new(data.timestamp, prices, volumes)
        .with_context(|| format!("malformed chart payload for {ticker}"))?;
    if series.is_empty() {
        return Err(no_data().into());
    }
    Ok(series)
}

fn chain_from_options(ticker: &str, envelope: OptionsEnvelope) -> Result<OptionsChain> {
    if let Some(err) = envelope.option_chain.error {
        bail!("upstream options error: {} - {}", err.code, err.description);
    }
    let data = envelope
        .option_chain
        .result
        .and_then(|r| r.into_iter().next())
        .with_context(|| format!("No options data found for ticker: {ticker}"))?;

    Ok(OptionsChain {
        expiration_dates: data.expiration_dates,
        options: data.options,
    })
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
