// =============================================================================
// REST API Endpoints: Axum 0.7
// =============================================================================
//
//   GET /api/health
//   GET /api/stock/:ticker?range=..&interval=..
//   GET /api/stock/:ticker/indicators?range=..&interval=..
//
// Every stock request is validated before the provider is touched.  Indicators
// are computed only from a complete series.  CORS is fully permissive; the
// chart frontend is served from a different origin.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::indicators::IndicatorSet;
use crate::types::{OptionsChain, PriceSeries, RequestShape};
use crate::validator::validate;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS, request tracing and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/stock/:ticker", get(stock))
        .route("/api/stock/:ticker/indicators", get(indicators))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
    requests_served: u64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
        requests_served: state.requests_served(),
    })
}

// =============================================================================
// Shared request handling
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct StockQuery {
    range: Option<String>,
    interval: Option<String>,
}

/// Apply configured defaults and run the validator.
fn request_shape(
    state: &AppState,
    ticker: &str,
    query: &StockQuery,
) -> Result<RequestShape, ApiError> {
    let range = query.range.as_deref().unwrap_or(&state.config.default_range);
    let interval = query
        .interval
        .as_deref()
        .unwrap_or(&state.config.default_interval);

    validate(interval, range, state.config.range_check()).map_err(|rejection| {
        warn!(ticker, interval, range, reason = %rejection, "request rejected");
        ApiError::Validation(rejection)
    })
}

async fn fetch(
    state: &AppState,
    ticker: &str,
    query: &StockQuery,
) -> Result<PriceSeries, ApiError> {
    state.record_request();
    let shape = request_shape(state, ticker, query)?;

    let series = state.load_series(ticker, &shape).await.map_err(|e| {
        warn!(ticker, error = %format!("{e:#}"), "upstream fetch failed");
        ApiError::from_provider(ticker, e)
    })?;

    info!(
        ticker,
        interval = %shape.interval,
        range = %shape.range,
        points = series.len(),
        "series fetched"
    );
    Ok(series)
}

// =============================================================================
// Stock series
// =============================================================================

#[derive(Serialize)]
struct StockResponse {
    #[serde(flatten)]
    series: PriceSeries,
    #[serde(flatten)]
    options: Option<OptionsChain>,
}

async fn stock(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(query): Query<StockQuery>,
) -> Result<Json<StockResponse>, ApiError> {
    let series = fetch(&state, &ticker, &query).await?;

    let options = if state.config.fetch_options {
        match state.provider.fetch_options(&ticker).await {
            Ok(chain) => Some(chain),
            Err(e) => {
                warn!(
                    ticker = %ticker,
                    error = %format!("{e:#}"),
                    "options fetch failed, omitting"
                );
                None
            }
        }
    } else {
        None
    };

    Ok(Json(StockResponse { series, options }))
}

// =============================================================================
// Indicators
// =============================================================================

#[derive(Serialize)]
struct IndicatorsResponse {
    timestamps: Vec<i64>,
    indicators: IndicatorSet,
}

async fn indicators(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(query): Query<StockQuery>,
) -> Result<Json<IndicatorsResponse>, ApiError> {
    let series = fetch(&state, &ticker, &query).await?;
    let indicators = IndicatorSet::compute(&series.prices);

    Ok(Json(IndicatorsResponse {
        timestamps: series.timestamps,
        indicators,
    }))
}
