// =============================================================================
// API errors: HTTP status + JSON body
// =============================================================================
//
//   Validation  -> 400 {"error": reason}
//   NoData      -> 500 {"error": "No stock data found for ticker: X"}
//   Upstream    -> 500 {"error": .., "details": ..}
// =============================================================================

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::provider::NoDataError;
use crate::validator::Rejection;

/// Unified error type for API responses.
#[derive(Debug)]
pub enum ApiError {
    /// The request shape was refused before any upstream call.
    Validation(Rejection),
    /// Upstream answered with nothing for the ticker.
    NoData(String),
    /// Upstream call failed or timed out.
    Upstream { error: String, details: String },
}

impl ApiError {
    /// Classify a provider failure for `ticker`.
    pub fn from_provider(ticker: &str, err: anyhow::Error) -> Self {
        if let Some(no_data) = err.downcast_ref::<NoDataError>() {
            return Self::NoData(no_data.ticker.clone());
        }
        Self::Upstream {
            error: format!("Failed to fetch stock data for ticker: {ticker}"),
            details: format!("{err:#}"),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NoData(_) | Self::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(rejection) => write!(f, "{rejection}"),
            Self::NoData(ticker) => write!(f, "No stock data found for ticker: {ticker}"),
            Self::Upstream { error, details } => write!(f, "{error}: {details}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<Rejection> for ApiError {
    fn from(r: Rejection) -> Self {
        Self::Validation(r)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation(rejection) => json!({ "error": rejection.reason() }),
            Self::NoData(_) => json!({ "error": self.to_string() }),
            Self::Upstream { error, details } => json!({ "error": error, "details": details }),
        };
        (status, axum::Json(body)).into_response()
    }
}
