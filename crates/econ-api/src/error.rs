//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every handler failure goes through [`status_for`], so the mapping from the
//! domain taxonomy to HTTP lives in exactly one place.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use econ_core::Error;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

pub const FETCH_FAILED: &str = "Error fetching economy data";
pub const STORE_FAILED: &str = "Error storing economy data";
pub const READ_FAILED: &str = "Error reading stored economy data";
pub const COLLECT_FAILED: &str = "Error fetching country data";
pub const HEALTH_FAILED: &str = "Store unavailable";

/// A domain error plus the generic message shown for it on 5xx responses.
#[derive(Debug, Error)]
#[error("{message}: {source}")]
pub struct ApiError {
  message: &'static str,
  #[source]
  source:  Error,
}

impl ApiError {
  pub fn new(message: &'static str, source: Error) -> Self { Self { message, source } }

  pub fn fetch(source: Error) -> Self { Self::new(FETCH_FAILED, source) }

  pub fn store(source: Error) -> Self { Self::new(STORE_FAILED, source) }

  pub fn status(&self) -> StatusCode { status_for(&self.source) }

  pub fn inner(&self) -> &Error { &self.source }
}

/// HTTP status for each variant of the domain taxonomy.
pub fn status_for(e: &Error) -> StatusCode {
  match e {
    Error::UpstreamUnavailable(_) | Error::Upstream { .. } | Error::Decode(_) => {
      StatusCode::BAD_GATEWAY
    }
    Error::Validation(_) => StatusCode::BAD_REQUEST,
    Error::NotFound(_) => StatusCode::NOT_FOUND,
    Error::Persistence(_) | Error::Aggregation(_) | Error::Overflow(_) => {
      StatusCode::INTERNAL_SERVER_ERROR
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();

    let body = match &self.source {
      // Not-found carries its own user-facing message and no error detail.
      Error::NotFound(m) => json!({ "success": false, "message": m }),
      Error::Validation(m) => json!({
        "success": false,
        "message": m,
        "error": self.source.to_string(),
      }),
      other => json!({
        "success": false,
        "message": self.message,
        "error": other.to_string(),
      }),
    };

    if status.is_server_error() {
      error!(status = status.as_u16(), error = %self.source, "{}", self.message);
    } else {
      warn!(status = status.as_u16(), error = %self.source, "request rejected");
    }

    (status, Json(body)).into_response()
  }
}
