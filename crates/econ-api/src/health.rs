//! `GET /health`

use axum::{Json, extract::State};
use econ_core::{Error, source::IndicatorSource, store::EconomyStore};
use serde_json::{Value, json};

use crate::{
  AppState,
  error::{ApiError, HEALTH_FAILED},
};

/// Answers `{"status":"ok"}` once the store responds to a trivial query.
pub async fn handler<S, Src>(State(state): State<AppState<S, Src>>) -> Result<Json<Value>, ApiError>
where
  S: EconomyStore,
  Src: IndicatorSource,
{
  state
    .store
    .ping()
    .await
    .map_err(|e| ApiError::new(HEALTH_FAILED, Error::persistence(e)))?;
  Ok(Json(json!({ "status": "ok" })))
}
