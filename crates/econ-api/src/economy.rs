//! Handlers for `/economy` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/economy` | Live view; optional `?region=<continent\|global>` |
//! | `POST` | `/economy/store` | Runs fetch, normalize, persist, aggregate |
//! | `GET`  | `/economy/stored` | `?table=<name>&limit=<n>` |

use axum::{
  Json,
  extract::{Query, State, rejection::QueryRejection},
};
use chrono::{DateTime, Utc};
use econ_core::{
  Error,
  aggregate::AggregationReport,
  pipeline::run_ingest,
  source::IndicatorSource,
  store::EconomyStore,
  view::{EconomyView, RegionFilter, StoredView, economy_view, stored_rows},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
  AppState, Success,
  error::{ApiError, READ_FAILED},
};

// ─── Live view ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ViewParams {
  pub region: Option<String>,
}

/// `GET /economy[?region=<name>]`
pub async fn view<S, Src>(
  State(state): State<AppState<S, Src>>,
  Query(params): Query<ViewParams>,
) -> Result<Json<Success<EconomyView>>, ApiError>
where
  S: EconomyStore,
  Src: IndicatorSource,
{
  let region = RegionFilter::parse(params.region.as_deref());
  let view = economy_view(&*state.source, &state.continents, &region)
    .await
    .map_err(ApiError::fetch)?;
  Ok(Json(Success::new(view)))
}

// ─── Store pipeline ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCounts {
  pub countries:     usize,
  pub gdp_records:   usize,
  /// Raw provider entries, including ones dropped during normalization.
  pub total_records: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreResponse {
  pub success:   bool,
  pub message:   &'static str,
  pub run_id:    Uuid,
  pub stored:    StoredCounts,
  pub summaries: AggregationReport,
  pub timestamp: DateTime<Utc>,
}

/// `POST /economy/store`
pub async fn store<S, Src>(
  State(state): State<AppState<S, Src>>,
) -> Result<Json<StoreResponse>, ApiError>
where
  S: EconomyStore,
  Src: IndicatorSource,
{
  let outcome = run_ingest(&*state.source, &*state.store, &state.continents)
    .await
    .map_err(ApiError::store)?;

  info!(run_id = %outcome.run_id, facts = outcome.stored.facts_written, "store run complete");

  Ok(Json(StoreResponse {
    success:   true,
    message:   "Economy data stored successfully",
    run_id:    outcome.run_id,
    stored:    StoredCounts {
      countries:     outcome.stored.countries_written,
      gdp_records:   outcome.stored.facts_written,
      total_records: outcome.fetched,
    },
    summaries: outcome.aggregation,
    timestamp: outcome.finished_at,
  }))
}

// ─── Stored tables ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StoredParams {
  pub table: Option<String>,
  pub limit: Option<usize>,
}

/// `GET /economy/stored?table=<countries|gdp_data|continent_summaries>[&limit=<n>]`
pub async fn stored<S, Src>(
  State(state): State<AppState<S, Src>>,
  params: Result<Query<StoredParams>, QueryRejection>,
) -> Result<Json<StoredView>, ApiError>
where
  S: EconomyStore,
  Src: IndicatorSource,
{
  let Query(params) =
    params.map_err(|e| ApiError::new(READ_FAILED, Error::Validation(e.body_text())))?;
  let table = params.table.as_deref().unwrap_or_default();
  let view = stored_rows(&*state.store, table, params.limit)
    .await
    .map_err(|e| ApiError::new(READ_FAILED, e))?;
  Ok(Json(view))
}
