//! `POST /collect`: raw GDP and population series for one country.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use econ_core::{
  Error,
  source::IndicatorSource,
  store::EconomyStore,
  view::{CountrySnapshot, country_snapshot},
};
use serde::Deserialize;

use crate::{
  AppState,
  error::{ApiError, COLLECT_FAILED},
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectBody {
  pub country_code: Option<String>,
}

/// `POST /collect`: body `{"countryCode":"USA"}`
pub async fn handler<S, Src>(
  State(state): State<AppState<S, Src>>,
  body: Result<Json<CollectBody>, JsonRejection>,
) -> Result<Json<CountrySnapshot>, ApiError>
where
  S: EconomyStore,
  Src: IndicatorSource,
{
  let Json(body) =
    body.map_err(|e| ApiError::new(COLLECT_FAILED, Error::Validation(e.body_text())))?;

  let snapshot = country_snapshot(&*state.source, body.country_code.as_deref())
    .await
    .map_err(|e| ApiError::new(COLLECT_FAILED, e))?;
  Ok(Json(snapshot))
}
