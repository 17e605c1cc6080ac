//! HTTP server assembly for the Economy Explorer.
//!
//! Wraps the [`econ_api`] router with CORS and request tracing and owns the
//! runtime configuration. The binary in `main.rs` wires a real store and
//! provider client into it.

use std::{path::PathBuf, time::Duration};

use axum::{
  Router,
  http::{
    HeaderValue, Method,
    header::{self, InvalidHeaderValue},
  },
};
use econ_api::{AppState, api_router};
use econ_core::{source::IndicatorSource, store::EconomyStore};
use econ_worldbank::{BASE_URL, ClientConfig};
use serde::Deserialize;
use thiserror::Error;
use tower_http::{
  cors::{AllowOrigin, Any, CorsLayer},
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ECON_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                      String,
  pub port:                      u16,
  pub store_path:                PathBuf,
  /// Origins allowed by CORS. `"*"` allows any origin.
  pub allowed_origins:           Vec<String>,
  pub upstream_base_url:         String,
  pub upstream_timeout_secs:     u64,
  pub upstream_retry_backoff_ms: u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                      "0.0.0.0".into(),
      port:                      5000,
      store_path:                PathBuf::from("economy.sqlite3"),
      allowed_origins:           vec!["http://localhost:3000".into()],
      upstream_base_url:         BASE_URL.into(),
      upstream_timeout_secs:     30,
      upstream_retry_backoff_ms: 500,
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn client_config(&self) -> ClientConfig {
    ClientConfig {
      base_url:      self.upstream_base_url.clone(),
      timeout:       Duration::from_secs(self.upstream_timeout_secs),
      retry_backoff: Duration::from_millis(self.upstream_retry_backoff_ms),
    }
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid CORS origin {origin:?}: {source}")]
  Origin {
    origin: String,
    #[source]
    source: InvalidHeaderValue,
  },
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// CORS restricted to `origins` with credentials allowed, or open (without
/// credentials) when the list contains `"*"`.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, Error> {
  let layer = CorsLayer::new().allow_methods([Method::GET, Method::POST]);

  if origins.iter().any(|o| o == "*") {
    return Ok(layer.allow_headers(Any).allow_origin(Any));
  }

  let values = origins
    .iter()
    .map(|o| {
      HeaderValue::from_str(o).map_err(|source| Error::Origin { origin: o.clone(), source })
    })
    .collect::<Result<Vec<_>, _>>()?;
  // Credentials rule out wildcard headers, so they are listed.
  Ok(
    layer
      .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
      .allow_credentials(true)
      .allow_origin(AllowOrigin::list(values)),
  )
}

/// Build the full application: the API under `/api`, with CORS and tracing.
pub fn app<S, Src>(state: AppState<S, Src>, config: &ServerConfig) -> Result<Router, Error>
where
  S: EconomyStore + 'static,
  Src: IndicatorSource + 'static,
{
  Ok(
    Router::new()
      .nest("/api", api_router(state))
      .layer(cors_layer(&config.allowed_origins)?)
      .layer(TraceLayer::new_for_http()),
  )
}
