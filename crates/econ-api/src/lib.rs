//! JSON REST API for the Economy Explorer.
//!
//! Exposes an axum [`Router`] backed by any [`EconomyStore`] and
//! [`IndicatorSource`]. CORS, tracing layers and binding are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", econ_api::api_router(state))
//! ```

pub mod collect;
pub mod economy;
pub mod error;
pub mod health;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use econ_core::{continent::ContinentTable, source::IndicatorSource, store::EconomyStore};
use serde::Serialize;

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct AppState<S, Src> {
  pub store:      Arc<S>,
  pub source:     Arc<Src>,
  /// Built once at startup; never mutated.
  pub continents: Arc<ContinentTable>,
}

impl<S, Src> Clone for AppState<S, Src> {
  fn clone(&self) -> Self {
    Self {
      store:      Arc::clone(&self.store),
      source:     Arc::clone(&self.source),
      continents: Arc::clone(&self.continents),
    }
  }
}

/// Success envelope: `{"success": true, ...body}`.
#[derive(Debug, Serialize)]
pub struct Success<T> {
  pub success: bool,
  #[serde(flatten)]
  pub body:    T,
}

impl<T> Success<T> {
  pub fn new(body: T) -> Self { Self { success: true, body } }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, Src>(state: AppState<S, Src>) -> Router<()>
where
  S: EconomyStore + 'static,
  Src: IndicatorSource + 'static,
{
  Router::new()
    // Economy
    .route("/economy", get(economy::view::<S, Src>))
    .route("/economy/store", post(economy::store::<S, Src>))
    .route("/economy/stored", get(economy::stored::<S, Src>))
    // Single country
    .route("/collect", post(collect::handler::<S, Src>))
    .route("/health", get(health::handler::<S, Src>))
    .with_state(state)
}
