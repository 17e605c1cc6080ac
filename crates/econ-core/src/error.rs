//! Error taxonomy shared by every stage of the ingestion and read paths.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// The upstream provider could not be reached (connect error, timeout).
  #[error("upstream unavailable: {0}")]
  UpstreamUnavailable(String),

  /// The upstream provider answered with a non-success status.
  #[error("upstream returned {status}: {message}")]
  Upstream { status: u16, message: String },

  #[error("malformed upstream payload: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("validation error: {0}")]
  Validation(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("persistence failure: {0}")]
  Persistence(#[source] BoxError),

  #[error("aggregation failure: {0}")]
  Aggregation(#[source] BoxError),

  #[error("total for {0} does not fit in a signed 64-bit integer")]
  Overflow(String),
}

impl Error {
  pub fn persistence(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Persistence(Box::new(e))
  }

  pub fn aggregation(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Aggregation(Box::new(e))
  }

  /// Whether a repeat of the same upstream request could plausibly succeed.
  pub fn is_transient(&self) -> bool {
    match self {
      Self::UpstreamUnavailable(_) => true,
      Self::Upstream { status, .. } => *status >= 500,
      _ => false,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
