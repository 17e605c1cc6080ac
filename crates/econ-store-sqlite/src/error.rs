//! Error type for `econ-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored value that cannot be mapped back onto a domain type.
  #[error("corrupt row: {0}")]
  Corrupt(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
