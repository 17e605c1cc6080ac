//! The `EconomyStore` trait and the row types it returns.
//!
//! The trait is implemented by storage backends (e.g. `econ-store-sqlite`).
//! The ingestion pipeline and the read façade depend on this abstraction, not
//! on any concrete backend.

use std::{fmt, future::Future, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  normalize::NormalizedFact,
  summary::{ContinentSummary, MemberValue},
};

// ─── Row types ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRow {
  pub country_code: String,
  pub country_name: String,
  pub updated_at:   DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactRow {
  pub country_code:   String,
  pub year:           i32,
  pub gdp:            i64,
  pub indicator_id:   String,
  pub indicator_name: String,
  pub unit:           String,
  pub decimal_places: i64,
  pub updated_at:     DateTime<Utc>,
}

/// A stored continent summary, flattened the way it sits in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
  pub continent_code:   String,
  pub year:             i32,
  pub continent_name:   String,
  pub total_gdp:        i64,
  pub average_gdp:      i64,
  pub country_count:    u32,
  pub top_country_code: String,
  pub top_country_name: String,
  pub top_country_gdp:  i64,
  pub updated_at:       DateTime<Utc>,
}

/// What one [`EconomyStore::persist`] call wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistStats {
  /// Distinct country codes upserted.
  pub countries_written: usize,
  pub facts_written:     usize,
}

// ─── Table names ─────────────────────────────────────────────────────────────

/// The tables exposed for browsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoredTable {
  Countries,
  GdpData,
  ContinentSummaries,
}

impl StoredTable {
  pub const ALL: [StoredTable; 3] =
    [Self::Countries, Self::GdpData, Self::ContinentSummaries];

  pub fn name(self) -> &'static str {
    match self {
      Self::Countries => "countries",
      Self::GdpData => "gdp_data",
      Self::ContinentSummaries => "continent_summaries",
    }
  }
}

impl fmt::Display for StoredTable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for StoredTable {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|t| t.name() == s)
      .ok_or_else(|| {
        Error::Validation(format!(
          "unknown table {s:?}; expected one of countries, gdp_data, continent_summaries"
        ))
      })
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an Economy Explorer storage backend.
///
/// `persist` is the only writer of countries and facts; `upsert_summary` is
/// the only writer of continent summaries.
pub trait EconomyStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Upsert every fact (and its country) in one transaction. Any failure
  /// rolls the whole batch back.
  fn persist(
    &self,
    facts: Vec<NormalizedFact>,
  ) -> impl Future<Output = Result<PersistStats, Self::Error>> + Send + '_;

  /// Insert or fully overwrite the summary keyed by (continent, year).
  fn upsert_summary(
    &self,
    summary: ContinentSummary,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Aggregation reads ─────────────────────────────────────────────────

  /// The maximum year across all stored facts, or `None` when empty.
  fn latest_year(&self) -> impl Future<Output = Result<Option<i32>, Self::Error>> + Send + '_;

  /// Stored values for `country_codes` in `year`, highest value first, ties
  /// by country code ascending.
  fn member_facts<'a>(
    &'a self,
    country_codes: &'a [String],
    year: i32,
  ) -> impl Future<Output = Result<Vec<MemberValue>, Self::Error>> + Send + 'a;

  // ── Browsing ──────────────────────────────────────────────────────────

  fn list_countries(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<CountryRow>, Self::Error>> + Send + '_;

  fn list_facts(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<FactRow>, Self::Error>> + Send + '_;

  fn list_summaries(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<SummaryRow>, Self::Error>> + Send + '_;

  /// Cheap liveness check.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
