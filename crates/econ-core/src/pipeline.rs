//! The store pipeline: fetch → normalize → persist → aggregate.
//!
//! Stages run strictly in order and each one either hands its output to the
//! next or stops the run with an [`Error`]. Persist failures surface as
//! [`Error::Persistence`], aggregation failures as [`Error::Aggregation`];
//! upstream errors pass through untouched.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{Instrument as _, info, info_span};
use uuid::Uuid;

use crate::{
  Error, Result,
  aggregate::{AggregationReport, recompute_summaries},
  continent::ContinentTable,
  indicator::Indicator,
  normalize::normalize,
  source::IndicatorSource,
  store::{EconomyStore, PersistStats},
};

/// Named stages, used as the `stage` field on log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Fetch,
  Normalize,
  Persist,
  Aggregate,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Fetch => "fetch",
      Self::Normalize => "normalize",
      Self::Persist => "persist",
      Self::Aggregate => "aggregate",
    })
  }
}

/// Everything a completed ingestion run produced.
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
  pub run_id:      Uuid,
  /// Raw entries received from the provider, before filtering.
  pub fetched:     usize,
  pub stored:      PersistStats,
  pub aggregation: AggregationReport,
  pub finished_at: DateTime<Utc>,
}

/// Run the full store pipeline once against `source` and `store`.
pub async fn run_ingest<Src, St>(
  source: &Src,
  store: &St,
  table: &ContinentTable,
) -> Result<IngestOutcome>
where
  Src: IndicatorSource,
  St: EconomyStore,
{
  let run_id = Uuid::new_v4();
  let span = info_span!("ingest", %run_id);

  async move {
    let raw = source.fetch_all_indicator_data(Indicator::Gdp).await?;
    info!(stage = %Stage::Fetch, entries = raw.len(), "fetched provider data");

    let facts = normalize(&raw);
    info!(
      stage = %Stage::Normalize,
      kept = facts.len(),
      dropped = raw.len() - facts.len(),
      "normalized entries"
    );

    let stored = store.persist(facts).await.map_err(Error::persistence)?;
    info!(
      stage = %Stage::Persist,
      countries = stored.countries_written,
      facts = stored.facts_written,
      "persisted batch"
    );

    let aggregation = recompute_summaries(store, table).await?;
    info!(stage = %Stage::Aggregate, year = ?aggregation.year, "aggregation finished");

    Ok(IngestOutcome {
      run_id,
      fetched: raw.len(),
      stored,
      aggregation,
      finished_at: Utc::now(),
    })
  }
  .instrument(span)
  .await
}
