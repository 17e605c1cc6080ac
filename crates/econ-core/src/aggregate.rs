//! Continent aggregation over stored facts.

use serde::Serialize;
use tracing::{debug, info};

use crate::{
  Error, Result,
  continent::{Continent, ContinentTable},
  store::EconomyStore,
  summary::summarize,
};

/// Outcome of one [`recompute_summaries`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregationReport {
  /// The year summarised; `None` when the store held no facts.
  pub year:    Option<i32>,
  pub written: Vec<Continent>,
  /// Continents with no facts for `year`.
  pub skipped: Vec<Continent>,
}

/// Recompute one summary per continent for the latest stored year.
///
/// Continents are processed in table order and each upsert commits on its
/// own: a failure aborts the remaining continents but leaves earlier ones in
/// place. An empty store is a logged no-op.
pub async fn recompute_summaries<S: EconomyStore>(
  store: &S,
  table: &ContinentTable,
) -> Result<AggregationReport> {
  let Some(year) = store.latest_year().await.map_err(Error::aggregation)? else {
    info!("no facts stored yet; skipping continent aggregation");
    return Ok(AggregationReport::default());
  };

  let mut report = AggregationReport { year: Some(year), ..Default::default() };

  for membership in table.memberships() {
    let continent = membership.continent;
    let codes: Vec<String> = membership.members.iter().cloned().collect();

    let rows = store
      .member_facts(&codes, year)
      .await
      .map_err(Error::aggregation)?;

    let Some(summary) = summarize(continent, year, &rows).map_err(Error::aggregation)? else {
      debug!(%continent, year, "no facts for continent; skipping");
      report.skipped.push(continent);
      continue;
    };

    debug!(
      %continent,
      year,
      total = summary.total_gdp,
      countries = summary.country_count,
      top = %summary.top_country.code,
      "writing continent summary"
    );
    store.upsert_summary(summary).await.map_err(Error::aggregation)?;
    report.written.push(continent);
  }

  info!(
    year,
    written = report.written.len(),
    skipped = report.skipped.len(),
    "continent summaries recomputed"
  );
  Ok(report)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{MemoryStore, fact};

  fn table() -> ContinentTable {
    ContinentTable::new(
      1,
      [
        (Continent::Asia, vec!["AAA", "BBB", "CCC"]),
        (Continent::Europe, vec!["DDD", "EEE"]),
        (Continent::Africa, vec!["FFF"]),
      ],
    )
    .unwrap()
  }

  #[tokio::test]
  async fn empty_store_is_a_no_op() {
    let store = MemoryStore::default();
    let report = recompute_summaries(&store, &table()).await.unwrap();
    assert_eq!(report, AggregationReport::default());
    assert!(store.summaries().is_empty());
  }

  #[tokio::test]
  async fn writes_summary_for_synthetic_continent() {
    let store = MemoryStore::default();
    store.seed(vec![
      fact("AAA", 2023, 100),
      fact("BBB", 2023, 200),
      fact("CCC", 2023, 300),
    ]);

    let report = recompute_summaries(&store, &table()).await.unwrap();
    assert_eq!(report.year, Some(2023));
    assert_eq!(report.written, vec![Continent::Asia]);
    assert_eq!(report.skipped, vec![Continent::Europe, Continent::Africa]);

    let summaries = store.summaries();
    assert_eq!(summaries.len(), 1);
    let s = &summaries[0];
    assert_eq!((s.total_gdp, s.average_gdp, s.country_count), (600, 200, 3));
    assert_eq!(s.top_country.code, "CCC");
    assert_eq!(s.top_country.value, 300);
  }

  #[tokio::test]
  async fn continent_without_latest_year_data_gets_no_row() {
    let store = MemoryStore::default();
    store.seed(vec![
      fact("AAA", 2021, 10),
      fact("DDD", 2020, 50),
      fact("EEE", 2020, 60),
    ]);

    let report = recompute_summaries(&store, &table()).await.unwrap();
    assert_eq!(report.year, Some(2021));
    assert_eq!(report.written, vec![Continent::Asia]);
    assert!(report.skipped.contains(&Continent::Europe));
    assert!(store.summaries().iter().all(|s| s.continent != Continent::Europe));
  }

  #[tokio::test]
  async fn rerun_overwrites_existing_summary() {
    let store = MemoryStore::default();
    store.seed(vec![fact("AAA", 2023, 100)]);
    recompute_summaries(&store, &table()).await.unwrap();

    store.seed(vec![fact("AAA", 2023, 150), fact("BBB", 2023, 50)]);
    recompute_summaries(&store, &table()).await.unwrap();

    let summaries = store.summaries();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].total_gdp, 200);
    assert_eq!(summaries[0].country_count, 2);
  }

  #[tokio::test]
  async fn failure_keeps_earlier_continents() {
    let store = MemoryStore::default();
    store.seed(vec![
      fact("AAA", 2023, 1),
      fact("DDD", 2023, 2),
      fact("FFF", 2023, 3),
    ]);
    store.fail_upsert_for(Continent::Europe);

    let err = recompute_summaries(&store, &table()).await.unwrap_err();
    assert!(matches!(err, Error::Aggregation(_)));

    let written: Vec<_> = store.summaries().iter().map(|s| s.continent).collect();
    assert_eq!(written, vec![Continent::Asia]);
  }
}
