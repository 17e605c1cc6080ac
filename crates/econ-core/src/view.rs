//! The read façade: the live economy view, stored-table browsing and the
//! single-country lookup.
//!
//! The live view never touches storage. It fetches from the provider, drops
//! null values, keeps the provider's country ids and computes continent
//! summaries in memory with [`summarize`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::{
  Error, Result,
  continent::{Continent, ContinentTable},
  indicator::Indicator,
  normalize::{parse_year, round_value, sort_by_year_desc, unit_or_default},
  raw::RawEntry,
  source::IndicatorSource,
  store::{CountryRow, EconomyStore, FactRow, StoredTable, SummaryRow},
  summary::{ContinentSummary, MemberValue, format_trillions, summarize},
};

pub const GLOBAL_REGION: &str = "global";
pub const DEFAULT_STORED_LIMIT: usize = 100;
pub const MAX_STORED_LIMIT: usize = 1000;
const SOURCE_NAME: &str = "World Bank API";

// ─── Region filter ───────────────────────────────────────────────────────────

/// A requested region, resolved against the continent table. Anything that is
/// not a continent name (including `global` and typos) means "no filter".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionFilter {
  requested: String,
  continent: Option<Continent>,
}

impl RegionFilter {
  pub fn parse(raw: Option<&str>) -> Self {
    let requested = raw
      .map(|r| r.trim().to_ascii_lowercase())
      .filter(|r| !r.is_empty())
      .unwrap_or_else(|| GLOBAL_REGION.to_owned());
    let continent = Continent::from_name(&requested);
    Self { requested, continent }
  }

  /// The region as the caller asked for it, lower-cased.
  pub fn requested(&self) -> &str { &self.requested }

  pub fn continent(&self) -> Option<Continent> { self.continent }
}

// ─── Live view ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedRef {
  pub id:   String,
  pub name: String,
}

/// One row of the live view's `data` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomyRecord {
  pub country:      NamedRef,
  pub country_code: String,
  pub indicator:    NamedRef,
  pub year:         i32,
  pub gdp:          i64,
  pub unit:         String,
  pub decimal:      i64,
}

impl EconomyRecord {
  /// Reshape one provider entry for the live view.
  ///
  /// Only null values and non-year dates are dropped. Entries without an ISO3
  /// code are kept with an empty `countryCode`, and `country.id` is the
  /// provider's own id (`"US"`, `"1A"`).
  pub fn from_raw(entry: &RawEntry) -> Option<Self> {
    let gdp = round_value(entry.value?)?;
    let year = parse_year(&entry.date)?;

    Some(Self {
      country: NamedRef {
        id:   entry.country.id.clone(),
        name: entry.country.value.clone(),
      },
      country_code: entry.country_code().unwrap_or_default().to_owned(),
      indicator: NamedRef {
        id:   entry.indicator.id.clone(),
        name: entry.indicator.value.clone(),
      },
      year,
      gdp,
      unit: unit_or_default(entry),
      decimal: entry.decimal.unwrap_or(0),
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopCountryView {
  pub name: String,
  pub code: String,
  pub gdp:  i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GdpFormatted {
  pub total:       String,
  pub average:     String,
  pub top_country: String,
}

/// A continent summary in the live view's wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
  pub continent:      &'static str,
  pub continent_code: &'static str,
  pub year:           i32,
  #[serde(rename = "totalGDP")]
  pub total_gdp:      i64,
  #[serde(rename = "averageGDP")]
  pub average_gdp:    i64,
  pub country_count:  u32,
  pub top_country:    TopCountryView,
  #[serde(rename = "gdpFormatted")]
  pub formatted:      GdpFormatted,
}

impl From<&ContinentSummary> for SummaryView {
  fn from(s: &ContinentSummary) -> Self {
    Self {
      continent:      s.continent.display_name(),
      continent_code: s.continent.code(),
      year:           s.year,
      total_gdp:      s.total_gdp,
      average_gdp:    s.average_gdp,
      country_count:  s.country_count,
      top_country:    TopCountryView {
        name: s.top_country.name.clone(),
        code: s.top_country.code.clone(),
        gdp:  s.top_country.value,
      },
      formatted:      GdpFormatted {
        total:       format_trillions(s.total_gdp),
        average:     format_trillions(s.average_gdp),
        top_country: format_trillions(s.top_country.value),
      },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewMetadata {
  pub indicator:         &'static str,
  pub source:            &'static str,
  pub last_updated:      DateTime<Utc>,
  pub available_regions: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomyView {
  pub count:               usize,
  pub region:              String,
  pub continent_summaries: Vec<SummaryView>,
  pub data:                Vec<EconomyRecord>,
  pub metadata:            ViewMetadata,
}

/// Build the live view from a fresh provider fetch.
///
/// An empty provider response is [`Error::NotFound`]; a response whose rows
/// are all filtered away is an empty view.
pub async fn economy_view<Src: IndicatorSource>(
  source: &Src,
  table: &ContinentTable,
  region: &RegionFilter,
) -> Result<EconomyView> {
  let raw = source.fetch_all_indicator_data(Indicator::Gdp).await?;
  if raw.is_empty() {
    return Err(Error::NotFound("No data available".into()));
  }

  let mut records: Vec<EconomyRecord> = raw.iter().filter_map(EconomyRecord::from_raw).collect();
  sort_by_year_desc(&mut records, |r| r.year);

  if let Some(continent) = region.continent() {
    records = filter_by_continent(records, table, continent);
  }
  debug!(region = region.requested(), records = records.len(), "built live view");

  let mut summaries = live_summaries(&records, table)?;
  summaries.sort_by(|a, b| b.total_gdp.cmp(&a.total_gdp));

  Ok(EconomyView {
    count: records.len(),
    region: region.requested().to_owned(),
    continent_summaries: summaries.iter().map(SummaryView::from).collect(),
    data: records,
    metadata: ViewMetadata {
      indicator:         Indicator::Gdp.label(),
      source:            SOURCE_NAME,
      last_updated:      Utc::now(),
      available_regions: available_regions(table),
    },
  })
}

/// Keep only records whose country belongs to `continent`.
pub fn filter_by_continent(
  records: Vec<EconomyRecord>,
  table: &ContinentTable,
  continent: Continent,
) -> Vec<EconomyRecord> {
  records
    .into_iter()
    .filter(|r| table.contains(continent, &r.country_code))
    .collect()
}

/// Summaries over the latest year present in `records`, one per continent
/// that has data for that year, in table order. Records without an ISO3 code
/// belong to no continent.
pub fn live_summaries(
  records: &[EconomyRecord],
  table: &ContinentTable,
) -> Result<Vec<ContinentSummary>> {
  let Some(latest_year) = records.iter().map(|r| r.year).max() else {
    return Ok(Vec::new());
  };

  let mut out = Vec::new();
  for continent in table.continents() {
    let rows: Vec<MemberValue> = records
      .iter()
      .filter(|r| r.year == latest_year && table.contains(continent, &r.country_code))
      .map(|r| MemberValue {
        country_code: r.country_code.clone(),
        country_name: r.country.name.clone(),
        value:        r.gdp,
      })
      .collect();
    if let Some(summary) = summarize(continent, latest_year, &rows)? {
      out.push(summary);
    }
  }
  Ok(out)
}

fn available_regions(table: &ContinentTable) -> Vec<&'static str> {
  table
    .continents()
    .map(Continent::code)
    .chain(std::iter::once(GLOBAL_REGION))
    .collect()
}

// ─── Stored tables ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StoredRows {
  Countries(Vec<CountryRow>),
  Facts(Vec<FactRow>),
  Summaries(Vec<SummaryRow>),
}

impl StoredRows {
  pub fn len(&self) -> usize {
    match self {
      Self::Countries(r) => r.len(),
      Self::Facts(r) => r.len(),
      Self::Summaries(r) => r.len(),
    }
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredView {
  pub table: StoredTable,
  pub count: usize,
  pub data:  StoredRows,
}

/// Read up to `limit` rows of a stored table. `limit` defaults to
/// [`DEFAULT_STORED_LIMIT`] and is capped at [`MAX_STORED_LIMIT`].
pub async fn stored_rows<S: EconomyStore>(
  store: &S,
  table_name: &str,
  limit: Option<usize>,
) -> Result<StoredView> {
  let table: StoredTable = table_name.parse()?;
  let limit = match limit {
    Some(0) => return Err(Error::Validation("limit must be at least 1".into())),
    Some(n) => n.min(MAX_STORED_LIMIT),
    None => DEFAULT_STORED_LIMIT,
  };

  let data = match table {
    StoredTable::Countries => StoredRows::Countries(
      store.list_countries(limit).await.map_err(Error::persistence)?,
    ),
    StoredTable::GdpData => {
      StoredRows::Facts(store.list_facts(limit).await.map_err(Error::persistence)?)
    }
    StoredTable::ContinentSummaries => StoredRows::Summaries(
      store.list_summaries(limit).await.map_err(Error::persistence)?,
    ),
  };

  Ok(StoredView { table, count: data.len(), data })
}

// ─── Single country ──────────────────────────────────────────────────────────

/// Raw GDP and population series for one country.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountrySnapshot {
  pub gdp_data: Vec<RawEntry>,
  pub pop_data: Vec<RawEntry>,
}

/// Fetch both indicators for `country_code`. A blank or missing code is a
/// validation error; an empty series for either indicator is not-found.
pub async fn country_snapshot<Src: IndicatorSource>(
  source: &Src,
  country_code: Option<&str>,
) -> Result<CountrySnapshot> {
  let code = country_code
    .map(str::trim)
    .filter(|c| !c.is_empty())
    .ok_or_else(|| Error::Validation("countryCode is required".into()))?
    .to_ascii_uppercase();

  let gdp_data = source.fetch_country_indicator(&code, Indicator::Gdp).await?;
  let pop_data = source
    .fetch_country_indicator(&code, Indicator::Population)
    .await?;

  if gdp_data.is_empty() || pop_data.is_empty() {
    return Err(Error::NotFound(format!(
      "No data found for country code {code}. Please use a valid 3-letter code (e.g., USA, IND, CHN)"
    )));
  }

  Ok(CountrySnapshot { gdp_data, pop_data })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    raw::IdValue,
    testing::{MemoryStore, StubSource, fact, raw},
  };

  fn world() -> StubSource {
    StubSource {
      gdp: vec![
        raw("USA", 2022, Some(24.0e12)),
        raw("USA", 2023, Some(25.0e12)),
        raw("CHN", 2023, Some(18.0e12)),
        raw("JPN", 2023, Some(4.0e12)),
        raw("DEU", 2023, None),
        raw("WLD", 2023, Some(100.0e12)),
      ],
      population: vec![raw("USA", 2023, Some(334_000_000.0))],
      offline: false,
    }
  }

  #[test]
  fn region_filter_parsing() {
    let f = RegionFilter::parse(Some("Asia"));
    assert_eq!(f.requested(), "asia");
    assert_eq!(f.continent(), Some(Continent::Asia));

    let f = RegionFilter::parse(Some("atlantis"));
    assert_eq!(f.requested(), "atlantis");
    assert_eq!(f.continent(), None);

    let f = RegionFilter::parse(None);
    assert_eq!(f.requested(), GLOBAL_REGION);
    assert_eq!(f.continent(), None);

    assert_eq!(RegionFilter::parse(Some("  ")).requested(), GLOBAL_REGION);
  }

  #[tokio::test]
  async fn global_view_sorts_and_summarises() {
    let table = ContinentTable::standard();
    let view = economy_view(&world(), &table, &RegionFilter::parse(None))
      .await
      .unwrap();

    assert_eq!(view.count, 5);
    assert_eq!(view.region, "global");
    assert!(view.data.windows(2).all(|w| w[0].year >= w[1].year));
    assert_eq!(view.data.last().unwrap().year, 2022);
    assert_eq!(view.data[0].country.id, "US");
    assert_eq!(view.data[0].country_code, "USA");

    let codes: Vec<_> = view.continent_summaries.iter().map(|s| s.continent_code).collect();
    assert_eq!(codes, ["americas", "asia"]);
    let asia = &view.continent_summaries[1];
    assert_eq!(asia.total_gdp, 22_000_000_000_000);
    assert_eq!(asia.average_gdp, 11_000_000_000_000);
    assert_eq!(asia.top_country.code, "CHN");
    assert_eq!(asia.formatted.total, "$22.00T");
    assert_eq!(view.metadata.available_regions.last(), Some(&"global"));
  }

  #[tokio::test]
  async fn rows_without_iso3_code_stay_in_global_view() {
    let mut regional = raw("USA", 2023, Some(5.0e12));
    regional.country_iso3_code = Some(String::new());
    regional.country = IdValue { id: "1A".into(), value: "Arab World".into() };
    let src = StubSource {
      gdp: vec![raw("USA", 2023, Some(25.0e12)), regional],
      ..Default::default()
    };
    let table = ContinentTable::standard();

    let view = economy_view(&src, &table, &RegionFilter::parse(None))
      .await
      .unwrap();
    assert_eq!(view.count, 2);
    let ids: Vec<_> = view.data.iter().map(|r| r.country.id.as_str()).collect();
    assert_eq!(ids, ["US", "1A"]);
    assert_eq!(view.data[1].country_code, "");

    // It joins no continent.
    assert_eq!(view.continent_summaries.len(), 1);
    assert_eq!(view.continent_summaries[0].total_gdp, 25_000_000_000_000);

    let americas = economy_view(&src, &table, &RegionFilter::parse(Some("americas")))
      .await
      .unwrap();
    assert_eq!(americas.count, 1);
  }

  #[tokio::test]
  async fn unknown_region_matches_global() {
    let table = ContinentTable::standard();
    let src = world();
    let global = economy_view(&src, &table, &RegionFilter::parse(Some("global")))
      .await
      .unwrap();
    let atlantis = economy_view(&src, &table, &RegionFilter::parse(Some("atlantis")))
      .await
      .unwrap();
    assert_eq!(global.data, atlantis.data);
    assert_eq!(atlantis.region, "atlantis");
  }

  #[tokio::test]
  async fn continent_region_filters_records() {
    let table = ContinentTable::standard();
    let view = economy_view(&world(), &table, &RegionFilter::parse(Some("ASIA")))
      .await
      .unwrap();
    assert_eq!(view.count, 2);
    assert!(view.data.iter().all(|r| table.contains(Continent::Asia, &r.country_code)));
    assert_eq!(view.continent_summaries.len(), 1);
  }

  #[tokio::test]
  async fn empty_provider_response_is_not_found() {
    let src = StubSource::default();
    let err = economy_view(&src, &ContinentTable::standard(), &RegionFilter::parse(None))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
  }

  #[tokio::test]
  async fn upstream_errors_propagate() {
    let src = StubSource { offline: true, ..world() };
    let err = economy_view(&src, &ContinentTable::standard(), &RegionFilter::parse(None))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::UpstreamUnavailable(_)));
  }

  #[test]
  fn live_summaries_use_latest_year_only() {
    let table = ContinentTable::standard();
    let records: Vec<_> = [raw("USA", 2021, Some(10.0)), raw("FRA", 2020, Some(99.0))]
      .iter()
      .filter_map(EconomyRecord::from_raw)
      .collect();
    let summaries = live_summaries(&records, &table).unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].continent, Continent::Americas);
    assert!(live_summaries(&[], &table).unwrap().is_empty());
  }

  #[tokio::test]
  async fn stored_rows_validates_table_and_limit() {
    let store = MemoryStore::default();
    store.seed(vec![fact("USA", 2023, 1), fact("CAN", 2023, 2), fact("MEX", 2023, 3)]);

    let view = stored_rows(&store, "countries", Some(2)).await.unwrap();
    assert_eq!(view.table, StoredTable::Countries);
    assert_eq!(view.count, 2);

    let view = stored_rows(&store, "gdp_data", None).await.unwrap();
    assert_eq!(view.count, 3);

    let view = stored_rows(&store, "continent_summaries", None).await.unwrap();
    assert!(view.data.is_empty());

    assert!(matches!(
      stored_rows(&store, "users", None).await,
      Err(Error::Validation(_))
    ));
    assert!(matches!(
      stored_rows(&store, "countries", Some(0)).await,
      Err(Error::Validation(_))
    ));
  }

  #[tokio::test]
  async fn country_snapshot_cases() {
    let src = world();
    let snap = country_snapshot(&src, Some("usa")).await.unwrap();
    assert_eq!(snap.gdp_data.len(), 2);
    assert_eq!(snap.pop_data.len(), 1);

    assert!(matches!(
      country_snapshot(&src, None).await,
      Err(Error::Validation(_))
    ));
    assert!(matches!(
      country_snapshot(&src, Some(" ")).await,
      Err(Error::Validation(_))
    ));
    // GDP exists for CHN but population does not.
    assert!(matches!(
      country_snapshot(&src, Some("CHN")).await,
      Err(Error::NotFound(_))
    ));
  }
}
