//! In-memory doubles for the store and source traits.

use std::{
  collections::BTreeMap,
  sync::{Mutex, MutexGuard},
};

use chrono::Utc;
use thiserror::Error;

use crate::{
  Error, Result,
  continent::Continent,
  indicator::Indicator,
  normalize::NormalizedFact,
  raw::{IdValue, RawEntry},
  source::IndicatorSource,
  store::{CountryRow, EconomyStore, FactRow, PersistStats, SummaryRow},
  summary::{ContinentSummary, MemberValue},
};

pub fn fact(code: &str, year: i32, value: i64) -> NormalizedFact {
  NormalizedFact {
    country_code:   code.into(),
    country_name:   format!("{code} name"),
    indicator_id:   Indicator::Gdp.code().into(),
    indicator_name: "GDP (current US$)".into(),
    year,
    value,
    unit:           "Current US$".into(),
    decimal:        0,
  }
}

pub fn raw(code: &str, year: i32, value: Option<f64>) -> RawEntry {
  RawEntry {
    indicator: IdValue {
      id:    Indicator::Gdp.code().into(),
      value: "GDP (current US$)".into(),
    },
    country: IdValue { id: code[..2].into(), value: format!("{code} name") },
    country_iso3_code: Some(code.into()),
    date: year.to_string(),
    value,
    unit: Some(String::new()),
    obs_status: Some(String::new()),
    decimal: Some(0),
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("memory store: {0}")]
pub struct MemoryError(String);

#[derive(Default)]
struct State {
  countries:        BTreeMap<String, String>,
  facts:            BTreeMap<(String, i32), NormalizedFact>,
  summaries:        BTreeMap<(Continent, i32), ContinentSummary>,
  fail_upsert_for:  Option<Continent>,
  fail_persist_for: Option<String>,
}

#[derive(Default)]
pub struct MemoryStore {
  state: Mutex<State>,
}

impl MemoryStore {
  fn lock(&self) -> MutexGuard<'_, State> { self.state.lock().unwrap() }

  pub fn seed(&self, facts: Vec<NormalizedFact>) {
    let mut state = self.lock();
    for f in facts {
      state.countries.insert(f.country_code.clone(), f.country_name.clone());
      state.facts.insert((f.country_code.clone(), f.year), f);
    }
  }

  pub fn summaries(&self) -> Vec<ContinentSummary> {
    self.lock().summaries.values().cloned().collect()
  }

  pub fn fact_count(&self) -> usize { self.lock().facts.len() }

  pub fn fail_upsert_for(&self, continent: Continent) {
    self.lock().fail_upsert_for = Some(continent);
  }

  pub fn fail_persist_for(&self, country_code: &str) {
    self.lock().fail_persist_for = Some(country_code.into());
  }
}

impl EconomyStore for MemoryStore {
  type Error = MemoryError;

  async fn persist(&self, facts: Vec<NormalizedFact>) -> Result<PersistStats, MemoryError> {
    let mut state = self.lock();
    if let Some(bad) = &state.fail_persist_for
      && facts.iter().any(|f| &f.country_code == bad)
    {
      return Err(MemoryError(format!("rejected {bad}")));
    }
    let mut countries = std::collections::BTreeSet::new();
    for f in &facts {
      countries.insert(f.country_code.clone());
      state.countries.insert(f.country_code.clone(), f.country_name.clone());
      state.facts.insert((f.country_code.clone(), f.year), f.clone());
    }
    Ok(PersistStats {
      countries_written: countries.len(),
      facts_written:     facts.len(),
    })
  }

  async fn upsert_summary(&self, summary: ContinentSummary) -> Result<(), MemoryError> {
    let mut state = self.lock();
    if state.fail_upsert_for == Some(summary.continent) {
      return Err(MemoryError(format!("rejected {}", summary.continent)));
    }
    state.summaries.insert((summary.continent, summary.year), summary);
    Ok(())
  }

  async fn latest_year(&self) -> Result<Option<i32>, MemoryError> {
    Ok(self.lock().facts.keys().map(|(_, y)| *y).max())
  }

  async fn member_facts<'a>(
    &'a self,
    country_codes: &'a [String],
    year: i32,
  ) -> Result<Vec<MemberValue>, MemoryError> {
    let state = self.lock();
    let mut rows: Vec<MemberValue> = state
      .facts
      .values()
      .filter(|f| f.year == year && country_codes.contains(&f.country_code))
      .map(|f| MemberValue {
        country_code: f.country_code.clone(),
        country_name: state.countries.get(&f.country_code).cloned().unwrap_or_default(),
        value:        f.value,
      })
      .collect();
    rows.sort_by(|a, b| b.value.cmp(&a.value).then(a.country_code.cmp(&b.country_code)));
    Ok(rows)
  }

  async fn list_countries(&self, limit: usize) -> Result<Vec<CountryRow>, MemoryError> {
    let state = self.lock();
    Ok(
      state
        .countries
        .iter()
        .take(limit)
        .map(|(code, name)| CountryRow {
          country_code: code.clone(),
          country_name: name.clone(),
          updated_at:   Utc::now(),
        })
        .collect(),
    )
  }

  async fn list_facts(&self, limit: usize) -> Result<Vec<FactRow>, MemoryError> {
    let state = self.lock();
    Ok(
      state
        .facts
        .values()
        .take(limit)
        .map(|f| FactRow {
          country_code:   f.country_code.clone(),
          year:           f.year,
          gdp:            f.value,
          indicator_id:   f.indicator_id.clone(),
          indicator_name: f.indicator_name.clone(),
          unit:           f.unit.clone(),
          decimal_places: f.decimal,
          updated_at:     Utc::now(),
        })
        .collect(),
    )
  }

  async fn list_summaries(&self, limit: usize) -> Result<Vec<SummaryRow>, MemoryError> {
    let state = self.lock();
    Ok(
      state
        .summaries
        .values()
        .take(limit)
        .map(|s| SummaryRow {
          continent_code:   s.continent.code().into(),
          year:             s.year,
          continent_name:   s.continent_name().into(),
          total_gdp:        s.total_gdp,
          average_gdp:      s.average_gdp,
          country_count:    s.country_count,
          top_country_code: s.top_country.code.clone(),
          top_country_name: s.top_country.name.clone(),
          top_country_gdp:  s.top_country.value,
          updated_at:       Utc::now(),
        })
        .collect(),
    )
  }

  async fn ping(&self) -> Result<(), MemoryError> { Ok(()) }
}

// ─── Source ──────────────────────────────────────────────────────────────────

/// Serves fixed entries; an empty `population` list makes country lookups
/// for population come back empty.
#[derive(Default)]
pub struct StubSource {
  pub gdp:        Vec<RawEntry>,
  pub population: Vec<RawEntry>,
  pub offline:    bool,
}

impl StubSource {
  fn entries(&self, indicator: Indicator) -> Result<&[RawEntry]> {
    if self.offline {
      return Err(Error::UpstreamUnavailable("connection refused".into()));
    }
    Ok(match indicator {
      Indicator::Gdp => &self.gdp,
      Indicator::Population => &self.population,
    })
  }
}

impl IndicatorSource for StubSource {
  async fn fetch_all_indicator_data(&self, indicator: Indicator) -> Result<Vec<RawEntry>> {
    Ok(self.entries(indicator)?.to_vec())
  }

  async fn fetch_country_indicator<'a>(
    &'a self,
    country_code: &'a str,
    indicator: Indicator,
  ) -> Result<Vec<RawEntry>> {
    Ok(
      self
        .entries(indicator)?
        .iter()
        .filter(|e| e.country_code() == Some(country_code))
        .cloned()
        .collect(),
    )
  }
}
