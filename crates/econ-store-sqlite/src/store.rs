//! [`SqliteStore`], the SQLite implementation of [`EconomyStore`].

use std::{collections::HashSet, path::Path};

use chrono::Utc;
use econ_core::{
  normalize::NormalizedFact,
  store::{CountryRow, EconomyStore, FactRow, PersistStats, SummaryRow},
  summary::{ContinentSummary, MemberValue},
};
use rusqlite::{ToSql, params, params_from_iter};
use tracing::{debug, info};

use crate::{
  Result,
  encode::{RawCountry, RawFact, RawSummary, encode_dt},
  schema::SCHEMA,
};

/// Emit a progress event every this many fact upserts.
const PROGRESS_INTERVAL: usize = 1000;

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Economy Explorer store backed by a single SQLite file.
///
/// Opened once at process start and injected wherever it is needed. Cloning
/// is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the underlying connection, flushing the WAL.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── EconomyStore impl ───────────────────────────────────────────────────────

impl EconomyStore for SqliteStore {
  type Error = crate::Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn persist(&self, facts: Vec<NormalizedFact>) -> Result<PersistStats> {
    let now = encode_dt(Utc::now());

    let stats = self
      .conn
      .call(move |conn| {
        // Dropping `tx` without commit rolls the whole batch back.
        let tx = conn.transaction()?;
        let mut countries: HashSet<&str> = HashSet::new();
        {
          let mut upsert_country = tx.prepare_cached(
            "INSERT INTO countries (country_code, country_name, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (country_code) DO UPDATE SET
               country_name = excluded.country_name,
               updated_at   = excluded.updated_at",
          )?;
          let mut upsert_fact = tx.prepare_cached(
            "INSERT INTO gdp_data (
               country_code, year, gdp, indicator_id, indicator_name,
               unit, decimal_places, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT (country_code, year) DO UPDATE SET
               gdp            = excluded.gdp,
               indicator_id   = excluded.indicator_id,
               indicator_name = excluded.indicator_name,
               unit           = excluded.unit,
               decimal_places = excluded.decimal_places,
               updated_at     = excluded.updated_at",
          )?;

          for (i, fact) in facts.iter().enumerate() {
            upsert_country.execute(params![fact.country_code, fact.country_name, now])?;
            upsert_fact.execute(params![
              fact.country_code,
              fact.year,
              fact.value,
              fact.indicator_id,
              fact.indicator_name,
              fact.unit,
              fact.decimal,
              now,
            ])?;
            countries.insert(fact.country_code.as_str());

            if (i + 1) % PROGRESS_INTERVAL == 0 {
              info!(written = i + 1, total = facts.len(), "persist progress");
            }
          }
        }
        tx.commit()?;

        Ok(PersistStats {
          countries_written: countries.len(),
          facts_written:     facts.len(),
        })
      })
      .await?;

    debug!(?stats, "batch committed");
    Ok(stats)
  }

  async fn upsert_summary(&self, summary: ContinentSummary) -> Result<()> {
    let now = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO continent_summaries (
             continent_code, year, continent_name, total_gdp, average_gdp,
             country_count, top_country_code, top_country_name, top_country_gdp,
             updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
           ON CONFLICT (continent_code, year) DO UPDATE SET
             continent_name   = excluded.continent_name,
             total_gdp        = excluded.total_gdp,
             average_gdp      = excluded.average_gdp,
             country_count    = excluded.country_count,
             top_country_code = excluded.top_country_code,
             top_country_name = excluded.top_country_name,
             top_country_gdp  = excluded.top_country_gdp,
             updated_at       = excluded.updated_at",
          params![
            summary.continent.code(),
            summary.year,
            summary.continent_name(),
            summary.total_gdp,
            summary.average_gdp,
            summary.country_count,
            summary.top_country.code,
            summary.top_country.name,
            summary.top_country.value,
            now,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Aggregation reads ─────────────────────────────────────────────────────

  async fn latest_year(&self) -> Result<Option<i32>> {
    let year = self
      .conn
      .call(|conn| {
        let year: Option<i32> =
          conn.query_row("SELECT MAX(year) FROM gdp_data", [], |r| r.get(0))?;
        Ok(year)
      })
      .await?;
    Ok(year)
  }

  async fn member_facts<'a>(
    &'a self,
    country_codes: &'a [String],
    year: i32,
  ) -> Result<Vec<MemberValue>> {
    if country_codes.is_empty() {
      return Ok(Vec::new());
    }
    let codes = country_codes.to_vec();

    let rows = self
      .conn
      .call(move |conn| {
        let placeholders = (0..codes.len())
          .map(|i| format!("?{}", i + 2))
          .collect::<Vec<_>>()
          .join(", ");
        let sql = format!(
          "SELECT g.country_code,
                  COALESCE(c.country_name, g.country_code),
                  g.gdp
           FROM gdp_data g
           LEFT JOIN countries c ON c.country_code = g.country_code
           WHERE g.year = ?1
             AND g.gdp IS NOT NULL
             AND g.country_code IN ({placeholders})
           ORDER BY g.gdp DESC, g.country_code ASC"
        );

        let bound = std::iter::once(&year as &dyn ToSql)
          .chain(codes.iter().map(|c| c as &dyn ToSql));

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(bound), |row| {
            Ok(MemberValue {
              country_code: row.get(0)?,
              country_name: row.get(1)?,
              value:        row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  // ── Browsing ──────────────────────────────────────────────────────────────

  async fn list_countries(&self, limit: usize) -> Result<Vec<CountryRow>> {
    let limit = limit as i64;

    let raws: Vec<RawCountry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT country_code, country_name, updated_at
           FROM countries
           ORDER BY country_code
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(params![limit], |row| {
            Ok(RawCountry {
              country_code: row.get(0)?,
              country_name: row.get(1)?,
              updated_at:   row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCountry::into_row).collect()
  }

  async fn list_facts(&self, limit: usize) -> Result<Vec<FactRow>> {
    let limit = limit as i64;

    let raws: Vec<RawFact> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT country_code, year, gdp, indicator_id, indicator_name,
                  unit, decimal_places, updated_at
           FROM gdp_data
           ORDER BY year DESC, country_code
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(params![limit], |row| {
            Ok(RawFact {
              country_code:   row.get(0)?,
              year:           row.get(1)?,
              gdp:            row.get(2)?,
              indicator_id:   row.get(3)?,
              indicator_name: row.get(4)?,
              unit:           row.get(5)?,
              decimal_places: row.get(6)?,
              updated_at:     row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFact::into_row).collect()
  }

  async fn list_summaries(&self, limit: usize) -> Result<Vec<SummaryRow>> {
    let limit = limit as i64;

    let raws: Vec<RawSummary> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT continent_code, year, continent_name, total_gdp, average_gdp,
                  country_count, top_country_code, top_country_name,
                  top_country_gdp, updated_at
           FROM continent_summaries
           ORDER BY year DESC, total_gdp DESC, continent_code
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(params![limit], |row| {
            Ok(RawSummary {
              continent_code:   row.get(0)?,
              year:             row.get(1)?,
              continent_name:   row.get(2)?,
              total_gdp:        row.get(3)?,
              average_gdp:      row.get(4)?,
              country_count:    row.get(5)?,
              top_country_code: row.get(6)?,
              top_country_name: row.get(7)?,
              top_country_gdp:  row.get(8)?,
              updated_at:       row.get(9)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSummary::into_row).collect()
  }

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
