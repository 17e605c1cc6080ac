//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; continents by their lower-case
//! code. Everything else maps onto a native SQLite type.

use chrono::{DateTime, Utc};
use econ_core::{
  continent::Continent,
  store::{CountryRow, FactRow, SummaryRow},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Continent ───────────────────────────────────────────────────────────────

pub fn decode_continent(s: &str) -> Result<Continent> {
  Continent::from_name(s).ok_or_else(|| Error::Corrupt(format!("unknown continent: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `countries` row.
pub struct RawCountry {
  pub country_code: String,
  pub country_name: String,
  pub updated_at:   String,
}

impl RawCountry {
  pub fn into_row(self) -> Result<CountryRow> {
    Ok(CountryRow {
      country_code: self.country_code,
      country_name: self.country_name,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `gdp_data` row.
pub struct RawFact {
  pub country_code:   String,
  pub year:           i32,
  pub gdp:            i64,
  pub indicator_id:   String,
  pub indicator_name: String,
  pub unit:           String,
  pub decimal_places: i64,
  pub updated_at:     String,
}

impl RawFact {
  pub fn into_row(self) -> Result<FactRow> {
    Ok(FactRow {
      country_code:   self.country_code,
      year:           self.year,
      gdp:            self.gdp,
      indicator_id:   self.indicator_id,
      indicator_name: self.indicator_name,
      unit:           self.unit,
      decimal_places: self.decimal_places,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `continent_summaries` row.
pub struct RawSummary {
  pub continent_code:   String,
  pub year:             i32,
  pub continent_name:   String,
  pub total_gdp:        i64,
  pub average_gdp:      i64,
  pub country_count:    i64,
  pub top_country_code: String,
  pub top_country_name: String,
  pub top_country_gdp:  i64,
  pub updated_at:       String,
}

impl RawSummary {
  pub fn into_row(self) -> Result<SummaryRow> {
    // Validates the code even though the row keeps it as a string.
    let continent = decode_continent(&self.continent_code)?;
    let country_count = u32::try_from(self.country_count)
      .map_err(|_| Error::Corrupt(format!("country_count {}", self.country_count)))?;

    Ok(SummaryRow {
      continent_code: continent.code().to_owned(),
      year: self.year,
      continent_name: self.continent_name,
      total_gdp: self.total_gdp,
      average_gdp: self.average_gdp,
      country_count,
      top_country_code: self.top_country_code,
      top_country_name: self.top_country_name,
      top_country_gdp: self.top_country_gdp,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
