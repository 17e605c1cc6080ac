//! The continent summary and the one algorithm that computes it.
//!
//! Both the persisted aggregator and the live view call [`summarize`], so the
//! two paths agree on precision and tie-breaking.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, continent::Continent};

/// A member country's value for the target year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberValue {
  pub country_code: String,
  pub country_name: String,
  pub value:        i64,
}

/// The highest-valued member of a continent for a year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopCountry {
  pub code:  String,
  pub name:  String,
  pub value: i64,
}

/// Aggregate over one continent's members for a single year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinentSummary {
  pub continent:     Continent,
  pub year:          i32,
  pub total_gdp:     i64,
  /// `total_gdp / country_count`, floored.
  pub average_gdp:   i64,
  pub country_count: u32,
  pub top_country:   TopCountry,
}

impl ContinentSummary {
  pub fn continent_name(&self) -> &'static str { self.continent.display_name() }
}

/// Compute the summary for `continent` in `year` from its members' values.
///
/// Returns `Ok(None)` for an empty slice: continents without data produce no
/// summary at all. Sums are accumulated in `i128` and must fit back into `i64`.
/// The top country is the maximum value; ties go to the lexicographically
/// smallest country code, independent of input order.
pub fn summarize(
  continent: Continent,
  year: i32,
  rows: &[MemberValue],
) -> Result<Option<ContinentSummary>> {
  let Some(first) = rows.first() else {
    return Ok(None);
  };

  let mut total: i128 = 0;
  let mut top = first;
  for row in rows {
    total += i128::from(row.value);
    if row.value > top.value
      || (row.value == top.value && row.country_code < top.country_code)
    {
      top = row;
    }
  }

  let count = rows.len();
  let total_gdp =
    i64::try_from(total).map_err(|_| Error::Overflow(continent.to_string()))?;
  let average_gdp = i64::try_from(total.div_euclid(count as i128))
    .map_err(|_| Error::Overflow(continent.to_string()))?;
  let country_count =
    u32::try_from(count).map_err(|_| Error::Overflow(continent.to_string()))?;

  Ok(Some(ContinentSummary {
    continent,
    year,
    total_gdp,
    average_gdp,
    country_count,
    top_country: TopCountry {
      code:  top.country_code.clone(),
      name:  top.country_name.clone(),
      value: top.value,
    },
  }))
}

/// Render a currency amount in trillions, e.g. `$25.00T`.
pub fn format_trillions(value: i64) -> String {
  format!("${:.2}T", value as f64 / 1e12)
}
