//! Raw provider entries → canonical facts.

use serde::{Deserialize, Serialize};

use crate::raw::RawEntry;

/// Unit label used when the provider leaves `unit` blank.
pub const DEFAULT_UNIT: &str = "Current US$";

/// One (country, year) observation, ready to persist or aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedFact {
  pub country_code:   String,
  pub country_name:   String,
  pub indicator_id:   String,
  pub indicator_name: String,
  pub year:           i32,
  /// Rounded to the nearest whole currency unit.
  pub value:          i64,
  pub unit:           String,
  pub decimal:        i64,
}

/// Filter and reshape a provider response. Provider order is preserved.
///
/// Entries are dropped when the value is null, the ISO3 code is missing, or
/// the date is not a year.
pub fn normalize<'a>(raw: impl IntoIterator<Item = &'a RawEntry>) -> Vec<NormalizedFact> {
  raw.into_iter().filter_map(normalize_entry).collect()
}

pub fn normalize_entry(entry: &RawEntry) -> Option<NormalizedFact> {
  let value = round_value(entry.value?)?;
  let country_code = entry.country_code()?.to_owned();
  let year = parse_year(&entry.date)?;

  Some(NormalizedFact {
    country_code,
    country_name: entry.country.value.clone(),
    indicator_id: entry.indicator.id.clone(),
    indicator_name: entry.indicator.value.clone(),
    year,
    value,
    unit: unit_or_default(entry),
    decimal: entry.decimal.unwrap_or(0),
  })
}

pub(crate) fn unit_or_default(entry: &RawEntry) -> String {
  entry
    .unit
    .as_deref()
    .map(str::trim)
    .filter(|u| !u.is_empty())
    .unwrap_or(DEFAULT_UNIT)
    .to_owned()
}

/// Most recent year first. Stable, so provider order survives within a year.
pub fn sort_by_year_desc<T>(items: &mut [T], year_of: impl Fn(&T) -> i32) {
  items.sort_by(|a, b| year_of(b).cmp(&year_of(a)));
}

pub(crate) fn parse_year(date: &str) -> Option<i32> {
  let date = date.trim();
  if date.len() != 4 || !date.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  date.parse().ok()
}

/// Half-away-from-zero rounding; non-finite or out-of-range values are
/// rejected rather than saturated.
pub(crate) fn round_value(v: f64) -> Option<i64> {
  if !v.is_finite() {
    return None;
  }
  let r = v.round();
  // i64::MAX as f64 rounds up to 2^63, which is already out of range.
  if r >= -(2f64.powi(63)) && r < 2f64.powi(63) {
    Some(r as i64)
  } else {
    None
  }
}
