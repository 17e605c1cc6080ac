//! The provider's element shape, kept verbatim so it can be echoed back to
//! clients by the single-country lookup.

use serde::{Deserialize, Serialize};

/// An `{ "id": ..., "value": ... }` pair as used by the provider for both the
/// indicator and the country reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdValue {
  #[serde(default)]
  pub id:    String,
  #[serde(default)]
  pub value: String,
}

/// One observation as returned by the provider. `value` is `null` for years
/// the provider has no figure for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
  #[serde(default)]
  pub indicator:         IdValue,
  #[serde(default)]
  pub country:           IdValue,
  #[serde(rename = "countryiso3code")]
  pub country_iso3_code: Option<String>,
  #[serde(default)]
  pub date:              String,
  pub value:             Option<f64>,
  pub unit:              Option<String>,
  pub obs_status:        Option<String>,
  pub decimal:           Option<i64>,
}

impl RawEntry {
  /// The ISO3 code, if present and non-blank.
  pub fn country_code(&self) -> Option<&str> {
    self
      .country_iso3_code
      .as_deref()
      .map(str::trim)
      .filter(|c| !c.is_empty())
  }
}
