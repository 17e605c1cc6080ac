//! Decoding of the provider's `[metadata, data]` response envelope.

use econ_core::{Error, Result, raw::RawEntry};
use serde::{Deserialize, Deserializer, de};
use serde_json::Value;

/// Paging metadata from the first element of a response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageMeta {
  #[serde(deserialize_with = "lenient_u32")]
  pub page:        u32,
  #[serde(deserialize_with = "lenient_u32")]
  pub pages:       u32,
  #[serde(deserialize_with = "lenient_u32")]
  pub per_page:    u32,
  #[serde(deserialize_with = "lenient_u32")]
  pub total:       u32,
  pub lastupdated: Option<String>,
}

/// One decoded response page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
  /// Absent when the provider answered with an error message instead.
  pub meta:    Option<PageMeta>,
  pub entries: Vec<RawEntry>,
}

impl Page {
  /// Total pages advertised by the provider; 1 when unknown.
  pub fn pages(&self) -> u32 {
    self.meta.as_ref().map_or(1, |m| m.pages.max(1))
  }
}

/// Decode a response body.
///
/// `data` being `null` or missing yields an empty page, as does the
/// single-element `[{"message": [...]}]` form the provider uses for unknown
/// country codes.
pub fn parse_page(body: &str) -> Result<Page> {
  let value: Value = serde_json::from_str(body)?;
  let Value::Array(mut parts) = value else {
    return Err(Error::Decode(de::Error::custom("expected a JSON array")));
  };

  if parts.is_empty() {
    return Ok(Page::default());
  }

  if parts.len() == 1 {
    if parts[0].get("message").is_some() {
      return Ok(Page::default());
    }
    return Err(Error::Decode(de::Error::custom("missing data element")));
  }

  let data = parts.swap_remove(1);
  let meta: PageMeta = serde_json::from_value(parts.swap_remove(0))?;
  let entries = match data {
    Value::Null => Vec::new(),
    other => serde_json::from_value(other)?,
  };

  Ok(Page { meta: Some(meta), entries })
}

/// The provider sends some counters as numbers and others as strings.
fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u32, D::Error> {
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Num {
    Int(u32),
    Text(String),
  }

  match Num::deserialize(d)? {
    Num::Int(n) => Ok(n),
    Num::Text(s) => s.trim().parse().map_err(de::Error::custom),
  }
}
