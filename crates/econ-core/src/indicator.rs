//! The closed set of World Bank indicators this service knows about.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
  Gdp,
  Population,
}

impl Indicator {
  /// The provider's stable indicator code.
  pub fn code(self) -> &'static str {
    match self {
      Self::Gdp => "NY.GDP.MKTP.CD",
      Self::Population => "SP.POP.TOTL",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Gdp => "GDP (Current US$)",
      Self::Population => "Population, total",
    }
  }
}

impl fmt::Display for Indicator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.code())
  }
}
