//! Continents and the static country-membership table.
//!
//! The table is the single source of truth for continent scoping. It is built
//! once at startup and shared (behind an `Arc`) by the persisted aggregator and
//! the live region filter.

use std::{
  collections::{BTreeSet, HashMap},
  fmt,
  str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Bumped whenever a membership list below changes.
pub const MEMBERSHIP_VERSION: u32 = 1;

// ─── Continent ───────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Continent {
  Africa,
  Asia,
  Europe,
  Americas,
  Oceania,
}

impl Continent {
  pub const ALL: [Continent; 5] = [
    Continent::Africa,
    Continent::Asia,
    Continent::Europe,
    Continent::Americas,
    Continent::Oceania,
  ];

  /// Lower-case code used in URLs and as the summary primary key.
  pub fn code(self) -> &'static str {
    match self {
      Self::Africa => "africa",
      Self::Asia => "asia",
      Self::Europe => "europe",
      Self::Americas => "americas",
      Self::Oceania => "oceania",
    }
  }

  pub fn display_name(self) -> &'static str {
    match self {
      Self::Africa => "Africa",
      Self::Asia => "Asia",
      Self::Europe => "Europe",
      Self::Americas => "Americas",
      Self::Oceania => "Oceania",
    }
  }

  /// Case-insensitive lookup by code. Surrounding whitespace is ignored.
  pub fn from_name(name: &str) -> Option<Self> {
    let name = name.trim();
    Self::ALL
      .into_iter()
      .find(|c| c.code().eq_ignore_ascii_case(name))
  }
}

impl fmt::Display for Continent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.code())
  }
}

impl FromStr for Continent {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::from_name(s).ok_or_else(|| Error::Validation(format!("unknown continent: {s:?}")))
  }
}

// ─── Membership table ────────────────────────────────────────────────────────

const AFRICA: &[&str] = &[
  "DZA", "AGO", "BEN", "BWA", "BFA", "BDI", "CMR", "CPV", "CAF", "TCD", "COM",
  "COG", "COD", "CIV", "DJI", "EGY", "GNQ", "ERI", "ETH", "GAB", "GMB", "GHA",
  "GIN", "GNB", "KEN", "LSO", "LBR", "LBY", "MDG", "MWI", "MLI", "MRT", "MUS",
  "MAR", "MOZ", "NAM", "NER", "NGA", "RWA", "STP", "SEN", "SYC", "SLE", "SOM",
  "ZAF", "SSD", "SDN", "SWZ", "TZA", "TGO", "TUN", "UGA", "ZMB", "ZWE",
];

const ASIA: &[&str] = &[
  "AFG", "ARM", "AZE", "BHR", "BGD", "BTN", "BRN", "KHM", "CHN", "GEO", "HKG",
  "IND", "IDN", "IRN", "IRQ", "ISR", "JPN", "JOR", "KAZ", "KWT", "KGZ", "LAO",
  "LBN", "MAC", "MYS", "MDV", "MNG", "MMR", "NPL", "PRK", "OMN", "PAK", "PSE",
  "PHL", "QAT", "SAU", "SGP", "KOR", "LKA", "SYR", "TWN", "TJK", "THA", "TLS",
  "TUR", "TKM", "ARE", "UZB", "VNM", "YEM",
];

const EUROPE: &[&str] = &[
  "ALB", "AND", "AUT", "BLR", "BEL", "BIH", "BGR", "HRV", "CYP", "CZE", "DNK",
  "EST", "FIN", "FRA", "DEU", "GRC", "HUN", "ISL", "IRL", "ITA", "XKX", "LVA",
  "LIE", "LTU", "LUX", "MKD", "MLT", "MDA", "MCO", "MNE", "NLD", "NOR", "POL",
  "PRT", "ROU", "RUS", "SMR", "SRB", "SVK", "SVN", "ESP", "SWE", "CHE", "UKR",
  "GBR", "VAT",
];

const AMERICAS: &[&str] = &[
  "ATG", "ARG", "BHS", "BRB", "BLZ", "BOL", "BRA", "CAN", "CHL", "COL", "CRI",
  "CUB", "DMA", "DOM", "ECU", "SLV", "GRD", "GTM", "GUY", "HTI", "HND", "JAM",
  "MEX", "NIC", "PAN", "PRY", "PER", "KNA", "LCA", "VCT", "SUR", "TTO", "USA",
  "URY", "VEN",
];

const OCEANIA: &[&str] = &[
  "AUS", "FJI", "KIR", "MHL", "FSM", "NRU", "NZL", "PLW", "PNG", "WSM", "SLB",
  "TON", "TUV", "VUT",
];

/// The member set of one continent.
#[derive(Debug, Clone)]
pub struct Membership {
  pub continent: Continent,
  pub members:   BTreeSet<String>,
}

/// Continent → member ISO3 codes, with a reverse index. A code belongs to at
/// most one continent; codes absent from every list are simply unscoped.
#[derive(Debug, Clone)]
pub struct ContinentTable {
  version:     u32,
  memberships: Vec<Membership>,
  index:       HashMap<String, Continent>,
}

impl ContinentTable {
  /// Build a table from explicit member lists. Rejects malformed codes and
  /// codes listed under more than one continent.
  pub fn new<I, M, C>(version: u32, entries: I) -> Result<Self>
  where
    I: IntoIterator<Item = (Continent, M)>,
    M: IntoIterator<Item = C>,
    C: Into<String>,
  {
    let mut memberships = Vec::new();
    let mut index = HashMap::new();

    for (continent, members) in entries {
      if memberships.iter().any(|m: &Membership| m.continent == continent) {
        return Err(Error::Validation(format!("continent {continent} listed twice")));
      }

      let mut set = BTreeSet::new();
      for code in members {
        let code = code.into();
        if !is_iso3(&code) {
          return Err(Error::Validation(format!("invalid country code {code:?}")));
        }
        if let Some(other) = index.insert(code.clone(), continent)
          && other != continent
        {
          return Err(Error::Validation(format!(
            "{code} belongs to both {other} and {continent}"
          )));
        }
        set.insert(code);
      }
      memberships.push(Membership { continent, members: set });
    }

    Ok(Self { version, memberships, index })
  }

  /// The hand-curated five-continent table.
  pub fn standard() -> Self {
    let entries = [
      (Continent::Africa, AFRICA),
      (Continent::Asia, ASIA),
      (Continent::Europe, EUROPE),
      (Continent::Americas, AMERICAS),
      (Continent::Oceania, OCEANIA),
    ];
    let memberships: Vec<Membership> = entries
      .into_iter()
      .map(|(continent, codes)| Membership {
        continent,
        members: codes.iter().map(|c| (*c).to_owned()).collect(),
      })
      .collect();
    let index = memberships
      .iter()
      .flat_map(|m| m.members.iter().map(move |c| (c.clone(), m.continent)))
      .collect();
    Self { version: MEMBERSHIP_VERSION, memberships, index }
  }

  pub fn version(&self) -> u32 { self.version }

  /// Memberships in declaration order.
  pub fn memberships(&self) -> &[Membership] { &self.memberships }

  pub fn continents(&self) -> impl Iterator<Item = Continent> + '_ {
    self.memberships.iter().map(|m| m.continent)
  }

  pub fn members(&self, continent: Continent) -> Option<&BTreeSet<String>> {
    self
      .memberships
      .iter()
      .find(|m| m.continent == continent)
      .map(|m| &m.members)
  }

  pub fn continent_of(&self, country_code: &str) -> Option<Continent> {
    self.index.get(country_code).copied()
  }

  pub fn contains(&self, continent: Continent, country_code: &str) -> bool {
    self.continent_of(country_code) == Some(continent)
  }
}

impl Default for ContinentTable {
  fn default() -> Self { Self::standard() }
}

fn is_iso3(code: &str) -> bool {
  code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;

  #[test]
  fn standard_table_partitions_codes() {
    let table = ContinentTable::standard();
    let mut seen = HashSet::new();
    let mut total = 0;
    for m in table.memberships() {
      for code in &m.members {
        assert!(seen.insert(code.clone()), "{code} listed under two continents");
        assert_eq!(table.continent_of(code), Some(m.continent));
        assert!(is_iso3(code), "bad code {code}");
      }
      total += m.members.len();
    }
    assert_eq!(total, 199);
    assert_eq!(table.version(), MEMBERSHIP_VERSION);
  }

  #[test]
  fn standard_table_covers_every_continent_once() {
    let table = ContinentTable::standard();
    let continents: Vec<_> = table.continents().collect();
    assert_eq!(continents, Continent::ALL);
  }

  #[test]
  fn lookup_examples() {
    let table = ContinentTable::standard();
    assert_eq!(table.continent_of("USA"), Some(Continent::Americas));
    assert_eq!(table.continent_of("CHN"), Some(Continent::Asia));
    assert_eq!(table.continent_of("EGY"), Some(Continent::Africa));
    assert_eq!(table.continent_of("WLD"), None);
    assert!(table.contains(Continent::Europe, "DEU"));
    assert!(!table.contains(Continent::Europe, "USA"));
  }

  #[test]
  fn from_name_is_case_insensitive() {
    assert_eq!(Continent::from_name("ASIA"), Some(Continent::Asia));
    assert_eq!(Continent::from_name(" Europe "), Some(Continent::Europe));
    assert_eq!(Continent::from_name("atlantis"), None);
    assert_eq!(Continent::from_name("global"), None);
    assert!("Oceania".parse::<Continent>().is_ok());
    assert!("middleEast".parse::<Continent>().is_err());
  }

  #[test]
  fn new_rejects_overlap() {
    let err = ContinentTable::new(
      2,
      [
        (Continent::Europe, vec!["TUR", "FRA"]),
        (Continent::Asia, vec!["TUR"]),
      ],
    )
    .unwrap_err();
    assert!(matches!(err, Error::Validation(m) if m.contains("TUR")));
  }

  #[test]
  fn new_rejects_malformed_codes() {
    let err = ContinentTable::new(2, [(Continent::Asia, vec!["cn"])]).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
  }

  #[test]
  fn new_builds_custom_table() {
    let table = ContinentTable::new(
      7,
      [(Continent::Oceania, vec!["AAA", "BBB", "CCC"])],
    )
    .unwrap();
    assert_eq!(table.version(), 7);
    assert_eq!(table.members(Continent::Oceania).map(|m| m.len()), Some(3));
    assert!(table.members(Continent::Asia).is_none());
  }
}
