//! World Bank v2 API adapter.
//!
//! Implements [`econ_core::source::IndicatorSource`] over HTTP with an explicit
//! request timeout and a single retry for transient failures.

mod client;
mod payload;

pub use client::{
  ALL_COUNTRIES_PER_PAGE, BASE_URL, COUNTRY_PER_PAGE, ClientConfig, WorldBankClient,
};
pub use payload::{Page, PageMeta, parse_page};
