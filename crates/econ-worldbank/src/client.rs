//! Async HTTP client for the World Bank v2 indicator API.

use std::time::Duration;

use econ_core::{
  Error, Result, indicator::Indicator, raw::RawEntry, source::IndicatorSource,
};
use reqwest::Client;
use tracing::{debug, warn};

use crate::payload::parse_page;

pub const BASE_URL: &str = "https://api.worldbank.org/v2";

/// Page size for the all-countries fetch; large enough for one page.
pub const ALL_COUNTRIES_PER_PAGE: u32 = 20_000;
pub const COUNTRY_PER_PAGE: u32 = 100;

/// Upper bound on pages followed for a single series.
const MAX_PAGES: u32 = 50;

/// Connection settings for the provider.
#[derive(Debug, Clone)]
pub struct ClientConfig {
  pub base_url:      String,
  /// Per-request timeout, covering connect through body.
  pub timeout:       Duration,
  /// Pause before the single retry of a transient failure.
  pub retry_backoff: Duration,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      base_url:      BASE_URL.to_owned(),
      timeout:       Duration::from_secs(30),
      retry_backoff: Duration::from_millis(500),
    }
  }
}

/// [`IndicatorSource`] over HTTP.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct WorldBankClient {
  client: Client,
  config: ClientConfig,
}

impl WorldBankClient {
  pub fn new(config: ClientConfig) -> reqwest::Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  fn url(&self, scope: &str, indicator: Indicator) -> String {
    format!(
      "{}/country/{scope}/indicator/{}",
      self.config.base_url.trim_end_matches('/'),
      indicator.code()
    )
  }

  /// Fetch every page of a series and concatenate the entries.
  async fn fetch_series(
    &self,
    scope: &str,
    indicator: Indicator,
    per_page: u32,
  ) -> Result<Vec<RawEntry>> {
    let url = self.url(scope, indicator);
    let mut entries = Vec::new();
    let mut page = 1;

    loop {
      let body = self.get_with_retry(&url, per_page, page).await?;
      let parsed = parse_page(&body)?;
      let pages = parsed.pages();
      entries.extend(parsed.entries);
      debug!(%indicator, scope, page, pages, "fetched page");

      if page >= pages {
        break;
      }
      if page >= MAX_PAGES {
        warn!(%indicator, scope, pages, "page limit reached; truncating series");
        break;
      }
      page += 1;
    }

    Ok(entries)
  }

  /// One request, retried once after `retry_backoff` if the failure was
  /// transient (connect error, timeout or 5xx).
  async fn get_with_retry(&self, url: &str, per_page: u32, page: u32) -> Result<String> {
    match self.get_once(url, per_page, page).await {
      Err(e) if e.is_transient() => {
        warn!(error = %e, url, "upstream request failed; retrying once");
        tokio::time::sleep(self.config.retry_backoff).await;
        self.get_once(url, per_page, page).await
      }
      other => other,
    }
  }

  async fn get_once(&self, url: &str, per_page: u32, page: u32) -> Result<String> {
    let resp = self
      .client
      .get(url)
      .query(&[
        ("format", "json".to_owned()),
        ("per_page", per_page.to_string()),
        ("page", page.to_string()),
      ])
      .send()
      .await
      .map_err(unavailable)?;

    let status = resp.status();
    if !status.is_success() {
      return Err(Error::Upstream {
        status:  status.as_u16(),
        message: status
          .canonical_reason()
          .unwrap_or("unexpected status")
          .to_owned(),
      });
    }

    resp.text().await.map_err(unavailable)
  }
}

fn unavailable(e: reqwest::Error) -> Error { Error::UpstreamUnavailable(e.to_string()) }

impl IndicatorSource for WorldBankClient {
  async fn fetch_all_indicator_data(&self, indicator: Indicator) -> Result<Vec<RawEntry>> {
    self
      .fetch_series("all", indicator, ALL_COUNTRIES_PER_PAGE)
      .await
  }

  async fn fetch_country_indicator<'a>(
    &'a self,
    country_code: &'a str,
    indicator: Indicator,
  ) -> Result<Vec<RawEntry>> {
    if country_code.is_empty() || !country_code.bytes().all(|b| b.is_ascii_alphanumeric()) {
      return Err(Error::Validation(format!("invalid country code {country_code:?}")));
    }
    self
      .fetch_series(country_code, indicator, COUNTRY_PER_PAGE)
      .await
  }
}
