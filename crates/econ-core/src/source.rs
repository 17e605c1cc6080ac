//! The `IndicatorSource` trait: where raw provider data comes from.
//!
//! Implemented by `econ-worldbank` over HTTP; tests substitute canned data.

use std::future::Future;

use crate::{Result, indicator::Indicator, raw::RawEntry};

pub trait IndicatorSource: Send + Sync {
  /// Every observation of `indicator` for all countries and aggregates.
  ///
  /// Fails with [`Error::UpstreamUnavailable`](crate::Error::UpstreamUnavailable)
  /// or [`Error::Upstream`](crate::Error::Upstream); callers do not retry.
  fn fetch_all_indicator_data(
    &self,
    indicator: Indicator,
  ) -> impl Future<Output = Result<Vec<RawEntry>>> + Send + '_;

  /// Every observation of `indicator` for a single country. An unknown code
  /// yields an empty sequence, not an error.
  fn fetch_country_indicator<'a>(
    &'a self,
    country_code: &'a str,
    indicator: Indicator,
  ) -> impl Future<Output = Result<Vec<RawEntry>>> + Send + 'a;
}
