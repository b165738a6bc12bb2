//! News Fetcher & Filter: recent headlines for an alert body.

mod api;
mod filter;
mod model;
mod resolve;
mod wire;

pub use filter::{build_query, filter_titles};
pub use model::NewsItem;
pub use resolve::resolve_canonical_url;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::core::{AlertsClient, client::RetryConfig};

/// Lookback floor applied to the secondary-locale search.
pub const FALLBACK_MIN_LOOKBACK_HOURS: u32 = 12;

/// A builder for fetching recent headlines for a search query.
pub struct NewsBuilder {
    client: AlertsClient,
    query: String,
    limit: usize,
    lookback_hours: u32,
    lang: String,
    country: String,
    now: Option<DateTime<Utc>>,
    retry_override: Option<RetryConfig>,
}

impl NewsBuilder {
    /// Creates a new `NewsBuilder` for a search query.
    pub fn new(client: &AlertsClient, query: impl Into<String>) -> Self {
        Self {
            client: client.clone(),
            query: query.into(),
            limit: 2,
            lookback_hours: 12,
            lang: "de".into(),
            country: "DE".into(),
            now: None,
            retry_override: None,
        }
    }

    /// Sets the maximum number of headlines to return.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Drops headlines published more than `hours` ago.
    #[must_use]
    pub const fn lookback_hours(mut self, hours: u32) -> Self {
        self.lookback_hours = hours;
        self
    }

    /// Sets the feed language (`hl`) and region (`gl`).
    #[must_use]
    pub fn locale(mut self, lang: impl Into<String>, country: impl Into<String>) -> Self {
        self.lang = lang.into();
        self.country = country.into();
        self
    }

    /// Fixes the reference time for the lookback cutoff. Defaults to now.
    #[must_use]
    pub const fn as_of(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Overrides the default retry policy for this specific API call.
    #[must_use]
    pub fn retry_policy(mut self, cfg: Option<RetryConfig>) -> Self {
        self.retry_override = cfg;
        self
    }

    /// Executes the search.
    ///
    /// Never fails: network and feed-decoding errors are logged and produce
    /// an empty list.
    pub async fn fetch(self) -> Vec<NewsItem> {
        let now = self.now.unwrap_or_else(Utc::now);
        match api::fetch_headlines(
            &self.client,
            &self.query,
            self.limit,
            self.lookback_hours,
            &self.lang,
            &self.country,
            now,
            self.retry_override.as_ref(),
        )
        .await
        {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(query = %self.query, lang = %self.lang, error = %e, "news fetch failed");
                Vec::new()
            }
        }
    }
}

/// News enrichment settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewsOptions {
    pub enabled: bool,
    pub limit: usize,
    pub lookback_hours: u32,
    pub lang: String,
    pub country: String,
    pub fallback_lang: String,
    pub fallback_country: String,
}

impl Default for NewsOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            limit: 2,
            lookback_hours: 12,
            lang: "de".into(),
            country: "DE".into(),
            fallback_lang: "en".into(),
            fallback_country: "US".into(),
        }
    }
}

/// Relevant headlines for `query`, with canonical URLs resolved.
///
/// Results are filtered by `keywords`. If nothing relevant turns up in the
/// primary locale, the search is repeated in the fallback locale with a
/// lookback of at least [`FALLBACK_MIN_LOOKBACK_HOURS`].
pub async fn collect_headlines(
    client: &AlertsClient,
    query: &str,
    keywords: &[String],
    opts: &NewsOptions,
) -> Vec<NewsItem> {
    let primary = NewsBuilder::new(client, query)
        .limit(opts.limit)
        .lookback_hours(opts.lookback_hours)
        .locale(&opts.lang, &opts.country)
        .fetch()
        .await;
    let mut picked = filter_titles(primary, keywords);

    if picked.is_empty() {
        let lookback = opts.lookback_hours.max(FALLBACK_MIN_LOOKBACK_HOURS);
        tracing::info!(
            query,
            lang = %opts.fallback_lang,
            country = %opts.fallback_country,
            lookback,
            "no relevant headlines; trying fallback locale"
        );
        let secondary = NewsBuilder::new(client, query)
            .limit(opts.limit)
            .lookback_hours(lookback)
            .locale(&opts.fallback_lang, &opts.fallback_country)
            .fetch()
            .await;
        picked = filter_titles(secondary, keywords);
    }

    for item in &mut picked {
        item.canonical_url = Some(resolve_canonical_url(client, &item.link).await);
    }
    picked
}
