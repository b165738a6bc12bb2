//! Shared HTTP client surface + builder.
//! Internals are split into `retry` (policy) and `constants` (UA + defaults).

mod constants;
mod retry;

pub use retry::{Backoff, RetryConfig};

use crate::core::AlertError;
use constants::{
    DEFAULT_BASE_CHART, DEFAULT_BASE_NEWS, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT, USER_AGENT,
};
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use url::Url;

/// HTTP client shared by the quote resolver, the news fetcher and the notifier.
///
/// Cloning is cheap; the underlying connection pool is reference counted.
#[derive(Debug, Clone)]
pub struct AlertsClient {
    http: Client,
    base_chart: Url,
    base_news: Url,
    retry: RetryConfig,
}

impl Default for AlertsClient {
    fn default() -> Self {
        Self::builder().build().expect("default client")
    }
}

impl AlertsClient {
    /// Create a new builder.
    pub fn builder() -> AlertsClientBuilder {
        AlertsClientBuilder::default()
    }

    /* -------- internal getters used by other modules -------- */

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }
    pub(crate) fn base_chart(&self) -> &Url {
        &self.base_chart
    }
    pub(crate) fn base_news(&self) -> &Url {
        &self.base_news
    }

    /// Send an idempotent request, retrying on the statuses and transport
    /// failures named by the active [`RetryConfig`].
    pub(crate) async fn send_with_retry(
        &self,
        req: RequestBuilder,
        retry_override: Option<&RetryConfig>,
    ) -> Result<Response, AlertError> {
        let cfg = retry_override.unwrap_or(&self.retry);
        if !cfg.enabled {
            return Ok(req.send().await?);
        }

        let mut attempt = 0u32;
        loop {
            // Streaming bodies cannot be cloned; those get a single shot.
            let Some(this_try) = req.try_clone() else {
                return Ok(req.send().await?);
            };

            match this_try.send().await {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < cfg.max_retries && cfg.retry_on_status.contains(&status) {
                        tracing::debug!(status, attempt, url = %resp.url(), "retrying on status");
                    } else {
                        return Ok(resp);
                    }
                }
                Err(e) => {
                    let retryable = (cfg.retry_on_timeout && e.is_timeout())
                        || (cfg.retry_on_connect && e.is_connect());
                    if !retryable || attempt >= cfg.max_retries {
                        return Err(e.into());
                    }
                    tracing::debug!(error = %e, attempt, "retrying on transport error");
                }
            }

            tokio::time::sleep(cfg.backoff.delay(attempt)).await;
            attempt += 1;
        }
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Default)]
pub struct AlertsClientBuilder {
    user_agent: Option<String>,
    base_chart: Option<Url>,
    base_news: Option<Url>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry: Option<RetryConfig>,
}

impl AlertsClientBuilder {
    /// Override the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Override the chart API base (e.g., `https://query1.finance.yahoo.com/v8/finance/chart/`).
    pub fn base_chart(mut self, url: Url) -> Self {
        self.base_chart = Some(url);
        self
    }

    /// Override the news feed base (e.g., `https://news.google.com/rss/`).
    pub fn base_news(mut self, url: Url) -> Self {
        self.base_news = Some(url);
        self
    }

    /// Set the per-request timeout. Default: 20 seconds.
    pub fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: 10 seconds.
    pub fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Replace the default retry policy for idempotent reads.
    pub fn retry_config(mut self, cfg: RetryConfig) -> Self {
        self.retry = Some(cfg);
        self
    }

    pub fn build(self) -> Result<AlertsClient, AlertError> {
        let base_chart = match self.base_chart {
            Some(u) => u,
            None => Url::parse(DEFAULT_BASE_CHART)?,
        };
        let base_news = match self.base_news {
            Some(u) => u,
            None => Url::parse(DEFAULT_BASE_NEWS)?,
        };

        let http = reqwest::Client::builder()
            .user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT))
            .cookie_store(true)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .connect_timeout(self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT))
            .build()?;

        Ok(AlertsClient {
            http,
            base_chart,
            base_news,
            retry: self.retry.unwrap_or_default(),
        })
    }
}
