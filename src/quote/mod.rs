//! Quote Resolver: session open and latest price with granularity fallback.

mod fetch;
mod wire;

pub(crate) use fetch::fetch_meta;

use std::time::Duration;

use crate::core::{AlertError, AlertsClient, client::RetryConfig};

/// Sampling granularity of a chart request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    I1m,
    I5m,
    I15m,
    D1,
}

impl Interval {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Interval::I1m => "1m",
            Interval::I5m => "5m",
            Interval::I15m => "15m",
            Interval::D1 => "1d",
        }
    }
}

/// Intraday granularities tried in order, finest first.
pub const INTRADAY_LADDER: [Interval; 3] = [Interval::I1m, Interval::I5m, Interval::I15m];

/// Same-session open and latest price for one ticker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSample {
    /// Open of the first sample in the session's series.
    pub open: f64,
    /// Close of the most recent sample.
    pub last: f64,
    /// Granularity the sample was taken from.
    pub interval: Interval,
}

impl PriceSample {
    /// Percentage move of `last` against `open`.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::ZeroOpen`] when the open is zero.
    pub fn pct_change(&self, symbol: &str) -> Result<f64, AlertError> {
        if self.open == 0.0 {
            return Err(AlertError::ZeroOpen {
                symbol: symbol.to_string(),
            });
        }
        Ok((self.last - self.open) / self.open * 100.0)
    }
}

/// Resolves a [`PriceSample`] by walking the intraday ladder and falling back
/// to a single daily request.
#[derive(Debug, Clone)]
pub struct QuoteResolver {
    client: AlertsClient,
    intraday: Vec<Interval>,
    attempts: u32,
    pause: Duration,
    retry_override: Option<RetryConfig>,
}

impl QuoteResolver {
    /// Creates a resolver with the default ladder (`1m`, `5m`, `15m`), two
    /// attempts per granularity and a 400 ms pause between attempts.
    pub fn new(client: &AlertsClient) -> Self {
        Self {
            client: client.clone(),
            intraday: INTRADAY_LADDER.to_vec(),
            attempts: 2,
            pause: Duration::from_millis(400),
            retry_override: None,
        }
    }

    /// Replaces the intraday granularities tried before the daily fallback.
    #[must_use]
    pub fn intervals(mut self, intervals: impl Into<Vec<Interval>>) -> Self {
        self.intraday = intervals.into();
        self
    }

    /// Attempts per intraday granularity. Values below 1 are treated as 1.
    #[must_use]
    pub fn attempts(mut self, n: u32) -> Self {
        self.attempts = n.max(1);
        self
    }

    /// Pause after an empty intraday result.
    #[must_use]
    pub fn pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Overrides the client's retry policy for chart requests.
    #[must_use]
    pub fn retry_policy(mut self, cfg: Option<RetryConfig>) -> Self {
        self.retry_override = cfg;
        self
    }

    /// Fetches open and latest price for `symbol`.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::NoData`] if every granularity and the daily
    /// fallback came back empty. Transport, status and decoding failures are
    /// returned as-is.
    pub async fn resolve(&self, symbol: &str) -> Result<PriceSample, AlertError> {
        let retry = self.retry_override.as_ref();

        for &interval in &self.intraday {
            for attempt in 1..=self.attempts {
                let fetched = fetch::fetch_chart(&self.client, symbol, interval, retry).await?;
                if let Some((open, last)) = fetched.first_open_last_close() {
                    tracing::debug!(
                        symbol,
                        interval = interval.as_str(),
                        open,
                        last,
                        "intraday sample"
                    );
                    return Ok(PriceSample {
                        open,
                        last,
                        interval,
                    });
                }
                tracing::debug!(
                    symbol,
                    interval = interval.as_str(),
                    attempt,
                    "empty intraday data"
                );
                tokio::time::sleep(self.pause).await;
            }
        }

        let daily = fetch::fetch_chart(&self.client, symbol, Interval::D1, retry).await?;
        let (open, last) = daily.last_open_close().ok_or_else(|| AlertError::NoData {
            symbol: symbol.to_string(),
        })?;
        tracing::debug!(symbol, open, last, "fallback daily sample");

        Ok(PriceSample {
            open,
            last,
            interval: Interval::D1,
        })
    }
}
