use crate::core::client::RetryConfig;
use crate::core::{AlertError, AlertsClient, net};
use crate::quote::Interval;
use crate::quote::wire::{ChartEnvelope, MetaNode, QuoteBlock};

pub(crate) struct Fetched {
    pub(crate) ts: Vec<i64>,
    pub(crate) quote: QuoteBlock,
    pub(crate) meta: Option<MetaNode>,
}

impl Fetched {
    /// Open of the first complete row and close of the last complete row.
    ///
    /// Rows where either value is missing are skipped; `None` means the
    /// series carries no usable sample at all.
    pub(crate) fn first_open_last_close(&self) -> Option<(f64, f64)> {
        let row = |i: usize| {
            let open = self.quote.open.get(i).copied().flatten()?;
            let close = self.quote.close.get(i).copied().flatten()?;
            (open.is_finite() && close.is_finite()).then_some((open, close))
        };

        let n = self.ts.len().max(self.quote.open.len());
        let first = (0..n).find_map(row)?;
        let last = (0..n).rev().find_map(row)?;
        Some((first.0, last.1))
    }

    /// Open and close of the last complete row.
    pub(crate) fn last_open_close(&self) -> Option<(f64, f64)> {
        let n = self.ts.len().max(self.quote.open.len());
        (0..n).rev().find_map(|i| {
            let open = self.quote.open.get(i).copied().flatten()?;
            let close = self.quote.close.get(i).copied().flatten()?;
            (open.is_finite() && close.is_finite()).then_some((open, close))
        })
    }
}

/// Fetch one session (`range=1d`) of the chart series at `interval`.
pub(crate) async fn fetch_chart(
    client: &AlertsClient,
    symbol: &str,
    interval: Interval,
    retry_override: Option<&RetryConfig>,
) -> Result<Fetched, AlertError> {
    let mut url = client.base_chart().join(symbol)?;
    url.query_pairs_mut()
        .append_pair("range", "1d")
        .append_pair("interval", interval.as_str())
        .append_pair("includePrePost", "false");

    let resp = client
        .send_with_retry(client.http().get(url), retry_override)
        .await?;
    let body = net::get_text(resp, "chart").await?;

    decode_chart(&body)
}

fn decode_chart(body: &str) -> Result<Fetched, AlertError> {
    let parsed: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| AlertError::Data(format!("json parse error: {e}")))?;

    let chart = parsed
        .chart
        .ok_or_else(|| AlertError::Data("missing chart".into()))?;

    if let Some(err) = chart.error {
        return Err(AlertError::Data(format!(
            "yahoo error: {} - {}",
            err.code, err.description
        )));
    }

    // An absent or empty result is an empty series, not a failure; the
    // resolver decides what to do with it.
    let Some(r0) = chart.result.and_then(|v| v.into_iter().next()) else {
        return Ok(Fetched {
            ts: Vec::new(),
            quote: QuoteBlock::default(),
            meta: None,
        });
    };

    let quote = r0
        .indicators
        .and_then(|i| i.quote.into_iter().next())
        .unwrap_or_default();

    Ok(Fetched {
        ts: r0.timestamp.unwrap_or_default(),
        quote,
        meta: r0.meta,
    })
}

/// Chart metadata (display names, exchange timezone) for `symbol`.
pub(crate) async fn fetch_meta(
    client: &AlertsClient,
    symbol: &str,
) -> Result<Option<MetaNode>, AlertError> {
    Ok(fetch_chart(client, symbol, Interval::D1, None).await?.meta)
}
