use chrono::{DateTime, Duration, Utc};
use url::Url;

use crate::{
    core::{AlertError, AlertsClient, client::RetryConfig, net},
    news::{model::NewsItem, wire},
};

/// Search URL with the query, a recency hint and locale parameters.
pub(crate) fn search_url(
    base: &Url,
    query: &str,
    lookback_hours: u32,
    lang: &str,
    country: &str,
) -> Result<Url, AlertError> {
    let mut url = base.join("search")?;
    url.query_pairs_mut()
        .append_pair("q", &format!("{query} when:{lookback_hours}h"))
        .append_pair("hl", lang)
        .append_pair("gl", country)
        .append_pair("ceid", &format!("{country}:{lang}"));
    Ok(url)
}

#[allow(clippy::too_many_arguments)]
pub(super) async fn fetch_headlines(
    client: &AlertsClient,
    query: &str,
    limit: usize,
    lookback_hours: u32,
    lang: &str,
    country: &str,
    now: DateTime<Utc>,
    retry_override: Option<&RetryConfig>,
) -> Result<Vec<NewsItem>, AlertError> {
    let url = search_url(client.base_news(), query, lookback_hours, lang, country)?;
    let resp = client
        .send_with_retry(client.http().get(url), retry_override)
        .await?;
    let body = net::get_text(resp, "news_search").await?;

    let cutoff = now - Duration::hours(i64::from(lookback_hours));
    parse_feed(&body, limit, cutoff)
}

/// Decodes an RSS document and keeps up to `limit` entries newer than `cutoff`.
///
/// Only the first `max(10, limit * 3)` entries are considered. Entries without
/// a parseable date are kept.
pub(crate) fn parse_feed(
    body: &str,
    limit: usize,
    cutoff: DateTime<Utc>,
) -> Result<Vec<NewsItem>, AlertError> {
    let rss: wire::Rss = quick_xml::de::from_str(body)?;
    let items = rss.channel.map(|c| c.items).unwrap_or_default();

    let mut out = Vec::new();
    if limit == 0 {
        return Ok(out);
    }

    for raw in items.into_iter().take(limit.saturating_mul(3).max(10)) {
        let published_at = raw
            .pub_date
            .as_deref()
            .and_then(|d| DateTime::parse_from_rfc2822(d.trim()).ok())
            .map(|d| d.with_timezone(&Utc));
        if published_at.is_some_and(|p| p < cutoff) {
            continue;
        }

        let title = raw.title.unwrap_or_default().trim().to_string();
        let link = raw.link.unwrap_or_default().trim().to_string();
        if title.is_empty() || link.is_empty() {
            continue;
        }

        let source = raw
            .source
            .and_then(|s| s.name)
            .or_else(|| raw.categories.into_iter().next())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        out.push(NewsItem {
            title,
            source,
            link,
            published_at,
            canonical_url: None,
        });
        if out.len() >= limit {
            break;
        }
    }

    Ok(out)
}
