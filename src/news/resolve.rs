//! Best-effort resolution of aggregator links to publisher URLs.

use std::time::Duration;

use reqwest::StatusCode;
use url::Url;

use crate::core::{AlertError, AlertsClient};

/// Hosts that wrap publisher articles behind their own links.
const AGGREGATOR_HOSTS: &[&str] = &["news.google.com", "www.google.com", "google.com"];

const PROBE_TIMEOUT: Duration = Duration::from_secs(6);

/// Publisher URL behind `link`.
///
/// Aggregator links carrying an embedded `url` parameter are unwrapped
/// without network I/O. Anything else is probed (HEAD, then GET when HEAD is
/// rejected) and the post-redirect URL is returned. Any failure yields `link`
/// unchanged.
pub async fn resolve_canonical_url(client: &AlertsClient, link: &str) -> String {
    let Ok(parsed) = Url::parse(link) else {
        return link.to_string();
    };

    if is_aggregator(&parsed)
        && let Some(embedded) = embedded_url(&parsed)
    {
        return embedded;
    }

    match probe(client, parsed).await {
        Ok(final_url) => final_url,
        Err(e) => {
            tracing::debug!(link, error = %e, "link resolution failed; keeping feed link");
            link.to_string()
        }
    }
}

fn is_aggregator(url: &Url) -> bool {
    url.host_str()
        .is_some_and(|h| AGGREGATOR_HOSTS.iter().any(|a| h.eq_ignore_ascii_case(a)))
}

fn embedded_url(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == "url")
        .and_then(|(_, v)| Url::parse(&v).ok())
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .map(String::from)
}

async fn probe(client: &AlertsClient, url: Url) -> Result<String, AlertError> {
    let head = client
        .http()
        .head(url.clone())
        .timeout(PROBE_TIMEOUT)
        .send()
        .await?;

    let resp = if matches!(
        head.status(),
        StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
    ) {
        client.http().get(url).timeout(PROBE_TIMEOUT).send().await?
    } else {
        head
    };

    let status = resp.status();
    if status.is_client_error() || status.is_server_error() {
        return Err(AlertError::Status {
            status: status.as_u16(),
            url: resp.url().to_string(),
        });
    }
    Ok(resp.url().to_string())
}
