//! ntfy push delivery: at most one request per alert, never retried.

use std::time::Duration;

use crate::core::{AlertError, AlertsClient};

const PUSH_TIMEOUT: Duration = Duration::from_secs(20);

/// A rendered alert ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Ask clients to render `body` as markdown.
    pub markdown: bool,
    /// Opened when the notification is tapped.
    pub click_url: Option<String>,
}

/// What happened to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Logged only; no request was made.
    DryRun,
    /// The request failed. It is not retried.
    Failed,
}

/// Posts notifications to `{server}/{topic}`.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: AlertsClient,
    server: String,
    topic: String,
    dry_run: bool,
}

impl Notifier {
    pub fn new(client: &AlertsClient, server: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            client: client.clone(),
            server: server.into(),
            topic: topic.into(),
            dry_run: false,
        }
    }

    /// Log notifications instead of sending them.
    #[must_use]
    pub fn dry_run(mut self, yes: bool) -> Self {
        self.dry_run = yes;
        self
    }

    /// Delivers `n` once. Failures are logged as warnings and reported as
    /// [`Delivery::Failed`]; they are never retried, since a lost response
    /// may hide a push that did arrive.
    pub async fn send(&self, n: &Notification) -> Delivery {
        if self.dry_run {
            tracing::info!(
                title = %n.title,
                body = %n.body.replace('\n', " | "),
                "[DRY-RUN] notification not sent"
            );
            return Delivery::DryRun;
        }

        tracing::info!(title = %n.title, topic = %mask_secret(&self.topic, 1), "sending ntfy");
        match self.post(n).await {
            Ok(status) => {
                tracing::debug!(status, "ntfy response");
                Delivery::Sent
            }
            Err(e) => {
                tracing::warn!(error = %e, "ntfy send failed");
                Delivery::Failed
            }
        }
    }

    async fn post(&self, n: &Notification) -> Result<u16, AlertError> {
        let url = format!("{}/{}", self.server.trim_end_matches('/'), self.topic);

        let mut req = self
            .client
            .http()
            .post(&url)
            .timeout(PUSH_TIMEOUT)
            .header("Title", n.title.as_str())
            .header("Priority", "high");
        if n.markdown {
            req = req.header("Markdown", "yes");
        }
        if let Some(click) = &n.click_url {
            req = req.header("Click", click.as_str());
        }

        // The topic is the secret; keep it out of error messages.
        let resp = req
            .body(n.body.clone().into_bytes())
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AlertError::Status {
                status: status.as_u16(),
                url: format!(
                    "{}/{}",
                    self.server.trim_end_matches('/'),
                    mask_secret(&self.topic, 1)
                ),
            });
        }
        Ok(status.as_u16())
    }
}

/// Masks a secret for logs, keeping `keep` characters at each end.
#[must_use]
pub fn mask_secret(s: &str, keep: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    match chars.len() {
        0 => "(unset)".to_string(),
        n if n > keep * 2 => {
            let head: String = chars[..keep].iter().collect();
            let tail: String = chars[n - keep..].iter().collect();
            format!("{head}…{tail}")
        }
        n => format!("{}…{}", chars[0], chars[n - 1]),
    }
}
