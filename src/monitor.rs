//! Cycle Orchestrator: one monitoring pass over all configured tickers.

use chrono::{DateTime, Utc};

use crate::alert::{self, AlertDirection, AlertState, Transition};
use crate::company::CompanyDirectory;
use crate::config::AppConfig;
use crate::core::{AlertError, AlertsClient};
use crate::news::{self, NewsItem};
use crate::notify::{Delivery, Notification, Notifier, mask_secret};
use crate::quote::QuoteResolver;

/// Result of evaluating one ticker.
#[derive(Debug, Clone, PartialEq)]
pub enum TickerOutcome {
    /// A notification was attempted and the direction latched.
    Alerted {
        direction: AlertDirection,
        pct: f64,
        delivery: Delivery,
    },
    /// Back inside the corridor; latch cleared without a notification.
    Reset { pct: f64 },
    /// Inside the corridor, nothing latched.
    Quiet { pct: f64 },
    /// Still beyond the threshold on the side already alerted.
    AlreadyAlerted { direction: AlertDirection, pct: f64 },
    /// The ticker could not be evaluated this run.
    Failed(String),
}

/// What a pass did.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Whether the pass ran (inside trading hours or bypassed).
    pub within_hours: bool,
    /// Per-ticker outcomes in processing order. Empty when skipped.
    pub outcomes: Vec<(String, TickerOutcome)>,
}

impl RunSummary {
    pub fn alerts_fired(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, TickerOutcome::Alerted { .. }))
            .count()
    }

    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, TickerOutcome::Failed(_)))
            .count()
    }
}

/// Drives monitoring passes for one configuration.
#[derive(Debug, Clone)]
pub struct Monitor {
    client: AlertsClient,
    config: AppConfig,
    resolver: QuoteResolver,
    notifier: Notifier,
}

impl Monitor {
    pub fn new(client: &AlertsClient, config: AppConfig) -> Self {
        let notifier = Notifier::new(client, &config.ntfy.server, &config.ntfy.topic)
            .dry_run(config.test.dry_run);
        Self {
            client: client.clone(),
            resolver: QuoteResolver::new(client),
            notifier,
            config,
        }
    }

    /// Replaces the quote resolver (e.g., to shorten the retry pause).
    #[must_use]
    pub fn with_resolver(mut self, resolver: QuoteResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Runs one pass now.
    pub async fn run_once(&self) -> RunSummary {
        self.run_once_at(Utc::now()).await
    }

    /// Runs one pass as if the current time were `now`.
    ///
    /// A failure on one ticker is logged and recorded; the remaining tickers
    /// are still processed.
    pub async fn run_once_at(&self, now: DateTime<Utc>) -> RunSummary {
        let cfg = &self.config;
        tracing::info!(
            at = %cfg.market_hours.local_timestamp(now),
            tickers = %cfg.tickers.join(","),
            topic = %mask_secret(&cfg.ntfy.topic, 1),
            "job start, threshold ±{:.1}%",
            cfg.threshold_pct
        );

        let in_hours = cfg.market_hours.is_open_at(now);
        let bypass = cfg.test.bypasses_market_hours();
        if bypass {
            tracing::info!("test mode: market-hours bypass enabled");
        }
        let within_hours = in_hours || bypass;
        tracing::info!(in_hours, effective = within_hours, "market hours check");
        if !within_hours {
            tracing::info!("outside market hours; no notifications sent");
            return RunSummary {
                within_hours,
                outcomes: Vec::new(),
            };
        }

        let mut state = AlertState::load(&cfg.state_file);
        let mut companies = cfg
            .news
            .enabled
            .then(|| CompanyDirectory::open(&self.client, &cfg.company_cache_file));

        let mut outcomes = Vec::with_capacity(cfg.tickers.len());
        for symbol in &cfg.tickers {
            let outcome = match self
                .process_ticker(symbol, &mut state, companies.as_mut())
                .await
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(symbol = %symbol, error = %e, "failed to process ticker");
                    TickerOutcome::Failed(e.to_string())
                }
            };
            outcomes.push((symbol.clone(), outcome));
        }

        RunSummary {
            within_hours,
            outcomes,
        }
    }

    async fn process_ticker(
        &self,
        symbol: &str,
        state: &mut AlertState,
        companies: Option<&mut CompanyDirectory>,
    ) -> Result<TickerOutcome, AlertError> {
        let cfg = &self.config;
        let sample = self.resolver.resolve(symbol).await?;
        let open = sample.open;
        let mut last = sample.last;
        let mut pct = sample.pct_change(symbol)?;

        if let Some(forced) = cfg.test.forced_delta() {
            tracing::info!(symbol, "test mode: forcing delta {forced:.2}% (measured {pct:.2}%)");
            pct = forced;
            last = open * (1.0 + pct / 100.0);
        }

        tracing::info!(
            interval = sample.interval.as_str(),
            "{symbol} | last={last:.4} open={open:.4} delta={pct:+.2}%"
        );

        let prev = state.get(symbol);
        let transition = alert::decide(prev, pct, cfg.threshold_pct);

        match transition {
            Transition::Fire(direction) => {
                tracing::info!(symbol, %prev, %direction, "state change; sending alert");
                let headlines = match companies {
                    Some(dir) => self.headlines(symbol, dir).await,
                    None => Vec::new(),
                };
                let n = compose_notification(symbol, direction, pct, last, open, &headlines);
                let delivery = self.notifier.send(&n).await;
                // Latch even when delivery failed; pushes are never retried.
                if let Err(e) = state.apply(symbol, transition) {
                    tracing::error!(
                        symbol,
                        %direction,
                        delivery = ?delivery,
                        error = %e,
                        "alert dispatched but latch not saved"
                    );
                    return Err(e);
                }
                Ok(TickerOutcome::Alerted {
                    direction,
                    pct,
                    delivery,
                })
            }
            Transition::Reset => {
                tracing::info!(symbol, %prev, "back inside corridor; resetting state");
                state.apply(symbol, transition)?;
                Ok(TickerOutcome::Reset { pct })
            }
            Transition::Quiet => {
                tracing::info!(symbol, "below ±{:.1}%; no notification", cfg.threshold_pct);
                Ok(TickerOutcome::Quiet { pct })
            }
            Transition::AlreadyAlerted(direction) => {
                tracing::info!(symbol, %direction, "already alerted; waiting for corridor re-entry");
                Ok(TickerOutcome::AlreadyAlerted { direction, pct })
            }
        }
    }

    async fn headlines(&self, symbol: &str, companies: &mut CompanyDirectory) -> Vec<NewsItem> {
        let meta = companies.lookup(symbol).await;
        let (name, keywords) = meta.keywords();
        let query = news::build_query(&name, &meta.base_ticker);
        let items = news::collect_headlines(&self.client, &query, &keywords, &self.config.news).await;
        tracing::debug!(symbol, query = %query, found = items.len(), "headlines");
        items
    }
}

/// Renders the alert title and body.
///
/// With headlines the body gains a markdown `News:` section and the first
/// headline becomes the click-through target.
#[must_use]
pub fn compose_notification(
    symbol: &str,
    direction: AlertDirection,
    pct: f64,
    last: f64,
    open: f64,
    headlines: &[NewsItem],
) -> Notification {
    let mut body = format!(
        "{} {symbol}: {pct:+.2}% vs. open\nCurrent: {last:.2} | Open: {open:.2}",
        direction.arrow()
    );

    if !headlines.is_empty() {
        body.push_str("\n\n**News:**");
        for item in headlines {
            body.push_str(&format!("\n- [{}]({})", escape_link_text(&item.title), item.url()));
            if let Some(source) = &item.source {
                body.push_str(&format!(" ({source})"));
            }
        }
    }

    Notification {
        title: format!("Stock Alert: {symbol}"),
        body,
        markdown: !headlines.is_empty(),
        click_url: headlines.first().map(|h| h.url().to_string()),
    }
}

fn escape_link_text(s: &str) -> String {
    s.replace('[', "\\[").replace(']', "\\]")
}
