use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::instrument::WithSubscriber;

use stock_alerts::{AlertsClient, AppConfig, Monitor, logging, notify::mask_secret};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from("config.json"), PathBuf::from);

    let config = AppConfig::load(&path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    let dispatch = logging::subscriber(&config.log).context("failed to set up logging")?;
    let client = AlertsClient::builder()
        .build()
        .context("failed to build HTTP client")?;

    let monitor = Monitor::new(&client, config);

    async move {
        let cfg = monitor.config();
        tracing::info!(
            server = %cfg.ntfy.server,
            topic = %mask_secret(&cfg.ntfy.topic, 1),
            level = %cfg.log.level,
            "configuration loaded"
        );

        let summary = monitor.run_once().await;
        tracing::info!(
            ran = summary.within_hours,
            alerts = summary.alerts_fired(),
            failures = summary.failures(),
            "job done"
        );
    }
    .with_subscriber(dispatch)
    .await;

    Ok(())
}
