//! earnings-relay: binary entrypoint.
//! Loads config, wires the StockTwits feed to the notifier mux and polls until Ctrl-C.

use anyhow::Result;
use earnings_relay::config::{LogFormat, RelayConfig};
use earnings_relay::feed::stocktwits::StockTwitsFeed;
use earnings_relay::metrics::{self, Metrics};
use earnings_relay::schedule::PollSchedule;
use earnings_relay::{FeedCursor, NotifierMux, Relay};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("earnings_relay=info,warn"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let cfg = RelayConfig::load()?;
    init_tracing(cfg.log_format);

    if let Some(addr) = cfg.metrics_addr.clone() {
        let router = Metrics::init()?.router();
        tokio::spawn(async move {
            if let Err(e) = metrics::serve(&addr, router).await {
                tracing::warn!(error = ?e, "metrics server stopped");
            }
        });
    }

    let feed = StockTwitsFeed::from_url(cfg.feed_url.clone(), cfg.feed_limit)?;
    let notifier = NotifierMux::from_config(&cfg);
    if notifier.is_empty() {
        tracing::warn!("no WEBHOOK_URL or SLACK_WEBHOOK_URL set; alerts will only be logged");
    } else {
        tracing::info!(sinks = notifier.len(), "notifiers configured");
    }

    let cursor = FeedCursor::from_override(cfg.start_after_id);
    if let Some(id) = cfg.start_after_id {
        tracing::info!(start_after_id = id, "forced watermark, first batch will be reported");
    }

    let schedule = PollSchedule::from_config(&cfg);
    let mut relay = Relay::new(feed, notifier, cursor);
    relay
        .run(schedule, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    Ok(())
}
