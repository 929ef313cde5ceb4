//! Replay a saved stream payload through one poll cycle.
//!
//! Usage: `replay <stream.json> [start_after_id]`
//! Alerts go to the sinks configured via env/.env (log-only when none are set).

use anyhow::{Context, Result};
use earnings_relay::feed::stocktwits::StockTwitsFeed;
use earnings_relay::{FeedCursor, NotifierMux, Relay, RelayConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .context("usage: replay <stream.json> [start_after_id]")?;
    let start_after: u64 = match args.next() {
        Some(s) => s.parse().with_context(|| format!("invalid start_after_id {s:?}"))?,
        None => 0,
    };

    let json = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let cfg = RelayConfig::load()?;
    let mut relay = Relay::new(
        StockTwitsFeed::from_fixture_str(&json),
        NotifierMux::from_config(&cfg),
        FeedCursor::starting_after(start_after),
    );

    let report = relay.run_cycle().await?;
    println!(
        "replay done: fetched={} fresh={} published={} without_figure={} failed={}",
        report.fetched, report.fresh, report.published, report.without_figure, report.failed
    );
    Ok(())
}
