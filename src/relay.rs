// src/relay.rs
//! Poll cycle: fetch → cursor → extract → publish.
//!
//! Cycles run strictly one after another on the caller's task; `run_cycle`
//! takes `&mut self`, so two cycles can never race on the watermark.

use anyhow::{Context, Result};
use metrics::{counter, gauge};
use std::future::Future;

use crate::cursor::FeedCursor;
use crate::extract::extract;
use crate::feed::types::{FeedSource, RawPost};
use crate::metrics::ensure_metrics_described;
use crate::notify::{EarningsAlert, Notifier};
use crate::schedule::PollSchedule;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub fresh: usize,
    pub published: usize,
    pub without_figure: usize,
    pub failed: usize,
    pub primed: bool,
    pub watermark: Option<u64>,
}

enum PostResult {
    Published,
    NoFigure,
    Failed,
}

pub struct Relay<F, N> {
    feed: F,
    notifier: N,
    cursor: FeedCursor,
}

impl<F, N> Relay<F, N>
where
    F: FeedSource,
    N: Notifier,
{
    pub fn new(feed: F, notifier: N, cursor: FeedCursor) -> Self {
        ensure_metrics_described();
        Self {
            feed,
            notifier,
            cursor,
        }
    }

    pub fn cursor(&self) -> &FeedCursor {
        &self.cursor
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// One poll cycle. Only a failed fetch is an error; extraction misses and
    /// failed sends are counted in the report.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let batch = match self.feed.fetch_batch().await {
            Ok(b) => b,
            Err(e) => {
                counter!("relay_feed_errors_total").increment(1);
                return Err(e).with_context(|| format!("fetching batch from {}", self.feed.name()));
            }
        };

        let fetched = batch.len();
        let ingested = self.cursor.ingest(batch);
        counter!("relay_posts_fetched_total").increment(fetched as u64);
        counter!("relay_posts_fresh_total").increment(ingested.fresh.len() as u64);

        let mut report = CycleReport {
            fetched,
            fresh: ingested.fresh.len(),
            primed: ingested.primed,
            watermark: ingested.watermark,
            ..Default::default()
        };

        if ingested.primed {
            tracing::info!(
                watermark = ?ingested.watermark,
                skipped = ingested.stale,
                "not reporting on first run"
            );
        }

        for post in &ingested.fresh {
            match self.handle_post(post).await {
                PostResult::Published => report.published += 1,
                PostResult::NoFigure => report.without_figure += 1,
                PostResult::Failed => report.failed += 1,
            }
        }

        counter!("relay_posts_without_figure_total").increment(report.without_figure as u64);
        counter!("relay_alerts_published_total").increment(report.published as u64);
        counter!("relay_alerts_failed_total").increment(report.failed as u64);
        if let Some(w) = report.watermark {
            gauge!("relay_watermark").set(w as f64);
        }
        gauge!("relay_last_cycle_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

        Ok(report)
    }

    async fn handle_post(&self, post: &RawPost) -> PostResult {
        let fact = extract(&post.body);
        let Some(alert) = EarningsAlert::from_post(post, &fact) else {
            tracing::info!(post_id = post.id, ticker = ?fact.ticker, "no reported figure, skipping");
            return PostResult::NoFigure;
        };

        let headline = alert.headline();
        match self.notifier.send(&alert).await {
            Ok(()) => {
                tracing::info!(post_id = post.id, outcome = %alert.outcome, %headline, "published");
                PostResult::Published
            }
            Err(e) => {
                tracing::warn!(error = ?e, post_id = post.id, %headline, "publish failed");
                PostResult::Failed
            }
        }
    }

    /// Poll until `shutdown` resolves. Fetch errors are logged and the next
    /// cycle retries; shutdown is observed between cycles.
    pub async fn run<S>(&mut self, schedule: PollSchedule, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            let today = chrono::Local::now();
            if schedule.should_poll(&today) {
                match self.run_cycle().await {
                    Ok(r) => tracing::info!(
                        fetched = r.fetched,
                        fresh = r.fresh,
                        published = r.published,
                        without_figure = r.without_figure,
                        failed = r.failed,
                        watermark = ?r.watermark,
                        "poll cycle done"
                    ),
                    Err(e) => tracing::warn!(error = ?e, "poll cycle failed"),
                }
            } else {
                tracing::info!("skipping run due to weekend");
            }

            let delay = schedule.next_delay(&today);
            tracing::debug!(delay_secs = delay.as_secs(), "waiting before next run");
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!(watermark = ?self.cursor.watermark(), "shutting down");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
