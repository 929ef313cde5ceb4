use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("relay_posts_fetched_total", "Posts returned by the feed.");
        describe_counter!(
            "relay_posts_fresh_total",
            "Posts newer than the watermark, handed to extraction."
        );
        describe_counter!(
            "relay_posts_without_figure_total",
            "Fresh posts skipped because no reported figure was found."
        );
        describe_counter!("relay_alerts_published_total", "Alerts delivered to every sink.");
        describe_counter!("relay_alerts_failed_total", "Alerts with at least one failed sink.");
        describe_counter!("relay_feed_errors_total", "Feed fetch/parse errors.");
        describe_histogram!("relay_feed_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("relay_watermark", "Highest post id accounted for.");
        describe_gauge!("relay_last_cycle_ts", "Unix ts of the last completed poll cycle.");
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    pub fn router(&self) -> Router {
        router(self.handle.clone())
    }
}

/// `/metrics` in the Prometheus exposition format, plus a plain `/health`.
pub fn router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
        .route("/health", get(|| async { "ok" }))
}

/// Serve the metrics router until the process exits.
pub async fn serve(addr: &str, router: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding metrics listener on {addr}"))?;
    tracing::info!(%addr, "metrics listening");
    axum::serve(listener, router).await.context("metrics server")
}
