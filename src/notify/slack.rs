use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use super::{EarningsAlert, Notifier};

pub struct SlackNotifier {
    webhook_url: Option<String>,
    client: Client,
    timeout: Duration,
}

impl SlackNotifier {
    /// Disabled sink: every send is a logged no-op.
    pub fn disabled() -> Self {
        Self {
            webhook_url: None,
            client: Client::new(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn new(url: String) -> Self {
        Self {
            webhook_url: Some(url),
            client: Client::new(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

pub(crate) fn slack_text(alert: &EarningsAlert) -> String {
    let mut text = format!("*{}* ({})", alert.headline(), alert.outcome);
    if let Some(url) = alert.quote_url() {
        text.push_str(&format!("\n{url}"));
    }
    text
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, alert: &EarningsAlert) -> Result<()> {
        let Some(url) = &self.webhook_url else {
            tracing::debug!("Slack disabled (no SLACK_WEBHOOK_URL)");
            return Ok(());
        };

        let body = serde_json::json!({ "text": slack_text(alert) });

        self.client
            .post(url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("slack post")?
            .error_for_status()
            .context("slack non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "slack"
    }
}
