use super::{EarningsAlert, Notifier};
use anyhow::{anyhow, Result};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use std::time::Duration;

const USERNAME: &str = "EarningsBot";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct DiscordNotifier {
    webhook: String,
    client: Client,
    timeout: Duration,
    max_retries: u8,
    backoff_base: Duration,
    rate_limit_cap: Duration,
}

impl DiscordNotifier {
    /// For threads, append `?thread_id=...` to the webhook URL.
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: 3,
            backoff_base: Duration::from_millis(500),
            rate_limit_cap: MAX_RATE_LIMIT_WAIT,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries.max(1);
        self
    }

    pub fn with_backoff_ms(mut self, ms: u64) -> Self {
        self.backoff_base = Duration::from_millis(ms);
        self
    }

    /// Longest wait honoured for a 429, whatever the server asks for.
    pub fn with_rate_limit_cap(mut self, cap: Duration) -> Self {
        self.rate_limit_cap = cap;
        self
    }

    fn backoff(&self, attempt: u8) -> Duration {
        self.backoff_base * (1u32 << (attempt - 1).min(8))
    }

    pub async fn send_alert(&self, alert: &EarningsAlert) -> Result<()> {
        let payload = DiscordWebhookPayload::from_alert(alert);

        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&self.webhook)
                .timeout(self.timeout)
                .json(&payload)
                .send()
                .await;

            match res {
                Ok(rsp) if rsp.status() == StatusCode::TOO_MANY_REQUESTS => {
                    if attempt >= self.max_retries {
                        return Err(anyhow!("Discord webhook rate limited after {attempt} attempts"));
                    }
                    let wait = match retry_after(rsp).await {
                        Some(secs) => capped_wait(secs, self.rate_limit_cap),
                        None => self.backoff(attempt).min(self.rate_limit_cap),
                    };
                    tracing::info!(wait_ms = wait.as_millis() as u64, "discord rate limited, waiting");
                    tokio::time::sleep(wait).await;
                }
                Ok(rsp) => {
                    let status = rsp.status();
                    if status.is_success() {
                        return Ok(());
                    }
                    if status.is_server_error() && attempt < self.max_retries {
                        tokio::time::sleep(self.backoff(attempt)).await;
                        continue;
                    }
                    return Err(anyhow!("Discord webhook HTTP error: {status}"));
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        tokio::time::sleep(self.backoff(attempt)).await;
                        continue;
                    }
                    return Err(anyhow!("Discord webhook request failed: {e}"));
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, alert: &EarningsAlert) -> Result<()> {
        self.send_alert(alert).await
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}

/// Seconds requested by a 429: `Retry-After` header first, then the
/// `retry_after` field of the JSON body (both may be fractional).
async fn retry_after(rsp: Response) -> Option<f64> {
    let from_header = rsp
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<f64>().ok());
    if from_header.is_some() {
        return from_header;
    }

    #[derive(serde::Deserialize)]
    struct RateLimited {
        retry_after: f64,
    }
    rsp.json::<RateLimited>().await.ok().map(|r| r.retry_after)
}

/// Clamp before converting: `Duration::from_secs_f64` panics on values it
/// cannot represent.
fn capped_wait(secs: f64, cap: Duration) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(secs.min(cap.as_secs_f64()))
}

#[derive(Debug, Serialize)]
struct DiscordAuthor {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct DiscordEmbed {
    title: String,
    color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<DiscordAuthor>,
}

#[derive(Debug, Serialize)]
struct DiscordWebhookPayload {
    username: &'static str,
    content: Option<String>,
    embeds: Vec<DiscordEmbed>,
}

impl DiscordWebhookPayload {
    fn from_alert(alert: &EarningsAlert) -> Self {
        let author = alert
            .company_title
            .clone()
            .or_else(|| alert.ticker.clone())
            .map(|name| DiscordAuthor {
                name,
                url: alert.quote_url(),
                icon_url: alert.logo_url(),
            });
        Self {
            username: USERNAME,
            content: None,
            embeds: vec![DiscordEmbed {
                title: alert.headline(),
                color: alert.outcome.color(),
                author,
            }],
        }
    }
}
