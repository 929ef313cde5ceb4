// src/notify/mod.rs
pub mod discord;
pub mod slack;

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::config::RelayConfig;
use crate::extract::EarningsFact;
use crate::feed::types::RawPost;
use crate::outcome::{classify, Outcome};

pub use discord::DiscordNotifier;
pub use slack::SlackNotifier;

const LOGO_URL_BASE: &str = "https://s3.amazonaws.com/logos.atom.finance/stocks-and-funds";
const QUOTE_URL_BASE: &str = "https://finance.yahoo.com/quote";

/// Everything a sink needs to render one earnings notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarningsAlert {
    pub post_id: u64,
    pub ticker: Option<String>,
    pub outcome: Outcome,
    pub reported_text: String,
    pub consensus_text: Option<String>,
    pub company_title: Option<String>,
}

impl EarningsAlert {
    /// `None` when the post carries no reported figure.
    pub fn from_post(post: &RawPost, fact: &EarningsFact) -> Option<Self> {
        let reported_text = fact.reported_text()?.to_string();
        Some(Self {
            post_id: post.id,
            ticker: fact.ticker.clone(),
            outcome: classify(fact),
            reported_text,
            consensus_text: fact.consensus_text().map(str::to_string),
            company_title: post.author_title.clone(),
        })
    }

    fn subject(&self) -> &str {
        self.ticker
            .as_deref()
            .or(self.company_title.as_deref())
            .unwrap_or("Unknown")
    }

    /// e.g. `AAPL: $1.20 vs. $1.10 expected`, or `AAPL: $1.20 reported`
    /// when the post has no consensus.
    pub fn headline(&self) -> String {
        match &self.consensus_text {
            Some(c) => format!("{}: ${} vs. ${} expected", self.subject(), self.reported_text, c),
            None => format!("{}: ${} reported", self.subject(), self.reported_text),
        }
    }

    pub fn logo_url(&self) -> Option<String> {
        self.ticker
            .as_ref()
            .map(|t| format!("{LOGO_URL_BASE}/{t}.png"))
    }

    pub fn quote_url(&self) -> Option<String> {
        self.ticker
            .as_ref()
            .map(|t| format!("{QUOTE_URL_BASE}/{t}/"))
    }
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, alert: &EarningsAlert) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Fans one alert out to every configured sink.
#[derive(Default)]
pub struct NotifierMux {
    sinks: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(cfg: &RelayConfig) -> Self {
        let mut mux = Self::new();
        if let Some(url) = &cfg.webhook_url {
            mux.push(DiscordNotifier::new(url.clone()).with_timeout(cfg.notify_timeout_secs));
        }
        if let Some(url) = &cfg.slack_webhook_url {
            mux.push(SlackNotifier::new(url.clone()).with_timeout(cfg.notify_timeout_secs));
        }
        mux
    }

    pub fn push<N: Notifier + 'static>(&mut self, sink: N) {
        self.sinks.push(Box::new(sink));
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

#[async_trait::async_trait]
impl Notifier for NotifierMux {
    /// Every sink is attempted; the send fails if any sink failed.
    async fn send(&self, alert: &EarningsAlert) -> Result<()> {
        if self.sinks.is_empty() {
            tracing::info!(headline = %alert.headline(), "no notifier configured, alert logged only");
            return Ok(());
        }

        let mut failed = Vec::new();
        for sink in &self.sinks {
            if let Err(e) = sink.send(alert).await {
                tracing::warn!(error = ?e, notifier = sink.name(), post_id = alert.post_id, "notifier error");
                failed.push(sink.name());
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(anyhow!(
                "{} of {} notifiers failed: {}",
                failed.len(),
                self.sinks.len(),
                failed.join(", ")
            ))
        }
    }

    fn name(&self) -> &'static str {
        "mux"
    }
}
