// src/feed/stocktwits.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use std::time::Duration;

use crate::error::FeedError;
use crate::feed::parse_stream;
use crate::feed::types::{FeedSource, RawPost};

pub const DEFAULT_FEED_URL: &str = "https://api.stocktwits.com/api/2/streams/user/epsguid.json";
pub const DEFAULT_FEED_LIMIT: u32 = 21;

// The stream endpoint rejects obvious non-browser clients.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:122.0) Gecko/20100101 Firefox/122.0";

/// User stream provider for StockTwits.
pub struct StockTwitsFeed {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        url: String,
        limit: u32,
        client: reqwest::Client,
    },
}

impl StockTwitsFeed {
    pub fn from_url(url: impl Into<String>, limit: u32) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()
            .context("building feed http client")?;
        Ok(Self {
            mode: Mode::Http {
                url: url.into(),
                limit,
                client,
            },
        })
    }

    /// Serve a fixed JSON payload on every fetch.
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    fn parse(body: &str) -> Result<Vec<RawPost>> {
        let t0 = std::time::Instant::now();
        let posts = parse_stream(body).context("parsing stocktwits stream")?;
        histogram!("relay_feed_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(posts)
    }
}

#[async_trait]
impl FeedSource for StockTwitsFeed {
    async fn fetch_batch(&self) -> Result<Vec<RawPost>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse(s),
            Mode::Http { url, limit, client } => {
                tracing::info!(target: "feed", %url, "getting latest messages");
                let limit = limit.to_string();
                let resp = client
                    .get(url.as_str())
                    .query(&[("filter", "all"), ("limit", limit.as_str())])
                    .send()
                    .await
                    .map_err(FeedError::from)
                    .context("stocktwits http get()")?;

                let status = resp.status();
                if !status.is_success() {
                    return Err(FeedError::Status {
                        status: status.as_u16(),
                    })
                    .context("stocktwits http status");
                }

                let body = resp
                    .text()
                    .await
                    .map_err(FeedError::from)
                    .context("stocktwits http .text()")?;
                Self::parse(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "StockTwits"
    }
}
