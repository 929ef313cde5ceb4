// src/feed/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::FeedError;

/// One post from the upstream feed, already validated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawPost {
    pub id: u64,
    pub body: String,
    pub author_title: Option<String>, // company display name, e.g. "Apple Inc"
}

impl RawPost {
    pub fn new(id: u64, body: impl Into<String>) -> Self {
        Self {
            id,
            body: body.into(),
            author_title: None,
        }
    }

    pub fn with_author_title(mut self, title: impl Into<String>) -> Self {
        self.author_title = Some(title.into());
        self
    }

    /// Validate a wire post. `position` is the index inside its batch and is
    /// only used to name the offending item in the error.
    pub fn try_from_wire(wire: WirePost, position: usize) -> Result<Self, FeedError> {
        let id = wire.id.ok_or(FeedError::MissingPostId { position })?;
        let author_title = wire
            .symbols
            .into_iter()
            .find_map(|s| s.title)
            .filter(|t| !t.trim().is_empty());
        Ok(Self {
            id,
            body: super::normalize_body(wire.body.as_deref().unwrap_or_default()),
            author_title,
        })
    }
}

/// Upstream message shape; everything optional so validation happens in one place.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WirePost {
    pub id: Option<u64>,
    pub body: Option<String>,
    #[serde(default)]
    pub symbols: Vec<WireSymbol>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct WireSymbol {
    pub symbol: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct WireStream {
    #[serde(default)]
    pub messages: Vec<WirePost>,
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_batch(&self) -> Result<Vec<RawPost>>;
    fn name(&self) -> &'static str;
}
