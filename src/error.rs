// src/error.rs
//! Typed errors for the feed boundary.
//!
//! Extraction never fails (absence is `None`), so the only hard failures the
//! core knows about come from turning an upstream batch into `RawPost`s.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    /// A post without an `id` cannot be ordered against the watermark.
    #[error("post at position {position} in batch has no id")]
    MissingPostId { position: usize },

    #[error("feed responded with HTTP {status}")]
    Status { status: u16 },

    #[error("feed payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),
}
