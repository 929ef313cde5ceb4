// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod cursor;
pub mod error;
pub mod extract;
pub mod feed;
pub mod metrics;
pub mod notify;
pub mod outcome;
pub mod relay;
pub mod schedule;

// ---- Re-exports for stable public API ----
pub use crate::config::RelayConfig;
pub use crate::cursor::{CursorState, FeedCursor, Ingested};
pub use crate::error::FeedError;
pub use crate::extract::{extract, EarningsFact, Figure};
pub use crate::feed::types::{FeedSource, RawPost};
pub use crate::notify::{EarningsAlert, Notifier, NotifierMux};
pub use crate::outcome::{classify, Outcome};
pub use crate::relay::{CycleReport, Relay};
