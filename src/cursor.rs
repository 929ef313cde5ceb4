// src/cursor.rs
use crate::feed::types::RawPost;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorState {
    /// No batch observed since start; the next non-empty batch only primes.
    #[default]
    Uninitialized,
    Active {
        watermark: u64,
    },
}

/// Result of one `ingest` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ingested {
    /// Posts newer than the previous watermark, strictly increasing by id.
    pub fresh: Vec<RawPost>,
    pub watermark: Option<u64>,
    /// True when this batch moved the cursor out of `Uninitialized`.
    pub primed: bool,
    /// Posts dropped as already seen (or repeated inside the batch).
    pub stale: usize,
}

/// Tracks the highest post id accounted for and turns unordered batches into
/// ordered runs of new posts.
/// - First non-empty batch after start emits nothing and sets the watermark
///   to its highest id (no backlog replay on restart).
/// - Later batches emit every post with `id > watermark`, ascending.
/// - Watermark is always the max id seen, never the max id emitted.
#[derive(Debug, Clone, Default)]
pub struct FeedCursor {
    state: CursorState,
}

impl FeedCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start active at a forced watermark; posts above it are replayed.
    pub fn starting_after(id: u64) -> Self {
        Self {
            state: CursorState::Active { watermark: id },
        }
    }

    pub fn from_override(forced: Option<u64>) -> Self {
        forced.map(Self::starting_after).unwrap_or_default()
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn watermark(&self) -> Option<u64> {
        match self.state {
            CursorState::Uninitialized => None,
            CursorState::Active { watermark } => Some(watermark),
        }
    }

    pub fn ingest(&mut self, batch: Vec<RawPost>) -> Ingested {
        let Some(batch_max) = batch.iter().map(|p| p.id).max() else {
            return Ingested {
                watermark: self.watermark(),
                ..Default::default()
            };
        };

        let watermark = match self.state {
            CursorState::Uninitialized => {
                self.state = CursorState::Active {
                    watermark: batch_max,
                };
                return Ingested {
                    fresh: Vec::new(),
                    watermark: Some(batch_max),
                    primed: true,
                    stale: batch.len(),
                };
            }
            CursorState::Active { watermark } => watermark,
        };

        let total = batch.len();
        let mut fresh: Vec<RawPost> = batch.into_iter().filter(|p| p.id > watermark).collect();
        fresh.sort_by_key(|p| p.id);
        fresh.dedup_by_key(|p| p.id);

        let next = watermark.max(batch_max);
        self.state = CursorState::Active { watermark: next };

        Ingested {
            stale: total - fresh.len(),
            fresh,
            watermark: Some(next),
            primed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(ids: &[u64]) -> Vec<RawPost> {
        ids.iter().map(|&id| RawPost::new(id, format!("post {id}"))).collect()
    }

    fn ids(posts: &[RawPost]) -> Vec<u64> {
        posts.iter().map(|p| p.id).collect()
    }

    #[test]
    fn first_batch_primes_without_emitting() {
        let mut c = FeedCursor::new();
        let out = c.ingest(batch(&[10, 7, 12]));
        assert!(out.fresh.is_empty());
        assert!(out.primed);
        assert_eq!(out.watermark, Some(12));
        assert_eq!(c.state(), CursorState::Active { watermark: 12 });
    }

    #[test]
    fn empty_batch_is_noop_in_both_states() {
        let mut c = FeedCursor::new();
        let out = c.ingest(Vec::new());
        assert_eq!(out, Ingested::default());
        assert_eq!(c.state(), CursorState::Uninitialized);

        let mut c = FeedCursor::starting_after(5);
        let out = c.ingest(Vec::new());
        assert_eq!(out.watermark, Some(5));
        assert!(out.fresh.is_empty());
    }

    #[test]
    fn duplicates_inside_batch_emitted_once() {
        let mut c = FeedCursor::starting_after(1);
        let out = c.ingest(batch(&[3, 2, 3, 2]));
        assert_eq!(ids(&out.fresh), vec![2, 3]);
        assert_eq!(out.stale, 2);
    }

    #[test]
    fn forced_override_replays() {
        let mut c = FeedCursor::from_override(Some(0));
        let out = c.ingest(batch(&[2, 1]));
        assert_eq!(ids(&out.fresh), vec![1, 2]);
        assert!(!out.primed);
    }

    #[test]
    fn stale_batch_keeps_watermark() {
        let mut c = FeedCursor::starting_after(50);
        let out = c.ingest(batch(&[40, 50, 12]));
        assert!(out.fresh.is_empty());
        assert_eq!(out.stale, 3);
        assert_eq!(c.watermark(), Some(50));
    }
}
