// tests/cursor_ordering.rs
use earnings_relay::{CursorState, FeedCursor, RawPost};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

fn batch(ids: &[u64]) -> Vec<RawPost> {
    ids.iter().map(|&id| RawPost::new(id, "")).collect()
}

fn ids(posts: &[RawPost]) -> Vec<u64> {
    posts.iter().map(|p| p.id).collect()
}

#[test]
fn prime_then_emit_in_order() {
    let mut c = FeedCursor::new();
    assert_eq!(c.state(), CursorState::Uninitialized);

    let first = c.ingest(batch(&[10, 7, 12]));
    assert!(first.fresh.is_empty());
    assert_eq!(first.watermark, Some(12));

    let second = c.ingest(batch(&[11, 13]));
    assert_eq!(ids(&second.fresh), vec![13]);
    assert_eq!(second.watermark, Some(13));
}

#[test]
fn newest_first_batch_is_emitted_oldest_first() {
    let mut c = FeedCursor::starting_after(100);
    let out = c.ingest(batch(&[105, 104, 103, 101, 99, 98]));
    assert_eq!(ids(&out.fresh), vec![101, 103, 104, 105]);
    assert_eq!(out.watermark, Some(105));
    assert_eq!(out.stale, 2);
}

#[test]
fn reappearing_posts_are_not_emitted_twice() {
    let mut c = FeedCursor::starting_after(0);
    let a = c.ingest(batch(&[3, 2, 1]));
    assert_eq!(ids(&a.fresh), vec![1, 2, 3]);
    let b = c.ingest(batch(&[5, 4, 3, 2]));
    assert_eq!(ids(&b.fresh), vec![4, 5]);
    let c2 = c.ingest(batch(&[5, 4]));
    assert!(c2.fresh.is_empty());
    assert_eq!(c.watermark(), Some(5));
}

/// Shuffled batches of mixed old and new ids, including empty ones.
#[test]
fn randomized_batches_hold_cursor_invariants() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..200 {
        let mut cursor = if rng.random_bool(0.5) {
            FeedCursor::new()
        } else {
            FeedCursor::starting_after(rng.random_range(0..50))
        };
        let mut emitted_total: Vec<u64> = Vec::new();
        let mut first_call = true;

        for _ in 0..20 {
            let len = rng.random_range(0..15);
            let mut raw: Vec<u64> = (0..len).map(|_| rng.random_range(0..200)).collect();
            raw.shuffle(&mut rng);

            let before = cursor.watermark();
            let was_uninit = cursor.state() == CursorState::Uninitialized;
            let out = cursor.ingest(batch(&raw));
            let emitted = ids(&out.fresh);

            if was_uninit {
                assert!(emitted.is_empty(), "uninitialized cursor emitted {emitted:?}");
            }
            if first_call && was_uninit && !raw.is_empty() {
                assert!(out.primed);
            }
            if let Some(w) = before {
                assert!(emitted.iter().all(|&id| id > w), "emitted {emitted:?} at or below {w}");
                assert!(out.watermark.unwrap() >= w, "watermark regressed");
            }
            assert!(emitted.windows(2).all(|p| p[0] < p[1]), "not strictly increasing: {emitted:?}");
            if let (Some(max), Some(w)) = (raw.iter().max(), out.watermark) {
                assert!(w >= *max);
            }
            assert_eq!(out.watermark, cursor.watermark());

            if !raw.is_empty() {
                first_call = false;
            }
            emitted_total.extend(emitted);
        }

        let mut deduped = emitted_total.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), emitted_total.len(), "a post was emitted twice");
    }
}
