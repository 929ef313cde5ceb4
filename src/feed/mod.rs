// src/feed/mod.rs
pub mod stocktwits;
pub mod types;

use crate::error::FeedError;
use crate::feed::types::{RawPost, WireStream};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Normalize a post body for extraction: decode HTML entities and fold
/// whitespace runs into a single space.
///
/// Nothing is trimmed: the ticker rule anchors at position 0, so a body that
/// starts with whitespace must keep failing that rule.
pub fn normalize_body(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);
    RE_WS.replace_all(&decoded, " ").into_owned()
}

/// Parse a stream payload (`{"messages": [...]}`) into validated posts.
///
/// A single post without an id refuses the whole batch; ingesting the rest
/// could move the watermark past the broken post.
pub fn parse_stream(json: &str) -> Result<Vec<RawPost>, FeedError> {
    let stream: WireStream = serde_json::from_str(json)?;
    stream
        .messages
        .into_iter()
        .enumerate()
        .map(|(position, wire)| RawPost::try_from_wire(wire, position))
        .collect()
}
