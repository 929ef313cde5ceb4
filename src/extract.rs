// src/extract.rs
//! Earnings extraction from free-text posts.
//!
//! Every field is found by a small, ordered set of named matchers:
//! - ticker:    `$SYMBOL` at position 0 of the body
//! - reported:  loss phrasing first (`reported a loss of $N`), then gain
//!              phrasing (`reported [earnings of] $N`, `($N)` is a loss)
//! - consensus: `consensus was $N` or `consensus was ($N)` (negative)
//!
//! The first matcher whose pattern matches decides the field; later clauses
//! and later `$N` tokens are ignored. Nothing here fails: a missing or
//! unparseable figure is `None`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

/// A numeric figure together with its canonical two-decimal text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub value: f64,
    pub text: String,
}

impl Figure {
    /// Build a figure from a captured numeral (`\d+(\.\d+)?`).
    /// Returns `None` when the numeral does not parse to a finite number.
    pub fn from_numeral(numeral: &str, negative: bool) -> Option<Self> {
        let abs: f64 = numeral.parse().ok().filter(|v: &f64| v.is_finite())?;
        let body = two_decimals(numeral);
        Some(if negative {
            Self {
                value: -abs,
                text: format!("-{body}"),
            }
        } else {
            Self {
                value: abs,
                text: body,
            }
        })
    }
}

/// Render a numeral with exactly two fractional digits.
/// Extra digits are cut, not rounded; missing ones are padded with `0`.
fn two_decimals(numeral: &str) -> String {
    let (int, frac) = numeral.split_once('.').unwrap_or((numeral, ""));
    let int = match int.trim_start_matches('0') {
        "" => "0",
        s => s,
    };
    let mut frac: String = frac.chars().take(2).collect();
    while frac.len() < 2 {
        frac.push('0');
    }
    format!("{int}.{frac}")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EarningsFact {
    pub ticker: Option<String>,
    pub reported: Option<Figure>,
    pub consensus: Option<Figure>,
}

impl EarningsFact {
    pub fn reported_value(&self) -> Option<f64> {
        self.reported.as_ref().map(|f| f.value)
    }

    pub fn reported_text(&self) -> Option<&str> {
        self.reported.as_ref().map(|f| f.text.as_str())
    }

    pub fn consensus_value(&self) -> Option<f64> {
        self.consensus.as_ref().map(|f| f.value)
    }

    pub fn consensus_text(&self) -> Option<&str> {
        self.consensus.as_ref().map(|f| f.text.as_str())
    }

    /// Posts without a reported figure are never published.
    pub fn is_reportable(&self) -> bool {
        self.reported.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    /// Always negative (loss phrasing).
    Negative,
    /// Negative only when the numeral is wrapped in parentheses.
    ParenthesesNegate,
}

struct Matcher {
    name: &'static str,
    re: Regex,
    sign: Sign,
}

impl Matcher {
    fn new(name: &'static str, pattern: &str, sign: Sign) -> Self {
        Self {
            name,
            re: Regex::new(pattern).expect("extract matcher regex"),
            sign,
        }
    }

    fn figure(&self, caps: &Captures<'_>) -> Option<Figure> {
        let numeral = caps.name("num")?.as_str();
        let negative = match self.sign {
            Sign::Negative => true,
            Sign::ParenthesesNegate => caps.name("open").is_some(),
        };
        Figure::from_numeral(numeral, negative)
    }
}

/// Ordered: loss before gain.
static REPORTED: Lazy<[Matcher; 2]> = Lazy::new(|| {
    [
        Matcher::new(
            "loss",
            r"reported\s+a\s+loss\s+of\s+\(?\$(?P<num>\d+(?:\.\d+)?)",
            Sign::Negative,
        ),
        Matcher::new(
            "gain",
            r"reported\s+(?:earnings\s+of\s+)?(?P<open>\()?\$(?P<num>\d+(?:\.\d+)?)",
            Sign::ParenthesesNegate,
        ),
    ]
});

static CONSENSUS: Lazy<Matcher> = Lazy::new(|| {
    Matcher::new(
        "consensus",
        r"consensus\s+was\s+(?P<open>\()?\$?(?P<num>\d+(?:\.\d+)?)",
        Sign::ParenthesesNegate,
    )
});

static TICKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\$(?P<sym>[A-Z]+)").expect("ticker regex"));

/// Leading `$SYMBOL`, uppercased. `None` unless the body starts with `$`.
pub fn extract_ticker(body: &str) -> Option<String> {
    TICKER
        .captures(body)
        .and_then(|c| c.name("sym"))
        .map(|m| m.as_str().to_ascii_uppercase())
}

/// Reported figure: the first matcher (in precedence order) whose pattern
/// matches decides. A loss clause anywhere in the body beats a gain clause.
pub fn extract_reported(body: &str) -> Option<Figure> {
    REPORTED.iter().find_map(|m| {
        let caps = m.re.captures(body)?;
        tracing::trace!(target: "extract", matcher = m.name, "reported clause matched");
        Some(m.figure(&caps))
    })?
}

pub fn extract_consensus(body: &str) -> Option<Figure> {
    let caps = CONSENSUS.re.captures(body)?;
    tracing::trace!(target: "extract", matcher = CONSENSUS.name, "consensus clause matched");
    CONSENSUS.figure(&caps)
}

pub fn extract(body: &str) -> EarningsFact {
    EarningsFact {
        ticker: extract_ticker(body),
        reported: extract_reported(body),
        consensus: extract_consensus(body),
    }
}
