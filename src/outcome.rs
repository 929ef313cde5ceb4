// src/outcome.rs
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::extract::EarningsFact;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Beat,
    Miss,
    Unknown,
}

impl Outcome {
    /// Embed color as a 24-bit RGB integer.
    pub fn color(self) -> u32 {
        match self {
            Outcome::Beat => 0x008000,
            Outcome::Miss => 0xd42020,
            Outcome::Unknown => 0xaaaaaa,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Beat => "beat",
            Outcome::Miss => "miss",
            Outcome::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `Unknown` iff there is no consensus. Otherwise a strict `>` is a beat;
/// meeting consensus exactly counts as a miss.
pub fn classify(fact: &EarningsFact) -> Outcome {
    let Some(consensus) = fact.consensus_value() else {
        return Outcome::Unknown;
    };
    match fact.reported_value() {
        Some(reported) if reported > consensus => Outcome::Beat,
        _ => Outcome::Miss,
    }
}
