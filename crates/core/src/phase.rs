//! Lifecycle phase reported by the backup controller.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Phase of a backup-family object. The controller owns transitions; this
/// client only reads and writes the value.
///
/// Values the client does not know are kept verbatim in `Other` so they
/// survive a decode/encode cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Phase {
    New,
    FailedValidation,
    InProgress,
    Completed,
    Enabled,
    Failed,
    Other(String),
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Phase::New => "New",
            Phase::FailedValidation => "FailedValidation",
            Phase::InProgress => "InProgress",
            Phase::Completed => "Completed",
            Phase::Enabled => "Enabled",
            Phase::Failed => "Failed",
            Phase::Other(s) => s,
        }
    }

    pub fn is_completed(&self) -> bool { matches!(self, Phase::Completed) }

    /// Space-separated rendering, e.g. `InProgress` -> `In Progress`.
    pub fn friendly(&self) -> String { friendly_phase(self.as_str()) }
}

impl FromStr for Phase {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "New" => Phase::New,
            "FailedValidation" => Phase::FailedValidation,
            "InProgress" => Phase::InProgress,
            "Completed" => Phase::Completed,
            "Enabled" => Phase::Enabled,
            "Failed" => Phase::Failed,
            other => Phase::Other(other.to_string()),
        })
    }
}

impl From<String> for Phase {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(p) => p,
            Err(never) => match never {},
        }
    }
}

impl From<Phase> for String {
    fn from(p: Phase) -> Self {
        match p {
            Phase::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a PascalCase phase into words.
///
/// A boundary sits before an uppercase letter that follows a lowercase one,
/// or before an uppercase letter preceded by another uppercase letter and
/// followed by a lowercase one, so capital runs stay together
/// (`ABCDef` -> `ABC Def`). Only ASCII letters count as cased.
pub fn friendly_phase(phase: &str) -> String {
    let chars: Vec<char> = phase.chars().collect();
    let mut out = String::with_capacity(phase.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_ascii_uppercase() {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            let lower_upper = prev.is_ascii_lowercase();
            let run_end = prev.is_ascii_uppercase() && next.map_or(false, |n| n.is_ascii_lowercase());
            if lower_upper || run_end {
                out.push(' ');
            }
        }
        out.push(c);
    }
    out
}
