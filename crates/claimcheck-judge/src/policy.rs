use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use claimcheck_core::error::Error;

/// How readily the judge falls back to `Unknown`.
///
/// Evaluation variants map onto policies: `A` is [`JudgePolicy::Normal`],
/// `B` is [`JudgePolicy::Strict`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JudgePolicy {
    #[default]
    Normal,
    Strict,
}

impl JudgePolicy {
    pub fn variant(&self) -> &'static str {
        match self {
            JudgePolicy::Normal => "A",
            JudgePolicy::Strict => "B",
        }
    }
}

impl fmt::Display for JudgePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JudgePolicy::Normal => f.write_str("normal"),
            JudgePolicy::Strict => f.write_str("strict"),
        }
    }
}

impl FromStr for JudgePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "normal" => Ok(JudgePolicy::Normal),
            "b" | "strict" => Ok(JudgePolicy::Strict),
            other => Err(Error::InvalidConfig(format!("unknown judge variant '{other}' (expected A, B, normal or strict)"))),
        }
    }
}
