//! Conflict policies for destinations that already exist.

use std::{fmt, str::FromStr};

use serde::Deserialize;
use thiserror::Error;

/// Behavior when a resolved destination already exists on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Refuse to write and report the existing destination.
    #[default]
    Fail,

    /// Leave the existing file untouched and log a warning.
    Skip,

    /// Write next to the existing file with a numeric `_N` suffix.
    Append,

    /// Remove the existing file before writing.
    Overwrite,
}

impl ConflictPolicy {
    /// Every policy, in declaration order.
    pub const ALL: [ConflictPolicy; 4] = [
        ConflictPolicy::Fail,
        ConflictPolicy::Skip,
        ConflictPolicy::Append,
        ConflictPolicy::Overwrite,
    ];

    /// Returns the token used for this policy in configuration and on the
    /// command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictPolicy::Fail => "fail",
            ConflictPolicy::Skip => "skip",
            ConflictPolicy::Append => "append",
            ConflictPolicy::Overwrite => "overwrite",
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unrecognized conflict-policy token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid conflict policy `{token}`, expected one of: fail, skip, append, overwrite")]
pub struct InvalidPolicy {
    token: String,
}

impl InvalidPolicy {
    /// The token that failed to parse.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl FromStr for ConflictPolicy {
    type Err = InvalidPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|policy| policy.as_str() == s)
            .ok_or_else(|| InvalidPolicy {
                token: s.to_string(),
            })
    }
}
