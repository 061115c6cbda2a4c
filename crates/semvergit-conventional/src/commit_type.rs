// Copyright (c) 2026 - present BDM Software
// SPDX-License-Identifier: MIT

//! The closed set of Conventional Commit change types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Classification of a commit under the Conventional Commits convention.
///
/// `Invalid` is the "could not classify" sentinel: a commit whose subject did
/// not carry a recognized type keyword still gets a classification, but it is
/// excluded from changelog grouping.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum CommitType {
    /// Could not be classified as any known type
    #[default]
    Invalid,
    /// New feature
    #[serde(rename = "feat")]
    Feat,
    /// Bug fix
    #[serde(rename = "fix")]
    Fix,
    /// Performance improvement
    #[serde(rename = "perf")]
    Perf,
    /// Code restructuring without behavior change
    #[serde(rename = "refactor")]
    Refactor,
    /// Test-only change
    #[serde(rename = "test")]
    Test,
    /// Maintenance chore
    #[serde(rename = "chore")]
    Chore,
    /// Build system change
    #[serde(rename = "build")]
    Build,
    /// Continuous-integration change
    #[serde(rename = "ci")]
    Ci,
    /// Documentation-only change
    #[serde(rename = "docs")]
    Docs,
    /// Revert of an earlier commit
    #[serde(rename = "revert")]
    Revert,
    /// Changelog housekeeping commit
    #[serde(rename = "changelog")]
    Changelog,
}

impl CommitType {
    /// Every commit type in declaration order.
    ///
    /// Changelog sections and commit statistics iterate in this order.
    pub const ALL: [CommitType; 12] = [
        CommitType::Invalid,
        CommitType::Feat,
        CommitType::Fix,
        CommitType::Perf,
        CommitType::Refactor,
        CommitType::Test,
        CommitType::Chore,
        CommitType::Build,
        CommitType::Ci,
        CommitType::Docs,
        CommitType::Revert,
        CommitType::Changelog,
    ];

    /// The keyword as it appears in commit subjects (e.g. `feat`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Invalid => "Invalid",
            CommitType::Feat => "feat",
            CommitType::Fix => "fix",
            CommitType::Perf => "perf",
            CommitType::Refactor => "refactor",
            CommitType::Test => "test",
            CommitType::Chore => "chore",
            CommitType::Build => "build",
            CommitType::Ci => "ci",
            CommitType::Docs => "docs",
            CommitType::Revert => "revert",
            CommitType::Changelog => "changelog",
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommitType {
    type Err = ();

    /// Parses a type keyword. Unknown keywords are an error so callers can
    /// fall back to [`CommitType::Invalid`] explicitly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Invalid" => Ok(CommitType::Invalid),
            "feat" => Ok(CommitType::Feat),
            "fix" => Ok(CommitType::Fix),
            "perf" => Ok(CommitType::Perf),
            "refactor" => Ok(CommitType::Refactor),
            "test" => Ok(CommitType::Test),
            "chore" => Ok(CommitType::Chore),
            "build" => Ok(CommitType::Build),
            "ci" => Ok(CommitType::Ci),
            "docs" => Ok(CommitType::Docs),
            "revert" => Ok(CommitType::Revert),
            "changelog" => Ok(CommitType::Changelog),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_display_roundtrip() {
        for commit_type in CommitType::ALL {
            let parsed: CommitType = commit_type.as_str().parse().expect("known keyword");
            assert_eq!(parsed, commit_type);
        }
    }

    #[test]
    fn test_unknown_keyword_is_error() {
        assert!("feature".parse::<CommitType>().is_err());
        assert!("FIX".parse::<CommitType>().is_err());
        assert!("".parse::<CommitType>().is_err());
    }

    #[test]
    fn test_declaration_order_starts_with_invalid() {
        assert_eq!(CommitType::ALL[0], CommitType::Invalid);
        assert_eq!(CommitType::ALL[1], CommitType::Feat);
        assert_eq!(CommitType::ALL[2], CommitType::Fix);
    }

    #[test]
    fn test_serde_uses_keyword_names() {
        let json = serde_json::to_string(&CommitType::Feat).expect("serialize");
        assert_eq!(json, "\"feat\"");
        let back: CommitType = serde_json::from_str("\"refactor\"").expect("deserialize");
        assert_eq!(back, CommitType::Refactor);
    }
}
