// Copyright (c) 2026 - present BDM Software
// SPDX-License-Identifier: MIT

//! Strict `v{major}.{minor}.{patch}` semantic-version value type.
//!
//! Unlike commit-message classification, version names are machine-facing:
//! malformed input is rejected loudly, never coerced.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from semantic-version parsing
#[derive(Debug, Error)]
pub enum SemverError {
    /// The text is not a well-formed `v{major}.{minor}.{patch}` name
    #[error("invalid semantic version: {text}")]
    Invalid {
        /// The text that failed to parse
        text: String,
    },
}

/// Which component of a semantic version to increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    /// Breaking change: increments major, zeroes minor and patch
    Major,
    /// Additive feature: increments minor, zeroes patch
    Minor,
    /// Fix only: increments patch
    Patch,
}

/// A `v{major}.{minor}.{patch}` semantic version.
///
/// `name` is always the canonical rendering of the three components; the two
/// can never disagree because parsing rejects any text that does not
/// reconstruct to itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticVersion {
    /// Canonical name, e.g. `v1.2.3`
    pub name: String,
    /// Major component
    pub major: u64,
    /// Minor component
    pub minor: u64,
    /// Patch component
    pub patch: u64,
}

impl SemanticVersion {
    /// Builds a version from its components with the canonical name.
    #[must_use]
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            name: format!("v{major}.{minor}.{patch}"),
            major,
            minor,
            patch,
        }
    }

    /// Parses a version name with an optional leading `v`.
    ///
    /// Accepts exactly three numeric dot-separated components, or four where
    /// the fourth is a legacy build/revision number; in both cases the input
    /// must reconstruct byte-for-byte from the parsed components (so leading
    /// zeroes and stray whitespace are rejected).
    ///
    /// # Errors
    ///
    /// Returns [`SemverError::Invalid`] for anything else.
    pub fn parse(text: &str) -> Result<Self, SemverError> {
        let invalid = || SemverError::Invalid {
            text: text.to_string(),
        };
        let bare = text.strip_prefix('v').unwrap_or(text);
        let components: Vec<&str> = bare.split('.').collect();
        if components.len() != 3 && components.len() != 4 {
            return Err(invalid());
        }
        let mut numbers = Vec::with_capacity(components.len());
        for component in &components {
            numbers.push(component.parse::<u64>().map_err(|_| invalid())?);
        }
        let version = Self::new(numbers[0], numbers[1], numbers[2]);
        let reconstructed = match components.len() {
            3 => version.name.clone(),
            _ => format!("{}.{}", version.name, numbers[3]),
        };
        if format!("v{bare}") != reconstructed {
            return Err(invalid());
        }
        Ok(version)
    }

    /// Returns a new version with the given component incremented.
    ///
    /// Major zeroes minor and patch; minor zeroes patch; patch leaves the
    /// other components untouched. The receiver is never mutated.
    #[must_use]
    pub fn bump(&self, component: Component) -> Self {
        match component {
            Component::Major => Self::new(self.major + 1, 0, 0),
            Component::Minor => Self::new(self.major, self.minor + 1, 0),
            Component::Patch => Self::new(self.major, self.minor, self.patch + 1),
        }
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for SemanticVersion {
    type Err = SemverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Ord for SemanticVersion {
    /// Numeric component-wise ordering, so `v10.0.0` sorts above `v9.0.0`.
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
