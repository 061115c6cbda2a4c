// Copyright (c) 2026 - present BDM Software
// SPDX-License-Identifier: MIT

//! Commit and contributor types.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use semvergit_conventional::ConventionalCommit;

/// The capacity a person acted in on a commit or tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContributorRole {
    /// Wrote the change
    Author,
    /// Recorded the change in history
    Committer,
    /// Created an annotated tag
    Tagger,
}

impl ContributorRole {
    /// Every role, commit roles first.
    pub const ALL: [ContributorRole; 3] = [
        ContributorRole::Author,
        ContributorRole::Committer,
        ContributorRole::Tagger,
    ];

    /// The role name as stored and displayed.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ContributorRole::Author => "Author",
            ContributorRole::Committer => "Committer",
            ContributorRole::Tagger => "Tagger",
        }
    }

    /// Parses a stored role name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Author" => Some(ContributorRole::Author),
            "Committer" => Some(ContributorRole::Committer),
            "Tagger" => Some(ContributorRole::Tagger),
            _ => None,
        }
    }
}

impl fmt::Display for ContributorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A person identified by name and email.
///
/// Contributors have no identity of their own beyond the email; they are
/// embedded by value in the role maps of commits and tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    /// Display name, possibly blank
    pub name: String,
    /// Email address, possibly blank
    pub email: String,
}

impl Contributor {
    /// True when both name and email are blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty()
    }
}

/// A commit as read from repository history.
///
/// Immutable once fetched: the SHA never changes, and re-fetching only ever
/// replaces the record wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Full 40-character commit SHA, the unique key
    pub sha: String,
    /// Subject line of the commit message
    pub subject: String,
    /// Remaining message body, empty when absent
    pub body: String,
    /// Contributors by role (author, committer)
    pub contributors: BTreeMap<ContributorRole, Contributor>,
    /// Timestamps by role
    pub contributor_dates: BTreeMap<ContributorRole, DateTime<FixedOffset>>,
    /// Conventional Commit classification, `None` for merge commits and
    /// empty subjects
    pub conventional: Option<ConventionalCommit>,
}

impl Commit {
    /// Validate that a SHA is a valid 40-character hex string
    #[must_use]
    pub fn is_valid_sha(sha: &str) -> bool {
        sha.len() == 40 && sha.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Get the short SHA (first 7 characters)
    #[must_use]
    pub fn short_sha(&self) -> &str {
        &self.sha[..7.min(self.sha.len())]
    }

    /// The commit's timestamp: author date, falling back to committer date.
    #[must_use]
    pub fn date(&self) -> Option<DateTime<FixedOffset>> {
        self.contributor_dates
            .get(&ContributorRole::Author)
            .or_else(|| self.contributor_dates.get(&ContributorRole::Committer))
            .copied()
    }

    /// True when the commit carries a usable Conventional Commit
    /// classification.
    #[must_use]
    pub fn is_conventional(&self) -> bool {
        self.conventional.as_ref().is_some_and(|cc| !cc.is_empty())
    }

    /// The full message as subject, blank line, body.
    #[must_use]
    pub fn message(&self) -> String {
        format!("{}\n\n{}", self.subject, self.body)
    }
}
