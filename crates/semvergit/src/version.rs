// Copyright (c) 2026 - present BDM Software
// SPDX-License-Identifier: MIT

//! The version aggregate: a semantic version bound to its commit range.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};
use semvergit_conventional::{CommitType, Component, SemanticVersion};
use semvergit_git::{Commit, Tag};

/// Stats bucket for commits carrying a breaking-change notice.
pub const STAT_BREAKING_CHANGE: &str = "BreakingChange";

/// Stats bucket for commits without a usable classification.
pub const STAT_NON_CONVENTIONAL: &str = "NonConventionalCommit";

/// A released (or about-to-be-released) version and the commits it spans.
///
/// A finalized version's commit list covers everything after the previous
/// semantic-version tag's commit through this version's tag commit. The
/// in-progress "next" version has no tag until the operator commits and tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Version {
    /// Canonical semantic-version name, the unique key
    pub name: String,
    /// The parsed semantic version
    pub semantic_version: SemanticVersion,
    /// The tag marking this version, `None` while unreleased
    pub tag: Option<Tag>,
    /// Commits belonging to this version
    pub commits: Vec<Commit>,
    /// When the version was released (tag date, or derivation time for the
    /// unreleased next version)
    pub release_date: DateTime<FixedOffset>,
    /// Free-text markdown notes by sequence number
    pub notes: BTreeMap<i64, String>,
}

impl Version {
    /// Builds a released version from its semantic-version tag.
    ///
    /// Returns `None` when the tag name does not parse as a strict
    /// `v{major}.{minor}.{patch}` version (e.g. pre-release suffixes).
    #[must_use]
    pub fn from_tag(tag: Tag) -> Option<Self> {
        let semantic_version = SemanticVersion::parse(&tag.name).ok()?;
        let release_date = tag.date().unwrap_or_else(now);
        Some(Self {
            name: semantic_version.name.clone(),
            semantic_version,
            tag: Some(tag),
            commits: Vec::new(),
            release_date,
            notes: BTreeMap::new(),
        })
    }

    /// Builds the unreleased "next" version.
    #[must_use]
    pub fn next(semantic_version: SemanticVersion, commits: Vec<Commit>) -> Self {
        Self {
            name: semantic_version.name.clone(),
            semantic_version,
            tag: None,
            commits,
            release_date: now(),
            notes: BTreeMap::new(),
        }
    }

    /// Counts commits per classification: one bucket per [`CommitType`],
    /// plus breaking-change and non-conventional totals.
    #[must_use]
    pub fn commit_stats(&self) -> BTreeMap<String, usize> {
        let mut stats = BTreeMap::new();
        stats.insert(
            STAT_BREAKING_CHANGE.to_string(),
            self.commits
                .iter()
                .filter(|commit| {
                    commit.is_conventional()
                        && commit
                            .conventional
                            .as_ref()
                            .is_some_and(|cc| cc.is_breaking_change())
                })
                .count(),
        );
        for commit_type in CommitType::ALL {
            stats.insert(
                commit_type.as_str().to_string(),
                self.commits_of_type(commit_type).count(),
            );
        }
        stats.insert(
            STAT_NON_CONVENTIONAL.to_string(),
            self.commits
                .iter()
                .filter(|commit| !commit.is_conventional())
                .count(),
        );
        stats
    }

    /// Classified commits of the given type.
    pub fn commits_of_type(&self, commit_type: CommitType) -> impl Iterator<Item = &Commit> {
        self.commits.iter().filter(move |commit| {
            commit.is_conventional()
                && commit
                    .conventional
                    .as_ref()
                    .is_some_and(|cc| cc.commit_type == commit_type)
        })
    }
}

/// Decides the next version bump from the unreleased commits: any breaking
/// change bumps major, else any feature bumps minor, else patch.
#[must_use]
pub fn next_component(commits: &[Commit]) -> Component {
    let breaking = commits.iter().any(|commit| {
        commit.is_conventional()
            && commit
                .conventional
                .as_ref()
                .is_some_and(|cc| cc.is_breaking_change())
    });
    if breaking {
        return Component::Major;
    }
    let feature = commits.iter().any(|commit| {
        commit.is_conventional()
            && commit
                .conventional
                .as_ref()
                .is_some_and(|cc| cc.commit_type == CommitType::Feat)
    });
    if feature {
        Component::Minor
    } else {
        Component::Patch
    }
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}
