// Copyright (c) 2026 - present BDM Software
// SPDX-License-Identifier: MIT

//! Durable history storage.
//!
//! The orchestrator persists commits, tags, and derived versions through the
//! [`HistoryStore`] trait and never names a concrete backend. Three adapters
//! implement it with identical semantics: a relational SQLite store, a
//! flat JSON-document store, and an in-memory store for tests.
//!
//! All writes are idempotent upserts keyed by SHA (commits), ref (tags), and
//! name (versions): re-adding identical content leaves the store observably
//! unchanged, re-adding different content replaces the old record entirely.
//! Versions snapshot their commits as a list of SHAs and re-resolve them
//! against the commit store at read time.

pub mod json;
pub mod memory;
pub mod migrations;
pub mod sqlite;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use semvergit_conventional::SemanticVersion;
use semvergit_git::{Commit, Tag};

use crate::version::Version;

pub use json::JsonStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] migrations::MigrationError),

    /// JSON document (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A version's commit SHA could not be resolved against the commit store
    #[error("version {version} references unknown commit {sha}")]
    UnresolvedCommit {
        /// The version whose commit list is broken
        version: String,
        /// The SHA that could not be found
        sha: String,
    },

    /// A stored timestamp is not valid ISO 8601
    #[error("invalid stored timestamp: {text}")]
    InvalidTimestamp {
        /// The text that failed to parse
        text: String,
    },
}

/// Key-addressed storage for commits, tags, and derived versions.
pub trait HistoryStore {
    /// Upserts a contributor keyed by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn add_contributor(&mut self, name: &str, email: &str) -> Result<(), StoreError>;

    /// Upserts a commit keyed by SHA, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn add_commit(&mut self, commit: &Commit) -> Result<(), StoreError>;

    /// Fetches one commit by SHA.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn commit(&self, sha: &str) -> Result<Option<Commit>, StoreError>;

    /// Fetches many commits, skipping SHAs that are not stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn commits(&self, shas: &[String]) -> Result<Vec<Commit>, StoreError> {
        let mut found = Vec::with_capacity(shas.len());
        for sha in shas {
            if let Some(commit) = self.commit(sha)? {
                found.push(commit);
            }
        }
        Ok(found)
    }

    /// True when a commit with the SHA is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn commit_exists(&self, sha: &str) -> Result<bool, StoreError>;

    /// The stored commit with the latest resolved date.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn newest_commit(&self) -> Result<Option<Commit>, StoreError>;

    /// Upserts a tag keyed by ref, replacing any previous record. The commit
    /// the tag points at is upserted as well so the reference always
    /// resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn add_tag(&mut self, tag: &Tag) -> Result<(), StoreError>;

    /// Fetches one tag by fully qualified ref.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn tag(&self, git_ref: &str) -> Result<Option<Tag>, StoreError>;

    /// True when a tag with the ref is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn tag_exists(&self, git_ref: &str) -> Result<bool, StoreError>;

    /// The greatest stored tag by version-aware name ordering.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn max_tag(&self) -> Result<Option<Tag>, StoreError>;

    /// All stored tags in version-aware name order.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn tags(&self) -> Result<Vec<Tag>, StoreError>;

    /// Upserts a version keyed by name, snapshotting its commits as SHAs.
    /// The version's tag (when present) is upserted too.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn add_version(&mut self, version: &Version) -> Result<(), StoreError>;

    /// Fetches one version by name, re-expanding its commit SHAs into full
    /// commits.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnresolvedCommit`] when a snapshotted SHA no
    /// longer resolves.
    fn version(&self, name: &str) -> Result<Option<Version>, StoreError>;

    /// True when a version with the name is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn version_exists(&self, name: &str) -> Result<bool, StoreError>;

    /// The greatest stored version by version-aware name ordering.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn max_version(&self) -> Result<Option<Version>, StoreError>;

    /// Number of stored versions.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn version_count(&self) -> Result<usize, StoreError>;

    /// All stored versions in version-aware name order.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn versions(&self) -> Result<Vec<Version>, StoreError>;
}

/// Orders names numerically when both parse as semantic versions; semantic
/// versions sort above everything else, and unparseable names fall back to
/// plain string ordering among themselves.
#[must_use]
pub fn compare_version_names(a: &str, b: &str) -> Ordering {
    match (SemanticVersion::parse(a), SemanticVersion::parse(b)) {
        (Ok(left), Ok(right)) => left.cmp(&right),
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Ok(_)) => Ordering::Less,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Orders tags by name, version-aware.
pub(crate) fn compare_tags(a: &Tag, b: &Tag) -> Ordering {
    compare_version_names(&a.name, &b.name)
}

/// The persisted shape of a [`Version`]: commits are stored by SHA, the tag
/// by ref.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoredVersion {
    pub name: String,
    pub semantic_version: SemanticVersion,
    pub tag_ref: Option<String>,
    pub commit_shas: Vec<String>,
    pub release_date: DateTime<FixedOffset>,
    pub notes: BTreeMap<i64, String>,
}

impl StoredVersion {
    /// Snapshots a version, deduplicating the commit SHA list while keeping
    /// first-occurrence order.
    pub fn snapshot(version: &Version) -> Self {
        let mut commit_shas: Vec<String> = Vec::with_capacity(version.commits.len());
        for commit in &version.commits {
            if !commit_shas.contains(&commit.sha) {
                commit_shas.push(commit.sha.clone());
            }
        }
        Self {
            name: version.name.clone(),
            semantic_version: version.semantic_version.clone(),
            tag_ref: version.tag.as_ref().map(|tag| tag.git_ref.clone()),
            commit_shas,
            release_date: version.release_date,
            notes: version.notes.clone(),
        }
    }

    /// Rebuilds the full version from resolved parts.
    pub fn hydrate(self, tag: Option<Tag>, commits: Vec<Commit>) -> Version {
        Version {
            name: self.name,
            semantic_version: self.semantic_version,
            tag,
            commits,
            release_date: self.release_date,
            notes: self.notes,
        }
    }
}

/// Picks the commit with the greatest resolved date from an iterator.
pub(crate) fn newest_by_date<'a>(commits: impl Iterator<Item = &'a Commit>) -> Option<&'a Commit> {
    commits
        .filter(|commit| commit.date().is_some())
        .max_by_key(|commit| commit.date())
}
