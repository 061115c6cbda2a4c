// Copyright (c) 2026 - present BDM Software
// SPDX-License-Identifier: MIT

//! Orchestration: history sync, version derivation, and release finalization.
//!
//! One run is a sequence of explicit steps against a repository and a
//! history store:
//!
//! 1. [`Orchestrator::sync`] pulls tags and commits into the store and
//!    partitions history into released versions bounded by semantic-version
//!    tags.
//! 2. [`Orchestrator::derive_next`] computes the unreleased next version
//!    from the commits after the latest tag.
//! 3. [`Orchestrator::write_changelog`] renders the Markdown changelog.
//! 4. [`Orchestrator::commit_release`] / [`Orchestrator::tag_release`] /
//!    [`Orchestrator::push_release`] finalize, each separately invokable and
//!    operator-confirmed.
//!
//! Progress is reported as plain status strings through an injected
//! callback, so a test can assert on the emitted sequence.

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use semvergit_conventional::{ConventionalCommit, SemanticVersion};
use semvergit_git::{Commit, Git, GitError, Tag};

use crate::changelog::{self, LinkTemplates};
use crate::store::{HistoryStore, StoreError};
use crate::version::{next_component, Version};

/// Orchestration errors
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Git gateway error
    #[error("git error: {0}")]
    Git(#[from] GitError),

    /// History store error
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Changelog file could not be written
    #[error("failed to write changelog: {0}")]
    ChangelogWrite(#[from] std::io::Error),

    /// A release step ran before the next version was derived
    #[error("no next version derived yet; run derive_next first")]
    NoNextVersion,

    /// Tagging ran before a release commit was created
    #[error("no release commit created yet; run commit_release first")]
    NoReleaseCommit,

    /// The release commit could not be read back after committing
    #[error("release commit could not be read back")]
    ReleaseCommitUnreadable,

    /// The created tag could not be read back
    #[error("release tag {name} could not be read back")]
    ReleaseTagUnreadable {
        /// The tag name
        name: String,
    },

    /// A semantic-version tag does not resolve to a commit
    #[error("tag {name} does not point at a commit")]
    TagWithoutCommit {
        /// The tag name
        name: String,
    },
}

/// Callback receiving human-readable status strings.
pub type StatusCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Counters from one sync run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Tags newly added to the store
    pub tags_added: usize,
    /// Commits newly added to the store
    pub commits_added: usize,
    /// Versions written during partitioning
    pub versions_recorded: usize,
}

/// Drives sync, derivation, and finalization against one repository.
pub struct Orchestrator {
    git: Git,
    store: Box<dyn HistoryStore>,
    status: Option<StatusCallback>,
    links: LinkTemplates,
    /// Versions loaded by the latest derivation, next version last
    pub versions: Vec<Version>,
    /// The derived unreleased version
    pub next_version: Option<Version>,
    release_commit: Option<Commit>,
}

impl Orchestrator {
    /// Creates an orchestrator over a repository gateway and a store. Link
    /// templates are derived from the repository's origin URL.
    #[must_use]
    pub fn new(git: Git, store: Box<dyn HistoryStore>) -> Self {
        let links = git
            .remote_origin_url()
            .map(|url| LinkTemplates::from_origin_url(&url))
            .unwrap_or_default();
        Self {
            git,
            store,
            status: None,
            links,
            versions: Vec::new(),
            next_version: None,
            release_commit: None,
        }
    }

    /// Attaches a status callback.
    #[must_use]
    pub fn with_status(mut self, status: StatusCallback) -> Self {
        self.status = Some(status);
        self
    }

    /// Overrides the link templates used for changelog rendering.
    pub fn set_link_templates(&mut self, links: LinkTemplates) {
        self.links = links;
    }

    fn report(&self, message: &str) {
        info!("{message}");
        if let Some(ref status) = self.status {
            status(message);
        }
    }

    // ========================================================================
    // Sync
    // ========================================================================

    /// Pulls all tags and commits from the repository into the store, then
    /// partitions history into versions bounded by semantic-version tags.
    ///
    /// Safe to re-run: every write is an idempotent upsert, so an
    /// interrupted sync resumes where it left off.
    ///
    /// # Errors
    ///
    /// Returns an error if a git query or a store write fails.
    pub fn sync(&mut self) -> Result<SyncStats, OrchestratorError> {
        let mut stats = SyncStats::default();

        self.report("Pruning tags");
        self.git.set_prune_tags();
        self.report("Fetching");
        self.git.fetch(true);

        self.report("Listing all tags");
        let tag_lines = self.git.list_all_tags()?;
        self.report("Adding tags to store");
        let mut semver_tags: Vec<Tag> = Vec::new();
        for tag_line in &tag_lines {
            let tag = if self.store.tag_exists(&tag_line.git_ref)? {
                self.store.tag(&tag_line.git_ref)?
            } else {
                let fetched = self.git.fetch_tag(&tag_line.git_ref)?;
                if let Some(ref tag) = fetched {
                    self.store.add_tag(tag)?;
                    stats.tags_added += 1;
                }
                fetched
            };
            if let Some(tag) = tag
                && tag.is_semantic_version_tag()
            {
                semver_tags.push(tag);
            }
        }

        self.report("Listing all commits");
        let commit_lines = self.git.list_all_commits()?;
        self.report("Adding commits to store");
        for commit_line in &commit_lines {
            if self.store.commit_exists(&commit_line.sha)? {
                continue;
            }
            if let Some(commit) = self.git.fetch_commit(&commit_line.sha)? {
                self.store.add_commit(&commit)?;
                stats.commits_added += 1;
            }
        }

        self.report("Gathering version commits");
        stats.versions_recorded = self.partition_versions(&mut semver_tags)?;
        Ok(stats)
    }

    /// Walks semantic-version tags in date order and writes one version per
    /// tag, bounded by the previous tag's commit.
    fn partition_versions(&mut self, semver_tags: &mut [Tag]) -> Result<usize, OrchestratorError> {
        let Some(first_commit) = self.git.first_commit()? else {
            return Ok(0);
        };
        semver_tags.sort_by_key(Tag::date);

        let mut recorded = 0;
        let mut previous_tag_commit: Option<String> = None;
        for tag in semver_tags.iter() {
            let Some(mut version) = Version::from_tag(tag.clone()) else {
                warn!(tag = %tag.name, "tag matches the version pattern but does not parse, skipping");
                continue;
            };
            let tag_commit = tag
                .commit
                .clone()
                .ok_or_else(|| OrchestratorError::TagWithoutCommit {
                    name: tag.name.clone(),
                })?;

            version.commits = match &previous_tag_commit {
                None if tag_commit.sha == first_commit.sha => vec![first_commit.clone()],
                None => {
                    let mut commits = self.range_commits(&first_commit.sha, &tag.git_ref)?;
                    commits.push(first_commit.clone());
                    commits.reverse();
                    commits.push(tag_commit.clone());
                    dedup_by_sha(commits)
                }
                Some(previous_sha) => {
                    let mut commits = self.range_commits(previous_sha, &tag.git_ref)?;
                    commits.reverse();
                    commits.push(tag_commit.clone());
                    dedup_by_sha(commits)
                }
            };

            // Re-syncing must not clobber notes written against an earlier
            // run of the same version.
            if let Some(existing) = self.store.version(&version.name).ok().flatten() {
                version.notes = existing.notes;
            }
            self.store.add_version(&version)?;
            recorded += 1;
            previous_tag_commit = Some(tag_commit.sha);
        }
        Ok(recorded)
    }

    /// Commits after `from_sha` up to the parent of what `to_ref` points at,
    /// newest first.
    fn range_commits(&self, from_sha: &str, to_ref: &str) -> Result<Vec<Commit>, OrchestratorError> {
        let commits: Result<Vec<Commit>, GitError> =
            self.git.commits_between(from_sha, to_ref)?.collect();
        Ok(commits?)
    }

    // ========================================================================
    // Derivation
    // ========================================================================

    /// Derives the next version from commits after the latest stored
    /// version's tag. Any breaking change bumps major, else any feature
    /// bumps minor, else patch; with no prior version the next version is
    /// fixed at `v1.0.0` over the entire history.
    ///
    /// # Errors
    ///
    /// Returns an error if a git query or a store read fails.
    pub fn derive_next(&mut self) -> Result<&Version, OrchestratorError> {
        self.report("Gathering versions");
        self.versions = self.store.versions()?;
        let max_version = self.store.max_version()?;

        let next = if let Some(max) = max_version
            && let Some(tag) = &max.tag
        {
            let tag_commit_sha = tag
                .commit
                .as_ref()
                .map(|commit| commit.sha.clone())
                .ok_or_else(|| OrchestratorError::TagWithoutCommit {
                    name: tag.name.clone(),
                })?;
            self.report("Gathering commits since last version");
            let commits: Result<Vec<Commit>, GitError> =
                self.git.commits_since(&tag_commit_sha)?.collect();
            let commits = commits?;
            self.report("Bumping version based on commits");
            let component = next_component(&commits);
            Version::next(max.semantic_version.bump(component), commits)
        } else {
            self.report("No versions found, defaulting to v1.0.0");
            let commits: Result<Vec<Commit>, GitError> = self.git.all_commits()?.collect();
            Version::next(SemanticVersion::new(1, 0, 0), commits?)
        };

        self.versions.push(next.clone());
        self.next_version = Some(next);
        match &self.next_version {
            Some(version) => Ok(version),
            None => Err(OrchestratorError::NoNextVersion),
        }
    }

    // ========================================================================
    // Changelog
    // ========================================================================

    /// Renders the changelog for every known version (including the derived
    /// next version when present).
    #[must_use]
    pub fn render_changelog(&self) -> String {
        changelog::render(&self.versions, &self.links)
    }

    /// Renders the changelog and writes it to the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_changelog(&self, path: &Path) -> Result<(), OrchestratorError> {
        self.report("Building changelog");
        std::fs::write(path, self.render_changelog())?;
        Ok(())
    }

    // ========================================================================
    // Finalization
    // ========================================================================

    /// Stages all working-tree changes and commits them with the given
    /// message.
    ///
    /// # Errors
    ///
    /// Returns an error if staging or committing fails.
    pub fn commit_release(
        &mut self,
        message: &ConventionalCommit,
    ) -> Result<Commit, OrchestratorError> {
        self.report("Staging changes");
        self.git.stage_all()?;
        self.report("Committing changes");
        let commit = self
            .git
            .commit(&message.message())?
            .ok_or(OrchestratorError::ReleaseCommitUnreadable)?;
        self.release_commit = Some(commit.clone());
        Ok(commit)
    }

    /// Creates the annotated tag for the derived version on the release
    /// commit and persists the now-released version.
    ///
    /// # Errors
    ///
    /// Returns an error when derivation or the release commit is missing, or
    /// when tagging fails.
    pub fn tag_release(&mut self) -> Result<Tag, OrchestratorError> {
        let Some(commit) = self.release_commit.clone() else {
            return Err(OrchestratorError::NoReleaseCommit);
        };
        let Some(mut next) = self.next_version.clone() else {
            return Err(OrchestratorError::NoNextVersion);
        };

        self.report("Tagging commit");
        let message = commit
            .conventional
            .as_ref()
            .and_then(|cc| cc.summary.clone())
            .unwrap_or_else(|| commit.subject.clone());
        let tag = self
            .git
            .create_annotated_tag(&next.name, &commit.sha, &message)?
            .ok_or_else(|| OrchestratorError::ReleaseTagUnreadable {
                name: next.name.clone(),
            })?;

        // The release commit itself belongs to the version being released.
        if !next.commits.iter().any(|existing| existing.sha == commit.sha) {
            next.commits.push(commit.clone());
        }
        next.tag = Some(tag.clone());
        if let Some(date) = tag.date() {
            next.release_date = date;
        }
        self.store.add_commit(&commit)?;
        self.store.add_version(&next)?;
        self.next_version = Some(next);
        Ok(tag)
    }

    /// Pushes the release commit and its tag upstream.
    ///
    /// # Errors
    ///
    /// Returns an error when derivation is missing or a push fails.
    pub fn push_release(&mut self) -> Result<(), OrchestratorError> {
        let Some(next) = &self.next_version else {
            return Err(OrchestratorError::NoNextVersion);
        };
        self.report("Pushing commit");
        self.git.push()?;
        self.report("Pushing tag");
        self.git.push_tag(&next.name)?;
        Ok(())
    }

    /// Commit statistics for the derived next version.
    #[must_use]
    pub fn next_version_stats(&self) -> Option<BTreeMap<String, usize>> {
        self.next_version.as_ref().map(Version::commit_stats)
    }

    /// The store, for read access after a run.
    #[must_use]
    pub fn store(&self) -> &dyn HistoryStore {
        self.store.as_ref()
    }
}

/// Deduplicates commits by SHA, keeping first occurrences in order.
fn dedup_by_sha(commits: Vec<Commit>) -> Vec<Commit> {
    let mut seen: Vec<String> = Vec::with_capacity(commits.len());
    let mut out = Vec::with_capacity(commits.len());
    for commit in commits {
        if !seen.contains(&commit.sha) {
            seen.push(commit.sha.clone());
            out.push(commit);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_dedup_by_sha_keeps_first() {
        let commits = vec![
            Commit {
                sha: "a".repeat(40),
                subject: "first".to_string(),
                ..Default::default()
            },
            Commit {
                sha: "b".repeat(40),
                ..Default::default()
            },
            Commit {
                sha: "a".repeat(40),
                subject: "duplicate".to_string(),
                ..Default::default()
            },
        ];
        let deduped = dedup_by_sha(commits);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].subject, "first");
    }

    #[test]
    fn test_sync_stats_default() {
        let stats = SyncStats::default();
        assert_eq!(stats.tags_added, 0);
        assert_eq!(stats.commits_added, 0);
        assert_eq!(stats.versions_recorded, 0);
    }
}
