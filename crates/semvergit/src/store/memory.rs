// Copyright (c) 2026 - present BDM Software
// SPDX-License-Identifier: MIT

//! In-memory history store.
//!
//! Nothing is persisted; this adapter exists so orchestration logic can be
//! exercised in tests without touching the filesystem.

use std::collections::BTreeMap;

use semvergit_git::{Commit, Contributor, Tag};

use crate::store::{
    compare_version_names, newest_by_date, HistoryStore, StoreError, StoredVersion,
};
use crate::version::Version;

/// A [`HistoryStore`] backed by plain maps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    contributors: BTreeMap<String, Contributor>,
    commits: BTreeMap<String, Commit>,
    tags: BTreeMap<String, Tag>,
    versions: BTreeMap<String, StoredVersion>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn hydrate(&self, stored: StoredVersion) -> Result<Version, StoreError> {
        let tag = stored
            .tag_ref
            .as_deref()
            .and_then(|git_ref| self.tags.get(git_ref))
            .cloned();
        let mut commits = Vec::with_capacity(stored.commit_shas.len());
        for sha in &stored.commit_shas {
            let commit = self
                .commits
                .get(sha)
                .ok_or_else(|| StoreError::UnresolvedCommit {
                    version: stored.name.clone(),
                    sha: sha.clone(),
                })?;
            commits.push(commit.clone());
        }
        Ok(stored.hydrate(tag, commits))
    }

    fn sorted_version_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.versions.keys().cloned().collect();
        names.sort_by(|a, b| compare_version_names(a, b));
        names
    }
}

impl HistoryStore for MemoryStore {
    fn add_contributor(&mut self, name: &str, email: &str) -> Result<(), StoreError> {
        self.contributors.insert(
            email.to_string(),
            Contributor {
                name: name.to_string(),
                email: email.to_string(),
            },
        );
        Ok(())
    }

    fn add_commit(&mut self, commit: &Commit) -> Result<(), StoreError> {
        for contributor in commit.contributors.values() {
            self.add_contributor(&contributor.name, &contributor.email)?;
        }
        self.commits.insert(commit.sha.clone(), commit.clone());
        Ok(())
    }

    fn commit(&self, sha: &str) -> Result<Option<Commit>, StoreError> {
        Ok(self.commits.get(sha).cloned())
    }

    fn commit_exists(&self, sha: &str) -> Result<bool, StoreError> {
        Ok(self.commits.contains_key(sha))
    }

    fn newest_commit(&self) -> Result<Option<Commit>, StoreError> {
        Ok(newest_by_date(self.commits.values()).cloned())
    }

    fn add_tag(&mut self, tag: &Tag) -> Result<(), StoreError> {
        if let Some(commit) = &tag.commit {
            self.add_commit(commit)?;
        }
        for contributor in tag.contributors.values() {
            self.add_contributor(&contributor.name, &contributor.email)?;
        }
        self.tags.insert(tag.git_ref.clone(), tag.clone());
        Ok(())
    }

    fn tag(&self, git_ref: &str) -> Result<Option<Tag>, StoreError> {
        Ok(self.tags.get(git_ref).cloned())
    }

    fn tag_exists(&self, git_ref: &str) -> Result<bool, StoreError> {
        Ok(self.tags.contains_key(git_ref))
    }

    fn max_tag(&self) -> Result<Option<Tag>, StoreError> {
        Ok(self
            .tags
            .values()
            .max_by(|a, b| super::compare_tags(a, b))
            .cloned())
    }

    fn tags(&self) -> Result<Vec<Tag>, StoreError> {
        let mut tags: Vec<Tag> = self.tags.values().cloned().collect();
        tags.sort_by(super::compare_tags);
        Ok(tags)
    }

    fn add_version(&mut self, version: &Version) -> Result<(), StoreError> {
        if let Some(tag) = &version.tag {
            self.add_tag(tag)?;
        }
        self.versions
            .insert(version.name.clone(), StoredVersion::snapshot(version));
        Ok(())
    }

    fn version(&self, name: &str) -> Result<Option<Version>, StoreError> {
        match self.versions.get(name) {
            Some(stored) => Ok(Some(self.hydrate(stored.clone())?)),
            None => Ok(None),
        }
    }

    fn version_exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.versions.contains_key(name))
    }

    fn max_version(&self) -> Result<Option<Version>, StoreError> {
        match self.sorted_version_names().last() {
            Some(name) => self.version(name),
            None => Ok(None),
        }
    }

    fn version_count(&self) -> Result<usize, StoreError> {
        Ok(self.versions.len())
    }

    fn versions(&self) -> Result<Vec<Version>, StoreError> {
        let mut versions = Vec::with_capacity(self.versions.len());
        for name in self.sorted_version_names() {
            if let Some(version) = self.version(&name)? {
                versions.push(version);
            }
        }
        Ok(versions)
    }
}
