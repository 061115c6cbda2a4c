// Copyright (c) 2026 - present BDM Software
// SPDX-License-Identifier: MIT

//! Flat-document history store.
//!
//! Each collection lives in one pretty-printed JSON file under the data
//! directory (`contributors.json`, `commits.json`, `tags.json`,
//! `versions.json`). The whole collection is loaded on open and rewritten on
//! every mutation, which is plenty for a single-operator batch tool.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use semvergit_git::{Commit, Contributor, Tag};

use crate::store::{
    compare_version_names, newest_by_date, HistoryStore, StoreError, StoredVersion,
};
use crate::version::Version;

/// A [`HistoryStore`] backed by one JSON document per collection.
#[derive(Debug)]
pub struct JsonStore {
    contributors_path: PathBuf,
    commits_path: PathBuf,
    tags_path: PathBuf,
    versions_path: PathBuf,
    contributors: Vec<Contributor>,
    commits: Vec<Commit>,
    tags: Vec<Tag>,
    versions: Vec<StoredVersion>,
}

impl JsonStore {
    /// Opens the store rooted at the given directory, creating the directory
    /// and empty collection documents as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or a document
    /// cannot be read or parsed.
    pub fn open(directory: impl AsRef<Path>) -> Result<Self, StoreError> {
        let directory = directory.as_ref();
        fs::create_dir_all(directory)?;
        let mut store = Self {
            contributors_path: directory.join("contributors.json"),
            commits_path: directory.join("commits.json"),
            tags_path: directory.join("tags.json"),
            versions_path: directory.join("versions.json"),
            contributors: Vec::new(),
            commits: Vec::new(),
            tags: Vec::new(),
            versions: Vec::new(),
        };
        store.contributors = load_or_init(&store.contributors_path)?;
        store.commits = load_or_init(&store.commits_path)?;
        store.tags = load_or_init(&store.tags_path)?;
        store.versions = load_or_init(&store.versions_path)?;
        Ok(store)
    }

    fn save_contributors(&self) -> Result<(), StoreError> {
        save(&self.contributors_path, &self.contributors)
    }

    fn save_commits(&self) -> Result<(), StoreError> {
        save(&self.commits_path, &self.commits)
    }

    fn save_tags(&self) -> Result<(), StoreError> {
        save(&self.tags_path, &self.tags)
    }

    fn save_versions(&self) -> Result<(), StoreError> {
        save(&self.versions_path, &self.versions)
    }

    fn upsert_contributor(&mut self, name: &str, email: &str) {
        match self
            .contributors
            .iter_mut()
            .find(|contributor| contributor.email == email)
        {
            Some(existing) => existing.name = name.to_string(),
            None => self.contributors.push(Contributor {
                name: name.to_string(),
                email: email.to_string(),
            }),
        }
    }

    fn upsert_commit(&mut self, commit: &Commit) {
        for contributor in commit.contributors.values() {
            self.upsert_contributor(&contributor.name, &contributor.email);
        }
        match self
            .commits
            .iter_mut()
            .find(|existing| existing.sha == commit.sha)
        {
            Some(existing) => *existing = commit.clone(),
            None => self.commits.push(commit.clone()),
        }
    }

    fn upsert_tag(&mut self, tag: &Tag) {
        if let Some(commit) = &tag.commit {
            self.upsert_commit(commit);
        }
        for contributor in tag.contributors.values() {
            self.upsert_contributor(&contributor.name, &contributor.email);
        }
        match self
            .tags
            .iter_mut()
            .find(|existing| existing.git_ref == tag.git_ref)
        {
            Some(existing) => *existing = tag.clone(),
            None => self.tags.push(tag.clone()),
        }
    }

    fn hydrate(&self, stored: StoredVersion) -> Result<Version, StoreError> {
        let tag = stored.tag_ref.as_deref().and_then(|git_ref| {
            self.tags
                .iter()
                .find(|tag| tag.git_ref == git_ref)
                .cloned()
        });
        let mut commits = Vec::with_capacity(stored.commit_shas.len());
        for sha in &stored.commit_shas {
            let commit = self
                .commits
                .iter()
                .find(|commit| &commit.sha == sha)
                .ok_or_else(|| StoreError::UnresolvedCommit {
                    version: stored.name.clone(),
                    sha: sha.clone(),
                })?;
            commits.push(commit.clone());
        }
        Ok(stored.hydrate(tag, commits))
    }

    fn sorted_versions(&self) -> Vec<&StoredVersion> {
        let mut versions: Vec<&StoredVersion> = self.versions.iter().collect();
        versions.sort_by(|a, b| compare_version_names(&a.name, &b.name));
        versions
    }
}

fn load_or_init<T: Serialize + DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    if !path.exists() {
        save(path, &T::default())?;
    }
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn save<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

impl HistoryStore for JsonStore {
    fn add_contributor(&mut self, name: &str, email: &str) -> Result<(), StoreError> {
        self.upsert_contributor(name, email);
        self.save_contributors()
    }

    fn add_commit(&mut self, commit: &Commit) -> Result<(), StoreError> {
        self.upsert_commit(commit);
        self.save_contributors()?;
        self.save_commits()
    }

    fn commit(&self, sha: &str) -> Result<Option<Commit>, StoreError> {
        Ok(self
            .commits
            .iter()
            .find(|commit| commit.sha == sha)
            .cloned())
    }

    fn commit_exists(&self, sha: &str) -> Result<bool, StoreError> {
        Ok(self.commits.iter().any(|commit| commit.sha == sha))
    }

    fn newest_commit(&self) -> Result<Option<Commit>, StoreError> {
        Ok(newest_by_date(self.commits.iter()).cloned())
    }

    fn add_tag(&mut self, tag: &Tag) -> Result<(), StoreError> {
        self.upsert_tag(tag);
        self.save_contributors()?;
        self.save_commits()?;
        self.save_tags()
    }

    fn tag(&self, git_ref: &str) -> Result<Option<Tag>, StoreError> {
        Ok(self
            .tags
            .iter()
            .find(|tag| tag.git_ref == git_ref)
            .cloned())
    }

    fn tag_exists(&self, git_ref: &str) -> Result<bool, StoreError> {
        Ok(self.tags.iter().any(|tag| tag.git_ref == git_ref))
    }

    fn max_tag(&self) -> Result<Option<Tag>, StoreError> {
        Ok(self
            .tags
            .iter()
            .max_by(|a, b| super::compare_tags(a, b))
            .cloned())
    }

    fn tags(&self) -> Result<Vec<Tag>, StoreError> {
        let mut tags = self.tags.clone();
        tags.sort_by(super::compare_tags);
        Ok(tags)
    }

    fn add_version(&mut self, version: &Version) -> Result<(), StoreError> {
        if let Some(tag) = &version.tag {
            self.upsert_tag(tag);
        }
        let stored = StoredVersion::snapshot(version);
        match self
            .versions
            .iter_mut()
            .find(|existing| existing.name == stored.name)
        {
            Some(existing) => *existing = stored,
            None => self.versions.push(stored),
        }
        self.save_contributors()?;
        self.save_commits()?;
        self.save_tags()?;
        self.save_versions()
    }

    fn version(&self, name: &str) -> Result<Option<Version>, StoreError> {
        match self.versions.iter().find(|version| version.name == name) {
            Some(stored) => Ok(Some(self.hydrate(stored.clone())?)),
            None => Ok(None),
        }
    }

    fn version_exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.versions.iter().any(|version| version.name == name))
    }

    fn max_version(&self) -> Result<Option<Version>, StoreError> {
        match self.sorted_versions().last() {
            Some(stored) => Ok(Some(self.hydrate((*stored).clone())?)),
            None => Ok(None),
        }
    }

    fn version_count(&self) -> Result<usize, StoreError> {
        Ok(self.versions.len())
    }

    fn versions(&self) -> Result<Vec<Version>, StoreError> {
        let sorted: Vec<StoredVersion> = self
            .sorted_versions()
            .into_iter()
            .cloned()
            .collect();
        let mut versions = Vec::with_capacity(sorted.len());
        for stored in sorted {
            versions.push(self.hydrate(stored)?);
        }
        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;
    use std::sync::atomic::{AtomicU32, Ordering};

    static DIR_COUNTER: AtomicU32 = AtomicU32::new(0);

    struct ScratchDir {
        path: PathBuf,
    }

    impl ScratchDir {
        fn new(name: &str) -> Self {
            let counter = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
            let path = std::env::temp_dir().join(format!(
                "semvergit-json-{name}-{}-{counter}",
                std::process::id()
            ));
            fs::create_dir_all(&path).expect("create scratch dir");
            Self { path }
        }
    }

    impl Drop for ScratchDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.path);
        }
    }

    #[test]
    fn test_open_creates_documents() {
        let dir = ScratchDir::new("open");
        let _store = JsonStore::open(&dir.path).expect("open");
        for file in [
            "contributors.json",
            "commits.json",
            "tags.json",
            "versions.json",
        ] {
            assert!(dir.path.join(file).exists(), "{file} should exist");
        }
    }

    #[test]
    fn test_commit_survives_reopen() {
        let dir = ScratchDir::new("reopen");
        let commit = Commit {
            sha: "a".repeat(40),
            subject: "feat: persisted".to_string(),
            ..Default::default()
        };
        {
            let mut store = JsonStore::open(&dir.path).expect("open");
            store.add_commit(&commit).expect("add");
        }
        let store = JsonStore::open(&dir.path).expect("reopen");
        let loaded = store.commit(&commit.sha).expect("read").expect("exists");
        assert_eq!(loaded, commit);
    }

    #[test]
    fn test_add_commit_is_idempotent() {
        let dir = ScratchDir::new("idempotent");
        let mut store = JsonStore::open(&dir.path).expect("open");
        let commit = Commit {
            sha: "b".repeat(40),
            subject: "fix: once".to_string(),
            ..Default::default()
        };
        store.add_commit(&commit).expect("first add");
        store.add_commit(&commit).expect("second add");
        assert_eq!(store.commits.len(), 1);
    }

    #[test]
    fn test_add_commit_replaces_content() {
        let dir = ScratchDir::new("replace");
        let mut store = JsonStore::open(&dir.path).expect("open");
        let mut commit = Commit {
            sha: "c".repeat(40),
            subject: "fix: before".to_string(),
            ..Default::default()
        };
        store.add_commit(&commit).expect("add");
        commit.subject = "fix: after".to_string();
        store.add_commit(&commit).expect("replace");
        let loaded = store.commit(&commit.sha).expect("read").expect("exists");
        assert_eq!(loaded.subject, "fix: after");
        assert_eq!(store.commits.len(), 1);
    }
}
