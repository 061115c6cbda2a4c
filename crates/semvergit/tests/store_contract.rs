// Copyright (c) 2026 - present BDM Software
// SPDX-License-Identifier: MIT

//! Behavioral contract shared by every history-store backend.
//!
//! The orchestrator depends only on the `HistoryStore` trait, so the SQLite,
//! JSON, and in-memory adapters must be indistinguishable through it. Each
//! check below runs against all three.


use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};

use semvergit::store::{HistoryStore, JsonStore, MemoryStore, SqliteStore};
use semvergit::version::Version;
use semvergit_conventional::{ConventionalCommit, SemanticVersion};
use semvergit_git::{Commit, Contributor, ContributorRole, Tag};
use test_utils::TempTestDir;

fn each_backend(test_name: &str, check: impl Fn(&mut dyn HistoryStore)) {
    let mut memory = MemoryStore::new();
    check(&mut memory);

    let mut sqlite = SqliteStore::in_memory().expect("create sqlite store");
    check(&mut sqlite);

    let dir = TempTestDir::new(test_name);
    let mut json = JsonStore::open(dir.path()).expect("create json store");
    check(&mut json);
}

fn sample_commit(seed: char, subject: &str, body: &str, day: u32) -> Commit {
    let mut commit = Commit {
        sha: seed.to_string().repeat(40),
        subject: subject.to_string(),
        body: body.to_string(),
        ..Default::default()
    };
    commit.contributors.insert(
        ContributorRole::Author,
        Contributor {
            name: "Test Author".to_string(),
            email: "test@example.com".to_string(),
        },
    );
    commit.contributor_dates.insert(
        ContributorRole::Author,
        Utc.with_ymd_and_hms(2026, 1, day, 12, 0, 0)
            .unwrap()
            .fixed_offset(),
    );
    commit.conventional = ConventionalCommit::parse(subject, body);
    commit
}

fn sample_tag(name: &str, commit: Commit) -> Tag {
    let mut tag = Tag {
        git_ref: format!("refs/tags/{name}"),
        sha: "f".repeat(40),
        name: name.to_string(),
        commit: Some(commit),
        subject: format!("release {name}"),
        ..Default::default()
    };
    tag.contributors.insert(
        ContributorRole::Tagger,
        Contributor {
            name: "Test Tagger".to_string(),
            email: "tagger@example.com".to_string(),
        },
    );
    tag.contributor_dates.insert(
        ContributorRole::Tagger,
        Utc.with_ymd_and_hms(2026, 1, 20, 12, 0, 0)
            .unwrap()
            .fixed_offset(),
    );
    tag
}

#[test]
fn contract_commit_roundtrip() {
    each_backend("commit_roundtrip", |store| {
        let commit = sample_commit('a', "feat(api): add endpoint", "Fixes #12, #34", 1);
        store.add_commit(&commit).expect("add");
        let loaded = store.commit(&commit.sha).expect("read").expect("exists");
        assert_eq!(loaded, commit);
        assert!(store.commit_exists(&commit.sha).expect("exists"));
        assert!(!store.commit_exists(&"9".repeat(40)).expect("exists"));
    });
}

#[test]
fn contract_commit_upsert_replaces() {
    each_backend("commit_upsert", |store| {
        let mut commit = sample_commit('a', "feat: before", "", 1);
        store.add_commit(&commit).expect("add");
        store.add_commit(&commit).expect("re-add identical");

        commit.subject = "feat: after".to_string();
        commit.conventional = ConventionalCommit::parse(&commit.subject, "");
        store.add_commit(&commit).expect("replace");

        let loaded = store.commit(&commit.sha).expect("read").expect("exists");
        assert_eq!(loaded.subject, "feat: after");
    });
}

#[test]
fn contract_newest_commit() {
    each_backend("newest_commit", |store| {
        store
            .add_commit(&sample_commit('a', "feat: older", "", 1))
            .expect("add");
        store
            .add_commit(&sample_commit('b', "feat: newer", "", 15))
            .expect("add");
        let newest = store.newest_commit().expect("read").expect("exists");
        assert_eq!(newest.sha, "b".repeat(40));
    });
}

#[test]
fn contract_tag_roundtrip_and_pointed_commit() {
    each_backend("tag_roundtrip", |store| {
        let commit = sample_commit('a', "feat: first", "", 1);
        let tag = sample_tag("v1.0.0", commit.clone());
        store.add_tag(&tag).expect("add");

        let loaded = store.tag(&tag.git_ref).expect("read").expect("exists");
        assert_eq!(loaded, tag);
        assert!(store.tag_exists(&tag.git_ref).expect("exists"));
        // Adding the tag made its pointed commit resolvable too.
        assert!(store.commit_exists(&commit.sha).expect("exists"));
    });
}

#[test]
fn contract_max_tag_numeric() {
    each_backend("max_tag", |store| {
        for (seed, name) in [('a', "v9.0.0"), ('b', "v10.0.0"), ('c', "v2.0.0")] {
            let tag = sample_tag(name, sample_commit(seed, "feat: x", "", 1));
            store.add_tag(&tag).expect("add");
        }
        let max = store.max_tag().expect("read").expect("exists");
        assert_eq!(max.name, "v10.0.0");
        let names: Vec<String> = store
            .tags()
            .expect("read")
            .into_iter()
            .map(|tag| tag.name)
            .collect();
        assert_eq!(names, vec!["v2.0.0", "v9.0.0", "v10.0.0"]);
    });
}

#[test]
fn contract_version_resolves_commits_by_sha() {
    each_backend("version_resolve", |store| {
        let first = sample_commit('a', "feat: first", "", 1);
        let second = sample_commit('b', "fix: second", "", 2);
        store.add_commit(&first).expect("add");
        store.add_commit(&second).expect("add");

        let mut version = Version::next(
            SemanticVersion::new(1, 1, 0),
            vec![first.clone(), second.clone()],
        );
        version.tag = Some(sample_tag("v1.1.0", second.clone()));
        version.notes = BTreeMap::from([(1, "Note one.".to_string())]);
        store.add_version(&version).expect("add");

        let loaded = store.version("v1.1.0").expect("read").expect("exists");
        assert_eq!(loaded.commits, vec![first, second]);
        assert_eq!(loaded.notes[&1], "Note one.");
        assert!(loaded.tag.is_some());
        assert!(store.version_exists("v1.1.0").expect("exists"));
        assert_eq!(store.version_count().expect("count"), 1);
    });
}

#[test]
fn contract_version_upsert_is_idempotent() {
    each_backend("version_upsert", |store| {
        let commit = sample_commit('a', "feat: first", "", 1);
        store.add_commit(&commit).expect("add");
        let version = Version::next(SemanticVersion::new(1, 0, 0), vec![commit]);

        store.add_version(&version).expect("first add");
        store.add_version(&version).expect("second add");

        assert_eq!(store.version_count().expect("count"), 1);
        let loaded = store.version("v1.0.0").expect("read").expect("exists");
        assert_eq!(loaded.commits.len(), 1);
    });
}

#[test]
fn contract_max_version_numeric() {
    each_backend("max_version", |store| {
        for (seed, major) in [('a', 9u64), ('b', 10)] {
            let commit = sample_commit(seed, "feat: x", "", 1);
            store.add_commit(&commit).expect("add");
            let version = Version::next(SemanticVersion::new(major, 0, 0), vec![commit]);
            store.add_version(&version).expect("add");
        }
        let max = store.max_version().expect("read").expect("exists");
        assert_eq!(max.name, "v10.0.0");
        let names: Vec<String> = store
            .versions()
            .expect("read")
            .into_iter()
            .map(|version| version.name)
            .collect();
        assert_eq!(names, vec!["v9.0.0", "v10.0.0"]);
    });
}

#[test]
fn contract_contributors_keyed_by_email() {
    each_backend("contributors", |store| {
        store
            .add_contributor("First Name", "person@example.com")
            .expect("add");
        // Same email with a new display name replaces, never duplicates.
        store
            .add_contributor("Second Name", "person@example.com")
            .expect("replace");
    });
}
