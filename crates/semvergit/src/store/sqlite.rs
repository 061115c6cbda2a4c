// Copyright (c) 2026 - present BDM Software
// SPDX-License-Identifier: MIT

//! Relational history store on SQLite.
//!
//! Commits, tags, and versions are normalized across tables with surrogate
//! keys; multi-valued relationships (contributor roles, issue references,
//! version commit lists) live in join tables. Upserts replace the parent row
//! and rewrite its child rows inside one transaction.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use rusqlite::{params, Connection, OptionalExtension, Transaction};

use semvergit_conventional::{CommitType, ConventionalCommit, SemanticVersion};
use semvergit_git::{Commit, Contributor, ContributorRole, Tag};

use crate::store::{
    compare_version_names, migrations, HistoryStore, StoreError, StoredVersion,
};
use crate::version::Version;

/// A [`HistoryStore`] backed by a SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) a database file and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Creates an in-memory database, mainly for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or migrated.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        migrations::migrate(&conn)?;
        Ok(Self { conn })
    }

    /// The current schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    pub fn schema_version(&self) -> Result<i32, StoreError> {
        Ok(migrations::get_version(&self.conn)?)
    }

    /// The underlying connection, for advanced queries.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ========================================================================
    // Write helpers
    // ========================================================================

    fn upsert_contributor(
        tx: &Transaction<'_>,
        name: &str,
        email: &str,
    ) -> Result<i64, StoreError> {
        tx.execute(
            "INSERT INTO contributors (name, email) VALUES (?1, ?2)
             ON CONFLICT(email) DO UPDATE SET name = excluded.name",
            params![name, email],
        )?;
        let id = tx.query_row(
            "SELECT id FROM contributors WHERE email = ?1",
            [email],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn write_commit(tx: &Transaction<'_>, commit: &Commit) -> Result<(), StoreError> {
        tx.execute(
            "INSERT INTO commits (sha, subject, body) VALUES (?1, ?2, ?3)
             ON CONFLICT(sha) DO UPDATE SET subject = excluded.subject, body = excluded.body",
            params![commit.sha, commit.subject, commit.body],
        )?;
        let commit_id: i64 = tx.query_row(
            "SELECT id FROM commits WHERE sha = ?1",
            [&commit.sha],
            |row| row.get(0),
        )?;

        tx.execute(
            "DELETE FROM commit_contributors WHERE commit_id = ?1",
            [commit_id],
        )?;
        for (role, contributor) in &commit.contributors {
            let Some(date) = commit.contributor_dates.get(role) else {
                continue;
            };
            let contributor_id =
                Self::upsert_contributor(tx, &contributor.name, &contributor.email)?;
            tx.execute(
                "INSERT INTO commit_contributors (commit_id, contributor_id, role, date)
                 VALUES (?1, ?2, ?3, ?4)",
                params![commit_id, contributor_id, role.as_str(), date.to_rfc3339()],
            )?;
        }

        tx.execute(
            "DELETE FROM conventional_commits WHERE commit_id = ?1",
            [commit_id],
        )?;
        if let Some(cc) = &commit.conventional
            && !cc.is_empty()
        {
            tx.execute(
                "INSERT INTO conventional_commits
                     (commit_id, commit_type, scope, summary, description, breaking_change)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    commit_id,
                    cc.commit_type.as_str(),
                    cc.scope,
                    cc.summary,
                    cc.description,
                    cc.breaking_change
                ],
            )?;
            let conventional_id: i64 = tx.query_row(
                "SELECT id FROM conventional_commits WHERE commit_id = ?1",
                [commit_id],
                |row| row.get(0),
            )?;
            if let Some(references) = &cc.references {
                for (seq, text) in references.iter().enumerate() {
                    tx.execute(
                        "INSERT INTO commit_references (conventional_commit_id, seq, text)
                         VALUES (?1, ?2, ?3)",
                        params![conventional_id, seq as i64, text],
                    )?;
                }
            }
        }
        Ok(())
    }

    fn write_tag(tx: &Transaction<'_>, tag: &Tag) -> Result<(), StoreError> {
        if let Some(commit) = &tag.commit {
            Self::write_commit(tx, commit)?;
        }
        let commit_sha = tag
            .commit
            .as_ref()
            .map(|commit| commit.sha.clone())
            .unwrap_or_default();
        tx.execute(
            "INSERT INTO tags (git_ref, sha, name, commit_sha, subject, body)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(git_ref) DO UPDATE SET
                 sha = excluded.sha,
                 name = excluded.name,
                 commit_sha = excluded.commit_sha,
                 subject = excluded.subject,
                 body = excluded.body",
            params![tag.git_ref, tag.sha, tag.name, commit_sha, tag.subject, tag.body],
        )?;
        let tag_id: i64 = tx.query_row(
            "SELECT id FROM tags WHERE git_ref = ?1",
            [&tag.git_ref],
            |row| row.get(0),
        )?;

        tx.execute("DELETE FROM tag_contributors WHERE tag_id = ?1", [tag_id])?;
        for (role, contributor) in &tag.contributors {
            let Some(date) = tag.contributor_dates.get(role) else {
                continue;
            };
            let contributor_id =
                Self::upsert_contributor(tx, &contributor.name, &contributor.email)?;
            tx.execute(
                "INSERT INTO tag_contributors (tag_id, contributor_id, role, date)
                 VALUES (?1, ?2, ?3, ?4)",
                params![tag_id, contributor_id, role.as_str(), date.to_rfc3339()],
            )?;
        }
        Ok(())
    }

    // ========================================================================
    // Read helpers
    // ========================================================================

    fn read_commit(conn: &Connection, sha: &str) -> Result<Option<Commit>, StoreError> {
        let row = conn
            .query_row(
                "SELECT id, sha, subject, body FROM commits WHERE sha = ?1",
                [sha],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;
        let Some((commit_id, sha, subject, body)) = row else {
            return Ok(None);
        };

        let mut commit = Commit {
            sha,
            subject,
            body,
            ..Default::default()
        };
        let (contributors, dates) = Self::read_roles(
            conn,
            "SELECT cc.role, c.name, c.email, cc.date
             FROM commit_contributors cc
             JOIN contributors c ON c.id = cc.contributor_id
             WHERE cc.commit_id = ?1",
            commit_id,
        )?;
        commit.contributors = contributors;
        commit.contributor_dates = dates;
        commit.conventional = Self::read_conventional(conn, commit_id)?;
        Ok(Some(commit))
    }

    #[allow(clippy::type_complexity)]
    fn read_roles(
        conn: &Connection,
        query: &str,
        owner_id: i64,
    ) -> Result<
        (
            BTreeMap<ContributorRole, Contributor>,
            BTreeMap<ContributorRole, DateTime<FixedOffset>>,
        ),
        StoreError,
    > {
        let mut contributors = BTreeMap::new();
        let mut dates = BTreeMap::new();
        let mut stmt = conn.prepare(query)?;
        let rows = stmt.query_map([owner_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;
        for row in rows {
            let (role_name, name, email, date_text) = row?;
            let Some(role) = ContributorRole::from_name(&role_name) else {
                continue;
            };
            contributors.insert(role, Contributor { name, email });
            dates.insert(role, parse_stored_date(&date_text)?);
        }
        Ok((contributors, dates))
    }

    fn read_conventional(
        conn: &Connection,
        commit_id: i64,
    ) -> Result<Option<ConventionalCommit>, StoreError> {
        let row = conn
            .query_row(
                "SELECT id, commit_type, scope, summary, description, breaking_change
                 FROM conventional_commits WHERE commit_id = ?1",
                [commit_id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, Option<String>>(5)?,
                    ))
                },
            )
            .optional()?;
        let Some((conventional_id, type_text, scope, summary, description, breaking_change)) = row
        else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT text FROM commit_references
             WHERE conventional_commit_id = ?1 ORDER BY seq",
        )?;
        let references: Vec<String> = stmt
            .query_map([conventional_id], |row| row.get(0))?
            .collect::<Result<_, _>>()?;

        Ok(Some(ConventionalCommit {
            commit_type: type_text.parse().unwrap_or(CommitType::Invalid),
            scope,
            summary,
            description,
            breaking_change,
            references: if references.is_empty() {
                None
            } else {
                Some(references)
            },
        }))
    }

    fn read_tag(conn: &Connection, git_ref: &str) -> Result<Option<Tag>, StoreError> {
        let row = conn
            .query_row(
                "SELECT id, git_ref, sha, name, commit_sha, subject, body
                 FROM tags WHERE git_ref = ?1",
                [git_ref],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                },
            )
            .optional()?;
        let Some((tag_id, git_ref, sha, name, commit_sha, subject, body)) = row else {
            return Ok(None);
        };

        let mut tag = Tag {
            git_ref,
            sha,
            name,
            subject,
            body,
            ..Default::default()
        };
        if !commit_sha.is_empty() {
            tag.commit = Self::read_commit(conn, &commit_sha)?;
        }
        let (contributors, dates) = Self::read_roles(
            conn,
            "SELECT tc.role, c.name, c.email, tc.date
             FROM tag_contributors tc
             JOIN contributors c ON c.id = tc.contributor_id
             WHERE tc.tag_id = ?1",
            tag_id,
        )?;
        tag.contributors = contributors;
        tag.contributor_dates = dates;
        Ok(Some(tag))
    }

    fn tag_refs_by_name(&self) -> Result<Vec<(String, String)>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT name, git_ref FROM tags")?;
        let mut pairs: Vec<(String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<_, _>>()?;
        pairs.sort_by(|a, b| compare_version_names(&a.0, &b.0));
        Ok(pairs)
    }

    fn version_names(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT name FROM versions")?;
        let mut names: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<_, _>>()?;
        names.sort_by(|a, b| compare_version_names(a, b));
        Ok(names)
    }

    fn read_version(&self, name: &str) -> Result<Option<Version>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT v.id, v.name, v.tag_ref, v.release_date,
                        sv.major, sv.minor, sv.patch
                 FROM versions v
                 JOIN semantic_versions sv ON sv.id = v.semantic_version_id
                 WHERE v.name = ?1",
                [name],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, i64>(5)?,
                        row.get::<_, i64>(6)?,
                    ))
                },
            )
            .optional()?;
        let Some((version_id, name, tag_ref, release_date, major, minor, patch)) = row else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT commit_sha FROM version_commits WHERE version_id = ?1 ORDER BY seq",
        )?;
        let commit_shas: Vec<String> = stmt
            .query_map([version_id], |row| row.get(0))?
            .collect::<Result<_, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT sequence, markdown FROM version_notes WHERE version_id = ?1 ORDER BY sequence",
        )?;
        let notes: BTreeMap<i64, String> = stmt
            .query_map([version_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<_, _>>()?;

        let stored = StoredVersion {
            name,
            semantic_version: SemanticVersion::new(major as u64, minor as u64, patch as u64),
            tag_ref,
            commit_shas,
            release_date: parse_stored_date(&release_date)?,
            notes,
        };

        let tag = match stored.tag_ref.as_deref() {
            Some(git_ref) => Self::read_tag(&self.conn, git_ref)?,
            None => None,
        };
        let mut commits = Vec::with_capacity(stored.commit_shas.len());
        for sha in &stored.commit_shas {
            let commit =
                Self::read_commit(&self.conn, sha)?.ok_or_else(|| StoreError::UnresolvedCommit {
                    version: stored.name.clone(),
                    sha: sha.clone(),
                })?;
            commits.push(commit);
        }
        Ok(Some(stored.hydrate(tag, commits)))
    }
}

fn parse_stored_date(text: &str) -> Result<DateTime<FixedOffset>, StoreError> {
    DateTime::parse_from_rfc3339(text).map_err(|_| StoreError::InvalidTimestamp {
        text: text.to_string(),
    })
}

impl HistoryStore for SqliteStore {
    fn add_contributor(&mut self, name: &str, email: &str) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        Self::upsert_contributor(&tx, name, email)?;
        tx.commit()?;
        Ok(())
    }

    fn add_commit(&mut self, commit: &Commit) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        Self::write_commit(&tx, commit)?;
        tx.commit()?;
        Ok(())
    }

    fn commit(&self, sha: &str) -> Result<Option<Commit>, StoreError> {
        Self::read_commit(&self.conn, sha)
    }

    fn commit_exists(&self, sha: &str) -> Result<bool, StoreError> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM commits WHERE sha = ?1", [sha], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    fn newest_commit(&self) -> Result<Option<Commit>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT c.sha, cc.role, cc.date
             FROM commits c
             JOIN commit_contributors cc ON cc.commit_id = c.id",
        )?;
        let rows: Vec<(String, String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<Result<_, _>>()?;

        let mut dates_by_sha: BTreeMap<String, BTreeMap<ContributorRole, DateTime<FixedOffset>>> =
            BTreeMap::new();
        for (sha, role_name, date_text) in rows {
            let Some(role) = ContributorRole::from_name(&role_name) else {
                continue;
            };
            dates_by_sha
                .entry(sha)
                .or_default()
                .insert(role, parse_stored_date(&date_text)?);
        }
        let newest = dates_by_sha
            .into_iter()
            .filter_map(|(sha, dates)| {
                dates
                    .get(&ContributorRole::Author)
                    .or_else(|| dates.get(&ContributorRole::Committer))
                    .copied()
                    .map(|date| (date, sha))
            })
            .max();
        match newest {
            Some((_, sha)) => self.commit(&sha),
            None => Ok(None),
        }
    }

    fn add_tag(&mut self, tag: &Tag) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        Self::write_tag(&tx, tag)?;
        tx.commit()?;
        Ok(())
    }

    fn tag(&self, git_ref: &str) -> Result<Option<Tag>, StoreError> {
        Self::read_tag(&self.conn, git_ref)
    }

    fn tag_exists(&self, git_ref: &str) -> Result<bool, StoreError> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM tags WHERE git_ref = ?1", [git_ref], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    fn max_tag(&self) -> Result<Option<Tag>, StoreError> {
        match self.tag_refs_by_name()?.last() {
            Some((_, git_ref)) => self.tag(git_ref),
            None => Ok(None),
        }
    }

    fn tags(&self) -> Result<Vec<Tag>, StoreError> {
        let mut tags = Vec::new();
        for (_, git_ref) in self.tag_refs_by_name()? {
            if let Some(tag) = self.tag(&git_ref)? {
                tags.push(tag);
            }
        }
        Ok(tags)
    }

    fn add_version(&mut self, version: &Version) -> Result<(), StoreError> {
        let stored = StoredVersion::snapshot(version);
        let tx = self.conn.transaction()?;
        if let Some(tag) = &version.tag {
            Self::write_tag(&tx, tag)?;
        }

        let sv = &stored.semantic_version;
        tx.execute(
            "INSERT INTO semantic_versions (name, major, minor, patch)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(name) DO UPDATE SET
                 major = excluded.major,
                 minor = excluded.minor,
                 patch = excluded.patch",
            params![sv.name, sv.major as i64, sv.minor as i64, sv.patch as i64],
        )?;
        let semantic_version_id: i64 = tx.query_row(
            "SELECT id FROM semantic_versions WHERE name = ?1",
            [&sv.name],
            |row| row.get(0),
        )?;

        tx.execute(
            "INSERT INTO versions (name, semantic_version_id, tag_ref, release_date)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(name) DO UPDATE SET
                 semantic_version_id = excluded.semantic_version_id,
                 tag_ref = excluded.tag_ref,
                 release_date = excluded.release_date",
            params![
                stored.name,
                semantic_version_id,
                stored.tag_ref,
                stored.release_date.to_rfc3339()
            ],
        )?;
        let version_id: i64 = tx.query_row(
            "SELECT id FROM versions WHERE name = ?1",
            [&stored.name],
            |row| row.get(0),
        )?;

        tx.execute(
            "DELETE FROM version_commits WHERE version_id = ?1",
            [version_id],
        )?;
        for (seq, sha) in stored.commit_shas.iter().enumerate() {
            tx.execute(
                "INSERT INTO version_commits (version_id, seq, commit_sha) VALUES (?1, ?2, ?3)",
                params![version_id, seq as i64, sha],
            )?;
        }

        tx.execute(
            "DELETE FROM version_notes WHERE version_id = ?1",
            [version_id],
        )?;
        for (sequence, markdown) in &stored.notes {
            tx.execute(
                "INSERT INTO version_notes (version_id, sequence, markdown) VALUES (?1, ?2, ?3)",
                params![version_id, sequence, markdown],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn version(&self, name: &str) -> Result<Option<Version>, StoreError> {
        self.read_version(name)
    }

    fn version_exists(&self, name: &str) -> Result<bool, StoreError> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM versions WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    fn max_version(&self) -> Result<Option<Version>, StoreError> {
        match self.version_names()?.last() {
            Some(name) => self.version(name),
            None => Ok(None),
        }
    }

    fn version_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM versions", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn versions(&self) -> Result<Vec<Version>, StoreError> {
        let mut versions = Vec::new();
        for name in self.version_names()? {
            if let Some(version) = self.version(&name)? {
                versions.push(version);
            }
        }
        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use similar_asserts::assert_eq;

    fn classified_commit(seed: char, subject: &str, body: &str) -> Commit {
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
            Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap().fixed_offset(),
        );
        commit.conventional = ConventionalCommit::parse(subject, body);
        commit
    }

    #[test]
    fn test_commit_roundtrip() {
        let mut store = SqliteStore::in_memory().expect("create store");
        let commit = classified_commit('a', "feat(api): add endpoint", "Fixes #12, #34");
        store.add_commit(&commit).expect("add");

        let loaded = store.commit(&commit.sha).expect("read").expect("exists");
        assert_eq!(loaded, commit);
    }

    #[test]
    fn test_commit_upsert_is_idempotent() {
        let mut store = SqliteStore::in_memory().expect("create store");
        let commit = classified_commit('a', "feat: once", "");
        store.add_commit(&commit).expect("first");
        store.add_commit(&commit).expect("second");

        let count: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM commits", [], |row| row.get(0))
            .expect("count");
        assert_eq!(count, 1);
        let roles: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM commit_contributors", [], |row| {
                row.get(0)
            })
            .expect("count");
        assert_eq!(roles, 1);
    }

    #[test]
    fn test_commit_upsert_replaces_content() {
        let mut store = SqliteStore::in_memory().expect("create store");
        let mut commit = classified_commit('a', "feat: before", "Fixes #1");
        store.add_commit(&commit).expect("add");

        commit.subject = "feat: after".to_string();
        commit.conventional = ConventionalCommit::parse(&commit.subject, "");
        store.add_commit(&commit).expect("replace");

        let loaded = store.commit(&commit.sha).expect("read").expect("exists");
        assert_eq!(loaded.subject, "feat: after");
        assert_eq!(
            loaded.conventional.as_ref().and_then(|cc| cc.references.clone()),
            None
        );
    }

    #[test]
    fn test_tag_roundtrip_with_commit() {
        let mut store = SqliteStore::in_memory().expect("create store");
        let commit = classified_commit('a', "feat: first", "");
        let mut tag = Tag {
            git_ref: "refs/tags/v1.0.0".to_string(),
            sha: "b".repeat(40),
            name: "v1.0.0".to_string(),
            commit: Some(commit.clone()),
            subject: "release v1.0.0".to_string(),
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
            Utc.with_ymd_and_hms(2026, 1, 11, 12, 0, 0).unwrap().fixed_offset(),
        );
        store.add_tag(&tag).expect("add");

        let loaded = store.tag(&tag.git_ref).expect("read").expect("exists");
        assert_eq!(loaded, tag);
        // The pointed commit was upserted too.
        assert!(store.commit_exists(&commit.sha).expect("exists"));
    }

    #[test]
    fn test_max_tag_numeric_ordering() {
        let mut store = SqliteStore::in_memory().expect("create store");
        for name in ["v9.0.0", "v10.0.0", "v2.0.0"] {
            let tag = Tag {
                git_ref: format!("refs/tags/{name}"),
                sha: "c".repeat(40),
                name: name.to_string(),
                ..Default::default()
            };
            store.add_tag(&tag).expect("add");
        }
        let max = store.max_tag().expect("read").expect("exists");
        assert_eq!(max.name, "v10.0.0");
    }

    #[test]
    fn test_version_roundtrip_resolves_commits() {
        let mut store = SqliteStore::in_memory().expect("create store");
        let commit = classified_commit('a', "feat: first", "");
        store.add_commit(&commit).expect("add commit");

        let mut version = Version::next(SemanticVersion::new(1, 0, 0), vec![commit.clone()]);
        version.notes.insert(1, "Initial release.".to_string());
        store.add_version(&version).expect("add version");

        let loaded = store.version("v1.0.0").expect("read").expect("exists");
        assert_eq!(loaded.commits, vec![commit]);
        assert_eq!(loaded.notes[&1], "Initial release.");
        assert_eq!(store.version_count().expect("count"), 1);
    }

    #[test]
    fn test_version_with_unknown_commit_fails_resolution() {
        let mut store = SqliteStore::in_memory().expect("create store");
        let version = Version::next(
            SemanticVersion::new(1, 0, 0),
            vec![classified_commit('a', "feat: ghost", "")],
        );
        // Writing the version snapshots SHAs without requiring the commits;
        // reading joins against the commit store and must fail loudly.
        store.add_version(&version).expect("add version");
        let result = store.version("v1.0.0");
        assert!(matches!(result, Err(StoreError::UnresolvedCommit { .. })));
    }

    #[test]
    fn test_newest_commit_resolves_author_first() {
        let mut store = SqliteStore::in_memory().expect("create store");
        let mut older = classified_commit('a', "feat: older", "");
        older.contributor_dates.insert(
            ContributorRole::Author,
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap().fixed_offset(),
        );
        let mut newer = classified_commit('b', "feat: newer", "");
        newer.contributor_dates.insert(
            ContributorRole::Author,
            Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap().fixed_offset(),
        );
        store.add_commit(&older).expect("add");
        store.add_commit(&newer).expect("add");

        let newest = store.newest_commit().expect("read").expect("exists");
        assert_eq!(newest.sha, newer.sha);
    }

    #[test]
    fn test_schema_version() {
        let store = SqliteStore::in_memory().expect("create store");
        assert_eq!(
            store.schema_version().expect("version"),
            migrations::CURRENT_VERSION
        );
    }
}
