// Copyright (c) 2026 - present BDM Software
// SPDX-License-Identifier: MIT

//! Typed queries and mutations over a git repository.
//!
//! [`Git`] wraps a [`ProcessRunner`] and exposes the history operations the
//! rest of semvergit needs: listing tags and commits, fetching full commit
//! and tag records through the structured XML format strings, walking commit
//! ranges, and the stage/commit/tag/push finalization calls.
//!
//! Read queries report "nothing matched" as `None`/empty collections; a git
//! invocation that actually fails surfaces as
//! [`GitError::CommandFailed`](crate::error::GitError::CommandFailed) with
//! the exit code and stderr.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use tracing::{debug, warn};

use crate::commit::{Commit, Contributor, ContributorRole};
use crate::error::GitError;
use crate::process::{CommandObserver, ProcessRunner};
use crate::record::{self, Record};
use crate::tag::{Tag, TAG_REF_PREFIX};
use semvergit_conventional::ConventionalCommit;

/// Format string for `git show`, one `<c>` record per commit.
const COMMIT_FORMAT: &str = "--pretty=format:<c><an>%an</an><ae>%ae</ae><ad>%aI</ad>\
<cn>%cn</cn><ce>%ce</ce><cd>%cI</cd><sha>%H</sha><sub>%s</sub><b>%b</b></c>";

/// Field tags inside a `<c>` record.
const COMMIT_FIELDS: &[&str] = &["an", "ae", "ad", "cn", "ce", "cd", "sha", "sub", "b"];

/// Format string for `git for-each-ref`, one `<t>` record per tag.
const TAG_FORMAT: &str = "--format=<t><ref>%(refname)</ref><sha>%(objectname)</sha>\
<type>%(objecttype)</type><an>%(authorname)</an><ae>%(authoremail:trim)</ae>\
<ad>%(authordate:iso-strict)</ad><cn>%(committername)</cn><ce>%(committeremail:trim)</ce>\
<cd>%(committerdate:iso-strict)</cd><tn>%(taggername)</tn><te>%(taggeremail:trim)</te>\
<td>%(taggerdate:iso-strict)</td><sub>%(contents:subject)</sub><b>%(contents:body)</b></t>";

/// Field tags inside a `<t>` record.
const TAG_FIELDS: &[&str] = &[
    "ref", "sha", "type", "an", "ae", "ad", "cn", "ce", "cd", "tn", "te", "td", "sub", "b",
];

/// One row of `git show-ref --tags`, with the tag peeled to its commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagLine {
    /// SHA of the ref itself (tag object for annotated tags)
    pub tag_sha: String,
    /// Fully qualified ref
    pub git_ref: String,
    /// SHA of the commit the ref peels to, empty if unresolvable
    pub commit_sha: String,
}

/// One row of the full-history commit listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitLine {
    /// Full commit SHA
    pub sha: String,
    /// Author timestamp, if parseable
    pub author_date: Option<DateTime<FixedOffset>>,
    /// Committer timestamp, if parseable
    pub commit_date: Option<DateTime<FixedOffset>>,
}

/// A git repository gateway bound to one working directory.
pub struct Git {
    runner: ProcessRunner,
    directory: PathBuf,
}

impl Git {
    /// Opens the repository at the given directory.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::NotARepository`] if the directory is not inside a
    /// git working tree; every higher-level operation relies on this check
    /// having passed.
    pub fn open(directory: impl Into<PathBuf>) -> Result<Self, GitError> {
        let directory = directory.into();
        if !Self::is_repository(&directory) {
            return Err(GitError::NotARepository {
                path: directory.display().to_string(),
            });
        }
        Ok(Self {
            runner: ProcessRunner::new(directory.clone()),
            directory,
        })
    }

    /// Attaches a command observer to the underlying runner.
    #[must_use]
    pub fn with_observer(mut self, observer: CommandObserver) -> Self {
        self.runner = ProcessRunner::new(self.directory.clone()).with_observer(observer);
        self
    }

    /// True when the directory is inside a git working tree.
    #[must_use]
    pub fn is_repository(directory: &Path) -> bool {
        ProcessRunner::new(directory)
            .run_unchecked(&["rev-parse", "--is-inside-work-tree"])
            .map(|output| output.lines.iter().any(|line| line.trim() == "true"))
            .unwrap_or(false)
    }

    /// The repository working directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    // ========================================================================
    // Repository state queries
    // ========================================================================

    /// The currently checked-out branch name, if any.
    #[must_use]
    pub fn current_branch(&self) -> Option<String> {
        let output = self
            .runner
            .run_unchecked(&["rev-parse", "--abbrev-ref", "HEAD"])
            .ok()?;
        output.last_line().map(|line| line.trim().to_string())
    }

    /// The SHA of HEAD.
    ///
    /// # Errors
    ///
    /// Returns an error if HEAD cannot be resolved (e.g. an empty repository).
    pub fn head_sha(&self) -> Result<Option<String>, GitError> {
        let output = self.runner.run(&["rev-parse", "HEAD"])?;
        Ok(output.first_line().map(|line| line.trim().to_string()))
    }

    /// The `remote.origin.url` configuration value, if set.
    #[must_use]
    pub fn remote_origin_url(&self) -> Option<String> {
        let output = self
            .runner
            .run_unchecked(&["config", "remote.origin.url"])
            .ok()?;
        output.first_line().map(|line| line.trim().to_string())
    }

    /// All local and remote branch names.
    #[must_use]
    pub fn list_branches(&self) -> Vec<String> {
        let Ok(output) = self.runner.run_unchecked(&["branch", "-a", "--list"]) else {
            return Vec::new();
        };
        output
            .lines
            .iter()
            .map(|line| line.replace('*', "").trim().to_string())
            .filter(|line| !line.is_empty() && !line.contains("->"))
            .collect()
    }

    /// True when the given branch (or any revision) resolves.
    #[must_use]
    pub fn branch_exists(&self, branch: &str) -> bool {
        self.runner
            .run_unchecked(&["rev-parse", "--verify", branch])
            .map(|output| output.exit_code == 0)
            .unwrap_or(false)
    }

    /// Checks out the branch, creating it if it does not exist, optionally
    /// setting the upstream tracking branch.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkout fails.
    pub fn checkout_branch(
        &self,
        branch: &str,
        tracked_remote: Option<&str>,
    ) -> Result<(), GitError> {
        if self.branch_exists(branch) {
            self.runner.run(&["checkout", branch])?;
        } else {
            self.runner.run(&["checkout", "-b", branch])?;
        }
        if let Some(remote) = tracked_remote {
            self.runner.run(&["branch", "-u", remote])?;
        }
        Ok(())
    }

    // ========================================================================
    // Remote maintenance (best-effort)
    // ========================================================================

    /// Enables `fetch.pruneTags` so deleted remote tags disappear locally.
    pub fn set_prune_tags(&self) {
        if let Err(error) = self.runner.run_unchecked(&["config", "fetch.pruneTags", "true"]) {
            debug!(%error, "setting fetch.pruneTags failed");
        }
    }

    /// Fetches from the default remote; best-effort, a missing remote is not
    /// an error.
    pub fn fetch(&self, include_tags: bool) {
        let args: &[&str] = if include_tags {
            &["fetch", "--tags"]
        } else {
            &["fetch"]
        };
        match self.runner.run_unchecked(args) {
            Ok(output) if output.exit_code != 0 => {
                debug!(stderr = %output.stderr.trim(), "fetch skipped");
            }
            Err(error) => debug!(%error, "fetch skipped"),
            Ok(_) => {}
        }
    }

    /// Pulls with tags; best-effort like [`Git::fetch`].
    pub fn pull(&self) {
        match self.runner.run_unchecked(&["pull", "--tags"]) {
            Ok(output) if output.exit_code != 0 => {
                debug!(stderr = %output.stderr.trim(), "pull skipped");
            }
            Err(error) => debug!(%error, "pull skipped"),
            Ok(_) => {}
        }
    }

    // ========================================================================
    // History listings
    // ========================================================================

    /// Lists every tag ref with its peeled commit SHA.
    ///
    /// # Errors
    ///
    /// Returns an error only if git cannot be launched; a repository without
    /// tags yields an empty list.
    pub fn list_all_tags(&self) -> Result<Vec<TagLine>, GitError> {
        let output = self.runner.run_unchecked(&["show-ref", "--tags"])?;
        let mut tag_lines = Vec::new();
        for line in &output.lines {
            let mut fields = line.split(' ');
            let (Some(tag_sha), Some(git_ref)) = (fields.next(), fields.next()) else {
                continue;
            };
            let peeled = self
                .runner
                .run_unchecked(&["rev-parse", &format!("{git_ref}^{{commit}}")])?;
            let commit_sha = peeled
                .first_line()
                .map(|sha| sha.trim().to_string())
                .unwrap_or_default();
            tag_lines.push(TagLine {
                tag_sha: tag_sha.to_string(),
                git_ref: git_ref.to_string(),
                commit_sha,
            });
        }
        Ok(tag_lines)
    }

    /// Lists every commit SHA with author and committer timestamps, in the
    /// reverse-chronological order of the full-history log.
    ///
    /// # Errors
    ///
    /// Returns an error only if git cannot be launched; an empty repository
    /// yields an empty list.
    pub fn list_all_commits(&self) -> Result<Vec<CommitLine>, GitError> {
        let output = self
            .runner
            .run_unchecked(&["log", "--pretty=format:%H %aI %cI"])?;
        let mut commit_lines = Vec::new();
        for line in &output.lines {
            let mut fields = line.split(' ');
            let Some(sha) = fields.next() else { continue };
            let author_date = fields
                .next()
                .and_then(|text| DateTime::parse_from_rfc3339(text).ok());
            let commit_date = fields
                .next()
                .and_then(|text| DateTime::parse_from_rfc3339(text).ok());
            commit_lines.push(CommitLine {
                sha: sha.to_string(),
                author_date,
                commit_date,
            });
        }
        Ok(commit_lines)
    }

    /// The repository's root commit (last one listed when several roots
    /// exist), fully fetched.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit record cannot be fetched.
    pub fn first_commit(&self) -> Result<Option<Commit>, GitError> {
        let output = self
            .runner
            .run_unchecked(&["rev-list", "--max-parents=0", "HEAD"])?;
        match output.last_line() {
            Some(sha) => self.fetch_commit(sha.trim()),
            None => Ok(None),
        }
    }

    // ========================================================================
    // Structured record fetches
    // ========================================================================

    /// Fetches one commit's full metadata through the tagged format string.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::CommandFailed`] for unknown SHAs and
    /// [`GitError::MalformedRecord`] if the tagged output cannot be parsed.
    pub fn fetch_commit(&self, sha: &str) -> Result<Option<Commit>, GitError> {
        let output = self.runner.run(&["show", sha, "--quiet", COMMIT_FORMAT])?;
        let records = record::parse_records(&output.stdout, "c", COMMIT_FIELDS)?;
        let Some(found) = records.last() else {
            return Ok(None);
        };
        Ok(Some(Self::commit_from_record(found)?))
    }

    /// Fetches one tag's full metadata, resolving and fetching the commit it
    /// points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the ref listing or the commit resolution fails.
    pub fn fetch_tag(&self, ref_or_name: &str) -> Result<Option<Tag>, GitError> {
        let git_ref = if ref_or_name.starts_with(TAG_REF_PREFIX) {
            ref_or_name.to_string()
        } else {
            format!("{TAG_REF_PREFIX}{ref_or_name}")
        };
        let output = self.runner.run(&["for-each-ref", &git_ref, TAG_FORMAT])?;
        let records = record::parse_records(&output.stdout, "t", TAG_FIELDS)?;
        let Some(found) = records.last() else {
            return Ok(None);
        };

        let mut tag = Tag {
            git_ref: found.get("ref").unwrap_or(&git_ref).to_string(),
            sha: found.get("sha").unwrap_or_default().to_string(),
            subject: found.get("sub").unwrap_or_default().to_string(),
            body: found.get("b").unwrap_or_default().trim_end().to_string(),
            ..Default::default()
        };
        tag.name = Tag::name_from_ref(&tag.git_ref).to_string();
        Self::insert_contributor(&mut tag.contributors, ContributorRole::Author, found, "an", "ae");
        Self::insert_contributor(&mut tag.contributors, ContributorRole::Committer, found, "cn", "ce");
        Self::insert_contributor(&mut tag.contributors, ContributorRole::Tagger, found, "tn", "te");
        Self::insert_date(&mut tag.contributor_dates, ContributorRole::Author, found, "ad")?;
        Self::insert_date(&mut tag.contributor_dates, ContributorRole::Committer, found, "cd")?;
        Self::insert_date(&mut tag.contributor_dates, ContributorRole::Tagger, found, "td")?;

        // Peel to the commit: works for annotated and lightweight tags alike.
        let peeled = self.runner.run(&["rev-list", "-n", "1", &tag.sha])?;
        if let Some(commit_sha) = peeled.first_line() {
            tag.commit = self.fetch_commit(commit_sha.trim())?;
        }
        Ok(Some(tag))
    }

    fn commit_from_record(found: &Record) -> Result<Commit, GitError> {
        let mut commit = Commit {
            sha: found.get("sha").unwrap_or_default().to_string(),
            subject: found.get("sub").unwrap_or_default().to_string(),
            // %b carries the message's trailing newline.
            body: found.get("b").unwrap_or_default().trim_end().to_string(),
            ..Default::default()
        };
        Self::insert_contributor(&mut commit.contributors, ContributorRole::Author, found, "an", "ae");
        Self::insert_contributor(&mut commit.contributors, ContributorRole::Committer, found, "cn", "ce");
        Self::insert_date(&mut commit.contributor_dates, ContributorRole::Author, found, "ad")?;
        Self::insert_date(&mut commit.contributor_dates, ContributorRole::Committer, found, "cd")?;
        commit.conventional = ConventionalCommit::parse(&commit.subject, &commit.body);
        Ok(commit)
    }

    fn insert_contributor(
        contributors: &mut std::collections::BTreeMap<ContributorRole, Contributor>,
        role: ContributorRole,
        record: &Record,
        name_field: &str,
        email_field: &str,
    ) {
        let contributor = Contributor {
            name: record.get(name_field).unwrap_or_default().to_string(),
            email: record.get(email_field).unwrap_or_default().to_string(),
        };
        if !contributor.is_empty() {
            contributors.insert(role, contributor);
        }
    }

    fn insert_date(
        dates: &mut std::collections::BTreeMap<ContributorRole, DateTime<FixedOffset>>,
        role: ContributorRole,
        record: &Record,
        field: &str,
    ) -> Result<(), GitError> {
        if let Some(text) = record.get(field) {
            let parsed =
                DateTime::parse_from_rfc3339(text).map_err(|source| GitError::InvalidTimestamp {
                    text: text.to_string(),
                    source,
                })?;
            dates.insert(role, parsed);
        }
        Ok(())
    }

    // ========================================================================
    // Commit range walks
    // ========================================================================

    /// Commits after `from_sha` up to but excluding the commit `to_ref`
    /// points at, fetched lazily one SHA at a time.
    ///
    /// # Errors
    ///
    /// Returns an error only if the preliminary SHA listing cannot run.
    pub fn commits_between(&self, from_sha: &str, to_ref: &str) -> Result<Commits<'_>, GitError> {
        self.commits_from_log(Some(&format!("{from_sha}...{to_ref}^")))
    }

    /// Commits strictly after `from_sha` through HEAD.
    ///
    /// # Errors
    ///
    /// Returns an error only if the preliminary SHA listing cannot run.
    pub fn commits_since(&self, from_sha: &str) -> Result<Commits<'_>, GitError> {
        self.commits_from_log(Some(&format!("{from_sha}...HEAD")))
    }

    /// Every commit in history.
    ///
    /// # Errors
    ///
    /// Returns an error only if the preliminary SHA listing cannot run.
    pub fn all_commits(&self) -> Result<Commits<'_>, GitError> {
        self.commits_from_log(None)
    }

    fn commits_from_log(&self, range: Option<&str>) -> Result<Commits<'_>, GitError> {
        let mut args = vec!["log"];
        if let Some(range) = range {
            args.push(range);
        }
        args.push("--pretty=tformat:%H");
        let output = self.runner.run_unchecked(&args)?;
        Ok(Commits {
            git: self,
            shas: output.lines.into_iter(),
        })
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Stages every change in the working tree.
    ///
    /// # Errors
    ///
    /// Returns an error if staging fails.
    pub fn stage_all(&self) -> Result<(), GitError> {
        self.runner.run(&["add", "--all"])?;
        Ok(())
    }

    /// Commits staged changes. Multi-line messages become repeated `-m`
    /// segments so each paragraph stays a distinct message line.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails (e.g. nothing staged).
    pub fn commit(&self, message: &str) -> Result<Option<Commit>, GitError> {
        let mut args = vec!["commit".to_string()];
        for segment in message.split('\n').filter(|segment| !segment.is_empty()) {
            args.push("-m".to_string());
            args.push(segment.to_string());
        }
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner.run(&arg_refs)?;
        match self.head_sha()? {
            Some(sha) => self.fetch_commit(&sha),
            None => Ok(None),
        }
    }

    /// Creates an annotated tag on the given commit and immediately pushes
    /// it. The push is best-effort; a missing remote only logs a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag cannot be created or read back.
    pub fn create_annotated_tag(
        &self,
        name: &str,
        commit_sha: &str,
        message: &str,
    ) -> Result<Option<Tag>, GitError> {
        self.runner
            .run(&["tag", "--annotate", name, commit_sha, "--message", message])?;
        let push_ref = format!("{TAG_REF_PREFIX}{name}");
        match self.runner.run_unchecked(&["push", "origin", &push_ref]) {
            Ok(output) if output.exit_code != 0 => {
                warn!(tag = name, stderr = %output.stderr.trim(), "tag push failed");
            }
            Err(error) => warn!(tag = name, %error, "tag push failed"),
            Ok(_) => {}
        }
        self.fetch_tag(name)
    }

    /// Pushes the current branch.
    ///
    /// # Errors
    ///
    /// Returns an error if the push fails.
    pub fn push(&self) -> Result<(), GitError> {
        self.runner.run(&["push"])?;
        Ok(())
    }

    /// Pushes one tag ref.
    ///
    /// # Errors
    ///
    /// Returns an error if the push fails.
    pub fn push_tag(&self, name: &str) -> Result<(), GitError> {
        self.runner
            .run(&["push", "origin", &format!("{TAG_REF_PREFIX}{name}")])?;
        Ok(())
    }
}

/// Lazy, forward-only walk over a commit range.
///
/// The SHA list is captured when the walk is created; each step fetches one
/// full commit record. Restart by asking [`Git`] for a new walk.
pub struct Commits<'a> {
    git: &'a Git,
    shas: std::vec::IntoIter<String>,
}

impl Iterator for Commits<'_> {
    type Item = Result<Commit, GitError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let sha = self.shas.next()?;
            match self.git.fetch_commit(sha.trim()) {
                Ok(Some(commit)) => return Some(Ok(commit)),
                Ok(None) => continue,
                Err(error) => return Some(Err(error)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;
    use std::fs;
    use std::process::Command;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_DIR_COUNTER: AtomicU32 = AtomicU32::new(0);

    /// A throwaway git repository under the system temp directory.
    struct ScratchRepo {
        path: PathBuf,
    }

    impl ScratchRepo {
        fn new(test_name: &str) -> Self {
            let counter = TEST_DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
            let path = std::env::temp_dir().join(format!(
                "semvergit-git-{test_name}-{}-{counter}",
                std::process::id()
            ));
            fs::create_dir_all(&path).expect("create scratch dir");
            run_git(&path, &["init", "--initial-branch=main"]);
            run_git(&path, &["config", "user.email", "test@example.com"]);
            run_git(&path, &["config", "user.name", "Test Author"]);
            Self { path }
        }

        fn commit(&self, file: &str, message: &str) -> String {
            fs::write(self.path.join(file), message).expect("write file");
            run_git(&self.path, &["add", file]);
            run_git(&self.path, &["commit", "-m", message]);
            self.head()
        }

        fn tag(&self, name: &str, message: &str) {
            run_git(&self.path, &["tag", "--annotate", name, "--message", message]);
        }

        fn lightweight_tag(&self, name: &str) {
            run_git(&self.path, &["tag", name]);
        }

        fn head(&self) -> String {
            let output = Command::new("git")
                .current_dir(&self.path)
                .args(["rev-parse", "HEAD"])
                .output()
                .expect("rev-parse HEAD");
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        }
    }

    impl Drop for ScratchRepo {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.path);
        }
    }

    fn run_git(dir: &Path, args: &[&str]) {
        let output = Command::new("git")
            .current_dir(dir)
            .args(args)
            .output()
            .expect("run git");
        assert!(
            output.status.success(),
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }

    #[test]
    fn test_open_non_repository_fails() {
        let dir = std::env::temp_dir().join("semvergit-not-a-repo");
        fs::create_dir_all(&dir).expect("create dir");
        match Git::open(&dir) {
            Err(GitError::NotARepository { path }) => assert!(path.contains("not-a-repo")),
            other => panic!("expected NotARepository, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_is_repository() {
        let repo = ScratchRepo::new("is_repository");
        assert!(Git::is_repository(&repo.path));
        assert!(!Git::is_repository(Path::new("/")));
    }

    #[test]
    fn test_fetch_commit_fields() {
        let repo = ScratchRepo::new("fetch_commit");
        let sha = repo.commit("a.txt", "feat(api): add endpoint");
        let git = Git::open(&repo.path).expect("open");

        let commit = git.fetch_commit(&sha).expect("fetch").expect("exists");
        assert_eq!(commit.sha, sha);
        assert_eq!(commit.subject, "feat(api): add endpoint");
        assert_eq!(
            commit.contributors[&ContributorRole::Author].email,
            "test@example.com"
        );
        assert!(commit.date().is_some());
        let cc = commit.conventional.as_ref().expect("classified");
        assert_eq!(cc.scope.as_deref(), Some("api"));
        assert_eq!(cc.summary.as_deref(), Some("add endpoint"));
    }

    #[test]
    fn test_fetch_commit_with_markup_in_subject() {
        let repo = ScratchRepo::new("fetch_markup");
        let sha = repo.commit("a.txt", "feat: handle Vec<String> & friends");
        let git = Git::open(&repo.path).expect("open");

        let commit = git.fetch_commit(&sha).expect("fetch").expect("exists");
        assert_eq!(commit.subject, "feat: handle Vec<String> & friends");
    }

    #[test]
    fn test_fetch_commit_body_sections() {
        let repo = ScratchRepo::new("fetch_body");
        fs::write(repo.path.join("a.txt"), "x").expect("write");
        run_git(&repo.path, &["add", "a.txt"]);
        run_git(
            &repo.path,
            &[
                "commit",
                "-m",
                "feat: big change",
                "-m",
                "Longer description.",
                "-m",
                "BREAKING CHANGE: removes X",
                "-m",
                "Fixes #12, #34",
            ],
        );
        let git = Git::open(&repo.path).expect("open");
        let commit = git
            .fetch_commit(&repo.head())
            .expect("fetch")
            .expect("exists");
        let cc = commit.conventional.as_ref().expect("classified");
        assert_eq!(cc.description.as_deref(), Some("Longer description."));
        assert_eq!(cc.breaking_change.as_deref(), Some("removes X"));
        assert_eq!(
            cc.references,
            Some(vec!["#12".to_string(), "#34".to_string()])
        );
    }

    #[test]
    fn test_fetch_annotated_tag() {
        let repo = ScratchRepo::new("fetch_tag");
        let sha = repo.commit("a.txt", "feat: first");
        repo.tag("v1.0.0", "release v1.0.0");
        let git = Git::open(&repo.path).expect("open");

        let tag = git.fetch_tag("v1.0.0").expect("fetch").expect("exists");
        assert_eq!(tag.name, "v1.0.0");
        assert_eq!(tag.git_ref, "refs/tags/v1.0.0");
        assert_eq!(tag.subject, "release v1.0.0");
        assert!(tag.is_semantic_version_tag());
        assert!(tag.contributor_dates.contains_key(&ContributorRole::Tagger));
        assert_eq!(tag.commit.as_ref().expect("peeled").sha, sha);
        // Annotated tag object has its own SHA.
        assert_ne!(tag.sha, sha);
    }

    #[test]
    fn test_fetch_lightweight_tag() {
        let repo = ScratchRepo::new("fetch_light_tag");
        let sha = repo.commit("a.txt", "feat: first");
        repo.lightweight_tag("v1.0.0");
        let git = Git::open(&repo.path).expect("open");

        let tag = git.fetch_tag("v1.0.0").expect("fetch").expect("exists");
        assert_eq!(tag.sha, sha);
        assert_eq!(tag.commit.as_ref().expect("peeled").sha, sha);
        assert!(tag.contributor_dates.contains_key(&ContributorRole::Author));
    }

    #[test]
    fn test_fetch_missing_tag_is_none() {
        let repo = ScratchRepo::new("missing_tag");
        repo.commit("a.txt", "feat: first");
        let git = Git::open(&repo.path).expect("open");
        assert!(git.fetch_tag("v9.9.9").expect("fetch").is_none());
    }

    #[test]
    fn test_list_all_tags_peels_commits() {
        let repo = ScratchRepo::new("list_tags");
        let first = repo.commit("a.txt", "feat: first");
        repo.tag("v1.0.0", "release");
        let second = repo.commit("b.txt", "fix: second");
        repo.lightweight_tag("extra");
        let git = Git::open(&repo.path).expect("open");

        let mut tags = git.list_all_tags().expect("list");
        tags.sort_by(|a, b| a.git_ref.cmp(&b.git_ref));
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].git_ref, "refs/tags/extra");
        assert_eq!(tags[0].commit_sha, second);
        assert_eq!(tags[1].git_ref, "refs/tags/v1.0.0");
        assert_eq!(tags[1].commit_sha, first);
    }

    #[test]
    fn test_list_all_commits_reverse_chronological() {
        let repo = ScratchRepo::new("list_commits");
        let first = repo.commit("a.txt", "feat: first");
        let second = repo.commit("b.txt", "fix: second");
        let git = Git::open(&repo.path).expect("open");

        let commits = git.list_all_commits().expect("list");
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].sha, second);
        assert_eq!(commits[1].sha, first);
        assert!(commits[0].author_date.is_some());
        assert!(commits[0].commit_date.is_some());
    }

    #[test]
    fn test_list_all_commits_empty_repository() {
        let repo = ScratchRepo::new("empty_repo");
        let git = Git::open(&repo.path).expect("open");
        assert!(git.list_all_commits().expect("list").is_empty());
        assert!(git.list_all_tags().expect("list").is_empty());
        assert!(git.first_commit().expect("first").is_none());
    }

    #[test]
    fn test_first_commit() {
        let repo = ScratchRepo::new("first_commit");
        let first = repo.commit("a.txt", "feat: first");
        repo.commit("b.txt", "fix: second");
        let git = Git::open(&repo.path).expect("open");

        let root = git.first_commit().expect("query").expect("exists");
        assert_eq!(root.sha, first);
    }

    #[test]
    fn test_commits_since_excludes_from() {
        let repo = ScratchRepo::new("commits_since");
        let first = repo.commit("a.txt", "feat: first");
        let second = repo.commit("b.txt", "fix: second");
        let third = repo.commit("c.txt", "fix: third");
        let git = Git::open(&repo.path).expect("open");

        let commits: Vec<Commit> = git
            .commits_since(&first)
            .expect("walk")
            .collect::<Result<_, _>>()
            .expect("fetch all");
        let shas: Vec<&str> = commits.iter().map(|c| c.sha.as_str()).collect();
        assert_eq!(shas, vec![third.as_str(), second.as_str()]);
    }

    #[test]
    fn test_commits_between_excludes_both_bounds() {
        let repo = ScratchRepo::new("commits_between");
        let first = repo.commit("a.txt", "feat: first");
        let second = repo.commit("b.txt", "fix: second");
        repo.commit("c.txt", "fix: third");
        repo.tag("v1.1.0", "release");
        let git = Git::open(&repo.path).expect("open");

        // from...to^ yields commits after `from` up to the parent of the
        // tagged commit; the tagged commit itself is appended by the caller.
        let commits: Vec<Commit> = git
            .commits_between(&first, "refs/tags/v1.1.0")
            .expect("walk")
            .collect::<Result<_, _>>()
            .expect("fetch all");
        let shas: Vec<&str> = commits.iter().map(|c| c.sha.as_str()).collect();
        assert_eq!(shas, vec![second.as_str()]);
    }

    #[test]
    fn test_commit_multiline_message_becomes_paragraphs() {
        let repo = ScratchRepo::new("commit_paragraphs");
        repo.commit("a.txt", "feat: first");
        fs::write(repo.path.join("b.txt"), "content").expect("write");
        let git = Git::open(&repo.path).expect("open");

        git.stage_all().expect("stage");
        let commit = git
            .commit("feat: second\n\nBody paragraph.")
            .expect("commit")
            .expect("created");
        assert_eq!(commit.subject, "feat: second");
        assert_eq!(commit.body, "Body paragraph.");
    }

    #[test]
    fn test_create_annotated_tag_without_remote() {
        let repo = ScratchRepo::new("create_tag");
        let sha = repo.commit("a.txt", "feat: first");
        let git = Git::open(&repo.path).expect("open");

        // No origin configured: the tag is created and the push failure is
        // only logged.
        let tag = git
            .create_annotated_tag("v1.0.0", &sha, "first release")
            .expect("create")
            .expect("readable");
        assert_eq!(tag.name, "v1.0.0");
        assert_eq!(tag.commit.as_ref().expect("peeled").sha, sha);
    }

    #[test]
    fn test_push_without_remote_is_command_failed() {
        let repo = ScratchRepo::new("push_fails");
        repo.commit("a.txt", "feat: first");
        let git = Git::open(&repo.path).expect("open");
        match git.push() {
            Err(GitError::CommandFailed { exit_code, .. }) => assert_ne!(exit_code, 0),
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_current_branch() {
        let repo = ScratchRepo::new("current_branch");
        repo.commit("a.txt", "feat: first");
        let git = Git::open(&repo.path).expect("open");
        assert_eq!(git.current_branch().as_deref(), Some("main"));
    }
}
