// Copyright (c) 2026 - present BDM Software
// SPDX-License-Identifier: MIT

//! Best-effort classification of commit messages under Conventional Commits.
//!
//! Commit messages are uncontrolled, human-authored input, so parsing never
//! fails: a commit that cannot be fully classified still yields a structured
//! result (with [`CommitType::Invalid`] or an empty summary) rather than an
//! error. The only messages rejected outright are empty subjects and
//! auto-generated merge commits.

use serde::{Deserialize, Serialize};

use crate::commit_type::CommitType;

/// Sentinel scope meaning "no scope given".
pub const NO_SCOPE: &str = "<none>";

/// `BREAKING CHANGE:` including the colon.
const BREAKING_MARKER_LEN: usize = 16;

/// A commit message decomposed into its Conventional Commit elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConventionalCommit {
    /// Change type parsed from the subject; `Invalid` when unrecognized
    pub commit_type: CommitType,
    /// Scope between parentheses in the subject, if any
    pub scope: Option<String>,
    /// Subject text after the `type(scope):` prefix
    pub summary: Option<String>,
    /// Free-text body line elaborating on the change
    pub description: Option<String>,
    /// Breaking-change notice; presence marks the commit as breaking
    pub breaking_change: Option<String>,
    /// Issue/work-item references in the order they were written
    pub references: Option<Vec<String>>,
}

impl ConventionalCommit {
    /// True when no summary could be extracted; such commits are treated as
    /// non-conventional by the rest of the pipeline.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.summary.as_deref().is_none_or(str::is_empty)
    }

    /// True when the commit carries a breaking-change notice.
    #[must_use]
    pub fn is_breaking_change(&self) -> bool {
        self.breaking_change.as_deref().is_some_and(|bc| !bc.is_empty())
    }

    fn has_scope(&self) -> bool {
        self.scope.as_deref().is_some_and(|s| !s.is_empty() && s != NO_SCOPE)
    }

    /// Renders the subject line: `type(scope): summary`, `type: summary`, or
    /// the bare summary when the type is unusable and no scope is present.
    #[must_use]
    pub fn subject(&self) -> String {
        let summary = self.summary.as_deref().unwrap_or_default();
        if self.commit_type == CommitType::Invalid && !self.has_scope() {
            return summary.to_string();
        }
        match self.scope.as_deref() {
            Some(scope) if self.has_scope() => {
                format!("{}({scope}): {summary}", self.commit_type)
            }
            _ => format!("{}: {summary}", self.commit_type),
        }
    }

    /// Renders the body: description, then a blank-line-separated
    /// `BREAKING CHANGE:` paragraph, then a `Refs` paragraph.
    #[must_use]
    pub fn body(&self) -> String {
        let mut body = String::new();
        if let Some(description) = self.description.as_deref()
            && !description.is_empty()
        {
            body.push_str(description);
        }
        if let Some(bc) = self.breaking_change.as_deref()
            && !bc.is_empty()
        {
            body.push_str(&format!("\n\nBREAKING CHANGE: {bc}"));
        }
        if let Some(references) = self.references.as_deref()
            && !references.is_empty()
        {
            body.push_str(&format!("\n\nRefs {}", references.join(", ")));
        }
        body
    }

    /// The full commit message (`subject`, blank line, `body`).
    #[must_use]
    pub fn message(&self) -> String {
        format!("{}\n\n{}", self.subject(), self.body())
    }

    /// Replaces the reference list from free text, splitting on spaces and
    /// commas and collapsing repeated separators.
    pub fn set_references(&mut self, references: &str) {
        let split = split_references(references);
        if !split.is_empty() {
            self.references = Some(split);
        }
    }

    /// Classifies a commit's subject and body.
    ///
    /// Returns `None` for empty subjects and for merge commits (subjects
    /// starting with `Merged `); everything else yields a classification.
    /// When the subject carries no recognized structure the type defaults to
    /// `fix`, and when the type keyword is unknown the result carries
    /// [`CommitType::Invalid`] while scope/summary are still extracted.
    #[must_use]
    pub fn parse(subject: &str, body: &str) -> Option<Self> {
        if subject.is_empty() || subject.starts_with("Merged ") {
            return None;
        }

        // Subject: type before "(" (scoped) or before ":" (unscoped),
        // defaulting to "fix" for ad hoc messages.
        let mut type_text = "fix".to_string();
        let mut scope = None;
        if let Some(open) = subject.find('(') {
            type_text = subject[..open].trim().to_string();
            if let Some(close) = subject[open + 1..].find(')') {
                scope = Some(subject[open + 1..open + 1 + close].trim().to_string());
            }
        } else if let Some(colon) = subject.find(':') {
            type_text = subject[..colon].trim().to_string();
        }

        let mut summary = None;
        let bare_prefix = format!("{type_text}:");
        if let Some(rest) = subject.strip_prefix(&bare_prefix) {
            summary = Some(rest.trim().to_string());
        }
        if let Some(scope_text) = scope.as_deref() {
            let scoped_prefix = format!("{type_text}({scope_text}):");
            if let Some(rest) = subject.strip_prefix(&scoped_prefix) {
                summary = Some(rest.trim().to_string());
            }
        }

        // Body: the first non-marker line (index 0 or 1) is the description;
        // marker lines anywhere set the breaking-change and reference
        // candidates, last match wins.
        let body = body.replace("\r\n", "\n");
        let mut description = None;
        let mut breaking_change = None;
        let mut references = None;
        for (index, line) in body.split('\n').enumerate() {
            if line.is_empty() {
                continue;
            }
            let upper = line.to_uppercase();
            let is_marker = upper.starts_with("BREAKING CHANGE")
                || upper.starts_with("FIXES")
                || upper.starts_with("ISSUES")
                || upper.starts_with("REFS");
            if (index == 0 || index == 1) && !is_marker {
                description = Some(line.to_string());
                continue;
            }
            if upper.starts_with("BREAKING CHANGE") {
                breaking_change = Some(
                    line.get(BREAKING_MARKER_LEN..)
                        .unwrap_or_default()
                        .trim()
                        .to_string(),
                );
            }
            if upper.starts_with("FIXES")
                || upper.starts_with("ISSUES")
                || upper.starts_with("CLOSES")
                || upper.starts_with("REFS")
            {
                if let Some(space) = line.find(' ') {
                    let tokens = split_references(&line[space..]);
                    if !tokens.is_empty() {
                        references = Some(tokens);
                    }
                }
            }
        }

        Some(Self {
            commit_type: type_text.parse().unwrap_or(CommitType::Invalid),
            scope,
            summary,
            description,
            breaking_change,
            references,
        })
    }
}

/// Splits a free-text reference list on spaces and commas, dropping empty
/// tokens so repeated separators collapse.
fn split_references(text: &str) -> Vec<String> {
    text.split([' ', ','])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
