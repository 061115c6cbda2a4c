// Copyright (c) 2026 - present BDM Software
// SPDX-License-Identifier: MIT

//! Markdown changelog rendering.
//!
//! Versions render in descending order, each with a header, free-text
//! notes, and one section per commit type (declaration order, skipping the
//! unclassifiable bucket) whose entries are sorted by committer date.
//! Commit and issue links are built from templates derived from the
//! repository's origin URL; unknown hosts fall back to plain text.

use semvergit_conventional::CommitType;
use semvergit_git::{Commit, ContributorRole};

use crate::version::Version;

/// Placeholder for the 7-character SHA in commit link templates.
const SHORT_SHA: &str = "{short_sha}";
/// Placeholder for the full SHA in commit link templates.
const FULL_SHA: &str = "{sha}";
/// Placeholder for the reference text (e.g. `#12`) in reference templates.
const REFERENCE: &str = "{reference}";
/// Placeholder for the reference with `#` stripped.
const REFERENCE_NUMBER: &str = "{number}";

/// Link templates for commits and issue references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkTemplates {
    /// Template producing a markdown commit link
    pub commit: Option<String>,
    /// Template producing a markdown reference link
    pub reference: Option<String>,
}

impl LinkTemplates {
    /// Derives templates from a `remote.origin.url` value.
    ///
    /// GitHub and Azure DevOps hosts are recognized; anything else yields
    /// plain-text rendering.
    #[must_use]
    pub fn from_origin_url(url: &str) -> Self {
        if let Some(base) = github_base(url) {
            return Self {
                commit: Some(format!("[`{SHORT_SHA}`]({base}/commit/{FULL_SHA})")),
                reference: Some(format!("[{REFERENCE}]({base}/issues/{REFERENCE_NUMBER})")),
            };
        }
        if let Some((base, project)) = azure_base(url) {
            return Self {
                commit: Some(format!(
                    "[`{SHORT_SHA}`]({base}/_git/{project}/commit/{FULL_SHA}?tab=details)"
                )),
                reference: Some(format!(
                    "[{REFERENCE}]({base}/_workitems/edit/{REFERENCE_NUMBER}/)"
                )),
            };
        }
        Self::default()
    }

    fn commit_link(&self, commit: &Commit) -> String {
        match &self.commit {
            Some(template) => template
                .replace(SHORT_SHA, commit.short_sha())
                .replace(FULL_SHA, &commit.sha),
            None => format!("`{}`", commit.short_sha()),
        }
    }

    fn reference_link(&self, reference: &str) -> String {
        match &self.reference {
            Some(template) => template
                .replace(REFERENCE, reference)
                .replace(REFERENCE_NUMBER, &reference.replace('#', "")),
            None => reference.to_string(),
        }
    }
}

/// Normalizes a GitHub remote URL (https or ssh) to `https://host/org/repo`.
fn github_base(url: &str) -> Option<String> {
    let rest = url
        .strip_prefix("git@github.com:")
        .or_else(|| url.strip_prefix("ssh://git@github.com/"))
        .map(|path| ("github.com", path))
        .or_else(|| {
            url.strip_prefix("https://github.com/")
                .map(|path| ("github.com", path))
        })?;
    let (host, path) = rest;
    let path = path.strip_suffix(".git").unwrap_or(path).trim_matches('/');
    let mut segments = path.split('/');
    let organization = segments.next()?;
    let repository = segments.next()?;
    if organization.is_empty() || repository.is_empty() {
        return None;
    }
    Some(format!("https://{host}/{organization}/{repository}"))
}

/// Extracts `(https://host/org/project, repo)` from an Azure DevOps URL.
fn azure_base(url: &str) -> Option<(String, String)> {
    let without_scheme = url.strip_prefix("https://")?;
    let (host, path) = without_scheme.split_once('/')?;
    if !host.ends_with("azure.com") && !host.ends_with("visualstudio.com") {
        return None;
    }
    let (prefix, repository) = path.split_once("/_git/")?;
    Some((
        format!("https://{host}/{}", prefix.trim_matches('/')),
        repository.trim_matches('/').to_string(),
    ))
}

/// Renders the full changelog, newest version first.
#[must_use]
pub fn render(versions: &[Version], links: &LinkTemplates) -> String {
    let mut ordered: Vec<&Version> = versions.iter().collect();
    ordered.sort_by(|a, b| b.semantic_version.cmp(&a.semantic_version));

    let mut blocks = Vec::with_capacity(ordered.len());
    for version in ordered {
        blocks.push(render_version(version, links));
    }
    blocks.join("\n---\n\n")
}

/// Renders one version block.
#[must_use]
pub fn render_version(version: &Version, links: &LinkTemplates) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "## {} ({})\n",
        version.name,
        version.release_date.format("%Y-%m-%d")
    ));

    for note in version.notes.values() {
        out.push('\n');
        out.push_str(note);
        out.push('\n');
    }

    for commit_type in CommitType::ALL {
        if commit_type == CommitType::Invalid {
            continue;
        }
        let mut commits: Vec<&Commit> = version.commits_of_type(commit_type).collect();
        if commits.is_empty() {
            continue;
        }
        commits.sort_by_key(|commit| {
            commit
                .contributor_dates
                .get(&ContributorRole::Committer)
                .copied()
                .or_else(|| commit.date())
        });

        out.push_str(&format!("\n### {commit_type}\n\n"));
        for commit in commits {
            out.push_str(&render_entry(commit, links));
        }
    }
    out
}

fn render_entry(commit: &Commit, links: &LinkTemplates) -> String {
    let Some(cc) = commit.conventional.as_ref() else {
        return String::new();
    };
    let mut entry = String::new();
    let summary = cc.summary.as_deref().unwrap_or_default();
    let link = links.commit_link(commit);
    match cc.scope.as_deref() {
        Some(scope) if !scope.is_empty() && scope != "<none>" => {
            entry.push_str(&format!("- {link} **{scope}**: {summary}\n"));
        }
        _ => entry.push_str(&format!("- {link} {summary}\n")),
    }
    if let Some(breaking) = cc.breaking_change.as_deref()
        && !breaking.is_empty()
    {
        entry.push_str(&format!("  - BREAKING CHANGE: {breaking}\n"));
    }
    if let Some(references) = cc.references.as_deref()
        && !references.is_empty()
    {
        let rendered: Vec<String> = references
            .iter()
            .map(|reference| links.reference_link(reference))
            .collect();
        entry.push_str(&format!("  - Refs: {}\n", rendered.join(", ")));
    }
    entry
}
